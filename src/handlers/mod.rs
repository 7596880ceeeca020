pub mod donations;
pub mod posters;
pub mod uploads;
