pub mod donation;
pub mod poster;
