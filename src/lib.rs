pub mod config;
pub mod database;
pub mod handlers;
pub mod models;
pub mod requests;
pub mod routes;
pub mod services;
pub mod session;
pub mod utils;
