pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod views;
