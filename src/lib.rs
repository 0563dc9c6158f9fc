pub mod access;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod storage;

pub use app::{app, AppState};
pub use config::AppConfig;

#[cfg(test)]
pub mod testing;
