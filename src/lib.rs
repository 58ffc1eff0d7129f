pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod services;
pub mod storage;

pub use config::AppConfig;
pub use db::create_pool;
pub use error::{AppError, AppResult};
