pub mod api;
pub mod config;
pub mod models;
pub mod service;

pub use crate::config::AppConfig;
pub use service::{compare, ComparisonCache, Tolerances};
