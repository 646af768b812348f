pub mod handlers;

pub use handlers::{compare, compare_batch, export, health_check, AppState};
