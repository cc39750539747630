pub mod aggregate;
pub mod attendance;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod names;
pub mod plan;
pub mod reconcile;
pub mod time;
pub mod worker;

pub use error::{AppError, Result};
