pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use service::{DefaultReconciler, Reconciler};
