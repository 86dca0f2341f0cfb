// Core modules
pub mod api;
pub mod bot;
pub mod config;
pub mod indicators;
pub mod models;
pub mod risk;
pub mod server;

// Re-export commonly used types
pub use api::*;
pub use config::Config;
pub use models::*;

// Error handling
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
