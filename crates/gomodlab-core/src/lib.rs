// Core modules
pub mod config;
pub mod error;
pub mod text;

// Re-export commonly used types
pub use config::model::Config;
pub use error::{ErrorKind, GomodlabError, Result};
