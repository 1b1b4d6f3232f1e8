//! nerdmill-common: Shared error taxonomy and configuration used across all nerdmill crates.

pub mod error;
pub mod config;
pub mod columns;

// Re-export commonly used types
pub use error::{NerdError, Result};
pub use config::Config;
