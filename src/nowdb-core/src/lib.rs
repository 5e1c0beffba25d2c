//! NowDB Core Library
//!
//! Shared types for talking to a NowDB service:
//! - Client configuration and config-file loading
//! - Operation names and request parameters
//! - Response decoding policy

pub mod config;
pub mod models;

// Re-export commonly used types
pub use config::ClientConfig;
pub use models::*;
