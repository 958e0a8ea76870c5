//! Shared types for the credential gateway
//!
//! Error codes, the application error type, and the tenant / license /
//! credential models used by the gateway and its frontend.

pub mod error;
pub mod models;

// Re-exports
pub use error::{AppError, AppResult, ErrorCode};
pub use http;
