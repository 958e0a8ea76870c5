//! Data models
//!
//! Records owned by the persistence layer and read by the gateway.
//! Serialized as camelCase for the frontend; statuses and types are
//! stored as lowercase TEXT and parsed with `from_db` / `as_db`.

pub mod badge;
pub mod certificate;
pub mod license;
pub mod role;
pub mod tenant;

// Re-exports
pub use badge::*;
pub use certificate::*;
pub use license::*;
pub use role::*;
pub use tenant::*;
