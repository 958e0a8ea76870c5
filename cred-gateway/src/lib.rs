//! cred-gateway: multi-tenant access control in front of the credential API
//!
//! Every `/api` request is authenticated, scoped to a tenant and gated on a
//! license or role before a handler touches tenant data. Certificate
//! downloads go out as signed-URL redirects or streamed attachments.

pub mod api;
pub mod assets;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod state;

pub use config::Config;
pub use state::AppState;
