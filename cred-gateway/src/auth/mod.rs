//! Authentication and authorization for API routes

pub mod license;
pub mod pipeline;
pub mod role;
pub mod tenant;
pub mod token;

pub use license::require_license;
pub use pipeline::{AuthContext, Guard, Requirement, Stage, authorize};
pub use role::require_role;
pub use tenant::{TenantSource, host_slug, resolve_tenant};
pub use token::{Claims, JwtConfig, MissingRolePolicy, Principal, TokenError, TokenVerifier};
