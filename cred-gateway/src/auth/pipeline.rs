//! Per-route authorization pipeline
//!
//! `Authenticated` -> `TenantResolved` -> [`AuthContext`]. Each stage consumes
//! the previous one and either returns the next or fails, so a handler only
//! ever sees a fully authorized context. The first failure ends the request.

use std::fmt;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::error::AppError;
use shared::models::{License, LicenseType, Role};

use crate::db::Store;
use crate::error::{ServiceError, ServiceResult};
use crate::state::AppState;

use super::license::require_license;
use super::role::require_role;
use super::tenant::{TenantSource, resolve_tenant};
use super::token::{Principal, TokenError, TokenVerifier, extract_bearer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Authenticate,
    ResolveTenant,
    License,
    Role,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Authenticate => "authenticate",
            Self::ResolveTenant => "resolve_tenant",
            Self::License => "license",
            Self::Role => "role",
        })
    }
}

/// Gates a route declares after authentication and tenant resolution
#[derive(Debug, Clone, Copy)]
pub enum Requirement {
    /// Authenticated and tenant resolved, nothing more
    TenantScoped,
    /// Effective license of one of these types
    Licensed(&'static [LicenseType]),
    /// Principal holds one of these roles
    Role(&'static [Role]),
}

/// Authorized request context handed to handlers
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub principal: Principal,
    pub tenant_id: String,
    /// Set when the route is license gated
    pub license: Option<License>,
}

/// Verified principal, tenant not yet known
#[derive(Debug)]
pub struct Authenticated {
    principal: Principal,
}

impl Authenticated {
    /// Read and verify the bearer credential from request headers
    pub fn from_headers(verifier: &TokenVerifier, headers: &HeaderMap) -> Result<Self, TokenError> {
        let value = headers
            .get(header::AUTHORIZATION)
            .ok_or(TokenError::Missing)?
            .to_str()
            .map_err(|_| TokenError::Malformed)?;
        let principal = verifier.verify(extract_bearer(value)?)?;
        Ok(Self { principal })
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub async fn resolve_tenant(
        self,
        store: &dyn Store,
        host: Option<&str>,
    ) -> ServiceResult<TenantResolved> {
        let (tenant_id, source) = resolve_tenant(store, &self.principal, host).await?;
        Ok(TenantResolved {
            principal: self.principal,
            tenant_id,
            source,
        })
    }
}

/// Principal with its tenant
#[derive(Debug)]
pub struct TenantResolved {
    principal: Principal,
    tenant_id: String,
    source: TenantSource,
}

impl TenantResolved {
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn source(&self) -> TenantSource {
        self.source
    }

    pub async fn require_license(
        self,
        store: &dyn Store,
        allowed: &[LicenseType],
    ) -> ServiceResult<AuthContext> {
        let license = require_license(store, &self.tenant_id, allowed).await?;
        Ok(AuthContext {
            principal: self.principal,
            tenant_id: self.tenant_id,
            license: Some(license),
        })
    }

    pub fn require_role(self, allowed: &[Role]) -> Result<AuthContext, AppError> {
        require_role(&self.principal, allowed)?;
        Ok(self.into_context())
    }

    pub fn into_context(self) -> AuthContext {
        AuthContext {
            principal: self.principal,
            tenant_id: self.tenant_id,
            license: None,
        }
    }
}

/// Middleware state: the app plus the route's requirement
#[derive(Clone)]
pub struct Guard {
    pub state: AppState,
    pub requirement: Requirement,
}

impl Guard {
    pub fn new(state: AppState, requirement: Requirement) -> Self {
        Self { state, requirement }
    }

    /// Run every stage for one request
    pub async fn check(
        &self,
        headers: &HeaderMap,
        host: Option<&str>,
    ) -> Result<AuthContext, (Stage, AppError)> {
        let authenticated = Authenticated::from_headers(&self.state.verifier, headers)
            .map_err(|e| (Stage::Authenticate, AppError::from(e)))?;

        let store = self.state.store.as_ref();
        let resolved = authenticated
            .resolve_tenant(store, host)
            .await
            .map_err(|e| (Stage::ResolveTenant, AppError::from(e)))?;

        match self.requirement {
            Requirement::TenantScoped => Ok(resolved.into_context()),
            Requirement::Licensed(allowed) => resolved
                .require_license(store, allowed)
                .await
                .map_err(|e: ServiceError| (Stage::License, AppError::from(e))),
            Requirement::Role(allowed) => resolved
                .require_role(allowed)
                .map_err(|e| (Stage::Role, e)),
        }
    }
}

fn request_host(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| parts.uri.host())
}

/// Authorization middleware, installed per route with `route_layer`
pub async fn authorize(
    State(guard): State<Guard>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let (mut parts, body) = request.into_parts();

    let context = match guard.check(&parts.headers, request_host(&parts)).await {
        Ok(context) => context,
        Err((stage, err)) => {
            if err.is_unauthenticated() {
                tracing::warn!(
                    stage = %stage,
                    path = %parts.uri.path(),
                    code = %err.code,
                    "Request not authenticated"
                );
            } else {
                tracing::info!(stage = %stage, code = %err.code, "Request denied");
            }
            return Err(err.into_response());
        }
    };

    tracing::debug!(
        subject = %context.principal.subject,
        tenant_id = %context.tenant_id,
        "Request authorized"
    );
    parts.extensions.insert(context);
    Ok(next.run(Request::from_parts(parts, body)).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Claims, JwtConfig, MissingRolePolicy};
    use crate::db::MemoryStore;
    use axum::http::HeaderValue;
    use chrono::{Duration, Utc};
    use shared::error::ErrorCode;
    use shared::models::LicenseStatus;

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(JwtConfig {
            secret: "pipeline-test-secret-0123456789abcdef".into(),
            issuer: "https://auth.example.com".into(),
            audience: "cred-api".into(),
            missing_role: MissingRolePolicy::Admin,
        })
    }

    fn bearer(verifier: &TokenVerifier, role: &str, tenant: Option<&str>) -> HeaderMap {
        let token = verifier
            .issue(
                &Claims {
                    sub: Some("user-7".into()),
                    role: Some(role.into()),
                    tenant_id: tenant.map(str::to_string),
                    email: None,
                },
                Duration::minutes(5),
            )
            .unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn test_missing_header_is_unauthenticated() {
        let err = Authenticated::from_headers(&verifier(), &HeaderMap::new()).unwrap_err();
        assert!(AppError::from(err).is_unauthenticated());
    }

    #[tokio::test]
    async fn test_stages_thread_context() {
        let verifier = verifier();
        let store = MemoryStore::new();
        store
            .add_license(License {
                id: "lic-1".into(),
                tenant_id: "t-1".into(),
                license_type: LicenseType::Enterprise,
                status: LicenseStatus::Active,
                seats: 2,
                starts_at: Utc::now() - Duration::days(1),
                expires_at: None,
                meta: None,
            })
            .await;

        let authenticated =
            Authenticated::from_headers(&verifier, &bearer(&verifier, "owner", Some("t-1")))
                .unwrap();
        assert_eq!(authenticated.principal().subject, "user-7");

        let resolved = authenticated.resolve_tenant(&store, None).await.unwrap();
        assert_eq!(resolved.tenant_id(), "t-1");
        assert_eq!(resolved.source(), TenantSource::Claim);

        let ctx = resolved
            .require_license(&store, &[LicenseType::Enterprise])
            .await
            .unwrap();
        assert_eq!(ctx.tenant_id, "t-1");
        assert_eq!(ctx.license.map(|l| l.id).as_deref(), Some("lic-1"));
    }

    #[tokio::test]
    async fn test_role_stage_rejects() {
        let verifier = verifier();
        let store = MemoryStore::new();
        let resolved =
            Authenticated::from_headers(&verifier, &bearer(&verifier, "viewer", Some("t-1")))
                .unwrap()
                .resolve_tenant(&store, None)
                .await
                .unwrap();

        let err = resolved.require_role(&[Role::Admin, Role::Owner]).unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleRequired);
    }
}
