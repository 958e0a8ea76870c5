//! Bearer credential verification
//!
//! Tokens are HS256 JWTs signed with the configured secret. `iss` and `aud`
//! must match the configured values exactly and `exp` must be in the future.

use std::str::FromStr;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use shared::models::Role;
use thiserror::Error;

/// Handling of a verified token that carries no `role` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingRolePolicy {
    /// Treat the caller as `admin`. Permissive; every use is logged.
    Admin,
    /// Reject the token
    Deny,
}

impl FromStr for MissingRolePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "deny" => Ok(Self::Deny),
            other => Err(format!("expected admin or deny, got {other}")),
        }
    }
}

/// Verifier settings
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub missing_role: MissingRolePolicy,
}

/// Claims read from a credential
///
/// `iss`, `aud` and `exp` are enforced by [`Validation`]; everything the
/// gateway uses is optional in the token itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(
        default,
        rename = "tenantId",
        alias = "tenant_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Serialize)]
struct SignedClaims<'a> {
    #[serde(flatten)]
    claims: &'a Claims,
    iss: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

/// Authenticated identity for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Empty when the token has no `sub`
    pub subject: String,
    pub role: Role,
    /// Tenant bound into the token, trusted without a lookup
    pub tenant_claim: Option<String>,
    pub email: Option<String>,
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("missing bearer credential")]
    Missing,

    #[error("malformed authorization header")]
    Malformed,

    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("token carries no role claim")]
    MissingRole,

    #[error("token generation failed: {0}")]
    GenerationFailed(String),
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Missing => AppError::unauthorized(),
            TokenError::Malformed => AppError::invalid_token("Invalid authorization header"),
            TokenError::Expired => AppError::token_expired(),
            TokenError::MissingRole => AppError::invalid_token("Token carries no role"),
            TokenError::Invalid(_) => AppError::invalid_token("Invalid token"),
            TokenError::GenerationFailed(msg) => AppError::internal(msg),
        }
    }
}

/// Extract the token from an `Authorization` header value
///
/// The scheme is matched case-insensitively; an empty token is treated as absent.
pub fn extract_bearer(header: &str) -> Result<&str, TokenError> {
    let (scheme, token) = header
        .trim_start()
        .split_once(' ')
        .ok_or(TokenError::Malformed)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(TokenError::Malformed);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(TokenError::Missing);
    }
    Ok(token)
}

pub struct TokenVerifier {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .field("missing_role", &self.config.missing_role)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&config.audience]);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        // No grace period past `exp`
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
        }
    }

    /// Verify a raw token and build the request principal
    pub fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Missing);
        }

        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })?
            .claims;

        let subject = claims.sub.unwrap_or_default();
        let role = match claims.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            Some(role) => Role::parse(role),
            None => match self.config.missing_role {
                MissingRolePolicy::Admin => {
                    tracing::warn!(
                        subject = %subject,
                        "Token has no role claim, defaulting to admin"
                    );
                    Role::Admin
                }
                MissingRolePolicy::Deny => return Err(TokenError::MissingRole),
            },
        };

        Ok(Principal {
            subject,
            role,
            tenant_claim: claims.tenant_id.filter(|t| !t.is_empty()),
            email: claims.email,
        })
    }

    /// Mint a token with the configured issuer and audience
    pub fn issue(&self, claims: &Claims, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let signed = SignedClaims {
            claims,
            iss: &self.config.issuer,
            aud: &self.config.audience,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &signed, &self.encoding_key)
            .map_err(|e| TokenError::GenerationFailed(e.to_string()))
    }
}
