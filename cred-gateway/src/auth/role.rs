use shared::error::AppError;
use shared::models::Role;

use super::Principal;

/// Fail with `RoleRequired` unless the principal holds one of `allowed`
pub fn require_role(principal: &Principal, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&principal.role) {
        return Ok(());
    }

    tracing::warn!(
        subject = %principal.subject,
        role = %principal.role,
        "Role not permitted"
    );
    let allowed: Vec<&str> = allowed.iter().map(Role::as_str).collect();
    Err(AppError::forbidden(format!("Requires one of: {}", allowed.join(", ")))
        .with_detail("role", principal.role.as_str()))
}
