//! Role Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role carried in the credential's `role` claim
///
/// Unknown role strings are preserved so they can be logged, but they
/// never match any role gate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Owner,
    Reseller,
    Other(String),
}

impl Role {
    pub fn parse(s: &str) -> Self {
        match s {
            "admin" => Self::Admin,
            "owner" => Self::Owner,
            "reseller" => Self::Reseller,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::Owner => "owner",
            Self::Reseller => "reseller",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_and_unknown() {
        assert_eq!(Role::parse("owner"), Role::Owner);
        assert_eq!(Role::parse("auditor"), Role::Other("auditor".to_string()));
        assert_eq!(Role::parse("auditor").as_str(), "auditor");
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Role::Reseller).unwrap();
        assert_eq!(json, "\"reseller\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
