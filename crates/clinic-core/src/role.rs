// Role domain type
//
// A role is the profile type of an account. Roles are referenced by accounts,
// never created at runtime.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Profile type of an account
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Doctor,
    Secretary,
    Patient,
}

/// Returned when a role name does not match any known role
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Doctor, Role::Secretary, Role::Patient];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Secretary => "secretary",
            Role::Patient => "patient",
        }
    }

    /// Permission set granted to the role.
    ///
    /// Kept in sync with the `roles` seed rows in the server migrations.
    pub fn permissions(&self) -> &'static [&'static str] {
        match self {
            Role::Admin => &[
                "users:manage",
                "doctors:manage",
                "specialties:manage",
                "patients:manage",
                "agenda:read",
            ],
            Role::Doctor => &["patients:read", "agenda:read"],
            Role::Secretary => &["patients:manage", "agenda:read", "agenda:write"],
            Role::Patient => &["profile:manage", "agenda:read"],
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "doctor" | "medico" => Ok(Role::Doctor),
            "secretary" | "secretaria" => Ok(Role::Secretary),
            "patient" | "paciente" => Ok(Role::Patient),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
