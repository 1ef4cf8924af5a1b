//! Role hierarchy.
//!
//! Roles form a fixed total order `VIEWER < MOD < ADMIN`. Authorization is a
//! single question: does the actual role meet or exceed the required one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::AuthError;

/// Panel role. The set is closed; unknown values are rejected when parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Viewer,
    Mod,
    Admin,
}

impl Role {
    /// All roles, lowest first.
    pub const ALL: [Role; 3] = [Role::Viewer, Role::Mod, Role::Admin];

    /// Position in the hierarchy (VIEWER=1, MOD=2, ADMIN=3).
    pub const fn level(self) -> u8 {
        match self {
            Role::Viewer => 1,
            Role::Mod => 2,
            Role::Admin => 3,
        }
    }

    /// `true` iff `self` is at least as privileged as `required`.
    pub const fn meets_min(self, required: Role) -> bool {
        self.level() >= required.level()
    }

    /// Canonical wire/storage name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Viewer => "VIEWER",
            Role::Mod => "MOD",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VIEWER" => Ok(Role::Viewer),
            "MOD" => Ok(Role::Mod),
            "ADMIN" => Ok(Role::Admin),
            other => Err(AuthError::Validation(format!("Unknown role: {other}"))),
        }
    }
}
