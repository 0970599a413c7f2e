use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier handed out by the identity provider at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(pub u64);

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user-{}", self.0)
    }
}

/// Which side of the board a principal acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    None,
    Seeker,
    Recruiter,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::None => "none",
            Role::Seeker => "seeker",
            Role::Recruiter => "recruiter",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Role::None),
            "seeker" | "job_seeker" => Some(Role::Seeker),
            "recruiter" | "hr" => Some(Role::Recruiter),
            _ => None,
        }
    }
}

/// Snapshot of an authenticated caller.
///
/// Fields are private so a snapshot cannot be re-roled mid-request; the only way to obtain a
/// principal with a different role is [`Principal::with_role`], which the account service calls
/// from the role-selection operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    id: PrincipalId,
    role: Role,
    is_admin: bool,
}

impl Principal {
    pub fn new(id: PrincipalId, role: Role) -> Self {
        Self {
            id,
            role,
            is_admin: false,
        }
    }

    /// Staff or superuser account; the flag is managed outside the board.
    pub fn admin(id: PrincipalId, role: Role) -> Self {
        Self {
            id,
            role,
            is_admin: true,
        }
    }

    pub fn id(&self) -> PrincipalId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub(crate) fn with_role(&self, role: Role) -> Self {
        Self {
            id: self.id,
            role,
            is_admin: self.is_admin,
        }
    }
}

/// The one admin check used across authorization, visibility, and statistics.
pub fn is_privileged(principal: &Principal) -> bool {
    principal.is_admin
}
