use std::fmt;

use serde::{Deserialize, Serialize};

use super::action::{Action, ApplicationTarget};
use crate::accounts::{is_privileged, Principal, Role};
use crate::board::BoardError;

/// Reason code attached to every denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialReason {
    NotAuthenticated,
    WrongRole,
    NotOwner,
    /// The caller owns the posting it tried to apply to.
    SelfApplication,
}

impl DenialReason {
    pub const fn code(self) -> &'static str {
        match self {
            DenialReason::NotAuthenticated => "not_authenticated",
            DenialReason::WrongRole => "wrong_role",
            DenialReason::NotOwner => "not_owner",
            DenialReason::SelfApplication => "self_application",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenialReason),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }

    fn when(condition: bool, otherwise: DenialReason) -> Self {
        if condition {
            Decision::Allow
        } else {
            Decision::Deny(otherwise)
        }
    }
}

/// Decide whether `principal` may perform `action`.
///
/// Public reads are allowed for anonymous callers. Every other action needs a principal; admins
/// are then allowed unconditionally. Profiles follow the held role and portfolio edits follow
/// project ownership.
pub fn authorize(principal: Option<&Principal>, action: Action<'_>) -> Decision {
    if action.is_public() {
        return Decision::Allow;
    }

    let Some(principal) = principal else {
        return Decision::Deny(DenialReason::NotAuthenticated);
    };

    if is_privileged(principal) {
        return Decision::Allow;
    }

    match action {
        Action::ListJobs | Action::ViewJob(_) | Action::ListApplications => Decision::Allow,
        Action::CreateJob => {
            Decision::when(principal.role() == Role::Recruiter, DenialReason::WrongRole)
        }
        Action::UpdateJob(job) | Action::DeleteJob(job) => {
            if principal.role() != Role::Recruiter {
                Decision::Deny(DenialReason::WrongRole)
            } else {
                Decision::when(job.owner == principal.id(), DenialReason::NotOwner)
            }
        }
        Action::CreateApplication => {
            Decision::when(principal.role() == Role::Seeker, DenialReason::WrongRole)
        }
        Action::ViewApplication(target)
        | Action::ReviewApplication(target)
        | Action::WithdrawApplication(target) => participant(principal, target),
        Action::ManageSeekerProfile => {
            Decision::when(principal.role() == Role::Seeker, DenialReason::WrongRole)
        }
        Action::ManageRecruiterProfile => {
            Decision::when(principal.role() == Role::Recruiter, DenialReason::WrongRole)
        }
        Action::ListProjects
        | Action::ViewProject(_)
        | Action::ListOwnProjects
        | Action::CreateProject
        | Action::ListProjectTags => Decision::Allow,
        Action::UpdateProject(project) | Action::DeleteProject(project) => {
            Decision::when(project.owner == principal.id(), DenialReason::NotOwner)
        }
        // Staff only; admins were allowed above.
        Action::ManageProjectTags => Decision::Deny(DenialReason::WrongRole),
    }
}

fn participant(principal: &Principal, target: ApplicationTarget<'_>) -> Decision {
    match principal.role() {
        Role::Seeker => Decision::when(
            target.application.applicant == principal.id(),
            DenialReason::NotOwner,
        ),
        Role::Recruiter => Decision::when(
            target.job.owner == principal.id(),
            DenialReason::NotOwner,
        ),
        Role::None => Decision::Deny(DenialReason::WrongRole),
    }
}

/// [`authorize`] lifted into the board error taxonomy.
pub fn require(principal: Option<&Principal>, action: Action<'_>) -> Result<(), BoardError> {
    match authorize(principal, action) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => {
            tracing::debug!(
                action = action.name(),
                principal = ?principal.map(Principal::id),
                %reason,
                "access denied"
            );
            Err(BoardError::from(reason))
        }
    }
}
