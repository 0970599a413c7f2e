use crate::accounts::{is_privileged, Principal, PrincipalId, Role};
use crate::board::domain::{Application, JobPosting};

/// Which applications a caller sees when listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationScope {
    Everything,
    /// Applications the seeker filed.
    FiledBy(PrincipalId),
    /// Applications to postings the recruiter owns.
    PostedBy(PrincipalId),
    Nothing,
}

impl ApplicationScope {
    pub fn for_principal(principal: &Principal) -> Self {
        if is_privileged(principal) {
            return ApplicationScope::Everything;
        }
        match principal.role() {
            Role::Seeker => ApplicationScope::FiledBy(principal.id()),
            Role::Recruiter => ApplicationScope::PostedBy(principal.id()),
            Role::None => ApplicationScope::Nothing,
        }
    }

    pub fn includes(&self, application: &Application, job: &JobPosting) -> bool {
        match self {
            ApplicationScope::Everything => true,
            ApplicationScope::FiledBy(id) => application.applicant == *id,
            ApplicationScope::PostedBy(id) => job.owner == *id,
            ApplicationScope::Nothing => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_follows_role() {
        assert_eq!(
            ApplicationScope::for_principal(&Principal::new(PrincipalId(1), Role::Seeker)),
            ApplicationScope::FiledBy(PrincipalId(1))
        );
        assert_eq!(
            ApplicationScope::for_principal(&Principal::new(PrincipalId(2), Role::Recruiter)),
            ApplicationScope::PostedBy(PrincipalId(2))
        );
        assert_eq!(
            ApplicationScope::for_principal(&Principal::new(PrincipalId(3), Role::None)),
            ApplicationScope::Nothing
        );
        assert_eq!(
            ApplicationScope::for_principal(&Principal::admin(PrincipalId(4), Role::Seeker)),
            ApplicationScope::Everything
        );
    }
}
