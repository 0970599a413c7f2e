use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::principal::{Principal, PrincipalId, Role};
use super::profile::{
    AccountOverview, EducationDraft, EntryId, ExperienceDraft, RecruiterProfile,
    RecruiterProfileChanges, SeekerEdit, SeekerProfile, SeekerProfileChanges,
};
use super::store::{Account, AccountRepository, NewAccount};
use crate::access::{require, Action};
use crate::board::BoardError;

const MAX_EMAIL_LEN: usize = 254;

/// Registration, role selection, and the caller's own profile.
pub struct AccountService<A> {
    repository: Arc<A>,
}

impl<A> AccountService<A>
where
    A: AccountRepository + 'static,
{
    pub fn new(repository: Arc<A>) -> Self {
        Self { repository }
    }

    /// Create an account with no role; the caller picks one later through [`Self::select_role`].
    pub fn register(&self, email: &str, now: DateTime<Utc>) -> Result<Account, BoardError> {
        self.insert(email, false, now)
    }

    /// Staff accounts are provisioned by operators, never through self sign-up.
    pub fn provision_admin(&self, email: &str, now: DateTime<Utc>) -> Result<Account, BoardError> {
        self.insert(email, true, now)
    }

    fn insert(&self, email: &str, is_admin: bool, now: DateTime<Utc>) -> Result<Account, BoardError> {
        let email = normalize_email(email)?;
        let account = self.repository.insert(NewAccount {
            email,
            is_admin,
            created_at: now,
        })?;
        info!(principal = %account.principal.id(), is_admin, "account registered");
        Ok(account)
    }

    pub fn account(&self, id: PrincipalId) -> Result<Account, BoardError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| BoardError::NotFound(id.to_string()))
    }

    /// Current principal snapshot for an identity-provider subject, if the account exists.
    pub fn principal(&self, id: PrincipalId) -> Result<Option<Principal>, BoardError> {
        Ok(self.repository.fetch(id)?.map(|account| account.principal))
    }

    /// One-time role assignment for the caller's own account.
    ///
    /// Picking the role already held is a no-op. Switching to a different role once one is set
    /// is rejected.
    pub fn select_role(&self, principal: &Principal, role: Role) -> Result<Principal, BoardError> {
        if role == Role::None {
            return Err(BoardError::validation(
                "role",
                "choose either SEEKER or RECRUITER",
            ));
        }

        let current = self.account(principal.id())?.principal;
        match current.role() {
            held if held == role => Ok(current),
            Role::None => {
                let updated = current.with_role(role);
                self.repository.save_principal(&updated)?;
                info!(principal = %updated.id(), role = role.label(), "role selected");
                Ok(updated)
            }
            held => Err(BoardError::InvalidState(format!(
                "role already set to {}",
                held.label()
            ))),
        }
    }

    /// The account plus the profile for the role it holds, created on first use.
    pub fn overview(
        &self,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> Result<AccountOverview, BoardError> {
        let account = self.account(principal.id())?;
        let id = account.principal.id();
        let (seeker_profile, recruiter_profile) = match account.principal.role() {
            Role::Seeker => (Some(self.repository.seeker_profile(id, now)?), None),
            Role::Recruiter => (None, Some(self.repository.recruiter_profile(id, now)?)),
            Role::None => (None, None),
        };
        Ok(AccountOverview {
            account,
            seeker_profile,
            recruiter_profile,
        })
    }

    pub fn seeker_profile(
        &self,
        principal: Option<&Principal>,
        now: DateTime<Utc>,
    ) -> Result<SeekerProfile, BoardError> {
        let owner = profile_owner(principal, Action::ManageSeekerProfile)?;
        Ok(self.repository.seeker_profile(owner, now)?)
    }

    pub fn update_seeker_profile(
        &self,
        principal: Option<&Principal>,
        changes: SeekerProfileChanges,
        now: DateTime<Utc>,
    ) -> Result<SeekerProfile, BoardError> {
        let owner = profile_owner(principal, Action::ManageSeekerProfile)?;
        self.edit_seeker(owner, SeekerEdit::Fields(changes.validated()?), now)
    }

    pub fn add_experience(
        &self,
        principal: Option<&Principal>,
        draft: ExperienceDraft,
        now: DateTime<Utc>,
    ) -> Result<SeekerProfile, BoardError> {
        let owner = profile_owner(principal, Action::ManageSeekerProfile)?;
        self.edit_seeker(owner, SeekerEdit::AddExperience(draft.validated()?), now)
    }

    pub fn remove_experience(
        &self,
        principal: Option<&Principal>,
        entry: EntryId,
        now: DateTime<Utc>,
    ) -> Result<SeekerProfile, BoardError> {
        let owner = profile_owner(principal, Action::ManageSeekerProfile)?;
        self.edit_seeker(owner, SeekerEdit::RemoveExperience(entry), now)
    }

    pub fn add_education(
        &self,
        principal: Option<&Principal>,
        draft: EducationDraft,
        now: DateTime<Utc>,
    ) -> Result<SeekerProfile, BoardError> {
        let owner = profile_owner(principal, Action::ManageSeekerProfile)?;
        self.edit_seeker(owner, SeekerEdit::AddEducation(draft.validated()?), now)
    }

    pub fn remove_education(
        &self,
        principal: Option<&Principal>,
        entry: EntryId,
        now: DateTime<Utc>,
    ) -> Result<SeekerProfile, BoardError> {
        let owner = profile_owner(principal, Action::ManageSeekerProfile)?;
        self.edit_seeker(owner, SeekerEdit::RemoveEducation(entry), now)
    }

    fn edit_seeker(
        &self,
        owner: PrincipalId,
        edit: SeekerEdit,
        now: DateTime<Utc>,
    ) -> Result<SeekerProfile, BoardError> {
        let profile = self.repository.edit_seeker_profile(owner, edit, now)?;
        info!(principal = %owner, "seeker profile updated");
        Ok(profile)
    }

    pub fn recruiter_profile(
        &self,
        principal: Option<&Principal>,
        now: DateTime<Utc>,
    ) -> Result<RecruiterProfile, BoardError> {
        let owner = profile_owner(principal, Action::ManageRecruiterProfile)?;
        Ok(self.repository.recruiter_profile(owner, now)?)
    }

    pub fn update_recruiter_profile(
        &self,
        principal: Option<&Principal>,
        changes: RecruiterProfileChanges,
        now: DateTime<Utc>,
    ) -> Result<RecruiterProfile, BoardError> {
        let owner = profile_owner(principal, Action::ManageRecruiterProfile)?;
        let profile = self
            .repository
            .edit_recruiter_profile(owner, changes.validated()?, now)?;
        info!(principal = %owner, "recruiter profile updated");
        Ok(profile)
    }
}

/// Profiles are always the caller's own.
fn profile_owner(
    principal: Option<&Principal>,
    action: Action<'_>,
) -> Result<PrincipalId, BoardError> {
    require(principal, action)?;
    principal
        .map(Principal::id)
        .ok_or(BoardError::NotAuthenticated)
}

/// Trim, lower-case, and sanity check an email address.
pub fn normalize_email(raw: &str) -> Result<String, BoardError> {
    let email = raw.trim().to_lowercase();
    let invalid = |message: &str| Err(BoardError::validation("email", message));

    if email.is_empty() {
        return invalid("email must be set");
    }
    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return invalid("malformed email address");
    }
    let Some((local, domain)) = email.split_once('@') else {
        return invalid("malformed email address");
    };
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return invalid("malformed email address");
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::InMemoryAccountStore;
    use chrono::TimeZone;

    fn service() -> AccountService<InMemoryAccountStore> {
        AccountService::new(Arc::new(InMemoryAccountStore::default()))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn registration_normalizes_and_starts_without_role() {
        let accounts = service();
        let account = accounts.register("  Dana@Example.COM ", now()).expect("register");
        assert_eq!(account.email, "dana@example.com");
        assert_eq!(account.principal.role(), Role::None);
        assert!(!account.principal.is_admin());
    }

    #[test]
    fn duplicate_email_is_a_conflict() {
        let accounts = service();
        accounts.register("dana@example.com", now()).expect("first");
        match accounts.register("DANA@example.com", now()) {
            Err(BoardError::Conflict(_)) => {}
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn malformed_email_is_a_validation_error() {
        let accounts = service();
        for raw in ["", "no-at-sign", "@example.com", "a@b", "a@@b.com", "a b@c.com"] {
            match accounts.register(raw, now()) {
                Err(BoardError::Validation { field, .. }) => assert_eq!(field, "email"),
                other => panic!("expected validation error for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn role_selection_is_one_time() {
        let accounts = service();
        let principal = accounts.register("sam@example.com", now()).expect("register").principal;

        let seeker = accounts.select_role(&principal, Role::Seeker).expect("select");
        assert_eq!(seeker.role(), Role::Seeker);

        let again = accounts.select_role(&seeker, Role::Seeker).expect("same role is a no-op");
        assert_eq!(again, seeker);

        match accounts.select_role(&seeker, Role::Recruiter) {
            Err(BoardError::InvalidState(_)) => {}
            other => panic!("expected invalid state, got {other:?}"),
        }

        // A stale snapshot cannot sneak past the stored role.
        match accounts.select_role(&principal, Role::Recruiter) {
            Err(BoardError::InvalidState(_)) => {}
            other => panic!("expected invalid state, got {other:?}"),
        }

        let stored = accounts.principal(principal.id()).expect("fetch").expect("present");
        assert_eq!(stored.role(), Role::Seeker);
    }

    #[test]
    fn none_is_not_a_selectable_role() {
        let accounts = service();
        let principal = accounts.register("kim@example.com", now()).expect("register").principal;
        assert!(matches!(
            accounts.select_role(&principal, Role::None),
            Err(BoardError::Validation { field: "role", .. })
        ));
    }

    fn enrolled(
        accounts: &AccountService<InMemoryAccountStore>,
        email: &str,
        role: Role,
    ) -> Principal {
        let principal = accounts.register(email, now()).expect("register").principal;
        accounts.select_role(&principal, role).expect("select")
    }

    fn experience(title: &str, start: (i32, u32)) -> ExperienceDraft {
        ExperienceDraft {
            company: "Acme".to_string(),
            title: title.to_string(),
            start_date: chrono::NaiveDate::from_ymd_opt(start.0, start.1, 1).expect("valid date"),
            end_date: None,
            is_current: false,
            description: String::new(),
            tech_stack: vec!["Rust".to_string()],
        }
    }

    #[test]
    fn overview_carries_the_profile_for_the_held_role() {
        let accounts = service();
        let undecided = accounts.register("lee@example.com", now()).expect("register").principal;
        let overview = accounts.overview(&undecided, now()).expect("overview");
        assert!(overview.seeker_profile.is_none() && overview.recruiter_profile.is_none());

        let seeker = enrolled(&accounts, "ana@example.com", Role::Seeker);
        let overview = accounts.overview(&seeker, now()).expect("overview");
        let profile = overview.seeker_profile.expect("seeker profile created");
        assert_eq!(profile.owner, seeker.id());
        assert!(overview.recruiter_profile.is_none());

        let body = serde_json::to_value(
            accounts
                .overview(&enrolled(&accounts, "hr@example.com", Role::Recruiter), now())
                .expect("overview"),
        )
        .expect("serializable");
        assert_eq!(body["email"], "hr@example.com");
        assert!(body["seeker_profile"].is_null());
        assert!(body["recruiter_profile"].is_object());
    }

    #[test]
    fn seeker_profile_edits_are_owner_scoped_and_role_gated() {
        let accounts = service();
        let seeker = enrolled(&accounts, "ana@example.com", Role::Seeker);
        let other = enrolled(&accounts, "ben@example.com", Role::Seeker);
        let recruiter = enrolled(&accounts, "hr@example.com", Role::Recruiter);

        let updated = accounts
            .update_seeker_profile(
                Some(&seeker),
                SeekerProfileChanges {
                    headline: Some("Backend developer".to_string()),
                    ..SeekerProfileChanges::default()
                },
                now(),
            )
            .expect("owner edits");
        assert_eq!(updated.headline, "Backend developer");
        assert_eq!(
            accounts
                .seeker_profile(Some(&other), now())
                .expect("own profile")
                .headline,
            ""
        );

        match accounts.seeker_profile(Some(&recruiter), now()) {
            Err(BoardError::AccessDenied {
                reason: crate::access::DenialReason::WrongRole,
            }) => {}
            other => panic!("expected wrong role, got {other:?}"),
        }
        match accounts.recruiter_profile(None, now()) {
            Err(BoardError::NotAuthenticated) => {}
            other => panic!("expected not authenticated, got {other:?}"),
        }
    }

    #[test]
    fn experience_entries_are_added_sorted_and_removed() {
        let accounts = service();
        let seeker = enrolled(&accounts, "ana@example.com", Role::Seeker);

        accounts
            .add_experience(Some(&seeker), experience("Intern", (2019, 6)), now())
            .expect("add");
        let profile = accounts
            .add_experience(Some(&seeker), experience("Engineer", (2022, 2)), now())
            .expect("add");
        let titles: Vec<_> = profile.experiences.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Engineer", "Intern"]);

        let removed = profile.experiences[1].id;
        let profile = accounts
            .remove_experience(Some(&seeker), removed, now())
            .expect("remove");
        assert_eq!(profile.experiences.len(), 1);

        match accounts.remove_experience(Some(&seeker), removed, now()) {
            Err(BoardError::NotFound(_)) => {}
            other => panic!("expected not found, got {other:?}"),
        }

        let other = enrolled(&accounts, "ben@example.com", Role::Seeker);
        let kept = profile.experiences[0].id;
        match accounts.remove_experience(Some(&other), kept, now()) {
            Err(BoardError::NotFound(_)) => {}
            other => panic!("entries of another profile are out of reach, got {other:?}"),
        }
    }

    #[test]
    fn education_entries_validate_years() {
        let accounts = service();
        let seeker = enrolled(&accounts, "ana@example.com", Role::Seeker);
        let draft = EducationDraft {
            school: "Technion".to_string(),
            degree: "BSc Computer Science".to_string(),
            start_year: Some(2020),
            end_year: Some(2018),
            notes: String::new(),
        };
        match accounts.add_education(Some(&seeker), draft.clone(), now()) {
            Err(BoardError::Validation { field, .. }) => assert_eq!(field, "end_year"),
            other => panic!("expected validation error, got {other:?}"),
        }

        let profile = accounts
            .add_education(
                Some(&seeker),
                EducationDraft {
                    end_year: Some(2024),
                    ..draft
                },
                now(),
            )
            .expect("add");
        assert_eq!(profile.education.len(), 1);
        let entry = profile.education[0].id;
        let profile = accounts
            .remove_education(Some(&seeker), entry, now())
            .expect("remove");
        assert!(profile.education.is_empty());
    }

    #[test]
    fn recruiter_profile_round_trip() {
        let accounts = service();
        let recruiter = enrolled(&accounts, "hr@example.com", Role::Recruiter);
        let profile = accounts
            .update_recruiter_profile(
                Some(&recruiter),
                RecruiterProfileChanges {
                    company_name: Some("Acme".to_string()),
                    ..RecruiterProfileChanges::default()
                },
                now(),
            )
            .expect("update");
        assert_eq!(profile.company_name, "Acme");
        assert_eq!(
            accounts
                .recruiter_profile(Some(&recruiter), now())
                .expect("read")
                .company_name,
            "Acme"
        );
    }
}
