use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::principal::{Principal, PrincipalId, Role};
use super::profile::{
    EntryId, RecruiterProfile, RecruiterProfileChanges, SeekerEdit, SeekerProfile,
};
use crate::board::RepositoryError;

/// Stored account; the principal snapshot is what the board sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub principal: Principal,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Storage abstraction for accounts. Emails are unique.
pub trait AccountRepository: Send + Sync {
    fn insert(&self, account: NewAccount) -> Result<Account, RepositoryError>;
    fn fetch(&self, id: PrincipalId) -> Result<Option<Account>, RepositoryError>;
    /// Persists a principal snapshot produced by role selection.
    fn save_principal(&self, principal: &Principal) -> Result<(), RepositoryError>;

    /// The owner's seeker profile, created empty on first use.
    fn seeker_profile(
        &self,
        owner: PrincipalId,
        now: DateTime<Utc>,
    ) -> Result<SeekerProfile, RepositoryError>;
    /// Applies `edit` to the owner's seeker profile as one unit, creating the profile if needed.
    /// New experience and education entries get store-assigned ids.
    fn edit_seeker_profile(
        &self,
        owner: PrincipalId,
        edit: SeekerEdit,
        now: DateTime<Utc>,
    ) -> Result<SeekerProfile, RepositoryError>;
    /// The owner's recruiter profile, created empty on first use.
    fn recruiter_profile(
        &self,
        owner: PrincipalId,
        now: DateTime<Utc>,
    ) -> Result<RecruiterProfile, RepositoryError>;
    fn edit_recruiter_profile(
        &self,
        owner: PrincipalId,
        changes: RecruiterProfileChanges,
        now: DateTime<Utc>,
    ) -> Result<RecruiterProfile, RepositoryError>;
}

#[derive(Debug, Default)]
struct AccountTable {
    rows: BTreeMap<PrincipalId, Account>,
    seekers: BTreeMap<PrincipalId, SeekerProfile>,
    recruiters: BTreeMap<PrincipalId, RecruiterProfile>,
    last_id: u64,
    last_entry_id: u64,
}

impl AccountTable {
    fn known(&self, owner: PrincipalId) -> Result<(), RepositoryError> {
        if self.rows.contains_key(&owner) {
            Ok(())
        } else {
            Err(RepositoryError::NotFound(owner.to_string()))
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    table: Mutex<AccountTable>,
}

impl InMemoryAccountStore {
    fn lock(&self) -> Result<MutexGuard<'_, AccountTable>, RepositoryError> {
        self.table
            .lock()
            .map_err(|_| RepositoryError::Unavailable("account store mutex poisoned".to_string()))
    }
}

impl AccountRepository for InMemoryAccountStore {
    fn insert(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        let mut table = self.lock()?;
        if table.rows.values().any(|row| row.email == account.email) {
            return Err(RepositoryError::DuplicateEmail(account.email));
        }
        table.last_id += 1;
        let id = PrincipalId(table.last_id);
        let principal = if account.is_admin {
            Principal::admin(id, Role::None)
        } else {
            Principal::new(id, Role::None)
        };
        let record = Account {
            principal,
            email: account.email,
            created_at: account.created_at,
        };
        table.rows.insert(id, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: PrincipalId) -> Result<Option<Account>, RepositoryError> {
        Ok(self.lock()?.rows.get(&id).cloned())
    }

    fn save_principal(&self, principal: &Principal) -> Result<(), RepositoryError> {
        let mut table = self.lock()?;
        match table.rows.get_mut(&principal.id()) {
            Some(row) => {
                row.principal = principal.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(principal.id().to_string())),
        }
    }

    fn seeker_profile(
        &self,
        owner: PrincipalId,
        now: DateTime<Utc>,
    ) -> Result<SeekerProfile, RepositoryError> {
        let mut table = self.lock()?;
        table.known(owner)?;
        Ok(table
            .seekers
            .entry(owner)
            .or_insert_with(|| SeekerProfile::empty(owner, now))
            .clone())
    }

    fn edit_seeker_profile(
        &self,
        owner: PrincipalId,
        edit: SeekerEdit,
        now: DateTime<Utc>,
    ) -> Result<SeekerProfile, RepositoryError> {
        let mut table = self.lock()?;
        table.known(owner)?;
        let AccountTable {
            seekers,
            last_entry_id,
            ..
        } = &mut *table;
        let mut next_entry_id = || {
            *last_entry_id += 1;
            EntryId(*last_entry_id)
        };
        let profile = seekers
            .entry(owner)
            .or_insert_with(|| SeekerProfile::empty(owner, now));

        match edit {
            SeekerEdit::Fields(changes) => profile.apply(changes),
            SeekerEdit::AddExperience(draft) => {
                profile.experiences.push(draft.into_entry(next_entry_id()))
            }
            SeekerEdit::AddEducation(draft) => {
                profile.education.push(draft.into_entry(next_entry_id()))
            }
            SeekerEdit::RemoveExperience(id) => {
                let before = profile.experiences.len();
                profile.experiences.retain(|entry| entry.id != id);
                if profile.experiences.len() == before {
                    return Err(RepositoryError::NotFound(id.to_string()));
                }
            }
            SeekerEdit::RemoveEducation(id) => {
                let before = profile.education.len();
                profile.education.retain(|entry| entry.id != id);
                if profile.education.len() == before {
                    return Err(RepositoryError::NotFound(id.to_string()));
                }
            }
        }
        profile.sort_entries();
        profile.updated_at = now;
        Ok(profile.clone())
    }

    fn recruiter_profile(
        &self,
        owner: PrincipalId,
        now: DateTime<Utc>,
    ) -> Result<RecruiterProfile, RepositoryError> {
        let mut table = self.lock()?;
        table.known(owner)?;
        Ok(table
            .recruiters
            .entry(owner)
            .or_insert_with(|| RecruiterProfile::empty(owner, now))
            .clone())
    }

    fn edit_recruiter_profile(
        &self,
        owner: PrincipalId,
        changes: RecruiterProfileChanges,
        now: DateTime<Utc>,
    ) -> Result<RecruiterProfile, RepositoryError> {
        let mut table = self.lock()?;
        table.known(owner)?;
        let profile = table
            .recruiters
            .entry(owner)
            .or_insert_with(|| RecruiterProfile::empty(owner, now));
        profile.apply(changes);
        profile.updated_at = now;
        Ok(profile.clone())
    }
}
