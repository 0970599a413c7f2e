//! Registered principals, the one-time role selection, and the per-role profiles.

mod principal;
pub mod profile;
pub mod router;
mod service;
mod store;

pub use principal::{is_privileged, Principal, PrincipalId, Role};
pub use profile::{
    AccountOverview, EducationDraft, EntryId, ExperienceDraft, RecruiterProfile,
    RecruiterProfileChanges, SeekerEdit, SeekerEducation, SeekerExperience, SeekerProfile,
    SeekerProfileChanges, SeniorityLevel,
};
pub use router::profile_router;
pub use service::{normalize_email, AccountService};
pub use store::{Account, AccountRepository, InMemoryAccountStore, NewAccount};
