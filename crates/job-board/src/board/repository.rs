use chrono::{DateTime, Utc};

use super::domain::{
    AdmissionRefusal, Application, ApplicationId, ApplicationStatus, JobId, JobPosting, JobStatus,
};
use crate::accounts::PrincipalId;

/// Posting fields validated by the service, waiting for the store to assign an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    pub owner: PrincipalId,
    pub title: String,
    pub description: String,
    pub status: JobStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub max_applicants: u32,
    pub created_at: DateTime<Utc>,
}

/// Application waiting for the store's admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub job_id: JobId,
    pub applicant: PrincipalId,
    pub cover_letter: String,
    pub created_at: DateTime<Utc>,
}

/// Storage abstraction for postings and applications.
///
/// Implementations own the atomic paths of the board. [`insert_application`] must run the
/// uniqueness check, [`JobPosting::admission`] and the insert as one unit. [`update_job`] and
/// [`transition_application`] must compare the stored status before writing. Listings are newest
/// first.
///
/// [`insert_application`]: BoardRepository::insert_application
/// [`update_job`]: BoardRepository::update_job
/// [`transition_application`]: BoardRepository::transition_application
pub trait BoardRepository: Send + Sync {
    fn insert_job(&self, job: NewJob) -> Result<JobPosting, RepositoryError>;
    /// Stores `job` only if the stored posting status still equals `expected`.
    fn update_job(&self, job: JobPosting, expected: JobStatus) -> Result<(), RepositoryError>;
    /// Removes the posting together with every application filed against it.
    fn delete_job(&self, id: JobId) -> Result<JobPosting, RepositoryError>;
    fn fetch_job(&self, id: JobId) -> Result<Option<JobPosting>, RepositoryError>;
    fn jobs(&self) -> Result<Vec<JobPosting>, RepositoryError>;
    fn jobs_owned_by(&self, owner: PrincipalId) -> Result<Vec<JobPosting>, RepositoryError>;

    fn insert_application(
        &self,
        application: NewApplication,
        now: DateTime<Utc>,
    ) -> Result<Application, RepositoryError>;
    /// Stores `updated` only if the stored status still equals `expected`.
    fn transition_application(
        &self,
        updated: Application,
        expected: ApplicationStatus,
    ) -> Result<Application, RepositoryError>;
    fn fetch_application(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn applications(&self) -> Result<Vec<Application>, RepositoryError>;
    fn applications_for_job(&self, job_id: JobId) -> Result<Vec<Application>, RepositoryError>;
    fn applications_filed_by(
        &self,
        applicant: PrincipalId,
    ) -> Result<Vec<Application>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{applicant} already applied to {job_id}")]
    DuplicateApplication {
        job_id: JobId,
        applicant: PrincipalId,
    },
    #[error("an account already uses {0}")]
    DuplicateEmail(String),
    #[error("a project tag named {0} already exists")]
    DuplicateTag(String),
    #[error("{0}")]
    Refused(AdmissionRefusal),
    #[error("application is already {}", current.label())]
    StatusChanged { current: ApplicationStatus },
    #[error("job is already {}", current.label())]
    JobStatusChanged { current: JobStatus },
    #[error("{0} not found")]
    NotFound(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
