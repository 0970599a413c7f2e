use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::accounts::{AccountService, InMemoryAccountStore, Principal, PrincipalId, Role};
use crate::board::domain::{
    Application, ApplicationId, ApplicationStatus, JobDraft, JobId, JobPosting, JobStatus,
};
use crate::board::repository::{BoardRepository, NewApplication, NewJob, RepositoryError};
use crate::board::router::PRINCIPAL_HEADER;
use crate::board::{ApiState, InMemoryBoardStore, JobBoardService};
use crate::config::BoardConfig;
use crate::notifications::{InMemoryInbox, NotificationDispatcher};
use crate::stats::DashboardStats;

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 15, 9, 30, 0).unwrap()
}

pub(super) fn recruiter(id: u64) -> Principal {
    Principal::new(PrincipalId(id), Role::Recruiter)
}

pub(super) fn seeker(id: u64) -> Principal {
    Principal::new(PrincipalId(id), Role::Seeker)
}

pub(super) fn open_draft(max_applicants: u32) -> JobDraft {
    JobDraft {
        title: "Payments engineer".to_string(),
        description: "Design and operate the settlement ledger services".to_string(),
        status: Some(JobStatus::Open),
        deadline: None,
        max_applicants: Some(max_applicants),
    }
}

pub(super) fn build_service() -> (JobBoardService<InMemoryBoardStore>, Arc<InMemoryBoardStore>) {
    let repository = Arc::new(InMemoryBoardStore::default());
    let service = JobBoardService::new(repository.clone(), BoardConfig::default());
    (service, repository)
}

pub(super) fn post_open_job(
    service: &JobBoardService<InMemoryBoardStore>,
    owner: &Principal,
    max_applicants: u32,
) -> JobPosting {
    service
        .create_job(Some(owner), open_draft(max_applicants), now())
        .expect("recruiter can post")
}

pub(super) fn apply(
    service: &JobBoardService<InMemoryBoardStore>,
    applicant: &Principal,
    job_id: JobId,
) -> Application {
    service
        .submit_application(Some(applicant), job_id, "I would like to join", now())
        .expect("application accepted")
        .record
}

pub(super) struct UnavailableRepository;

fn offline() -> RepositoryError {
    RepositoryError::Unavailable("database offline".to_string())
}

impl BoardRepository for UnavailableRepository {
    fn insert_job(&self, _job: NewJob) -> Result<JobPosting, RepositoryError> {
        Err(offline())
    }

    fn update_job(&self, _job: JobPosting, _expected: JobStatus) -> Result<(), RepositoryError> {
        Err(offline())
    }

    fn delete_job(&self, _id: JobId) -> Result<JobPosting, RepositoryError> {
        Err(offline())
    }

    fn fetch_job(&self, _id: JobId) -> Result<Option<JobPosting>, RepositoryError> {
        Err(offline())
    }

    fn jobs(&self) -> Result<Vec<JobPosting>, RepositoryError> {
        Err(offline())
    }

    fn jobs_owned_by(&self, _owner: PrincipalId) -> Result<Vec<JobPosting>, RepositoryError> {
        Err(offline())
    }

    fn insert_application(
        &self,
        _application: NewApplication,
        _now: DateTime<Utc>,
    ) -> Result<Application, RepositoryError> {
        Err(offline())
    }

    fn transition_application(
        &self,
        _updated: Application,
        _expected: ApplicationStatus,
    ) -> Result<Application, RepositoryError> {
        Err(offline())
    }

    fn fetch_application(
        &self,
        _id: ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        Err(offline())
    }

    fn applications(&self) -> Result<Vec<Application>, RepositoryError> {
        Err(offline())
    }

    fn applications_for_job(&self, _job_id: JobId) -> Result<Vec<Application>, RepositoryError> {
        Err(offline())
    }

    fn applications_filed_by(
        &self,
        _applicant: PrincipalId,
    ) -> Result<Vec<Application>, RepositoryError> {
        Err(offline())
    }
}

/// Serves a frozen copy of one posting from `fetch_job`, as a reader that lost a race would see
/// it. Writes go to the real store.
pub(super) struct StaleJobRepository {
    pub(super) store: InMemoryBoardStore,
    pub(super) snapshot: Mutex<Option<JobPosting>>,
}

impl StaleJobRepository {
    pub(super) fn new() -> Self {
        Self {
            store: InMemoryBoardStore::default(),
            snapshot: Mutex::new(None),
        }
    }

    pub(super) fn freeze(&self, job: JobPosting) {
        *self.snapshot.lock().expect("snapshot lock") = Some(job);
    }
}

impl BoardRepository for StaleJobRepository {
    fn insert_job(&self, job: NewJob) -> Result<JobPosting, RepositoryError> {
        self.store.insert_job(job)
    }

    fn update_job(&self, job: JobPosting, expected: JobStatus) -> Result<(), RepositoryError> {
        self.store.update_job(job, expected)
    }

    fn delete_job(&self, id: JobId) -> Result<JobPosting, RepositoryError> {
        self.store.delete_job(id)
    }

    fn fetch_job(&self, id: JobId) -> Result<Option<JobPosting>, RepositoryError> {
        match self.snapshot.lock().expect("snapshot lock").clone() {
            Some(job) if job.id == id => Ok(Some(job)),
            _ => self.store.fetch_job(id),
        }
    }

    fn jobs(&self) -> Result<Vec<JobPosting>, RepositoryError> {
        self.store.jobs()
    }

    fn jobs_owned_by(&self, owner: PrincipalId) -> Result<Vec<JobPosting>, RepositoryError> {
        self.store.jobs_owned_by(owner)
    }

    fn insert_application(
        &self,
        application: NewApplication,
        now: DateTime<Utc>,
    ) -> Result<Application, RepositoryError> {
        self.store.insert_application(application, now)
    }

    fn transition_application(
        &self,
        updated: Application,
        expected: ApplicationStatus,
    ) -> Result<Application, RepositoryError> {
        self.store.transition_application(updated, expected)
    }

    fn fetch_application(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        self.store.fetch_application(id)
    }

    fn applications(&self) -> Result<Vec<Application>, RepositoryError> {
        self.store.applications()
    }

    fn applications_for_job(&self, job_id: JobId) -> Result<Vec<Application>, RepositoryError> {
        self.store.applications_for_job(job_id)
    }

    fn applications_filed_by(
        &self,
        applicant: PrincipalId,
    ) -> Result<Vec<Application>, RepositoryError> {
        self.store.applications_filed_by(applicant)
    }
}

pub(super) type MemoryState = ApiState<InMemoryBoardStore, InMemoryAccountStore, InMemoryInbox>;

pub(super) fn build_state() -> MemoryState {
    let board_store = Arc::new(InMemoryBoardStore::default());
    let config = BoardConfig::default();
    ApiState::new(
        Arc::new(JobBoardService::new(board_store.clone(), config)),
        Arc::new(AccountService::new(Arc::new(InMemoryAccountStore::default()))),
        Arc::new(NotificationDispatcher::new(
            Arc::new(InMemoryInbox::default()),
            config.delivery_attempts,
        )),
        Arc::new(DashboardStats::new(board_store, config.stats_window_days)),
    )
}

/// Register an account and pick its role, returning the stored principal.
pub(super) fn enroll(state: &MemoryState, email: &str, role: Role) -> Principal {
    let account = state.accounts.register(email, now()).expect("register");
    if role == Role::None {
        return account.principal;
    }
    state
        .accounts
        .select_role(&account.principal, role)
        .expect("select role")
}

pub(super) fn request(
    method: Method,
    uri: &str,
    caller: Option<&Principal>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(caller) = caller {
        builder = builder.header(PRINCIPAL_HEADER, caller.id().0.to_string());
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("json body")))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
