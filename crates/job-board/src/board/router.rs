use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, ApplicationStatus, JobChanges, JobDraft, JobId};
use super::error::BoardError;
use super::repository::BoardRepository;
use super::service::JobBoardService;
use crate::accounts::{AccountRepository, AccountService, Principal, PrincipalId, Role};
use crate::notifications::{NotificationDispatcher, NotificationEvent, NotificationInbox};
use crate::stats::DashboardStats;

/// Header carrying the identity-provider subject of the caller.
pub const PRINCIPAL_HEADER: &str = "x-principal-id";

/// Shared handler state: the board services plus the collaborators they report to.
pub struct ApiState<R, A, N> {
    pub board: Arc<JobBoardService<R>>,
    pub accounts: Arc<AccountService<A>>,
    pub notifications: Arc<NotificationDispatcher<N>>,
    pub stats: Arc<DashboardStats<R>>,
}

impl<R, A, N> Clone for ApiState<R, A, N> {
    fn clone(&self) -> Self {
        Self {
            board: Arc::clone(&self.board),
            accounts: Arc::clone(&self.accounts),
            notifications: Arc::clone(&self.notifications),
            stats: Arc::clone(&self.stats),
        }
    }
}

impl<R, A, N> ApiState<R, A, N>
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    pub fn new(
        board: Arc<JobBoardService<R>>,
        accounts: Arc<AccountService<A>>,
        notifications: Arc<NotificationDispatcher<N>>,
        stats: Arc<DashboardStats<R>>,
    ) -> Self {
        Self {
            board,
            accounts,
            notifications,
            stats,
        }
    }

    pub(crate) fn caller(&self, headers: &HeaderMap) -> Result<Option<Principal>, BoardError> {
        resolve_caller(&self.accounts, headers)
    }

    pub(crate) fn signed_in(&self, headers: &HeaderMap) -> Result<Principal, BoardError> {
        self.caller(headers)?.ok_or(BoardError::NotAuthenticated)
    }

    fn dispatch(&self, events: &[NotificationEvent]) {
        self.notifications.dispatch(events, Utc::now());
    }
}

/// Resolve the caller from [`PRINCIPAL_HEADER`]. A missing header means anonymous; an
/// unreadable or unknown subject is rejected.
pub(crate) fn resolve_caller<A>(
    accounts: &AccountService<A>,
    headers: &HeaderMap,
) -> Result<Option<Principal>, BoardError>
where
    A: AccountRepository + 'static,
{
    let Some(raw) = headers.get(PRINCIPAL_HEADER) else {
        return Ok(None);
    };
    let id = raw
        .to_str()
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .ok_or(BoardError::NotAuthenticated)?;
    accounts
        .principal(PrincipalId(id))?
        .map(Some)
        .ok_or(BoardError::NotAuthenticated)
}

pub(crate) fn reply<T: Serialize>(status: StatusCode, result: Result<T, BoardError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error.into_response(),
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistrationRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoleSelectionRequest {
    pub role: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApplicationRequest {
    pub job_id: JobId,
    #[serde(default)]
    pub cover_letter: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReviewRequest {
    pub status: ApplicationStatus,
}

/// Router exposing accounts, jobs, applications and dashboard statistics.
pub fn board_router<R, A, N>(state: ApiState<R, A, N>) -> Router
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    Router::new()
        .route("/api/v1/accounts", post(register_handler::<R, A, N>))
        .route("/api/v1/accounts/me", get(me_handler::<R, A, N>))
        .route("/api/v1/accounts/me/role", post(select_role_handler::<R, A, N>))
        .route(
            "/api/v1/jobs",
            get(list_jobs_handler::<R, A, N>).post(create_job_handler::<R, A, N>),
        )
        .route(
            "/api/v1/jobs/:job_id",
            get(get_job_handler::<R, A, N>)
                .patch(update_job_handler::<R, A, N>)
                .delete(delete_job_handler::<R, A, N>),
        )
        .route(
            "/api/v1/applications",
            get(list_applications_handler::<R, A, N>).post(submit_handler::<R, A, N>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(get_application_handler::<R, A, N>),
        )
        .route(
            "/api/v1/applications/:application_id/review",
            post(review_handler::<R, A, N>),
        )
        .route(
            "/api/v1/applications/:application_id/withdraw",
            post(withdraw_handler::<R, A, N>),
        )
        .route(
            "/api/v1/stats/recruiter",
            get(recruiter_stats_handler::<R, A, N>),
        )
        .route("/api/v1/stats/seeker", get(seeker_stats_handler::<R, A, N>))
        .with_state(state)
}

pub(crate) async fn register_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    Json(request): Json<RegistrationRequest>,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    reply(
        StatusCode::CREATED,
        state.accounts.register(&request.email, Utc::now()),
    )
}

pub(crate) async fn me_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    headers: HeaderMap,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    let result = state
        .signed_in(&headers)
        .and_then(|caller| state.accounts.overview(&caller, Utc::now()));
    reply(StatusCode::OK, result)
}

pub(crate) async fn select_role_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    headers: HeaderMap,
    Json(request): Json<RoleSelectionRequest>,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    let result = state.signed_in(&headers).and_then(|caller| {
        let role = Role::parse(&request.role)
            .ok_or_else(|| BoardError::validation("role", "unknown role"))?;
        state.accounts.select_role(&caller, role)
    });
    reply(StatusCode::OK, result)
}

pub(crate) async fn list_jobs_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    headers: HeaderMap,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    let result = state
        .caller(&headers)
        .and_then(|caller| state.board.list_jobs(caller.as_ref(), Utc::now()));
    reply(StatusCode::OK, result)
}

pub(crate) async fn create_job_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    headers: HeaderMap,
    Json(draft): Json<JobDraft>,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    let result = state
        .caller(&headers)
        .and_then(|caller| state.board.create_job(caller.as_ref(), draft, Utc::now()));
    reply(StatusCode::CREATED, result)
}

pub(crate) async fn get_job_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    headers: HeaderMap,
    Path(job_id): Path<u64>,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    let result = state
        .caller(&headers)
        .and_then(|caller| state.board.get_job(caller.as_ref(), JobId(job_id), Utc::now()));
    reply(StatusCode::OK, result)
}

pub(crate) async fn update_job_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    headers: HeaderMap,
    Path(job_id): Path<u64>,
    Json(changes): Json<JobChanges>,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    let result = state.caller(&headers).and_then(|caller| {
        state
            .board
            .update_job(caller.as_ref(), JobId(job_id), changes, Utc::now())
    });
    reply(StatusCode::OK, result)
}

pub(crate) async fn delete_job_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    headers: HeaderMap,
    Path(job_id): Path<u64>,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    match state
        .caller(&headers)
        .and_then(|caller| state.board.delete_job(caller.as_ref(), JobId(job_id)))
    {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn list_applications_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    headers: HeaderMap,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    let result = state
        .caller(&headers)
        .and_then(|caller| state.board.list_applications(caller.as_ref()));
    reply(StatusCode::OK, result)
}

pub(crate) async fn submit_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    headers: HeaderMap,
    Json(request): Json<ApplicationRequest>,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    let result = state.caller(&headers).and_then(|caller| {
        state.board.submit_application(
            caller.as_ref(),
            request.job_id,
            &request.cover_letter,
            Utc::now(),
        )
    });
    let result = result.map(|transition| {
        state.dispatch(&transition.events);
        transition.record
    });
    reply(StatusCode::CREATED, result)
}

pub(crate) async fn get_application_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    headers: HeaderMap,
    Path(application_id): Path<u64>,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    let result = state.caller(&headers).and_then(|caller| {
        state
            .board
            .get_application(caller.as_ref(), ApplicationId(application_id))
    });
    reply(StatusCode::OK, result)
}

pub(crate) async fn review_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    headers: HeaderMap,
    Path(application_id): Path<u64>,
    Json(request): Json<ReviewRequest>,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    let result = state.caller(&headers).and_then(|caller| {
        state.board.review_application(
            caller.as_ref(),
            ApplicationId(application_id),
            request.status,
            Utc::now(),
        )
    });
    let result = result.map(|transition| {
        state.dispatch(&transition.events);
        transition.record
    });
    reply(StatusCode::OK, result)
}

pub(crate) async fn withdraw_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    headers: HeaderMap,
    Path(application_id): Path<u64>,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    let result = state.caller(&headers).and_then(|caller| {
        state.board.withdraw_application(
            caller.as_ref(),
            ApplicationId(application_id),
            Utc::now(),
        )
    });
    let result = result.map(|transition| {
        state.dispatch(&transition.events);
        transition.record
    });
    reply(StatusCode::OK, result)
}

pub(crate) async fn recruiter_stats_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    headers: HeaderMap,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    let result = state
        .signed_in(&headers)
        .and_then(|caller| state.stats.recruiter_overview(&caller, Utc::now()));
    reply(StatusCode::OK, result)
}

pub(crate) async fn seeker_stats_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    headers: HeaderMap,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    let result = state
        .signed_in(&headers)
        .and_then(|caller| state.stats.seeker_overview(&caller, Utc::now()));
    reply(StatusCode::OK, result)
}
