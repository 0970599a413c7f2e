use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;

use super::profile::{
    EducationDraft, EntryId, ExperienceDraft, RecruiterProfileChanges, SeekerProfileChanges,
};
use super::store::AccountRepository;
use crate::board::router::reply;
use crate::board::{ApiState, BoardRepository};
use crate::notifications::NotificationInbox;

/// Router exposing the caller's own seeker or recruiter profile.
pub fn profile_router<R, A, N>(state: ApiState<R, A, N>) -> Router
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    Router::new()
        .route(
            "/api/v1/profiles/seeker",
            get(seeker_profile_handler::<R, A, N>)
                .patch(update_seeker_profile_handler::<R, A, N>),
        )
        .route(
            "/api/v1/profiles/seeker/experiences",
            post(add_experience_handler::<R, A, N>),
        )
        .route(
            "/api/v1/profiles/seeker/experiences/:entry_id",
            delete(remove_experience_handler::<R, A, N>),
        )
        .route(
            "/api/v1/profiles/seeker/education",
            post(add_education_handler::<R, A, N>),
        )
        .route(
            "/api/v1/profiles/seeker/education/:entry_id",
            delete(remove_education_handler::<R, A, N>),
        )
        .route(
            "/api/v1/profiles/recruiter",
            get(recruiter_profile_handler::<R, A, N>)
                .patch(update_recruiter_profile_handler::<R, A, N>),
        )
        .with_state(state)
}

pub(crate) async fn seeker_profile_handler<R, A, N>(
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
        .and_then(|caller| state.accounts.seeker_profile(caller.as_ref(), Utc::now()));
    reply(StatusCode::OK, result)
}

pub(crate) async fn update_seeker_profile_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    headers: HeaderMap,
    Json(changes): Json<SeekerProfileChanges>,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    let result = state.caller(&headers).and_then(|caller| {
        state
            .accounts
            .update_seeker_profile(caller.as_ref(), changes, Utc::now())
    });
    reply(StatusCode::OK, result)
}

pub(crate) async fn add_experience_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    headers: HeaderMap,
    Json(draft): Json<ExperienceDraft>,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    let result = state
        .caller(&headers)
        .and_then(|caller| state.accounts.add_experience(caller.as_ref(), draft, Utc::now()));
    reply(StatusCode::CREATED, result)
}

pub(crate) async fn remove_experience_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    headers: HeaderMap,
    Path(entry_id): Path<u64>,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    let result = state.caller(&headers).and_then(|caller| {
        state
            .accounts
            .remove_experience(caller.as_ref(), EntryId(entry_id), Utc::now())
    });
    reply(StatusCode::OK, result)
}

pub(crate) async fn add_education_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    headers: HeaderMap,
    Json(draft): Json<EducationDraft>,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    let result = state
        .caller(&headers)
        .and_then(|caller| state.accounts.add_education(caller.as_ref(), draft, Utc::now()));
    reply(StatusCode::CREATED, result)
}

pub(crate) async fn remove_education_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    headers: HeaderMap,
    Path(entry_id): Path<u64>,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    let result = state.caller(&headers).and_then(|caller| {
        state
            .accounts
            .remove_education(caller.as_ref(), EntryId(entry_id), Utc::now())
    });
    reply(StatusCode::OK, result)
}

pub(crate) async fn recruiter_profile_handler<R, A, N>(
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
        .and_then(|caller| state.accounts.recruiter_profile(caller.as_ref(), Utc::now()));
    reply(StatusCode::OK, result)
}

pub(crate) async fn update_recruiter_profile_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    headers: HeaderMap,
    Json(changes): Json<RecruiterProfileChanges>,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    let result = state.caller(&headers).and_then(|caller| {
        state
            .accounts
            .update_recruiter_profile(caller.as_ref(), changes, Utc::now())
    });
    reply(StatusCode::OK, result)
}
