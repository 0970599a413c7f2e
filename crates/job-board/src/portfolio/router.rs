use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::domain::{ProjectChanges, ProjectDraft, ProjectId, TagId};
use super::repository::PortfolioRepository;
use super::service::PortfolioService;
use crate::accounts::{AccountRepository, AccountService, Principal};
use crate::board::router::{reply, resolve_caller};
use crate::board::BoardError;

/// Handler state for the portfolio routes. Identity comes from the shared account service.
pub struct PortfolioState<A, P> {
    pub accounts: Arc<AccountService<A>>,
    pub portfolio: Arc<PortfolioService<P>>,
}

impl<A, P> Clone for PortfolioState<A, P> {
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
            portfolio: Arc::clone(&self.portfolio),
        }
    }
}

impl<A, P> PortfolioState<A, P>
where
    A: AccountRepository + 'static,
    P: PortfolioRepository + 'static,
{
    pub fn new(accounts: Arc<AccountService<A>>, portfolio: Arc<PortfolioService<P>>) -> Self {
        Self {
            accounts,
            portfolio,
        }
    }

    fn caller(&self, headers: &HeaderMap) -> Result<Option<Principal>, BoardError> {
        resolve_caller(&self.accounts, headers)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TagRequest {
    pub name: String,
}

/// Router exposing portfolio projects and the tag catalogue.
pub fn portfolio_router<A, P>(state: PortfolioState<A, P>) -> Router
where
    A: AccountRepository + 'static,
    P: PortfolioRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/portfolio/projects",
            get(list_projects_handler::<A, P>).post(create_project_handler::<A, P>),
        )
        .route(
            "/api/v1/portfolio/projects/:project_id",
            get(get_project_handler::<A, P>)
                .patch(update_project_handler::<A, P>)
                .delete(delete_project_handler::<A, P>),
        )
        .route(
            "/api/v1/portfolio/my-projects",
            get(my_projects_handler::<A, P>),
        )
        .route(
            "/api/v1/portfolio/tags",
            get(list_tags_handler::<A, P>).post(create_tag_handler::<A, P>),
        )
        .route(
            "/api/v1/portfolio/tags/:tag_id",
            delete(delete_tag_handler::<A, P>),
        )
        .with_state(state)
}

pub(crate) async fn list_projects_handler<A, P>(
    State(state): State<PortfolioState<A, P>>,
    headers: HeaderMap,
) -> Response
where
    A: AccountRepository + 'static,
    P: PortfolioRepository + 'static,
{
    let result = state
        .caller(&headers)
        .and_then(|caller| state.portfolio.list_projects(caller.as_ref()));
    reply(StatusCode::OK, result)
}

pub(crate) async fn my_projects_handler<A, P>(
    State(state): State<PortfolioState<A, P>>,
    headers: HeaderMap,
) -> Response
where
    A: AccountRepository + 'static,
    P: PortfolioRepository + 'static,
{
    let result = state
        .caller(&headers)
        .and_then(|caller| state.portfolio.my_projects(caller.as_ref()));
    reply(StatusCode::OK, result)
}

pub(crate) async fn create_project_handler<A, P>(
    State(state): State<PortfolioState<A, P>>,
    headers: HeaderMap,
    Json(draft): Json<ProjectDraft>,
) -> Response
where
    A: AccountRepository + 'static,
    P: PortfolioRepository + 'static,
{
    let result = state.caller(&headers).and_then(|caller| {
        state
            .portfolio
            .create_project(caller.as_ref(), draft, Utc::now())
    });
    reply(StatusCode::CREATED, result)
}

pub(crate) async fn get_project_handler<A, P>(
    State(state): State<PortfolioState<A, P>>,
    headers: HeaderMap,
    Path(project_id): Path<u64>,
) -> Response
where
    A: AccountRepository + 'static,
    P: PortfolioRepository + 'static,
{
    let result = state.caller(&headers).and_then(|caller| {
        state
            .portfolio
            .get_project(caller.as_ref(), ProjectId(project_id))
    });
    reply(StatusCode::OK, result)
}

pub(crate) async fn update_project_handler<A, P>(
    State(state): State<PortfolioState<A, P>>,
    headers: HeaderMap,
    Path(project_id): Path<u64>,
    Json(changes): Json<ProjectChanges>,
) -> Response
where
    A: AccountRepository + 'static,
    P: PortfolioRepository + 'static,
{
    let result = state.caller(&headers).and_then(|caller| {
        state.portfolio.update_project(
            caller.as_ref(),
            ProjectId(project_id),
            changes,
            Utc::now(),
        )
    });
    reply(StatusCode::OK, result)
}

pub(crate) async fn delete_project_handler<A, P>(
    State(state): State<PortfolioState<A, P>>,
    headers: HeaderMap,
    Path(project_id): Path<u64>,
) -> Response
where
    A: AccountRepository + 'static,
    P: PortfolioRepository + 'static,
{
    match state.caller(&headers).and_then(|caller| {
        state
            .portfolio
            .delete_project(caller.as_ref(), ProjectId(project_id))
    }) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn list_tags_handler<A, P>(
    State(state): State<PortfolioState<A, P>>,
    headers: HeaderMap,
) -> Response
where
    A: AccountRepository + 'static,
    P: PortfolioRepository + 'static,
{
    let result = state
        .caller(&headers)
        .and_then(|caller| state.portfolio.list_tags(caller.as_ref()));
    reply(StatusCode::OK, result)
}

pub(crate) async fn create_tag_handler<A, P>(
    State(state): State<PortfolioState<A, P>>,
    headers: HeaderMap,
    Json(request): Json<TagRequest>,
) -> Response
where
    A: AccountRepository + 'static,
    P: PortfolioRepository + 'static,
{
    let result = state
        .caller(&headers)
        .and_then(|caller| state.portfolio.create_tag(caller.as_ref(), &request.name));
    reply(StatusCode::CREATED, result)
}

pub(crate) async fn delete_tag_handler<A, P>(
    State(state): State<PortfolioState<A, P>>,
    headers: HeaderMap,
    Path(tag_id): Path<u64>,
) -> Response
where
    A: AccountRepository + 'static,
    P: PortfolioRepository + 'static,
{
    match state
        .caller(&headers)
        .and_then(|caller| state.portfolio.delete_tag(caller.as_ref(), TagId(tag_id)))
    {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error.into_response(),
    }
}
