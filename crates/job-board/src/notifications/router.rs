use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use super::inbox::{Notification, NotificationId, NotificationInbox};
use crate::accounts::AccountRepository;
use crate::board::router::reply;
use crate::board::{ApiState, BoardError, BoardRepository};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub unread: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationList {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkedRead {
    pub updated: usize,
}

/// Router exposing the caller's own inbox.
pub fn notification_router<R, A, N>(state: ApiState<R, A, N>) -> Router
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    Router::new()
        .route("/api/v1/notifications", get(list_handler::<R, A, N>))
        .route(
            "/api/v1/notifications/read-all",
            post(mark_all_read_handler::<R, A, N>),
        )
        .route(
            "/api/v1/notifications/:notification_id/read",
            post(mark_read_handler::<R, A, N>),
        )
        .with_state(state)
}

pub(crate) async fn list_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    let inbox = state.notifications.inbox();
    let result = state.signed_in(&headers).and_then(|caller| {
        let unread = inbox.list_unread(caller.id())?;
        let notifications = if query.unread {
            unread.clone()
        } else {
            inbox.list(caller.id())?
        };
        Ok(NotificationList {
            unread_count: unread.len(),
            notifications,
        })
    });
    reply(StatusCode::OK, result)
}

pub(crate) async fn mark_read_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    headers: HeaderMap,
    Path(notification_id): Path<u64>,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    let result = state.signed_in(&headers).and_then(|caller| {
        Ok(state
            .notifications
            .inbox()
            .mark_read(caller.id(), NotificationId(notification_id))?)
    });
    reply(StatusCode::OK, result)
}

pub(crate) async fn mark_all_read_handler<R, A, N>(
    State(state): State<ApiState<R, A, N>>,
    headers: HeaderMap,
) -> Response
where
    R: BoardRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationInbox + 'static,
{
    let result: Result<MarkedRead, BoardError> = state.signed_in(&headers).and_then(|caller| {
        let updated = state.notifications.inbox().mark_all_read(caller.id())?;
        Ok(MarkedRead { updated })
    });
    reply(StatusCode::OK, result)
}
