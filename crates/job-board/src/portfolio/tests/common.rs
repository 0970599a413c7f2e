use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::accounts::{AccountService, InMemoryAccountStore, Principal, PrincipalId, Role};
use crate::board::PRINCIPAL_HEADER;
use crate::portfolio::{
    InMemoryPortfolioStore, PortfolioService, PortfolioState, Project, ProjectDraft, TagId,
};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 2, 14, 0, 0).unwrap()
}

pub(super) fn seeker(id: u64) -> Principal {
    Principal::new(PrincipalId(id), Role::Seeker)
}

pub(super) fn staff(id: u64) -> Principal {
    Principal::admin(PrincipalId(id), Role::None)
}

pub(super) fn draft(title: &str, is_public: bool, tag_ids: Vec<TagId>) -> ProjectDraft {
    ProjectDraft {
        title: title.to_string(),
        summary: "Double-entry bookkeeping for small shops".to_string(),
        repo_url: "https://github.com/example/ledger".to_string(),
        demo_url: String::new(),
        tech_stack: vec!["Rust".to_string(), "SQLite".to_string()],
        is_public,
        tag_ids,
    }
}

pub(super) fn build_portfolio() -> (
    PortfolioService<InMemoryPortfolioStore>,
    Arc<InMemoryPortfolioStore>,
) {
    let store = Arc::new(InMemoryPortfolioStore::default());
    (PortfolioService::new(store.clone()), store)
}

pub(super) fn publish(
    service: &PortfolioService<InMemoryPortfolioStore>,
    owner: &Principal,
    title: &str,
    is_public: bool,
) -> Project {
    service
        .create_project(Some(owner), draft(title, is_public, Vec::new()), now())
        .expect("owner can create")
}

pub(super) type MemoryState = PortfolioState<InMemoryAccountStore, InMemoryPortfolioStore>;

pub(super) fn build_state() -> MemoryState {
    PortfolioState::new(
        Arc::new(AccountService::new(Arc::new(InMemoryAccountStore::default()))),
        Arc::new(build_portfolio().0),
    )
}

pub(super) fn enroll(state: &MemoryState, email: &str, role: Role) -> Principal {
    let account = state.accounts.register(email, now()).expect("register");
    state
        .accounts
        .select_role(&account.principal, role)
        .expect("select role")
}

pub(super) fn provision_staff(state: &MemoryState, email: &str) -> Principal {
    state
        .accounts
        .provision_admin(email, now())
        .expect("provision")
        .principal
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
