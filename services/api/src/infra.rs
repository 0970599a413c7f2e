use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use job_board::accounts::{AccountService, InMemoryAccountStore};
use job_board::board::{ApiState, InMemoryBoardStore, JobBoardService};
use job_board::config::BoardConfig;
use job_board::notifications::{InMemoryInbox, NotificationDispatcher};
use job_board::portfolio::{InMemoryPortfolioStore, PortfolioService, PortfolioState};
use job_board::stats::DashboardStats;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type BoardState = ApiState<InMemoryBoardStore, InMemoryAccountStore, InMemoryInbox>;
pub(crate) type PortfolioApiState = PortfolioState<InMemoryAccountStore, InMemoryPortfolioStore>;

/// Wire the in-memory stores into the services the router needs.
pub(crate) fn board_state(config: BoardConfig) -> BoardState {
    let board_store = Arc::new(InMemoryBoardStore::default());
    ApiState::new(
        Arc::new(JobBoardService::new(board_store.clone(), config)),
        Arc::new(AccountService::new(Arc::new(
            InMemoryAccountStore::default(),
        ))),
        Arc::new(NotificationDispatcher::new(
            Arc::new(InMemoryInbox::default()),
            config.delivery_attempts,
        )),
        Arc::new(DashboardStats::new(board_store, config.stats_window_days)),
    )
}

/// Portfolio routes resolve callers against the same accounts as the board.
pub(crate) fn portfolio_state(board: &BoardState) -> PortfolioApiState {
    PortfolioState::new(
        board.accounts.clone(),
        Arc::new(PortfolioService::new(Arc::new(
            InMemoryPortfolioStore::default(),
        ))),
    )
}
