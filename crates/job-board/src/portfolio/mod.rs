//! Project portfolio: owner-managed projects with a public or private flag, and a tag catalogue
//! curated by staff.

mod domain;
mod memory;
mod repository;
pub mod router;
mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    tag_name, Project, ProjectChanges, ProjectDraft, ProjectId, ProjectTag, TagId,
    MAX_PROJECT_TITLE_CHARS, MAX_TAG_CHARS,
};
pub use memory::InMemoryPortfolioStore;
pub use repository::{NewProject, PortfolioRepository};
pub use router::{portfolio_router, PortfolioState};
pub use service::PortfolioService;
