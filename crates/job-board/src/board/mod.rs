//! Job postings, applications, and the lifecycle rules that connect them.
//!
//! Every operation goes through [`crate::access::authorize`] before touching storage, and every
//! transition that should reach a recipient returns its events in a [`Transition`] so the caller
//! decides when to dispatch them.

pub mod domain;
mod error;
mod memory;
pub mod repository;
pub mod router;
mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AdmissionRefusal, Application, ApplicationId, ApplicationStatus, JobChanges, JobDraft, JobId,
    JobPosting, JobStatus, JobView,
};
pub use error::BoardError;
pub use memory::InMemoryBoardStore;
pub use repository::{BoardRepository, NewApplication, NewJob, RepositoryError};
pub use router::{board_router, ApiState, PRINCIPAL_HEADER};
pub use service::{
    JobBoardService, Transition, MAX_COVER_LETTER_CHARS, MAX_TITLE_CHARS, MIN_DESCRIPTION_CHARS,
    MIN_TITLE_CHARS,
};
