//! Role-scoped authorization.
//!
//! Everything here is a pure function of the caller snapshot and the target records; nothing is
//! read from or written to a store.

mod action;
mod engine;
mod visibility;

pub use action::{Action, ApplicationTarget};
pub use engine::{authorize, require, Decision, DenialReason};
pub use visibility::ApplicationScope;
