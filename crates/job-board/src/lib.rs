//! Authorization, job and application lifecycle, and notification core for a job board, plus
//! seeker and recruiter profiles and a project portfolio.

pub mod access;
pub mod accounts;
pub mod board;
pub mod config;
pub mod error;
pub mod notifications;
pub mod portfolio;
pub mod stats;
pub mod telemetry;
