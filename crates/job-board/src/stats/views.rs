use chrono::NaiveDate;
use serde::Serialize;

use crate::board::domain::{ApplicationStatus, JobId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobApplicationCount {
    pub job_id: JobId,
    pub title: String,
    pub applications: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: ApplicationStatus,
    pub status_label: &'static str,
    pub applications: usize,
}

/// One bucket of a daily trend series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub applications: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecruiterOverview {
    pub jobs_total: usize,
    pub applications_total: usize,
    pub applications_by_job: Vec<JobApplicationCount>,
    pub daily_applications: Vec<DailyCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeekerOverview {
    pub applications_total: usize,
    pub by_status: Vec<StatusCount>,
    pub daily_submissions: Vec<DailyCount>,
}
