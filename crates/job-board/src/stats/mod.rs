//! Dashboard aggregates for recruiters and seekers.

mod views;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::access::DenialReason;
use crate::accounts::{is_privileged, Principal, Role};
use crate::board::domain::{Application, ApplicationStatus};
use crate::board::{BoardError, BoardRepository};
use crate::config::MAX_STATS_WINDOW_DAYS;

pub use views::{DailyCount, JobApplicationCount, RecruiterOverview, SeekerOverview, StatusCount};

/// Read-only aggregates over the board store.
///
/// Recruiters see their own postings and seekers their own applications. Admins see the whole
/// board regardless of role.
pub struct DashboardStats<R> {
    repository: Arc<R>,
    window_days: u32,
}

impl<R> DashboardStats<R>
where
    R: BoardRepository + 'static,
{
    pub fn new(repository: Arc<R>, window_days: u32) -> Self {
        Self {
            repository,
            window_days: window_days.clamp(1, MAX_STATS_WINDOW_DAYS),
        }
    }

    pub fn recruiter_overview(
        &self,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> Result<RecruiterOverview, BoardError> {
        gate(principal, Role::Recruiter)?;

        let jobs = if is_privileged(principal) {
            self.repository.jobs()?
        } else {
            self.repository.jobs_owned_by(principal.id())?
        };

        let mut applications = Vec::new();
        let mut applications_by_job = Vec::with_capacity(jobs.len());
        for job in &jobs {
            let filed = self.repository.applications_for_job(job.id)?;
            applications_by_job.push(JobApplicationCount {
                job_id: job.id,
                title: job.title.clone(),
                applications: filed.len(),
            });
            applications.extend(filed);
        }
        applications_by_job.sort_by(|a, b| {
            b.applications
                .cmp(&a.applications)
                .then(a.job_id.cmp(&b.job_id))
        });

        Ok(RecruiterOverview {
            jobs_total: jobs.len(),
            applications_total: applications.len(),
            applications_by_job,
            daily_applications: daily_counts(&applications, now.date_naive(), self.window_days),
        })
    }

    pub fn seeker_overview(
        &self,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> Result<SeekerOverview, BoardError> {
        gate(principal, Role::Seeker)?;

        let applications = if is_privileged(principal) {
            self.repository.applications()?
        } else {
            self.repository.applications_filed_by(principal.id())?
        };

        let mut tally: HashMap<ApplicationStatus, usize> = HashMap::new();
        for application in &applications {
            *tally.entry(application.status).or_default() += 1;
        }
        let mut by_status: Vec<StatusCount> = tally
            .into_iter()
            .map(|(status, applications)| StatusCount {
                status,
                status_label: status.label(),
                applications,
            })
            .collect();
        by_status.sort_by(|a, b| {
            b.applications
                .cmp(&a.applications)
                .then(a.status_label.cmp(b.status_label))
        });

        Ok(SeekerOverview {
            applications_total: applications.len(),
            by_status,
            daily_submissions: daily_counts(&applications, now.date_naive(), self.window_days),
        })
    }
}

fn gate(principal: &Principal, role: Role) -> Result<(), BoardError> {
    if principal.role() == role || is_privileged(principal) {
        Ok(())
    } else {
        Err(BoardError::from(DenialReason::WrongRole))
    }
}

/// Zero-filled per-day counts for the `window_days` days ending on `today`, oldest first.
fn daily_counts(
    applications: &[Application],
    today: NaiveDate,
    window_days: u32,
) -> Vec<DailyCount> {
    let first = today - Duration::days(i64::from(window_days) - 1);
    let mut buckets: HashMap<NaiveDate, usize> = HashMap::new();
    for application in applications {
        let day = application.created_at.date_naive();
        if day >= first && day <= today {
            *buckets.entry(day).or_default() += 1;
        }
    }

    first
        .iter_days()
        .take(window_days as usize)
        .map(|date| DailyCount {
            date,
            applications: buckets.get(&date).copied().unwrap_or(0),
        })
        .collect()
}
