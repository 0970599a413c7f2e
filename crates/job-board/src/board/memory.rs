use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::domain::{Application, ApplicationId, ApplicationStatus, JobId, JobPosting, JobStatus};
use super::repository::{BoardRepository, NewApplication, NewJob, RepositoryError};
use crate::accounts::PrincipalId;

#[derive(Debug, Default)]
struct Tables {
    jobs: BTreeMap<JobId, JobPosting>,
    applications: BTreeMap<ApplicationId, Application>,
    last_job_id: u64,
    last_application_id: u64,
}

/// Process-local store. One mutex guards every table, which makes admission and status
/// compare-and-set atomic with respect to each other.
#[derive(Debug, Default)]
pub struct InMemoryBoardStore {
    tables: Mutex<Tables>,
}

impl InMemoryBoardStore {
    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("board store mutex poisoned".to_string()))
    }
}

fn newest_first<T, K: Ord>(mut rows: Vec<T>, key: impl Fn(&T) -> (DateTime<Utc>, K)) -> Vec<T> {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
    rows
}

fn jobs_newest_first(rows: Vec<JobPosting>) -> Vec<JobPosting> {
    newest_first(rows, |job| (job.created_at, job.id))
}

fn applications_newest_first(rows: Vec<Application>) -> Vec<Application> {
    newest_first(rows, |application| (application.created_at, application.id))
}

impl BoardRepository for InMemoryBoardStore {
    fn insert_job(&self, job: NewJob) -> Result<JobPosting, RepositoryError> {
        let mut tables = self.lock()?;
        tables.last_job_id += 1;
        let record = JobPosting {
            id: JobId(tables.last_job_id),
            owner: job.owner,
            title: job.title,
            description: job.description,
            status: job.status,
            deadline: job.deadline,
            max_applicants: job.max_applicants,
            created_at: job.created_at,
            updated_at: job.created_at,
        };
        tables.jobs.insert(record.id, record.clone());
        Ok(record)
    }

    fn update_job(&self, job: JobPosting, expected: JobStatus) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        let slot = tables
            .jobs
            .get_mut(&job.id)
            .ok_or_else(|| RepositoryError::NotFound(job.id.to_string()))?;
        if slot.status != expected {
            return Err(RepositoryError::JobStatusChanged {
                current: slot.status,
            });
        }
        *slot = job;
        Ok(())
    }

    fn delete_job(&self, id: JobId) -> Result<JobPosting, RepositoryError> {
        let mut tables = self.lock()?;
        let removed = tables
            .jobs
            .remove(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        tables
            .applications
            .retain(|_, application| application.job_id != id);
        Ok(removed)
    }

    fn fetch_job(&self, id: JobId) -> Result<Option<JobPosting>, RepositoryError> {
        Ok(self.lock()?.jobs.get(&id).cloned())
    }

    fn jobs(&self) -> Result<Vec<JobPosting>, RepositoryError> {
        let rows = self.lock()?.jobs.values().cloned().collect();
        Ok(jobs_newest_first(rows))
    }

    fn jobs_owned_by(&self, owner: PrincipalId) -> Result<Vec<JobPosting>, RepositoryError> {
        let rows = self
            .lock()?
            .jobs
            .values()
            .filter(|job| job.owner == owner)
            .cloned()
            .collect();
        Ok(jobs_newest_first(rows))
    }

    fn insert_application(
        &self,
        application: NewApplication,
        now: DateTime<Utc>,
    ) -> Result<Application, RepositoryError> {
        let mut tables = self.lock()?;
        let job = tables
            .jobs
            .get(&application.job_id)
            .ok_or_else(|| RepositoryError::NotFound(application.job_id.to_string()))?;

        let mut active = 0usize;
        for existing in tables
            .applications
            .values()
            .filter(|existing| existing.job_id == application.job_id)
        {
            if existing.applicant == application.applicant {
                return Err(RepositoryError::DuplicateApplication {
                    job_id: application.job_id,
                    applicant: application.applicant,
                });
            }
            if existing.status.is_active() {
                active += 1;
            }
        }

        job.admission(active, now)
            .map_err(RepositoryError::Refused)?;

        tables.last_application_id += 1;
        let record = Application {
            id: ApplicationId(tables.last_application_id),
            job_id: application.job_id,
            applicant: application.applicant,
            cover_letter: application.cover_letter,
            status: ApplicationStatus::Pending,
            created_at: application.created_at,
            reviewed_at: None,
        };
        tables.applications.insert(record.id, record.clone());
        Ok(record)
    }

    fn transition_application(
        &self,
        updated: Application,
        expected: ApplicationStatus,
    ) -> Result<Application, RepositoryError> {
        let mut tables = self.lock()?;
        let slot = tables
            .applications
            .get_mut(&updated.id)
            .ok_or_else(|| RepositoryError::NotFound(updated.id.to_string()))?;
        if slot.status != expected {
            return Err(RepositoryError::StatusChanged {
                current: slot.status,
            });
        }
        *slot = updated.clone();
        Ok(updated)
    }

    fn fetch_application(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(self.lock()?.applications.get(&id).cloned())
    }

    fn applications(&self) -> Result<Vec<Application>, RepositoryError> {
        let rows = self.lock()?.applications.values().cloned().collect();
        Ok(applications_newest_first(rows))
    }

    fn applications_for_job(&self, job_id: JobId) -> Result<Vec<Application>, RepositoryError> {
        let rows = self
            .lock()?
            .applications
            .values()
            .filter(|application| application.job_id == job_id)
            .cloned()
            .collect();
        Ok(applications_newest_first(rows))
    }

    fn applications_filed_by(
        &self,
        applicant: PrincipalId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let rows = self
            .lock()?
            .applications
            .values()
            .filter(|application| application.applicant == applicant)
            .cloned()
            .collect();
        Ok(applications_newest_first(rows))
    }
}
