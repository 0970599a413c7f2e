use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::domain::{
    Application, ApplicationId, ApplicationStatus, JobChanges, JobDraft, JobId, JobPosting,
    JobStatus, JobView,
};
use super::error::BoardError;
use super::repository::{BoardRepository, NewApplication, NewJob};
use crate::access::{require, Action, ApplicationScope, ApplicationTarget, DenialReason};
use crate::accounts::{is_privileged, Principal, Role};
use crate::config::BoardConfig;
use crate::notifications::NotificationEvent;

pub const MIN_TITLE_CHARS: usize = 5;
pub const MAX_TITLE_CHARS: usize = 200;
pub const MIN_DESCRIPTION_CHARS: usize = 20;
pub const MAX_COVER_LETTER_CHARS: usize = 5_000;

/// Result of a state transition: the stored record plus the events it produced.
///
/// Delivering the events is the caller's job; see
/// [`NotificationDispatcher`](crate::notifications::NotificationDispatcher).
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Transition<T> {
    pub record: T,
    pub events: Vec<NotificationEvent>,
}

/// Service composing the authorization engine with the posting and application lifecycles.
pub struct JobBoardService<R> {
    repository: Arc<R>,
    config: BoardConfig,
}

fn authenticated(principal: Option<&Principal>) -> Result<&Principal, BoardError> {
    principal.ok_or(BoardError::NotAuthenticated)
}

fn require_role(principal: &Principal, role: Role) -> Result<(), BoardError> {
    if principal.role() == role {
        Ok(())
    } else {
        Err(BoardError::from(DenialReason::WrongRole))
    }
}

fn validate_title(title: &str) -> Result<String, BoardError> {
    let title = title.trim();
    let chars = title.chars().count();
    if chars < MIN_TITLE_CHARS {
        return Err(BoardError::validation(
            "title",
            format!("must be at least {MIN_TITLE_CHARS} characters"),
        ));
    }
    if chars > MAX_TITLE_CHARS {
        return Err(BoardError::validation(
            "title",
            format!("must be at most {MAX_TITLE_CHARS} characters"),
        ));
    }
    Ok(title.to_string())
}

fn validate_description(description: &str) -> Result<String, BoardError> {
    let description = description.trim();
    if description.chars().count() < MIN_DESCRIPTION_CHARS {
        return Err(BoardError::validation(
            "description",
            format!("must be at least {MIN_DESCRIPTION_CHARS} characters"),
        ));
    }
    Ok(description.to_string())
}

fn validate_capacity(max_applicants: u32) -> Result<u32, BoardError> {
    if max_applicants == 0 {
        return Err(BoardError::validation(
            "max_applicants",
            "must be a positive integer",
        ));
    }
    Ok(max_applicants)
}

impl<R> JobBoardService<R>
where
    R: BoardRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: BoardConfig) -> Self {
        Self { repository, config }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Post a job owned by the caller. New postings start as Draft unless Open is requested.
    pub fn create_job(
        &self,
        principal: Option<&Principal>,
        draft: JobDraft,
        now: DateTime<Utc>,
    ) -> Result<JobPosting, BoardError> {
        require(principal, Action::CreateJob)?;
        let principal = authenticated(principal)?;
        // Admins pass the gate above but a posting still needs a recruiter as its owner.
        require_role(principal, Role::Recruiter)?;

        let title = validate_title(&draft.title)?;
        let description = validate_description(&draft.description)?;
        let max_applicants = validate_capacity(
            draft
                .max_applicants
                .unwrap_or(self.config.default_max_applicants),
        )?;
        let status = draft.status.unwrap_or_default();
        if !matches!(status, JobStatus::Draft | JobStatus::Open) {
            return Err(BoardError::validation(
                "status",
                "new postings start as DRAFT or OPEN",
            ));
        }

        let job = self.repository.insert_job(NewJob {
            owner: principal.id(),
            title,
            description,
            status,
            deadline: draft.deadline,
            max_applicants,
            created_at: now,
        })?;

        info!(job = %job.id, owner = %job.owner, status = job.status.label(), "job posted");
        Ok(job)
    }

    /// Edit a posting. Status changes must follow the posting state machine.
    pub fn update_job(
        &self,
        principal: Option<&Principal>,
        job_id: JobId,
        changes: JobChanges,
        now: DateTime<Utc>,
    ) -> Result<JobPosting, BoardError> {
        let mut job = self.job(job_id)?;
        require(principal, Action::UpdateJob(&job))?;
        let expected = job.status;

        if let Some(title) = changes.title {
            job.title = validate_title(&title)?;
        }
        if let Some(description) = changes.description {
            job.description = validate_description(&description)?;
        }
        if let Some(max_applicants) = changes.max_applicants {
            job.max_applicants = validate_capacity(max_applicants)?;
        }
        if let Some(deadline) = changes.deadline {
            job.deadline = deadline;
        }
        if let Some(status) = changes.status {
            if !job.status.can_transition_to(status) {
                return Err(BoardError::InvalidState(format!(
                    "job cannot move from {} to {}",
                    job.status.label(),
                    status.label()
                )));
            }
            job.status = status;
        }
        job.updated_at = now;

        self.repository.update_job(job.clone(), expected)?;
        info!(job = %job.id, status = job.status.label(), "job updated");
        Ok(job)
    }

    /// Remove a posting along with its applications.
    pub fn delete_job(
        &self,
        principal: Option<&Principal>,
        job_id: JobId,
    ) -> Result<JobPosting, BoardError> {
        let job = self.job(job_id)?;
        require(principal, Action::DeleteJob(&job))?;
        let removed = self.repository.delete_job(job_id)?;
        info!(job = %removed.id, "job deleted");
        Ok(removed)
    }

    /// Public listing. Drafts are shown only to their owner and to admins.
    pub fn list_jobs(
        &self,
        principal: Option<&Principal>,
        now: DateTime<Utc>,
    ) -> Result<Vec<JobView>, BoardError> {
        require(principal, Action::ListJobs)?;
        self.repository
            .jobs()?
            .into_iter()
            .filter(|job| draft_visible(principal, job))
            .map(|job| self.view(principal, job, now))
            .collect()
    }

    pub fn get_job(
        &self,
        principal: Option<&Principal>,
        job_id: JobId,
        now: DateTime<Utc>,
    ) -> Result<JobView, BoardError> {
        let job = self.job(job_id)?;
        require(principal, Action::ViewJob(&job))?;
        if !draft_visible(principal, &job) {
            return Err(BoardError::NotFound(job_id.to_string()));
        }
        self.view(principal, job, now)
    }

    fn view(
        &self,
        principal: Option<&Principal>,
        job: JobPosting,
        now: DateTime<Utc>,
    ) -> Result<JobView, BoardError> {
        let applications = self.repository.applications_for_job(job.id)?;
        let active = applications
            .iter()
            .filter(|application| application.status.is_active())
            .count();
        let user_has_applied = principal
            .map(|caller| {
                applications
                    .iter()
                    .any(|application| application.applicant == caller.id())
            })
            .unwrap_or(false);
        let can_apply = principal
            .map(|caller| {
                caller.role() == Role::Seeker
                    && caller.id() != job.owner
                    && !user_has_applied
                    && job.can_accept(active, now)
            })
            .unwrap_or(false);

        Ok(JobView {
            applications_count: applications.len(),
            is_expired: job.is_expired(now),
            can_apply,
            user_has_applied,
            job,
        })
    }

    /// File an application for the caller and notify the posting's owner.
    pub fn submit_application(
        &self,
        principal: Option<&Principal>,
        job_id: JobId,
        cover_letter: &str,
        now: DateTime<Utc>,
    ) -> Result<Transition<Application>, BoardError> {
        require(principal, Action::CreateApplication)?;
        let principal = authenticated(principal)?;
        require_role(principal, Role::Seeker)?;

        let job = self.job(job_id)?;
        if job.owner == principal.id() {
            return Err(BoardError::from(DenialReason::SelfApplication));
        }

        let cover_letter = cover_letter.trim();
        if cover_letter.chars().count() > MAX_COVER_LETTER_CHARS {
            return Err(BoardError::validation(
                "cover_letter",
                format!("must be at most {MAX_COVER_LETTER_CHARS} characters"),
            ));
        }

        let application = self.repository.insert_application(
            NewApplication {
                job_id,
                applicant: principal.id(),
                cover_letter: cover_letter.to_string(),
                created_at: now,
            },
            now,
        )?;

        info!(
            application = %application.id,
            job = %job.id,
            applicant = %application.applicant,
            "application submitted"
        );

        let event =
            NotificationEvent::application_received(job.owner, job.id, &job.title, application.id);
        Ok(Transition {
            record: application,
            events: vec![event],
        })
    }

    /// Record the posting owner's decision and notify the applicant.
    pub fn review_application(
        &self,
        principal: Option<&Principal>,
        application_id: ApplicationId,
        decision: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> Result<Transition<Application>, BoardError> {
        let (application, job) = self.application_with_job(application_id)?;
        require(
            principal,
            Action::ReviewApplication(ApplicationTarget::new(&application, &job)),
        )?;
        let principal = authenticated(principal)?;
        if job.owner != principal.id() && !is_privileged(principal) {
            return Err(BoardError::from(DenialReason::NotOwner));
        }

        if !decision.is_review_outcome() {
            return Err(BoardError::validation(
                "status",
                "review outcome must be ACCEPTED or REJECTED",
            ));
        }

        let updated = Application {
            status: decision,
            reviewed_at: Some(now),
            ..application
        };
        let record = self.leave_pending(updated)?;

        info!(
            application = %record.id,
            reviewer = %principal.id(),
            status = record.status.label(),
            "application reviewed"
        );

        let event = NotificationEvent::status_changed(
            record.applicant,
            job.id,
            &job.title,
            record.id,
            ApplicationStatus::Pending,
            record.status,
        );
        Ok(Transition {
            record,
            events: vec![event],
        })
    }

    /// Pull back a pending application. Only the applicant is told; the recruiter is not.
    pub fn withdraw_application(
        &self,
        principal: Option<&Principal>,
        application_id: ApplicationId,
        now: DateTime<Utc>,
    ) -> Result<Transition<Application>, BoardError> {
        let (application, job) = self.application_with_job(application_id)?;
        require(
            principal,
            Action::WithdrawApplication(ApplicationTarget::new(&application, &job)),
        )?;
        let principal = authenticated(principal)?;
        if application.applicant != principal.id() {
            return Err(BoardError::from(DenialReason::NotOwner));
        }

        let updated = Application {
            status: ApplicationStatus::Withdrawn,
            reviewed_at: Some(now),
            ..application
        };
        let record = self.leave_pending(updated)?;

        info!(application = %record.id, at = %now, "application withdrawn");

        let event = NotificationEvent::status_changed(
            record.applicant,
            job.id,
            &job.title,
            record.id,
            ApplicationStatus::Pending,
            ApplicationStatus::Withdrawn,
        );
        Ok(Transition {
            record,
            events: vec![event],
        })
    }

    /// Applications visible to the caller, newest first.
    pub fn list_applications(
        &self,
        principal: Option<&Principal>,
    ) -> Result<Vec<Application>, BoardError> {
        require(principal, Action::ListApplications)?;
        let scope = ApplicationScope::for_principal(authenticated(principal)?);

        let applications = match scope {
            ApplicationScope::Nothing => return Ok(Vec::new()),
            ApplicationScope::FiledBy(applicant) => {
                return Ok(self.repository.applications_filed_by(applicant)?)
            }
            ApplicationScope::Everything | ApplicationScope::PostedBy(_) => {
                self.repository.applications()?
            }
        };

        let jobs: HashMap<JobId, JobPosting> = self
            .repository
            .jobs()?
            .into_iter()
            .map(|job| (job.id, job))
            .collect();

        Ok(applications
            .into_iter()
            .filter(|application| {
                jobs.get(&application.job_id)
                    .map(|job| scope.includes(application, job))
                    .unwrap_or(false)
            })
            .collect())
    }

    pub fn get_application(
        &self,
        principal: Option<&Principal>,
        application_id: ApplicationId,
    ) -> Result<Application, BoardError> {
        let (application, job) = self.application_with_job(application_id)?;
        require(
            principal,
            Action::ViewApplication(ApplicationTarget::new(&application, &job)),
        )?;
        Ok(application)
    }

    fn job(&self, job_id: JobId) -> Result<JobPosting, BoardError> {
        self.repository
            .fetch_job(job_id)?
            .ok_or_else(|| BoardError::NotFound(job_id.to_string()))
    }

    fn application_with_job(
        &self,
        application_id: ApplicationId,
    ) -> Result<(Application, JobPosting), BoardError> {
        let application = self
            .repository
            .fetch_application(application_id)?
            .ok_or_else(|| BoardError::NotFound(application_id.to_string()))?;
        let job = self.job(application.job_id)?;
        Ok((application, job))
    }

    /// Compare-and-set out of Pending; a concurrent transition surfaces as `InvalidState`.
    fn leave_pending(&self, updated: Application) -> Result<Application, BoardError> {
        Ok(self
            .repository
            .transition_application(updated, ApplicationStatus::Pending)?)
    }
}

fn draft_visible(principal: Option<&Principal>, job: &JobPosting) -> bool {
    job.status != JobStatus::Draft
        || principal
            .map(|caller| caller.id() == job.owner || is_privileged(caller))
            .unwrap_or(false)
}
