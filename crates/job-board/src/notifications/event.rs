use serde::{Deserialize, Serialize};

use crate::accounts::PrincipalId;
use crate::board::domain::{ApplicationId, ApplicationStatus, JobId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    ApplicationReceived,
    ApplicationStatusChanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub job_id: JobId,
    pub job_title: String,
    pub application_id: ApplicationId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<ApplicationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_status: Option<ApplicationStatus>,
}

/// A state change destined for one principal. The board forgets about it once returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub recipient: PrincipalId,
    pub kind: NotificationKind,
    pub payload: NotificationPayload,
}

impl NotificationEvent {
    pub fn application_received(
        recipient: PrincipalId,
        job_id: JobId,
        job_title: &str,
        application_id: ApplicationId,
    ) -> Self {
        Self {
            recipient,
            kind: NotificationKind::ApplicationReceived,
            payload: NotificationPayload {
                job_id,
                job_title: job_title.to_string(),
                application_id,
                previous_status: None,
                new_status: None,
            },
        }
    }

    pub fn status_changed(
        recipient: PrincipalId,
        job_id: JobId,
        job_title: &str,
        application_id: ApplicationId,
        previous: ApplicationStatus,
        next: ApplicationStatus,
    ) -> Self {
        Self {
            recipient,
            kind: NotificationKind::ApplicationStatusChanged,
            payload: NotificationPayload {
                job_id,
                job_title: job_title.to_string(),
                application_id,
                previous_status: Some(previous),
                new_status: Some(next),
            },
        }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            NotificationKind::ApplicationReceived => "New application received",
            NotificationKind::ApplicationStatusChanged => "Application status updated",
        }
    }

    pub fn message(&self) -> String {
        let payload = &self.payload;
        match (self.kind, payload.previous_status, payload.new_status) {
            (NotificationKind::ApplicationStatusChanged, Some(previous), Some(next)) => format!(
                "Status for '{}' changed: {} -> {}",
                payload.job_title,
                previous.label(),
                next.label()
            ),
            (NotificationKind::ApplicationStatusChanged, _, _) => {
                format!("Status for '{}' changed", payload.job_title)
            }
            (NotificationKind::ApplicationReceived, _, _) => format!(
                "{} was submitted for '{}'",
                payload.application_id, payload.job_title
            ),
        }
    }
}
