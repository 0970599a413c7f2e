use crate::infra::{board_state, BoardState};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use job_board::accounts::{Principal, Role};
use job_board::board::{
    Application, ApplicationStatus, BoardError, JobDraft, JobPosting, JobStatus,
};
use job_board::config::BoardConfig;
use job_board::error::AppError;
use job_board::notifications::{Notification, NotificationInbox};
use job_board::stats::RecruiterOverview;
use serde::Serialize;
use std::io;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Capacity of the demo posting
    #[arg(long, default_value_t = 2)]
    pub(crate) max_applicants: u32,
    /// How many seekers try to apply
    #[arg(long, default_value_t = 3)]
    pub(crate) seekers: u32,
    /// Print the outcome as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Serialize)]
struct SubmissionOutcome {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    application: Option<Application>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refused: Option<String>,
}

#[derive(Debug, Serialize)]
struct InboxSnapshot {
    email: String,
    notifications: Vec<Notification>,
}

#[derive(Debug, Serialize)]
struct DemoReport {
    job: JobPosting,
    submissions: Vec<SubmissionOutcome>,
    inboxes: Vec<InboxSnapshot>,
    recruiter_stats: RecruiterOverview,
}

struct Member {
    email: String,
    principal: Principal,
}

fn enroll(
    state: &BoardState,
    email: &str,
    role: Role,
    now: DateTime<Utc>,
) -> Result<Member, AppError> {
    let account = state.accounts.register(email, now)?;
    let principal = state.accounts.select_role(&account.principal, role)?;
    Ok(Member {
        email: account.email,
        principal,
    })
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let state = board_state(BoardConfig::default());
    let started = Utc::now();

    let recruiter = enroll(&state, "hiring@demo.example", Role::Recruiter, started)?;
    let seekers = (1..=args.seekers)
        .map(|n| enroll(&state, &format!("seeker{n}@demo.example"), Role::Seeker, started))
        .collect::<Result<Vec<_>, _>>()?;

    let job = state.board.create_job(
        Some(&recruiter.principal),
        JobDraft {
            title: "Platform reliability engineer".to_string(),
            description: "Keep the hiring platform fast, observable and boring".to_string(),
            status: Some(JobStatus::Open),
            deadline: Some(started + Duration::days(14)),
            max_applicants: Some(args.max_applicants),
        },
        started,
    )?;

    let mut submissions = Vec::with_capacity(seekers.len());
    for (offset, seeker) in seekers.iter().enumerate() {
        let at = started + Duration::minutes(offset as i64 + 1);
        match state
            .board
            .submit_application(Some(&seeker.principal), job.id, "Keen to help", at)
        {
            Ok(transition) => {
                state.notifications.dispatch(&transition.events, at);
                submissions.push(SubmissionOutcome {
                    email: seeker.email.clone(),
                    application: Some(transition.record),
                    refused: None,
                });
            }
            Err(err) => submissions.push(SubmissionOutcome {
                email: seeker.email.clone(),
                application: None,
                refused: Some(err.to_string()),
            }),
        }
    }

    let reviewed_at = started + Duration::hours(1);
    let admitted: Vec<_> = submissions
        .iter_mut()
        .filter_map(|outcome| outcome.application.as_mut())
        .collect();
    for (index, application) in admitted.into_iter().enumerate() {
        let decision = if index == 0 {
            ApplicationStatus::Accepted
        } else {
            ApplicationStatus::Rejected
        };
        let transition = state.board.review_application(
            Some(&recruiter.principal),
            application.id,
            decision,
            reviewed_at,
        )?;
        state.notifications.dispatch(&transition.events, reviewed_at);
        *application = transition.record;
    }

    let inbox = state.notifications.inbox();
    let mut inboxes = Vec::with_capacity(seekers.len() + 1);
    for member in std::iter::once(&recruiter).chain(seekers.iter()) {
        inboxes.push(InboxSnapshot {
            email: member.email.clone(),
            notifications: inbox
                .list(member.principal.id())
                .map_err(BoardError::from)?,
        });
    }

    let recruiter_stats = state
        .stats
        .recruiter_overview(&recruiter.principal, reviewed_at)?;

    let report = DemoReport {
        job,
        submissions,
        inboxes,
        recruiter_stats,
    };

    if args.json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|err| AppError::Io(io::Error::new(io::ErrorKind::Other, err)))?;
        println!("{rendered}");
    } else {
        render(&report);
    }
    Ok(())
}

fn render(report: &DemoReport) {
    println!("Job board demo");
    println!(
        "Posted {} \"{}\" ({}, capacity {})",
        report.job.id,
        report.job.title,
        report.job.status.label(),
        report.job.max_applicants
    );

    println!("\nSubmissions");
    for outcome in &report.submissions {
        match (&outcome.application, &outcome.refused) {
            (Some(application), _) => println!(
                "  - {}: {} ({})",
                outcome.email,
                application.id,
                application.status.label()
            ),
            (None, Some(reason)) => println!("  - {}: refused, {}", outcome.email, reason),
            (None, None) => println!("  - {}: no outcome", outcome.email),
        }
    }

    println!("\nInboxes");
    for snapshot in &report.inboxes {
        println!("  {} ({} notifications)", snapshot.email, snapshot.notifications.len());
        for notification in &snapshot.notifications {
            println!("    * {}: {}", notification.title, notification.message);
        }
    }

    let stats = &report.recruiter_stats;
    println!(
        "\nRecruiter overview: {} job(s), {} application(s)",
        stats.jobs_total, stats.applications_total
    );
    for day in stats
        .daily_applications
        .iter()
        .filter(|day| day.applications > 0)
    {
        println!("  {}: {}", day.date, day.applications);
    }
}
