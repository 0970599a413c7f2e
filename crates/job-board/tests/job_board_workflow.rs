//! Integration scenarios for the job board lifecycle.
//!
//! Scenarios go through the public service facade only: accounts pick roles, recruiters post,
//! seekers apply concurrently, and every transition's events land in the right inbox.

mod common {
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};

    use job_board::accounts::{AccountService, InMemoryAccountStore, Principal, Role};
    use job_board::board::{InMemoryBoardStore, JobBoardService, JobDraft, JobStatus};
    use job_board::config::BoardConfig;
    use job_board::notifications::{InMemoryInbox, NotificationDispatcher};

    pub(super) fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 3, 14, 0, 0).unwrap()
    }

    pub(super) struct Board {
        pub(super) accounts: AccountService<InMemoryAccountStore>,
        pub(super) jobs: Arc<JobBoardService<InMemoryBoardStore>>,
        pub(super) dispatcher: NotificationDispatcher<InMemoryInbox>,
    }

    pub(super) fn board() -> Board {
        let config = BoardConfig::default();
        Board {
            accounts: AccountService::new(Arc::new(InMemoryAccountStore::default())),
            jobs: Arc::new(JobBoardService::new(
                Arc::new(InMemoryBoardStore::default()),
                config,
            )),
            dispatcher: NotificationDispatcher::new(
                Arc::new(InMemoryInbox::default()),
                config.delivery_attempts,
            ),
        }
    }

    impl Board {
        pub(super) fn enroll(&self, email: &str, role: Role) -> Principal {
            let account = self.accounts.register(email, now()).expect("register");
            self.accounts
                .select_role(&account.principal, role)
                .expect("select role")
        }
    }

    pub(super) fn open_draft(max_applicants: u32) -> JobDraft {
        JobDraft {
            title: "Mobile engineer".to_string(),
            description: "Ship the candidate app on both platforms".to_string(),
            status: Some(JobStatus::Open),
            deadline: None,
            max_applicants: Some(max_applicants),
        }
    }
}

use std::sync::{Arc, Barrier};
use std::thread;

use common::*;
use job_board::accounts::Role;
use job_board::board::{ApplicationStatus, BoardError};
use job_board::notifications::{NotificationInbox, NotificationKind};

#[test]
fn concurrent_submissions_never_exceed_capacity() {
    let board = board();
    let owner = board.enroll("owner@example.com", Role::Recruiter);
    let job = board
        .jobs
        .create_job(Some(&owner), open_draft(3), now())
        .expect("job");
    let job_id = job.id;

    let applicants: Vec<_> = (0..12)
        .map(|n| board.enroll(&format!("seeker{n}@example.com"), Role::Seeker))
        .collect();
    let barrier = Arc::new(Barrier::new(applicants.len()));

    let handles: Vec<_> = applicants
        .into_iter()
        .map(|applicant| {
            let jobs = Arc::clone(&board.jobs);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                jobs.submit_application(Some(&applicant), job_id, "", now())
            })
        })
        .collect();

    let mut admitted = 0;
    for handle in handles {
        match handle.join().expect("thread completes") {
            Ok(_) => admitted += 1,
            Err(BoardError::InvalidState(_)) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(admitted, 3);

    let listed = board
        .jobs
        .list_applications(Some(&owner))
        .expect("owner lists");
    let active = listed
        .iter()
        .filter(|application| application.status.is_active())
        .count();
    assert_eq!(active, 3);
}

#[test]
fn duplicate_racing_submissions_admit_exactly_one() {
    let board = board();
    let owner = board.enroll("owner@example.com", Role::Recruiter);
    let applicant = board.enroll("eager@example.com", Role::Seeker);
    let job = board
        .jobs
        .create_job(Some(&owner), open_draft(10), now())
        .expect("job");
    let job_id = job.id;
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let jobs = Arc::clone(&board.jobs);
            let barrier = Arc::clone(&barrier);
            let applicant = applicant.clone();
            thread::spawn(move || {
                barrier.wait();
                jobs.submit_application(Some(&applicant), job_id, "", now())
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread completes"))
        .collect();
    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|result| result.as_ref().err())
        .all(|error| matches!(error, BoardError::Conflict(_))));
}

#[test]
fn full_lifecycle_delivers_notifications_to_each_side() {
    let board = board();
    let owner = board.enroll("hiring@example.com", Role::Recruiter);
    let accepted = board.enroll("first@example.com", Role::Seeker);
    let withdrawn = board.enroll("second@example.com", Role::Seeker);

    let job = board
        .jobs
        .create_job(Some(&owner), open_draft(5), now())
        .expect("job");

    let first = board
        .jobs
        .submit_application(Some(&accepted), job.id, "Hello", now())
        .expect("apply");
    board.dispatcher.dispatch(&first.events, now());
    let second = board
        .jobs
        .submit_application(Some(&withdrawn), job.id, "Hi", now())
        .expect("apply");
    board.dispatcher.dispatch(&second.events, now());

    let review = board
        .jobs
        .review_application(
            Some(&owner),
            first.record.id,
            ApplicationStatus::Accepted,
            now(),
        )
        .expect("review");
    board.dispatcher.dispatch(&review.events, now());

    let withdrawal = board
        .jobs
        .withdraw_application(Some(&withdrawn), second.record.id, now())
        .expect("withdraw");
    assert_eq!(withdrawal.record.reviewed_at, Some(now()));
    board.dispatcher.dispatch(&withdrawal.events, now());
    assert_eq!(board.dispatcher.pending(), 0);

    let inbox = board.dispatcher.inbox();
    let owner_inbox = inbox.list(owner.id()).expect("owner inbox");
    assert_eq!(owner_inbox.len(), 2, "withdrawal does not reach the recruiter");
    assert!(owner_inbox
        .iter()
        .all(|notification| notification.kind == NotificationKind::ApplicationReceived));

    let accepted_inbox = inbox.list(accepted.id()).expect("seeker inbox");
    assert_eq!(accepted_inbox.len(), 1);
    assert_eq!(
        accepted_inbox[0].payload.new_status,
        Some(ApplicationStatus::Accepted)
    );

    let withdrawn_inbox = inbox.list(withdrawn.id()).expect("seeker inbox");
    assert_eq!(withdrawn_inbox.len(), 1);
    assert_eq!(
        withdrawn_inbox[0].payload.new_status,
        Some(ApplicationStatus::Withdrawn)
    );
}
