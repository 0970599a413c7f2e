use crate::board::domain::{Application, JobPosting};
use crate::portfolio::Project;

/// An application together with the posting it was filed against.
#[derive(Debug, Clone, Copy)]
pub struct ApplicationTarget<'a> {
    pub application: &'a Application,
    pub job: &'a JobPosting,
}

impl<'a> ApplicationTarget<'a> {
    pub fn new(application: &'a Application, job: &'a JobPosting) -> Self {
        Self { application, job }
    }
}

/// Intended operation, carrying the record it targets where the rule depends on ownership.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    ListJobs,
    ViewJob(&'a JobPosting),
    CreateJob,
    UpdateJob(&'a JobPosting),
    DeleteJob(&'a JobPosting),
    CreateApplication,
    ListApplications,
    ViewApplication(ApplicationTarget<'a>),
    ReviewApplication(ApplicationTarget<'a>),
    WithdrawApplication(ApplicationTarget<'a>),
    /// Read or edit the caller's own seeker profile.
    ManageSeekerProfile,
    /// Read or edit the caller's own recruiter profile.
    ManageRecruiterProfile,
    ListProjects,
    ViewProject(&'a Project),
    ListOwnProjects,
    CreateProject,
    UpdateProject(&'a Project),
    DeleteProject(&'a Project),
    ListProjectTags,
    ManageProjectTags,
}

impl Action<'_> {
    pub const fn name(&self) -> &'static str {
        match self {
            Action::ListJobs => "list_jobs",
            Action::ViewJob(_) => "view_job",
            Action::CreateJob => "create_job",
            Action::UpdateJob(_) => "update_job",
            Action::DeleteJob(_) => "delete_job",
            Action::CreateApplication => "create_application",
            Action::ListApplications => "list_applications",
            Action::ViewApplication(_) => "view_application",
            Action::ReviewApplication(_) => "review_application",
            Action::WithdrawApplication(_) => "withdraw_application",
            Action::ManageSeekerProfile => "manage_seeker_profile",
            Action::ManageRecruiterProfile => "manage_recruiter_profile",
            Action::ListProjects => "list_projects",
            Action::ViewProject(_) => "view_project",
            Action::ListOwnProjects => "list_own_projects",
            Action::CreateProject => "create_project",
            Action::UpdateProject(_) => "update_project",
            Action::DeleteProject(_) => "delete_project",
            Action::ListProjectTags => "list_project_tags",
            Action::ManageProjectTags => "manage_project_tags",
        }
    }

    /// Public reads need no principal at all.
    pub const fn is_public(&self) -> bool {
        matches!(
            self,
            Action::ListJobs | Action::ViewJob(_) | Action::ListProjects | Action::ViewProject(_)
        )
    }
}
