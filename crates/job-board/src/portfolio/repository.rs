use chrono::{DateTime, Utc};

use super::domain::{Project, ProjectChanges, ProjectId, ProjectTag, TagId};
use crate::accounts::PrincipalId;
use crate::board::RepositoryError;

/// Project fields validated by the service, waiting for the store to assign an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub owner: PrincipalId,
    pub title: String,
    pub summary: String,
    pub repo_url: String,
    pub demo_url: String,
    pub tech_stack: Vec<String>,
    pub is_public: bool,
    pub tag_ids: Vec<TagId>,
    pub created_at: DateTime<Utc>,
}

/// Storage abstraction for portfolio projects and the shared tag catalogue.
///
/// Tag ids are resolved under the store's lock; an unknown id is `NotFound`. Deleting a tag
/// detaches it from every project. Project listings are newest first, tags sorted by name.
pub trait PortfolioRepository: Send + Sync {
    fn insert_project(&self, project: NewProject) -> Result<Project, RepositoryError>;
    /// Applies already validated `changes` to the stored project.
    fn update_project(
        &self,
        id: ProjectId,
        changes: ProjectChanges,
        now: DateTime<Utc>,
    ) -> Result<Project, RepositoryError>;
    fn delete_project(&self, id: ProjectId) -> Result<Project, RepositoryError>;
    fn fetch_project(&self, id: ProjectId) -> Result<Option<Project>, RepositoryError>;
    fn projects(&self) -> Result<Vec<Project>, RepositoryError>;
    fn projects_owned_by(&self, owner: PrincipalId) -> Result<Vec<Project>, RepositoryError>;

    /// Names are unique ignoring case.
    fn insert_tag(&self, name: String) -> Result<ProjectTag, RepositoryError>;
    fn delete_tag(&self, id: TagId) -> Result<ProjectTag, RepositoryError>;
    fn tags(&self) -> Result<Vec<ProjectTag>, RepositoryError>;
}
