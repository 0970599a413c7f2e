use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::domain::{
    tag_name, Project, ProjectChanges, ProjectDraft, ProjectId, ProjectTag, TagId,
};
use super::repository::{NewProject, PortfolioRepository};
use crate::access::{require, Action};
use crate::accounts::{is_privileged, Principal};
use crate::board::BoardError;

/// Portfolio projects and the staff-curated tag catalogue.
///
/// Anyone may browse public projects. Signed-in callers manage their own projects; only admins
/// manage tags.
pub struct PortfolioService<P> {
    repository: Arc<P>,
}

impl<P> PortfolioService<P>
where
    P: PortfolioRepository + 'static,
{
    pub fn new(repository: Arc<P>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &Arc<P> {
        &self.repository
    }

    /// Public projects only, newest first. Owners see their private ones through
    /// [`Self::my_projects`].
    pub fn list_projects(&self, principal: Option<&Principal>) -> Result<Vec<Project>, BoardError> {
        require(principal, Action::ListProjects)?;
        Ok(self
            .repository
            .projects()?
            .into_iter()
            .filter(|project| project.is_public)
            .collect())
    }

    pub fn get_project(
        &self,
        principal: Option<&Principal>,
        id: ProjectId,
    ) -> Result<Project, BoardError> {
        let project = self.project(id)?;
        require(principal, Action::ViewProject(&project))?;
        if !visible(principal, &project) {
            return Err(BoardError::NotFound(id.to_string()));
        }
        Ok(project)
    }

    /// Every project the caller owns, private ones included.
    pub fn my_projects(&self, principal: Option<&Principal>) -> Result<Vec<Project>, BoardError> {
        require(principal, Action::ListOwnProjects)?;
        let principal = principal.ok_or(BoardError::NotAuthenticated)?;
        Ok(self.repository.projects_owned_by(principal.id())?)
    }

    pub fn create_project(
        &self,
        principal: Option<&Principal>,
        draft: ProjectDraft,
        now: DateTime<Utc>,
    ) -> Result<Project, BoardError> {
        require(principal, Action::CreateProject)?;
        let principal = principal.ok_or(BoardError::NotAuthenticated)?;
        let draft = draft.validated()?;

        let project = self.repository.insert_project(NewProject {
            owner: principal.id(),
            title: draft.title,
            summary: draft.summary,
            repo_url: draft.repo_url,
            demo_url: draft.demo_url,
            tech_stack: draft.tech_stack,
            is_public: draft.is_public,
            tag_ids: draft.tag_ids,
            created_at: now,
        })?;
        info!(
            project = %project.id,
            owner = %project.owner,
            is_public = project.is_public,
            "project created"
        );
        Ok(project)
    }

    pub fn update_project(
        &self,
        principal: Option<&Principal>,
        id: ProjectId,
        changes: ProjectChanges,
        now: DateTime<Utc>,
    ) -> Result<Project, BoardError> {
        let project = self.project(id)?;
        require(principal, Action::UpdateProject(&project))?;
        let project = self
            .repository
            .update_project(id, changes.validated()?, now)?;
        info!(project = %project.id, "project updated");
        Ok(project)
    }

    pub fn delete_project(
        &self,
        principal: Option<&Principal>,
        id: ProjectId,
    ) -> Result<Project, BoardError> {
        let project = self.project(id)?;
        require(principal, Action::DeleteProject(&project))?;
        let removed = self.repository.delete_project(id)?;
        info!(project = %removed.id, "project deleted");
        Ok(removed)
    }

    pub fn list_tags(&self, principal: Option<&Principal>) -> Result<Vec<ProjectTag>, BoardError> {
        require(principal, Action::ListProjectTags)?;
        Ok(self.repository.tags()?)
    }

    pub fn create_tag(
        &self,
        principal: Option<&Principal>,
        name: &str,
    ) -> Result<ProjectTag, BoardError> {
        require(principal, Action::ManageProjectTags)?;
        let tag = self.repository.insert_tag(tag_name(name)?)?;
        info!(tag = %tag.id, name = %tag.name, "project tag created");
        Ok(tag)
    }

    pub fn delete_tag(
        &self,
        principal: Option<&Principal>,
        id: TagId,
    ) -> Result<ProjectTag, BoardError> {
        require(principal, Action::ManageProjectTags)?;
        let tag = self.repository.delete_tag(id)?;
        info!(tag = %tag.id, "project tag deleted");
        Ok(tag)
    }

    fn project(&self, id: ProjectId) -> Result<Project, BoardError> {
        self.repository
            .fetch_project(id)?
            .ok_or_else(|| BoardError::NotFound(id.to_string()))
    }
}

fn visible(principal: Option<&Principal>, project: &Project) -> bool {
    project.is_public
        || principal
            .map(|caller| caller.id() == project.owner || is_privileged(caller))
            .unwrap_or(false)
}
