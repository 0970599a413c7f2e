use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::domain::{Project, ProjectChanges, ProjectId, ProjectTag, TagId};
use super::repository::{NewProject, PortfolioRepository};
use crate::accounts::PrincipalId;
use crate::board::RepositoryError;

#[derive(Debug, Default)]
struct Tables {
    projects: BTreeMap<ProjectId, Project>,
    tags: BTreeMap<TagId, ProjectTag>,
    last_project_id: u64,
    last_tag_id: u64,
}

impl Tables {
    fn resolve(&self, ids: &[TagId]) -> Result<Vec<ProjectTag>, RepositoryError> {
        let mut tags = ids
            .iter()
            .map(|id| {
                self.tags
                    .get(id)
                    .cloned()
                    .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }
}

/// Portfolio store behind one mutex.
#[derive(Debug, Default)]
pub struct InMemoryPortfolioStore {
    tables: Mutex<Tables>,
}

impl InMemoryPortfolioStore {
    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("portfolio store mutex poisoned".to_string()))
    }
}

fn newest_first<'a>(projects: impl Iterator<Item = &'a Project>) -> Vec<Project> {
    let mut listed: Vec<Project> = projects.cloned().collect();
    listed.sort_by(|a, b| b.id.cmp(&a.id));
    listed
}

impl PortfolioRepository for InMemoryPortfolioStore {
    fn insert_project(&self, project: NewProject) -> Result<Project, RepositoryError> {
        let mut tables = self.lock()?;
        let tags = tables.resolve(&project.tag_ids)?;
        tables.last_project_id += 1;
        let record = Project {
            id: ProjectId(tables.last_project_id),
            owner: project.owner,
            title: project.title,
            summary: project.summary,
            repo_url: project.repo_url,
            demo_url: project.demo_url,
            tech_stack: project.tech_stack,
            is_public: project.is_public,
            tags,
            created_at: project.created_at,
            updated_at: project.created_at,
        };
        tables.projects.insert(record.id, record.clone());
        Ok(record)
    }

    fn update_project(
        &self,
        id: ProjectId,
        changes: ProjectChanges,
        now: DateTime<Utc>,
    ) -> Result<Project, RepositoryError> {
        let mut tables = self.lock()?;
        let tags = changes
            .tag_ids
            .as_deref()
            .map(|ids| tables.resolve(ids))
            .transpose()?;
        let project = tables
            .projects
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;

        if let Some(title) = changes.title {
            project.title = title;
        }
        if let Some(summary) = changes.summary {
            project.summary = summary;
        }
        if let Some(repo_url) = changes.repo_url {
            project.repo_url = repo_url;
        }
        if let Some(demo_url) = changes.demo_url {
            project.demo_url = demo_url;
        }
        if let Some(tech_stack) = changes.tech_stack {
            project.tech_stack = tech_stack;
        }
        if let Some(is_public) = changes.is_public {
            project.is_public = is_public;
        }
        if let Some(tags) = tags {
            project.tags = tags;
        }
        project.updated_at = now;
        Ok(project.clone())
    }

    fn delete_project(&self, id: ProjectId) -> Result<Project, RepositoryError> {
        self.lock()?
            .projects
            .remove(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    fn fetch_project(&self, id: ProjectId) -> Result<Option<Project>, RepositoryError> {
        Ok(self.lock()?.projects.get(&id).cloned())
    }

    fn projects(&self) -> Result<Vec<Project>, RepositoryError> {
        Ok(newest_first(self.lock()?.projects.values()))
    }

    fn projects_owned_by(&self, owner: PrincipalId) -> Result<Vec<Project>, RepositoryError> {
        Ok(newest_first(
            self.lock()?
                .projects
                .values()
                .filter(|project| project.owner == owner),
        ))
    }

    fn insert_tag(&self, name: String) -> Result<ProjectTag, RepositoryError> {
        let mut tables = self.lock()?;
        let key = name.to_lowercase();
        if tables.tags.values().any(|tag| tag.name.to_lowercase() == key) {
            return Err(RepositoryError::DuplicateTag(name));
        }
        tables.last_tag_id += 1;
        let tag = ProjectTag {
            id: TagId(tables.last_tag_id),
            name,
        };
        tables.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    fn delete_tag(&self, id: TagId) -> Result<ProjectTag, RepositoryError> {
        let mut tables = self.lock()?;
        let removed = tables
            .tags
            .remove(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        for project in tables.projects.values_mut() {
            project.tags.retain(|tag| tag.id != id);
        }
        Ok(removed)
    }

    fn tags(&self) -> Result<Vec<ProjectTag>, RepositoryError> {
        let mut tags: Vec<ProjectTag> = self.lock()?.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }
}
