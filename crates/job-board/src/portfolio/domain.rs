use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::accounts::profile::{link, tidy_list};
use crate::accounts::PrincipalId;
use crate::board::BoardError;

pub const MAX_PROJECT_TITLE_CHARS: usize = 120;
pub const MAX_TAG_CHARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub u64);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "project-{:06}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(pub u64);

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tag-{}", self.0)
    }
}

/// Staff-curated label that owners attach to their projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTag {
    pub id: TagId,
    pub name: String,
}

/// A portfolio entry. Private projects are visible to their owner and admins only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub owner: PrincipalId,
    pub title: String,
    pub summary: String,
    pub repo_url: String,
    pub demo_url: String,
    pub tech_stack: Vec<String>,
    pub is_public: bool,
    /// Sorted by name.
    pub tags: Vec<ProjectTag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn public_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub repo_url: String,
    #[serde(default)]
    pub demo_url: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default = "public_by_default")]
    pub is_public: bool,
    #[serde(default)]
    pub tag_ids: Vec<TagId>,
}

impl ProjectDraft {
    pub fn validated(self) -> Result<Self, BoardError> {
        Ok(Self {
            title: project_title(&self.title)?,
            summary: self.summary.trim().to_string(),
            repo_url: link("repo_url", &self.repo_url)?,
            demo_url: link("demo_url", &self.demo_url)?,
            tech_stack: tidy_list(&self.tech_stack),
            is_public: self.is_public,
            tag_ids: dedup_tags(self.tag_ids),
        })
    }
}

/// Partial edit of a project; absent fields stay untouched. `tag_ids` replaces the whole set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectChanges {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub is_public: Option<bool>,
    pub tag_ids: Option<Vec<TagId>>,
}

impl ProjectChanges {
    pub fn validated(self) -> Result<Self, BoardError> {
        Ok(Self {
            title: self.title.map(|title| project_title(&title)).transpose()?,
            summary: self.summary.map(|summary| summary.trim().to_string()),
            repo_url: self.repo_url.map(|url| link("repo_url", &url)).transpose()?,
            demo_url: self.demo_url.map(|url| link("demo_url", &url)).transpose()?,
            tech_stack: self.tech_stack.map(|items| tidy_list(&items)),
            is_public: self.is_public,
            tag_ids: self.tag_ids.map(dedup_tags),
        })
    }
}

fn project_title(title: &str) -> Result<String, BoardError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(BoardError::validation("title", "must not be empty"));
    }
    if title.chars().count() > MAX_PROJECT_TITLE_CHARS {
        return Err(BoardError::validation(
            "title",
            format!("must be at most {MAX_PROJECT_TITLE_CHARS} characters"),
        ));
    }
    Ok(title.to_string())
}

/// Tag names are trimmed and compared case-insensitively by the store.
pub fn tag_name(name: &str) -> Result<String, BoardError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_TAG_CHARS {
        return Err(BoardError::validation(
            "name",
            format!("must be 1 to {MAX_TAG_CHARS} characters"),
        ));
    }
    Ok(name.to_string())
}

fn dedup_tags(mut ids: Vec<TagId>) -> Vec<TagId> {
    ids.sort();
    ids.dedup();
    ids
}
