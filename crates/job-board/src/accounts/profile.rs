use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::principal::PrincipalId;
use super::store::Account;
use crate::board::domain::double_option;
use crate::board::BoardError;

const MAX_NAME_CHARS: usize = 120;
const MAX_HEADLINE_CHARS: usize = 160;
const MAX_COMPANY_SIZE_CHARS: usize = 80;
const MAX_NOTE_CHARS: usize = 300;

/// Identifier for experience and education entries on a seeker profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeniorityLevel {
    Intern,
    Junior,
    Mid,
    Senior,
}

/// Job seeker profile. One per account, created on first access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeekerProfile {
    pub owner: PrincipalId,
    pub full_name: String,
    pub phone: String,
    pub location: String,
    pub linkedin: String,
    pub github: String,
    pub portfolio: String,
    pub headline: String,
    pub years_experience: u32,
    pub skills: Vec<String>,
    pub languages: Vec<String>,
    pub about: String,
    pub desired_level: Option<SeniorityLevel>,
    pub is_open_to_remote: bool,
    pub desired_salary_nis: Option<u32>,
    /// Newest start date first.
    pub experiences: Vec<SeekerExperience>,
    /// Latest end year first.
    pub education: Vec<SeekerEducation>,
    pub updated_at: DateTime<Utc>,
}

impl SeekerProfile {
    pub fn empty(owner: PrincipalId, now: DateTime<Utc>) -> Self {
        Self {
            owner,
            full_name: String::new(),
            phone: String::new(),
            location: String::new(),
            linkedin: String::new(),
            github: String::new(),
            portfolio: String::new(),
            headline: String::new(),
            years_experience: 0,
            skills: Vec::new(),
            languages: Vec::new(),
            about: String::new(),
            desired_level: None,
            is_open_to_remote: true,
            desired_salary_nis: None,
            experiences: Vec::new(),
            education: Vec::new(),
            updated_at: now,
        }
    }

    /// Apply changes that already passed [`SeekerProfileChanges::validated`].
    pub fn apply(&mut self, changes: SeekerProfileChanges) {
        let SeekerProfileChanges {
            full_name,
            phone,
            location,
            linkedin,
            github,
            portfolio,
            headline,
            years_experience,
            skills,
            languages,
            about,
            desired_level,
            is_open_to_remote,
            desired_salary_nis,
        } = changes;

        replace(&mut self.full_name, full_name);
        replace(&mut self.phone, phone);
        replace(&mut self.location, location);
        replace(&mut self.linkedin, linkedin);
        replace(&mut self.github, github);
        replace(&mut self.portfolio, portfolio);
        replace(&mut self.headline, headline);
        replace(&mut self.years_experience, years_experience);
        replace(&mut self.skills, skills);
        replace(&mut self.languages, languages);
        replace(&mut self.about, about);
        replace(&mut self.desired_level, desired_level);
        replace(&mut self.is_open_to_remote, is_open_to_remote);
        replace(&mut self.desired_salary_nis, desired_salary_nis);
    }

    pub(crate) fn sort_entries(&mut self) {
        self.experiences
            .sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)));
        self.education.sort_by(|a, b| {
            b.end_year
                .cmp(&a.end_year)
                .then(b.start_year.cmp(&a.start_year))
                .then(b.id.cmp(&a.id))
        });
    }
}

fn replace<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Partial edit of a seeker profile; absent fields stay untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeekerProfileChanges {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub portfolio: Option<String>,
    pub headline: Option<String>,
    pub years_experience: Option<u32>,
    pub skills: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
    pub about: Option<String>,
    /// `Some(None)` clears the level.
    #[serde(with = "double_option", skip_serializing_if = "Option::is_none")]
    pub desired_level: Option<Option<SeniorityLevel>>,
    pub is_open_to_remote: Option<bool>,
    /// `Some(None)` clears the salary expectation.
    #[serde(with = "double_option", skip_serializing_if = "Option::is_none")]
    pub desired_salary_nis: Option<Option<u32>>,
}

impl SeekerProfileChanges {
    /// Trim and check every supplied field.
    pub fn validated(self) -> Result<Self, BoardError> {
        Ok(Self {
            full_name: map(self.full_name, |v| bounded("full_name", &v, MAX_NAME_CHARS))?,
            phone: map(self.phone, |v| phone("phone", &v))?,
            location: map(self.location, |v| bounded("location", &v, MAX_NAME_CHARS))?,
            linkedin: map(self.linkedin, |v| link("linkedin", &v))?,
            github: map(self.github, |v| link("github", &v))?,
            portfolio: map(self.portfolio, |v| link("portfolio", &v))?,
            headline: map(self.headline, |v| bounded("headline", &v, MAX_HEADLINE_CHARS))?,
            years_experience: self.years_experience,
            skills: self.skills.map(|items| tidy_list(&items)),
            languages: self.languages.map(|items| tidy_list(&items)),
            about: self.about.map(|about| about.trim().to_string()),
            desired_level: self.desired_level,
            is_open_to_remote: self.is_open_to_remote,
            desired_salary_nis: self.desired_salary_nis,
        })
    }
}

/// A past or current position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeekerExperience {
    pub id: EntryId,
    pub company: String,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub description: String,
    pub tech_stack: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceDraft {
    pub company: String,
    pub title: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
}

impl ExperienceDraft {
    pub fn validated(self) -> Result<Self, BoardError> {
        if let Some(end_date) = self.end_date {
            if end_date < self.start_date {
                return Err(BoardError::validation(
                    "end_date",
                    "must not be before start_date",
                ));
            }
            if self.is_current {
                return Err(BoardError::validation(
                    "end_date",
                    "a current position has no end date",
                ));
            }
        }
        Ok(Self {
            company: required("company", &self.company, MAX_HEADLINE_CHARS)?,
            title: required("title", &self.title, MAX_HEADLINE_CHARS)?,
            description: self.description.trim().to_string(),
            tech_stack: tidy_list(&self.tech_stack),
            ..self
        })
    }

    pub(crate) fn into_entry(self, id: EntryId) -> SeekerExperience {
        SeekerExperience {
            id,
            company: self.company,
            title: self.title,
            start_date: self.start_date,
            end_date: self.end_date,
            is_current: self.is_current,
            description: self.description,
            tech_stack: self.tech_stack,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeekerEducation {
    pub id: EntryId,
    pub school: String,
    pub degree: String,
    pub start_year: Option<u16>,
    pub end_year: Option<u16>,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationDraft {
    pub school: String,
    pub degree: String,
    #[serde(default)]
    pub start_year: Option<u16>,
    #[serde(default)]
    pub end_year: Option<u16>,
    #[serde(default)]
    pub notes: String,
}

impl EducationDraft {
    pub fn validated(self) -> Result<Self, BoardError> {
        if let (Some(start), Some(end)) = (self.start_year, self.end_year) {
            if end < start {
                return Err(BoardError::validation(
                    "end_year",
                    "must not be before start_year",
                ));
            }
        }
        Ok(Self {
            school: required("school", &self.school, MAX_HEADLINE_CHARS)?,
            degree: required("degree", &self.degree, MAX_HEADLINE_CHARS)?,
            notes: bounded("notes", &self.notes, MAX_NOTE_CHARS)?,
            ..self
        })
    }

    pub(crate) fn into_entry(self, id: EntryId) -> SeekerEducation {
        SeekerEducation {
            id,
            school: self.school,
            degree: self.degree,
            start_year: self.start_year,
            end_year: self.end_year,
            notes: self.notes,
        }
    }
}

/// Validated edit handed to the store, applied under its lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeekerEdit {
    Fields(SeekerProfileChanges),
    AddExperience(ExperienceDraft),
    RemoveExperience(EntryId),
    AddEducation(EducationDraft),
    RemoveEducation(EntryId),
}

/// Recruiter profile. One per account, created on first access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecruiterProfile {
    pub owner: PrincipalId,
    pub contact_name: String,
    pub phone: String,
    pub company_name: String,
    pub company_website: String,
    pub company_size: String,
    pub company_location: String,
    pub about_company: String,
    pub notes: String,
    pub updated_at: DateTime<Utc>,
}

impl RecruiterProfile {
    pub fn empty(owner: PrincipalId, now: DateTime<Utc>) -> Self {
        Self {
            owner,
            contact_name: String::new(),
            phone: String::new(),
            company_name: String::new(),
            company_website: String::new(),
            company_size: String::new(),
            company_location: String::new(),
            about_company: String::new(),
            notes: String::new(),
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: RecruiterProfileChanges) {
        replace(&mut self.contact_name, changes.contact_name);
        replace(&mut self.phone, changes.phone);
        replace(&mut self.company_name, changes.company_name);
        replace(&mut self.company_website, changes.company_website);
        replace(&mut self.company_size, changes.company_size);
        replace(&mut self.company_location, changes.company_location);
        replace(&mut self.about_company, changes.about_company);
        replace(&mut self.notes, changes.notes);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecruiterProfileChanges {
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub company_website: Option<String>,
    pub company_size: Option<String>,
    pub company_location: Option<String>,
    pub about_company: Option<String>,
    pub notes: Option<String>,
}

impl RecruiterProfileChanges {
    pub fn validated(self) -> Result<Self, BoardError> {
        Ok(Self {
            contact_name: map(self.contact_name, |v| {
                bounded("contact_name", &v, MAX_NAME_CHARS)
            })?,
            phone: map(self.phone, |v| phone("phone", &v))?,
            company_name: map(self.company_name, |v| {
                bounded("company_name", &v, MAX_HEADLINE_CHARS)
            })?,
            company_website: map(self.company_website, |v| link("company_website", &v))?,
            company_size: map(self.company_size, |v| {
                bounded("company_size", &v, MAX_COMPANY_SIZE_CHARS)
            })?,
            company_location: map(self.company_location, |v| {
                bounded("company_location", &v, MAX_NAME_CHARS)
            })?,
            about_company: self.about_company.map(|about| about.trim().to_string()),
            notes: self.notes.map(|notes| notes.trim().to_string()),
        })
    }
}

/// What `/accounts/me` returns: the account plus the profile for the role it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountOverview {
    #[serde(flatten)]
    pub account: Account,
    pub seeker_profile: Option<SeekerProfile>,
    pub recruiter_profile: Option<RecruiterProfile>,
}

fn map<F>(value: Option<String>, check: F) -> Result<Option<String>, BoardError>
where
    F: FnOnce(String) -> Result<String, BoardError>,
{
    value.map(check).transpose()
}

fn bounded(field: &'static str, value: &str, max: usize) -> Result<String, BoardError> {
    let value = value.trim();
    if value.chars().count() > max {
        return Err(BoardError::validation(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(value.to_string())
}

fn required(field: &'static str, value: &str, max: usize) -> Result<String, BoardError> {
    let value = bounded(field, value, max)?;
    if value.is_empty() {
        return Err(BoardError::validation(field, "must not be empty"));
    }
    Ok(value)
}

/// Empty clears the number; otherwise 7 to 20 of digits, spaces, `+`, `-` and parentheses.
fn phone(field: &'static str, value: &str) -> Result<String, BoardError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(String::new());
    }
    let length = value.chars().count();
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' ');
    if !(7..=20).contains(&length) || !value.chars().all(allowed) {
        return Err(BoardError::validation(field, "malformed phone number"));
    }
    Ok(value.to_string())
}

/// Empty clears the link; otherwise an absolute http(s) URL with a host.
pub(crate) fn link(field: &'static str, value: &str) -> Result<String, BoardError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(String::new());
    }
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    let host = rest.and_then(|rest| rest.split(['/', '?', '#']).next());
    match host {
        Some(host) if !host.is_empty() && !value.chars().any(char::is_whitespace) => {
            Ok(value.to_string())
        }
        _ => Err(BoardError::validation(field, "must be an http(s) URL")),
    }
}

/// Trimmed, non-empty entries with case-insensitive duplicates removed.
pub(crate) fn tidy_list(items: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut tidy = Vec::new();
    for item in items {
        let item = item.trim();
        let key = item.to_lowercase();
        if item.is_empty() || seen.contains(&key) {
            continue;
        }
        seen.push(key);
        tidy.push(item.to_string());
    }
    tidy
}
