use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Option-list sources exposed to the filter dropdowns. Every kind maps to
/// one `index` endpoint of the project-management backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Person,
    Project,
    Sprint,
    Year,
    Role,
}

impl FilterKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterKind::Person => "person",
            FilterKind::Project => "project",
            FilterKind::Sprint => "sprint",
            FilterKind::Year => "year",
            FilterKind::Role => "role",
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            FilterKind::Person => "/project-management/employee/index",
            FilterKind::Project => "/project-management/project/index",
            FilterKind::Sprint => "/project-management/sprint/index",
            FilterKind::Year => "/project-management/year/index",
            FilterKind::Role => "/project-management/role/index",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Year entries come back with numeric names, everything else with strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionLabel {
    Text(String),
    Number(i64),
}

impl OptionLabel {
    pub fn as_text(&self) -> String {
        match self {
            OptionLabel::Text(value) => value.clone(),
            OptionLabel::Number(value) => value.to_string(),
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionLabel::Text(value) => f.write_str(value),
            OptionLabel::Number(value) => write!(f, "{value}"),
        }
    }
}

impl Default for OptionLabel {
    fn default() -> Self {
        OptionLabel::Text(String::new())
    }
}

/// One selectable `{id, name}` entry. Index endpoints return richer rows
/// (emails, sprint dates, statuses); the extra fields are ignored on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOption {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: OptionLabel,
}

impl FilterOption {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: OptionLabel::Text(name.into()),
        }
    }

    pub fn year(value: i32) -> Self {
        Self {
            id: value.to_string(),
            name: OptionLabel::Number(i64::from(value)),
        }
    }
}

/// The user's current choice per filter category. `year` is the only entry
/// required before an aggregate fetch may be issued.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub person: Option<FilterOption>,
    pub project: Option<FilterOption>,
    pub sprint: Option<FilterOption>,
    pub year: Option<FilterOption>,
}

impl FilterSelection {
    pub fn set(&mut self, kind: FilterKind, option: Option<FilterOption>) -> AppResult<()> {
        match kind {
            FilterKind::Person => self.person = option,
            FilterKind::Project => self.project = option,
            FilterKind::Sprint => self.sprint = option,
            FilterKind::Year => self.year = option,
            FilterKind::Role => {
                return Err(AppError::validation("角色不可用作看板筛选条件"));
            }
        }
        Ok(())
    }

    /// Year value used in requests and display: the option's name, falling
    /// back to its id.
    pub fn year_value(&self) -> Option<String> {
        self.year.as_ref().map(|option| {
            let name = option.name.as_text();
            if name.trim().is_empty() {
                option.id.clone()
            } else {
                name
            }
        })
    }

    /// Optional narrowing parameters, included only when selected.
    pub fn optional_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(person) = self.person.as_ref() {
            if !person.id.is_empty() {
                params.push(("employee_id", person.id.clone()));
            }
        }
        if let Some(project) = self.project.as_ref() {
            if !project.id.is_empty() {
                params.push(("project_id", project.id.clone()));
            }
        }
        if let Some(sprint) = self.sprint.as_ref() {
            if !sprint.id.is_empty() {
                params.push(("sprint_id", sprint.id.clone()));
            }
        }
        params
    }
}
