use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::detail::{CapacityStatus, DetailRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    EmployeeName,
    EmployeeEmail,
    Role,
    Plan,
    Capacity,
    Status,
}

impl SortKey {
    fn is_numeric(self) -> bool {
        matches!(self, SortKey::Plan | SortKey::Capacity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Local view state of the drill-down table: active sort and which rows are
/// expanded. Never persisted, never derived from backend data.
#[derive(Debug, Default, Clone)]
pub struct DetailTableState {
    sort_key: Option<SortKey>,
    direction: Option<SortDirection>,
    expanded: HashSet<String>,
}

impl DetailTableState {
    pub fn sort_key(&self) -> Option<SortKey> {
        self.sort_key
    }

    pub fn direction(&self) -> Option<SortDirection> {
        self.direction
    }

    /// Same key flips the direction; a new key starts ascending.
    pub fn toggle_sort(&mut self, key: SortKey) {
        if self.sort_key == Some(key) {
            self.direction = Some(
                self.direction
                    .unwrap_or(SortDirection::Ascending)
                    .toggled(),
            );
        } else {
            self.sort_key = Some(key);
            self.direction = Some(SortDirection::Ascending);
        }
    }

    pub fn toggle_row(&mut self, id: &str) {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// Fresh rows arrived: collapse everything and drop the sort back to the
    /// backend's given order.
    pub fn reset(&mut self) {
        self.sort_key = None;
        self.direction = None;
        self.expanded.clear();
    }

    /// Stable sort of the given rows under the active key. Numeric keys treat
    /// missing values as zero; text keys compare case-insensitively.
    pub fn sorted(&self, rows: &[DetailRow]) -> Vec<DetailRow> {
        let mut sorted: Vec<DetailRow> = rows.to_vec();
        let (Some(key), Some(direction)) = (self.sort_key, self.direction) else {
            return sorted;
        };

        if key.is_numeric() {
            sorted.sort_by(|a, b| {
                let left = numeric_value(a, key);
                let right = numeric_value(b, key);
                left.total_cmp(&right)
            });
        } else {
            sorted.sort_by(|a, b| {
                let left = text_value(a, key).to_lowercase();
                let right = text_value(b, key).to_lowercase();
                left.cmp(&right)
            });
        }

        if direction == SortDirection::Descending {
            sorted.reverse();
        }
        sorted
    }
}

fn numeric_value(row: &DetailRow, key: SortKey) -> f64 {
    match key {
        SortKey::Plan => row.plan.unwrap_or(0.0),
        SortKey::Capacity => row.capacity.unwrap_or(0.0),
        _ => 0.0,
    }
}

fn text_value(row: &DetailRow, key: SortKey) -> &str {
    match key {
        SortKey::EmployeeName => &row.employee_name,
        SortKey::EmployeeEmail => &row.employee_email,
        SortKey::Role => &row.role,
        SortKey::Status => &row.status,
        SortKey::Plan | SortKey::Capacity => "",
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPlanView {
    pub project_name: String,
    pub plan: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailRowView {
    pub id: String,
    pub employee_name: String,
    pub employee_email: String,
    pub role: String,
    pub plan: f64,
    pub capacity: f64,
    pub status: String,
    pub status_class: &'static str,
    pub expandable: bool,
    pub expanded: bool,
    pub project_plans: Vec<ProjectPlanView>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailTableView {
    pub rows: Vec<DetailRowView>,
    pub sort_key: Option<SortKey>,
    pub sort_direction: Option<SortDirection>,
}

/// Applies the table state to the raw rows. The status string is forwarded
/// verbatim; only its visual class is derived.
pub fn build_table(rows: &[DetailRow], state: &DetailTableState) -> DetailTableView {
    let row_views = state
        .sorted(rows)
        .into_iter()
        .map(|row| {
            let status_class = CapacityStatus::classify(&row.status).as_class();
            DetailRowView {
                expandable: row.expandable(),
                expanded: state.is_expanded(&row.id),
                plan: row.plan.unwrap_or(0.0),
                capacity: row.capacity.unwrap_or(0.0),
                status_class,
                project_plans: row
                    .project_plans
                    .iter()
                    .map(|entry| ProjectPlanView {
                        project_name: entry.project_id.name.clone(),
                        plan: entry.plan,
                    })
                    .collect(),
                id: row.id,
                employee_name: row.employee_name,
                employee_email: row.employee_email,
                role: row.role,
                status: row.status,
            }
        })
        .collect();

    DetailTableView {
        rows: row_views,
        sort_key: state.sort_key(),
        sort_direction: state.direction(),
    }
}
