use serde::{Deserialize, Serialize};

use crate::models::api::IdName;

/// Plan figure booked against one project for the row's employee and month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectPlan {
    #[serde(default)]
    pub project_id: IdName,
    #[serde(default)]
    pub plan: f64,
}

/// One employee's figures for the drilled-down month. `status` is computed by
/// the backend; this app classifies it for presentation only and never
/// rewrites the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub employee_name: String,
    #[serde(default)]
    pub employee_email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub plan: Option<f64>,
    #[serde(default)]
    pub capacity: Option<f64>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub project_plans: Vec<ProjectPlan>,
    #[serde(default)]
    pub month_name: Option<String>,
    #[serde(default)]
    pub year: Option<i64>,
}

impl DetailRow {
    /// The expansion toggle exists only when there is something to reveal.
    pub fn expandable(&self) -> bool {
        !self.project_plans.is_empty()
    }
}

/// Visual classification of the backend's status string. Only "over capacity"
/// and "on capacity" are matched (case-insensitively); anything else takes
/// the under-capacity default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapacityStatus {
    OverCapacity,
    OnCapacity,
    UnderCapacity,
}

impl CapacityStatus {
    pub fn classify(status: &str) -> CapacityStatus {
        let normalized = status.trim().to_lowercase();
        if normalized == "over capacity" {
            CapacityStatus::OverCapacity
        } else if normalized == "on capacity" {
            CapacityStatus::OnCapacity
        } else {
            CapacityStatus::UnderCapacity
        }
    }

    pub fn as_class(self) -> &'static str {
        match self {
            CapacityStatus::OverCapacity => "over-capacity",
            CapacityStatus::OnCapacity => "on-capacity",
            CapacityStatus::UnderCapacity => "under-capacity",
        }
    }
}
