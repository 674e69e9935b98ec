use serde::{Deserialize, Serialize};

/// The six fixed roles the backend rolls monthly figures up into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKey {
    SolutionEngineer,
    UiSolutionEngineer,
    SystemAnalyst,
    QualityAssurance,
    Devops,
    TechnicalWriter,
}

pub const ROLE_KEYS: [RoleKey; 6] = [
    RoleKey::SolutionEngineer,
    RoleKey::UiSolutionEngineer,
    RoleKey::SystemAnalyst,
    RoleKey::QualityAssurance,
    RoleKey::Devops,
    RoleKey::TechnicalWriter,
];

impl RoleKey {
    pub fn as_str(self) -> &'static str {
        match self {
            RoleKey::SolutionEngineer => "solution_engineer",
            RoleKey::UiSolutionEngineer => "ui_solution_engineer",
            RoleKey::SystemAnalyst => "system_analyst",
            RoleKey::QualityAssurance => "quality_assurance",
            RoleKey::Devops => "devops",
            RoleKey::TechnicalWriter => "technical_writer",
        }
    }

    /// Short axis label used under the per-role bars.
    pub fn label(self) -> &'static str {
        match self {
            RoleKey::SolutionEngineer => "SE",
            RoleKey::UiSolutionEngineer => "UI SE",
            RoleKey::SystemAnalyst => "SA",
            RoleKey::QualityAssurance => "QA",
            RoleKey::Devops => "DevOps",
            RoleKey::TechnicalWriter => "TW",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleFigures {
    #[serde(default)]
    pub plan: f64,
    #[serde(default)]
    pub capacity: f64,
}

/// Per-role rollup nested inside a monthly aggregate. Roles the backend did
/// not report stay `None` and render as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleBreakdown {
    #[serde(default)]
    pub solution_engineer: Option<RoleFigures>,
    #[serde(default)]
    pub ui_solution_engineer: Option<RoleFigures>,
    #[serde(default)]
    pub system_analyst: Option<RoleFigures>,
    #[serde(default)]
    pub quality_assurance: Option<RoleFigures>,
    #[serde(default)]
    pub devops: Option<RoleFigures>,
    #[serde(default)]
    pub technical_writer: Option<RoleFigures>,
}

impl RoleBreakdown {
    pub fn get(&self, key: RoleKey) -> Option<&RoleFigures> {
        match key {
            RoleKey::SolutionEngineer => self.solution_engineer.as_ref(),
            RoleKey::UiSolutionEngineer => self.ui_solution_engineer.as_ref(),
            RoleKey::SystemAnalyst => self.system_analyst.as_ref(),
            RoleKey::QualityAssurance => self.quality_assurance.as_ref(),
            RoleKey::Devops => self.devops.as_ref(),
            RoleKey::TechnicalWriter => self.technical_writer.as_ref(),
        }
    }
}

/// One calendar month of plan/capacity totals for the active year/filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub plan: f64,
    #[serde(default)]
    pub capacity: f64,
    #[serde(default)]
    pub summary: Option<RoleBreakdown>,
}

impl MonthlyAggregate {
    pub fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => match self.month {
                Some(month) => format!("Month {month}"),
                None => "Month ".to_string(),
            },
        }
    }
}

/// Plan-vs-actual counterpart of [`MonthlyAggregate`]. The aggregate endpoint
/// does not source actuals, so these are derived zero-filled from its months.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductivityAggregate {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub plan: f64,
    #[serde(default)]
    pub actual: f64,
}

impl ProductivityAggregate {
    /// Mirror of the aggregate months with zeroed figures.
    pub fn zero_filled_from(aggregates: &[MonthlyAggregate]) -> Vec<ProductivityAggregate> {
        aggregates
            .iter()
            .map(|item| ProductivityAggregate {
                id: item.id.clone(),
                month: item.month,
                name: Some(item.display_name()),
                plan: 0.0,
                actual: 0.0,
            })
            .collect()
    }
}
