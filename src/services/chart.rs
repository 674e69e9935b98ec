use serde::{Deserialize, Serialize};

use crate::models::dashboard::{
    MonthlyAggregate, ProductivityAggregate, RoleBreakdown, ROLE_KEYS,
};

/// One bar series: data key, legend label, fill color.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SeriesSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub color: &'static str,
}

/// Everything that distinguished the near-identical chart components:
/// bar series, label formatter, role-breakdown toggle, empty-state text.
#[derive(Clone)]
pub struct ChartConfig {
    pub title: &'static str,
    pub primary: SeriesSpec,
    pub secondary: SeriesSpec,
    pub role_breakdown: bool,
    pub format_label: fn(f64) -> String,
    pub empty_message: fn(&str) -> String,
}

fn plain_label(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

pub fn resource_planning_config() -> ChartConfig {
    ChartConfig {
        title: "Resource Planning",
        primary: SeriesSpec {
            key: "plan",
            label: "Total Plan (MD)",
            color: "#FACC15",
        },
        secondary: SeriesSpec {
            key: "capacity",
            label: "Total Capacity (MD)",
            color: "#60A5FA",
        },
        role_breakdown: true,
        format_label: plain_label,
        empty_message: |year| format!("No data available for {year}"),
    }
}

pub fn productivity_config() -> ChartConfig {
    ChartConfig {
        title: "Productivity Overview",
        primary: SeriesSpec {
            key: "actual",
            label: "Total Actual (MD)",
            color: "#FACC15",
        },
        secondary: SeriesSpec {
            key: "plan",
            label: "Total SA Plan (MD)",
            color: "#A78BFA",
        },
        role_breakdown: false,
        format_label: plain_label,
        empty_message: |_| "No data available. Please apply filters.".to_string(),
    }
}

/// Chart-agnostic category: the two series values plus the backing record's
/// identity for click resolution.
#[derive(Debug, Clone)]
pub struct ChartCategory {
    pub id: String,
    pub month: Option<u32>,
    pub name: String,
    pub primary: f64,
    pub secondary: f64,
    pub summary: Option<RoleBreakdown>,
}

impl ChartCategory {
    pub fn from_monthly(item: &MonthlyAggregate) -> Self {
        Self {
            id: item.id.clone(),
            month: item.month,
            name: item.display_name(),
            primary: item.plan,
            secondary: item.capacity,
            summary: item.summary.clone(),
        }
    }

    pub fn from_productivity(item: &ProductivityAggregate) -> Self {
        Self {
            id: item.id.clone(),
            month: item.month,
            name: item
                .name
                .clone()
                .unwrap_or_else(|| match item.month {
                    Some(month) => format!("Month {month}"),
                    None => "Month ".to_string(),
                }),
            primary: item.actual,
            secondary: item.plan,
            summary: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarView {
    pub key: &'static str,
    pub label: &'static str,
    pub color: &'static str,
    pub value: f64,
    pub display: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub id: String,
    pub month: Option<u32>,
    pub name: String,
    pub bars: Vec<BarView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRowView {
    pub role: &'static str,
    pub plan: f64,
    pub capacity: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePanelView {
    pub month: Option<u32>,
    pub name: String,
    pub rows: Vec<RoleRowView>,
}

/// Renderable snapshot of one bar chart. `placeholder` is set instead of an
/// empty category axis — a chart frame with zero categories is never shown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartViewModel {
    pub title: String,
    pub year: String,
    pub series: Vec<SeriesSpec>,
    pub categories: Vec<CategoryView>,
    pub role_panels: Vec<RolePanelView>,
    pub placeholder: Option<String>,
}

/// Six rows, one per fixed role; roles absent from the rollup come out zeroed.
pub fn role_rows(summary: Option<&RoleBreakdown>) -> Vec<RoleRowView> {
    ROLE_KEYS
        .iter()
        .map(|key| {
            let figures = summary
                .and_then(|breakdown| breakdown.get(*key))
                .copied()
                .unwrap_or_default();
            RoleRowView {
                role: key.label(),
                plan: figures.plan,
                capacity: figures.capacity,
            }
        })
        .collect()
}

pub fn build_chart(
    config: &ChartConfig,
    categories: &[ChartCategory],
    year_label: &str,
) -> ChartViewModel {
    if categories.is_empty() {
        return ChartViewModel {
            title: config.title.to_string(),
            year: year_label.to_string(),
            series: vec![config.primary, config.secondary],
            categories: Vec::new(),
            role_panels: Vec::new(),
            placeholder: Some((config.empty_message)(year_label)),
        };
    }

    let category_views = categories
        .iter()
        .map(|category| CategoryView {
            id: category.id.clone(),
            month: category.month,
            name: category.name.clone(),
            bars: vec![
                BarView {
                    key: config.primary.key,
                    label: config.primary.label,
                    color: config.primary.color,
                    value: category.primary,
                    display: (config.format_label)(category.primary),
                },
                BarView {
                    key: config.secondary.key,
                    label: config.secondary.label,
                    color: config.secondary.color,
                    value: category.secondary,
                    display: (config.format_label)(category.secondary),
                },
            ],
        })
        .collect();

    let role_panels = if config.role_breakdown {
        categories
            .iter()
            .map(|category| RolePanelView {
                month: category.month,
                name: category.name.clone(),
                rows: role_rows(category.summary.as_ref()),
            })
            .collect()
    } else {
        Vec::new()
    };

    ChartViewModel {
        title: config.title.to_string(),
        year: year_label.to_string(),
        series: vec![config.primary, config.secondary],
        categories: category_views,
        role_panels,
        placeholder: None,
    }
}

/// What the webview hands back when a bar is clicked. Clicks that land on
/// empty chart area arrive without a payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarClickPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Resolves a click back to the full backing record. `None` payloads (empty
/// chart area) resolve to nothing so the drill-down callback never fires.
pub fn resolve_bar_click<'a>(
    data: &'a [MonthlyAggregate],
    payload: Option<&BarClickPayload>,
) -> Option<&'a MonthlyAggregate> {
    let payload = payload?;

    if let Some(id) = payload.id.as_deref().filter(|id| !id.is_empty()) {
        if let Some(found) = data.iter().find(|item| item.id == id) {
            return Some(found);
        }
    }

    payload
        .month
        .and_then(|month| data.iter().find(|item| item.month == Some(month)))
}
