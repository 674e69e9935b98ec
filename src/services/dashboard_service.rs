use std::sync::{Arc, RwLock};

use chrono::{Datelike, Local};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::models::dashboard::{MonthlyAggregate, ProductivityAggregate};
use crate::models::detail::DetailRow;
use crate::models::filter::{FilterKind, FilterOption, FilterSelection};
use crate::services::api_client::ApiClient;
use crate::services::chart::{
    self, BarClickPayload, ChartCategory, ChartViewModel,
};
use crate::services::detail_table::{self, DetailTableState, DetailTableView, SortKey};
use crate::services::session_service::SessionService;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchPhase {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Default)]
struct AggregateFlow {
    phase: FetchPhase,
    chart: Vec<MonthlyAggregate>,
    productivity: Vec<ProductivityAggregate>,
    error: Option<String>,
    generation: u64,
}

#[derive(Default)]
struct DetailFlow {
    phase: FetchPhase,
    open: bool,
    rows: Vec<DetailRow>,
    month_name: Option<String>,
    year: Option<i64>,
    error: Option<String>,
    table: DetailTableState,
    generation: u64,
}

#[derive(Default)]
struct DashboardState {
    filters: FilterSelection,
    aggregate: AggregateFlow,
    detail: DetailFlow,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateView {
    pub phase: FetchPhase,
    pub error: Option<String>,
    pub chart: ChartViewModel,
    pub productivity: ChartViewModel,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailView {
    pub phase: FetchPhase,
    pub open: bool,
    pub error: Option<String>,
    pub month_name: Option<String>,
    pub year: Option<i64>,
    pub table: DetailTableView,
}

/// Read-only view the webview renders from. Views never mutate controller
/// state directly; user intent comes back through the commands.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub filters: FilterSelection,
    pub aggregate: AggregateView,
    pub detail: DetailView,
}

/// Owns the filter selection and both fetch flows (aggregate and drill-down),
/// each an independent `FetchPhase` machine with a request-generation counter:
/// a response that resolves after a newer request was issued is discarded
/// instead of overwriting fresher state.
pub struct DashboardService {
    client: Arc<ApiClient>,
    session: Arc<SessionService>,
    state: RwLock<DashboardState>,
}

impl DashboardService {
    pub fn new(client: Arc<ApiClient>, session: Arc<SessionService>) -> Self {
        Self {
            client,
            session,
            state: RwLock::new(DashboardState::default()),
        }
    }

    /// Startup load: current calendar year, no other filters.
    pub async fn load_initial(&self) -> AppResult<DashboardSnapshot> {
        let current_year = Local::now().year();
        {
            let mut state = self.state.write().expect("dashboard state lock poisoned");
            state.filters.year = Some(FilterOption::year(current_year));
        }
        debug!(target: "app::dashboard", year = current_year, "initial aggregate load");
        self.fetch_aggregate().await
    }

    /// Records a dropdown selection (or its clearing). No fetch happens until
    /// Apply is pressed.
    pub fn change_filter(
        &self,
        kind: FilterKind,
        option: Option<FilterOption>,
    ) -> AppResult<DashboardSnapshot> {
        let mut state = self.state.write().expect("dashboard state lock poisoned");
        state.filters.set(kind, option)?;
        Ok(Self::snapshot_locked(&state))
    }

    /// Apply button: requires a year, otherwise a blocking prompt and zero
    /// network calls.
    pub async fn apply_filters(&self) -> AppResult<DashboardSnapshot> {
        {
            let state = self.state.read().expect("dashboard state lock poisoned");
            if state.filters.year.is_none() {
                return Err(AppError::validation("请先选择年份"));
            }
        }
        self.fetch_aggregate().await
    }

    async fn fetch_aggregate(&self) -> AppResult<DashboardSnapshot> {
        if self.session.auth_token().is_empty() {
            return Err(AppError::missing_token());
        }

        let (selection, generation) = {
            let mut state = self.state.write().expect("dashboard state lock poisoned");
            state.aggregate.generation += 1;
            state.aggregate.phase = FetchPhase::Loading;
            state.aggregate.error = None;
            (state.filters.clone(), state.aggregate.generation)
        };

        let result = self.client.fetch_resource_planning(&selection).await;

        let mut state = self.state.write().expect("dashboard state lock poisoned");
        if state.aggregate.generation != generation {
            debug!(target: "app::dashboard", "stale aggregate response discarded");
            return Ok(Self::snapshot_locked(&state));
        }

        match result {
            Ok(aggregates) => {
                state.aggregate.productivity = ProductivityAggregate::zero_filled_from(&aggregates);
                state.aggregate.chart = aggregates;
                state.aggregate.phase = FetchPhase::Success;
                state.aggregate.error = None;
            }
            Err(error) => {
                warn!(target: "app::dashboard", error = %error, "aggregate fetch failed");
                state.aggregate.chart = Vec::new();
                state.aggregate.productivity = Vec::new();
                state.aggregate.phase = FetchPhase::Error;
                state.aggregate.error = Some(error.to_string());
            }
        }

        Ok(Self::snapshot_locked(&state))
    }

    /// Bar click from either chart. No payload (empty chart area) is a no-op;
    /// a payload without a resolvable id and month becomes a detail error
    /// state without any request.
    pub async fn bar_click(&self, payload: Option<BarClickPayload>) -> AppResult<DashboardSnapshot> {
        let Some(payload) = payload else {
            return Ok(self.snapshot());
        };

        let resolved = {
            let state = self.state.read().expect("dashboard state lock poisoned");
            chart::resolve_bar_click(&state.aggregate.chart, Some(&payload)).cloned()
        };

        let (id, month) = match resolved {
            Some(record) => (record.id, record.month),
            None => (payload.id.unwrap_or_default(), payload.month),
        };

        let Some(month) = month.filter(|_| !id.is_empty()) else {
            let mut state = self.state.write().expect("dashboard state lock poisoned");
            state.detail.phase = FetchPhase::Error;
            state.detail.error = Some("无法定位所选月份的明细数据".to_string());
            return Ok(Self::snapshot_locked(&state));
        };

        self.fetch_detail(id, month).await
    }

    async fn fetch_detail(&self, id: String, month: u32) -> AppResult<DashboardSnapshot> {
        if self.session.auth_token().is_empty() {
            return Err(AppError::missing_token());
        }

        let (selection, generation) = {
            let mut state = self.state.write().expect("dashboard state lock poisoned");
            state.detail.generation += 1;
            state.detail.phase = FetchPhase::Loading;
            state.detail.error = None;
            (state.filters.clone(), state.detail.generation)
        };

        debug!(target: "app::dashboard", %id, month, "detail fetch");
        let result = self
            .client
            .fetch_resource_planning_details(&id, month, &selection)
            .await;

        let mut state = self.state.write().expect("dashboard state lock poisoned");
        if state.detail.generation != generation {
            debug!(target: "app::dashboard", "stale detail response discarded");
            return Ok(Self::snapshot_locked(&state));
        }

        match result {
            Ok(rows) => {
                state.detail.month_name = rows.first().and_then(|row| row.month_name.clone());
                state.detail.year = rows.first().and_then(|row| row.year);
                state.detail.rows = rows;
                state.detail.table.reset();
                state.detail.phase = FetchPhase::Success;
                state.detail.error = None;
                state.detail.open = true;
            }
            Err(error) => {
                // A failed drill-down clears its own rows but must never
                // touch the chart data behind it.
                warn!(target: "app::dashboard", error = %error, "detail fetch failed");
                state.detail.rows = Vec::new();
                state.detail.table.reset();
                state.detail.month_name = None;
                state.detail.year = None;
                state.detail.phase = FetchPhase::Error;
                state.detail.error = Some(error.to_string());
            }
        }

        Ok(Self::snapshot_locked(&state))
    }

    pub fn detail_toggle_sort(&self, key: SortKey) -> DashboardSnapshot {
        let mut state = self.state.write().expect("dashboard state lock poisoned");
        state.detail.table.toggle_sort(key);
        Self::snapshot_locked(&state)
    }

    pub fn detail_toggle_row(&self, id: &str) -> DashboardSnapshot {
        let mut state = self.state.write().expect("dashboard state lock poisoned");
        state.detail.table.toggle_row(id);
        Self::snapshot_locked(&state)
    }

    pub fn close_detail(&self) -> DashboardSnapshot {
        let mut state = self.state.write().expect("dashboard state lock poisoned");
        state.detail.open = false;
        Self::snapshot_locked(&state)
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let state = self.state.read().expect("dashboard state lock poisoned");
        Self::snapshot_locked(&state)
    }

    fn snapshot_locked(state: &DashboardState) -> DashboardSnapshot {
        let year_label = state
            .filters
            .year_value()
            .unwrap_or_else(|| Local::now().year().to_string());

        let monthly: Vec<ChartCategory> = state
            .aggregate
            .chart
            .iter()
            .map(ChartCategory::from_monthly)
            .collect();
        let productivity: Vec<ChartCategory> = state
            .aggregate
            .productivity
            .iter()
            .map(ChartCategory::from_productivity)
            .collect();

        DashboardSnapshot {
            filters: state.filters.clone(),
            aggregate: AggregateView {
                phase: state.aggregate.phase,
                error: state.aggregate.error.clone(),
                chart: chart::build_chart(
                    &chart::resource_planning_config(),
                    &monthly,
                    &year_label,
                ),
                productivity: chart::build_chart(
                    &chart::productivity_config(),
                    &productivity,
                    &year_label,
                ),
            },
            detail: DetailView {
                phase: state.detail.phase,
                open: state.detail.open,
                error: state.detail.error.clone(),
                month_name: state.detail.month_name.clone(),
                year: state.detail.year,
                table: detail_table::build_table(&state.detail.rows, &state.detail.table),
            },
        }
    }
}
