use tauri::State;

use crate::models::filter::{FilterKind, FilterOption};
use crate::services::chart::BarClickPayload;
use crate::services::dashboard_service::DashboardSnapshot;
use crate::services::detail_table::SortKey;

use super::{AppState, CommandResult};

#[tauri::command]
pub async fn dashboard_load_initial(
    state: State<'_, AppState>,
) -> CommandResult<DashboardSnapshot> {
    let dashboard = state.dashboard();
    Ok(dashboard.load_initial().await?)
}

#[tauri::command]
pub fn dashboard_filter_change(
    state: State<'_, AppState>,
    kind: FilterKind,
    option: Option<FilterOption>,
) -> CommandResult<DashboardSnapshot> {
    Ok(state.dashboard().change_filter(kind, option)?)
}

#[tauri::command]
pub async fn dashboard_apply_filters(
    state: State<'_, AppState>,
) -> CommandResult<DashboardSnapshot> {
    let dashboard = state.dashboard();
    Ok(dashboard.apply_filters().await?)
}

#[tauri::command]
pub async fn dashboard_bar_click(
    state: State<'_, AppState>,
    payload: Option<BarClickPayload>,
) -> CommandResult<DashboardSnapshot> {
    let dashboard = state.dashboard();
    Ok(dashboard.bar_click(payload).await?)
}

#[tauri::command]
pub fn dashboard_detail_sort(
    state: State<'_, AppState>,
    key: SortKey,
) -> CommandResult<DashboardSnapshot> {
    Ok(state.dashboard().detail_toggle_sort(key))
}

#[tauri::command]
pub fn dashboard_detail_toggle_row(
    state: State<'_, AppState>,
    id: String,
) -> CommandResult<DashboardSnapshot> {
    Ok(state.dashboard().detail_toggle_row(&id))
}

#[tauri::command]
pub fn dashboard_detail_close(state: State<'_, AppState>) -> CommandResult<DashboardSnapshot> {
    Ok(state.dashboard().close_detail())
}

#[tauri::command]
pub fn dashboard_snapshot(state: State<'_, AppState>) -> CommandResult<DashboardSnapshot> {
    Ok(state.dashboard().snapshot())
}
