use tauri::State;

use crate::models::filter::FilterKind;
use crate::services::filter_service::ProviderSnapshot;

use super::{AppState, CommandResult};

/// Loads one dropdown's option list. Errors come back inside the snapshot so
/// the dropdown can render them as a disabled entry; a failed load never
/// blocks the other filters.
#[tauri::command]
pub async fn filter_options_load(
    state: State<'_, AppState>,
    kind: FilterKind,
) -> CommandResult<ProviderSnapshot> {
    Ok(state.filters().load(kind).await)
}

#[tauri::command]
pub fn filter_options_snapshot(
    state: State<'_, AppState>,
    kind: FilterKind,
) -> CommandResult<ProviderSnapshot> {
    Ok(state.filters().snapshot(kind))
}

/// Dropdown teardown: discard whatever its in-flight fetch may still return.
#[tauri::command]
pub fn filter_options_release(state: State<'_, AppState>, kind: FilterKind) -> CommandResult<()> {
    state.filters().release(kind);
    Ok(())
}
