use chrono::{Datelike, Local};
use tauri::State;

use crate::services::export_service::ExportResult;

use super::{AppState, CommandResult};

#[tauri::command]
pub fn export_resource_planning(
    state: State<'_, AppState>,
    year: Option<i32>,
) -> CommandResult<ExportResult> {
    let year = year.unwrap_or_else(|| Local::now().year());
    Ok(state.export().export_resource_planning(year)?)
}
