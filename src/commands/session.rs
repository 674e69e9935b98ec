use tauri::State;

use crate::services::session_service::SessionBootstrap;

use super::{AppState, CommandResult};

/// The webview hands over its current location once at startup; the returned
/// sanitized URL (token removed) is what it should rewrite history with.
#[tauri::command]
pub fn session_bootstrap(state: State<'_, AppState>, url: String) -> CommandResult<SessionBootstrap> {
    Ok(state.session().bootstrap(&url))
}

#[tauri::command]
pub fn session_token_present(state: State<'_, AppState>) -> CommandResult<bool> {
    Ok(!state.session().auth_token().is_empty())
}
