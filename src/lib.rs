pub mod commands;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use tauri::Manager;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    if let Err(error) = try_run() {
        eprintln!("failed to launch application: {error}");
    }
}

fn try_run() -> Result<(), Box<dyn std::error::Error>> {
    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let handle = app.handle();

            crate::utils::logger::init_logging(&handle)
                .map_err(|err| Box::new(err) as Box<dyn std::error::Error>)?;

            let data_dir = handle
                .path()
                .app_data_dir()
                .map_err(|err| Box::new(err) as Box<dyn std::error::Error>)?;

            std::fs::create_dir_all(&data_dir)?;

            let state = crate::commands::AppState::new(&data_dir)
                .map_err(|err| Box::new(err) as Box<dyn std::error::Error>)?;
            app.manage(state);

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            crate::commands::session::session_bootstrap,
            crate::commands::session::session_token_present,
            crate::commands::filters::filter_options_load,
            crate::commands::filters::filter_options_snapshot,
            crate::commands::filters::filter_options_release,
            crate::commands::dashboard::dashboard_load_initial,
            crate::commands::dashboard::dashboard_filter_change,
            crate::commands::dashboard::dashboard_apply_filters,
            crate::commands::dashboard::dashboard_bar_click,
            crate::commands::dashboard::dashboard_detail_sort,
            crate::commands::dashboard::dashboard_detail_toggle_row,
            crate::commands::dashboard::dashboard_detail_close,
            crate::commands::dashboard::dashboard_snapshot,
            crate::commands::export::export_resource_planning,
        ])
        .run(tauri::generate_context!())?;

    Ok(())
}
