pub mod commands;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(feature = "desktop")]
use tauri::Manager;

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    if let Err(error) = try_run() {
        eprintln!("failed to launch application: {error}");
    }
}

#[cfg(feature = "desktop")]
fn try_run() -> Result<(), Box<dyn std::error::Error>> {
    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let handle = app.handle();

            let data_dir = handle
                .path()
                .app_data_dir()
                .map_err(|err| Box::new(err) as Box<dyn std::error::Error>)?;
            std::fs::create_dir_all(&data_dir)?;

            let settings = crate::services::settings_service::SettingsService::from_data_dir(&data_dir)
                .map_err(|err| Box::new(err) as Box<dyn std::error::Error>)?;
            let directives = settings
                .get()
                .map_err(|err| Box::new(err) as Box<dyn std::error::Error>)?
                .log_directives;

            crate::utils::logger::init_logging(&data_dir, &directives)
                .map_err(|err| Box::new(err) as Box<dyn std::error::Error>)?;

            let state = crate::commands::AppState::new(settings)
                .map_err(|err| Box::new(err) as Box<dyn std::error::Error>)?;
            app.manage(state);

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            crate::commands::wizard::wizard_start,
            crate::commands::wizard::wizard_get,
            crate::commands::wizard::wizard_discard,
            crate::commands::wizard::wizard_breadcrumbs,
            crate::commands::wizard::wizard_load_scope,
            crate::commands::wizard::wizard_update_scope_description,
            crate::commands::wizard::wizard_select_activity,
            crate::commands::wizard::wizard_load_support_queues,
            crate::commands::wizard::wizard_toggle_relevance,
            crate::commands::wizard::wizard_update_queue_description,
            crate::commands::wizard::wizard_add_queue,
            crate::commands::wizard::wizard_remove_queue,
            crate::commands::wizard::wizard_update_intervention,
            crate::commands::wizard::wizard_add_intervention,
            crate::commands::wizard::wizard_remove_intervention,
            crate::commands::wizard::wizard_load_impact_rationale,
            crate::commands::wizard::wizard_update_impact_percentage,
            crate::commands::wizard::wizard_update_rationale,
            crate::commands::productivity::productivity_compute_session,
            crate::commands::productivity::productivity_compute,
            crate::commands::productivity::productivity_report_export,
            crate::commands::settings::settings_get,
            crate::commands::settings::settings_update,
        ])
        .run(tauri::generate_context!())?;

    Ok(())
}
