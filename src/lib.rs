use std::sync::Arc;

use crate::core::catalog::Catalog;
use crate::core::resolver::ShortLinkResolver;
use crate::netease::api::NeteaseApi;

pub mod commands;
pub mod core;
pub mod models;
pub mod netease;
pub mod storage;

pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub resolver: ShortLinkResolver,
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tracing_subscriber::fmt::init();

    let catalog: Arc<dyn Catalog> =
        Arc::new(NeteaseApi::new().expect("failed to build catalog client"));
    let resolver =
        ShortLinkResolver::new(catalog.clone()).expect("failed to build short-link resolver");

    let state = AppState { catalog, resolver };

    tauri::Builder::default()
        .manage(state)
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_store::Builder::default().build())
        .setup(|app| {
            let settings = storage::config::load_settings(app.handle());
            let dir = &settings.download.download_dir;
            if let Err(e) = std::fs::create_dir_all(dir) {
                tracing::warn!("could not create download dir {}: {}", dir.display(), e);
            }
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::auth::netease_login,
            commands::auth::get_netease_login,
            commands::search::search_tracks,
            commands::resolve::resolve_short_link,
            commands::downloads::download_track,
            commands::downloads::download_all,
            commands::downloads::reveal_file,
            commands::settings::get_settings,
            commands::settings::update_settings,
            commands::settings::get_download_dir,
            commands::settings::set_download_dir,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
