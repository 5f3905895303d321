use tauri_plugin_dialog::DialogExt;

use creamget_core::models::settings::AppSettings;

use crate::storage::config;

#[tauri::command]
pub fn get_settings(app: tauri::AppHandle) -> Result<AppSettings, String> {
    Ok(config::load_settings(&app))
}

#[tauri::command]
pub fn update_settings(app: tauri::AppHandle, partial: String) -> Result<AppSettings, String> {
    let mut current = config::load_settings(&app);

    let patch: serde_json::Value =
        serde_json::from_str(&partial).map_err(|e| format!("Invalid JSON: {}", e))?;
    let mut current_val =
        serde_json::to_value(&current).map_err(|e| format!("Serialize: {}", e))?;
    merge_json(&mut current_val, &patch);
    current = serde_json::from_value(current_val).map_err(|e| format!("Deserialize: {}", e))?;
    config::save_settings(&app, &current).map_err(|e| format!("Save: {}", e))?;

    Ok(current)
}

#[tauri::command]
pub fn get_download_dir(app: tauri::AppHandle) -> Result<String, String> {
    let settings = config::load_settings(&app);
    let dir = settings.download.download_dir;

    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!("could not create download dir {}: {}", dir.display(), e);
    }

    Ok(dir.display().to_string())
}

/// Open the native folder picker and persist the chosen download
/// directory. `None` when the user cancels.
#[tauri::command]
pub async fn set_download_dir(app: tauri::AppHandle) -> Result<Option<String>, String> {
    let (tx, rx) = tokio::sync::oneshot::channel();

    app.dialog()
        .file()
        .set_title("Choose download folder")
        .pick_folder(move |folder| {
            let _ = tx.send(folder);
        });

    let picked = rx.await.map_err(|e| e.to_string())?;
    let Some(file_path) = picked else {
        return Ok(None);
    };

    let dir = file_path.into_path().map_err(|e| e.to_string())?;
    std::fs::create_dir_all(&dir).map_err(|e| e.to_string())?;

    let mut settings = config::load_settings(&app);
    settings.download.download_dir = dir.clone();
    config::save_settings(&app, &settings).map_err(|e| format!("Save: {}", e))?;

    tracing::info!("download dir set to {}", dir.display());
    Ok(Some(dir.display().to_string()))
}

fn merge_json(base: &mut serde_json::Value, patch: &serde_json::Value) {
    if let (Some(base_obj), Some(patch_obj)) = (base.as_object_mut(), patch.as_object()) {
        for (key, value) in patch_obj {
            if value.is_object() && base_obj.get(key).is_some_and(|v| v.is_object()) {
                merge_json(base_obj.get_mut(key).unwrap(), value);
            } else {
                base_obj.insert(key.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::merge_json;

    #[test]
    fn merge_patches_nested_objects() {
        let mut base = serde_json::json!({
            "download": {"quality": 320000, "save_lyric": false},
            "schema_version": 1
        });
        let patch = serde_json::json!({"download": {"quality": 0}});

        merge_json(&mut base, &patch);

        assert_eq!(base["download"]["quality"], 0);
        assert_eq!(base["download"]["save_lyric"], false);
        assert_eq!(base["schema_version"], 1);
    }
}
