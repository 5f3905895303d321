use tauri::Manager;

const LOGIN_WINDOW_LABEL: &str = "netease-login";
const LOGIN_URL: &str = "https://music.163.com/login";
const COOKIE_URL: &str = "https://music.163.com";

/// Open (or refocus) the catalog login window. The session cookie is read
/// back later with [`get_netease_login`].
#[tauri::command]
pub async fn netease_login(app: tauri::AppHandle) -> Result<(), String> {
    if let Some(existing) = app.get_webview_window(LOGIN_WINDOW_LABEL) {
        let _ = existing.set_focus();
        return Ok(());
    }

    let url = LOGIN_URL
        .parse()
        .map_err(|e| format!("invalid login URL: {}", e))?;

    tauri::WebviewWindowBuilder::new(&app, LOGIN_WINDOW_LABEL, tauri::WebviewUrl::External(url))
        .title("NetEase Login")
        .inner_size(800.0, 600.0)
        .build()
        .map_err(|e| format!("failed to create login window: {}", e))?;

    tracing::info!("login window opened");
    Ok(())
}

/// Read the session cookie from the login window, joined as
/// `name=value; ...`. `None` when the window is gone or has no cookies.
#[tauri::command]
pub async fn get_netease_login(app: tauri::AppHandle) -> Result<Option<String>, String> {
    let window = match app.get_webview_window(LOGIN_WINDOW_LABEL) {
        Some(w) => w,
        None => return Ok(None),
    };

    let url: tauri::Url = COOKIE_URL
        .parse()
        .map_err(|e| format!("invalid cookie URL: {}", e))?;

    match window.cookies_for_url(url) {
        Ok(cookies) if !cookies.is_empty() => {
            let joined = cookies
                .iter()
                .map(|c| format!("{}={}", c.name(), c.value()))
                .collect::<Vec<_>>()
                .join("; ");
            Ok(Some(joined))
        }
        Ok(_) => Ok(None),
        Err(e) => {
            tracing::warn!("could not read login cookies: {}", e);
            Ok(None)
        }
    }
}
