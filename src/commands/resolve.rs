use crate::core::http_client;
use crate::core::redirect::{self, RedirectOutcome};
use crate::core::scan;

/// Privileged short-link resolution: manual redirect following plus a full
/// scan of the final page. `None` means "could not resolve" — callers must
/// not fall back to unrelated results.
#[tauri::command]
pub async fn resolve_short_link(url: String) -> Result<Option<String>, String> {
    tracing::info!("resolving short link {}", url);

    let client = match http_client::redirect_capture_client() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("could not build resolver client: {}", e);
            return Ok(None);
        }
    };

    match redirect::resolve_via_redirects(&client, &url).await {
        Ok(RedirectOutcome::TrackId(id)) => Ok(Some(id)),
        Ok(RedirectOutcome::Body { final_url, html }) => {
            let id = scan::track_id_from_html(&html);
            if id.is_none() {
                tracing::info!("no track id found in {}", final_url);
            }
            Ok(id)
        }
        Err(e) => {
            tracing::warn!("short-link resolution failed: {:#}", e);
            Ok(None)
        }
    }
}
