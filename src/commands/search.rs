use futures::future::join_all;

use crate::core::catalog::Catalog;
use crate::core::input::{self, InputKind};
use crate::core::resolver::ShortLinkResolver;
use crate::models::track::Track;
use crate::AppState;

/// Classify the input and run the matching catalog query. Catalog errors
/// are logged and collapse to "no results"; an unresolvable link never
/// degrades into a free-text search.
pub async fn run_search(
    catalog: &dyn Catalog,
    resolver: &ShortLinkResolver,
    value: &str,
    limit: usize,
    offset: usize,
) -> Vec<Track> {
    let parsed = input::classify(value, resolver).await;

    match parsed.kind {
        InputKind::TrackId => match catalog.song_detail(&parsed.value).await {
            Ok(Some(track)) => vec![track],
            Ok(None) => {
                tracing::info!("no track found for id {}", parsed.value);
                Vec::new()
            }
            Err(_) => Vec::new(),
        },
        InputKind::PlaylistId => {
            let ids = match catalog.playlist_track_ids(&parsed.value).await {
                Ok(ids) => ids,
                Err(_) => return Vec::new(),
            };

            let window: Vec<String> = ids.into_iter().skip(offset).take(limit).collect();
            let lookups = join_all(window.iter().map(|id| catalog.song_detail(id))).await;
            lookups
                .into_iter()
                .filter_map(|result| result.ok().flatten())
                .collect()
        }
        InputKind::SearchQuery => {
            if parsed.value.trim().is_empty() {
                return Vec::new();
            }

            let (limit, offset) = if parsed.exact_match { (1, 0) } else { (limit, offset) };
            catalog
                .search(&parsed.value, limit, offset)
                .await
                .unwrap_or_default()
        }
    }
}

#[tauri::command]
pub async fn search_tracks(
    state: tauri::State<'_, AppState>,
    value: String,
    limit: Option<usize>,
    offset: Option<usize>,
) -> Result<Vec<Track>, String> {
    let limit = limit.unwrap_or(5);
    let offset = offset.unwrap_or(0);

    Ok(run_search(
        state.catalog.as_ref(),
        &state.resolver,
        &value,
        limit,
        offset,
    )
    .await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolver::test_support::{
        failing_step, fixed_step, make_track, resolver_with_steps, FakeCatalog,
    };

    #[tokio::test]
    async fn track_link_returns_single_detail_row() {
        let mut catalog = FakeCatalog::empty();
        catalog
            .detail
            .insert("12345".to_string(), make_track("12345", "夜曲", "周杰伦"));
        let resolver = resolver_with_steps(vec![]);

        let rows = run_search(
            &catalog,
            &resolver,
            "https://music.163.com/song?id=12345",
            5,
            0,
        )
        .await;

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "12345");
    }

    #[tokio::test]
    async fn unknown_track_id_yields_no_rows() {
        let catalog = FakeCatalog::empty();
        let resolver = resolver_with_steps(vec![]);

        let rows = run_search(
            &catalog,
            &resolver,
            "https://music.163.com/song?id=404",
            5,
            0,
        )
        .await;

        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn playlist_window_respects_limit_and_offset() {
        let mut catalog = FakeCatalog::with_results(vec![
            make_track("1", "one", "a"),
            make_track("2", "two", "a"),
            make_track("3", "three", "a"),
            make_track("4", "four", "a"),
        ]);
        for track in catalog.results.clone() {
            catalog.detail.insert(track.id.clone(), track);
        }
        let resolver = resolver_with_steps(vec![]);

        let rows = run_search(
            &catalog,
            &resolver,
            "https://music.163.com/playlist?id=99",
            2,
            1,
        )
        .await;

        let ids: Vec<&str> = rows.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["2", "3"]);
    }

    #[tokio::test]
    async fn resolved_short_link_flows_into_detail_lookup() {
        let mut catalog = FakeCatalog::empty();
        catalog
            .detail
            .insert("12345".to_string(), make_track("12345", "夜曲", "周杰伦"));
        let resolver = resolver_with_steps(vec![fixed_step("fixture", "12345")]);

        let rows = run_search(&catalog, &resolver, "http://163cn.tv/abcDEF", 5, 0).await;

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "12345");
    }

    #[tokio::test]
    async fn failed_short_link_with_hints_runs_exact_search() {
        let catalog = FakeCatalog::with_results(vec![
            make_track("7", "夜曲", "张三"),
            make_track("8", "夜曲 remix", "张三"),
        ]);
        let resolver = resolver_with_steps(vec![failing_step("down")]);

        let rows = run_search(
            &catalog,
            &resolver,
            "分享张三的单曲《夜曲》: http://163cn.tv/xyz",
            5,
            0,
        )
        .await;

        // Exact-match searches are narrowed to the single best row.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "7");
    }

    #[tokio::test]
    async fn unrecognized_link_never_free_text_searches() {
        let catalog = FakeCatalog::with_results(vec![make_track("1", "unrelated", "x")]);
        let resolver = resolver_with_steps(vec![]);

        let rows = run_search(&catalog, &resolver, "https://example.com/page", 5, 0).await;

        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn free_text_searches_the_catalog() {
        let catalog = FakeCatalog::with_results(vec![make_track("1", "晴天", "周杰伦")]);
        let resolver = resolver_with_steps(vec![]);

        let rows = run_search(&catalog, &resolver, "晴天", 5, 0).await;

        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn blank_input_yields_no_rows() {
        let catalog = FakeCatalog::with_results(vec![make_track("1", "x", "y")]);
        let resolver = resolver_with_steps(vec![]);

        assert!(run_search(&catalog, &resolver, "   ", 5, 0).await.is_empty());
    }
}
