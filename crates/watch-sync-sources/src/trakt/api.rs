use anyhow::{anyhow, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::traits::{EpisodeMatch, HistoryEntry, HistoryEntryKind, MovieMatch, ShowMatch};

const BASE_URL: &str = "https://api.trakt.tv";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TraktIds {
    pub imdb: Option<String>,
    pub trakt: Option<u64>,
    pub tmdb: Option<u64>,
    pub tvdb: Option<u64>,
    pub slug: Option<String>,
}

impl TraktIds {
    /// Reference usable in path segments of show-scoped endpoints.
    pub fn show_ref(&self) -> Option<String> {
        self.trakt
            .map(|id| id.to_string())
            .or_else(|| self.slug.clone())
    }
}

#[derive(Debug, Deserialize)]
struct IdLookupResult {
    #[serde(rename = "type")]
    item_type: String,
    movie: Option<LookupEntity>,
    show: Option<LookupEntity>,
}

#[derive(Debug, Deserialize)]
struct LookupEntity {
    title: String,
    year: Option<u32>,
    ids: TraktIds,
}

#[derive(Debug, Deserialize)]
struct EpisodeBody {
    season: i64,
    number: i64,
    ids: TraktIds,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    added: HistoryCounts,
}

#[derive(Debug, Deserialize)]
struct HistoryCounts {
    #[serde(default)]
    movies: u32,
    #[serde(default)]
    episodes: u32,
}

fn with_api_headers(
    request: RequestBuilder,
    client_id: &str,
    access_token: Option<&str>,
) -> RequestBuilder {
    let request = request
        .header("trakt-api-version", "2")
        .header("trakt-api-key", client_id)
        .header("Accept", "application/json")
        .header("Accept-Language", "en-US,en;q=0.9")
        .header("Content-Type", "application/json")
        .header("Origin", "https://trakt.tv")
        .header("Referer", "https://trakt.tv/");
    match access_token {
        Some(token) => request.header("Authorization", format!("Bearer {}", token)),
        None => request,
    }
}

/// Pick the first candidate of the expected type from an id-lookup response.
fn first_lookup_entity(items: Vec<IdLookupResult>, expected_type: &str) -> Option<LookupEntity> {
    items.into_iter().find_map(|item| {
        if item.item_type != expected_type {
            return None;
        }
        match expected_type {
            "movie" => item.movie,
            "show" => item.show,
            _ => None,
        }
    })
}

async fn id_lookup(
    client: &Client,
    client_id: &str,
    access_token: Option<&str>,
    tmdb_id: i64,
    expected_type: &str,
) -> Result<Option<LookupEntity>> {
    let url = format!(
        "{}/search/tmdb/{}?type={}",
        BASE_URL,
        tmdb_id,
        urlencoding::encode(expected_type)
    );

    let response = with_api_headers(client.get(&url), client_id, access_token)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(anyhow!(
            "TMDB id lookup failed for {} ({}): {} - {}",
            tmdb_id,
            expected_type,
            status,
            error_text
        ));
    }

    let items: Vec<IdLookupResult> = response.json().await?;
    let entity = first_lookup_entity(items, expected_type);

    match &entity {
        Some(e) => debug!(
            "Trakt lookup: tmdb_id={} type={} -> '{}' (trakt={:?})",
            tmdb_id, expected_type, e.title, e.ids.trakt
        ),
        None => debug!(
            "Trakt lookup: tmdb_id={} type={} -> no candidates",
            tmdb_id, expected_type
        ),
    }

    Ok(entity)
}

/// Look up a movie by its TMDB id. Empty candidate list means not found.
pub async fn find_movie(
    client: &Client,
    client_id: &str,
    access_token: Option<&str>,
    tmdb_id: i64,
) -> Result<Option<MovieMatch>> {
    let entity = id_lookup(client, client_id, access_token, tmdb_id, "movie").await?;
    Ok(entity.map(|e| MovieMatch {
        title: e.title,
        year: e.year,
        ids: e.ids,
    }))
}

/// Look up a show by its TMDB id.
pub async fn find_show(
    client: &Client,
    client_id: &str,
    access_token: Option<&str>,
    tmdb_id: i64,
) -> Result<Option<ShowMatch>> {
    let entity = id_lookup(client, client_id, access_token, tmdb_id, "show").await?;
    Ok(entity.map(|e| ShowMatch {
        title: e.title,
        year: e.year,
        ids: e.ids,
    }))
}

/// Fetch one episode of an already resolved show. HTTP 404 means the show
/// exists but this season/episode pair does not.
pub async fn get_episode(
    client: &Client,
    client_id: &str,
    access_token: Option<&str>,
    show_ref: &str,
    season: i64,
    episode: i64,
) -> Result<Option<EpisodeMatch>> {
    let url = format!(
        "{}/shows/{}/seasons/{}/episodes/{}",
        BASE_URL,
        urlencoding::encode(show_ref),
        season,
        episode
    );

    let response = with_api_headers(client.get(&url), client_id, access_token)
        .send()
        .await?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        debug!(
            "Trakt episode lookup: show={} s{:02}e{:02} not found",
            show_ref, season, episode
        );
        return Ok(None);
    }
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(anyhow!(
            "Episode lookup failed for show {} s{:02}e{:02}: {} - {}",
            show_ref,
            season,
            episode,
            status,
            error_text
        ));
    }

    let body: EpisodeBody = response.json().await?;
    Ok(Some(EpisodeMatch {
        season: body.season,
        number: body.number,
        ids: body.ids,
    }))
}

/// Payload for POST /sync/history: movies and episodes are separate arrays.
fn history_payload(entry: &HistoryEntry) -> serde_json::Value {
    let item = serde_json::json!({
        "ids": { "trakt": entry.trakt_id },
        "watched_at": entry.watched_at.to_rfc3339()
    });

    match entry.kind {
        HistoryEntryKind::Movie => serde_json::json!({ "movies": [item], "episodes": [] }),
        HistoryEntryKind::Episode => serde_json::json!({ "movies": [], "episodes": [item] }),
    }
}

/// Append one watched event to the user's history log.
pub async fn add_to_history(
    client: &Client,
    client_id: &str,
    access_token: &str,
    entry: &HistoryEntry,
) -> Result<()> {
    let payload = history_payload(entry);

    let response = with_api_headers(
        client.post(format!("{}/sync/history", BASE_URL)),
        client_id,
        Some(access_token),
    )
    .json(&payload)
    .send()
    .await?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(anyhow!(
            "Failed to add history entry: {} - {}",
            status,
            error_text
        ));
    }

    let body: HistoryResponse = response.json().await?;
    if body.added.movies + body.added.episodes == 0 {
        warn!("Trakt accepted the request but added no history entries");
        return Err(anyhow!("remote service did not accept the history entry"));
    }

    Ok(())
}
