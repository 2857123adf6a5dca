use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use std::sync::Arc;
use tracing::info;
use watch_sync_config::{CredentialStore, PathManager};

use crate::error::SourceError;
use crate::traits::{EpisodeMatch, HistoryEntry, HistoryService, MovieMatch, ShowMatch};
use crate::trakt::{api, auth};

/// Trakt as the remote tracking service: catalog lookups plus history
/// submission. Construct once with the application credentials, call
/// `authenticate` before the first service call.
#[derive(Clone)]
pub struct TraktClient {
    client: Arc<Client>,
    client_id: String,
    client_secret: String,
    access_token: Option<String>,
}

impl TraktClient {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client: Arc::new(auth::create_trakt_client()),
            client_id,
            client_secret,
            access_token: None,
        }
    }

    /// Establish the session: reuse an unexpired saved token, refresh an
    /// expired one, or walk through a new authorization. Tokens persist in
    /// the credentials file between runs.
    pub async fn authenticate(&mut self) -> anyhow::Result<()> {
        let path_manager = PathManager::default();
        let mut cred_store = CredentialStore::new(path_manager.credentials_file());
        cred_store.load()?;

        if let (Some(saved_token), Some(expires_at)) = (
            cred_store.get_trakt_access_token(),
            cred_store.get_trakt_token_expires(),
        ) {
            // Token is good if it expires more than 5 minutes from now
            if expires_at > Utc::now() + Duration::minutes(5) {
                self.access_token = Some(saved_token.clone());
                info!("Using saved Trakt access token (expires at {})", expires_at);
                return Ok(());
            }
            info!(
                "Trakt access token expired or expiring soon (expires at {}), refreshing",
                expires_at
            );
        }

        let refresh_token = cred_store.get_trakt_refresh_token().map(|s| s.as_str());
        let token_info =
            auth::authenticate(&self.client_id, &self.client_secret, refresh_token).await?;

        self.access_token = Some(token_info.access_token.clone());

        cred_store.set_trakt_access_token(token_info.access_token);
        cred_store.set_trakt_refresh_token(token_info.refresh_token);
        cred_store.set_trakt_token_expires(token_info.expires_at);
        cred_store.save()?;

        info!("Authenticated to Trakt");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    fn access_token(&self) -> Result<&str, SourceError> {
        self.access_token
            .as_deref()
            .ok_or_else(|| SourceError::new("Not authenticated"))
    }
}

#[async_trait]
impl HistoryService for TraktClient {
    fn service_name(&self) -> &str {
        "trakt"
    }

    async fn find_movie(&self, external_id: i64) -> Result<Option<MovieMatch>, SourceError> {
        api::find_movie(
            &self.client,
            &self.client_id,
            self.access_token.as_deref(),
            external_id,
        )
        .await
        .map_err(SourceError::from_err)
    }

    async fn find_show(&self, external_id: i64) -> Result<Option<ShowMatch>, SourceError> {
        api::find_show(
            &self.client,
            &self.client_id,
            self.access_token.as_deref(),
            external_id,
        )
        .await
        .map_err(SourceError::from_err)
    }

    async fn find_episode(
        &self,
        show: &ShowMatch,
        season: i64,
        episode: i64,
    ) -> Result<Option<EpisodeMatch>, SourceError> {
        let show_ref = show
            .ids
            .show_ref()
            .ok_or_else(|| SourceError::new("show match carries no usable id"))?;
        api::get_episode(
            &self.client,
            &self.client_id,
            self.access_token.as_deref(),
            &show_ref,
            season,
            episode,
        )
        .await
        .map_err(SourceError::from_err)
    }

    async fn add_to_history(&self, entry: &HistoryEntry) -> Result<(), SourceError> {
        let access_token = self.access_token()?;
        api::add_to_history(&self.client, &self.client_id, access_token, entry)
            .await
            .map_err(SourceError::from_err)
    }
}
