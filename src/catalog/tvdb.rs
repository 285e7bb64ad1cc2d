//! TheTVDB catalog provider implementation.

use super::tvdb_types::{
    TvdbEpisode, TvdbEpisodesResponse, TvdbLoginRequest, TvdbLoginResponse, TvdbSearchResponse,
};
use super::{CatalogError, CatalogProvider, EpisodePage, RemoteEpisode, SeriesMatch};
use reqwest::blocking::{Client, RequestBuilder, Response};
use std::time::Duration;
use tracing::debug;

/// Base URL of TheTVDB v4 API
pub const TVDB_API_BASE: &str = "https://api4.thetvdb.com/v4";

/// Catalog provider for TheTVDB v4 API.
///
/// A value of this type is an authenticated session: [`TvdbProvider::login`]
/// exchanges the API key (and optional subscriber PIN) for a bearer token
/// once, and the token is never mutated afterwards. Sharing the provider
/// between worker threads therefore needs no locking.
pub struct TvdbProvider {
    client: Client,
    base_url: String,
    token: String,
}

impl TvdbProvider {
    /// Authenticates against the public TheTVDB endpoint.
    pub fn login(
        api_key: &str,
        pin: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        Self::login_at(TVDB_API_BASE, api_key, pin, timeout)
    }

    /// Authenticates against a TheTVDB-compatible endpoint at `base_url`.
    ///
    /// A non-success answer is reported as [`CatalogError::Authentication`]
    /// with the response body included verbatim.
    pub fn login_at(
        base_url: &str,
        api_key: &str,
        pin: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::Request(e.to_string()))?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let response = client
            .post(format!("{base_url}/login"))
            .json(&TvdbLoginRequest {
                apikey: api_key,
                pin,
            })
            .send()
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Keep whatever the provider said, even if it is not JSON
            let body = response
                .text()
                .unwrap_or_else(|e| format!("<unreadable response body: {e}>"));
            return Err(CatalogError::Authentication {
                status: status.as_u16(),
                body,
            });
        }

        let login: TvdbLoginResponse = response
            .json()
            .map_err(|e| CatalogError::Parse(e.to_string()))?;
        debug!("authenticated with catalog at {base_url}");

        Ok(Self {
            client,
            base_url,
            token: login.data.token,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token)
    }

    /// Sends a request and rejects non-success statuses
    fn send(&self, request: RequestBuilder, url: &str) -> Result<Response, CatalogError> {
        let response = self
            .authorized(request)
            .send()
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CatalogError::Http {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }

    /// Converts a TheTVDB episode to our raw episode structure.
    fn convert_episode(episode: TvdbEpisode) -> RemoteEpisode {
        RemoteEpisode {
            season_number: episode.season_number,
            episode_number: episode.number,
            title: episode.name,
            air_date: episode.aired,
        }
    }

    /// Converts one episodes response into a page.
    ///
    /// A `links.next` that is null, absent or an empty string marks the last
    /// page.
    fn convert_page(response: TvdbEpisodesResponse) -> EpisodePage {
        let episodes = response
            .data
            .and_then(|data| data.episodes)
            .unwrap_or_default()
            .into_iter()
            .map(Self::convert_episode)
            .collect();

        let has_next = response
            .links
            .and_then(|links| links.next)
            .is_some_and(|next| match next {
                serde_json::Value::Null => false,
                serde_json::Value::String(url) => !url.is_empty(),
                _ => true,
            });

        EpisodePage { episodes, has_next }
    }

    fn convert_search(response: TvdbSearchResponse) -> Vec<SeriesMatch> {
        response
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|result| SeriesMatch {
                year: result.parsed_year(),
                id: result.tvdb_id,
                name: result.name,
            })
            .collect()
    }
}

impl CatalogProvider for TvdbProvider {
    fn search_series(&self, query: &str) -> Result<Vec<SeriesMatch>, CatalogError> {
        let url = format!("{}/search", self.base_url);
        let request = self
            .client
            .get(&url)
            .query(&[("query", query), ("type", "series")]);

        let response: TvdbSearchResponse = self
            .send(request, &url)?
            .json()
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        Ok(Self::convert_search(response))
    }

    fn episodes_page(&self, series_id: &str, page: u32) -> Result<EpisodePage, CatalogError> {
        let url = format!("{}/series/{}/episodes/default", self.base_url, series_id);
        let request = self.client.get(&url).query(&[("page", page)]);

        let response: TvdbEpisodesResponse = self
            .send(request, &url)?
            .json()
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        Ok(Self::convert_page(response))
    }
}
