//! Client for the external artist catalog (Spotify-style API).
//!
//! Supplies artist identity and the popularity score in [0,100] that the
//! ledger uses as the per-share valuation. Failures here abort only the
//! triggering operation; they never touch ledger state.

use crate::config::CatalogConfig;
use crate::error::{AppError, AppResult, LedgerError};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::warn;

/// Artist record as returned by the catalog provider
#[derive(Debug, Clone)]
pub struct CatalogArtist {
    pub id: String,
    pub name: String,
    pub popularity: i32,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct ArtistResponse {
    id: String,
    name: String,
    popularity: i32,
    #[serde(default)]
    images: Vec<ImageResponse>,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    artists: SearchArtists,
}

#[derive(Debug, Deserialize)]
struct SearchArtists {
    items: Vec<ArtistResponse>,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

pub struct CatalogClient {
    config: CatalogConfig,
    http: Client,
    token: RwLock<Option<CachedToken>>,
}

impl CatalogClient {
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            config,
            http: Client::new(),
            token: RwLock::new(None),
        }
    }

    /// Look up a single artist by catalog id
    pub async fn lookup(&self, artist_id: &str) -> AppResult<CatalogArtist> {
        let token = self.access_token().await?;
        let url = format!("{}/artists/{}", self.config.api_base_url, artist_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Catalog request failed: {}", e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                Err(AppError::Ledger(LedgerError::ArtistNotFound(artist_id.to_string())))
            }
            status if !status.is_success() => Err(AppError::ExternalService(format!(
                "Catalog returned {} for artist {}",
                status, artist_id
            ))),
            _ => {
                let artist: ArtistResponse = response.json().await.map_err(|e| {
                    AppError::ExternalService(format!("Invalid catalog response: {}", e))
                })?;
                Ok(Self::into_catalog_artist(artist))
            }
        }
    }

    /// Search artists by name
    pub async fn search(&self, query: &str, limit: u32) -> AppResult<Vec<CatalogArtist>> {
        let token = self.access_token().await?;
        let url = format!("{}/search", self.config.api_base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .query(&[
                ("q", query),
                ("type", "artist"),
                ("limit", &limit.to_string()),
            ])
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Catalog search failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Catalog search returned {}",
                response.status()
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Invalid search response: {}", e)))?;

        Ok(body
            .artists
            .items
            .into_iter()
            .map(Self::into_catalog_artist)
            .collect())
    }

    fn into_catalog_artist(artist: ArtistResponse) -> CatalogArtist {
        CatalogArtist {
            id: artist.id,
            name: artist.name,
            // Provider guarantees [0,100] but clamp anyway since the
            // history table enforces the range
            popularity: artist.popularity.clamp(0, 100),
            image_url: artist.images.into_iter().next().map(|i| i.url),
        }
    }

    /// Get a valid bearer token, refreshing via client-credentials when the
    /// cached one is missing or about to expire
    async fn access_token(&self) -> AppResult<String> {
        {
            let cached = self.token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at > Instant::now() {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let mut cached = self.token.write().await;
        // Another task may have refreshed while we waited for the lock
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.access_token.clone());
            }
        }

        let response = self
            .http
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            warn!("Catalog token endpoint returned {}", response.status());
            return Err(AppError::ExternalService(format!(
                "Token endpoint returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Invalid token response: {}", e)))?;

        let access_token = token.access_token.clone();
        // Refresh one minute early to avoid racing expiry
        let lifetime = Duration::from_secs(token.expires_in.saturating_sub(60).max(30));
        *cached = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + lifetime,
        });

        Ok(access_token)
    }
}
