//! Periodic popularity refresh job.
//!
//! The daily cron of the platform: walks every tracked artist, fetches the
//! current popularity from the catalog and appends it to artist_history,
//! then triggers a portfolio snapshot sweep so net-worth history follows
//! each price refresh. One artist's failed refresh is logged and skipped.

use crate::repositories::{ArtistRepository, HistoryRepository};
use crate::services::catalog::CatalogClient;
use crate::services::portfolio_service::PortfolioService;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{error, info, warn};

pub struct PopularityRefresher {
    artist_repo: Arc<ArtistRepository>,
    history_repo: Arc<HistoryRepository>,
    catalog: Arc<CatalogClient>,
    portfolio_service: Arc<PortfolioService>,
    refresh_interval: Duration,
    /// Pause between catalog calls to stay under provider rate limits
    request_spacing: Duration,
}

impl PopularityRefresher {
    pub fn new(
        artist_repo: Arc<ArtistRepository>,
        history_repo: Arc<HistoryRepository>,
        catalog: Arc<CatalogClient>,
        portfolio_service: Arc<PortfolioService>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            artist_repo,
            history_repo,
            catalog,
            portfolio_service,
            refresh_interval,
            request_spacing: Duration::from_millis(300),
        }
    }

    /// Set spacing between catalog requests
    pub fn with_request_spacing(mut self, spacing: Duration) -> Self {
        self.request_spacing = spacing;
        self
    }

    /// Run the refresh loop forever
    pub async fn start(self) {
        let mut interval = time::interval(self.refresh_interval);
        info!(
            "Popularity refresher started, sweeping every {:?}",
            self.refresh_interval
        );

        loop {
            interval.tick().await;

            if let Err(e) = self.refresh_all().await {
                error!("Error in popularity refresh sweep: {}", e);
            }
        }
    }

    /// Refresh every artist once, then snapshot all portfolios
    pub async fn refresh_all(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let artists = self.artist_repo.list_all().await?;

        if artists.is_empty() {
            return Ok(());
        }

        info!("Refreshing popularity for {} artists", artists.len());
        let mut updated = 0usize;
        let mut failed = 0usize;

        for (i, artist) in artists.iter().enumerate() {
            match self.refresh_one(&artist.spotify_id).await {
                Ok(popularity) => {
                    updated += 1;
                    info!(
                        "Updated {} ({}): popularity {}",
                        artist.name, artist.spotify_id, popularity
                    );
                }
                Err(e) => {
                    failed += 1;
                    warn!(
                        "Failed to refresh {} ({}): {}",
                        artist.name, artist.spotify_id, e
                    );
                }
            }

            if i + 1 < artists.len() {
                time::sleep(self.request_spacing).await;
            }
        }

        info!(
            "Popularity refresh complete: {} updated, {} failed",
            updated, failed
        );

        // Net-worth history tracks each price refresh
        if let Err(e) = self.portfolio_service.snapshot_all_portfolios().await {
            error!("Portfolio snapshot sweep failed: {}", e);
        }

        Ok(())
    }

    async fn refresh_one(
        &self,
        spotify_id: &str,
    ) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        let fetched = self.catalog.lookup(spotify_id).await?;
        self.history_repo
            .append_snapshot(spotify_id, fetched.popularity)
            .await?;
        Ok(fetched.popularity)
    }
}
