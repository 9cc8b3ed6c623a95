use crate::error::{AppError, AppResult, LedgerError};
use crate::models::{Position, TradePrivacy, Transaction};
use crate::repositories::{ArtistRepository, HistoryRepository, LedgerRepository};
use crate::services::catalog::CatalogClient;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Service orchestrating trades.
///
/// Validates share counts against the per-transaction cap, resolves the
/// artist (fetching it from the catalog on first trade), looks up the
/// current popularity from the history store and delegates the atomic
/// balance/position mutation to the ledger repository.
pub struct TradingService {
    artist_repo: Arc<ArtistRepository>,
    history_repo: Arc<HistoryRepository>,
    ledger_repo: Arc<LedgerRepository>,
    catalog: Arc<CatalogClient>,
    max_shares_per_trade: i64,
}

impl TradingService {
    pub fn new(
        artist_repo: Arc<ArtistRepository>,
        history_repo: Arc<HistoryRepository>,
        ledger_repo: Arc<LedgerRepository>,
        catalog: Arc<CatalogClient>,
        max_shares_per_trade: i64,
    ) -> Self {
        Self {
            artist_repo,
            history_repo,
            ledger_repo,
            catalog,
            max_shares_per_trade,
        }
    }

    /// Buy shares of an artist at the latest recorded popularity
    pub async fn buy(
        &self,
        user_id: Uuid,
        spotify_id: &str,
        shares: i64,
        privacy: TradePrivacy,
    ) -> AppResult<Position> {
        self.validate_share_count(shares)?;
        let popularity = self.resolve_current_popularity(spotify_id).await?;

        info!(
            "Buy: user={}, artist={}, shares={}, popularity={}",
            user_id, spotify_id, shares, popularity
        );

        let position = self
            .ledger_repo
            .buy(user_id, spotify_id, shares, popularity, privacy)
            .await
            .map_err(AppError::from)?;

        Ok(position)
    }

    /// Sell shares of an artist at the latest recorded popularity.
    /// Returns the remaining position, `None` after a full sell.
    pub async fn sell(
        &self,
        user_id: Uuid,
        spotify_id: &str,
        shares: i64,
        privacy: TradePrivacy,
    ) -> AppResult<Option<Position>> {
        self.validate_share_count(shares)?;
        let popularity = self.resolve_current_popularity(spotify_id).await?;

        info!(
            "Sell: user={}, artist={}, shares={}, popularity={}",
            user_id, spotify_id, shares, popularity
        );

        let position = self
            .ledger_repo
            .sell(user_id, spotify_id, shares, popularity, privacy)
            .await
            .map_err(AppError::from)?;

        Ok(position)
    }

    /// Trade history for a user
    pub async fn transactions(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<Transaction>> {
        self.ledger_repo
            .transactions_for_user(user_id, limit)
            .await
            .map_err(AppError::from)
    }

    fn validate_share_count(&self, shares: i64) -> Result<(), LedgerError> {
        if shares <= 0 || shares > self.max_shares_per_trade {
            return Err(LedgerError::InvalidShareCount(shares));
        }
        Ok(())
    }

    /// Current per-share valuation for the artist.
    ///
    /// Unknown artists are fetched from the catalog, stored, and seeded with
    /// an initial popularity snapshot. Known artists with no snapshot yet
    /// fail with `NoPriceData`; a price of zero is never assumed.
    async fn resolve_current_popularity(&self, spotify_id: &str) -> AppResult<Decimal> {
        if self.artist_repo.find_by_id(spotify_id).await?.is_none() {
            let fetched = self.catalog.lookup(spotify_id).await?;
            self.artist_repo
                .find_or_create(&fetched.id, &fetched.name, fetched.image_url.as_deref())
                .await?;
            self.history_repo
                .append_snapshot(&fetched.id, fetched.popularity)
                .await?;
            info!(
                "Tracking new artist {} ({}) at popularity {}",
                fetched.name, fetched.id, fetched.popularity
            );
        }

        let popularity = self
            .history_repo
            .latest(spotify_id)
            .await?
            .ok_or_else(|| LedgerError::NoPriceData(spotify_id.to_string()))?;

        Ok(Decimal::from(popularity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogConfig;
    use sqlx::postgres::PgPoolOptions;

    // Lazy pool: share-count validation rejects before any query is issued,
    // so these tests never need a live database.
    fn service(max_shares_per_trade: i64) -> TradingService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/anticip_test")
            .unwrap();

        TradingService::new(
            Arc::new(ArtistRepository::new(pool.clone())),
            Arc::new(HistoryRepository::new(pool.clone())),
            Arc::new(LedgerRepository::new(pool)),
            Arc::new(CatalogClient::new(CatalogConfig::default())),
            max_shares_per_trade,
        )
    }

    #[tokio::test]
    async fn buy_over_the_share_cap_is_rejected() {
        let svc = service(10_000);
        let err = svc
            .buy(
                Uuid::new_v4(),
                "3WrFJ7ztbogyGnTHbHJFl2",
                10_001,
                TradePrivacy::Public,
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Ledger(LedgerError::InvalidShareCount(10_001))
        ));
    }

    #[tokio::test]
    async fn sell_over_the_share_cap_is_rejected() {
        let svc = service(100);
        let err = svc
            .sell(
                Uuid::new_v4(),
                "3WrFJ7ztbogyGnTHbHJFl2",
                101,
                TradePrivacy::Private,
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Ledger(LedgerError::InvalidShareCount(101))
        ));
    }

    #[tokio::test]
    async fn share_counts_up_to_the_cap_pass_validation() {
        let svc = service(10_000);
        assert!(svc.validate_share_count(1).is_ok());
        assert!(svc.validate_share_count(10_000).is_ok());
        assert!(matches!(
            svc.validate_share_count(0),
            Err(LedgerError::InvalidShareCount(0))
        ));
    }
}
