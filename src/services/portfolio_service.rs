use crate::error::{AppError, AppResult};
use crate::ledger::{self, Holding, PortfolioValuation};
use crate::models::PortfolioSnapshot;
use crate::repositories::{LedgerRepository, PortfolioRepository, UserRepository};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Read-side valuation and the periodic net-worth snapshot job
pub struct PortfolioService {
    user_repo: Arc<UserRepository>,
    ledger_repo: Arc<LedgerRepository>,
    portfolio_repo: Arc<PortfolioRepository>,
}

/// Outcome of one snapshot sweep
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotReport {
    pub snapshotted: usize,
    pub failed: usize,
}

impl PortfolioService {
    pub fn new(
        user_repo: Arc<UserRepository>,
        ledger_repo: Arc<LedgerRepository>,
        portfolio_repo: Arc<PortfolioRepository>,
    ) -> Self {
        Self {
            user_repo,
            ledger_repo,
            portfolio_repo,
        }
    }

    /// Compute the current valuation of a user's portfolio.
    ///
    /// Read-only; reflects the latest popularity snapshot per artist at call
    /// time. Positions whose artist has no snapshot yet are valued at their
    /// cost basis so they contribute no phantom gain or loss.
    pub async fn valuate(&self, user_id: Uuid) -> AppResult<PortfolioValuation> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        let rows = self
            .ledger_repo
            .positions_with_popularity(user_id)
            .await
            .map_err(AppError::from)?;

        let positions: Vec<(String, Holding, Decimal)> = rows
            .into_iter()
            .map(|row| {
                let current = row
                    .popularity
                    .map(Decimal::from)
                    .unwrap_or(row.avg_popularity);
                (
                    row.spotify_id,
                    Holding {
                        shares: row.shares,
                        avg_popularity: row.avg_popularity,
                    },
                    current,
                )
            })
            .collect();

        Ok(ledger::valuate(user.balance, &positions))
    }

    /// Snapshot every user's net worth into portfolio_history.
    ///
    /// Runs after each popularity refresh. Each user's snapshot attempt is
    /// independent: a failure is logged and skipped, the sweep continues.
    pub async fn snapshot_all_portfolios(&self) -> AppResult<SnapshotReport> {
        let user_ids = self.user_repo.list_ids().await?;
        info!("Snapshotting {} portfolios", user_ids.len());

        let mut report = SnapshotReport::default();

        for user_id in user_ids {
            match self.snapshot_user(user_id).await {
                Ok(_) => report.snapshotted += 1,
                Err(e) => {
                    error!("Failed to snapshot portfolio for user {}: {}", user_id, e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Portfolio snapshot sweep complete: {} ok, {} failed",
            report.snapshotted, report.failed
        );

        Ok(report)
    }

    async fn snapshot_user(&self, user_id: Uuid) -> AppResult<PortfolioSnapshot> {
        let valuation = self.valuate(user_id).await?;

        let snapshot = self
            .portfolio_repo
            .append_snapshot(
                user_id,
                valuation.net_worth,
                valuation.current_value,
                valuation.balance,
            )
            .await?;

        Ok(snapshot)
    }
}
