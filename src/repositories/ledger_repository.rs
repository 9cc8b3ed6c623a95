//! Repository applying ledger transitions atomically.
//!
//! Each mutation runs in a single database transaction: the user row and the
//! position row are read with `FOR UPDATE`, the pure transition from
//! [`crate::ledger`] is applied, and every write commits together or not at
//! all. Concurrent trades by the same user serialize on the user row lock;
//! no cross-user locking is involved.

use crate::error::RepositoryError;
use crate::ledger::{self, Holding};
use crate::models::{Position, TradePrivacy, TradeType, Transaction, User};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction as DbTransaction};
use uuid::Uuid;

/// A position joined with the latest recorded popularity for its artist.
/// `popularity` is `None` when the artist has no snapshot yet.
#[derive(Debug, Clone, FromRow)]
pub struct PositionPopularity {
    pub user_id: Uuid,
    pub spotify_id: String,
    pub shares: i64,
    pub avg_popularity: Decimal,
    pub popularity: Option<i32>,
}

pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Trade Operations
    // =========================================================================

    /// Buy `shares` of an artist at the given popularity.
    ///
    /// Debits the balance, creates or re-averages the position and appends a
    /// "buy" transaction record, all atomically. Returns the updated position.
    pub async fn buy(
        &self,
        user_id: Uuid,
        spotify_id: &str,
        shares: i64,
        popularity: Decimal,
        privacy: TradePrivacy,
    ) -> Result<Position, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user = Self::lock_user(&mut tx, user_id).await?;
        let holding = Self::lock_position(&mut tx, user_id, spotify_id).await?;

        let outcome = ledger::apply_buy(
            user.balance,
            holding.as_ref().map(Self::to_holding),
            shares,
            popularity,
        )?;

        Self::update_balance(&mut tx, user_id, outcome.balance_after).await?;

        let position = sqlx::query_as::<_, Position>(
            r#"
            INSERT INTO positions (user_id, spotify_id, shares, avg_popularity)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, spotify_id) DO UPDATE
            SET shares = EXCLUDED.shares,
                avg_popularity = EXCLUDED.avg_popularity,
                updated_at = NOW()
            RETURNING user_id, spotify_id, shares, avg_popularity, updated_at
            "#,
        )
        .bind(user_id)
        .bind(spotify_id)
        .bind(outcome.holding.shares)
        .bind(outcome.holding.avg_popularity)
        .fetch_one(&mut *tx)
        .await?;

        Self::record_trade(
            &mut tx,
            user_id,
            spotify_id,
            TradeType::Buy,
            shares,
            popularity,
            outcome.cost,
            user.balance,
            outcome.balance_after,
            privacy,
        )
        .await?;

        tx.commit().await?;

        Ok(position)
    }

    /// Sell `shares` of an artist at the given popularity.
    ///
    /// Credits the balance, shrinks or deletes the position (average basis
    /// untouched) and appends a "sell" transaction record, all atomically.
    /// Returns the remaining position, `None` after a full sell.
    pub async fn sell(
        &self,
        user_id: Uuid,
        spotify_id: &str,
        shares: i64,
        popularity: Decimal,
        privacy: TradePrivacy,
    ) -> Result<Option<Position>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user = Self::lock_user(&mut tx, user_id).await?;
        let holding = Self::lock_position(&mut tx, user_id, spotify_id).await?;

        let outcome = ledger::apply_sell(
            user.balance,
            holding.as_ref().map(Self::to_holding),
            shares,
            popularity,
        )?;

        Self::update_balance(&mut tx, user_id, outcome.balance_after).await?;

        let position = match outcome.holding {
            Some(remaining) => Some(
                sqlx::query_as::<_, Position>(
                    r#"
                    UPDATE positions
                    SET shares = $3, updated_at = NOW()
                    WHERE user_id = $1 AND spotify_id = $2
                    RETURNING user_id, spotify_id, shares, avg_popularity, updated_at
                    "#,
                )
                .bind(user_id)
                .bind(spotify_id)
                .bind(remaining.shares)
                .fetch_one(&mut *tx)
                .await?,
            ),
            None => {
                // Sold out: delete the row rather than keep it at zero shares
                sqlx::query("DELETE FROM positions WHERE user_id = $1 AND spotify_id = $2")
                    .bind(user_id)
                    .bind(spotify_id)
                    .execute(&mut *tx)
                    .await?;
                None
            }
        };

        Self::record_trade(
            &mut tx,
            user_id,
            spotify_id,
            TradeType::Sell,
            shares,
            popularity,
            outcome.proceeds,
            user.balance,
            outcome.balance_after,
            privacy,
        )
        .await?;

        tx.commit().await?;

        Ok(position)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Current position for a (user, artist) pair
    pub async fn find_position(
        &self,
        user_id: Uuid,
        spotify_id: &str,
    ) -> Result<Option<Position>, RepositoryError> {
        let position = sqlx::query_as::<_, Position>(
            r#"
            SELECT user_id, spotify_id, shares, avg_popularity, updated_at
            FROM positions
            WHERE user_id = $1 AND spotify_id = $2
            "#,
        )
        .bind(user_id)
        .bind(spotify_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(position)
    }

    /// All positions for a user
    pub async fn positions_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Position>, RepositoryError> {
        let positions = sqlx::query_as::<_, Position>(
            r#"
            SELECT user_id, spotify_id, shares, avg_popularity, updated_at
            FROM positions
            WHERE user_id = $1
            ORDER BY spotify_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(positions)
    }

    /// All positions for a user joined with the latest popularity snapshot
    /// per artist, for valuation
    pub async fn positions_with_popularity(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PositionPopularity>, RepositoryError> {
        let rows = sqlx::query_as::<_, PositionPopularity>(
            r#"
            SELECT p.user_id, p.spotify_id, p.shares, p.avg_popularity, h.popularity
            FROM positions p
            LEFT JOIN LATERAL (
                SELECT popularity
                FROM artist_history
                WHERE spotify_id = p.spotify_id
                ORDER BY recorded_at DESC
                LIMIT 1
            ) h ON TRUE
            WHERE p.user_id = $1
            ORDER BY p.spotify_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Trade history for a user, newest first
    pub async fn transactions_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, user_id, spotify_id, trade_type, shares, popularity_per_share,
                   total_amount, balance_before, balance_after, privacy, created_at
            FROM transactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn to_holding(position: &Position) -> Holding {
        Holding {
            shares: position.shares,
            avg_popularity: position.avg_popularity,
        }
    }

    async fn lock_user(
        tx: &mut DbTransaction<'_, Postgres>,
        user_id: Uuid,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, balance, is_admin, created_at
            FROM users
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("User {} not found", user_id)))
    }

    async fn lock_position(
        tx: &mut DbTransaction<'_, Postgres>,
        user_id: Uuid,
        spotify_id: &str,
    ) -> Result<Option<Position>, RepositoryError> {
        let position = sqlx::query_as::<_, Position>(
            r#"
            SELECT user_id, spotify_id, shares, avg_popularity, updated_at
            FROM positions
            WHERE user_id = $1 AND spotify_id = $2
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(spotify_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(position)
    }

    async fn update_balance(
        tx: &mut DbTransaction<'_, Postgres>,
        user_id: Uuid,
        balance: Decimal,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET balance = $2 WHERE id = $1")
            .bind(user_id)
            .bind(balance)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn record_trade(
        tx: &mut DbTransaction<'_, Postgres>,
        user_id: Uuid,
        spotify_id: &str,
        trade_type: TradeType,
        shares: i64,
        popularity: Decimal,
        total_amount: Decimal,
        balance_before: Decimal,
        balance_after: Decimal,
        privacy: TradePrivacy,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO transactions
            (user_id, spotify_id, trade_type, shares, popularity_per_share,
             total_amount, balance_before, balance_after, privacy)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user_id)
        .bind(spotify_id)
        .bind(trade_type.as_str())
        .bind(shares)
        .bind(popularity)
        .bind(total_amount)
        .bind(balance_before)
        .bind(balance_after)
        .bind(privacy.as_str())
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}