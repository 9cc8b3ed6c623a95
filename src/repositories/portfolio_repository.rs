//! Repository for the append-only net-worth time series

use crate::models::PortfolioSnapshot;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

pub struct PortfolioRepository {
    pool: PgPool,
}

impl PortfolioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a net-worth snapshot for a user
    pub async fn append_snapshot(
        &self,
        user_id: Uuid,
        net_worth: Decimal,
        portfolio_value: Decimal,
        balance: Decimal,
    ) -> SqlxResult<PortfolioSnapshot> {
        sqlx::query_as::<_, PortfolioSnapshot>(
            r#"
            INSERT INTO portfolio_history (user_id, net_worth, portfolio_value, balance)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, net_worth, portfolio_value, balance, recorded_at
            "#,
        )
        .bind(user_id)
        .bind(net_worth)
        .bind(portfolio_value)
        .bind(balance)
        .fetch_one(&self.pool)
        .await
    }

    /// Net-worth history for a user since a point in time, oldest first
    pub async fn history_for_user(
        &self,
        user_id: Uuid,
        since: NaiveDateTime,
    ) -> SqlxResult<Vec<PortfolioSnapshot>> {
        sqlx::query_as::<_, PortfolioSnapshot>(
            r#"
            SELECT id, user_id, net_worth, portfolio_value, balance, recorded_at
            FROM portfolio_history
            WHERE user_id = $1 AND recorded_at >= $2
            ORDER BY recorded_at
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await
    }
}
