use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Point-in-time record of a user's aggregate net worth, written by the
/// periodic snapshot job after each popularity refresh.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PortfolioSnapshot {
    pub id: i64,
    pub user_id: Uuid,
    pub net_worth: Decimal,
    pub portfolio_value: Decimal,
    pub balance: Decimal,
    pub recorded_at: NaiveDateTime,
}
