//! Trade audit records

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Direction of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeType {
    Buy,
    Sell,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "buy" => Some(Self::Buy),
            "sell" => Some(Self::Sell),
            _ => None,
        }
    }
}

/// Who may see a trade in the social feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradePrivacy {
    Public,
    Followers,
    Private,
}

impl TradePrivacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Followers => "followers",
            Self::Private => "private",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "public" => Some(Self::Public),
            "followers" => Some(Self::Followers),
            "private" => Some(Self::Private),
            _ => None,
        }
    }
}

/// Immutable log entry for a single buy or sell.
/// Append-only, never mutated after insertion.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub spotify_id: String,
    pub trade_type: String,
    pub shares: i64,
    pub popularity_per_share: Decimal,
    pub total_amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub privacy: String,
    pub created_at: NaiveDateTime,
}

impl Transaction {
    pub fn trade_type(&self) -> Option<TradeType> {
        TradeType::from_str(&self.trade_type)
    }

    pub fn privacy(&self) -> Option<TradePrivacy> {
        TradePrivacy::from_str(&self.privacy)
    }
}
