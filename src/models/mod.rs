//! Domain models for the Anticip backend.
//!
//! This module contains all database-backed models representing
//! the core entities of the fantasy music stock market.

pub mod artist;
pub mod follow;
pub mod portfolio_snapshot;
pub mod position;
pub mod price_snapshot;
pub mod transaction;
pub mod user;

// Re-export all models for convenient access
pub use artist::Artist;
pub use follow::Follow;
pub use portfolio_snapshot::PortfolioSnapshot;
pub use position::Position;
pub use price_snapshot::PriceSnapshot;
pub use transaction::{TradePrivacy, TradeType, Transaction};
pub use user::User;
