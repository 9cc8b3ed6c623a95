//! Anticip Backend Library
//!
//! This module exposes the backend components for use by tests and other
//! consumers. The core is the portfolio ledger: buy/sell with weighted
//! average cost basis, atomic per-user mutations, valuation and periodic
//! net-worth snapshots, priced by an external popularity metric.

pub mod config;
pub mod database;
pub mod error;
pub mod ledger;
pub mod models;
pub mod repositories;
pub mod services;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult, LedgerError};

use repositories::*;
use std::sync::Arc;

/// Application state containing all repositories
pub struct AppState {
    pub user_repo: Arc<UserRepository>,
    pub artist_repo: Arc<ArtistRepository>,
    pub history_repo: Arc<HistoryRepository>,
    pub ledger_repo: Arc<LedgerRepository>,
    pub portfolio_repo: Arc<PortfolioRepository>,
    pub social_repo: Arc<SocialRepository>,
}

impl AppState {
    /// Create a new AppState with initialized repositories
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self {
            user_repo: Arc::new(UserRepository::new(pool.clone())),
            artist_repo: Arc::new(ArtistRepository::new(pool.clone())),
            history_repo: Arc::new(HistoryRepository::new(pool.clone())),
            ledger_repo: Arc::new(LedgerRepository::new(pool.clone())),
            portfolio_repo: Arc::new(PortfolioRepository::new(pool.clone())),
            social_repo: Arc::new(SocialRepository::new(pool)),
        }
    }
}
