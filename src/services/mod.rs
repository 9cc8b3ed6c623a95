pub mod account_service;
pub mod catalog;
pub mod portfolio_service;
pub mod refresher;
pub mod trading_service;

pub use account_service::AccountService;
pub use catalog::{CatalogArtist, CatalogClient};
pub use portfolio_service::{PortfolioService, SnapshotReport};
pub use refresher::PopularityRefresher;
pub use trading_service::TradingService;
