pub mod artist_repository;
pub mod history_repository;
pub mod ledger_repository;
pub mod portfolio_repository;
pub mod social_repository;
pub mod user_repository;

// Re-export all repositories for convenient access
pub use artist_repository::ArtistRepository;
pub use history_repository::HistoryRepository;
pub use ledger_repository::{LedgerRepository, PositionPopularity};
pub use portfolio_repository::PortfolioRepository;
pub use social_repository::SocialRepository;
pub use user_repository::UserRepository;
