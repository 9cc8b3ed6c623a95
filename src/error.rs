use crate::database::DatabaseError;
use rust_decimal::Decimal;
use sqlx::Error as SqlxError;
use thiserror::Error;

/// Domain errors produced by the portfolio ledger.
///
/// All of these are recoverable, user-facing failures: a rejected trade
/// leaves balances and positions exactly as they were.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Buy cost exceeds the user's cash balance
    #[error("Insufficient funds: available {available}, required {required}")]
    InsufficientFunds {
        available: Decimal,
        required: Decimal,
    },

    /// Sell requested more shares than the position holds (or no position)
    #[error("Insufficient shares: held {held}, requested {requested}")]
    InsufficientShares { held: i64, requested: i64 },

    /// Artist has no recorded popularity snapshot yet
    #[error("No popularity data recorded for artist {0}")]
    NoPriceData(String),

    /// Artist is unknown to both the store and the catalog provider
    #[error("Artist not found: {0}")]
    ArtistNotFound(String),

    /// Share count is non-positive or exceeds the per-transaction cap
    #[error("Invalid share count: {0}")]
    InvalidShareCount(i64),
}

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database errors
    #[error("SQL error: {0}")]
    Sqlx(#[from] SqlxError),

    /// Ledger domain errors (rejected trades, missing popularity data)
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Business logic errors
    #[error("Business logic error: {0}")]
    BusinessLogic(String),

    /// External service errors (catalog provider)
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// UUID parsing errors
    #[error("Invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    /// Generic error with message
    #[error("{0}")]
    Message(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Check if error is a database connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            AppError::Database(DatabaseError::PoolCreation(_))
                | AppError::Database(DatabaseError::ConnectionTimeout)
        )
    }

    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::NotFound(_) | AppError::Ledger(LedgerError::ArtistNotFound(_))
        )
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::NotFound(_) => 404,
            AppError::Validation(_) => 400,
            AppError::Ledger(LedgerError::ArtistNotFound(_)) => 404,
            AppError::Ledger(_) => 422,
            AppError::Config(_) => 500,
            AppError::Database(_) | AppError::Sqlx(_) => 500,
            AppError::ExternalService(_) => 502,
            _ => 500,
        }
    }
}

/// Repository-specific error types
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database query error
    #[error("Query error: {0}")]
    Query(SqlxError),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Duplicate record
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Ledger rule violation (insufficient funds/shares, missing popularity)
    #[error("Ledger rule violation: {0}")]
    Ledger(#[from] LedgerError),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => AppError::NotFound(msg),
            RepositoryError::Query(e) => AppError::Sqlx(e),
            RepositoryError::Duplicate(msg) => {
                AppError::BusinessLogic(format!("Duplicate: {}", msg))
            }
            RepositoryError::ConstraintViolation(msg) => AppError::Validation(msg),
            RepositoryError::InvalidInput(msg) => AppError::Validation(msg),
            RepositoryError::Ledger(e) => AppError::Ledger(e),
        }
    }
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        match &err {
            SqlxError::RowNotFound => RepositoryError::NotFound("Record not found".to_string()),
            SqlxError::Database(db_err) => {
                // Check for common PostgreSQL error codes
                let code = db_err.code().map(|c| c.to_string());
                if code.as_deref() == Some("23505") {
                    // Unique violation
                    RepositoryError::Duplicate(db_err.message().to_string())
                } else if code.as_deref() == Some("23503") {
                    // Foreign key violation
                    RepositoryError::ConstraintViolation(db_err.message().to_string())
                } else if code.as_deref() == Some("23514") {
                    // Check constraint violation
                    RepositoryError::ConstraintViolation(db_err.message().to_string())
                } else {
                    RepositoryError::Query(err)
                }
            }
            _ => RepositoryError::Query(err),
        }
    }
}
