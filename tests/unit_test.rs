use anticip_backend::error::{AppError, LedgerError};
use anticip_backend::models::*;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Unit tests for Models
#[test]
fn test_trade_type_conversion() {
    assert_eq!(TradeType::Buy.as_str(), "buy");
    assert_eq!(TradeType::Sell.as_str(), "sell");

    assert_eq!(TradeType::from_str("buy"), Some(TradeType::Buy));
    assert_eq!(TradeType::from_str("sell"), Some(TradeType::Sell));
    assert_eq!(TradeType::from_str("short"), None);
}

#[test]
fn test_trade_privacy_conversion() {
    assert_eq!(TradePrivacy::Public.as_str(), "public");
    assert_eq!(TradePrivacy::Followers.as_str(), "followers");
    assert_eq!(TradePrivacy::Private.as_str(), "private");

    assert_eq!(TradePrivacy::from_str("public"), Some(TradePrivacy::Public));
    assert_eq!(TradePrivacy::from_str("secret"), None);
}

#[test]
fn test_username_validation() {
    assert!(User::validate_username("stephen_01").is_ok());
    assert!(User::validate_username("ab").is_err()); // too short
    assert!(User::validate_username(&"a".repeat(31)).is_err()); // too long
    assert!(User::validate_username("Stephen").is_err()); // uppercase
    assert!(User::validate_username("ste phen").is_err()); // space
}

#[test]
fn test_position_cost_basis() {
    let position = Position {
        user_id: Uuid::new_v4(),
        spotify_id: "3WrFJ7ztbogyGnTHbHJFl2".to_string(),
        shares: 20,
        avg_popularity: Decimal::new(60, 0),
        updated_at: chrono::Utc::now().naive_utc(),
    };

    assert_eq!(position.cost_basis(), Decimal::new(1_200, 0));
}

/// Unit tests for Error Handling
#[test]
fn test_ledger_error_display() {
    let err = LedgerError::InsufficientFunds {
        available: Decimal::new(100, 0),
        required: Decimal::new(500, 0),
    };
    assert!(format!("{}", err).contains("Insufficient funds"));

    let err = LedgerError::NoPriceData("abc123".to_string());
    assert!(format!("{}", err).contains("abc123"));
}

#[test]
fn test_error_status_codes() {
    let not_found = AppError::NotFound("user".to_string());
    assert_eq!(not_found.status_code(), 404);

    let rejected = AppError::Ledger(LedgerError::InsufficientShares {
        held: 0,
        requested: 5,
    });
    assert_eq!(rejected.status_code(), 422);

    let missing_artist = AppError::Ledger(LedgerError::ArtistNotFound("x".to_string()));
    assert_eq!(missing_artist.status_code(), 404);
    assert!(missing_artist.is_not_found());

    let upstream = AppError::ExternalService("catalog down".to_string());
    assert_eq!(upstream.status_code(), 502);
}

/// Unit tests for Transaction accessors
#[test]
fn test_transaction_accessor_parsing() {
    let tx = Transaction {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        spotify_id: "3WrFJ7ztbogyGnTHbHJFl2".to_string(),
        trade_type: "buy".to_string(),
        shares: 3,
        popularity_per_share: Decimal::new(55, 0),
        total_amount: Decimal::new(165, 0),
        balance_before: Decimal::new(10_000, 0),
        balance_after: Decimal::new(9_835, 0),
        privacy: "followers".to_string(),
        created_at: chrono::Utc::now().naive_utc(),
    };

    assert_eq!(tx.trade_type(), Some(TradeType::Buy));
    assert_eq!(tx.privacy(), Some(TradePrivacy::Followers));

    // Unknown strings stored by hand never panic the accessors
    let odd = Transaction {
        trade_type: "short".to_string(),
        privacy: "secret".to_string(),
        ..tx
    };
    assert_eq!(odd.trade_type(), None);
    assert_eq!(odd.privacy(), None);
}
