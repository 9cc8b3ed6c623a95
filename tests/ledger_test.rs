//! End-to-end accounting walk over the pure ledger core, exercising the
//! same transitions the ledger repository applies inside its database
//! transactions.

use anticip_backend::error::LedgerError;
use anticip_backend::ledger::{apply_buy, apply_sell, valuate, Holding};
use rust_decimal::Decimal;

fn dec(n: i64) -> Decimal {
    Decimal::from(n)
}

#[test]
fn trading_session_conserves_value() {
    // Fresh account with the default starting balance
    let starting = dec(10_000);

    // Buy 10 shares of artist A at popularity 50
    let buy_a = apply_buy(starting, None, 10, dec(50)).unwrap();
    assert_eq!(buy_a.balance_after, dec(9_500));

    // Average up: 10 more shares at popularity 70
    let buy_a2 = apply_buy(buy_a.balance_after, Some(buy_a.holding), 10, dec(70)).unwrap();
    assert_eq!(buy_a2.balance_after, dec(8_800));
    assert_eq!(buy_a2.holding.avg_popularity, dec(60));

    // A second, losing position: 5 shares of artist B at 80
    let buy_b = apply_buy(buy_a2.balance_after, None, 5, dec(80)).unwrap();
    assert_eq!(buy_b.balance_after, dec(8_400));

    // Valuation with A at 80 (winning) and B at 70 (losing)
    let valuation = valuate(
        buy_b.balance_after,
        &[
            ("artist_a".to_string(), buy_a2.holding, dec(80)),
            ("artist_b".to_string(), buy_b.holding, dec(70)),
        ],
    );
    assert_eq!(valuation.invested, dec(1_200) + dec(400));
    assert_eq!(valuation.current_value, dec(1_600) + dec(350));
    assert_eq!(valuation.net_worth, dec(8_400) + dec(1_950));
    assert_eq!(valuation.total_gain, dec(350));
    assert_eq!(valuation.percent_winning, dec(50));

    // Partial sell of A at 80 leaves the average untouched
    let sell_a = apply_sell(buy_b.balance_after, Some(buy_a2.holding), 15, dec(80)).unwrap();
    assert_eq!(sell_a.balance_after, dec(9_600));
    let rest = sell_a.holding.unwrap();
    assert_eq!(rest.shares, 5);
    assert_eq!(rest.avg_popularity, dec(60));

    // Unwind everything at cost-neutral popularity
    let sell_a2 = apply_sell(sell_a.balance_after, Some(rest), 5, dec(80)).unwrap();
    let sell_b = apply_sell(sell_a2.balance_after, Some(buy_b.holding), 5, dec(80)).unwrap();
    assert!(sell_a2.holding.is_none());
    assert!(sell_b.holding.is_none());

    // 20 A shares sold at 80 (cost basis 60) and 5 B shares sold at 80
    // (cost basis 80): realized gain is exactly 20 * 20
    assert_eq!(sell_b.balance_after, starting + dec(400));
}

#[test]
fn failed_trades_leave_inputs_usable() {
    let balance = dec(100);
    let holding = Holding {
        shares: 2,
        avg_popularity: dec(40),
    };

    // Oversized buy fails...
    let err = apply_buy(balance, Some(holding), 100, dec(50)).unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds { .. }));

    // ...and the same inputs still apply cleanly afterwards, since the
    // transitions are pure and the repository only writes on success
    let ok = apply_buy(balance, Some(holding), 1, dec(50)).unwrap();
    assert_eq!(ok.balance_after, dec(50));
    assert_eq!(ok.holding.shares, 3);

    let err = apply_sell(balance, Some(holding), 3, dec(50)).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InsufficientShares {
            held: 2,
            requested: 3
        }
    ));
}

#[test]
fn valuation_of_new_account() {
    let v = valuate(dec(10_000), &[]);
    assert_eq!(v.invested, Decimal::ZERO);
    assert_eq!(v.current_value, Decimal::ZERO);
    assert_eq!(v.total_gain, Decimal::ZERO);
    assert_eq!(v.percent_winning, Decimal::ZERO);
    assert_eq!(v.net_worth, dec(10_000));
    assert!(v.positions.is_empty());
}

#[test]
fn weighted_average_matches_closed_form() {
    // a shares at p1 then b shares at p2 -> (a*p1 + b*p2)/(a+b)
    let cases = [(3i64, 10i64, 7i64, 90i64), (1, 1, 9_999, 100), (500, 33, 500, 67)];

    for (a, p1, b, p2) in cases {
        let first = apply_buy(dec(2_000_000), None, a, dec(p1)).unwrap();
        let second = apply_buy(first.balance_after, Some(first.holding), b, dec(p2)).unwrap();

        let expected = (dec(a) * dec(p1) + dec(b) * dec(p2)) / dec(a + b);
        assert_eq!(second.holding.avg_popularity, expected);
        assert_eq!(second.holding.shares, a + b);
    }
}
