//! Pure portfolio ledger accounting.
//!
//! The transactional rules for share purchases, sales, average-cost basis
//! and valuation live here, free of any I/O. `LedgerRepository` reads the
//! current balance and holding under a database transaction, applies one of
//! these transitions, and writes the outcome back atomically.
//!
//! Accounting convention: average cost basis is the shares-weighted mean of
//! purchase popularity and is recomputed on buys only. A sell realizes
//! gain/loss against the existing average and leaves it untouched.

use crate::error::LedgerError;
use rust_decimal::Decimal;

/// In-memory view of a position: share count plus average purchase popularity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holding {
    pub shares: i64,
    pub avg_popularity: Decimal,
}

/// Result of applying a buy: the debited balance and the updated holding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuyOutcome {
    pub balance_after: Decimal,
    pub holding: Holding,
    pub cost: Decimal,
}

/// Result of applying a sell. `holding` is `None` when the position was
/// sold out completely and must be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SellOutcome {
    pub balance_after: Decimal,
    pub holding: Option<Holding>,
    pub proceeds: Decimal,
}

/// Apply a buy of `shares` at the current popularity.
///
/// Fails with `InvalidShareCount` for non-positive share counts and
/// `InsufficientFunds` when the cost exceeds the balance. On success the
/// balance is debited by `shares * popularity` and the average basis becomes
/// the shares-weighted mean of the prior basis and the new lot.
pub fn apply_buy(
    balance: Decimal,
    holding: Option<Holding>,
    shares: i64,
    popularity: Decimal,
) -> Result<BuyOutcome, LedgerError> {
    if shares <= 0 {
        return Err(LedgerError::InvalidShareCount(shares));
    }

    let cost = Decimal::from(shares) * popularity;
    if cost > balance {
        return Err(LedgerError::InsufficientFunds {
            available: balance,
            required: cost,
        });
    }

    let holding = match holding {
        None => Holding {
            shares,
            avg_popularity: popularity,
        },
        Some(prior) => {
            let total_shares = prior.shares + shares;
            let weighted =
                Decimal::from(prior.shares) * prior.avg_popularity + cost;
            Holding {
                shares: total_shares,
                avg_popularity: weighted / Decimal::from(total_shares),
            }
        }
    };

    Ok(BuyOutcome {
        balance_after: balance - cost,
        holding,
        cost,
    })
}

/// Apply a sell of `shares` at the current popularity.
///
/// Fails with `InvalidShareCount` for non-positive share counts and
/// `InsufficientShares` when the holding is missing or too small. The
/// balance is credited by `shares * popularity`; the average basis is never
/// changed by a sell.
pub fn apply_sell(
    balance: Decimal,
    holding: Option<Holding>,
    shares: i64,
    popularity: Decimal,
) -> Result<SellOutcome, LedgerError> {
    if shares <= 0 {
        return Err(LedgerError::InvalidShareCount(shares));
    }

    let held = holding.map(|h| h.shares).unwrap_or(0);
    if held < shares {
        return Err(LedgerError::InsufficientShares {
            held,
            requested: shares,
        });
    }
    // held >= shares > 0, so holding is present
    let prior = holding.unwrap();

    let proceeds = Decimal::from(shares) * popularity;
    let remaining = prior.shares - shares;

    let holding = if remaining > 0 {
        Some(Holding {
            shares: remaining,
            avg_popularity: prior.avg_popularity,
        })
    } else {
        None
    };

    Ok(SellOutcome {
        balance_after: balance + proceeds,
        holding,
        proceeds,
    })
}

/// Valuation of a single position at the current popularity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionValuation {
    pub spotify_id: String,
    pub shares: i64,
    pub avg_popularity: Decimal,
    pub current_popularity: Decimal,
    pub market_value: Decimal,
    pub cost: Decimal,
    pub gain: Decimal,
    pub percent_gain: Decimal,
}

/// Aggregate valuation of a whole portfolio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioValuation {
    pub balance: Decimal,
    pub invested: Decimal,
    pub current_value: Decimal,
    pub net_worth: Decimal,
    pub total_gain: Decimal,
    pub percent_winning: Decimal,
    pub positions: Vec<PositionValuation>,
}

/// Compute the valuation of a portfolio against current popularity per
/// artist. Read-only; `percent_gain` is 0 when a position's cost is 0 and
/// `percent_winning` is 0 when there are no positions.
pub fn valuate(
    balance: Decimal,
    positions: &[(String, Holding, Decimal)],
) -> PortfolioValuation {
    let hundred = Decimal::from(100);
    let mut valuations = Vec::with_capacity(positions.len());
    let mut invested = Decimal::ZERO;
    let mut current_value = Decimal::ZERO;
    let mut winning = 0usize;

    for (spotify_id, holding, current_popularity) in positions {
        let shares_dec = Decimal::from(holding.shares);
        let market_value = shares_dec * *current_popularity;
        let cost = shares_dec * holding.avg_popularity;
        let gain = market_value - cost;
        let percent_gain = if cost.is_zero() {
            Decimal::ZERO
        } else {
            gain / cost * hundred
        };

        invested += cost;
        current_value += market_value;
        if gain > Decimal::ZERO {
            winning += 1;
        }

        valuations.push(PositionValuation {
            spotify_id: spotify_id.clone(),
            shares: holding.shares,
            avg_popularity: holding.avg_popularity,
            current_popularity: *current_popularity,
            market_value,
            cost,
            gain,
            percent_gain,
        });
    }

    let percent_winning = if valuations.is_empty() {
        Decimal::ZERO
    } else {
        Decimal::from(winning as i64) / Decimal::from(valuations.len() as i64) * hundred
    };

    PortfolioValuation {
        balance,
        invested,
        current_value,
        net_worth: balance + current_value,
        total_gain: current_value - invested,
        percent_winning,
        positions: valuations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn buy_debits_balance_and_creates_holding() {
        let out = apply_buy(dec(10_000), None, 10, dec(50)).unwrap();
        assert_eq!(out.balance_after, dec(9_500));
        assert_eq!(out.cost, dec(500));
        assert_eq!(out.holding.shares, 10);
        assert_eq!(out.holding.avg_popularity, dec(50));
    }

    #[test]
    fn buy_recomputes_weighted_average() {
        // a shares at p1 then b shares at p2 yields (a*p1 + b*p2)/(a+b)
        let first = apply_buy(dec(10_000), None, 10, dec(50)).unwrap();
        let second = apply_buy(first.balance_after, Some(first.holding), 10, dec(70)).unwrap();
        assert_eq!(second.holding.shares, 20);
        assert_eq!(second.holding.avg_popularity, dec(60));
        assert_eq!(second.balance_after, dec(8_800));
    }

    #[test]
    fn buy_with_insufficient_balance_is_rejected() {
        let err = apply_buy(dec(100), None, 10, dec(50)).unwrap_err();
        match err {
            LedgerError::InsufficientFunds {
                available,
                required,
            } => {
                assert_eq!(available, dec(100));
                assert_eq!(required, dec(500));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn buy_with_non_positive_shares_is_rejected() {
        assert!(matches!(
            apply_buy(dec(100), None, 0, dec(50)),
            Err(LedgerError::InvalidShareCount(0))
        ));
        assert!(matches!(
            apply_buy(dec(100), None, -3, dec(50)),
            Err(LedgerError::InvalidShareCount(-3))
        ));
    }

    #[test]
    fn buy_exactly_at_balance_is_allowed() {
        let out = apply_buy(dec(500), None, 10, dec(50)).unwrap();
        assert_eq!(out.balance_after, Decimal::ZERO);
    }

    #[test]
    fn sell_credits_balance_and_keeps_average() {
        let holding = Holding {
            shares: 20,
            avg_popularity: dec(60),
        };
        let out = apply_sell(dec(8_800), Some(holding), 15, dec(80)).unwrap();
        assert_eq!(out.balance_after, dec(10_000));
        assert_eq!(out.proceeds, dec(1_200));
        let rest = out.holding.unwrap();
        assert_eq!(rest.shares, 5);
        // avg basis unchanged by the sell
        assert_eq!(rest.avg_popularity, dec(60));
    }

    #[test]
    fn full_sell_removes_the_holding() {
        let holding = Holding {
            shares: 10,
            avg_popularity: dec(50),
        };
        let out = apply_sell(dec(0), Some(holding), 10, dec(50)).unwrap();
        assert_eq!(out.balance_after, dec(500));
        assert!(out.holding.is_none());
    }

    #[test]
    fn sell_more_than_held_is_rejected() {
        let holding = Holding {
            shares: 5,
            avg_popularity: dec(50),
        };
        let err = apply_sell(dec(0), Some(holding), 6, dec(50)).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientShares {
                held: 5,
                requested: 6
            }
        ));
    }

    #[test]
    fn sell_without_a_position_is_rejected() {
        let err = apply_sell(dec(100), None, 1, dec(50)).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientShares {
                held: 0,
                requested: 1
            }
        ));
    }

    #[test]
    fn buy_then_sell_at_same_popularity_is_value_neutral() {
        let start = dec(10_000);
        let bought = apply_buy(start, None, 7, dec(43)).unwrap();
        let sold = apply_sell(bought.balance_after, Some(bought.holding), 7, dec(43)).unwrap();
        assert_eq!(sold.balance_after, start);
        assert!(sold.holding.is_none());
    }

    #[test]
    fn scenario_two_buys_then_partial_sell() {
        // user with balance 10000 buys 10 @ 50, buys 10 @ 70, sells 15 @ 80
        let b1 = apply_buy(dec(10_000), None, 10, dec(50)).unwrap();
        assert_eq!(b1.balance_after, dec(9_500));
        assert_eq!(b1.holding.avg_popularity, dec(50));

        let b2 = apply_buy(b1.balance_after, Some(b1.holding), 10, dec(70)).unwrap();
        assert_eq!(b2.balance_after, dec(8_800));
        assert_eq!(b2.holding.shares, 20);
        assert_eq!(b2.holding.avg_popularity, dec(60));

        let s = apply_sell(b2.balance_after, Some(b2.holding), 15, dec(80)).unwrap();
        assert_eq!(s.balance_after, dec(10_000));
        let rest = s.holding.unwrap();
        assert_eq!(rest.shares, 5);
        assert_eq!(rest.avg_popularity, dec(60));
    }

    #[test]
    fn valuate_empty_portfolio() {
        let v = valuate(dec(10_000), &[]);
        assert_eq!(v.invested, Decimal::ZERO);
        assert_eq!(v.current_value, Decimal::ZERO);
        assert_eq!(v.total_gain, Decimal::ZERO);
        assert_eq!(v.percent_winning, Decimal::ZERO);
        assert_eq!(v.net_worth, dec(10_000));
    }

    #[test]
    fn valuate_aggregates_positions() {
        let positions = vec![
            (
                "artist_a".to_string(),
                Holding {
                    shares: 10,
                    avg_popularity: dec(50),
                },
                dec(60), // gain 100
            ),
            (
                "artist_b".to_string(),
                Holding {
                    shares: 4,
                    avg_popularity: dec(80),
                },
                dec(70), // loss 40
            ),
        ];
        let v = valuate(dec(1_000), &positions);

        assert_eq!(v.invested, dec(500) + dec(320));
        assert_eq!(v.current_value, dec(600) + dec(280));
        assert_eq!(v.net_worth, dec(1_000) + dec(880));
        assert_eq!(v.total_gain, dec(60));
        assert_eq!(v.percent_winning, dec(50));

        let a = &v.positions[0];
        assert_eq!(a.gain, dec(100));
        assert_eq!(a.percent_gain, dec(20));
        let b = &v.positions[1];
        assert_eq!(b.gain, dec(-40));
    }

    #[test]
    fn valuate_zero_cost_position_has_zero_percent_gain() {
        let positions = vec![(
            "freebie".to_string(),
            Holding {
                shares: 3,
                avg_popularity: Decimal::ZERO,
            },
            dec(10),
        )];
        let v = valuate(Decimal::ZERO, &positions);
        assert_eq!(v.positions[0].percent_gain, Decimal::ZERO);
        assert_eq!(v.percent_winning, dec(100));
    }

    #[test]
    fn fractional_average_is_exact() {
        // 3 @ 10 then 1 @ 11 -> avg 10.25
        let b1 = apply_buy(dec(1_000), None, 3, dec(10)).unwrap();
        let b2 = apply_buy(b1.balance_after, Some(b1.holding), 1, dec(11)).unwrap();
        assert_eq!(b2.holding.avg_popularity, Decimal::new(1025, 2));
    }
}
