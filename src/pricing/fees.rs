//! Kalshi fee schedule
//!
//! Both regimes share the variance-like price factor `P * (1 - P)`:
//! - Taker: `ceil(0.07 * C * P * (1 - P) * 100) / 100` dollars
//! - Maker: `ceil(0.0175 * C * P * (1 - P) * 100)` cents
//!
//! Break-even probabilities for the "join the bid queue" case assess the
//! maker fee on a 1000-contract lot and spread it per contract; the
//! ceiling on a single contract is far coarser.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Reference lot for per-contract maker fee precision.
pub const BREAK_EVEN_LOT: i64 = 1000;

/// Default sizing budget in dollars.
pub const MAX_BUDGET_DOLLARS: Decimal = dec!(50);

/// Kalshi's published taker coefficient.
pub const KALSHI_TAKER_RATE: Decimal = dec!(0.07);

// ---------------------------------------------------------------------------
// Fee schedule
// ---------------------------------------------------------------------------

/// Fee coefficients for the two trading roles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Taker coefficient (0.07 on Kalshi)
    pub taker_rate: Decimal,
    /// Maker coefficient (one quarter of the taker rate)
    pub maker_rate: Decimal,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::kalshi()
    }
}

fn price_factor(price_cents: i64) -> Decimal {
    let p = Decimal::from(price_cents) / dec!(100);
    p * (Decimal::ONE - p)
}

impl FeeSchedule {
    pub fn kalshi() -> Self {
        Self::with_taker_rate(KALSHI_TAKER_RATE)
    }

    /// Schedule with a custom taker rate; maker stays at a quarter of it.
    pub fn with_taker_rate(taker_rate: Decimal) -> Self {
        FeeSchedule {
            taker_rate,
            maker_rate: taker_rate / dec!(4),
        }
    }

    /// Taker fee in dollars, rounded up to the next cent.
    pub fn taker_fee_dollars(&self, contracts: i64, price_cents: i64) -> Decimal {
        let raw = self.taker_rate * Decimal::from(contracts) * price_factor(price_cents);
        (raw * dec!(100)).ceil() / dec!(100)
    }

    /// Maker fee in whole cents, rounded up.
    pub fn maker_fee_cents(&self, price_cents: i64, contracts: i64) -> i64 {
        let raw_dollars = self.maker_rate * Decimal::from(contracts) * price_factor(price_cents);
        (raw_dollars * dec!(100)).ceil().to_i64().unwrap_or(i64::MAX)
    }

    /// Win probability needed to break even when buying at `price_cents` as maker.
    pub fn break_even_prob(&self, price_cents: i64) -> Option<f64> {
        if price_cents <= 0 || price_cents >= 100 {
            return None;
        }
        let fee_total = Decimal::from(self.maker_fee_cents(price_cents, BREAK_EVEN_LOT));
        let per_contract = fee_total / Decimal::from(BREAK_EVEN_LOT);
        let p_be = (Decimal::from(price_cents) + per_contract) / dec!(100);
        clamp_unit(p_be)
    }

    /// Break-even for a one-off maker post where the fee is charged on the win.
    pub fn maker_post_break_even_prob(&self, price_cents: i64) -> Option<f64> {
        if price_cents <= 0 || price_cents >= 100 {
            return None;
        }
        let fee_on_win_cents = self.maker_fee_cents(price_cents, 1);
        if fee_on_win_cents >= 100 {
            return None;
        }
        let p = Decimal::from(price_cents) / dec!(100);
        let fee_on_win = Decimal::from(fee_on_win_cents) / dec!(100);
        clamp_unit(p / (Decimal::ONE - fee_on_win))
    }

    /// Highest post price whose price plus one-contract maker fee stays within `limit_cents`.
    ///
    /// A limit of 90 (90c net) posts at 89 with a 1c fee.
    pub fn adjust_maker_price_for_fees(&self, limit_cents: i64) -> Option<i64> {
        if limit_cents <= 2 {
            return None;
        }
        (1..limit_cents)
            .rev()
            .find(|&post| post + self.maker_fee_cents(post, 1) <= limit_cents)
    }

    /// Contract cost plus taker fee for `contracts` at one price level, in dollars.
    pub fn level_all_in_cost(&self, contracts: i64, price_cents: i64) -> Decimal {
        let contract_cost = Decimal::from(contracts) * Decimal::from(price_cents) / dec!(100);
        contract_cost + self.taker_fee_dollars(contracts, price_cents)
    }

    /// Largest contract count at `price_cents` (up to `available`) that fits in `remaining` dollars.
    pub fn max_affordable_contracts(
        &self,
        remaining: Decimal,
        price_cents: i64,
        available: i64,
    ) -> i64 {
        (1..=available)
            .rev()
            .find(|&c| self.level_all_in_cost(c, price_cents) <= remaining)
            .unwrap_or(0)
    }
}

fn clamp_unit(p: Decimal) -> Option<f64> {
    let clamped = p.max(Decimal::ZERO).min(Decimal::ONE);
    clamped.to_f64()
}

// ---------------------------------------------------------------------------
// Default-schedule shorthands
// ---------------------------------------------------------------------------

pub fn fee_dollars(contracts: i64, price_cents: i64) -> Decimal {
    FeeSchedule::kalshi().taker_fee_dollars(contracts, price_cents)
}

pub fn maker_fee_cents(price_cents: i64, contracts: i64) -> i64 {
    FeeSchedule::kalshi().maker_fee_cents(price_cents, contracts)
}

/// Break-even win probability for buying YES at `price_cents` as maker.
pub fn yes_break_even_prob(price_cents: i64) -> Option<f64> {
    FeeSchedule::kalshi().break_even_prob(price_cents)
}

/// Break-even probability for NO exposure bought at a NO price (same formula as YES).
pub fn no_break_even_prob(price_cents: i64) -> Option<f64> {
    FeeSchedule::kalshi().break_even_prob(price_cents)
}

pub fn maker_post_break_even_prob(price_cents: i64) -> Option<f64> {
    FeeSchedule::kalshi().maker_post_break_even_prob(price_cents)
}

pub fn adjust_maker_price_for_fees(limit_cents: i64) -> Option<i64> {
    FeeSchedule::kalshi().adjust_maker_price_for_fees(limit_cents)
}

pub fn level_all_in_cost(contracts: i64, price_cents: i64) -> Decimal {
    FeeSchedule::kalshi().level_all_in_cost(contracts, price_cents)
}

pub fn max_affordable_contracts(remaining: Decimal, price_cents: i64, available: i64) -> i64 {
    FeeSchedule::kalshi().max_affordable_contracts(remaining, price_cents, available)
}

/// Expected value in dollars per contract when the fee is only paid on a win.
///
/// `EV = p * ((1 - P) - fee) - (1 - p) * P`
pub fn expected_value_per_contract(p_win: f64, price_cents: i64, fee_on_win_cents: f64) -> f64 {
    let price = price_cents as f64 / 100.0;
    let fee_on_win = fee_on_win_cents / 100.0;
    p_win * ((1.0 - price) - fee_on_win) - (1.0 - p_win) * price
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_taker_fee_dollars() {
        // 0.07 * 100 * 0.5 * 0.5 = 1.75
        assert_eq!(fee_dollars(100, 50), dec!(1.75));
        // 0.07 * 10 * 0.56 * 0.44 = 0.17248 -> 0.18
        assert_eq!(fee_dollars(10, 56), dec!(0.18));
        assert_eq!(fee_dollars(1, 99), dec!(0.01));
        assert_eq!(fee_dollars(0, 50), Decimal::ZERO);
    }

    #[test]
    fn test_maker_fee_cents() {
        // 0.0175 * 1000 * 0.56 * 0.44 * 100 = 431.2 -> 432
        assert_eq!(maker_fee_cents(56, 1000), 432);
        assert_eq!(maker_fee_cents(50, 1), 1);
        assert_eq!(maker_fee_cents(50, 1000), 438);
    }

    #[test]
    fn test_maker_fee_monotonic_in_contracts() {
        for price in [5, 25, 50, 75, 95] {
            let mut last = 0;
            for contracts in 1..=2000 {
                let fee = maker_fee_cents(price, contracts);
                assert!(fee >= last, "fee dropped at price {price}, contracts {contracts}");
                last = fee;
            }
        }
    }

    #[test]
    fn test_maker_fee_peaks_at_fifty() {
        let peak = maker_fee_cents(50, 1000);
        for price in 1..50 {
            assert!(maker_fee_cents(price, 1000) <= maker_fee_cents(price + 1, 1000));
            assert!(maker_fee_cents(100 - price, 1000) <= maker_fee_cents(99 - price, 1000));
        }
        for price in 1..100 {
            assert!(maker_fee_cents(price, 1000) <= peak);
        }
    }

    #[test]
    fn test_yes_break_even_prob() {
        // fee_total = ceil(0.0175 * 1000 * 0.56 * 0.44 * 100) = 432c, 0.432c per contract
        let p = yes_break_even_prob(56).unwrap();
        assert!(approx(p, 0.56432), "got {p}");
        assert_eq!(yes_break_even_prob(0), None);
        assert_eq!(yes_break_even_prob(100), None);
        assert_eq!(yes_break_even_prob(-3), None);
    }

    #[test]
    fn test_break_even_clamped() {
        for price in 1..100 {
            let p = yes_break_even_prob(price).unwrap();
            assert!((0.0..=1.0).contains(&p));
            let q = no_break_even_prob(price).unwrap();
            assert!((0.0..=1.0).contains(&q));
        }
    }

    #[test]
    fn test_maker_post_break_even() {
        // 1c fee on win at 50c: 0.5 / 0.99
        let p = maker_post_break_even_prob(50).unwrap();
        assert!(approx(p, 0.5 / 0.99), "got {p}");
        assert_eq!(maker_post_break_even_prob(0), None);
        assert_eq!(maker_post_break_even_prob(100), None);
        for price in 1..100 {
            let p = maker_post_break_even_prob(price).unwrap();
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_adjust_maker_price_for_fees() {
        assert_eq!(adjust_maker_price_for_fees(90), Some(89));
        assert_eq!(adjust_maker_price_for_fees(50), Some(49));
        assert_eq!(adjust_maker_price_for_fees(2), None);
        assert_eq!(adjust_maker_price_for_fees(0), None);
    }

    #[test]
    fn test_level_cost_and_sizing() {
        // 10 @ 50c = $5.00 + ceil(0.07*10*0.25*100)/100 = $0.18
        assert_eq!(level_all_in_cost(10, 50), dec!(5.18));
        assert_eq!(max_affordable_contracts(dec!(5.18), 50, 100), 10);
        assert_eq!(max_affordable_contracts(dec!(5.17), 50, 100), 9);
        assert_eq!(max_affordable_contracts(dec!(100), 50, 3), 3);
        assert_eq!(max_affordable_contracts(dec!(0.10), 50, 3), 0);
    }

    #[test]
    fn test_custom_taker_rate() {
        let fees = FeeSchedule::with_taker_rate(dec!(0.07));
        assert_eq!(fees, FeeSchedule::kalshi());
    }

    #[test]
    fn test_expected_value_per_contract() {
        // fair coin at 50c with no fee is zero EV
        assert!(approx(expected_value_per_contract(0.5, 50, 0.0), 0.0));
        // 60% at 50c with 1c fee: 0.6 * 0.49 - 0.4 * 0.5
        assert!(approx(expected_value_per_contract(0.6, 50, 1.0), 0.094));
    }
}
