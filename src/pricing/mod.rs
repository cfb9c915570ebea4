//! Odds conversion and the Kalshi fee model.

pub mod conversion;
pub mod fees;

pub use conversion::{
    american_to_cents, american_to_decimal, american_to_probability, cents_to_american,
    probability_to_american,
};
pub use fees::{
    adjust_maker_price_for_fees, expected_value_per_contract, fee_dollars, level_all_in_cost,
    maker_fee_cents, maker_post_break_even_prob, max_affordable_contracts, no_break_even_prob,
    yes_break_even_prob, FeeSchedule, BREAK_EVEN_LOT, KALSHI_TAKER_RATE, MAX_BUDGET_DOLLARS,
};
