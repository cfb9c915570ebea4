//! Row builders: pure functions from a [`Bundle`](crate::bundle::Bundle) to
//! displayable rows. No network access happens here.

pub mod moneyline;
pub mod spread;
pub mod total;

use chrono::NaiveDate;

pub use moneyline::{build_moneyline_rows, MoneylineRow};
pub use spread::{build_spread_rows, format_spread_consensus, format_spread_strike, SpreadRow};
pub use total::{build_total_rows, format_total_consensus, format_total_strike, TotalRow};

use crate::pricing::american_to_probability;

/// Fields every row sorts on.
pub trait GameRow {
    fn away_roto(&self) -> Option<i64>;
    fn game_date(&self) -> NaiveDate;
}

/// Rotation number ascending with unnumbered games last, then date.
/// The sort is stable so strikes of one game keep their order.
pub fn sort_rows<R: GameRow>(rows: &mut [R]) {
    rows.sort_by_key(|r| (r.away_roto().is_none(), r.away_roto(), r.game_date()));
}

/// Whole numbers print with one decimal (`6.0`), others as-is (`6.5`).
pub(crate) fn format_strike_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Fair pair for a strike: the consensus juice prices the line itself, so
/// it is only a fair value when the strike sits exactly on the line.
pub(crate) fn fair_at_line(strike: f64, line: f64, juice: Option<i64>) -> (Option<f64>, Option<f64>) {
    if (strike - line.abs()).abs() > 1e-9 {
        return (None, None);
    }
    let fair = juice.and_then(american_to_probability);
    (fair, fair.map(|p| 1.0 - p))
}
