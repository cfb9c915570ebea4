//! American odds <-> probability <-> cents.
//!
//! All conversions return `None` for inputs that have no defined answer
//! (odds of 0, probabilities at or beyond the 0/1 boundary, prices outside
//! the open (0, 100) cent range).

/// Implied probability of American odds.
///
/// `-150` -> `0.6`, `+150` -> `0.4`.
pub fn american_to_probability(odds: i64) -> Option<f64> {
    if odds == 0 {
        return None;
    }
    let o = odds as f64;
    let p = if odds < 0 {
        -o / (-o + 100.0)
    } else {
        100.0 / (o + 100.0)
    };
    Some(p)
}

/// American odds for a probability in the open interval (0, 1).
pub fn probability_to_american(p: f64) -> Option<i64> {
    if !p.is_finite() || p <= 0.0 || p >= 1.0 {
        return None;
    }
    let odds = if p >= 0.5 {
        -100.0 * p / (1.0 - p)
    } else {
        100.0 * (1.0 - p) / p
    };
    Some(odds.round() as i64)
}

/// Kalshi-style price in cents for American odds.
pub fn american_to_cents(odds: i64) -> Option<i64> {
    let p = american_to_probability(odds)?;
    let cents = (p * 100.0).round() as i64;
    if cents <= 0 || cents >= 100 {
        return None;
    }
    Some(cents)
}

/// American odds for a price in cents.
pub fn cents_to_american(price_cents: i64) -> Option<i64> {
    if price_cents <= 0 || price_cents >= 100 {
        return None;
    }
    probability_to_american(price_cents as f64 / 100.0)
}

/// Decimal (European) odds, e.g. `+150` -> `2.5`.
pub fn american_to_decimal(odds: i64) -> Option<f64> {
    american_to_probability(odds).map(|p| 1.0 / p)
}
