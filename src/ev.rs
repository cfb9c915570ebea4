//! Expected value of a fair probability against a tradeable break-even.
//!
//! EV is expressed in percentage points of probability. A buyer profits when
//! the fair probability exceeds what the fill costs after fees; a seller
//! profits when the break-even of the sale exceeds the fair probability.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvConvention {
    Buyer,
    Seller,
}

/// `(fair - break_even) * 100`
pub fn buyer_ev(fair: Option<f64>, break_even: Option<f64>) -> Option<f64> {
    Some((fair? - break_even?) * 100.0)
}

/// `(break_even_sale - fair) * 100`
pub fn seller_ev(fair: Option<f64>, break_even_sale: Option<f64>) -> Option<f64> {
    Some((break_even_sale? - fair?) * 100.0)
}

pub fn ev(convention: EvConvention, fair: Option<f64>, break_even: Option<f64>) -> Option<f64> {
    match convention {
        EvConvention::Buyer => buyer_ev(fair, break_even),
        EvConvention::Seller => seller_ev(fair, break_even),
    }
}

/// `+2.3%`, `-1.0%` or `N/A`.
pub fn format_ev_percent(ev: Option<f64>) -> String {
    match ev {
        Some(v) if v.is_finite() => format!("{v:+.1}%"),
        _ => "N/A".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvClass {
    Positive,
    Negative,
    Neutral,
}

impl EvClass {
    pub fn of(ev: Option<f64>) -> Self {
        match ev {
            Some(v) if v > 0.0 => EvClass::Positive,
            Some(v) if v < 0.0 => EvClass::Negative,
            _ => EvClass::Neutral,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            EvClass::Positive => "ev-pos",
            EvClass::Negative => "ev-neg",
            EvClass::Neutral => "ev-na",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buyer_and_seller_signs() {
        let b = buyer_ev(Some(0.60), Some(0.56432)).unwrap();
        assert!((b - 3.568).abs() < 1e-9);

        let s = seller_ev(Some(0.50), Some(0.5151)).unwrap();
        assert!((s - 1.51).abs() < 1e-9);

        assert_eq!(ev(EvConvention::Seller, Some(0.5), Some(0.5151)), seller_ev(Some(0.5), Some(0.5151)));
    }

    #[test]
    fn test_missing_operand() {
        assert_eq!(buyer_ev(None, Some(0.5)), None);
        assert_eq!(buyer_ev(Some(0.5), None), None);
        assert_eq!(seller_ev(None, None), None);
    }

    #[test]
    fn test_format_and_class() {
        assert_eq!(format_ev_percent(Some(2.345)), "+2.3%");
        assert_eq!(format_ev_percent(Some(-1.0)), "-1.0%");
        assert_eq!(format_ev_percent(Some(0.0)), "+0.0%");
        assert_eq!(format_ev_percent(None), "N/A");

        assert_eq!(EvClass::of(Some(0.4)), EvClass::Positive);
        assert_eq!(EvClass::of(Some(-0.4)), EvClass::Negative);
        assert_eq!(EvClass::of(Some(0.0)), EvClass::Neutral);
        assert_eq!(EvClass::of(None).css_class(), "ev-na");
    }
}
