//! Offline calculators: odds conversion and the fee schedule at one price.

use anyhow::{bail, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::AppConfig;
use crate::dashboard::fmt_opt;
use crate::pricing::{
    american_to_cents, american_to_decimal, american_to_probability, cents_to_american,
    probability_to_american, FeeSchedule,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub american: Option<i64>,
    pub probability: Option<f64>,
    pub cents: Option<i64>,
    pub decimal: Option<f64>,
}

impl Conversion {
    pub fn from_odds(odds: i64) -> Self {
        Self {
            american: (odds != 0).then_some(odds),
            probability: american_to_probability(odds),
            cents: american_to_cents(odds),
            decimal: american_to_decimal(odds),
        }
    }

    pub fn from_probability(p: f64) -> Self {
        let american = probability_to_american(p);
        Self {
            american,
            probability: (p.is_finite() && (0.0..=1.0).contains(&p)).then_some(p),
            cents: american.and_then(american_to_cents),
            decimal: (p > 0.0 && p <= 1.0).then(|| 1.0 / p),
        }
    }

    pub fn from_cents(cents: i64) -> Self {
        let valid = cents > 0 && cents < 100;
        Self {
            american: cents_to_american(cents),
            probability: valid.then(|| cents as f64 / 100.0),
            cents: valid.then_some(cents),
            decimal: valid.then(|| 100.0 / cents as f64),
        }
    }
}

/// Everything the fee schedule says about one price level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeReport {
    pub price_cents: i64,
    pub contracts: i64,
    pub taker_fee_dollars: Decimal,
    pub maker_fee_cents: i64,
    pub all_in_cost_dollars: Decimal,
    /// Maker join-queue break-even of the YES side at this price
    pub yes_break_even: Option<f64>,
    /// Same for the NO side at `100 - price`
    pub no_break_even: Option<f64>,
    pub post_break_even: Option<f64>,
    /// Post price that keeps price plus fee within this price
    pub fee_adjusted_post_cents: Option<i64>,
    pub budget_dollars: Decimal,
    pub max_affordable_contracts: i64,
}

impl FeeReport {
    pub fn new(fees: &FeeSchedule, price_cents: i64, contracts: Option<i64>, budget: Decimal) -> Self {
        let contracts = contracts.unwrap_or(1).max(1);
        // every contract costs at least its price
        let ceiling = (budget * Decimal::from(100) / Decimal::from(price_cents.max(1)))
            .floor()
            .to_i64()
            .unwrap_or(0);

        Self {
            price_cents,
            contracts,
            taker_fee_dollars: fees.taker_fee_dollars(contracts, price_cents),
            maker_fee_cents: fees.maker_fee_cents(price_cents, contracts),
            all_in_cost_dollars: fees.level_all_in_cost(contracts, price_cents),
            yes_break_even: fees.break_even_prob(price_cents),
            no_break_even: fees.break_even_prob(100 - price_cents),
            post_break_even: fees.maker_post_break_even_prob(price_cents),
            fee_adjusted_post_cents: fees.adjust_maker_price_for_fees(price_cents),
            budget_dollars: budget,
            max_affordable_contracts: fees.max_affordable_contracts(budget, price_cents, ceiling),
        }
    }
}

fn fmt_p(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |p| format!("{p:.5}"))
}

pub fn run_convert(odds: Option<i64>, prob: Option<f64>, cents: Option<i64>) -> Result<()> {
    let conversion = match (odds, prob, cents) {
        (Some(o), _, _) => Conversion::from_odds(o),
        (_, Some(p), _) => Conversion::from_probability(p),
        (_, _, Some(c)) => Conversion::from_cents(c),
        _ => bail!("one of --odds, --prob or --cents is required"),
    };

    println!(
        "american: {}",
        conversion
            .american
            .map_or_else(|| "N/A".to_string(), |a| format!("{a:+}"))
    );
    println!("probability: {}", fmt_p(conversion.probability));
    println!("cents: {}", fmt_opt(conversion.cents));
    println!(
        "decimal: {}",
        conversion
            .decimal
            .map_or_else(|| "N/A".to_string(), |d| format!("{d:.3}"))
    );
    Ok(())
}

pub fn run_fee(config: &AppConfig, price: i64, contracts: Option<i64>, json: bool) -> Result<()> {
    if price <= 0 || price >= 100 {
        bail!("--price must be between 1 and 99 cents, got {price}");
    }

    let fees = FeeSchedule::with_taker_rate(config.scan.taker_fee_rate);
    let report = FeeReport::new(&fees, price, contracts, config.scan.max_budget_dollars);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("price: {}c x {}", report.price_cents, report.contracts);
    println!("taker fee: ${}", report.taker_fee_dollars);
    println!("maker fee: {}c", report.maker_fee_cents);
    println!("all-in taker cost: ${}", report.all_in_cost_dollars);
    println!("YES break-even (maker): {}", fmt_p(report.yes_break_even));
    println!("NO break-even at {}c (maker): {}", 100 - price, fmt_p(report.no_break_even));
    println!("post break-even: {}", fmt_p(report.post_break_even));
    println!("fee-adjusted post: {}", fmt_opt(report.fee_adjusted_post_cents.map(|c| format!("{c}c"))));
    println!(
        "max contracts within ${}: {}",
        report.budget_dollars, report.max_affordable_contracts
    );
    Ok(())
}
