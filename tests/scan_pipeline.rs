use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::{Arc, Mutex};

use nba_edge::adapters::{MarketSource, OddsSource, TeamXref};
use nba_edge::dashboard::{render_html, Dashboard};
use nba_edge::domain::{KalshiEvent, KalshiMarket, TeamSide};
use nba_edge::error::{EdgeError, Result};
use nba_edge::ev::EvConvention;
use nba_edge::orderbook::OrderBook;
use nba_edge::pricing::FeeSchedule;
use nba_edge::rows::{build_moneyline_rows, build_spread_rows, build_total_rows};
use nba_edge::scanner::{ScanSettings, Scanner};

struct FixedOdds(Value);

#[async_trait]
impl OddsSource for FixedOdds {
    async fn fetch_snapshot(&self) -> Result<Value> {
        Ok(self.0.clone())
    }
}

struct RateLimitedOdds;

#[async_trait]
impl OddsSource for RateLimitedOdds {
    async fn fetch_snapshot(&self) -> Result<Value> {
        Err(EdgeError::RateLimited("unabated 429".to_string()))
    }
}

#[derive(Default)]
struct FakeKalshi {
    events: Vec<KalshiEvent>,
    markets: HashMap<String, Vec<KalshiMarket>>,
    failing_events: HashSet<String>,
    books: HashMap<String, OrderBook>,
    broken_books: HashSet<String>,
    requested: Mutex<Vec<String>>,
}

#[async_trait]
impl MarketSource for FakeKalshi {
    async fn fetch_orderbook(&self, ticker: &str) -> Result<OrderBook> {
        self.requested.lock().unwrap().push(ticker.to_string());
        if self.broken_books.contains(ticker) {
            return Err(EdgeError::Internal(format!("status=500 body=boom ({ticker})")));
        }
        Ok(self.books.get(ticker).cloned().unwrap_or_default())
    }

    async fn fetch_markets_for_event(&self, event_ticker: &str) -> Result<Vec<KalshiMarket>> {
        if self.failing_events.contains(event_ticker) {
            return Err(EdgeError::MarketDataUnavailable(event_ticker.to_string()));
        }
        Ok(self.markets.get(event_ticker).cloned().unwrap_or_default())
    }

    async fn fetch_events(&self, series_ticker: &str) -> Result<Vec<KalshiEvent>> {
        assert_eq!(series_ticker, "KXNBAGAME");
        Ok(self.events.clone())
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 8).unwrap()
}

fn lines(ml: i64, spread: f64) -> Value {
    json!({
        "bt1": {"americanPrice": ml},
        "bt2": {"line": spread, "americanPrice": -110}
    })
}

fn snapshot() -> Value {
    let mut chi = lines(-150, -3.5);
    chi["bt3"] = json!({"points": 221.5, "americanPrice": -110});

    json!({
        "teams": {
            "1": {"name": "Boston Celtics"},
            "2": {"name": "New York Knicks"},
            "3": {"name": "Brooklyn Nets"},
            "5": {"name": "Chicago Bulls"},
            "13": {"name": "Los Angeles Clippers"},
            "16": {"name": "Miami Heat"}
        },
        "gameOddsEvents": {
            "lg3:pt1:pregame": [
                {
                    "eventStart": "2026-01-09T01:00:00Z",
                    "eventTeams": {
                        "0": {"id": 16, "rotationNumber": 501},
                        "1": {"id": 5, "rotationNumber": 502}
                    },
                    "gameOddsMarketSourcesLines": {
                        "si0:ms49:an0": lines(130, 3.5),
                        "si1:ms49:an0": chi
                    }
                },
                {
                    "eventStart": "2026-01-09T00:30:00Z",
                    "eventTeams": {
                        "0": {"id": 3, "rotationNumber": 504},
                        "1": {"id": 13, "rotationNumber": 503}
                    },
                    "gameOddsMarketSourcesLines": {
                        "si0:ms49:an0": lines(180, 5.5),
                        "si1:ms49:an0": lines(-220, -5.5)
                    }
                },
                {
                    "eventStart": "2026-01-09T00:00:00Z",
                    "eventTeams": {
                        "0": {"id": 1, "rotationNumber": 505},
                        "1": {"id": 2, "rotationNumber": 506}
                    },
                    "gameOddsMarketSourcesLines": {
                        "si0:ms49:an0": lines(-120, -1.5),
                        "si1:ms49:an0": lines(100, 1.5)
                    }
                },
                {
                    "eventStart": "2026-01-10T01:00:00Z",
                    "eventTeams": {
                        "0": {"id": 16, "rotationNumber": 511},
                        "1": {"id": 5, "rotationNumber": 512}
                    },
                    "gameOddsMarketSourcesLines": {}
                }
            ]
        }
    })
}

fn market(value: Value) -> KalshiMarket {
    KalshiMarket::from_value(&value).unwrap()
}

fn kalshi() -> FakeKalshi {
    let mut fake = FakeKalshi {
        events: vec![
            KalshiEvent::from_value(&json!({"event_ticker": "KXNBAGAME-26JAN08MIACHI"})).unwrap(),
            KalshiEvent::from_value(&json!({"event_ticker": "KXNBAGAME-26JAN08LACBKN"})).unwrap(),
            // same matchup on another night
            KalshiEvent::from_value(&json!({"event_ticker": "KXNBAGAME-26JAN09MIACHI"})).unwrap(),
        ],
        ..Default::default()
    };

    fake.markets.insert(
        "KXNBASPREAD-26JAN08MIACHI".to_string(),
        vec![
            market(json!({"ticker": "KXNBASPREAD-26JAN08MIACHI-CHI3", "title": "Chicago wins by over 2.5 points?"})),
            market(json!({"ticker": "KXNBASPREAD-26JAN08MIACHI-CHI4", "title": "Chicago wins by over 3.5 points?"})),
            market(json!({"ticker": "KXNBASPREAD-26JAN08MIACHI-CHI5", "title": "Chicago wins by over 4.5 points?"})),
            market(json!({"ticker": "KXNBASPREAD-26JAN08MIACHI-MIA3", "title": "Miami wins by over 2.5 points?"})),
        ],
    );
    fake.markets.insert(
        "KXNBATOTAL-26JAN08MIACHI".to_string(),
        vec![
            market(json!({"ticker": "KXNBATOTAL-26JAN08MIACHI-OVER218", "title": "Over 218 points scored?"})),
            market(json!({"ticker": "KXNBATOTAL-26JAN08MIACHI-OVER221", "title": "Over 221 points scored?"})),
            market(json!({"ticker": "KXNBATOTAL-26JAN08MIACHI-OVER222", "title": "Over 222 points scored?"})),
            market(json!({"ticker": "KXNBATOTAL-26JAN08MIACHI-OVER225", "title": "Over 225 points scored?"})),
        ],
    );
    fake.failing_events.insert("KXNBASPREAD-26JAN08LACBKN".to_string());
    fake.failing_events.insert("KXNBATOTAL-26JAN08LACBKN".to_string());

    let books = [
        ("KXNBAGAME-26JAN08MIACHI-CHI", OrderBook::from_pairs(&[(57, 40)], &[(40, 120), (40, 30)])),
        ("KXNBAGAME-26JAN08MIACHI-MIA", OrderBook::from_pairs(&[(39, 10)], &[(58, 60)])),
        ("KXNBAGAME-26JAN08LACBKN-LAC", OrderBook::from_pairs(&[(30, 10)], &[(68, 20)])),
        ("KXNBASPREAD-26JAN08MIACHI-CHI4", OrderBook::from_pairs(&[(45, 100)], &[(52, 80)])),
        ("KXNBATOTAL-26JAN08MIACHI-OVER221", OrderBook::from_pairs(&[(50, 25)], &[(48, 30)])),
    ];
    for (ticker, book) in books {
        fake.books.insert(ticker.to_string(), book);
    }
    fake.broken_books.insert("KXNBAGAME-26JAN08LACBKN-BKN".to_string());
    fake
}

fn xref() -> TeamXref {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "\u{feff}League,Unabated_Name,Kalshi_Code\n\
         NBA,Miami Heat,MIA\n\
         NBA,Chicago Bulls,CHI\n\
         NBA,Los Angeles Clippers,LAC\n\
         NBA,Brooklyn Nets,BKN\n\
         NBA,Boston Celtics,BOS\n\
         NBA,New York Knicks,NYK\n\
         WNBA,Chicago Sky,CHI\n"
    )
    .unwrap();
    TeamXref::load(file.path(), "NBA").unwrap()
}

fn settings() -> ScanSettings {
    ScanSettings {
        concurrency: 3,
        ..ScanSettings::default()
    }
}

#[tokio::test]
async fn test_full_scan_builds_all_tables() {
    let markets = Arc::new(kalshi());
    let scanner = Scanner::new(
        Arc::new(FixedOdds(snapshot())),
        markets.clone(),
        Arc::new(xref()),
        settings(),
    );

    let bundle = scanner.build_bundle(today()).await.unwrap();

    // tomorrow's rematch is filtered out; the unmatched game stays
    assert_eq!(bundle.games.len(), 3);
    let mia_chi = &bundle.games[0];
    assert_eq!(mia_chi.event_ticker.as_deref(), Some("KXNBAGAME-26JAN08MIACHI"));
    assert_eq!(mia_chi.code(TeamSide::Away), Some("MIA"));
    assert_eq!(mia_chi.code(TeamSide::Home), Some("CHI"));

    // LAC listed second in the feed but first in the ticker
    let lac_bkn = &bundle.games[1];
    assert_eq!(lac_bkn.away_team_name, "Los Angeles Clippers");
    assert_eq!(lac_bkn.away_roto, Some(503));
    assert_eq!(bundle.games[2].event_ticker, None);

    let t = bundle.telemetry;
    assert_eq!(t.unabated_calls, 1);
    assert_eq!(t.kalshi_event_calls, 1);
    assert_eq!(t.kalshi_market_calls, 4);
    assert_eq!(t.unique_tickers, 8);
    assert_eq!(t.orderbook_requests, 8);
    assert_eq!(t.orderbook_failures, 1);
    // both sides of every fetched book, failed ones included
    assert_eq!(t.cached_snapshots, 16);
    assert_eq!(t.unique_markets, 8);

    // every required ticker fetched exactly once
    let mut requested = markets.requested.lock().unwrap().clone();
    requested.sort();
    let expected: Vec<String> = bundle.required_tickers().into_iter().collect();
    assert_eq!(requested, expected);

    let fees = FeeSchedule::kalshi();
    let moneyline = build_moneyline_rows(&bundle, EvConvention::Buyer);
    let rotos: Vec<Option<i64>> = moneyline.iter().map(|r| r.away_roto).collect();
    assert_eq!(rotos, vec![Some(501), Some(503), Some(505)]);

    let mia = &moneyline[0];
    assert_eq!(mia.away_top_liq, Some(150));
    assert_eq!(mia.away_top_prob, fees.break_even_prob(40));
    assert_eq!(mia.home_top_prob, fees.break_even_prob(58));
    assert!(mia.away_ev_top.is_some());

    // failed BKN book: LAC exposure (NO on BKN) is empty, BKN exposure is not
    let lac = &moneyline[1];
    assert_eq!(lac.away_top_prob, None);
    assert_eq!(lac.home_top_prob, fees.break_even_prob(68));

    let bos = &moneyline[2];
    assert!(bos.away_fair.is_some());
    assert_eq!(bos.away_ticker, None);
    assert_eq!(bos.away_ev_top, None);

    let spreads = build_spread_rows(&bundle);
    assert_eq!(spreads.len(), 2);
    assert_eq!(spreads[0].consensus, "CHI -3.5 -110");
    assert_eq!(spreads[0].strike, "CHI -3.5");
    assert_eq!(spreads[1].strike, "CHI -2.5");
    assert_eq!(spreads[0].home_kalshi_price_cents, Some(45));
    assert_eq!(spreads[0].away_kalshi_price_cents, Some(52));
    assert!((spreads[0].home_fair.unwrap() - 110.0 / 210.0).abs() < 1e-12);
    assert_eq!(spreads[1].home_fair, None);

    let totals = build_total_rows(&bundle);
    let strikes: Vec<&str> = totals.iter().map(|r| r.strike.as_str()).collect();
    assert_eq!(strikes, vec!["Over 221.0", "Over 222.0"]);
    assert_eq!(totals[0].over_kalshi_price_cents, Some(50));
    assert_eq!(totals[0].under_kalshi_liq, Some(30));
    assert_eq!(totals[0].over_fair, None);

    let dashboard = Dashboard::from_bundle(&bundle, EvConvention::Buyer);
    let html = render_html(
        &dashboard,
        chrono_tz::America::Los_Angeles,
        Utc.with_ymd_and_hms(2026, 1, 8, 18, 0, 0).unwrap(),
    );
    assert!(html.contains("<h2>SPREADS</h2>"));
    assert!(html.contains("<h2>TOTALS</h2>"));
    assert!(html.contains("CHI -3.5 -110"));
    assert!(html.contains("cached snapshots 16 across 8 markets"));
}

#[tokio::test]
async fn test_seller_view_reads_own_markets() {
    let scanner = Scanner::new(
        Arc::new(FixedOdds(snapshot())),
        Arc::new(kalshi()),
        Arc::new(xref()),
        settings(),
    );
    let bundle = scanner.build_bundle(today()).await.unwrap();
    let rows = build_moneyline_rows(&bundle, EvConvention::Seller);

    let fees = FeeSchedule::kalshi();
    // MIA market: best NO bid 58 -> YES ask 42
    assert_eq!(rows[0].away_top_price_cents, Some(42));
    assert_eq!(rows[0].away_top_prob, fees.maker_post_break_even_prob(42));
    // CHI market: best NO bid 40 -> YES ask 60
    assert_eq!(rows[0].home_top_price_cents, Some(60));
}

#[tokio::test]
async fn test_snapshot_failure_aborts_scan() {
    let markets = Arc::new(kalshi());
    let scanner = Scanner::new(Arc::new(RateLimitedOdds), markets.clone(), Arc::new(xref()), settings());

    let err = scanner.build_bundle(today()).await.unwrap_err();
    assert!(matches!(err, EdgeError::RateLimited(_)));
    assert!(markets.requested.lock().unwrap().is_empty());
}
