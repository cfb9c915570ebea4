use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::ladder::OrderBook;
use super::snapshot::OrderbookSnapshot;
use crate::domain::Side;
use crate::pricing::FeeSchedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub cached_snapshots: usize,
    pub unique_markets: usize,
}

/// Per-run orderbook memo.
///
/// Raw books are kept per ticker so both sides of a market come from one
/// HTTP call; derived snapshots are keyed by `(TICKER, side)` with the
/// ticker upper-cased.
#[derive(Debug, Default)]
pub struct OrderbookCache {
    snapshots: HashMap<(String, Side), OrderbookSnapshot>,
    books: HashMap<String, OrderBook>,
}

fn normalize(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

impl OrderbookCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ticker: &str, side: Side) -> Option<&OrderbookSnapshot> {
        self.snapshots.get(&(normalize(ticker), side))
    }

    pub fn put(&mut self, snapshot: OrderbookSnapshot) {
        let key = (normalize(&snapshot.market_ticker), snapshot.side);
        self.snapshots.insert(key, snapshot);
    }

    pub fn put_book(&mut self, ticker: &str, book: OrderBook) {
        self.books.insert(normalize(ticker), book);
    }

    pub fn book(&self, ticker: &str) -> Option<&OrderBook> {
        self.books.get(&normalize(ticker))
    }

    pub fn has_book(&self, ticker: &str) -> bool {
        self.books.contains_key(&normalize(ticker))
    }

    /// Cached snapshot, or one derived from the stored book (an empty book
    /// when the ticker was never fetched) and remembered.
    pub fn snapshot(&mut self, ticker: &str, side: Side, fees: &FeeSchedule) -> &OrderbookSnapshot {
        let key = (normalize(ticker), side);
        let book = self.books.get(&key.0).cloned().unwrap_or_default();
        self.snapshots
            .entry(key)
            .or_insert_with(|| OrderbookSnapshot::from_book(ticker, side, &book, fees))
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.books.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let unique: HashSet<&String> = self.snapshots.keys().map(|(ticker, _)| ticker).collect();
        CacheStats {
            cached_snapshots: self.snapshots.len(),
            unique_markets: unique.len(),
        }
    }

    pub fn book_count(&self) -> usize {
        self.books.len()
    }
}
