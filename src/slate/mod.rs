//! Today's slate: consensus events joined to Kalshi events.

pub mod assemble;
pub mod event_ticker;
pub mod snapshot;

pub use assemble::{assemble_games, local_date, match_event, today_in, todays_events, TICKER_TZ};
pub use event_ticker::{parse_event_ticker, parse_ticker_date, series_event_ticker, EventTicker};
pub use snapshot::{parse_event, parse_snapshot, UnabatedEvent, UnabatedTeam};
