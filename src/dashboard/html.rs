use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::{
    dollar_liquidity, fmt_opt, fmt_prob, format_game_time, format_liq_dollars, is_game_started,
    Dashboard,
};
use crate::ev::{format_ev_percent, EvClass};

const STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: -apple-system, 'Segoe UI', Roboto, Arial, sans-serif; background-color: #1a1a1a; color: #e0e0e0; padding: 20px; font-size: 14px; }
.dashboard-container { max-width: 1800px; margin: 0 auto; }
h1, h2 { color: #fff; text-align: center; border-bottom: 2px solid #333; padding-bottom: 10px; margin: 24px 0 14px; }
table { width: 100%; border-collapse: collapse; background-color: #1f1f1f; border: 1px solid #333; }
thead { background-color: #2a2a2a; border-bottom: 2px solid #444; }
th { padding: 10px; text-align: left; font-size: 13px; text-transform: uppercase; border-right: 1px solid #333; }
td { padding: 8px 10px; border-right: 1px solid #2a2a2a; border-bottom: 1px solid #2a2a2a; }
tbody tr:hover { background-color: #252525; }
tr.game-started { background-color: rgba(248, 113, 113, 0.15); }
.date-cell { color: #a0a0a0; font-size: 13px; }
.team-name { font-weight: 500; }
.prob-value { font-family: 'Courier New', monospace; color: #d0d0d0; }
.kalshi-cell { position: relative; }
.kalshi-cell-content { position: relative; z-index: 2; }
.liquidity-bar { position: absolute; top: 0; bottom: 0; left: 0; width: var(--liq-pct, 0%); opacity: 0.5; z-index: 1; background: var(--liq-gradient); pointer-events: none; }
.ev-pos { color: #4ade80; font-weight: 600; font-family: 'Courier New', monospace; }
.ev-neg { color: #f87171; font-weight: 600; font-family: 'Courier New', monospace; }
.ev-na { color: #888; font-family: 'Courier New', monospace; }
.footer { margin-top: 24px; color: #888; font-size: 12px; text-align: center; }
"#;

/// Scale for liquidity bars, taken from the largest top-of-book notional.
const DEFAULT_MAX_DOLLARS: f64 = 10_000.0;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn liq_gradient(pct: f64) -> &'static str {
    if pct <= 33.0 {
        "linear-gradient(to right, #f87171 0%, #fb923c 100%)"
    } else if pct <= 66.0 {
        "linear-gradient(to right, #fb923c 0%, #fbbf24 100%)"
    } else {
        "linear-gradient(to right, #fbbf24 0%, #4ade80 100%)"
    }
}

struct Renderer {
    tz: Tz,
    now: DateTime<Utc>,
    max_dollars: f64,
    out: String,
}

impl Renderer {
    fn kalshi_cell(&mut self, prob: Option<f64>, price_cents: Option<i64>, liq: Option<i64>) {
        let pct = dollar_liquidity(price_cents, liq)
            .map(|d| (d / self.max_dollars * 100.0).min(100.0))
            .unwrap_or(0.0);
        self.out.push_str(&format!(
            "<td class=\"kalshi-cell prob-value\" title=\"Liq: {}\" style=\"--liq-pct: {:.1}%; --liq-gradient: {};\">\
             <div class=\"kalshi-cell-content\">{}</div><div class=\"liquidity-bar\"></div></td>",
            format_liq_dollars(price_cents, liq),
            pct,
            liq_gradient(pct),
            fmt_prob(prob, 4),
        ));
    }

    fn ev_cell(&mut self, ev: Option<f64>) {
        self.out.push_str(&format!(
            "<td class=\"{}\">{}</td>",
            EvClass::of(ev).css_class(),
            format_ev_percent(ev)
        ));
    }

    fn prob_cell(&mut self, prob: Option<f64>) {
        self.out
            .push_str(&format!("<td class=\"prob-value\">{}</td>", fmt_prob(prob, 3)));
    }

    fn text_cell(&mut self, class: &str, text: &str) {
        self.out
            .push_str(&format!("<td class=\"{class}\">{}</td>", escape(text)));
    }

    fn game_cells(&mut self, row_start: DateTime<Utc>, date: &str, roto: Option<i64>, away: &str, home: &str) {
        let class = if is_game_started(row_start, self.now) { "game-started" } else { "" };
        self.out.push_str(&format!("<tr class=\"{class}\">"));
        self.text_cell("date-cell", date);
        self.text_cell("date-cell", &format_game_time(row_start, self.tz));
        self.text_cell("prob-value", &fmt_opt(roto));
        self.text_cell("team-name", away);
        self.text_cell("team-name", home);
    }

    fn header(&mut self, title: &str, columns: &[&str]) {
        self.out.push_str(&format!("<h2>{title}</h2><table><thead><tr>"));
        for col in columns {
            self.out.push_str(&format!("<th>{col}</th>"));
        }
        self.out.push_str("</tr></thead><tbody>");
    }

    fn close_table(&mut self) {
        self.out.push_str("</tbody></table>");
    }
}

fn max_top_dollars(dashboard: &Dashboard) -> f64 {
    let moneyline = dashboard.moneyline.iter().flat_map(|r| {
        [
            dollar_liquidity(r.away_top_price_cents, r.away_top_liq),
            dollar_liquidity(r.home_top_price_cents, r.home_top_liq),
        ]
    });
    let max = moneyline.flatten().fold(0.0_f64, f64::max);
    if max > 0.0 {
        max
    } else {
        DEFAULT_MAX_DOLLARS
    }
}

/// Standalone HTML page with all three tables.
pub fn render_html(dashboard: &Dashboard, tz: Tz, now: DateTime<Utc>) -> String {
    let mut r = Renderer {
        tz,
        now,
        max_dollars: max_top_dollars(dashboard),
        out: String::with_capacity(64 * 1024),
    };

    r.out.push_str(&format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"UTF-8\">\
         <title>NBA Value Dashboard</title><style>{STYLE}</style></head>\
         <body><div class=\"dashboard-container\"><h1>NBA VALUE DASHBOARD {}</h1>",
        dashboard.date
    ));

    r.header(
        "MONEYLINES",
        &[
            "Game Date", "Game Time", "Roto", "Away Team", "Home Team", "Away Fair", "Home Fair",
            "Away Kalshi", "Home Kalshi", "Away EV", "Home EV",
        ],
    );
    for row in &dashboard.moneyline {
        r.game_cells(row.event_start, &row.game_date.to_string(), row.away_roto, &row.away_team, &row.home_team);
        r.prob_cell(row.away_fair);
        r.prob_cell(row.home_fair);
        r.kalshi_cell(row.away_top_prob, row.away_top_price_cents, row.away_top_liq);
        r.kalshi_cell(row.home_top_prob, row.home_top_price_cents, row.home_top_liq);
        r.ev_cell(row.away_ev_top);
        r.ev_cell(row.home_ev_top);
        r.out.push_str("</tr>");
    }
    r.close_table();

    if !dashboard.spreads.is_empty() {
        r.header(
            "SPREADS",
            &[
                "Game Date", "Game Time", "Roto", "Away Team", "Home Team", "Consensus", "Strike",
                "Away Kalshi", "Home Kalshi", "Away EV", "Home EV",
            ],
        );
        for row in &dashboard.spreads {
            r.game_cells(row.event_start, &row.game_date.to_string(), row.away_roto, &row.away_team, &row.home_team);
            r.text_cell("prob-value", &row.consensus);
            r.text_cell("prob-value", &row.strike);
            r.kalshi_cell(row.away_kalshi_prob, row.away_kalshi_price_cents, row.away_kalshi_liq);
            r.kalshi_cell(row.home_kalshi_prob, row.home_kalshi_price_cents, row.home_kalshi_liq);
            r.ev_cell(row.away_ev);
            r.ev_cell(row.home_ev);
            r.out.push_str("</tr>");
        }
        r.close_table();
    }

    if !dashboard.totals.is_empty() {
        r.header(
            "TOTALS",
            &[
                "Game Date", "Game Time", "Roto", "Away Team", "Home Team", "Consensus", "Strike",
                "Over Kalshi", "Under Kalshi", "Over EV", "Under EV",
            ],
        );
        for row in &dashboard.totals {
            r.game_cells(row.event_start, &row.game_date.to_string(), row.away_roto, &row.away_team, &row.home_team);
            r.text_cell("prob-value", &row.consensus);
            r.text_cell("prob-value", &row.strike);
            r.kalshi_cell(row.over_kalshi_prob, row.over_kalshi_price_cents, row.over_kalshi_liq);
            r.kalshi_cell(row.under_kalshi_prob, row.under_kalshi_price_cents, row.under_kalshi_liq);
            r.ev_cell(row.over_ev);
            r.ev_cell(row.under_ev);
            r.out.push_str("</tr>");
        }
        r.close_table();
    }

    let t = &dashboard.telemetry;
    r.out.push_str(&format!(
        "<div class=\"footer\">Generated {} | unabated calls {} | kalshi market calls {} | orderbooks {} ({} failed) | unique tickers {} | cached snapshots {} across {} markets</div>",
        dashboard.generated_at.with_timezone(&tz).format("%Y-%m-%d %I:%M %p %Z"),
        t.unabated_calls,
        t.kalshi_market_calls,
        t.orderbook_requests,
        t.orderbook_failures,
        t.unique_tickers,
        t.cached_snapshots,
        t.unique_markets,
    ));
    r.out.push_str("</div></body></html>\n");
    r.out
}
