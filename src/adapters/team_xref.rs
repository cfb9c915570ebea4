//! Team cross-reference: odds-feed team names to Kalshi team codes.
//!
//! Backed by a CSV with `league,unabated_name,kalshi_code` columns. Header
//! spelling varies between exports (`League`, `unabatedName`, `Kalshi_Code`,
//! a leading BOM), so headers are matched after normalization.

use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use super::TeamLookup;
use crate::error::{EdgeError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
struct XrefEntry {
    league: String,
    /// Lowercased, trimmed feed name
    name: String,
    code: String,
}

#[derive(Debug, Clone, Default)]
pub struct TeamXref {
    entries: Vec<XrefEntry>,
}

fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .replace('_', "")
}

fn column(headers: &StringRecord, wanted: &str) -> Option<usize> {
    headers.iter().position(|h| normalize_header(h) == wanted)
}

impl TeamXref {
    /// Rows of `league` only; rows without a name or code are skipped.
    pub fn from_reader<R: Read>(reader: R, league: &str) -> Result<Self> {
        let mut csv = ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv.headers()?.clone();
        let (Some(league_col), Some(name_col), Some(code_col)) = (
            column(&headers, "league"),
            column(&headers, "unabatedname"),
            column(&headers, "kalshicode"),
        ) else {
            return Err(EdgeError::InvalidMarketData(format!(
                "team xref header must name league, unabated_name and kalshi_code columns: {:?}",
                headers
            )));
        };

        let wanted = league.trim().to_uppercase();
        let mut entries = Vec::new();
        for record in csv.records() {
            let record = record?;
            let field = |i: usize| record.get(i).unwrap_or("").trim();

            if field(league_col).to_uppercase() != wanted {
                continue;
            }
            let (name, code) = (field(name_col), field(code_col));
            if name.is_empty() || code.is_empty() {
                continue;
            }

            entries.push(XrefEntry {
                league: wanted.clone(),
                name: name.to_lowercase(),
                code: code.to_uppercase(),
            });
        }

        Ok(Self { entries })
    }

    /// Load the table; a missing file is an empty table.
    pub fn load(path: &Path, league: &str) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "team xref file not found, no teams will map");
            return Ok(Self::default());
        }

        let file = std::fs::File::open(path)?;
        let xref = Self::from_reader(file, league)?;
        info!(path = %path.display(), teams = xref.len(), league, "loaded team xref");
        Ok(xref)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TeamLookup for TeamXref {
    /// Exact normalized name first, then containment either way.
    fn lookup(&self, league: &str, name: &str) -> Option<String> {
        let wanted = league.trim().to_uppercase();
        let league = wanted.as_str();
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return None;
        }

        let rows = || self.entries.iter().filter(move |e| e.league == league);
        rows()
            .find(|e| e.name == name)
            .or_else(|| rows().find(|e| e.name.contains(&name) || name.contains(&e.name)))
            .map(|e| e.code.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV: &str = "\u{feff}League,unabatedName,Kalshi_Code\n\
        NBA,Los Angeles Lakers,lal\n\
        NBA,Los Angeles Clippers,LAC\n\
        NBA,Miami Heat,MIA\n\
        NFL,Miami Dolphins,MIA\n\
        NBA,,BKN\n";

    #[test]
    fn test_header_variants_and_league_filter() {
        let xref = TeamXref::from_reader(CSV.as_bytes(), "nba").unwrap();
        assert_eq!(xref.len(), 3);
        assert_eq!(xref.lookup("NBA", "los angeles lakers").as_deref(), Some("LAL"));
        assert_eq!(xref.lookup("NBA", "Miami Dolphins"), None);
    }

    #[test]
    fn test_partial_match() {
        let xref = TeamXref::from_reader(CSV.as_bytes(), "NBA").unwrap();
        assert_eq!(xref.lookup("NBA", "Heat").as_deref(), Some("MIA"));
        assert_eq!(xref.lookup("NBA", "LA Clippers"), None);
        assert_eq!(xref.lookup("NBA", "  "), None);
    }

    #[test]
    fn test_missing_columns_is_an_error() {
        let err = TeamXref::from_reader("league,name\nNBA,Heat\n".as_bytes(), "NBA");
        assert!(matches!(err, Err(EdgeError::InvalidMarketData(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        let xref = TeamXref::load(file.path(), "NBA").unwrap();
        assert_eq!(xref.lookup("NBA", "Miami Heat").as_deref(), Some("MIA"));

        let missing = TeamXref::load(Path::new("/nonexistent/xref.csv"), "NBA").unwrap();
        assert!(missing.is_empty());
    }
}
