//! Runtime configuration, read from the environment (after `.env` files are loaded).

use std::path::PathBuf;
use std::time::Duration;

use crate::projection_table::SheetLayout;

const DEFAULT_API_BASE: &str = "https://api.blaseball.com";
const DEFAULT_STREAM_URL: &str = "https://api.blaseball.com/events/streamData";
const DEFAULT_FEED_TIMEOUT_SECS: u64 = 120;
const MIN_FEED_TIMEOUT_SECS: u64 = 5;
pub const SHEET_NAME: &str = "All Hitters";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub stream_url: String,
    /// Directory holding `blaseball_S{season}.db`.
    pub db_dir: PathBuf,
    /// Directory the `hitters_S{season}.xlsx` workbook is written to.
    pub out_dir: PathBuf,
    pub feed_timeout: Duration,
    pub layout: SheetLayout,
}

impl Config {
    /// Environment variables:
    /// - `LEAGUE_API_BASE` (default: https://api.blaseball.com)
    /// - `LEAGUE_STREAM_URL` (default: https://api.blaseball.com/events/streamData)
    /// - `HITTERS_DB_DIR` (default: databases)
    /// - `HITTERS_OUT_DIR` (default: sheets)
    /// - `FEED_TIMEOUT_SECS` (default: 120, at least 5)
    /// - `SHEET_MIN_ROWS` (default: 300)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let feed_timeout_secs = non_empty("FEED_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_FEED_TIMEOUT_SECS)
            .max(MIN_FEED_TIMEOUT_SECS);
        let defaults = SheetLayout::default();
        let min_rows = non_empty("SHEET_MIN_ROWS")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(defaults.min_rows);

        Self {
            api_base: non_empty("LEAGUE_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            stream_url: non_empty("LEAGUE_STREAM_URL")
                .unwrap_or_else(|| DEFAULT_STREAM_URL.to_string()),
            db_dir: non_empty("HITTERS_DB_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("databases")),
            out_dir: non_empty("HITTERS_OUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("sheets")),
            feed_timeout: Duration::from_secs(feed_timeout_secs),
            layout: SheetLayout {
                min_rows,
                ..defaults
            },
        }
    }

    /// `season` is the human-facing (one-based) season number.
    pub fn db_path(&self, season: i64) -> PathBuf {
        self.db_dir.join(format!("blaseball_S{season}.db"))
    }

    pub fn workbook_path(&self, season: i64) -> PathBuf {
        self.out_dir.join(format!("hitters_S{season}.xlsx"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = config_from(&[]);
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);
        assert_eq!(cfg.feed_timeout, Duration::from_secs(120));
        assert_eq!(cfg.layout, SheetLayout::default());
        assert_eq!(cfg.db_path(21), PathBuf::from("databases/blaseball_S21.db"));
        assert_eq!(cfg.workbook_path(21), PathBuf::from("sheets/hitters_S21.xlsx"));
    }

    #[test]
    fn overrides_and_clamps() {
        let cfg = config_from(&[
            ("FEED_TIMEOUT_SECS", "1"),
            ("SHEET_MIN_ROWS", "50"),
            ("HITTERS_DB_DIR", "/tmp/db"),
            ("LEAGUE_API_BASE", "  "),
        ]);
        assert_eq!(cfg.feed_timeout, Duration::from_secs(5));
        assert_eq!(cfg.layout.min_rows, 50);
        assert_eq!(cfg.db_path(3), PathBuf::from("/tmp/db/blaseball_S3.db"));
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);
    }
}
