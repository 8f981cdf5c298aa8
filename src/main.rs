use std::path::PathBuf;

use anyhow::{Context, Result};

use hitter_proj::config::{Config, SHEET_NAME};
use hitter_proj::engine::{self, Providers, RunOptions};
use hitter_proj::league_api::LeagueApi;
use hitter_proj::providers::LeagueStateProvider;
use hitter_proj::sink::XlsxSink;
use hitter_proj::statsheets;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    let api = LeagueApi::new(&config.api_base, &config.stream_url, config.feed_timeout);

    // Fetched once; every later step works from this snapshot.
    let state = api.get_state().context("fetch league state")?;
    let season = state.display_season();

    let db_path = parse_path_arg("db").unwrap_or_else(|| config.db_path(season));
    let out_path = parse_path_arg("out").unwrap_or_else(|| config.workbook_path(season));

    let mut conn = statsheets::open_db(&db_path)?;
    let mut sink = XlsxSink::new(&out_path, SHEET_NAME)?;
    let providers = Providers {
        roster: &api,
        schedule: &api,
        feed: &api,
    };
    let opts = RunOptions {
        feed_timeout: config.feed_timeout,
        layout: config.layout.clone(),
    };

    let summary = engine::run(&state, &providers, &mut conn, &mut sink, &opts)?;
    let saved = sink.finish()?;

    log::info!("DB: {}", db_path.display());
    log::info!("Sheet: {}", saved.display());
    log::info!(
        "players: seen={} projected={} eligible={} missing={} no_pa={}",
        summary.players_seen,
        summary.players_projected,
        summary.eligible,
        summary.skipped_missing,
        summary.skipped_zero_pa
    );
    Ok(())
}

/// Accepts `--name=<path>` or `--name <path>`.
fn parse_path_arg(name: &str) -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let flag = format!("--{name}");
    let prefix = format!("--{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix(&prefix) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if *arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next));
        }
    }
    None
}
