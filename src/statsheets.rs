use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};

use crate::providers::Player;

/// Cumulative batting line for one player, straight from the per-game rows.
/// `hits` includes home runs here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitterAggregate {
    pub player_id: String,
    pub player_name: String,
    pub team_name: String,
    pub games: u32,
    pub pas: u32,
    pub hits: u32,
    pub homeruns: u32,
    pub steals: u32,
    pub lineup_sum: u32,
    pub lineup_current: u32,
}

/// A stored batting line paired with the player's live directory entry.
#[derive(Debug, Clone)]
pub struct KnownHitter {
    pub aggregate: HitterAggregate,
    pub player: Player,
}

#[derive(Debug, Clone, Default)]
pub struct AggregateReport {
    pub players_seen: usize,
    pub skipped_missing: usize,
    pub hitters: Vec<KnownHitter>,
}

/// One statsheet row, as the ingest process writes it.
#[derive(Debug, Clone)]
pub struct StatsheetRow {
    pub player_id: String,
    pub player_name: String,
    pub team_name: String,
    pub day: i64,
    pub pas: u32,
    pub hits: u32,
    pub homeruns: u32,
    pub steals: u32,
    pub lineup_size: u32,
}

/// Opens an existing statsheet store. The ingest process owns the file and its
/// schema, so a missing file or table is an error rather than an empty store.
pub fn open_db(path: &Path) -> Result<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(path, flags)
        .with_context(|| format!("open sqlite db {}", path.display()))?;
    ensure_statsheets(&conn).with_context(|| format!("check sqlite db {}", path.display()))?;
    Ok(conn)
}

pub fn ensure_statsheets(conn: &Connection) -> Result<()> {
    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'hitters_statsheets'",
            [],
            |row| row.get(0),
        )
        .context("look up hitters_statsheets")?;
    if tables == 0 {
        return Err(anyhow!("no hitters_statsheets table"));
    }
    Ok(())
}

/// Creates the statsheet table. Used by ingest and test fixtures; `open_db` never
/// calls it.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS hitters_statsheets (
            player_id TEXT NOT NULL,
            player_name TEXT,
            team_name TEXT,
            day INTEGER NOT NULL,
            pas INTEGER,
            hits INTEGER,
            homeruns INTEGER,
            steals INTEGER,
            lineup_size INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_statsheets_player_day
            ON hitters_statsheets(player_id, day);
        "#,
    )
    .context("create statsheet schema")?;
    Ok(())
}

pub fn insert_statsheet(conn: &Connection, row: &StatsheetRow) -> Result<()> {
    conn.execute(
        "INSERT INTO hitters_statsheets
            (player_id, player_name, team_name, day, pas, hits, homeruns, steals, lineup_size)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            row.player_id,
            row.player_name,
            row.team_name,
            row.day,
            row.pas,
            row.hits,
            row.homeruns,
            row.steals,
            row.lineup_size,
        ],
    )
    .context("insert statsheet row")?;
    Ok(())
}

pub fn distinct_player_ids(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT DISTINCT player_id FROM hitters_statsheets ORDER BY player_id")
        .context("prepare player id query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query player ids")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode player id")?);
    }
    Ok(out)
}

pub fn load_aggregate(conn: &Connection, player_id: &str) -> Result<Option<HitterAggregate>> {
    let latest = conn
        .prepare_cached(
            "SELECT COALESCE(player_name, ''), COALESCE(team_name, ''), COALESCE(lineup_size, 0)
             FROM hitters_statsheets
             WHERE player_id = ?1
             ORDER BY day DESC, rowid DESC
             LIMIT 1",
        )
        .context("prepare latest row query")?
        .query_row(params![player_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
            ))
        })
        .optional()
        .with_context(|| format!("query latest row for {player_id}"))?;
    let Some((player_name, team_name, lineup_current)) = latest else {
        return Ok(None);
    };

    let totals = conn
        .prepare_cached(
            "SELECT COUNT(*),
                    COALESCE(SUM(pas), 0),
                    COALESCE(SUM(hits), 0),
                    COALESCE(SUM(homeruns), 0),
                    COALESCE(SUM(steals), 0),
                    COALESCE(SUM(lineup_size), 0)
             FROM hitters_statsheets
             WHERE player_id = ?1",
        )
        .context("prepare totals query")?
        .query_row(params![player_id], |row| {
            Ok(HitterAggregate {
                player_id: player_id.to_string(),
                player_name: player_name.clone(),
                team_name: team_name.clone(),
                games: row.get(0)?,
                pas: row.get(1)?,
                hits: row.get(2)?,
                homeruns: row.get(3)?,
                steals: row.get(4)?,
                lineup_sum: row.get(5)?,
                lineup_current,
            })
        })
        .with_context(|| format!("query totals for {player_id}"))?;
    Ok(Some(totals))
}

/// Aggregates every player in the store that the live directory still knows.
/// Players the league no longer returns are dropped without error.
pub fn aggregate_hitters(
    conn: &Connection,
    player_ids: &[String],
    directory: &HashMap<String, Player>,
) -> Result<AggregateReport> {
    let mut report = AggregateReport {
        players_seen: player_ids.len(),
        ..Default::default()
    };
    for player_id in player_ids {
        let Some(player) = directory.get(player_id) else {
            log::debug!("{player_id} is not in the player directory, skipping");
            report.skipped_missing += 1;
            continue;
        };
        if let Some(aggregate) = load_aggregate(conn, player_id)? {
            report.hitters.push(KnownHitter {
                aggregate,
                player: player.clone(),
            });
        }
    }
    Ok(report)
}
