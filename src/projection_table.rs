use anyhow::{Context, Result};
use rusqlite::{Connection, Row, params};

use crate::projector::PlayerRecord;
use crate::sink::{Cell, Sink};

pub const PROJECTION_COLUMNS: usize = 16;

/// Where the projection lands in the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    pub anchor: String,
    pub day_cell: String,
    pub min_rows: usize,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            anchor: "A4".to_string(),
            day_cell: "B1".to_string(),
            min_rows: 300,
        }
    }
}

/// Drops and recreates `hitters_proj`, then upserts every record. Runs in one
/// transaction so readers never see a half-built table.
pub fn rebuild(conn: &mut Connection, records: &[PlayerRecord]) -> Result<usize> {
    let tx = conn.transaction().context("begin projection transaction")?;
    tx.execute_batch(
        r#"
        DROP TABLE IF EXISTS hitters_proj;
        CREATE TABLE hitters_proj (
            player_id TEXT NOT NULL PRIMARY KEY,
            player_name TEXT,
            team_name TEXT,
            games INTEGER,
            pas INTEGER,
            hits INTEGER,
            homeruns INTEGER,
            steals INTEGER,
            papg REAL,
            hppa REAL,
            hrppa REAL,
            sbppa REAL,
            lineup_avg REAL,
            lineup_current INTEGER,
            can_earn INTEGER,
            multiplier INTEGER
        );
        "#,
    )
    .context("recreate projection table")?;

    let mut written = 0usize;
    for record in records {
        upsert_record(&tx, record)?;
        written += 1;
    }
    tx.commit().context("commit projection transaction")?;
    Ok(written)
}

pub fn upsert_record(conn: &Connection, r: &PlayerRecord) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO hitters_proj (
            player_id, player_name, team_name, games, pas, hits, homeruns, steals,
            papg, hppa, hrppa, sbppa, lineup_avg, lineup_current, can_earn, multiplier
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8,
            ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16
        )
        ON CONFLICT(player_id) DO UPDATE SET
            player_name = excluded.player_name,
            team_name = excluded.team_name,
            games = excluded.games,
            pas = excluded.pas,
            hits = excluded.hits,
            homeruns = excluded.homeruns,
            steals = excluded.steals,
            papg = excluded.papg,
            hppa = excluded.hppa,
            hrppa = excluded.hrppa,
            sbppa = excluded.sbppa,
            lineup_avg = excluded.lineup_avg,
            lineup_current = excluded.lineup_current,
            can_earn = excluded.can_earn,
            multiplier = excluded.multiplier
        "#,
        params![
            r.player_id,
            r.player_name,
            r.team_abbr,
            r.games,
            r.pas,
            r.hits,
            r.homeruns,
            r.steals,
            r.papg,
            r.hppa,
            r.hrppa,
            r.sbppa,
            r.lineup_avg,
            r.lineup_current,
            r.can_earn,
            r.multiplier,
        ],
    )
    .with_context(|| format!("upsert projection for {}", r.player_id))?;
    Ok(())
}

/// Reads the whole table back, grouped by team.
pub fn load_rows(conn: &Connection) -> Result<Vec<Vec<Cell>>> {
    let mut stmt = conn
        .prepare(
            "SELECT player_id, player_name, team_name, games, pas, hits, homeruns, steals,
                    papg, hppa, hrppa, sbppa, lineup_avg, lineup_current, can_earn, multiplier
             FROM hitters_proj
             ORDER BY team_name, player_name, player_id",
        )
        .context("prepare projection read")?;
    let rows = stmt
        .query_map([], row_to_cells)
        .context("query projection table")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode projection row")?);
    }
    Ok(out)
}

fn row_to_cells(row: &Row<'_>) -> rusqlite::Result<Vec<Cell>> {
    let mut cells = Vec::with_capacity(PROJECTION_COLUMNS);
    for idx in 0..PROJECTION_COLUMNS {
        let cell = match idx {
            0..=2 => row
                .get::<_, Option<String>>(idx)?
                .map(Cell::Text)
                .unwrap_or(Cell::Blank),
            8..=12 => row
                .get::<_, Option<f64>>(idx)?
                .map(Cell::Number)
                .unwrap_or(Cell::Blank),
            _ => row
                .get::<_, Option<i64>>(idx)?
                .map(Cell::Integer)
                .unwrap_or(Cell::Blank),
        };
        cells.push(cell);
    }
    Ok(cells)
}

/// Pads with blank rows up to `min_rows` so a shorter run clears the rows a
/// longer previous run left in the sink.
pub fn pad_rows(mut rows: Vec<Vec<Cell>>, min_rows: usize) -> Vec<Vec<Cell>> {
    while rows.len() < min_rows {
        rows.push(vec![Cell::Blank; PROJECTION_COLUMNS]);
    }
    rows
}

/// Hands the table to the sink, then stamps the current day. Returns the number of
/// projection rows written (padding excluded).
pub fn publish(
    conn: &Connection,
    sink: &mut dyn Sink,
    layout: &SheetLayout,
    today: i64,
) -> Result<usize> {
    let rows = load_rows(conn)?;
    let published = rows.len();
    let payload = pad_rows(rows, layout.min_rows);
    sink.write_block(&layout.anchor, &payload)
        .context("write projection block")?;
    sink.write_cell(&layout.day_cell, &Cell::Integer(today))
        .context("write current day")?;
    Ok(published)
}
