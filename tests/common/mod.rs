#![allow(dead_code)]

use std::cell::{Cell as StdCell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Result, anyhow};
use rusqlite::Connection;

use hitter_proj::engine::{self, Providers, RunOptions, RunSummary};
use hitter_proj::league_state::LeagueState;
use hitter_proj::projection_table::SheetLayout;
use hitter_proj::providers::{
    EventStreamProvider, FrameStream, Player, RosterProvider, ScheduleProvider, ScheduledGame,
    Team,
};
use hitter_proj::sink::{Cell, Sink};
use hitter_proj::statsheets::{StatsheetRow, init_schema, insert_statsheet};

#[derive(Default)]
pub struct FakeLeague {
    pub teams: HashMap<String, Team>,
    pub tributes: Vec<String>,
    pub players: HashMap<String, Player>,
    pub games: HashMap<(i64, i64), HashMap<String, ScheduledGame>>,
    pub frames: RefCell<Option<Vec<String>>>,
    pub frames_pulled: StdCell<usize>,
    pub fail_schedule: bool,
    pub fail_players: bool,
}

impl FakeLeague {
    pub fn add_team(&mut self, id: &str, abbr: &str, lineup: &[&str]) {
        self.teams.insert(
            id.to_string(),
            Team {
                id: id.to_string(),
                abbreviation: abbr.to_string(),
                stadium: Some(format!("{id}-park")),
                lineup: lineup.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            },
        );
    }

    pub fn add_player(&mut self, id: &str, team_id: &str, mods: &[&str]) {
        self.players.insert(
            id.to_string(),
            Player {
                id: id.to_string(),
                name: format!("Player {id}"),
                team_id: Some(team_id.to_string()),
                modifiers_permanent: mods.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            },
        );
    }

    pub fn schedule(&mut self, season: i64, day: i64, matchups: &[(&str, &str)]) {
        let games = matchups
            .iter()
            .enumerate()
            .map(|(idx, (home, away))| {
                (
                    format!("g{idx}"),
                    ScheduledGame {
                        home_team: home.to_string(),
                        away_team: away.to_string(),
                    },
                )
            })
            .collect();
        self.games.insert((season, day), games);
    }

    pub fn set_frames(&self, frames: &[&str]) {
        *self.frames.borrow_mut() = Some(frames.iter().map(|s| s.to_string()).collect());
    }
}

impl RosterProvider for FakeLeague {
    fn get_all_teams(&self) -> Result<HashMap<String, Team>> {
        Ok(self.teams.clone())
    }

    fn get_tributes(&self) -> Result<Vec<String>> {
        Ok(self.tributes.clone())
    }

    fn get_players(&self, ids: &[String]) -> Result<HashMap<String, Player>> {
        if self.fail_players {
            return Err(anyhow!("players endpoint unavailable"));
        }
        Ok(ids
            .iter()
            .filter_map(|id| self.players.get(id).map(|p| (id.clone(), p.clone())))
            .collect())
    }
}

impl ScheduleProvider for FakeLeague {
    fn get_games(&self, season: i64, day: i64) -> Result<HashMap<String, ScheduledGame>> {
        if self.fail_schedule {
            return Err(anyhow!("schedule endpoint unavailable"));
        }
        Ok(self.games.get(&(season, day)).cloned().unwrap_or_default())
    }
}

impl EventStreamProvider for FakeLeague {
    fn open(&self) -> Result<FrameStream<'_>> {
        let frames = self
            .frames
            .borrow_mut()
            .take()
            .ok_or_else(|| anyhow!("feed already consumed"))?;
        Ok(Box::new(frames.into_iter().map(move |f| {
            self.frames_pulled.set(self.frames_pulled.get() + 1);
            Ok(f)
        })))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub blocks: Vec<(String, Vec<Vec<Cell>>)>,
    pub cells: Vec<(String, Cell)>,
}

impl RecordingSink {
    pub fn last_block(&self) -> &[Vec<Cell>] {
        self.blocks.last().map(|(_, rows)| rows.as_slice()).unwrap_or(&[])
    }

    pub fn row_for(&self, player_id: &str) -> Option<&Vec<Cell>> {
        self.last_block()
            .iter()
            .find(|row| row[0] == Cell::Text(player_id.to_string()))
    }
}

impl Sink for RecordingSink {
    fn write_block(&mut self, anchor: &str, rows: &[Vec<Cell>]) -> Result<()> {
        self.blocks.push((anchor.to_string(), rows.to_vec()));
        Ok(())
    }

    fn write_cell(&mut self, cell: &str, value: &Cell) -> Result<()> {
        self.cells.push((cell.to_string(), value.clone()));
        Ok(())
    }
}

pub fn statsheet_db() -> Connection {
    let conn = Connection::open_in_memory().expect("in-memory db");
    init_schema(&conn).expect("statsheet schema");
    conn
}

/// Adds one statsheet row per game line for a player, on consecutive days from 0.
pub fn add_games(conn: &Connection, player_id: &str, team_name: &str, games: &[GameLine]) {
    for (idx, g) in games.iter().enumerate() {
        insert_statsheet(
            conn,
            &StatsheetRow {
                player_id: player_id.to_string(),
                player_name: format!("Player {player_id}"),
                team_name: team_name.to_string(),
                day: idx as i64,
                pas: g.pas,
                hits: g.hits,
                homeruns: g.homeruns,
                steals: g.steals,
                lineup_size: g.lineup_size,
            },
        )
        .expect("insert statsheet");
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GameLine {
    pub pas: u32,
    pub hits: u32,
    pub homeruns: u32,
    pub steals: u32,
    pub lineup_size: u32,
}

/// 40 PA, 10 hits (2 HR), 1 steal over 5 games with a lineup of 5.
pub fn reference_line() -> Vec<GameLine> {
    vec![
        GameLine {
            pas: 8,
            hits: 3,
            homeruns: 1,
            steals: 1,
            lineup_size: 5,
        },
        GameLine {
            pas: 8,
            hits: 2,
            homeruns: 0,
            steals: 0,
            lineup_size: 5,
        },
        GameLine {
            pas: 8,
            hits: 2,
            homeruns: 1,
            steals: 0,
            lineup_size: 5,
        },
        GameLine {
            pas: 8,
            hits: 1,
            homeruns: 0,
            steals: 0,
            lineup_size: 5,
        },
        GameLine {
            pas: 8,
            hits: 2,
            homeruns: 0,
            steals: 0,
            lineup_size: 5,
        },
    ]
}

pub fn regular_season() -> LeagueState {
    LeagueState {
        season: 20,
        day: 10,
        phase: 2,
    }
}

pub fn options(min_rows: usize) -> RunOptions {
    RunOptions {
        feed_timeout: Duration::from_secs(30),
        layout: SheetLayout {
            min_rows,
            ..SheetLayout::default()
        },
    }
}

pub fn run_once(
    league: &FakeLeague,
    state: &LeagueState,
    conn: &mut Connection,
    sink: &mut RecordingSink,
    min_rows: usize,
) -> Result<RunSummary> {
    let providers = Providers {
        roster: league,
        schedule: league,
        feed: league,
    };
    engine::run(state, &providers, conn, sink, &options(min_rows))
}

pub fn number(cell: &Cell) -> f64 {
    match cell {
        Cell::Number(n) => *n,
        Cell::Integer(n) => *n as f64,
        other => panic!("expected a number, got {other:?}"),
    }
}
