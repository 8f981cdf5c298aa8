//! Seams to the live league. Every input the projection needs comes through one of
//! these traits so a run can be driven by the HTTP client or by in-memory fakes.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use serde::Deserialize;

use crate::league_state::LeagueState;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Team {
    pub id: String,
    #[serde(rename = "shorthand", default)]
    pub abbreviation: String,
    #[serde(default)]
    pub stadium: Option<String>,
    #[serde(default)]
    pub lineup: Vec<String>,
    #[serde(default)]
    pub rotation: Vec<String>,
    #[serde(default)]
    pub shadows: Vec<String>,
}

impl Team {
    /// Historical and exhibition-only teams have no stadium.
    pub fn is_active(&self) -> bool {
        self.stadium.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Player {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "leagueTeamId", default)]
    pub team_id: Option<String>,
    #[serde(rename = "permAttr", default)]
    pub modifiers_permanent: Vec<String>,
    #[serde(rename = "seasAttr", default)]
    pub modifiers_seasonal: Vec<String>,
    #[serde(rename = "itemAttr", default)]
    pub modifiers_item: Vec<String>,
}

impl Player {
    pub fn modifiers(&self) -> HashSet<&str> {
        self.modifiers_permanent
            .iter()
            .chain(&self.modifiers_seasonal)
            .chain(&self.modifiers_item)
            .map(String::as_str)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduledGame {
    #[serde(rename = "homeTeam")]
    pub home_team: String,
    #[serde(rename = "awayTeam")]
    pub away_team: String,
}

pub trait LeagueStateProvider {
    fn get_state(&self) -> Result<LeagueState>;
}

pub trait RosterProvider {
    fn get_all_teams(&self) -> Result<HashMap<String, Team>>;

    /// Ids of incinerated players.
    fn get_tributes(&self) -> Result<Vec<String>>;

    /// Ids the league does not know are left out of the map.
    fn get_players(&self, ids: &[String]) -> Result<HashMap<String, Player>>;
}

pub trait ScheduleProvider {
    /// `season` and `day` are raw zero-based values.
    fn get_games(&self, season: i64, day: i64) -> Result<HashMap<String, ScheduledGame>>;
}

pub type FrameStream<'a> = Box<dyn Iterator<Item = Result<String>> + 'a>;

pub trait EventStreamProvider {
    /// Opens the live feed. Each item is the payload of one event; keep-alives come
    /// through as empty strings. The sequence cannot be restarted.
    fn open(&self) -> Result<FrameStream<'_>>;
}
