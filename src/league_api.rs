use std::collections::HashMap;
use std::io::BufReader;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;

use crate::event_stream::SseFrames;
use crate::http_client::{feed_client, http_client};
use crate::league_state::LeagueState;
use crate::providers::{
    EventStreamProvider, FrameStream, LeagueStateProvider, Player, RosterProvider,
    ScheduleProvider, ScheduledGame, Team,
};

// The players endpoint rejects very long id lists.
const PLAYER_CHUNK: usize = 100;

/// Every league collaborator, backed by the public JSON API.
#[derive(Debug, Clone)]
pub struct LeagueApi {
    base_url: String,
    stream_url: String,
    feed_timeout: Duration,
}

impl LeagueApi {
    pub fn new(base_url: &str, stream_url: &str, feed_timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            stream_url: stream_url.to_string(),
            feed_timeout,
        }
    }

    fn get_text(&self, path: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        fetch_text(http_client()?, &url)
    }
}

fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let resp = client
        .get(url)
        .send()
        .with_context(|| format!("request failed: {url}"))?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {status} from {url}: {body}"));
    }
    Ok(body)
}

impl LeagueStateProvider for LeagueApi {
    fn get_state(&self) -> Result<LeagueState> {
        let body = self.get_text("/database/simulationData")?;
        parse_state_json(&body)
    }
}

impl RosterProvider for LeagueApi {
    fn get_all_teams(&self) -> Result<HashMap<String, Team>> {
        let body = self.get_text("/database/allTeams")?;
        parse_teams_json(&body)
    }

    fn get_tributes(&self) -> Result<Vec<String>> {
        let body = self.get_text("/api/getTribute")?;
        parse_tributes_json(&body)
    }

    fn get_players(&self, ids: &[String]) -> Result<HashMap<String, Player>> {
        let mut out = HashMap::with_capacity(ids.len());
        for chunk in ids.chunks(PLAYER_CHUNK) {
            let body = self.get_text(&format!("/database/players?ids={}", chunk.join(",")))?;
            out.extend(parse_players_json(&body)?);
        }
        Ok(out)
    }
}

impl ScheduleProvider for LeagueApi {
    fn get_games(&self, season: i64, day: i64) -> Result<HashMap<String, ScheduledGame>> {
        let body = self.get_text(&format!("/database/games?season={season}&day={day}"))?;
        parse_games_json(&body)
    }
}

impl EventStreamProvider for LeagueApi {
    fn open(&self) -> Result<FrameStream<'_>> {
        let client = feed_client(self.feed_timeout)?;
        let resp = client
            .get(&self.stream_url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .with_context(|| format!("connect to live feed {}", self.stream_url))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("live feed returned http {status}"));
        }
        Ok(Box::new(SseFrames::new(BufReader::new(resp))))
    }
}

#[derive(Debug, Deserialize)]
struct SimulationData {
    season: i64,
    day: i64,
    phase: i64,
}

pub fn parse_state_json(raw: &str) -> Result<LeagueState> {
    let sim: SimulationData =
        serde_json::from_str(raw.trim()).context("invalid simulation data json")?;
    Ok(LeagueState {
        season: sim.season,
        day: sim.day,
        phase: sim.phase,
    })
}

pub fn parse_teams_json(raw: &str) -> Result<HashMap<String, Team>> {
    let teams: Vec<Team> = serde_json::from_str(raw.trim()).context("invalid teams json")?;
    Ok(teams.into_iter().map(|t| (t.id.clone(), t)).collect())
}

#[derive(Debug, Deserialize)]
struct TributeBoard {
    #[serde(default)]
    players: Vec<Tribute>,
}

#[derive(Debug, Deserialize)]
struct Tribute {
    #[serde(rename = "playerId")]
    player_id: String,
}

pub fn parse_tributes_json(raw: &str) -> Result<Vec<String>> {
    let board: TributeBoard =
        serde_json::from_str(raw.trim()).context("invalid tributes json")?;
    Ok(board.players.into_iter().map(|p| p.player_id).collect())
}

pub fn parse_players_json(raw: &str) -> Result<HashMap<String, Player>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(HashMap::new());
    }
    let players: Vec<Player> = serde_json::from_str(trimmed).context("invalid players json")?;
    Ok(players.into_iter().map(|p| (p.id.clone(), p)).collect())
}

#[derive(Debug, Deserialize)]
struct GameRow {
    id: String,
    #[serde(flatten)]
    teams: ScheduledGame,
}

pub fn parse_games_json(raw: &str) -> Result<HashMap<String, ScheduledGame>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(HashMap::new());
    }
    let games: Vec<GameRow> = serde_json::from_str(trimmed).context("invalid games json")?;
    Ok(games.into_iter().map(|g| (g.id, g.teams)).collect())
}
