use std::collections::{HashMap, HashSet};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::event_stream::first_tomorrow_schedule;
use crate::league_state::LeagueState;
use crate::providers::{EventStreamProvider, RosterProvider, ScheduleProvider, Team};

/// Modifiers that keep a player from earning anything.
pub const INACTIVE_MODS: &[&str] = &["ELSEWHERE", "SHELLED", "LEGENDARY", "REPLICA", "NON_IDOLIZED"];
/// Modifiers that take a lineup slot out of play for the day-zero count.
pub const SIDELINED_MODS: &[&str] = &["SHELLED", "ELSEWHERE"];

#[derive(Debug, Clone, Default)]
pub struct EligibilityContext {
    pub disqualifying_mods: HashSet<&'static str>,
    pub incinerated: HashSet<String>,
    pub shadowed: HashSet<String>,
    pub pitching: HashSet<String>,
    pub teams_playing: HashSet<String>,
    pub team_abbreviations: HashMap<String, String>,
    /// Active lineup size per team, only filled on day zero.
    pub day_zero_lineups: Option<HashMap<String, u32>>,
    pub waive_team_playing: bool,
}

impl EligibilityContext {
    pub fn is_removed(&self, player_id: &str) -> bool {
        self.incinerated.contains(player_id)
            || self.shadowed.contains(player_id)
            || self.pitching.contains(player_id)
    }

    pub fn team_plays_next(&self, team_id: Option<&str>) -> bool {
        team_id.is_some_and(|id| self.teams_playing.contains(id))
    }
}

/// Answers "which teams play on the next simulated day".
pub trait TeamsPlaying {
    fn resolve_teams_playing(&self) -> Result<HashSet<String>>;
}

/// Reads the next day's games straight from the schedule.
pub struct ScheduleLookup<'a> {
    schedule: &'a dyn ScheduleProvider,
    season: i64,
    day: i64,
}

impl<'a> ScheduleLookup<'a> {
    pub fn new(schedule: &'a dyn ScheduleProvider, state: &LeagueState) -> Self {
        Self {
            schedule,
            season: state.season,
            day: state.next_raw_day(),
        }
    }
}

impl TeamsPlaying for ScheduleLookup<'_> {
    fn resolve_teams_playing(&self) -> Result<HashSet<String>> {
        let games = self
            .schedule
            .get_games(self.season, self.day)
            .with_context(|| format!("fetch games for season {} day {}", self.season, self.day))?;
        let mut teams = HashSet::new();
        for game in games.into_values() {
            teams.insert(game.away_team);
            teams.insert(game.home_team);
        }
        Ok(teams)
    }
}

/// Waits on the live feed for the first frame that carries tomorrow's schedule.
/// Used while the bracket is drawn but the next round cannot be looked up by day.
pub struct LiveFeedSchedule<'a> {
    feed: &'a dyn EventStreamProvider,
    timeout: Duration,
}

impl<'a> LiveFeedSchedule<'a> {
    pub fn new(feed: &'a dyn EventStreamProvider, timeout: Duration) -> Self {
        Self { feed, timeout }
    }
}

impl TeamsPlaying for LiveFeedSchedule<'_> {
    fn resolve_teams_playing(&self) -> Result<HashSet<String>> {
        let frames = self.feed.open().context("open live feed")?;
        first_tomorrow_schedule(frames, self.timeout)
    }
}

pub fn teams_playing_strategy<'a>(
    state: &LeagueState,
    schedule: &'a dyn ScheduleProvider,
    feed: &'a dyn EventStreamProvider,
    feed_timeout: Duration,
) -> Box<dyn TeamsPlaying + 'a> {
    if state.is_bracket_drawn() {
        log::info!("phase {}: reading tomorrow's games from the live feed", state.phase);
        Box::new(LiveFeedSchedule::new(feed, feed_timeout))
    } else {
        Box::new(ScheduleLookup::new(schedule, state))
    }
}

pub fn build_context(
    state: &LeagueState,
    roster: &dyn RosterProvider,
    teams_playing: &dyn TeamsPlaying,
) -> Result<EligibilityContext> {
    let teams = roster.get_all_teams().context("fetch teams")?;
    let incinerated = roster
        .get_tributes()
        .context("fetch tributes")?
        .into_iter()
        .collect::<HashSet<_>>();

    let team_abbreviations = teams
        .iter()
        .map(|(id, team)| (id.clone(), team.abbreviation.clone()))
        .collect::<HashMap<_, _>>();

    let mut active = teams.values().filter(|t| t.is_active()).collect::<Vec<_>>();
    active.sort_by(|a, b| a.id.cmp(&b.id));

    let shadowed = active
        .iter()
        .flat_map(|t| t.shadows.iter().cloned())
        .collect::<HashSet<_>>();
    let pitching = active
        .iter()
        .flat_map(|t| t.rotation.iter().cloned())
        .collect::<HashSet<_>>();

    let teams_playing = teams_playing.resolve_teams_playing()?;

    let day_zero_lineups = if state.is_day_zero() {
        Some(count_active_lineups(roster, &active)?)
    } else {
        None
    };

    Ok(EligibilityContext {
        disqualifying_mods: INACTIVE_MODS.iter().copied().collect(),
        incinerated,
        shadowed,
        pitching,
        teams_playing,
        team_abbreviations,
        day_zero_lineups,
        waive_team_playing: state.waives_team_playing(),
    })
}

/// Lineup members not sidelined by a modifier, per team. Replaces the stale
/// lineup sizes in the statsheets before the season's first game.
fn count_active_lineups(
    roster: &dyn RosterProvider,
    teams: &[&Team],
) -> Result<HashMap<String, u32>> {
    let ids = teams
        .iter()
        .flat_map(|t| t.lineup.iter().cloned())
        .collect::<Vec<_>>();
    let players = roster.get_players(&ids).context("fetch lineup players")?;

    let mut out = HashMap::with_capacity(teams.len());
    for team in teams {
        let count = team
            .lineup
            .iter()
            .filter_map(|id| players.get(id))
            .filter(|p| {
                let mods = p.modifiers();
                !SIDELINED_MODS.iter().any(|m| mods.contains(*m))
            })
            .count();
        out.insert(team.id.clone(), count as u32);
    }
    Ok(out)
}
