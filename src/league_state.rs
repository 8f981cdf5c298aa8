/// Phase between the election and the first game of a season.
pub const PHASE_DAY_ZERO: i64 = 0;
/// Postseason brackets are drawn but the first round is not queryable by day yet.
pub const PHASE_BRACKET_DRAWN: i64 = 8;
/// Phases where the "team plays tomorrow" check is waived.
pub const EXEMPT_PHASES: &[i64] = &[PHASE_DAY_ZERO, 12, 13];

/// Snapshot of the simulation clock. `season` and `day` are the raw zero-based
/// values reported by the league; use the helpers for human-facing numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeagueState {
    pub season: i64,
    pub day: i64,
    pub phase: i64,
}

impl LeagueState {
    pub fn display_season(&self) -> i64 {
        self.season + 1
    }

    pub fn today(&self) -> i64 {
        self.day + 1
    }

    /// Raw day index of the next simulated day, as the schedule endpoint expects.
    pub fn next_raw_day(&self) -> i64 {
        self.day + 1
    }

    pub fn is_day_zero(&self) -> bool {
        self.phase == PHASE_DAY_ZERO
    }

    pub fn is_bracket_drawn(&self) -> bool {
        self.phase == PHASE_BRACKET_DRAWN
    }

    pub fn waives_team_playing(&self) -> bool {
        EXEMPT_PHASES.contains(&self.phase)
    }
}
