use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::eligibility::{build_context, teams_playing_strategy};
use crate::league_state::LeagueState;
use crate::projection_table::{self, SheetLayout};
use crate::projector::project_all;
use crate::providers::{EventStreamProvider, RosterProvider, ScheduleProvider};
use crate::sink::Sink;
use crate::statsheets::{aggregate_hitters, distinct_player_ids, ensure_statsheets};

pub struct Providers<'a> {
    pub roster: &'a dyn RosterProvider,
    pub schedule: &'a dyn ScheduleProvider,
    pub feed: &'a dyn EventStreamProvider,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub feed_timeout: Duration,
    pub layout: SheetLayout,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub season: i64,
    pub today: i64,
    pub phase: i64,
    pub players_seen: usize,
    pub players_projected: usize,
    pub skipped_missing: usize,
    pub skipped_zero_pa: usize,
    pub eligible: usize,
    pub rows_published: usize,
}

/// One full refresh of the hitter projection for `state`.
///
/// Every provider call and statsheet read happens before `hitters_proj` is
/// touched, so a failed fetch leaves the previous table and sheet in place.
pub fn run(
    state: &LeagueState,
    providers: &Providers<'_>,
    conn: &mut Connection,
    sink: &mut dyn Sink,
    opts: &RunOptions,
) -> Result<RunSummary> {
    log::info!(
        "updating hitter projection for season {} day {} (phase {})",
        state.display_season(),
        state.today(),
        state.phase
    );

    ensure_statsheets(conn)?;
    let strategy = teams_playing_strategy(state, providers.schedule, providers.feed, opts.feed_timeout);
    let ctx = build_context(state, providers.roster, strategy.as_ref())
        .context("build eligibility context")?;
    log::info!("{} teams play tomorrow", ctx.teams_playing.len());

    let player_ids = distinct_player_ids(conn)?;
    let directory = providers
        .roster
        .get_players(&player_ids)
        .context("fetch player directory")?;
    let aggregates = aggregate_hitters(conn, &player_ids, &directory)?;
    let projection = project_all(&aggregates.hitters, &ctx);

    projection_table::rebuild(conn, &projection.records)?;
    let rows_published = projection_table::publish(conn, sink, &opts.layout, state.today())?;

    let summary = RunSummary {
        season: state.display_season(),
        today: state.today(),
        phase: state.phase,
        players_seen: aggregates.players_seen,
        players_projected: projection.records.len(),
        skipped_missing: aggregates.skipped_missing,
        skipped_zero_pa: projection.skipped_zero_pa,
        eligible: projection.eligible(),
        rows_published,
    };
    log::info!(
        "hitter projection updated: {} projected, {} eligible, {} skipped",
        summary.players_projected,
        summary.eligible,
        summary.skipped_missing + summary.skipped_zero_pa
    );
    Ok(summary)
}
