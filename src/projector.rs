use std::collections::HashSet;

use crate::eligibility::EligibilityContext;
use crate::providers::Player;
use crate::statsheets::{HitterAggregate, KnownHitter};

/// Payout modifiers and the multiplier each grants. The highest one held wins.
pub const PAYOUT_MODS: &[(&str, u8)] = &[("DOUBLE_PAYOUTS", 2), ("CREDIT_TO_THE_TEAM", 5)];

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub player_id: String,
    pub player_name: String,
    pub team_abbr: String,
    pub games: u32,
    pub pas: u32,
    /// Hits that are not home runs.
    pub hits: u32,
    pub homeruns: u32,
    pub steals: u32,
    pub lineup_sum: u32,
    pub papg: f64,
    pub hppa: f64,
    pub hrppa: f64,
    pub sbppa: f64,
    pub lineup_avg: f64,
    pub lineup_current: u32,
    pub can_earn: bool,
    pub multiplier: u8,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectionReport {
    pub records: Vec<PlayerRecord>,
    pub skipped_zero_pa: usize,
}

impl ProjectionReport {
    pub fn eligible(&self) -> usize {
        self.records.iter().filter(|r| r.can_earn).count()
    }
}

pub fn payout_multiplier(mods: &HashSet<&str>) -> u8 {
    PAYOUT_MODS
        .iter()
        .filter(|(name, _)| mods.contains(*name))
        .map(|(_, multiplier)| *multiplier)
        .max()
        .unwrap_or(1)
}

pub fn can_earn(player: &Player, mods: &HashSet<&str>, ctx: &EligibilityContext) -> bool {
    if mods.iter().any(|m| ctx.disqualifying_mods.contains(*m)) {
        return false;
    }
    if ctx.is_removed(&player.id) {
        return false;
    }
    // Offseason phases still show everyone so day-zero picks can be made.
    ctx.waive_team_playing || ctx.team_plays_next(player.team_id.as_deref())
}

/// Builds the finished record for one hitter. Returns `None` when the player has
/// no plate appearances, since none of the rates are defined.
pub fn project(
    agg: &HitterAggregate,
    player: &Player,
    ctx: &EligibilityContext,
) -> Option<PlayerRecord> {
    if agg.pas == 0 || agg.games == 0 {
        return None;
    }
    let pas = f64::from(agg.pas);
    let games = f64::from(agg.games);
    // Home runs don't count toward hit payouts.
    let singles_up = agg.hits.saturating_sub(agg.homeruns);

    let mods = player.modifiers();
    let team_id = player.team_id.as_deref();

    let team_abbr = match team_id.and_then(|id| ctx.team_abbreviations.get(id)) {
        Some(abbr) => abbr.clone(),
        None => {
            log::warn!(
                "no abbreviation for {}'s team {:?}, keeping {}",
                agg.player_id,
                team_id,
                agg.team_name
            );
            agg.team_name.clone()
        }
    };

    let lineup_current = match ctx.day_zero_lineups.as_ref() {
        Some(lineups) => team_id
            .and_then(|id| lineups.get(id))
            .copied()
            .unwrap_or(agg.lineup_current),
        None => agg.lineup_current,
    };

    Some(PlayerRecord {
        player_id: agg.player_id.clone(),
        player_name: agg.player_name.clone(),
        team_abbr,
        games: agg.games,
        pas: agg.pas,
        hits: singles_up,
        homeruns: agg.homeruns,
        steals: agg.steals,
        lineup_sum: agg.lineup_sum,
        papg: pas / games,
        hppa: f64::from(singles_up) / pas,
        hrppa: f64::from(agg.homeruns) / pas,
        sbppa: f64::from(agg.steals) / pas,
        lineup_avg: f64::from(agg.lineup_sum) / games,
        lineup_current,
        can_earn: can_earn(player, &mods, ctx),
        multiplier: payout_multiplier(&mods),
    })
}

pub fn project_all(hitters: &[KnownHitter], ctx: &EligibilityContext) -> ProjectionReport {
    let mut report = ProjectionReport::default();
    for hitter in hitters {
        match project(&hitter.aggregate, &hitter.player, ctx) {
            Some(record) => report.records.push(record),
            None => {
                log::debug!(
                    "{} has no plate appearances, skipping",
                    hitter.aggregate.player_id
                );
                report.skipped_zero_pa += 1;
            }
        }
    }
    report
}
