use std::collections::HashSet;
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;

use hitter_proj::event_stream::{SseFrames, first_tomorrow_schedule};
use hitter_proj::league_api::{
    parse_players_json, parse_state_json, parse_teams_json, parse_tributes_json,
};
use hitter_proj::projector::payout_multiplier;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_simulation_data_fixture() {
    let state = parse_state_json(&read_fixture("simulation_data.json")).expect("should parse");
    assert_eq!(state.season, 20);
    assert_eq!(state.day, 98);
    assert!(state.is_bracket_drawn());
    assert_eq!(state.display_season(), 21);
}

#[test]
fn parses_teams_fixture() {
    let teams = parse_teams_json(&read_fixture("all_teams.json")).expect("should parse");
    assert_eq!(teams.len(), 2);
    let lovers = &teams["b72f3061-f573-40d7-832a-5ad475bd7909"];
    assert_eq!(lovers.abbreviation, "SFL");
    assert!(lovers.is_active());
    assert_eq!(lovers.rotation, vec!["p-lover-arm".to_string()]);
    assert!(!teams["d2634113-b650-47b9-ad95-673f8e28e687"].is_active());
}

#[test]
fn parses_players_fixture() {
    let players = parse_players_json(&read_fixture("players.json")).expect("should parse");
    let sixpack = &players["p-lover-1"];
    assert_eq!(
        sixpack.team_id.as_deref(),
        Some("b72f3061-f573-40d7-832a-5ad475bd7909")
    );
    assert_eq!(payout_multiplier(&sixpack.modifiers()), 5);

    let nagomi = &players["p-lover-2"];
    assert!(nagomi.team_id.is_none());
    assert!(nagomi.modifiers().contains("ELSEWHERE"));
    assert!(nagomi.modifiers_item.is_empty());
}

#[test]
fn parses_tributes_fixture() {
    let ids = parse_tributes_json(&read_fixture("tributes.json")).expect("should parse");
    assert_eq!(ids, vec!["p-burnt-1".to_string(), "p-burnt-2".to_string()]);
}

#[test]
fn stream_fixture_yields_tomorrows_teams() {
    let frames = SseFrames::new(Cursor::new(read_fixture("stream_data.txt")));
    let teams = first_tomorrow_schedule(frames, Duration::from_secs(30)).expect("should resolve");
    assert_eq!(
        teams,
        HashSet::from([
            "b72f3061-f573-40d7-832a-5ad475bd7909".to_string(),
            "d2634113-b650-47b9-ad95-673f8e28e687".to_string(),
        ])
    );
}
