use std::collections::HashSet;
use std::io::BufRead;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

/// Splits a server-sent-event body into frames. Each frame is the `data:` payload of
/// one event; events with no data (comments, heartbeats) yield an empty string.
pub struct SseFrames<R> {
    reader: R,
    done: bool,
}

impl<R: BufRead> SseFrames<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for SseFrames<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut data: Vec<String> = Vec::new();
        let mut saw_line = false;
        loop {
            let mut line = String::new();
            let read = match self.reader.read_line(&mut line) {
                Ok(n) => n,
                Err(err) => {
                    self.done = true;
                    return Some(Err(anyhow::Error::new(err).context("read live feed")));
                }
            };
            if read == 0 {
                self.done = true;
                if saw_line {
                    return Some(Ok(data.join("\n")));
                }
                return None;
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                return Some(Ok(data.join("\n")));
            }
            saw_line = true;
            if let Some(rest) = line.strip_prefix("data:") {
                data.push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
            }
            // `event:`, `id:`, `retry:` and `:` comments carry nothing we use.
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    KeepAlive,
    Unrelated,
    /// Team ids named on either side of tomorrow's games.
    Schedule(Vec<String>),
}

pub fn classify_frame(raw: &str) -> FrameOutcome {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return FrameOutcome::KeepAlive;
    }
    let root: Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(err) => {
            log::warn!("skipping malformed feed frame: {err}");
            return FrameOutcome::Unrelated;
        }
    };
    let games = root
        .get("value")
        .and_then(|v| v.get("games"))
        .or_else(|| root.get("games"));
    let Some(schedule) = games
        .and_then(|g| g.get("tomorrowSchedule"))
        .and_then(|s| s.as_array())
    else {
        return FrameOutcome::Unrelated;
    };

    let mut teams = Vec::with_capacity(schedule.len() * 2);
    for (idx, entry) in schedule.iter().enumerate() {
        for side in ["awayTeam", "homeTeam"] {
            match entry.get(side).and_then(Value::as_str) {
                Some(team) if !team.is_empty() => teams.push(team.to_string()),
                _ => log::warn!("tomorrowSchedule entry #{idx} has no {side}"),
            }
        }
    }
    FrameOutcome::Schedule(teams)
}

/// Consumes frames until the first one carrying `games.tomorrowSchedule` and returns
/// the teams in it. Nothing past that frame is read. Fails when the feed ends or
/// `timeout` elapses first.
pub fn first_tomorrow_schedule<I>(frames: I, timeout: Duration) -> Result<HashSet<String>>
where
    I: IntoIterator<Item = Result<String>>,
{
    let started = Instant::now();
    let mut skipped = 0usize;
    for frame in frames {
        let frame = frame.context("live feed failed before a schedule frame arrived")?;
        match classify_frame(&frame) {
            FrameOutcome::Schedule(teams) => {
                log::info!("tomorrow's teams from live feed: {teams:?}");
                return Ok(teams.into_iter().collect());
            }
            FrameOutcome::KeepAlive | FrameOutcome::Unrelated => {
                skipped += 1;
                log::debug!("skipped live feed frame #{skipped}");
            }
        }
        if started.elapsed() >= timeout {
            return Err(anyhow!(
                "no tomorrowSchedule frame within {}s ({skipped} frames skipped)",
                timeout.as_secs()
            ));
        }
    }
    Err(anyhow!(
        "live feed ended before a tomorrowSchedule frame ({skipped} frames skipped)"
    ))
}
