use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

use crate::score::{MatchScore, ScorePair};
use crate::stage::{Stage, determine_stage};

// (12) Mon Nov/21 16:00 England 6-2 (3-0) Iran @ Khalifa International Stadium, Al Rayyan
static GROUP_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*\((\d+)\)\s+(\w+)\s+([A-Za-z]+)/(\d{1,2})\s+(\d{1,2}:\d{2})\s+([^@]+?)\s+(\d+)-(\d+)\s+\(\d+-\d+\)\s+([^@]+?)\s*(?:@\s*(.*?))?\s*$",
    )
    .expect("valid group-stage line regex")
});

// (58) Fri Dec/9 18:00 Croatia 4-2 pen. 1-1 a.e.t. (0-0, 0-0) Brazil @ Education City Stadium
static KNOCKOUT_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*\((\d+)\)\s+(\w+)\s+([A-Za-z]+)/(\d{1,2})\s+(\d{1,2}:\d{2})\s+([^@]+?)\s+(?:(\d+)-(\d+)\s+pen\.\s+)?(\d+)-(\d+)(\s+a\.e\.t\.)?(?:\s+\(\d+-\d+(?:,\s*\d+-\d+)*\))?\s+([^@]+?)\s*(?:@\s*(.*?))?\s*$",
    )
    .expect("valid knockout line regex")
});

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    GroupStage,
    Knockout,
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grammar::GroupStage => f.write_str("group"),
            Grammar::Knockout => f.write_str("knockout"),
        }
    }
}

impl FromStr for Grammar {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "group" | "groups" | "group-stage" => Ok(Grammar::GroupStage),
            "knockout" | "finals" | "ko" => Ok(Grammar::Knockout),
            other => Err(anyhow!("unknown schedule grammar {other:?}")),
        }
    }
}

/// Why a schedule line produced no match record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("blank line")]
    Blank,
    #[error("table separator or divider")]
    Noise,
    #[error("line does not match the {0} grammar")]
    NoMatch(Grammar),
    #[error("invalid date {month}/{day} {kickoff} in {year}")]
    InvalidDate {
        year: i32,
        month: String,
        day: u32,
        kickoff: String,
    },
}

/// Fields captured from one schedule line, before the date is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub match_number: u32,
    pub weekday: String,
    pub month: String,
    pub day: u32,
    pub kickoff: String,
    pub team1: String,
    pub team2: String,
    pub goals: ScorePair,
    pub penalties: Option<ScorePair>,
    pub extra_time: bool,
    pub venue: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub date: NaiveDate,
    pub kickoff: NaiveTime,
    pub team1: String,
    pub team2: String,
    pub score: MatchScore,
    pub stage: Stage,
}

impl MatchRecord {
    pub fn date_iso(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn time_hhmm(&self) -> String {
        self.kickoff.format("%H:%M").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Match(MatchRecord),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line_no: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleParse {
    pub records: Vec<MatchRecord>,
    pub skipped: Vec<SkippedLine>,
}

pub fn parse_group_line(line: &str) -> Result<ParsedLine, SkipReason> {
    if line.trim().is_empty() {
        return Err(SkipReason::Blank);
    }
    let caps = GROUP_LINE_RE
        .captures(line)
        .ok_or(SkipReason::NoMatch(Grammar::GroupStage))?;
    let nomatch = || SkipReason::NoMatch(Grammar::GroupStage);
    Ok(ParsedLine {
        match_number: cap_u32(&caps, 1).ok_or_else(nomatch)?,
        weekday: cap_str(&caps, 2),
        month: cap_str(&caps, 3),
        day: cap_u32(&caps, 4).ok_or_else(nomatch)?,
        kickoff: cap_str(&caps, 5),
        team1: cap_str(&caps, 6),
        goals: ScorePair::new(
            cap_u32(&caps, 7).ok_or_else(nomatch)?,
            cap_u32(&caps, 8).ok_or_else(nomatch)?,
        ),
        team2: cap_str(&caps, 9),
        penalties: None,
        extra_time: false,
        venue: cap_opt(&caps, 10),
    })
}

pub fn parse_knockout_line(line: &str) -> Result<ParsedLine, SkipReason> {
    if line.trim().is_empty() {
        return Err(SkipReason::Blank);
    }
    if line.contains('|') || line.trim_start().starts_with('=') {
        return Err(SkipReason::Noise);
    }
    let caps = KNOCKOUT_LINE_RE
        .captures(line)
        .ok_or(SkipReason::NoMatch(Grammar::Knockout))?;
    let nomatch = || SkipReason::NoMatch(Grammar::Knockout);
    let penalties = match (cap_u32(&caps, 7), cap_u32(&caps, 8)) {
        (Some(home), Some(away)) => Some(ScorePair::new(home, away)),
        _ => None,
    };
    Ok(ParsedLine {
        match_number: cap_u32(&caps, 1).ok_or_else(nomatch)?,
        weekday: cap_str(&caps, 2),
        month: cap_str(&caps, 3),
        day: cap_u32(&caps, 4).ok_or_else(nomatch)?,
        kickoff: cap_str(&caps, 5),
        team1: cap_str(&caps, 6),
        penalties,
        goals: ScorePair::new(
            cap_u32(&caps, 9).ok_or_else(nomatch)?,
            cap_u32(&caps, 10).ok_or_else(nomatch)?,
        ),
        extra_time: caps.get(11).is_some(),
        team2: cap_str(&caps, 12),
        venue: cap_opt(&caps, 13),
    })
}

/// Parse one line under `grammar` and resolve its date against `year`.
pub fn extract_line(line: &str, grammar: Grammar, year: i32) -> LineOutcome {
    let parsed = match grammar {
        Grammar::GroupStage => parse_group_line(line),
        Grammar::Knockout => parse_knockout_line(line),
    };
    let parsed = match parsed {
        Ok(p) => p,
        Err(reason) => return LineOutcome::Skipped(reason),
    };
    let Some((date, kickoff)) = resolve_date(year, &parsed.month, parsed.day, &parsed.kickoff)
    else {
        return LineOutcome::Skipped(SkipReason::InvalidDate {
            year,
            month: parsed.month,
            day: parsed.day,
            kickoff: parsed.kickoff,
        });
    };
    let stage = match grammar {
        Grammar::GroupStage => Stage::GroupStage,
        Grammar::Knockout => determine_stage(parsed.match_number),
    };
    let score = match parsed.penalties {
        Some(pen) => MatchScore::with_penalties(parsed.goals, pen),
        None => MatchScore::regulation(parsed.goals),
    };
    LineOutcome::Match(MatchRecord {
        date,
        kickoff,
        team1: parsed.team1,
        team2: parsed.team2,
        score,
        stage,
    })
}

pub fn parse_schedule(text: &str, grammar: Grammar, year: i32) -> ScheduleParse {
    let mut out = ScheduleParse::default();
    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        match extract_line(line, grammar, year) {
            LineOutcome::Match(record) => out.records.push(record),
            LineOutcome::Skipped(SkipReason::Blank) => {}
            LineOutcome::Skipped(reason) => {
                match &reason {
                    SkipReason::InvalidDate { .. } => log::warn!("line {line_no}: {reason}"),
                    _ => log::debug!("line {line_no}: {reason}"),
                }
                out.skipped.push(SkippedLine { line_no, reason });
            }
        }
    }
    out
}

/// Guess the edition year from the raw text: `candidate` when its digits appear
/// anywhere in the document, `fallback` otherwise. Only used when no year was given.
pub fn infer_year(text: &str, candidate: i32, fallback: i32) -> i32 {
    if text.contains(&candidate.to_string()) {
        candidate
    } else {
        fallback
    }
}

fn resolve_date(year: i32, month: &str, day: u32, kickoff: &str) -> Option<(NaiveDate, NaiveTime)> {
    let month = month_number(month)?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let kickoff = NaiveTime::parse_from_str(kickoff, "%H:%M").ok()?;
    Some((date, kickoff))
}

fn month_number(raw: &str) -> Option<u32> {
    let lower = raw.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == lower)
        .map(|idx| idx as u32 + 1)
}

fn cap_str(caps: &Captures<'_>, idx: usize) -> String {
    caps.get(idx)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

fn cap_opt(caps: &Captures<'_>, idx: usize) -> Option<String> {
    caps.get(idx)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn cap_u32(caps: &Captures<'_>, idx: usize) -> Option<u32> {
    caps.get(idx)?.as_str().parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_line_with_multi_word_teams() {
        let line = "(1) Sun Nov/20 19:00 Qatar 0-2 (0-2) Ecuador @ Al Bayt Stadium, Al Khor";
        let parsed = parse_group_line(line).expect("group line should parse");
        assert_eq!(parsed.match_number, 1);
        assert_eq!(parsed.weekday, "Sun");
        assert_eq!(parsed.team1, "Qatar");
        assert_eq!(parsed.team2, "Ecuador");
        assert_eq!(parsed.goals, ScorePair::new(0, 2));
        assert_eq!(parsed.venue.as_deref(), Some("Al Bayt Stadium, Al Khor"));

        let line = "(17) Tue Nov/22 13:00 Saudi Arabia 2-1 (0-1) Argentina";
        let parsed = parse_group_line(line).expect("line without venue should parse");
        assert_eq!(parsed.team1, "Saudi Arabia");
        assert_eq!(parsed.team2, "Argentina");
        assert!(parsed.venue.is_none());
    }

    #[test]
    fn group_line_requires_halftime_score() {
        let line = "(1) Sun Nov/20 19:00 Qatar 0-2 Ecuador @ Al Bayt Stadium";
        assert_eq!(
            parse_group_line(line),
            Err(SkipReason::NoMatch(Grammar::GroupStage))
        );
    }

    #[test]
    fn knockout_line_with_shootout() {
        let line = "(58) Fri Dec/9 18:00 Croatia 4-2 pen. 1-1 a.e.t. Brazil @ Stadium";
        let parsed = parse_knockout_line(line).expect("knockout line should parse");
        assert_eq!(parsed.team1, "Croatia");
        assert_eq!(parsed.team2, "Brazil");
        assert_eq!(parsed.goals, ScorePair::new(1, 1));
        assert_eq!(parsed.penalties, Some(ScorePair::new(4, 2)));
        assert!(parsed.extra_time);

        let LineOutcome::Match(record) = extract_line(line, Grammar::Knockout, 2022) else {
            panic!("expected a match record");
        };
        assert_eq!(record.score.to_string(), "1-1 (4-2 pen.)");
        assert_eq!(record.stage, Stage::QuarterFinals);
        assert_eq!(record.date_iso(), "2022-12-09");
        assert_eq!(record.time_hhmm(), "18:00");
    }

    #[test]
    fn knockout_line_with_halftime_and_extra_time_only() {
        let line = "(64) Sun Dec/18 18:00 Argentina 3-3 a.e.t. (2-0, 2-2) France @ Lusail Stadium";
        let parsed = parse_knockout_line(line).expect("final should parse");
        assert_eq!(parsed.goals, ScorePair::new(3, 3));
        assert!(parsed.penalties.is_none());
        assert!(parsed.extra_time);
        assert_eq!(parsed.team2, "France");

        let line = "(49) Sat Dec/3 18:00 Netherlands 3-1 (2-0) United States @ Khalifa";
        let parsed = parse_knockout_line(line).expect("round of 16 should parse");
        assert!(!parsed.extra_time);
        assert_eq!(parsed.team2, "United States");
    }

    #[test]
    fn knockout_noise_is_skipped_before_matching() {
        assert_eq!(
            parse_knockout_line("| (58) Fri Dec/9 18:00 A 1-0 B |"),
            Err(SkipReason::Noise)
        );
        assert_eq!(
            parse_knockout_line("====================="),
            Err(SkipReason::Noise)
        );
        assert_eq!(
            parse_knockout_line("Quarter-finals"),
            Err(SkipReason::NoMatch(Grammar::Knockout))
        );
    }

    #[test]
    fn invalid_calendar_date_is_reported_per_line() {
        let outcome = extract_line("(3) Mon Feb/30 13:00 A 1-0 (0-0) B", Grammar::GroupStage, 2022);
        assert!(matches!(
            outcome,
            LineOutcome::Skipped(SkipReason::InvalidDate { day: 30, .. })
        ));
        let outcome = extract_line("(3) Mon Nov/21 25:00 A 1-0 (0-0) B", Grammar::GroupStage, 2022);
        assert!(matches!(
            outcome,
            LineOutcome::Skipped(SkipReason::InvalidDate { .. })
        ));
    }

    #[test]
    fn schedule_batch_continues_after_bad_lines() {
        let text = "Group A\n\n(1) Sun Nov/20 19:00 Qatar 0-2 (0-2) Ecuador\n(2) Mon Nov/31 19:00 A 1-1 (0-0) B\n(3) Mon Nov/21 19:00 Senegal 0-2 (0-0) Netherlands\n";
        let parsed = parse_schedule(text, Grammar::GroupStage, 2022);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.skipped.len(), 2);
        assert_eq!(parsed.skipped[0].line_no, 1);
        assert_eq!(parsed.skipped[1].line_no, 4);
        assert_eq!(parsed.records[1].team2, "Netherlands");
    }

    #[test]
    fn year_inference_falls_back() {
        assert_eq!(infer_year("World Cup 2018 Russia", 2018, 2022), 2018);
        assert_eq!(infer_year("Qatar", 2018, 2022), 2022);
    }

    #[test]
    fn grammar_names_parse() {
        assert_eq!("group".parse::<Grammar>().unwrap(), Grammar::GroupStage);
        assert_eq!("Knockout".parse::<Grammar>().unwrap(), Grammar::Knockout);
        assert!("league".parse::<Grammar>().is_err());
    }
}
