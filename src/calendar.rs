use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::schedule_parse::MatchRecord;

/// Total goals at which a match bar is drawn full.
pub const MAX_GOALS_FILL: u32 = 8;

pub fn goal_fill_percent(total_goals: u32) -> f64 {
    (f64::from(total_goals) / f64::from(MAX_GOALS_FILL) * 100.0).min(100.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarMatch {
    pub team1: String,
    pub team2: String,
    pub time: String,
    pub score: String,
    pub stage: String,
    pub total_goals: u32,
    pub fill_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: String,
    pub day_of_month: u32,
    pub matches: Vec<CalendarMatch>,
}

pub fn group_by_day(records: &[MatchRecord]) -> Vec<CalendarDay> {
    let mut days: BTreeMap<NaiveDate, Vec<CalendarMatch>> = BTreeMap::new();
    for record in records {
        let total_goals = record.score.goals.total();
        days.entry(record.date).or_default().push(CalendarMatch {
            team1: record.team1.clone(),
            team2: record.team2.clone(),
            time: record.time_hhmm(),
            score: record.score.to_string(),
            stage: record.stage.label().to_string(),
            total_goals,
            fill_percent: goal_fill_percent(total_goals),
        });
    }
    days.into_iter()
        .map(|(date, matches)| CalendarDay {
            date: date.format("%Y-%m-%d").to_string(),
            day_of_month: date.day(),
            matches,
        })
        .collect()
}
