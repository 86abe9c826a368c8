use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::match_csv::EditionRow;
use crate::stage::stage_value;

/// Per-team totals for one edition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamYearMetrics {
    pub team: String,
    pub matches_played: u32,
    pub wins: u32,
    pub clean_sheets: u32,
    pub highest_stage: u8,
    /// Signed: edition files are folded as written, negative cells included.
    pub goals_scored: i64,
    /// 1-based; 0 until `EditionTable::assign_ranks` has run.
    pub rank: u32,
}

impl TeamYearMetrics {
    fn new(team: &str) -> Self {
        Self {
            team: team.to_string(),
            ..Self::default()
        }
    }

    fn record(&mut self, own: i64, opponent: i64, stage: u8) {
        self.matches_played = self.matches_played.saturating_add(1);
        self.goals_scored = self.goals_scored.saturating_add(own);
        if own > opponent {
            self.wins = self.wins.saturating_add(1);
        }
        if opponent == 0 {
            self.clean_sheets = self.clean_sheets.saturating_add(1);
        }
        self.highest_stage = self.highest_stage.max(stage);
    }

    pub fn win_percentage(&self) -> u32 {
        win_percentage(self.wins, self.matches_played)
    }
}

/// `wins / matches` as a whole percentage, rounding halves to even. Zero matches is 0%.
pub fn win_percentage(wins: u32, matches: u32) -> u32 {
    if matches == 0 {
        return 0;
    }
    (f64::from(wins) / f64::from(matches) * 100.0).round_ties_even() as u32
}

/// Team metrics for a single edition, kept in first-appearance order.
#[derive(Debug, Clone, Default)]
pub struct EditionTable {
    teams: Vec<TeamYearMetrics>,
    index: HashMap<String, usize>,
    pub rows_folded: usize,
    pub rows_skipped: usize,
}

impl EditionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one result row into both teams. Returns false (and changes nothing)
    /// when either score is not an integer. Counters saturate instead of wrapping.
    pub fn fold_row(&mut self, row: &EditionRow) -> bool {
        let (Ok(score1), Ok(score2)) = (
            row.team1_score.trim().parse::<i64>(),
            row.team2_score.trim().parse::<i64>(),
        ) else {
            log::debug!(
                "skipping row {} vs {}: bad score {:?}-{:?}",
                row.team1,
                row.team2,
                row.team1_score,
                row.team2_score
            );
            self.rows_skipped += 1;
            return false;
        };

        let stage = stage_value(&row.stage);
        self.entry(row.team1.trim()).record(score1, score2, stage);
        self.entry(row.team2.trim()).record(score2, score1, stage);
        self.rows_folded += 1;
        true
    }

    fn entry(&mut self, team: &str) -> &mut TeamYearMetrics {
        let idx = match self.index.get(team) {
            Some(idx) => *idx,
            None => {
                self.teams.push(TeamYearMetrics::new(team));
                self.index.insert(team.to_string(), self.teams.len() - 1);
                self.teams.len() - 1
            }
        };
        &mut self.teams[idx]
    }

    /// Rank by furthest stage (deepest first), then wins; teams tied on both keep
    /// their first-appearance order. Ranks are consecutive across stage groups.
    pub fn assign_ranks(&mut self) {
        let mut by_stage: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
        for (idx, team) in self.teams.iter().enumerate() {
            by_stage.entry(team.highest_stage).or_default().push(idx);
        }

        let mut rank = 1u32;
        for (_, mut group) in by_stage.into_iter().rev() {
            group.sort_by(|a, b| self.teams[*b].wins.cmp(&self.teams[*a].wins));
            for idx in group {
                self.teams[idx].rank = rank;
                rank += 1;
            }
        }
    }

    pub fn get(&self, team: &str) -> Option<&TeamYearMetrics> {
        self.index.get(team).map(|idx| &self.teams[*idx])
    }

    pub fn teams(&self) -> &[TeamYearMetrics] {
        &self.teams
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn ranked(&self) -> Vec<&TeamYearMetrics> {
        let mut out: Vec<&TeamYearMetrics> = self.teams.iter().collect();
        out.sort_by_key(|t| t.rank);
        out
    }
}

/// Fold every row of an edition, then rank.
pub fn aggregate_edition(rows: &[EditionRow]) -> EditionTable {
    let mut table = EditionTable::new();
    for row in rows {
        table.fold_row(row);
    }
    table.assign_ranks();
    table
}
