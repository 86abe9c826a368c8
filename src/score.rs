use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScorePair {
    pub home: u32,
    pub away: u32,
}

impl ScorePair {
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }

    pub fn total(&self) -> u32 {
        self.home.saturating_add(self.away)
    }
}

impl fmt::Display for ScorePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid score descriptor: {0:?}")]
pub struct ScoreParseError(pub String);

impl FromStr for ScorePair {
    type Err = ScoreParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ScoreParseError(s.to_string());
        let (home, away) = s.trim().split_once('-').ok_or_else(err)?;
        let home = home.trim().parse::<u32>().map_err(|_| err())?;
        let away = away.trim().parse::<u32>().map_err(|_| err())?;
        Ok(Self { home, away })
    }
}

/// Result of a match as printed in the output CSV: the regulation (or extra-time)
/// score, plus the shootout score when the tie went to penalties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchScore {
    pub goals: ScorePair,
    pub penalties: Option<ScorePair>,
}

impl MatchScore {
    pub fn regulation(goals: ScorePair) -> Self {
        Self {
            goals,
            penalties: None,
        }
    }

    pub fn with_penalties(goals: ScorePair, penalties: ScorePair) -> Self {
        Self {
            goals,
            penalties: Some(penalties),
        }
    }
}

impl fmt::Display for MatchScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.penalties {
            Some(pen) => write!(f, "{} ({} pen.)", self.goals, pen),
            None => write!(f, "{}", self.goals),
        }
    }
}

impl FromStr for MatchScore {
    type Err = ScoreParseError;

    /// Accepts `"2-1"` and `"1-1 (4-2 pen.)"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let Some((goals, rest)) = trimmed.split_once('(') else {
            return Ok(Self::regulation(trimmed.parse()?));
        };
        let pen = rest
            .strip_suffix(')')
            .and_then(|inner| inner.trim().strip_suffix("pen."))
            .ok_or_else(|| ScoreParseError(s.to_string()))?;
        Ok(Self::with_penalties(goals.parse()?, pen.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shootout_score_displays_with_pen_suffix() {
        let score = MatchScore::with_penalties(ScorePair::new(1, 1), ScorePair::new(4, 2));
        assert_eq!(score.to_string(), "1-1 (4-2 pen.)");
        assert_eq!(MatchScore::regulation(ScorePair::new(3, 0)).to_string(), "3-0");
    }

    #[test]
    fn score_descriptor_parses_back() {
        for raw in ["1-1 (4-2 pen.)", "2-0", "0-0 (3-0 pen.)"] {
            let parsed: MatchScore = raw.parse().expect("descriptor should parse");
            assert_eq!(parsed.to_string(), raw);
        }
    }

    #[test]
    fn total_saturates() {
        assert_eq!(ScorePair::new(2, 1).total(), 3);
        assert_eq!(ScorePair::new(u32::MAX, 1).total(), u32::MAX);
    }

    #[test]
    fn malformed_scores_are_rejected() {
        assert!("x-1".parse::<ScorePair>().is_err());
        assert!("21".parse::<ScorePair>().is_err());
        assert!("1-1 (4-2)".parse::<MatchScore>().is_err());
        assert!("1-1 (4-2 pen.".parse::<MatchScore>().is_err());
    }
}
