use std::fmt;

/// Bracket phase of a tournament, ordered by elimination depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    GroupStage,
    RoundOf16,
    QuarterFinals,
    SemiFinals,
    ThirdPlace,
    Final,
    Winner,
    Unknown,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::GroupStage => "Group Stage",
            Stage::RoundOf16 => "Round of 16",
            Stage::QuarterFinals => "Quarter-finals",
            Stage::SemiFinals => "Semi-finals",
            Stage::ThirdPlace => "Match for third place",
            Stage::Final => "Final",
            Stage::Winner => "Winner",
            Stage::Unknown => "Unknown",
        }
    }

    /// Depth value used for "furthest stage reached". Unknown is 0 so it never
    /// raises a running maximum.
    pub fn value(self) -> u8 {
        match self {
            Stage::GroupStage => 1,
            Stage::RoundOf16 => 2,
            Stage::QuarterFinals => 3,
            Stage::SemiFinals => 4,
            Stage::ThirdPlace => 5,
            Stage::Final => 6,
            Stage::Winner => 7,
            Stage::Unknown => 0,
        }
    }

    /// Parse a stage label as found in edition CSVs. Both the short `Group` form and
    /// the extractor's `Group Stage` form are accepted.
    pub fn from_label(raw: &str) -> Stage {
        match raw.trim() {
            "Group" | "Group Stage" => Stage::GroupStage,
            "Round of 16" => Stage::RoundOf16,
            "Quarter-finals" => Stage::QuarterFinals,
            "Semi-finals" => Stage::SemiFinals,
            "Match for third place" => Stage::ThirdPlace,
            "Final" => Stage::Final,
            "Winner" => Stage::Winner,
            _ => Stage::Unknown,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Knockout stage from the 64-match bracket numbering.
pub fn determine_stage(match_number: u32) -> Stage {
    match match_number {
        49..=56 => Stage::RoundOf16,
        57..=60 => Stage::QuarterFinals,
        61..=62 => Stage::SemiFinals,
        63 => Stage::ThirdPlace,
        64 => Stage::Final,
        _ => Stage::Unknown,
    }
}

pub fn stage_value(label: &str) -> u8 {
    Stage::from_label(label).value()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn determine_stage_range_edges() {
        assert_eq!(determine_stage(48), Stage::Unknown);
        assert_eq!(determine_stage(49), Stage::RoundOf16);
        assert_eq!(determine_stage(56), Stage::RoundOf16);
        assert_eq!(determine_stage(57), Stage::QuarterFinals);
        assert_eq!(determine_stage(60), Stage::QuarterFinals);
        assert_eq!(determine_stage(61), Stage::SemiFinals);
        assert_eq!(determine_stage(62), Stage::SemiFinals);
        assert_eq!(determine_stage(63), Stage::ThirdPlace);
        assert_eq!(determine_stage(64), Stage::Final);
        assert_eq!(determine_stage(65), Stage::Unknown);
        assert_eq!(determine_stage(1), Stage::Unknown);
    }

    #[test]
    fn stage_values_are_ordered() {
        let ordered = [
            Stage::GroupStage,
            Stage::RoundOf16,
            Stage::QuarterFinals,
            Stage::SemiFinals,
            Stage::ThirdPlace,
            Stage::Final,
            Stage::Winner,
        ];
        for pair in ordered.windows(2) {
            assert!(pair[0].value() < pair[1].value());
        }
        assert_eq!(Stage::Unknown.value(), 0);
    }

    #[test]
    fn labels_parse_back() {
        assert_eq!(stage_value("Group"), 1);
        assert_eq!(stage_value(" Group Stage "), 1);
        assert_eq!(stage_value("Final"), 6);
        assert_eq!(stage_value("Play-off"), 0);
        assert_eq!(Stage::from_label(Stage::ThirdPlace.label()), Stage::ThirdPlace);
    }
}
