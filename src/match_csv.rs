use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use csv::{QuoteStyle, ReaderBuilder, Trim, WriterBuilder};
use serde::Deserialize;

use crate::export::write_atomic;
use crate::schedule_parse::MatchRecord;

pub const MATCH_CSV_HEADER: &str = "Date,Time,Team1,Team2,Score,Type";

/// One row of a per-edition results file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EditionRow {
    #[serde(rename = "Team1")]
    pub team1: String,
    #[serde(rename = "Team2")]
    pub team2: String,
    #[serde(rename = "Team1 Score", alias = "Goals_Team1", alias = "Team1 Goals")]
    pub team1_score: String,
    #[serde(rename = "Team2 Score", alias = "Goals_Team2", alias = "Team2 Goals")]
    pub team2_score: String,
    #[serde(rename = "Stage", alias = "Type")]
    pub stage: String,
}

impl EditionRow {
    pub fn new(team1: &str, team2: &str, score1: &str, score2: &str, stage: &str) -> Self {
        Self {
            team1: team1.to_string(),
            team2: team2.to_string(),
            team1_score: score1.to_string(),
            team2_score: score2.to_string(),
            stage: stage.to_string(),
        }
    }
}

/// Render match records as CSV: plain header line, every data field double-quoted.
pub fn render_matches_csv(records: &[MatchRecord]) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(64 * (records.len() + 1));
    buf.extend_from_slice(MATCH_CSV_HEADER.as_bytes());
    buf.push(b'\n');

    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(buf);
    for record in records {
        let score = record.score.to_string();
        wtr.write_record([
            record.date_iso().as_str(),
            record.time_hhmm().as_str(),
            record.team1.as_str(),
            record.team2.as_str(),
            score.as_str(),
            record.stage.label(),
        ])
        .with_context(|| format!("write csv row {} vs {}", record.team1, record.team2))?;
    }
    wtr.into_inner()
        .map_err(|err| anyhow!("flush csv buffer: {}", err.error()))
}

pub fn write_matches_csv(path: &Path, records: &[MatchRecord]) -> Result<()> {
    let bytes = render_matches_csv(records)?;
    write_atomic(path, &bytes)
}

pub fn read_edition_rows(path: &Path) -> Result<Vec<EditionRow>> {
    let file =
        File::open(path).with_context(|| format!("open edition csv {}", path.display()))?;
    read_edition_rows_from(file).with_context(|| format!("read edition csv {}", path.display()))
}

/// Rows that cannot be decoded (missing columns, ragged lines) are skipped with a
/// warning; score fields are kept as text and validated by the aggregator. A file
/// without a header row reads as an edition with no rows.
pub fn read_edition_rows_from<R: Read>(reader: R) -> Result<Vec<EditionRow>> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers().context("read csv header")?.clone();
    if headers.is_empty() {
        log::warn!("edition csv has no header row; treating it as empty");
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    for (idx, result) in rdr.deserialize::<EditionRow>().enumerate() {
        match result {
            Ok(row) => out.push(row),
            Err(err) => log::warn!("skipping unreadable edition row {}: {err}", idx + 2),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;
    use crate::score::{MatchScore, ScorePair};
    use crate::stage::Stage;

    fn record(team1: &str, team2: &str, score: MatchScore, stage: Stage) -> MatchRecord {
        MatchRecord {
            date: NaiveDate::from_ymd_opt(2022, 12, 9).unwrap(),
            kickoff: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            team1: team1.to_string(),
            team2: team2.to_string(),
            score,
            stage,
        }
    }

    #[test]
    fn match_csv_quotes_every_field() {
        let rows = vec![
            record(
                "Croatia",
                "Brazil",
                MatchScore::with_penalties(ScorePair::new(1, 1), ScorePair::new(4, 2)),
                Stage::QuarterFinals,
            ),
            record(
                "Saudi Arabia",
                "Argentina",
                MatchScore::regulation(ScorePair::new(2, 1)),
                Stage::GroupStage,
            ),
        ];
        let out = String::from_utf8(render_matches_csv(&rows).unwrap()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Date,Time,Team1,Team2,Score,Type");
        assert_eq!(
            lines[1],
            r#""2022-12-09","18:00","Croatia","Brazil","1-1 (4-2 pen.)","Quarter-finals""#
        );
        assert_eq!(
            lines[2],
            r#""2022-12-09","18:00","Saudi Arabia","Argentina","2-1","Group Stage""#
        );
    }

    #[test]
    fn edition_rows_accept_header_aliases() {
        let raw = "Team1,Team2,Goals_Team1,Goals_Team2,Stage\nQatar , Ecuador,0,2,Group\n";
        let rows = read_edition_rows_from(raw.as_bytes()).unwrap();
        assert_eq!(rows, vec![EditionRow::new("Qatar", "Ecuador", "0", "2", "Group")]);
    }

    #[test]
    fn headerless_input_reads_as_no_rows() {
        assert!(read_edition_rows_from("".as_bytes()).unwrap().is_empty());
        assert!(read_edition_rows_from("\n\n".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn ragged_edition_rows_are_skipped() {
        let raw = "Team1,Team2,Team1 Score,Team2 Score,Stage\nA,B,1\nA,C,2,0,Final\n";
        let rows = read_edition_rows_from(raw.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].team2, "C");
    }
}
