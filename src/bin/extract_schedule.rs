use std::fs;

use anyhow::{Context, Result};

use wc_calendar::calendar::group_by_day;
use wc_calendar::config::{self, ExtractConfig, INFER_CANDIDATE_YEAR, INFER_FALLBACK_YEAR};
use wc_calendar::export::write_json;
use wc_calendar::match_csv::write_matches_csv;
use wc_calendar::schedule_parse::{SkipReason, infer_year, parse_schedule};

fn main() -> Result<()> {
    config::load_env_files();
    config::init_logging();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let cfg = ExtractConfig::from_env(&args)?;

    let text = fs::read_to_string(&cfg.input)
        .with_context(|| format!("could not read schedule {}", cfg.input.display()))?;

    let year = match cfg.year {
        Some(year) => year,
        None => {
            let year = infer_year(&text, INFER_CANDIDATE_YEAR, INFER_FALLBACK_YEAR);
            log::warn!("no --year given; dating matches as {year} from the schedule text");
            year
        }
    };

    let parsed = parse_schedule(&text, cfg.grammar, year);
    write_matches_csv(&cfg.output, &parsed.records)?;

    if let Some(path) = cfg.calendar.as_deref() {
        write_json(path, &group_by_day(&parsed.records))?;
        println!("Calendar: {}", path.display());
    }

    let invalid_dates = parsed
        .skipped
        .iter()
        .filter(|s| matches!(s.reason, SkipReason::InvalidDate { .. }))
        .count();

    println!(
        "Successfully created {} with {} matches",
        cfg.output.display(),
        parsed.records.len()
    );
    println!("Grammar: {} ({year})", cfg.grammar);
    println!(
        "Skipped lines: {} ({} invalid dates)",
        parsed.skipped.len(),
        invalid_dates
    );
    Ok(())
}
