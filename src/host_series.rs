use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;

use crate::edition::{EditionTable, aggregate_edition};
use crate::match_csv::read_edition_rows;

static EDITION_FILE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d{4})--(.+)\.csv$").expect("valid edition filename regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditionFile {
    pub year: i32,
    pub host: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Edition {
    pub year: i32,
    pub host: String,
    pub table: EditionTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricPoint {
    pub year: i32,
    pub stage_reached: u8,
    pub goals_scored: i64,
    pub ranking: u32,
    pub win_percentage: u32,
    pub clean_sheets: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSeries {
    pub host_year: i32,
    pub metrics: Vec<MetricPoint>,
}

pub type HostMap = BTreeMap<String, HostSeries>;

/// `2014--brazil.csv` -> `(2014, "Brazil")`.
pub fn parse_edition_filename(name: &str) -> Option<(i32, String)> {
    let caps = EDITION_FILE_RE.captures(name)?;
    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let host = host_display_name(caps.get(2)?.as_str());
    Some((year, host))
}

/// Hyphens become spaces; every alphabetic run is capitalised and the rest lowered.
pub fn host_display_name(slug: &str) -> String {
    let mut out = String::with_capacity(slug.len());
    let mut prev_alpha = false;
    for ch in slug.chars() {
        let ch = if ch == '-' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

pub fn discover_editions(dir: &Path) -> Result<Vec<EditionFile>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("read editions directory {}", dir.display()))?;

    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("list {}", dir.display()))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        match parse_edition_filename(name) {
            Some((year, host)) => out.push(EditionFile {
                year,
                host,
                path: entry.path(),
            }),
            None => log::debug!("ignoring {name}: not a <year>--<host>.csv file"),
        }
    }
    out.sort_by(|a, b| a.year.cmp(&b.year).then_with(|| a.host.cmp(&b.host)));
    Ok(out)
}

/// Aggregate every edition independently. Output order matches `files`.
pub fn load_editions(files: &[EditionFile]) -> Result<Vec<Edition>> {
    files
        .par_iter()
        .map(|file| -> Result<Edition> {
            let rows = read_edition_rows(&file.path)?;
            if rows.is_empty() {
                log::warn!("{}: no result rows", file.path.display());
            }
            let table = aggregate_edition(&rows);
            if table.rows_skipped > 0 {
                log::warn!(
                    "{}: skipped {} rows with malformed scores",
                    file.path.display(),
                    table.rows_skipped
                );
            }
            Ok(Edition {
                year: file.year,
                host: file.host.clone(),
                table,
            })
        })
        .collect()
}

/// Track every host team across all editions it played in.
pub fn build_host_series(editions: &[Edition]) -> HostMap {
    let mut host_years: BTreeMap<String, i32> = BTreeMap::new();
    for edition in editions {
        let year = host_years.entry(edition.host.clone()).or_insert(edition.year);
        *year = (*year).max(edition.year);
    }

    let mut by_year: Vec<&Edition> = editions.iter().collect();
    by_year.sort_by_key(|e| e.year);

    host_years
        .into_iter()
        .map(|(host, host_year)| {
            let metrics = by_year
                .iter()
                .filter_map(|edition| {
                    let m = edition.table.get(&host)?;
                    Some(MetricPoint {
                        year: edition.year,
                        stage_reached: m.highest_stage,
                        goals_scored: m.goals_scored,
                        ranking: m.rank,
                        win_percentage: m.win_percentage(),
                        clean_sheets: m.clean_sheets,
                    })
                })
                .collect();
            (host, HostSeries { host_year, metrics })
        })
        .collect()
}

pub fn produce_host_series(dir: &Path) -> Result<HostMap> {
    let files = discover_editions(dir)?;
    log::info!("found {} edition files in {}", files.len(), dir.display());
    let editions = load_editions(&files)?;
    Ok(build_host_series(&editions))
}
