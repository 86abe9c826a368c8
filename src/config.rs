use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use crate::schedule_parse::Grammar;

pub const DEFAULT_SCHEDULE_INPUT: &str = "cup.txt";
pub const DEFAULT_MATCH_CSV: &str = "world_cup_matches.csv";
pub const DEFAULT_EDITIONS_DIR: &str = "viz3-finaldatas";

/// Year tried first when a schedule has to be dated without `--year`.
pub const INFER_CANDIDATE_YEAR: i32 = 2018;
pub const INFER_FALLBACK_YEAR: i32 = 2022;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub grammar: Grammar,
    pub year: Option<i32>,
    pub calendar: Option<PathBuf>,
}

impl ExtractConfig {
    pub fn from_env(args: &[String]) -> Result<Self> {
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    /// Flags win over environment variables, which win over built-in defaults.
    pub fn resolve(args: &[String], env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = |flag: &str, key: &str| flag_value(args, flag).or_else(|| non_empty(env(key)));

        let grammar = match lookup("--grammar", "WC_SCHEDULE_GRAMMAR") {
            Some(raw) => raw.parse::<Grammar>()?,
            None => Grammar::GroupStage,
        };
        let year = lookup("--year", "WC_SCHEDULE_YEAR")
            .map(|raw| {
                raw.trim()
                    .parse::<i32>()
                    .with_context(|| format!("invalid year {raw:?}"))
            })
            .transpose()?;

        Ok(Self {
            input: lookup("--input", "WC_SCHEDULE_INPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SCHEDULE_INPUT)),
            output: lookup("--output", "WC_SCHEDULE_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MATCH_CSV)),
            grammar,
            year,
            calendar: lookup("--calendar", "WC_SCHEDULE_CALENDAR").map(PathBuf::from),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostMetricsConfig {
    pub editions_dir: PathBuf,
    pub json_out: Option<PathBuf>,
    pub xlsx_out: Option<PathBuf>,
}

impl HostMetricsConfig {
    pub fn from_env(args: &[String]) -> Result<Self> {
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    pub fn resolve(args: &[String], env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = |flag: &str, key: &str| flag_value(args, flag).or_else(|| non_empty(env(key)));
        let editions_dir = lookup("--dir", "WC_EDITIONS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EDITIONS_DIR));
        if editions_dir.as_os_str().is_empty() {
            return Err(anyhow!("editions directory must not be empty"));
        }
        Ok(Self {
            editions_dir,
            json_out: lookup("--json", "WC_HOST_JSON").map(PathBuf::from),
            xlsx_out: lookup("--xlsx", "WC_HOST_XLSX").map(PathBuf::from),
        })
    }
}

/// `.env.local` first so it overrides `.env`; both are optional.
pub fn load_env_files() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();
}

/// Accepts `--flag=value` and `--flag value`.
pub fn flag_value(args: &[String], flag: &str) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(flag).and_then(|rest| rest.strip_prefix('=')) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
            && !next.starts_with("--")
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
