use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::host_series::HostMap;

const HOST_SHEET_HEADER: [&str; 8] = [
    "Host",
    "Host Year",
    "Year",
    "Stage Reached",
    "Goals Scored",
    "Ranking",
    "Win %",
    "Clean Sheets",
];

/// Write through a sibling `.tmp` file so a failed run never leaves a truncated artifact.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output directory {}", parent.display()))?;
    }
    let tmp = tmp_path(path);
    fs::write(&tmp, bytes).with_context(|| format!("write {}", tmp.display()))?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err).with_context(|| format!("move {} into place", path.display()));
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Pretty JSON with a 4-space indent.
pub fn render_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser).context("serialize json")?;
    String::from_utf8(buf).context("json output is not utf-8")
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut raw = render_json(value)?;
    raw.push('\n');
    write_atomic(path, raw.as_bytes())
}

/// One worksheet cell; numbers stay numeric all the way into the workbook.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

pub fn host_rows(hosts: &HostMap) -> Vec<Vec<Cell>> {
    let mut rows = Vec::new();
    for (host, series) in hosts {
        for point in &series.metrics {
            rows.push(vec![
                Cell::Text(host.clone()),
                Cell::Number(f64::from(series.host_year)),
                Cell::Number(f64::from(point.year)),
                Cell::Number(f64::from(point.stage_reached)),
                Cell::Number(point.goals_scored as f64),
                Cell::Number(f64::from(point.ranking)),
                Cell::Number(f64::from(point.win_percentage)),
                Cell::Number(f64::from(point.clean_sheets)),
            ]);
        }
    }
    rows
}

/// Returns the number of data rows written.
pub fn write_host_workbook(path: &Path, hosts: &HostMap) -> Result<usize> {
    let rows = host_rows(hosts);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Hosts")?;
        write_header(sheet, &HOST_SHEET_HEADER)?;
        write_rows(sheet, &rows)?;
    }
    let bytes = workbook
        .save_to_buffer()
        .context("render host workbook")?;
    write_atomic(path, &bytes)?;
    Ok(rows.len())
}

fn write_header(worksheet: &mut Worksheet, header: &[&str]) -> Result<()> {
    for (col_idx, value) in header.iter().enumerate() {
        worksheet
            .write_string(0, col_idx as u16, *value)
            .with_context(|| format!("write header cell {col_idx}"))?;
    }
    Ok(())
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        let sheet_row = row_idx as u32 + 1;
        for (col_idx, cell) in row.iter().enumerate() {
            let col = col_idx as u16;
            let written = match cell {
                Cell::Text(text) => worksheet.write_string(sheet_row, col, text),
                Cell::Number(n) => worksheet.write_number(sheet_row, col, *n),
            };
            written.with_context(|| format!("write cell ({sheet_row},{col_idx})"))?;
        }
    }
    Ok(())
}
