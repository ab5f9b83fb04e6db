//! Local download fallback
//!
//! Writes `<user>_<YYYYMMDDTHHMMSS>.csv` with one row per trial record and
//! `<user>_<YYYYMMDDTHHMMSS>.jsonl` holding the session record on one line.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::core::error::Result;
use crate::results::record::TrialRecord;
use crate::results::summary::SessionResult;

const CSV_COLUMNS: [&str; 18] = [
    "trial_index",
    "trial_type",
    "phase",
    "stimulus_id",
    "origin_id",
    "condition",
    "provenance",
    "sentence",
    "sentence_number",
    "total_sentences",
    "word_count",
    "total_reading_time",
    "question_type",
    "question",
    "response",
    "correct",
    "rt",
    "word_timings",
];

/// Files written by one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub csv: PathBuf,
    pub jsonl: PathBuf,
}

/// `2024-05-01T09:30:00Z` -> `20240501T093000`
pub fn file_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%S").to_string()
}

/// Keep user ids usable as file name prefixes
fn file_stem(user_id: &str, at: DateTime<Utc>) -> String {
    let user: String = user_id
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}_{}", user, file_timestamp(at))
}

fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_row(index: usize, record: &TrialRecord) -> Result<Vec<String>> {
    let mut row = vec![String::new(); CSV_COLUMNS.len()];
    row[0] = index.to_string();
    match record {
        TrialRecord::Reading(r) => {
            row[1] = "reading".into();
            row[2] = r.phase.as_str().into();
            row[3] = r.stimulus_id.to_string();
            row[5] = r.condition.clone();
            row[6] = r.provenance.as_str().into();
            row[7] = r.sentence.clone();
            row[8] = r.sentence_number.to_string();
            row[9] = r.total_sentences.to_string();
            row[10] = r.word_count.to_string();
            row[11] = r.total_reading_time.to_string();
            row[17] = serde_json::to_string(&r.word_timings)?;
        }
        TrialRecord::Comprehension(c) => {
            row[1] = "comprehension".into();
            row[2] = c.phase.as_str().into();
            row[3] = c.stimulus_id.clone();
            row[4] = c.origin_id.to_string();
            row[12] = c.question_type.as_str().into();
            row[13] = c.question.clone();
            row[14] = c.response.to_string();
            row[15] = c.correct.to_string();
            row[16] = c.rt.to_string();
        }
    }
    Ok(row)
}

/// Render trial records as CSV text
pub fn records_to_csv(records: &[TrialRecord]) -> Result<String> {
    let mut out = CSV_COLUMNS.join(",");
    out.push('\n');
    for (index, record) in records.iter().enumerate() {
        let row = csv_row(index, record)?;
        let line: Vec<String> = row.iter().map(|f| escape_field(f)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    Ok(out)
}

/// Write both fallback files into `dir`, creating it if needed
pub fn write_download_files(dir: &Path, result: &SessionResult, at: DateTime<Utc>) -> Result<ExportPaths> {
    fs::create_dir_all(dir)?;
    let stem = file_stem(&result.user_id, at);

    let csv = dir.join(format!("{}.csv", stem));
    fs::write(&csv, records_to_csv(&result.full_data)?)?;

    let jsonl = dir.join(format!("{}.jsonl", stem));
    let mut line = result.to_json_line()?;
    line.push('\n');
    fs::write(&jsonl, line)?;

    tracing::info!("Wrote {} and {}", csv.display(), jsonl.display());
    Ok(ExportPaths { csv, jsonl })
}

/// Read back every session record of a `.jsonl` file
pub fn read_jsonl(path: &Path) -> Result<Vec<SessionResult>> {
    let content = fs::read_to_string(path)?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(SessionResult::from_json_line)
        .collect()
}
