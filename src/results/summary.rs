//! Session-level result record and summary statistics

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SprError};
use crate::core::session::{iso_timestamp, SessionContext, SessionSeed};
use crate::core::types::Phase;
use crate::results::record::TrialRecord;

/// Summary statistics over the main block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub sentences_completed: usize,
    pub average_reading_time_ms: i64,
    pub comprehension_accuracy_percent: f64,
    pub total_comprehension_questions: usize,
    pub correct_comprehension_answers: usize,
}

impl SessionStats {
    /// Practice records are ignored
    pub fn compute(records: &[TrialRecord]) -> Self {
        let main = records.iter().filter(|r| r.phase() == Phase::Main);

        let mut reading_total = 0.0;
        let mut sentences_completed = 0;
        let mut total_questions = 0;
        let mut correct_answers = 0;
        for record in main {
            match record {
                TrialRecord::Reading(r) => {
                    sentences_completed += 1;
                    reading_total += r.total_reading_time;
                }
                TrialRecord::Comprehension(c) => {
                    total_questions += 1;
                    if c.correct {
                        correct_answers += 1;
                    }
                }
            }
        }

        let average_reading_time_ms = if sentences_completed > 0 {
            (reading_total / sentences_completed as f64).round() as i64
        } else {
            0
        };
        let comprehension_accuracy_percent = if total_questions > 0 {
            let percent = correct_answers as f64 / total_questions as f64 * 100.0;
            (percent * 100.0).round() / 100.0
        } else {
            0.0
        };

        Self {
            sentences_completed,
            average_reading_time_ms,
            comprehension_accuracy_percent,
            total_comprehension_questions: total_questions,
            correct_comprehension_answers: correct_answers,
        }
    }
}

/// The record submitted to the save endpoint and written to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub user_id: String,
    pub stimuli_file: String,
    pub experiment_start_time: String,
    pub experiment_end_time: String,
    pub experiment_duration_ms: i64,
    pub sentences_completed: usize,
    pub average_reading_time_ms: i64,
    pub comprehension_accuracy_percent: f64,
    pub total_comprehension_questions: usize,
    pub correct_comprehension_answers: usize,
    pub seed: SessionSeed,
    pub full_data: Vec<TrialRecord>,
}

impl SessionResult {
    /// Assemble the result of a finished session
    pub fn new(session: &SessionContext, full_data: Vec<TrialRecord>) -> Result<Self> {
        let end_time = session.end_time.ok_or_else(|| {
            SprError::InvalidSession(format!(
                "session for {} has not finished",
                session.participant_id
            ))
        })?;
        let stats = SessionStats::compute(&full_data);

        Ok(Self {
            user_id: session.participant_id.clone(),
            stimuli_file: session.stimuli_file.clone(),
            experiment_start_time: iso_timestamp(session.start_time),
            experiment_end_time: iso_timestamp(end_time),
            experiment_duration_ms: session.duration_ms(),
            sentences_completed: stats.sentences_completed,
            average_reading_time_ms: stats.average_reading_time_ms,
            comprehension_accuracy_percent: stats.comprehension_accuracy_percent,
            total_comprehension_questions: stats.total_comprehension_questions,
            correct_comprehension_answers: stats.correct_comprehension_answers,
            seed: session.seed,
            full_data,
        })
    }

    /// Single-line JSON, as stored in `.jsonl` files
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json_line(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line.trim())?)
    }

    pub fn summary(&self) -> String {
        format!(
            "Participant {} ({}), seed {}\n{} sentences, average reading time {} ms\n{}/{} questions correct ({}%)",
            self.user_id,
            self.stimuli_file,
            self.seed,
            self.sentences_completed,
            self.average_reading_time_ms,
            self.correct_comprehension_answers,
            self.total_comprehension_questions,
            self.comprehension_accuracy_percent,
        )
    }
}
