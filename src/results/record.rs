//! Per-trial result records

use serde::{Deserialize, Serialize};

use crate::core::types::{ItemId, Millis, Phase, Provenance, QuestionKind};
use crate::schedule::trial::{QuestionTrial, ReadingTrial};

/// Latency of a single word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub word: String,
    /// 0-based index into the sentence
    pub word_position: usize,
    /// Time since the previous advance (or the sentence onset for the first word)
    pub reading_time: Millis,
    /// Time of the advance, relative to sentence onset
    pub timestamp: Millis,
}

impl WordTiming {
    /// Build timings from advance timestamps measured from sentence onset
    pub fn from_advances(words: &[String], advances: &[Millis]) -> Vec<WordTiming> {
        let mut previous = 0.0;
        words
            .iter()
            .zip(advances)
            .enumerate()
            .map(|(word_position, (word, &timestamp))| {
                let timing = WordTiming {
                    word: word.clone(),
                    word_position,
                    reading_time: timestamp - previous,
                    timestamp,
                };
                previous = timestamp;
                timing
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingRecord {
    pub stimulus_id: ItemId,
    pub sentence: String,
    pub condition: String,
    pub provenance: Provenance,
    pub phase: Phase,
    pub sentence_number: usize,
    pub total_sentences: usize,
    pub word_timings: Vec<WordTiming>,
    pub total_reading_time: Millis,
    pub word_count: usize,
}

impl ReadingRecord {
    pub fn new(trial: &ReadingTrial, word_timings: Vec<WordTiming>, total_reading_time: Millis) -> Self {
        Self {
            stimulus_id: trial.id.clone(),
            sentence: trial.sentence.clone(),
            condition: trial.condition.clone(),
            provenance: trial.provenance,
            phase: trial.phase,
            sentence_number: trial.sentence_number,
            total_sentences: trial.total_sentences,
            word_timings,
            total_reading_time,
            word_count: trial.words.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensionRecord {
    /// Question id (`delayed_q_<origin>` for delayed questions)
    pub stimulus_id: String,
    pub origin_id: ItemId,
    pub phase: Phase,
    pub question_type: QuestionKind,
    pub question: String,
    /// 0-based chosen option
    pub response: usize,
    pub correct: bool,
    pub rt: Millis,
    pub correct_answer: usize,
}

impl ComprehensionRecord {
    pub fn new(trial: &QuestionTrial, response: usize, rt: Millis) -> Self {
        Self {
            stimulus_id: trial.id.clone(),
            origin_id: trial.origin_id.clone(),
            phase: trial.phase,
            question_type: trial.kind,
            question: trial.question.clone(),
            response,
            correct: trial.is_correct(response),
            rt,
            correct_answer: trial.correct_index,
        }
    }
}

/// One entry of a session's `full_data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "trial_type", rename_all = "snake_case")]
pub enum TrialRecord {
    Reading(ReadingRecord),
    Comprehension(ComprehensionRecord),
}

impl TrialRecord {
    pub fn phase(&self) -> Phase {
        match self {
            TrialRecord::Reading(r) => r.phase,
            TrialRecord::Comprehension(c) => c.phase,
        }
    }

    pub fn as_reading(&self) -> Option<&ReadingRecord> {
        match self {
            TrialRecord::Reading(r) => Some(r),
            TrialRecord::Comprehension(_) => None,
        }
    }

    pub fn as_comprehension(&self) -> Option<&ComprehensionRecord> {
        match self {
            TrialRecord::Comprehension(c) => Some(c),
            TrialRecord::Reading(_) => None,
        }
    }
}
