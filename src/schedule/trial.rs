//! Presentation-ready trial units

use serde::{Deserialize, Serialize};

use crate::core::types::{ItemId, Phase, Provenance, QuestionKind};
use crate::stimuli::item::{DelayedQuestion, Item, Question};

/// Sentence shown one word at a time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingTrial {
    pub id: ItemId,
    pub sentence: String,
    pub words: Vec<String>,
    /// 1-based position within the block
    pub sentence_number: usize,
    pub total_sentences: usize,
    pub condition: String,
    pub provenance: Provenance,
    pub phase: Phase,
}

impl ReadingTrial {
    pub fn from_item(
        item: &Item,
        provenance: Provenance,
        phase: Phase,
        sentence_number: usize,
        total_sentences: usize,
    ) -> Self {
        Self {
            id: item.id().clone(),
            sentence: item.text().to_string(),
            words: item.words(),
            sentence_number,
            total_sentences,
            condition: item.condition().to_string(),
            provenance,
            phase,
        }
    }
}

/// Two-alternative comprehension question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionTrial {
    pub id: String,
    pub origin_id: ItemId,
    pub question: String,
    pub options: [String; 2],
    pub correct_index: usize,
    pub kind: QuestionKind,
    pub phase: Phase,
}

impl QuestionTrial {
    pub fn immediate(origin_id: &ItemId, question: &Question, phase: Phase) -> Self {
        Self {
            id: origin_id.to_string(),
            origin_id: origin_id.clone(),
            question: question.text.clone(),
            options: question.options.clone(),
            correct_index: question.correct_index,
            kind: QuestionKind::Immediate,
            phase,
        }
    }

    pub fn delayed(delayed: &DelayedQuestion, phase: Phase) -> Self {
        Self {
            id: format!("delayed_q_{}", delayed.origin_id),
            origin_id: delayed.origin_id.clone(),
            question: delayed.question.text.clone(),
            options: delayed.question.options.clone(),
            correct_index: delayed.question.correct_index,
            kind: QuestionKind::Delayed,
            phase,
        }
    }

    pub fn is_correct(&self, response: usize) -> bool {
        response == self.correct_index
    }
}

/// One step handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrialUnit {
    Fixation { duration_ms: u64 },
    ReadyPrompt { message: String },
    ReadingTrial(ReadingTrial),
    QuestionTrial(QuestionTrial),
}

impl TrialUnit {
    pub fn as_reading(&self) -> Option<&ReadingTrial> {
        match self {
            TrialUnit::ReadingTrial(trial) => Some(trial),
            _ => None,
        }
    }

    pub fn as_question(&self) -> Option<&QuestionTrial> {
        match self {
            TrialUnit::QuestionTrial(trial) => Some(trial),
            _ => None,
        }
    }
}
