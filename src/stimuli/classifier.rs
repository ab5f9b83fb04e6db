//! Turn raw stimulus rows into typed items
//!
//! Column layout:
//! `item_id, sentence, with_question, question, answer1, answer2, question_delay`
//! plus the optional `correct_answer` and `condition` columns.

use crate::core::types::{parse_leading_int, ItemId, Provenance};
use crate::stimuli::item::{DelayedQuestion, Item, Question};
use crate::stimuli::parser::RawRecord;

/// Classifies rows of one input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StimulusClassifier {
    provenance: Provenance,
}

impl StimulusClassifier {
    pub fn new(provenance: Provenance) -> Self {
        Self { provenance }
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// Classify one row
    ///
    /// `source_index` is the row's 0-based position among the file's
    /// sentence records; delayed questions target `source_index + delay`.
    pub fn classify(&self, record: &RawRecord, source_index: usize) -> Item {
        let id = match record.non_empty("item_id") {
            Some(raw) => ItemId::parse(raw),
            None => {
                tracing::debug!(source_index, "Row has no item_id, using its position");
                ItemId::Number(source_index as i64 + 1)
            }
        };
        let text = record.get("sentence").unwrap_or_default().to_string();
        let condition = record
            .non_empty("condition")
            .unwrap_or(self.provenance.default_condition())
            .to_string();

        let question = match record.non_empty("question") {
            Some(text) if is_true(record.get("with_question")) => text,
            _ => return Item::Sentence { id, text, condition },
        };

        let question = Question::new(
            question,
            record.get("answer1").unwrap_or_default(),
            record.get("answer2").unwrap_or_default(),
        )
        .with_correct_index(correct_index(record, &id));

        let delay = question_delay(record, &id);
        if delay == 0 {
            Item::SentenceWithImmediateQuestion {
                id,
                text,
                condition,
                question,
            }
        } else {
            let pending_question = DelayedQuestion::new(id.clone(), question, delay, source_index);
            Item::SentenceWithDelayedQuestion {
                id,
                text,
                condition,
                pending_question,
            }
        }
    }

    /// Classify every row of a file, in order
    pub fn classify_all(&self, records: &[RawRecord]) -> Vec<Item> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| self.classify(record, index))
            .collect()
    }
}

fn is_true(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// `question_delay`, defaulting to 0 when absent, unparsable or negative
fn question_delay(record: &RawRecord, id: &ItemId) -> usize {
    match record.non_empty("question_delay").map(parse_leading_int) {
        None => 0,
        Some(Some(delay)) if delay >= 0 => delay as usize,
        Some(other) => {
            tracing::debug!(item = %id, value = ?other, "Unusable question_delay, treating as 0");
            0
        }
    }
}

/// `correct_answer` as a 0-based option index
///
/// Source files rarely carry this column; without it option A is marked
/// correct.
fn correct_index(record: &RawRecord, id: &ItemId) -> usize {
    match record.non_empty("correct_answer").map(parse_leading_int) {
        None => 0,
        Some(Some(index @ 0..=1)) => index as usize,
        Some(other) => {
            tracing::debug!(item = %id, value = ?other, "Unusable correct_answer, defaulting to option A");
            0
        }
    }
}
