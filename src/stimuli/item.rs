//! Classified stimulus items
//!
//! Every stimulus row becomes exactly one [`Item`]. Downstream code matches on
//! the variant instead of probing which fields happen to be present.

use serde::{Deserialize, Serialize};

use crate::core::types::ItemId;

/// A two-alternative comprehension question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub options: [String; 2],
    /// 0-based index into `options`
    pub correct_index: usize,
}

impl Question {
    pub fn new(text: impl Into<String>, option_a: impl Into<String>, option_b: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: [option_a.into(), option_b.into()],
            correct_index: 0,
        }
    }

    pub fn with_correct_index(mut self, index: usize) -> Self {
        self.correct_index = index;
        self
    }

    pub fn is_correct(&self, response: usize) -> bool {
        response == self.correct_index
    }
}

/// A question deferred until `delay` sentences after its origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayedQuestion {
    pub origin_id: ItemId,
    pub question: Question,
    /// Always >= 1; a delay of 0 is an immediate question
    pub delay: usize,
    /// `source_index_of_origin + delay`
    pub target_position: usize,
}

impl DelayedQuestion {
    pub fn new(origin_id: ItemId, question: Question, delay: usize, source_index: usize) -> Self {
        Self {
            origin_id,
            question,
            delay,
            target_position: source_index + delay,
        }
    }

    /// Recompute the target for a (possibly different) source position
    pub fn retarget(&mut self, source_index: usize) {
        self.target_position = source_index + self.delay;
    }
}

/// One classified stimulus row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Item {
    Sentence {
        id: ItemId,
        text: String,
        condition: String,
    },
    SentenceWithImmediateQuestion {
        id: ItemId,
        text: String,
        condition: String,
        question: Question,
    },
    SentenceWithDelayedQuestion {
        id: ItemId,
        text: String,
        condition: String,
        pending_question: DelayedQuestion,
    },
}

impl Item {
    pub fn id(&self) -> &ItemId {
        match self {
            Item::Sentence { id, .. }
            | Item::SentenceWithImmediateQuestion { id, .. }
            | Item::SentenceWithDelayedQuestion { id, .. } => id,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Item::Sentence { text, .. }
            | Item::SentenceWithImmediateQuestion { text, .. }
            | Item::SentenceWithDelayedQuestion { text, .. } => text,
        }
    }

    pub fn condition(&self) -> &str {
        match self {
            Item::Sentence { condition, .. }
            | Item::SentenceWithImmediateQuestion { condition, .. }
            | Item::SentenceWithDelayedQuestion { condition, .. } => condition,
        }
    }

    /// The question shown right after the sentence, if any
    pub fn immediate_question(&self) -> Option<&Question> {
        match self {
            Item::SentenceWithImmediateQuestion { question, .. } => Some(question),
            _ => None,
        }
    }

    pub fn delayed_question(&self) -> Option<&DelayedQuestion> {
        match self {
            Item::SentenceWithDelayedQuestion { pending_question, .. } => Some(pending_question),
            _ => None,
        }
    }

    pub fn has_question(&self) -> bool {
        !matches!(self, Item::Sentence { .. })
    }

    /// Words presented one at a time
    pub fn words(&self) -> Vec<String> {
        split_sentence(self.text())
    }
}

/// Split a sentence on runs of whitespace
pub fn split_sentence(sentence: &str) -> Vec<String> {
    sentence.split_whitespace().map(str::to_string).collect()
}
