//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Identifier of a stimulus row
///
/// Numeric when the `item_id` field starts with an integer, textual otherwise
/// (practice and filler files commonly use labels like `practice1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Label(String),
}

impl ItemId {
    /// Parse a raw `item_id` field. A leading integer wins, so `"12abc"`
    /// is item 12.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match parse_leading_int(trimmed) {
            Some(n) => ItemId::Number(n),
            None => ItemId::Label(trimmed.to_string()),
        }
    }
}

/// Parse an optionally signed run of leading digits, ignoring what follows
/// (`"2"`, `" 3 "`, `"4 sentences"` all parse; `"x2"` does not)
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

impl Ord for ItemId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ItemId::Number(a), ItemId::Number(b)) => a.cmp(b),
            (ItemId::Number(_), ItemId::Label(_)) => Ordering::Less,
            (ItemId::Label(_), ItemId::Number(_)) => Ordering::Greater,
            (ItemId::Label(a), ItemId::Label(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for ItemId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{}", n),
            ItemId::Label(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        ItemId::Number(n)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId::Label(s.to_string())
    }
}

/// Which input file an item came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Stimulus,
    Filler,
    Practice,
}

impl Provenance {
    /// Condition label used when a row carries no `condition` column
    pub fn default_condition(self) -> &'static str {
        match self {
            Provenance::Stimulus => "main",
            Provenance::Filler => "filler",
            Provenance::Practice => "practice",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Provenance::Stimulus => "stimulus",
            Provenance::Filler => "filler",
            Provenance::Practice => "practice",
        }
    }
}

/// Experiment phase a trial belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Practice,
    Main,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Practice => "practice",
            Phase::Main => "main",
        }
    }
}

/// Whether a question follows its sentence directly or was deferred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Immediate,
    Delayed,
}

impl QuestionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::Immediate => "immediate",
            QuestionKind::Delayed => "delayed",
        }
    }
}

/// Millisecond duration as reported in result records
pub type Millis = f64;
