//! Per-participant session context
//!
//! Holds everything that is fixed once a participant starts: who they are,
//! which stimulus list they got, when they started, and the seed that orders
//! their main block. The context is passed explicitly to the components that
//! need it.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::{Result, SprError};

/// Seeds fall in `0..SEED_MODULUS`
pub const SEED_MODULUS: i64 = 10_000;

/// Sole source of entropy for main-block ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionSeed(pub u32);

impl SessionSeed {
    /// Derive a seed from a participant id and an ISO-8601 start timestamp
    ///
    /// Rolling hash `h = h * 31 + unit` over the UTF-16 code units of the
    /// concatenation, with 32-bit signed wraparound, then `|h| mod 10000`.
    pub fn derive(participant_id: &str, start_time: &str) -> Self {
        let mut hash: i32 = 0;
        for unit in participant_id.encode_utf16().chain(start_time.encode_utf16()) {
            hash = (hash << 5).wrapping_sub(hash).wrapping_add(i32::from(unit));
        }
        // i64 so that |i32::MIN| does not overflow
        let reduced = i64::from(hash).abs() % SEED_MODULUS;
        SessionSeed(reduced as u32)
    }

    /// Seed for a session starting at `start`
    ///
    /// The hash runs over the canonical `iso_timestamp` form, so any RFC 3339
    /// spelling of the same instant gives the same seed.
    pub fn for_start(participant_id: &str, start: DateTime<Utc>) -> Self {
        Self::derive(participant_id.trim(), &iso_timestamp(start))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SessionSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Format a timestamp the way result records carry it
/// (`2024-05-01T09:30:00.000Z`)
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 start time in any offset
pub fn parse_start_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| SprError::InvalidSession(format!("invalid start time {}: {}", raw, e)))
}

/// One participant's run of the experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub participant_id: String,
    pub stimuli_file: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub seed: SessionSeed,
}

impl SessionContext {
    /// Start a session, deriving the seed from participant id and start time
    pub fn begin(participant_id: &str, stimuli_file: &str, start_time: DateTime<Utc>) -> Result<Self> {
        let participant_id = participant_id.trim();
        if participant_id.is_empty() {
            return Err(SprError::InvalidSession("participant id must not be empty".into()));
        }
        let stimuli_file = stimuli_file.trim();
        if stimuli_file.is_empty() {
            return Err(SprError::InvalidSession("a stimuli file must be selected".into()));
        }

        let seed = SessionSeed::for_start(participant_id, start_time);
        tracing::info!(
            participant = participant_id,
            stimuli = stimuli_file,
            seed = seed.value(),
            "Session started"
        );

        Ok(Self {
            participant_id: participant_id.to_string(),
            stimuli_file: stimuli_file.to_string(),
            start_time,
            end_time: None,
            seed,
        })
    }

    /// Replay a session with a captured seed instead of a derived one
    pub fn with_seed(mut self, seed: SessionSeed) -> Self {
        self.seed = seed;
        self
    }

    /// Record the end of the experiment
    pub fn finish(&mut self, end_time: DateTime<Utc>) {
        self.end_time = Some(end_time);
    }

    /// Milliseconds between start and end (0 while the session is running)
    pub fn duration_ms(&self) -> i64 {
        self.end_time
            .map(|end| (end - self.start_time).num_milliseconds())
            .unwrap_or(0)
    }
}
