//! Stimulus loading
//!
//! The main list, the fillers and the practice trials are fetched
//! concurrently. A failed load never aborts the run: it is recorded in the
//! [`LoadReport`] and replaced by a fallback.

pub mod source;

pub use source::{StimulusLocation, StimulusSource};

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::core::config::ExperimentConfig;
use crate::core::types::Provenance;
use crate::stimuli::{self, builtin, Item};

/// Errors that can occur when loading a stimulus file
#[derive(Debug, Error)]
pub enum LoadError {
    /// File could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Request failed before a response arrived
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// Server answered with a non-2xx status
    #[error("HTTP error! status: {status} ({url})")]
    Status { url: String, status: u16 },
    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// The three input files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StimulusKind {
    Main,
    Filler,
    Practice,
}

impl StimulusKind {
    pub fn provenance(self) -> Provenance {
        match self {
            StimulusKind::Main => Provenance::Stimulus,
            StimulusKind::Filler => Provenance::Filler,
            StimulusKind::Practice => Provenance::Practice,
        }
    }

    /// Items used when this file cannot be loaded
    pub fn fallback(self) -> Vec<Item> {
        match self {
            StimulusKind::Main => {
                let mut items = builtin::default_experimental_items();
                items.extend(builtin::default_filler_items());
                items
            }
            StimulusKind::Filler => Vec::new(),
            StimulusKind::Practice => builtin::default_practice_items(),
        }
    }
}

/// Classified items of all three files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StimulusBundle {
    pub main: Vec<Item>,
    pub fillers: Vec<Item>,
    pub practice: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadSuccess {
    pub kind: StimulusKind,
    pub source: String,
    pub items: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    pub kind: StimulusKind,
    pub source: String,
    pub reason: String,
}

/// Outcome of a bundle load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub loaded: Vec<LoadSuccess>,
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed(&self, kind: StimulusKind) -> bool {
        self.failures.iter().any(|f| f.kind == kind)
    }
}

/// Fetches and classifies stimulus files
pub struct StimulusLoader {
    client: reqwest::Client,
    location: StimulusLocation,
    delimiter: char,
    filler_file: String,
    practice_file: String,
}

impl StimulusLoader {
    pub fn from_config(config: &ExperimentConfig) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            location: StimulusLocation::parse(&config.stimuli_dir),
            delimiter: config.delimiter,
            filler_file: config.filler_file.clone(),
            practice_file: config.practice_file.clone(),
        })
    }

    /// Fetch and classify one file
    pub async fn load_items(&self, kind: StimulusKind, filename: &str) -> Result<Vec<Item>, LoadError> {
        let source = self.location.resolve(filename);
        let text = source.fetch(&self.client).await?;
        Ok(stimuli::items_from_text(&text, self.delimiter, kind.provenance()))
    }

    /// Load the main list plus fillers and practice, waiting for all three
    pub async fn load_bundle(&self, stimuli_file: &str) -> (StimulusBundle, LoadReport) {
        tracing::info!("Loading files: stimuli, fillers, and train trials");

        let (main, fillers, practice) = tokio::join!(
            self.load_items(StimulusKind::Main, stimuli_file),
            self.load_items(StimulusKind::Filler, &self.filler_file),
            self.load_items(StimulusKind::Practice, &self.practice_file),
        );

        let mut report = LoadReport::default();
        let bundle = StimulusBundle {
            main: self.settle(StimulusKind::Main, stimuli_file, main, &mut report),
            fillers: self.settle(StimulusKind::Filler, &self.filler_file, fillers, &mut report),
            practice: self.settle(StimulusKind::Practice, &self.practice_file, practice, &mut report),
        };

        if report.is_complete() {
            tracing::info!("File loading complete");
        } else {
            tracing::warn!(failures = report.failures.len(), "Some files failed to load");
        }
        (bundle, report)
    }

    fn settle(
        &self,
        kind: StimulusKind,
        filename: &str,
        result: Result<Vec<Item>, LoadError>,
        report: &mut LoadReport,
    ) -> Vec<Item> {
        let source = self.location.resolve(filename).describe();
        match result {
            Ok(items) => {
                tracing::info!(?kind, items = items.len(), "Loaded {}", source);
                report.loaded.push(LoadSuccess {
                    kind,
                    source,
                    items: items.len(),
                });
                items
            }
            Err(e) => {
                tracing::warn!(?kind, "Error loading {}: {}, using fallback", source, e);
                report.failures.push(LoadFailure {
                    kind,
                    source,
                    reason: e.to_string(),
                });
                kind.fallback()
            }
        }
    }
}
