//! Experiment configuration
//!
//! Loaded from a TOML file. Every field has a default, so an empty file (or
//! no file at all) yields a runnable configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SprError};
use crate::schedule::shuffle::ShuffleStrategy;

/// A stimulus list the operator can choose from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StimulusFileEntry {
    pub filename: String,
    pub name: String,
}

/// Keys used by the terminal presenter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Advances to the next word. There is no timeout: the trial waits for it.
    pub advance: char,
    /// Selects the first answer option
    pub option_a: char,
    /// Selects the second answer option
    pub option_b: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            advance: ' ',
            option_a: 'f',
            option_b: 'j',
        }
    }
}

/// Configuration for one experiment deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Directory or http(s) base URL that holds the stimulus files
    pub stimuli_dir: String,

    /// Filler sentences, relative to `stimuli_dir`
    pub filler_file: String,

    /// Practice trials, relative to `stimuli_dir`
    pub practice_file: String,

    /// Stimulus lists offered to the operator
    pub available_stimuli: Vec<StimulusFileEntry>,

    /// How long the fixation cross stays up before each sentence
    pub fixation_duration_ms: u64,

    /// Message shown on the ready prompt
    pub ready_message: String,

    /// Results are POSTed here when set
    pub save_endpoint: Option<String>,

    /// Local download fallback directory. Always written when set.
    pub output_dir: Option<String>,

    /// Field delimiter of the stimulus files
    pub delimiter: char,

    /// Main-block randomization
    pub shuffle: ShuffleStrategy,

    pub keys: KeyBindings,

    /// Per-request timeout for stimulus fetches and result submission
    pub request_timeout_secs: u64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            stimuli_dir: "stimuli".into(),
            filler_file: "filler.csv".into(),
            practice_file: "train_trial.csv".into(),
            available_stimuli: Vec::new(),
            fixation_duration_ms: 800,
            ready_message: "Press any button to show the next sentence".into(),
            save_endpoint: None,
            output_dir: Some("results".into()),
            delimiter: ',',
            shuffle: ShuffleStrategy::default(),
            keys: KeyBindings::default(),
            request_timeout_secs: 30,
        }
    }
}

impl ExperimentConfig {
    /// Parse a config from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: ExperimentConfig = toml::from_str(text)?;
        config.validate().map_err(SprError::InvalidConfig)?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        tracing::debug!("Loaded experiment config from {}", path.display());
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.fixation_duration_ms == 0 {
            return Err("fixation_duration_ms must be positive".into());
        }

        if self.stimuli_dir.trim().is_empty() {
            return Err("stimuli_dir must not be empty".into());
        }

        let keys = &self.keys;
        if keys.advance == keys.option_a
            || keys.advance == keys.option_b
            || keys.option_a == keys.option_b
        {
            return Err(format!(
                "keys must be distinct (advance {:?}, option_a {:?}, option_b {:?})",
                keys.advance, keys.option_a, keys.option_b
            ));
        }

        if self.delimiter == '"' || self.delimiter == '\n' {
            return Err(format!("delimiter {:?} is not usable", self.delimiter));
        }

        if let Some(endpoint) = &self.save_endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(format!("save_endpoint must be an http(s) URL, got {}", endpoint));
            }
        }

        Ok(())
    }

    /// Look up a configured stimulus list by file name
    pub fn stimulus_entry(&self, filename: &str) -> Option<&StimulusFileEntry> {
        self.available_stimuli.iter().find(|e| e.filename == filename)
    }
}
