//! Saving a finished session
//!
//! The local download files are written before anything goes over the
//! network, and a submission problem never prevents them.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::core::config::ExperimentConfig;
use crate::results::export::{write_download_files, ExportPaths};
use crate::results::submit::{SubmitOutcome, Submitter};
use crate::results::summary::SessionResult;

/// Where one session's results ended up
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Download files, when an output directory is configured and writable
    pub files: Option<ExportPaths>,
    pub file_error: Option<String>,
    /// Endpoint outcome, when a save endpoint is configured
    pub outcome: Option<SubmitOutcome>,
}

impl SaveReport {
    /// At least one copy of the results exists outside the process
    pub fn is_saved(&self) -> bool {
        self.files.is_some() || self.outcome.as_ref().is_some_and(SubmitOutcome::is_success)
    }
}

/// Write the download files, then submit to the endpoint
pub async fn save_session(config: &ExperimentConfig, result: &SessionResult, at: DateTime<Utc>) -> SaveReport {
    let mut report = SaveReport::default();

    if let Some(dir) = &config.output_dir {
        match write_download_files(Path::new(dir), result, at) {
            Ok(paths) => report.files = Some(paths),
            Err(e) => {
                tracing::error!(participant = %result.user_id, "Could not write download files: {}", e);
                report.file_error = Some(e.to_string());
            }
        }
    }

    if let Some(endpoint) = &config.save_endpoint {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let outcome = match Submitter::new(endpoint.clone(), timeout) {
            Ok(submitter) => submitter.try_submit(result).await,
            Err(e) => {
                tracing::warn!(participant = %result.user_id, "Save failed: {}", e);
                SubmitOutcome::Failed { reason: e.to_string() }
            }
        };
        report.outcome = Some(outcome);
    }

    report
}
