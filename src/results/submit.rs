//! Result submission to the save endpoint

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::results::summary::SessionResult;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server returned status {status}: {body}")]
    Status { status: u16, body: String },
}

impl SubmitError {
    pub fn status(&self) -> Option<u16> {
        match self {
            SubmitError::Status { status, .. } => Some(*status),
            SubmitError::Network(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// What the operator is shown after a save attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Saved { status: u16 },
    Failed { reason: String },
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Saved { .. })
    }
}

/// POSTs session results as a one-element JSON array
pub struct Submitter {
    client: Client,
    endpoint: String,
}

impl Submitter {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SubmitError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Send one result. Any 2xx is success.
    pub async fn submit(&self, result: &SessionResult) -> Result<u16, SubmitError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&[result])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubmitError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(participant = %result.user_id, status = status.as_u16(), "Data saved to remote server");
        Ok(status.as_u16())
    }

    /// Like [`Submitter::submit`], with every failure folded into the outcome.
    /// Retrying is calling this again.
    pub async fn try_submit(&self, result: &SessionResult) -> SubmitOutcome {
        match self.submit(result).await {
            Ok(status) => SubmitOutcome::Saved { status },
            Err(e) => {
                tracing::warn!(participant = %result.user_id, "Save failed: {}", e);
                SubmitOutcome::Failed { reason: e.to_string() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accessor() {
        let err = SubmitError::Status {
            status: 503,
            body: "busy".into(),
        };
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "server returned status 503: busy");
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(SubmitOutcome::Saved { status: 201 }).unwrap();
        assert_eq!(json["outcome"], "saved");
        assert!(!SubmitOutcome::Failed { reason: "x".into() }.is_success());
    }
}
