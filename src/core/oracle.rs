//! Client for the answer service: one JSON POST per question.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every way a question can go unanswered. All of them look the same to the user.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("failed to reach the answer service: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("answer service returned non-200 status: {0}")]
    Status(StatusCode),
    #[error("failed to decode answer: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("answer not found in response")]
    EmptyWisdom,
}

#[derive(Serialize)]
struct QuestionPayload<'a> {
    question: &'a str,
}

#[derive(Deserialize)]
struct WisdomResponse {
    #[serde(default)]
    wisdom: Option<String>,
}

/// HTTP client bound to one answer endpoint. Cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Oracle {
    client: Client,
    endpoint: String,
}

impl Oracle {
    /// Build a client. Without a timeout a hung request waits forever.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, OracleError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Ask one question. Only a 200 response carrying a non-empty `wisdom` succeeds.
    pub async fn ask(&self, question: &str) -> Result<String, OracleError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&QuestionPayload { question })
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(OracleError::Status(status));
        }

        let body = response.text().await?;
        let parsed: WisdomResponse = serde_json::from_str(&body)?;
        match parsed.wisdom {
            Some(wisdom) if !wisdom.is_empty() => Ok(wisdom),
            _ => Err(OracleError::EmptyWisdom),
        }
    }
}
