//! Reqwest-backed grading service adapter.
//!
//! The adapter owns transport details only: request serialisation, timeout
//! and HTTP status mapping, and JSON decoding into a domain [`Grade`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::{GradeRequestDto, GradeResponseDto};
use crate::domain::ports::{BagGrader, BagGraderError};
use crate::domain::{Grade, OwnerId};

const USER_AGENT: &str = "fitting-backend-bag-grader/0.1";

/// Grading adapter that POSTs `{"ownerId": ...}` to one endpoint.
pub struct HttpBagGrader {
    client: Client,
    endpoint: Url,
}

impl HttpBagGrader {
    /// Build an adapter using a reqwest client with an explicit timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, endpoint })
    }

    /// Endpoint this adapter sends grading requests to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl BagGrader for HttpBagGrader {
    async fn grade(&self, owner_id: &OwnerId) -> Result<Grade, BagGraderError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&GradeRequestDto { owner_id })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        debug!(%owner_id, bytes = body.len(), "grading service responded");
        parse_grade(body.as_ref())
    }
}

fn parse_grade(body: &[u8]) -> Result<Grade, BagGraderError> {
    let decoded: GradeResponseDto = serde_json::from_slice(body).map_err(|error| {
        BagGraderError::invalid_response(format!("invalid grade payload: {error}"))
    })?;
    decoded
        .into_domain()
        .map_err(BagGraderError::invalid_response)
}

fn map_transport_error(error: reqwest::Error) -> BagGraderError {
    if error.is_timeout() {
        BagGraderError::timeout(error.to_string())
    } else {
        BagGraderError::unavailable(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> BagGraderError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            BagGraderError::timeout(message)
        }
        _ => BagGraderError::unavailable(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
