//! API key validation against a provider endpoint.
//!
//! Network trouble and a rejected key are kept apart: callers may proceed
//! optimistically on the former but must stop on the latter.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use crate::providers::ProviderDescriptor;

/// Upper bound for a validation round trip.
pub const VALIDATION_TIMEOUT: Duration = Duration::from_secs(15);

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Result of a validation attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// The endpoint accepted the key.
    Valid,
    /// No validation endpoint is known for this provider/region.
    Skipped,
}

#[derive(Debug, Error)]
pub enum ValidationError {
    /// The endpoint rejected the key
    #[error("API key rejected (HTTP {status})")]
    InvalidCredential { status: u16 },

    /// No response within the timeout
    #[error("Validation timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Connection-level failure
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Neither success nor an auth failure
    #[error("Unexpected response: HTTP {status}")]
    UnexpectedStatus { status: u16 },
}

impl ValidationError {
    /// Whether the caller may keep going without a confirmed key.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ValidationError::InvalidCredential { .. })
    }
}

/// Check `api_key` against the provider's endpoint for `region_id`.
pub async fn validate_credential(
    provider: &ProviderDescriptor,
    region_id: &str,
    api_key: &str,
) -> Result<Validation, ValidationError> {
    let Some(url) = provider.validate_url(region_id) else {
        tracing::debug!(provider = %provider.id, region_id, "no validation endpoint");
        return Ok(Validation::Skipped);
    };
    validate_at(&url, api_key, VALIDATION_TIMEOUT).await
}

/// Check `api_key` against an explicit URL.
pub async fn validate_at(
    url: &str,
    api_key: &str,
    timeout: Duration,
) -> Result<Validation, ValidationError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(ValidationError::Network)?;

    tracing::debug!(url, "validating api key");
    let response = client
        .get(url)
        .header("x-api-key", api_key)
        .header("authorization", format!("Bearer {}", api_key))
        .header("anthropic-version", ANTHROPIC_VERSION)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                ValidationError::Timeout(timeout)
            } else {
                ValidationError::Network(e)
            }
        })?;

    classify(response.status())
}

fn classify(status: StatusCode) -> Result<Validation, ValidationError> {
    if status.is_success() {
        return Ok(Validation::Valid);
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(ValidationError::InvalidCredential {
                status: status.as_u16(),
            })
        }
        _ => Err(ValidationError::UnexpectedStatus {
            status: status.as_u16(),
        }),
    }
}
