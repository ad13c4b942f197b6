//! Gorgias API error types.

use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the Gorgias client.
///
/// Nothing here is retried internally. Callers decide what to do with a
/// rate limit or a timeout.
#[derive(Debug, thiserror::Error)]
pub enum GorgiasError {
  #[error("Gorgias API returned HTTP {status}: {body}")]
  Api { status: u16, body: String },

  #[error("Request timed out after {}s", .0.as_secs())]
  Timeout(Duration),

  #[error("Network error: {0}")]
  Network(#[source] BoxError),

  #[error("Failed to decode response: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("Invalid request URL: {0}")]
  Url(#[from] url::ParseError),
}

impl GorgiasError {
  /// Create a GorgiasError from a non-success status and the response body.
  pub fn from_status(status: u16, body: impl Into<String>) -> Self {
    GorgiasError::Api {
      status,
      body: body.into(),
    }
  }

  /// HTTP status of a remote error.
  pub fn status(&self) -> Option<u16> {
    match self {
      GorgiasError::Api { status, .. } => Some(*status),
      _ => None,
    }
  }

  pub fn is_rate_limited(&self) -> bool {
    self.status() == Some(429)
  }

  pub fn is_timeout(&self) -> bool {
    matches!(self, GorgiasError::Timeout(_))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_api_error_carries_status_and_body() {
    let err = GorgiasError::from_status(404, "{\"error\":\"not found\"}");
    assert_eq!(err.status(), Some(404));
    assert_eq!(
      err.to_string(),
      "Gorgias API returned HTTP 404: {\"error\":\"not found\"}"
    );
  }

  #[test]
  fn test_rate_limit_detection() {
    assert!(GorgiasError::from_status(429, "slow down").is_rate_limited());
    assert!(!GorgiasError::from_status(500, "").is_rate_limited());
    assert!(!GorgiasError::Timeout(Duration::from_secs(30)).is_rate_limited());
  }

  #[test]
  fn test_timeout_is_distinct_from_network() {
    let timeout = GorgiasError::Timeout(Duration::from_secs(30));
    let network = GorgiasError::Network("connection refused".into());
    assert!(timeout.is_timeout());
    assert!(!network.is_timeout());
    assert_eq!(timeout.to_string(), "Request timed out after 30s");
  }
}
