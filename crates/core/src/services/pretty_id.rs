//! Pretty-ID allocator client.
//!
//! Stories get their public sequential IDs from the allocator process over
//! HTTP. Anything other than a `200` carrying a positive plain-text integer
//! is a server-class failure here; retrying is left to the user (a retry at
//! this level could not tell a lost response from a lost request).

use dynstory_common::{AppError, AppResult, config::AllocatorConfig};
use reqwest::StatusCode;

/// HTTP client for the pretty-ID allocator process.
#[derive(Clone)]
pub struct PrettyIdClient {
    client: reqwest::Client,
    url: String,
}

impl PrettyIdClient {
    /// Create a new allocator client.
    #[must_use]
    pub fn new(config: &AllocatorConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.url(),
        }
    }

    /// Request the next pretty ID.
    pub async fn next(&self) -> AppResult<i64> {
        let response = self
            .client
            .post(&self.url)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalService(format!("Pretty ID server unreachable: {e}"))
            })?;

        if response.status() != StatusCode::OK {
            return Err(AppError::ExternalService(format!(
                "Pretty ID server gave status {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::ExternalService(format!("Pretty ID server body lost: {e}")))?;

        parse_pretty_id(&body)
    }
}

/// Parse the allocator's plain-text response into a positive ID.
fn parse_pretty_id(body: &str) -> AppResult<i64> {
    let pretty_id = body.trim().parse::<i64>().map_err(|_| {
        AppError::ExternalService(format!("Pretty ID server gave unparseable body {body:?}"))
    })?;

    if pretty_id < 1 {
        return Err(AppError::ExternalService(format!(
            "Pretty ID server gave non-positive ID {pretty_id}"
        )));
    }

    Ok(pretty_id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_positive_integer() {
        assert_eq!(parse_pretty_id("42").unwrap(), 42);
        assert_eq!(parse_pretty_id("1\n").unwrap(), 1);
    }

    #[test]
    fn test_parse_rejects_empty_body() {
        assert!(matches!(
            parse_pretty_id(""),
            Err(AppError::ExternalService(_))
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_pretty_id("forty-two"),
            Err(AppError::ExternalService(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_positive() {
        assert!(matches!(
            parse_pretty_id("0"),
            Err(AppError::ExternalService(_))
        ));
        assert!(matches!(
            parse_pretty_id("-3"),
            Err(AppError::ExternalService(_))
        ));
    }
}
