use std::time::Duration;
use tracing::{debug, error, warn};

use super::EmbeddingError;

const EXPONENTIAL_BACKOFF_BASE: u64 = 2;

pub(crate) fn agent_with_timeout(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into()
}

/// Run `request_fn` up to `retry_attempts` times.
///
/// Server errors and transport failures are retried with exponential backoff,
/// client errors are returned immediately.
pub(crate) fn request_with_retry<F>(
    retry_attempts: u32,
    target: &str,
    mut request_fn: F,
) -> Result<String, EmbeddingError>
where
    F: FnMut() -> Result<String, ureq::Error>,
{
    let attempts = retry_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        debug!("HTTP request attempt {}/{}", attempt, attempts);

        match request_fn() {
            Ok(response_text) => {
                debug!("Request succeeded on attempt {}", attempt);
                return Ok(response_text);
            }
            Err(error) => {
                let retryable = match &error {
                    ureq::Error::StatusCode(status) => {
                        if *status >= 500 {
                            warn!(
                                "Server error (status {}), attempt {}/{}",
                                status, attempt, attempts
                            );
                            EmbeddingError::Status(*status)
                        } else {
                            warn!("Client error (status {}), not retrying", status);
                            return Err(EmbeddingError::Status(*status));
                        }
                    }
                    ureq::Error::Timeout(_) => {
                        warn!("Request timed out, attempt {}/{}", attempt, attempts);
                        EmbeddingError::Timeout
                    }
                    ureq::Error::ConnectionFailed
                    | ureq::Error::HostNotFound
                    | ureq::Error::Io(_) => {
                        warn!(
                            "Transport error: {}, attempt {}/{}",
                            error, attempt, attempts
                        );
                        EmbeddingError::Request(error.to_string())
                    }
                    _ => {
                        warn!("Non-retryable error: {}", error);
                        return Err(EmbeddingError::Request(error.to_string()));
                    }
                };

                last_error = Some(retryable);

                if attempt < attempts {
                    let delay = Duration::from_millis(EXPONENTIAL_BACKOFF_BASE.pow(attempt - 1) * 1000);
                    debug!("Waiting {:?} before retry", delay);
                    std::thread::sleep(delay);
                }
            }
        }
    }

    error!("All retry attempts failed for request to {}", target);

    Err(last_error
        .unwrap_or_else(|| EmbeddingError::Request("Request failed after retries".to_string())))
}
