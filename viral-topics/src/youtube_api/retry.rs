//! Bounded retries for YouTube API GET requests.

use http::StatusCode;
use std::convert::Infallible;
use std::future::Future;
use std::time::Duration;

/// How often, and how patiently, a request is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Fixed pause between two consecutive attempts.
    pub pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            pause: Duration::from_secs(2),
        }
    }
}

/// Result of a retried request.
#[derive(Debug, PartialEq, Eq)]
pub enum Fetched<T> {
    /// The request eventually returned `200 OK`.
    Data(T),
    /// The API answered `403 Forbidden` (quota exhausted or key rejected).
    ///
    /// Never retried.
    Forbidden { body: String },
    /// Every attempt failed with some other status or a transport error.
    GaveUp { attempts: u32, last_failure: String },
}

impl<T> Fetched<T> {
    /// Splits off the payload, leaving only the failure variants behind.
    pub fn into_data(self) -> Result<T, Fetched<Infallible>> {
        match self {
            Fetched::Data(data) => Ok(data),
            Fetched::Forbidden { body } => Err(Fetched::Forbidden { body }),
            Fetched::GaveUp {
                attempts,
                last_failure,
            } => Err(Fetched::GaveUp {
                attempts,
                last_failure,
            }),
        }
    }

    /// Transforms the payload of [`Fetched::Data`], passing the other variants through.
    pub fn try_map<U>(self, f: impl FnOnce(T) -> eyre::Result<U>) -> eyre::Result<Fetched<U>> {
        Ok(match self {
            Fetched::Data(data) => Fetched::Data(f(data)?),
            Fetched::Forbidden { body } => Fetched::Forbidden { body },
            Fetched::GaveUp {
                attempts,
                last_failure,
            } => Fetched::GaveUp {
                attempts,
                last_failure,
            },
        })
    }
}

/// Runs `attempt` until it yields `200 OK`, a `403`, or the policy runs out.
///
/// Each call of `attempt` performs one request and returns the status code
/// together with the response body. Transport errors count as failed attempts.
pub async fn fetch_with_retry<F, Fut>(policy: RetryPolicy, mut attempt: F) -> Fetched<String>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = eyre::Result<(StatusCode, String)>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_failure = String::new();

    for n in 1..=max_attempts {
        match attempt().await {
            Ok((StatusCode::OK, body)) => {
                if n > 1 {
                    tracing::debug!(attempt = n, "request succeeded after retrying");
                }
                return Fetched::Data(body);
            }
            Ok((StatusCode::FORBIDDEN, body)) => {
                tracing::warn!(attempt = n, "request forbidden, not retrying");
                return Fetched::Forbidden { body };
            }
            Ok((status, body)) => {
                tracing::warn!(attempt = n, %status, "request failed");
                last_failure = format!("{status} - {body}");
            }
            Err(e) => {
                tracing::warn!(attempt = n, "request failed: {e:#}");
                last_failure = format!("{e:#}");
            }
        }

        if n < max_attempts {
            tokio::time::sleep(policy.pause).await;
        }
    }

    Fetched::GaveUp {
        attempts: max_attempts,
        last_failure,
    }
}
