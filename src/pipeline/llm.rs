//! Remote-call guard: timeout, retry and error wrapping around provider calls.
//!
//! Every call to a [`crate::provider`] client goes through [`guarded`], which
//!
//! * bounds each attempt by `api_timeout_secs` (an elapsed attempt becomes
//!   [`ConvertError::UpstreamTimeout`]),
//! * retries up to `max_retries` times with exponential backoff
//!   (`retry_backoff_ms * 2^(attempt-1)`),
//! * wraps the final failure as [`ConvertError::Upstream`] tagged with the
//!   collaborator's name.
//!
//! With the default `max_retries = 0` each request makes exactly one attempt
//! per remote call.

use crate::config::ServiceConfig;
use crate::error::{ConvertError, ProviderError};
use crate::provider::{CompletionClient, ImageClient, SpeechClient};
use std::future::Future;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

/// Provider names used in errors and logs.
pub const COMPLETION: &str = "completion";
pub const SPEECH: &str = "speech";
pub const IMAGE: &str = "image";

/// Timeout and retry settings for one remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl CallPolicy {
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.api_timeout_secs),
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// Delay before retry number `attempt` (1-based).
    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_backoff
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

enum Failure {
    Provider(ProviderError),
    TimedOut,
}

/// Run `call` under `policy`, labelling failures with `provider`.
pub async fn guarded<T, F, Fut>(
    provider: &'static str,
    policy: &CallPolicy,
    mut call: F,
) -> Result<T, ConvertError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let start = Instant::now();
    let mut last = Failure::TimedOut;

    for attempt in 0..=policy.max_retries {
        if attempt > 0 {
            let backoff = policy.backoff(attempt);
            warn!(
                "{} call: retry {}/{} after {}ms",
                provider,
                attempt,
                policy.max_retries,
                backoff.as_millis()
            );
            sleep(backoff).await;
        }

        match timeout(policy.timeout, call()).await {
            Ok(Ok(value)) => {
                debug!("{} call succeeded in {:?}", provider, start.elapsed());
                return Ok(value);
            }
            Ok(Err(e)) => {
                warn!("{} call: attempt {} failed: {}", provider, attempt + 1, e);
                last = Failure::Provider(e);
            }
            Err(_) => {
                warn!(
                    "{} call: attempt {} timed out after {:?}",
                    provider,
                    attempt + 1,
                    policy.timeout
                );
                last = Failure::TimedOut;
            }
        }
    }

    Err(match last {
        Failure::Provider(source) => ConvertError::Upstream { provider, source },
        Failure::TimedOut => ConvertError::UpstreamTimeout {
            provider,
            secs: policy.timeout.as_secs(),
        },
    })
}

/// One guarded completion call.
pub async fn complete(
    client: &dyn CompletionClient,
    prompt: &str,
    policy: &CallPolicy,
) -> Result<String, ConvertError> {
    debug!("Completion prompt: {} chars", prompt.chars().count());
    guarded(COMPLETION, policy, || client.complete(prompt)).await
}

/// One guarded speech call.
pub async fn synthesize(
    client: &dyn SpeechClient,
    text: &str,
    policy: &CallPolicy,
) -> Result<Vec<u8>, ConvertError> {
    debug!("Speech input: {} chars", text.chars().count());
    guarded(SPEECH, policy, || client.synthesize(text)).await
}

/// One guarded image-generation call.
pub async fn generate_image(
    client: &dyn ImageClient,
    prompt: &str,
    policy: &CallPolicy,
) -> Result<String, ConvertError> {
    guarded(IMAGE, policy, || client.generate(prompt)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(timeout_ms: u64, retries: u32) -> CallPolicy {
        CallPolicy {
            timeout: Duration::from_millis(timeout_ms),
            max_retries: retries,
            retry_backoff: Duration::from_millis(1),
        }
    }

    #[test]
    fn backoff_doubles() {
        let p = CallPolicy {
            timeout: Duration::from_secs(1),
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
        };
        assert_eq!(p.backoff(1), Duration::from_millis(500));
        assert_eq!(p.backoff(2), Duration::from_millis(1000));
        assert_eq!(p.backoff(3), Duration::from_millis(2000));
    }

    #[test]
    fn policy_follows_config() {
        let p = CallPolicy::from_config(&ServiceConfig::default());
        assert_eq!(p.timeout, Duration::from_secs(60));
        assert_eq!(p.max_retries, 0);
    }

    #[tokio::test]
    async fn single_attempt_by_default() {
        let calls = AtomicU32::new(0);
        let err = guarded(COMPLETION, &policy(1000, 0), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(ProviderError::Request("boom".into())) }
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        match err {
            ConvertError::Upstream { provider, source } => {
                assert_eq!(provider, "completion");
                assert!(matches!(source, ProviderError::Request(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn retries_until_success() {
        let calls = AtomicU32::new(0);
        let value = guarded(SPEECH, &policy(1000, 2), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(ProviderError::Status {
                        status: 503,
                        body: "busy".into(),
                    })
                } else {
                    Ok(n)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn slow_call_times_out() {
        let err = guarded(IMAGE, &policy(20, 0), || async {
            sleep(Duration::from_secs(5)).await;
            Ok::<_, ProviderError>("late")
        })
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ConvertError::UpstreamTimeout {
                provider: "image",
                ..
            }
        ));
        assert_eq!(err.status_code(), 500);
    }
}
