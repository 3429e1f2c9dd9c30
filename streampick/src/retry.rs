//! Caller-side retry around a resolution
//!
//! The resolver never retries on its own. Transient fetch failures are
//! retried here with exponential backoff (via `backon` crate); every other
//! failure is returned as-is.

use std::time::Duration;

use backon::{BackoffBuilder, ExponentialBuilder};
use streampick_resolver::{ResolveError, Resolution, StreamResolver};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::RetryConfig;

pub async fn resolve_with_retry(
    resolver: &StreamResolver,
    source_ref: &str,
    policy: &RetryConfig,
    cancel: &CancellationToken,
) -> Result<Resolution, ResolveError> {
    let mut backoff = ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(policy.min_delay_ms))
        .with_max_delay(Duration::from_millis(policy.max_delay_ms))
        .with_max_times(policy.max_retries)
        .with_jitter()
        .build();

    loop {
        let err = match resolver.resolve_with_cancel(source_ref, Some(cancel)).await {
            Ok(resolution) => return Ok(resolution),
            Err(err) => err,
        };

        let transient = matches!(&err, ResolveError::Fetch(fetch) if fetch.is_transient());
        let Some(delay) = backoff.next().filter(|_| transient) else {
            return Err(err);
        };

        warn!("Resolution failed: {} - retrying in {:?}", err, delay);
        tokio::select! {
            () = cancel.cancelled() => return Err(err),
            () = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use streampick_resolver::{Endpoint, FetchError, MetadataSource, RawPayload, VideoId};

    /// Fails with `error` for the first `failures` calls, then succeeds
    struct FlakySource {
        failures: usize,
        error: fn() -> FetchError,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MetadataSource for FlakySource {
        async fn fetch_metadata(
            &self,
            _id: &VideoId,
            _endpoint: &Endpoint,
        ) -> Result<RawPayload, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err((self.error)());
            }
            Ok(serde_json::from_value(json!({
                "success": true,
                "data": {
                    "player_response": {
                        "playabilityStatus": { "playableInEmbed": true },
                        "streamingData": {
                            "formats": [
                                { "mimeType": "video/mp4", "bitrate": 1, "width": 640, "url": "https://cdn/v" }
                            ],
                            "adaptiveFormats": [
                                { "mimeType": "audio/mp4", "bitrate": 1, "url": "https://cdn/a" }
                            ]
                        }
                    }
                }
            }))?)
        }
    }

    fn flaky(failures: usize, error: fn() -> FetchError) -> Arc<FlakySource> {
        Arc::new(FlakySource {
            failures,
            error,
            calls: AtomicUsize::new(0),
        })
    }

    fn policy(max_retries: usize) -> RetryConfig {
        RetryConfig {
            max_retries,
            min_delay_ms: 1,
            max_delay_ms: 5,
        }
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let source = flaky(2, || FetchError::Network("connection refused".to_string()));
        let resolver = StreamResolver::new(source.clone());

        let cancel = CancellationToken::new();
        let resolution = resolve_with_retry(&resolver, "dQw4w9WgXcQ", &policy(3), &cancel)
            .await
            .unwrap();

        assert_eq!(resolution.stream.video_url, "https://cdn/v");
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let source = flaky(10, || FetchError::Timeout("deadline".to_string()));
        let resolver = StreamResolver::new(source.clone());

        let cancel = CancellationToken::new();
        let err = resolve_with_retry(&resolver, "dQw4w9WgXcQ", &policy(2), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::Fetch(FetchError::Timeout(_))));
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_failures_are_not_retried() {
        let source = flaky(1, || FetchError::Parse("bad body".to_string()));
        let resolver = StreamResolver::new(source.clone());

        let cancel = CancellationToken::new();
        let err = resolve_with_retry(&resolver, "dQw4w9WgXcQ", &policy(5), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::Fetch(FetchError::Parse(_))));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_endpoint_is_not_retried() {
        let source = flaky(1, || FetchError::InvalidEndpoint("builder error".to_string()));
        let resolver = StreamResolver::new(source.clone());

        let cancel = CancellationToken::new();
        let err = resolve_with_retry(&resolver, "dQw4w9WgXcQ", &policy(5), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::Fetch(FetchError::InvalidEndpoint(_))));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_retries_by_default() {
        let source = flaky(1, || FetchError::Network("reset".to_string()));
        let resolver = StreamResolver::new(source.clone());

        let err = resolve_with_retry(
            &resolver,
            "dQw4w9WgXcQ",
            &RetryConfig::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.stage(), "fetch");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
