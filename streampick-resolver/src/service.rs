//! Stream resolution pipeline
//!
//! `extract -> fetch -> validate -> select`. The first fatal failure ends the
//! resolution; advisories ride along on the returned [`Resolution`].

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::client::{MetadataClient, MetadataSource};
use crate::error::{FetchError, InputError, ResolveError};
use crate::select::select_best;
use crate::source::{extract_identifier, VideoId};
use crate::types::{Endpoint, RawPayload, Resolution, SelectionMode};
use crate::validate::validate;

/// Resolves source references into playable streams.
///
/// Cloning is cheap; clones share the underlying [`MetadataSource`].
#[derive(Clone)]
pub struct StreamResolver {
    source: Arc<dyn MetadataSource>,
    endpoint: Endpoint,
    mode: SelectionMode,
}

impl StreamResolver {
    #[must_use]
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        Self {
            source,
            endpoint: Endpoint::default(),
            mode: SelectionMode::default(),
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: SelectionMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    #[must_use]
    pub const fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub async fn resolve(&self, source_ref: &str) -> Result<Resolution, ResolveError> {
        self.resolve_with_cancel(source_ref, None).await
    }

    /// Resolve `source_ref`, giving up with [`FetchError::Cancelled`] if
    /// `cancel` fires before the metadata arrives.
    #[instrument(skip(self, cancel), fields(mode = %self.mode))]
    pub async fn resolve_with_cancel(
        &self,
        source_ref: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Resolution, ResolveError> {
        let video_id = extract_identifier(source_ref)
            .ok_or_else(|| InputError::NoIdentifier(source_ref.to_string()))?;
        debug!(video_id = %video_id, "Extracted video identifier");

        let raw = self.fetch(&video_id, cancel).await?;
        let validated = validate(raw)?;
        let stream = select_best(validated.streaming.candidates(), self.mode)?;

        debug!(
            video_id = %video_id,
            mime_type = %stream.mime_type,
            warnings = validated.warnings.len(),
            "Resolved stream"
        );

        Ok(Resolution {
            video_id,
            stream,
            warnings: validated.warnings,
        })
    }

    async fn fetch(
        &self,
        video_id: &VideoId,
        cancel: Option<&CancellationToken>,
    ) -> Result<RawPayload, FetchError> {
        let fetch = self.source.fetch_metadata(video_id, &self.endpoint);
        match cancel {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => Err(FetchError::Cancelled),
                result = fetch => result,
            },
            None => fetch.await,
        }
    }
}

impl Default for StreamResolver {
    fn default() -> Self {
        Self::new(Arc::new(MetadataClient::new()))
    }
}

/// Resolve with the default HTTP client and partitioned selection.
pub async fn resolve_stream(
    source_ref: &str,
    endpoint: Option<Endpoint>,
) -> Result<Resolution, ResolveError> {
    StreamResolver::default()
        .with_endpoint(endpoint.unwrap_or_default())
        .resolve(source_ref)
        .await
}
