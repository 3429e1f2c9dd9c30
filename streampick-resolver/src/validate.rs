//! Payload validation
//!
//! Turns a [`RawPayload`] into [`StreamingData`]. Upstream failure flags and
//! embed restrictions become advisories; missing structure is fatal.

use tracing::warn;

use crate::error::ValidationError;
use crate::types::{RawPayload, StreamingData};

/// Candidate lists plus the advisories raised while validating them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedPayload {
    pub streaming: StreamingData,
    pub warnings: Vec<ValidationError>,
}

pub fn validate(raw: RawPayload) -> Result<ValidatedPayload, ValidationError> {
    let mut warnings = Vec::new();

    let data = raw.data.ok_or_else(|| ValidationError::missing("data"))?;

    if !raw.success {
        let advisory = ValidationError::UpstreamReportedFailure {
            status_code: data.status_code,
        };
        warn!(status_code = ?data.status_code, "Metadata service reported a failure");
        warnings.push(advisory);
    }

    let player_response = data
        .player_response
        .ok_or_else(|| ValidationError::missing("data.player_response"))?;

    let embeddable = player_response
        .playability_status
        .is_some_and(|status| status.playable_in_embed);
    if !embeddable {
        warn!("Video cannot be played in an embedded player");
        warnings.push(ValidationError::NotEmbeddable);
    }

    let streaming = player_response
        .streaming_data
        .ok_or_else(|| ValidationError::missing("data.player_response.streamingData"))?;
    let formats = streaming.formats.ok_or_else(|| {
        ValidationError::missing("data.player_response.streamingData.formats")
    })?;
    let adaptive_formats = streaming.adaptive_formats.ok_or_else(|| {
        ValidationError::missing("data.player_response.streamingData.adaptiveFormats")
    })?;

    Ok(ValidatedPayload {
        streaming: StreamingData {
            formats,
            adaptive_formats,
        },
        warnings,
    })
}
