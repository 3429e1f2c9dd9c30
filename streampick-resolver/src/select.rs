//! Rendition ranking and selection

use std::cmp::Ordering;

use tracing::debug;

use crate::error::SelectionError;
use crate::types::{MediaKind, RenditionDescriptor, ResolvedStream, SelectionMode};

/// Mime type used when a rendition does not carry a usable one
pub const DEFAULT_MIME_TYPE: &str = "video/webm";

/// Base media type of `mime_type`, e.g. `video/mp4` for `video/mp4; codecs="avc1"`
#[must_use]
pub fn normalize_mime(mime_type: Option<&str>) -> String {
    mime_type
        .and_then(|mime| mime.split(';').next())
        .map(str::trim)
        .filter(|base| !base.is_empty())
        .unwrap_or(DEFAULT_MIME_TYPE)
        .to_string()
}

/// Order renditions of `kind` best-first.
///
/// Video (and [`MediaKind::Any`]) ranks by width then bitrate, audio by
/// bitrate alone, all descending. Ties keep their input order. Renditions
/// without a URL are left out.
pub fn rank_renditions<'a>(
    candidates: impl IntoIterator<Item = &'a RenditionDescriptor>,
    kind: MediaKind,
) -> Vec<&'a RenditionDescriptor> {
    let mut ranked: Vec<_> = candidates
        .into_iter()
        .filter(|r| r.url.is_some() && r.is_kind(kind))
        .collect();

    match kind {
        MediaKind::Audio => ranked.sort_by(|a, b| by_bitrate(a, b)),
        MediaKind::Video | MediaKind::Any => {
            ranked.sort_by(|a, b| by_width(a, b).then_with(|| by_bitrate(a, b)));
        }
    }
    ranked
}

/// Pick the stream to play from `candidates`.
pub fn select_best<'a>(
    candidates: impl IntoIterator<Item = &'a RenditionDescriptor>,
    mode: SelectionMode,
) -> Result<ResolvedStream, SelectionError> {
    let candidates: Vec<_> = candidates.into_iter().collect();

    match mode {
        SelectionMode::Partitioned => {
            let video = best_of(&candidates, MediaKind::Video)?;
            let audio = best_of(&candidates, MediaKind::Audio)?;
            Ok(ResolvedStream {
                video_url: url_of(video),
                mime_type: normalize_mime(video.mime_type.as_deref()),
                audio_url: Some(url_of(audio)),
            })
        }
        SelectionMode::Single => {
            let best = best_of(&candidates, MediaKind::Any)?;
            Ok(ResolvedStream {
                video_url: url_of(best),
                mime_type: normalize_mime(best.mime_type.as_deref()),
                audio_url: None,
            })
        }
    }
}

fn best_of<'a>(
    candidates: &[&'a RenditionDescriptor],
    kind: MediaKind,
) -> Result<&'a RenditionDescriptor, SelectionError> {
    let ranked = rank_renditions(candidates.iter().copied(), kind);
    debug!(kind = %kind, candidates = ranked.len(), "Ranked renditions");
    ranked
        .first()
        .copied()
        .ok_or(SelectionError::NoPlayableRendition(kind))
}

fn url_of(rendition: &RenditionDescriptor) -> String {
    rendition.url.clone().unwrap_or_default()
}

fn by_width(a: &RenditionDescriptor, b: &RenditionDescriptor) -> Ordering {
    b.width.unwrap_or(0).cmp(&a.width.unwrap_or(0))
}

fn by_bitrate(a: &RenditionDescriptor, b: &RenditionDescriptor) -> Ordering {
    b.bitrate.cmp(&a.bitrate)
}
