use std::fmt::Write as _;

use clap::ValueEnum;
use streampick_resolver::Resolution;

/// How the resolved stream is printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `key: value` lines
    #[default]
    Text,
    /// The full resolution as one JSON object
    Json,
}

pub fn render(resolution: &Resolution, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(resolution)?),
        OutputFormat::Text => {
            let stream = &resolution.stream;
            let mut out = String::new();
            writeln!(out, "id: {}", resolution.video_id)?;
            writeln!(out, "video: {}", stream.video_url)?;
            writeln!(out, "mime: {}", stream.mime_type)?;
            if let Some(audio_url) = &stream.audio_url {
                writeln!(out, "audio: {audio_url}")?;
            }
            for warning in &resolution.warnings {
                writeln!(out, "warning: {warning}")?;
            }
            Ok(out)
        }
    }
}
