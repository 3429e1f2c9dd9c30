//! Video identifier extraction
//!
//! Accepts a bare identifier or a watch URL of the form
//! `[http[s]://][www.](youtube.com|youtu.be|youtube)[/][watch?v=|?v=]<id>`.
//! Every optional part is taken whenever it is present, and whatever is left
//! must be exactly [`ID_LEN`] characters long.

use std::fmt;

use serde::Serialize;

/// Length of every video identifier
pub const ID_LEN: usize = 11;

const SCHEMES: [&str; 2] = ["https://", "http://"];
const WWW: &str = "www.";
// Order matters: "youtube.com" must win over the bare "youtube" alias.
const HOSTS: [&str; 3] = ["youtube.com", "youtu.be", "youtube"];
const QUERY_PREFIXES: [&str; 2] = ["watch?v=", "?v="];

/// An 11-character video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Wrap `id` if it is a bare identifier from the identifier alphabet
    #[must_use]
    pub fn parse(id: &str) -> Option<Self> {
        is_bare_identifier(id).then(|| Self(id.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extract the video identifier from a bare id or a supported URL.
///
/// Returns `None` when nothing of the right length sits in the identifier
/// position; that is an ordinary outcome rather than an error.
#[must_use]
pub fn extract_identifier(input: &str) -> Option<VideoId> {
    if let Some(id) = VideoId::parse(input) {
        return Some(id);
    }

    let rest = strip_url_prefix(input)?;
    if rest.contains(is_line_terminator) {
        return None;
    }
    // Length is counted in UTF-16 units, like the browser client did.
    (rest.encode_utf16().count() == ID_LEN).then(|| VideoId(rest.to_string()))
}

/// Strip scheme, `www.`, host, separator and query prefix; `None` when the
/// host is not one of the supported names.
fn strip_url_prefix(input: &str) -> Option<&str> {
    let rest = strip_any(input, &SCHEMES);
    let rest = rest.strip_prefix(WWW).unwrap_or(rest);
    let rest = HOSTS.iter().find_map(|host| rest.strip_prefix(host))?;
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    Some(strip_any(rest, &QUERY_PREFIXES))
}

fn strip_any<'a>(input: &'a str, prefixes: &[&str]) -> &'a str {
    prefixes
        .iter()
        .find_map(|prefix| input.strip_prefix(prefix))
        .unwrap_or(input)
}

fn is_bare_identifier(id: &str) -> bool {
    id.len() == ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

const fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}
