//! streampick stream resolver
//!
//! Looks up a video on the companion metadata service and picks the best
//! playable rendition(s) from its format lists.
//!
//! # Example
//!
//! ```no_run
//! use streampick_resolver::{resolve_stream, Endpoint};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolution = resolve_stream(
//!     "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
//!     Some(Endpoint::new("localhost", 5624)),
//! )
//! .await?;
//! println!("{}", resolution.stream.video_url);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod select;
pub mod service;
pub mod source;
pub mod types;
pub mod validate;

pub use client::{ClientOptions, MetadataClient, MetadataSource};
pub use error::{FetchError, InputError, ResolveError, SelectionError, ValidationError};
pub use select::{normalize_mime, rank_renditions, select_best};
pub use service::{resolve_stream, StreamResolver};
pub use source::{extract_identifier, VideoId};
pub use types::*;
pub use validate::{validate, ValidatedPayload};
