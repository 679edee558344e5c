//! # syncbook
//!
//! Turns a word-processor HTML export with highlighted passages into an
//! EPUB 3 chapter whose highlights are cue elements, plus the Media Overlay
//! (SMIL) that plays narration in sync with them.
//!
//! ## Features
//!
//! - Highlight detection from the document's inline stylesheet
//! - Same-color runs merged under one element with a fragment id
//! - Soft hyphenation of cue text
//! - Canonical XHTML output
//! - Overlay built from a label export, checked one-to-one against the cues
//!
//! ## Quick Start
//!
//! ```no_run
//! use syncbook::{Composer, ComposerConfig};
//!
//! let html = std::fs::read_to_string("chapter.html")?;
//! let timings = std::fs::read_to_string("labels.txt")?;
//!
//! let composer = Composer::new().with_config(ComposerConfig {
//!     title: Some("Chapter One".to_string()),
//!     text_path: "chapter.xhtml".to_string(),
//!     audio_path: "../Audio/chapter.mp3".to_string(),
//!     ..ComposerConfig::default()
//! });
//! let composition = composer.compose(&html, Some(&timings))?;
//! std::fs::write("chapter.xhtml", &composition.xhtml)?;
//! if let Some(overlay) = &composition.overlay {
//!     std::fs::write("chapter.xhtml.smil", &overlay.markup)?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! A composition fails as a whole: when the number of clips in the label
//! export differs from the number of cues, no output is produced.

pub mod clip;
pub mod cue;
pub mod dom;
pub mod error;
pub mod hyphenate;
pub mod links;
pub mod pipeline;
pub mod ranges;
pub mod smil;
pub mod srt;
pub mod structure;
pub mod style;
pub mod util;
pub mod xhtml;

pub use clip::{Clip, build_clips};
pub use cue::{fragment_id, renumber_placeholders};
pub use error::{Error, ErrorKind, Result};
pub use pipeline::{Composer, ComposerConfig, Composition};
pub use smil::{ClockFormat, OverlayTarget, SmilDocument, assemble, render as render_smil};
pub use srt::render_srt;
pub use style::StyleRule;
pub use xhtml::canonicalize;
