//! Chapter composition: source HTML in, XHTML chapter and Media Overlay out.
//!
//! Stages run in a fixed order over one tree that is re-parsed where a
//! stage works on markup text (hyphenation, canonicalization). Any stage
//! failure aborts the composition; nothing partial is returned.

use tracing::{debug, info};

use crate::clip::{Clip, build_clips};
use crate::cue::{cue_elements, mark_cues};
use crate::dom::{Dom, NodeId, parse_html, serialize};
use crate::error::{Error, Result};
use crate::hyphenate::{Hyphenator, SOFT_HYPHEN, hyphenate_markup};
use crate::links::{fix_images, fix_links};
use crate::ranges::{annotate_ranges, collapse_whitespace};
use crate::smil::{ClockFormat, OverlayTarget, SmilDocument, assemble};
use crate::structure::{inject_title, locate, reject_lists, wrap_in_section};
use crate::style::{erase_background_colors, parse_stylesheet};
use crate::xhtml::canonicalize;

/// Configuration for chapter composition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct ComposerConfig {
    /// Replaces (or creates) the document `<title>`.
    pub title: Option<String>,
    /// Document language; also selects hyphenation patterns.
    pub language: String,
    /// Insert soft hyphens into cue text.
    pub hyphenate: bool,
    /// Preview mode: images keep bare file names and cues, links and
    /// images are annotated with text ranges (and clip times).
    pub raw: bool,
    /// Seconds added to every timestamp.
    pub timing_offset: f64,
    /// Chapter reference written into the overlay.
    pub text_path: String,
    /// Audio reference written into the overlay.
    pub audio_path: String,
    /// Replacement for the export's `images/` folder.
    pub image_prefix: String,
    pub clock: ClockFormat,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            title: None,
            language: "en-US".to_string(),
            hyphenate: true,
            raw: false,
            timing_offset: 0.0,
            text_path: "chapter.xhtml".to_string(),
            audio_path: "../Audio/chapter.mp3".to_string(),
            image_prefix: "../Images/".to_string(),
            clock: ClockFormat::Smil,
        }
    }
}

/// Result of a successful composition.
#[derive(Debug, Clone)]
pub struct Composition {
    /// Canonical XHTML chapter.
    pub xhtml: String,
    /// Fragment ids of the cues, in document order.
    pub cue_ids: Vec<String>,
    /// Text of each cue, whitespace collapsed and soft hyphens removed.
    pub cue_texts: Vec<String>,
    /// Clips built from the timings (empty without timings).
    pub clips: Vec<Clip>,
    /// Overlay, present when timings were supplied.
    pub overlay: Option<SmilDocument>,
}

impl Composition {
    pub fn cue_count(&self) -> usize {
        self.cue_ids.len()
    }
}

/// Chapter composer.
///
/// # Example
///
/// ```
/// use syncbook::Composer;
///
/// let html = r#"<html><head><style>.c1{background-color:#ffff00}</style></head>
/// <body><p><span class="c1">Hello</span> world</p></body></html>"#;
/// let composition = Composer::new().compose(html, Some("0.0 1.5"))?;
/// assert_eq!(composition.cue_ids, vec!["f000001"]);
/// assert!(composition.overlay.is_some());
/// # Ok::<(), syncbook::Error>(())
/// ```
pub struct Composer {
    config: ComposerConfig,
}

impl Composer {
    /// Create a composer with default configuration.
    pub fn new() -> Self {
        Self {
            config: ComposerConfig::default(),
        }
    }

    /// Configure the composer with custom settings.
    pub fn with_config(mut self, config: ComposerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Compose a chapter, and its overlay when `timings` is given.
    pub fn compose(&self, html: &str, timings: Option<&str>) -> Result<Composition> {
        let config = &self.config;
        let mut dom = parse_html(html);

        let landmarks = locate(&dom)?;
        reject_lists(&dom, landmarks.body)?;

        let css = dom.own_text(landmarks.style);
        let rules = parse_stylesheet(&css);
        debug!(rules = rules.len(), "parsed stylesheet");

        let identified = mark_cues(&mut dom, &rules)?.len();
        dom.set_text(landmarks.style, &erase_background_colors(&css));

        if let Some(title) = &config.title {
            inject_title(&mut dom, landmarks.head, title);
        }

        if config.hyphenate
            && let Some(hyphenator) = Hyphenator::for_locale(&config.language)
        {
            let markup = serialize(&dom);
            dom = parse_html(&hyphenate_markup(&dom, &markup, &hyphenator)?);
        }

        // Re-parsing replaced every handle.
        let body = dom.find_by_tag("body").ok_or(Error::MissingBody)?;
        let links = fix_links(&mut dom, body);
        let prefix = if config.raw { "" } else { config.image_prefix.as_str() };
        let images = fix_images(&mut dom, body, prefix).len();
        debug!(links, images, "rewrote links and images");

        wrap_in_section(&mut dom, body, &config.language);
        let mut xhtml = canonicalize(&serialize(&dom));

        let mut chapter = parse_html(&xhtml);
        let cues = cue_elements(&chapter);
        if cues.len() != identified {
            return Err(Error::FragmentCountMismatch {
                identified,
                found: cues.len(),
            });
        }
        let cue_ids: Vec<String> = cues
            .iter()
            .filter_map(|&c| chapter.element_id(c).map(str::to_string))
            .collect();
        let cue_texts: Vec<String> = cues
            .iter()
            .map(|&c| {
                let text = chapter.deep_text(c).replace(SOFT_HYPHEN, "");
                collapse_whitespace(&text).trim().to_string()
            })
            .collect();

        let clips = timings
            .map(|raw| build_clips(raw, config.timing_offset))
            .unwrap_or_default();
        let overlay = match timings {
            Some(_) => {
                let target = OverlayTarget {
                    text_path: config.text_path.clone(),
                    audio_path: config.audio_path.clone(),
                };
                Some(assemble(&clips, &cue_ids, &target, config.clock)?)
            }
            None => None,
        };

        if config.raw {
            if timings.is_some() {
                annotate_clips(&mut chapter, &cues, &clips);
            }
            annotate_ranges(&mut chapter)?;
            xhtml = canonicalize(&serialize(&chapter));
        }

        info!(
            cues = cue_ids.len(),
            clips = clips.len(),
            raw = config.raw,
            "composed chapter"
        );
        Ok(Composition {
            xhtml,
            cue_ids,
            cue_texts,
            clips,
            overlay,
        })
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

/// Write clip boundaries, in seconds, onto the cues they narrate.
fn annotate_clips(dom: &mut Dom, cues: &[NodeId], clips: &[Clip]) {
    for (&cue, clip) in cues.iter().zip(clips) {
        dom.set_attr(cue, "clipBegin", &format!("{:.3}", clip.begin));
        dom.set_attr(cue, "clipEnd", &format!("{:.3}", clip.end));
    }
}
