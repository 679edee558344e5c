//! Media Overlay (SMIL 3.0) rendering.
//!
//! The overlay and the chapter are only valid together when clip `n`
//! points at cue `n`: [`assemble`] refuses to render when the clip list and
//! the cue ids disagree in length or order.

use quick_xml::escape::escape;
use tracing::debug;

use crate::clip::Clip;
use crate::error::{Error, Result};
use crate::structure::{CHAPTER_TYPE, OPS_NAMESPACE};

pub const SMIL_NAMESPACE: &str = "http://www.w3.org/ns/SMIL";

/// How clip boundaries are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "lowercase"))]
pub enum ClockFormat {
    /// Clock value `H:MM:SS.mmm`.
    #[default]
    Smil,
    /// Seconds with three decimals.
    Seconds,
}

impl ClockFormat {
    pub fn format(self, seconds: f64) -> String {
        match self {
            ClockFormat::Smil => clock_value(seconds),
            ClockFormat::Seconds => format!("{seconds:.3}"),
        }
    }
}

/// Split non-negative seconds into `(hours, minutes, seconds, millis)`.
pub(crate) fn clock_parts(seconds: f64) -> (u64, u64, u64, u64) {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;
    (total_s / 3600, (total_s / 60) % 60, total_s % 60, ms)
}

/// Format seconds as a SMIL clock value, `H:MM:SS.mmm`.
pub fn clock_value(seconds: f64) -> String {
    let (h, m, s, ms) = clock_parts(seconds);
    format!("{h}:{m:02}:{s:02}.{ms:03}")
}

/// Resource references of an overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayTarget {
    /// Chapter document, relative to the overlay.
    pub text_path: String,
    /// Narration audio, relative to the overlay.
    pub audio_path: String,
}

/// Rendered overlay with its clip count.
#[derive(Debug, Clone, PartialEq)]
pub struct SmilDocument {
    pub markup: String,
    pub clip_count: usize,
}

/// Render an overlay for `clips` without checking it against a chapter.
pub fn render(clips: &[Clip], target: &OverlayTarget, clock: ClockFormat) -> SmilDocument {
    let text = escape(target.text_path.as_str());
    let audio = escape(target.audio_path.as_str());

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n");
    out.push_str(&format!(
        "<smil version=\"3.0\" xmlns=\"{SMIL_NAMESPACE}\" xmlns:epub=\"{OPS_NAMESPACE}\">\n"
    ));
    out.push_str("<body>\n");
    out.push_str(&format!(
        "<seq epub:textref=\"{text}\" epub:type=\"{CHAPTER_TYPE}\" id=\"seq1\">\n"
    ));

    for clip in clips {
        out.push_str(&format!(
            "<par id=\"{}\"><text src=\"{text}#{}\"/>\n",
            clip.par_id(),
            clip.fragment_id()
        ));
        out.push_str(&format!(
            "<audio clipBegin=\"{}\" clipEnd=\"{}\" src=\"{audio}\"/>\n",
            clock.format(clip.begin),
            clock.format(clip.end)
        ));
        out.push_str("</par>\n");
    }

    out.push_str("</seq>\n</body>\n</smil>\n");
    SmilDocument {
        markup: out,
        clip_count: clips.len(),
    }
}

/// Check that clip `n` narrates cue `n` for every `n`.
pub fn check_alignment<S: AsRef<str>>(clips: &[Clip], cue_ids: &[S]) -> Result<()> {
    if clips.len() != cue_ids.len() {
        return Err(Error::ClipCountMismatch {
            clips: clips.len(),
            cues: cue_ids.len(),
        });
    }
    for (index, (clip, cue)) in clips.iter().zip(cue_ids).enumerate() {
        let expected = clip.fragment_id();
        if cue.as_ref() != expected {
            return Err(Error::CueIdMismatch {
                index,
                expected,
                found: cue.as_ref().to_string(),
            });
        }
    }
    Ok(())
}

/// Render the overlay for a chapter whose cues carry `cue_ids`, in
/// document order.
pub fn assemble<S: AsRef<str>>(
    clips: &[Clip],
    cue_ids: &[S],
    target: &OverlayTarget,
    clock: ClockFormat,
) -> Result<SmilDocument> {
    check_alignment(clips, cue_ids)?;
    let document = render(clips, target, clock);
    debug!(pars = document.clip_count, "assembled media overlay");
    Ok(document)
}
