//! Narration clips built from a label export.
//!
//! Every timestamp found in the export becomes a clip boundary: the values
//! are deduplicated, an implicit `0` is added, the list is sorted and
//! shifted by the global offset, and consecutive boundaries form clips. Clip
//! `n` narrates cue `n`, so ids use the fragment id numbering.

use tracing::{debug, warn};

/// One narration window, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clip {
    /// 1-based position, equal to the narrated cue's position.
    pub id: usize,
    pub begin: f64,
    pub end: f64,
}

impl Clip {
    /// Id of the text fragment this clip narrates (`f000001`, ...).
    pub fn fragment_id(&self) -> String {
        format!("f{:06}", self.id)
    }

    /// Id of the overlay `<par>` element (`p000001`, ...).
    pub fn par_id(&self) -> String {
        format!("p{:06}", self.id)
    }

    pub fn duration(&self) -> f64 {
        self.end - self.begin
    }
}

/// Parse the numeric pairs of a label export.
///
/// A line contributes its first two whitespace-separated tokens when both
/// are finite numbers; anything else on the line, and any other line, is
/// ignored.
pub fn parse_timestamps(raw: &str) -> Vec<f64> {
    let mut values = Vec::new();
    for line in raw.lines() {
        let mut tokens = line.split_whitespace();
        let (Some(begin), Some(end)) = (tokens.next(), tokens.next()) else {
            continue;
        };
        if let (Ok(begin), Ok(end)) = (begin.parse::<f64>(), end.parse::<f64>()) {
            if begin.is_finite() && end.is_finite() {
                values.push(begin);
                values.push(end);
            }
        }
    }
    values
}

/// Deduplicate, add the implicit zero, sort and apply `offset`.
///
/// With a non-zero offset every value is shifted and floored at zero.
pub fn boundaries(mut values: Vec<f64>, offset: f64) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values.dedup();
    // -0.0 and 0.0 compare equal; either counts as the zero boundary.
    if !values.iter().any(|&v| v == 0.0) {
        values.push(0.0);
        values.sort_by(f64::total_cmp);
    }

    if offset != 0.0 && offset.is_finite() {
        for value in &mut values {
            *value = (*value + offset).max(0.0);
        }
    }
    values
}

/// Pair consecutive boundaries into clips.
pub fn clips_from_boundaries(boundaries: &[f64]) -> Vec<Clip> {
    boundaries
        .windows(2)
        .enumerate()
        .map(|(index, pair)| Clip {
            id: index + 1,
            begin: pair[0],
            end: pair[1],
        })
        .collect()
}

/// Build the clip list for a label export.
pub fn build_clips(raw: &str, offset: f64) -> Vec<Clip> {
    let values = parse_timestamps(raw);
    let boundaries = boundaries(values, offset);
    let clips = clips_from_boundaries(&boundaries);

    let empty = clips.iter().filter(|c| c.duration() <= 0.0).count();
    if empty > 0 {
        warn!(count = empty, offset, "offset collapsed clips to zero length");
    }
    debug!(boundaries = boundaries.len(), clips = clips.len(), "built clips");
    clips
}
