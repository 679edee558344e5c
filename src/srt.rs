//! SubRip captions for a clip list.

use crate::clip::Clip;
use crate::smil::clock_parts;

/// Format seconds as an SRT timestamp, `HH:MM:SS,mmm`.
pub fn srt_timestamp(seconds: f64) -> String {
    let (h, m, s, ms) = clock_parts(seconds);
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}

/// Render one caption per clip, numbered from 1.
///
/// Caption `n` is `captions[n - 1]` when present and non-empty, otherwise
/// the placeholder `Caption text n`.
pub fn render_srt(clips: &[Clip], captions: Option<&[String]>) -> String {
    let mut out = String::new();
    for clip in clips {
        let caption = captions
            .and_then(|c| c.get(clip.id - 1))
            .map(|c| c.trim())
            .filter(|c| !c.is_empty());
        out.push_str(&format!("{}\n", clip.id));
        out.push_str(&format!(
            "{} --> {}\n",
            srt_timestamp(clip.begin),
            srt_timestamp(clip.end)
        ));
        match caption {
            Some(text) => out.push_str(text),
            None => out.push_str(&format!("Caption text {}", clip.id)),
        }
        out.push_str("\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::build_clips;

    #[test]
    fn test_timestamp() {
        assert_eq!(srt_timestamp(0.0), "00:00:00,000");
        assert_eq!(srt_timestamp(3661.5), "01:01:01,500");
    }

    #[test]
    fn test_placeholder_captions() {
        let srt = render_srt(&build_clips("1.0 2.5", 0.0), None);
        assert_eq!(
            srt,
            "1\n00:00:00,000 --> 00:00:01,000\nCaption text 1\n\n2\n00:00:01,000 --> 00:00:02,500\nCaption text 2\n\n"
        );
    }

    #[test]
    fn test_cue_text_captions() {
        let captions = vec!["  First line ".to_string()];
        let srt = render_srt(&build_clips("1.0 2.5", 0.0), Some(captions.as_slice()));
        assert!(srt.contains("\nFirst line\n\n2\n"));
        assert!(srt.contains("Caption text 2"));
    }
}
