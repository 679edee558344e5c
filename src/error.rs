//! Error types for syncbook operations.

use thiserror::Error;

/// Coarse classification of a failure, used by callers that only need to
/// decide how to present it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input markup lacks a structural element the pipeline needs.
    Precondition,
    /// Tree surgery met a shape it cannot handle.
    StructuralAssumptionViolated,
    /// The input contains markup that is rejected outright.
    UnsupportedInput,
    /// Text, cue or clip streams drifted out of alignment.
    TextSyncMismatch,
    /// Reading or writing files failed.
    Io,
}

/// Errors that can occur while composing a synchronized chapter.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("head is missing")]
    MissingHead,

    #[error("style is missing")]
    MissingStyle,

    #[error("body is missing")]
    MissingBody,

    #[error("parent missing for <{0}>")]
    OrphanElement(String),

    #[error("no matching children found under common parent")]
    NoMatchingChildren,

    #[error("common ancestor search exceeded {0} levels")]
    AncestorSearchExhausted(usize),

    #[error("unsupported input: <{0}> elements are not supported")]
    UnsupportedInput(String),

    #[error("{context} text not found: {text:?}")]
    TextNotFound { context: &'static str, text: String },

    #[error("xhtml output spans count ({cues}) != timing output pars count ({clips})")]
    ClipCountMismatch { clips: usize, cues: usize },

    #[error("cue {index} has id {found:?}, expected {expected:?}")]
    CueIdMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("identified {identified} fragments but output contains {found} cue elements")]
    FragmentCountMismatch { identified: usize, found: usize },
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::MissingHead | Error::MissingStyle | Error::MissingBody => {
                ErrorKind::Precondition
            }
            Error::OrphanElement(_)
            | Error::NoMatchingChildren
            | Error::AncestorSearchExhausted(_) => ErrorKind::StructuralAssumptionViolated,
            Error::UnsupportedInput(_) => ErrorKind::UnsupportedInput,
            Error::TextNotFound { .. }
            | Error::ClipCountMismatch { .. }
            | Error::CueIdMismatch { .. }
            | Error::FragmentCountMismatch { .. } => ErrorKind::TextSyncMismatch,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Error::MissingStyle.kind(), ErrorKind::Precondition);
        assert_eq!(
            Error::OrphanElement("span".into()).kind(),
            ErrorKind::StructuralAssumptionViolated
        );
        assert_eq!(
            Error::UnsupportedInput("ul".into()).kind(),
            ErrorKind::UnsupportedInput
        );
        assert_eq!(
            Error::ClipCountMismatch { clips: 2, cues: 3 }.kind(),
            ErrorKind::TextSyncMismatch
        );
    }

    #[test]
    fn test_count_mismatch_message() {
        let err = Error::ClipCountMismatch { clips: 2, cues: 3 };
        assert_eq!(
            err.to_string(),
            "xhtml output spans count (3) != timing output pars count (2)"
        );
    }
}
