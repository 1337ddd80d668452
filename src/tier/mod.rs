/*! Tiers

A main tier is a speaker utterance (`*CHI:`, `*MOT:`, ...) with the dependent tiers
(`%pho:`, `%com:`, ...) that follow it.

- [MainTier] accumulates and parses the lines of a tier,
- [SubTier] holds one dependent tier,
- the extraction methods of [MainTier] find annotated words and phonetic
  transcriptions and reconcile them, producing a [ReconciliationStatus].
!*/
mod extraction;
mod main_tier;
mod status;
mod sub_tier;

use std::fmt;

pub use main_tier::{LineOutcome, MainTier, ParseState, TierState};
pub use status::{PlaceholderChange, ReconciliationStatus};
pub use sub_tier::SubTier;

/// Non-fatal issue recorded on a tier during extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierError {
    /// A (collapsed) content line that does not follow the annotation grammar.
    ContentMismatch { line: String },
    /// The speaker marker is present but no word was attributed to the speaker.
    NoWordsForSpeaker { code: String },
    MalformedTranscription { token: String },
    MultiplePhoSubTiers { count: usize },
}

impl fmt::Display for TierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierError::ContentMismatch { line } => {
                write!(f, "content does not match the annotation pattern: {:?}", line)
            }
            TierError::NoWordsForSpeaker { code } => write!(
                f,
                "{} marker present but no words were attributed to {}",
                code, code
            ),
            TierError::MalformedTranscription { token } => {
                write!(f, "malformed transcription: {:?}", token)
            }
            TierError::MultiplePhoSubTiers { count } => {
                write!(f, "{} pho subtiers found, expected at most one", count)
            }
        }
    }
}
