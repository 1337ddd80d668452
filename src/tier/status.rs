//! Outcome of the `%pho:` reconciliation of a main tier.
use std::fmt;

/// What happened to the placeholders of a not-yet-transcribed `%pho:` sub-tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderChange {
    Added,
    Removed,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReconciliationStatus {
    /// No annotation in the tier is attributed to the speaker.
    SpeakerNotInAnnotation,
    /// The speaker marker is there but no word could be extracted.
    NoWordsExtracted,
    /// A `%pho:` sub-tier full of placeholders was prepended.
    PhoSubTierAdded,
    /// Nothing is transcribed yet; placeholders now match the words.
    NeedsTranscription(PlaceholderChange),
    MoreTranscriptionsThanWords,
    /// Some words were transcribed but not all, and which ones is unknown.
    FewerTranscriptionsThanWords,
    NeedsSomeTranscription,
    AllTranscribed,
    MultiplePhoSubTiers,
}

impl ReconciliationStatus {
    /// Stable identifier, used in reports.
    pub fn key(&self) -> &'static str {
        use ReconciliationStatus::*;
        match self {
            SpeakerNotInAnnotation => "speaker_not_in_annotation",
            NoWordsExtracted => "no_words_extracted",
            PhoSubTierAdded => "pho_subtier_added",
            NeedsTranscription(PlaceholderChange::Added) => "placeholders_added",
            NeedsTranscription(PlaceholderChange::Removed) => "placeholders_removed",
            NeedsTranscription(PlaceholderChange::Unchanged) => "needs_transcription",
            MoreTranscriptionsThanWords => "more_transcriptions_than_words",
            FewerTranscriptionsThanWords => "fewer_transcriptions_than_words",
            NeedsSomeTranscription => "needs_some_transcription",
            AllTranscribed => "all_transcribed",
            MultiplePhoSubTiers => "multiple_pho_subtiers",
        }
    }

    pub fn message(&self) -> &'static str {
        use ReconciliationStatus::*;
        match self {
            SpeakerNotInAnnotation => "speaker not in annotation",
            NoWordsExtracted => "error: no words extracted",
            PhoSubTierAdded => "pho subtier added",
            NeedsTranscription(PlaceholderChange::Added) => "placeholders added, needs transcription",
            NeedsTranscription(PlaceholderChange::Removed) => {
                "placeholders removed, needs transcription"
            }
            NeedsTranscription(PlaceholderChange::Unchanged) => "needs transcription",
            MoreTranscriptionsThanWords => "error: more transcriptions than there are words",
            FewerTranscriptionsThanWords => {
                "error: fewer transcriptions than there are words, order unknown, sort manually"
            }
            NeedsSomeTranscription => "needs some transcription",
            AllTranscribed => "all transcribed",
            MultiplePhoSubTiers => "error: more than one pho subtier",
        }
    }

    /// Statuses that need a human to look at the tier.
    pub fn is_error(&self) -> bool {
        use ReconciliationStatus::*;
        matches!(
            self,
            NoWordsExtracted
                | MoreTranscriptionsThanWords
                | FewerTranscriptionsThanWords
                | MultiplePhoSubTiers
        )
    }

    /// Statuses for which the `%pho:` sub-tier may have been rewritten or added.
    pub fn touches_pho(&self) -> bool {
        matches!(
            self,
            ReconciliationStatus::PhoSubTierAdded | ReconciliationStatus::NeedsTranscription(_)
        )
    }
}

impl fmt::Display for ReconciliationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
