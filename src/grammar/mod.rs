/*! Annotation grammar

Patterns describing how annotations are written inside main tier content, and how
phonetic transcriptions are written inside `%pho:` sub-tiers.

A main tier content line looks like
```text
ball &=n_y_CHI_0xabc123 dog &=n_n_MOT_0x00ff00 &=vocalization \x15100_200\x15
```
that is, a run of annotations (`<word> &=<category>_<yes/no>_<speaker>_0x<hex>`),
an optional LENA filler, stray `0`/`.` markers, then a timestamp delimited by `\x15`.

The speaker codes accepted by a [Grammar] come from a [SpeakerSet].
!*/
mod speakers;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Error;

pub use speakers::{SpeakerSet, SpeakerVersion};

/// Token standing for a word that has not been transcribed yet.
pub const PLACEHOLDER: &str = "####";

/// Label of the phonetic transcription sub-tier.
pub const PHO_LABEL: &str = "%pho:";

const WORD: &str = r"[\w+]+";
const CATEGORY: &str = "[sdnyi]";
const YES_NO: &str = "[ny]";
const HEX: &str = "(?i:[0-9a-f]{6})";
const LENA_ANNOTATION: &str = r"(?:0|&=(?:w\d+(?:_\d+)?|vocalization|crying|vfx))";
const TIMESTAMP: &str = r"\x15\d+_\d+\x15";

lazy_static! {
    static ref ENDS_WITH_TIMESTAMP: Regex = Regex::new(&format!("{}$", TIMESTAMP)).unwrap();
    static ref TRANSCRIPTION: Regex = Regex::new(r"^[\p{L}?&'36:.+]+$").unwrap();

    /// Grammar built on the latest [SpeakerSet].
    pub static ref DEFAULT_GRAMMAR: Grammar =
        Grammar::new(SpeakerSet::default()).expect("default grammar patterns are valid");
}

/// A word attributed to a speaker by an annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedWord {
    pub word: String,
    pub speaker: String,
}

impl ExtractedWord {
    pub fn new(word: &str, speaker: &str) -> Self {
        Self {
            word: word.to_string(),
            speaker: speaker.to_string(),
        }
    }
}

/// Classification of a single `%pho:` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Transcribed,
    Placeholder,
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcription {
    pub token: String,
    pub kind: TokenKind,
}

impl Transcription {
    pub fn is_placeholder(&self) -> bool {
        self.kind == TokenKind::Placeholder
    }
}

/// Compiled annotation patterns for a given speaker set.
#[derive(Debug)]
pub struct Grammar {
    speakers: SpeakerSet,
    annotation: Regex,
    main_tier_content: Regex,
}

impl Grammar {
    pub fn new(speakers: SpeakerSet) -> Result<Self, Error> {
        let alternation = speakers.alternation();

        let annotation = format!(
            r"(?P<word>{}) &={}_{}_(?P<speaker>{})_0x{}",
            WORD, CATEGORY, YES_NO, alternation, HEX
        );
        let annotation_bare = format!(
            r"{} &={}_{}_(?:{})_0x{}",
            WORD, CATEGORY, YES_NO, alternation, HEX
        );

        // annotations, then at most one filler, stray zero and dot, then the timestamp.
        let main_tier_content = format!(
            r"^(?P<annotations>(?:{} +)*)(?:{} +)?(?:0 )?(?:\. )?{}$",
            annotation_bare, LENA_ANNOTATION, TIMESTAMP
        );

        Ok(Self {
            speakers,
            annotation: Regex::new(&annotation)?,
            main_tier_content: Regex::new(&main_tier_content)?,
        })
    }

    pub fn speakers(&self) -> &SpeakerSet {
        &self.speakers
    }

    /// Extract the annotated words of a (collapsed) content line, in order.
    ///
    /// Returns [None] if the line does not follow the main tier content shape.
    /// A trailing newline is ignored.
    pub fn extract_annotations(&self, line: &str) -> Option<Vec<ExtractedWord>> {
        let line = line.trim_end_matches('\n');
        let captures = self.main_tier_content.captures(line)?;
        let annotations = captures.name("annotations").map_or("", |m| m.as_str());

        Some(
            self.annotation
                .captures_iter(annotations)
                .map(|c| ExtractedWord::new(&c["word"], &c["speaker"]))
                .collect(),
        )
    }
}

/// `true` if the line (trailing newline excluded) ends with a timestamp.
///
/// Lines that don't are the first parts of manually split annotations.
pub fn ends_with_timestamp(line: &str) -> bool {
    ENDS_WITH_TIMESTAMP.is_match(line.trim_end_matches('\n'))
}

/// The substring that annotations by `code` necessarily contain.
pub fn speaker_marker(code: &str) -> String {
    format!("_{}_", code)
}

pub fn mentions_speaker(text: &str, code: &str) -> bool {
    text.contains(&speaker_marker(code))
}

pub fn classify_transcription(token: &str) -> TokenKind {
    if token == PLACEHOLDER {
        TokenKind::Placeholder
    } else if TRANSCRIPTION.is_match(token) {
        TokenKind::Transcribed
    } else {
        TokenKind::Malformed
    }
}

/// Split `%pho:` contents on whitespace and classify each token.
pub fn split_transcriptions(contents: &str) -> Vec<Transcription> {
    contents
        .split_whitespace()
        .map(|token| Transcription {
            token: token.to_string(),
            kind: classify_transcription(token),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_annotation() {
        let words = DEFAULT_GRAMMAR
            .extract_annotations("ball &=n_y_CHI_0xabc123 \x15100_200\x15\n")
            .unwrap();
        assert_eq!(words, vec![ExtractedWord::new("ball", "CHI")]);
    }

    #[test]
    fn several_annotations_and_a_filler() {
        let line = "ball &=n_y_CHI_0xabc123 dog &=d_n_MOT_0xABC456  \
                    &=w3_12 0 . \x15100_200\x15";
        let words = DEFAULT_GRAMMAR.extract_annotations(line).unwrap();
        assert_eq!(
            words,
            vec![ExtractedWord::new("ball", "CHI"), ExtractedWord::new("dog", "MOT")]
        );
    }

    #[test]
    fn at_most_one_filler() {
        let line = "ball &=n_y_CHI_0xabc123 &=vocalization &=w3_12 \x15100_200\x15";
        assert!(DEFAULT_GRAMMAR.extract_annotations(line).is_none());
        let line = "ball &=n_y_CHI_0xabc123 &=vocalization \x15100_200\x15";
        assert_eq!(DEFAULT_GRAMMAR.extract_annotations(line).unwrap().len(), 1);
    }

    #[test]
    fn only_timestamp() {
        let words = DEFAULT_GRAMMAR
            .extract_annotations("0 . \x15100_200\x15")
            .unwrap();
        assert!(words.is_empty());
    }

    #[test]
    fn mismatches() {
        // no timestamp
        assert!(DEFAULT_GRAMMAR
            .extract_annotations("ball &=n_y_CHI_0xabc123")
            .is_none());
        // unknown category
        assert!(DEFAULT_GRAMMAR
            .extract_annotations("ball &=q_y_CHI_0xabc123 \x15100_200\x15")
            .is_none());
        // stray token
        assert!(DEFAULT_GRAMMAR
            .extract_annotations("bug &=n_n_CHI_0x227315 &CV &=w9_66 . \x151057910_1060130\x15")
            .is_none());
        // not a hex suffix
        assert!(DEFAULT_GRAMMAR
            .extract_annotations("ball &=n_y_CHI_0xabcxyz \x15100_200\x15")
            .is_none());
    }

    #[test]
    fn speaker_set_restricts() {
        let v1 = Grammar::new(SpeakerSet::new(SpeakerVersion::V1)).unwrap();
        let line = "nana &=n_y_GRM_0xabc123 \x15100_200\x15";
        assert!(v1.extract_annotations(line).is_none());
        assert_eq!(
            DEFAULT_GRAMMAR.extract_annotations(line).unwrap(),
            vec![ExtractedWord::new("nana", "GRM")]
        );

        let extended = Grammar::new(
            SpeakerSet::new(SpeakerVersion::V1).with_code("GRM").unwrap(),
        )
        .unwrap();
        assert!(extended.extract_annotations(line).is_some());
    }

    #[test]
    fn timestamps() {
        assert!(ends_with_timestamp("ball &=n_y_CHI_0xabc123 \x15100_200\x15\n"));
        assert!(!ends_with_timestamp("ball &=n_y_CHI_0xabc123\n"));
        assert!(!ends_with_timestamp("\x15100_200\x15 ball\n"));
    }

    #[test]
    fn transcription_tokens() {
        assert_eq!(classify_transcription("####"), TokenKind::Placeholder);
        assert_eq!(classify_transcription("bɔl"), TokenKind::Transcribed);
        assert_eq!(classify_transcription("ba:l'3"), TokenKind::Transcribed);
        assert_eq!(classify_transcription("###"), TokenKind::Malformed);
        assert_eq!(classify_transcription("ba1l"), TokenKind::Malformed);

        let tokens = split_transcriptions("bɔl ####  ba1\n");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Transcribed, TokenKind::Placeholder, TokenKind::Malformed]
        );
    }

    #[test]
    fn marker() {
        assert!(mentions_speaker("ball &=n_y_CHI_0xabc123", "CHI"));
        assert!(!mentions_speaker("*CHI:\t0 \x15100_200\x15", "CHI"));
    }
}
