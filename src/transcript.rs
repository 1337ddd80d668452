/*! CHAT transcripts

A [Transcript] is the sequence of lines of a `.cha` file, where main tiers (with their
sub-tiers) are replaced by [MainTier]s and every other line is kept as is.

Rendering a transcript that has not been edited gives back the original text,
byte for byte.
!*/
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::Error;
use crate::grammar::Grammar;
use crate::tier::{LineOutcome, MainTier, ReconciliationStatus, TierState};

#[derive(Debug, Clone)]
pub enum Segment {
    /// A line outside of any main tier, newline included.
    Line(String),
    Tier(MainTier),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Line(line) => write!(f, "{}", line),
            Segment::Tier(tier) => write!(f, "{}", tier),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Transcript {
    path: Option<PathBuf>,
    original: String,
    segments: Vec<Segment>,
}

impl Transcript {
    /// Split `text` into segments and parse every main tier.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut segments = Vec::new();
        let mut tier = MainTier::new();

        for (idx, line) in text.split_inclusive('\n').enumerate() {
            let line_no = idx + 1;
            match tier.consume(line, line_no)? {
                LineOutcome::Consumed => (),
                LineOutcome::Ignored => segments.push(Segment::Line(line.to_string())),
                LineOutcome::Finished => {
                    segments.push(Segment::Tier(tier));
                    // the line may start the next tier
                    tier = MainTier::new();
                    match tier.consume(line, line_no)? {
                        LineOutcome::Ignored => segments.push(Segment::Line(line.to_string())),
                        LineOutcome::Consumed => (),
                        LineOutcome::Finished => {
                            return Err(Error::Precondition(format!(
                                "a new tier finished on its first line ({})",
                                line_no
                            )))
                        }
                    }
                }
            }
        }

        tier.finish();
        if tier.state() != TierState::Empty {
            segments.push(Segment::Tier(tier));
        }

        for segment in segments.iter_mut() {
            if let Segment::Tier(tier) = segment {
                tier.parse()?;
            }
        }

        debug!(
            "{} segments, {} main tiers",
            segments.len(),
            segments
                .iter()
                .filter(|s| matches!(s, Segment::Tier(_)))
                .count()
        );

        Ok(Self {
            path: None,
            original: text.to_string(),
            segments,
        })
    }

    /// Read and parse the file at `path`. Errors carry the path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::from(e).in_file(path.into()))?;
        let mut transcript = Self::parse(&text).map_err(|e| e.in_file(path.into()))?;
        transcript.path = Some(path.to_path_buf());
        Ok(transcript)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn main_tiers(&self) -> impl Iterator<Item = &MainTier> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Tier(tier) => Some(tier),
            Segment::Line(_) => None,
        })
    }

    pub fn main_tiers_mut(&mut self) -> impl Iterator<Item = &mut MainTier> {
        self.segments.iter_mut().filter_map(|segment| match segment {
            Segment::Tier(tier) => Some(tier),
            Segment::Line(_) => None,
        })
    }

    /// Text of the transcript in its current state.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// `true` if rendering gives back the text the transcript was parsed from.
    pub fn no_changes(&self) -> bool {
        self.render() == self.original
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        fs::write(path, self.render())?;
        Ok(())
    }

    /// Categorize sub-tiers, extract the words of `code` and the `%pho:` tokens of every tier.
    ///
    /// Issues are recorded on the tiers (see [MainTier::errors]).
    pub fn process_for_phonetic_transcription(
        &mut self,
        grammar: &Grammar,
        code: &str,
    ) -> Result<(), Error> {
        for tier in self.main_tiers_mut() {
            tier.categorize_subtiers()?;
            tier.extract_words_by_speaker(grammar, code)?;
            tier.extract_phonetic_transcriptions()?;
        }
        Ok(())
    }

    /// Reconcile the `%pho:` sub-tier of every main tier, in order.
    pub fn update_pho(
        &mut self,
        grammar: &Grammar,
        code: &str,
    ) -> Result<Vec<ReconciliationStatus>, Error> {
        self.main_tiers_mut()
            .map(|tier| tier.update_pho(grammar, code))
            .collect()
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Segment, Transcript};
    use crate::error::Error;
    use crate::grammar::DEFAULT_GRAMMAR;
    use crate::tier::ReconciliationStatus;

    const CHA: &str = "@UTF8\n\
@Begin\n\
@Participants:\tCHI Target_Child, MOT Mother\n\
*CHI:\tball &=n_y_CHI_0xabc123 \x15100_200\x15\n\
*MOT:\tdog &=n_y_MOT_0xabc124 \x15300_400\x15\n\
%com:\tpointing\n\
@Bg:\tbook\n\
*CHI:\tcat &=n_y_CHI_0xabc125\n\
\tcar &=n_n_CHI_0xabc126 \x15500_600\x15\n\
%pho:\tkæt ####\n\
@Eg:\tbook\n\
@End\n\
\n";

    #[test]
    fn segments() {
        let t = Transcript::parse(CHA).unwrap();
        let kinds: Vec<bool> = t
            .segments()
            .iter()
            .map(|s| matches!(s, Segment::Tier(_)))
            .collect();
        assert_eq!(
            kinds,
            vec![false, false, false, true, true, false, true, false, false, false]
        );
        assert_eq!(t.main_tiers().count(), 3);
        let lines: Vec<usize> = t.main_tiers().map(|tier| tier.line_no()).collect();
        assert_eq!(lines, vec![4, 5, 8]);
    }

    #[test]
    fn roundtrip() {
        let t = Transcript::parse(CHA).unwrap();
        assert_eq!(t.render(), CHA);
        assert!(t.no_changes());
    }

    #[test]
    fn roundtrip_without_end_marker() {
        let text = "@Begin\n*CHI:\tball &=n_y_CHI_0xabc123 \x15100_200\x15\n%pho:\tbɔl";
        let t = Transcript::parse(text).unwrap();
        assert_eq!(t.main_tiers().count(), 1);
        assert_eq!(t.render(), text);
    }

    #[test]
    fn empty() {
        let t = Transcript::parse("").unwrap();
        assert!(t.segments().is_empty());
        assert_eq!(t.render(), "");
    }

    #[test]
    fn structural_violation() {
        let text = "@Begin\n*CHI:\tball &=n_y_CHI_0xabc123 \x15100_200\x15\nstray text\n@End\n";
        match Transcript::parse(text) {
            Err(Error::UnexpectedLine { line_no, line }) => {
                assert_eq!(line_no, 3);
                assert_eq!(line, "stray text\n");
            }
            other => panic!("expected a structural violation, got {:?}", other),
        }
    }

    #[test]
    fn update() {
        let mut t = Transcript::parse(CHA).unwrap();
        t.process_for_phonetic_transcription(&DEFAULT_GRAMMAR, "CHI")
            .unwrap();
        let statuses = t.update_pho(&DEFAULT_GRAMMAR, "CHI").unwrap();
        assert_eq!(
            statuses,
            vec![
                ReconciliationStatus::PhoSubTierAdded,
                ReconciliationStatus::SpeakerNotInAnnotation,
                ReconciliationStatus::NeedsSomeTranscription,
            ]
        );
        assert!(!t.no_changes());
        assert_eq!(
            t.render(),
            CHA.replace(
                "\x15100_200\x15\n",
                "\x15100_200\x15\n%pho:\t####\n"
            )
        );
    }
}
