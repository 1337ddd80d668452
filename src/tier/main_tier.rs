/*! Main tier state machine

A [MainTier] is fed the lines of a transcript one by one through [MainTier::consume].
It ignores everything until a line starting with `*` shows up, then accumulates
the utterance and its dependent tiers until a boundary line is met.

Tab-led lines are continuations: of the utterance itself as long as no sub-tier has
started, of the last sub-tier afterwards.

Once finished, [MainTier::parse] splits the accumulated lines into a label, content
lines and [SubTier]s.
!*/
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use log::debug;

use crate::error::Error;
use crate::grammar::{ends_with_timestamp, ExtractedWord, Transcription};

use super::status::ReconciliationStatus;
use super::sub_tier::SubTier;
use super::TierError;

/// lowercased prefixes of lines that end a tier without belonging to it.
const BOUNDARY_PREFIXES: [&str; 5] = ["@end", "@bg", "@eg", "@g", "@comment"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierState {
    Empty,
    Accumulating,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Raw,
    Parsed,
}

/// What [MainTier::consume] did with a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// The tier has not started and the line does not start one.
    Ignored,
    /// The line is part of the tier.
    Consumed,
    /// The line is not part of the tier, which is now complete.
    /// The line has to be offered to a new tier.
    Finished,
}

#[derive(Debug, Clone)]
pub struct MainTier {
    state: TierState,
    parse_state: ParseState,
    /// 1-based number of the `*` line.
    line_no: usize,

    raw_content: Vec<String>,
    /// (line number, lines) of each sub-tier, continuation lines included.
    raw_sub_tiers: Vec<(usize, String)>,

    pub(super) label: String,
    pub(super) contents: Vec<String>,
    pub(super) sub_tiers: Vec<SubTier>,

    pub(super) words: HashMap<String, Vec<ExtractedWord>>,
    pub(super) sub_tiers_by_label: Option<BTreeMap<String, Vec<usize>>>,
    pub(super) transcriptions: Option<Vec<Transcription>>,
    pub(super) errors: Vec<TierError>,
    pub(super) status: Option<ReconciliationStatus>,
}

fn is_boundary(line: &str) -> bool {
    if line.starts_with('*') || line.trim().is_empty() {
        return true;
    }
    let line = line.to_lowercase();
    BOUNDARY_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

impl Default for MainTier {
    fn default() -> Self {
        Self::new()
    }
}

impl MainTier {
    pub fn new() -> Self {
        Self {
            state: TierState::Empty,
            parse_state: ParseState::Raw,
            line_no: 0,
            raw_content: Vec::new(),
            raw_sub_tiers: Vec::new(),
            label: String::new(),
            contents: Vec::new(),
            sub_tiers: Vec::new(),
            words: HashMap::new(),
            sub_tiers_by_label: None,
            transcriptions: None,
            errors: Vec::new(),
            status: None,
        }
    }

    /// Offer a line (newline included) to the tier.
    ///
    /// `line_no` is the 1-based position of the line in its file.
    /// Errors if the line can't be classified or if the tier is already finished.
    pub fn consume(&mut self, line: &str, line_no: usize) -> Result<LineOutcome, Error> {
        match self.state {
            TierState::Finished => Err(Error::Precondition(format!(
                "line {} offered to a finished tier",
                line_no
            ))),
            TierState::Empty => {
                if line.starts_with('*') {
                    self.state = TierState::Accumulating;
                    self.line_no = line_no;
                    self.raw_content.push(line.to_string());
                    Ok(LineOutcome::Consumed)
                } else {
                    Ok(LineOutcome::Ignored)
                }
            }
            TierState::Accumulating => {
                if line.starts_with('\t') {
                    match self.raw_sub_tiers.last_mut() {
                        Some((_, sub_tier)) => sub_tier.push_str(line),
                        None => self.raw_content.push(line.to_string()),
                    }
                    Ok(LineOutcome::Consumed)
                } else if line.starts_with('%') {
                    self.raw_sub_tiers.push((line_no, line.to_string()));
                    Ok(LineOutcome::Consumed)
                } else if is_boundary(line) {
                    self.state = TierState::Finished;
                    Ok(LineOutcome::Finished)
                } else {
                    Err(Error::UnexpectedLine {
                        line_no,
                        line: line.to_string(),
                    })
                }
            }
        }
    }

    /// Mark an accumulating tier as finished (end of input).
    pub fn finish(&mut self) {
        if self.state == TierState::Accumulating {
            self.state = TierState::Finished;
        }
    }

    pub fn state(&self) -> TierState {
        self.state
    }

    pub fn parse_state(&self) -> ParseState {
        self.parse_state
    }

    pub fn is_parsed(&self) -> bool {
        self.parse_state == ParseState::Parsed
    }

    pub fn line_no(&self) -> usize {
        self.line_no
    }

    /// Split the accumulated lines into label, contents and sub-tiers.
    ///
    /// Can only be called once.
    pub fn parse(&mut self) -> Result<(), Error> {
        if self.is_parsed() {
            return Err(Error::Precondition(format!(
                "tier at line {} is already parsed",
                self.line_no
            )));
        }

        let mut label = None;
        let mut contents = Vec::with_capacity(self.raw_content.len());
        for (offset, line) in self.raw_content.iter().enumerate() {
            let line_no = self.line_no + offset;
            let (prefix, remainder) = line.split_once('\t').ok_or_else(|| Error::MissingTab {
                line_no,
                line: line.clone(),
            })?;

            match label {
                None => label = Some(prefix.to_string()),
                Some(_) if !prefix.is_empty() => {
                    return Err(Error::LabelInContinuation {
                        line_no,
                        line: line.clone(),
                    })
                }
                Some(_) => (),
            }
            contents.push(remainder.to_string());
        }

        let sub_tiers = self
            .raw_sub_tiers
            .iter()
            .map(|(line_no, line)| SubTier::from_line(line, *line_no))
            .collect::<Result<Vec<_>, _>>()?;

        self.label = label.unwrap_or_default();
        self.contents = contents;
        self.sub_tiers = sub_tiers;
        self.raw_content.clear();
        self.raw_sub_tiers.clear();
        self.parse_state = ParseState::Parsed;
        debug!(
            "parsed tier {} at line {}: {} content lines, {} sub-tiers",
            self.label,
            self.line_no,
            self.contents.len(),
            self.sub_tiers.len()
        );
        Ok(())
    }

    pub(super) fn ensure_parsed(&self, operation: &str) -> Result<(), Error> {
        if self.is_parsed() {
            Ok(())
        } else {
            Err(Error::Precondition(format!(
                "{} on the unparsed tier at line {}",
                operation, self.line_no
            )))
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn contents(&self) -> &[String] {
        &self.contents
    }

    pub fn sub_tiers(&self) -> &[SubTier] {
        &self.sub_tiers
    }

    /// Non-fatal issues found while extracting words and transcriptions.
    pub fn errors(&self) -> &[TierError] {
        &self.errors
    }

    /// Content lines, with manually split annotations joined back.
    ///
    /// Lines that don't end with a timestamp are joined with the following ones
    /// (space separated, newlines stripped) up to the first one that does.
    pub fn collapsed_contents(&self) -> Vec<String> {
        let mut collapsed = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for line in &self.contents {
            pending.push(line.trim_end_matches('\n'));
            if ends_with_timestamp(line) {
                collapsed.push(pending.join(" "));
                pending.clear();
            }
        }
        if !pending.is_empty() {
            collapsed.push(pending.join(" "));
        }
        collapsed
    }
}

impl fmt::Display for MainTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parse_state {
            ParseState::Raw => {
                for line in &self.raw_content {
                    write!(f, "{}", line)?;
                }
                for (_, sub_tier) in &self.raw_sub_tiers {
                    write!(f, "{}", sub_tier)?;
                }
            }
            ParseState::Parsed => {
                for (idx, content) in self.contents.iter().enumerate() {
                    if idx == 0 {
                        write!(f, "{}", self.label)?;
                    }
                    write!(f, "\t{}", content)?;
                }
                for sub_tier in &self.sub_tiers {
                    write!(f, "{}", sub_tier)?;
                }
            }
        }
        Ok(())
    }
}
