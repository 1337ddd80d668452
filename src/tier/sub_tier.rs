//! Dependent tiers (`%pho:`, `%com:`, ...).
use std::fmt;

use crate::error::Error;
use crate::grammar::PHO_LABEL;

/// A dependent tier line, split into its label and the text following the tab.
///
/// `contents` keeps the trailing newline and any continuation lines,
/// so that rendering gives back the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubTier {
    label: String,
    contents: String,
}

impl SubTier {
    /// Build from a raw dependent line (continuation lines included).
    ///
    /// `line_no` is only used for error reporting.
    pub fn from_line(line: &str, line_no: usize) -> Result<Self, Error> {
        match line.split_once('\t') {
            Some((label, contents)) => Ok(Self {
                label: label.to_string(),
                contents: contents.to_string(),
            }),
            None => Err(Error::MissingTab {
                line_no,
                line: line.to_string(),
            }),
        }
    }

    /// New `%pho:` sub-tier holding `tokens`.
    pub fn pho<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut sub_tier = Self {
            label: PHO_LABEL.to_string(),
            contents: String::new(),
        };
        sub_tier.set_tokens(tokens);
        sub_tier
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Replace contents by space-joined `tokens` and a newline.
    pub fn set_tokens<S: AsRef<str>>(&mut self, tokens: &[S]) {
        let tokens: Vec<&str> = tokens.iter().map(|t| t.as_ref()).collect();
        self.contents = format!("{}\n", tokens.join(" "));
    }
}

impl fmt::Display for SubTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.label, self.contents)
    }
}
