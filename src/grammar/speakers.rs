//! Speaker role codes.
//!
//! The list of codes annotators may use grew between revisions of the annotation
//! guidelines, so the set is versioned. A [SpeakerSet] can be extended with
//! additional codes for corpora that use local ones.
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Error;

lazy_static! {
    static ref SPEAKER_CODE: Regex = Regex::new(r"^[A-Z][A-Z0-9]{2}$").unwrap();
}

/// child, mother, father, sibling
const V1_CODES: [&str; 4] = ["CHI", "MOT", "FAT", "SIS"];

/// codes added by the second revision: extended family, audio sources and toys.
const V2_ADDITIONS: [&str; 9] = [
    "BRO", "GRM", "GRF", "AUN", "UNC", "COU", "AUD", "TOY", "BTY",
];

/// Revision of the annotation guidelines a speaker set follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakerVersion {
    V1,
    V2,
}

impl SpeakerVersion {
    pub fn latest() -> Self {
        SpeakerVersion::V2
    }

    fn codes(&self) -> Vec<&'static str> {
        match self {
            SpeakerVersion::V1 => V1_CODES.to_vec(),
            SpeakerVersion::V2 => V1_CODES.iter().chain(V2_ADDITIONS.iter()).copied().collect(),
        }
    }
}

impl FromStr for SpeakerVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "v1" | "1" => Ok(SpeakerVersion::V1),
            "v2" | "2" => Ok(SpeakerVersion::V2),
            other => Err(Error::Custom(format!("unknown speaker set version {:?}", other))),
        }
    }
}

impl fmt::Display for SpeakerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeakerVersion::V1 => write!(f, "v1"),
            SpeakerVersion::V2 => write!(f, "v2"),
        }
    }
}

/// Ordered set of speaker codes recognized by a [super::Grammar].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerSet {
    version: SpeakerVersion,
    codes: Vec<String>,
}

impl SpeakerSet {
    pub fn new(version: SpeakerVersion) -> Self {
        Self {
            version,
            codes: version.codes().into_iter().map(String::from).collect(),
        }
    }

    /// Add a code to the set.
    ///
    /// Codes are three characters: an uppercase letter followed by uppercase letters or digits.
    /// Adding a code that is already present is a no-op.
    pub fn with_code(mut self, code: &str) -> Result<Self, Error> {
        if !SPEAKER_CODE.is_match(code) {
            return Err(Error::InvalidSpeakerCode(code.to_string()));
        }
        if !self.contains(code) {
            self.codes.push(code.to_string());
        }
        Ok(self)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn version(&self) -> SpeakerVersion {
        self.version
    }

    /// regex alternation matching any code of the set.
    pub(super) fn alternation(&self) -> String {
        self.codes
            .iter()
            .map(|code| regex::escape(code))
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl Default for SpeakerSet {
    fn default() -> Self {
        Self::new(SpeakerVersion::latest())
    }
}

#[cfg(test)]
mod tests {
    use super::{SpeakerSet, SpeakerVersion};

    #[test]
    fn versions_grow() {
        let v1 = SpeakerSet::new(SpeakerVersion::V1);
        let v2 = SpeakerSet::new(SpeakerVersion::V2);
        assert_eq!(v1.codes().len(), 4);
        assert!(v1.codes().iter().all(|code| v2.contains(code)));
        assert!(!v1.contains("GRM"));
        assert!(v2.contains("GRM"));
    }

    #[test]
    fn extend() {
        let set = SpeakerSet::new(SpeakerVersion::V1)
            .with_code("NAN")
            .unwrap()
            .with_code("CHI")
            .unwrap();
        assert_eq!(set.codes().len(), 5);
        assert!(set.contains("NAN"));
    }

    #[test]
    fn reject_bad_codes() {
        let set = SpeakerSet::default();
        assert!(set.clone().with_code("nan").is_err());
        assert!(set.clone().with_code("NANA").is_err());
        assert!(set.with_code("1AB").is_err());
    }

    #[test]
    fn parse_version() {
        assert_eq!("V1".parse::<SpeakerVersion>().unwrap(), SpeakerVersion::V1);
        assert_eq!("2".parse::<SpeakerVersion>().unwrap(), SpeakerVersion::V2);
        assert!("v3".parse::<SpeakerVersion>().is_err());
    }
}
