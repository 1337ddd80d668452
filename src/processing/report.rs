/*! Reports

One [ReportRow] per main tier, written out as csv (the default) or as JSON lines.
!*/
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde::Serialize;

use crate::error::Error;
use crate::tier::{MainTier, ReconciliationStatus};

/// Status key used for files that could not be processed.
pub const FILE_ERROR: &str = "file_error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub path: PathBuf,
    pub line: usize,
    pub label: String,
    pub status: String,
    pub message: String,
    pub nb_words: usize,
    pub words: String,
    pub errors: String,
}

impl ReportRow {
    /// Row describing the outcome of a reconciliation on `tier`.
    pub fn from_tier(path: &Path, tier: &MainTier, code: &str) -> Self {
        let words = tier.words_uttered_by(code).unwrap_or_default();
        let (status, message) = tier
            .status()
            .map_or(("", ""), |status| (status.key(), status.message()));

        Self {
            path: path.to_path_buf(),
            line: tier.line_no(),
            label: tier.label().to_string(),
            status: status.to_string(),
            message: message.to_string(),
            nb_words: words.len(),
            words: words.iter().map(|w| w.word.as_str()).join(" "),
            errors: tier.errors().iter().join("; "),
        }
    }

    /// Row for a file that failed as a whole.
    pub fn from_error(path: &Path, error: &Error) -> Self {
        Self {
            path: path.to_path_buf(),
            line: 0,
            label: String::new(),
            status: FILE_ERROR.to_string(),
            message: error.to_string(),
            nb_words: 0,
            words: String::new(),
            errors: String::new(),
        }
    }

    /// `false` for tiers the speaker does not appear in and that have no recorded issue.
    pub fn is_relevant(&self) -> bool {
        self.status != ReconciliationStatus::SpeakerNotInAnnotation.key()
            || !self.errors.is_empty()
    }
}

pub fn write_csv<P: AsRef<Path>>(rows: &[ReportRow], dst: P) -> Result<(), Error> {
    let mut out = csv::WriterBuilder::new().from_path(dst)?;
    for row in rows {
        out.serialize(row)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_json_lines<P: AsRef<Path>>(rows: &[ReportRow], dst: P) -> Result<(), Error> {
    let mut out = BufWriter::new(File::create(dst)?);
    for row in rows {
        serde_json::to_writer(&mut out, row)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Number of rows per status key.
pub fn summarize(rows: &[ReportRow]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(row.status.as_str()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{summarize, write_csv, write_json_lines, ReportRow, FILE_ERROR};
    use crate::error::Error;
    use crate::grammar::DEFAULT_GRAMMAR;
    use crate::transcript::Transcript;

    fn rows() -> Vec<ReportRow> {
        let mut t = Transcript::parse(
            "*CHI:\tball &=n_y_CHI_0xabc123 cat &=n_y_CHI_0xabc124 \x15100_200\x15\n\
             *MOT:\tdog &=n_y_MOT_0xabc125 \x15300_400\x15\n",
        )
        .unwrap();
        t.update_pho(&DEFAULT_GRAMMAR, "CHI").unwrap();
        t.main_tiers()
            .map(|tier| ReportRow::from_tier(Path::new("a.cha"), tier, "CHI"))
            .collect()
    }

    #[test]
    fn from_tier() {
        let rows = rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 1);
        assert_eq!(rows[0].label, "*CHI:");
        assert_eq!(rows[0].status, "pho_subtier_added");
        assert_eq!(rows[0].nb_words, 2);
        assert_eq!(rows[0].words, "ball cat");
        assert!(rows[0].is_relevant());
        assert_eq!(rows[1].status, "speaker_not_in_annotation");
        assert!(!rows[1].is_relevant());
    }

    #[test]
    fn from_error() {
        let row = ReportRow::from_error(Path::new("b.cha"), &Error::Custom("boom".to_string()));
        assert_eq!(row.status, FILE_ERROR);
        assert_eq!(row.message, "boom");
    }

    #[test]
    fn summary() {
        let mut rows = rows();
        rows.push(rows[0].clone());
        let counts = summarize(&rows);
        assert_eq!(counts["pho_subtier_added"], 2);
        assert_eq!(counts["speaker_not_in_annotation"], 1);
    }

    #[test]
    fn writers() {
        let dir = tempfile::tempdir().unwrap();
        let rows = rows();

        let csv_path = dir.path().join("report.csv");
        write_csv(&rows, &csv_path).unwrap();
        let csv = std::fs::read_to_string(csv_path).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "path,line,label,status,message,nb_words,words,errors"
        );
        assert_eq!(lines.count(), 2);

        let json_path = dir.path().join("report.jsonl");
        write_json_lines(&rows, &json_path).unwrap();
        let json = std::fs::read_to_string(json_path).unwrap();
        let first: serde_json::Value = serde_json::from_str(json.lines().next().unwrap()).unwrap();
        assert_eq!(first["words"], "ball cat");
        assert_eq!(first["nb_words"], 2);
    }
}
