/*! Batch processing

Every transcript is processed independently, in parallel (one rayon task per file).
A file that fails (structural violation, io error...) is logged and reported, and does
not stop the others.
!*/
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use itertools::Itertools;
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::error::Error;
use crate::grammar::{Grammar, SpeakerSet};
use crate::transcript::Transcript;

use super::report::{self, ReportRow};

/// Where modified transcripts go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// Nothing is written.
    DryRun,
    InPlace,
    /// Modified files are written in this directory, keeping their path relative to the
    /// deepest folder holding all the processed files.
    Dir(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    JsonLines,
}

/// Parameters of a `%pho:` reconciliation run.
#[derive(Debug, Clone)]
pub struct PhoConfig {
    speaker: String,
    speakers: SpeakerSet,
    output: OutputMode,
    report: Option<(PathBuf, ReportFormat)>,
}

impl PhoConfig {
    /// Fails if `speaker` is not part of `speakers`.
    pub fn new(speaker: &str, speakers: SpeakerSet, output: OutputMode) -> Result<Self, Error> {
        if !speakers.contains(speaker) {
            return Err(Error::InvalidSpeakerCode(format!(
                "{} is not a {} speaker code",
                speaker,
                speakers.version()
            )));
        }
        Ok(Self {
            speaker: speaker.to_string(),
            speakers,
            output,
            report: None,
        })
    }

    pub fn with_report(mut self, dst: PathBuf, format: ReportFormat) -> Self {
        self.report = Some((dst, format));
        self
    }

    pub fn speaker(&self) -> &str {
        &self.speaker
    }

    pub fn speakers(&self) -> &SpeakerSet {
        &self.speakers
    }

    pub fn output(&self) -> &OutputMode {
        &self.output
    }
}

/// Result of the processing of a single transcript.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    /// `true` if the transcript differs from the file it was read from.
    pub changed: bool,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub nb_files: usize,
    pub nb_changed: usize,
    pub nb_failed: usize,
    pub rows: Vec<ReportRow>,
}

/// Deepest folder containing all of `paths`.
fn common_root(paths: &[PathBuf]) -> PathBuf {
    let mut root = paths
        .first()
        .and_then(|path| path.parent())
        .map(Path::to_path_buf)
        .unwrap_or_default();
    for path in paths.iter().skip(1) {
        while !path.starts_with(&root) {
            if !root.pop() {
                break;
            }
        }
    }
    root
}

/// Where the transcript at `path` is written. In [OutputMode::Dir], the path relative to
/// `root` is kept, without any `..` or root component.
fn destination(path: &Path, root: &Path, output: &OutputMode) -> Option<PathBuf> {
    match output {
        OutputMode::DryRun => None,
        OutputMode::InPlace => Some(path.to_path_buf()),
        OutputMode::Dir(dst) => {
            let relative: PathBuf = path
                .strip_prefix(root)
                .unwrap_or(path)
                .components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .collect();
            Some(dst.join(relative))
        }
    }
}

/// Reconcile the `%pho:` sub-tiers of the transcript at `path`, writing it out if it changed.
///
/// In [OutputMode::Dir], the file is written under its file name.
pub fn process_file(path: &Path, grammar: &Grammar, config: &PhoConfig) -> Result<FileOutcome, Error> {
    let root = path.parent().unwrap_or_else(|| Path::new(""));
    process_to(path, destination(path, root, config.output()), grammar, config)
}

fn process_to(
    path: &Path,
    dst: Option<PathBuf>,
    grammar: &Grammar,
    config: &PhoConfig,
) -> Result<FileOutcome, Error> {
    let mut transcript = Transcript::from_path(path)?;
    transcript
        .process_for_phonetic_transcription(grammar, config.speaker())
        .map_err(|e| e.in_file(path.into()))?;
    transcript
        .update_pho(grammar, config.speaker())
        .map_err(|e| e.in_file(path.into()))?;

    let changed = !transcript.no_changes();
    match dst {
        Some(dst) if changed => {
            info!("writing {:?}", dst);
            if let Some(parent) = dst.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::from(e).in_file(dst.clone()))?;
            }
            transcript.write_to(&dst).map_err(|e| e.in_file(dst))?;
        }
        _ if changed => (),
        _ => debug!("{:?}: no changes", path),
    }

    let rows = transcript
        .main_tiers()
        .map(|tier| ReportRow::from_tier(path, tier, config.speaker()))
        .filter(ReportRow::is_relevant)
        .collect();

    Ok(FileOutcome {
        path: path.to_path_buf(),
        changed,
        rows,
    })
}

/// Process `paths` in parallel, then write the report if one was asked for.
pub fn run(paths: &[PathBuf], config: &PhoConfig) -> Result<BatchReport, Error> {
    let grammar = Grammar::new(config.speakers().clone())?;
    info!(
        "processing {} files for {} ({} speakers)",
        paths.len(),
        config.speaker(),
        config.speakers().version()
    );

    let root = common_root(paths);
    let targets: Vec<Option<PathBuf>> = paths
        .iter()
        .map(|path| destination(path, &root, config.output()))
        .collect();
    let collisions: HashSet<&PathBuf> = targets
        .iter()
        .flatten()
        .duplicates()
        .collect();

    let outcomes: Vec<Result<FileOutcome, (PathBuf, Error)>> = paths
        .par_iter()
        .zip(targets.par_iter())
        .map(|(path, dst)| match dst {
            Some(dst) if collisions.contains(dst) => Err((
                path.clone(),
                Error::Custom(format!(
                    "{:?} would be written to {:?} along with other transcripts",
                    path, dst
                )),
            )),
            _ => process_to(path, dst.clone(), &grammar, config).map_err(|e| (path.clone(), e)),
        })
        .collect();

    let mut batch = BatchReport {
        nb_files: paths.len(),
        ..Default::default()
    };
    for outcome in outcomes {
        match outcome {
            Ok(outcome) => {
                if outcome.changed {
                    batch.nb_changed += 1;
                }
                batch.rows.extend(outcome.rows);
            }
            Err((path, e)) => {
                warn!("{}", e);
                batch.nb_failed += 1;
                batch.rows.push(ReportRow::from_error(&path, &e));
            }
        }
    }

    for (status, count) in report::summarize(&batch.rows) {
        info!("{}: {}", status, count);
    }

    if let Some((dst, format)) = &config.report {
        info!("writing report to {:?}", dst);
        match format {
            ReportFormat::Csv => report::write_csv(&batch.rows, dst)?,
            ReportFormat::JsonLines => report::write_json_lines(&batch.rows, dst)?,
        }
    }

    Ok(batch)
}

/// Outcome of a round-trip check on one file.
#[derive(Debug)]
pub enum CheckOutcome {
    Identical,
    Differs,
    Failed(Error),
}

/// Check that each of `paths` renders back to its exact text once parsed.
pub fn check_roundtrip(paths: &[PathBuf]) -> Vec<(PathBuf, CheckOutcome)> {
    paths
        .par_iter()
        .map(|path| {
            let outcome = match Transcript::from_path(path) {
                Ok(transcript) if transcript.no_changes() => CheckOutcome::Identical,
                Ok(_) => CheckOutcome::Differs,
                Err(e) => CheckOutcome::Failed(e),
            };
            (path.clone(), outcome)
        })
        .collect()
}
