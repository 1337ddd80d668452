//! # chapho
//!
//! Adds and maintains `%pho:` sub-tiers in CHAT transcripts.
//!
//! ```sh
//! chapho
//! CHAT transcript %pho tooling.
//!
//! USAGE:
//!     chapho <SUBCOMMAND>
//!
//! FLAGS:
//!     -h, --help       Prints help information
//!     -V, --version    Prints version information
//!
//! SUBCOMMANDS:
//!     check        Check that transcripts round-trip unchanged
//!     help         Prints this message or the help of the given subcommand(s)
//!     opf-table    Export the db table of an OPF file as csv
//!     pho          Add/update %pho sub-tiers
//! ```
//!
//! Logging is configured through `RUST_LOG` (e.g. `RUST_LOG=chapho=info`).
use structopt::StructOpt;

use chapho::error::Error;
use chapho::grammar::SpeakerSet;
use chapho::opf::{DbTable, OpfFile};
use chapho::processing::{self, CheckOutcome, OutputMode, PhoConfig, ReportFormat};

#[macro_use]
extern crate log;

mod cli;

fn pho(p: cli::Pho) -> Result<(), Error> {
    let mut speakers = SpeakerSet::new(p.speakers);
    for code in &p.extra_speakers {
        speakers = speakers.with_code(code)?;
    }

    let output = match (p.dst, p.in_place) {
        (Some(dst), _) => OutputMode::Dir(dst),
        (None, true) => OutputMode::InPlace,
        (None, false) => {
            info!("no destination given, dry run");
            OutputMode::DryRun
        }
    };

    let mut config = PhoConfig::new(&p.speaker, speakers, output)?;
    if let Some(report) = p.report {
        let format = if p.json {
            ReportFormat::JsonLines
        } else {
            ReportFormat::Csv
        };
        config = config.with_report(report, format);
    }

    let paths = processing::discover(&p.src)?;
    let batch = processing::batch::run(&paths, &config)?;
    println!(
        "{} files, {} modified, {} failed",
        batch.nb_files, batch.nb_changed, batch.nb_failed
    );
    Ok(())
}

fn check(c: cli::Check) -> Result<(), Error> {
    let paths = processing::discover(&c.src)?;
    let mut nb_failed = 0;
    for (path, outcome) in processing::batch::check_roundtrip(&paths) {
        match outcome {
            CheckOutcome::Identical => debug!("{:?}: ok", path),
            CheckOutcome::Differs => {
                nb_failed += 1;
                error!("{:?} does not round-trip", path);
            }
            CheckOutcome::Failed(e) => {
                nb_failed += 1;
                error!("{}", e);
            }
        }
    }

    if nb_failed > 0 {
        Err(Error::Custom(format!(
            "{} of {} files failed the check: see previous messages.",
            nb_failed,
            paths.len()
        )))
    } else {
        println!("{} files ok", paths.len());
        Ok(())
    }
}

fn main() -> Result<(), Error> {
    env_logger::init();

    let opt = cli::Chapho::from_args();
    debug!("cli args\n{:#?}", opt);

    match opt {
        cli::Chapho::Pho(p) => pho(p)?,
        cli::Chapho::Check(c) => check(c)?,
        cli::Chapho::OpfTable(o) => {
            let opf = OpfFile::load(&o.src)?;
            let table = DbTable::parse(opf.db()).map_err(|e| e.in_file(o.src.clone()))?;
            info!(
                "{:?}: {} fields, {} rows",
                o.src,
                table.field_names().len(),
                table.rows().len()
            );
            table.write_csv(&o.dst)?;
        }
    };
    Ok(())
}
