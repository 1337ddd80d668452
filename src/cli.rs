//! Command line arguments and parameters management/parsing.
use std::path::PathBuf;

use structopt::StructOpt;

use chapho::grammar::SpeakerVersion;

#[derive(Debug, StructOpt)]
#[structopt(name = "chapho", about = "CHAT transcript %pho tooling.")]
/// Holds every command that is callable by the `chapho` command.
pub enum Chapho {
    #[structopt(about = "Add/update %pho sub-tiers")]
    Pho(Pho),
    #[structopt(about = "Check that transcripts round-trip unchanged")]
    Check(Check),
    #[structopt(about = "Export the db table of an OPF file as csv")]
    OpfTable(OpfTable),
}

#[derive(Debug, StructOpt)]
/// Pho command and parameters.
///
/// ```sh
/// chapho-pho
/// Add/update %pho sub-tiers
///
/// USAGE:
///     chapho pho [FLAGS] [OPTIONS] <src>...
///
/// FLAGS:
///     -i, --in-place    overwrite the source files
///         --json        write the report as JSON lines instead of csv
///
/// OPTIONS:
///     -d, --dst <dst>                         destination folder of modified transcripts
///     -e, --extra-speaker <extra-speakers>... speaker codes to add to the set
///     -r, --report <report>                   report destination
///     -s, --speaker <speaker>                 speaker whose words are transcribed [default: CHI]
///         --speakers <speakers>               speaker set version (v1, v2) [default: v2]
/// ```
pub struct Pho {
    #[structopt(
        parse(from_os_str),
        required = true,
        help = "transcripts: files, folders (searched for .cha files) or glob patterns"
    )]
    pub src: Vec<PathBuf>,
    #[structopt(
        short = "s",
        long = "speaker",
        default_value = "CHI",
        help = "speaker whose words are transcribed"
    )]
    pub speaker: String,
    #[structopt(
        long = "speakers",
        default_value = "v2",
        help = "speaker set version (v1, v2)"
    )]
    pub speakers: SpeakerVersion,
    #[structopt(
        short = "e",
        long = "extra-speaker",
        help = "speaker codes to add to the set"
    )]
    pub extra_speakers: Vec<String>,
    #[structopt(
        parse(from_os_str),
        short = "d",
        long = "dst",
        conflicts_with = "in-place",
        help = "destination folder of modified transcripts. Leave blank (without -i) for a dry run."
    )]
    pub dst: Option<PathBuf>,
    #[structopt(short = "i", long = "in-place", help = "overwrite the source files")]
    pub in_place: bool,
    #[structopt(parse(from_os_str), short = "r", long = "report", help = "report destination")]
    pub report: Option<PathBuf>,
    #[structopt(long = "json", help = "write the report as JSON lines instead of csv")]
    pub json: bool,
}

#[derive(Debug, StructOpt)]
pub struct Check {
    #[structopt(
        parse(from_os_str),
        required = true,
        help = "transcripts: files, folders (searched for .cha files) or glob patterns"
    )]
    pub src: Vec<PathBuf>,
}

#[derive(Debug, StructOpt)]
pub struct OpfTable {
    #[structopt(parse(from_os_str), help = "source OPF file")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "csv destination")]
    pub dst: PathBuf,
}
