/*! Processing of transcript corpora

Discovery of the transcripts to work on ([discover]), parallel `%pho:` reconciliation
and round-trip checks ([batch]), and reports ([report]).
!*/
pub mod batch;
pub mod discover;
pub mod report;

pub use batch::{BatchReport, CheckOutcome, OutputMode, PhoConfig, ReportFormat};
pub use discover::discover;
pub use report::ReportRow;
