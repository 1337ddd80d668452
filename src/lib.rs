/*! # chapho

Parsing and round-tripping of CHAT (`.cha`) transcripts, with reconciliation of the
`%pho:` (phonetic transcription) sub-tiers against the words uttered by a speaker.

```no_run
use chapho::grammar::DEFAULT_GRAMMAR;
use chapho::transcript::Transcript;

let mut transcript = Transcript::from_path("session.cha")?;
let statuses = transcript.update_pho(&DEFAULT_GRAMMAR, "CHI")?;
if !transcript.no_changes() {
    transcript.write_to("session.cha")?;
}
# Ok::<(), chapho::error::Error>(())
```
!*/
pub mod error;
pub mod grammar;
pub mod opf;
pub mod processing;
pub mod tier;
pub mod transcript;
