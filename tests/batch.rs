use std::fs;
use std::io::Write;
use std::path::Path;

use chapho::grammar::SpeakerSet;
use chapho::opf::{DbTable, OpfFile};
use chapho::processing::{self, batch, OutputMode, PhoConfig, ReportFormat};
use zip::write::FileOptions;
use zip::ZipWriter;

const NEW: &str = "@Begin\n*CHI:\tball &=n_y_CHI_0xabc123 \x15100_200\x15\n@End\n";
const TRANSCRIBED: &str = "@Begin\n*CHI:\tball &=n_y_CHI_0xabc123 \x15100_200\x15\n%pho:\tbɔl ####\n@End\n";
const MOTHER_ONLY: &str = "@Begin\n*MOT:\tdog &=n_y_MOT_0xabc124 \x15100_200\x15\n@End\n";

fn corpus(root: &Path) {
    let session = root.join("child01").join("session01");
    fs::create_dir_all(&session).unwrap();
    fs::write(session.join("new.cha"), NEW).unwrap();
    fs::write(session.join("transcribed.cha"), TRANSCRIBED).unwrap();
    fs::write(root.join("mother.cha"), MOTHER_ONLY).unwrap();
    fs::write(session.join("notes.txt"), "not a transcript").unwrap();
}

#[test]
fn in_place_with_csv_report() {
    let dir = tempfile::tempdir().unwrap();
    corpus(dir.path());

    let paths = processing::discover(&[dir.path()]).unwrap();
    assert_eq!(paths.len(), 3);

    let report = dir.path().join("report.csv");
    let config = PhoConfig::new("CHI", SpeakerSet::default(), OutputMode::InPlace)
        .unwrap()
        .with_report(report.clone(), ReportFormat::Csv);
    let result = batch::run(&paths, &config).unwrap();
    assert_eq!(result.nb_files, 3);
    assert_eq!(result.nb_changed, 1);
    assert_eq!(result.nb_failed, 0);

    let session = dir.path().join("child01").join("session01");
    assert_eq!(
        fs::read_to_string(session.join("new.cha")).unwrap(),
        NEW.replace("\x15\n@End", "\x15\n%pho:\t####\n@End")
    );
    assert_eq!(
        fs::read_to_string(session.join("transcribed.cha")).unwrap(),
        TRANSCRIBED
    );

    let mut reader = csv::Reader::from_path(&report).unwrap();
    let statuses: Vec<String> = reader
        .records()
        .map(|record| record.unwrap()[3].to_string())
        .collect();
    assert_eq!(
        statuses,
        vec!["pho_subtier_added", "more_transcriptions_than_words"]
    );
}

#[test]
fn json_report_and_roundtrip_check() {
    let dir = tempfile::tempdir().unwrap();
    corpus(dir.path());
    let pattern = dir.path().join("**").join("*.cha");
    let paths = processing::discover(&[pattern]).unwrap();

    let report = dir.path().join("report.jsonl");
    let config = PhoConfig::new("CHI", SpeakerSet::default(), OutputMode::DryRun)
        .unwrap()
        .with_report(report.clone(), ReportFormat::JsonLines);
    let result = batch::run(&paths, &config).unwrap();
    assert_eq!(result.rows.len(), 2);

    let lines: Vec<serde_json::Value> = fs::read_to_string(&report)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1]["message"], "error: more transcriptions than there are words");

    for (path, outcome) in batch::check_roundtrip(&paths) {
        assert!(
            matches!(outcome, batch::CheckOutcome::Identical),
            "{:?} does not round-trip",
            path
        );
    }
}

#[test]
fn opf_table_export() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("session.opf");
    let mut writer = ZipWriter::new(fs::File::create(&src).unwrap());
    writer.start_file("project", FileOptions::default()).unwrap();
    writer.write_all(b"<project/>").unwrap();
    writer.start_file("db", FileOptions::default()).unwrap();
    writer
        .write_all(
            "#4\n\
labeled_object (MATRIX,true,)-ordinal|NOMINAL,object|NOMINAL,utterance_type|NOMINAL\n\
00:00:01:000,00:00:02:000,(1,ball,n)\n\
00:00:03:000,00:00:04:000,(2,cup)\n"
                .as_bytes(),
        )
        .unwrap();
    writer.finish().unwrap();

    let opf = OpfFile::load(&src).unwrap();
    let table = DbTable::parse(opf.db()).unwrap();
    assert_eq!(table.column("object").unwrap(), vec!["ball", "cup"]);
    assert_eq!(table.column("utterance_type").unwrap(), vec!["n", ""]);

    let dst = dir.path().join("session.csv");
    table.write_csv(&dst).unwrap();
    let mut reader = csv::Reader::from_path(&dst).unwrap();
    assert_eq!(
        reader.headers().unwrap().iter().collect::<Vec<_>>(),
        vec!["time_start", "time_end", "ordinal", "object", "utterance_type"]
    );
    assert_eq!(reader.records().count(), 2);
}
