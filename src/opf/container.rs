//! OPF archives.
//!
//! An OPF file is a zip archive holding the annotations in a member named `db`,
//! alongside other members that are carried over untouched.
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::Error;

/// Name of the member holding the annotations.
pub const DB: &str = "db";

/// macOS artefacts that end up in archives zipped on a mac.
const SKIP_PREFIXES: [&str; 2] = [".DS_Store", "__MACOSX/"];

#[derive(Debug, Clone)]
pub struct OpfFile {
    path: PathBuf,
    db: String,
    /// member names, in archive order (`db` included).
    filenames: Vec<String>,
    others: HashMap<String, Vec<u8>>,
}

impl OpfFile {
    /// Read the archive at `path`. Fails if it has no `db` member.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        if path.is_dir() {
            return Err(Error::Custom(format!(
                "{:?} is a directory, reading unarchived OPF files is not supported",
                path
            )));
        }

        let mut archive = ZipArchive::new(File::open(path)?)?;
        let mut db = None;
        let mut filenames = Vec::with_capacity(archive.len());
        let mut others = HashMap::new();

        for idx in 0..archive.len() {
            let mut member = archive.by_index(idx)?;
            let name = member.name().to_string();
            if member.is_dir() || SKIP_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
                debug!("skipping {} in {:?}", name, path);
                continue;
            }

            if name == DB {
                let mut text = String::new();
                member.read_to_string(&mut text)?;
                db = Some(text);
            } else {
                let mut bytes = Vec::new();
                member.read_to_end(&mut bytes)?;
                others.insert(name.clone(), bytes);
            }
            filenames.push(name);
        }

        let db = db.ok_or_else(|| Error::NotAnOpf(path.to_path_buf()))?;
        Ok(Self {
            path: path.to_path_buf(),
            db,
            filenames,
            others,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn db(&self) -> &str {
        &self.db
    }

    /// Replace the annotations. Other members are left as they are.
    pub fn set_db(&mut self, db: String) {
        self.db = db;
    }

    pub fn filenames(&self) -> &[String] {
        &self.filenames
    }

    pub fn other(&self, name: &str) -> Option<&[u8]> {
        self.others.get(name).map(Vec::as_slice)
    }

    fn member(&self, name: &str) -> Result<&[u8], Error> {
        if name == DB {
            Ok(self.db.as_bytes())
        } else {
            self.other(name)
                .ok_or_else(|| Error::Custom(format!("no member {:?} in {:?}", name, self.path)))
        }
    }

    /// Write a (deflated) archive at `dst`, which has to end with `.opf`.
    pub fn write_to_opf<P: AsRef<Path>>(&self, dst: P) -> Result<(), Error> {
        let dst = dst.as_ref();
        if dst.extension().map_or(true, |ext| ext != "opf") {
            return Err(Error::Custom(format!(
                "{:?} does not end with .opf as expected",
                dst
            )));
        }

        let mut writer = ZipWriter::new(File::create(dst)?);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        for name in &self.filenames {
            writer.start_file(name.as_str(), options)?;
            writer.write_all(self.member(name)?)?;
        }
        writer.finish()?;
        Ok(())
    }

    /// Write members as plain files in `dst`, creating it if needed.
    pub fn write_to_dir<P: AsRef<Path>>(&self, dst: P) -> Result<(), Error> {
        let dst = dst.as_ref();
        if dst.exists() && !dst.is_dir() {
            return Err(Error::Custom(format!("{:?} is not a directory", dst)));
        }
        fs::create_dir_all(dst)?;

        for name in &self.filenames {
            let filepath = dst.join(name);
            if let Some(parent) = filepath.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(filepath, self.member(name)?)?;
        }
        Ok(())
    }

    /// Write back over the archive the file was loaded from.
    pub fn overwrite(&self) -> Result<(), Error> {
        self.write_to_opf(&self.path)
    }

    /// Write to `target`: an archive if it ends with `.opf`, a directory otherwise.
    ///
    /// Refuses to replace the source archive unless `allow_overwrite` is set.
    pub fn write<P: AsRef<Path>>(&self, target: P, allow_overwrite: bool) -> Result<(), Error> {
        let target = target.as_ref();
        if target == self.path && !allow_overwrite {
            return Err(Error::Custom(format!(
                "refusing to overwrite {:?}",
                self.path
            )));
        }

        if target.extension().map_or(false, |ext| ext == "opf") {
            self.write_to_opf(target)
        } else {
            self.write_to_dir(target)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;

    use zip::write::FileOptions;
    use zip::ZipWriter;

    use super::OpfFile;
    use crate::error::Error;

    fn make_opf(path: &Path, members: &[(&str, &str)]) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        for (name, content) in members {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn load_and_write() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.opf");
        make_opf(
            &src,
            &[
                ("project", "<project/>"),
                ("db", "#4\nlabeled_object (MATRIX,true,)-object|NOMINAL\n"),
                ("__MACOSX/db", "junk"),
                (".DS_Store", "junk"),
            ],
        );

        let mut opf = OpfFile::load(&src).unwrap();
        assert_eq!(opf.filenames(), &["project".to_string(), "db".to_string()]);
        assert!(opf.db().starts_with("#4\n"));
        assert_eq!(opf.other("project").unwrap(), b"<project/>");

        opf.set_db("#4\nchanged\n".to_string());
        let dst = dir.path().join("b.opf");
        opf.write_to_opf(&dst).unwrap();
        let reloaded = OpfFile::load(&dst).unwrap();
        assert_eq!(reloaded.db(), "#4\nchanged\n");
        assert_eq!(reloaded.filenames(), opf.filenames());

        let unzipped = dir.path().join("unzipped");
        opf.write_to_dir(&unzipped).unwrap();
        assert_eq!(
            std::fs::read_to_string(unzipped.join("db")).unwrap(),
            "#4\nchanged\n"
        );

        assert!(opf.write_to_opf(dir.path().join("c.zip")).is_err());
    }

    #[test]
    fn write_guards_source() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.opf");
        make_opf(&src, &[("db", "#4\n")]);

        let opf = OpfFile::load(&src).unwrap();
        assert!(opf.write(&src, false).is_err());
        opf.write(&src, true).unwrap();

        opf.write(dir.path().join("out"), false).unwrap();
        assert!(dir.path().join("out").join("db").is_file());
        opf.write(dir.path().join("copy.opf"), false).unwrap();
        assert_eq!(OpfFile::load(dir.path().join("copy.opf")).unwrap().db(), "#4\n");
    }

    #[test]
    fn no_db() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.opf");
        make_opf(&src, &[("project", "<project/>")]);
        assert!(matches!(OpfFile::load(&src), Err(Error::NotAnOpf(_))));
    }
}
