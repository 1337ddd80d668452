//! Transcript discovery.
//!
//! Sources are directories (searched recursively for `.cha` files), plain files, or
//! glob patterns.
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::{debug, warn};

use crate::error::Error;

/// Extension of CHAT transcripts.
pub const CHA_EXTENSION: &str = "cha";

fn glob_paths(pattern: &str) -> Result<Vec<PathBuf>, Error> {
    let mut paths = Vec::new();
    for entry in glob::glob(pattern)? {
        let path = entry?;
        if path.is_file() {
            paths.push(path);
        }
    }
    Ok(paths)
}

fn expand(src: &Path) -> Result<Vec<PathBuf>, Error> {
    if src.is_dir() {
        let root = glob::Pattern::escape(&src.to_string_lossy());
        let pattern = Path::new(&root)
            .join("**")
            .join(format!("*.{}", CHA_EXTENSION));
        glob_paths(&pattern.to_string_lossy())
    } else if src.is_file() {
        Ok(vec![src.to_path_buf()])
    } else {
        glob_paths(&src.to_string_lossy())
    }
}

/// Sorted, deduplicated list of the files designated by `sources`.
///
/// Sources that match nothing are logged and skipped.
pub fn discover<P: AsRef<Path>>(sources: &[P]) -> Result<Vec<PathBuf>, Error> {
    let mut paths = Vec::new();
    for src in sources {
        let src = src.as_ref();
        let found = expand(src)?;
        if found.is_empty() {
            warn!("no file found for {:?}", src);
        }
        debug!("{:?}: {} files", src, found.len());
        paths.extend(found);
    }

    Ok(paths.into_iter().sorted().dedup().collect())
}
