//! Error enum
use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Custom(String),
    Serde(serde_json::Error),
    Glob(glob::GlobError),
    GlobPattern(glob::PatternError),
    Csv(csv::Error),
    Zip(zip::result::ZipError),
    Regex(regex::Error),

    /// A line that cannot belong to the tier currently being accumulated.
    UnexpectedLine { line_no: usize, line: String },
    /// A main tier or sub-tier line without the tab separating label and contents.
    MissingTab { line_no: usize, line: String },
    /// A continuation line of a main tier that carries its own label.
    LabelInContinuation { line_no: usize, line: String },
    /// An operation was invoked on a tier in the wrong state (parsing twice, etc.).
    Precondition(String),
    InvalidSpeakerCode(String),
    NotAnOpf(PathBuf),
    /// Wraps a fatal error with the path of the file being processed.
    InFile { path: PathBuf, source: Box<Error> },
}

impl Error {
    /// attach `path` to the error, unless it already carries one.
    pub fn in_file(self, path: PathBuf) -> Self {
        match self {
            e @ Error::InFile { .. } => e,
            e => Error::InFile {
                path,
                source: Box::new(e),
            },
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "io error: {}", e),
            Error::Custom(s) => write!(f, "{}", s),
            Error::Serde(e) => write!(f, "serialization error: {}", e),
            Error::Glob(e) => write!(f, "glob error: {}", e),
            Error::GlobPattern(e) => write!(f, "invalid glob pattern: {}", e),
            Error::Csv(e) => write!(f, "csv error: {}", e),
            Error::Zip(e) => write!(f, "zip error: {}", e),
            Error::Regex(e) => write!(f, "regex error: {}", e),
            Error::UnexpectedLine { line_no, line } => {
                write!(f, "unexpected line within a tier (line {}): {:?}", line_no, line)
            }
            Error::MissingTab { line_no, line } => {
                write!(f, "no tab after the label (line {}): {:?}", line_no, line)
            }
            Error::LabelInContinuation { line_no, line } => write!(
                f,
                "continuation line carries a label (line {}): {:?}",
                line_no, line
            ),
            Error::Precondition(s) => write!(f, "precondition violated: {}", s),
            Error::InvalidSpeakerCode(code) => write!(f, "invalid speaker code: {:?}", code),
            Error::NotAnOpf(path) => write!(f, "{:?} does not contain \"db\". Not an OPF file?", path),
            Error::InFile { path, source } => write!(f, "{}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Serde(e) => Some(e),
            Error::Glob(e) => Some(e),
            Error::GlobPattern(e) => Some(e),
            Error::Csv(e) => Some(e),
            Error::Zip(e) => Some(e),
            Error::Regex(e) => Some(e),
            Error::InFile { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<glob::GlobError> for Error {
    fn from(e: glob::GlobError) -> Error {
        Error::Glob(e)
    }
}

impl From<glob::PatternError> for Error {
    fn from(e: glob::PatternError) -> Error {
        Error::GlobPattern(e)
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Error {
        Error::Csv(e)
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Error {
        Error::Zip(e)
    }
}

impl From<regex::Error> for Error {
    fn from(e: regex::Error) -> Error {
        Error::Regex(e)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::Custom(s)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Serde(e)
    }
}
