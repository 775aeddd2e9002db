use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// Errors that can occur when opening or writing a data log.
#[derive(Debug, Clone)]
pub enum DataLogError {
    /// The log path points at a directory.
    IsADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The log file already exists and `exist_ok` was not set.
    AlreadyExists {
        /// The offending path.
        path: PathBuf,
    },

    /// A row was missing one of the declared columns. Nothing was written.
    MissingColumn {
        /// The column the row lacked.
        column: String,
    },

    /// An I/O failure from the filesystem.
    Io(Arc<io::Error>),

    /// A CSV-level failure while reading back or appending.
    Csv(Arc<csv::Error>),
}

impl core::fmt::Display for DataLogError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DataLogError::IsADirectory { path } => {
                write!(f, "{} is a directory", path.display())
            }
            DataLogError::AlreadyExists { path } => {
                write!(f, "{} exists", path.display())
            }
            DataLogError::MissingColumn { column } => {
                write!(f, "row is missing column {column:?}")
            }
            DataLogError::Io(err) => write!(f, "i/o error: {err}"),
            DataLogError::Csv(err) => write!(f, "csv error: {err}"),
        }
    }
}

impl core::error::Error for DataLogError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            DataLogError::Io(err) => Some(err.as_ref()),
            DataLogError::Csv(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for DataLogError {
    fn from(err: io::Error) -> Self {
        DataLogError::Io(Arc::new(err))
    }
}

impl From<csv::Error> for DataLogError {
    fn from(err: csv::Error) -> Self {
        DataLogError::Csv(Arc::new(err))
    }
}
