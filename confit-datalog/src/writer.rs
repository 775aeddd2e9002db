//! Append-only CSV data log with duplicate detection on key columns.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::DataLogError;

/// Appends `to_dict()`-style rows to a CSV file, one column per declared
/// variable, and remembers which key tuples have already been logged.
///
/// Columns come in two ordered groups: independent variables (`ivars`),
/// which together form a row's identity, and dependent variables (`dvars`),
/// the measured values. The header row is `ivars ++ dvars`.
#[derive(Debug)]
pub struct DataWriter {
    path: PathBuf,
    ivars: Vec<String>,
    dvars: Vec<String>,
    completed: HashSet<Vec<String>>,
}

/// Configures and opens a [`DataWriter`].
pub struct DataWriterBuilder {
    path: PathBuf,
    ivars: Vec<String>,
    dvars: Vec<String>,
    parents: bool,
    exist_ok: bool,
}

impl DataWriterBuilder {
    /// Declares the independent (key) columns, in order.
    pub fn ivars<I, S>(mut self, ivars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ivars = ivars.into_iter().map(Into::into).collect();
        self
    }

    /// Declares the dependent (value) columns, in order.
    pub fn dvars<I, S>(mut self, dvars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dvars = dvars.into_iter().map(Into::into).collect();
        self
    }

    /// Creates missing parent directories when the log file is created.
    pub fn parents(mut self, parents: bool) -> Self {
        self.parents = parents;
        self
    }

    /// Allows opening an existing log file: its rows are read back to seed
    /// the completed-key set, and new rows append. Without this, an
    /// existing file is an error.
    pub fn exist_ok(mut self, exist_ok: bool) -> Self {
        self.exist_ok = exist_ok;
        self
    }

    /// Opens the log: creates the file with a header row, or (with
    /// [`exist_ok`](Self::exist_ok)) reads an existing one back.
    pub fn open(self) -> Result<DataWriter, DataLogError> {
        let Self {
            path,
            ivars,
            dvars,
            parents,
            exist_ok,
        } = self;

        if path.is_dir() {
            return Err(DataLogError::IsADirectory { path });
        }

        let completed = if path.is_file() {
            if !exist_ok {
                return Err(DataLogError::AlreadyExists { path });
            }
            debug!(path = %path.display(), "appending to existing log");
            read_completed(&path, &ivars)?
        } else {
            debug!(path = %path.display(), "creating log");
            if parents {
                if let Some(dir) = path.parent() {
                    fs::create_dir_all(dir)?;
                }
            }
            let mut writer = csv::Writer::from_path(&path)?;
            writer.write_record(ivars.iter().chain(dvars.iter()))?;
            writer.flush()?;
            HashSet::new()
        };

        debug!(completed = completed.len(), "log opened");
        Ok(DataWriter {
            path,
            ivars,
            dvars,
            completed,
        })
    }
}

impl DataWriter {
    /// Starts configuring a data log at `path`.
    pub fn builder(path: impl Into<PathBuf>) -> DataWriterBuilder {
        DataWriterBuilder {
            path: path.into(),
            ivars: Vec::new(),
            dvars: Vec::new(),
            parents: false,
            exist_ok: false,
        }
    }

    /// The log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The declared key columns.
    pub fn ivars(&self) -> &[String] {
        &self.ivars
    }

    /// The declared value columns.
    pub fn dvars(&self) -> &[String] {
        &self.dvars
    }

    /// Number of distinct key tuples seen so far (including rows read back
    /// from an existing file).
    pub fn completed(&self) -> usize {
        self.completed.len()
    }

    /// Returns `true` if a row with the same key tuple was already logged.
    ///
    /// Rows missing a key column fail with
    /// [`DataLogError::MissingColumn`].
    pub fn is_completed(&self, row: &Map<String, Value>) -> Result<bool, DataLogError> {
        Ok(self.completed.contains(&self.key_of(row)?))
    }

    /// Appends one row and records its key tuple.
    ///
    /// Cells are written in header order; a row missing any declared column
    /// fails and nothing is written.
    pub fn write(&mut self, row: &Map<String, Value>) -> Result<(), DataLogError> {
        let mut record = Vec::with_capacity(self.ivars.len() + self.dvars.len());
        for column in self.ivars.iter().chain(self.dvars.iter()) {
            let value = row
                .get(column)
                .ok_or_else(|| DataLogError::MissingColumn {
                    column: column.clone(),
                })?;
            record.push(render_cell(value));
        }

        debug!(path = %self.path.display(), row = %serde_json::Value::Object(row.clone()), "writing row");
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(&record)?;
        writer.flush()?;

        self.completed.insert(self.key_of(row)?);
        Ok(())
    }

    /// Appends the row unless its key tuple was already logged. Returns
    /// `true` if the row was written.
    pub fn write_if_new(&mut self, row: &Map<String, Value>) -> Result<bool, DataLogError> {
        if self.is_completed(row)? {
            debug!("row already completed, skipping");
            return Ok(false);
        }
        self.write(row)?;
        Ok(true)
    }

    fn key_of(&self, row: &Map<String, Value>) -> Result<Vec<String>, DataLogError> {
        self.ivars
            .iter()
            .map(|column| {
                row.get(column)
                    .map(render_cell)
                    .ok_or_else(|| DataLogError::MissingColumn {
                        column: column.clone(),
                    })
            })
            .collect()
    }
}

/// Renders one cell: strings go in raw, everything else in its JSON form.
fn render_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn read_completed(
    path: &Path,
    ivars: &[String],
) -> Result<HashSet<Vec<String>>, DataLogError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let key_indices: Vec<usize> = ivars
        .iter()
        .map(|column| {
            headers
                .iter()
                .position(|header| header == column)
                .ok_or_else(|| DataLogError::MissingColumn {
                    column: column.clone(),
                })
        })
        .collect::<Result<_, _>>()?;

    let mut completed = HashSet::new();
    for record in reader.records() {
        let record = record?;
        let key: Vec<String> = key_indices
            .iter()
            .map(|&i| record.get(i).unwrap_or_default().to_string())
            .collect();
        completed.insert(key);
    }
    Ok(completed)
}
