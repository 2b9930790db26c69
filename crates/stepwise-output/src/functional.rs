//! Append-only text sink for functional values.
//!
//! One line per output step: the time followed by every functional value,
//! separated by single spaces. The number of values is fixed by the first
//! record written through a sink.
//!
//! A fresh run starts the file over with [`FunctionalSink::create`]; a
//! restart continues it with [`FunctionalSink::append`].

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{FormatError, OutputError};

/// Writer for the `<prefix>.txt` functional file.
#[derive(Debug)]
pub struct FunctionalSink {
    path: PathBuf,
    file: BufWriter<File>,
    arity: Option<usize>,
    records: usize,
}

impl FunctionalSink {
    /// Create (or truncate) the functional file at `path`.
    pub fn create(path: &Path) -> Result<Self, OutputError> {
        Self::open_with(path, OpenOptions::new().write(true).create(true).truncate(true))
    }

    /// Open the functional file at `path` for appending, creating it if
    /// missing. Earlier records are kept.
    pub fn open_append(path: &Path) -> Result<Self, OutputError> {
        Self::open_with(path, OpenOptions::new().create(true).append(true))
    }

    fn open_with(path: &Path, options: &OpenOptions) -> Result<Self, OutputError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| OutputError::io(dir, e))?;
        }
        let file = options.open(path).map_err(|e| OutputError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            file: BufWriter::new(file),
            arity: None,
            records: 0,
        })
    }

    /// Append one record and flush it.
    ///
    /// Every record must carry as many values as the first one.
    pub fn append(&mut self, t: f64, values: &[f64]) -> Result<(), OutputError> {
        match self.arity {
            Some(expected) if expected != values.len() => {
                return Err(FormatError::FunctionalArity {
                    expected,
                    found: values.len(),
                }
                .into());
            }
            Some(_) => {}
            None => self.arity = Some(values.len()),
        }

        let mut line = t.to_string();
        for v in values {
            line.push(' ');
            line.push_str(&v.to_string());
        }
        line.push('\n');
        self.file
            .write_all(line.as_bytes())
            .and_then(|()| self.file.flush())
            .map_err(|e| OutputError::io(&self.path, e))?;
        self.records += 1;
        Ok(())
    }

    /// Path of the functional file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records written so far.
    pub fn records(&self) -> usize {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_hold_time_then_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("functionals.txt");
        let mut sink = FunctionalSink::create(&path).unwrap();
        sink.append(0.0, &[1.0, 2.5]).unwrap();
        sink.append(0.5, &[1.5, -3.0]).unwrap();
        assert_eq!(sink.records(), 2);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "0 1 2.5\n0.5 1.5 -3\n");
    }

    #[test]
    fn arity_is_fixed_by_first_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FunctionalSink::create(&dir.path().join("f.txt")).unwrap();
        sink.append(0.0, &[1.0, 2.0, 3.0]).unwrap();
        match sink.append(1.0, &[1.0]) {
            Err(OutputError::Format(FormatError::FunctionalArity {
                expected: 3,
                found: 1,
            })) => {}
            other => panic!("expected FunctionalArity, got {other:?}"),
        }
        assert_eq!(sink.records(), 1);
    }

    #[test]
    fn create_truncates_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, "stale\n").unwrap();
        let mut sink = FunctionalSink::create(&path).unwrap();
        sink.append(2.0, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "2\n");
    }

    #[test]
    fn append_keeps_earlier_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, "0 1\n1 1\n").unwrap();
        let mut sink = FunctionalSink::open_append(&path).unwrap();
        sink.append(2.0, &[1.0]).unwrap();
        assert_eq!(sink.records(), 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0 1\n1 1\n2 1\n");
    }

    #[test]
    fn append_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("f.txt");
        let mut sink = FunctionalSink::open_append(&path).unwrap();
        sink.append(0.5, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0.5\n");
    }
}
