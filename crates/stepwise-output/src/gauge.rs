//! Open gauge files for the duration of a run.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use stepwise_core::{GaugeProbe, GaugeSink};

use crate::error::OutputError;

#[derive(Debug)]
struct GaugeFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

/// One open, buffered file per gauge probe, in declaration order.
///
/// Files are flushed with [`flush_all`](GaugeSet::flush_all) after each
/// output step and closed by [`close`](GaugeSet::close) or on drop.
/// Closing twice is harmless.
#[derive(Debug, Default)]
pub struct GaugeSet {
    files: IndexMap<String, GaugeFile>,
    closed: bool,
}

impl GaugeSet {
    /// Create (or truncate) one file per probe under `outdir`.
    pub fn open(outdir: &Path, probes: &[GaugeProbe]) -> Result<Self, OutputError> {
        let mut files = IndexMap::with_capacity(probes.len());
        if !probes.is_empty() {
            fs::create_dir_all(outdir).map_err(|e| OutputError::io(outdir, e))?;
        }
        for probe in probes {
            let path = outdir.join(&probe.file_name);
            let file = File::create(&path).map_err(|e| OutputError::io(&path, e))?;
            log::debug!(target: "stepwise::gauge", "opened gauge '{}' at {}", probe.name, path.display());
            files.insert(
                probe.name.clone(),
                GaugeFile {
                    path,
                    writer: BufWriter::new(file),
                },
            );
        }
        Ok(Self {
            files,
            closed: false,
        })
    }

    /// Number of open gauge files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no gauge files are open.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Path of the file for `probe`, if it is open.
    pub fn path(&self, probe: &str) -> Option<&Path> {
        self.files.get(probe).map(|g| g.path.as_path())
    }

    /// Flush every open gauge file.
    pub fn flush_all(&mut self) -> Result<(), OutputError> {
        for g in self.files.values_mut() {
            g.writer.flush().map_err(|e| OutputError::io(&g.path, e))?;
        }
        Ok(())
    }

    /// Flush and close every gauge file.
    ///
    /// Every file is released even if an earlier flush fails; the first
    /// failure is returned.
    pub fn close(&mut self) -> Result<(), OutputError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let mut first_err = None;
        for (_, mut g) in self.files.drain(..) {
            if let Err(e) = g.writer.flush() {
                let err = OutputError::io(&g.path, e);
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl GaugeSink for GaugeSet {
    fn writer(&mut self, probe: &str) -> Option<&mut dyn Write> {
        self.files
            .get_mut(probe)
            .map(|g| &mut g.writer as &mut dyn Write)
    }
}

impl Drop for GaugeSet {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!(target: "stepwise::gauge", "gauge close on drop failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probes() -> Vec<GaugeProbe> {
        vec![GaugeProbe::new("1", &[0.1]), GaugeProbe::new("2", &[0.9])]
    }

    #[test]
    fn one_file_per_probe() {
        let dir = tempfile::tempdir().unwrap();
        let set = GaugeSet::open(dir.path(), &probes()).unwrap();
        assert_eq!(set.len(), 2);
        assert!(dir.path().join("gauge1.txt").exists());
        assert!(dir.path().join("gauge2.txt").exists());
        assert_eq!(set.path("2"), Some(dir.path().join("gauge2.txt").as_path()));
    }

    #[test]
    fn writes_are_visible_after_flush() {
        let dir = tempfile::tempdir().unwrap();
        let mut set = GaugeSet::open(dir.path(), &probes()).unwrap();
        writeln!(set.writer("1").unwrap(), "0 1.5").unwrap();
        set.flush_all().unwrap();
        let text = std::fs::read_to_string(dir.path().join("gauge1.txt")).unwrap();
        assert_eq!(text, "0 1.5\n");
        assert!(set.writer("missing").is_none());
    }

    #[test]
    fn close_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut set = GaugeSet::open(dir.path(), &probes()).unwrap();
        writeln!(set.writer("2").unwrap(), "x").unwrap();
        set.close().unwrap();
        set.close().unwrap();
        assert!(set.is_empty());
        assert!(set.writer("2").is_none());
        let text = std::fs::read_to_string(dir.path().join("gauge2.txt")).unwrap();
        assert_eq!(text, "x\n");
    }

    #[test]
    fn no_probes_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("never");
        let set = GaugeSet::open(&out, &[]).unwrap();
        assert!(set.is_empty());
        assert!(!out.exists());
    }
}
