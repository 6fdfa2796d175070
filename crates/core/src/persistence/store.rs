//! Reading and writing fleet files.
//!
//! Saving replaces the file wholesale. Loading is best effort per line: a
//! record that cannot be decoded is skipped and reported, while the fleet is
//! only replaced once the whole file has been read.

use std::{
    fmt,
    fs::{self, File},
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
    str,
};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::fleet::Fleet;

use super::codec::{decode_vehicle, encode_vehicle};

/// Result of reading a fleet file.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The file was read; the fleet now holds exactly its valid records.
    Loaded(LoadSummary),
    /// No file at the given path. The fleet was left untouched.
    Missing,
}

/// Counts from a completed load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    /// Vehicles added to the fleet.
    pub loaded: usize,
    /// Lines that were skipped.
    pub skipped: Vec<SkippedLine>,
}

/// A line that could not be loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    /// One-based line number in the file.
    pub line_number: usize,
    /// Why it was skipped.
    pub reason: String,
}

impl fmt::Display for LoadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadOutcome::Missing => write!(f, "file not found, fleet unchanged"),
            LoadOutcome::Loaded(summary) if summary.skipped.is_empty() => {
                write!(f, "loaded {} vehicle(s)", summary.loaded)
            }
            LoadOutcome::Loaded(summary) => write!(
                f,
                "loaded {} vehicle(s), skipped {} malformed line(s)",
                summary.loaded,
                summary.skipped.len()
            ),
        }
    }
}

impl Fleet {
    /// Write every vehicle to `path`, replacing any existing file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let file = File::create(path)
            .with_context(|| format!("failed to create fleet file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        for vehicle in self {
            writeln!(writer, "{}", encode_vehicle(vehicle))
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("failed to flush {}", path.display()))?;

        info!(path = %path.display(), vehicles = self.len(), "fleet saved");
        Ok(())
    }

    /// Replace the fleet with the contents of `path`.
    ///
    /// A missing file is reported as [`LoadOutcome::Missing`] and leaves the
    /// fleet as it was. Lines that are not UTF-8, fail to decode, or repeat an
    /// id already loaded are skipped with a warning. Any other I/O failure is
    /// returned as an error, again leaving the fleet untouched.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<LoadOutcome> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "fleet file not found");
                return Ok(LoadOutcome::Missing);
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to open fleet file {}", path.display()))
            }
        };

        let mut staged = Fleet::new();
        let mut summary = LoadSummary::default();
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let mut line_number = 0;
        loop {
            buf.clear();
            let read = reader.read_until(b'\n', &mut buf).with_context(|| {
                format!("failed to read line {} of {}", line_number + 1, path.display())
            })?;
            if read == 0 {
                break;
            }
            line_number += 1;

            let result = match str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => decode_vehicle(line)
                    .map_err(|err| err.to_string())
                    .and_then(|vehicle| staged.add(vehicle).map_err(|err| err.to_string())),
                Err(err) => Err(format!("line is not valid UTF-8: {err}")),
            };
            if let Err(reason) = result {
                warn!(
                    line_number,
                    %reason,
                    "skipping malformed fleet record: {}",
                    String::from_utf8_lossy(&buf).trim_end()
                );
                summary.skipped.push(SkippedLine {
                    line_number,
                    reason,
                });
            }
        }

        summary.loaded = staged.len();
        *self = staged;
        info!(
            path = %path.display(),
            loaded = summary.loaded,
            skipped = summary.skipped.len(),
            "fleet loaded"
        );
        Ok(LoadOutcome::Loaded(summary))
    }
}
