//! Uniquely named transient settings files.
//!
//! Every process of a distributed run writes its own file at the same
//! logical step, so names carry a random suffix and are opened with
//! `create_new`; no lock is shared between processes.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::distr::Alphanumeric;
use rand::Rng;

use crate::error::ParamsError;
use crate::settings::VisuParameters;

const PREFIX: &str = "f2p_posti_";
const SUFFIX: &str = ".ini";
const RANDOM_CHARS: usize = 6;
const MAX_ATTEMPTS: u32 = 64;

/// A settings file on disk, removed again on drop.
///
/// The file is complete, flushed and closed by the time
/// [`create_in`](ParameterFile::create_in) returns.
#[derive(Debug)]
pub struct ParameterFile {
    path: PathBuf,
    keep: bool,
}

impl ParameterFile {
    /// Validate `params` and write them to a fresh file in `dir`.
    pub fn create_in(dir: &Path, params: &VisuParameters) -> Result<Self, ParamsError> {
        params.validate()?;
        for _ in 0..MAX_ATTEMPTS {
            let path = dir.join(candidate_name());
            let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(ParamsError::Io { path, source }),
            };
            // Owns the path from here on, so a failed write leaves nothing behind.
            let owned = Self { path, keep: false };
            if let Err(source) = write_and_close(file, params) {
                return Err(ParamsError::Io {
                    path: owned.path.clone(),
                    source,
                });
            }
            log::debug!(
                "wrote solver settings to {} ({} variables)",
                owned.path.display(),
                params.variables.len()
            );
            return Ok(owned);
        }
        Err(ParamsError::NamesExhausted {
            dir: dir.to_path_buf(),
            attempts: MAX_ATTEMPTS,
        })
    }

    /// Location of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Leave the file on disk when this value is dropped.
    pub fn keep(mut self) -> PathBuf {
        self.keep = true;
        self.path.clone()
    }
}

impl Drop for ParameterFile {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                log::warn!(
                    "could not remove settings file {}: {e}",
                    self.path.display()
                );
            }
        }
    }
}

fn candidate_name() -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(RANDOM_CHARS)
        .map(char::from)
        .collect();
    format!("{PREFIX}{suffix}{SUFFIX}")
}

fn write_and_close(file: File, params: &VisuParameters) -> io::Result<()> {
    let mut w = BufWriter::new(file);
    params.write_to(&mut w)?;
    w.flush()?;
    let file = w.into_inner().map_err(io::IntoInnerError::into_error)?;
    file.sync_all()
}
