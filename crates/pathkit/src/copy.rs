use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read};

use pathkit_base::{PathkitError, PathkitResult, ResultExt};
use tracing::{debug, instrument};

use crate::config::DEFAULT_PERMISSIONS;
use crate::ops::open_options_with_mode;
use crate::transfer::{buffered_copy, validate_buffer_size};
use crate::FilePath;

/// Outcome of [`FilePath::copy_to_file`] and [`FilePath::copy_to_directory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyReport {
    /// Path of the file that was written.
    pub destination: FilePath,
    pub bytes_copied: u64,
}

impl fmt::Display for CopyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[COPY] {} bytes to {}", self.bytes_copied, self.destination)
    }
}

/* 📖 # Why validate the buffer size in every caller?

buffered_copy rejects a zero buffer itself, but by then the callers have
already created directories, truncated files or created empty ones. Checking
first keeps a bad argument from leaving anything behind on disk.
*/

impl FilePath {
    /// Copy this file to `dest`, creating the parent directories of `dest`
    /// and truncating any existing file there.
    #[instrument(skip(self, dest), fields(path = %self, dest = %dest))]
    pub fn copy_to_file(&self, dest: &FilePath, buffer_size: usize) -> PathkitResult<CopyReport> {
        validate_buffer_size(buffer_size)?;
        let copy = || -> PathkitResult<u64> {
            dest.dir().mkdir_all(DEFAULT_PERMISSIONS)?;
            let mut source = self.open()?;
            let mut target = dest.create()?;
            buffered_copy(&mut source, &mut target, buffer_size)
        };
        let bytes_copied =
            copy().with_context(|| format!("Failed to copy {} to {}", self, dest))?;
        debug!(bytes_copied, "file copied");
        Ok(CopyReport {
            destination: dest.clone(),
            bytes_copied,
        })
    }

    /// Copy this file into `dir`, keeping its file name.
    #[instrument(skip(self, dir), fields(path = %self, dir = %dir))]
    pub fn copy_to_directory(&self, dir: &FilePath, buffer_size: usize) -> PathkitResult<CopyReport> {
        validate_buffer_size(buffer_size)?;
        self.copy_to_file(&dir.join_one(self.base()), buffer_size)
    }

    /// Append everything from `data` to this file, creating it when missing.
    #[instrument(skip(self, data), fields(path = %self))]
    pub fn append_file<R: Read + ?Sized>(
        &self,
        data: &mut R,
        buffer_size: usize,
    ) -> PathkitResult<u64> {
        validate_buffer_size(buffer_size)?;
        let mut options = open_options_with_mode(DEFAULT_PERMISSIONS);
        options.append(true).create(true);
        let mut append = || -> PathkitResult<u64> {
            let mut file = self.open_with(&options)?;
            buffered_copy(data, &mut file, buffer_size)
        };
        append().with_context(|| format!("Failed to append to {}", self))
    }

    /// Read the whole file through the transfer engine. A missing file is
    /// created empty first.
    ///
    /// On failure the bytes read so far are dropped; only their count is
    /// kept, in [`PathkitError::bytes_copied`].
    /// When the missing file cannot be created, the original not-found error
    /// is attached as the cause.
    #[instrument(skip(self), fields(path = %self))]
    pub fn buffered_read_file(&self, buffer_size: usize) -> PathkitResult<Vec<u8>> {
        validate_buffer_size(buffer_size)?;
        let read = || -> PathkitResult<Vec<u8>> {
            let mut file = match OpenOptions::new().read(true).open(self) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!("creating missing file before reading");
                    let not_found = PathkitError::file(self.as_std_path(), e);
                    let mut options = open_options_with_mode(DEFAULT_PERMISSIONS);
                    options.write(true).create(true);
                    let reopen = || -> PathkitResult<File> {
                        drop(self.open_with(&options)?);
                        self.open()
                    };
                    reopen().map_err(|err| Box::new((*err).caused_by(not_found)))?
                }
                Err(e) => {
                    debug!(error = %e, "failed to open file");
                    return Err(self.file_error(e));
                }
            };
            let mut data = Vec::new();
            buffered_copy(&mut file, &mut data, buffer_size)?;
            Ok(data)
        };
        read().with_context(|| format!("Failed to read {}", self))
    }

    /// Write everything from `data` to the start of this file, creating it
    /// when missing.
    ///
    /// The file is not truncated: when it is longer than `data`, the bytes
    /// past the written range remain.
    #[instrument(skip(self, data), fields(path = %self))]
    pub fn buffered_write_file<R: Read + ?Sized>(
        &self,
        data: &mut R,
        buffer_size: usize,
    ) -> PathkitResult<u64> {
        validate_buffer_size(buffer_size)?;
        let mut options = open_options_with_mode(DEFAULT_PERMISSIONS);
        options.write(true).create(true);
        let mut write = || -> PathkitResult<u64> {
            let mut file = self.open_with(&options)?;
            buffered_copy(data, &mut file, buffer_size)
        };
        write().with_context(|| format!("Failed to write {}", self))
    }
}
