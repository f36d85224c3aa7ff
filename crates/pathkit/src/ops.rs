use std::fs::{self, DirBuilder, File, Metadata, OpenOptions};
use std::io::{self, Write};
use std::time::SystemTime;

use filetime::FileTime;
use pathkit_base::{PathkitError, PathkitResult};
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::FilePath;

/* 📖 # Why are these thin wrappers?

Each operation hands the path string straight to the OS primitive: no retries,
no validation and no caching. What gets added is uniform: a span carrying the
path, a debug event with the outcome and a `FileError` naming the path when the
OS refuses.
*/

impl FilePath {
    pub(crate) fn file_error(&self, source: io::Error) -> Box<PathkitError> {
        Box::new(PathkitError::file(self.as_std_path(), source))
    }

    /// Metadata, following symlinks.
    #[instrument(skip(self), fields(path = %self))]
    pub fn stat(&self) -> PathkitResult<Metadata> {
        fs::metadata(self).map_err(|e| {
            debug!(error = %e, "stat failed");
            self.file_error(e)
        })
    }

    /// Metadata of the link itself.
    #[instrument(skip(self), fields(path = %self))]
    pub fn lstat(&self) -> PathkitResult<Metadata> {
        fs::symlink_metadata(self).map_err(|e| {
            debug!(error = %e, "lstat failed");
            self.file_error(e)
        })
    }

    /// `Ok(false)` when the path does not exist; any other failure to stat is
    /// returned as an error.
    #[instrument(skip(self), fields(path = %self))]
    pub fn try_exists(&self) -> PathkitResult<bool> {
        match fs::metadata(self) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => {
                debug!(error = %e, "existence check failed");
                Err(self.file_error(e))
            }
        }
    }

    /// True only when the path can be stat'ed.
    #[instrument(skip(self), fields(path = %self))]
    pub fn is_exist(&self) -> bool {
        let exists = fs::metadata(self).is_ok();
        debug!(exists, "checked existence");
        exists
    }

    /// True only when the path can be stat'ed and is a directory.
    #[instrument(skip(self), fields(path = %self))]
    pub fn is_dir(&self) -> bool {
        let is_dir = fs::metadata(self).map(|m| m.is_dir()).unwrap_or(false);
        debug!(is_dir, "checked directory");
        is_dir
    }

    /// Open read-only.
    #[instrument(skip(self), fields(path = %self))]
    pub fn open(&self) -> PathkitResult<File> {
        File::open(self).map_err(|e| {
            debug!(error = %e, "failed to open file");
            self.file_error(e)
        })
    }

    #[instrument(skip(self, options), fields(path = %self))]
    pub fn open_with(&self, options: &OpenOptions) -> PathkitResult<File> {
        options.open(self).map_err(|e| {
            debug!(error = %e, "failed to open file");
            self.file_error(e)
        })
    }

    /// Create or truncate for writing.
    #[instrument(skip(self), fields(path = %self))]
    pub fn create(&self) -> PathkitResult<File> {
        File::create(self).map_err(|e| {
            debug!(error = %e, "failed to create file");
            self.file_error(e)
        })
    }

    /// Create a new file in this directory. A `*` in `pattern` is replaced by
    /// a random string; without one the random string is appended. The file
    /// is kept after the handle is dropped.
    #[instrument(skip(self), fields(path = %self))]
    pub fn create_temp(&self, pattern: &str) -> PathkitResult<(FilePath, File)> {
        let (prefix, suffix) = split_temp_pattern(pattern);
        let named = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(self)
            .map_err(|e| {
                debug!(error = %e, "failed to create temp file");
                self.file_error(e)
            })?;
        let (file, path) = named.keep().map_err(|e| {
            debug!(error = %e, "failed to keep temp file");
            self.file_error(e.error)
        })?;
        debug!(created = %path.display(), "temp file created");
        Ok((FilePath::from(path), file))
    }

    /// Create a directory with the given permission bits (Unix).
    #[instrument(skip(self), fields(path = %self))]
    pub fn mkdir(&self, mode: u32) -> PathkitResult<()> {
        dir_builder(mode).create(self).map_err(|e| {
            debug!(error = %e, "failed to create directory");
            self.file_error(e)
        })
    }

    /// Create a directory and any missing parents.
    #[instrument(skip(self), fields(path = %self))]
    pub fn mkdir_all(&self, mode: u32) -> PathkitResult<()> {
        let mut builder = dir_builder(mode);
        builder.recursive(true);
        builder.create(self).map_err(|e| {
            debug!(error = %e, "failed to create directory and parents");
            self.file_error(e)
        })
    }

    /// Create a new directory inside this one, named after `pattern` like
    /// [`FilePath::create_temp`]. The directory is kept.
    #[instrument(skip(self), fields(path = %self))]
    pub fn mkdir_temp(&self, pattern: &str) -> PathkitResult<FilePath> {
        let (prefix, suffix) = split_temp_pattern(pattern);
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempdir_in(self)
            .map_err(|e| {
                debug!(error = %e, "failed to create temp directory");
                self.file_error(e)
            })?;
        let path = dir.keep();
        debug!(created = %path.display(), "temp directory created");
        Ok(FilePath::from(path))
    }

    /// Remove a file or an empty directory.
    #[instrument(skip(self), fields(path = %self))]
    pub fn remove(&self) -> PathkitResult<()> {
        let metadata = self.lstat()?;
        let result = if metadata.is_dir() {
            fs::remove_dir(self)
        } else {
            fs::remove_file(self)
        };
        result.map_err(|e| {
            debug!(error = %e, "failed to remove");
            self.file_error(e)
        })
    }

    /// Remove the path and everything beneath it. Succeeds when the path is
    /// already gone.
    #[instrument(skip(self), fields(path = %self))]
    pub fn remove_all(&self) -> PathkitResult<()> {
        let result = match fs::symlink_metadata(self) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("nothing to remove");
                return Ok(());
            }
            Err(e) => Err(e),
            Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(self),
            Ok(_) => fs::remove_file(self),
        };
        result.map_err(|e| {
            debug!(error = %e, "failed to remove recursively");
            self.file_error(e)
        })
    }

    #[instrument(skip(self, new), fields(path = %self, new = %new))]
    pub fn rename(&self, new: &FilePath) -> PathkitResult<()> {
        fs::rename(self, new).map_err(|e| {
            debug!(error = %e, "failed to rename");
            self.file_error(e)
        })
    }

    /// Create `link` as a symbolic link pointing at this path.
    #[instrument(skip(self, link), fields(path = %self, link = %link))]
    pub fn symlink(&self, link: &FilePath) -> PathkitResult<()> {
        #[cfg(unix)]
        let result = std::os::unix::fs::symlink(self, link);
        #[cfg(windows)]
        let result = if self.is_dir() {
            std::os::windows::fs::symlink_dir(self, link)
        } else {
            std::os::windows::fs::symlink_file(self, link)
        };
        result.map_err(|e| {
            debug!(error = %e, "failed to create symlink");
            link.file_error(e)
        })
    }

    /// Create `new` as a hard link to this path.
    #[instrument(skip(self, new), fields(path = %self, new = %new))]
    pub fn link(&self, new: &FilePath) -> PathkitResult<()> {
        fs::hard_link(self, new).map_err(|e| {
            debug!(error = %e, "failed to create hard link");
            new.file_error(e)
        })
    }

    #[instrument(skip(self), fields(path = %self))]
    pub fn read_link(&self) -> PathkitResult<FilePath> {
        let target = fs::read_link(self).map_err(|e| {
            debug!(error = %e, "failed to read link");
            self.file_error(e)
        })?;
        Ok(FilePath::from(target))
    }

    /// Set permission bits. Outside Unix only the owner-write bit is honored,
    /// as the read-only flag.
    #[instrument(skip(self), fields(path = %self))]
    pub fn chmod(&self, mode: u32) -> PathkitResult<()> {
        #[cfg(unix)]
        let permissions = {
            use std::os::unix::fs::PermissionsExt;
            fs::Permissions::from_mode(mode)
        };
        #[cfg(not(unix))]
        let permissions = {
            let mut permissions = self.stat()?.permissions();
            permissions.set_readonly(mode & 0o200 == 0);
            permissions
        };
        fs::set_permissions(self, permissions).map_err(|e| {
            debug!(error = %e, "failed to change permissions");
            self.file_error(e)
        })
    }

    /// Change owner and group; `None` leaves the id unchanged.
    #[cfg(unix)]
    #[instrument(skip(self), fields(path = %self))]
    pub fn chown(&self, uid: Option<u32>, gid: Option<u32>) -> PathkitResult<()> {
        std::os::unix::fs::chown(self, uid, gid).map_err(|e| {
            debug!(error = %e, "failed to change owner");
            self.file_error(e)
        })
    }

    /// Like [`FilePath::chown`] without following a final symlink.
    #[cfg(unix)]
    #[instrument(skip(self), fields(path = %self))]
    pub fn lchown(&self, uid: Option<u32>, gid: Option<u32>) -> PathkitResult<()> {
        std::os::unix::fs::lchown(self, uid, gid).map_err(|e| {
            debug!(error = %e, "failed to change link owner");
            self.file_error(e)
        })
    }

    /// Set access and modification times.
    #[instrument(skip(self), fields(path = %self))]
    pub fn chtimes(&self, atime: SystemTime, mtime: SystemTime) -> PathkitResult<()> {
        filetime::set_file_times(
            self,
            FileTime::from_system_time(atime),
            FileTime::from_system_time(mtime),
        )
        .map_err(|e| {
            debug!(error = %e, "failed to set file times");
            self.file_error(e)
        })
    }

    /// Resize an existing file.
    #[instrument(skip(self), fields(path = %self))]
    pub fn truncate(&self, size: u64) -> PathkitResult<()> {
        let file = OpenOptions::new().write(true).open(self).map_err(|e| {
            debug!(error = %e, "failed to open file for truncation");
            self.file_error(e)
        })?;
        file.set_len(size).map_err(|e| {
            debug!(error = %e, "failed to truncate");
            self.file_error(e)
        })
    }

    #[instrument(skip(self), fields(path = %self))]
    pub fn read_file(&self) -> PathkitResult<Vec<u8>> {
        let data = fs::read(self).map_err(|e| {
            debug!(error = %e, "failed to read file");
            self.file_error(e)
        })?;
        debug!(bytes = data.len(), "file read");
        Ok(data)
    }

    /// Write `data`, creating the file with `mode` or truncating it.
    #[instrument(skip(self, data), fields(path = %self, bytes = data.len()))]
    pub fn write_file(&self, data: &[u8], mode: u32) -> PathkitResult<()> {
        let mut options = open_options_with_mode(mode);
        options.write(true).create(true).truncate(true);
        let mut file = self.open_with(&options)?;
        file.write_all(data).map_err(|e| {
            debug!(error = %e, "failed to write file");
            self.file_error(e)
        })
    }

    /// Directory entries sorted by file name.
    #[instrument(skip(self), fields(path = %self))]
    pub fn read_dir(&self) -> PathkitResult<Vec<fs::DirEntry>> {
        let mut entries = fs::read_dir(self)
            .and_then(|dir| dir.collect::<io::Result<Vec<_>>>())
            .map_err(|e| {
                debug!(error = %e, "failed to read directory");
                self.file_error(e)
            })?;
        entries.sort_by_key(|entry| entry.file_name());
        debug!(entries = entries.len(), "directory read");
        Ok(entries)
    }

    /// This path followed by every descendant, depth-first, sorted by file
    /// name within each directory.
    pub fn walk(&self) -> impl Iterator<Item = PathkitResult<FilePath>> + use<> {
        let root = self.clone();
        WalkDir::new(self)
            .sort_by_file_name()
            .into_iter()
            .map(move |entry| match entry {
                Ok(entry) => Ok(FilePath::from(entry.path())),
                Err(e) => {
                    debug!(error = %e, "error walking directory");
                    let path = e
                        .path()
                        .map(FilePath::from)
                        .unwrap_or_else(|| root.clone());
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
                    Err(path.file_error(source))
                }
            })
    }

    /// Change the process working directory to this path.
    #[instrument(skip(self), fields(path = %self))]
    pub fn chdir(&self) -> PathkitResult<()> {
        std::env::set_current_dir(self).map_err(|e| {
            debug!(error = %e, "failed to change directory");
            self.file_error(e)
        })
    }
}

/// Split a temp name pattern at its last `*` into prefix and suffix.
fn split_temp_pattern(pattern: &str) -> (&str, &str) {
    match pattern.rfind('*') {
        Some(i) => (&pattern[..i], &pattern[i + 1..]),
        None => (pattern, ""),
    }
}

fn dir_builder(mode: u32) -> DirBuilder {
    let mut builder = DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    builder
}

/// `OpenOptions` that create files with `mode` (Unix).
pub(crate) fn open_options_with_mode(mode: u32) -> OpenOptions {
    let mut options = OpenOptions::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    options
}
