use std::path::PathBuf;

use pathkit_base::{ErrorKind, PathkitError, PathkitResult, ResultExt};
use tracing::{debug, instrument};

use crate::FilePath;

/* 📖 # Why an explicit Environment instead of globals?

The working directory can change at any time through `chdir`. A value cached
at startup would silently go stale, so the captured values live in a plain
struct that the caller owns and refreshes. Code that needs the live value asks
`FilePath::current_dir()` instead.
*/

/// Working directory and executable path captured at a point in time, both
/// with symlinks resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    working_directory: FilePath,
    executable: FilePath,
}

impl Environment {
    /// Capture the current working directory and executable path.
    #[instrument]
    pub fn capture() -> PathkitResult<Self> {
        let working_directory = FilePath::current_dir()?
            .eval_symlinks()
            .context("Failed to resolve working directory")?;
        let executable = FilePath::current_exe()?
            .eval_symlinks()
            .context("Failed to resolve executable path")?;
        debug!(%working_directory, %executable, "environment captured");
        Ok(Self {
            working_directory,
            executable,
        })
    }

    /// Recompute both values. Needed after the working directory changes.
    pub fn refresh(&mut self) -> PathkitResult<()> {
        *self = Self::capture()?;
        Ok(())
    }

    pub fn working_directory(&self) -> &FilePath {
        &self.working_directory
    }

    pub fn executable(&self) -> &FilePath {
        &self.executable
    }

    /// Directory containing the executable.
    pub fn executable_dir(&self) -> FilePath {
        self.executable.dir()
    }
}

impl FilePath {
    /// The live working directory.
    pub fn current_dir() -> PathkitResult<FilePath> {
        std::env::current_dir().map(FilePath::from).map_err(|e| {
            debug!(error = %e, "failed to read working directory");
            Box::new(PathkitError::file("<current_dir>", e))
        })
    }

    /// Path of the running executable.
    pub fn current_exe() -> PathkitResult<FilePath> {
        std::env::current_exe().map(FilePath::from).map_err(|e| {
            debug!(error = %e, "failed to get current executable path");
            Box::new(PathkitError::file("<current_exe>", e))
        })
    }
}

/// The system temporary directory.
pub fn temp_dir() -> FilePath {
    FilePath::from(std::env::temp_dir())
}

pub fn user_cache_dir() -> PathkitResult<FilePath> {
    user_dir("cache", dirs::cache_dir())
}

pub fn user_config_dir() -> PathkitResult<FilePath> {
    user_dir("config", dirs::config_dir())
}

pub fn user_home_dir() -> PathkitResult<FilePath> {
    user_dir("home", dirs::home_dir())
}

fn user_dir(name: &'static str, dir: Option<PathBuf>) -> PathkitResult<FilePath> {
    dir.map(FilePath::from).ok_or_else(|| {
        debug!(name, "per-user directory unavailable");
        Box::new(PathkitError::new(ErrorKind::DirectoryUnavailable { name }))
    })
}
