use std::fmt;
use std::path::{Path, PathBuf};

use pathkit_base::{ErrorKind, PathkitError, PathkitResult};
use tracing::{debug, instrument};

use crate::lexical;

/* 📖 # Why wrap a String instead of PathBuf?

Every derivation here is lexical and defined on the path text: clean, split,
rel and friends must behave identically whether or not the path exists. A
String keeps that text exactly as the caller wrote it. PathBuf normalizes on
iteration and hides separators, which would make `split` and `base` disagree
with what callers passed in.

The inner string is private. New paths come from `From` conversions or from
the derivation methods, so a FilePath is never edited in place.
*/

/// Immutable, string-backed identifier for a filesystem location.
///
/// Construction performs no canonicalization; call [`FilePath::clean`],
/// [`FilePath::abs`] or [`FilePath::eval_symlinks`] when needed. Queries never
/// cache filesystem state.
///
/// # Examples
///
/// ```
/// use pathkit::FilePath;
///
/// let path = FilePath::from("/a/b/file.txt");
/// assert_eq!(path.add_postfix(".bak").as_str(), "/a/b/file.bak.txt");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FilePath(String);

impl FilePath {
    /// The path text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Borrow as a std path for use with std::fs.
    pub fn as_std_path(&self) -> &Path {
        Path::new(&self.0)
    }

    pub fn into_path_buf(self) -> PathBuf {
        PathBuf::from(self.0)
    }

    /// Join the path with each element and clean the result.
    pub fn join<S: AsRef<str>>(&self, elements: &[S]) -> FilePath {
        let mut all: Vec<&str> = Vec::with_capacity(elements.len() + 1);
        all.push(&self.0);
        all.extend(elements.iter().map(|e| e.as_ref()));
        FilePath(lexical::join(&all))
    }

    pub fn join_one(&self, element: impl AsRef<str>) -> FilePath {
        self.join(&[element])
    }

    /// All but the last element.
    pub fn dir(&self) -> FilePath {
        FilePath(lexical::dir(&self.0))
    }

    /// Last element.
    pub fn base(&self) -> &str {
        lexical::base(&self.0)
    }

    /// Extension of the last element including the dot, or "".
    pub fn ext(&self) -> &str {
        lexical::ext(&self.0)
    }

    pub fn clean(&self) -> FilePath {
        FilePath(lexical::clean(&self.0))
    }

    pub fn to_slash(&self) -> String {
        lexical::to_slash(&self.0)
    }

    pub fn from_slash(path: &str) -> FilePath {
        FilePath(lexical::from_slash(path))
    }

    /// Split after the final separator into `(dir, file)`.
    pub fn split(&self) -> (&str, &str) {
        lexical::split(&self.0)
    }

    /// Split into `(dir, stem, ext)`.
    pub fn split_all(&self) -> (&str, &str, &str) {
        let (dir, file) = self.split();
        let ext = lexical::ext(file);
        let stem = &file[..file.len() - ext.len()];
        (dir, stem, ext)
    }

    /// Lexical path of `target` relative to this path.
    #[instrument(level = "trace", skip_all, fields(base = %self, target = %target))]
    pub fn rel(&self, target: &FilePath) -> PathkitResult<FilePath> {
        lexical::rel(&self.0, &target.0).map(FilePath).ok_or_else(|| {
            debug!("no lexical relative path");
            Box::new(PathkitError::new(ErrorKind::NoRelativePath {
                base: self.0.clone(),
                target: target.0.clone(),
            }))
        })
    }

    /// Prepend `prefix` to the file name.
    pub fn add_prefix(&self, prefix: &str) -> FilePath {
        let (dir, file) = self.split();
        let file = format!("{}{}", prefix, file);
        FilePath(lexical::join(&[dir, file.as_str()]))
    }

    /// Insert `postfix` between the file stem and its extension.
    pub fn add_postfix(&self, postfix: &str) -> FilePath {
        let (dir, stem, ext) = self.split_all();
        let file = format!("{}{}{}", stem, postfix, ext);
        FilePath(lexical::join(&[dir, file.as_str()]))
    }

    pub fn volume_name(&self) -> &str {
        lexical::volume_name(&self.0)
    }

    pub fn is_abs(&self) -> bool {
        self.as_std_path().is_absolute()
    }

    /// Absolute, cleaned form resolved against the current working directory.
    #[instrument(skip(self), fields(path = %self))]
    pub fn abs(&self) -> PathkitResult<FilePath> {
        if self.is_abs() {
            return Ok(self.clean());
        }
        let cwd = std::env::current_dir().map_err(|e| {
            debug!(error = %e, "failed to read working directory");
            Box::new(PathkitError::file(self.as_std_path(), e))
        })?;
        Ok(FilePath::from(cwd).join_one(&self.0))
    }

    /// Resolve every symbolic link in the path.
    #[instrument(skip(self), fields(path = %self))]
    pub fn eval_symlinks(&self) -> PathkitResult<FilePath> {
        let resolved = std::fs::canonicalize(self.as_std_path()).map_err(|e| {
            debug!(error = %e, "failed to resolve symlinks");
            Box::new(PathkitError::file(self.as_std_path(), e))
        })?;
        debug!(resolved = %resolved.display(), "resolved symlinks");
        Ok(FilePath::from(resolved))
    }
}

/// Split an OS path list such as `PATH` into its elements.
pub fn split_list(list: &str) -> Vec<FilePath> {
    lexical::split_list(list)
        .into_iter()
        .map(FilePath)
        .collect()
}

impl From<&str> for FilePath {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FilePath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&String> for FilePath {
    fn from(s: &String) -> Self {
        Self(s.clone())
    }
}

impl From<&Path> for FilePath {
    fn from(p: &Path) -> Self {
        Self(p.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for FilePath {
    fn from(p: PathBuf) -> Self {
        Self(p.to_string_lossy().into_owned())
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<Path> for FilePath {
    fn as_ref(&self) -> &Path {
        self.as_std_path()
    }
}

impl AsRef<str> for FilePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_file_path_from_str() {
        let path = FilePath::from("src/main.rs");
        assert_eq!(path.as_std_path(), Path::new("src/main.rs"));
        assert_eq!(path.as_str(), "src/main.rs");
    }

    #[test]
    fn test_file_path_from_pathbuf() {
        let pb = PathBuf::from("docs/readme.md");
        assert_eq!(FilePath::from(pb.as_path()).as_str(), "docs/readme.md");
        assert_eq!(FilePath::from(pb).as_str(), "docs/readme.md");
    }

    #[test]
    fn test_construction_does_not_clean() {
        let path = FilePath::from("a//b/../c/");
        assert_eq!(path.as_str(), "a//b/../c/");
        assert_eq!(path.clean().as_str(), "a/c");
    }

    #[test]
    fn test_file_path_equality_is_string_equality() {
        assert_eq!(FilePath::from("test.txt"), FilePath::from("test.txt"));
        assert_ne!(FilePath::from("a/b"), FilePath::from("a//b"));
    }

    #[test]
    fn test_file_path_hash() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(FilePath::from("test1.txt"));
        set.insert(FilePath::from("test2.txt"));
        assert!(set.contains(&FilePath::from("test1.txt")));
        assert!(!set.contains(&FilePath::from("test3.txt")));
    }

    #[test]
    fn test_file_path_display() {
        assert_eq!(FilePath::from("src/main.rs").to_string(), "src/main.rs");
    }

    #[test]
    fn test_join() {
        let root = FilePath::from("/tmp/dest");
        assert_eq!(root.join(&["a", "b.txt"]).as_str(), "/tmp/dest/a/b.txt");
        assert_eq!(root.join_one("../x").as_str(), "/tmp/x");
        assert_eq!(FilePath::from("").join(&["", ""]).as_str(), "");
        assert_eq!(FilePath::from("").join_one("a").as_str(), "a");
    }

    #[test]
    fn test_dir_base_ext() {
        let path = FilePath::from("/a/b/c");
        assert_eq!(path.dir().as_str(), "/a/b");
        assert_eq!(path.base(), "c");
        assert_eq!(FilePath::from("file").dir().as_str(), ".");
        assert_eq!(FilePath::from("/").dir().as_str(), "/");
        assert_eq!(FilePath::from("/").base(), "/");
        assert_eq!(FilePath::from("").base(), ".");
        assert_eq!(FilePath::from("a/b.tar.gz").ext(), ".gz");
    }

    #[test]
    fn test_split_reassembles() {
        for raw in ["a/b", "a/b/", "/", "", "file", "/x/y/z.txt"] {
            let path = FilePath::from(raw);
            let (dir, file) = path.split();
            assert_eq!(format!("{}{}", dir, file), raw);
        }
    }

    #[test]
    fn test_split_all() {
        let path = FilePath::from("/a/b/file.txt");
        assert_eq!(path.split_all(), ("/a/b/", "file", ".txt"));
        assert_eq!(FilePath::from("README").split_all(), ("", "README", ""));
    }

    #[test]
    fn test_add_prefix() {
        let path = FilePath::from("/a/b/file.txt");
        assert_eq!(path.add_prefix("tmp_").as_str(), "/a/b/tmp_file.txt");
        assert_eq!(FilePath::from("file").add_prefix("x").as_str(), "xfile");
    }

    #[test]
    fn test_add_postfix() {
        let path = FilePath::from("/a/b/file.txt");
        assert_eq!(path.add_postfix(".bak").as_str(), "/a/b/file.bak.txt");
        assert_eq!(FilePath::from("notes").add_postfix("_v2").as_str(), "notes_v2");
    }

    #[test]
    fn test_rel() {
        let base = FilePath::from("/a/b");
        assert_eq!(base.rel(&FilePath::from("/a/b/c/d")).unwrap().as_str(), "c/d");
        assert_eq!(base.rel(&FilePath::from("/c/d")).unwrap().as_str(), "../../c/d");
        assert_eq!(base.rel(&FilePath::from("/a/b/")).unwrap().as_str(), ".");
    }

    #[test]
    fn test_rel_rooted_and_unrooted_fails() {
        let err = FilePath::from("/a")
            .rel(&FilePath::from("b"))
            .unwrap_err();
        match err.kind() {
            ErrorKind::NoRelativePath { base, target } => {
                assert_eq!(base, "/a");
                assert_eq!(target, "b");
            }
            other => panic!("Expected NoRelativePath, got {:?}", other),
        }

        assert!(FilePath::from("a").rel(&FilePath::from("/b")).is_err());
    }

    #[test]
    fn test_volume_name_and_is_abs() {
        assert_eq!(FilePath::from("/a").volume_name(), "");
        assert!(FilePath::from("/a").is_abs());
        assert!(!FilePath::from("a/b").is_abs());
    }

    #[test]
    fn test_abs_cleans_absolute_paths() {
        assert_eq!(FilePath::from("/a/./b/../c").abs().unwrap().as_str(), "/a/c");
    }

    #[test]
    fn test_abs_resolves_relative_paths() {
        let abs = FilePath::from("some/file").abs().unwrap();
        assert!(abs.is_abs());
        assert!(abs.as_str().ends_with("/some/file"));
    }

    #[test]
    fn test_eval_symlinks() {
        let temp_dir = tempfile::TempDir::new().expect("failed to create temp dir");
        let target = temp_dir.path().join("target.txt");
        std::fs::write(&target, "x").unwrap();
        let link = temp_dir.path().join("link.txt");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let resolved = FilePath::from(link).eval_symlinks().unwrap();
        let expected = std::fs::canonicalize(&target).unwrap();
        assert_eq!(resolved.as_std_path(), expected.as_path());
    }

    #[test]
    fn test_eval_symlinks_missing_path() {
        let err = FilePath::from("/definitely/not/here/x")
            .eval_symlinks()
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_split_list() {
        assert!(split_list("").is_empty());
        assert_eq!(
            split_list("/bin:/usr/bin"),
            vec![FilePath::from("/bin"), FilePath::from("/usr/bin")]
        );
    }
}
