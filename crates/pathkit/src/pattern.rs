use std::io;
use std::path::Path;

use globset::{Glob, GlobBuilder};
use pathkit_base::{ErrorKind, PathkitError, PathkitResult};
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::{FilePath, lexical};

/* 📖 # Why globset for matching?

Patterns are compiled once with `literal_separator(true)` so that `*`, `?` and
classes stay inside one path component, while `**` as a whole component
crosses directories. Walking is left to walkdir; globset only decides whether a
relative path matches.
*/

/// Compile a single glob pattern.
#[instrument]
fn compile_glob(pattern: &str) -> PathkitResult<Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| {
            debug!(error = %e, "failed to compile glob pattern");
            Box::new(PathkitError::new(ErrorKind::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.kind().to_string(),
            }))
        })
}

/// Deepest level a pattern can reach, or `None` when it may cross directories.
fn pattern_depth(pattern: &str) -> Option<usize> {
    if pattern.contains("**") || pattern.contains('{') {
        return None;
    }
    Some(pattern.split('/').filter(|c| !c.is_empty()).count())
}

impl FilePath {
    /// Whether the path matches the glob `pattern`.
    pub fn matches(&self, pattern: &str) -> PathkitResult<bool> {
        let matcher = compile_glob(pattern)?.compile_matcher();
        Ok(matcher.is_match(self.as_std_path()))
    }

    /// Paths beneath this directory matching the pattern formed by joining
    /// `patterns` like [`FilePath::join`], so `./` and trailing separators are
    /// cleaned away before matching.
    ///
    /// Results are sorted depth-first by file name. A missing directory yields
    /// no matches.
    #[instrument(skip(self), fields(path = %self))]
    pub fn glob<S: AsRef<str> + std::fmt::Debug>(
        &self,
        patterns: &[S],
    ) -> PathkitResult<Vec<FilePath>> {
        let pattern = lexical::to_slash(&lexical::join(patterns));
        let matcher = compile_glob(&pattern)?.compile_matcher();

        let root = self.as_std_path();
        match std::fs::metadata(root) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("glob root not found");
                return Ok(Vec::new());
            }
            Err(e) => {
                debug!(error = %e, "failed to stat glob root");
                return Err(Box::new(PathkitError::file(root, e)));
            }
        }

        let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
        if let Some(depth) = pattern_depth(&pattern) {
            walker = walker.max_depth(depth);
        }

        let mut found = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| {
                debug!(error = %e, "error walking directory");
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
                Box::new(PathkitError::file(path, source))
            })?;
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            if matcher.is_match(relative) {
                found.push(self.join_one(relative.to_string_lossy()));
            }
        }
        debug!(matches = found.len(), "glob complete");
        Ok(found)
    }

    /// Everything matched by `*/**` beneath this directory.
    pub fn list(&self) -> PathkitResult<Vec<FilePath>> {
        self.glob(&["*", "**"])
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup_test_dir() -> (TempDir, FilePath) {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let root = FilePath::from(temp_dir.path());
        fs::write(temp_dir.path().join("top.txt"), "").unwrap();
        fs::write(temp_dir.path().join("top.rs"), "").unwrap();
        fs::create_dir_all(temp_dir.path().join("a/c")).unwrap();
        fs::write(temp_dir.path().join("a/b.txt"), "").unwrap();
        fs::write(temp_dir.path().join("a/c/d.txt"), "").unwrap();
        (temp_dir, root)
    }

    fn relative(root: &FilePath, found: &[FilePath]) -> Vec<String> {
        found
            .iter()
            .map(|p| root.rel(p).unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_matches() {
        let path = FilePath::from("dir/file.txt");
        assert!(path.matches("dir/*.txt").unwrap());
        assert!(path.matches("*/file.???").unwrap());
        assert!(!path.matches("*.txt").unwrap());
        assert!(path.matches("**/*.txt").unwrap());
        assert!(path.matches("dir/[ef]ile.txt").unwrap());
        assert!(!path.matches("dir/[!f]ile.txt").unwrap());
        assert!(path.matches("dir/file.{txt,md}").unwrap());
    }

    #[test]
    fn test_matches_invalid_pattern() {
        let err = FilePath::from("a").matches("[invalid").unwrap_err();
        match err.kind() {
            ErrorKind::InvalidPattern { pattern, .. } => assert_eq!(pattern, "[invalid"),
            other => panic!("Expected InvalidPattern, got {:?}", other),
        }
    }

    #[test]
    fn test_glob_single_level() {
        let (_temp_dir, root) = setup_test_dir();
        let found = root.glob(&["*.txt"]).unwrap();
        assert_eq!(relative(&root, &found), vec!["top.txt"]);
    }

    #[test]
    fn test_glob_joins_patterns() {
        let (_temp_dir, root) = setup_test_dir();
        let found = root.glob(&["a", "*.txt"]).unwrap();
        assert_eq!(relative(&root, &found), vec!["a/b.txt"]);
    }

    #[test]
    fn test_glob_cleans_joined_pattern() {
        let (_temp_dir, root) = setup_test_dir();
        for (patterns, expected) in [
            (vec!["a/", "*.txt"], "a/b.txt"),
            (vec!["./a", "*.txt"], "a/b.txt"),
            (vec!["a", "..", "top.txt"], "top.txt"),
        ] {
            let found = root.glob(&patterns).unwrap();
            assert_eq!(relative(&root, &found), vec![expected], "{:?}", patterns);
        }
    }

    #[test]
    fn test_glob_recursive() {
        let (_temp_dir, root) = setup_test_dir();
        let found = root.glob(&["**/*.txt"]).unwrap();
        assert_eq!(relative(&root, &found), vec!["a/b.txt", "a/c/d.txt", "top.txt"]);
    }

    #[test]
    fn test_glob_results_are_joined_to_root() {
        let (temp_dir, root) = setup_test_dir();
        let found = root.glob(&["top.rs"]).unwrap();
        assert_eq!(found, vec![FilePath::from(temp_dir.path().join("top.rs"))]);
    }

    #[test]
    fn test_glob_missing_root_is_empty() {
        let (_temp_dir, root) = setup_test_dir();
        let found = root.join_one("missing").glob(&["*"]).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_glob_invalid_pattern() {
        let (_temp_dir, root) = setup_test_dir();
        assert!(root.glob(&["[invalid"]).is_err());
    }

    #[test]
    fn test_list_matches_entries_below_first_level_directories() {
        let (_temp_dir, root) = setup_test_dir();
        let found = root.list().unwrap();
        // `*/**` needs a separator after the first component: first-level
        // entries such as "a" and "top.txt" are not listed.
        assert_eq!(relative(&root, &found), vec!["a/b.txt", "a/c", "a/c/d.txt"]);
    }

    #[test]
    fn test_pattern_depth() {
        assert_eq!(pattern_depth("*.txt"), Some(1));
        assert_eq!(pattern_depth("a/*/b"), Some(3));
        assert_eq!(pattern_depth("*/**"), None);
        assert_eq!(pattern_depth("{a,b/c}"), None);
    }
}
