//! Lexical path algorithms over plain strings.
//!
//! Nothing in here touches the filesystem. Separators are the platform's
//! (`/` on Unix, `\` and `/` on Windows); volume names are only recognized on
//! Windows.

use std::path::{Component, MAIN_SEPARATOR, MAIN_SEPARATOR_STR, Path, is_separator};

/// Length of the leading volume name: `C:` or `\\host\share`. Always 0 on Unix.
pub(crate) fn volume_name_len(path: &str) -> usize {
    match Path::new(path).components().next() {
        Some(Component::Prefix(prefix)) => prefix.as_os_str().len(),
        _ => 0,
    }
}

pub(crate) fn volume_name(path: &str) -> &str {
    &path[..volume_name_len(path)]
}

pub(crate) fn to_slash(path: &str) -> String {
    if MAIN_SEPARATOR == '/' {
        path.to_string()
    } else {
        path.replace(MAIN_SEPARATOR, "/")
    }
}

pub(crate) fn from_slash(path: &str) -> String {
    if MAIN_SEPARATOR == '/' {
        path.to_string()
    } else {
        path.replace('/', MAIN_SEPARATOR_STR)
    }
}

/// Shortest lexically equivalent path.
///
/// Repeated separators collapse, `.` elements vanish, `..` consumes the
/// preceding element, and `..` directly under the root is dropped. An empty
/// result becomes `.`.
pub(crate) fn clean(path: &str) -> String {
    path_clean::clean(path).to_string_lossy().into_owned()
}

/// Join elements with the separator and clean the result. Leading empty
/// elements are ignored; all-empty input yields an empty string.
pub(crate) fn join<S: AsRef<str>>(elements: &[S]) -> String {
    match elements.iter().position(|e| !e.as_ref().is_empty()) {
        Some(first) => {
            let joined = elements[first..]
                .iter()
                .map(|e| e.as_ref())
                .collect::<Vec<_>>()
                .join(MAIN_SEPARATOR_STR);
            clean(&joined)
        }
        None => String::new(),
    }
}

/// Split immediately after the final separator. `dir` keeps its trailing
/// separator, so `dir + file` is the original path.
pub(crate) fn split(path: &str) -> (&str, &str) {
    let vol_len = volume_name_len(path);
    let at = path[vol_len..]
        .rfind(is_separator)
        .map(|i| vol_len + i + 1)
        .unwrap_or(vol_len);
    path.split_at(at)
}

/// Last element, ignoring trailing separators.
pub(crate) fn base(path: &str) -> &str {
    if path.is_empty() {
        return ".";
    }
    let trimmed = path.trim_end_matches(is_separator);
    let trimmed = &trimmed[volume_name_len(trimmed)..];
    let name = match trimmed.rfind(is_separator) {
        Some(i) => &trimmed[i + 1..],
        None => trimmed,
    };
    if name.is_empty() {
        MAIN_SEPARATOR_STR
    } else {
        name
    }
}

/// Everything but the last element, cleaned.
pub(crate) fn dir(path: &str) -> String {
    let vol_len = volume_name_len(path);
    let (volume, rest) = path.split_at(vol_len);
    let end = rest.rfind(is_separator).map(|i| i + 1).unwrap_or(0);
    let dir = clean(&rest[..end]);
    if dir == "." && vol_len > 2 {
        // UNC root
        return volume.to_string();
    }
    format!("{}{}", volume, dir)
}

/// Suffix from the final dot of the last element, or empty.
pub(crate) fn ext(path: &str) -> &str {
    for (i, c) in path.char_indices().rev() {
        if is_separator(c) {
            break;
        }
        if c == '.' {
            return &path[i..];
        }
    }
    ""
}

fn same_word(a: &str, b: &str) -> bool {
    if cfg!(windows) {
        a.to_lowercase() == b.to_lowercase()
    } else {
        a == b
    }
}

/// Lexical path of `target` relative to `base`, or `None` when no such path
/// exists without knowing the working directory.
pub(crate) fn rel(base_path: &str, target_path: &str) -> Option<String> {
    let base_vol = volume_name(base_path);
    let target_vol = volume_name(target_path);
    let base = clean(base_path);
    let target = clean(target_path);
    if same_word(&target, &base) {
        return Some(".".to_string());
    }

    let mut base = &base[base_vol.len()..];
    let target = &target[target_vol.len()..];
    if base == "." {
        base = "";
    } else if base.is_empty() && base_vol.len() > 2 {
        base = MAIN_SEPARATOR_STR;
    }

    let base_rooted = base.starts_with(is_separator);
    let target_rooted = target.starts_with(is_separator);
    if base_rooted != target_rooted || !same_word(base_vol, target_vol) {
        return None;
    }

    // pathdiff walks past a leading `..` of the base, which has no lexical answer
    let base_parts: Vec<&str> = base
        .split(is_separator)
        .filter(|part| !part.is_empty() && *part != ".")
        .collect();
    let common = base_parts
        .iter()
        .zip(target.split(is_separator).filter(|part| !part.is_empty() && *part != "."))
        .take_while(|(b, t)| same_word(b, t))
        .count();
    if base_parts.get(common) == Some(&"..") {
        return None;
    }

    let target = if target == "." { "" } else { target };
    let relative = pathdiff::diff_paths(target, base)?;
    if relative.as_os_str().is_empty() {
        return Some(".".to_string());
    }
    Some(relative.to_string_lossy().into_owned())
}

/// Split an OS path list such as `PATH`. An empty list has no elements.
pub(crate) fn split_list(list: &str) -> Vec<String> {
    if list.is_empty() {
        return Vec::new();
    }
    std::env::split_paths(list)
        .map(|path| path.to_string_lossy().into_owned())
        .collect()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_clean() {
        let cases = [
            ("abc", "abc"),
            ("abc/def", "abc/def"),
            ("", "."),
            (".", "."),
            ("..", ".."),
            ("../../abc", "../../abc"),
            ("/", "/"),
            ("/abc/", "/abc"),
            ("abc//def//ghi", "abc/def/ghi"),
            ("//abc//", "/abc"),
            ("abc/./def", "abc/def"),
            ("/./abc/def", "/abc/def"),
            ("abc/.", "abc"),
            ("./", "."),
            ("../", ".."),
            ("abc/def/ghi/../jkl", "abc/def/jkl"),
            ("abc/def/../ghi/../jkl", "abc/jkl"),
            ("abc/def/../..", "."),
            ("/abc/def/../..", "/"),
            ("abc/def/../../..", ".."),
            ("/abc/def/../../..", "/"),
            ("abc/def/../../../ghi/jkl/../../../mno", "../../mno"),
            ("/../abc", "/abc"),
            ("../../abc/../..", "../../.."),
            ("a/../../b/./c", "../b/c"),
        ];
        for (input, expected) in cases {
            assert_eq!(clean(input), expected, "clean({:?})", input);
        }
    }

    #[test]
    fn test_join() {
        assert_eq!(join(&["a", "b", "c"]), "a/b/c");
        assert_eq!(join(&["a", "", "c"]), "a/c");
        assert_eq!(join(&["", "b"]), "b");
        assert_eq!(join(&["/", "a"]), "/a");
        assert_eq!(join(&["a/", "../b"]), "b");
        assert_eq!(join::<&str>(&["", ""]), "");
        assert_eq!(join::<&str>(&[]), "");
    }

    #[test]
    fn test_split() {
        assert_eq!(split("a/b"), ("a/", "b"));
        assert_eq!(split("a/b/"), ("a/b/", ""));
        assert_eq!(split("a/"), ("a/", ""));
        assert_eq!(split("a"), ("", "a"));
        assert_eq!(split("/"), ("/", ""));
        assert_eq!(split(""), ("", ""));
    }

    #[test]
    fn test_base() {
        assert_eq!(base(""), ".");
        assert_eq!(base("."), ".");
        assert_eq!(base("/."), ".");
        assert_eq!(base("/"), "/");
        assert_eq!(base("////"), "/");
        assert_eq!(base("x/"), "x");
        assert_eq!(base("abc"), "abc");
        assert_eq!(base("abc/def"), "def");
        assert_eq!(base("a/b/.x"), ".x");
        assert_eq!(base("a/b/c."), "c.");
        assert_eq!(base("a/b/c.x"), "c.x");
    }

    #[test]
    fn test_dir() {
        assert_eq!(dir(""), ".");
        assert_eq!(dir("."), ".");
        assert_eq!(dir("/."), "/");
        assert_eq!(dir("/"), "/");
        assert_eq!(dir("////"), "/");
        assert_eq!(dir("/foo"), "/");
        assert_eq!(dir("x/"), "x");
        assert_eq!(dir("abc"), ".");
        assert_eq!(dir("abc/def"), "abc");
        assert_eq!(dir("a/b/.x"), "a/b");
        assert_eq!(dir("a/b/c."), "a/b");
        assert_eq!(dir("a/b/c.x"), "a/b");
    }

    #[test]
    fn test_ext() {
        assert_eq!(ext("path.go"), ".go");
        assert_eq!(ext("path.pb.go"), ".go");
        assert_eq!(ext("a.dir/b"), "");
        assert_eq!(ext("a.dir/b.go"), ".go");
        assert_eq!(ext("a.dir/"), "");
        assert_eq!(ext(".bashrc"), ".bashrc");
    }

    #[test]
    fn test_rel() {
        let cases = [
            ("a/b", "a/b", "."),
            ("a/b/.", "a/b", "."),
            ("a/b", "a/b/.", "."),
            ("./a/b", "a/b", "."),
            ("ab/cd", "ab/cde", "../cde"),
            ("ab/cd", "ab/c", "../c"),
            ("a/b", "a/b/c/d", "c/d"),
            ("a/b", "a/b/../c", "../c"),
            ("a/b/../c", "a/b", "../b"),
            ("a/b/c", "a/c/d", "../../c/d"),
            ("a/b", "c/d", "../../c/d"),
            ("a/b/c/d", "a/b/", "../.."),
            ("../../a/b", "../../a/b/c/d", "c/d"),
            ("/a/b", "/a/b", "."),
            ("/ab/cd", "/ab/cde", "../cde"),
            ("/a/b", "/c/d", "../../c/d"),
            ("/a/b/c/d/", "/a/b/", "../.."),
            ("/../../a/b", "/../../a/b/c/d", "c/d"),
            ("/", "/a/b", "a/b"),
            (".", "a/b", "a/b"),
            (".", "..", ".."),
            ("a", ".", ".."),
            ("a/b", "", "../.."),
            ("a/./b/", "a/b/c/../d", "d"),
        ];
        for (base, target, expected) in cases {
            assert_eq!(
                rel(base, target).as_deref(),
                Some(expected),
                "rel({:?}, {:?})",
                base,
                target
            );
        }
    }

    #[test]
    fn test_rel_impossible() {
        for (base, target) in [
            ("..", "."),
            ("..", "a"),
            ("../..", ".."),
            ("a", "/a"),
            ("/a", "a"),
        ] {
            assert_eq!(rel(base, target), None, "rel({:?}, {:?})", base, target);
        }
    }

    #[test]
    fn test_volume_name_is_empty_on_unix() {
        assert_eq!(volume_name("/a/b"), "");
        assert_eq!(volume_name("c:/a"), "");
    }

    #[test]
    fn test_slash_conversion_is_identity_on_unix() {
        assert_eq!(to_slash("a/b"), "a/b");
        assert_eq!(from_slash("a/b"), "a/b");
    }

    #[test]
    fn test_split_list() {
        assert!(split_list("").is_empty());
        assert_eq!(split_list("/bin"), vec!["/bin"]);
        assert_eq!(split_list("/bin:/usr/bin"), vec!["/bin", "/usr/bin"]);
        assert_eq!(split_list("/a::/b"), vec!["/a", "", "/b"]);
    }
}
