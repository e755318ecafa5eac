//! Forward-slash path composition for browse requests.
//!
//! Relative paths come from the presentation layer and are untrusted. They
//! are resolved against a configured root folder and must never leave it:
//! `.` and `..` segments are rejected rather than normalized away. A leading
//! `/` on a relative path means "the root folder", it never replaces it.
//!
//! Absolute paths produced here always start with `/`, which is also the
//! store root.

use crate::browse::error::{BrowseError, BrowseResult};

/// The store root.
pub const ROOT: &str = "/";

/// Validate a relative path and return it in canonical form.
///
/// The root is `""`; anything else is its segments joined by `/`, with
/// empty segments dropped.
pub fn normalize_relative(path: &str) -> BrowseResult<String> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" => continue,
            "." | ".." => {
                return Err(BrowseError::traversal(path, format!("'{}' segment", segment)));
            }
            s if s.contains('\0') => {
                return Err(BrowseError::traversal(path, "NUL byte"));
            }
            s => segments.push(s),
        }
    }
    Ok(segments.join("/"))
}

/// Join a root folder and a relative path into an absolute path.
pub fn compose(root_folder: &str, relative_path: &str) -> BrowseResult<String> {
    let root = normalize_relative(root_folder)?;
    let relative = normalize_relative(relative_path)?;

    let joined = match (root.is_empty(), relative.is_empty()) {
        (true, true) => return Ok(ROOT.to_string()),
        (false, true) => root,
        (true, false) => relative,
        (false, false) => format!("{}/{}", root, relative),
    };
    Ok(format!("/{}", joined))
}

/// Split a path into its parent and its final component.
///
/// Splitting the root gives two empty strings. The parent of a top-level
/// entry is `/`.
pub fn split(path: &str) -> (&str, &str) {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((parent, last)) => match parent.trim_end_matches('/') {
            "" => (ROOT, last),
            parent => (parent, last),
        },
        None => ("", trimmed),
    }
}

/// Append a child name to a canonical relative path.
pub fn join_relative(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Where a "go up" row leads and whose metadata it shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitTarget {
    /// absolute path of the directory containing `current_dir_name`
    pub parent_path: String,
    /// name of the directory the row stands for; empty at the root
    pub current_dir_name: String,
    /// canonical relative path the row navigates to
    pub previous_path: String,
}

impl ExitTarget {
    /// An exit from the root leads nowhere.
    pub fn is_root(&self) -> bool {
        self.current_dir_name.is_empty()
    }
}

/// Resolve the "go up" target for a previous relative path.
pub fn exit_target(previous_relative_path: &str, root_folder: &str) -> BrowseResult<ExitTarget> {
    let previous = normalize_relative(previous_relative_path)?;
    if previous.is_empty() {
        return Ok(ExitTarget {
            parent_path: compose(root_folder, "")?,
            current_dir_name: String::new(),
            previous_path: previous,
        });
    }

    let absolute = compose(root_folder, &previous)?;
    let (parent, name) = split(&absolute);
    Ok(ExitTarget {
        parent_path: parent.to_string(),
        current_dir_name: name.to_string(),
        previous_path: previous,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose() {
        assert_eq!(compose("submissions", "a/b").unwrap(), "/submissions/a/b");
        assert_eq!(compose("/submissions/", "/a//b/").unwrap(), "/submissions/a/b");
        assert_eq!(compose("/submissions", "").unwrap(), "/submissions");
        assert_eq!(compose("/submissions", "/").unwrap(), "/submissions");
        assert_eq!(compose("", "a").unwrap(), "/a");
        assert_eq!(compose("/", "/").unwrap(), "/");
    }

    #[test]
    fn test_compose_rejects_traversal() {
        for bad in ["..", "a/../../etc", "./a", "a/.", "a\0b"] {
            let result = compose("/submissions", bad);
            assert!(
                matches!(result, Err(BrowseError::PathTraversalRejected { .. })),
                "{:?} was accepted",
                bad
            );
        }
        assert!(compose("../outside", "a").is_err());
        // dots inside a name are fine
        assert_eq!(compose("/s", "a..b/.hidden").unwrap(), "/s/a..b/.hidden");
    }

    #[test]
    fn test_split() {
        assert_eq!(split("/"), ("", ""));
        assert_eq!(split(""), ("", ""));
        assert_eq!(split("/a"), ("/", "a"));
        assert_eq!(split("/a/b"), ("/a", "b"));
        assert_eq!(split("/a/b/"), ("/a", "b"));
        assert_eq!(split("a"), ("", "a"));
    }

    #[test]
    fn test_compose_then_split_recovers_parent() {
        let roots = ["/submissions", "", "A1/group_01"];
        let relatives = ["a", "a/b", "a/b/c.txt", "/x/y/"];
        for root in roots {
            for relative in relatives {
                let canonical = normalize_relative(relative).unwrap();
                let (rel_parent, rel_last) = split(&canonical);

                let composed = compose(root, relative).unwrap();
                let (parent, last) = split(&composed);

                assert_eq!(parent, compose(root, rel_parent).unwrap());
                assert_eq!(last, rel_last);
            }
        }
    }

    #[test]
    fn test_join_relative() {
        assert_eq!(join_relative("", "c"), "c");
        assert_eq!(join_relative("a/b", "c"), "a/b/c");
    }

    #[test]
    fn test_exit_target() {
        let exit = exit_target("a", "/submissions").unwrap();
        assert_eq!(exit.parent_path, "/submissions");
        assert_eq!(exit.current_dir_name, "a");
        assert_eq!(exit.previous_path, "a");
        assert!(!exit.is_root());

        let exit = exit_target("/a/b/", "").unwrap();
        assert_eq!(exit.parent_path, "/a");
        assert_eq!(exit.current_dir_name, "b");
        assert_eq!(exit.previous_path, "a/b");
    }

    #[test]
    fn test_exit_target_from_root() {
        for root_path in ["", "/", "//"] {
            let exit = exit_target(root_path, "/submissions").unwrap();
            assert!(exit.is_root());
            assert_eq!(exit.current_dir_name, "");
            assert_eq!(exit.previous_path, "");
        }
        assert!(exit_target("..", "/submissions").is_err());
    }
}
