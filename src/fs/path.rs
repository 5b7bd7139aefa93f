use std::io;

/**
 Normalises a storage path into its canonical `/`-separated, root-relative form.

 - leading and trailing `/` are dropped, so `"/cache/"` becomes `"cache"`
 - empty segments and `.` are removed
 - `..` pops the previous segment

 Returns an `InvalidInput` error if `..` would climb above the storage root.

 ```
 use storefind::fs::normalize_path;

 assert_eq!(normalize_path("/cache/./a//b/../c.txt").unwrap(), "cache/a/c.txt");
 assert_eq!(normalize_path("/").unwrap(), "");
 assert!(normalize_path("../etc/passwd").is_err());
 ```
*/
pub fn normalize_path(path: &str) -> io::Result<String> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("path '{path}' escapes the storage root"),
                    ));
                }
            }
            other => segments.push(other),
        }
    }
    Ok(segments.join("/"))
}

/// Joins a normalised parent and a child name
pub(crate) fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_owned()
    } else {
        format!("{parent}/{name}")
    }
}

/// The normalised parent of a normalised path, `None` for the root itself
pub(crate) fn parent(path: &str) -> Option<&str> {
    if path.is_empty() {
        return None;
    }
    Some(path.rfind('/').map_or("", |pos| &path[..pos]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalises_separators_and_dots() {
        assert_eq!(normalize_path("cache").unwrap(), "cache");
        assert_eq!(normalize_path("/cache/").unwrap(), "cache");
        assert_eq!(normalize_path("a\\b\\c").unwrap(), "a/b/c");
        assert_eq!(normalize_path("a/b/../../c").unwrap(), "c");
        assert_eq!(normalize_path("").unwrap(), "");
    }

    #[test]
    fn rejects_escaping_the_root() {
        let err = normalize_path("a/../../b").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn parent_and_join() {
        assert_eq!(parent("a/b/c"), Some("a/b"));
        assert_eq!(parent("a"), Some(""));
        assert_eq!(parent(""), None);
        assert_eq!(join("", "a"), "a");
        assert_eq!(join("a/b", "c"), "a/b/c");
    }
}
