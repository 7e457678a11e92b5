/// Appends `suffix` to `original`, separated by exactly one `/` on the
/// suffix side. Without a suffix the original path is returned as-is.
pub fn apply_path(original: &str, suffix: Option<&str>) -> String {
    match suffix {
        Some(suffix) => format!("{}/{}", original, suffix.trim_start_matches('/')),
        None => original.to_string(),
    }
}

/// Strips leading and trailing `/`.
pub fn trim_slashes(path: &str) -> &str {
    path.trim_matches('/')
}

/// Joins a (possibly empty) prefix with a relative path using `/`.
pub fn join_key(prefix: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    match (prefix.is_empty(), path.is_empty()) {
        (true, _) => path.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{}/{}", prefix, path),
    }
}
