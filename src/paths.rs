//! Route path helpers shared by the resolver (self-redirect detection, key patterns)
//! and the HTTP mount (absolute route patterns).

/// join
///
/// Joins a child route path onto its parent's absolute pattern.
/// Absolute children (leading `/`) replace the parent pattern entirely.
pub fn join(parent: &str, child: &str) -> String {
    let child = child.trim();
    if child.starts_with('/') {
        return collapse(child);
    }
    let parent = parent.trim_end_matches('/');
    if child.is_empty() {
        return if parent.is_empty() { "/".to_string() } else { parent.to_string() };
    }
    collapse(&format!("{parent}/{child}"))
}

/// same_path
///
/// Compares two pathnames ignoring trailing slashes, so `/admin` and `/admin/` match.
pub fn same_path(a: &str, b: &str) -> bool {
    a.trim().trim_end_matches('/') == b.trim().trim_end_matches('/')
}

// Collapses repeated separators (`//a///b` -> `/a/b`).
fn collapse(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut previous_slash = false;
    for ch in path.chars() {
        if ch == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        out.push(ch);
    }
    out
}
