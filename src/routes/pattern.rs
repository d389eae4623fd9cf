use std::collections::HashSet;

/// to_axum
///
/// Translates a route pattern in the configuration's syntax into axum's:
/// `:id` becomes `{id}`, a trailing `*` becomes `{*splat}`, literal braces are escaped.
/// Optional markers (`:id?`) are dropped, so optional segments become required.
pub fn to_axum(pattern: &str) -> String {
    let segments: Vec<&str> = pattern.split('/').filter(|segment| !segment.is_empty()).collect();
    if segments.is_empty() {
        return "/".to_string();
    }

    let last = segments.len() - 1;
    let mut params = HashSet::new();
    let mut out = String::with_capacity(pattern.len() + 8);

    for (position, segment) in segments.iter().enumerate() {
        out.push('/');
        match segment.strip_prefix(':').map(|name| name.trim_end_matches('?')) {
            Some(name) if !name.is_empty() => {
                // Parameter names must be unique within one route.
                let mut unique = name.to_string();
                let mut suffix = 2;
                while !params.insert(unique.clone()) {
                    unique = format!("{name}{suffix}");
                    suffix += 1;
                }
                out.push('{');
                out.push_str(&unique);
                out.push('}');
            }
            _ if *segment == "*" && position == last => out.push_str("{*splat}"),
            _ => out.push_str(&segment.replace('{', "{{").replace('}', "}}")),
        }
    }
    out
}

/// unsupported_segment
///
/// The first segment of a translated pattern that axum refuses to mount: a literal starting
/// with `:` or `*` (a bare `:`, or a `*` that is not the final segment).
pub fn unsupported_segment(path: &str) -> Option<&str> {
    path.split('/')
        .find(|segment| segment.starts_with(':') || segment.starts_with('*'))
}
