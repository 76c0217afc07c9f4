//! Helpers for distinguished paths (`cn=a,cn=internal,dc=example,dc=com`)
//!
//! Comparisons are case-insensitive and ignore whitespace around the
//! segment separators. A separator escaped with `\` belongs to its segment.

/// Split a path into trimmed segments, honouring `\` escapes
pub fn segments(path: &str) -> Vec<&str> {
    let mut segs = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in path.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ',' => {
                segs.push(&path[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segs.push(&path[start..]);
    segs.into_iter()
        .map(trim_segment)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Trim surrounding whitespace, keeping a trailing escaped space
fn trim_segment(segment: &str) -> &str {
    let segment = segment.trim_start();
    let mut end = segment.len();
    while let Some(c) = segment[..end].chars().next_back() {
        if !c.is_whitespace() {
            break;
        }
        let before = &segment[..end - c.len_utf8()];
        let backslashes = before.chars().rev().take_while(|&b| b == '\\').count();
        if backslashes % 2 == 1 {
            break;
        }
        end -= c.len_utf8();
    }
    &segment[..end]
}

fn lowered(path: &str) -> Vec<String> {
    segments(path).iter().map(|s| s.to_lowercase()).collect()
}

/// Canonical form used for equality and as a map key
pub fn normalize(path: &str) -> String {
    lowered(path).join(",")
}

pub fn same(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Join a relative path and a base
pub fn join(relative: &str, base: &str) -> String {
    match (relative.is_empty(), base.is_empty()) {
        (true, _) => base.to_string(),
        (_, true) => relative.to_string(),
        _ => format!("{},{}", relative, base),
    }
}

/// Path of the direct container, if any
pub fn parent(path: &str) -> Option<String> {
    let segs = segments(path);
    if segs.len() < 2 {
        return None;
    }
    Some(segs[1..].join(","))
}

/// Whether `path` equals `base` or lies below it
pub fn is_within(path: &str, base: &str) -> bool {
    lowered(path).ends_with(&lowered(base))
}

/// The part of `path` above `base`, or the full path when it is not below `base`
pub fn relative_to(path: &str, base: &str) -> String {
    let path = lowered(path);
    let base = lowered(base);
    if path.ends_with(&base) {
        path[..path.len() - base.len()].join(",")
    } else {
        path.join(",")
    }
}

/// Whether any segment of `path` equals `segment`
pub fn has_segment(path: &str, segment: &str) -> bool {
    let wanted = segment.trim().to_lowercase();
    segments(path).iter().any(|s| s.to_lowercase() == wanted)
}
