//! Cookie header helpers used by the cookie strategy.

/// Header carrying the request cookie list
pub const COOKIE_HEADER: &str = "Cookie";

/// Remove every CR and LF so a value cannot start a new header line.
pub fn sanitize_header_value(value: &str) -> String {
    value.chars().filter(|c| *c != '\r' && *c != '\n').collect()
}

/// Split one `name=value` segment. Segments without `=` or with an empty name
/// are not cookies and never match.
fn split_segment(segment: &str) -> Option<(&str, &str)> {
    let (name, value) = segment.split_once('=')?;
    if name.is_empty() {
        return None;
    }
    Some((name.trim(), value.trim()))
}

/// Value of the cookie named `name` in a `Cookie` header value.
pub fn parse_cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .filter_map(split_segment)
        .find(|(cookie_name, _)| *cookie_name == name)
        .map(|(_, value)| value.to_string())
}

/// Re-render a `Cookie` header value with `name` set to `value`.
///
/// Every matching segment is rewritten in place and the rest are kept as they
/// were (trimmed). When nothing matches the pair is appended at the end.
/// Empty segments are dropped so `a=1;` never renders as `a=1; ; b=2`.
pub fn replace_cookie_value(header: &str, name: &str, value: &str) -> String {
    let mut found = false;
    let mut segments: Vec<String> = header
        .split(';')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| match split_segment(segment) {
            Some((cookie_name, _)) if cookie_name == name => {
                found = true;
                format!("{}={}", name, value)
            }
            _ => segment.to_string(),
        })
        .collect();

    if !found {
        segments.push(format!("{}={}", name, value));
    }

    segments.join("; ")
}
