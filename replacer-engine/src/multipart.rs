//! Multipart form-data rewriting
//!
//! Updates or inserts one named form field by splicing byte ranges of the raw
//! body. This is not a MIME parser: parts are found by exact byte match on
//! `--boundary CRLF Content-Disposition: form-data; name="field"`. A part whose
//! disposition line carries other attributes first (for example a file part
//! written as `form-data; filename="a"; name="field"`) is not recognised, and a
//! second part with the same name is inserted instead.

use tracing::debug;

const CRLF: &str = "\r\n";
const HEADERS_END: &str = "\r\n\r\n";
const DISPOSITION_PREFIX: &str = "Content-Disposition: form-data; name=\"";

/// Strip characters that could close the name attribute or start a new line.
pub fn sanitize_field_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '"' && *c != '\r' && *c != '\n')
        .collect()
}

/// Boundary token from a Content-Type header value, without surrounding quotes.
pub fn parse_boundary(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|segment| {
        let token = segment.trim().strip_prefix("boundary=")?.trim();
        let token = token
            .strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
            .unwrap_or(token);
        Some(token.to_string())
    })
}

/// Body with the form field `name` set to `value`.
///
/// The body is searched and spliced as raw bytes, so binary parts outside the
/// rewritten value come back unchanged. Returns `None` when the body is left
/// as it was: no boundary in the Content-Type, a matched part with no header
/// terminator or no following delimiter, or no closing delimiter to insert
/// before.
pub fn rewrite_field(body: &[u8], content_type: &str, name: &str, value: &str) -> Option<Vec<u8>> {
    let name = sanitize_field_name(name);
    let boundary = parse_boundary(content_type)?;

    let part_delimiter = format!("--{}", boundary);
    let closing_delimiter = format!("{}--", part_delimiter);
    let part_marker = format!("{}{}{}{}\"", part_delimiter, CRLF, DISPOSITION_PREFIX, name);

    if let Some(part_start) = find(body, part_marker.as_bytes()) {
        let headers_end = part_start + find(&body[part_start..], HEADERS_END.as_bytes())?;
        let value_start = headers_end + HEADERS_END.len();
        let next_delimiter = format!("{}{}", CRLF, part_delimiter);
        let value_end = value_start + find(&body[value_start..], next_delimiter.as_bytes())?;

        debug!(field = %name, "Updating existing multipart field");
        let mut rewritten = Vec::with_capacity(body.len() + value.len());
        rewritten.extend_from_slice(&body[..value_start]);
        rewritten.extend_from_slice(value.as_bytes());
        rewritten.extend_from_slice(&body[value_end..]);
        Some(rewritten)
    } else {
        let closing_at = find(body, closing_delimiter.as_bytes())?;

        debug!(field = %name, "Inserting new multipart field");
        let new_part = format!(
            "{}{}{}{}\"{}{}{}{}",
            part_delimiter, CRLF, DISPOSITION_PREFIX, name, CRLF, CRLF, value, CRLF
        );
        let mut rewritten = Vec::with_capacity(body.len() + new_part.len());
        rewritten.extend_from_slice(&body[..closing_at]);
        rewritten.extend_from_slice(new_part.as_bytes());
        rewritten.extend_from_slice(&body[closing_at..]);
        Some(rewritten)
    }
}

/// Offset of the first occurrence of `needle` in `haystack`
pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Name and value of every form field in a multipart body, in order.
///
/// Only the `name` attribute of the Content-Disposition header is read; file
/// parts are reported with their raw content as the value.
pub fn form_fields(body: &str, boundary: &str) -> Vec<(String, String)> {
    let part_delimiter = format!("--{}", boundary);
    let mut fields = Vec::new();

    for chunk in body.split(&part_delimiter).skip(1) {
        // closing delimiter leaves a chunk starting with "--"
        if chunk.starts_with("--") {
            break;
        }
        let chunk = chunk.strip_prefix(CRLF).unwrap_or(chunk);
        let Some((headers, content)) = chunk.split_once(HEADERS_END) else {
            continue;
        };
        let Some(name) = disposition_name(headers) else {
            continue;
        };
        let content = content.strip_suffix(CRLF).unwrap_or(content);
        fields.push((name, content.to_string()));
    }

    fields
}

fn disposition_name(headers: &str) -> Option<String> {
    let disposition = headers.split(CRLF).find(|line| {
        line.split(':')
            .next()
            .is_some_and(|h| h.trim().eq_ignore_ascii_case("content-disposition"))
    })?;

    disposition.split(';').skip(1).find_map(|attribute| {
        let value = attribute.trim().strip_prefix("name=")?;
        Some(value.trim_matches('"').to_string())
    })
}
