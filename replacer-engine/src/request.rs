//! Raw HTTP/1.x request value
//!
//! [`HttpRequest`] is the host request type used by the command-line host and
//! the tests. It keeps the request as close to the bytes it was parsed from as
//! possible: headers keep their order, spelling and duplicates, and parameter
//! edits rewrite only the one `name=value` segment they touch.

use crate::error::{ReplacerError, Result};
use crate::multipart::{self, find};
use crate::traits::{ContentType, HostRequest, Parameter, ParameterLocation};
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use url::form_urlencoded;

const CONTENT_LENGTH: &str = "Content-Length";
const CONTENT_TYPE: &str = "Content-Type";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// A single header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpHeader {
    pub name: String,
    pub value: String,
}

/// Immutable HTTP request. Every edit returns a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    method: String,
    target: String,
    version: String,
    headers: Vec<HttpHeader>,
    body: Vec<u8>,
}

impl HttpRequest {
    /// Create a bodiless HTTP/1.1 request
    pub fn new(method: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            target: target.into(),
            version: "HTTP/1.1".to_string(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Builder: append a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(HttpHeader {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Builder: set the body without touching any header
    pub fn body_bytes(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Parse a raw request. Lines may end in CRLF or a bare LF.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let crlf = find(raw, b"\r\n\r\n").map(|at| (at, 4));
        let lf = find(raw, b"\n\n").map(|at| (at, 2));
        let (head, body) = match (crlf, lf) {
            (Some(a), Some(b)) => split_at_separator(raw, if a.0 <= b.0 { a } else { b }),
            (Some(sep), None) | (None, Some(sep)) => split_at_separator(raw, sep),
            (None, None) => (raw, &raw[raw.len()..]),
        };

        let head = std::str::from_utf8(head)
            .map_err(|_| ReplacerError::malformed_request("request head is not valid UTF-8"))?;
        let mut lines = head.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line));

        let request_line = lines
            .next()
            .filter(|line| !line.trim().is_empty())
            .ok_or_else(|| ReplacerError::malformed_request("missing request line"))?;
        let mut parts = request_line.split_whitespace();
        let (Some(method), Some(target), Some(version)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(ReplacerError::malformed_request(format!(
                "invalid request line: {}",
                request_line
            )));
        };

        let mut headers = Vec::new();
        for line in lines.filter(|line| !line.is_empty()) {
            let (name, value) = line.split_once(':').ok_or_else(|| {
                ReplacerError::malformed_request(format!("invalid header line: {}", line))
            })?;
            headers.push(HttpHeader {
                name: name.trim().to_string(),
                value: value.trim().to_string(),
            });
        }

        Ok(Self {
            method: method.to_string(),
            target: target.to_string(),
            version: version.to_string(),
            headers,
            body: body.to_vec(),
        })
    }

    /// Render the request with CRLF line endings
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = format!("{} {} {}\r\n", self.method, self.target, self.version).into_bytes();
        for header in &self.headers {
            out.extend_from_slice(format!("{}: {}\r\n", header.name, header.value).as_bytes());
        }
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &[HttpHeader] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Path part of the target, without the query string
    pub fn path(&self) -> &str {
        self.split_target().0
    }

    /// Raw query string, without the leading `?`
    pub fn query(&self) -> Option<&str> {
        self.split_target().1
    }

    fn split_target(&self) -> (&str, Option<&str>) {
        match self.target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (&self.target, None),
        }
    }

    fn header_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.name.eq_ignore_ascii_case(name))
    }

    /// Copy with a new body; an existing Content-Length is kept in step.
    fn replace_body(&self, body: Vec<u8>) -> Self {
        let mut next = self.clone();
        next.body = body;
        if let Some(index) = next.header_index(CONTENT_LENGTH) {
            next.headers[index].value = next.body.len().to_string();
        }
        next
    }

    fn with_target_query(&self, query: &str) -> Self {
        let mut next = self.clone();
        next.target = format!("{}?{}", self.path(), query);
        next
    }

    /// Form fields of the body, when the body is a form
    fn body_parameters(&self) -> Vec<Parameter> {
        match self.content_type() {
            ContentType::UrlEncoded | ContentType::None => {
                form_pairs(&self.body)
                    .into_iter()
                    .map(|(name, value)| Parameter::body(name, value))
                    .collect()
            }
            ContentType::Multipart => {
                let boundary = self
                    .header_value(CONTENT_TYPE)
                    .and_then(multipart::parse_boundary);
                match boundary {
                    Some(boundary) => multipart::form_fields(&self.body_to_string(), &boundary)
                        .into_iter()
                        .map(|(name, value)| Parameter::body(name, value))
                        .collect(),
                    None => Vec::new(),
                }
            }
            _ => Vec::new(),
        }
    }

    fn rewrite_multipart(&self, parameter: &Parameter) -> Self {
        let content_type = self.header_value(CONTENT_TYPE).unwrap_or("");
        let (name, value) = (&parameter.name, &parameter.value);
        match multipart::rewrite_field(&self.body, content_type, name, value) {
            Some(rewritten) => self.replace_body(rewritten),
            None => self.clone(),
        }
    }
}

impl FromStr for HttpRequest {
    type Err = ReplacerError;

    fn from_str(raw: &str) -> Result<Self> {
        Self::parse(raw.as_bytes())
    }
}

impl fmt::Display for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.to_bytes()))
    }
}

impl HostRequest for HttpRequest {
    fn header_value(&self, name: &str) -> Option<&str> {
        self.header_index(name).map(|i| self.headers[i].value.as_str())
    }

    fn with_updated_header(&self, name: &str, value: &str) -> Self {
        let mut next = self.clone();
        if let Some(index) = next.header_index(name) {
            next.headers[index].value = value.to_string();
        }
        next
    }

    fn with_added_header(&self, name: &str, value: &str) -> Self {
        self.clone().header(name, value)
    }

    fn parameters(&self) -> Vec<Parameter> {
        let mut parameters: Vec<Parameter> = self
            .query()
            .map(|query| form_pairs(query.as_bytes()))
            .unwrap_or_default()
            .into_iter()
            .map(|(name, value)| Parameter::url(name, value))
            .collect();
        parameters.extend(self.body_parameters());
        parameters
    }

    fn with_updated_parameter(&self, parameter: &Parameter) -> Self {
        match parameter.location {
            ParameterLocation::Url => {
                let query = self.query().unwrap_or("").as_bytes();
                match update_form_segment(query, &parameter.name, &parameter.value) {
                    Some(query) => self.with_target_query(&String::from_utf8_lossy(&query)),
                    None => self.clone(),
                }
            }
            ParameterLocation::Body => match self.content_type() {
                ContentType::Multipart => self.rewrite_multipart(parameter),
                ContentType::UrlEncoded | ContentType::None => {
                    match update_form_segment(&self.body, &parameter.name, &parameter.value) {
                        Some(body) => self.replace_body(body),
                        None => self.clone(),
                    }
                }
                other => {
                    debug!(content_type = ?other, "Body is not a form, parameter left untouched");
                    self.clone()
                }
            },
        }
    }

    fn with_added_parameter(&self, parameter: &Parameter) -> Self {
        let pair = encode_pair(&parameter.name, &parameter.value);
        match parameter.location {
            ParameterLocation::Url => {
                let query = append_segment(self.query().unwrap_or("").as_bytes(), &pair);
                self.with_target_query(&String::from_utf8_lossy(&query))
            }
            ParameterLocation::Body => match self.content_type() {
                ContentType::Multipart => self.rewrite_multipart(parameter),
                ContentType::UrlEncoded | ContentType::None => {
                    let bodiless = self.body.is_empty();
                    let mut next = self.replace_body(append_segment(&self.body, &pair));
                    if bodiless {
                        if !next.has_header(CONTENT_TYPE) {
                            next = next.with_added_header(CONTENT_TYPE, FORM_URLENCODED);
                        }
                        if !next.has_header(CONTENT_LENGTH) {
                            let length = next.body.len().to_string();
                            next = next.with_added_header(CONTENT_LENGTH, &length);
                        }
                    }
                    next
                }
                other => {
                    debug!(content_type = ?other, "Body is not a form, parameter not added");
                    self.clone()
                }
            },
        }
    }

    fn content_type(&self) -> ContentType {
        ContentType::classify(self.header_value(CONTENT_TYPE))
    }

    fn body(&self) -> &[u8] {
        &self.body
    }

    fn with_body(&self, body: Vec<u8>) -> Self {
        self.replace_body(body)
    }
}

fn split_at_separator(raw: &[u8], (at, len): (usize, usize)) -> (&[u8], &[u8]) {
    (&raw[..at], &raw[at + len..])
}

/// Decode one `name=value` segment; `+` is a space.
fn decode_segment(segment: &[u8]) -> Option<(String, String)> {
    form_urlencoded::parse(segment)
        .next()
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
}

fn form_segments(encoded: &[u8]) -> impl Iterator<Item = &[u8]> {
    encoded.split(|&byte| byte == b'&')
}

fn form_pairs(encoded: &[u8]) -> Vec<(String, String)> {
    form_segments(encoded)
        .filter(|segment| !segment.is_empty())
        .filter_map(decode_segment)
        .collect()
}

fn encode_pair(name: &str, value: &str) -> String {
    let name: String = form_urlencoded::byte_serialize(name.as_bytes()).collect();
    let value: String = form_urlencoded::byte_serialize(value.as_bytes()).collect();
    format!("{}={}", name, value)
}

/// Replace the first segment named `name`, leaving every other byte alone.
fn update_form_segment(encoded: &[u8], name: &str, value: &str) -> Option<Vec<u8>> {
    let index = form_segments(encoded).position(|segment| {
        !segment.is_empty() && decode_segment(segment).is_some_and(|(n, _)| n == name)
    })?;
    let pair = encode_pair(name, value);

    let mut rewritten = Vec::with_capacity(encoded.len() + pair.len());
    for (i, segment) in form_segments(encoded).enumerate() {
        if i > 0 {
            rewritten.push(b'&');
        }
        if i == index {
            rewritten.extend_from_slice(pair.as_bytes());
        } else {
            rewritten.extend_from_slice(segment);
        }
    }
    Some(rewritten)
}

fn append_segment(encoded: &[u8], pair: &str) -> Vec<u8> {
    let mut appended = encoded.to_vec();
    if !encoded.is_empty() && !encoded.ends_with(b"&") {
        appended.push(b'&');
    }
    appended.extend_from_slice(pair.as_bytes());
    appended
}
