//! Host-facing traits for the replacer engine
//!
//! The engine never edits a request in place. It reads through accessors and
//! writes through "with updated X" builders that return a fresh value, so any
//! host message type can plug in by implementing [`HostRequest`].

/// Where a request parameter lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    /// Query string of the request target
    Url,
    /// Url-encoded or multipart request body
    Body,
}

/// A single request parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value: String,
    pub location: ParameterLocation,
}

impl Parameter {
    pub fn url(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            location: ParameterLocation::Url,
        }
    }

    pub fn body(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            location: ParameterLocation::Body,
        }
    }
}

/// Coarse body classification derived from the Content-Type header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    None,
    UrlEncoded,
    Multipart,
    Json,
    Xml,
    Other,
}

impl ContentType {
    /// Classify a Content-Type header value
    pub fn classify(header: Option<&str>) -> Self {
        let Some(value) = header else {
            return ContentType::None;
        };
        let media = value
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        match media.as_str() {
            "" => ContentType::None,
            "application/x-www-form-urlencoded" => ContentType::UrlEncoded,
            "multipart/form-data" => ContentType::Multipart,
            m if m == "application/json" || m.ends_with("+json") => ContentType::Json,
            m if m == "application/xml" || m == "text/xml" || m.ends_with("+xml") => {
                ContentType::Xml
            }
            _ => ContentType::Other,
        }
    }
}

/// Immutable request abstraction consumed by the field locator
pub trait HostRequest: Clone {
    /// First header with this name, compared case-insensitively
    fn header_value(&self, name: &str) -> Option<&str>;

    /// Whether a header with this name exists
    fn has_header(&self, name: &str) -> bool {
        self.header_value(name).is_some()
    }

    /// Copy of this request with the named header's value replaced
    fn with_updated_header(&self, name: &str, value: &str) -> Self;

    /// Copy of this request with one more header at the end
    fn with_added_header(&self, name: &str, value: &str) -> Self;

    /// All URL and body parameters, in request order
    fn parameters(&self) -> Vec<Parameter>;

    /// Whether a parameter with this exact name exists at this location
    fn has_parameter(&self, name: &str, location: ParameterLocation) -> bool {
        self.parameters()
            .iter()
            .any(|p| p.location == location && p.name == name)
    }

    /// Copy of this request with the first matching parameter's value replaced
    fn with_updated_parameter(&self, parameter: &Parameter) -> Self;

    /// Copy of this request with a new parameter appended
    fn with_added_parameter(&self, parameter: &Parameter) -> Self;

    fn content_type(&self) -> ContentType;

    /// Raw body bytes
    fn body(&self) -> &[u8];

    /// Body decoded as text for reading values. Invalid UTF-8 is replaced, so
    /// edits go through [`HostRequest::body`] instead.
    fn body_to_string(&self) -> String {
        String::from_utf8_lossy(self.body()).into_owned()
    }

    /// Copy of this request with a new body
    fn with_body(&self, body: Vec<u8>) -> Self;
}
