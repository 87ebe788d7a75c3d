//! Field locator and mutator
//!
//! Finds a named header, cookie or parameter in a request, or produces a new
//! request with that field set. Both directions are pure: the input request is
//! never modified.

use crate::cookie::{self, COOKIE_HEADER};
use crate::multipart;
use crate::traits::{ContentType, HostRequest, Parameter, ParameterLocation};
use crate::types::FieldKind;
use tracing::trace;

/// Current value of a field, or `None` when the request does not carry it.
pub fn extract<R: HostRequest>(request: &R, kind: FieldKind, key: &str) -> Option<String> {
    match kind {
        FieldKind::Header => request.header_value(key).map(str::to_string),
        FieldKind::Cookie => request
            .header_value(COOKIE_HEADER)
            .and_then(|header| cookie::parse_cookie_value(header, key)),
        FieldKind::UrlParameter => find_parameter(request, ParameterLocation::Url, key),
        FieldKind::BodyParameter => find_parameter(request, ParameterLocation::Body, key),
    }
}

/// New request with the field set to `value`.
///
/// Header and cookie values are stripped of CR and LF before they are
/// written. Parameters rely on form encoding instead.
pub fn apply<R: HostRequest>(request: &R, kind: FieldKind, key: &str, value: &str) -> R {
    trace!(kind = %kind, key = %key, "Applying field");
    match kind {
        FieldKind::Header => apply_header(request, key, value),
        FieldKind::Cookie => apply_cookie(request, key, value),
        FieldKind::UrlParameter => apply_parameter(request, Parameter::url(key, value)),
        FieldKind::BodyParameter => {
            if request.content_type() == ContentType::Multipart {
                apply_multipart(request, key, value)
            } else {
                apply_parameter(request, Parameter::body(key, value))
            }
        }
    }
}

fn find_parameter<R: HostRequest>(
    request: &R,
    location: ParameterLocation,
    key: &str,
) -> Option<String> {
    request
        .parameters()
        .into_iter()
        .find(|p| p.location == location && p.name == key)
        .map(|p| p.value)
}

fn apply_header<R: HostRequest>(request: &R, key: &str, value: &str) -> R {
    let key = cookie::sanitize_header_value(key);
    let value = cookie::sanitize_header_value(value);
    if request.has_header(&key) {
        request.with_updated_header(&key, &value)
    } else {
        request.with_added_header(&key, &value)
    }
}

fn apply_cookie<R: HostRequest>(request: &R, key: &str, value: &str) -> R {
    let key = cookie::sanitize_header_value(key);
    let value = cookie::sanitize_header_value(value);
    match request.header_value(COOKIE_HEADER) {
        Some(header) => {
            let updated = cookie::replace_cookie_value(header, &key, &value);
            request.with_updated_header(COOKIE_HEADER, &updated)
        }
        None => request.with_added_header(COOKIE_HEADER, &format!("{}={}", key, value)),
    }
}

fn apply_parameter<R: HostRequest>(request: &R, parameter: Parameter) -> R {
    if request.has_parameter(&parameter.name, parameter.location) {
        request.with_updated_parameter(&parameter)
    } else {
        request.with_added_parameter(&parameter)
    }
}

fn apply_multipart<R: HostRequest>(request: &R, key: &str, value: &str) -> R {
    let Some(content_type) = request.header_value("Content-Type") else {
        return request.clone();
    };
    match multipart::rewrite_field(request.body(), content_type, key, value) {
        Some(rewritten) => request.with_body(rewritten),
        None => {
            trace!(key = %key, "Multipart body left unchanged");
            request.clone()
        }
    }
}
