//! End-to-end rule application against raw HTTP requests

use replacer_engine::{
    copy_to_rule, decode, encode, menu_items, use_rule, FieldKind, HostRequest, HttpRequest,
    MenuAction, ReplacerError, Rule, RuleStore, ToolSource, TypeEntry,
};

const LOGIN: &str = "POST /login?next=%2Fhome HTTP/1.1\r\n\
    Host: app.example.com\r\n\
    Authorization: Bearer fresh-token\r\n\
    Cookie: session=live-session; theme=dark\r\n\
    Content-Type: application/x-www-form-urlencoded\r\n\
    Content-Length: 25\r\n\
    \r\n\
    user=alice&csrf=tok+en%21";

const STALE: &str = "POST /profile HTTP/1.1\r\n\
    Host: app.example.com\r\n\
    Authorization: Bearer expired\r\n\
    Cookie: theme=light; session=dead\r\n\
    Content-Type: application/x-www-form-urlencoded\r\n\
    Content-Length: 20\r\n\
    \r\n\
    csrf=old&name=alice2";

fn session_rule() -> Rule {
    Rule::new(
        "session",
        vec![
            TypeEntry::new(FieldKind::Header, "Authorization", ""),
            TypeEntry::new(FieldKind::Cookie, "session", ""),
            TypeEntry::new(FieldKind::BodyParameter, "csrf", ""),
        ],
    )
}

#[test]
fn test_copy_from_one_request_use_on_another() {
    let login: HttpRequest = LOGIN.parse().unwrap();
    let stale: HttpRequest = STALE.parse().unwrap();

    let outcome = copy_to_rule(&login, &session_rule());
    assert!(outcome.is_complete());
    assert_eq!(outcome.rule.entries[2].replace_value, "tok en!");

    let refreshed = use_rule(&stale, &outcome.rule);
    assert_eq!(refreshed.header_value("Authorization"), Some("Bearer fresh-token"));
    assert_eq!(refreshed.header_value("Cookie"), Some("theme=light; session=live-session"));
    assert_eq!(refreshed.body(), b"csrf=tok+en%21&name=alice2");
    assert_eq!(refreshed.header_value("Content-Length"), Some("26"));
    // request line and untouched headers are carried over as they were
    assert_eq!(refreshed.target(), "/profile");
    assert_eq!(refreshed.header_value("Host"), Some("app.example.com"));
}

#[test]
fn test_cookie_update_and_append() {
    let request = HttpRequest::new("GET", "/").header("Cookie", "a=1; b=2");

    let updated = use_rule(
        &request,
        &Rule::new("b", vec![TypeEntry::new(FieldKind::Cookie, "b", "9")]),
    );
    assert_eq!(updated.header_value("Cookie"), Some("a=1; b=9"));

    let appended = use_rule(
        &request,
        &Rule::new("c", vec![TypeEntry::new(FieldKind::Cookie, "c", "3")]),
    );
    assert_eq!(appended.header_value("Cookie"), Some("a=1; b=2; c=3"));
}

#[test]
fn test_multipart_update_and_insert() {
    let body = "--b1\r\n\
        Content-Disposition: form-data; name=\"token\"\r\n\
        \r\n\
        old\r\n\
        --b1\r\n\
        Content-Disposition: form-data; name=\"comment\"\r\n\
        \r\n\
        hello\r\n\
        --b1--\r\n";
    let request = HttpRequest::new("POST", "/upload")
        .header("Content-Type", "multipart/form-data; boundary=b1")
        .body_bytes(body.as_bytes().to_vec());

    let rule = Rule::new(
        "form",
        vec![
            TypeEntry::new(FieldKind::BodyParameter, "token", "new"),
            TypeEntry::new(FieldKind::BodyParameter, "added", "value"),
        ],
    );
    let updated = use_rule(&request, &rule);

    let expected = "--b1\r\n\
        Content-Disposition: form-data; name=\"token\"\r\n\
        \r\n\
        new\r\n\
        --b1\r\n\
        Content-Disposition: form-data; name=\"comment\"\r\n\
        \r\n\
        hello\r\n\
        --b1\r\n\
        Content-Disposition: form-data; name=\"added\"\r\n\
        \r\n\
        value\r\n\
        --b1--\r\n";
    assert_eq!(updated.body_to_string(), expected);
}

#[test]
fn test_copy_miss_keeps_value_and_continues() {
    let request = HttpRequest::new("GET", "/?page=3");
    let rule = Rule::new(
        "paging",
        vec![
            TypeEntry::new(FieldKind::Header, "X-Trace", "kept"),
            TypeEntry::new(FieldKind::UrlParameter, "page", "1"),
        ],
    );
    let outcome = copy_to_rule(&request, &rule);
    assert_eq!(outcome.rule.entries[0].replace_value, "kept");
    assert_eq!(outcome.rule.entries[1].replace_value, "3");
    assert_eq!(outcome.misses.len(), 1);
}

#[test]
fn test_last_header_entry_wins() {
    let rule = Rule::new(
        "x",
        vec![
            TypeEntry::new(FieldKind::Header, "X", "1"),
            TypeEntry::new(FieldKind::Header, "X", "2"),
        ],
    );
    let updated = use_rule(&HttpRequest::new("GET", "/"), &rule);
    assert!(updated.to_string().contains("\r\nX: 2\r\n"));
    assert!(!updated.to_string().contains("X: 1"));
}

#[test]
fn test_persisted_rules_drive_the_menu() {
    let text = encode(&[session_rule(), Rule::new("", vec![TypeEntry::default()])]).unwrap();
    let store = RuleStore::from_json(&text).unwrap();
    assert_eq!(decode(&text).unwrap(), store.snapshot());

    let items = menu_items(&store, ToolSource::Proxy, true);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].label, "Copy to session");
    assert_eq!(items[0].action, MenuAction::CopyTo);

    let items = menu_items(&store, ToolSource::Repeater, true);
    assert_eq!(items[0].label, "Use session");
}

#[test]
fn test_truncated_document_is_rejected() {
    let err = decode("[{").unwrap_err();
    assert!(err.is_eof());

    let mut store = RuleStore::from_rules(vec![session_rule()]);
    let err = store.load_json("[{\"name\": ").unwrap_err();
    assert!(matches!(err, ReplacerError::MalformedJson(_)));
    assert!(err.is_user_error());
    assert_eq!(store.rules(), &[session_rule()]);
}
