//! Rule-set JSON codec
//!
//! Wire format:
//!
//! ```json
//! [
//!   {
//!     "name": "session",
//!     "typeRows": [
//!       { "type": "Cookie", "match": "sid", "replace": "123" }
//!     ]
//!   }
//! ]
//! ```
//!
//! Decoding is tolerant about content and strict about syntax. Missing or
//! `null` fields default to empty, unknown keys are ignored, and rows with an
//! unrecognised `type` are dropped when records become rules. Anything that is
//! not valid JSON, or not an array at the top level, fails the whole document.

use crate::error::{DecodeError, ReplacerError, Result};
use crate::types::{FieldKind, Rule, RuleSet, TypeEntry};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One rule as it appears in a rules document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "typeRows")]
    pub type_rows: Option<Vec<TypeRowRecord>>,
}

/// One rule row as it appears in a rules document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeRowRecord {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, rename = "match")]
    pub match_key: Option<String>,
    #[serde(default, rename = "replace")]
    pub replace_value: Option<String>,
}

impl From<&Rule> for RuleRecord {
    fn from(rule: &Rule) -> Self {
        Self {
            name: Some(rule.name.clone()),
            type_rows: Some(rule.entries.iter().map(TypeRowRecord::from).collect()),
        }
    }
}

impl From<&TypeEntry> for TypeRowRecord {
    fn from(entry: &TypeEntry) -> Self {
        Self {
            kind: Some(entry.field_kind.tag().to_string()),
            match_key: Some(entry.match_key.clone()),
            replace_value: Some(entry.replace_value.clone()),
        }
    }
}

impl TypeRowRecord {
    /// The typed entry, or `None` when the row's type tag is not recognised
    pub fn to_entry(&self) -> Option<TypeEntry> {
        let tag = self.kind.as_deref().unwrap_or("");
        let field_kind = FieldKind::from_tag(tag)?;
        Some(TypeEntry {
            field_kind,
            match_key: self.match_key.clone().unwrap_or_default(),
            replace_value: self.replace_value.clone().unwrap_or_default(),
        })
    }
}

impl RuleRecord {
    /// Convert to a rule, dropping rows whose type is not recognised
    pub fn into_rule(self) -> Rule {
        let name = self.name.unwrap_or_default();
        let mut entries = Vec::new();

        for row in self.type_rows.unwrap_or_default() {
            match row.to_entry() {
                Some(entry) => entries.push(entry),
                None => warn!(
                    rule = %name,
                    kind = row.kind.as_deref().unwrap_or(""),
                    "Dropping rule row with unknown type"
                ),
            }
        }

        Rule { name, entries }
    }
}

/// Encode rules as a pretty-printed JSON array (two-space indent).
pub fn encode(rules: &[Rule]) -> Result<String> {
    let records: Vec<RuleRecord> = rules.iter().map(RuleRecord::from).collect();
    serde_json::to_string_pretty(&records).map_err(|e| ReplacerError::Serialization {
        error: e.to_string(),
    })
}

/// Parse a rules document into raw records, keeping unknown type tags.
pub fn decode_records(text: &str) -> std::result::Result<Vec<RuleRecord>, DecodeError> {
    serde_json::from_str(text).map_err(DecodeError::from)
}

/// Parse a rules document into rules, dropping rows with unknown types.
pub fn decode(text: &str) -> std::result::Result<RuleSet, DecodeError> {
    Ok(decode_records(text)?
        .into_iter()
        .map(RuleRecord::into_rule)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rules() -> RuleSet {
        vec![
            Rule::new(
                "session",
                vec![
                    TypeEntry::new(FieldKind::Cookie, "sid", "123"),
                    TypeEntry::new(FieldKind::Header, "Authorization", "Bearer t"),
                ],
            ),
            Rule::new(
                "",
                vec![
                    TypeEntry::new(FieldKind::UrlParameter, "page", "2"),
                    TypeEntry::new(FieldKind::BodyParameter, "", ""),
                ],
            ),
        ]
    }

    #[test]
    fn test_encode_format() {
        let text = encode(&sample_rules()[..1]).unwrap();
        let expected = r#"[
  {
    "name": "session",
    "typeRows": [
      {
        "type": "Cookie",
        "match": "sid",
        "replace": "123"
      },
      {
        "type": "Header",
        "match": "Authorization",
        "replace": "Bearer t"
      }
    ]
  }
]"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let rules = sample_rules();
        let decoded = decode(&encode(&rules).unwrap()).unwrap();
        assert_eq!(decoded, rules);
    }

    #[test]
    fn test_escaping_round_trip() {
        let tricky = "quote \" backslash \\ newline \n tab \t return \r end";
        let rules = vec![Rule::new(
            tricky,
            vec![TypeEntry::new(FieldKind::Header, tricky, tricky)],
        )];
        let text = encode(&rules).unwrap();
        assert!(text.contains(r#"quote \" backslash \\ newline \n tab \t return \r end"#));
        assert_eq!(decode(&text).unwrap(), rules);
    }

    #[test]
    fn test_missing_fields_default() {
        let rules = decode(r#"[{}, {"name": "a"}, {"typeRows": [{"type": "Cookie"}]}]"#).unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0], Rule::default());
        assert_eq!(rules[1], Rule::new("a", vec![]));
        assert_eq!(rules[2].name, "");
        assert_eq!(rules[2].entries, vec![TypeEntry::new(FieldKind::Cookie, "", "")]);
    }

    #[test]
    fn test_null_fields_default() {
        let rules = decode(r#"[{"name": null, "typeRows": null}]"#).unwrap();
        assert_eq!(rules, vec![Rule::default()]);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let text = r#"[{"name": "x", "enabled": true, "typeRows": [
            {"type": "Header", "match": "A", "replace": "1", "comment": "hi"}
        ]}]"#;
        let rules = decode(text).unwrap();
        assert_eq!(rules[0].entries, vec![TypeEntry::new(FieldKind::Header, "A", "1")]);
    }

    #[test]
    fn test_unknown_types_dropped() {
        let text = r#"[{"name": "x", "typeRows": [
            {"type": "Query", "match": "q", "replace": "1"},
            {"type": "URL Parameter", "match": "q", "replace": "2"},
            {"match": "no type"}
        ]}]"#;
        let records = decode_records(text).unwrap();
        assert_eq!(records[0].type_rows.as_ref().unwrap().len(), 3);

        let rules = decode(text).unwrap();
        assert_eq!(rules[0].entries, vec![TypeEntry::new(FieldKind::UrlParameter, "q", "2")]);
    }

    #[test]
    fn test_syntax_errors_fail_whole_document() {
        let broken = [
            "[{",
            "[{\"name\": \"a\"",
            "[{\"name\": \"unterminated}]",
            "[{} {}]",
            "",
            "{\"name\": \"a\"}",
        ];
        for text in broken {
            assert!(decode(text).is_err(), "expected failure for {:?}", text);
        }
        assert!(decode("[{").unwrap_err().is_eof());
    }

    #[test]
    fn test_empty_array() {
        assert!(decode("[]").unwrap().is_empty());
        assert_eq!(encode(&[]).unwrap(), "[]");
    }
}
