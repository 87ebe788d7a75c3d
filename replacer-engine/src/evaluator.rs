//! Rule evaluation: copy values out of a request, or use a rule on one.

use crate::locator;
use crate::traits::HostRequest;
use crate::types::{FieldKind, Rule};
use tracing::{debug, warn};

/// An entry whose field was not present in the request during a copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMiss {
    /// Position of the entry in its rule
    pub entry_index: usize,
    pub field_kind: FieldKind,
    pub match_key: String,
}

/// Result of copying a request's values into a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOutcome {
    /// The rule with every found value stored in its entry
    pub rule: Rule,
    /// Entries that kept their previous value
    pub misses: Vec<FieldMiss>,
}

impl CopyOutcome {
    pub fn is_complete(&self) -> bool {
        self.misses.is_empty()
    }
}

/// Copy the request's current values into the rule's entries.
///
/// Inert entries are skipped. A missing field keeps the entry's previous
/// value and is reported as a miss; the remaining entries are still read.
pub fn copy_to_rule<R: HostRequest>(request: &R, rule: &Rule) -> CopyOutcome {
    let mut updated = rule.clone();
    let mut misses = Vec::new();

    for (entry_index, entry) in updated.entries.iter_mut().enumerate() {
        if entry.is_inert() {
            continue;
        }

        match locator::extract(request, entry.field_kind, &entry.match_key) {
            Some(value) => entry.replace_value = value,
            None => {
                warn!(
                    rule = %rule.name,
                    kind = %entry.field_kind,
                    key = %entry.match_key,
                    "No match found"
                );
                misses.push(FieldMiss {
                    entry_index,
                    field_kind: entry.field_kind,
                    match_key: entry.match_key.clone(),
                });
            }
        }
    }

    debug!(
        rule = %rule.name,
        misses = misses.len(),
        "Copied request values into rule"
    );
    CopyOutcome {
        rule: updated,
        misses,
    }
}

/// Write every active entry of the rule into the request, in order.
///
/// Later entries see the request produced by earlier ones, so two entries on
/// the same field leave the last value in place.
pub fn use_rule<R: HostRequest>(request: &R, rule: &Rule) -> R {
    let result = rule.active_entries().fold(request.clone(), |current, entry| {
        locator::apply(&current, entry.field_kind, &entry.match_key, &entry.replace_value)
    });
    debug!(rule = %rule.name, "Applied rule to request");
    result
}
