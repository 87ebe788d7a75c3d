//! Core data types for the replacer engine

use std::fmt;

/// Where in a request a rule entry looks for its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldKind {
    #[default]
    Header,
    Cookie,
    UrlParameter,
    BodyParameter,
}

impl FieldKind {
    /// All kinds, in the order they are offered to users
    pub const ALL: [FieldKind; 4] = [
        FieldKind::Header,
        FieldKind::Cookie,
        FieldKind::UrlParameter,
        FieldKind::BodyParameter,
    ];

    /// The tag used in persisted rule documents
    pub fn tag(&self) -> &'static str {
        match self {
            FieldKind::Header => "Header",
            FieldKind::Cookie => "Cookie",
            FieldKind::UrlParameter => "URL Parameter",
            FieldKind::BodyParameter => "POST Body Parameter",
        }
    }

    /// Look up a kind by its persisted tag. Tags are case sensitive.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One row of a rule: where to look and what to put there
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeEntry {
    pub field_kind: FieldKind,
    /// Header, cookie or parameter name. Blank means the entry is skipped.
    pub match_key: String,
    /// Value written on apply, or last value extracted on copy
    pub replace_value: String,
}

impl TypeEntry {
    pub fn new(
        field_kind: FieldKind,
        match_key: impl Into<String>,
        replace_value: impl Into<String>,
    ) -> Self {
        Self {
            field_kind,
            match_key: match_key.into(),
            replace_value: replace_value.into(),
        }
    }

    /// Entries with a blank match key take no part in copy or use
    pub fn is_inert(&self) -> bool {
        self.match_key.trim().is_empty()
    }
}

/// A named, ordered list of entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub entries: Vec<TypeEntry>,
}

impl Rule {
    pub fn new(name: impl Into<String>, entries: Vec<TypeEntry>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    /// Blank-named rules are kept but never offered as menu actions
    pub fn is_actionable(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Entries that take part in copy and use, in order
    pub fn active_entries(&self) -> impl Iterator<Item = &TypeEntry> {
        self.entries.iter().filter(|entry| !entry.is_inert())
    }
}

/// Ordered rule collection. Order is preserved through export and import.
pub type RuleSet = Vec<Rule>;
