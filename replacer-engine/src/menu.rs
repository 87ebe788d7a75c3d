//! Context menu model
//!
//! Hosts ask for the actions to offer for a request opened in one of their
//! tools. Read-only tools get "Copy to" actions; editors get "Use" actions.

use crate::store::RuleStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The host tool a request was opened from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ToolSource {
    Proxy,
    Logger,
    Target,
    Repeater,
    Other,
}

impl ToolSource {
    pub const ALL: [ToolSource; 5] = [
        ToolSource::Proxy,
        ToolSource::Logger,
        ToolSource::Target,
        ToolSource::Repeater,
        ToolSource::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolSource::Proxy => "proxy",
            ToolSource::Logger => "logger",
            ToolSource::Target => "target",
            ToolSource::Repeater => "repeater",
            ToolSource::Other => "other",
        }
    }

    /// The action this tool offers, if any
    pub fn action(&self) -> Option<MenuAction> {
        match self {
            ToolSource::Proxy | ToolSource::Logger | ToolSource::Target => {
                Some(MenuAction::CopyTo)
            }
            ToolSource::Repeater => Some(MenuAction::Use),
            ToolSource::Other => None,
        }
    }
}

impl fmt::Display for ToolSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown tool: {}", s))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MenuAction {
    /// Copy the request's values into the rule
    CopyTo,
    /// Write the rule's values into the request
    Use,
}

impl MenuAction {
    fn prefix(&self) -> &'static str {
        match self {
            MenuAction::CopyTo => "Copy to",
            MenuAction::Use => "Use",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub rule_index: usize,
    pub action: MenuAction,
}

/// Menu entries for a request opened in `source`, one per named rule in store
/// order. Empty when no request is available or the tool offers no action.
pub fn menu_items(
    store: &RuleStore,
    source: ToolSource,
    request_available: bool,
) -> Vec<MenuItem> {
    let Some(action) = source.action() else {
        return Vec::new();
    };
    if !request_available {
        return Vec::new();
    }

    store
        .rules()
        .iter()
        .enumerate()
        .filter(|(_, rule)| rule.is_actionable())
        .map(|(rule_index, rule)| MenuItem {
            label: format!("{} {}", action.prefix(), rule.name),
            rule_index,
            action,
        })
        .collect()
}
