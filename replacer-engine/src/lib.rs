//! Replacer Engine - rule storage and evaluation for HTTP request rewriting
//!
//! A rule is a named list of (field kind, match key, value) rows. "Copy"
//! reads the current values of those fields out of one request into the rule;
//! "use" writes the stored values into another request. Rules persist as a
//! JSON document.

pub mod codec;
pub mod cookie;
pub mod error;
pub mod evaluator;
pub mod locator;
pub mod menu;
pub mod multipart;
pub mod request;
pub mod store;
pub mod traits;
pub mod types;


pub use types::{FieldKind, Rule, RuleSet, TypeEntry};

pub use traits::{ContentType, HostRequest, Parameter, ParameterLocation};

pub use error::{DecodeError, ErrorCategory, ReplacerError, Result};

pub use codec::{decode, encode, RuleRecord, TypeRowRecord};

pub use evaluator::{copy_to_rule, use_rule, CopyOutcome, FieldMiss};

pub use request::{HttpHeader, HttpRequest};

pub use store::RuleStore;

pub use menu::{menu_items, MenuAction, MenuItem, ToolSource};
