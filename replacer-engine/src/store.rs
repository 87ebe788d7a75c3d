//! In-memory rule store
//!
//! The store owns the only live copy of the rules. Hosts read snapshots and
//! change the rules through the command methods below; every command takes
//! `&mut self`, so there is exactly one writer at a time.

use crate::codec;
use crate::error::{ReplacerError, Result};
use crate::evaluator::{self, FieldMiss};
use crate::traits::HostRequest;
use crate::types::{FieldKind, Rule, RuleSet, TypeEntry};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleStore {
    rules: Vec<Rule>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rules(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Build a store straight from a rules document
    pub fn from_json(text: &str) -> Result<Self> {
        let mut store = Self::new();
        store.load_json(text)?;
        Ok(store)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Independent copy of the current rules
    pub fn snapshot(&self) -> RuleSet {
        self.rules.clone()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Rule> {
        self.rules
            .get(index)
            .ok_or_else(|| ReplacerError::out_of_range("rule", index, self.rules.len()))
    }

    /// Index of the first rule with exactly this name
    pub fn find_by_name(&self, name: &str) -> Result<usize> {
        self.rules
            .iter()
            .position(|rule| rule.name == name)
            .ok_or_else(|| ReplacerError::rule_not_found(name))
    }

    /// Append a rule and return its index
    pub fn add_rule(&mut self, rule: Rule) -> usize {
        debug!(rule = %rule.name, "Adding rule");
        self.rules.push(rule);
        self.rules.len() - 1
    }

    /// Append an unnamed rule holding one empty Header entry
    pub fn add_empty_rule(&mut self) -> usize {
        self.add_rule(Rule::new(String::new(), vec![TypeEntry::default()]))
    }

    pub fn remove_rule(&mut self, index: usize) -> Result<Rule> {
        self.get(index)?;
        let removed = self.rules.remove(index);
        debug!(rule = %removed.name, "Removed rule");
        Ok(removed)
    }

    /// Append a copy of a rule named `<name>-copy` and return its index
    pub fn duplicate_rule(&mut self, index: usize) -> Result<usize> {
        let source = self.get(index)?;
        let copy = Rule::new(format!("{}-copy", source.name), source.entries.clone());
        Ok(self.add_rule(copy))
    }

    /// Move a rule to a new position, shifting the ones in between
    pub fn move_rule(&mut self, from: usize, to: usize) -> Result<()> {
        self.get(from)?;
        self.get(to)?;
        let rule = self.rules.remove(from);
        self.rules.insert(to, rule);
        Ok(())
    }

    pub fn rename_rule(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        self.rule_mut(index)?.name = name.into();
        Ok(())
    }

    /// Replace a rule wholesale, e.g. with the result of a copy
    pub fn replace_rule(&mut self, index: usize, rule: Rule) -> Result<()> {
        let slot = self.rule_mut(index)?;
        *slot = rule;
        Ok(())
    }

    /// Append an entry to a rule and return the entry's index
    pub fn add_entry(&mut self, rule_index: usize, entry: TypeEntry) -> Result<usize> {
        let rule = self.rule_mut(rule_index)?;
        rule.entries.push(entry);
        Ok(rule.entries.len() - 1)
    }

    pub fn update_entry(
        &mut self,
        rule_index: usize,
        entry_index: usize,
        entry: TypeEntry,
    ) -> Result<()> {
        let rule = self.rule_mut(rule_index)?;
        let len = rule.entries.len();
        let slot = rule
            .entries
            .get_mut(entry_index)
            .ok_or_else(|| ReplacerError::out_of_range("entry", entry_index, len))?;
        *slot = entry;
        Ok(())
    }

    /// Change only the kind of an entry
    pub fn set_entry_kind(
        &mut self,
        rule_index: usize,
        entry_index: usize,
        kind: FieldKind,
    ) -> Result<()> {
        let mut entry = self.entry(rule_index, entry_index)?.clone();
        entry.field_kind = kind;
        self.update_entry(rule_index, entry_index, entry)
    }

    /// Remove an entry. A rule always keeps at least one entry.
    pub fn remove_entry(&mut self, rule_index: usize, entry_index: usize) -> Result<TypeEntry> {
        self.entry(rule_index, entry_index)?;
        let rule = self.rule_mut(rule_index)?;
        if rule.entries.len() <= 1 {
            return Err(ReplacerError::LastEntry {
                rule: rule.name.clone(),
            });
        }
        Ok(rule.entries.remove(entry_index))
    }

    fn entry(&self, rule_index: usize, entry_index: usize) -> Result<&TypeEntry> {
        let rule = self.get(rule_index)?;
        rule.entries
            .get(entry_index)
            .ok_or_else(|| ReplacerError::out_of_range("entry", entry_index, rule.entries.len()))
    }

    fn rule_mut(&mut self, index: usize) -> Result<&mut Rule> {
        let len = self.rules.len();
        self.rules
            .get_mut(index)
            .ok_or_else(|| ReplacerError::out_of_range("rule", index, len))
    }

    /// Rules document for the current contents
    pub fn export_json(&self) -> Result<String> {
        codec::encode(&self.rules)
    }

    /// Replace every rule with the contents of a rules document.
    ///
    /// Blank text changes nothing. A document that fails to decode leaves the
    /// current rules in place. Returns the number of rules now held.
    pub fn load_json(&mut self, text: &str) -> Result<usize> {
        if text.trim().is_empty() {
            return Ok(self.rules.len());
        }
        let rules = codec::decode(text)?;
        info!(rules = rules.len(), "Loaded rules");
        self.rules = rules;
        Ok(self.rules.len())
    }

    /// Copy the request's values into the rule at `index`, storing the result.
    pub fn copy_from_request<R: HostRequest>(
        &mut self,
        index: usize,
        request: &R,
    ) -> Result<Vec<FieldMiss>> {
        let outcome = evaluator::copy_to_rule(request, self.get(index)?);
        self.replace_rule(index, outcome.rule)?;
        Ok(outcome.misses)
    }

    /// Use the rule at `index` on a request
    pub fn use_on_request<R: HostRequest>(&self, index: usize, request: &R) -> Result<R> {
        Ok(evaluator::use_rule(request, self.get(index)?))
    }
}
