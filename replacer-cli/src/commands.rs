//! Subcommand implementations

use crate::config::CliConfig;
use crate::{CheckArgs, CopyArgs, ListArgs, UseArgs};
use anyhow::Context;
use replacer_engine::{menu_items, HttpRequest, RuleStore};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Read a rules file into a store. An empty file is an empty store.
pub fn load_store(path: &Path) -> anyhow::Result<RuleStore> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules file {}", path.display()))?;
    let store = RuleStore::from_json(&text)
        .with_context(|| format!("Failed to load rules from {}", path.display()))?;
    info!(path = %path.display(), rules = store.len(), "Rules file loaded");
    Ok(store)
}

pub fn load_request(path: &Path) -> anyhow::Result<HttpRequest> {
    let raw = fs::read(path)
        .with_context(|| format!("Failed to read request file {}", path.display()))?;
    HttpRequest::parse(&raw).with_context(|| format!("Failed to parse request {}", path.display()))
}

/// `replacer use`: write the rule's values into the request
pub fn use_rule<W: Write>(cmd: &UseArgs, config: &CliConfig, out: &mut W) -> anyhow::Result<()> {
    let store = load_store(&cmd.rules.rules)?;
    let index = store.find_by_name(&cmd.rule)?;
    let request = load_request(&cmd.request)?;

    let updated = store.use_on_request(index, &request)?;
    let mut bytes = updated.to_bytes();
    if config.lf_output {
        bytes = with_lf_head(&bytes);
    }

    match &cmd.output {
        Some(path) => fs::write(path, &bytes)
            .with_context(|| format!("Failed to write request to {}", path.display()))?,
        None => out.write_all(&bytes)?,
    }
    Ok(())
}

/// `replacer copy`: read the request's values into the rule
pub fn copy_rule<W: Write>(cmd: &CopyArgs, out: &mut W) -> anyhow::Result<()> {
    let path = &cmd.rules.rules;
    let mut store = load_store(path)?;
    let index = store.find_by_name(&cmd.rule)?;
    let request = load_request(&cmd.request)?;

    let misses = store.copy_from_request(index, &request)?;

    let text = store.export_json()?;
    if cmd.write {
        fs::write(path, &text)
            .with_context(|| format!("Failed to write rules file {}", path.display()))?;
        writeln!(
            out,
            "Updated rule '{}' in {} ({} missing)",
            cmd.rule,
            path.display(),
            misses.len()
        )?;
    } else {
        writeln!(out, "{}", text)?;
    }
    Ok(())
}

/// `replacer list`: rule names, or the menu a tool would show
pub fn list_rules<W: Write>(cmd: &ListArgs, out: &mut W) -> anyhow::Result<()> {
    let store = load_store(&cmd.rules.rules)?;

    match cmd.tool {
        Some(tool) => {
            for item in menu_items(&store, tool, true) {
                writeln!(out, "{}", item.label)?;
            }
        }
        None => {
            for (index, rule) in store.rules().iter().enumerate() {
                writeln!(out, "{}\t{}\t{} entries", index, rule.name, rule.entries.len())?;
            }
        }
    }
    Ok(())
}

/// `replacer check`: make sure the rules file loads
pub fn check_rules<W: Write>(cmd: &CheckArgs, out: &mut W) -> anyhow::Result<()> {
    let store = load_store(&cmd.rules.rules)?;
    let unnamed = store.rules().iter().filter(|r| !r.is_actionable()).count();
    if unnamed > 0 {
        warn!(unnamed, "Rules without a name are never offered in menus");
    }
    writeln!(out, "OK: {} rules", store.len())?;
    Ok(())
}

/// Rewrite the CRLF line endings of the request head as bare LF. The body is
/// left as it was.
fn with_lf_head(bytes: &[u8]) -> Vec<u8> {
    let split = bytes
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|at| at + 4)
        .unwrap_or(bytes.len());
    let (head, body) = bytes.split_at(split);

    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < head.len() {
        if head[i] == b'\r' && head.get(i + 1) == Some(&b'\n') {
            i += 1;
            continue;
        }
        out.push(head[i]);
        i += 1;
    }
    out.extend_from_slice(body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_lf_head_keeps_body() {
        let bytes = b"GET / HTTP/1.1\r\nHost: a\r\n\r\nline\r\nbody";
        assert_eq!(with_lf_head(bytes), b"GET / HTTP/1.1\nHost: a\n\nline\r\nbody".to_vec());
    }
}
