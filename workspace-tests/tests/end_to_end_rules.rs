//! Copy/use cycle across the engine and the command-line host

use replacer_cli::{run, Args, Command, CopyArgs, ListArgs, RulesArg, UseArgs};
use replacer_engine::{
    FieldKind, HostRequest, HttpRequest, Rule, RuleStore, ToolSource, TypeEntry,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SOURCE_REQUEST: &str = "POST /api/refresh?client=web HTTP/1.1\r\n\
    Host: shop.example\r\n\
    Authorization: Bearer new-token\r\n\
    Cookie: session=s-new; cart=3\r\n\
    Content-Type: application/x-www-form-urlencoded\r\n\
    Content-Length: 21\r\n\
    \r\n\
    csrf=c-new&remember=1";

const REPLAY_REQUEST: &str = "POST /api/checkout?client=web HTTP/1.1\r\n\
    Host: shop.example\r\n\
    Authorization: Bearer old-token\r\n\
    Cookie: cart=3; session=s-old\r\n\
    Content-Type: application/x-www-form-urlencoded\r\n\
    Content-Length: 24\r\n\
    \r\n\
    item=42&csrf=c-old&qty=1";

fn args(command: Command) -> Args {
    Args {
        log_level: "warn".to_string(),
        json_logs: false,
        lf: false,
        command,
    }
}

fn rules_arg(path: &Path) -> RulesArg {
    RulesArg {
        rules: path.to_path_buf(),
    }
}

fn write_fixture(dir: &TempDir) -> anyhow::Result<(PathBuf, PathBuf, PathBuf)> {
    let mut store = RuleStore::new();
    let index = store.add_empty_rule();
    store.rename_rule(index, "checkout")?;
    store.update_entry(index, 0, TypeEntry::new(FieldKind::Header, "Authorization", ""))?;
    store.add_entry(index, TypeEntry::new(FieldKind::Cookie, "session", ""))?;
    store.add_entry(index, TypeEntry::new(FieldKind::BodyParameter, "csrf", ""))?;

    let rules = dir.path().join("rules.json");
    let source = dir.path().join("source.http");
    let target = dir.path().join("target.http");
    fs::write(&rules, store.export_json()?)?;
    fs::write(&source, SOURCE_REQUEST)?;
    fs::write(&target, REPLAY_REQUEST)?;
    Ok((rules, source, target))
}

#[test]
fn test_copy_then_use_through_cli() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let (rules, source, target) = write_fixture(&dir)?;

    let mut out = Vec::new();
    run(
        args(Command::Copy(CopyArgs {
            rules: rules_arg(&rules),
            rule: "checkout".to_string(),
            request: source,
            write: true,
        })),
        &mut out,
    )?;

    let store = RuleStore::from_json(&fs::read_to_string(&rules)?)?;
    let values: Vec<_> = store.rules()[0]
        .entries
        .iter()
        .map(|e| e.replace_value.as_str())
        .collect();
    assert_eq!(values, vec!["Bearer new-token", "s-new", "c-new"]);

    let output = dir.path().join("replayed.http");
    run(
        args(Command::Use(UseArgs {
            rules: rules_arg(&rules),
            rule: "checkout".to_string(),
            request: target,
            output: Some(output.clone()),
        })),
        &mut Vec::new(),
    )?;

    let replayed = HttpRequest::parse(&fs::read(&output)?)?;
    assert_eq!(replayed.target(), "/api/checkout?client=web");
    assert_eq!(replayed.header_value("Authorization"), Some("Bearer new-token"));
    assert_eq!(replayed.header_value("Cookie"), Some("cart=3; session=s-new"));
    assert_eq!(replayed.body(), b"item=42&csrf=c-new&qty=1");
    assert_eq!(replayed.header_value("Content-Length"), Some("24"));
    Ok(())
}

#[test]
fn test_engine_and_cli_agree_on_use() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let (rules, _, target) = write_fixture(&dir)?;

    let rule = Rule::new(
        "checkout",
        vec![TypeEntry::new(FieldKind::Header, "Authorization", "Bearer fixed")],
    );
    fs::write(&rules, replacer_engine::encode(&[rule.clone()])?)?;

    let mut out = Vec::new();
    run(
        args(Command::Use(UseArgs {
            rules: rules_arg(&rules),
            rule: "checkout".to_string(),
            request: target,
            output: None,
        })),
        &mut out,
    )?;

    let direct = replacer_engine::use_rule(&REPLAY_REQUEST.parse::<HttpRequest>()?, &rule);
    assert_eq!(out, direct.to_bytes());
    Ok(())
}

#[test]
fn test_list_matches_engine_menu() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let (rules, _, _) = write_fixture(&dir)?;

    let mut out = Vec::new();
    run(
        args(Command::List(ListArgs {
            rules: rules_arg(&rules),
            tool: Some(ToolSource::Logger),
        })),
        &mut out,
    )?;

    let store = RuleStore::from_json(&fs::read_to_string(&rules)?)?;
    let expected: String = replacer_engine::menu_items(&store, ToolSource::Logger, true)
        .into_iter()
        .map(|item| format!("{}\n", item.label))
        .collect();
    assert_eq!(String::from_utf8(out)?, expected);
    assert_eq!(expected, "Copy to checkout\n");
    Ok(())
}
