//! Shared helpers for cross-crate tests

use std::path::{Path, PathBuf};

/// Root of the cargo workspace
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".."))
}

/// Manifest path of a workspace member, or of the root when `member` is empty
pub fn manifest_path(member: &str) -> PathBuf {
    if member.is_empty() {
        workspace_root().join("Cargo.toml")
    } else {
        workspace_root().join(member).join("Cargo.toml")
    }
}
