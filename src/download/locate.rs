//! Finding executables inside extracted release archives.
//!
//! Archives either hold the binary at their root or nest everything in a
//! single folder such as `relicta_Linux_x86_64/`. Lookups return `None`
//! instead of failing so callers can decide whether a missing binary is fatal.

use std::fs;
use std::path::{Path, PathBuf};

/// Locate `binary_name` at `root` or one level down in a directory whose
/// name starts with `tool_prefix`.
#[must_use]
pub fn locate_binary(root: &Path, tool_prefix: &str, binary_name: &str) -> Option<PathBuf> {
    let direct = root.join(binary_name);
    if direct.is_file() {
        return Some(direct);
    }

    subdirectories(root)
        .into_iter()
        .filter(|dir| {
            dir.file_name().and_then(|name| name.to_str()).is_some_and(|name| name.starts_with(tool_prefix))
        })
        .map(|dir| dir.join(binary_name))
        .find(|candidate| candidate.is_file())
}

/// Locate a plugin executable.
///
/// Plugin archives are less regular than relicta's, so the match is looser:
/// `<plugin><exe_suffix>` at the root, then any root file whose name equals
/// the plugin name with or without the suffix ignoring case, then
/// `<plugin><exe_suffix>` inside any immediate subdirectory.
#[must_use]
pub fn locate_plugin_binary(root: &Path, plugin: &str, exe_suffix: &str) -> Option<PathBuf> {
    let binary_name = format!("{plugin}{exe_suffix}");

    let direct = root.join(&binary_name);
    if direct.is_file() {
        return Some(direct);
    }

    let plugin_lower = plugin.to_lowercase();
    let binary_lower = binary_name.to_lowercase();

    let entries = sorted_entries(root);
    let by_name = entries.iter().find(|path| {
        path.is_file()
            && path
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_lowercase)
                .is_some_and(|name| name == plugin_lower || name == binary_lower)
    });
    if let Some(path) = by_name {
        return Some(path.clone());
    }

    entries
        .iter()
        .filter(|path| path.is_dir())
        .map(|dir| dir.join(&binary_name))
        .find(|candidate| candidate.is_file())
}

fn subdirectories(root: &Path) -> Vec<PathBuf> {
    sorted_entries(root).into_iter().filter(|path| path.is_dir()).collect()
}

// Sorted so the result does not depend on directory iteration order
fn sorted_entries(root: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = match fs::read_dir(root) {
        Ok(read_dir) => read_dir.filter_map(Result::ok).map(|entry| entry.path()).collect(),
        Err(_) => Vec::new(),
    };
    entries.sort();
    entries
}
