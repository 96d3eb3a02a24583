//! Expansion of paths containing `*` wildcard components
//!
//! Only a single `*` per component is understood, which is all the device and installation
//! patterns need (`/dev/ttyUSB*`, `.../tools/avrdude/*/bin/avrdude`).

use std::fs;
use std::path::{Component, Path, PathBuf};

use log::trace;

/// Returns `true` if `name` matches the single-wildcard `pattern`.
fn matches(pattern: &str, name: &str) -> bool {
    match pattern.find('*') {
        Some(pos) => {
            let (head, tail) = (&pattern[..pos], &pattern[pos + 1..]);

            name.len() >= head.len() + tail.len() && name.starts_with(head) && name.ends_with(tail)
        }
        None => pattern == name,
    }
}

/// Expands `pattern` against the filesystem and returns every existing path that matches, sorted.
///
/// Unreadable directories are treated as having no entries.
pub fn expand<P: AsRef<Path>>(pattern: P) -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::new()];

    for component in pattern.as_ref().components() {
        let wildcard = match component {
            Component::Normal(part) => part.to_str().filter(|part| part.contains('*')),
            _ => None,
        };

        paths = match wildcard {
            Some(wildcard) => paths
                .iter()
                .flat_map(|parent| expand_component(parent, wildcard))
                .collect(),
            None => paths
                .into_iter()
                .map(|mut path| {
                    path.push(component.as_os_str());
                    path
                })
                .collect(),
        };

        if paths.is_empty() {
            break;
        }
    }

    let mut paths: Vec<PathBuf> = paths.into_iter().filter(|path| path.exists()).collect();
    paths.sort();
    paths
}

fn expand_component(parent: &Path, wildcard: &str) -> Vec<PathBuf> {
    let dir = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            trace!("Skipping {}: {}", dir.display(), err);
            return Vec::new();
        }
    };

    entries
        .filter_map(Result::ok)
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .map_or(false, |name| matches(wildcard, name))
        })
        .map(|entry| parent.join(entry.file_name()))
        .collect()
}
