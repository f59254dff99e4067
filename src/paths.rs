// Path helpers used by every prompt that asks for a file or folder:
// home-directory expansion and Tab completion over the filesystem.

use dialoguer::Completion;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Expand a leading `~` to the user's home directory. Anything else is
/// returned untouched, including a `~` in the middle of the path.
pub fn expand_tilde(input: &str) -> PathBuf {
    PathBuf::from(expand_tilde_str(input))
}

fn expand_tilde_str(input: &str) -> String {
    let home = match dirs::home_dir() {
        Some(home) => home,
        None => return input.to_string(),
    };
    if input == "~" {
        home.to_string_lossy().into_owned()
    } else if let Some(rest) = input.strip_prefix("~/") {
        home.join(rest).to_string_lossy().into_owned()
    } else {
        input.to_string()
    }
}

/// All completions for a partially typed path: directories first, then
/// files, each group sorted by name. Directories carry a trailing `/`.
/// An unreadable or missing directory yields no matches.
pub fn matches(text: &str) -> Vec<String> {
    let expanded = expand_tilde_str(text);

    let (dir_part, prefix) = if expanded.ends_with('/') && Path::new(&expanded).is_dir() {
        (expanded.as_str(), "")
    } else {
        match expanded.rfind('/') {
            Some(i) => (&expanded[..=i], &expanded[i + 1..]),
            None => ("", expanded.as_str()),
        }
    };

    let listing = if dir_part.is_empty() {
        Path::new(".")
    } else {
        Path::new(dir_part)
    };

    let entries = match fs::read_dir(listing) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %listing.display(), error = %e, "no completions");
            return Vec::new();
        }
    };

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with(prefix) {
            continue;
        }
        let full = listing.join(&name);
        if full.is_dir() {
            dirs.push(name);
        } else if full.is_file() {
            files.push(name);
        }
    }
    dirs.sort();
    files.sort();

    dirs.into_iter()
        .map(|name| format!("{dir_part}{name}/"))
        .chain(files.into_iter().map(|name| format!("{dir_part}{name}")))
        .collect()
}

/// The `state`-th completion for `text`, or `None` once the matches run out.
pub fn complete(text: &str, state: usize) -> Option<String> {
    matches(text).into_iter().nth(state)
}

/// Tab completion for dialoguer path prompts. A single match is inserted
/// whole; several matches extend the input to their common prefix.
pub struct PathCompletion;

impl Completion for PathCompletion {
    fn get(&self, input: &str) -> Option<String> {
        let found = matches(input);
        match found.len() {
            0 => None,
            1 => found.into_iter().next(),
            _ => {
                let prefix = common_prefix(&found);
                (prefix.chars().count() > input.chars().count()).then_some(prefix)
            }
        }
    }
}

fn common_prefix(items: &[String]) -> String {
    let mut prefix: Vec<char> = match items.first() {
        Some(first) => first.chars().collect(),
        None => return String::new(),
    };
    for item in &items[1..] {
        let shared = prefix
            .iter()
            .zip(item.chars())
            .take_while(|(a, b)| **a == *b)
            .count();
        prefix.truncate(shared);
    }
    prefix.into_iter().collect()
}
