// Interactive descent through the repository to pick where a writeup goes.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::prompt::Prompter;
use crate::term;

/// Immediate subdirectories of `dir`, sorted by name. `.git` is skipped and
/// an unreadable directory lists as empty.
pub fn subdirectories(dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot list folder");
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name != ".git")
        .collect();
    names.sort();
    names
}

/// Let the user walk down from `base` and pick a folder. `None` means the
/// user backed out of this level.
pub fn select_folder(prompter: &mut dyn Prompter, base: &Path) -> Result<Option<PathBuf>> {
    loop {
        let folders = subdirectories(base);

        println!("\nAvailable folders in {}:", base.display());
        for (i, folder) in folders.iter().enumerate() {
            println!("{}. {}", i + 1, folder);
        }
        let select = folders.len() + 1;
        let back = folders.len() + 2;
        println!("{select}. Select this folder");
        println!("{back}. Go back");

        let choice = prompter.input(
            "Enter the number of the folder to navigate (or 's' to select this folder, 'b' to go back)",
        )?;
        let choice = choice.trim().to_lowercase();

        match choice.as_str() {
            "s" => return Ok(Some(base.to_path_buf())),
            "b" => return Ok(None),
            _ => {}
        }

        let n: usize = match choice.parse() {
            Ok(n) => n,
            Err(_) => {
                term::failure("Invalid input. Please enter a number.");
                continue;
            }
        };

        if n == 0 || n > back {
            term::failure("Invalid choice.");
        } else if n == select {
            return Ok(Some(base.to_path_buf()));
        } else if n == back {
            return Ok(None);
        } else if let Some(picked) = select_folder(prompter, &base.join(&folders[n - 1]))? {
            return Ok(Some(picked));
        }
    }
}
