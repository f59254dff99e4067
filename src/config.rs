// Runtime configuration: where writeups and the credential file live, and
// the GitHub token handed to the publisher.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::prompt::Prompter;

pub const TOKEN_KEY: &str = "GITHUB_TOKEN";

/// Paths and knobs resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub writeups_dir: PathBuf,
    pub credentials_path: PathBuf,
    pub log_filter: String,
}

impl Settings {
    /// Build settings from `REPWRITER_WRITEUPS_DIR`, `REPWRITER_GITENV` and
    /// `REPWRITER_LOG`, falling back to `~/writeups`, `~/.Gitenv` and `warn`.
    pub fn from_env() -> Result<Self> {
        let home = dirs::home_dir().context("Could not determine the home directory")?;
        Ok(Settings {
            writeups_dir: env_path("REPWRITER_WRITEUPS_DIR").unwrap_or_else(|| home.join("writeups")),
            credentials_path: env_path("REPWRITER_GITENV").unwrap_or_else(|| home.join(".Gitenv")),
            log_filter: std::env::var("REPWRITER_LOG").unwrap_or_else(|_| "warn".into()),
        })
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Token read from the credential file.
#[derive(Clone)]
pub struct Credentials {
    token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("token", &"<redacted>").finish()
    }
}

impl Credentials {
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Read the credential file if it exists and load it into the process
    /// environment. Returns `None` when the file is absent.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let mut token = None;
        let entries = dotenvy::from_path_iter(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        for item in entries {
            let (key, value) = match item {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping malformed line");
                    continue;
                }
            };
            // existing environment wins, as with dotenvy::from_path
            if std::env::var_os(&key).is_none() {
                std::env::set_var(&key, &value);
            }
            if key == TOKEN_KEY {
                token = Some(value);
            }
        }

        debug!(path = %path.display(), found = token.is_some(), "credential file loaded");
        Ok(Some(Credentials {
            token: token.unwrap_or_default(),
        }))
    }

    /// Write `GITHUB_TOKEN=<token>` to `path`.
    pub fn create(path: &Path, token: &str) -> Result<Self> {
        let token = token.trim();
        fs::write(path, format!("{TOKEN_KEY}={token}"))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        std::env::set_var(TOKEN_KEY, token);
        info!(path = %path.display(), "credential file created");
        Ok(Credentials {
            token: token.to_string(),
        })
    }

    /// Use the existing credential file, or ask for a token and create it.
    pub fn load_or_create(path: &Path, prompter: &mut dyn Prompter) -> Result<Self> {
        if let Some(creds) = Self::load(path)? {
            println!("Using existing GitHub token from {}.", path.display());
            return Ok(creds);
        }

        println!("GitHub token not found. Let's set it up.");
        let token = prompter.input("Enter your GitHub token")?;
        let creds = Self::create(path, &token)?;
        println!("GitHub token saved to {}.", path.display());
        Ok(creds)
    }
}
