// Input seam for every interactive flow. `Console` talks to the terminal
// through dialoguer; tests swap in a scripted implementation.

use anyhow::Result;
use dialoguer::{Confirm, Input};
use std::io;

use crate::error::WriteupError;
use crate::paths::PathCompletion;

pub trait Prompter {
    /// Read one line of free text. Empty input is allowed.
    fn input(&mut self, prompt: &str) -> Result<String>;

    /// Read a filesystem path; Tab completes against the filesystem.
    fn path(&mut self, prompt: &str) -> Result<String>;

    /// Ask a yes/no question.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Terminal-backed prompter.
#[derive(Default)]
pub struct Console;

impl Console {
    pub fn new() -> Self {
        Console
    }
}

impl Prompter for Console {
    fn input(&mut self, prompt: &str) -> Result<String> {
        let line: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(interrupted)?;
        Ok(line)
    }

    fn path(&mut self, prompt: &str) -> Result<String> {
        let completion = PathCompletion;
        let line: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .completion_with(&completion)
            .interact_text()
            .map_err(interrupted)?;
        Ok(line)
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(interrupted)?;
        Ok(answer)
    }
}

// Ctrl+C inside a raw-mode prompt surfaces as an interrupted read.
fn interrupted(err: dialoguer::Error) -> anyhow::Error {
    match err {
        dialoguer::Error::IO(io_err) if io_err.kind() == io::ErrorKind::Interrupted => {
            WriteupError::Cancelled.into()
        }
        other => anyhow::Error::new(other).context("Failed to read terminal input"),
    }
}
