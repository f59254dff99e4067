//! Shared helpers for the integration tests.
//!
//! - `Scripted`: a `Prompter` that replays canned answers.
//! - `RecordingGit`: a `GitRunner` that records calls and can fail on a step.
//! - `repo_fixture`: a temp directory that passes the `.git` check.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Result};
use repwriter::error::{WriteupError, WriteupResult};
use repwriter::prompt::Prompter;
use repwriter::publish::GitRunner;
use tempfile::TempDir;

pub struct Scripted {
    answers: VecDeque<String>,
    interrupt: bool,
    pub asked: Vec<String>,
}

impl Scripted {
    pub fn new(answers: &[&str]) -> Self {
        Scripted {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            interrupt: false,
            asked: Vec::new(),
        }
    }

    /// Replay `answers`, then behave like Ctrl+C at the next prompt.
    pub fn then_interrupt(answers: &[&str]) -> Self {
        Scripted {
            interrupt: true,
            ..Self::new(answers)
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, prompt: &str) -> Result<String> {
        self.asked.push(prompt.to_string());
        match self.answers.pop_front() {
            Some(answer) => Ok(answer),
            None if self.interrupt => Err(WriteupError::Cancelled.into()),
            None => Err(anyhow!("script exhausted at prompt {prompt:?}")),
        }
    }
}

impl Prompter for Scripted {
    fn input(&mut self, prompt: &str) -> Result<String> {
        self.next(prompt)
    }

    fn path(&mut self, prompt: &str) -> Result<String> {
        self.next(prompt)
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Ok(self.next(prompt)?.eq_ignore_ascii_case("y"))
    }
}

#[derive(Default)]
pub struct RecordingGit {
    pub calls: Vec<Vec<String>>,
    pub fail_on: Option<&'static str>,
}

impl RecordingGit {
    pub fn failing_on(step: &'static str) -> Self {
        RecordingGit {
            calls: Vec::new(),
            fail_on: Some(step),
        }
    }

    pub fn steps(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c[0].as_str()).collect()
    }
}

impl GitRunner for RecordingGit {
    fn run(&mut self, _workdir: &Path, args: &[&str]) -> WriteupResult<()> {
        self.calls.push(args.iter().map(|a| a.to_string()).collect());
        match self.fail_on {
            Some(step) if args.first() == Some(&step) => Err(WriteupError::GitCommand {
                step: step.to_string(),
                message: "remote rejected".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// Temp directory with an empty `.git` folder and the given subfolders.
pub fn repo_fixture(subdirs: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    for sub in subdirs {
        fs::create_dir_all(dir.path().join(sub)).unwrap();
    }
    dir
}

/// A small file standing in for a screenshot.
pub fn image_fixture(dir: &Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"\x89PNG fake").unwrap();
    path
}
