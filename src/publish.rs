// Publisher: copies a finished writeup and its images into the chosen
// repository folder, then stages, commits and pushes.
//
// Git is reached through `GitRunner` so the step sequence can be checked
// without a real repository. Copies are never rolled back; a failed commit
// or push leaves the files where they were put.

use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{Credentials, TOKEN_KEY};
use crate::document::Image;
use crate::error::{WriteupError, WriteupResult};

/// Runs one git subcommand inside a working directory.
pub trait GitRunner {
    fn run(&mut self, workdir: &Path, args: &[&str]) -> WriteupResult<()>;
}

/// Shells out to the `git` binary.
pub struct GitCli {
    token: Option<String>,
}

impl GitCli {
    pub fn new(credentials: Option<&Credentials>) -> Self {
        GitCli {
            token: credentials
                .map(|c| c.token().to_string())
                .filter(|t| !t.is_empty()),
        }
    }
}

impl GitRunner for GitCli {
    fn run(&mut self, workdir: &Path, args: &[&str]) -> WriteupResult<()> {
        let step = args.first().copied().unwrap_or("git").to_string();

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(format!("git {}...", args.join(" ")));
        spinner.enable_steady_tick(Duration::from_millis(100));

        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(workdir);
        if let Some(token) = &self.token {
            cmd.env(TOKEN_KEY, token);
        }
        debug!(workdir = %workdir.display(), ?args, "running git");
        let output = cmd.output();
        spinner.finish_and_clear();

        let output = output.map_err(|e| WriteupError::GitCommand {
            step: step.clone(),
            message: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("exit code {:?}", output.status.code())
            } else {
                stderr
            };
            return Err(WriteupError::GitCommand { step, message });
        }
        Ok(())
    }
}

/// What ended up on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub folder: PathBuf,
    pub copied: Vec<PathBuf>,
}

/// `<target>/<markdown file stem>`.
pub fn machine_folder(markdown: &Path, target: &Path) -> PathBuf {
    let stem = markdown
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "writeup".into());
    target.join(stem)
}

pub fn commit_message(folder: &Path) -> String {
    let name = folder
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("Add writeup: {name}")
}

/// Copy the Markdown file and every image (as `<name>.png`) into the
/// machine folder under `target`.
pub fn copy_artifacts(markdown: &Path, images: &[Image], target: &Path) -> WriteupResult<PublishReport> {
    let folder = machine_folder(markdown, target);
    fs::create_dir_all(&folder)?;

    let mut copied = Vec::with_capacity(images.len() + 1);
    let file_name = markdown.file_name().ok_or_else(|| WriteupError::FileNotFound {
        path: markdown.to_path_buf(),
    })?;
    let dest = folder.join(file_name);
    fs::copy(markdown, &dest)?;
    copied.push(dest);

    for image in images {
        let dest = folder.join(format!("{}.png", image.name));
        fs::copy(&image.path, &dest)?;
        copied.push(dest);
    }

    info!(folder = %folder.display(), files = copied.len(), "writeup copied");
    Ok(PublishReport { folder, copied })
}

pub struct Publisher<R: GitRunner> {
    runner: R,
}

impl<R: GitRunner> Publisher<R> {
    pub fn new(runner: R) -> Self {
        Publisher { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Copy, then `git add .`, `git commit`, `git push` inside `target`.
    /// Stops at the first failing git step.
    pub fn publish(&mut self, markdown: &Path, images: &[Image], target: &Path) -> WriteupResult<PublishReport> {
        let report = copy_artifacts(markdown, images, target)?;
        let message = commit_message(&report.folder);

        let commit = ["commit", "-m", message.as_str()];
        let steps: [&[&str]; 3] = [&["add", "."], &commit, &["push"]];
        for args in steps {
            if let Err(e) = self.runner.run(target, args) {
                warn!(error = %e, "publish aborted");
                return Err(e);
            }
        }

        info!(folder = %report.folder.display(), "writeup published");
        Ok(report)
    }
}
