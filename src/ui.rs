// UI layer: the text menu that builds a writeup, and the session that
// hands the finished file to the folder navigator and the publisher.
// Everything is synchronous; each prompt blocks until the user answers.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::{Credentials, Settings};
use crate::document::{flag_preview, Entry, Image, Writeup};
use crate::error::WriteupError;
use crate::navigator::select_folder;
use crate::paths::expand_tilde;
use crate::prompt::Prompter;
use crate::publish::{GitCli, GitRunner, PublishReport, Publisher};
use crate::references::link_references;
use crate::term;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    AddTitle,
    AddMachineImage,
    AddDescription,
    AddFlag,
    EditSteps,
    Finish,
    Quit,
}

const OPTIONS: [(&str, &str); 7] = [
    ("1", "Add Title"),
    ("2", "Add Machine Image"),
    ("3", "Add Description with Subtitle, One-liner, and/or Image"),
    ("4", "Add Flag"),
    ("5", "Edit Steps"),
    ("F", "Finish and Generate Writeup"),
    ("Q", "Quit without Saving"),
];

impl MenuOption {
    /// Match an option code exactly. Letters are case-insensitive.
    pub fn parse(input: &str) -> Option<Self> {
        match input.to_uppercase().as_str() {
            "1" => Some(MenuOption::AddTitle),
            "2" => Some(MenuOption::AddMachineImage),
            "3" => Some(MenuOption::AddDescription),
            "4" => Some(MenuOption::AddFlag),
            "5" => Some(MenuOption::EditSteps),
            "F" => Some(MenuOption::Finish),
            "Q" => Some(MenuOption::Quit),
            _ => None,
        }
    }
}

/// How the menu loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The writeup was written to this path.
    Finished(PathBuf),
    Quit,
}

pub fn is_repository(path: &Path) -> bool {
    path.is_dir() && path.join(".git").exists()
}

/// Ask until the user gives a directory that contains `.git`.
pub fn ask_repo_path(prompter: &mut dyn Prompter) -> Result<PathBuf> {
    loop {
        let raw = prompter.path("\nEnter the path to the repository (use Tab for completion)")?;
        let path = expand_tilde(raw.trim());
        if is_repository(&path) {
            return Ok(path);
        }
        term::failure(&format!(
            "{}. Please provide a valid path containing a .git folder.",
            WriteupError::NotARepository { path }
        ));
    }
}

/// Ask until the user gives an existing file.
fn ask_existing_file(prompter: &mut dyn Prompter, prompt: &str) -> Result<PathBuf> {
    loop {
        let raw = prompter.path(prompt)?;
        let path = expand_tilde(raw.trim());
        if path.is_file() {
            return Ok(path);
        }
        term::failure("File not found. Please check the path.");
    }
}

/// Body lines until `END`, each one passed through the reference linker.
fn read_lines(prompter: &mut dyn Prompter) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    loop {
        let line = prompter.input(">")?;
        if line.trim().eq_ignore_ascii_case("END") {
            break;
        }
        lines.push(link_references(&line, prompter)?);
    }
    Ok(lines)
}

fn report(result: Result<(), WriteupError>, done: &str) {
    match result {
        Ok(()) => term::success(done),
        Err(e) => term::failure(&e.to_string()),
    }
}

/// The menu over one writeup for one repository.
pub struct Wizard {
    repo: PathBuf,
    writeup: Writeup,
}

impl Wizard {
    pub fn new(repo: PathBuf) -> Self {
        Wizard {
            repo,
            writeup: Writeup::new(),
        }
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    pub fn writeup(&self) -> &Writeup {
        &self.writeup
    }

    fn print_outline(&self) {
        for (i, entry) in self.writeup.entries().iter().enumerate() {
            println!("{:>3}. {}", i + 1, self.writeup.describe(entry));
        }
    }

    fn show_menu(&self) {
        term::heading("WRITEUP GENERATOR");
        println!("Current Structure:");
        self.print_outline();
        println!("\nOptions:");
        for (code, label) in OPTIONS {
            println!("{code:>3}. {label}");
        }
    }

    /// Run the menu until the user finishes or quits. On finish the writeup
    /// is written under `writeups_dir`.
    pub fn run(&mut self, prompter: &mut dyn Prompter, writeups_dir: &Path) -> Result<Outcome> {
        loop {
            self.show_menu();
            let choice = prompter.input("\nSelect an option")?;
            match MenuOption::parse(&choice) {
                Some(MenuOption::AddTitle) => self.add_title(prompter)?,
                Some(MenuOption::AddMachineImage) => self.add_machine_image(prompter)?,
                Some(MenuOption::AddDescription) => self.add_description(prompter)?,
                Some(MenuOption::AddFlag) => self.add_flag(prompter)?,
                Some(MenuOption::EditSteps) => self.edit_steps(prompter)?,
                Some(MenuOption::Finish) => {
                    if self.writeup.title().is_empty() {
                        term::warning("No title provided, using default filename.");
                    }
                    let path = self.writeup.finish(writeups_dir)?;
                    term::success(&format!("Writeup generated successfully: {}", path.display()));
                    return Ok(Outcome::Finished(path));
                }
                Some(MenuOption::Quit) => {
                    term::failure("Operation canceled");
                    return Ok(Outcome::Quit);
                }
                None => term::warning("Invalid option, try again"),
            }
        }
    }

    pub fn add_title(&mut self, prompter: &mut dyn Prompter) -> Result<()> {
        let title = prompter.input("\nEnter the machine title")?;
        report(self.writeup.set_title(&title), "Title updated.");
        Ok(())
    }

    pub fn add_machine_image(&mut self, prompter: &mut dyn Prompter) -> Result<()> {
        let path = ask_existing_file(
            prompter,
            "\nEnter the path to the machine image (use Tab for completion)",
        )?;
        report(self.writeup.set_machine_image(&path), "Machine image updated.");
        Ok(())
    }

    pub fn add_description(&mut self, prompter: &mut dyn Prompter) -> Result<()> {
        let subtitle = prompter.input("\nEnter the subtitle for this section")?;
        println!("\nEnter the description (type 'END' on a new line to finish):");
        let lines = read_lines(prompter)?;

        let oneliner = if prompter.confirm("Add a one-liner?")? {
            Some(prompter.input("Enter the one-liner (terminal style)")?.trim().to_string())
        } else {
            None
        };

        let image = if prompter.confirm("Add an image?")? {
            let path = ask_existing_file(prompter, "Enter the path to the image (Tab for completion)")?;
            let name = self.ask_image_name(
                prompter,
                "Enter a name for the image (e.g., 'scan_results')",
                None,
            )?;
            Some(Image::new(name, path))
        } else {
            None
        };

        let added = self
            .writeup
            .add_description(&subtitle, lines, oneliner, image)
            .map(|_| ());
        report(added, "Description added.");
        Ok(())
    }

    pub fn add_flag(&mut self, prompter: &mut dyn Prompter) -> Result<()> {
        println!("\nEnter the flag (it will be partially hidden in the markdown):");
        let flag = prompter.input("Flag")?;
        if flag.trim().is_empty() {
            term::failure(&WriteupError::EmptyFlag.to_string());
            return Ok(());
        }

        println!("\nFlag entered: {}", flag.trim());
        if prompter.confirm("Confirm adding this flag?")? {
            report(self.writeup.add_flag(&flag).map(|_| ()), "Flag added successfully.");
        } else {
            term::failure("Flag addition cancelled.");
        }
        Ok(())
    }

    pub fn edit_steps(&mut self, prompter: &mut dyn Prompter) -> Result<()> {
        if self.writeup.is_empty() {
            println!("No steps to edit.");
            return Ok(());
        }

        loop {
            term::heading("Edit Steps");
            self.print_outline();
            println!("  b. Go back");

            let choice = prompter.input("\nSelect an option")?.trim().to_lowercase();
            if choice == "b" {
                return Ok(());
            }
            match choice.parse::<usize>() {
                Ok(n) if n >= 1 => self.edit_entry(prompter, n - 1)?,
                _ => term::failure("Invalid option. Try again."),
            }
        }
    }

    /// Open the editor matching the entry at `index` (zero-based). An index
    /// past the end is reported and nothing changes.
    pub fn edit_entry(&mut self, prompter: &mut dyn Prompter, index: usize) -> Result<()> {
        let entry = match self.writeup.entry(index) {
            Ok(entry) => entry.clone(),
            Err(e) => {
                term::failure(&e.to_string());
                return Ok(());
            }
        };

        match entry {
            Entry::Title(_) => self.add_title(prompter),
            Entry::Image { .. } => self.add_machine_image(prompter),
            Entry::Description(step) => self.edit_description(prompter, step),
            Entry::Flag(flag) => self.edit_flag(prompter, flag),
        }
    }

    fn edit_description(&mut self, prompter: &mut dyn Prompter, index: usize) -> Result<()> {
        loop {
            let step = self.writeup.step(index)?.clone();
            let image_path = step
                .image
                .as_deref()
                .and_then(|name| self.writeup.image_path(name))
                .map(|p| p.display().to_string());

            term::heading(&format!("Editing Description: {}", step.subtitle));
            println!("1. Edit Subtitle: {}", step.subtitle);
            println!(
                "2. Edit Description: {}...",
                step.lines.first().map(String::as_str).unwrap_or_default()
            );
            println!("3. Edit One-liner: {}", step.oneliner.as_deref().unwrap_or("None"));
            println!("4. Edit Image: {}", image_path.as_deref().unwrap_or("None"));
            println!("b. Go back");

            let choice = prompter.input("\nSelect what to edit")?.trim().to_lowercase();
            match choice.as_str() {
                "b" => return Ok(()),
                "1" => {
                    let new = prompter.input(&format!("New subtitle (current: '{}')", step.subtitle))?;
                    if !new.trim().is_empty() {
                        self.writeup.set_step_subtitle(index, &new)?;
                    }
                    term::success("Subtitle updated.");
                }
                "2" => {
                    println!("\nCurrent description:\n{}", step.lines.join(" "));
                    println!(
                        "\nEnter new description (type 'END' on a new line to finish, leave blank to keep current):"
                    );
                    let lines = read_lines(prompter)?;
                    if !lines.is_empty() {
                        self.writeup.set_step_lines(index, lines)?;
                    }
                    term::success("Description updated.");
                }
                "3" => {
                    let current = step.oneliner.as_deref().unwrap_or("None");
                    let new = prompter.input(&format!(
                        "New one-liner (current: '{current}', press Enter to keep)"
                    ))?;
                    if !new.trim().is_empty() {
                        self.writeup
                            .set_step_oneliner(index, Some(new.trim().to_string()))?;
                    }
                    term::success("One-liner updated.");
                }
                "4" => self.edit_step_image(prompter, index, step.image.as_deref())?,
                _ => term::failure("Invalid option. Try again."),
            }
        }
    }

    fn edit_step_image(
        &mut self,
        prompter: &mut dyn Prompter,
        index: usize,
        current: Option<&str>,
    ) -> Result<()> {
        if prompter.confirm("Change image?")? {
            let raw = prompter.path("Enter new image path (Tab for completion)")?;
            let path = expand_tilde(raw.trim());
            if raw.trim().is_empty() || !path.is_file() {
                term::failure("Invalid image path.");
                return Ok(());
            }
            let name = self.ask_image_name(
                prompter,
                "Enter new image name (press Enter to keep current)",
                current,
            )?;
            self.writeup.set_step_image(index, Some(Image::new(name, path)))?;
            term::success("Image updated.");
        } else if current.is_some() && prompter.confirm("Remove the current image?")? {
            self.writeup.set_step_image(index, None)?;
            term::success("Image removed.");
        } else {
            println!("Image unchanged.");
        }
        Ok(())
    }

    /// Ask until the name is free. Empty input keeps `current`, or picks the
    /// first unused `image_<n>`.
    fn ask_image_name(
        &self,
        prompter: &mut dyn Prompter,
        prompt: &str,
        current: Option<&str>,
    ) -> Result<String> {
        loop {
            let raw = prompter.input(prompt)?;
            let name = match (raw.trim(), current) {
                ("", Some(current)) => current.to_string(),
                ("", None) => self.writeup.next_image_name(),
                (given, _) => given.to_string(),
            };
            match self.writeup.check_image_name(&name, current) {
                Ok(()) => return Ok(name),
                Err(e) => term::failure(&e.to_string()),
            }
        }
    }

    fn edit_flag(&mut self, prompter: &mut dyn Prompter, index: usize) -> Result<()> {
        loop {
            let flag = self.writeup.flag(index)?.to_string();
            term::heading(&format!("Editing Flag: {}", flag_preview(&flag)));
            println!("1. Edit Flag: {}", flag_preview(&flag));
            println!("b. Go back");

            let choice = prompter.input("\nSelect what to edit")?.trim().to_lowercase();
            match choice.as_str() {
                "b" => return Ok(()),
                "1" => {
                    let new = prompter.input(&format!("New flag (current: '{flag}')"))?;
                    report(self.writeup.set_flag(index, &new), "Flag updated.");
                }
                _ => term::failure("Invalid option. Try again."),
            }
        }
    }
}

/// Pick a folder under `repo` and publish the written file there.
/// Failures are reported on the terminal; `None` means nothing was published.
pub fn deliver<R: GitRunner>(
    prompter: &mut dyn Prompter,
    repo: &Path,
    file: &Path,
    images: &[Image],
    publisher: &mut Publisher<R>,
) -> Result<Option<PublishReport>> {
    println!("\nSelect the folder to save the writeup:");
    let target = match select_folder(prompter, repo)? {
        Some(target) if target.exists() => target,
        _ => {
            term::failure("Target folder not found or not selected.");
            return Ok(None);
        }
    };

    match publisher.publish(file, images, &target) {
        Ok(report) => {
            let name = report
                .folder
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            term::success(&format!(
                "Writeup and images uploaded to GitHub in folder: {name}"
            ));
            Ok(Some(report))
        }
        Err(e @ WriteupError::GitCommand { .. }) => {
            term::failure(&format!("Error executing Git commands: {e}"));
            Ok(None)
        }
        Err(e) => {
            term::failure(&format!("Publish failed: {e}"));
            Ok(None)
        }
    }
}

/// Whole interactive session: repository, menu, then publish on finish.
pub fn main_menu(prompter: &mut dyn Prompter, settings: &Settings, credentials: &Credentials) -> Result<()> {
    let repo = ask_repo_path(prompter)?;
    let mut wizard = Wizard::new(repo);

    if let Outcome::Finished(file) = wizard.run(prompter, &settings.writeups_dir)? {
        let mut publisher = Publisher::new(GitCli::new(Some(credentials)));
        deliver(
            prompter,
            wizard.repo(),
            &file,
            wizard.writeup().images(),
            &mut publisher,
        )?;
    }
    Ok(())
}
