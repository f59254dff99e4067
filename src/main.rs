// Entrypoint for the writeup wizard.
// - Keeps `main` small: load settings, set up logging and Ctrl+C, then hand
//   a terminal prompter to the session.
// - Never fails the process: every error is printed and the exit code is 0.

use anyhow::Context;
use repwriter::config::{Credentials, Settings};
use repwriter::error::WriteupError;
use repwriter::prompt::Console;
use repwriter::{logging, term, ui::main_menu};

const CANCELLED: &str = "Operation canceled (Ctrl+C pressed)";

fn run() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;
    logging::init_logging(&settings);

    // Covers SIGINT outside raw-mode prompts, e.g. while git is running.
    ctrlc::set_handler(|| {
        term::restore_cursor();
        println!();
        term::failure(CANCELLED);
        std::process::exit(0);
    })
    .context("Failed to install Ctrl+C handler")?;

    let mut console = Console::new();
    let credentials = Credentials::load_or_create(&settings.credentials_path, &mut console)?;
    main_menu(&mut console, &settings, &credentials)
}

fn main() {
    term::banner();

    if let Err(err) = run() {
        println!();
        let cancelled = err
            .downcast_ref::<WriteupError>()
            .is_some_and(WriteupError::is_cancelled);
        if cancelled {
            term::failure(CANCELLED);
        } else {
            term::failure(&format!("An error occurred: {err:#}"));
        }
    }

    term::restore_cursor();
}
