// Terminal output helpers: the startup banner and coloured status lines.

use crossterm::style::{style, Stylize};
use crossterm::{cursor, execute};
use std::io;

const BANNER: &str = r#"
    .------------------------------------------------------------------.
    |                      .mmMMMMMMMMMMMMMmm.                         |
    |                  .mMMMMMMMMMMMMMMMMMMMMMMMm.                     |
    |               .mMMMMMMMM"`         `"MMMMMMMMm.                  |
    |              MMMMMMMM'                 'MMMMMMMM                 |
    |             MMMMMMMM       REPWRITER     MMMMMMMM                |
    |              MMMMMMMM.                 .MMMMMMMM                 |
    |               `"MMMMMMMMm.         .mMMMMMMMM"`                  |
    |                   `"MMMMMMMMMMMMMMMMMMMMM"`                      |
    '------------------------------------------------------------------'
"#;

pub fn banner() {
    println!("{}", style(BANNER).cyan());
}

pub fn success(msg: &str) {
    println!("✅ {}", style(msg).green());
}

pub fn failure(msg: &str) {
    println!("❌ {}", style(msg).red());
}

pub fn warning(msg: &str) {
    println!("⚠️ {}", style(msg).yellow());
}

/// Horizontal rule with a heading, as used by every menu screen.
pub fn heading(title: &str) {
    println!("\n{}", "=".repeat(40));
    println!("{}", style(title).bold());
    println!("{}", "=".repeat(40));
}

/// Prompts may hide the cursor; make sure it comes back before exiting.
pub fn restore_cursor() {
    let _ = execute!(io::stdout(), cursor::Show);
}
