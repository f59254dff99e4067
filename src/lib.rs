// Library root
// -----------
// The binary (`main.rs`) wires these modules into the interactive writeup
// wizard.
//
// Module responsibilities:
// - `document`: the writeup model and its Markdown rendering.
// - `ui`: the menu loop and the finish/publish session.
// - `navigator`: picking the destination folder inside the repository.
// - `publish`: copying the result and running git add/commit/push.
// - `references`, `paths`: text and path helpers used by the prompts.
// - `prompt`: the input seam (`Prompter`) and its dialoguer implementation.
// - `config`, `logging`, `term`, `error`: ambient plumbing.
pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod navigator;
pub mod paths;
pub mod prompt;
pub mod publish;
pub mod references;
pub mod term;
pub mod ui;
