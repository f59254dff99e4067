// Error taxonomy shared by the document model, navigator and publisher.
// The interactive layer wraps these in `anyhow` and only inspects
// `Cancelled` to decide which message to print on the way out.

use std::path::PathBuf;
use thiserror::Error;

pub type WriteupResult<T> = Result<T, WriteupError>;

#[derive(Error, Debug)]
pub enum WriteupError {
    #[error("Title cannot be empty.")]
    EmptyTitle,

    #[error("Flag cannot be empty.")]
    EmptyFlag,

    /// The path does not point at an existing regular file.
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// The path is not a directory holding a `.git` folder.
    #[error("Invalid repository path: {}", path.display())]
    NotARepository { path: PathBuf },

    #[error("Image name '{name}' is reserved for the machine image.")]
    ReservedImageName { name: String },

    #[error("Image name '{name}' is already in use.")]
    ImageNameTaken { name: String },

    #[error("Invalid option: entry {index} does not exist ({len} entries)")]
    EntryOutOfRange { index: usize, len: usize },

    /// A git step exited unsuccessfully or could not be spawned.
    #[error("git {step} failed: {message}")]
    GitCommand { step: String, message: String },

    #[error("Operation canceled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WriteupError {
    /// True when the error came from the user aborting the session.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WriteupError::Cancelled)
    }
}
