use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No .hex file found in the current directory.")]
    NoImage,
    #[error("Cancelled by user.")]
    Cancelled,
    #[error("avrdude not found. Install the Arduino IDE or PlatformIO, or add avrdude to PATH.")]
    FlasherNotFound,
    #[error("Console input closed while waiting for a choice.")]
    InputClosed,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Could not start {}: {source}", .path.display())]
    Spawn { path: PathBuf, source: io::Error },
    #[error("Flashing failed. Exit code: {0}")]
    FlashFailed(i32),
    #[error("Flashing failed. avrdude was terminated before it could exit.")]
    Terminated,
}

impl Error {
    /// The process exit code to report for this error.
    ///
    /// A failed flash passes the tool's own exit code through, everything else is `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::FlashFailed(code) => *code,
            _ => 1,
        }
    }
}
