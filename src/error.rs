//! Error types for keyboard input and menu navigation.

use std::io;
use thiserror::Error;

/// Failures reading from the terminal.
#[derive(Debug, Error)]
pub enum InputError {
    /// The terminal could not be switched into raw mode.
    #[error("cannot enter raw terminal mode: {0}")]
    RawMode(#[source] io::Error),
    /// The user aborted the read (SIGINT during a line read).
    #[error("input interrupted")]
    Interrupted,
    /// Standard input was closed.
    #[error("end of input")]
    Eof,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failures that end a single menu invocation.
#[derive(Debug, Error)]
pub enum MenuError {
    #[error("menu has no options")]
    EmptyMenu,
    #[error("shortcut '{0}' is reserved or already bound")]
    ZoneCollision(char),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("cannot draw menu: {0}")]
    Io(#[from] io::Error),
}
