//! Turns raw input into navigation events.
//!
//! A menu reads in one of two ways. While navigating, single keystrokes
//! are read in raw mode and mapped to movement, confirmation, digit jumps
//! and letter shortcuts. In direct input the terminal's own line editing
//! collects a whole line, which is returned untouched.

use tracing::{trace, warn};

use crate::error::InputError;
use crate::input::{InputSource, Key};
use crate::zones::ClickZoneRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// How the active menu reads input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigating,
    DirectInput,
}

/// One step of user intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    Move(Direction),
    Confirm,
    /// Escape: switch to typing.
    Cancel,
    /// A digit typed while navigating.
    DirectNumeric(String),
    /// A letter bound to a zone, lowercased.
    ZoneHit(char),
    /// A complete line typed in direct input.
    Line(String),
    /// Ctrl-C, SIGINT or end of input.
    Interrupt,
}

/// Reads from an [`InputSource`] and produces exactly one event per poll.
pub struct InputArbiter<S> {
    source: S,
    raw_enabled: bool,
}

impl<S: InputSource> InputArbiter<S> {
    /// `raw_enabled` is false when the session must never enter raw mode.
    pub fn new(source: S, raw_enabled: bool) -> Self {
        InputArbiter {
            source,
            raw_enabled,
        }
    }

    /// Whether keystroke navigation is still available.
    pub fn raw_enabled(&self) -> bool {
        self.raw_enabled
    }

    pub fn poll(
        &mut self,
        mode: Mode,
        zones: Option<&ClickZoneRegistry>,
    ) -> Result<NavigationEvent, InputError> {
        let event = match mode {
            Mode::Navigating if self.raw_enabled => self.poll_key(zones)?,
            // Navigation is gone for good; let the menu switch to typing.
            Mode::Navigating => NavigationEvent::Cancel,
            Mode::DirectInput => self.poll_line()?,
        };
        trace!(?mode, ?event, "navigation event");
        Ok(event)
    }

    /// Reads a line outside of any menu, e.g. "press Enter to continue".
    pub fn read_line(&mut self) -> Result<Option<String>, InputError> {
        self.source.read_line()
    }

    fn poll_key(
        &mut self,
        zones: Option<&ClickZoneRegistry>,
    ) -> Result<NavigationEvent, InputError> {
        loop {
            let key = match self.source.read_key() {
                Ok(key) => key,
                Err(InputError::RawMode(err)) => {
                    warn!(error = %err, "raw mode unavailable, falling back to line input");
                    self.raw_enabled = false;
                    return Ok(NavigationEvent::Cancel);
                }
                Err(InputError::Eof) | Err(InputError::Interrupted) => {
                    return Ok(NavigationEvent::Interrupt)
                }
                Err(err) => return Err(err),
            };

            let event = match key {
                Key::Up => NavigationEvent::Move(Direction::Up),
                Key::Down => NavigationEvent::Move(Direction::Down),
                Key::Confirm => NavigationEvent::Confirm,
                Key::Cancel => NavigationEvent::Cancel,
                Key::Interrupt => NavigationEvent::Interrupt,
                Key::Char(c) if c.is_ascii_digit() => NavigationEvent::DirectNumeric(c.to_string()),
                Key::Char(c) => match zones.and_then(|zones| zones.lookup(c)) {
                    Some(zone) => {
                        trace!(id = %zone.id, label = %zone.label, "zone hit");
                        NavigationEvent::ZoneHit(zone.id)
                    }
                    None => continue,
                },
                Key::Left | Key::Right | Key::Unknown => continue,
            };
            return Ok(event);
        }
    }

    fn poll_line(&mut self) -> Result<NavigationEvent, InputError> {
        match self.source.read_line() {
            Ok(Some(line)) => Ok(NavigationEvent::Line(line)),
            Ok(None) | Err(InputError::Eof) | Err(InputError::Interrupted) => {
                Ok(NavigationEvent::Interrupt)
            }
            Err(err) => Err(err),
        }
    }
}
