//! Menu loop: draw, wait for an event, update the highlight, repeat.
//!
//! The same controller drives the main menu and every submenu. A menu
//! is just a title and an ordered list of option labels; the caller maps
//! the returned [`Choice`] to an action.

use std::fmt;
use std::io;

use tracing::{debug, info};

use crate::arbiter::{Direction, InputArbiter, Mode, NavigationEvent};
use crate::error::{InputError, MenuError};
use crate::input::InputSource;
use crate::selection::SelectionModel;
use crate::zones::{ClickZoneRegistry, ZoneTarget, EXIT_ZONE};

/// A titled list of options. An exit/back entry is appended when shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    title: String,
    options: Vec<String>,
    exit_label: String,
}

impl Menu {
    pub fn new(title: impl Into<String>, options: &[&str], exit_label: impl Into<String>) -> Self {
        Menu {
            title: title.into(),
            options: options.iter().map(|option| option.to_string()).collect(),
            exit_label: exit_label.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

/// What a menu returned: an option number, `"0"` for exit/back, or
/// whatever was typed in direct input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice(String);

impl Choice {
    pub fn from_id(id: usize) -> Self {
        Choice(id.to_string())
    }

    pub fn exit() -> Self {
        Choice::from_id(0)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Choice(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_exit(&self) -> bool {
        self.0.trim() == "0"
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue,
    Return(Choice),
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct MenuView<'a> {
    pub title: &'a str,
    /// Options followed by the exit entry.
    pub items: &'a [String],
    /// `None` while typing, so nothing is highlighted.
    pub selected: Option<usize>,
    pub zones: Option<&'a ClickZoneRegistry>,
    pub mode: Mode,
}

/// Draws menus. Called before every poll, so it must not accumulate state.
pub trait Render {
    fn render(&mut self, view: &MenuView<'_>) -> io::Result<()>;
}

/// State of one menu invocation.
#[derive(Debug)]
pub struct MenuSession {
    title: String,
    selection: SelectionModel,
    zones: Option<ClickZoneRegistry>,
    mode: Mode,
}

impl MenuSession {
    pub fn new(menu: &Menu, with_zones: bool, mode: Mode) -> Result<Self, MenuError> {
        if menu.options.is_empty() {
            return Err(MenuError::EmptyMenu);
        }

        let zones = if with_zones {
            let mut registry = ClickZoneRegistry::new();
            registry.assign(&menu.options, &menu.exit_label)?;
            Some(registry)
        } else {
            None
        };

        let mut items = menu.options.clone();
        items.push(menu.exit_label.clone());

        Ok(MenuSession {
            title: menu.title.clone(),
            selection: SelectionModel::new(items)?,
            zones,
            mode,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn zones(&self) -> Option<&ClickZoneRegistry> {
        self.zones.as_ref()
    }

    pub fn view(&self) -> MenuView<'_> {
        MenuView {
            title: &self.title,
            items: self.selection.items(),
            selected: match self.mode {
                Mode::Navigating => Some(self.selection.selected_index()),
                Mode::DirectInput => None,
            },
            zones: self.zones.as_ref(),
            mode: self.mode,
        }
    }

    pub fn apply(&mut self, event: NavigationEvent) -> Step {
        match event {
            NavigationEvent::Move(Direction::Up) => {
                self.selection.move_up();
                Step::Continue
            }
            NavigationEvent::Move(Direction::Down) => {
                self.selection.move_down();
                Step::Continue
            }
            NavigationEvent::Confirm => Step::Return(self.current_choice()),
            NavigationEvent::Cancel => {
                self.mode = Mode::DirectInput;
                Step::Continue
            }
            // Only one digit is read, so options from 10 up need arrows or letters.
            NavigationEvent::DirectNumeric(digits) => Step::Return(Choice::text(digits)),
            NavigationEvent::ZoneHit(id) => self.apply_zone_hit(id),
            NavigationEvent::Line(line) => Step::Return(Choice::text(line)),
            NavigationEvent::Interrupt => Step::Return(Choice::exit()),
        }
    }

    fn apply_zone_hit(&mut self, id: char) -> Step {
        if id == EXIT_ZONE {
            return Step::Return(Choice::exit());
        }
        let target = self
            .zones
            .as_ref()
            .and_then(|zones| zones.lookup(id))
            .map(|zone| zone.target);
        match target {
            Some(ZoneTarget::Item(index)) if self.selection.select(index) => {
                Step::Return(self.current_choice())
            }
            Some(ZoneTarget::Exit) => Step::Return(Choice::exit()),
            _ => Step::Continue,
        }
    }

    fn current_choice(&self) -> Choice {
        Choice::from_id(self.selection.current_choice_id())
    }
}

/// Runs menus against one input source.
pub struct MenuController<S> {
    arbiter: InputArbiter<S>,
    zones_enabled: bool,
}

impl<S: InputSource> MenuController<S> {
    pub fn new(arbiter: InputArbiter<S>, zones_enabled: bool) -> Self {
        MenuController {
            arbiter,
            zones_enabled,
        }
    }

    /// Shows `menu` until the user picks something.
    pub fn run<R: Render>(&mut self, menu: &Menu, renderer: &mut R) -> Result<Choice, MenuError> {
        let mode = if self.arbiter.raw_enabled() {
            Mode::Navigating
        } else {
            Mode::DirectInput
        };
        let mut session = MenuSession::new(menu, self.zones_enabled, mode)?;
        debug!(title = menu.title(), ?mode, "menu opened");

        loop {
            renderer.render(&session.view())?;
            let event = self.arbiter.poll(session.mode(), session.zones())?;
            if let Step::Return(choice) = session.apply(event) {
                info!(
                    title = menu.title(),
                    choice = %choice,
                    highlighted = session.selection().current_label(),
                    "menu choice"
                );
                return Ok(choice);
            }
        }
    }

    /// Waits for a line, e.g. after a message. `None` at end of input or on abort.
    pub fn read_line(&mut self) -> Result<Option<String>, MenuError> {
        match self.arbiter.read_line() {
            Ok(line) => Ok(line),
            Err(InputError::Interrupted) | Err(InputError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
