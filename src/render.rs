//! Terminal drawing for menus and messages.

use std::io::{self, Write};

use termion::{clear, color, cursor, style};

use crate::arbiter::Mode;
use crate::menu::{MenuView, Render};
use crate::zones::EXIT_ZONE;

const MIN_WIDTH: usize = 60;

/// Colour of a one-line message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Error,
}

/// Draws full-screen menus on any writer.
pub struct MenuRenderer<W> {
    out: W,
}

impl<W: Write> MenuRenderer<W> {
    pub fn new(out: W) -> Self {
        MenuRenderer { out }
    }

    /// Prints one coloured line.
    pub fn message(&mut self, text: &str, tone: Tone) -> io::Result<()> {
        let colour = match tone {
            Tone::Success => color::Fg(color::Green).to_string(),
            Tone::Warning => color::Fg(color::Yellow).to_string(),
            Tone::Error => color::Fg(color::Red).to_string(),
        };
        writeln!(self.out, "{}{}{}", colour, text, color::Fg(color::Reset))?;
        self.out.flush()
    }

    /// Prints text without a newline and flushes, so input follows it.
    pub fn prompt(&mut self, text: &str) -> io::Result<()> {
        write!(self.out, "{}{}{}", color::Fg(color::Yellow), text, color::Fg(color::Reset))?;
        self.out.flush()
    }

    fn draw_title(&mut self, title: &str) -> io::Result<()> {
        let width = MIN_WIDTH.max(title.chars().count() + 10);
        let border = "═".repeat(width);
        writeln!(self.out, "{}╔{}╗", color::Fg(color::Cyan), border)?;
        writeln!(
            self.out,
            "║{}{:^width$}{}║",
            color::Fg(color::White),
            title,
            color::Fg(color::Cyan),
            width = width
        )?;
        writeln!(self.out, "╚{}╝{}", border, color::Fg(color::Reset))?;
        writeln!(self.out)
    }

    fn draw_entry(
        &mut self,
        number: usize,
        label: &str,
        shortcut: Option<char>,
        highlighted: bool,
    ) -> io::Result<()> {
        let shortcut = shortcut
            .map(|c| format!(" ({})", c.to_ascii_uppercase()))
            .unwrap_or_default();
        if highlighted {
            writeln!(
                self.out,
                "{}{:>2}. {}{}{}",
                style::Invert,
                number,
                label,
                shortcut,
                style::Reset
            )
        } else {
            writeln!(
                self.out,
                "{}{:>2}. {}{}{}{}",
                color::Fg(color::White),
                number,
                label,
                color::Fg(color::Cyan),
                shortcut,
                color::Fg(color::Reset)
            )
        }
    }

    fn draw_footer(&mut self) -> io::Result<()> {
        let now = chrono::Local::now();
        writeln!(
            self.out,
            "\n{}{}   ERP {}   {}{}",
            color::Fg(color::Blue),
            now.format("%d/%m/%Y"),
            env!("CARGO_PKG_VERSION"),
            now.format("%H:%M:%S"),
            color::Fg(color::Reset)
        )
    }
}

impl<W: Write> Render for MenuRenderer<W> {
    fn render(&mut self, view: &MenuView<'_>) -> io::Result<()> {
        write!(self.out, "{}{}", clear::All, cursor::Goto(1, 1))?;
        self.draw_title(view.title)?;

        let exit_index = view.items.len().saturating_sub(1);
        for (index, label) in view.items.iter().enumerate().take(exit_index) {
            let shortcut = view.zones.and_then(|zones| zones.shortcut_for(index));
            self.draw_entry(index + 1, label, shortcut, view.selected == Some(index))?;
        }
        if let Some(exit_label) = view.items.last() {
            writeln!(self.out)?;
            let shortcut = view.zones.map(|_| EXIT_ZONE);
            self.draw_entry(0, exit_label, shortcut, view.selected == Some(exit_index))?;
        }

        self.draw_footer()?;

        match view.mode {
            Mode::Navigating => {
                let hint = if view.zones.is_some() {
                    "Use ↑↓ to move, ENTER to select, a letter to jump, X to leave, ESC to type"
                } else {
                    "Use ↑↓ to move, ENTER to select, ESC to type a number"
                };
                writeln!(
                    self.out,
                    "\n{}{}{}",
                    color::Fg(color::Cyan),
                    hint,
                    color::Fg(color::Reset)
                )?;
            }
            Mode::DirectInput => {
                write!(
                    self.out,
                    "\n{}Type the option number: {}",
                    color::Fg(color::Yellow),
                    color::Fg(color::Reset)
                )?;
            }
        }
        self.out.flush()
    }
}
