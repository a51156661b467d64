//! Actions behind the menus.
//!
//! Maps the choice a menu returns to what happens next: opening a
//! submenu, running an action, or leaving. Record screens themselves are
//! not built yet, so every leaf action shows a placeholder notice.

use std::io::Write;

use tracing::{error, warn};

use crate::error::MenuError;
use crate::input::InputSource;
use crate::menu::{Choice, Menu, MenuController};
use crate::render::{MenuRenderer, Tone};

pub const MAIN_MENU_TITLE: &str = "ERP BUSINESS SYSTEM";

pub const MAIN_MENU_OPTIONS: [&str; 13] = [
    "Employees",
    "Equipment",
    "Service Orders",
    "Completed Orders",
    "Open Orders",
    "Approved Budgets",
    "Deleted Budgets",
    "Open Budgets",
    "Queries",
    "Material Register",
    "Pending Records",
    "Stock Movement",
    "Administration",
];

/// A second-level menu reached from the main menu.
#[derive(Debug, Clone, Copy)]
pub struct Submenu {
    pub title: &'static str,
    pub options: &'static [&'static str],
}

pub const EMPLOYEES: Submenu = Submenu {
    title: "EMPLOYEE MANAGEMENT",
    options: &["Register Employee", "Look Up Employee", "Update Details", "Reports"],
};

pub const EQUIPMENT: Submenu = Submenu {
    title: "EQUIPMENT MANAGEMENT",
    options: &[
        "Register Equipment",
        "Look Up Equipment",
        "Preventive Maintenance",
        "Corrective Maintenance",
    ],
};

pub const SERVICE_ORDERS: Submenu = Submenu {
    title: "SERVICE ORDERS",
    options: &["New Service Order", "Look Up Order", "Update Status", "Order Report"],
};

pub const ADMINISTRATION: Submenu = Submenu {
    title: "ADMINISTRATION",
    options: &[
        "Change My Password",
        "Manage Users",
        "System Information",
        "Data Backup",
        "Settings",
    ],
};

pub fn main_menu() -> Menu {
    Menu::new(MAIN_MENU_TITLE, &MAIN_MENU_OPTIONS, "Exit")
}

/// The application: one controller and one screen, shared by every menu.
pub struct App<S, W> {
    controller: MenuController<S>,
    renderer: MenuRenderer<W>,
}

impl<S: InputSource, W: Write> App<S, W> {
    pub fn new(controller: MenuController<S>, renderer: MenuRenderer<W>) -> Self {
        App {
            controller,
            renderer,
        }
    }

    /// Shows the main menu until the user leaves.
    pub fn run(&mut self) -> Result<(), MenuError> {
        let menu = main_menu();
        loop {
            let choice = self.controller.run(&menu, &mut self.renderer)?;
            if !self.run_main_choice(&choice)? {
                return Ok(());
            }
        }
    }

    /// Returns false once the user chose to leave.
    fn run_main_choice(&mut self, choice: &Choice) -> Result<bool, MenuError> {
        if choice.is_exit() {
            self.renderer.message("Shutting down...", Tone::Warning)?;
            return Ok(false);
        }

        match choice.as_str().trim().parse::<usize>() {
            Ok(1) => self.submenu(&EMPLOYEES)?,
            Ok(2) => self.submenu(&EQUIPMENT)?,
            Ok(3) => self.submenu(&SERVICE_ORDERS)?,
            Ok(13) => self.submenu(&ADMINISTRATION)?,
            Ok(n @ 4..=12) => self.placeholder(MAIN_MENU_OPTIONS[n - 1])?,
            _ => {
                warn!(choice = %choice, "invalid main menu choice");
                self.renderer.message("Invalid option! Try again.", Tone::Error)?;
                self.pause()?;
            }
        }
        Ok(true)
    }

    fn submenu(&mut self, submenu: &Submenu) -> Result<(), MenuError> {
        let menu = Menu::new(submenu.title, submenu.options, "Back to main menu");
        let choice = match self.controller.run(&menu, &mut self.renderer) {
            Ok(choice) => choice,
            Err(err @ (MenuError::EmptyMenu | MenuError::ZoneCollision(_))) => {
                error!(title = submenu.title, error = %err, "menu misconfigured");
                self.renderer.message(&format!("Menu unavailable: {err}"), Tone::Error)?;
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        if choice.is_exit() {
            return Ok(());
        }
        match choice.as_str().trim().parse::<usize>() {
            Ok(n) if (1..=submenu.options.len()).contains(&n) => {
                self.placeholder(submenu.options[n - 1])
            }
            _ => {
                warn!(title = submenu.title, choice = %choice, "invalid submenu choice");
                self.renderer.message("Invalid option!", Tone::Error)?;
                self.pause()
            }
        }
    }

    fn placeholder(&mut self, label: &str) -> Result<(), MenuError> {
        self.renderer
            .message(&format!("{label}: under development..."), Tone::Success)?;
        self.pause()
    }

    fn pause(&mut self) -> Result<(), MenuError> {
        self.renderer.prompt("Press Enter to continue...")?;
        self.controller.read_line()?;
        Ok(())
    }
}
