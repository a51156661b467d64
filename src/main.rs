//! ERP - menu-driven business records terminal
//!
//! Menus are driven from the keyboard: arrow keys move a highlight,
//! Enter selects, letters jump straight to an entry, and Escape drops
//! into typing the option number.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use xdg::BaseDirectories;

mod arbiter;
mod commands;
mod error;
mod input;
mod logging;
mod menu;
mod render;
mod selection;
mod zones;


use crate::arbiter::InputArbiter;
use crate::commands::App;
use crate::input::{Encoding, StdinConsole};
use crate::menu::MenuController;
use crate::render::MenuRenderer;

/// Command-line interface for the ERP terminal
#[derive(Parser)]
#[command(name = "erp")]
#[command(about = "Menu-driven business records terminal", long_about = None)]
#[command(version)]
struct Cli {
    /// Type option numbers instead of navigating with arrow keys
    #[arg(long)]
    line_input: bool,
    /// Turn off letter shortcuts for menu entries
    #[arg(long)]
    no_zones: bool,
    /// How the terminal encodes arrow keys (defaults to the platform's)
    #[arg(long, value_enum)]
    encoding: Option<Encoding>,
    /// Write the log here instead of the XDG state directory
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// More detail in the log (-vv for every key)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Entry point: reads the configuration, checks the terminal once, then
/// hands control to the main menu until the user exits.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_path = match cli.log_file {
        Some(path) => path,
        None => BaseDirectories::with_prefix("erp-cli")
            .place_state_file("erp.log")
            .context("cannot create state directory")?,
    };
    logging::init(&log_path, cli.verbose)?;

    let interrupted = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&interrupted))
        .context("cannot install interrupt handler")?;

    let interactive = input::is_interactive();
    if !interactive && !cli.line_input {
        warn!("stdin or stdout is not a terminal");
        eprintln!("warning: not attached to a terminal; type option numbers and press Enter");
    }
    let raw_enabled = interactive && !cli.line_input;
    let encoding = cli.encoding.unwrap_or_else(Encoding::native);
    info!(raw_enabled, zones = !cli.no_zones, ?encoding, log = %log_path.display(), "starting");

    let console = StdinConsole::new(encoding, Arc::clone(&interrupted))
        .context("cannot start input reader")?;
    let controller = MenuController::new(InputArbiter::new(console, raw_enabled), !cli.no_zones);
    let mut app = App::new(controller, MenuRenderer::new(io::stdout()));
    app.run().context("menu loop failed")?;

    info!("exited normally");
    Ok(())
}
