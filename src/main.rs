//! # Roster
//!
//! An interactive, file-backed editor for one ordered collection at a time:
//! either an ordered list of unique values, or a table of records indexed by
//! stable integer keys.  Every mutation is previewed and confirmed, every
//! session carries bounded undo/redo, and every save versions the previous
//! file contents first.

#![deny(rustdoc::broken_intra_doc_links)]

pub mod collection;
pub mod config;
pub mod editor;
pub mod history;
pub mod input;
pub mod persist;
pub mod session;

use std::io::{self, Write};
use std::path::Path;

use crate::config::Config;
use crate::editor::{ListEditor, TableEditor};
use crate::input::Prompter;

const CONFIG_FILE: &str = "roster.toml";
const USAGE: &str = "usage: roster [list|table]";

/// The collection flavour chosen on the command line
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Flavour {
    List,
    Table,
}

fn parse_flavour(args: &mut std::env::Args) -> Result<Flavour, String> {
    match args.nth(1).as_deref() {
        None | Some("list") => Ok(Flavour::List),
        Some("table") => Ok(Flavour::Table),
        Some(other) => Err(format!("unknown mode '{}'\n{}", other, USAGE)),
    }
}

/// The entry point of roster: initialise logging and config, then hand
/// control to the chosen editor's `run`.
fn main() {
    pretty_env_logger::formatted_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_owned()))
        .init();
    log::info!("Starting up...");

    let flavour = match parse_flavour(&mut std::env::args()) {
        Ok(flavour) => flavour,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(2);
        }
    };

    let config = Config::load_or_default(Path::new(CONFIG_FILE));
    log::debug!("Running as {:?} with {:?}", flavour, config);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let prompter = Prompter::new(stdin.lock(), stdout.lock());

    let outcome = match flavour {
        Flavour::List => ListEditor::new(config, prompter).run(),
        Flavour::Table => TableEditor::new(config, prompter).run(),
    };

    // Operator-facing errors are all handled inside the loops; the only way
    // out with an error is the input or output stream itself failing
    if let Err(error) = outcome {
        log::error!("Editor stopped: {}", error);
        let _ = writeln!(io::stderr(), "roster: {}", error);
        std::process::exit(1);
    }
}
