//! The menu-driven command loops that drive a [`Session`], one per
//! collection flavour.  Each loop blocks on operator input between state
//! transitions; every error is reported and the loop returns to its idle
//! prompt.

pub mod list_mode;
pub mod table_mode;

pub use list_mode::ListEditor;
pub use table_mode::TableEditor;

use std::io::{self, BufRead, Write};

use crate::collection::Collection;
use crate::input::Prompter;
use crate::session::Session;

/// How a previewed mutation left the protocol
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Outcome {
    /// The operator confirmed; the preview became the live collection
    Committed,
    /// The operator declined; the preview was discarded (the snapshot
    /// recorded for the attempt stays on the undo stack)
    Cancelled,
}

/// The `Previewing -> {Committed | Cancelled}` transition: shows the
/// prospective result, asks the one yes/no question, and either commits the
/// preview to the session or drops it.
pub(crate) fn confirm_preview<C, R, W>(
    session: &mut Session<C>,
    prompter: &mut Prompter<R, W>,
    header: &str,
    preview: C,
    question: &str,
    committed: &str,
    cancelled: &str,
) -> io::Result<Outcome>
where
    C: Collection,
    R: BufRead,
    W: Write,
{
    prompter.say(header)?;
    for row in preview.display_rows() {
        prompter.say(&row)?;
    }
    if prompter.yes_no(question)? {
        session.commit(preview);
        prompter.say(committed)?;
        Ok(Outcome::Committed)
    } else {
        prompter.say(cancelled)?;
        Ok(Outcome::Cancelled)
    }
}
