//! The two collection flavours that roster can edit, and the operations that
//! transform them.

pub mod list;
pub mod table;

pub use list::ItemList;
pub use table::RecordTable;

/// Which side of an anchor element an insertion or move should land on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Side {
    /// Insert at the anchor's own index, pushing the anchor down
    Above,
    /// Insert just after the anchor
    Below,
}

/// Error produced when a collection mutation is rejected
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum EditError {
    /// The value is already present, at a different position to the one being
    /// written (ordered lists only; record tables permit repeated values)
    DuplicateValue(String),
    /// The replacement value was empty after trimming
    EmptyValue,
    /// The index or key does not refer to an element of the collection
    NotFound,
}

impl std::fmt::Display for EditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditError::DuplicateValue(value) => {
                write!(f, "Value \"{}\" is already in the collection.", value)
            }
            EditError::EmptyValue => write!(f, "Value cannot be empty."),
            EditError::NotFound => write!(f, "No such element."),
        }
    }
}

impl std::error::Error for EditError {}

/// Behaviour shared by both collection flavours.  This is the seam used by
/// the session (snapshotting, previews) and by persistence (the newline
/// delimited file formats).
///
/// `Clone` here is required to be a *deep* copy: a cloned collection is a
/// snapshot, and mutating the live collection must never affect it.
pub trait Collection: Clone + PartialEq {
    /// Serialise to the on-disk format, one entry per line
    fn to_lines(&self) -> Vec<String>;

    /// Rebuild a collection from on-disk lines.  Lines which don't parse are
    /// skipped with a warning (see each implementation for what "parse"
    /// means for that flavour).
    fn from_lines(lines: Vec<String>) -> Self;

    /// Formatted display rows, one per entry, in display order
    fn display_rows(&self) -> Vec<String>;

    /// Number of entries currently in the collection
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
