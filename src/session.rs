//! The mutable state of one editing run: the live collection, its history,
//! the dirty flag and the backing file name.  Also home to the
//! preview-then-confirm mutation protocol.

use std::path::{Path, PathBuf};

use crate::collection::{Collection, EditError};
use crate::history::{History, HistoryError};

/// The session owns everything that changes while the editor runs.  It is
/// passed explicitly to whichever command loop is driving it; there is no
/// process-wide state.
#[derive(Debug)]
pub struct Session<C: Collection> {
    collection: C,
    history: History<C>,
    /// `true` whenever unsaved changes exist
    dirty: bool,
    /// The file the collection is saved to, once one has been chosen
    file_name: Option<PathBuf>,
}

impl<C: Collection> Session<C> {
    /// Creates a session around `collection`, remembering at most
    /// `undo_depth` undo steps
    pub fn new(collection: C, undo_depth: usize) -> Self {
        Session {
            collection,
            history: History::new(undo_depth),
            dirty: false,
            file_name: None,
        }
    }

    /// The live collection.  Reads only - mutations go through the protocol
    /// methods below, or through [`Session::collection_mut`] for the move
    /// flow, which deliberately shortens the live list mid-command.
    pub fn collection(&self) -> &C {
        &self.collection
    }

    /// Direct mutable access to the live collection.  Only the move flow
    /// should need this; remember to call [`Session::mark_dirty`] after a
    /// committed direct mutation.
    pub fn collection_mut(&mut self) -> &mut C {
        &mut self.collection
    }

    /* ===== MUTATION PROTOCOL ===== */

    /// Records the pre-mutation snapshot for an attempted mutation.  Called
    /// once the target operation is selected, *before* any preview is built
    /// or confirmation asked.  A later cancel leaves this snapshot on the
    /// undo stack: undoing after a cancel is a visible no-op, which is the
    /// recorded contract.
    pub fn record_before_change(&mut self) {
        self.history.record_before_change(&self.collection);
    }

    /// Builds the prospective result of `op`: clones the live collection and
    /// applies `op` to the clone.  The live collection is untouched whatever
    /// `op` does.
    pub fn preview<F>(&self, op: F) -> Result<C, EditError>
    where
        F: FnOnce(&mut C) -> Result<(), EditError>,
    {
        let mut prospective = self.collection.clone();
        op(&mut prospective)?;
        Ok(prospective)
    }

    /// Commits a previewed result: the clone becomes the live collection and
    /// the session now has unsaved changes
    pub fn commit(&mut self, next: C) {
        self.collection = next;
        self.dirty = true;
    }

    /* ===== HISTORY ===== */

    /// Replaces the live collection with the most recent undo snapshot
    pub fn undo(&mut self) -> Result<(), HistoryError> {
        self.history.undo(&mut self.collection)?;
        self.dirty = true;
        Ok(())
    }

    /// Replaces the live collection with the most recently undone snapshot
    pub fn redo(&mut self) -> Result<(), HistoryError> {
        self.history.redo(&mut self.collection)?;
        self.dirty = true;
        Ok(())
    }

    /// (undo, redo) stack depths, for the status line
    pub fn history_depths(&self) -> (usize, usize) {
        (self.history.undo_depth(), self.history.redo_depth())
    }

    /* ===== BOOK-KEEPING ===== */

    /// Swaps in a freshly loaded collection.  `dirty` distinguishes opening
    /// a file (clean) from restoring an old version (unsaved change).
    pub fn replace_collection(&mut self, collection: C, dirty: bool) {
        self.collection = collection;
        self.dirty = dirty;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Marks the session as having unsaved changes (for flows that mutate
    /// the live collection directly)
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Called after a successful save
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn file_name(&self) -> Option<&Path> {
        self.file_name.as_deref()
    }

    pub fn set_file_name(&mut self, file_name: Option<PathBuf>) {
        self.file_name = file_name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{EditError, ItemList};
    use crate::history::HistoryError;

    fn session_of(values: &[&str]) -> Session<ItemList> {
        let mut list = ItemList::new();
        for value in values {
            list.add(value).unwrap();
        }
        Session::new(list, 10)
    }

    #[test]
    fn preview_leaves_live_collection_untouched() {
        let session = session_of(&["a", "b"]);
        let preview = session.preview(|list| list.add("c")).unwrap();
        assert_eq!(preview.to_lines(), vec!["a", "b", "c"]);
        assert_eq!(session.collection().to_lines(), vec!["a", "b"]);
    }

    #[test]
    fn commit_applies_preview_and_dirties() {
        let mut session = session_of(&["a"]);
        assert!(!session.is_dirty());
        session.record_before_change();
        let preview = session.preview(|list| list.add("b")).unwrap();
        session.commit(preview);
        assert!(session.is_dirty());
        assert_eq!(session.collection().to_lines(), vec!["a", "b"]);
    }

    #[test]
    fn cancel_keeps_live_state_but_snapshot_remains() {
        let mut session = session_of(&["a"]);
        let before = session.collection().to_lines();

        session.record_before_change();
        let preview = session.preview(|list| list.add("b")).unwrap();
        drop(preview); // operator declined

        // Live state is byte-identical, yet the attempt grew the history
        assert_eq!(session.collection().to_lines(), before);
        assert_eq!(session.history_depths(), (1, 0));

        // Undoing now is a no-op from the operator's point of view
        session.undo().unwrap();
        assert_eq!(session.collection().to_lines(), before);
    }

    #[test]
    fn failed_preview_reports_error() {
        let session = session_of(&["a"]);
        assert_eq!(
            session.preview(|list| list.add("a")).unwrap_err(),
            EditError::DuplicateValue("a".to_owned())
        );
    }

    #[test]
    fn undo_redo_through_session() {
        let mut session = session_of(&["a", "b", "c"]);
        assert_eq!(session.undo(), Err(HistoryError::NothingToUndo));

        session.record_before_change();
        let preview = session.preview(|list| list.delete_at(1).map(drop)).unwrap();
        session.commit(preview);
        assert_eq!(session.collection().to_lines(), vec!["a", "c"]);

        session.undo().unwrap();
        assert_eq!(session.collection().to_lines(), vec!["a", "b", "c"]);
        session.redo().unwrap();
        assert_eq!(session.collection().to_lines(), vec!["a", "c"]);
    }

    #[test]
    fn replace_collection_sets_requested_dirtiness() {
        let mut session = session_of(&["a"]);
        let mut loaded = ItemList::new();
        loaded.add("x").unwrap();
        session.replace_collection(loaded.clone(), false);
        assert!(!session.is_dirty());
        session.replace_collection(loaded, true);
        assert!(session.is_dirty());
    }
}
