//! Bounded undo/redo stacks of full-collection snapshots.

use std::collections::VecDeque;

/// Error produced when an undo or redo is requested with nothing to apply
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HistoryError {
    NothingToUndo,
    NothingToRedo,
}

impl std::fmt::Display for HistoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryError::NothingToUndo => write!(f, "Nothing to undo."),
            HistoryError::NothingToRedo => write!(f, "Nothing to redo."),
        }
    }
}

impl std::error::Error for HistoryError {}

/// A pair of snapshot stacks giving bounded, multi-step undo/redo.
///
/// Snapshots are deep clones of the collection: nothing in a stack shares
/// storage with the live collection.  They are stored oldest at the 'front',
/// newest at the 'back'.
///
/// **Invariant**: `undo.len() <= max_depth` at all times.  When a push would
/// exceed the bound, the *oldest* snapshot is evicted - the bound limits how
/// far back the history reaches, never how recent it is.
#[derive(Debug, Clone)]
pub struct History<C> {
    undo: VecDeque<C>,
    redo: Vec<C>,
    /// The maximum number of undo steps remembered.  Once exceeded, the
    /// oldest snapshots are dropped.
    max_depth: usize,
}

impl<C: Clone> History<C> {
    /// Creates an empty `History` remembering at most `max_depth` undo steps
    pub fn new(max_depth: usize) -> Self {
        History {
            undo: VecDeque::new(),
            redo: Vec::new(),
            max_depth,
        }
    }

    /// Pushes a snapshot of the **pre-mutation** state onto the undo stack
    /// and clears the redo stack: a fresh mutation invalidates any
    /// previously-undone futures.
    ///
    /// Called once per attempted mutation, *before* the change is applied -
    /// even attempts the operator later cancels leave their snapshot behind.
    pub fn record_before_change(&mut self, current: &C) {
        self.push_undo(current.clone());
        self.redo.clear();
        log::debug!("Recorded snapshot ({} undo steps held)", self.undo.len());
    }

    /// Swaps the live state for the most recent undo snapshot, remembering
    /// the live state on the redo stack
    pub fn undo(&mut self, live: &mut C) -> Result<(), HistoryError> {
        let snapshot = self.undo.pop_back().ok_or(HistoryError::NothingToUndo)?;
        self.redo.push(std::mem::replace(live, snapshot));
        Ok(())
    }

    /// Symmetric to [`History::undo`]: swaps the live state for the most
    /// recently undone snapshot
    pub fn redo(&mut self, live: &mut C) -> Result<(), HistoryError> {
        let snapshot = self.redo.pop().ok_or(HistoryError::NothingToRedo)?;
        self.push_undo(std::mem::replace(live, snapshot));
        Ok(())
    }

    /// Number of undo steps currently held
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Number of redo steps currently held
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    // The one place snapshots enter the undo stack, so the bound is enforced
    // on the redo path as well as on fresh mutations
    fn push_undo(&mut self, snapshot: C) {
        while self.undo.len() >= self.max_depth {
            if self.undo.pop_front().is_none() {
                // max_depth of 0 remembers nothing
                return;
            }
        }
        self.undo.push_back(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::ItemList;
    use proptest::prelude::*;

    fn list_of(values: &[&str]) -> ItemList {
        let mut list = ItemList::new();
        for value in values {
            list.add(value).unwrap();
        }
        list
    }

    #[test]
    fn undo_on_empty_stack_fails() {
        let mut history = History::new(10);
        let mut live = list_of(&["a", "b", "c"]);
        assert_eq!(history.undo(&mut live), Err(HistoryError::NothingToUndo));
        assert_eq!(live, list_of(&["a", "b", "c"]));
    }

    #[test]
    fn undo_restores_pre_mutation_state() {
        let mut history = History::new(10);
        let mut live = list_of(&["a", "b", "c"]);
        history.record_before_change(&live);
        live.delete_at(1).unwrap();
        history.undo(&mut live).unwrap();
        assert_eq!(live, list_of(&["a", "b", "c"]));
    }

    #[test]
    fn undo_then_redo_round_trips() {
        let mut history = History::new(10);
        let mut live = list_of(&["a"]);
        history.record_before_change(&live);
        live.add("b").unwrap();
        let mutated = live.clone();

        history.undo(&mut live).unwrap();
        assert_eq!(live, list_of(&["a"]));
        history.redo(&mut live).unwrap();
        assert_eq!(live, mutated);
    }

    #[test]
    fn fresh_mutation_clears_redo() {
        let mut history = History::new(10);
        let mut live = list_of(&["a"]);
        history.record_before_change(&live);
        live.add("b").unwrap();
        history.undo(&mut live).unwrap();
        assert_eq!(history.redo_depth(), 1);

        history.record_before_change(&live);
        live.add("c").unwrap();
        assert_eq!(history.redo_depth(), 0);
        assert_eq!(history.redo(&mut live), Err(HistoryError::NothingToRedo));
    }

    #[test]
    fn bound_evicts_oldest_first() {
        let mut history = History::new(3);
        let mut live = ItemList::new();
        for i in 0..5 {
            history.record_before_change(&live);
            live.add(&format!("item{}", i)).unwrap();
        }
        assert_eq!(history.undo_depth(), 3);
        // Unwind everything: the deepest reachable state is after "item1"
        // (the snapshots before "item0" and "item1" were evicted)
        while history.undo(&mut live).is_ok() {}
        assert_eq!(live, list_of(&["item0", "item1"]));
    }

    #[test]
    fn snapshots_do_not_share_state_with_live() {
        let mut history = History::new(10);
        let mut live = list_of(&["a"]);
        history.record_before_change(&live);
        live.update(0, "changed").unwrap();
        live.add("b").unwrap();
        history.undo(&mut live).unwrap();
        assert_eq!(live, list_of(&["a"]));
    }

    proptest! {
        // For any starting state and successful mutation, undo-then-redo
        // restores the mutated state exactly (no intervening mutation)
        #[test]
        fn round_trip_law(
            initial in prop::collection::hash_set("[a-f]{1,3}", 0..8),
            extra in "[g-k]{1,3}",
        ) {
            let mut live = ItemList::new();
            for value in &initial {
                live.add(value).unwrap();
            }
            let mut history = History::new(10);

            history.record_before_change(&live);
            live.add(&extra).unwrap();
            let mutated = live.clone();

            history.undo(&mut live).unwrap();
            history.redo(&mut live).unwrap();
            prop_assert_eq!(live, mutated);
        }
    }
}
