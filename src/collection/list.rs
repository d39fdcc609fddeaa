//! An ordered list of unique string values, where position is the only
//! identity an element has.

use super::{Collection, EditError, Side};

/// An ordered sequence of strings with no repeated values.
///
/// **Invariant**: no two elements compare equal as strings.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ItemList {
    items: Vec<String>,
}

impl ItemList {
    /// Creates an empty `ItemList`
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `value` is already an element of the list
    pub fn contains(&self, value: &str) -> bool {
        self.items.iter().any(|item| item == value)
    }

    /// The element at `index`, if the index is in bounds
    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    /// Appends `value` at the end of the list
    pub fn add(&mut self, value: &str) -> Result<(), EditError> {
        if self.contains(value) {
            return Err(EditError::DuplicateValue(value.to_owned()));
        }
        self.items.push(value.to_owned());
        Ok(())
    }

    /// Inserts `value` next to the element at `anchor`.  [`Side::Above`]
    /// takes the anchor's own index (pushing the anchor down), [`Side::Below`]
    /// the one after it.  An empty list ignores `anchor` and `side` and
    /// inserts at index 0.
    pub fn insert_relative(
        &mut self,
        value: &str,
        anchor: usize,
        side: Side,
    ) -> Result<(), EditError> {
        if self.contains(value) {
            return Err(EditError::DuplicateValue(value.to_owned()));
        }
        let index = if self.items.is_empty() {
            0
        } else {
            if anchor >= self.items.len() {
                return Err(EditError::NotFound);
            }
            match side {
                Side::Above => anchor,
                Side::Below => anchor + 1,
            }
        };
        self.items.insert(index, value.to_owned());
        Ok(())
    }

    /// Inserts `value` at an absolute `index`.  Used by the move flow to
    /// re-insert an element that was taken out with [`ItemList::delete_at`].
    pub fn insert_at(&mut self, index: usize, value: String) -> Result<(), EditError> {
        if index > self.items.len() {
            return Err(EditError::NotFound);
        }
        self.items.insert(index, value);
        Ok(())
    }

    /// Removes and returns the element at `index`
    pub fn delete_at(&mut self, index: usize) -> Result<String, EditError> {
        if index >= self.items.len() {
            return Err(EditError::NotFound);
        }
        Ok(self.items.remove(index))
    }

    /// Replaces the element at `index` with `new_value` (trimmed).  Rejects
    /// empty replacements, and replacements equal to an element at a
    /// *different* index.
    pub fn update(&mut self, index: usize, new_value: &str) -> Result<(), EditError> {
        if index >= self.items.len() {
            return Err(EditError::NotFound);
        }
        let new_value = new_value.trim();
        if new_value.is_empty() {
            return Err(EditError::EmptyValue);
        }
        let clashes = self
            .items
            .iter()
            .enumerate()
            .any(|(i, item)| i != index && item == new_value);
        if clashes {
            return Err(EditError::DuplicateValue(new_value.to_owned()));
        }
        self.items[index] = new_value.to_owned();
        Ok(())
    }

    /// Empties the list.  Confirmation is the caller's concern.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// A lazy, restartable view of the list as (1-based position, value)
    /// pairs in display order.  Never mutates.
    pub fn view(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (i + 1, item.as_str()))
    }
}

/// Destination index for re-inserting an element moved out of a list.
///
/// `from` is the element's index before removal; `anchor` is the index of the
/// target element *on the shortened list* (i.e. after the removal), exactly
/// as the operator saw it when choosing.  [`Side::Below`] lands one past the
/// anchor, and the destination shifts back by one when the removal happened
/// before it.
pub fn move_destination(from: usize, anchor: usize, side: Side) -> usize {
    let mut to = match side {
        Side::Above => anchor,
        Side::Below => anchor + 1,
    };
    if from < to {
        to -= 1;
    }
    to
}

impl Collection for ItemList {
    fn to_lines(&self) -> Vec<String> {
        self.items.clone()
    }

    /// Every line is a value; leading/trailing whitespace is trimmed.
    /// Repeated lines would break the uniqueness invariant, so only the
    /// first occurrence is kept.
    fn from_lines(lines: Vec<String>) -> Self {
        let mut list = ItemList::new();
        for line in lines {
            let value = line.trim();
            if let Err(EditError::DuplicateValue(value)) = list.add(value) {
                log::warn!("Skipping repeated value {:?} while loading a list", value);
            }
        }
        list
    }

    fn display_rows(&self) -> Vec<String> {
        self.view()
            .map(|(position, value)| format!("{}. {}", position, value))
            .collect()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}
