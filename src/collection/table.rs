//! A table of string records indexed by stable positive-integer keys.

use super::{Collection, EditError};

/// A mapping from positive integer keys to string values.  Keys are assigned
/// at creation and never reassigned while still occupied; insertion order is
/// preserved for display but carries no meaning.
///
/// Backed by a `Vec` of pairs rather than a hash map so that display order
/// is the insertion order (the same trick the editor uses elsewhere for
/// small vec-backed maps).
///
/// **Invariant**: all keys are positive and pairwise distinct.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct RecordTable {
    records: Vec<(u32, String)>,
}

impl RecordTable {
    /// Creates an empty `RecordTable`
    pub fn new() -> Self {
        Self::default()
    }

    /// The smallest positive key not currently in use
    pub fn next_key(&self) -> u32 {
        let mut key = 1;
        while self.contains_key(key) {
            key += 1;
        }
        key
    }

    pub fn contains_key(&self, key: u32) -> bool {
        self.records.iter().any(|(k, _)| *k == key)
    }

    /// The value stored under `key`, if any
    pub fn get(&self, key: u32) -> Option<&str> {
        self.records
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, value)| value.as_str())
    }

    /// Stores `value` under the smallest unused key, returning that key.
    /// Always succeeds; repeated values are fine in a table.
    pub fn add(&mut self, value: &str) -> u32 {
        let key = self.next_key();
        self.records.push((key, value.to_owned()));
        key
    }

    /// Removes the record under `key`, returning its value
    pub fn delete(&mut self, key: u32) -> Result<String, EditError> {
        let index = self
            .records
            .iter()
            .position(|(k, _)| *k == key)
            .ok_or(EditError::NotFound)?;
        Ok(self.records.remove(index).1)
    }

    /// Replaces the value under `key` with `new_value` (trimmed).  The key
    /// keeps its display position.
    pub fn update(&mut self, key: u32, new_value: &str) -> Result<(), EditError> {
        let new_value = new_value.trim();
        if new_value.is_empty() {
            return Err(EditError::EmptyValue);
        }
        let slot = self
            .records
            .iter_mut()
            .find(|(k, _)| *k == key)
            .ok_or(EditError::NotFound)?;
        slot.1 = new_value.to_owned();
        Ok(())
    }

    /// Swaps the values stored under two keys.  The keys themselves (and
    /// their display positions) are unchanged.
    pub fn swap(&mut self, a: u32, b: u32) -> Result<(), EditError> {
        let index_a = self
            .records
            .iter()
            .position(|(k, _)| *k == a)
            .ok_or(EditError::NotFound)?;
        let index_b = self
            .records
            .iter()
            .position(|(k, _)| *k == b)
            .ok_or(EditError::NotFound)?;
        let value_a = self.records[index_a].1.clone();
        let value_b = std::mem::replace(&mut self.records[index_b].1, value_a);
        self.records[index_a].1 = value_b;
        Ok(())
    }

    /// Empties the table.  Confirmation is the caller's concern.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// A lazy, restartable view of the table as (key, value) pairs in
    /// display order.  Never mutates.
    pub fn view(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.records.iter().map(|(k, value)| (*k, value.as_str()))
    }
}

impl Collection for RecordTable {
    fn to_lines(&self) -> Vec<String> {
        // Values are written unescaped; a value containing '=' still round
        // trips (the key is split off at the *first* '='), but a value
        // containing a newline does not.  Documented format limitation.
        self.view()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect()
    }

    /// Lines without a `=`, with a non-integer key or with a zero key are
    /// skipped with a warning.  A repeated key overwrites the earlier value
    /// but keeps its display position.
    fn from_lines(lines: Vec<String>) -> Self {
        let mut table = RecordTable::new();
        for line in lines {
            let mut parts = line.splitn(2, '=');
            let key = parts.next().unwrap_or("").trim();
            let value = match parts.next() {
                Some(value) => value,
                None => {
                    log::warn!("Skipping malformed record line {:?} (no '=')", line);
                    continue;
                }
            };
            match key.parse::<u32>() {
                Ok(key) if key > 0 => {
                    if let Some(slot) = table.records.iter_mut().find(|(k, _)| *k == key) {
                        log::warn!("Repeated key {} while loading records; keeping last", key);
                        slot.1 = value.to_owned();
                    } else {
                        table.records.push((key, value.to_owned()));
                    }
                }
                _ => log::warn!("Skipping record line {:?} (bad key {:?})", line, key),
            }
        }
        table
    }

    fn display_rows(&self) -> Vec<String> {
        self.view()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_smallest_unused() {
        let mut table = RecordTable::new();
        assert_eq!(table.add("x"), 1);
        assert_eq!(table.add("y"), 2);
        table.delete(1).unwrap();
        // Key 1 is free again, so the next record reuses it
        assert_eq!(table.add("z"), 1);
        assert_eq!(table.add("w"), 3);
    }

    #[test]
    fn display_preserves_insertion_order() {
        let mut table = RecordTable::new();
        table.add("x");
        table.add("y");
        table.delete(1).unwrap();
        table.add("z"); // reuses key 1, but displays after key 2
        let rows: Vec<_> = table.view().collect();
        assert_eq!(rows, vec![(2, "y"), (1, "z")]);
    }

    #[test]
    fn duplicate_values_are_permitted() {
        let mut table = RecordTable::new();
        table.add("same");
        table.add("same");
        assert_eq!(table.len(), 2);
        table.update(2, "same").unwrap();
    }

    #[test]
    fn update_rules() {
        let mut table = RecordTable::new();
        table.add("x");
        assert_eq!(table.update(1, "  "), Err(EditError::EmptyValue));
        assert_eq!(table.update(9, "y"), Err(EditError::NotFound));
        table.update(1, " y ").unwrap();
        assert_eq!(table.get(1), Some("y"));
    }

    #[test]
    fn swap_exchanges_values_not_keys() {
        let mut table = RecordTable::new();
        table.add("first");
        table.add("second");
        table.swap(1, 2).unwrap();
        assert_eq!(table.get(1), Some("second"));
        assert_eq!(table.get(2), Some("first"));
        // Display order is untouched
        let keys: Vec<_> = table.view().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![1, 2]);
        assert_eq!(table.swap(1, 7), Err(EditError::NotFound));
    }

    #[test]
    fn lines_round_trip() {
        let mut table = RecordTable::new();
        table.add("alpha");
        table.add("beta=gamma"); // '=' in a value survives the round trip
        let lines = table.to_lines();
        assert_eq!(lines, vec!["1=alpha", "2=beta=gamma"]);
        assert_eq!(RecordTable::from_lines(lines), table);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let lines = vec![
            "1=good".to_owned(),
            "no separator".to_owned(),
            "x=bad key".to_owned(),
            "0=zero key".to_owned(),
            "2=also good".to_owned(),
        ];
        let table = RecordTable::from_lines(lines);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1), Some("good"));
        assert_eq!(table.get(2), Some("also good"));
    }
}
