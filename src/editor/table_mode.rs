//! The command loop for editing a key-indexed record table.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::collection::{Collection, EditError, RecordTable};
use crate::config::Config;
use crate::input::Prompter;
use crate::persist::{self, VersionPolicy};
use crate::session::Session;

/// Table keys are read as menu numbers too, so give them the full key range
const MAX_KEY: usize = u32::MAX as usize;

/// The numbered menu, printed before every prompt
const MENU: &[&str] = &[
    "1. View Records",
    "2. Add Record",
    "3. Delete Record",
    "4. Update Record",
    "5. Move (Swap) Record",
    "6. Clear Records",
    "7. Save Records",
    "8. Load Records",
    "9. List Saved Files",
    "10. Undo",
    "11. Redo",
    "12. Exit",
];

/// The commands of the table menu, one per menu number
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TableCmd {
    View,
    Add,
    Delete,
    Update,
    Move,
    Clear,
    Save,
    Load,
    ListFiles,
    Undo,
    Redo,
    Exit,
}

impl TableCmd {
    /// The command behind a menu number, or [`None`] outside `1..=12`
    pub fn from_menu_number(number: usize) -> Option<TableCmd> {
        match number {
            1 => Some(TableCmd::View),
            2 => Some(TableCmd::Add),
            3 => Some(TableCmd::Delete),
            4 => Some(TableCmd::Update),
            5 => Some(TableCmd::Move),
            6 => Some(TableCmd::Clear),
            7 => Some(TableCmd::Save),
            8 => Some(TableCmd::Load),
            9 => Some(TableCmd::ListFiles),
            10 => Some(TableCmd::Undo),
            11 => Some(TableCmd::Redo),
            12 => Some(TableCmd::Exit),
            _ => None,
        }
    }
}

/// A singleton struct holding everything one table-editing run needs
pub struct TableEditor<R, W> {
    session: Session<RecordTable>,
    prompter: Prompter<R, W>,
    backup_policy: VersionPolicy,
}

impl<R: BufRead, W: Write> TableEditor<R, W> {
    /// Creates an editor over an empty table.  The table flavour has no
    /// default file; the operator names one on the first save.
    pub fn new(config: Config, prompter: Prompter<R, W>) -> Self {
        TableEditor {
            session: Session::new(RecordTable::new(), config.undo_depth),
            prompter,
            backup_policy: VersionPolicy::Directory(PathBuf::from(&config.backup_dir)),
        }
    }

    /// Runs the menu loop until the operator exits
    pub fn run(&mut self) -> io::Result<()> {
        log::info!("Starting the table editor mainloop");
        loop {
            self.prompter.say("\n--- Record Table ---")?;
            for line in MENU {
                self.prompter.say(line)?;
            }
            let choice = self.prompter.ranged_int("Enter choice: ", 1, MENU.len())?;
            let cmd = match TableCmd::from_menu_number(choice) {
                Some(cmd) => cmd,
                None => continue,
            };
            log::debug!("Executing command: {:?}", cmd);
            match cmd {
                TableCmd::View => self.view()?,
                TableCmd::Add => self.add()?,
                TableCmd::Delete => self.delete()?,
                TableCmd::Update => self.update()?,
                TableCmd::Move => self.swap()?,
                TableCmd::Clear => self.clear()?,
                TableCmd::Save => self.save()?,
                TableCmd::Load => self.load()?,
                TableCmd::ListFiles => self.list_files()?,
                TableCmd::Undo => self.undo()?,
                TableCmd::Redo => self.redo()?,
                TableCmd::Exit => {
                    if self.session.is_dirty()
                        && self
                            .prompter
                            .yes_no("Unsaved changes exist. Save before exiting?")?
                    {
                        self.save()?;
                    }
                    self.prompter.say("Exiting.")?;
                    return Ok(());
                }
            }
        }
    }

    fn view(&mut self) -> io::Result<()> {
        if self.session.collection().is_empty() {
            return self.prompter.say("No records to display.");
        }
        self.prompter.say("--- Records ---")?;
        for row in self.session.collection().display_rows() {
            self.prompter.say(&row)?;
        }
        Ok(())
    }

    /// The one mutation without a confirmation step: a new record can always
    /// be added, so it is previewed only through its reported key
    fn add(&mut self) -> io::Result<()> {
        let content = self.prompter.read_line("Enter record content: ")?;
        self.session.record_before_change();
        let key = self.session.collection_mut().add(&content);
        self.session.mark_dirty();
        self.prompter
            .say(&format!("Record added with key {}.", key))
    }

    fn delete(&mut self) -> io::Result<()> {
        if self.session.collection().is_empty() {
            return self.prompter.say("No records to delete.");
        }
        self.view()?;
        let key = self
            .prompter
            .ranged_int("Enter key of the record to delete: ", 1, MAX_KEY)? as u32;
        let value = match self.session.collection().get(key) {
            Some(value) => value.to_owned(),
            None => return self.prompter.say("Record not found."),
        };
        self.session.record_before_change();
        match self.session.preview(|table| table.delete(key).map(drop)) {
            Err(error) => self.prompter.say(&error.to_string()),
            Ok(preview) => {
                self.prompter
                    .say(&format!("Record to delete: {}: {}", key, value))?;
                if self.prompter.yes_no("Delete this record?")? {
                    self.session.commit(preview);
                    self.prompter.say("Record deleted.")
                } else {
                    self.prompter.say("Deletion cancelled.")
                }
            }
        }
    }

    fn update(&mut self) -> io::Result<()> {
        if self.session.collection().is_empty() {
            return self.prompter.say("No records to update.");
        }
        self.view()?;
        let key = self
            .prompter
            .ranged_int("Enter key of the record to update: ", 1, MAX_KEY)? as u32;
        let value = match self.session.collection().get(key) {
            Some(value) => value.to_owned(),
            None => return self.prompter.say("Record not found."),
        };
        self.prompter
            .say(&format!("Current record: {}: {}", key, value))?;
        // Recorded before the new content is read, like the list editor's
        // update: a failed attempt still leaves its snapshot behind
        self.session.record_before_change();
        let content = self.prompter.read_line("Enter new content: ")?;
        match self.session.preview(|table| table.update(key, &content)) {
            Err(EditError::EmptyValue) => self
                .prompter
                .say("Record content cannot be empty. Update cancelled."),
            Err(error) => self.prompter.say(&error.to_string()),
            Ok(preview) => {
                self.prompter
                    .say(&format!("Preview: {}: {}", key, content.trim()))?;
                if self.prompter.yes_no("Update this record?")? {
                    self.session.commit(preview);
                    self.prompter.say("Record updated.")
                } else {
                    self.prompter.say("Update cancelled.")
                }
            }
        }
    }

    /// Move in a keyed table is a value swap: both keys keep their identity
    /// and display position
    fn swap(&mut self) -> io::Result<()> {
        if self.session.collection().len() < 2 {
            return self.prompter.say("Not enough records to move.");
        }
        self.view()?;
        let from = self
            .prompter
            .ranged_int("Enter key of the record to move: ", 1, MAX_KEY)? as u32;
        let to = self
            .prompter
            .ranged_int("Enter destination key to swap with: ", 1, MAX_KEY)?
            as u32;
        let (from_value, to_value) = match (
            self.session.collection().get(from),
            self.session.collection().get(to),
        ) {
            (Some(from_value), Some(to_value)) => (from_value.to_owned(), to_value.to_owned()),
            _ => return self.prompter.say("One or both keys not found."),
        };
        self.session.record_before_change();
        match self.session.preview(|table| table.swap(from, to)) {
            Err(error) => self.prompter.say(&error.to_string()),
            Ok(preview) => {
                self.prompter.say(&format!(
                    "Preview: {}: {} <--> {}: {}",
                    from, from_value, to, to_value
                ))?;
                if self.prompter.yes_no("Proceed with move (swap)?")? {
                    self.session.commit(preview);
                    self.prompter.say("Records swapped.")
                } else {
                    self.prompter.say("Move cancelled.")
                }
            }
        }
    }

    fn clear(&mut self) -> io::Result<()> {
        if self.session.collection().is_empty() {
            return self.prompter.say("No records to clear.");
        }
        self.session.record_before_change();
        if self.prompter.yes_no("Clear all records?")? {
            let mut cleared = self.session.collection().clone();
            cleared.clear();
            self.session.commit(cleared);
            self.prompter.say("All records cleared.")
        } else {
            self.prompter.say("Clear cancelled.")
        }
    }

    fn save(&mut self) -> io::Result<()> {
        let name = self.prompter.nonempty("Enter filename to save: ")?;
        let path = PathBuf::from(name);
        match persist::save(self.session.collection(), &path, &self.backup_policy) {
            Ok(report) => {
                if let Some(backup) = report.backup {
                    self.prompter
                        .say(&format!("Previous version saved to {}", backup.display()))?;
                }
                if let Some(error) = report.backup_error {
                    self.prompter
                        .say(&format!("Versioning failed: {}", error))?;
                }
                self.session.set_file_name(Some(path.clone()));
                self.session.mark_saved();
                self.prompter
                    .say(&format!("Records saved to {}", path.display()))
            }
            Err(error) => self.prompter.say(&format!("Error saving file: {}", error)),
        }
    }

    fn load(&mut self) -> io::Result<()> {
        let name = self.prompter.nonempty("Enter filename to load: ")?;
        let path = PathBuf::from(name);
        // Loading replaces the whole table, so it is recorded like any other
        // mutation; the freshly loaded state itself is clean
        match persist::load::<RecordTable>(&path) {
            Err(error) => self.prompter.say(&format!("Error loading file: {}", error)),
            Ok(loaded) => {
                self.session.record_before_change();
                self.session.replace_collection(loaded, false);
                self.session.set_file_name(Some(path.clone()));
                self.prompter
                    .say(&format!("Records loaded from {}", path.display()))
            }
        }
    }

    fn list_files(&mut self) -> io::Result<()> {
        match persist::list_files(Path::new("."), |_| true) {
            Err(_) => self.prompter.say("Failed to list files."),
            Ok(names) => {
                for name in names {
                    self.prompter.say(&name)?;
                }
                Ok(())
            }
        }
    }

    fn undo(&mut self) -> io::Result<()> {
        match self.session.undo() {
            Ok(()) => self.prompter.say("Undo performed."),
            Err(error) => self.prompter.say(&error.to_string()),
        }
    }

    fn redo(&mut self) -> io::Result<()> {
        match self.session.redo() {
            Ok(()) => self.prompter.say("Redo performed."),
            Err(error) => self.prompter.say(&error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn editor(script: &str) -> TableEditor<Cursor<Vec<u8>>, Vec<u8>> {
        let prompter = Prompter::new(Cursor::new(script.as_bytes().to_vec()), Vec::new());
        TableEditor::new(Config::default(), prompter)
    }

    fn transcript(editor: TableEditor<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        let TableEditor { prompter, .. } = editor;
        let (_, output) = prompter.into_inner();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn every_menu_number_maps_to_a_command() {
        for number in 1..=12 {
            assert!(TableCmd::from_menu_number(number).is_some());
        }
        assert_eq!(TableCmd::from_menu_number(0), None);
        assert_eq!(TableCmd::from_menu_number(13), None);
    }

    #[test]
    fn deleted_keys_are_reassigned_smallest_first() {
        // add x, add y, delete key 1, add z; z must reuse key 1
        let script = "2\nx\n2\ny\n3\n1\nY\n2\nz\n12\nN\n";
        let mut ed = editor(script);
        ed.run().unwrap();
        let rows: Vec<_> = ed.session.collection().view().map(|(k, v)| (k, v.to_owned())).collect();
        assert_eq!(rows, vec![(2, "y".to_owned()), (1, "z".to_owned())]);
        let out = transcript(ed);
        assert!(out.contains("Record added with key 2."));
        assert!(out.contains("Record added with key 1."));
    }

    #[test]
    fn swap_exchanges_values_between_keys() {
        let script = "2\nfirst\n2\nsecond\n5\n1\n2\nY\n12\nN\n";
        let mut ed = editor(script);
        ed.run().unwrap();
        assert_eq!(ed.session.collection().get(1), Some("second"));
        assert_eq!(ed.session.collection().get(2), Some("first"));
        let out = transcript(ed);
        assert!(out.contains("Preview: 1: first <--> 2: second"));
        assert!(out.contains("Records swapped."));
    }

    #[test]
    fn cancelled_delete_keeps_the_record() {
        let script = "2\nkeep me\n3\n1\nN\n12\nN\n";
        let mut ed = editor(script);
        ed.run().unwrap();
        assert_eq!(ed.session.collection().get(1), Some("keep me"));
        let out = transcript(ed);
        assert!(out.contains("Deletion cancelled."));
    }

    #[test]
    fn missing_key_is_reported() {
        let script = "2\nx\n3\n9\n12\nN\n";
        let mut ed = editor(script);
        ed.run().unwrap();
        assert_eq!(ed.session.collection().len(), 1);
        let out = transcript(ed);
        assert!(out.contains("Record not found."));
    }

    #[test]
    fn undo_and_redo_round_trip_through_the_menu() {
        let script = "2\nx\n10\n11\n12\nN\n";
        let mut ed = editor(script);
        ed.run().unwrap();
        assert_eq!(ed.session.collection().get(1), Some("x"));
        let out = transcript(ed);
        assert!(out.contains("Undo performed."));
        assert!(out.contains("Redo performed."));
    }

    #[test]
    fn duplicate_values_are_fine_in_a_table() {
        let script = "2\nsame\n2\nsame\n12\nN\n";
        let mut ed = editor(script);
        ed.run().unwrap();
        assert_eq!(ed.session.collection().len(), 2);
    }

    #[test]
    fn clean_exit_asks_nothing() {
        let script = "12\n";
        let mut ed = editor(script);
        ed.run().unwrap();
        let out = transcript(ed);
        assert!(out.contains("Exiting."));
        assert!(!out.contains("Unsaved changes exist."));
    }
}
