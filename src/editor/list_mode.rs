//! The command loop for editing an ordered unique-value list.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use regex::Regex;

use super::confirm_preview;
use crate::collection::list::move_destination;
use crate::collection::{Collection, EditError, ItemList, Side};
use crate::config::{Config, ListKeyMap};
use crate::input::Prompter;
use crate::persist::{self, VersionPolicy};
use crate::session::Session;

/// The menu prompt, listing every recognised token
const MENU_PROMPT: &str = "Enter A (add), D (delete), I (insert), U (update), M (move), \
V (view), S (save), O (open), C (clear), Q (quit), VL (load version), Z (undo), Y (redo), \
LF (list files): ";

/// Tokens are matched as whole lines, case-insensitively
const MENU_PATTERN: &str = "^(?i)(A|D|I|U|M|V|S|O|C|Q|VL|Z|Y|LF)$";

/// The ABOVE/BELOW answer for insert and move destinations
const SIDE_PATTERN: &str = "^[AaBb]$";

/// The commands of the list menu.  Tokens map to these through the
/// [`ListKeyMap`] in [`Config`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ListCmd {
    /// Append a new value at the end
    Add,
    /// Remove the value at a chosen position
    Delete,
    /// Insert a new value above or below a chosen position
    Insert,
    /// Replace the value at a chosen position
    Update,
    /// Reposition a value relative to another
    Move,
    /// Print the current list
    View,
    /// Save to the backing file, versioning any previous contents
    Save,
    /// Open a list file from the working directory
    Open,
    /// Empty the list
    Clear,
    /// Leave the editor
    Quit,
    /// Restore one of the backing file's saved versions
    LoadVersion,
    /// Undo the last recorded change
    Undo,
    /// Redo the last undone change
    Redo,
    /// Print the list files in the working directory
    ListFiles,
}

impl ListCmd {
    /// Returns a lower-case summary string of the given command
    pub fn summary(&self) -> &'static str {
        match self {
            ListCmd::Add => "add an item",
            ListCmd::Delete => "delete an item",
            ListCmd::Insert => "insert an item",
            ListCmd::Update => "update an item",
            ListCmd::Move => "move an item",
            ListCmd::View => "view the list",
            ListCmd::Save => "save the list",
            ListCmd::Open => "open a list file",
            ListCmd::Clear => "clear the list",
            ListCmd::Quit => "quit",
            ListCmd::LoadVersion => "load a saved version",
            ListCmd::Undo => "undo a change",
            ListCmd::Redo => "redo a change",
            ListCmd::ListFiles => "list saved files",
        }
    }
}

/// Looks a menu token up in `keymap`, case-insensitively.  Returns [`None`]
/// for tokens outside the map.
pub fn parse_token(keymap: &ListKeyMap, token: &str) -> Option<ListCmd> {
    keymap.get(token.to_uppercase().as_str()).copied()
}

/// A singleton struct holding everything one list-editing run needs
pub struct ListEditor<R, W> {
    session: Session<ItemList>,
    prompter: Prompter<R, W>,
    config: Config,
    menu_pattern: Regex,
    side_pattern: Regex,
}

impl<R: BufRead, W: Write> ListEditor<R, W> {
    /// Creates an editor over an empty list, backed by the configured
    /// default file name
    pub fn new(config: Config, prompter: Prompter<R, W>) -> Self {
        let mut session = Session::new(ItemList::new(), config.undo_depth);
        if !config.default_list_file.is_empty() {
            session.set_file_name(Some(PathBuf::from(&config.default_list_file)));
        }
        ListEditor {
            session,
            prompter,
            config,
            menu_pattern: Regex::new(MENU_PATTERN).unwrap(),
            side_pattern: Regex::new(SIDE_PATTERN).unwrap(),
        }
    }

    /// Runs the menu loop until the operator quits
    pub fn run(&mut self) -> io::Result<()> {
        log::info!("Starting the list editor mainloop");
        loop {
            let token = self.prompter.matching(MENU_PROMPT, &self.menu_pattern)?;
            let cmd = match parse_token(&self.config.list_keymap, &token) {
                Some(cmd) => cmd,
                None => {
                    self.prompter.say("Invalid option. Try again.")?;
                    continue;
                }
            };
            log::debug!("Executing command: {}", cmd.summary());

            let mut quit = false;
            match cmd {
                ListCmd::Add => self.add()?,
                ListCmd::Delete => self.delete()?,
                ListCmd::Insert => self.insert()?,
                ListCmd::Update => self.update()?,
                ListCmd::Move => self.move_item()?,
                ListCmd::View => self.view()?,
                ListCmd::Save => self.save()?,
                ListCmd::Open => self.open()?,
                ListCmd::Clear => self.clear()?,
                ListCmd::LoadVersion => self.load_version()?,
                ListCmd::Undo => self.undo()?,
                ListCmd::Redo => self.redo()?,
                ListCmd::ListFiles => self.list_files()?,
                ListCmd::Quit => quit = self.quit()?,
            }

            // Stack status after every command, so the operator always knows
            // how much history is held
            let (undo_depth, redo_depth) = self.session.history_depths();
            self.prompter
                .say(&format!("Undo stack size: {}", undo_depth))?;
            self.prompter
                .say(&format!("Redo stack size: {}", redo_depth))?;

            if quit {
                return Ok(());
            }
        }
    }

    /* ===== MUTATING COMMANDS ===== */

    fn add(&mut self) -> io::Result<()> {
        let item = self.prompter.read_line("Enter item to add: ")?;
        // A rejected duplicate never reaches the preview stage, so it grows
        // no history
        if self.session.collection().contains(&item) {
            return self.prompter.say("Item already exists. Not adding.");
        }
        self.session.record_before_change();
        match self.session.preview(|list| list.add(&item)) {
            Ok(preview) => {
                confirm_preview(
                    &mut self.session,
                    &mut self.prompter,
                    "\nPreview of the list with new item:",
                    preview,
                    "\nAdd this item?",
                    "Item added.",
                    "Add cancelled.",
                )?;
                Ok(())
            }
            Err(error) => self.prompter.say(&error.to_string()),
        }
    }

    fn delete(&mut self) -> io::Result<()> {
        if self.session.collection().is_empty() {
            return self.prompter.say("No items to delete.");
        }
        self.session.record_before_change();
        self.view()?;
        let len = self.session.collection().len();
        let index = self
            .prompter
            .ranged_int("Enter item number to delete: ", 1, len)?
            - 1;
        let item = item_at(self.session.collection(), index);
        match self.session.preview(|list| list.delete_at(index).map(drop)) {
            Ok(preview) => {
                confirm_preview(
                    &mut self.session,
                    &mut self.prompter,
                    &format!("\nPreview of the list after removing item \"{}\":", item),
                    preview,
                    &format!("\nDelete item '{}'?", item),
                    "Item deleted.",
                    "Deletion cancelled.",
                )?;
                Ok(())
            }
            Err(error) => self.prompter.say(&error.to_string()),
        }
    }

    fn insert(&mut self) -> io::Result<()> {
        let new_item = self.prompter.read_line("Enter new item description: ")?;
        if self.session.collection().contains(&new_item) {
            return self.prompter.say("Item already exists. Not inserting.");
        }
        self.session.record_before_change();
        let (anchor, side) = if self.session.collection().is_empty() {
            // An empty list has no anchor to choose; the insert lands at 0
            (0, Side::Above)
        } else {
            self.view()?;
            let len = self.session.collection().len();
            let anchor = self
                .prompter
                .ranged_int("Enter item number to insert before or after: ", 1, len)?
                - 1;
            let relative = item_at(self.session.collection(), anchor);
            let side = self.read_side(&format!(
                "Do you want to insert ABOVE or BELOW \"{}\"? (A/B): ",
                relative
            ))?;
            (anchor, side)
        };
        match self
            .session
            .preview(|list| list.insert_relative(&new_item, anchor, side))
        {
            Ok(preview) => {
                confirm_preview(
                    &mut self.session,
                    &mut self.prompter,
                    "\nPreview of the list after insert:",
                    preview,
                    "\nInsert new item?",
                    "Item inserted.",
                    "Insertion cancelled.",
                )?;
                Ok(())
            }
            Err(error) => self.prompter.say(&error.to_string()),
        }
    }

    fn update(&mut self) -> io::Result<()> {
        if self.session.collection().is_empty() {
            return self.prompter.say("No items to update.");
        }
        // Recorded before the replacement value is read: an attempt that
        // fails validation below still leaves its snapshot behind
        self.session.record_before_change();
        self.view()?;
        let len = self.session.collection().len();
        let index = self
            .prompter
            .ranged_int("Enter the number of the item to update: ", 1, len)?
            - 1;
        let old_item = item_at(self.session.collection(), index);
        let new_item = self
            .prompter
            .read_line(&format!("Enter new description for item \"{}\": ", old_item))?;
        match self.session.preview(|list| list.update(index, &new_item)) {
            Err(EditError::EmptyValue) => self
                .prompter
                .say("New item cannot be empty. Update cancelled."),
            Err(EditError::DuplicateValue(value)) => self.prompter.say(&format!(
                "Item \"{}\" already exists in the list. Update cancelled.",
                value
            )),
            Err(error) => self.prompter.say(&error.to_string()),
            Ok(preview) => {
                confirm_preview(
                    &mut self.session,
                    &mut self.prompter,
                    "\nPreview of the list after update:",
                    preview,
                    "\nUpdate this item?",
                    "Item updated.",
                    "Update cancelled.",
                )?;
                Ok(())
            }
        }
    }

    /// Unlike every other command, move mutates the live list *before* the
    /// confirmation: the element is physically removed while the destination
    /// is chosen, so the views shown during selection are of the shortened
    /// list.  Cancelling re-inserts it at its original position.
    fn move_item(&mut self) -> io::Result<()> {
        if self.session.collection().len() < 2 {
            return self.prompter.say("Need at least 2 items to perform a move.");
        }
        self.session.record_before_change();
        self.view()?;
        let len = self.session.collection().len();
        let from = self
            .prompter
            .ranged_int("Enter the number of the item to move: ", 1, len)?
            - 1;
        let item = match self.session.collection_mut().delete_at(from) {
            Ok(item) => item,
            Err(error) => return self.prompter.say(&error.to_string()),
        };

        self.view()?;
        let remaining = self.session.collection().len();
        let anchor = self
            .prompter
            .ranged_int("Enter the number of the item to move ABOVE or BELOW: ", 1, remaining)?
            - 1;
        let target = item_at(self.session.collection(), anchor);
        let side = self.read_side(&format!(
            "Do you want to move \"{}\" ABOVE or BELOW \"{}\"? (A/B): ",
            item, target
        ))?;
        let dest = move_destination(from, anchor, side);

        let mut preview = self.session.collection().clone();
        if let Err(error) = preview.insert_at(dest, item.clone()) {
            // Unreachable for a valid destination; restore the live list
            if self.session.collection_mut().insert_at(from, item).is_err() {
                log::error!("Couldn't restore a moved item after a failed preview");
            }
            return self.prompter.say(&error.to_string());
        }
        self.prompter.say("\nPreview of the list after move:")?;
        for row in preview.display_rows() {
            self.prompter.say(&row)?;
        }

        if self.prompter.yes_no("\nConfirm move?")? {
            self.session.commit(preview);
            self.prompter.say("Move confirmed.")
        } else {
            if self.session.collection_mut().insert_at(from, item).is_err() {
                log::error!("Couldn't restore a moved item after a cancelled move");
            }
            self.prompter.say("Move cancelled. List restored.")
        }
    }

    fn clear(&mut self) -> io::Result<()> {
        if self.session.collection().is_empty() {
            return self.prompter.say("List is already empty.");
        }
        if !self.prompt_save_if_needed()? {
            return self.prompter.say("Clear cancelled.");
        }
        self.session.record_before_change();
        self.view()?;
        if self
            .prompter
            .yes_no("\nAre you sure you want to clear the entire list?")?
        {
            let mut cleared = self.session.collection().clone();
            cleared.clear();
            self.session.commit(cleared);
            self.prompter.say("List cleared.")
        } else {
            self.prompter.say("Clear operation cancelled.")
        }
    }

    /* ===== HISTORY COMMANDS ===== */

    fn undo(&mut self) -> io::Result<()> {
        match self.session.undo() {
            Ok(()) => self.prompter.say("Undo successful."),
            Err(error) => self.prompter.say(&error.to_string()),
        }
    }

    fn redo(&mut self) -> io::Result<()> {
        match self.session.redo() {
            Ok(()) => self.prompter.say("Redo successful."),
            Err(error) => self.prompter.say(&error.to_string()),
        }
    }

    /* ===== FILE COMMANDS ===== */

    fn save(&mut self) -> io::Result<()> {
        let path = match self.session.file_name() {
            Some(path) => path.to_path_buf(),
            None => {
                let name = self
                    .prompter
                    .nonempty("Enter the file name to save (without extension): ")?;
                let path = PathBuf::from(ensure_extension(name, &self.config.list_extension));
                self.session.set_file_name(Some(path.clone()));
                path
            }
        };
        match persist::save(self.session.collection(), &path, &VersionPolicy::Sibling) {
            Ok(report) => {
                if let Some(backup) = report.backup {
                    self.prompter
                        .say(&format!("Backup saved as: {}", backup.display()))?;
                }
                if let Some(error) = report.backup_error {
                    self.prompter
                        .say(&format!("Failed to create version backup: {}", error))?;
                }
                self.session.mark_saved();
                self.prompter
                    .say(&format!("List saved to '{}'", path.display()))
            }
            Err(error) => self.prompter.say(&format!("Error saving list: {}", error)),
        }
    }

    fn open(&mut self) -> io::Result<()> {
        if !self.prompt_save_if_needed()? {
            return self.prompter.say("Operation cancelled.");
        }
        let extension = self.config.list_extension.to_lowercase();
        let files = match persist::list_files(Path::new("."), |name| {
            name.to_lowercase().ends_with(&extension)
        }) {
            Ok(files) => files,
            Err(error) => {
                return self
                    .prompter
                    .say(&format!("Error listing files: {}", error))
            }
        };
        if files.is_empty() {
            return self.prompter.say("No saved lists found.");
        }
        self.prompter.say("\nAvailable list files:")?;
        for (i, name) in files.iter().enumerate() {
            self.prompter.say(&format!("{}. {}", i + 1, name))?;
        }
        let choice = self
            .prompter
            .ranged_int("Enter the number of the file to load: ", 1, files.len())?;
        let path = PathBuf::from(&files[choice - 1]);
        match persist::load::<ItemList>(&path) {
            Err(error) => self
                .prompter
                .say(&format!("Error reading from file: {}", error)),
            Ok(loaded) => {
                self.prompter.say("\nPreview of loaded list:")?;
                for row in loaded.display_rows() {
                    self.prompter.say(&row)?;
                }
                if self.prompter.yes_no("\nLoad this list?")? {
                    self.session.set_file_name(Some(path.clone()));
                    self.session.replace_collection(loaded, false);
                    self.prompter
                        .say(&format!("List loaded successfully from '{}'.", path.display()))
                } else {
                    self.prompter.say("Load cancelled.")
                }
            }
        }
    }

    fn load_version(&mut self) -> io::Result<()> {
        let path = match self.session.file_name() {
            Some(path) => path.to_path_buf(),
            None => return self.prompter.say("No list is currently loaded."),
        };
        let versions = match persist::list_versions(&path, &VersionPolicy::Sibling) {
            Ok(versions) => versions,
            Err(error) => {
                return self
                    .prompter
                    .say(&format!("Error listing versions: {}", error))
            }
        };
        if versions.is_empty() {
            return self
                .prompter
                .say(&format!("No versions found for '{}'", path.display()));
        }
        self.prompter.say("\nAvailable versions:")?;
        for (i, version) in versions.iter().enumerate() {
            self.prompter
                .say(&format!("{}. {}", i + 1, file_name_for_display(version)))?;
        }
        // Restoring a version is a mutation like any other: it is recorded
        // up front and leaves the session with unsaved changes
        self.session.record_before_change();
        let choice = self.prompter.ranged_int(
            "Enter the number of the version to load: ",
            1,
            versions.len(),
        )?;
        let version = &versions[choice - 1];
        match persist::load::<ItemList>(version) {
            Err(error) => self
                .prompter
                .say(&format!("Error reading version file: {}", error)),
            Ok(loaded) => {
                self.prompter.say("\nPreview of version:")?;
                for row in loaded.display_rows() {
                    self.prompter.say(&row)?;
                }
                if self
                    .prompter
                    .yes_no("\nReplace current list with this version?")?
                {
                    let name = file_name_for_display(version);
                    self.session.replace_collection(loaded, true);
                    self.prompter
                        .say(&format!("List restored from version: {}", name))
                } else {
                    self.prompter.say("Restore cancelled.")
                }
            }
        }
    }

    fn list_files(&mut self) -> io::Result<()> {
        let extension = self.config.list_extension.to_lowercase();
        let files = match persist::list_files(Path::new("."), |name| {
            name.to_lowercase().ends_with(&extension)
        }) {
            Ok(files) => files,
            Err(error) => {
                return self
                    .prompter
                    .say(&format!("Error listing files: {}", error))
            }
        };
        if files.is_empty() {
            self.prompter.say("No saved lists found.")
        } else {
            self.prompter.say("Saved lists:")?;
            for name in files {
                self.prompter.say(&format!("- {}", name))?;
            }
            Ok(())
        }
    }

    /* ===== READ-ONLY COMMANDS & HELPERS ===== */

    fn view(&mut self) -> io::Result<()> {
        if self.session.collection().is_empty() {
            self.prompter.say("List is empty.")
        } else {
            self.prompter.say("\nCurrent List:")?;
            for row in self.session.collection().display_rows() {
                self.prompter.say(&row)?;
            }
            Ok(())
        }
    }

    fn quit(&mut self) -> io::Result<bool> {
        if !self.prompt_save_if_needed()? {
            self.prompter.say("Exit cancelled.")?;
            return Ok(false);
        }
        self.prompter.yes_no("Are you sure you want to quit?")
    }

    /// Offers to save unsaved changes before a destructive action.  Returns
    /// `false` when the operator backs out of the action entirely.
    fn prompt_save_if_needed(&mut self) -> io::Result<bool> {
        if !self.session.is_dirty() {
            return Ok(true);
        }
        self.prompter.say("\nYou have unsaved changes.")?;
        if self
            .prompter
            .yes_no("Would you like to save your list first?")?
        {
            self.save()?;
            return Ok(!self.session.is_dirty());
        }
        self.prompter.yes_no("Are you sure you don't want to save?")
    }

    fn read_side(&mut self, prompt: &str) -> io::Result<Side> {
        let token = self.prompter.matching(prompt, &self.side_pattern)?;
        Ok(if token.eq_ignore_ascii_case("b") {
            Side::Below
        } else {
            Side::Above
        })
    }
}

/// The element at `index`, owned, for use inside prompts.  The callers all
/// validate `index` first, so the fallback is never shown.
fn item_at(list: &ItemList, index: usize) -> String {
    list.get(index).unwrap_or_default().to_owned()
}

fn file_name_for_display(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Appends `extension` unless `name` already ends with it (ignoring case)
fn ensure_extension(name: String, extension: &str) -> String {
    if name.to_lowercase().ends_with(&extension.to_lowercase()) {
        name
    } else {
        format!("{}{}", name, extension)
    }
}
