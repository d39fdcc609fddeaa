//! Serialising collections to flat text files, and the save-time versioning
//! policy: before a primary file is overwritten, the old bytes are copied to
//! a timestamped backup which is never touched again.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::collection::Collection;

/// How backups are named and where they live
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum VersionPolicy {
    /// Backups sit next to the primary file, named
    /// `{stem}_v{timestamp}{extension}`
    Sibling,
    /// Backups collect in a dedicated directory, named
    /// `{file_name}_{timestamp}.bak`
    Directory(PathBuf),
}

/// Error produced by loading or saving a collection
#[derive(Debug)]
pub enum PersistError {
    /// The requested file does not exist
    FileNotFound(PathBuf),
    /// Reading or writing the primary file failed
    Io(io::Error),
}

impl std::fmt::Display for PersistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistError::FileNotFound(path) => {
                write!(f, "File '{}' not found.", path.display())
            }
            PersistError::Io(inner) => write!(f, "{}", inner),
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistError::FileNotFound(_) => None,
            PersistError::Io(inner) => Some(inner),
        }
    }
}

impl From<io::Error> for PersistError {
    fn from(inner: io::Error) -> Self {
        PersistError::Io(inner)
    }
}

/// What [`save`] did, beyond writing the primary file.  A backup failure is
/// reported here rather than as an error: versioning never blocks a save.
#[derive(Debug, Default)]
pub struct SaveReport {
    /// The backup created before overwriting, if the primary already existed
    pub backup: Option<PathBuf>,
    /// Why the backup could not be created, if it was needed but failed
    pub backup_error: Option<io::Error>,
}

/// Serialises `collection` to `path`, versioning any existing file there
/// first according to `policy`
pub fn save<C: Collection>(
    collection: &C,
    path: &Path,
    policy: &VersionPolicy,
) -> Result<SaveReport, PersistError> {
    let mut report = SaveReport::default();
    if path.exists() {
        let backup = backup_path(path, policy, &timestamp());
        match copy_to_backup(path, &backup) {
            Ok(()) => {
                log::info!("Backed up '{}' to '{}'", path.display(), backup.display());
                report.backup = Some(backup);
            }
            Err(inner) => {
                log::warn!("Backup of '{}' failed: {}", path.display(), inner);
                report.backup_error = Some(inner);
            }
        }
    }

    let lines = collection.to_lines();
    let mut contents = lines.join("\n");
    if !contents.is_empty() {
        contents.push('\n');
    }
    fs::write(path, contents)?;
    log::info!("Wrote {} entries to '{}'", collection.len(), path.display());
    Ok(report)
}

/// Reads and parses the collection stored at `path`
pub fn load<C: Collection>(path: &Path) -> Result<C, PersistError> {
    if !path.exists() {
        return Err(PersistError::FileNotFound(path.to_path_buf()));
    }
    let contents = fs::read_to_string(path)?;
    let lines = contents.lines().map(str::to_owned).collect();
    Ok(C::from_lines(lines))
}

/// File names of the backups recorded for `path` under `policy`, most recent
/// first.  The timestamp format is fixed-width and zero-padded, so sorting
/// the names lexicographically sorts the backups chronologically.
pub fn list_versions(path: &Path, policy: &VersionPolicy) -> io::Result<Vec<PathBuf>> {
    let (dir, prefix, suffix) = match policy {
        VersionPolicy::Sibling => {
            let dir = match path.parent() {
                Some(parent) if parent != Path::new("") => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            (dir, format!("{}_v", stem_of(path)), extension_of(path))
        }
        VersionPolicy::Directory(dir) => (
            dir.clone(),
            format!("{}_", file_name_of(path)),
            ".bak".to_owned(),
        ),
    };

    let mut versions = list_files(&dir, |name| {
        name.starts_with(&prefix) && name.ends_with(&suffix)
    })?;
    versions.sort_unstable_by(|a, b| b.cmp(a));
    Ok(versions.into_iter().map(|name| dir.join(name)).collect())
}

/// Names of the regular files in `dir` accepted by `predicate`, sorted
/// ascending for a stable numbered listing
pub fn list_files<P>(dir: &Path, predicate: P) -> io::Result<Vec<String>>
where
    P: Fn(&str) -> bool,
{
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if predicate(name) {
                names.push(name.to_owned());
            }
        }
    }
    names.sort_unstable();
    Ok(names)
}

/// The backup path for `path` under `policy`, using an explicit timestamp so
/// the naming rule itself can be tested
pub fn backup_path(path: &Path, policy: &VersionPolicy, timestamp: &str) -> PathBuf {
    match policy {
        VersionPolicy::Sibling => {
            let name = format!("{}_v{}{}", stem_of(path), timestamp, extension_of(path));
            path.with_file_name(name)
        }
        VersionPolicy::Directory(dir) => {
            dir.join(format!("{}_{}.bak", file_name_of(path), timestamp))
        }
    }
}

/// Second-resolution local timestamp; fixed-width and zero-padded
fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

fn copy_to_backup(path: &Path, backup: &Path) -> io::Result<()> {
    if let Some(dir) = backup.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }
    fs::copy(path, backup).map(drop)
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn extension_of(path: &Path) -> String {
    match path.extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy()),
        None => String::new(),
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{ItemList, RecordTable};

    fn list_of(values: &[&str]) -> ItemList {
        let mut list = ItemList::new();
        for value in values {
            list.add(value).unwrap();
        }
        list
    }

    #[test]
    fn backup_naming() {
        assert_eq!(
            backup_path(
                Path::new("list.txt"),
                &VersionPolicy::Sibling,
                "20260825_120000"
            ),
            PathBuf::from("list_v20260825_120000.txt")
        );
        assert_eq!(
            backup_path(
                Path::new("records.txt"),
                &VersionPolicy::Directory(PathBuf::from("versions")),
                "20260825_120000"
            ),
            PathBuf::from("versions/records.txt_20260825_120000.bak")
        );
    }

    #[test]
    fn first_save_creates_no_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.txt");
        let report = save(&list_of(&["milk"]), &path, &VersionPolicy::Sibling).unwrap();
        assert!(report.backup.is_none());
        assert!(report.backup_error.is_none());
        assert_eq!(fs::read_to_string(&path).unwrap(), "milk\n");
    }

    #[test]
    fn overwrite_versions_the_old_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.txt");
        save(&list_of(&["milk"]), &path, &VersionPolicy::Sibling).unwrap();
        let report = save(&list_of(&["milk", "eggs"]), &path, &VersionPolicy::Sibling).unwrap();

        let backup = report.backup.expect("second save must create a backup");
        // The backup holds the *old* serialised state, the primary the new
        assert_eq!(fs::read_to_string(&backup).unwrap(), "milk\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "milk\neggs\n");

        let versions = list_versions(&path, &VersionPolicy::Sibling).unwrap();
        assert_eq!(versions, vec![backup]);
    }

    #[test]
    fn directory_policy_creates_the_backup_folder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.txt");
        let policy = VersionPolicy::Directory(dir.path().join("versions"));
        let mut table = RecordTable::new();
        table.add("x");

        save(&table, &path, &policy).unwrap();
        let report = save(&table, &path, &policy).unwrap();
        let backup = report.backup.expect("overwrite must create a backup");
        assert!(backup.starts_with(dir.path().join("versions")));
        assert_eq!(fs::read_to_string(&backup).unwrap(), "1=x\n");

        let versions = list_versions(&path, &policy).unwrap();
        assert_eq!(versions, vec![backup]);
    }

    #[test]
    fn versions_list_most_recent_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.txt");
        // Backup names carry a lexicographically ordered timestamp, so hand
        // placing two of them is enough to check the ordering
        let older = backup_path(&path, &VersionPolicy::Sibling, "20260825_110000");
        let newer = backup_path(&path, &VersionPolicy::Sibling, "20260825_120000");
        fs::write(&path, "current\n").unwrap();
        fs::write(&older, "old\n").unwrap();
        fs::write(&newer, "new\n").unwrap();

        let versions = list_versions(&path, &VersionPolicy::Sibling).unwrap();
        assert_eq!(versions, vec![newer, older]);
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.txt");
        match load::<ItemList>(&path) {
            Err(PersistError::FileNotFound(reported)) => assert_eq!(reported, path),
            other => panic!("expected FileNotFound, got {:?}", other.map(|c| c.to_lines())),
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.txt");
        let list = list_of(&["milk", "eggs"]);
        save(&list, &path, &VersionPolicy::Sibling).unwrap();
        assert_eq!(load::<ItemList>(&path).unwrap(), list);

        let empty = ItemList::new();
        save(&empty, &path, &VersionPolicy::Sibling).unwrap();
        assert_eq!(load::<ItemList>(&path).unwrap(), empty);
    }
}
