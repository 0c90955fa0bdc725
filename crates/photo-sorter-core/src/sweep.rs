use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::event::{Event, EventSink};

/// Names that do not count as content: exact matches or prefixes of any junk name.
pub fn is_junk(name: &str, junk_names: &BTreeSet<String>) -> bool {
    junk_names.iter().any(|junk| name.starts_with(junk.as_str()))
}

/// Remove every directory under `root` (and `root` itself) that holds nothing
/// but junk. Children are handled before their parent, so a parent emptied by
/// the removal of its last child directory goes in the same pass.
///
/// Directories named in `excluded_dirs` are never entered and always count as
/// content, so neither they nor any directory holding one is removed.
/// Returns the number of directories removed.
pub fn remove_empty_directories(
    root: &Path,
    excluded_dirs: &BTreeSet<String>,
    junk_names: &BTreeSet<String>,
    sink: &dyn EventSink,
) -> u64 {
    let mut removed = 0;
    sweep_dir(root, excluded_dirs, junk_names, sink, &mut removed);
    removed
}

fn sweep_dir(
    dir: &Path,
    excluded_dirs: &BTreeSet<String>,
    junk_names: &BTreeSet<String>,
    sink: &dyn EventSink,
    removed: &mut u64,
) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            sink.record(Event::DirectoryRemoveFailed {
                path: dir.to_path_buf(),
                reason: format!("cannot list directory: {}", e),
            });
            return;
        }
    };

    for entry in entries.flatten() {
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }
        if excluded_dirs.contains(&*entry.file_name().to_string_lossy()) {
            continue;
        }
        sweep_dir(&entry.path(), excluded_dirs, junk_names, sink, removed);
    }

    if !holds_only_junk(dir, excluded_dirs, junk_names) {
        return;
    }

    match fs::remove_dir_all(dir) {
        Ok(()) => {
            *removed += 1;
            sink.record(Event::DirectoryRemoved(dir.to_path_buf()));
        }
        Err(e) => sink.record(Event::DirectoryRemoveFailed {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

fn holds_only_junk(
    dir: &Path,
    excluded_dirs: &BTreeSet<String>,
    junk_names: &BTreeSet<String>,
) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    // An unreadable entry counts as content.
    entries
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .all(|name| {
            matches!(name, Ok(name)
                if !excluded_dirs.contains(&name) && is_junk(&name, junk_names))
        })
}
