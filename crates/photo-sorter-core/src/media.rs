use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDateTime};

/// Raw-camera formats.
pub const RAW_EXTENSIONS: &[&str] = &["cr2", "cr3", "nef", "arw", "dng", "raf", "rw2"];

/// Regular image and video formats.
pub const REGULAR_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "heic", "mov", "mp4", "gif", "avi", "mpg", "mpeg",
];

/// Synology thumbnail cache directories, never traversed.
pub const EXCLUDED_DIRS: &[&str] = &["@eaDir"];

/// Name prefixes that do not count as real content when deciding whether a
/// directory is empty.
pub const JUNK_NAMES: &[&str] = &[
    ".DS_Store",
    "._",
    "Thumbs.db",
    "desktop.ini",
    "SYNOFILE_THUMB",
    ".picasa.ini",
];

pub(crate) fn to_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Lower-cased text after the last `.` of the file name, if any. The rest of
/// the name may be any bytes the OS allows.
pub fn extension_of(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// A file that passed the extension filter.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub path: PathBuf,
    /// Lower-cased extension
    pub extension: String,
    /// Resolved capture time, filled in by the walker
    pub taken: Option<NaiveDateTime>,
}

impl MediaFile {
    /// Returns `None` when the extension is missing or not in `allowed`.
    pub fn classify(path: &Path, allowed: &BTreeSet<String>) -> Option<Self> {
        let extension = extension_of(path)?;
        if !allowed.contains(&extension) {
            return None;
        }
        Some(Self {
            path: path.to_path_buf(),
            extension,
            taken: None,
        })
    }
}

/// `base/YYYY/MM` for the given capture time.
pub fn date_dir(base: &Path, taken: &NaiveDateTime) -> PathBuf {
    base.join(format!("{:04}", taken.year()))
        .join(format!("{:02}", taken.month()))
}
