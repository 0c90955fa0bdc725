pub mod date;
pub mod event;
pub mod media;
pub mod mover;
pub mod sweep;
pub mod walker;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::media::to_set;

pub use date::exif::ExifReader;
pub use date::{resolve_capture_time, CaptureDateSource, MAX_METADATA_BYTES};
pub use event::{Event, EventSink, LogSink, MemorySink};
pub use mover::move_file;
pub use sweep::remove_empty_directories;
pub use walker::process_directory;

/// Everything a run needs to know. There is no config file; the CLI builds
/// this from [`SortOptions::for_home`].
#[derive(Debug, Clone)]
pub struct SortOptions {
    /// Unsorted trees, processed in order
    pub source_roots: Vec<PathBuf>,
    /// Destination base; files land in `output/YYYY/MM`
    pub output: PathBuf,
    /// Separate base for raw-camera files. `None` sends them to `output`.
    pub raw_output: Option<PathBuf>,
    /// Lower-case extensions that are sorted; everything else is left alone
    pub media_extensions: BTreeSet<String>,
    /// Subset of `media_extensions` routed to `raw_output`
    pub raw_extensions: BTreeSet<String>,
    /// Directory names never traversed
    pub excluded_dirs: BTreeSet<String>,
    /// Name prefixes ignored when deciding if a directory is empty
    pub junk_names: BTreeSet<String>,
    pub max_metadata_bytes: u64,
}

impl SortOptions {
    /// Fixed layout under a home directory: sort `~/Photos/MobileBackup` and
    /// `~/Photos/PhotoLibrary` into `~/Photos`.
    pub fn for_home(home: &Path) -> Self {
        let photos = home.join("Photos");
        let raw_extensions = to_set(media::RAW_EXTENSIONS);
        let mut media_extensions = to_set(media::REGULAR_EXTENSIONS);
        media_extensions.extend(raw_extensions.iter().cloned());

        Self {
            source_roots: vec![photos.join("MobileBackup"), photos.join("PhotoLibrary")],
            output: photos,
            raw_output: None,
            media_extensions,
            raw_extensions,
            excluded_dirs: to_set(media::EXCLUDED_DIRS),
            junk_names: to_set(media::JUNK_NAMES),
            max_metadata_bytes: MAX_METADATA_BYTES,
        }
    }

    /// Destination base for a file with the given lower-case extension.
    pub fn base_for(&self, extension: &str) -> &Path {
        match &self.raw_output {
            Some(raw) if self.raw_extensions.contains(extension) => raw,
            _ => &self.output,
        }
    }
}

/// Tally of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortResult {
    pub moved: u64,
    pub skipped_unknown: u64,
    pub skipped_undated: u64,
    pub failed: u64,
    pub directories_removed: u64,
    pub missing_sources: u64,
}

/// Sort every configured source root, one after the other.
pub fn process(
    options: &SortOptions,
    dates: &dyn CaptureDateSource,
    sink: &dyn EventSink,
) -> SortResult {
    let mut result = SortResult::default();
    for root in &options.source_roots {
        process_directory(root, options, dates, sink, &mut result);
    }
    result
}
