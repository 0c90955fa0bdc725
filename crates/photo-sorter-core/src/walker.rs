use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::date::{resolve_capture_time, CaptureDateSource};
use crate::event::{Event, EventSink};
use crate::media::{date_dir, MediaFile};
use crate::mover::move_file;
use crate::sweep::remove_empty_directories;
use crate::{SortOptions, SortResult};

/// Sort every media file under `source_root` into the date tree, then sweep
/// `source_root` for directories left empty. Outcomes are added to `result`.
pub fn process_directory(
    source_root: &Path,
    options: &SortOptions,
    dates: &dyn CaptureDateSource,
    sink: &dyn EventSink,
    result: &mut SortResult,
) {
    if !source_root.is_dir() {
        sink.record(Event::SourceMissing(source_root.to_path_buf()));
        result.missing_sources += 1;
        return;
    }

    // Listed up front: moving files while walking must not feed them back
    // into the walk.
    for path in collect_files(source_root, options, sink) {
        process_file(&path, options, dates, sink, result);
    }

    result.directories_removed += remove_empty_directories(
        source_root,
        &options.excluded_dirs,
        &options.junk_names,
        sink,
    );
}

fn collect_files(source_root: &Path, options: &SortOptions, sink: &dyn EventSink) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let walker = WalkDir::new(source_root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_pruned(e, options));

    for entry in walker {
        match entry {
            Ok(e) if e.file_type().is_file() => files.push(e.into_path()),
            Ok(_) => {}
            Err(e) => sink.record(Event::WalkFailed {
                reason: e.to_string(),
            }),
        }
    }
    files
}

/// Excluded cache directories and destination trees nested inside the source.
fn is_pruned(entry: &DirEntry, options: &SortOptions) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    if options.excluded_dirs.contains(&*name) {
        return true;
    }
    entry.path() == options.output || options.raw_output.as_deref() == Some(entry.path())
}

fn process_file(
    path: &Path,
    options: &SortOptions,
    dates: &dyn CaptureDateSource,
    sink: &dyn EventSink,
    result: &mut SortResult,
) {
    let Some(mut media) = MediaFile::classify(path, &options.media_extensions) else {
        sink.record(Event::SkippedUnknownExtension(path.to_path_buf()));
        result.skipped_unknown += 1;
        return;
    };

    media.taken = resolve_capture_time(&media.path, dates, options.max_metadata_bytes, sink);
    let Some(taken) = media.taken else {
        sink.record(Event::NoDate(media.path));
        result.skipped_undated += 1;
        return;
    };

    let dest_dir = date_dir(options.base_for(&media.extension), &taken);
    match move_file(&media.path, &dest_dir, sink) {
        Ok(_) => result.moved += 1,
        Err(e) => {
            sink.record(Event::MoveFailed {
                path: media.path,
                reason: format!("{:#}", e),
            });
            result.failed += 1;
        }
    }
}
