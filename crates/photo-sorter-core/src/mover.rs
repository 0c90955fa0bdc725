use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use filetime::FileTime;

use crate::event::{Event, EventSink};

/// First free path for `file_name` inside `dir`: the name itself, then
/// `stem_1.ext`, `stem_2.ext`, ...
pub fn unique_destination(dir: &Path, file_name: &OsStr) -> PathBuf {
    let base_dest = dir.join(file_name);
    if !exists(&base_dest) {
        return base_dest;
    }

    let name = Path::new(file_name);
    let stem = name.file_stem().unwrap_or(file_name);
    let ext = name.extension();

    let mut counter = 0u32;
    loop {
        counter += 1;
        let mut new_name = OsString::from(stem);
        new_name.push(format!("_{}", counter));
        if let Some(ext) = ext {
            new_name.push(".");
            new_name.push(ext);
        }
        let candidate = dir.join(&new_name);
        if !exists(&candidate) {
            break candidate;
        }
    }
}

/// Broken symlinks occupy a name too.
fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Move `source` into `dest_dir` without overwriting anything there.
/// Returns the path the file ended up at.
pub fn move_file(source: &Path, dest_dir: &Path, sink: &dyn EventSink) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dest_dir)
        .with_context(|| format!("cannot create directory {}", dest_dir.display()))?;

    let file_name = source
        .file_name()
        .ok_or_else(|| anyhow!("source has no file name: {}", source.display()))?;
    let dest = unique_destination(dest_dir, file_name);

    match fs::rename(source, &dest) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            copy_then_remove(source, &dest)?;
            sink.record(Event::CopiedAcrossDevices {
                from: source.to_path_buf(),
                to: dest.clone(),
            });
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!("cannot rename {} -> {}", source.display(), dest.display())
            })
        }
    }

    sink.record(Event::Moved {
        from: source.to_path_buf(),
        to: dest.clone(),
    });
    Ok(dest)
}

fn copy_then_remove(source: &Path, dest: &Path) -> anyhow::Result<()> {
    let meta = fs::metadata(source).with_context(|| format!("cannot stat {}", source.display()))?;

    if let Err(e) = fs::copy(source, dest) {
        // Don't leave a half-written copy behind.
        fs::remove_file(dest).ok();
        return Err(e)
            .with_context(|| format!("cannot copy {} -> {}", source.display(), dest.display()));
    }

    let mtime = FileTime::from_last_modification_time(&meta);
    filetime::set_file_mtime(dest, mtime).ok();

    if let Err(e) = fs::remove_file(source) {
        // The source stays put, so the copy would be a duplicate.
        fs::remove_file(dest).ok();
        return Err(e).with_context(|| format!("cannot remove {} after copying", source.display()));
    }
    Ok(())
}
