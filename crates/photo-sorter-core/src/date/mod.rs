pub mod exif;

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context};
use chrono::{DateTime, Local, NaiveDateTime};

use crate::event::{Event, EventSink};

/// Bytes handed to the metadata reader. Capture tags live near the start of
/// every supported container, so large videos are not read in full.
pub const MAX_METADATA_BYTES: u64 = 32 * 1024 * 1024;

/// Reads an embedded capture time out of raw file bytes.
pub trait CaptureDateSource {
    /// `Ok(None)` means the bytes were understood but carry no original date.
    fn capture_time(&self, bytes: &[u8]) -> anyhow::Result<Option<NaiveDateTime>>;
}

/// Resolve the capture time of `path`: embedded metadata first, then the
/// filesystem modification time. `None` if neither is available.
pub fn resolve_capture_time(
    path: &Path,
    source: &dyn CaptureDateSource,
    max_bytes: u64,
    sink: &dyn EventSink,
) -> Option<NaiveDateTime> {
    match embedded_time(path, source, max_bytes) {
        Ok(date) => return Some(date),
        Err(e) => sink.record(Event::MetadataUnavailable {
            path: path.to_path_buf(),
            reason: format!("{:#}", e),
        }),
    }

    match modified_time(path) {
        Ok(date) => Some(date),
        Err(e) => {
            sink.record(Event::ModifiedTimeUnavailable {
                path: path.to_path_buf(),
                reason: format!("{:#}", e),
            });
            None
        }
    }
}

fn embedded_time(
    path: &Path,
    source: &dyn CaptureDateSource,
    max_bytes: u64,
) -> anyhow::Result<NaiveDateTime> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut bytes = Vec::new();
    file.take(max_bytes)
        .read_to_end(&mut bytes)
        .with_context(|| format!("cannot read {}", path.display()))?;

    source
        .capture_time(&bytes)?
        .ok_or_else(|| anyhow!("no original date/time tag"))
}

/// Last-modified time of `path` as local wall-clock time.
pub fn modified_time(path: &Path) -> anyhow::Result<NaiveDateTime> {
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .with_context(|| format!("cannot stat {}", path.display()))?;
    Ok(DateTime::<Local>::from(modified).naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::MemorySink;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::tempdir;

    /// Treats the file body as an EXIF-style date string.
    struct TextDates;

    impl CaptureDateSource for TextDates {
        fn capture_time(&self, bytes: &[u8]) -> anyhow::Result<Option<NaiveDateTime>> {
            if bytes.is_empty() {
                return Ok(None);
            }
            let text = std::str::from_utf8(bytes)?;
            Ok(Some(NaiveDateTime::parse_from_str(text.trim(), "%Y:%m:%d %H:%M:%S")?))
        }
    }

    fn set_mtime(path: &Path, date: NaiveDateTime) {
        let local = date.and_local_timezone(Local).single().unwrap();
        let ft = filetime::FileTime::from_unix_time(local.timestamp(), 0);
        filetime::set_file_mtime(path, ft).unwrap();
    }

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(12, 30, 0).unwrap()
    }

    #[test]
    fn test_embedded_date_wins_over_mtime() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("IMG_0001.jpg");
        fs::write(&path, "2023:05:10 09:15:00").unwrap();
        set_mtime(&path, at(2020, 1, 1));

        let sink = MemorySink::new();
        let date = resolve_capture_time(&path, &TextDates, MAX_METADATA_BYTES, &sink);

        let expected = NaiveDate::from_ymd_opt(2023, 5, 10).unwrap().and_hms_opt(9, 15, 0).unwrap();
        assert_eq!(date, Some(expected));
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_missing_tag_falls_back_to_mtime() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.mov");
        fs::write(&path, "").unwrap();
        set_mtime(&path, at(2022, 11, 2));

        let sink = MemorySink::new();
        let date = resolve_capture_time(&path, &TextDates, MAX_METADATA_BYTES, &sink);

        assert_eq!(date, Some(at(2022, 11, 2)));
        assert_eq!(sink.count(|e| matches!(e, Event::MetadataUnavailable { .. })), 1);
    }

    #[test]
    fn test_malformed_tag_falls_back_to_mtime() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, "2023-05-10T09:15:00").unwrap();
        set_mtime(&path, at(2021, 7, 4));

        let sink = MemorySink::new();
        let date = resolve_capture_time(&path, &TextDates, MAX_METADATA_BYTES, &sink);
        assert_eq!(date, Some(at(2021, 7, 4)));
    }

    #[test]
    fn test_read_is_bounded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("long.jpg");
        fs::write(&path, "2023:05:10 09:15:00 plus trailing bytes").unwrap();

        let sink = MemorySink::new();
        // Only "2023:05:10 09:15:00" reaches the reader.
        let date = resolve_capture_time(&path, &TextDates, 19, &sink);
        assert_eq!(date.map(|d| d.to_string()), Some("2023-05-10 09:15:00".to_string()));
    }

    #[test]
    fn test_vanished_file_has_no_date() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone.jpg");

        let sink = MemorySink::new();
        assert_eq!(resolve_capture_time(&path, &TextDates, MAX_METADATA_BYTES, &sink), None);
        assert_eq!(sink.count(|e| matches!(e, Event::MetadataUnavailable { .. })), 1);
        assert_eq!(sink.count(|e| matches!(e, Event::ModifiedTimeUnavailable { .. })), 1);
    }
}
