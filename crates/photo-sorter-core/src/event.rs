use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;

use log::Level;

/// Something worth telling the user about while sorting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A file reached its final destination.
    Moved { from: PathBuf, to: PathBuf },
    /// Rename crossed a filesystem boundary and fell back to copy+delete.
    CopiedAcrossDevices { from: PathBuf, to: PathBuf },
    SkippedUnknownExtension(PathBuf),
    /// Embedded capture metadata could not be used; the modification time is tried next.
    MetadataUnavailable { path: PathBuf, reason: String },
    ModifiedTimeUnavailable { path: PathBuf, reason: String },
    /// Neither source produced a date; the file stays where it is.
    NoDate(PathBuf),
    MoveFailed { path: PathBuf, reason: String },
    DirectoryRemoved(PathBuf),
    DirectoryRemoveFailed { path: PathBuf, reason: String },
    SourceMissing(PathBuf),
    /// An entry the walker could not read.
    WalkFailed { reason: String },
}

impl Event {
    pub fn level(&self) -> Level {
        match self {
            Event::Moved { .. }
            | Event::SkippedUnknownExtension(_)
            | Event::DirectoryRemoved(_) => Level::Info,
            Event::CopiedAcrossDevices { .. } => Level::Debug,
            Event::MetadataUnavailable { .. }
            | Event::NoDate(_)
            | Event::DirectoryRemoveFailed { .. }
            | Event::SourceMissing(_)
            | Event::WalkFailed { .. } => Level::Warn,
            Event::ModifiedTimeUnavailable { .. } | Event::MoveFailed { .. } => Level::Error,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Moved { from, to } => write!(f, "Moved: {} -> {}", from.display(), to.display()),
            Event::CopiedAcrossDevices { from, to } => write!(
                f,
                "Rename not possible, copied instead: {} -> {}",
                from.display(),
                to.display()
            ),
            Event::SkippedUnknownExtension(path) => {
                write!(f, "Skipped file with unknown extension: {}", path.display())
            }
            Event::MetadataUnavailable { path, reason } => {
                write!(f, "Failed to read EXIF data for {}: {}", path.display(), reason)
            }
            Event::ModifiedTimeUnavailable { path, reason } => write!(
                f,
                "Failed to read file modification date for {}: {}",
                path.display(),
                reason
            ),
            Event::NoDate(path) => write!(f, "No date found, file skipped: {}", path.display()),
            Event::MoveFailed { path, reason } => {
                write!(f, "Failed to move {}: {}", path.display(), reason)
            }
            Event::DirectoryRemoved(path) => {
                write!(f, "Removed empty directory: {}", path.display())
            }
            Event::DirectoryRemoveFailed { path, reason } => {
                write!(f, "Failed to remove directory {}: {}", path.display(), reason)
            }
            Event::SourceMissing(path) => {
                write!(f, "Source directory does not exist, skipped: {}", path.display())
            }
            Event::WalkFailed { reason } => write!(f, "Failed to read directory entry: {}", reason),
        }
    }
}

/// Destination for [`Event`]s. Passed explicitly to every step of a run.
pub trait EventSink {
    fn record(&self, event: Event);
}

/// Forwards events to the `log` facade at their own level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn record(&self, event: Event) {
        log::log!(event.level(), "{}", event);
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: RefCell<Vec<Event>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(*e)).count()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_follow_outcome() {
        let p = PathBuf::from("/x/a.jpg");
        assert_eq!(Event::SkippedUnknownExtension(p.clone()).level(), Level::Info);
        assert_eq!(Event::NoDate(p.clone()).level(), Level::Warn);
        assert_eq!(
            Event::MoveFailed { path: p.clone(), reason: "denied".into() }.level(),
            Level::Error
        );
        assert_eq!(
            Event::Moved { from: p.clone(), to: PathBuf::from("/p/2023/05/a.jpg") }.to_string(),
            "Moved: /x/a.jpg -> /p/2023/05/a.jpg"
        );
    }

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.record(Event::SourceMissing(PathBuf::from("/a")));
        sink.record(Event::DirectoryRemoved(PathBuf::from("/b")));
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], Event::DirectoryRemoved(PathBuf::from("/b")));
        assert_eq!(sink.count(|e| matches!(e, Event::SourceMissing(_))), 1);
    }
}
