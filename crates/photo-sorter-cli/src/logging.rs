use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;
use env_logger::{Target, WriteStyle};
use log::LevelFilter;

pub const LOG_FILE_NAME: &str = "photo_sorter.log";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Appends every line to the log file and optionally mirrors it to stderr.
struct Tee {
    file: File,
    echo: bool,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_all(buf)?;
        if self.echo {
            io::stderr().write_all(buf).ok();
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Install the process logger: `<timestamp> - <LEVEL> - <message>` lines at
/// info and above, appended to `log_path`. `RUST_LOG` is not consulted.
pub fn init(log_path: &Path, echo: bool) -> anyhow::Result<()> {
    let file = open_log(log_path)?;

    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .write_style(WriteStyle::Never)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format(TIMESTAMP_FORMAT),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(Tee { file, echo })))
        .try_init()
        .context("logger already installed")?;
    Ok(())
}

fn open_log(log_path: &Path) -> anyhow::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("cannot open log file {}", log_path.display()))
}
