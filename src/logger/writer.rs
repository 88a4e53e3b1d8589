//! Log writer module
//!
//! Process-wide sink for info/access lines and error lines. Either side goes
//! to a file when configured, otherwise to stdout/stderr.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use super::Level;

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Log output target
enum LogTarget {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

impl LogTarget {
    /// Open `path` for appending, or fall back to a console stream
    fn open(path: Option<&str>, console: Self) -> io::Result<Self> {
        match path {
            Some(path) => Ok(Self::File(Mutex::new(open_log_file(path)?))),
            None => Ok(console),
        }
    }

    fn write_line(&self, message: &str) {
        match self {
            Self::Stdout => println!("{message}"),
            Self::Stderr => eprintln!("{message}"),
            Self::File(file) => {
                if let Ok(mut f) = file.lock() {
                    let _ = writeln!(f, "{message}");
                }
            }
        }
    }
}

/// Leveled log writer
pub struct LogWriter {
    level: Level,
    /// Info and access lines
    info: LogTarget,
    /// Warnings and errors
    error: LogTarget,
}

impl LogWriter {
    fn new(level: Level, info_file: Option<&str>, error_file: Option<&str>) -> io::Result<Self> {
        Ok(Self {
            level,
            info: LogTarget::open(info_file, LogTarget::Stdout)?,
            error: LogTarget::open(error_file, LogTarget::Stderr)?,
        })
    }

    /// Route a line to the target matching its level, if the level is enabled
    pub fn write(&self, level: Level, message: &str) {
        if !self.level.allows(level) {
            return;
        }
        match level {
            Level::Error | Level::Warn => self.error.write_line(message),
            Level::Info | Level::Debug => self.info.write_line(message),
        }
    }

    /// Access lines bypass level filtering; they are switched by `access_log`
    pub fn write_access(&self, message: &str) {
        self.info.write_line(message);
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the global log writer
///
/// Must be called at most once. Returns error if log files cannot be opened.
pub fn init(level: Level, info_file: Option<&str>, error_file: Option<&str>) -> io::Result<()> {
    let writer = LogWriter::new(level, info_file, error_file)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// The global writer, if `init` has run
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}
