//! Logger module
//!
//! Provides logging utilities for the item service including:
//! - Server and store lifecycle logging
//! - Access logging with multiple formats
//! - Leveled error, warning and debug logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;
use std::str::FromStr;

/// Log severity, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

impl Level {
    /// Whether a line at `level` passes a filter set to `self`
    pub fn allows(self, level: Self) -> bool {
        level <= self
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" | "trace" => Ok(Self::Debug),
            other => Err(format!("Unknown log level: {other}")),
        }
    }
}

/// Initialize the logger with configuration
///
/// Should be called once at application startup. An unknown level falls
/// back to `info` with a warning.
pub fn init(config: &Config) -> std::io::Result<()> {
    let level = config.logging.level.parse::<Level>();
    writer::init(
        level.clone().unwrap_or(Level::Info),
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )?;
    if let Err(e) = level {
        log_warning(&format!("{e}, using info"));
    }
    Ok(())
}

fn write(level: Level, message: &str) {
    match writer::get() {
        Some(writer) => writer.write(level, message),
        // Not initialized (tests): info and below to stdout, the rest to stderr
        None => match level {
            Level::Error | Level::Warn => eprintln!("{message}"),
            Level::Info => println!("{message}"),
            Level::Debug => {}
        },
    }
}

fn write_access(message: &str) {
    match writer::get() {
        Some(writer) => writer.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write(Level::Info, "======================================");
    write(Level::Info, "Item service started");
    write(Level::Info, &format!("Listening on: http://{addr}"));
    write(Level::Info, &format!("Log level: {}", config.logging.level));
    if let Some(ref path) = config.logging.access_log_file {
        write(Level::Info, &format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write(Level::Info, &format!("Error log: {path}"));
    }
    if let Some(max) = config.performance.max_connections {
        write(Level::Info, &format!("Max connections: {max}"));
    }
    write(Level::Info, "  - GET    /items");
    write(Level::Info, "  - POST   /items");
    write(Level::Info, "  - GET    /items/:id");
    write(Level::Info, "  - PUT    /items/:id");
    write(Level::Info, "  - DELETE /items/:id");
    write(Level::Info, "======================================\n");
}

pub fn log_store_opened(backend: &str, location: &str) {
    write(Level::Info, &format!("[Store] Opened {backend} store ({location})"));
}

pub fn log_store_disposed(backend: &str) {
    write(Level::Info, &format!("[Store] Disposed {backend} store"));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write(Level::Debug, &format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write(Level::Error, &format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_shutdown(signal: &str) {
    write(Level::Info, &format!("\n[Shutdown] {signal} received, stopping server"));
}

pub fn log_server_stopped() {
    write(Level::Info, "[Shutdown] Listener closed");
}

pub fn log_error(message: &str) {
    write(Level::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write(Level::Warn, &format!("[WARN] {message}"));
}

pub fn log_debug(message: &str) {
    write(Level::Debug, &format!("[DEBUG] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
