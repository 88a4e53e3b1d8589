// Configuration module entry point
// Loads layered configuration and holds shared runtime state

mod state;
mod types;

use std::net::SocketAddr;
use std::time::Duration;

// Re-export public types
pub use state::AppState;
pub use types::{Config, StorageBackend, StorageConfig};

/// Environment variable prefix, e.g. `ITEMS_SERVER__PORT=9000`
const ENV_PREFIX: &str = "ITEMS";

impl Config {
    /// Load configuration from specified file path (extension optional)
    /// A missing file is not an error; defaults and environment still apply
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "item_service")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("storage.backend", "memory")?
            .set_default("storage.sqlite_path", "items.db")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Upper bound on the lifetime of one connection
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(std::cmp::max(
            self.performance.read_timeout,
            self.performance.write_timeout,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("does-not-exist").unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.http.max_body_size, 1_048_576);
        assert_eq!(cfg.storage.sqlite_path, "items.db");
        assert!(cfg.performance.max_connections.is_none());
        assert!(cfg.logging.access_log_file.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9100

[performance]
read_timeout = 5
write_timeout = 12
max_connections = 16

[storage]
backend = "sqlite"
sqlite_path = "/tmp/items-test.db"
"#
        )
        .unwrap();

        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.storage.backend, StorageBackend::Sqlite);
        assert_eq!(cfg.storage.sqlite_path, "/tmp/items-test.db");
        assert_eq!(cfg.performance.max_connections, Some(16));
        assert_eq!(cfg.connection_timeout(), Duration::from_secs(12));
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 9100);
    }

    #[test]
    fn test_invalid_host_is_reported() {
        let mut cfg = Config::load_from("does-not-exist").unwrap();
        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
