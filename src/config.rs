// Configuration module
// Layered load: built-in defaults, optional config file, environment.

use std::net::SocketAddr;

use serde::Deserialize;

use crate::error::Error;
use crate::http::body::FileServer;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub files: FilesConfig,
    pub logging: LoggingConfig,
}

/// Address the embedding reactor binds; carried here as data only.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Static file serving configuration
#[derive(Debug, Deserialize, Clone)]
pub struct FilesConfig {
    /// Document root static files are resolved against
    pub root: String,
    /// Canned error document served when a file cannot be read
    pub error_page: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
}

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("SERVER"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("files.root", ".")?
            .set_default("files.error_page", "500.html")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Build the file-backed body provider from the `files` section.
    ///
    /// Fails when the error page is unreadable; call before accepting
    /// connections so a broken deployment aborts at startup, not
    /// per-request.
    pub fn file_server(&self) -> Result<FileServer, Error> {
        FileServer::new(&self.files.root, &self.files.error_page)
    }
}
