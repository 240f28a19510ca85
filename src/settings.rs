//! Role settings read from a JSON settings file.
//!
//! All three roles share one file layout; each reads only the fields it needs.
//!
//! ```json
//! {
//!     "ServerIPAddress": "127.0.0.1",
//!     "ServerPortNumber": 11111,
//!     "BookHelperIPAddress": "127.0.0.1",
//!     "BookHelperPortNumber": 11112,
//!     "ServerListeningQueue": 5,
//!     "BooksDataFile": "Books.json"
//! }
//! ```
use std::{
    fs, io,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings '{path}': {source}")]
    Read { path: String, source: io::Error },

    #[error("failed to parse settings '{path}': {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("invalid address '{0}'")]
    Address(String),
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(rename = "ServerIPAddress")]
    pub server_ip: String,
    #[serde(rename = "ServerPortNumber")]
    pub server_port: u16,
    #[serde(rename = "BookHelperIPAddress")]
    pub helper_ip: String,
    #[serde(rename = "BookHelperPortNumber")]
    pub helper_port: u16,
    #[serde(rename = "ServerListeningQueue")]
    pub listen_backlog: u32,
    #[serde(rename = "BooksDataFile", default)]
    pub books_data_file: Option<PathBuf>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: display.clone(),
            source,
        })?;

        serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: display,
            source,
        })
    }

    pub fn server_addr(&self) -> Result<SocketAddr, SettingsError> {
        socket_addr(&self.server_ip, self.server_port)
    }

    pub fn helper_addr(&self) -> Result<SocketAddr, SettingsError> {
        socket_addr(&self.helper_ip, self.helper_port)
    }

    /// Configured catalog location, resolved against `base` when relative.
    pub fn catalog_path(&self, base: &Path, default: &Path) -> PathBuf {
        match &self.books_data_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => base.join(path),
            None => default.to_path_buf(),
        }
    }
}

fn socket_addr(ip: &str, port: u16) -> Result<SocketAddr, SettingsError> {
    let ip: IpAddr = ip
        .trim()
        .parse()
        .map_err(|_| SettingsError::Address(ip.to_string()))?;
    Ok(SocketAddr::new(ip, port))
}
