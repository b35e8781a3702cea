//! Configuration management using the prefer crate for discovery.
//!
//! Two layers:
//! - [`Config`]: the optional config file (TOML, YAML or JSON), every field
//!   optional
//! - [`Settings`]: resolved runtime settings, defaults filled in, relative
//!   paths resolved and environment overrides applied

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::auth::hash_password;
use crate::ocr::OcrBackendType;
use crate::repository::RecordsBackendType;
use crate::storage::{StorageBackendType, DEFAULT_URL_TTL};

/// Default maximum upload size (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Default access token lifetime in minutes (8 hours).
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 480;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_FILENAME: &str = "polyclinic.db";
const BLOBS_SUBDIR: &str = "blobs";

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {format} config {path}: {message}")]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Resolved settings
// ---------------------------------------------------------------------------

/// OCR backend settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrSettings {
    pub backend: OcrBackendType,
    /// Tesseract language code.
    pub language: String,
    pub vision_api_key: Option<String>,
    pub vision_endpoint: Option<String>,
    /// Text returned by the mock backend.
    pub mock_text: Option<String>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            backend: OcrBackendType::default(),
            language: "eng".to_string(),
            vision_api_key: None,
            vision_endpoint: None,
            mock_text: None,
        }
    }
}

/// Blob storage settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    pub backend: StorageBackendType,
    /// Root directory for the local backend.
    pub root: PathBuf,
    /// GCS bucket name.
    pub bucket: Option<String>,
    /// GCS OAuth bearer token.
    pub access_token: Option<String>,
    /// GCS API host override.
    pub api_base: Option<String>,
    /// Key for signed `/files` URLs. Falls back to the JWT secret.
    pub signing_secret: Option<String>,
    pub url_ttl_secs: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackendType::default(),
            root: default_data_dir().join(BLOBS_SUBDIR),
            bucket: None,
            access_token: None,
            api_base: None,
            signing_secret: None,
            url_ttl_secs: DEFAULT_URL_TTL.as_secs(),
        }
    }
}

/// Record store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordsSettings {
    pub backend: RecordsBackendType,
    pub database_path: PathBuf,
}

impl Default for RecordsSettings {
    fn default() -> Self {
        Self {
            backend: RecordsBackendType::default(),
            database_path: default_data_dir().join(DEFAULT_DATABASE_FILENAME),
        }
    }
}

/// A configured login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub username: String,
    /// Lower-case hex SHA-256 of the password (`polyclinic hash-password`).
    pub password_hash: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "admin".to_string()
}

/// Authentication settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    pub jwt_secret: Option<String>,
    pub token_ttl_minutes: i64,
    pub users: Vec<UserEntry>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
            users: Vec::new(),
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Optional frontend served under `/static`.
    pub static_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
    /// External base URL used in signed file links.
    pub public_base_url: Option<String>,
    pub ocr: OcrSettings,
    pub storage: StorageSettings,
    pub records: RecordsSettings,
    pub auth: AuthSettings,
}

/// Default to ~/Documents/polyclinic/, falling back to home then CWD.
fn default_data_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("polyclinic")
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_data_dir(default_data_dir())
    }
}

impl Settings {
    /// Default settings rooted at a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            static_dir: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            public_base_url: None,
            ocr: OcrSettings::default(),
            storage: StorageSettings {
                root: data_dir.join(BLOBS_SUBDIR),
                ..StorageSettings::default()
            },
            records: RecordsSettings {
                database_path: data_dir.join(DEFAULT_DATABASE_FILENAME),
                ..RecordsSettings::default()
            },
            auth: AuthSettings::default(),
            data_dir,
        }
    }

    /// In-memory stores and mock OCR; nothing touches disk or network.
    pub fn mock() -> Self {
        let mut settings = Self::with_data_dir(std::env::temp_dir().join("polyclinic"));
        settings.ocr.backend = OcrBackendType::Mock;
        settings.storage.backend = StorageBackendType::Memory;
        settings.records.backend = RecordsBackendType::Memory;
        settings
    }

    /// Base URL for links back to this server.
    pub fn public_base_url(&self) -> String {
        match &self.public_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                let host = if self.host == "0.0.0.0" || self.host == "::" {
                    "localhost"
                } else {
                    self.host.as_str()
                };
                format!("http://{}:{}", host, self.port)
            }
        }
    }

    /// Ensure directories used by the configured backends exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        if self.storage.backend == StorageBackendType::Local {
            std::fs::create_dir_all(&self.storage.root)?;
        }
        if self.records.backend == RecordsBackendType::Sqlite {
            if let Some(parent) = self.records.database_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Apply environment overrides. `lookup` is `std::env::var` in
    /// production; tests pass a map.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let flag = |name: &str| var(name).is_some_and(|v| is_truthy(&v));

        if let Some(host) = var("HOST") {
            self.host = host;
        }
        if let Some(port) = var("PORT") {
            match port.trim().parse() {
                Ok(port) => self.port = port,
                Err(_) => warn!("Ignoring invalid PORT value: {}", port),
            }
        }
        if let Some(url) = var("PUBLIC_BASE_URL") {
            self.public_base_url = Some(url);
        }

        if let Some(backend) = var("OCR_BACKEND") {
            match OcrBackendType::from_str(&backend) {
                Some(b) => self.ocr.backend = b,
                None => warn!("Ignoring unknown OCR_BACKEND: {}", backend),
            }
        }
        if flag("USE_MOCK_OCR") {
            self.ocr.backend = OcrBackendType::Mock;
        }
        if let Some(key) = var("GOOGLE_VISION_API_KEY") {
            self.ocr.vision_api_key = Some(key);
        }

        if let Some(backend) = var("STORAGE_BACKEND") {
            match StorageBackendType::from_str(&backend) {
                Some(b) => self.storage.backend = b,
                None => warn!("Ignoring unknown STORAGE_BACKEND: {}", backend),
            }
        }
        if flag("USE_MOCK_STORAGE") {
            self.storage.backend = StorageBackendType::Memory;
        }
        if let Some(bucket) = var("GCP_BUCKET_NAME") {
            self.storage.bucket = Some(bucket);
        }
        if let Some(token) = var("GCS_ACCESS_TOKEN") {
            self.storage.access_token = Some(token);
        }

        if let Some(backend) = var("RECORDS_BACKEND") {
            match RecordsBackendType::from_str(&backend) {
                Some(b) => self.records.backend = b,
                None => warn!("Ignoring unknown RECORDS_BACKEND: {}", backend),
            }
        }
        if flag("USE_MOCK_FIRESTORE") {
            self.records.backend = RecordsBackendType::Memory;
        }
        if let Some(path) = var("DATABASE_PATH") {
            self.records.database_path = PathBuf::from(shellexpand::tilde(&path).as_ref());
        }

        if let Some(secret) = var("JWT_SECRET") {
            self.auth.jwt_secret = Some(secret);
        }
        if let Some(password) = var("ADMIN_PASSWORD") {
            let username = var("ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string());
            debug!("Adding user '{}' from environment", username);
            self.auth.users.retain(|u| u.username != username);
            self.auth.users.push(UserEntry {
                username,
                password_hash: hash_password(&password),
                role: default_role(),
            });
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config file
// ---------------------------------------------------------------------------

/// OCR section of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<OcrBackendType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock_text: Option<String>,
}

/// Storage section of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<StorageBackendType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_ttl_hours: Option<u64>,
}

/// Records section of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<RecordsBackendType>,
    /// SQLite database file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

/// Auth section of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_ttl_minutes: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<UserEntry>,
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_upload_bytes: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_base_url: Option<String>,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub records: RecordsConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Discover a `polyclinic` config file in the standard locations.
    /// Falls back to defaults when none is found or it does not parse.
    pub async fn load() -> Self {
        match prefer::load("polyclinic").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        warn!("{}", e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path, parsed by extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_error = |format: &'static str, message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            format,
            message,
        };

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents).map_err(|e| parse_error("TOML", e.to_string()))?,
            "yaml" | "yml" => {
                serde_yaml::from_str(&contents).map_err(|e| parse_error("YAML", e.to_string()))?
            }
            _ => serde_json::from_str(&contents).map_err(|e| parse_error("JSON", e.to_string()))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Directory of the config file, for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved against `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Build settings from this file's values on top of defaults.
    pub fn to_settings(&self, base_dir: &Path) -> Settings {
        let mut settings = match &self.data_dir {
            Some(dir) => Settings::with_data_dir(self.resolve_path(dir, base_dir)),
            None => Settings::default(),
        };

        if let Some(host) = &self.host {
            settings.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        settings.static_dir = self
            .static_dir
            .as_ref()
            .map(|dir| self.resolve_path(dir, base_dir));
        if let Some(max) = self.max_upload_bytes {
            settings.max_upload_bytes = max;
        }
        settings.public_base_url = self.public_base_url.clone();

        let ocr = &self.ocr;
        if let Some(backend) = ocr.backend {
            settings.ocr.backend = backend;
        }
        if let Some(language) = &ocr.language {
            settings.ocr.language = language.clone();
        }
        settings.ocr.vision_api_key = ocr.vision_api_key.clone();
        settings.ocr.vision_endpoint = ocr.vision_endpoint.clone();
        settings.ocr.mock_text = ocr.mock_text.clone();

        let storage = &self.storage;
        if let Some(backend) = storage.backend {
            settings.storage.backend = backend;
        }
        if let Some(root) = &storage.root {
            settings.storage.root = self.resolve_path(root, base_dir);
        }
        settings.storage.bucket = storage.bucket.clone();
        settings.storage.access_token = storage.access_token.clone();
        settings.storage.api_base = storage.api_base.clone();
        settings.storage.signing_secret = storage.signing_secret.clone();
        if let Some(hours) = storage.url_ttl_hours {
            settings.storage.url_ttl_secs = hours * 3600;
        }

        if let Some(backend) = self.records.backend {
            settings.records.backend = backend;
        }
        if let Some(database) = &self.records.database {
            settings.records.database_path = self.resolve_path(database, base_dir);
        }

        settings.auth.jwt_secret = self.auth.jwt_secret.clone();
        if let Some(ttl) = self.auth.token_ttl_minutes {
            settings.auth.token_ttl_minutes = ttl;
        }
        settings.auth.users = self.auth.users.clone();

        settings
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file (`--config`).
    pub config_path: Option<PathBuf>,
}

/// Load settings: config file (explicit or discovered), then environment.
///
/// An explicit `--config` that cannot be read or parsed is an error; a
/// discovered one that fails is logged and skipped.
pub async fn load_settings(options: &LoadOptions) -> Result<Settings, ConfigError> {
    let config = match &options.config_path {
        Some(path) => Config::load_from_path(path).await?,
        None => Config::load().await,
    };
    if let Some(path) = &config.source_path {
        debug!("Loaded config from {}", path.display());
    }

    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut settings = config.to_settings(&base_dir);
    settings.apply_env(|name| std::env::var(name).ok());
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::with_data_dir(PathBuf::from("/srv/rx"));
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(settings.storage.root, PathBuf::from("/srv/rx/blobs"));
        assert_eq!(settings.records.database_path, PathBuf::from("/srv/rx/polyclinic.db"));
        assert_eq!(settings.auth.token_ttl_minutes, 480);
        assert_eq!(settings.storage.url_ttl_secs, 7 * 24 * 3600);
        assert_eq!(settings.public_base_url(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_load_toml_resolves_relative_paths() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("polyclinic.toml");
        std::fs::write(
            &path,
            r#"
port = 9000
data_dir = "data"

[ocr]
backend = "mock"

[storage]
backend = "gcs"
bucket = "rx-bucket"

[records]
database = "records.db"

[[auth.users]]
username = "doc"
password_hash = "abc"
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        let settings = config.to_settings(&config.base_dir().unwrap());
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.data_dir, dir.path().join("data"));
        assert_eq!(settings.ocr.backend, OcrBackendType::Mock);
        assert_eq!(settings.storage.backend, StorageBackendType::Gcs);
        assert_eq!(settings.storage.bucket.as_deref(), Some("rx-bucket"));
        assert_eq!(settings.records.database_path, dir.path().join("records.db"));
        assert_eq!(settings.auth.users[0].role, "admin");
    }

    #[tokio::test]
    async fn test_load_yaml_and_json() {
        let dir = TempDir::new().unwrap();
        let yaml = dir.path().join("c.yaml");
        std::fs::write(&yaml, "host: 127.0.0.1\nrecords:\n  backend: memory\n").unwrap();
        let config = Config::load_from_path(&yaml).await.unwrap();
        assert_eq!(config.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(config.records.backend, Some(RecordsBackendType::Memory));

        let json = dir.path().join("c.json");
        std::fs::write(&json, r#"{"max_upload_bytes": 1024}"#).unwrap();
        let config = Config::load_from_path(&json).await.unwrap();
        assert_eq!(config.max_upload_bytes, Some(1024));
    }

    #[tokio::test]
    async fn test_parse_error_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "port = \"not a number\"").unwrap();
        let err = Config::load_from_path(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: "TOML", .. }));

        let missing = Config::load_from_path(&dir.path().join("none.toml")).await.unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::with_data_dir(PathBuf::from("/data"));
        settings.apply_env(env(&[
            ("PORT", "9090"),
            ("USE_MOCK_OCR", "true"),
            ("USE_MOCK_STORAGE", "1"),
            ("USE_MOCK_FIRESTORE", "yes"),
            ("GCP_BUCKET_NAME", "bucket"),
            ("JWT_SECRET", "s3cret"),
            ("ADMIN_USERNAME", "root"),
            ("ADMIN_PASSWORD", "pw"),
        ]));

        assert_eq!(settings.port, 9090);
        assert_eq!(settings.ocr.backend, OcrBackendType::Mock);
        assert_eq!(settings.storage.backend, StorageBackendType::Memory);
        assert_eq!(settings.records.backend, RecordsBackendType::Memory);
        assert_eq!(settings.storage.bucket.as_deref(), Some("bucket"));
        assert_eq!(settings.auth.jwt_secret.as_deref(), Some("s3cret"));
        assert_eq!(settings.auth.users.len(), 1);
        assert_eq!(settings.auth.users[0].username, "root");
        assert_eq!(settings.auth.users[0].password_hash, hash_password("pw"));
    }

    #[test]
    fn test_env_invalid_values_ignored() {
        let mut settings = Settings::with_data_dir(PathBuf::from("/data"));
        settings.apply_env(env(&[
            ("PORT", "eighty"),
            ("OCR_BACKEND", "paddle"),
            ("USE_MOCK_OCR", "false"),
            ("HOST", " "),
        ]));
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.ocr.backend, OcrBackendType::Tesseract);
    }

    #[test]
    fn test_env_backend_names() {
        let mut settings = Settings::with_data_dir(PathBuf::from("/data"));
        settings.apply_env(env(&[
            ("OCR_BACKEND", "vision"),
            ("STORAGE_BACKEND", "gcs"),
            ("RECORDS_BACKEND", "memory"),
            ("PUBLIC_BASE_URL", "https://rx.example.org/"),
        ]));
        assert_eq!(settings.ocr.backend, OcrBackendType::Vision);
        assert_eq!(settings.storage.backend, StorageBackendType::Gcs);
        assert_eq!(settings.records.backend, RecordsBackendType::Memory);
        assert_eq!(settings.public_base_url(), "https://rx.example.org");
    }

    #[test]
    fn test_mock_settings() {
        let settings = Settings::mock();
        assert_eq!(settings.ocr.backend, OcrBackendType::Mock);
        assert_eq!(settings.storage.backend, StorageBackendType::Memory);
        assert_eq!(settings.records.backend, RecordsBackendType::Memory);
    }
}
