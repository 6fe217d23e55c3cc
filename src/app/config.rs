use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::store::{Backend, MemoryStore, PostgrestStore};

pub const ANON_KEY_ENV: &str = "STOREFRONT_ANON_KEY";

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_rpc_addr() -> String {
    "127.0.0.1:7070".to_string()
}

fn default_max_request_body_size() -> u32 {
    10 * 1024 * 1024
}

fn default_max_response_body_size() -> u32 {
    10 * 1024 * 1024
}

fn default_max_connections() -> u32 {
    100
}

fn default_listings_table() -> String {
    "bgmi_accounts".to_string()
}

fn default_inquiries_table() -> String {
    "purchase_inquiries".to_string()
}

fn default_store_timeout_secs() -> u64 {
    10
}

fn default_auto_close_ms() -> u64 {
    2000
}

fn default_session_ttl_secs() -> u64 {
    1800
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RpcConfig {
    #[serde(default = "default_rpc_addr")]
    pub addr: String,
    #[serde(default = "default_max_request_body_size")]
    pub max_request_body_size: u32,
    #[serde(default = "default_max_response_body_size")]
    pub max_response_body_size: u32,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub batch_request_limit: Option<u32>,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            addr: default_rpc_addr(),
            max_request_body_size: default_max_request_body_size(),
            max_response_body_size: default_max_response_body_size(),
            max_connections: default_max_connections(),
            batch_request_limit: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Postgrest,
    Memory,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub anon_key: Option<String>,
    #[serde(default = "default_listings_table")]
    pub listings_table: String,
    #[serde(default = "default_inquiries_table")]
    pub inquiries_table: String,
    #[serde(default = "default_store_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub fixtures: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            url: None,
            anon_key: None,
            listings_table: default_listings_table(),
            inquiries_table: default_inquiries_table(),
            timeout_secs: default_store_timeout_secs(),
            fixtures: None,
        }
    }
}

impl StoreConfig {
    pub fn build_backend(&self) -> Result<Backend> {
        match self.backend {
            BackendKind::Postgrest => {
                let Some(url) = self.url.as_deref() else {
                    bail!("store.url is required for the postgrest backend");
                };
                let anon_key = std::env::var(ANON_KEY_ENV)
                    .ok()
                    .or_else(|| self.anon_key.clone())
                    .with_context(|| {
                        format!("store.anon_key or {ANON_KEY_ENV} is required for the postgrest backend")
                    })?;
                let store = PostgrestStore::new(
                    url,
                    anon_key,
                    self.listings_table.clone(),
                    self.inquiries_table.clone(),
                    Duration::from_secs(self.timeout_secs),
                )
                .context("build postgrest client")?;
                Ok(Backend::Postgrest(store))
            }
            BackendKind::Memory => {
                let store = match self.fixtures.as_deref() {
                    Some(path) => MemoryStore::from_fixture_file(path)
                        .context("load memory store fixtures")?,
                    None => MemoryStore::default(),
                };
                Ok(Backend::Memory(store))
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorefrontConfig {
    #[serde(default = "default_auto_close_ms")]
    pub auto_close_ms: u64,
    /// Idle lifetime of an inquiry session; `0` keeps sessions until closed.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            auto_close_ms: default_auto_close_ms(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub storefront: StorefrontConfig,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let settings = Settings::from_toml("").expect("settings");
        assert_eq!(settings.rpc.addr, "127.0.0.1:7070");
        assert_eq!(settings.logging.filter, "info");
        assert_eq!(settings.store.backend, BackendKind::Postgrest);
        assert_eq!(settings.store.listings_table, "bgmi_accounts");
        assert_eq!(settings.store.inquiries_table, "purchase_inquiries");
        assert_eq!(settings.storefront.auto_close_ms, 2000);
        assert_eq!(settings.storefront.session_ttl_secs, 1800);
    }

    #[test]
    fn parses_full_config() {
        let raw = r#"
            [logging]
            filter = "storefrontd=debug"

            [rpc]
            addr = "0.0.0.0:9000"
            batch_request_limit = 0

            [store]
            backend = "postgrest"
            url = "https://demo.supabase.co"
            anon_key = "anon"
            timeout_secs = 3

            [storefront]
            auto_close_ms = 500
            session_ttl_secs = 0
        "#;
        let settings = Settings::from_toml(raw).expect("settings");
        assert_eq!(settings.rpc.addr, "0.0.0.0:9000");
        assert_eq!(settings.rpc.batch_request_limit, Some(0));
        assert_eq!(settings.store.url.as_deref(), Some("https://demo.supabase.co"));
        assert_eq!(settings.store.timeout_secs, 3);
        assert_eq!(settings.storefront.auto_close_ms, 500);
        assert_eq!(settings.storefront.session_ttl_secs, 0);
        let backend = settings.store.build_backend().expect("backend");
        assert_eq!(backend.name(), "postgrest");
    }

    #[test]
    fn postgrest_backend_requires_url() {
        let settings = Settings::from_toml("[store]\nanon_key = \"k\"\n").expect("settings");
        let err = settings.store.build_backend().err().expect("error");
        assert!(err.to_string().contains("store.url"));
    }

    #[test]
    fn rejects_unknown_backend() {
        assert!(Settings::from_toml("[store]\nbackend = \"sqlite\"\n").is_err());
    }

    #[test]
    fn memory_backend_loads_fixtures_from_file() {
        let mut fixtures = tempfile::NamedTempFile::new().expect("fixtures");
        fixtures
            .write_all(
                br#"[{"id":"a","title":"Ace main","level":70,"tier":"Ace","price":4999,"status":"available","featured":true}]"#,
            )
            .expect("write fixtures");

        let mut config = tempfile::NamedTempFile::new().expect("config");
        writeln!(
            config,
            "[store]\nbackend = \"memory\"\nfixtures = {:?}\n",
            fixtures.path().display().to_string()
        )
        .expect("write config");

        let settings = Settings::load(config.path()).expect("settings");
        let backend = settings.store.build_backend().expect("backend");
        assert_eq!(backend.name(), "memory");
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Settings::load(&dir.path().join("missing.toml")).expect_err("missing");
        assert!(format!("{err:#}").contains("read config"));
    }
}
