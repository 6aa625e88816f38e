use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Enquiry settings loaded from `~/.config/url-enquiry/config.toml`.
///
/// The defaults set no timeouts of their own; libcurl's apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnquiryConfig {
    /// Connect timeout in seconds (None = libcurl default).
    pub connect_timeout_secs: Option<u64>,
    /// Whole-exchange timeout in seconds (None = no limit).
    pub timeout_secs: Option<u64>,
    /// Follow 3xx redirects and report the final response.
    pub follow_redirects: bool,
    /// Maximum redirects followed before giving up.
    pub max_redirects: u32,
    /// `User-Agent` header; libcurl sends none when unset.
    pub user_agent: Option<String>,
    /// Honour `http_proxy` / `https_proxy` / `no_proxy` from the environment.
    pub use_env_proxy: bool,
    /// Explicit proxy URL (e.g. `http://127.0.0.1:3128`). Takes precedence
    /// over the environment and applies to every host.
    pub proxy: Option<String>,
}

impl Default for EnquiryConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: None,
            timeout_secs: None,
            follow_redirects: true,
            max_redirects: 10,
            user_agent: None,
            use_env_proxy: true,
            proxy: None,
        }
    }
}

impl EnquiryConfig {
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("url-enquiry")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<EnquiryConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = EnquiryConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

/// Load configuration from a specific file. Missing keys take defaults.
pub fn load_from(path: &Path) -> Result<EnquiryConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: EnquiryConfig = toml::from_str(&data)?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(cfg)
}
