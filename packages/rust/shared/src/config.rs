//! Server configuration for bootcfg.
//!
//! Config lives in a TOML file whose location is chosen by the host process.
//! Missing keys fall back to defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BootcfgError, Result};

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Settings for the document-serving side.
    #[serde(default)]
    pub server: ServerConfig,
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Kubeconfig embedded into every served document.
    #[serde(default = "default_kubeconfig_path")]
    pub kubeconfig_path: String,

    /// Cluster root CA. Read alongside the kubeconfig but not embedded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_ca_path: Option<String>,

    /// OS image to pivot to on first boot. Empty disables the pivot marker.
    #[serde(default)]
    pub os_image_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            kubeconfig_path: default_kubeconfig_path(),
            root_ca_path: None,
            os_image_url: String::new(),
        }
    }
}

fn default_kubeconfig_path() -> String {
    "/etc/mcs/kubeconfig".into()
}

impl AppConfig {
    /// Reject configs that cannot serve a document.
    pub fn validate(&self) -> Result<()> {
        if self.server.kubeconfig_path.trim().is_empty() {
            return Err(BootcfgError::config("server.kubeconfig_path must not be empty"));
        }
        if matches!(&self.server.root_ca_path, Some(p) if p.trim().is_empty()) {
            return Err(BootcfgError::config(
                "server.root_ca_path must be omitted or non-empty",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the config at `path`. Returns defaults if the file does not exist.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(path)
}

/// Load and validate the config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| BootcfgError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        BootcfgError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;

    tracing::debug!(?path, kubeconfig = %config.server.kubeconfig_path, "loaded config");
    Ok(config)
}
