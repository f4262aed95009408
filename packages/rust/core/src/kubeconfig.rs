//! Credential sources for the kubeconfig appender.
//!
//! The appender only sees [`KubeconfigSource`]; where the bytes come from is
//! the caller's business. [`FileKubeconfig`] covers the common case of
//! credentials already rendered to disk.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use bootcfg_shared::{BootcfgError, Result, ServerConfig};

/// Payloads returned by a credential source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KubeconfigBundle {
    /// Embedded into the document.
    pub kubeconfig: Vec<u8>,
    /// Cluster root CA. Returned by sources but not embedded by any appender.
    pub root_ca: Vec<u8>,
}

/// Fetches the kubeconfig served to a booting node.
///
/// Calls may block on I/O. No timeout is applied by bootcfg.
pub trait KubeconfigSource {
    fn fetch(&self) -> Result<KubeconfigBundle>;
}

impl<F> KubeconfigSource for F
where
    F: Fn() -> Result<KubeconfigBundle>,
{
    fn fetch(&self) -> Result<KubeconfigBundle> {
        self()
    }
}

// ---------------------------------------------------------------------------
// FileKubeconfig
// ---------------------------------------------------------------------------

/// Reads the kubeconfig (and optionally the root CA) from local files on
/// every fetch.
#[derive(Debug, Clone)]
pub struct FileKubeconfig {
    pub kubeconfig_path: PathBuf,
    pub root_ca_path: Option<PathBuf>,
}

impl FileKubeconfig {
    pub fn new(kubeconfig_path: impl Into<PathBuf>) -> Self {
        Self {
            kubeconfig_path: kubeconfig_path.into(),
            root_ca_path: None,
        }
    }

    pub fn with_root_ca(mut self, root_ca_path: impl Into<PathBuf>) -> Self {
        self.root_ca_path = Some(root_ca_path.into());
        self
    }
}

impl From<&ServerConfig> for FileKubeconfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            kubeconfig_path: PathBuf::from(&config.kubeconfig_path),
            root_ca_path: config.root_ca_path.as_ref().map(PathBuf::from),
        }
    }
}

impl KubeconfigSource for FileKubeconfig {
    #[instrument(skip(self), fields(path = %self.kubeconfig_path.display()))]
    fn fetch(&self) -> Result<KubeconfigBundle> {
        let kubeconfig = read(&self.kubeconfig_path)?;
        let root_ca = match &self.root_ca_path {
            Some(path) => read(path)?,
            None => Vec::new(),
        };

        debug!(
            kubeconfig_len = kubeconfig.len(),
            root_ca_len = root_ca.len(),
            "read kubeconfig bundle"
        );
        Ok(KubeconfigBundle {
            kubeconfig,
            root_ca,
        })
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| BootcfgError::retrieval(format!("could not read {}: {e}", path.display())))
}
