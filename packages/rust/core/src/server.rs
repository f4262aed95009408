//! Config-server facade: resolve a pool's rendered config and assemble the
//! document a booting node receives.
//!
//! Transport, routing and caller authentication live outside this crate.
//! The pool name is passed through to the [`MachineConfigSource`] as-is.

use tracing::{debug, info, instrument};

use bootcfg_shared::{BootcfgError, IgnitionConfig, Result, ServerConfig};

use crate::kubeconfig::{FileKubeconfig, KubeconfigSource};
use crate::pipeline::{AppendParams, assemble};

/// A node's request for its bootstrap document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRequest {
    /// Machine pool the node belongs to (e.g. `worker`).
    pub machine_pool: String,
}

impl PoolRequest {
    pub fn new(machine_pool: impl Into<String>) -> Self {
        Self {
            machine_pool: machine_pool.into(),
        }
    }
}

/// Serves bootstrap documents.
pub trait ConfigServer {
    fn get_config(&self, request: &PoolRequest) -> Result<IgnitionConfig>;
}

/// The config a pool is currently rendered to.
#[derive(Debug, Clone)]
pub struct RenderedConfig {
    /// Rendered config name, recorded in the node annotations.
    pub name: String,
    /// Base document the appenders build on.
    pub config: IgnitionConfig,
}

/// Source of truth for "current machine configuration".
pub trait MachineConfigSource {
    fn current(&self, request: &PoolRequest) -> Result<RenderedConfig>;
}

impl<F> MachineConfigSource for F
where
    F: Fn(&PoolRequest) -> Result<RenderedConfig>,
{
    fn current(&self, request: &PoolRequest) -> Result<RenderedConfig> {
        self(request)
    }
}

// ---------------------------------------------------------------------------
// AssemblingServer
// ---------------------------------------------------------------------------

/// [`ConfigServer`] that runs the standard appenders over the pool's
/// rendered config.
///
/// Holds no per-request state, so one instance can serve concurrent
/// requests when its sources are `Sync`.
pub struct AssemblingServer<S, K> {
    machine_configs: S,
    kubeconfig: K,
    os_image_url: String,
}

impl<S, K> AssemblingServer<S, K>
where
    S: MachineConfigSource,
    K: KubeconfigSource,
{
    pub fn new(machine_configs: S, kubeconfig: K) -> Self {
        Self {
            machine_configs,
            kubeconfig,
            os_image_url: String::new(),
        }
    }

    /// Pivot every served node to `os_image_url` on first boot.
    pub fn with_os_image_url(mut self, os_image_url: impl Into<String>) -> Self {
        self.os_image_url = os_image_url.into();
        self
    }
}

impl<S> AssemblingServer<S, FileKubeconfig>
where
    S: MachineConfigSource,
{
    /// Build a server whose credentials and pivot target come from config.
    pub fn from_config(machine_configs: S, config: &ServerConfig) -> Self {
        Self::new(machine_configs, FileKubeconfig::from(config))
            .with_os_image_url(config.os_image_url.clone())
    }
}

impl<S, K> ConfigServer for AssemblingServer<S, K>
where
    S: MachineConfigSource,
    K: KubeconfigSource,
{
    #[instrument(skip_all, fields(pool = %request.machine_pool))]
    fn get_config(&self, request: &PoolRequest) -> Result<IgnitionConfig> {
        if request.machine_pool.trim().is_empty() {
            return Err(BootcfgError::validation("machine pool name must not be empty"));
        }

        let rendered = self.machine_configs.current(request)?;
        debug!(
            current = %rendered.name,
            base_files = rendered.config.storage.files.len(),
            "resolved rendered config"
        );

        let params = AppendParams {
            current_config: rendered.name,
            os_image_url: self.os_image_url.clone(),
        };
        let config = assemble(rendered.config, &params, &self.kubeconfig)?;

        info!(
            current = %params.current_config,
            files = config.storage.files.len(),
            units = config.systemd.units.len(),
            "assembled bootstrap document"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::kubeconfig::KubeconfigBundle;
    use bootcfg_codec::{append_file, decode_to_string};
    use bootcfg_shared::{INITIAL_NODE_ANNOTATIONS_PATH, KUBECONFIG_PATH, PIVOT_UNIT_NAME};

    fn rendered(request: &PoolRequest) -> Result<RenderedConfig> {
        let mut config = IgnitionConfig::new();
        append_file(&mut config, "/etc/pool", request.machine_pool.as_bytes());
        Ok(RenderedConfig {
            name: format!("rendered-{}-1", request.machine_pool),
            config,
        })
    }

    fn kubeconfig() -> Result<KubeconfigBundle> {
        Ok(KubeconfigBundle {
            kubeconfig: b"KUBECONFIGDATA".to_vec(),
            root_ca: Vec::new(),
        })
    }

    #[test]
    fn serves_assembled_document() {
        let server = AssemblingServer::new(rendered, kubeconfig);
        let config = server.get_config(&PoolRequest::new("worker")).expect("get_config");

        assert_eq!(config.storage.files.len(), 3);
        assert!(config.systemd.units.is_empty());
        let annotations = config
            .find_file(INITIAL_NODE_ANNOTATIONS_PATH)
            .expect("annotations");
        assert!(
            decode_to_string(&annotations.contents.source)
                .expect("decode")
                .contains("rendered-worker-1")
        );
    }

    #[test]
    fn pivot_target_adds_unit() {
        let server =
            AssemblingServer::new(rendered, kubeconfig).with_os_image_url("quay.io/img:v2");
        let config = server.get_config(&PoolRequest::new("master")).expect("get_config");

        assert_eq!(config.storage.files.len(), 4);
        assert!(config.find_unit(PIVOT_UNIT_NAME).is_some());
    }

    #[test]
    fn empty_pool_rejected() {
        let server = AssemblingServer::new(rendered, kubeconfig);
        let err = server.get_config(&PoolRequest::new(" ")).unwrap_err();
        assert!(matches!(err, BootcfgError::Validation { .. }));
    }

    #[test]
    fn source_errors_propagate() {
        let unknown = |req: &PoolRequest| -> Result<RenderedConfig> {
            Err(BootcfgError::validation(format!("unknown pool {}", req.machine_pool)))
        };
        let server = AssemblingServer::new(unknown, kubeconfig);
        let err = server.get_config(&PoolRequest::new("infra")).unwrap_err();
        assert_eq!(err.to_string(), "validation error: unknown pool infra");
    }

    #[test]
    fn from_config_reads_kubeconfig_file() {
        let dir = std::env::temp_dir().join(format!(
            "bootcfg-server-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let kc_path: PathBuf = dir.join("kubeconfig");
        std::fs::write(&kc_path, "apiVersion: v1\n").unwrap();

        let server_config = ServerConfig {
            kubeconfig_path: kc_path.display().to_string(),
            root_ca_path: None,
            os_image_url: String::new(),
        };
        let server = AssemblingServer::from_config(rendered, &server_config);
        let config = server.get_config(&PoolRequest::new("worker")).expect("get_config");

        let kc = config.find_file(KUBECONFIG_PATH).expect("kubeconfig");
        assert_eq!(decode_to_string(&kc.contents.source).expect("decode"), "apiVersion: v1\n");

        std::fs::remove_dir_all(&dir).ok();
    }
}
