//! Content-injection steps applied to a bootstrap document.
//!
//! Each appender owns exactly one slice of the document (a file, or a file
//! plus a unit) and knows nothing about the others.

use std::collections::BTreeMap;

use bootcfg_codec::append_file;
use bootcfg_shared::{
    BootcfgError, CURRENT_CONFIG_ANNOTATION, DAEMON_STATE_ANNOTATION, DAEMON_STATE_DONE,
    DESIRED_CONFIG_ANNOTATION, INITIAL_NODE_ANNOTATIONS_PATH, IgnitionConfig, KUBECONFIG_PATH,
    PIVOT_TARGET_PATH, PIVOT_UNIT_NAME, Result, Unit,
};

use crate::kubeconfig::KubeconfigSource;

/// Literal body of [`PIVOT_UNIT_NAME`].
///
/// Ignition writes files under `/run` to the real root rather than the tmpfs
/// mounted there at boot, so the reboot marker has to come from a unit.
pub const PIVOT_UNIT_CONTENTS: &str = "[Unit]
Before=pivot.service
ConditionFirstBoot=true
[Service]
Type=oneshot
ExecStart=/bin/sh -c 'mkdir /run/pivot && touch /run/pivot/reboot-needed'
[Install]
WantedBy=multi-user.target
";

/// One step of the document pipeline.
pub trait Appender {
    /// Stable label identifying the step to callers and in diagnostics.
    /// The pipeline itself never reads it.
    fn name(&self) -> &str;

    /// Add this step's contribution to `config`.
    fn append(&self, config: &mut IgnitionConfig) -> Result<()>;
}

impl<F> Appender for F
where
    F: Fn(&mut IgnitionConfig) -> Result<()>,
{
    fn name(&self) -> &str {
        "anonymous"
    }

    fn append(&self, config: &mut IgnitionConfig) -> Result<()> {
        self(config)
    }
}

// ---------------------------------------------------------------------------
// Node annotations
// ---------------------------------------------------------------------------

/// Seeds the node's annotations so the daemon starts out converged on
/// `current_config`.
#[derive(Debug, Clone, Copy)]
pub struct NodeAnnotations<'a> {
    pub current_config: &'a str,
}

impl Appender for NodeAnnotations<'_> {
    fn name(&self) -> &str {
        "node-annotations"
    }

    fn append(&self, config: &mut IgnitionConfig) -> Result<()> {
        let annotations = node_annotations(self.current_config)?;
        append_file(config, INITIAL_NODE_ANNOTATIONS_PATH, &annotations);
        Ok(())
    }
}

/// JSON payload for [`INITIAL_NODE_ANNOTATIONS_PATH`]. Keys are sorted, so
/// the output is byte-stable for a given config name.
pub fn node_annotations(current_config: &str) -> Result<Vec<u8>> {
    let annotations = BTreeMap::from([
        (CURRENT_CONFIG_ANNOTATION, current_config),
        (DESIRED_CONFIG_ANNOTATION, current_config),
        (DAEMON_STATE_ANNOTATION, DAEMON_STATE_DONE),
    ]);
    serde_json::to_vec(&annotations).map_err(|e| {
        BootcfgError::serialization(format!("could not marshal node annotations: {e}"))
    })
}

// ---------------------------------------------------------------------------
// Initial pivot
// ---------------------------------------------------------------------------

/// Points first boot at a new OS image. Does nothing when `os_image_url` is
/// empty.
#[derive(Debug, Clone, Copy)]
pub struct InitialPivot<'a> {
    pub os_image_url: &'a str,
}

impl Appender for InitialPivot<'_> {
    fn name(&self) -> &str {
        "initial-pivot"
    }

    fn append(&self, config: &mut IgnitionConfig) -> Result<()> {
        if self.os_image_url.is_empty() {
            return Ok(());
        }

        let target = format!("{}\n", self.os_image_url);
        append_file(config, PIVOT_TARGET_PATH, target.as_bytes());
        config.systemd.units.push(Unit {
            name: PIVOT_UNIT_NAME.to_string(),
            enabled: true,
            contents: PIVOT_UNIT_CONTENTS.to_string(),
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Kubeconfig
// ---------------------------------------------------------------------------

/// Embeds the kubeconfig returned by `source` at [`KUBECONFIG_PATH`].
pub struct Kubeconfig<'a> {
    pub source: &'a dyn KubeconfigSource,
}

impl Appender for Kubeconfig<'_> {
    fn name(&self) -> &str {
        "kubeconfig"
    }

    fn append(&self, config: &mut IgnitionConfig) -> Result<()> {
        let bundle = self.source.fetch()?;
        append_file(config, KUBECONFIG_PATH, &bundle.kubeconfig);
        Ok(())
    }
}
