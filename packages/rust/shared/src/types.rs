//! Bootstrap document types and the well-known constants of its contract.
//!
//! Only the subset of the Ignition schema that bootcfg writes is modeled.
//! Field names follow the Ignition 3.0 JSON layout so a serving layer can
//! hand the value straight to `serde_json`.

use serde::{Deserialize, Serialize};

/// Ignition spec version stamped on every document.
pub const IGNITION_VERSION: &str = "3.0.0";

/// Default permission bits for embedded files (`0644`, 420 decimal).
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Where the node reads its initial annotations on first boot.
pub const INITIAL_NODE_ANNOTATIONS_PATH: &str = "/etc/machine-config-daemon/node-annotations.json";

/// Default location of the kubelet kubeconfig on the node.
pub const KUBECONFIG_PATH: &str = "/etc/kubernetes/kubeconfig";

/// File read by `pivot.service` to learn the OS image to pivot to.
pub const PIVOT_TARGET_PATH: &str = "/etc/pivot/image-pullspec";

/// Marker telling pivot that a reboot is required after the upgrade.
pub const PIVOT_REBOOT_NEEDED_PATH: &str = "/run/pivot/reboot-needed";

/// Name of the one-shot unit that writes [`PIVOT_REBOOT_NEEDED_PATH`].
pub const PIVOT_UNIT_NAME: &str = "mcd-write-pivot-reboot.service";

/// Annotation key holding the config the node currently runs.
pub const CURRENT_CONFIG_ANNOTATION: &str = "machineconfiguration.openshift.io/currentConfig";

/// Annotation key holding the config the node should converge to.
pub const DESIRED_CONFIG_ANNOTATION: &str = "machineconfiguration.openshift.io/desiredConfig";

/// Annotation key holding the daemon state.
pub const DAEMON_STATE_ANNOTATION: &str = "machineconfiguration.openshift.io/state";

/// Daemon state value for a node that has nothing left to apply.
pub const DAEMON_STATE_DONE: &str = "Done";

// ---------------------------------------------------------------------------
// IgnitionConfig
// ---------------------------------------------------------------------------

/// The aggregate bootstrap document.
///
/// Collections start empty, so appenders can push without checking whether
/// a section exists yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnitionConfig {
    /// Schema metadata. Set at construction and never rewritten.
    pub ignition: Ignition,
    /// Files to write on first boot.
    #[serde(default, skip_serializing_if = "Storage::is_empty")]
    pub storage: Storage,
    /// Systemd units to install.
    #[serde(default, skip_serializing_if = "Systemd::is_empty")]
    pub systemd: Systemd,
}

impl IgnitionConfig {
    /// An empty document stamped with [`IGNITION_VERSION`].
    pub fn new() -> Self {
        Self {
            ignition: Ignition {
                version: IGNITION_VERSION.to_string(),
            },
            storage: Storage::default(),
            systemd: Systemd::default(),
        }
    }

    /// The entry a node would end up with for `path`. Later entries win.
    pub fn find_file(&self, path: &str) -> Option<&File> {
        self.storage.files.iter().rev().find(|f| f.path == path)
    }

    /// The last unit registered under `name`.
    pub fn find_unit(&self, name: &str) -> Option<&Unit> {
        self.systemd.units.iter().rev().find(|u| u.name == name)
    }
}

impl Default for IgnitionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The `ignition` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ignition {
    pub version: String,
}

/// The `storage` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storage {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<File>,
}

impl Storage {
    fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// The `systemd` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Systemd {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub units: Vec<Unit>,
}

impl Systemd {
    fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

// ---------------------------------------------------------------------------
// File / Unit
// ---------------------------------------------------------------------------

/// A file materialized on the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// Absolute path on the node.
    pub path: String,
    /// Inline contents.
    pub contents: FileContents,
    /// Permission bits.
    #[serde(default = "default_mode")]
    pub mode: u32,
}

fn default_mode() -> u32 {
    DEFAULT_FILE_MODE
}

/// Contents of a [`File`], carried as an RFC 2397 `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContents {
    pub source: String,
}

/// A systemd unit with literal contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub contents: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_config_is_empty_and_versioned() {
        let config = IgnitionConfig::new();
        assert_eq!(config.ignition.version, "3.0.0");
        assert!(config.storage.files.is_empty());
        assert!(config.systemd.units.is_empty());
    }

    #[test]
    fn empty_sections_are_omitted() {
        let json = serde_json::to_string(&IgnitionConfig::new()).expect("serialize");
        assert_eq!(json, r#"{"ignition":{"version":"3.0.0"}}"#);
    }

    #[test]
    fn ignition_field_layout() {
        let mut config = IgnitionConfig::new();
        config.storage.files.push(File {
            path: "/etc/motd".into(),
            contents: FileContents {
                source: "data:,hello".into(),
            },
            mode: DEFAULT_FILE_MODE,
        });
        config.systemd.units.push(Unit {
            name: "hello.service".into(),
            enabled: true,
            contents: "[Unit]\n".into(),
        });

        let value = serde_json::to_value(&config).expect("serialize");
        assert_eq!(value["storage"]["files"][0]["contents"]["source"], "data:,hello");
        assert_eq!(value["storage"]["files"][0]["mode"], 420);
        assert_eq!(value["systemd"]["units"][0]["enabled"], true);

        let parsed: IgnitionConfig = serde_json::from_value(value).expect("deserialize");
        assert_eq!(parsed, config);
    }

    #[test]
    fn missing_mode_defaults_to_0644() {
        let json = r#"{"path":"/etc/hosts","contents":{"source":"data:,"}}"#;
        let file: File = serde_json::from_str(json).expect("deserialize");
        assert_eq!(file.mode, 0o644);
    }

    #[test]
    fn find_file_prefers_last_write() {
        let mut config = IgnitionConfig::new();
        for source in ["data:,first", "data:,second"] {
            config.storage.files.push(File {
                path: "/etc/dup".into(),
                contents: FileContents {
                    source: source.into(),
                },
                mode: DEFAULT_FILE_MODE,
            });
        }
        let found = config.find_file("/etc/dup").expect("file present");
        assert_eq!(found.contents.source, "data:,second");
        assert!(config.find_file("/etc/other").is_none());
        assert!(config.find_unit("none.service").is_none());
    }
}
