//! Shared types, error model, and configuration for bootcfg.
//!
//! This crate is the foundation depended on by all other bootcfg crates.
//! It provides:
//! - [`BootcfgError`] — the unified error type
//! - The bootstrap document model ([`IgnitionConfig`], [`File`], [`Unit`])
//!   and the well-known paths and names that form its external contract
//! - Configuration ([`AppConfig`], [`ServerConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{AppConfig, ServerConfig, load_config, load_config_from};
pub use error::{BootcfgError, Result};
pub use types::{
    CURRENT_CONFIG_ANNOTATION, DAEMON_STATE_ANNOTATION, DAEMON_STATE_DONE, DEFAULT_FILE_MODE,
    DESIRED_CONFIG_ANNOTATION, File, FileContents, IGNITION_VERSION, INITIAL_NODE_ANNOTATIONS_PATH,
    Ignition, IgnitionConfig, KUBECONFIG_PATH, PIVOT_REBOOT_NEEDED_PATH, PIVOT_TARGET_PATH,
    PIVOT_UNIT_NAME, Storage, Systemd, Unit,
};
