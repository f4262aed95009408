//! Bootstrap document assembly for bootcfg.
//!
//! This crate runs the appender pipeline over a base document: node
//! annotations, an optional first-boot pivot marker, and the cluster
//! kubeconfig, in that order. [`server`] wraps the pipeline behind the
//! interface a serving layer calls per request.

pub mod appenders;
pub mod kubeconfig;
pub mod pipeline;
pub mod server;

pub use appenders::{Appender, InitialPivot, Kubeconfig, NodeAnnotations, node_annotations};
pub use kubeconfig::{FileKubeconfig, KubeconfigBundle, KubeconfigSource};
pub use pipeline::{AppendParams, assemble, get_appenders, run};
pub use server::{AssemblingServer, ConfigServer, MachineConfigSource, PoolRequest, RenderedConfig};
