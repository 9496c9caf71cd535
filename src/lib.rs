//! Index/alias drift monitor.
//!
//! Declared resource names are derived from fixture files (`mapping`), folded into a
//! desired state, and classified against what a live search cluster reports (`core`).
//! The surrounding modules are the collaborators: fixture discovery and decoding,
//! the cluster transport, report rendering and delivery.

pub mod cluster;
pub mod config;
pub mod core;
pub mod mapping;
pub mod monitor;
pub mod notify;
pub mod report;
pub mod source;

pub use crate::config::{ConfigError, MonitorConfig};
pub use crate::core::delta::{ReconciliationReport, RenamePair, ResourceDiff};
pub use crate::core::error::{ErrorKind, ReconcileError, ReconcileResult};
pub use crate::core::state::{ActualState, DesiredState};
pub use crate::monitor::run_monitor;
