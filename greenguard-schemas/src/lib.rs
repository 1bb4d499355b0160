//! Declarative Control Topologies
//!
//! ## Overview
//!
//! The control loop in `greenguard-core` runs a rule tree or a state graph. This
//! crate lets both be described as JSON documents instead of Rust code, so a
//! greenhouse can change its control logic without recompiling:
//!
//! ```text
//!   JSON file ──▶ RuleTreeDocument / StateGraphDocument ──▶ RuleTree / StateGraph
//!                         │
//!                         └──▶ TopologyRegistry (name_vN, versions, latest)
//! ```
//!
//! Conditions are parsed exactly once, when a document is built into its core
//! topology. A document that fails to build never reaches the registry.
//!
//! ## Document Formats
//!
//! ### Rule tree
//! ```json
//! {
//!   "name": "greenhouse",
//!   "version": 1,
//!   "root": {
//!     "label": "ROOT",
//!     "condition": "TEMP>35",
//!     "on_true":  { "label": "COOL MAX", "actions": [
//!       { "actuator": "VENTILATOR", "intensity": 100.0, "reason": "Critical high temperature" }
//!     ] },
//!     "on_false": { "label": "MAINTAIN", "actions": [] }
//!   }
//! }
//! ```
//!
//! A node with `condition` is a decision, a node with `actions` is a terminal.
//!
//! ### State graph
//! ```json
//! {
//!   "name": "greenhouse",
//!   "version": 1,
//!   "initial": "NORMAL",
//!   "states": [
//!     { "name": "NORMAL", "description": "Optimal", "actuators": { "VENTILATOR": 20.0 } }
//!   ],
//!   "transitions": [
//!     { "from": "NORMAL", "to": "HEAT_EXTREME", "condition": "TEMP>35", "priority": 1 }
//!   ]
//! }
//! ```
//!
//! ## Versioning
//!
//! Topologies are registered as `<name>_v<version>`. New versions are appended,
//! old ones stay retrievable and can be deprecated with a pointer to their
//! replacement.
//!
//! ## Usage Example
//!
//! ```rust
//! use greenguard_schemas::TopologyRegistry;
//!
//! let registry = TopologyRegistry::new();
//! registry.load_defaults()?;
//!
//! let tree = registry.rule_tree("greenhouse_rules_v1")?;
//! assert_eq!(tree.leaf_count(), 5);
//!
//! let graph = registry.latest_state_graph("greenhouse_states")?;
//! assert_eq!(graph.current_state(), "NORMAL");
//! # Ok::<(), greenguard_schemas::TopologyError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::path::PathBuf;

use greenguard_core::ControlError;

pub mod document;
pub mod loader;
pub mod registry;
pub mod topologies;

pub use document::{
    NodeDocument, RuleTreeDocument, StateDocument, StateGraphDocument, TransitionDocument,
};
pub use loader::{load_rule_tree_file, load_state_graph_file, parse_rule_tree, parse_state_graph};
pub use registry::{TopologyKind, TopologyMetadata, TopologyRegistry, GLOBAL_REGISTRY};

/// Topology-related errors
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    /// Document built into an invalid topology
    #[error("Invalid topology: {0}")]
    Control(#[from] ControlError),

    /// Document is not valid JSON for its format
    #[error("Failed to parse topology document: {0}")]
    Json(#[from] serde_json::Error),

    /// Topology file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// No topology under that name
    #[error("Topology not found: {0}")]
    NotFound(String),

    /// Name already registered
    #[error("Topology {0} already registered")]
    Duplicate(String),

    /// Registered topology is of the other kind
    #[error("Topology {name} is not a {expected}")]
    KindMismatch {
        /// Qualified name
        name: String,
        /// Kind that was asked for
        expected: TopologyKind,
    },

    /// A registry lock was poisoned by a panicking writer
    #[error("Registry lock poisoned")]
    LockPoisoned,
}

/// Result type for topology operations
pub type TopologyResult<T> = Result<T, TopologyError>;
