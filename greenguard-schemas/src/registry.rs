//! Topology Registry for Version Management
//!
//! Central store of rule-tree and state-graph documents, keyed by qualified name
//! (`greenhouse_rules_v1`). Every document is built once on registration, so
//! anything in the registry is known to produce a valid topology.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use log::{info, warn};

use greenguard_core::{RuleTree, StateGraph};

use crate::document::{RuleTreeDocument, StateGraphDocument};
use crate::{topologies, TopologyError, TopologyResult};

/// Which engine a topology drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopologyKind {
    /// Binary decision tree
    RuleTree,
    /// Finite-state machine
    StateGraph,
}

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TopologyKind::RuleTree => "rule tree",
            TopologyKind::StateGraph => "state graph",
        })
    }
}

/// Metadata for registry entries
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyMetadata {
    /// Base name (e.g., "greenhouse_rules")
    pub name: String,

    /// Version number
    pub version: u32,

    /// Full qualified name (e.g., "greenhouse_rules_v1")
    pub qualified_name: String,

    /// Rule tree or state graph
    pub kind: TopologyKind,

    /// Whether this topology is deprecated
    pub deprecated: bool,

    /// Replacement topology if deprecated
    pub replacement: Option<String>,
}

#[derive(Debug, Clone)]
enum Entry {
    RuleTree(RuleTreeDocument),
    StateGraph(StateGraphDocument),
}

/// Thread-safe topology registry with version management
#[derive(Debug, Default)]
pub struct TopologyRegistry {
    /// Documents indexed by qualified name
    entries: RwLock<HashMap<String, (Entry, TopologyMetadata)>>,

    /// Version mappings (name -> [versions])
    versions: RwLock<HashMap<String, Vec<u32>>>,
}

impl TopologyRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule tree document
    pub fn register_rule_tree(&self, document: RuleTreeDocument) -> TopologyResult<()> {
        document.build()?;
        let metadata = metadata(&document.name, document.version, TopologyKind::RuleTree);
        self.insert(Entry::RuleTree(document), metadata)
    }

    /// Register a state graph document
    pub fn register_state_graph(&self, document: StateGraphDocument) -> TopologyResult<()> {
        document.build()?;
        let metadata = metadata(&document.name, document.version, TopologyKind::StateGraph);
        self.insert(Entry::StateGraph(document), metadata)
    }

    fn insert(&self, entry: Entry, metadata: TopologyMetadata) -> TopologyResult<()> {
        let qualified_name = metadata.qualified_name.clone();
        let base_name = metadata.name.clone();
        let version = metadata.version;

        {
            let mut entries = self.entries.write().map_err(|_| TopologyError::LockPoisoned)?;
            if entries.contains_key(&qualified_name) {
                return Err(TopologyError::Duplicate(qualified_name));
            }
            entries.insert(qualified_name.clone(), (entry, metadata));
        }

        {
            let mut versions = self.versions.write().map_err(|_| TopologyError::LockPoisoned)?;
            let list = versions.entry(base_name).or_default();
            list.push(version);
            list.sort_unstable();
        }

        info!("registered topology {qualified_name}");
        Ok(())
    }

    /// Rule tree document by qualified name
    pub fn rule_tree_document(&self, name: &str) -> TopologyResult<RuleTreeDocument> {
        match self.entry(name)? {
            Entry::RuleTree(document) => Ok(document),
            Entry::StateGraph(_) => Err(mismatch(name, TopologyKind::RuleTree)),
        }
    }

    /// State graph document by qualified name
    pub fn state_graph_document(&self, name: &str) -> TopologyResult<StateGraphDocument> {
        match self.entry(name)? {
            Entry::StateGraph(document) => Ok(document),
            Entry::RuleTree(_) => Err(mismatch(name, TopologyKind::StateGraph)),
        }
    }

    /// Build the rule tree registered under `name`
    pub fn rule_tree(&self, name: &str) -> TopologyResult<RuleTree> {
        self.warn_if_deprecated(name)?;
        self.rule_tree_document(name)?.build()
    }

    /// Build the state graph registered under `name`
    pub fn state_graph(&self, name: &str) -> TopologyResult<StateGraph> {
        self.warn_if_deprecated(name)?;
        self.state_graph_document(name)?.build()
    }

    /// Build the newest rule tree with base name `base_name`
    pub fn latest_rule_tree(&self, base_name: &str) -> TopologyResult<RuleTree> {
        self.rule_tree(&self.latest(base_name)?)
    }

    /// Build the newest state graph with base name `base_name`
    pub fn latest_state_graph(&self, base_name: &str) -> TopologyResult<StateGraph> {
        self.state_graph(&self.latest(base_name)?)
    }

    /// Qualified name of the newest version of `base_name`
    pub fn latest(&self, base_name: &str) -> TopologyResult<String> {
        let versions = self.versions.read().map_err(|_| TopologyError::LockPoisoned)?;

        let version = versions
            .get(base_name)
            .and_then(|list| list.last())
            .ok_or_else(|| TopologyError::NotFound(format!("No versions of {base_name}")))?;

        Ok(format!("{base_name}_v{version}"))
    }

    /// Every registered version of `base_name`, ascending
    pub fn get_versions(&self, base_name: &str) -> TopologyResult<Vec<u32>> {
        let versions = self.versions.read().map_err(|_| TopologyError::LockPoisoned)?;
        Ok(versions.get(base_name).cloned().unwrap_or_default())
    }

    /// Metadata of one entry
    pub fn get_metadata(&self, name: &str) -> TopologyResult<TopologyMetadata> {
        let entries = self.entries.read().map_err(|_| TopologyError::LockPoisoned)?;

        entries
            .get(name)
            .map(|(_, metadata)| metadata.clone())
            .ok_or_else(|| TopologyError::NotFound(name.to_string()))
    }

    /// Qualified names of every entry, sorted
    pub fn names(&self) -> TopologyResult<Vec<String>> {
        let entries = self.entries.read().map_err(|_| TopologyError::LockPoisoned)?;
        let mut names: Vec<String> = entries.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Mark a topology as deprecated
    pub fn deprecate(&self, name: &str, replacement: Option<String>) -> TopologyResult<()> {
        let mut entries = self.entries.write().map_err(|_| TopologyError::LockPoisoned)?;

        let (_, metadata) = entries
            .get_mut(name)
            .ok_or_else(|| TopologyError::NotFound(name.to_string()))?;

        metadata.deprecated = true;
        metadata.replacement = replacement;
        info!("topology {name} deprecated");

        Ok(())
    }

    /// Load the reference greenhouse topologies
    pub fn load_defaults(&self) -> TopologyResult<()> {
        self.register_rule_tree(topologies::greenhouse_rules_v1()?)?;
        self.register_state_graph(topologies::greenhouse_states_v1()?)?;
        Ok(())
    }

    fn entry(&self, name: &str) -> TopologyResult<Entry> {
        let entries = self.entries.read().map_err(|_| TopologyError::LockPoisoned)?;

        entries
            .get(name)
            .map(|(entry, _)| entry.clone())
            .ok_or_else(|| TopologyError::NotFound(name.to_string()))
    }

    fn warn_if_deprecated(&self, name: &str) -> TopologyResult<()> {
        let metadata = self.get_metadata(name)?;
        if metadata.deprecated {
            match &metadata.replacement {
                Some(replacement) => warn!("topology {name} is deprecated, use {replacement}"),
                None => warn!("topology {name} is deprecated"),
            }
        }
        Ok(())
    }
}

fn metadata(name: &str, version: u32, kind: TopologyKind) -> TopologyMetadata {
    TopologyMetadata {
        name: name.to_string(),
        version,
        qualified_name: format!("{name}_v{version}"),
        kind,
        deprecated: false,
        replacement: None,
    }
}

fn mismatch(name: &str, expected: TopologyKind) -> TopologyError {
    TopologyError::KindMismatch {
        name: name.to_string(),
        expected,
    }
}

// Global registry instance (optional pattern)
lazy_static::lazy_static! {
    /// Global topology registry with the reference topologies loaded
    pub static ref GLOBAL_REGISTRY: TopologyRegistry = {
        let registry = TopologyRegistry::new();
        if let Err(e) = registry.load_defaults() {
            warn!("failed to load default topologies: {e}");
        }
        registry
    };
}
