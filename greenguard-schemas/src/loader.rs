//! Loading topologies from text and files

use std::fs;
use std::path::Path;

use log::debug;

use greenguard_core::{RuleTree, StateGraph};

use crate::document::{RuleTreeDocument, StateGraphDocument};
use crate::{TopologyError, TopologyResult};

/// Parse and build a rule tree document
pub fn parse_rule_tree(json: &str) -> TopologyResult<RuleTree> {
    let document: RuleTreeDocument = serde_json::from_str(json)?;
    debug!("parsed rule tree {}", document.qualified_name());
    document.build()
}

/// Parse and build a state graph document
pub fn parse_state_graph(json: &str) -> TopologyResult<StateGraph> {
    let document: StateGraphDocument = serde_json::from_str(json)?;
    debug!("parsed state graph {}", document.qualified_name());
    document.build()
}

/// Read a rule tree document from disk and build it
pub fn load_rule_tree_file(path: impl AsRef<Path>) -> TopologyResult<RuleTree> {
    parse_rule_tree(&read(path.as_ref())?)
}

/// Read a state graph document from disk and build it
pub fn load_state_graph_file(path: impl AsRef<Path>) -> TopologyResult<StateGraph> {
    parse_state_graph(&read(path.as_ref())?)
}

fn read(path: &Path) -> TopologyResult<String> {
    fs::read_to_string(path).map_err(|source| TopologyError::Io {
        path: path.to_path_buf(),
        source,
    })
}
