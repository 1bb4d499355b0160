//! Topology documents
//!
//! Serde mirrors of the JSON formats described in the crate docs, plus the
//! conversions into core topologies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use greenguard_core::{
    ActuatorCommand, NodeId, RuleTree, RuleTreeBuilder, StateGraph, StateGraphBuilder, StateNode,
};

use crate::TopologyResult;

/// A rule tree described as nested nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTreeDocument {
    /// Base name, without version
    pub name: String,
    /// Version number
    pub version: u32,
    /// Root node
    pub root: NodeDocument,
}

/// One node of a rule tree document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeDocument {
    /// Internal node
    Decision {
        /// Display label
        label: String,
        /// Condition text, e.g. `"TEMP>35"`
        condition: String,
        /// Child when the condition holds
        #[serde(default, skip_serializing_if = "Option::is_none")]
        on_true: Option<Box<NodeDocument>>,
        /// Child when it does not
        #[serde(default, skip_serializing_if = "Option::is_none")]
        on_false: Option<Box<NodeDocument>>,
    },
    /// Terminal node
    Action {
        /// Display label
        label: String,
        /// Commands emitted in order
        actions: Vec<ActuatorCommand>,
    },
}

impl RuleTreeDocument {
    /// Qualified registry name, `<name>_v<version>`
    pub fn qualified_name(&self) -> String {
        format!("{}_v{}", self.name, self.version)
    }

    /// Build the core rule tree, parsing every condition
    pub fn build(&self) -> TopologyResult<RuleTree> {
        let mut builder = RuleTreeBuilder::new();
        let root = add_node(&mut builder, &self.root)?;
        Ok(builder.build(root)?)
    }
}

// Post-order, false branch before true branch: children always get lower ids
// than their parent.
fn add_node(builder: &mut RuleTreeBuilder, node: &NodeDocument) -> TopologyResult<NodeId> {
    match node {
        NodeDocument::Action { label, actions } => {
            let commands = actions
                .iter()
                .map(|a| ActuatorCommand::new(a.actuator.as_str(), a.intensity, a.reason.as_str()))
                .collect();
            Ok(builder.action(label.as_str(), commands))
        }
        NodeDocument::Decision {
            label,
            condition,
            on_true,
            on_false,
        } => {
            let on_false = on_false.as_deref().map(|n| add_node(builder, n)).transpose()?;
            let on_true = on_true.as_deref().map(|n| add_node(builder, n)).transpose()?;
            Ok(builder.decision(label.as_str(), condition, on_true, on_false)?)
        }
    }
}

/// A state graph described as flat state and transition lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateGraphDocument {
    /// Base name, without version
    pub name: String,
    /// Version number
    pub version: u32,
    /// State the graph starts in
    pub initial: String,
    /// Declared states
    pub states: Vec<StateDocument>,
    /// Guarded edges, in declaration order
    #[serde(default)]
    pub transitions: Vec<TransitionDocument>,
}

/// One state of a state graph document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    /// Unique name
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Actuator name to intensity
    #[serde(default)]
    pub actuators: BTreeMap<String, f64>,
}

/// One transition of a state graph document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionDocument {
    /// Source state
    pub from: String,
    /// Target state
    pub to: String,
    /// Guard text, e.g. `"SOIL_MOISTURE<40"`
    pub condition: String,
    /// Lower wins; may be negative
    pub priority: i32,
}

impl StateGraphDocument {
    /// Qualified registry name, `<name>_v<version>`
    pub fn qualified_name(&self) -> String {
        format!("{}_v{}", self.name, self.version)
    }

    /// Build the core state graph, parsing every guard
    pub fn build(&self) -> TopologyResult<StateGraph> {
        let mut builder = StateGraphBuilder::new();
        for state in &self.states {
            builder.state(StateNode::new(
                state.name.as_str(),
                state.description.as_str(),
                state.actuators.iter().map(|(k, v)| (k.as_str(), *v)),
            ));
        }
        for t in &self.transitions {
            builder.transition(&t.from, &t.to, &t.condition, t.priority)?;
        }
        Ok(builder.build(&self.initial)?)
    }
}
