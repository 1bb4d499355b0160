//! Rule Tree Decision Evaluator
//!
//! ## Overview
//!
//! A [`RuleTree`] is a strictly binary decision tree. Internal nodes hold one
//! pre-parsed [`Condition`] and two children; terminal nodes hold an ordered
//! list of actuator command templates. [`RuleTree::decide`] walks from the root
//! to exactly one terminal and returns that terminal's commands together with a
//! trace of every step.
//!
//! ## Reference topology
//!
//! ```text
//!                    [ROOT] TEMP>35
//!                    /            \
//!              COOL MAX       TEMP<15
//!                             /      \
//!                          HEAT   SOIL_MOISTURE<40
//!                                  /            \
//!                             IRRIGATE     REL_HUMIDITY<60
//!                                            /        \
//!                                          MIST     MAINTAIN
//! ```
//!
//! ## Storage
//!
//! Nodes live in an arena (`Vec<DecisionNode>`) and refer to their children by
//! [`NodeId`]. The tree is built bottom-up through [`RuleTreeBuilder`], which
//! checks that every child exists, that no node has two parents and that every
//! node is reachable from the root. After `build` the tree is immutable;
//! `decide` takes `&self` and is idempotent.
//!
//! ## Trace
//!
//! | Event      | Emitted when                                           |
//! |------------|--------------------------------------------------------|
//! | `Root`     | visiting the root, if it is a decision node            |
//! | `Decision` | visiting any other decision node                       |
//! | `Branch`   | after evaluating a condition, before descending        |
//! | `Action`   | visiting the terminal whose commands are returned      |
//!
//! A decision node whose selected child is missing ends the walk with no
//! `Branch` event and no commands.

use core::fmt;

use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::command::ActuatorCommand;
use crate::condition::Condition;
use crate::constants::{actuators, sensors};
use crate::errors::{ControlError, ControlResult};
use crate::reading::SensorMap;

/// Index of a node inside a rule tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in the arena
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One node of a rule tree
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionNode {
    /// Evaluates a condition and descends into one child
    Decision {
        /// Display name
        label: String,
        /// Guard evaluated against the sensor map
        condition: Condition,
        /// Child taken when the condition holds
        on_true: Option<NodeId>,
        /// Child taken when it does not
        on_false: Option<NodeId>,
    },
    /// Emits its command templates verbatim
    Action {
        /// Display name
        label: String,
        /// Commands in emission order
        commands: Vec<ActuatorCommand>,
    },
}

impl DecisionNode {
    /// Display name of the node
    pub fn label(&self) -> &str {
        match self {
            DecisionNode::Decision { label, .. } | DecisionNode::Action { label, .. } => label,
        }
    }

    /// Whether this is a terminal node
    pub fn is_action(&self) -> bool {
        matches!(self, DecisionNode::Action { .. })
    }

    fn children(&self) -> [Option<NodeId>; 2] {
        match self {
            DecisionNode::Decision { on_true, on_false, .. } => [*on_true, *on_false],
            DecisionNode::Action { .. } => [None, None],
        }
    }
}

/// Which way a decision went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchDirection {
    /// Condition held, `on_true` followed
    Taken,
    /// Condition failed or sensor absent, `on_false` followed
    NotTaken,
}

impl BranchDirection {
    /// Upper-case name
    pub const fn name(&self) -> &'static str {
        match self {
            BranchDirection::Taken => "TAKEN",
            BranchDirection::NotTaken => "NOT_TAKEN",
        }
    }
}

/// One step of a rule-tree traversal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TraceEvent {
    /// The root decision was visited
    Root {
        /// Root condition
        condition: Condition,
    },
    /// A non-root decision was visited
    Decision {
        /// Node label
        label: String,
        /// Node condition
        condition: Condition,
    },
    /// A condition was evaluated and a child selected
    Branch {
        /// Outcome
        direction: BranchDirection,
        /// Sensor read by the condition
        sensor: String,
        /// Value seen, `None` if the sensor was absent
        observed: Option<f64>,
        /// The evaluated condition
        condition: Condition,
    },
    /// A terminal was reached
    Action {
        /// Terminal label
        label: String,
    },
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::Root { condition } => write!(f, "ROOT {condition}"),
            TraceEvent::Decision { label, condition } => write!(f, "DECISION {label} {condition}"),
            TraceEvent::Branch { direction, sensor, observed, condition } => {
                write!(f, "BRANCH {} {}=", direction.name(), sensor)?;
                match observed {
                    Some(v) => write!(f, "{v}")?,
                    None => f.write_str("absent")?,
                }
                write!(f, " ({condition})")
            }
            TraceEvent::Action { label } => write!(f, "ACTION {label}"),
        }
    }
}

/// Result of one rule-tree evaluation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Decision {
    /// Commands of the terminal reached, in declaration order
    pub commands: Vec<ActuatorCommand>,
    /// Every traversal step
    pub trace: Vec<TraceEvent>,
}

/// Immutable binary decision tree
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTree {
    nodes: Vec<DecisionNode>,
    root: NodeId,
}

impl RuleTree {
    /// Walk from the root to a terminal
    pub fn decide(&self, sensors: &SensorMap) -> Decision {
        let mut decision = Decision::default();
        let mut cursor = Some(self.root);

        while let Some(id) = cursor {
            cursor = None;
            match &self.nodes[id.0] {
                DecisionNode::Action { label, commands } => {
                    trace!("rule tree action '{label}'");
                    decision.trace.push(TraceEvent::Action { label: label.clone() });
                    decision.commands.extend(commands.iter().cloned());
                }
                DecisionNode::Decision { label, condition, on_true, on_false } => {
                    decision.trace.push(if id == self.root {
                        TraceEvent::Root { condition: condition.clone() }
                    } else {
                        TraceEvent::Decision { label: label.clone(), condition: condition.clone() }
                    });

                    let holds = condition.evaluate(sensors);
                    let (direction, next) = if holds {
                        (BranchDirection::Taken, *on_true)
                    } else {
                        (BranchDirection::NotTaken, *on_false)
                    };
                    trace!("rule tree '{label}': {condition} -> {}", direction.name());

                    match next {
                        Some(child) => {
                            decision.trace.push(TraceEvent::Branch {
                                direction,
                                sensor: condition.sensor().to_string(),
                                observed: condition.observe(sensors),
                                condition: condition.clone(),
                            });
                            cursor = Some(child);
                        }
                        None => warn!("rule tree node '{label}' has no {} child", direction.name()),
                    }
                }
            }
        }
        decision
    }

    /// Root node id
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node by id
    pub fn node(&self, id: NodeId) -> Option<&DecisionNode> {
        self.nodes.get(id.0)
    }

    /// Every node in arena order
    pub fn nodes(&self) -> &[DecisionNode] {
        &self.nodes
    }

    /// Total number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of terminal nodes
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_action()).count()
    }

    /// Decisions on the longest root-to-terminal path
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, level)) = stack.pop() {
            deepest = deepest.max(level);
            for child in self.nodes[id.0].children().into_iter().flatten() {
                stack.push((child, level + 1));
            }
        }
        deepest
    }

    /// Strict validation: every condition must read a sensor from `known`
    pub fn validate_sensors(&self, known: &[&str]) -> ControlResult<()> {
        for node in &self.nodes {
            if let DecisionNode::Decision { condition, .. } = node {
                condition.check_sensor(known)?;
            }
        }
        Ok(())
    }

    /// The reference greenhouse tree
    ///
    /// Temperature is checked first (high, then low), then soil moisture, then
    /// relative humidity.
    pub fn reference() -> ControlResult<Self> {
        use actuators::{HEATER, IRRIGATION, LED_LIGHT, MISTER, VENTILATOR};

        let mut b = RuleTreeBuilder::new();

        let maintain = b.action(
            "MAINTAIN",
            vec![
                ActuatorCommand::new(VENTILATOR, 25.0, "Circulation"),
                ActuatorCommand::new(IRRIGATION, 30.0, "Keep soil moist"),
                ActuatorCommand::new(LED_LIGHT, 60.0, "Lighting"),
            ],
        );
        let mist = b.action(
            "MIST",
            vec![
                ActuatorCommand::new(MISTER, 80.0, "Dry air"),
                ActuatorCommand::new(VENTILATOR, 15.0, "Circulation"),
                ActuatorCommand::new(IRRIGATION, 30.0, "Keep soil moist"),
            ],
        );
        let humidity = b.decision(
            "Check relative humidity",
            &format!("{}<60", sensors::RELATIVE_HUMIDITY),
            Some(mist),
            Some(maintain),
        )?;

        let irrigate = b.action(
            "IRRIGATE",
            vec![
                ActuatorCommand::new(IRRIGATION, 100.0, "Soil very dry"),
                ActuatorCommand::new(MISTER, 50.0, "Raise humidity"),
                ActuatorCommand::new(VENTILATOR, 20.0, "Light circulation"),
            ],
        );
        let soil = b.decision(
            "Check soil moisture",
            &format!("{}<40", sensors::SOIL_MOISTURE),
            Some(irrigate),
            Some(humidity),
        )?;

        let heat = b.action(
            "HEAT",
            vec![
                ActuatorCommand::new(HEATER, 90.0, "Critical low temperature"),
                ActuatorCommand::new(VENTILATOR, 0.0, "Ventilation off"),
            ],
        );
        let cold = b.decision(
            "Check low temperature",
            &format!("{}<15", sensors::TEMPERATURE),
            Some(heat),
            Some(soil),
        )?;

        let cool = b.action(
            "COOL MAX",
            vec![
                ActuatorCommand::new(VENTILATOR, 100.0, "Critical high temperature"),
                ActuatorCommand::new(HEATER, 0.0, "Heating off"),
                ActuatorCommand::new(MISTER, 100.0, "Evaporative cooling"),
            ],
        );
        let root = b.decision(
            "ROOT",
            &format!("{}>35", sensors::TEMPERATURE),
            Some(cool),
            Some(cold),
        )?;

        b.build(root)
    }
}

/// Bottom-up rule tree construction
///
/// Children are added before their parent, so the arena can never contain a
/// cycle.
#[derive(Debug, Default)]
pub struct RuleTreeBuilder {
    nodes: Vec<DecisionNode>,
}

impl RuleTreeBuilder {
    /// Start an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a terminal node
    pub fn action(&mut self, label: impl Into<String>, commands: Vec<ActuatorCommand>) -> NodeId {
        self.push(DecisionNode::Action {
            label: label.into(),
            commands,
        })
    }

    /// Add a decision node, parsing its condition text once
    pub fn decision(
        &mut self,
        label: impl Into<String>,
        condition: &str,
        on_true: Option<NodeId>,
        on_false: Option<NodeId>,
    ) -> ControlResult<NodeId> {
        let condition = Condition::parse(condition)?;
        self.decision_with(label, condition, on_true, on_false)
    }

    /// Add a decision node from an already parsed condition
    pub fn decision_with(
        &mut self,
        label: impl Into<String>,
        condition: Condition,
        on_true: Option<NodeId>,
        on_false: Option<NodeId>,
    ) -> ControlResult<NodeId> {
        for child in [on_true, on_false].into_iter().flatten() {
            if child.0 >= self.nodes.len() {
                return Err(ControlError::topology(format!(
                    "child node {} does not exist",
                    child.0
                )));
            }
        }
        Ok(self.push(DecisionNode::Decision {
            label: label.into(),
            condition,
            on_true,
            on_false,
        }))
    }

    /// Finish the tree rooted at `root`
    ///
    /// Rejects a missing root, nodes with more than one parent, a root that is
    /// somebody's child, and nodes unreachable from the root.
    pub fn build(self, root: NodeId) -> ControlResult<RuleTree> {
        if root.0 >= self.nodes.len() {
            return Err(ControlError::topology("root node does not exist"));
        }

        let mut parents = vec![0u32; self.nodes.len()];
        for node in &self.nodes {
            for child in node.children().into_iter().flatten() {
                parents[child.0] += 1;
                if parents[child.0] > 1 {
                    return Err(ControlError::topology(format!(
                        "node '{}' has more than one parent",
                        self.nodes[child.0].label()
                    )));
                }
            }
        }
        if parents[root.0] != 0 {
            return Err(ControlError::topology("root node is a child of another node"));
        }

        let mut reachable = vec![false; self.nodes.len()];
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            reachable[id.0] = true;
            stack.extend(self.nodes[id.0].children().into_iter().flatten());
        }
        if let Some(orphan) = reachable.iter().position(|r| !r) {
            return Err(ControlError::topology(format!(
                "node '{}' is unreachable from the root",
                self.nodes[orphan].label()
            )));
        }

        Ok(RuleTree { nodes: self.nodes, root })
    }

    fn push(&mut self, node: DecisionNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }
}
