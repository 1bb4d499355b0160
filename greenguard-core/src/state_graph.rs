//! State Graph Controller
//!
//! ## Overview
//!
//! A finite-state machine that picks one of a fixed set of environmental regimes
//! and drives the actuators with that regime's static configuration.
//!
//! ```text
//!                 TEMP>35 (1)              TEMP<32 (1)
//!      ┌────────────────────────▶ HEAT_EXTREME ──────────────┐
//!      │   TEMP<15 (1)                                        ▼
//!   NORMAL ──────────────────▶ COLD_EXTREME ─ TEMP>18 (1) ▶ RECOVERY
//!      │ ▲ SOIL_MOISTURE<40 (2)                               ▲  │
//!      │ └─────────────── TEMP>20 (1) ────────────────────────┼──┘
//!      ├──────────────────────▶ DROUGHT ── SOIL_MOISTURE>55 ──┤
//!      │   REL_HUMIDITY>85 (2)                                │
//!      └──────────────────────▶ HIGH_HUMIDITY ─ REL_HUMIDITY<75
//! ```
//!
//! ## Transition selection
//!
//! On [`StateGraph::evaluate`], every outgoing transition of the current state
//! whose condition holds is a candidate. The candidate with the lowest priority
//! number wins. Equal priorities go to the transition declared first. With no
//! candidate the graph stays where it is.
//!
//! When the state actually changes, the previous state is pushed onto a bounded
//! history of [`STATE_HISTORY_CAPACITY`] entries; the oldest entry falls out
//! when it is full.
//!
//! ## Path queries
//!
//! [`StateGraph::shortest_path`] is a breadth-first search over the transition
//! edges with every guard ignored. It answers "is there a route in the graph",
//! not "will the sensors ever take it".

use core::fmt;
use std::collections::{BTreeMap, VecDeque};

use heapless::HistoryBuffer;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::command::ActuatorCommand;
use crate::condition::Condition;
use crate::constants::{actuators, sensors, STATE_HISTORY_CAPACITY};
use crate::errors::{ControlError, ControlResult};
use crate::reading::SensorMap;

/// Reference state names
pub mod states {
    /// Standard operation
    pub const NORMAL: &str = "NORMAL";
    /// Dangerously hot
    pub const HEAT_EXTREME: &str = "HEAT_EXTREME";
    /// Dangerously cold
    pub const COLD_EXTREME: &str = "COLD_EXTREME";
    /// Soil critically dry
    pub const DROUGHT: &str = "DROUGHT";
    /// Excess humidity, fungus risk
    pub const HIGH_HUMIDITY: &str = "HIGH_HUMIDITY";
    /// Returning to normal
    pub const RECOVERY: &str = "RECOVERY";
}

/// One regime and its actuator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateNode {
    /// Unique state name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Actuator name to intensity
    pub actuators: BTreeMap<String, f64>,
}

impl StateNode {
    /// Create a state
    pub fn new<I, K>(name: impl Into<String>, description: impl Into<String>, actuators: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            name: name.into(),
            description: description.into(),
            actuators: actuators.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Guarded edge between two states
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Source state
    pub from: String,
    /// Target state
    pub to: String,
    /// Guard
    pub condition: Condition,
    /// Lower wins, negative values included
    pub priority: i32,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} [{}] (p{})", self.from, self.to, self.condition, self.priority)
    }
}

/// Finite-state actuator controller
pub struct StateGraph {
    states: Vec<StateNode>,
    index: BTreeMap<String, usize>,
    outgoing: Vec<Vec<Transition>>,
    current: usize,
    history: HistoryBuffer<String, STATE_HISTORY_CAPACITY>,
    last_transition: Option<Transition>,
}

impl StateGraph {
    /// Apply the winning transition, if any; returns the current state
    pub fn evaluate(&mut self, sensors: &SensorMap) -> &str {
        let mut best: Option<&Transition> = None;
        for transition in &self.outgoing[self.current] {
            if !transition.condition.evaluate(sensors) {
                continue;
            }
            // strictly lower: the first declared keeps ties
            if best.map_or(true, |b| transition.priority < b.priority) {
                best = Some(transition);
            }
        }

        if let Some(transition) = best {
            let target = self.index.get(&transition.to).copied();
            match target {
                Some(target) if target != self.current => {
                    info!("state transition {transition}");
                    let transition = transition.clone();
                    self.history.write(self.states[self.current].name.clone());
                    self.current = target;
                    self.last_transition = Some(transition);
                }
                _ => debug!("transition {transition} keeps the current state"),
            }
        }
        &self.states[self.current].name
    }

    /// Name of the current state
    pub fn current_state(&self) -> &str {
        &self.states[self.current].name
    }

    /// Current state node
    pub fn current(&self) -> &StateNode {
        &self.states[self.current]
    }

    /// Copy of the current state's actuator configuration
    pub fn configuration(&self) -> BTreeMap<String, f64> {
        self.states[self.current].actuators.clone()
    }

    /// The current configuration as commands, in actuator-name order
    pub fn commands(&self) -> Vec<ActuatorCommand> {
        let state = &self.states[self.current];
        let reason = format!("state {}", state.name);
        state
            .actuators
            .iter()
            .map(|(actuator, intensity)| {
                ActuatorCommand::new(actuator.clone(), *intensity, reason.clone())
            })
            .collect()
    }

    /// State by name
    pub fn state(&self, name: &str) -> ControlResult<&StateNode> {
        self.position(name).map(|i| &self.states[i])
    }

    /// Description of a state
    pub fn description(&self, name: &str) -> ControlResult<&str> {
        self.state(name).map(|s| s.description.as_str())
    }

    /// Outgoing transitions of a state, in declaration order
    pub fn transitions_from(&self, name: &str) -> ControlResult<&[Transition]> {
        self.position(name).map(|i| self.outgoing[i].as_slice())
    }

    /// Every state in declaration order
    pub fn states(&self) -> &[StateNode] {
        &self.states
    }

    /// Previous states, oldest first
    pub fn history(&self) -> Vec<&str> {
        self.history.oldest_ordered().map(String::as_str).collect()
    }

    /// The transition that produced the current state
    pub fn last_transition(&self) -> Option<&Transition> {
        self.last_transition.as_ref()
    }

    /// Jump to `name`, forgetting history
    pub fn reset(&mut self, name: &str) -> ControlResult<()> {
        self.current = self.position(name)?;
        self.history = HistoryBuffer::new();
        self.last_transition = None;
        info!("state graph reset to {name}");
        Ok(())
    }

    /// Fewest-edge route from `from` to `to`, guards ignored
    ///
    /// `Ok(None)` when `to` is unreachable.
    pub fn shortest_path(&self, from: &str, to: &str) -> ControlResult<Option<Vec<String>>> {
        let start = self.position(from)?;
        let goal = self.position(to)?;

        let mut previous: Vec<Option<usize>> = vec![None; self.states.len()];
        let mut visited = vec![false; self.states.len()];
        let mut queue = VecDeque::from([start]);
        visited[start] = true;

        while let Some(at) = queue.pop_front() {
            if at == goal {
                let mut path = vec![self.states[at].name.clone()];
                let mut cursor = previous[at];
                while let Some(p) = cursor {
                    path.push(self.states[p].name.clone());
                    cursor = previous[p];
                }
                path.reverse();
                return Ok(Some(path));
            }
            for transition in &self.outgoing[at] {
                if let Some(&next) = self.index.get(&transition.to) {
                    if !visited[next] {
                        visited[next] = true;
                        previous[next] = Some(at);
                        queue.push_back(next);
                    }
                }
            }
        }
        Ok(None)
    }

    /// Strict validation: every guard must read a sensor from `known`
    pub fn validate_sensors(&self, known: &[&str]) -> ControlResult<()> {
        self.outgoing
            .iter()
            .flatten()
            .try_for_each(|t| t.condition.check_sensor(known))
    }

    fn position(&self, name: &str) -> ControlResult<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| ControlError::UnknownState { state: name.to_string() })
    }

    /// The reference greenhouse graph, starting in `NORMAL`
    pub fn reference() -> ControlResult<Self> {
        use actuators::{HEATER, IRRIGATION, LED_LIGHT, MISTER, VENTILATOR};
        use sensors::{RELATIVE_HUMIDITY as RH, SOIL_MOISTURE as SOIL, TEMPERATURE as TEMP};
        use states::*;

        let config = |v: f64, h: f64, i: f64, l: f64, m: f64| {
            [(VENTILATOR, v), (HEATER, h), (IRRIGATION, i), (LED_LIGHT, l), (MISTER, m)]
        };

        let mut b = StateGraphBuilder::new();
        b.state(StateNode::new(
            NORMAL,
            "Optimal greenhouse conditions",
            config(20.0, 0.0, 30.0, 50.0, 0.0),
        ))
        .state(StateNode::new(
            HEAT_EXTREME,
            "Dangerously high temperature",
            config(100.0, 0.0, 80.0, 0.0, 100.0),
        ))
        .state(StateNode::new(
            COLD_EXTREME,
            "Dangerously low temperature",
            config(0.0, 100.0, 0.0, 80.0, 0.0),
        ))
        .state(StateNode::new(
            DROUGHT,
            "Critically dry soil",
            config(10.0, 0.0, 100.0, 40.0, 80.0),
        ))
        .state(StateNode::new(
            HIGH_HUMIDITY,
            "Excess humidity, fungus risk",
            config(80.0, 30.0, 0.0, 60.0, 0.0),
        ))
        .state(StateNode::new(
            RECOVERY,
            "Returning to normal conditions",
            config(30.0, 10.0, 40.0, 50.0, 20.0),
        ));

        b.transition(NORMAL, HEAT_EXTREME, &format!("{TEMP}>35"), 1)?
            .transition(NORMAL, COLD_EXTREME, &format!("{TEMP}<15"), 1)?
            .transition(NORMAL, DROUGHT, &format!("{SOIL}<40"), 2)?
            .transition(NORMAL, HIGH_HUMIDITY, &format!("{RH}>85"), 2)?
            .transition(HEAT_EXTREME, RECOVERY, &format!("{TEMP}<32"), 1)?
            .transition(HEAT_EXTREME, DROUGHT, &format!("{SOIL}<30"), 2)?
            .transition(COLD_EXTREME, RECOVERY, &format!("{TEMP}>18"), 1)?
            .transition(DROUGHT, RECOVERY, &format!("{SOIL}>55"), 1)?
            .transition(DROUGHT, HEAT_EXTREME, &format!("{TEMP}>35"), 2)?
            .transition(HIGH_HUMIDITY, RECOVERY, &format!("{RH}<75"), 1)?
            .transition(RECOVERY, NORMAL, &format!("{TEMP}>20"), 1)?;

        b.build(NORMAL)
    }
}

impl fmt::Debug for StateGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateGraph")
            .field("states", &self.states.len())
            .field("transitions", &self.outgoing.iter().map(Vec::len).sum::<usize>())
            .field("current", &self.current_state())
            .field("history", &self.history.len())
            .finish()
    }
}

/// Collects states and transitions, validated by [`StateGraphBuilder::build`]
#[derive(Debug, Default)]
pub struct StateGraphBuilder {
    states: Vec<StateNode>,
    transitions: Vec<Transition>,
}

impl StateGraphBuilder {
    /// Start an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a state
    pub fn state(&mut self, state: StateNode) -> &mut Self {
        self.states.push(state);
        self
    }

    /// Declare a transition, parsing its guard once
    pub fn transition(
        &mut self,
        from: &str,
        to: &str,
        condition: &str,
        priority: i32,
    ) -> ControlResult<&mut Self> {
        let condition = Condition::parse(condition)?;
        Ok(self.transition_with(Transition {
            from: from.to_string(),
            to: to.to_string(),
            condition,
            priority,
        }))
    }

    /// Declare an already parsed transition
    pub fn transition_with(&mut self, transition: Transition) -> &mut Self {
        self.transitions.push(transition);
        self
    }

    /// Finish the graph starting in `initial`
    pub fn build(self, initial: &str) -> ControlResult<StateGraph> {
        if self.states.is_empty() {
            return Err(ControlError::topology("state graph has no states"));
        }

        let states = self.states;
        let mut index = BTreeMap::new();
        for (i, state) in states.iter().enumerate() {
            if index.insert(state.name.clone(), i).is_some() {
                return Err(ControlError::topology(format!("duplicate state '{}'", state.name)));
            }
        }

        let lookup = |name: &str| {
            index
                .get(name)
                .copied()
                .ok_or_else(|| ControlError::UnknownState { state: name.to_string() })
        };

        let mut outgoing = vec![Vec::new(); states.len()];
        for transition in self.transitions {
            let from = lookup(&transition.from)?;
            lookup(&transition.to)?;
            outgoing[from].push(transition);
        }
        let current = lookup(initial)?;

        Ok(StateGraph {
            states,
            index,
            outgoing,
            current,
            history: HistoryBuffer::new(),
            last_transition: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::states::*;
    use super::*;

    fn sensors(pairs: &[(&str, f64)]) -> SensorMap {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn heat_moves_normal_to_heat_extreme() {
        let mut graph = StateGraph::reference().unwrap();
        assert_eq!(graph.current_state(), NORMAL);

        assert_eq!(graph.evaluate(&sensors(&[("TEMP", 36.0)])), HEAT_EXTREME);
        assert_eq!(graph.history(), vec![NORMAL]);
        assert_eq!(graph.configuration().get("VENTILATOR"), Some(&100.0));
        assert_eq!(graph.last_transition().map(|t| t.to.as_str()), Some(HEAT_EXTREME));
    }

    #[test]
    fn lower_priority_number_wins() {
        let mut graph = StateGraph::reference().unwrap();
        // DROUGHT (p2) and COLD_EXTREME (p1) both hold
        let state = graph.evaluate(&sensors(&[("TEMP", 10.0), ("SOIL_MOISTURE", 20.0)]));
        assert_eq!(state, COLD_EXTREME);
    }

    #[test]
    fn equal_priority_goes_to_first_declared() {
        let mut graph = StateGraph::reference().unwrap();
        // DROUGHT and HIGH_HUMIDITY are both p2; DROUGHT is declared first
        let state = graph.evaluate(&sensors(&[("SOIL_MOISTURE", 20.0), ("REL_HUMIDITY", 90.0)]));
        assert_eq!(state, DROUGHT);
    }

    #[test]
    fn negative_priorities_order_below_zero() {
        let mut b = StateGraphBuilder::new();
        b.state(StateNode::new("A", "", [("VENTILATOR", 0.0)]))
            .state(StateNode::new("B", "", [("VENTILATOR", 50.0)]))
            .state(StateNode::new("C", "", [("VENTILATOR", 100.0)]));
        b.transition("A", "B", "TEMP>30", 0).unwrap();
        b.transition("A", "C", "TEMP>30", -5).unwrap();
        let mut graph = b.build("A").unwrap();

        assert_eq!(graph.evaluate(&sensors(&[("TEMP", 31.0)])), "C");
        assert_eq!(graph.last_transition().map(|t| t.priority), Some(-5));
    }

    #[test]
    fn no_satisfied_transition_stays() {
        let mut graph = StateGraph::reference().unwrap();
        assert_eq!(graph.evaluate(&sensors(&[("TEMP", 25.0), ("SOIL_MOISTURE", 60.0)])), NORMAL);
        assert!(graph.history().is_empty());
        assert!(graph.last_transition().is_none());
    }

    #[test]
    fn configuration_is_a_copy() {
        let graph = StateGraph::reference().unwrap();
        let mut config = graph.configuration();
        config.insert("VENTILATOR".into(), 99.0);
        assert_eq!(graph.configuration().get("VENTILATOR"), Some(&20.0));
    }

    #[test]
    fn commands_follow_actuator_name_order() {
        let graph = StateGraph::reference().unwrap();
        let commands = graph.commands();
        let names: Vec<&str> = commands.iter().map(|c| c.actuator.as_str()).collect();
        assert_eq!(names, vec!["HEATER", "IRRIGATION", "LED_LIGHT", "MISTER", "VENTILATOR"]);
        assert!(graph.commands().iter().all(|c| c.reason == "state NORMAL"));
    }

    #[test]
    fn history_is_bounded() {
        let mut graph = StateGraph::reference().unwrap();
        let hot = sensors(&[("TEMP", 36.0)]);
        let cool = sensors(&[("TEMP", 25.0)]);
        // NORMAL -> HEAT_EXTREME -> RECOVERY -> NORMAL, three changes per lap
        for _ in 0..20 {
            graph.evaluate(&hot);
            graph.evaluate(&cool);
            graph.evaluate(&cool);
        }
        assert_eq!(graph.current_state(), NORMAL);
        let history = graph.history();
        assert_eq!(history.len(), STATE_HISTORY_CAPACITY);
        assert_eq!(history.last(), Some(&RECOVERY));
    }

    #[test]
    fn shortest_path_ignores_guards() {
        let graph = StateGraph::reference().unwrap();
        assert_eq!(
            graph.shortest_path(COLD_EXTREME, HEAT_EXTREME).unwrap(),
            Some(vec![
                COLD_EXTREME.to_string(),
                RECOVERY.to_string(),
                NORMAL.to_string(),
                HEAT_EXTREME.to_string()
            ])
        );
        assert_eq!(graph.shortest_path(NORMAL, NORMAL).unwrap(), Some(vec![NORMAL.to_string()]));
        assert!(matches!(
            graph.shortest_path(NORMAL, "FLOOD"),
            Err(ControlError::UnknownState { .. })
        ));
    }

    #[test]
    fn unreachable_target() {
        let mut b = StateGraphBuilder::new();
        b.state(StateNode::new("A", "a", [("HEATER", 1.0)]))
            .state(StateNode::new("B", "b", [("HEATER", 2.0)]));
        b.transition("B", "A", "TEMP>1", 1).unwrap();
        let graph = b.build("A").unwrap();
        assert_eq!(graph.shortest_path("A", "B").unwrap(), None);
    }

    #[test]
    fn reset_and_lookups() {
        let mut graph = StateGraph::reference().unwrap();
        graph.evaluate(&sensors(&[("TEMP", 36.0)]));
        graph.reset(DROUGHT).unwrap();
        assert_eq!(graph.current_state(), DROUGHT);
        assert!(graph.history().is_empty());
        assert!(graph.reset("FLOOD").is_err());

        assert_eq!(graph.description(DROUGHT).unwrap(), "Critically dry soil");
        assert_eq!(graph.transitions_from(NORMAL).unwrap().len(), 4);
        assert_eq!(graph.states().len(), 6);
        assert!(graph.validate_sensors(&sensors::ALL_SENSORS).is_ok());
    }

    #[test]
    fn builder_rejects_bad_graphs() {
        assert!(StateGraphBuilder::new().build("A").is_err());

        let mut b = StateGraphBuilder::new();
        b.state(StateNode::new("A", "", [("HEATER", 0.0)]))
            .state(StateNode::new("A", "", [("HEATER", 0.0)]));
        assert!(matches!(b.build("A"), Err(ControlError::InvalidTopology { .. })));

        let mut b = StateGraphBuilder::new();
        b.state(StateNode::new("A", "", [("HEATER", 0.0)]));
        b.transition("A", "Z", "TEMP>1", 1).unwrap();
        assert_eq!(b.build("A").unwrap_err(), ControlError::UnknownState { state: "Z".into() });

        let mut b = StateGraphBuilder::new();
        b.state(StateNode::new("A", "", [("HEATER", 0.0)]));
        assert!(b.transition("A", "A", "TEMP", 1).is_err());
        assert!(b.build("Q").is_err());
    }
}
