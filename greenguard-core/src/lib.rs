//! Control loop engine for GreenGuard
//!
//! Turns periodic greenhouse sensor readings into actuator commands and alarms.
//! Every tick runs the same four stages:
//!
//! ```text
//!   sensors ─▶ COLLECT ─▶ INDEX ─▶ ALARM_CHECK ─▶ DECIDE ─▶ commands
//!                           │           │            │
//!                  time index (AVL)  alarm queue   rule tree │ state graph
//!                  bounded history   (min-heap)
//! ```
//!
//! Key properties:
//! - Deterministic: no randomness, no wall-clock reads inside a tick
//! - A tick either completes or leaves no trace beyond an abort counter
//! - Sensor and actuator I/O stay behind [`SensorSource`] and [`ActuatorSink`]
//!
//! ```
//! use greenguard_core::{ControlConfig, ControlOrchestrator, SensorMap};
//!
//! let mut orchestrator = ControlOrchestrator::new(ControlConfig::default()).unwrap();
//! let sensors: SensorMap = [("TEMP".to_string(), 36.0)].into_iter().collect();
//!
//! let report = orchestrator.tick(1_000, &sensors).unwrap();
//! assert_eq!(report.commands[0].actuator, "VENTILATOR");
//! assert_eq!(report.commands[0].intensity, 100.0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod actuator;
pub mod alarm;
pub mod avl;
pub mod command;
pub mod condition;
pub mod config;
pub mod constants;
pub mod errors;
pub mod heap;
pub mod history;
pub mod orchestrator;
pub mod reading;
pub mod rule_tree;
pub mod snapshot;
pub mod state_graph;
pub mod stats;
pub mod time;
pub mod time_index;
pub mod traits;

// Public API
pub use actuator::{ActuatorBank, ActuatorState};
pub use alarm::{Alarm, Severity};
pub use avl::AvlTree;
pub use command::ActuatorCommand;
pub use condition::{Comparator, Condition};
pub use config::{AlarmPolicy, ControlConfig, ControlMode, OperationMode};
pub use errors::{ControlError, ControlResult};
pub use heap::{AlarmQueue, MinHeap};
pub use history::BoundedHistory;
pub use orchestrator::{ControlOrchestrator, DecisionTrace, ModeStats, TickPhase, TickReport};
pub use reading::{Classification, Reading, SensorMap};
pub use rule_tree::{Decision, DecisionNode, NodeId, RuleTree, RuleTreeBuilder, TraceEvent};
pub use snapshot::Snapshot;
pub use state_graph::{StateGraph, StateGraphBuilder, StateNode, Transition};
pub use time::{FixedTime, SystemClock, TimeSource, Timestamp};
pub use time_index::BalancedTimeIndex;
pub use traits::{ActuatorSink, Sensor, SensorSource};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
