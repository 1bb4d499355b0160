//! Control Orchestrator
//!
//! ## Overview
//!
//! [`ControlOrchestrator`] owns every structure of the control loop and runs one
//! tick at a time. A tick is a single linear pass:
//!
//! ```text
//!   IDLE ─▶ COLLECTING ─▶ INDEXING ─▶ ALARM_CHECK ─▶ DECIDING ─▶ DONE
//!              │
//!              └─ non-finite value: abort, nothing stored, no commands
//! ```
//!
//! 1. **Collect**: copy the sensor map and reject NaN or infinite values.
//! 2. **Index**: every reading goes into the [`BalancedTimeIndex`] and the
//!    [`BoundedHistory`]; the history is then trimmed to its capacity.
//! 3. **Alarm check**: the [`AlarmPolicy`](crate::config::AlarmPolicy) turns
//!    threshold breaches into alarms on the [`AlarmQueue`] and the alarm log.
//! 4. **Decide**: exactly one engine runs, the [`RuleTree`] or the
//!    [`StateGraph`]. In manual operation this stage is skipped and the tick
//!    yields no commands.
//!
//! Validation happens before anything is mutated, so a failing tick leaves the
//! orchestrator exactly as it found it apart from the abort counter.
//!
//! ## Successful cycles
//!
//! A tick is successful when, after the alarm check, the queue is empty, `TEMP`
//! is within `[18, 32]` and `SOIL_MOISTURE` within `[50, 80]`. A sensor missing
//! from the tick makes it unsuccessful.
//!
//! ## Concurrency
//!
//! `tick` takes `&mut self`; a tick always runs to completion before the next
//! one starts. Callers that drive ticks from a timer wrap the orchestrator in a
//! single `Mutex`.

use core::fmt;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::alarm::Alarm;
use crate::command::ActuatorCommand;
use crate::config::{ControlConfig, ControlMode, OperationMode};
use crate::constants::{sensors, thresholds};
use crate::errors::{ControlError, ControlResult};
use crate::heap::AlarmQueue;
use crate::history::BoundedHistory;
use crate::reading::{Reading, SensorMap};
use crate::rule_tree::{RuleTree, TraceEvent};
use crate::snapshot::Snapshot;
use crate::state_graph::StateGraph;
use crate::stats::{self, Summary};
use crate::time::{TimeSource, Timestamp};
use crate::time_index::BalancedTimeIndex;
use crate::traits::{ActuatorSink, SensorSource};

/// Stage of the control tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickPhase {
    /// No tick has run, or the last one aborted
    Idle,
    /// Copying and validating sensor values
    Collecting,
    /// Storing readings
    Indexing,
    /// Evaluating alarm thresholds
    AlarmCheck,
    /// Running the decision engine
    Deciding,
    /// Last tick completed
    Done,
}

impl TickPhase {
    /// Upper-case name
    pub const fn name(&self) -> &'static str {
        match self {
            TickPhase::Idle => "IDLE",
            TickPhase::Collecting => "COLLECTING",
            TickPhase::Indexing => "INDEXING",
            TickPhase::AlarmCheck => "ALARM_CHECK",
            TickPhase::Deciding => "DECIDING",
            TickPhase::Done => "DONE",
        }
    }
}

impl fmt::Display for TickPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the decision stage did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DecisionTrace {
    /// Rule tree traversal steps
    RuleTree(Vec<TraceEvent>),
    /// State graph evaluation
    StateGraph {
        /// State before evaluation
        from: String,
        /// State after evaluation
        to: String,
        /// Whether a transition fired
        changed: bool,
    },
    /// Manual operation, no engine ran
    Skipped,
}

/// Outcome of one completed tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// 1-based tick number
    pub cycle: u64,
    /// Tick timestamp
    pub timestamp: Timestamp,
    /// Engine selection during the tick
    pub control_mode: ControlMode,
    /// Operation mode during the tick
    pub operation_mode: OperationMode,
    /// Commands for the actuator collaborator, in order
    pub commands: Vec<ActuatorCommand>,
    /// Decision details
    pub trace: DecisionTrace,
    /// Alarms raised by this tick
    pub new_alarms: Vec<Alarm>,
    /// Readings evicted from the history
    pub evicted: usize,
    /// See the module docs
    pub successful: bool,
}

/// Counters kept per operation mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeStats {
    /// Completed ticks
    pub cycles: u64,
    /// Successful ticks
    pub successful_cycles: u64,
    /// Alarms raised
    pub alarms_raised: u64,
}

impl ModeStats {
    /// Successful ticks as a percentage, 0 with no ticks
    pub fn success_rate(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.successful_cycles as f64 * 100.0 / self.cycles as f64
        }
    }
}

/// Owns the control structures and runs ticks
///
/// The history is trimmed to `history_capacity` every tick. The time index is
/// never trimmed: it keeps every reading ingested over the orchestrator's
/// lifetime, so its memory grows with the number of ticks.
#[derive(Debug)]
pub struct ControlOrchestrator {
    config: ControlConfig,
    rule_tree: RuleTree,
    state_graph: StateGraph,
    index: BalancedTimeIndex,
    history: BoundedHistory<Reading>,
    alarms: AlarmQueue,
    alarm_log: Vec<Alarm>,
    phase: TickPhase,
    cycles: u64,
    successful_cycles: u64,
    alarms_cleared: u64,
    aborted_ticks: u64,
    queue_after_last_tick: usize,
    automatic: ModeStats,
    manual: ModeStats,
}

impl ControlOrchestrator {
    /// Orchestrator running the reference rule tree and state graph
    pub fn new(config: ControlConfig) -> ControlResult<Self> {
        Self::with_topologies(config, RuleTree::reference()?, StateGraph::reference()?)
    }

    /// Orchestrator running caller-supplied topologies
    pub fn with_topologies(
        config: ControlConfig,
        rule_tree: RuleTree,
        state_graph: StateGraph,
    ) -> ControlResult<Self> {
        config.validate()?;
        info!(
            "control orchestrator ready: {} / {}, history capacity {}",
            config.control_mode, config.operation_mode, config.history_capacity
        );
        Ok(Self {
            history: BoundedHistory::new(config.history_capacity),
            config,
            rule_tree,
            state_graph,
            index: BalancedTimeIndex::new(),
            alarms: AlarmQueue::new(),
            alarm_log: Vec::new(),
            phase: TickPhase::Idle,
            cycles: 0,
            successful_cycles: 0,
            alarms_cleared: 0,
            aborted_ticks: 0,
            queue_after_last_tick: 0,
            automatic: ModeStats::default(),
            manual: ModeStats::default(),
        })
    }

    /// Run one control tick at `timestamp`
    pub fn tick(&mut self, timestamp: Timestamp, input: &SensorMap) -> ControlResult<TickReport> {
        // COLLECT
        self.phase = TickPhase::Collecting;
        if let Err(err) = validate_values(input) {
            self.phase = TickPhase::Idle;
            self.aborted_ticks += 1;
            warn!("tick at {timestamp} aborted: {err}");
            return Err(err);
        }
        let values = input.clone();

        // INDEX
        self.phase = TickPhase::Indexing;
        for (sensor, value) in &values {
            let reading = Reading::classified(timestamp, sensor.as_str(), *value);
            if !self.index.insert(reading.clone()) {
                debug!("duplicate reading {reading} not re-indexed");
            }
            self.history.append(reading);
        }
        let evicted = self.history.enforce_cap().len();

        // ALARM_CHECK
        self.phase = TickPhase::AlarmCheck;
        let operation_mode = self.config.operation_mode;
        let new_alarms = self.config.alarm_policy.evaluate(&values, timestamp, operation_mode);
        for alarm in &new_alarms {
            warn!("alarm raised: {alarm}");
            self.alarms.insert(alarm.clone());
            self.alarm_log.push(alarm.clone());
        }
        let successful = self.alarms.is_empty()
            && within(&values, sensors::TEMPERATURE, thresholds::SUCCESS_TEMPERATURE_C)
            && within(&values, sensors::SOIL_MOISTURE, thresholds::SUCCESS_SOIL_MOISTURE_PCT);

        // DECIDE
        self.phase = TickPhase::Deciding;
        let control_mode = self.config.control_mode;
        let (commands, trace) = match (operation_mode, control_mode) {
            (OperationMode::Manual, _) => (Vec::new(), DecisionTrace::Skipped),
            (OperationMode::Automatic, ControlMode::RuleTree) => {
                let decision = self.rule_tree.decide(&values);
                (decision.commands, DecisionTrace::RuleTree(decision.trace))
            }
            (OperationMode::Automatic, ControlMode::StateGraph) => {
                let from = self.state_graph.current_state().to_string();
                let to = self.state_graph.evaluate(&values).to_string();
                let changed = from != to;
                (self.state_graph.commands(), DecisionTrace::StateGraph { from, to, changed })
            }
        };

        // DONE
        self.cycles += 1;
        if successful {
            self.successful_cycles += 1;
        }
        if self.alarms.len() < self.queue_after_last_tick {
            self.alarms_cleared += 1;
        }
        self.queue_after_last_tick = self.alarms.len();

        let mode_stats = match operation_mode {
            OperationMode::Automatic => &mut self.automatic,
            OperationMode::Manual => &mut self.manual,
        };
        mode_stats.cycles += 1;
        mode_stats.alarms_raised += new_alarms.len() as u64;
        if successful {
            mode_stats.successful_cycles += 1;
        }

        self.phase = TickPhase::Done;
        debug!(
            "tick {} at {}: {} readings, {} alarms, {} commands, {} evicted",
            self.cycles,
            timestamp,
            values.len(),
            new_alarms.len(),
            commands.len(),
            evicted
        );

        Ok(TickReport {
            cycle: self.cycles,
            timestamp,
            control_mode,
            operation_mode,
            commands,
            trace,
            new_alarms,
            evicted,
            successful,
        })
    }

    /// Read sensors once, tick at the clock's time, then apply every command
    pub fn run_tick<C, S, A>(
        &mut self,
        clock: &C,
        sensors: &mut S,
        actuators: &mut A,
    ) -> ControlResult<TickReport>
    where
        C: TimeSource + ?Sized,
        S: SensorSource + ?Sized,
        A: ActuatorSink + ?Sized,
    {
        let values = sensors.read_all();
        let report = self.tick(clock.now(), &values)?;
        for command in &report.commands {
            actuators.apply(command);
        }
        Ok(report)
    }

    /// Extract the most urgent alarm and mark it resolved
    pub fn process_alarm(&mut self) -> ControlResult<Alarm> {
        let mut alarm = self.alarms.extract_min()?;
        if let Some(entry) = self.alarm_log.iter_mut().find(|logged| **logged == alarm) {
            entry.resolve();
        }
        alarm.resolve();
        info!("alarm processed: {alarm}");
        Ok(alarm)
    }

    /// Most urgent pending alarm
    pub fn peek_alarm(&self) -> ControlResult<&Alarm> {
        self.alarms.peek_min()
    }

    /// Switch decision engine
    pub fn set_control_mode(&mut self, mode: ControlMode) {
        if self.config.control_mode != mode {
            info!("control mode {} -> {}", self.config.control_mode, mode);
            self.config.control_mode = mode;
        }
    }

    /// Switch between automatic and manual operation
    pub fn set_operation_mode(&mut self, mode: OperationMode) {
        if self.config.operation_mode != mode {
            info!("operation mode {} -> {}", self.config.operation_mode, mode);
            self.config.operation_mode = mode;
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    /// Stage reached by the last tick
    pub fn phase(&self) -> TickPhase {
        self.phase
    }

    /// Alarms waiting to be processed
    pub fn pending_alarms(&self) -> &AlarmQueue {
        &self.alarms
    }

    /// Every alarm ever raised, in order
    pub fn alarm_log(&self) -> &[Alarm] {
        &self.alarm_log
    }

    /// Reading history
    pub fn history(&self) -> &BoundedHistory<Reading> {
        &self.history
    }

    /// Time index of every reading
    pub fn index(&self) -> &BalancedTimeIndex {
        &self.index
    }

    /// Rule tree in use
    pub fn rule_tree(&self) -> &RuleTree {
        &self.rule_tree
    }

    /// State graph in use
    pub fn state_graph(&self) -> &StateGraph {
        &self.state_graph
    }

    /// Force the state graph into `state`
    pub fn reset_state(&mut self, state: &str) -> ControlResult<()> {
        self.state_graph.reset(state)
    }

    /// Completed ticks
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Successful ticks
    pub fn successful_cycles(&self) -> u64 {
        self.successful_cycles
    }

    /// Ticks that ended with fewer pending alarms than the previous one
    pub fn alarms_cleared(&self) -> u64 {
        self.alarms_cleared
    }

    /// Ticks rejected in the collect stage
    pub fn aborted_ticks(&self) -> u64 {
        self.aborted_ticks
    }

    /// Counters for one operation mode
    pub fn mode_stats(&self, mode: OperationMode) -> ModeStats {
        match mode {
            OperationMode::Automatic => self.automatic,
            OperationMode::Manual => self.manual,
        }
    }

    /// Statistics over one sensor's values in the history
    pub fn statistics(&self, sensor: &str) -> Option<Summary> {
        stats::summarize(&stats::sensor_values(&self.history, sensor))
    }

    /// Moving average over one sensor's history values, oldest window first
    pub fn smoothed(&self, sensor: &str) -> Vec<f64> {
        stats::smooth(&stats::sensor_values(&self.history, sensor))
    }

    /// Point-in-time summary for persistence
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cycles: self.cycles,
            active_alarms: self.alarms.len(),
            control_mode: self.config.control_mode,
            operation_mode: self.config.operation_mode,
            current_state: match self.config.control_mode {
                ControlMode::StateGraph => Some(self.state_graph.current_state().to_string()),
                ControlMode::RuleTree => None,
            },
            history_size: self.history.len(),
            index_height: self.index.height(),
        }
    }
}

fn validate_values(values: &SensorMap) -> ControlResult<()> {
    match values.iter().find(|(_, v)| !v.is_finite()) {
        Some((sensor, value)) => Err(ControlError::InvalidReading {
            sensor: sensor.clone(),
            value: *value,
        }),
        None => Ok(()),
    }
}

fn within(values: &SensorMap, sensor: &str, (low, high): (f64, f64)) -> bool {
    values.get(sensor).is_some_and(|v| (low..=high).contains(v))
}
