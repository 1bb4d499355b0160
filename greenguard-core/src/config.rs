//! Control Loop Configuration
//!
//! ## Overview
//!
//! [`ControlConfig`] gathers everything the orchestrator can be tuned with:
//! history capacity, which decision engine runs, whether a human operator is in
//! charge, and the alarm thresholds. Every field has a default taken from
//! [`crate::constants`]; `validate()` rejects inconsistent values before they
//! reach the control loop.
//!
//! ## Alarm policy
//!
//! | Sensor         | Breach                                | Severity |
//! |----------------|---------------------------------------|----------|
//! | `TEMP`         | outside `[min / m, max / m]`          | Critical |
//! | `SOIL_MOISTURE`| below `min / m`                       | High     |
//! | `WATER_LEVEL`  | below `min` (never scaled)            | Critical |
//! | `REL_HUMIDITY` | outside `[min, max]`, manual mode only | Medium  |
//!
//! `m` is `manual_sensitivity` in manual mode and 1 otherwise. A sensor absent
//! from the tick raises nothing.
//!
//! ```rust
//! use greenguard_core::config::{ControlConfig, ControlMode};
//!
//! let config = ControlConfig {
//!     control_mode: ControlMode::StateGraph,
//!     history_capacity: 200,
//!     ..ControlConfig::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::alarm::{kinds, Alarm, Severity};
use crate::constants::{sensors, thresholds, DEFAULT_HISTORY_CAPACITY};
use crate::errors::{ControlError, ControlResult};
use crate::reading::SensorMap;
use crate::time::Timestamp;

/// Which decision engine drives the actuators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ControlMode {
    /// Binary decision tree
    #[default]
    RuleTree,
    /// Finite-state machine
    StateGraph,
}

impl ControlMode {
    /// Upper-case name used in snapshots
    pub const fn name(&self) -> &'static str {
        match self {
            ControlMode::RuleTree => "RULE_TREE",
            ControlMode::StateGraph => "STATE_GRAPH",
        }
    }

    /// Inverse of [`ControlMode::name`]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "RULE_TREE" => Some(ControlMode::RuleTree),
            "STATE_GRAPH" => Some(ControlMode::StateGraph),
            _ => None,
        }
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Who is in charge of the actuators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OperationMode {
    /// The decision engine issues commands every tick
    #[default]
    Automatic,
    /// A human operator drives the actuators; alarms are more sensitive
    Manual,
}

impl OperationMode {
    /// Upper-case name used in snapshots
    pub const fn name(&self) -> &'static str {
        match self {
            OperationMode::Automatic => "AUTOMATIC",
            OperationMode::Manual => "MANUAL",
        }
    }

    /// Inverse of [`OperationMode::name`]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "AUTOMATIC" => Some(OperationMode::Automatic),
            "MANUAL" => Some(OperationMode::Manual),
            _ => None,
        }
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Threshold rules evaluated in the alarm-check stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmPolicy {
    /// Lower temperature bound (°C)
    pub temperature_min: f64,
    /// Upper temperature bound (°C)
    pub temperature_max: f64,
    /// Lowest acceptable soil moisture (%)
    pub soil_moisture_min: f64,
    /// Lowest acceptable water level (litres)
    pub water_level_min: f64,
    /// Lower relative humidity bound, manual mode (%)
    pub humidity_min: f64,
    /// Upper relative humidity bound, manual mode (%)
    pub humidity_max: f64,
    /// Divisor applied to temperature and soil thresholds in manual mode
    pub manual_sensitivity: f64,
}

impl Default for AlarmPolicy {
    fn default() -> Self {
        Self {
            temperature_min: thresholds::TEMPERATURE_MIN_C,
            temperature_max: thresholds::TEMPERATURE_MAX_C,
            soil_moisture_min: thresholds::SOIL_MOISTURE_MIN_PCT,
            water_level_min: thresholds::WATER_LEVEL_MIN_L,
            humidity_min: thresholds::HUMIDITY_MIN_PCT,
            humidity_max: thresholds::HUMIDITY_MAX_PCT,
            manual_sensitivity: thresholds::MANUAL_SENSITIVITY,
        }
    }
}

impl AlarmPolicy {
    /// Check bands and the sensitivity multiplier
    pub fn validate(&self) -> ControlResult<()> {
        let fields = [
            self.temperature_min,
            self.temperature_max,
            self.soil_moisture_min,
            self.water_level_min,
            self.humidity_min,
            self.humidity_max,
            self.manual_sensitivity,
        ];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(invalid("alarm thresholds must be finite"));
        }
        if self.temperature_min >= self.temperature_max {
            return Err(invalid("temperature_min must be below temperature_max"));
        }
        if self.humidity_min >= self.humidity_max {
            return Err(invalid("humidity_min must be below humidity_max"));
        }
        if self.manual_sensitivity <= 0.0 {
            return Err(invalid("manual_sensitivity must be positive"));
        }
        Ok(())
    }

    /// Alarms raised by one tick's sensor values, most severe rules first
    pub fn evaluate(
        &self,
        values: &SensorMap,
        timestamp: Timestamp,
        mode: OperationMode,
    ) -> Vec<Alarm> {
        let m = match mode {
            OperationMode::Automatic => 1.0,
            OperationMode::Manual => self.manual_sensitivity,
        };
        let mut alarms = Vec::new();

        if let Some(&temp) = values.get(sensors::TEMPERATURE) {
            if temp > self.temperature_max / m || temp < self.temperature_min / m {
                alarms.push(Alarm::new(
                    Severity::Critical,
                    timestamp,
                    kinds::TEMPERATURE,
                    format!("Critical temperature: {}C", temp as i64),
                    sensors::TEMPERATURE,
                    temp,
                ));
            }
        }

        if let Some(&soil) = values.get(sensors::SOIL_MOISTURE) {
            if soil < self.soil_moisture_min / m {
                alarms.push(Alarm::new(
                    Severity::High,
                    timestamp,
                    kinds::SOIL_MOISTURE,
                    format!("Critical soil moisture: {}%", soil as i64),
                    sensors::SOIL_MOISTURE,
                    soil,
                ));
            }
        }

        if let Some(&water) = values.get(sensors::WATER_LEVEL) {
            if water < self.water_level_min {
                alarms.push(Alarm::new(
                    Severity::Critical,
                    timestamp,
                    kinds::WATER_LEVEL,
                    format!("Critical water level: {}L", water as i64),
                    sensors::WATER_LEVEL,
                    water,
                ));
            }
        }

        if mode == OperationMode::Manual {
            if let Some(&rh) = values.get(sensors::RELATIVE_HUMIDITY) {
                if rh < self.humidity_min || rh > self.humidity_max {
                    alarms.push(Alarm::new(
                        Severity::Medium,
                        timestamp,
                        kinds::HUMIDITY,
                        format!("Relative humidity out of range: {}%", rh as i64),
                        sensors::RELATIVE_HUMIDITY,
                        rh,
                    ));
                }
            }
        }

        alarms
    }
}

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Readings kept in the bounded history
    pub history_capacity: usize,
    /// Decision engine
    pub control_mode: ControlMode,
    /// Automatic or manual operation
    pub operation_mode: OperationMode,
    /// Alarm thresholds
    pub alarm_policy: AlarmPolicy,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            control_mode: ControlMode::default(),
            operation_mode: OperationMode::default(),
            alarm_policy: AlarmPolicy::default(),
        }
    }
}

impl ControlConfig {
    /// Configuration for an operator-driven greenhouse
    pub fn manual() -> Self {
        Self {
            operation_mode: OperationMode::Manual,
            ..Self::default()
        }
    }

    /// Configuration driven by the state graph
    pub fn state_graph() -> Self {
        Self {
            control_mode: ControlMode::StateGraph,
            ..Self::default()
        }
    }

    /// Reject inconsistent settings
    pub fn validate(&self) -> ControlResult<()> {
        if self.history_capacity == 0 {
            return Err(invalid("history_capacity must be at least 1"));
        }
        self.alarm_policy.validate()
    }
}

fn invalid(reason: &str) -> ControlError {
    ControlError::InvalidConfig {
        reason: reason.to_string(),
    }
}
