//! Alarms and Their Urgency Ordering
//!
//! ## Overview
//!
//! An [`Alarm`] is raised by the orchestrator when a reading breaches a
//! threshold of the [`crate::config::AlarmPolicy`]. Alarms wait in the
//! [`crate::heap::AlarmQueue`] until a caller extracts and resolves them.
//!
//! ## Ordering
//!
//! `Ord` on `Alarm` is an *urgency* order: the smaller alarm is the one to
//! handle first.
//!
//! 1. Lower severity level first (`Critical` = 1 before `Low` = 4)
//! 2. Same severity: more recent timestamp first
//! 3. Remaining fields break ties so the order is total
//!
//! ```rust
//! use greenguard_core::alarm::{Alarm, Severity};
//!
//! let old = Alarm::new(Severity::High, 10, "SOIL_MOISTURE", "dry", "SOIL_MOISTURE", 20.0);
//! let new = Alarm::new(Severity::High, 20, "SOIL_MOISTURE", "dry", "SOIL_MOISTURE", 19.0);
//! let critical = Alarm::new(Severity::Critical, 0, "TEMPERATURE", "hot", "TEMP", 45.0);
//!
//! assert!(critical < new);
//! assert!(new < old);
//! ```

use core::cmp::Ordering;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Alarm kinds raised by the reference policy
pub mod kinds {
    /// Temperature outside the allowed band
    pub const TEMPERATURE: &str = "TEMPERATURE";
    /// Soil too dry
    pub const SOIL_MOISTURE: &str = "SOIL_MOISTURE";
    /// Irrigation tank nearly empty
    pub const WATER_LEVEL: &str = "WATER_LEVEL";
    /// Relative humidity outside the allowed band
    pub const HUMIDITY: &str = "HUMIDITY";
}

/// Alarm severity, 1 is the most urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Severity {
    /// Immediate action required
    Critical = 1,
    /// Action required soon
    High = 2,
    /// Worth attention
    Medium = 3,
    /// Informational
    Low = 4,
}

impl Severity {
    /// Numeric level, 1..=4
    pub const fn level(&self) -> u8 {
        *self as u8
    }

    /// Upper-case label
    pub const fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }

    /// Severity for a numeric level; `None` outside 1..=4
    pub const fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Severity::Critical),
            2 => Some(Severity::High),
            3 => Some(Severity::Medium),
            4 => Some(Severity::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A threshold breach waiting to be processed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alarm {
    severity: Severity,
    timestamp: Timestamp,
    kind: String,
    message: String,
    sensor_id: String,
    value: f64,
    resolved: bool,
}

impl Alarm {
    /// Raise a new, unresolved alarm
    pub fn new(
        severity: Severity,
        timestamp: Timestamp,
        kind: impl Into<String>,
        message: impl Into<String>,
        sensor_id: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            severity,
            timestamp,
            kind: kind.into(),
            message: message.into(),
            sensor_id: sensor_id.into(),
            value,
            resolved: false,
        }
    }

    /// Mark as handled
    pub fn resolve(&mut self) {
        self.resolved = true;
    }

    /// Severity
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// When the breach was observed
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Kind, see [`kinds`]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Sensor whose reading breached the threshold
    pub fn sensor_id(&self) -> &str {
        &self.sensor_id
    }

    /// The offending value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Whether [`Alarm::resolve`] was called
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }
}

impl Ord for Alarm {
    fn cmp(&self, other: &Self) -> Ordering {
        self.severity
            .cmp(&other.severity)
            .then_with(|| other.timestamp.cmp(&self.timestamp))
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| self.sensor_id.cmp(&other.sensor_id))
            .then_with(|| self.message.cmp(&other.message))
            .then_with(|| self.value.total_cmp(&other.value))
            .then_with(|| self.resolved.cmp(&other.resolved))
    }
}

impl PartialOrd for Alarm {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Alarm {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Alarm {}

impl fmt::Display for Alarm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} @{}", self.severity, self.message, self.timestamp)?;
        if self.resolved {
            f.write_str(" (resolved)")?;
        }
        Ok(())
    }
}
