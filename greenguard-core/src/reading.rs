//! Sensor readings and their classification
//!
//! A [`Reading`] is one value from one sensor at one instant. Readings are
//! immutable once created and ordered by timestamp, then sensor name, which is
//! exactly the key the [`crate::time_index::BalancedTimeIndex`] sorts on.

use core::cmp::Ordering;
use core::fmt;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::sensors::{self, CRITICAL_LOW_FRACTION};
use crate::time::Timestamp;

/// Named sensor values for one tick.
///
/// A `BTreeMap` keeps iteration order stable, so everything derived from a
/// sensor map (readings, alarms, traces) is deterministic.
pub type SensorMap = BTreeMap<String, f64>;

/// Health classification of a single reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// Within the expected operating band
    Normal,
    /// Above the alert threshold
    Alert,
    /// Above the critical threshold or at the very bottom of the range
    Critical,
}

impl Classification {
    /// Lower-case name
    pub const fn name(&self) -> &'static str {
        match self {
            Classification::Normal => "normal",
            Classification::Alert => "alert",
            Classification::Critical => "critical",
        }
    }
}

/// Operating range and thresholds used to classify a sensor's readings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorProfile {
    /// Lowest value the sensor reports
    pub min: f64,
    /// Highest value the sensor reports
    pub max: f64,
    /// Values at or above this are `Alert`
    pub alert: f64,
    /// Values at or above this are `Critical`
    pub critical: f64,
}

impl SensorProfile {
    const fn from_tuple(t: (f64, f64, f64, f64)) -> Self {
        Self { min: t.0, max: t.1, alert: t.2, critical: t.3 }
    }

    /// Reference profile for a known sensor name
    pub fn for_sensor(sensor: &str) -> Option<Self> {
        let profile = match sensor {
            sensors::TEMPERATURE => sensors::TEMPERATURE_PROFILE,
            sensors::SOIL_MOISTURE | sensors::RELATIVE_HUMIDITY => sensors::HUMIDITY_PROFILE,
            sensors::LIGHT => sensors::LIGHT_PROFILE,
            sensors::PH => sensors::PH_PROFILE,
            sensors::CO2 => sensors::CO2_PROFILE,
            sensors::WATER_LEVEL => sensors::WATER_LEVEL_PROFILE,
            _ => return None,
        };
        Some(Self::from_tuple(profile))
    }

    /// Classify a value against this profile
    pub fn classify(&self, value: f64) -> Classification {
        let critical_low = self.min + (self.max - self.min) * CRITICAL_LOW_FRACTION;
        if value >= self.critical || value <= critical_low {
            Classification::Critical
        } else if value >= self.alert {
            Classification::Alert
        } else {
            Classification::Normal
        }
    }
}

/// Classify a value for a named sensor; sensors without a profile are `Normal`
pub fn classify(sensor: &str, value: f64) -> Classification {
    SensorProfile::for_sensor(sensor)
        .map(|profile| profile.classify(value))
        .unwrap_or(Classification::Normal)
}

/// One sensor value at one instant
///
/// Equality and ordering look only at `(timestamp, sensor_id)`: two readings of
/// the same sensor at the same instant are the same reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    timestamp: Timestamp,
    sensor_id: String,
    value: f64,
    classification: Classification,
}

impl Reading {
    /// Create a reading with an explicit classification
    pub fn new(
        timestamp: Timestamp,
        sensor_id: impl Into<String>,
        value: f64,
        classification: Classification,
    ) -> Self {
        Self {
            timestamp,
            sensor_id: sensor_id.into(),
            value,
            classification,
        }
    }

    /// Create a reading classified by the sensor's reference profile
    pub fn classified(timestamp: Timestamp, sensor_id: impl Into<String>, value: f64) -> Self {
        let sensor_id = sensor_id.into();
        let classification = classify(&sensor_id, value);
        Self::new(timestamp, sensor_id, value, classification)
    }

    /// When the value was sampled
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Which sensor produced it
    pub fn sensor_id(&self) -> &str {
        &self.sensor_id
    }

    /// The sampled value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Health classification at sampling time
    pub fn classification(&self) -> Classification {
        self.classification
    }
}

impl PartialEq for Reading {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp && self.sensor_id == other.sensor_id
    }
}

impl Eq for Reading {}

impl PartialOrd for Reading {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Reading {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.sensor_id.cmp(&other.sensor_id))
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}={:.2} ({})",
            self.sensor_id,
            self.timestamp,
            self.value,
            self.classification.name()
        )
    }
}
