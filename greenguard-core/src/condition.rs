//! Pre-parsed Sensor Conditions
//!
//! ## Overview
//!
//! Rule-tree nodes and state-graph transitions are guarded by conditions written
//! as text, e.g. `"TEMP>35"` or `"SOIL_MOISTURE < 40"`. The text is parsed once,
//! when the topology is built, into a [`Condition`]. Evaluation on every tick is
//! then a map lookup and one float comparison.
//!
//! ## Grammar
//!
//! ```text
//! condition := sensor op threshold
//! op        := '<' | '>' | '='
//! ```
//!
//! The first operator character in the text splits it. Whitespace around the
//! sensor and the threshold is ignored.
//!
//! ## Semantics
//!
//! | Operator | Satisfied when               |
//! |----------|------------------------------|
//! | `<`      | `value < threshold`          |
//! | `>`      | `value > threshold`          |
//! | `=`      | `|value - threshold| < 0.1`  |
//!
//! A sensor that is absent from the map makes the condition false. This is a
//! policy, not an error: the rule tree then follows its false branch.

use core::fmt;
use core::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::EQUALITY_TOLERANCE;
use crate::errors::{ControlError, ControlResult};
use crate::reading::SensorMap;

/// Comparison operator of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    /// Strictly below the threshold
    Less,
    /// Strictly above the threshold
    Greater,
    /// Within [`EQUALITY_TOLERANCE`] of the threshold
    Equal,
}

impl Comparator {
    /// The operator character
    pub const fn symbol(&self) -> char {
        match self {
            Comparator::Less => '<',
            Comparator::Greater => '>',
            Comparator::Equal => '=',
        }
    }

    fn from_symbol(c: char) -> Option<Self> {
        match c {
            '<' => Some(Comparator::Less),
            '>' => Some(Comparator::Greater),
            '=' => Some(Comparator::Equal),
            _ => None,
        }
    }

    /// Apply the operator
    #[inline]
    pub fn compare(&self, value: f64, threshold: f64) -> bool {
        match self {
            Comparator::Less => value < threshold,
            Comparator::Greater => value > threshold,
            Comparator::Equal => (value - threshold).abs() < EQUALITY_TOLERANCE,
        }
    }
}

/// A parsed `(sensor, operator, threshold)` predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Condition {
    sensor: String,
    comparator: Comparator,
    threshold: f64,
}

impl Condition {
    /// Build a condition from parts
    pub fn new(sensor: impl Into<String>, comparator: Comparator, threshold: f64) -> Self {
        Self {
            sensor: sensor.into(),
            comparator,
            threshold,
        }
    }

    /// Parse condition text such as `"TEMP>35"`
    pub fn parse(text: &str) -> ControlResult<Self> {
        let malformed = |reason| ControlError::MalformedCondition {
            condition: text.to_string(),
            reason,
        };

        let (pos, comparator) = text
            .char_indices()
            .find_map(|(i, c)| Comparator::from_symbol(c).map(|op| (i, op)))
            .ok_or_else(|| malformed("missing operator"))?;

        let sensor = text[..pos].trim();
        if sensor.is_empty() {
            return Err(malformed("empty sensor name"));
        }

        let threshold: f64 = text[pos + 1..]
            .trim()
            .parse()
            .map_err(|_| malformed("threshold is not a number"))?;
        if !threshold.is_finite() {
            return Err(malformed("threshold is not finite"));
        }

        Ok(Self::new(sensor, comparator, threshold))
    }

    /// Sensor the condition reads
    pub fn sensor(&self) -> &str {
        &self.sensor
    }

    /// Comparison operator
    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    /// Threshold value
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Current value of this condition's sensor, if present
    pub fn observe(&self, sensors: &SensorMap) -> Option<f64> {
        sensors.get(&self.sensor).copied()
    }

    /// Evaluate against a sensor map; an absent sensor yields `false`
    pub fn evaluate(&self, sensors: &SensorMap) -> bool {
        match self.observe(sensors) {
            Some(value) => self.comparator.compare(value, self.threshold),
            None => {
                debug!("sensor '{}' absent, treating '{}' as false", self.sensor, self);
                false
            }
        }
    }

    /// Strict validation: reject sensors outside `known`
    pub fn check_sensor(&self, known: &[&str]) -> ControlResult<()> {
        if known.contains(&self.sensor.as_str()) {
            Ok(())
        } else {
            Err(ControlError::UnknownSensor {
                sensor: self.sensor.clone(),
            })
        }
    }
}

impl FromStr for Condition {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Condition {
    type Error = ControlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Condition> for String {
    fn from(condition: Condition) -> Self {
        condition.to_string()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.sensor, self.comparator.symbol(), self.threshold)
    }
}
