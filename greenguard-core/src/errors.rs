//! Error Types for the Control Loop
//!
//! ## Design Philosophy
//!
//! A control tick either completes or it does not happen at all. Errors are
//! therefore reported, never patched over: every fallible operation returns a
//! [`ControlResult`] and the orchestrator aborts the tick on the first failure.
//!
//! ## Error Categories
//!
//! ### Structure Access
//! - `EmptyStructure`: extract/peek/evict on an empty heap or history
//! - `OutOfRange`: indexed access past the end of the history
//!
//! ### Topology Construction
//! - `MalformedCondition`: condition text without a recognised operator
//! - `UnknownSensor`: strict validation found a sensor outside the whitelist
//! - `UnknownState`: a state name that was never declared
//! - `InvalidTopology`: dangling children, shared children, missing root
//!
//! ### Runtime Input
//! - `InvalidReading`: a sensor delivered NaN or infinity
//! - `InvalidConfig`: configuration failed validation
//! - `MalformedSnapshot`: snapshot text could not be decoded
//!
//! A condition that references a sensor missing from the current tick is *not*
//! an error. It evaluates to false, see [`crate::condition::Condition::evaluate`].
//!
//! ```rust
//! use greenguard_core::{AlarmQueue, ControlError};
//!
//! let mut queue = AlarmQueue::new();
//! match queue.extract_min() {
//!     Err(ControlError::EmptyStructure { structure }) => assert_eq!(structure, "priority queue"),
//!     _ => unreachable!(),
//! }
//! ```

use thiserror::Error;

/// Result type for control operations
pub type ControlResult<T> = Result<T, ControlError>;

/// Control loop errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    /// Removal or inspection on an empty structure
    #[error("{structure} is empty")]
    EmptyStructure {
        /// Which structure was empty
        structure: &'static str,
    },

    /// Indexed access beyond the current length
    #[error("index {index} out of range for length {len}")]
    OutOfRange {
        /// Requested position
        index: usize,
        /// Number of stored elements
        len: usize,
    },

    /// Condition text that cannot be parsed into a predicate
    #[error("malformed condition '{condition}': {reason}")]
    MalformedCondition {
        /// The offending text
        condition: String,
        /// What was wrong with it
        reason: &'static str,
    },

    /// Condition references a sensor outside the declared set
    #[error("unknown sensor '{sensor}'")]
    UnknownSensor {
        /// Sensor name as written in the condition
        sensor: String,
    },

    /// State name not declared in the graph
    #[error("unknown state '{state}'")]
    UnknownState {
        /// The state that was looked up
        state: String,
    },

    /// Structurally broken rule tree or state graph
    #[error("invalid topology: {reason}")]
    InvalidTopology {
        /// Description of the defect
        reason: String,
    },

    /// Non-finite sensor value
    #[error("invalid reading from '{sensor}': {value}")]
    InvalidReading {
        /// Sensor that produced the value
        sensor: String,
        /// The rejected value
        value: f64,
    },

    /// Configuration failed validation
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the inconsistency
        reason: String,
    },

    /// Snapshot text could not be decoded
    #[error("malformed snapshot: {reason}")]
    MalformedSnapshot {
        /// Description of the defect
        reason: String,
    },
}

impl ControlError {
    /// Shorthand for [`ControlError::InvalidTopology`]
    pub fn topology(reason: impl Into<String>) -> Self {
        Self::InvalidTopology { reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_readable() {
        let err = ControlError::OutOfRange { index: 7, len: 3 };
        assert_eq!(err.to_string(), "index 7 out of range for length 3");

        let err = ControlError::MalformedCondition {
            condition: "TEMP35".into(),
            reason: "missing operator",
        };
        assert_eq!(err.to_string(), "malformed condition 'TEMP35': missing operator");
    }

    #[test]
    fn reading_errors_name_the_sensor() {
        let err = ControlError::InvalidReading {
            sensor: "TEMP".into(),
            value: f64::NAN,
        };
        assert_eq!(err.to_string(), "invalid reading from 'TEMP': NaN");
    }
}
