//! Constants for GreenGuard Core
//!
//! Centralised, documented constants used throughout the control loop. Logic
//! never carries magic numbers; it refers to these.
//!
//! ## Organization
//!
//! - **Sensors**: sensor names and classification profiles
//! - **Actuators**: actuator names and intensity bounds
//! - **Thresholds**: alarm thresholds and successful-cycle bands
//! - **Buffers**: capacity limits

/// Sensor names and classification profiles.
pub mod sensors;

/// Actuator names and intensity bounds.
pub mod actuators;

/// Alarm thresholds, equality tolerance and success bands.
pub mod thresholds;

/// History and state-history capacities.
pub mod buffers;

pub use buffers::{
    DEFAULT_HISTORY_CAPACITY, DEFAULT_MOVING_AVERAGE_WINDOW, MIN_STATISTICS_SAMPLES,
    STATE_HISTORY_CAPACITY,
};
pub use thresholds::{EQUALITY_TOLERANCE, MANUAL_SENSITIVITY};
