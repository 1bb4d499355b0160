//! Capacity Limits
//!
//! Bounds for every structure the orchestrator owns.

/// Default number of readings kept in the bounded history.
///
/// One tick stores one reading per sensor, so with the seven reference sensors
/// this covers roughly 140 ticks.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// Number of previous states remembered by the state graph.
///
/// Compile-time because the history lives in a fixed-capacity ring.
pub const STATE_HISTORY_CAPACITY: usize = 50;

/// Window used by the default moving average over history values
pub const DEFAULT_MOVING_AVERAGE_WINDOW: usize = 5;

/// Readings required before history statistics are considered meaningful
pub const MIN_STATISTICS_SAMPLES: usize = 10;
