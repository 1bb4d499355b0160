//! Alarm Thresholds and Success Bands
//!
//! Reference alarm policy for the greenhouse. All values can be overridden
//! through [`crate::config::AlarmPolicy`]; these are the defaults.

// ===== ALARM THRESHOLDS =====

/// Temperature below this raises a critical alarm (°C)
pub const TEMPERATURE_MIN_C: f64 = 5.0;

/// Temperature above this raises a critical alarm (°C)
pub const TEMPERATURE_MAX_C: f64 = 40.0;

/// Soil moisture below this raises a high-severity alarm (%)
pub const SOIL_MOISTURE_MIN_PCT: f64 = 30.0;

/// Water level below this raises a critical alarm (litres).
///
/// Never scaled by the manual sensitivity multiplier.
pub const WATER_LEVEL_MIN_L: f64 = 50.0;

/// Relative humidity below this raises a medium alarm in manual mode (%)
pub const HUMIDITY_MIN_PCT: f64 = 40.0;

/// Relative humidity above this raises a medium alarm in manual mode (%)
pub const HUMIDITY_MAX_PCT: f64 = 90.0;

/// Manual mode divides the scaled thresholds by this factor
pub const MANUAL_SENSITIVITY: f64 = 1.5;

// ===== CONDITION EVALUATION =====

/// Tolerance of the `=` operator in conditions
pub const EQUALITY_TOLERANCE: f64 = 0.1;

// ===== SUCCESSFUL CYCLE BANDS =====

/// Temperature band of a successful cycle (°C, inclusive)
pub const SUCCESS_TEMPERATURE_C: (f64, f64) = (18.0, 32.0);

/// Soil moisture band of a successful cycle (%, inclusive)
pub const SUCCESS_SOIL_MOISTURE_PCT: (f64, f64) = (50.0, 80.0);
