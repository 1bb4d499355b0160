//! Actuator Names
//!
//! Command templates, state configurations and the actuator bank all use these
//! names. Intensities are percentages.

/// Exhaust fan, cools the air
pub const VENTILATOR: &str = "VENTILATOR";

/// Air heater
pub const HEATER: &str = "HEATER";

/// Drip irrigation, raises soil moisture
pub const IRRIGATION: &str = "IRRIGATION";

/// Supplemental LED lighting
pub const LED_LIGHT: &str = "LED_LIGHT";

/// Fogging nozzles, raise relative humidity
pub const MISTER: &str = "MISTER";

/// Every actuator the reference greenhouse carries
pub const ALL_ACTUATORS: [&str; 5] = [VENTILATOR, HEATER, IRRIGATION, LED_LIGHT, MISTER];

/// Lowest accepted intensity (%)
pub const INTENSITY_MIN: f64 = 0.0;

/// Highest accepted intensity (%)
pub const INTENSITY_MAX: f64 = 100.0;
