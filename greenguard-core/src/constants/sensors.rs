//! Sensor Names and Classification Profiles
//!
//! Sensor maps are keyed by these names. Rule trees and state graphs refer to
//! them inside condition text (`"TEMP>35"`), so changing a name here means
//! changing every topology that mentions it.

// ===== SENSOR NAMES =====

/// Ambient air temperature (°C)
pub const TEMPERATURE: &str = "TEMP";

/// Volumetric soil moisture (%)
pub const SOIL_MOISTURE: &str = "SOIL_MOISTURE";

/// Relative air humidity (%)
pub const RELATIVE_HUMIDITY: &str = "REL_HUMIDITY";

/// Illuminance (lux)
pub const LIGHT: &str = "LIGHT";

/// Soil acidity (pH)
pub const PH: &str = "PH";

/// Carbon dioxide concentration (ppm)
pub const CO2: &str = "CO2";

/// Irrigation tank level (litres)
pub const WATER_LEVEL: &str = "WATER_LEVEL";

/// Every sensor the reference greenhouse carries
pub const ALL_SENSORS: [&str; 7] = [
    TEMPERATURE,
    SOIL_MOISTURE,
    RELATIVE_HUMIDITY,
    LIGHT,
    PH,
    CO2,
    WATER_LEVEL,
];

// ===== CLASSIFICATION PROFILES =====
//
// Each profile is (min, max, alert, critical). A reading is critical at or above
// `critical` or within the bottom 5% of the span; alert at or above `alert`.

/// Fraction of the span above `min` that still counts as critically low
pub const CRITICAL_LOW_FRACTION: f64 = 0.05;

/// Temperature profile (°C)
pub const TEMPERATURE_PROFILE: (f64, f64, f64, f64) = (0.0, 50.0, 35.0, 40.0);

/// Soil and air humidity profile (%)
pub const HUMIDITY_PROFILE: (f64, f64, f64, f64) = (0.0, 100.0, 85.0, 95.0);

/// Light profile (lux)
pub const LIGHT_PROFILE: (f64, f64, f64, f64) = (0.0, 100_000.0, 80_000.0, 95_000.0);

/// pH profile
pub const PH_PROFILE: (f64, f64, f64, f64) = (0.0, 14.0, 8.0, 9.0);

/// CO2 profile (ppm)
pub const CO2_PROFILE: (f64, f64, f64, f64) = (0.0, 2000.0, 1200.0, 1800.0);

/// Water tank profile (litres)
pub const WATER_LEVEL_PROFILE: (f64, f64, f64, f64) = (0.0, 1000.0, 900.0, 950.0);
