//! Actuator commands

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::actuators::{INTENSITY_MAX, INTENSITY_MIN};

/// Requested setting for one actuator, produced per tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActuatorCommand {
    /// Target actuator
    pub actuator: String,
    /// Intensity in percent, always within `[0, 100]`
    pub intensity: f64,
    /// Why the command was issued
    pub reason: String,
}

impl ActuatorCommand {
    /// Create a command; the intensity is clamped to `[0, 100]`
    pub fn new(actuator: impl Into<String>, intensity: f64, reason: impl Into<String>) -> Self {
        Self {
            actuator: actuator.into(),
            intensity: clamp_intensity(intensity),
            reason: reason.into(),
        }
    }
}

/// Clamp an intensity into the accepted range; NaN becomes 0
pub fn clamp_intensity(intensity: f64) -> f64 {
    if intensity.is_nan() {
        INTENSITY_MIN
    } else {
        intensity.clamp(INTENSITY_MIN, INTENSITY_MAX)
    }
}

impl fmt::Display for ActuatorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {:.0}% ({})", self.actuator, self.intensity, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intensity_is_clamped() {
        assert_eq!(ActuatorCommand::new("HEATER", 140.0, "x").intensity, 100.0);
        assert_eq!(ActuatorCommand::new("HEATER", -3.0, "x").intensity, 0.0);
        assert_eq!(ActuatorCommand::new("HEATER", f64::NAN, "x").intensity, 0.0);
        assert_eq!(ActuatorCommand::new("HEATER", 42.5, "x").intensity, 42.5);
    }

    #[test]
    fn display() {
        let cmd = ActuatorCommand::new("VENTILATOR", 100.0, "COOL MAX");
        assert_eq!(cmd.to_string(), "VENTILATOR -> 100% (COOL MAX)");
    }
}
