//! Pre-built scenarios for integration testing
//!
//! Each scenario is a deterministic sequence of ticks plus what the control
//! loop is expected to do with it.

use greenguard_core::{time::Timestamp, SensorMap};

use super::GreenhouseGenerator;

/// A named tick sequence
pub struct Scenario {
    pub name: &'static str,
    pub ticks: Vec<(Timestamp, SensorMap)>,
    /// Rule tree action expected on the final tick
    pub final_action: &'static str,
    /// State graph state expected after the final tick
    pub final_state: &'static str,
}

/// Pre-built scenario definitions
pub struct Scenarios;

impl Scenarios {
    /// Stable conditions for an hour
    pub fn steady_day() -> Scenario {
        Scenario {
            name: "steady_day",
            ticks: GreenhouseGenerator::new(1).series(60),
            final_action: "MAINTAIN",
            final_state: "NORMAL",
        }
    }

    /// Temperature climbing one degree a tick until it passes 35
    pub fn heat_wave() -> Scenario {
        let mut generator = GreenhouseGenerator::new(2).with_noise(0.2);
        let mut ticks = Vec::new();
        for _ in 0..15 {
            generator.drift("TEMP", 1.0);
            ticks.push(generator.next_tick());
        }
        Scenario {
            name: "heat_wave",
            ticks,
            final_action: "COOL MAX",
            final_state: "HEAT_EXTREME",
        }
    }

    /// Freezing night
    pub fn cold_night() -> Scenario {
        Scenario {
            name: "cold_night",
            ticks: GreenhouseGenerator::new(3).with_base("TEMP", 8.0).series(10),
            final_action: "HEAT",
            final_state: "COLD_EXTREME",
        }
    }

    /// Soil drying out at a comfortable temperature
    pub fn drought() -> Scenario {
        Scenario {
            name: "drought",
            ticks: GreenhouseGenerator::new(4).with_base("SOIL_MOISTURE", 25.0).series(10),
            final_action: "IRRIGATE",
            final_state: "DROUGHT",
        }
    }

    /// Every scenario
    pub fn all() -> Vec<Scenario> {
        vec![Self::steady_day(), Self::heat_wave(), Self::cold_night(), Self::drought()]
    }
}
