//! Reference actuator bank
//!
//! [`ActuatorBank`] remembers the last command each actuator received. It is
//! the sink used in tests and simulations; it models no physical effect.

use std::collections::BTreeMap;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::command::{clamp_intensity, ActuatorCommand};
use crate::constants::actuators::ALL_ACTUATORS;
use crate::traits::ActuatorSink;

/// Last known setting of one actuator
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ActuatorState {
    /// Intensity in percent
    pub intensity: f64,
    /// On iff intensity is above zero
    pub active: bool,
}

/// Actuator name to its last applied setting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActuatorBank {
    actuators: BTreeMap<String, ActuatorState>,
    applied: u64,
}

impl ActuatorBank {
    /// Empty bank; actuators appear as commands arrive
    pub fn new() -> Self {
        Self::default()
    }

    /// Bank pre-populated with the reference actuators, all off
    pub fn reference() -> Self {
        Self {
            actuators: ALL_ACTUATORS
                .iter()
                .map(|name| (name.to_string(), ActuatorState::default()))
                .collect(),
            applied: 0,
        }
    }

    /// Setting of one actuator
    pub fn get(&self, actuator: &str) -> Option<ActuatorState> {
        self.actuators.get(actuator).copied()
    }

    /// Intensity of one actuator, 0 if never commanded
    pub fn intensity(&self, actuator: &str) -> f64 {
        self.get(actuator).map_or(0.0, |s| s.intensity)
    }

    /// Names of actuators currently on
    pub fn active(&self) -> Vec<&str> {
        self.actuators
            .iter()
            .filter(|(_, s)| s.active)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Number of commands applied so far
    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// Every actuator and its state, by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, ActuatorState)> {
        self.actuators.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Switch everything off
    pub fn shutdown(&mut self) {
        for state in self.actuators.values_mut() {
            *state = ActuatorState::default();
        }
    }
}

impl ActuatorSink for ActuatorBank {
    fn apply(&mut self, command: &ActuatorCommand) {
        let intensity = clamp_intensity(command.intensity);
        trace!("actuator {} set to {:.1}", command.actuator, intensity);
        self.actuators.insert(
            command.actuator.clone(),
            ActuatorState {
                intensity,
                active: intensity > 0.0,
            },
        );
        self.applied += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_and_clamps() {
        let mut bank = ActuatorBank::reference();
        bank.apply(&ActuatorCommand {
            actuator: "HEATER".into(),
            intensity: 150.0,
            reason: "raw".into(),
        });
        bank.apply(&ActuatorCommand::new("VENTILATOR", 0.0, "off"));

        assert_eq!(bank.intensity("HEATER"), 100.0);
        assert_eq!(bank.get("VENTILATOR"), Some(ActuatorState { intensity: 0.0, active: false }));
        assert_eq!(bank.active(), vec!["HEATER"]);
        assert_eq!(bank.applied(), 2);
    }

    #[test]
    fn unknown_actuators_are_recorded() {
        let mut bank = ActuatorBank::new();
        bank.apply(&ActuatorCommand::new("CO2_VALVE", 40.0, "enrich"));
        assert_eq!(bank.intensity("CO2_VALVE"), 40.0);
        assert_eq!(bank.iter().count(), 1);
    }

    #[test]
    fn shutdown_turns_everything_off() {
        let mut bank = ActuatorBank::reference();
        bank.apply(&ActuatorCommand::new("MISTER", 80.0, "dry"));
        bank.shutdown();
        assert!(bank.active().is_empty());
        assert_eq!(bank.iter().count(), 5);
    }
}
