//! Collaborator traits
//!
//! The control loop never touches hardware. It reads sensors through
//! [`SensorSource`] and hands commands to an [`ActuatorSink`]; whatever sits
//! behind those traits (a simulator, a fieldbus driver, a test fixture) is
//! somebody else's concern.

use crate::command::ActuatorCommand;
use crate::reading::SensorMap;

/// A single sensor that can be sampled
pub trait Sensor {
    /// Name the value is reported under, e.g. `"TEMP"`
    fn name(&self) -> &str;

    /// Take one sample
    fn read(&mut self) -> f64;
}

/// Produces every sensor value once per tick
pub trait SensorSource {
    /// Sample all sensors
    fn read_all(&mut self) -> SensorMap;
}

/// Receives the commands of a tick
pub trait ActuatorSink {
    /// Apply one command
    fn apply(&mut self, command: &ActuatorCommand);
}

impl SensorSource for SensorMap {
    fn read_all(&mut self) -> SensorMap {
        self.clone()
    }
}

impl<S: Sensor> SensorSource for Vec<S> {
    fn read_all(&mut self) -> SensorMap {
        self.iter_mut()
            .map(|sensor| {
                let value = sensor.read();
                (sensor.name().to_string(), value)
            })
            .collect()
    }
}

impl<S: SensorSource + ?Sized> SensorSource for &mut S {
    fn read_all(&mut self) -> SensorMap {
        (**self).read_all()
    }
}

/// Records commands in order
impl ActuatorSink for Vec<ActuatorCommand> {
    fn apply(&mut self, command: &ActuatorCommand) {
        self.push(command.clone());
    }
}

impl<A: ActuatorSink + ?Sized> ActuatorSink for &mut A {
    fn apply(&mut self, command: &ActuatorCommand) {
        (**self).apply(command)
    }
}
