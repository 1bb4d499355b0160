//! Common test utilities for integration tests
//!
//! This module provides:
//! - A seeded sensor generator producing reproducible greenhouse readings
//! - Pre-built scenarios (heat wave, cold night, drought, ...)
//! - Helpers for building sensor maps by hand

#![allow(dead_code)]

use greenguard_core::{time::Timestamp, SensorMap};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub mod scenarios;

/// Tick interval used by the generators (one minute)
pub const TICK_MS: Timestamp = 60_000;

/// Build a sensor map from literal pairs
pub fn sensors(pairs: &[(&str, f64)]) -> SensorMap {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Readings inside every success band and alarm threshold
pub fn calm() -> SensorMap {
    sensors(&[
        ("TEMP", 25.0),
        ("SOIL_MOISTURE", 65.0),
        ("REL_HUMIDITY", 70.0),
        ("LIGHT", 600.0),
        ("PH", 6.5),
        ("CO2", 800.0),
        ("WATER_LEVEL", 500.0),
    ])
}

/// Seeded generator of greenhouse readings
///
/// Every sensor drifts around a base value with uniform noise. The same seed
/// always yields the same sequence.
pub struct GreenhouseGenerator {
    rng: StdRng,
    base: SensorMap,
    noise: f64,
    timestamp: Timestamp,
}

impl GreenhouseGenerator {
    /// Generator around the calm baseline
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            base: calm(),
            noise: 1.0,
            timestamp: 0,
        }
    }

    /// Override one base value
    pub fn with_base(mut self, sensor: &str, value: f64) -> Self {
        self.base.insert(sensor.to_string(), value);
        self
    }

    /// Set the noise amplitude (uniform in `[-noise, noise]`)
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    /// Shift one base value, e.g. to model a heat wave building up
    pub fn drift(&mut self, sensor: &str, delta: f64) {
        if let Some(v) = self.base.get_mut(sensor) {
            *v += delta;
        }
    }

    /// Next tick's timestamp and readings
    pub fn next_tick(&mut self) -> (Timestamp, SensorMap) {
        self.timestamp += TICK_MS;
        let noise = self.noise;
        let values = self
            .base
            .iter()
            .map(|(k, v)| {
                let jitter = if noise > 0.0 { self.rng.gen_range(-noise..=noise) } else { 0.0 };
                (k.clone(), v + jitter)
            })
            .collect();
        (self.timestamp, values)
    }

    /// `n` consecutive ticks
    pub fn series(&mut self, n: usize) -> Vec<(Timestamp, SensorMap)> {
        (0..n).map(|_| self.next_tick()).collect()
    }
}
