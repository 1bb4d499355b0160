//! Basic Control Loop Example
//!
//! Runs the orchestrator through a simulated greenhouse day: a warm afternoon
//! that overheats, then a cold night.
//!
//! ## What You'll Learn
//!
//! - Creating an orchestrator from a configuration
//! - Feeding it sensor maps tick by tick
//! - Reading the commands and decision trace of each tick
//! - Switching between the rule tree and the state graph
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_control_loop
//! ```

use greenguard_core::{ControlConfig, ControlMode, ControlOrchestrator, DecisionTrace, SensorMap};

/// Temperature over 24 hours: 22°C mean, peaking at 38°C mid-afternoon
fn temperature_at(hour: u64) -> f64 {
    let phase = (hour as f64 - 9.0) / 24.0 * 2.0 * core::f64::consts::PI;
    22.0 + 16.0 * libm::sin(phase)
}

fn sensors_at(hour: u64) -> SensorMap {
    [
        ("TEMP", temperature_at(hour)),
        ("SOIL_MOISTURE", 70.0 - hour as f64 * 1.5),
        ("REL_HUMIDITY", 65.0),
        ("WATER_LEVEL", 400.0),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn main() {
    println!("GreenGuard Control Loop Example");
    println!("===============================\n");

    for mode in [ControlMode::RuleTree, ControlMode::StateGraph] {
        let config = ControlConfig {
            control_mode: mode,
            ..ControlConfig::default()
        };
        let mut orchestrator = match ControlOrchestrator::new(config) {
            Ok(o) => o,
            Err(e) => {
                eprintln!("invalid configuration: {e}");
                return;
            }
        };

        println!("--- {mode} ---");
        for hour in 0..24u64 {
            let values = sensors_at(hour);
            let report = match orchestrator.tick(hour * 3_600_000, &values) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("hour {hour}: tick failed: {e}");
                    continue;
                }
            };

            let decision = match &report.trace {
                DecisionTrace::RuleTree(trace) => {
                    trace.last().map(|e| e.to_string()).unwrap_or_default()
                }
                DecisionTrace::StateGraph { to, changed: true, from } => format!("{from} -> {to}"),
                DecisionTrace::StateGraph { to, .. } => to.clone(),
                DecisionTrace::Skipped => "skipped".to_string(),
            };
            println!(
                "{:02}:00  TEMP {:5.1}  {:<28} alarms: {}",
                hour,
                values["TEMP"],
                decision,
                report.new_alarms.len()
            );
        }

        let snapshot = orchestrator.snapshot();
        println!("\nSnapshot:\n{snapshot}");
    }
}
