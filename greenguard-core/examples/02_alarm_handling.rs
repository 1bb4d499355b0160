//! Alarm Handling Example
//!
//! Shows how alarms accumulate in the priority queue and are processed most
//! urgent first, and how manual operation makes thresholds stricter.
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 02_alarm_handling
//! ```

use greenguard_core::{ControlConfig, ControlError, ControlOrchestrator, OperationMode, SensorMap};

fn sensors(pairs: &[(&str, f64)]) -> SensorMap {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn main() -> Result<(), ControlError> {
    println!("GreenGuard Alarm Handling Example");
    println!("=================================\n");

    let mut orchestrator = ControlOrchestrator::new(ControlConfig::default())?;

    orchestrator.tick(1_000, &sensors(&[("SOIL_MOISTURE", 22.0)]))?;
    orchestrator.tick(2_000, &sensors(&[("WATER_LEVEL", 35.0)]))?;
    orchestrator.tick(3_000, &sensors(&[("TEMP", 43.5), ("SOIL_MOISTURE", 18.0)]))?;

    println!("Pending alarms: {}", orchestrator.pending_alarms().len());
    while let Ok(alarm) = orchestrator.process_alarm() {
        println!("  processed {alarm}");
    }

    // Manual mode divides temperature and soil thresholds by 1.5
    orchestrator.set_operation_mode(OperationMode::Manual);
    let report = orchestrator.tick(4_000, &sensors(&[("TEMP", 28.0), ("REL_HUMIDITY", 93.0)]))?;
    println!("\nManual tick raised {} alarms:", report.new_alarms.len());
    for alarm in &report.new_alarms {
        println!("  {alarm}");
    }

    // Non-finite readings abort the tick before anything is stored
    match orchestrator.tick(5_000, &sensors(&[("TEMP", f64::NAN)])) {
        Err(e) => println!("\nRejected tick: {e}"),
        Ok(_) => println!("\nUnexpectedly accepted a NaN reading"),
    }

    println!("\nAlarm log:");
    for alarm in orchestrator.alarm_log() {
        println!("  {alarm}");
    }
    Ok(())
}
