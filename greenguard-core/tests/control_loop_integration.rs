//! Integration tests for the control loop
//!
//! Drives the orchestrator through generated scenarios and checks the
//! structures it owns stay consistent tick after tick.

mod common;

use greenguard_core::{
    ActuatorBank, ActuatorCommand, ControlConfig, ControlError, ControlMode, ControlOrchestrator,
    DecisionTrace, FixedTime, OperationMode, Severity, Snapshot, TimeSource, TraceEvent,
};

use common::scenarios::Scenarios;
use common::{calm, sensors, GreenhouseGenerator, TICK_MS};

fn final_action(trace: &DecisionTrace) -> Option<&str> {
    match trace {
        DecisionTrace::RuleTree(events) => events.iter().rev().find_map(|e| match e {
            TraceEvent::Action { label } => Some(label.as_str()),
            _ => None,
        }),
        _ => None,
    }
}

#[test]
fn test_scenarios_with_rule_tree() {
    for scenario in Scenarios::all() {
        let mut orchestrator = ControlOrchestrator::new(ControlConfig::default()).unwrap();
        let mut last = None;
        for (timestamp, values) in &scenario.ticks {
            last = Some(orchestrator.tick(*timestamp, values).unwrap());
        }
        let report = last.unwrap();
        assert_eq!(final_action(&report.trace), Some(scenario.final_action), "{}", scenario.name);
        assert_eq!(orchestrator.cycles(), scenario.ticks.len() as u64);
    }
}

#[test]
fn test_scenarios_with_state_graph() {
    for scenario in Scenarios::all() {
        let mut orchestrator = ControlOrchestrator::new(ControlConfig::state_graph()).unwrap();
        for (timestamp, values) in &scenario.ticks {
            orchestrator.tick(*timestamp, values).unwrap();
        }
        assert_eq!(
            orchestrator.state_graph().current_state(),
            scenario.final_state,
            "{}",
            scenario.name
        );
    }
}

#[test]
fn test_index_and_history_stay_consistent() {
    let config = ControlConfig {
        history_capacity: 100,
        ..ControlConfig::default()
    };
    let mut orchestrator = ControlOrchestrator::new(config).unwrap();
    let mut generator = GreenhouseGenerator::new(7);

    for (timestamp, values) in generator.series(50) {
        orchestrator.tick(timestamp, &values).unwrap();
    }

    // 50 ticks of 7 sensors
    assert_eq!(orchestrator.index().size(), 350);
    assert!(orchestrator.index().is_balanced());
    assert!(orchestrator.index().height() <= 12);
    assert_eq!(orchestrator.history().len(), 100);

    // history keeps the newest readings in arrival order
    let timestamps: Vec<u64> = orchestrator.history().iter().map(|r| r.timestamp()).collect();
    assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*timestamps.last().unwrap(), 50 * TICK_MS);

    // the index serves every tick, including evicted ones
    let first_tick = orchestrator.index().range_by_time(TICK_MS, TICK_MS);
    assert_eq!(first_tick.len(), 7);
    let inorder: Vec<_> = orchestrator.index().inorder();
    assert!(inorder.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_alarm_priorities_across_ticks() {
    let mut orchestrator = ControlOrchestrator::new(ControlConfig::default()).unwrap();
    orchestrator.tick(1, &sensors(&[("SOIL_MOISTURE", 10.0)])).unwrap();
    orchestrator.tick(2, &sensors(&[("SOIL_MOISTURE", 12.0)])).unwrap();
    orchestrator.tick(3, &sensors(&[("TEMP", 45.0)])).unwrap();

    assert_eq!(orchestrator.pending_alarms().len(), 3);

    let first = orchestrator.process_alarm().unwrap();
    assert_eq!(first.severity(), Severity::Critical);
    assert_eq!(first.message(), "Critical temperature: 45C");

    // equal severity: newest first
    let second = orchestrator.process_alarm().unwrap();
    let third = orchestrator.process_alarm().unwrap();
    assert_eq!((second.timestamp(), third.timestamp()), (2, 1));

    assert!(matches!(
        orchestrator.process_alarm(),
        Err(ControlError::EmptyStructure { .. })
    ));
    assert!(orchestrator.alarm_log().iter().all(|a| a.is_resolved()));
}

#[test]
fn test_aborted_tick_changes_nothing() {
    let mut orchestrator = ControlOrchestrator::new(ControlConfig::default()).unwrap();
    orchestrator.tick(1, &calm()).unwrap();
    let before = orchestrator.snapshot();

    let mut bad = calm();
    bad.insert("PH".into(), f64::INFINITY);
    assert!(orchestrator.tick(2, &bad).is_err());

    assert_eq!(orchestrator.snapshot(), before);
    assert_eq!(orchestrator.index().range_by_time(2, 2).len(), 0);
    assert_eq!(orchestrator.aborted_ticks(), 1);

    // the next good tick proceeds normally
    assert_eq!(orchestrator.tick(3, &calm()).unwrap().cycle, 2);
}

#[test]
fn test_mode_switch_mid_run() {
    let mut orchestrator = ControlOrchestrator::new(ControlConfig::default()).unwrap();
    let hot = sensors(&[("TEMP", 37.0), ("SOIL_MOISTURE", 60.0)]);

    let report = orchestrator.tick(1, &hot).unwrap();
    assert_eq!(report.control_mode, ControlMode::RuleTree);

    orchestrator.set_control_mode(ControlMode::StateGraph);
    let report = orchestrator.tick(2, &hot).unwrap();
    assert!(matches!(report.trace, DecisionTrace::StateGraph { changed: true, .. }));

    orchestrator.set_operation_mode(OperationMode::Manual);
    let report = orchestrator.tick(3, &hot).unwrap();
    assert_eq!(report.trace, DecisionTrace::Skipped);
    // state graph is untouched while skipped
    assert_eq!(orchestrator.state_graph().current_state(), "HEAT_EXTREME");

    assert_eq!(orchestrator.mode_stats(OperationMode::Automatic).cycles, 2);
    assert_eq!(orchestrator.mode_stats(OperationMode::Manual).cycles, 1);
}

#[test]
fn test_run_tick_with_collaborators() {
    let mut orchestrator = ControlOrchestrator::new(ControlConfig::default()).unwrap();
    let mut clock = FixedTime::new(0);
    let mut bank = ActuatorBank::reference();
    let mut recorded: Vec<ActuatorCommand> = Vec::new();

    let mut cold = sensors(&[("TEMP", 10.0)]);
    clock.advance(TICK_MS);
    orchestrator.run_tick(&clock, &mut cold, &mut bank).unwrap();
    assert_eq!(bank.intensity("HEATER"), 90.0);
    assert_eq!(bank.active(), vec!["HEATER"]);

    let mut source = calm();
    clock.advance(TICK_MS);
    let report = orchestrator.run_tick(&clock, &mut source, &mut recorded).unwrap();
    assert_eq!(report.timestamp, clock.now());
    assert_eq!(recorded, report.commands);
}

#[test]
fn test_success_rate_and_snapshot() {
    let mut orchestrator = ControlOrchestrator::new(ControlConfig::state_graph()).unwrap();
    let mut generator = GreenhouseGenerator::new(11).with_noise(0.5);
    for (timestamp, values) in generator.series(20) {
        assert!(orchestrator.tick(timestamp, &values).unwrap().successful);
    }
    let stats = orchestrator.mode_stats(OperationMode::Automatic);
    assert_eq!(stats.success_rate(), 100.0);

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.cycles, 20);
    assert_eq!(snapshot.current_state.as_deref(), Some("NORMAL"));
    assert_eq!(snapshot.history_size, 140);
    assert_eq!(Snapshot::decode(&snapshot.encode()).unwrap(), snapshot);
}

#[test]
fn test_statistics_over_history() {
    let mut orchestrator = ControlOrchestrator::new(ControlConfig::default()).unwrap();
    for (i, temp) in [20.0, 21.0, 22.0, 23.0, 24.0].iter().enumerate() {
        orchestrator.tick(i as u64, &sensors(&[("TEMP", *temp)])).unwrap();
    }
    let summary = orchestrator.statistics("TEMP").unwrap();
    assert_eq!(summary.count, 5);
    assert_eq!(summary.mean, 22.0);
    assert_eq!(summary.median, 22.0);
    assert!(orchestrator.statistics("CO2").is_none());

    // five samples fill exactly one default window
    assert_eq!(orchestrator.smoothed("TEMP"), vec![22.0]);
    assert!(orchestrator.smoothed("CO2").is_empty());
}
