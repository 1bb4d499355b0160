//! Property tests for the control loop data structures

use greenguard_core::{
    Alarm, AvlTree, BalancedTimeIndex, BoundedHistory, ControlConfig, ControlOrchestrator, MinHeap,
    Reading, Severity, SensorMap,
};
use proptest::prelude::*;

fn severity() -> impl Strategy<Value = Severity> {
    (1u8..=4).prop_map(|level| Severity::from_level(level).unwrap())
}

fn alarm() -> impl Strategy<Value = Alarm> {
    (severity(), 0u64..1000, -50.0f64..150.0)
        .prop_map(|(severity, ts, value)| Alarm::new(severity, ts, "TEMP", format!("value {value}"), "TEMP", value))
}

proptest! {
    #[test]
    fn avl_stays_balanced_and_ordered(keys in prop::collection::vec(any::<i32>(), 0..500)) {
        let mut tree = AvlTree::new();
        for k in &keys {
            tree.insert(*k);
            prop_assert!(tree.is_balanced());
            let inorder: Vec<i32> = tree.iter().copied().collect();
            prop_assert!(inorder.windows(2).all(|w| w[0] < w[1]));
        }

        let mut expected = keys.clone();
        expected.sort_unstable();
        expected.dedup();
        let inorder: Vec<i32> = tree.iter().copied().collect();
        prop_assert_eq!(inorder, expected.clone());
        prop_assert_eq!(tree.len(), expected.len());

        // AVL height bound: h < 1.45 log2(n + 2)
        let bound = 1.45 * ((expected.len() + 2) as f64).log2();
        prop_assert!((tree.height() as f64) < bound + 1.0);
    }

    #[test]
    fn time_index_balanced_after_every_insert(
        readings in prop::collection::vec((0u64..200, 0usize..4, -10.0f64..60.0), 0..300)
    ) {
        const NAMES: [&str; 4] = ["TEMP", "SOIL_MOISTURE", "REL_HUMIDITY", "CO2"];
        let mut index = BalancedTimeIndex::new();
        for (timestamp, sensor, value) in readings {
            index.insert(Reading::classified(timestamp, NAMES[sensor], value));
            prop_assert!(index.is_balanced());
            let keys: Vec<(u64, &str)> =
                index.iter().map(|r| (r.timestamp(), r.sensor_id())).collect();
            prop_assert!(keys.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn avl_range_matches_filter(keys in prop::collection::vec(0i32..1000, 0..300), a in 0i32..1000, b in 0i32..1000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let tree: AvlTree<i32> = keys.iter().copied().collect();
        let got: Vec<i32> = tree.range(&lo, &hi).into_iter().copied().collect();
        let want: Vec<i32> = tree.iter().copied().filter(|k| (lo..=hi).contains(k)).collect();
        prop_assert_eq!(got, want);
    }

    #[test]
    fn heap_extracts_in_priority_order(alarms in prop::collection::vec(alarm(), 1..200)) {
        let mut heap = MinHeap::new();
        for a in &alarms {
            heap.insert(a.clone());
            prop_assert!(heap.is_valid());
        }
        let mut previous: Option<Alarm> = None;
        while let Ok(next) = heap.extract_min() {
            prop_assert!(heap.is_valid());
            if let Some(prev) = &previous {
                prop_assert!(prev <= &next);
                if prev.severity() == next.severity() {
                    prop_assert!(prev.timestamp() >= next.timestamp());
                }
            }
            previous = Some(next);
        }
        prop_assert_eq!(heap.stats().popped as usize, alarms.len());
    }

    #[test]
    fn history_keeps_newest_in_order(capacity in 1usize..50, values in prop::collection::vec(any::<u16>(), 0..200)) {
        let mut history = BoundedHistory::new(capacity);
        let mut evicted = Vec::new();
        for v in &values {
            history.append(*v);
            evicted.extend(history.enforce_cap());
            prop_assert!(history.len() <= capacity);
        }
        let kept: Vec<u16> = history.iter().copied().collect();
        let split = values.len().saturating_sub(capacity);
        prop_assert_eq!(&kept[..], &values[split..]);
        prop_assert_eq!(&evicted[..], &values[..split]);
    }

    #[test]
    fn ticks_never_panic(temp in -20.0f64..60.0, soil in 0.0f64..100.0, rh in 0.0f64..100.0, water in 0.0f64..1000.0) {
        let values: SensorMap = [
            ("TEMP".to_string(), temp),
            ("SOIL_MOISTURE".to_string(), soil),
            ("REL_HUMIDITY".to_string(), rh),
            ("WATER_LEVEL".to_string(), water),
        ]
        .into_iter()
        .collect();

        for config in [ControlConfig::default(), ControlConfig::state_graph(), ControlConfig::manual()] {
            let mut orchestrator = ControlOrchestrator::new(config).unwrap();
            let report = orchestrator.tick(1, &values).unwrap();
            prop_assert!(report.commands.iter().all(|c| (0.0..=100.0).contains(&c.intensity)));
            prop_assert_eq!(orchestrator.alarm_log().len(), report.new_alarms.len());
        }
    }
}
