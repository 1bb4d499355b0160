//! Reference greenhouse topologies
//!
//! The default rule tree and state graph written as documents. Building them
//! yields the same topologies as `RuleTree::reference()` and
//! `StateGraph::reference()` in the core crate.

use serde_json::json;

use crate::document::{RuleTreeDocument, StateGraphDocument};
use crate::TopologyResult;

/// Registry base name of the reference rule tree
pub const RULE_TREE_NAME: &str = "greenhouse_rules";

/// Registry base name of the reference state graph
pub const STATE_GRAPH_NAME: &str = "greenhouse_states";

/// Reference rule tree v1
///
/// Temperature first, then low temperature, soil moisture and relative
/// humidity, in that priority order.
pub fn greenhouse_rules_v1() -> TopologyResult<RuleTreeDocument> {
    let document = json!({
        "name": RULE_TREE_NAME,
        "version": 1,
        "root": {
            "label": "ROOT",
            "condition": "TEMP>35",
            "on_true": {
                "label": "COOL MAX",
                "actions": [
                    { "actuator": "VENTILATOR", "intensity": 100.0, "reason": "Critical high temperature" },
                    { "actuator": "HEATER", "intensity": 0.0, "reason": "Heating off" },
                    { "actuator": "MISTER", "intensity": 100.0, "reason": "Evaporative cooling" }
                ]
            },
            "on_false": {
                "label": "Check low temperature",
                "condition": "TEMP<15",
                "on_true": {
                    "label": "HEAT",
                    "actions": [
                        { "actuator": "HEATER", "intensity": 90.0, "reason": "Critical low temperature" },
                        { "actuator": "VENTILATOR", "intensity": 0.0, "reason": "Ventilation off" }
                    ]
                },
                "on_false": {
                    "label": "Check soil moisture",
                    "condition": "SOIL_MOISTURE<40",
                    "on_true": {
                        "label": "IRRIGATE",
                        "actions": [
                            { "actuator": "IRRIGATION", "intensity": 100.0, "reason": "Soil very dry" },
                            { "actuator": "MISTER", "intensity": 50.0, "reason": "Raise humidity" },
                            { "actuator": "VENTILATOR", "intensity": 20.0, "reason": "Light circulation" }
                        ]
                    },
                    "on_false": {
                        "label": "Check relative humidity",
                        "condition": "REL_HUMIDITY<60",
                        "on_true": {
                            "label": "MIST",
                            "actions": [
                                { "actuator": "MISTER", "intensity": 80.0, "reason": "Dry air" },
                                { "actuator": "VENTILATOR", "intensity": 15.0, "reason": "Circulation" },
                                { "actuator": "IRRIGATION", "intensity": 30.0, "reason": "Keep soil moist" }
                            ]
                        },
                        "on_false": {
                            "label": "MAINTAIN",
                            "actions": [
                                { "actuator": "VENTILATOR", "intensity": 25.0, "reason": "Circulation" },
                                { "actuator": "IRRIGATION", "intensity": 30.0, "reason": "Keep soil moist" },
                                { "actuator": "LED_LIGHT", "intensity": 60.0, "reason": "Lighting" }
                            ]
                        }
                    }
                }
            }
        }
    });

    Ok(serde_json::from_value(document)?)
}

/// Reference state graph v1
pub fn greenhouse_states_v1() -> TopologyResult<StateGraphDocument> {
    let document = json!({
        "name": STATE_GRAPH_NAME,
        "version": 1,
        "initial": "NORMAL",
        "states": [
            {
                "name": "NORMAL",
                "description": "Optimal greenhouse conditions",
                "actuators": { "VENTILATOR": 20.0, "HEATER": 0.0, "IRRIGATION": 30.0, "LED_LIGHT": 50.0, "MISTER": 0.0 }
            },
            {
                "name": "HEAT_EXTREME",
                "description": "Dangerously high temperature",
                "actuators": { "VENTILATOR": 100.0, "HEATER": 0.0, "IRRIGATION": 80.0, "LED_LIGHT": 0.0, "MISTER": 100.0 }
            },
            {
                "name": "COLD_EXTREME",
                "description": "Dangerously low temperature",
                "actuators": { "VENTILATOR": 0.0, "HEATER": 100.0, "IRRIGATION": 0.0, "LED_LIGHT": 80.0, "MISTER": 0.0 }
            },
            {
                "name": "DROUGHT",
                "description": "Critically dry soil",
                "actuators": { "VENTILATOR": 10.0, "HEATER": 0.0, "IRRIGATION": 100.0, "LED_LIGHT": 40.0, "MISTER": 80.0 }
            },
            {
                "name": "HIGH_HUMIDITY",
                "description": "Excess humidity, fungus risk",
                "actuators": { "VENTILATOR": 80.0, "HEATER": 30.0, "IRRIGATION": 0.0, "LED_LIGHT": 60.0, "MISTER": 0.0 }
            },
            {
                "name": "RECOVERY",
                "description": "Returning to normal conditions",
                "actuators": { "VENTILATOR": 30.0, "HEATER": 10.0, "IRRIGATION": 40.0, "LED_LIGHT": 50.0, "MISTER": 20.0 }
            }
        ],
        "transitions": [
            { "from": "NORMAL", "to": "HEAT_EXTREME", "condition": "TEMP>35", "priority": 1 },
            { "from": "NORMAL", "to": "COLD_EXTREME", "condition": "TEMP<15", "priority": 1 },
            { "from": "NORMAL", "to": "DROUGHT", "condition": "SOIL_MOISTURE<40", "priority": 2 },
            { "from": "NORMAL", "to": "HIGH_HUMIDITY", "condition": "REL_HUMIDITY>85", "priority": 2 },
            { "from": "HEAT_EXTREME", "to": "RECOVERY", "condition": "TEMP<32", "priority": 1 },
            { "from": "HEAT_EXTREME", "to": "DROUGHT", "condition": "SOIL_MOISTURE<30", "priority": 2 },
            { "from": "COLD_EXTREME", "to": "RECOVERY", "condition": "TEMP>18", "priority": 1 },
            { "from": "DROUGHT", "to": "RECOVERY", "condition": "SOIL_MOISTURE>55", "priority": 1 },
            { "from": "DROUGHT", "to": "HEAT_EXTREME", "condition": "TEMP>35", "priority": 2 },
            { "from": "HIGH_HUMIDITY", "to": "RECOVERY", "condition": "REL_HUMIDITY<75", "priority": 1 },
            { "from": "RECOVERY", "to": "NORMAL", "condition": "TEMP>20", "priority": 1 }
        ]
    });

    Ok(serde_json::from_value(document)?)
}
