//! Orchestrator snapshot encoding
//!
//! A flat `KEY:value` text form for a persistence collaborator, one key per
//! line, terminated by a sentinel line:
//!
//! ```text
//! CYCLES:42
//! ACTIVE_ALARMS:1
//! CONTROL_MODE:STATE_GRAPH
//! OPERATION_MODE:AUTOMATIC
//! CURRENT_STATE:RECOVERY
//! HISTORY_SIZE:294
//! AVL_HEIGHT:9
//! END_SNAPSHOT
//! ```
//!
//! `CURRENT_STATE` is only written in state-graph mode. Nothing in the control
//! loop reads this format back; [`Snapshot::decode`] exists for the collaborator.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{ControlMode, OperationMode};
use crate::errors::{ControlError, ControlResult};

/// Final line of every encoded snapshot
pub const SENTINEL: &str = "END_SNAPSHOT";

const CYCLES: &str = "CYCLES";
const ACTIVE_ALARMS: &str = "ACTIVE_ALARMS";
const CONTROL_MODE: &str = "CONTROL_MODE";
const OPERATION_MODE: &str = "OPERATION_MODE";
const CURRENT_STATE: &str = "CURRENT_STATE";
const HISTORY_SIZE: &str = "HISTORY_SIZE";
const AVL_HEIGHT: &str = "AVL_HEIGHT";

/// Point-in-time summary of the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Ticks completed
    pub cycles: u64,
    /// Alarms waiting in the queue
    pub active_alarms: usize,
    /// Decision engine in use
    pub control_mode: ControlMode,
    /// Automatic or manual
    pub operation_mode: OperationMode,
    /// State graph state, when the state graph is active
    pub current_state: Option<String>,
    /// Readings in the bounded history
    pub history_size: usize,
    /// Height of the time index
    pub index_height: u32,
}

impl Snapshot {
    /// Encode as `KEY:value` lines plus the sentinel
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Decode text produced by [`Snapshot::encode`]
    ///
    /// Unknown keys are skipped. Input without the sentinel, with a line lacking
    /// `:`, or with an unparsable value is rejected.
    pub fn decode(text: &str) -> ControlResult<Self> {
        let mut cycles = None;
        let mut active_alarms = None;
        let mut control_mode = None;
        let mut operation_mode = None;
        let mut current_state = None;
        let mut history_size = None;
        let mut index_height = None;
        let mut terminated = false;

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if line == SENTINEL {
                terminated = true;
                break;
            }
            let (key, value) = line
                .split_once(':')
                .ok_or_else(|| malformed(format!("line '{line}' has no ':'")))?;
            let value = value.trim();
            match key.trim() {
                CYCLES => cycles = Some(number(key, value)?),
                ACTIVE_ALARMS => active_alarms = Some(number(key, value)?),
                HISTORY_SIZE => history_size = Some(number(key, value)?),
                AVL_HEIGHT => index_height = Some(number(key, value)?),
                CONTROL_MODE => {
                    control_mode = Some(
                        ControlMode::from_name(value)
                            .ok_or_else(|| malformed(format!("unknown control mode '{value}'")))?,
                    )
                }
                OPERATION_MODE => {
                    operation_mode = Some(
                        OperationMode::from_name(value)
                            .ok_or_else(|| malformed(format!("unknown operation mode '{value}'")))?,
                    )
                }
                CURRENT_STATE => current_state = Some(value.to_string()),
                _ => {}
            }
        }

        if !terminated {
            return Err(malformed(format!("missing {SENTINEL}")));
        }

        Ok(Self {
            cycles: required(CYCLES, cycles)?,
            active_alarms: required(ACTIVE_ALARMS, active_alarms)?,
            control_mode: required(CONTROL_MODE, control_mode)?,
            operation_mode: required(OPERATION_MODE, operation_mode)?,
            current_state,
            history_size: required(HISTORY_SIZE, history_size)?,
            index_height: required(AVL_HEIGHT, index_height)?,
        })
    }
}

fn malformed(reason: String) -> ControlError {
    ControlError::MalformedSnapshot { reason }
}

fn number<T: FromStr>(key: &str, value: &str) -> ControlResult<T> {
    value
        .parse()
        .map_err(|_| malformed(format!("{key} value '{value}' is not a number")))
}

fn required<T>(key: &str, value: Option<T>) -> ControlResult<T> {
    value.ok_or_else(|| malformed(format!("missing {key}")))
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{CYCLES}:{}", self.cycles)?;
        writeln!(f, "{ACTIVE_ALARMS}:{}", self.active_alarms)?;
        writeln!(f, "{CONTROL_MODE}:{}", self.control_mode)?;
        writeln!(f, "{OPERATION_MODE}:{}", self.operation_mode)?;
        if let Some(state) = &self.current_state {
            writeln!(f, "{CURRENT_STATE}:{state}")?;
        }
        writeln!(f, "{HISTORY_SIZE}:{}", self.history_size)?;
        writeln!(f, "{AVL_HEIGHT}:{}", self.index_height)?;
        writeln!(f, "{SENTINEL}")
    }
}

impl FromStr for Snapshot {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        Snapshot {
            cycles: 42,
            active_alarms: 1,
            control_mode: ControlMode::StateGraph,
            operation_mode: OperationMode::Automatic,
            current_state: Some("RECOVERY".into()),
            history_size: 294,
            index_height: 9,
        }
    }

    #[test]
    fn encoding_layout() {
        let text = sample().encode();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.first(), Some(&"CYCLES:42"));
        assert_eq!(lines.last(), Some(&"END_SNAPSHOT"));
        assert!(lines.contains(&"CURRENT_STATE:RECOVERY"));
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn decode_inverts_encode() {
        let snapshot = sample();
        assert_eq!(Snapshot::decode(&snapshot.encode()).unwrap(), snapshot);

        let rule_tree = Snapshot {
            control_mode: ControlMode::RuleTree,
            current_state: None,
            ..sample()
        };
        assert!(!rule_tree.encode().contains("CURRENT_STATE"));
        assert_eq!(rule_tree.encode().parse::<Snapshot>().unwrap(), rule_tree);
    }

    #[test]
    fn unknown_keys_are_skipped() {
        let text = sample().encode().replace("CYCLES:42", "CYCLES:42\nSCORE:9000");
        assert_eq!(Snapshot::decode(&text).unwrap(), sample());
    }

    #[test]
    fn rejects_truncated_or_garbled_text() {
        let text = sample().encode().replace("END_SNAPSHOT", "");
        assert!(matches!(Snapshot::decode(&text), Err(ControlError::MalformedSnapshot { .. })));

        let text = sample().encode().replace("CYCLES:42", "CYCLES:many");
        assert!(Snapshot::decode(&text).is_err());

        let text = sample().encode().replace("AVL_HEIGHT:9", "AVL_HEIGHT 9");
        assert!(Snapshot::decode(&text).is_err());

        let text = sample().encode().replace("HISTORY_SIZE:294\n", "");
        assert!(Snapshot::decode(&text).is_err());
    }
}
