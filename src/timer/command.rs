//! Operator command protocol
//!
//! Commands arrive as JSON frames tagged by `action`. Numeric fields are
//! decoded leniently: a live console must never lose the timer to a bad
//! input, so anything that is not a usable number reads as absent and the
//! per-action default applies instead.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Client-to-server frame envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    Cmd(Command),
}

/// Operator commands, one variant per action.
///
/// Unrecognized actions decode to [`Command::Unknown`] and apply as a
/// no-op that still re-broadcasts state, keeping clients in sync.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    Start,
    Pause,
    Reset,
    SetTotal {
        #[serde(default, deserialize_with = "lenient_u64")]
        minutes: Option<u64>,
        #[serde(default, deserialize_with = "lenient_u64")]
        seconds: Option<u64>,
    },
    SetBell {
        #[serde(default, deserialize_with = "lenient_u64")]
        index: Option<u64>,
        #[serde(default, deserialize_with = "lenient_u64")]
        minutes: Option<u64>,
        #[serde(default, deserialize_with = "lenient_u64")]
        seconds: Option<u64>,
        #[serde(default, deserialize_with = "lenient_bool")]
        enabled: Option<bool>,
    },
    ManualBell {
        #[serde(default, deserialize_with = "lenient_u64")]
        count: Option<u64>,
    },
    #[serde(other)]
    Unknown,
}

/// Accepts a JSON number or a numeric string; everything else reads as absent.
fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Accepts a JSON bool or the strings "true"/"false"; everything else reads as absent.
fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => Some(b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Command {
        serde_json::from_str(json).expect("command decodes")
    }

    #[test]
    fn decodes_bare_actions() {
        assert!(matches!(decode(r#"{"action":"start"}"#), Command::Start));
        assert!(matches!(decode(r#"{"action":"pause"}"#), Command::Pause));
        assert!(matches!(decode(r#"{"action":"reset"}"#), Command::Reset));
    }

    #[test]
    fn decodes_set_total_fields() {
        let cmd = decode(r#"{"action":"set_total","minutes":5,"seconds":30}"#);
        match cmd {
            Command::SetTotal { minutes, seconds } => {
                assert_eq!(minutes, Some(5));
                assert_eq!(seconds, Some(30));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let cmd = decode(r#"{"action":"set_total","minutes":"5","seconds":"0"}"#);
        match cmd {
            Command::SetTotal { minutes, seconds } => {
                assert_eq!(minutes, Some(5));
                assert_eq!(seconds, Some(0));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn malformed_numbers_read_as_absent() {
        let cmd = decode(r#"{"action":"set_total","minutes":"abc","seconds":-3}"#);
        match cmd {
            Command::SetTotal { minutes, seconds } => {
                assert_eq!(minutes, None);
                assert_eq!(seconds, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn set_bell_defaults_apply_for_missing_fields() {
        let cmd = decode(r#"{"action":"set_bell","index":2}"#);
        match cmd {
            Command::SetBell {
                index,
                minutes,
                seconds,
                enabled,
            } => {
                assert_eq!(index, Some(2));
                assert_eq!(minutes, None);
                assert_eq!(seconds, None);
                assert_eq!(enabled, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn set_bell_enabled_accepts_bool_and_string() {
        let cmd = decode(r#"{"action":"set_bell","index":0,"enabled":false}"#);
        match cmd {
            Command::SetBell { enabled, .. } => assert_eq!(enabled, Some(false)),
            other => panic!("unexpected command: {other:?}"),
        }
        let cmd = decode(r#"{"action":"set_bell","index":0,"enabled":"true"}"#);
        match cmd {
            Command::SetBell { enabled, .. } => assert_eq!(enabled, Some(true)),
            other => panic!("unexpected command: {other:?}"),
        }
        let cmd = decode(r#"{"action":"set_bell","index":0,"enabled":7}"#);
        match cmd {
            Command::SetBell { enabled, .. } => assert_eq!(enabled, None),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_actions_fall_through() {
        assert!(matches!(
            decode(r#"{"action":"explode","minutes":1}"#),
            Command::Unknown
        ));
    }

    #[test]
    fn envelope_unwraps_commands() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"cmd","data":{"action":"manual_bell","count":2}}"#)
                .expect("envelope decodes");
        let ClientMessage::Cmd(Command::ManualBell { count }) = msg else {
            panic!("unexpected message");
        };
        assert_eq!(count, Some(2));
    }
}
