//! Log loader: raw payload to validated event sequence.
//!
//! The raw payload is a JSON array of records
//! `{ "stage": tag, "time": opaque, "text": [field, ...] }`. Stage tags
//! outside the closed set and arity mismatches are load-time errors
//! that reject the whole log; replay never sees a malformed event.

use replay_protocol::{Event, EventKind, Stage, StageShape};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Deserialize)]
struct RawRecord {
    stage: String,
    #[serde(default)]
    time: serde_json::Value,
    #[serde(default)]
    text: Vec<String>,
}

/// Fatal load failure. Replay cannot start from a rejected log.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("log payload is not a record array: {source}")]
    InvalidPayload {
        #[from]
        source: serde_json::Error,
    },
    #[error("malformed record at index {index}: {reason}")]
    MalformedRecord { index: usize, reason: MalformedReason },
}

/// Why a single record failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("unknown stage tag `{0}`")]
    UnknownStage(String),
    #[error("stage {stage:?} expects {expected} fields, got {got}")]
    WrongArity {
        stage: Stage,
        expected: usize,
        got: usize,
    },
}

/// Parse a raw log payload into the exact ordered event sequence.
pub fn parse_log(raw: &str) -> Result<Vec<Event>, LoadError> {
    let records: Vec<RawRecord> = serde_json::from_str(raw)?;
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            parse_record(record).map_err(|reason| LoadError::MalformedRecord { index, reason })
        })
        .collect()
}

fn parse_record(record: RawRecord) -> Result<Event, MalformedReason> {
    let stage = Stage::from_tag(&record.stage)
        .ok_or_else(|| MalformedReason::UnknownStage(record.stage.clone()))?;

    let kind = match (stage.shape(), record.text.as_slice()) {
        (StageShape::NamedAnnounce, [temp_id, name]) => EventKind::NamedAnnounce {
            temp_id: temp_id.clone(),
            name: name.clone(),
        },
        (StageShape::Announce, [id]) => EventKind::Announce { id: id.clone() },
        (StageShape::Create, [id, label_or_ref, parent]) => EventKind::Create {
            id: id.clone(),
            label_or_ref: label_or_ref.clone(),
            parent: parent.clone(),
        },
        (StageShape::Touch, [id]) => EventKind::Touch { id: id.clone() },
        (StageShape::Delete, [id]) => EventKind::Delete { id: id.clone() },
        (StageShape::Reparent, [id, new_parent]) => EventKind::Reparent {
            id: id.clone(),
            new_parent: new_parent.clone(),
        },
        _ => {
            return Err(MalformedReason::WrongArity {
                stage,
                expected: stage.arity(),
                got: record.text.len(),
            });
        }
    };

    Ok(Event {
        stage,
        timestamp: display_time(record.time),
        kind,
    })
}

/// The `time` value is opaque: keep strings as-is, render anything else.
fn display_time(time: serde_json::Value) -> String {
    match time {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_records_in_given_order() {
        let raw = r#"[
            {"stage": "ComponentAnnounce", "time": "10:00", "text": ["t1", "core"]},
            {"stage": "ComponentCreated", "time": 17, "text": ["1", "t1", "root"]},
            {"stage": "ComponentCacheSynced", "time": null, "text": ["1"]}
        ]"#;
        let events = parse_log(raw).unwrap();
        assert_eq!(3, events.len());
        assert_eq!(Stage::ComponentAnnounce, events[0].stage);
        assert_eq!("10:00", events[0].timestamp);
        assert_eq!(
            EventKind::NamedAnnounce {
                temp_id: "t1".to_string(),
                name: "core".to_string(),
            },
            events[0].kind
        );
        assert_eq!("17", events[1].timestamp);
        assert_eq!(
            EventKind::Create {
                id: "1".to_string(),
                label_or_ref: "t1".to_string(),
                parent: "root".to_string(),
            },
            events[1].kind
        );
        assert_eq!("", events[2].timestamp);
    }

    #[test]
    fn unknown_stage_rejects_whole_log() {
        let raw = r#"[
            {"stage": "SafeAnnounce", "time": "1", "text": ["9"]},
            {"stage": "SafeObliterated", "time": "2", "text": ["9"]}
        ]"#;
        match parse_log(raw) {
            Err(LoadError::MalformedRecord { index, reason }) => {
                assert_eq!(1, index);
                assert_eq!(MalformedReason::UnknownStage("SafeObliterated".to_string()), reason);
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn wrong_arity_rejects_whole_log() {
        let raw = r#"[
            {"stage": "UnsafeCreated", "time": "1", "text": ["5", "3"]}
        ]"#;
        match parse_log(raw) {
            Err(LoadError::MalformedRecord { index, reason }) => {
                assert_eq!(0, index);
                assert_eq!(
                    MalformedReason::WrongArity {
                        stage: Stage::UnsafeCreated,
                        expected: 3,
                        got: 2,
                    },
                    reason
                );
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn non_array_payload_is_invalid() {
        assert!(matches!(
            parse_log(r#"{"stage": "SafeAnnounce"}"#),
            Err(LoadError::InvalidPayload { .. })
        ));
        assert!(matches!(parse_log("not json"), Err(LoadError::InvalidPayload { .. })));
    }

    #[test]
    fn missing_text_defaults_to_empty_and_fails_arity() {
        let raw = r#"[{"stage": "FinishDeleted", "time": "1"}]"#;
        assert!(matches!(
            parse_log(raw),
            Err(LoadError::MalformedRecord {
                index: 0,
                reason: MalformedReason::WrongArity { got: 0, .. },
            })
        ));
    }

    #[test]
    fn empty_log_is_valid() {
        assert_eq!(Vec::<Event>::new(), parse_log("[]").unwrap());
    }
}
