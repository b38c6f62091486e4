//! Typed event model.
//!
//! A raw log record is a stage tag plus a positional string array; the
//! loader turns each into an `Event` whose payload shape is fixed
//! statically, so replay logic never indexes into untyped field lists.

use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// One log record after load-time validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub stage: Stage,
    /// Opaque ordering/display value. Never used for logic.
    pub timestamp: String,
    pub kind: EventKind,
}

/// Statically shaped payload of an event. Which variant a stage maps to
/// is fixed by `Stage::shape()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Component/verification announce: caches `name` under `temp_id`
    /// for the matching create.
    NamedAnnounce { temp_id: String, name: String },
    /// Informational lookup/announce with no tree effect.
    Announce { id: String },
    /// Introduce a new entity under `parent` (`"root"` or a persistent
    /// id). `label_or_ref` is either a literal display name or the temp
    /// id of a prior named announce.
    Create {
        id: String,
        label_or_ref: String,
        parent: String,
    },
    /// Confirm / cache-sync / found; may drive a status transition.
    Touch { id: String },
    /// Delete with cascade to all current descendants.
    Delete { id: String },
    /// Move an entity under a new parent, keeping its descendants.
    Reparent { id: String, new_parent: String },
}

impl Event {
    /// Persistent report id this event refers to, if it names one.
    /// Named announces only carry a temporary id, so they return `None`.
    pub fn report_id(&self) -> Option<&str> {
        match &self.kind {
            EventKind::NamedAnnounce { .. } => None,
            EventKind::Announce { id }
            | EventKind::Create { id, .. }
            | EventKind::Touch { id }
            | EventKind::Delete { id }
            | EventKind::Reparent { id, .. } => Some(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn report_id_of_named_announce_is_none() {
        let event = Event {
            stage: Stage::ComponentAnnounce,
            timestamp: "0".to_string(),
            kind: EventKind::NamedAnnounce {
                temp_id: "t1".to_string(),
                name: "core".to_string(),
            },
        };
        assert_eq!(None, event.report_id());
    }

    #[test]
    fn report_id_names_the_subject() {
        let event = Event {
            stage: Stage::VerFinishReparented,
            timestamp: "3".to_string(),
            kind: EventKind::Reparent {
                id: "7".to_string(),
                new_parent: "2".to_string(),
            },
        };
        assert_eq!(Some("7"), event.report_id());
    }
}
