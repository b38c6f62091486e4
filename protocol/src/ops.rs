//! Tree vocabulary: node classification, structural operations emitted
//! toward the display sink, and non-fatal replay diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::stage::Stage;

/// Sentinel parent reference meaning "attach under the synthetic root".
pub const ROOT_ID: &str = "root";

/// Lineage of a report node. Deletion is an overlay flag on the node,
/// not a kind of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Root,
    Component,
    Verification,
    Safe,
    Unsafe,
    Unknown,
}

impl NodeKind {
    /// Display label for kinds whose label is not taken from the log.
    pub fn fixed_label(self) -> Option<&'static str> {
        match self {
            NodeKind::Safe => Some("Safe"),
            NodeKind::Unsafe => Some("Unsafe"),
            NodeKind::Unknown => Some("Unknown"),
            NodeKind::Root | NodeKind::Component | NodeKind::Verification => None,
        }
    }
}

/// Entity status. `Deleted` is terminal: once set, nothing but the
/// cascade to descendants may touch the node again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeStatus {
    Created,
    InProgress,
    Finished,
    Deleted,
}

impl NodeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeStatus::Created => "created",
            NodeStatus::InProgress => "in-progress",
            NodeStatus::Finished => "finished",
            NodeStatus::Deleted => "deleted",
        }
    }
}

/// One tree mutation command, emitted by the reconstructor and consumed
/// by the (out-of-crate) visual tree widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructuralOp {
    CreateNode {
        parent: String,
        id: String,
        label: String,
        status: NodeStatus,
    },
    MoveNode {
        id: String,
        new_parent: String,
    },
    MarkDeleted {
        id: String,
    },
    UpdateStatus {
        id: String,
        status: NodeStatus,
    },
    /// Advisory highlight of the most recently touched node; meaningful
    /// only during low-speed stepping.
    SelectNode {
        id: String,
    },
}

/// Non-fatal condition raised while applying one event. Surfaced to the
/// audit log; never halts replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// A create event named a parent id not yet introduced.
    OrphanReference {
        stage: Stage,
        id: String,
        parent: String,
    },
    /// A non-create event referenced an id not yet introduced.
    UnknownReference { stage: Stage, id: String },
    /// A parent was deleted while at least one descendant was still
    /// live; the cascade completed anyway.
    PrematureParentDeletion { parent: String, child: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::OrphanReference { stage, id, parent } => write!(
                f,
                "{}: parent {parent} of new node {id} is not known yet",
                stage.as_str()
            ),
            Diagnostic::UnknownReference { stage, id } => {
                write!(f, "{}: node {id} is not known yet", stage.as_str())
            }
            Diagnostic::PrematureParentDeletion { parent, child } => {
                write!(f, "parent {parent} deleted before its descendant {child}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn structural_ops_serialize_round_trip() {
        let op = StructuralOp::CreateNode {
            parent: ROOT_ID.to_string(),
            id: "17".to_string(),
            label: "core".to_string(),
            status: NodeStatus::Created,
        };
        let json = serde_json::to_string(&op).expect("serialize");
        let back: StructuralOp = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(op, back);
    }

    #[test]
    fn diagnostics_render_the_offending_ids() {
        let diag = Diagnostic::OrphanReference {
            stage: Stage::UnsafeCreated,
            id: "5".to_string(),
            parent: "3".to_string(),
        };
        let text = diag.to_string();
        assert!(text.contains("UnsafeCreated"), "{text}");
        assert!(text.contains('5'), "{text}");
        assert!(text.contains('3'), "{text}");
    }

    #[test]
    fn outcome_kinds_carry_fixed_labels() {
        assert_eq!(Some("Safe"), NodeKind::Safe.fixed_label());
        assert_eq!(Some("Unsafe"), NodeKind::Unsafe.fixed_label());
        assert_eq!(Some("Unknown"), NodeKind::Unknown.fixed_label());
        assert_eq!(None, NodeKind::Component.fixed_label());
    }
}
