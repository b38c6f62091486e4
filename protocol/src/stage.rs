//! Stage tags for report-construction log records.
//!
//! Every log record carries one of these tags. The set is closed: a
//! record with any other tag is rejected at load time, never at replay
//! time.

use serde::{Deserialize, Serialize};

/// Payload shape of a stage. Fixes the field arity of the raw record
/// and selects the replay dispatch path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageShape {
    /// `[tempId, displayName]` — caches a proposed display name for a
    /// later matching create.
    NamedAnnounce,
    /// `[id]` — informational only, no tree effect.
    Announce,
    /// `[persistentId, displayName|announceTempId, parentPersistentId]`
    Create,
    /// `[id]` — confirm / cache-sync / found; may update status.
    Touch,
    /// `[id]` — delete with cascade to descendants.
    Delete,
    /// `[id, newParentId]`
    Reparent,
}

impl StageShape {
    /// Fixed field arity for records of this shape.
    pub fn arity(self) -> usize {
        match self {
            StageShape::NamedAnnounce => 2,
            StageShape::Announce => 1,
            StageShape::Create => 3,
            StageShape::Touch => 1,
            StageShape::Delete => 1,
            StageShape::Reparent => 2,
        }
    }
}

/// Lifecycle stage tag of one log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    ComponentAnnounce,
    ComponentCreated,
    ComponentCacheSynced,
    VerificationAnnounce,
    VerificationCreated,
    VerificationCacheSynced,
    CoverageLookup,
    CoverageFound,
    CoverageSaved,
    PatchLookup,
    PatchFound,
    PatchApplied,
    PatchSourcesUpdated,
    FinishLookup,
    FinishFound,
    FinishApplied,
    FinishCacheSynced,
    FinishDeleted,
    VerFinishLookup,
    VerFinishFound,
    VerFinishDeleted,
    VerFinishReparented,
    VerFinishApplied,
    VerFinishCacheSynced,
    UnknownAnnounce,
    UnknownCreated,
    UnknownCacheSynced,
    SafeAnnounce,
    SafeCreated,
    SafeCacheSynced,
    UnsafeAnnounce,
    UnsafeCreated,
    UnsafeCacheSynced,
}

impl Stage {
    /// All stages, in the order the producer's lifecycle introduces them.
    pub const ALL: [Stage; 33] = [
        Stage::ComponentAnnounce,
        Stage::ComponentCreated,
        Stage::ComponentCacheSynced,
        Stage::VerificationAnnounce,
        Stage::VerificationCreated,
        Stage::VerificationCacheSynced,
        Stage::CoverageLookup,
        Stage::CoverageFound,
        Stage::CoverageSaved,
        Stage::PatchLookup,
        Stage::PatchFound,
        Stage::PatchApplied,
        Stage::PatchSourcesUpdated,
        Stage::FinishLookup,
        Stage::FinishFound,
        Stage::FinishApplied,
        Stage::FinishCacheSynced,
        Stage::FinishDeleted,
        Stage::VerFinishLookup,
        Stage::VerFinishFound,
        Stage::VerFinishDeleted,
        Stage::VerFinishReparented,
        Stage::VerFinishApplied,
        Stage::VerFinishCacheSynced,
        Stage::UnknownAnnounce,
        Stage::UnknownCreated,
        Stage::UnknownCacheSynced,
        Stage::SafeAnnounce,
        Stage::SafeCreated,
        Stage::SafeCacheSynced,
        Stage::UnsafeAnnounce,
        Stage::UnsafeCreated,
        Stage::UnsafeCacheSynced,
    ];

    /// Canonical tag as it appears in the raw log.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::ComponentAnnounce => "ComponentAnnounce",
            Stage::ComponentCreated => "ComponentCreated",
            Stage::ComponentCacheSynced => "ComponentCacheSynced",
            Stage::VerificationAnnounce => "VerificationAnnounce",
            Stage::VerificationCreated => "VerificationCreated",
            Stage::VerificationCacheSynced => "VerificationCacheSynced",
            Stage::CoverageLookup => "CoverageLookup",
            Stage::CoverageFound => "CoverageFound",
            Stage::CoverageSaved => "CoverageSaved",
            Stage::PatchLookup => "PatchLookup",
            Stage::PatchFound => "PatchFound",
            Stage::PatchApplied => "PatchApplied",
            Stage::PatchSourcesUpdated => "PatchSourcesUpdated",
            Stage::FinishLookup => "FinishLookup",
            Stage::FinishFound => "FinishFound",
            Stage::FinishApplied => "FinishApplied",
            Stage::FinishCacheSynced => "FinishCacheSynced",
            Stage::FinishDeleted => "FinishDeleted",
            Stage::VerFinishLookup => "VerFinishLookup",
            Stage::VerFinishFound => "VerFinishFound",
            Stage::VerFinishDeleted => "VerFinishDeleted",
            Stage::VerFinishReparented => "VerFinishReparented",
            Stage::VerFinishApplied => "VerFinishApplied",
            Stage::VerFinishCacheSynced => "VerFinishCacheSynced",
            Stage::UnknownAnnounce => "UnknownAnnounce",
            Stage::UnknownCreated => "UnknownCreated",
            Stage::UnknownCacheSynced => "UnknownCacheSynced",
            Stage::SafeAnnounce => "SafeAnnounce",
            Stage::SafeCreated => "SafeCreated",
            Stage::SafeCacheSynced => "SafeCacheSynced",
            Stage::UnsafeAnnounce => "UnsafeAnnounce",
            Stage::UnsafeCreated => "UnsafeCreated",
            Stage::UnsafeCacheSynced => "UnsafeCacheSynced",
        }
    }

    /// Parse a raw tag. `None` means the tag is outside the closed set.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Stage::ALL.iter().copied().find(|s| s.as_str() == tag)
    }

    /// Payload shape, which also fixes the record arity.
    pub fn shape(self) -> StageShape {
        match self {
            Stage::ComponentAnnounce | Stage::VerificationAnnounce => StageShape::NamedAnnounce,
            Stage::CoverageLookup
            | Stage::PatchLookup
            | Stage::FinishLookup
            | Stage::VerFinishLookup
            | Stage::UnknownAnnounce
            | Stage::SafeAnnounce
            | Stage::UnsafeAnnounce => StageShape::Announce,
            Stage::ComponentCreated
            | Stage::VerificationCreated
            | Stage::UnknownCreated
            | Stage::SafeCreated
            | Stage::UnsafeCreated => StageShape::Create,
            Stage::ComponentCacheSynced
            | Stage::VerificationCacheSynced
            | Stage::CoverageFound
            | Stage::CoverageSaved
            | Stage::PatchFound
            | Stage::PatchApplied
            | Stage::PatchSourcesUpdated
            | Stage::FinishFound
            | Stage::FinishApplied
            | Stage::FinishCacheSynced
            | Stage::VerFinishFound
            | Stage::VerFinishApplied
            | Stage::VerFinishCacheSynced
            | Stage::UnknownCacheSynced
            | Stage::SafeCacheSynced
            | Stage::UnsafeCacheSynced => StageShape::Touch,
            Stage::FinishDeleted | Stage::VerFinishDeleted => StageShape::Delete,
            Stage::VerFinishReparented => StageShape::Reparent,
        }
    }

    /// Fixed field arity for this stage.
    pub fn arity(self) -> usize {
        self.shape().arity()
    }

    /// Audit-display grouping of the stage.
    pub fn category(self) -> &'static str {
        match self {
            Stage::ComponentAnnounce | Stage::ComponentCreated | Stage::ComponentCacheSynced => {
                "component"
            }
            Stage::VerificationAnnounce
            | Stage::VerificationCreated
            | Stage::VerificationCacheSynced => "verification",
            Stage::CoverageLookup | Stage::CoverageFound | Stage::CoverageSaved => "coverage",
            Stage::PatchLookup
            | Stage::PatchFound
            | Stage::PatchApplied
            | Stage::PatchSourcesUpdated => "patch",
            Stage::FinishLookup
            | Stage::FinishFound
            | Stage::FinishApplied
            | Stage::FinishCacheSynced
            | Stage::FinishDeleted => "finish",
            Stage::VerFinishLookup
            | Stage::VerFinishFound
            | Stage::VerFinishDeleted
            | Stage::VerFinishReparented
            | Stage::VerFinishApplied
            | Stage::VerFinishCacheSynced => "ver-finish",
            Stage::UnknownAnnounce | Stage::UnknownCreated | Stage::UnknownCacheSynced => "unknown",
            Stage::SafeAnnounce | Stage::SafeCreated | Stage::SafeCacheSynced => "safe",
            Stage::UnsafeAnnounce | Stage::UnsafeCreated | Stage::UnsafeCacheSynced => "unsafe",
        }
    }

    /// Node kind introduced by a `Create`-shaped stage, `None` otherwise.
    pub fn created_kind(self) -> Option<crate::ops::NodeKind> {
        use crate::ops::NodeKind;
        match self {
            Stage::ComponentCreated => Some(NodeKind::Component),
            Stage::VerificationCreated => Some(NodeKind::Verification),
            Stage::SafeCreated => Some(NodeKind::Safe),
            Stage::UnsafeCreated => Some(NodeKind::Unsafe),
            Stage::UnknownCreated => Some(NodeKind::Unknown),
            _ => None,
        }
    }

    /// Status a `Touch`-shaped stage drives the entity into, `None` when
    /// the touch is a confirmation with no status meaning.
    pub fn touch_status(self) -> Option<crate::ops::NodeStatus> {
        use crate::ops::NodeStatus;
        match self {
            Stage::FinishApplied | Stage::VerFinishApplied => Some(NodeStatus::Finished),
            Stage::CoverageSaved | Stage::PatchApplied | Stage::PatchSourcesUpdated => {
                Some(NodeStatus::InProgress)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_tag_round_trips() {
        for stage in Stage::ALL {
            assert_eq!(Some(stage), Stage::from_tag(stage.as_str()));
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert_eq!(None, Stage::from_tag("TotallyMadeUp"));
        assert_eq!(None, Stage::from_tag(""));
        // Tag matching is exact, not case-insensitive.
        assert_eq!(None, Stage::from_tag("componentannounce"));
    }

    #[test]
    fn arity_follows_shape() {
        assert_eq!(2, Stage::ComponentAnnounce.arity());
        assert_eq!(1, Stage::SafeAnnounce.arity());
        assert_eq!(3, Stage::UnsafeCreated.arity());
        assert_eq!(1, Stage::FinishApplied.arity());
        assert_eq!(1, Stage::FinishDeleted.arity());
        assert_eq!(2, Stage::VerFinishReparented.arity());
    }

    #[test]
    fn only_created_stages_introduce_kinds() {
        let creators: Vec<Stage> = Stage::ALL
            .into_iter()
            .filter(|s| s.created_kind().is_some())
            .collect();
        assert_eq!(
            vec![
                Stage::ComponentCreated,
                Stage::VerificationCreated,
                Stage::UnknownCreated,
                Stage::SafeCreated,
                Stage::UnsafeCreated,
            ],
            creators
        );
        for stage in creators {
            assert_eq!(StageShape::Create, stage.shape());
        }
    }

    #[test]
    fn finish_applied_drives_finished_status() {
        use crate::ops::NodeStatus;
        assert_eq!(Some(NodeStatus::Finished), Stage::FinishApplied.touch_status());
        assert_eq!(Some(NodeStatus::Finished), Stage::VerFinishApplied.touch_status());
        assert_eq!(Some(NodeStatus::InProgress), Stage::PatchApplied.touch_status());
        assert_eq!(None, Stage::ComponentCacheSynced.touch_status());
    }
}
