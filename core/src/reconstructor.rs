//! The replay state machine.
//!
//! `ReplayState::apply` is a synchronous reducer: one event in, a batch
//! of structural ops and at most one diagnostic out. It performs no I/O
//! and never consults a display, so every lifecycle rule is testable
//! against the owned tree model alone.
//!
//! Entity lifecycle: `Announced -> Created -> (status transitions) ->
//! optionally Reparented -> optionally Deleted (terminal)`.

use replay_protocol::{
    Diagnostic, Event, EventKind, NodeKind, NodeStatus, ROOT_ID, Stage, StructuralOp,
};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::registry::EntityRegistry;
use crate::tree::ReportTree;

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApplyOutcome {
    /// Tree mutations to forward to the sink, in emission order.
    pub ops: Vec<StructuralOp>,
    /// At most one non-fatal diagnostic per event.
    pub diagnostic: Option<Diagnostic>,
}

impl ApplyOutcome {
    fn quiet() -> Self {
        Self::default()
    }

    fn with_ops(ops: Vec<StructuralOp>) -> Self {
        Self {
            ops,
            diagnostic: None,
        }
    }

    fn rejected(diagnostic: Diagnostic) -> Self {
        Self {
            ops: Vec::new(),
            diagnostic: Some(diagnostic),
        }
    }
}

/// Tree, registry, and the announced-name side table for one session.
#[derive(Debug, Clone, Default)]
pub struct ReplayState {
    tree: ReportTree,
    registry: EntityRegistry,
    /// Display names proposed by named announces, keyed by temp id.
    /// Internal side table; not part of any `ReportNode`.
    announced_names: HashMap<String, String>,
}

impl ReplayState {
    pub fn new() -> Self {
        Self {
            tree: ReportTree::new(),
            registry: EntityRegistry::new(),
            announced_names: HashMap::new(),
        }
    }

    /// Back to the root-only initial state.
    pub fn reset(&mut self) {
        self.tree.clear();
        self.registry.clear();
        self.announced_names.clear();
    }

    pub fn tree(&self) -> &ReportTree {
        &self.tree
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Apply one event. Diagnostics are reported, never thrown: the log
    /// producer may race ahead of causal order, so out-of-registry
    /// references skip the event and replay continues.
    pub fn apply(&mut self, event: &Event) -> ApplyOutcome {
        let outcome = match &event.kind {
            EventKind::NamedAnnounce { temp_id, name } => {
                self.announced_names.insert(temp_id.clone(), name.clone());
                ApplyOutcome::quiet()
            }
            EventKind::Announce { .. } => ApplyOutcome::quiet(),
            EventKind::Create {
                id,
                label_or_ref,
                parent,
            } => self.apply_create(event.stage, id, label_or_ref, parent),
            EventKind::Touch { id } => self.apply_touch(event.stage, id),
            EventKind::Delete { id } => self.apply_delete(event.stage, id),
            EventKind::Reparent { id, new_parent } => {
                self.apply_reparent(event.stage, id, new_parent)
            }
        };
        if let Some(diagnostic) = &outcome.diagnostic {
            warn!(stage = event.stage.as_str(), %diagnostic, "replay diagnostic");
        } else if !outcome.ops.is_empty() {
            debug!(
                stage = event.stage.as_str(),
                ops = outcome.ops.len(),
                "event applied"
            );
        }
        outcome
    }

    fn apply_create(
        &mut self,
        stage: Stage,
        id: &str,
        label_or_ref: &str,
        parent: &str,
    ) -> ApplyOutcome {
        if self.registry.contains(id) {
            // Benign re-create from a racing producer; the node stands.
            return ApplyOutcome::with_ops(vec![StructuralOp::SelectNode { id: id.to_string() }]);
        }
        if parent != ROOT_ID && !self.registry.contains(parent) {
            return ApplyOutcome::rejected(Diagnostic::OrphanReference {
                stage,
                id: id.to_string(),
                parent: parent.to_string(),
            });
        }
        let kind = stage.created_kind().unwrap_or(NodeKind::Component);
        let label = match kind.fixed_label() {
            Some(fixed) => fixed.to_string(),
            None => self
                .announced_names
                .get(label_or_ref)
                .cloned()
                .unwrap_or_else(|| label_or_ref.to_string()),
        };
        self.registry.introduce(id);
        self.tree.attach(parent, id, kind, label.clone());
        ApplyOutcome::with_ops(vec![StructuralOp::CreateNode {
            parent: parent.to_string(),
            id: id.to_string(),
            label,
            status: NodeStatus::Created,
        }])
    }

    fn apply_touch(&mut self, stage: Stage, id: &str) -> ApplyOutcome {
        if !self.registry.contains(id) {
            return ApplyOutcome::rejected(Diagnostic::UnknownReference {
                stage,
                id: id.to_string(),
            });
        }
        if self.tree.node(id).is_some_and(|n| n.deleted) {
            // Deleted is terminal; late confirmations are accepted no-ops.
            return ApplyOutcome::quiet();
        }
        match stage.touch_status() {
            Some(status) => {
                self.tree.set_status(id, status);
                ApplyOutcome::with_ops(vec![StructuralOp::UpdateStatus {
                    id: id.to_string(),
                    status,
                }])
            }
            None => ApplyOutcome::with_ops(vec![StructuralOp::SelectNode { id: id.to_string() }]),
        }
    }

    fn apply_delete(&mut self, stage: Stage, id: &str) -> ApplyOutcome {
        if !self.registry.contains(id) {
            return ApplyOutcome::rejected(Diagnostic::UnknownReference {
                stage,
                id: id.to_string(),
            });
        }
        if self.tree.node(id).is_some_and(|n| n.deleted) {
            return ApplyOutcome::quiet();
        }

        let descendants = self.tree.descendants(id);
        // An ordering violation, not a rejection: the cascade completes.
        let premature = descendants
            .iter()
            .find(|d| self.tree.node(d).is_some_and(|n| !n.deleted))
            .map(|child| Diagnostic::PrematureParentDeletion {
                parent: id.to_string(),
                child: child.clone(),
            });

        let mut ops = Vec::new();
        self.tree.mark_deleted(id);
        ops.push(StructuralOp::MarkDeleted { id: id.to_string() });
        for descendant in descendants {
            if self.tree.node(&descendant).is_some_and(|n| n.deleted) {
                continue;
            }
            self.tree.mark_deleted(&descendant);
            ops.push(StructuralOp::MarkDeleted { id: descendant });
        }
        ApplyOutcome {
            ops,
            diagnostic: premature,
        }
    }

    fn apply_reparent(&mut self, stage: Stage, id: &str, new_parent: &str) -> ApplyOutcome {
        if !self.registry.contains(id) {
            return ApplyOutcome::rejected(Diagnostic::UnknownReference {
                stage,
                id: id.to_string(),
            });
        }
        if new_parent != ROOT_ID && !self.registry.contains(new_parent) {
            return ApplyOutcome::rejected(Diagnostic::UnknownReference {
                stage,
                id: new_parent.to_string(),
            });
        }
        if self.tree.node(id).is_some_and(|n| n.deleted) {
            // Terminal state: the parent link may not change anymore.
            return ApplyOutcome::quiet();
        }
        if !self.tree.reparent(id, new_parent) {
            return ApplyOutcome::quiet();
        }
        ApplyOutcome::with_ops(vec![StructuralOp::MoveNode {
            id: id.to_string(),
            new_parent: new_parent.to_string(),
        }])
    }
}
