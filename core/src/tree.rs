//! Owned report tree model.
//!
//! The core is the source of truth for tree structure; any display is a
//! projection fed through structural ops. Mutation helpers keep the
//! parent link and the parent's child list consistent atomically, and
//! descendant sets are always computed by traversal so reparenting can
//! never leave a stale closure behind.

use replay_protocol::{NodeKind, NodeStatus, ROOT_ID};
use serde::Serialize;
use std::collections::HashMap;

/// One node of the reconstructed report tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportNode {
    pub id: String,
    pub kind: NodeKind,
    /// `None` only for the synthetic root.
    pub parent: Option<String>,
    /// Child ids in insertion order.
    pub children: Vec<String>,
    pub status: NodeStatus,
    pub label: String,
    /// Deletion overlay. Set together with `status = Deleted`.
    pub deleted: bool,
}

impl ReportNode {
    fn root() -> Self {
        Self {
            id: ROOT_ID.to_string(),
            kind: NodeKind::Root,
            parent: None,
            children: Vec::new(),
            status: NodeStatus::Created,
            label: "Report".to_string(),
            deleted: false,
        }
    }
}

/// Single connected arborescence rooted at the synthetic root, which is
/// present before replay starts.
#[derive(Debug, Clone)]
pub struct ReportTree {
    nodes: HashMap<String, ReportNode>,
}

impl Default for ReportTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportTree {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(ROOT_ID.to_string(), ReportNode::root());
        Self { nodes }
    }

    /// Reset to the root-only state.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.insert(ROOT_ID.to_string(), ReportNode::root());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&ReportNode> {
        self.nodes.get(id)
    }

    /// Node count excluding the synthetic root.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attach a fresh node under `parent`. Returns `false` (tree
    /// unchanged) if the parent is missing or the id is already taken.
    pub fn attach(
        &mut self,
        parent: &str,
        id: &str,
        kind: NodeKind,
        label: String,
    ) -> bool {
        if self.nodes.contains_key(id) {
            return false;
        }
        let Some(parent_node) = self.nodes.get_mut(parent) else {
            return false;
        };
        parent_node.children.push(id.to_string());
        self.nodes.insert(
            id.to_string(),
            ReportNode {
                id: id.to_string(),
                kind,
                parent: Some(parent.to_string()),
                children: Vec::new(),
                status: NodeStatus::Created,
                label,
                deleted: false,
            },
        );
        true
    }

    /// Move `id` under `new_parent`, keeping its descendants. Returns
    /// `false` (tree unchanged) if either end is missing, the move would
    /// root the node under itself or one of its descendants, or `id` is
    /// the root.
    pub fn reparent(&mut self, id: &str, new_parent: &str) -> bool {
        if id == ROOT_ID || !self.nodes.contains_key(new_parent) {
            return false;
        }
        if new_parent == id || self.descendants(id).iter().any(|d| d == new_parent) {
            return false;
        }
        let Some(old_parent) = self.nodes.get(id).and_then(|n| n.parent.clone()) else {
            return false;
        };
        if let Some(old) = self.nodes.get_mut(&old_parent) {
            old.children.retain(|child| child != id);
        }
        if let Some(new) = self.nodes.get_mut(new_parent) {
            new.children.push(id.to_string());
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = Some(new_parent.to_string());
        }
        true
    }

    /// Strict descendants of `id` in preorder. Computed by traversal on
    /// every call; never cached.
    pub fn descendants(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack: Vec<String> = match self.nodes.get(id) {
            Some(node) => node.children.iter().rev().cloned().collect(),
            None => return out,
        };
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                stack.extend(node.children.iter().rev().cloned());
            }
            out.push(current);
        }
        out
    }

    /// Set the deletion overlay on one node. Cascading over descendants
    /// is the reconstructor's job.
    pub fn mark_deleted(&mut self, id: &str) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.status = NodeStatus::Deleted;
            node.deleted = true;
        }
    }

    pub fn set_status(&mut self, id: &str, status: NodeStatus) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.status = status;
        }
    }

    /// Ids of all non-root nodes, unordered.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str).filter(|id| *id != ROOT_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tree_with_chain() -> ReportTree {
        let mut tree = ReportTree::new();
        assert!(tree.attach(ROOT_ID, "1", NodeKind::Component, "core".into()));
        assert!(tree.attach("1", "2", NodeKind::Component, "parser".into()));
        assert!(tree.attach("2", "3", NodeKind::Safe, "Safe".into()));
        tree
    }

    #[test]
    fn attach_keeps_both_directions_consistent() {
        let tree = tree_with_chain();
        assert_eq!(vec!["1".to_string()], tree.node(ROOT_ID).unwrap().children);
        assert_eq!(Some("1".to_string()), tree.node("2").unwrap().parent);
        assert_eq!(vec!["2".to_string()], tree.node("1").unwrap().children);
    }

    #[test]
    fn attach_rejects_missing_parent_and_duplicate_id() {
        let mut tree = tree_with_chain();
        assert!(!tree.attach("99", "4", NodeKind::Safe, "Safe".into()));
        assert!(!tree.contains("4"));
        assert!(!tree.attach(ROOT_ID, "1", NodeKind::Component, "dup".into()));
        assert_eq!(3, tree.len());
    }

    #[test]
    fn descendants_are_preorder_and_recomputed() {
        let mut tree = tree_with_chain();
        assert_eq!(vec!["2".to_string(), "3".to_string()], tree.descendants("1"));

        // After a reparent the closure follows the new structure.
        assert!(tree.attach(ROOT_ID, "5", NodeKind::Component, "other".into()));
        assert!(tree.reparent("2", "5"));
        assert_eq!(Vec::<String>::new(), tree.descendants("1"));
        assert_eq!(vec!["2".to_string(), "3".to_string()], tree.descendants("5"));
    }

    #[test]
    fn reparent_updates_both_child_lists() {
        let mut tree = tree_with_chain();
        assert!(tree.attach(ROOT_ID, "5", NodeKind::Component, "other".into()));
        assert!(tree.reparent("3", "5"));
        assert!(tree.node("2").unwrap().children.is_empty());
        assert_eq!(vec!["3".to_string()], tree.node("5").unwrap().children);
        assert_eq!(Some("5".to_string()), tree.node("3").unwrap().parent);
    }

    #[test]
    fn reparent_rejects_cycles_and_unknown_targets() {
        let mut tree = tree_with_chain();
        assert!(!tree.reparent("1", "3"), "cannot move under own descendant");
        assert!(!tree.reparent("1", "1"), "cannot move under self");
        assert!(!tree.reparent("1", "99"));
        assert!(!tree.reparent(ROOT_ID, "1"));
        assert_eq!(Some(ROOT_ID.to_string()), tree.node("1").unwrap().parent);
    }

    #[test]
    fn clear_returns_to_root_only() {
        let mut tree = tree_with_chain();
        tree.clear();
        assert!(tree.is_empty());
        assert!(tree.contains(ROOT_ID));
    }
}
