#![forbid(unsafe_code)]

//! NodeSet type for XML canonicalization and transforms.
//!
//! A `NodeSet` is the set of document nodes selected by a `<Reference>`
//! after its transforms have run. Attributes and namespace declarations are
//! not tracked separately: they belong to their element.

use std::collections::HashSet;

/// A set of XML document nodes identified by `roxmltree::NodeId`.
#[derive(Debug, Clone, Default)]
pub struct NodeSet {
    nodes: HashSet<roxmltree::NodeId>,
}

impl NodeSet {
    /// All nodes of the document except comments.
    ///
    /// `URI=""` selects the document without comments.
    pub fn all_without_comments(doc: &roxmltree::Document<'_>) -> Self {
        Self::tree_without_comments(doc.root())
    }

    /// The subtree rooted at `root` (inclusive), without comment nodes.
    pub fn tree_without_comments(root: roxmltree::Node<'_, '_>) -> Self {
        Self {
            nodes: root
                .descendants()
                .filter(|n| !n.is_comment())
                .map(|n| n.id())
                .collect(),
        }
    }

    /// Check if a node is in this set.
    pub fn contains(&self, node: roxmltree::Node<'_, '_>) -> bool {
        self.nodes.contains(&node.id())
    }

    /// Remove `root` and all its descendants from the set.
    pub fn remove_subtree(&mut self, root: roxmltree::Node<'_, '_>) {
        for n in root.descendants() {
            self.nodes.remove(&n.id());
        }
    }

    /// Number of nodes in the set.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
