use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use crate::Node;

/// Handle to a node owned by an [`Ast`] arena.
///
/// Ids are only minted by [`Ast::alloc`], so indexing the arena that produced
/// an id always succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// AST arena: every node of a translation unit lives here and is addressed by
/// [`NodeId`]. Replacing a subtree is a local write to one slot, and a node can
/// be referenced from several parents without being copied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Swap the node stored at `id`, returning the previous one.
    pub fn replace(&mut self, id: NodeId, node: Node) -> Node {
        std::mem::replace(&mut self[id], node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Statements of a `Sequence` node, `None` for every other kind.
    pub fn statements(&self, id: NodeId) -> Option<&[NodeId]> {
        match self.get(id)? {
            Node::Sequence(stmts) => Some(stmts),
            _ => None,
        }
    }

    pub fn statements_mut(&mut self, id: NodeId) -> Option<&mut Vec<NodeId>> {
        match self.get_mut(id)? {
            Node::Sequence(stmts) => Some(stmts),
            _ => None,
        }
    }

    pub fn is_sequence(&self, id: NodeId) -> bool {
        matches!(self.get(id), Some(Node::Sequence(_)))
    }

    /// Whether evaluating the node twice is indistinguishable from
    /// evaluating it once.
    pub fn is_pure(&self, id: NodeId) -> bool {
        match self.get(id) {
            Some(Node::Literal(_)) | Some(Node::DeclRef(_)) => true,
            Some(Node::Opaque { pure, .. }) => *pure,
            _ => false,
        }
    }
}

impl Index<NodeId> for Ast {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for Ast {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }
}
