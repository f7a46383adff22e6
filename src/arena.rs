use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::node::CommandNode;

/// Handle to a node in a [`CommandArena`].
///
/// Handles are only minted by the arena that owns the node and stay valid
/// for its whole lifetime: nodes are never removed or re-parented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

/// Arena-based storage for the command hierarchy.
///
/// The root is created with the arena; every other node is inserted under an
/// existing parent and keeps that parent for good.
#[derive(Debug)]
pub struct CommandArena {
    /// Arena storage for all command nodes
    arena: Arena<CommandNode>,
    /// Index of the root command
    root: NodeId,
}

impl CommandArena {
    pub fn new(name: &str, help: &str) -> Self {
        let mut arena = Arena::new();
        let root = NodeId(arena.insert(CommandNode::new(name, help, None)));
        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    #[instrument(level = "trace", skip(self))]
    pub(crate) fn insert_child(&mut self, parent: NodeId, name: &str, help: &str) -> NodeId {
        let idx = NodeId(self.arena.insert(CommandNode::new(name, help, Some(parent))));
        self.node_mut(parent).children.push(idx);
        idx
    }

    pub fn node(&self, id: NodeId) -> &CommandNode {
        &self.arena[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut CommandNode {
        &mut self.arena[id.0]
    }

    /// Child of `parent` whose name or alias is `token`.
    pub fn child_named(&self, parent: NodeId, token: &str) -> Option<NodeId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|&c| self.node(c).answers_to(token))
    }

    pub fn default_child(&self, parent: NodeId) -> Option<NodeId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|&c| self.node(c).is_default)
    }

    /// Nodes from the root down to `id`, both included.
    #[instrument(level = "trace", skip(self))]
    pub fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Command names from the root down to `id`, e.g. `["say", "en"]`.
    pub fn names_to(&self, id: NodeId) -> Vec<String> {
        self.path_to(id)
            .into_iter()
            .map(|n| self.node(n).name.clone())
            .collect()
    }

    pub fn iter(&self) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self, self.root)
    }

    /// `id` and everything below it, in pre-order.
    pub fn subtree(&self, id: NodeId) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self, id)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.calculate_depth(self.root)
    }

    fn calculate_depth(&self, id: NodeId) -> usize {
        1 + self
            .node(id)
            .children
            .iter()
            .map(|&child| self.calculate_depth(child))
            .max()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}

/// Depth-first, parents before children, siblings in registration order.
pub struct PreOrderIterator<'a> {
    arena: &'a CommandArena,
    stack: Vec<NodeId>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(arena: &'a CommandArena, start: NodeId) -> Self {
        Self {
            arena,
            stack: vec![start],
        }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = (NodeId, &'a CommandNode);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        let node = self.arena.node(current);
        // Push children in reverse order for left-to-right traversal
        self.stack.extend(node.children.iter().rev());
        Some((current, node))
    }
}
