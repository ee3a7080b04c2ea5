use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};

use generational_arena::Index;

use crate::{BinaryTree, Dir};

pub(crate) type Link = Option<Index>;

/// Arena-resident tree node.
///
/// Child slots are the owning edges of the tree; `parent` is a plain index
/// with no ownership implication, valid only while the node is attached.
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) parent: Link,
    pub(crate) children: [Link; 2],
}

impl<T> Node<T> {
    pub(crate) fn new(value: T) -> Self {
        Node {
            value,
            parent: None,
            children: [None; 2],
        }
    }

    #[inline]
    pub(crate) fn child(&self, dir: Dir) -> Link {
        self.children[dir as usize]
    }

    #[inline]
    pub(crate) fn set_child(&mut self, dir: Dir, child: Link) -> Link {
        mem::replace(&mut self.children[dir as usize], child)
    }

    #[inline]
    pub(crate) fn left(&self) -> Link {
        self.child(Dir::Left)
    }

    #[inline]
    pub(crate) fn right(&self) -> Link {
        self.child(Dir::Right)
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.left().is_none() && self.right().is_none()
    }

    #[inline]
    pub(crate) fn child_count(&self) -> usize {
        self.children.iter().filter(|c| c.is_some()).count()
    }
}

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(0);

pub(crate) fn next_tree_id() -> u64 {
    NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed)
}

/// A copyable handle to a node of a specific tree.
///
/// A `NodeId` remembers which tree issued it. Passing it to another tree, or
/// using it after the node has been removed, makes the operation report
/// failure rather than touch a recycled slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) tree: u64,
    pub(crate) idx: Index,
}

/// A borrowed, read-only view of an attached node.
pub struct NodeRef<'tree, T> {
    pub(crate) tree: &'tree BinaryTree<T>,
    pub(crate) idx: Index,
}

impl<T> Clone for NodeRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodeRef<'_, T> {}

impl<'tree, T> NodeRef<'tree, T> {
    /// Returns the detachable handle for this node.
    pub fn id(&self) -> NodeId {
        NodeId {
            tree: self.tree.id,
            idx: self.idx,
        }
    }

    /// Returns a reference to the node's value.
    pub fn value(&self) -> &'tree T {
        &self.tree.node(self.idx).value
    }

    /// Returns the node's parent, or `None` at the root.
    pub fn parent(&self) -> Option<NodeRef<'tree, T>> {
        self.relative(self.tree.node(self.idx).parent)
    }

    /// Returns the node's left child.
    pub fn left(&self) -> Option<NodeRef<'tree, T>> {
        self.relative(self.tree.node(self.idx).left())
    }

    /// Returns the node's right child.
    pub fn right(&self) -> Option<NodeRef<'tree, T>> {
        self.relative(self.tree.node(self.idx).right())
    }

    /// Returns `true` if the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.tree.node(self.idx).is_leaf()
    }

    /// Returns `true` if the node has at least one child.
    pub fn is_internal(&self) -> bool {
        !self.is_leaf()
    }

    /// Returns the number of children (0, 1 or 2).
    pub fn child_count(&self) -> usize {
        self.tree.node(self.idx).child_count()
    }

    /// Returns `true` if the node is the left child of its parent.
    pub fn is_left_child(&self) -> bool {
        self.parent_child(Dir::Left)
    }

    /// Returns `true` if the node is the right child of its parent.
    pub fn is_right_child(&self) -> bool {
        self.parent_child(Dir::Right)
    }

    fn parent_child(&self, dir: Dir) -> bool {
        match self.tree.node(self.idx).parent {
            Some(parent) => self.tree.node(parent).child(dir) == Some(self.idx),
            None => false,
        }
    }

    fn relative(&self, idx: Link) -> Option<NodeRef<'tree, T>> {
        idx.map(|idx| NodeRef {
            tree: self.tree,
            idx,
        })
    }
}
