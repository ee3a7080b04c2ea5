//! An arena-backed binary search tree with an AVL-balanced wrapper.
//!
//! [`BinaryTree`] is a plain binary search tree: it places, finds and detaches
//! nodes but never restructures. [`AvlTree`] wraps it and restores the AVL
//! height invariant after every insertion and removal. Nodes live in a
//! [`generational_arena::Arena`]; the handles the tree hands out ([`NodeId`])
//! die with their slot, so a stale or foreign handle fails lookups instead of
//! aliasing a recycled node.

// Conventions used in comments:
// - The height of the subtree rooted at `x` is denoted `h(x)`, with
//   `h(empty) = 0` and `h(x) = 1 + max(h(left), h(right))`.
// - The balance factor of `x` is `b(x) = h(right) - h(left)`.
//
// The base tree maintains only the search-order invariant: values in a left
// subtree compare `<=` the node's value, values in a right subtree `>=`.
// Equal values always descend left on insertion. The AVL layer additionally
// keeps `b(x)` in `{-1, 0, +1}` for every attached node.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::ops::Not;

use generational_arena::{Arena, Index};

mod avl;
mod debug;
mod iter;
mod node;

#[cfg(any(test, feature = "model"))]
pub mod model;

#[cfg(test)]
mod tests;

pub use avl::AvlTree;
pub use iter::Iter;
pub use node::{NodeId, NodeRef};

use iter::RawIter;
use node::{Link, Node};

/// Visit order used by [`BinaryTree::iter`] and [`AvlTree::iter`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TraversalOrder {
    /// Left subtree, node, right subtree. Yields values in sorted order.
    #[default]
    InOrder,
    /// Node, left subtree, right subtree.
    PreOrder,
    /// Left subtree, right subtree, node.
    PostOrder,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// An unbalanced binary search tree.
///
/// Insertion attaches at the first empty slot on the search path and removal
/// splices structurally; no rebalancing is ever performed, so the shape (and
/// the cost of later operations) is determined entirely by insertion order.
/// Use [`AvlTree`] to keep the height logarithmic.
pub struct BinaryTree<T> {
    pub(crate) nodes: Arena<Node<T>>,
    pub(crate) root: Link,
    pub(crate) len: usize,
    pub(crate) id: u64,
    order: TraversalOrder,
}

impl<T> BinaryTree<T> {
    /// Returns a new empty tree enumerating in order by default.
    pub fn new() -> BinaryTree<T> {
        BinaryTree {
            nodes: Arena::new(),
            root: None,
            len: 0,
            id: node::next_tree_id(),
            order: TraversalOrder::InOrder,
        }
    }

    /// Returns `true` if the tree contains no nodes.
    pub fn is_empty(&self) -> bool {
        debug_assert_eq!(self.len == 0, self.root.is_none());

        self.len == 0
    }

    /// Returns the number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the traversal order used by [`iter`](Self::iter) and
    /// [`copy_to`](Self::copy_to).
    pub fn traversal_order(&self) -> TraversalOrder {
        self.order
    }

    /// Sets the default traversal order.
    pub fn set_traversal_order(&mut self, order: TraversalOrder) {
        self.order = order;
    }

    /// Returns the root node.
    pub fn root(&self) -> Option<NodeRef<'_, T>> {
        self.root.map(|idx| NodeRef { tree: self, idx })
    }

    /// Resolves a handle back to a node view.
    ///
    /// Returns `None` if the handle was issued by another tree or if the node
    /// has since been removed.
    pub fn get(&self, node: NodeId) -> Option<NodeRef<'_, T>> {
        self.owns(node).then_some(NodeRef {
            tree: self,
            idx: node.idx,
        })
    }

    /// Returns the height of the tree: 0 when empty, 1 for a sole root.
    ///
    /// Computed by full recursive descent on every call.
    pub fn height(&self) -> usize {
        self.subtree_height(self.root)
    }

    /// Returns an iterator over the tree's values in the default order.
    ///
    /// The iterator is lazy and borrows the tree; calling `iter` again
    /// produces a fresh, independent sequence.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self, self.order)
    }

    /// Returns an in-order (sorted) iterator.
    pub fn in_order(&self) -> Iter<'_, T> {
        Iter::new(self, TraversalOrder::InOrder)
    }

    /// Returns a pre-order iterator.
    pub fn pre_order(&self) -> Iter<'_, T> {
        Iter::new(self, TraversalOrder::PreOrder)
    }

    /// Returns a post-order iterator.
    pub fn post_order(&self) -> Iter<'_, T> {
        Iter::new(self, TraversalOrder::PostOrder)
    }

    /// Clones values into `buffer` starting at `start_index`, in the default
    /// traversal order.
    ///
    /// Stops when either the buffer or the sequence is exhausted and returns
    /// the number of values written.
    pub fn copy_to(&self, buffer: &mut [T], start_index: usize) -> usize
    where
        T: Clone,
    {
        let mut iter = self.iter();
        let mut written = 0;

        for slot in buffer.iter_mut().skip(start_index) {
            match iter.next() {
                Some(value) => {
                    *slot = value.clone();
                    written += 1;
                }
                None => break,
            }
        }

        written
    }

    /// Clears the tree, detaching all nodes.
    ///
    /// Nodes are detached in post-order, so children always go before their
    /// parent and every node is a leaf at the moment it is removed.
    pub fn clear(&mut self) {
        let post_order: Vec<Index> = RawIter::new(self, TraversalOrder::PostOrder).collect();

        for idx in post_order {
            self.detach(idx);
        }

        debug_assert!(self.root.is_none());
        debug_assert_eq!(self.len(), 0);
    }

    #[inline]
    pub(crate) fn node(&self, idx: Index) -> &Node<T> {
        &self.nodes[idx]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, idx: Index) -> &mut Node<T> {
        &mut self.nodes[idx]
    }

    pub(crate) fn owns(&self, node: NodeId) -> bool {
        node.tree == self.id && self.nodes.contains(node.idx)
    }

    pub(crate) fn subtree_height(&self, link: Link) -> usize {
        match link {
            Some(idx) => {
                let node = self.node(idx);
                1 + self
                    .subtree_height(node.left())
                    .max(self.subtree_height(node.right()))
            }
            None => 0,
        }
    }

    // Replaces the child slot of `parent` pointing at `old_child` with
    // `new_child`, or the root slot if `parent` is `None`.
    //
    // `new_child`'s parent link is not updated.
    pub(crate) fn replace_child_or_set_root(
        &mut self,
        parent: Link,
        old_child: Index,
        new_child: Link,
    ) {
        match parent {
            Some(parent) => {
                let dir = if self.node(parent).left() == Some(old_child) {
                    Dir::Left
                } else {
                    Dir::Right
                };
                self.node_mut(parent).set_child(dir, new_child);
            }
            None => self.root = new_child,
        }
    }

    // Structurally removes the node at `idx`, returning its former value and
    // the parent of the slot that actually left the tree. That parent is
    // where rebalancing must start.
    //
    // A node with two children is not detached directly: it takes over the
    // value of its in-order predecessor (the rightmost node of its left
    // subtree) and the predecessor, which has at most one child, is detached
    // in its place.
    pub(crate) fn detach(&mut self, idx: Index) -> (T, Link) {
        let (left, right) = {
            let node = self.node(idx);
            (node.left(), node.right())
        };

        match (left, right) {
            (Some(left), Some(_)) => {
                let mut predecessor = left;
                while let Some(next) = self.node(predecessor).right() {
                    predecessor = next;
                }

                let (value, detach_parent) = self.detach(predecessor);
                let old = std::mem::replace(&mut self.node_mut(idx).value, value);

                (old, detach_parent)
            }

            (Some(child), None) | (None, Some(child)) => {
                let parent = self.node(idx).parent;

                self.replace_child_or_set_root(parent, idx, Some(child));
                self.node_mut(child).parent = parent;

                let node = self.nodes.remove(idx).expect("detached node must exist");
                self.len -= 1;

                (node.value, parent)
            }

            (None, None) => {
                let parent = self.node(idx).parent;

                self.replace_child_or_set_root(parent, idx, None);

                let node = self.nodes.remove(idx).expect("detached node must exist");
                self.len -= 1;

                (node.value, parent)
            }
        }
    }
}

impl<T: Ord> BinaryTree<T> {
    /// Inserts a value into the tree.
    ///
    /// Every value is accepted; a value equal to one already present descends
    /// into the left subtree. Returns a handle to the attached node.
    pub fn insert(&mut self, value: T) -> NodeId {
        let idx = self.nodes.insert(Node::new(value));

        match self.root {
            None => self.root = Some(idx),
            Some(root) => {
                let mut cur = root;

                // Descend until the target slot is empty.
                loop {
                    let dir = match self.node(idx).value.cmp(&self.node(cur).value) {
                        Ordering::Less | Ordering::Equal => Dir::Left,
                        Ordering::Greater => Dir::Right,
                    };

                    match self.node(cur).child(dir) {
                        Some(child) => cur = child,
                        None => {
                            self.node_mut(cur).set_child(dir, Some(idx));
                            self.node_mut(idx).parent = Some(cur);
                            break;
                        }
                    }
                }
            }
        }

        self.len += 1;

        NodeId {
            tree: self.id,
            idx,
        }
    }

    /// Returns the shallowest node whose value compares equal to `value`.
    pub fn find<Q>(&self, value: &Q) -> Option<NodeRef<'_, T>>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let idx = self.find_raw(value)?;
        Some(NodeRef { tree: self, idx })
    }

    /// Returns `true` if some node's value compares equal to `value`.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_raw(value).is_some()
    }

    /// Removes the shallowest node whose value compares equal to `value`.
    ///
    /// Returns `true` iff a matching node was found. Duplicates are removed
    /// one per call.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.find_raw(value) {
            Some(idx) => {
                self.detach(idx);
                true
            }
            None => false,
        }
    }

    /// Removes the node `node` refers to.
    ///
    /// Returns `false`, leaving the tree unchanged, if the handle is stale or
    /// belongs to a different tree.
    pub fn remove_at(&mut self, node: NodeId) -> bool {
        if !self.owns(node) {
            return false;
        }

        self.detach(node.idx);
        true
    }

    /// Returns the height of the subtree rooted at the shallowest node equal
    /// to `value`, or 0 if the value is absent.
    pub fn height_of<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.subtree_height(self.find_raw(value))
    }

    /// Returns the number of parent hops from the shallowest node equal to
    /// `value` up to the root, or 0 if the value is absent.
    pub fn depth_of<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut depth = 0;
        let mut cur = self.find_raw(value);

        while let Some(idx) = cur {
            cur = self.node(idx).parent;
            if cur.is_some() {
                depth += 1;
            }
        }

        depth
    }

    pub(crate) fn find_raw<Q>(&self, value: &Q) -> Link
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut opt_cur = self.root;

        loop {
            let cur = opt_cur?;

            match value.cmp(self.node(cur).value.borrow()) {
                Ordering::Less => opt_cur = self.node(cur).left(),
                Ordering::Equal => return Some(cur),
                Ordering::Greater => opt_cur = self.node(cur).right(),
            }
        }
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        let counted = match self.root {
            Some(root) => {
                assert_eq!(self.node(root).parent, None);
                self.assert_invariants_at(root, None, None)
            }
            None => 0,
        };

        assert_eq!(counted, self.len);
        assert_eq!(counted, self.nodes.len());
    }

    // Checks parent links and search order below `idx`, returning the number
    // of nodes in the subtree. `lo`/`hi` are the inclusive bounds inherited
    // from ancestors.
    fn assert_invariants_at(&self, idx: Index, lo: Option<&T>, hi: Option<&T>) -> usize {
        let node = self.node(idx);

        if let Some(lo) = lo {
            assert!(node.value >= *lo);
        }

        if let Some(hi) = hi {
            assert!(node.value <= *hi);
        }

        let mut count = 1;

        for dir in [Dir::Left, Dir::Right] {
            if let Some(child) = node.child(dir) {
                assert_eq!(
                    self.node(child).parent,
                    Some(idx),
                    "child parent link must point at this node"
                );

                count += match dir {
                    Dir::Left => self.assert_invariants_at(child, lo, Some(&node.value)),
                    Dir::Right => self.assert_invariants_at(child, Some(&node.value), hi),
                };
            }
        }

        count
    }
}

impl<T> Default for BinaryTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'tree, T> IntoIterator for &'tree BinaryTree<T> {
    type Item = &'tree T;
    type IntoIter = Iter<'tree, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
