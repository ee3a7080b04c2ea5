use std::borrow::Borrow;

use generational_arena::Index;

use crate::node::Link;
use crate::{BinaryTree, Dir, Iter, NodeId, NodeRef, TraversalOrder};

/// A height-balanced binary search tree.
///
/// `AvlTree` wraps a [`BinaryTree`] and restores the AVL invariant —
/// `b(x) ∈ {-1, 0, +1}` for every node — after each insertion and removal,
/// so the height stays within a constant factor of `log2(len)` regardless of
/// operation order. Lookup and traversal are the base tree's, untouched.
pub struct AvlTree<T> {
    tree: BinaryTree<T>,
}

impl<T> AvlTree<T> {
    /// Returns a new empty tree enumerating in order by default.
    pub fn new() -> AvlTree<T> {
        AvlTree {
            tree: BinaryTree::new(),
        }
    }

    /// Returns `true` if the tree contains no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns the traversal order used by [`iter`](Self::iter) and
    /// [`copy_to`](Self::copy_to).
    #[inline]
    pub fn traversal_order(&self) -> TraversalOrder {
        self.tree.traversal_order()
    }

    /// Sets the default traversal order.
    #[inline]
    pub fn set_traversal_order(&mut self, order: TraversalOrder) {
        self.tree.set_traversal_order(order);
    }

    /// Returns the root node.
    #[inline]
    pub fn root(&self) -> Option<NodeRef<'_, T>> {
        self.tree.root()
    }

    /// Resolves a handle back to a node view.
    #[inline]
    pub fn get(&self, node: NodeId) -> Option<NodeRef<'_, T>> {
        self.tree.get(node)
    }

    /// Returns the height of the tree: 0 when empty, 1 for a sole root.
    #[inline]
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Returns an iterator over the tree's values in the default order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        self.tree.iter()
    }

    /// Returns an in-order (sorted) iterator.
    #[inline]
    pub fn in_order(&self) -> Iter<'_, T> {
        self.tree.in_order()
    }

    /// Returns a pre-order iterator.
    #[inline]
    pub fn pre_order(&self) -> Iter<'_, T> {
        self.tree.pre_order()
    }

    /// Returns a post-order iterator.
    #[inline]
    pub fn post_order(&self) -> Iter<'_, T> {
        self.tree.post_order()
    }

    /// Clones values into `buffer` starting at `start_index`, in the default
    /// traversal order. Returns the number of values written.
    #[inline]
    pub fn copy_to(&self, buffer: &mut [T], start_index: usize) -> usize
    where
        T: Clone,
    {
        self.tree.copy_to(buffer, start_index)
    }

    /// Clears the tree, detaching all nodes in post-order.
    ///
    /// No rebalancing happens along the way: the sweep only ever detaches
    /// leaves, and the empty tree satisfies the balance invariant.
    #[inline]
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub(crate) fn base(&self) -> &BinaryTree<T> {
        &self.tree
    }
}

impl<T: Ord> AvlTree<T> {
    /// Inserts a value into the tree and rebalances.
    ///
    /// Every value is accepted; a value equal to one already present descends
    /// into the left subtree. Returns a handle to the attached node. The
    /// handle stays valid until that node is detached — note that removing a
    /// two-child node detaches its in-order predecessor's slot instead and
    /// keeps its own, with the predecessor's value moved in.
    pub fn insert(&mut self, value: T) -> NodeId {
        let id = self.tree.insert(value);
        let start = self.tree.node(id.idx).parent;

        self.rebalance_path(start);

        id
    }

    /// Returns the shallowest node whose value compares equal to `value`.
    #[inline]
    pub fn find<Q>(&self, value: &Q) -> Option<NodeRef<'_, T>>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find(value)
    }

    /// Returns `true` if some node's value compares equal to `value`.
    #[inline]
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.contains(value)
    }

    /// Removes the shallowest node whose value compares equal to `value`,
    /// then rebalances.
    ///
    /// Returns `true` iff a matching node was found. Duplicates are removed
    /// one per call.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.tree.find_raw(value) {
            Some(idx) => {
                self.remove_idx(idx);
                true
            }
            None => false,
        }
    }

    /// Removes the node `node` refers to, then rebalances.
    ///
    /// Returns `false`, leaving the tree unchanged, if the handle is stale or
    /// belongs to a different tree.
    pub fn remove_at(&mut self, node: NodeId) -> bool {
        if !self.tree.owns(node) {
            return false;
        }

        self.remove_idx(node.idx);
        true
    }

    /// Returns the height of the subtree rooted at the shallowest node equal
    /// to `value`, or 0 if the value is absent.
    #[inline]
    pub fn height_of<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.height_of(value)
    }

    /// Returns the number of parent hops from the shallowest node equal to
    /// `value` up to the root, or 0 if the value is absent.
    #[inline]
    pub fn depth_of<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.depth_of(value)
    }

    fn remove_idx(&mut self, idx: Index) {
        // The rebalancing chain starts at the parent of the slot that
        // actually left the tree, which for a two-child target is the
        // in-order predecessor's former parent.
        let (_, start) = self.tree.detach(idx);
        self.rebalance_path(start);
    }

    // Walks from `start` up to the root inclusive, fixing every ancestor
    // whose balance factor reaches ±2. The walk never stops early: a
    // rotation changes subtree heights, and ancestors above a fixed subtree
    // must still be checked. After a rotation, `idx`'s parent is the pivot
    // that took its place, so the new subtree root is the next node visited.
    fn rebalance_path(&mut self, start: Link) {
        let mut cur = start;

        while let Some(idx) = cur {
            let balance = self.balance_factor(idx);

            if balance.abs() == 2 {
                self.rebalance_at(idx, balance);
            }

            cur = self.tree.node(idx).parent;
        }
    }

    // Restores the invariant at `idx`, whose balance factor is ±2. The
    // rotation pattern is chosen from the heavy child's own balance factor.
    fn rebalance_at(&mut self, idx: Index, balance: isize) {
        if balance == 2 {
            let right = self
                .tree
                .node(idx)
                .right()
                .expect("right-heavy node must have a right child");

            // Right-left: the heavy child leans the other way.
            if self.balance_factor(right) == -1 {
                self.rotate(right, Dir::Right);
            }

            self.rotate(idx, Dir::Left);
        } else {
            debug_assert_eq!(balance, -2);

            let left = self
                .tree
                .node(idx)
                .left()
                .expect("left-heavy node must have a left child");

            // Left-right: the heavy child leans the other way.
            if self.balance_factor(left) == 1 {
                self.rotate(left, Dir::Left);
            }

            self.rotate(idx, Dir::Right);
        }
    }

    // Rotates the subtree rooted at `down` in direction `dir`: the child on
    // the side opposite `dir` (the pivot) takes `down`'s position, `down`
    // becomes the pivot's `dir` child, and the pivot's `dir`-side subtree
    // moves across to `down`. In-order sequence is preserved.
    fn rotate(&mut self, down: Index, dir: Dir) {
        let pivot = self
            .tree
            .node(down)
            .child(!dir)
            .expect("rotation requires a child on the heavy side");
        let parent = self.tree.node(down).parent;

        let across = self.tree.node(pivot).child(dir);
        self.tree.node_mut(down).set_child(!dir, across);
        if let Some(across) = across {
            self.tree.node_mut(across).parent = Some(down);
        }

        self.tree.node_mut(pivot).set_child(dir, Some(down));
        self.tree.node_mut(down).parent = Some(pivot);
        self.tree.node_mut(pivot).parent = parent;

        self.tree.replace_child_or_set_root(parent, down, Some(pivot));
    }

    fn balance_factor(&self, idx: Index) -> isize {
        let node = self.tree.node(idx);

        self.tree.subtree_height(node.right()) as isize
            - self.tree.subtree_height(node.left()) as isize
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        self.tree.assert_invariants();

        if let Some(root) = self.tree.root {
            self.assert_balanced_at(root);
        }
    }

    fn assert_balanced_at(&self, idx: Index) {
        let balance = self.balance_factor(idx);
        assert!(
            balance.abs() <= 1,
            "balance factor out of range: {balance}"
        );

        for dir in [Dir::Left, Dir::Right] {
            if let Some(child) = self.tree.node(idx).child(dir) {
                self.assert_balanced_at(child);
            }
        }
    }
}

impl<T> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'tree, T> IntoIterator for &'tree AvlTree<T> {
    type Item = &'tree T;
    type IntoIter = Iter<'tree, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
