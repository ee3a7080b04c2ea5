use std::iter::FusedIterator;

use generational_arena::Index;

use crate::{BinaryTree, TraversalOrder};

enum CameFrom {
    Parent,
    LeftChild,
    RightChild,
}

// Walks the tree using parent links only, visiting each node at the Euler-tour
// position that matches `order`: on first entry (pre-order), after the left
// subtree (in-order), or after the right subtree (post-order). No auxiliary
// stack, no snapshot of the tree; a fresh walker restarts from the root.
pub(crate) struct RawIter<'tree, T> {
    pub(crate) tree: &'tree BinaryTree<T>,

    cur: Option<Index>,
    from: CameFrom,
    order: TraversalOrder,

    remaining: usize,
}

impl<'tree, T> RawIter<'tree, T> {
    pub(crate) fn new(tree: &'tree BinaryTree<T>, order: TraversalOrder) -> Self {
        RawIter {
            tree,

            cur: tree.root,
            from: CameFrom::Parent,
            order,

            remaining: tree.len(),
        }
    }

    fn advance(&mut self, cur: Index) {
        match self.from {
            CameFrom::Parent => {
                // Entering a new subtree: descend left if possible, otherwise
                // the (empty) left subtree is already exhausted.
                match self.tree.node(cur).left() {
                    Some(left) => self.cur = Some(left),
                    None => self.from = CameFrom::LeftChild,
                }
            }

            CameFrom::LeftChild => {
                // The left subtree has been exhausted; go right, or mark the
                // right subtree exhausted as well.
                match self.tree.node(cur).right() {
                    Some(right) => {
                        self.cur = Some(right);
                        self.from = CameFrom::Parent;
                    }
                    None => self.from = CameFrom::RightChild,
                }
            }

            CameFrom::RightChild => {
                // Both subtrees done: ascend one level, remembering which
                // child this node was.
                match self.tree.node(cur).parent {
                    Some(parent) => {
                        self.from = if self.tree.node(parent).left() == Some(cur) {
                            CameFrom::LeftChild
                        } else {
                            CameFrom::RightChild
                        };
                        self.cur = Some(parent);
                    }
                    None => self.cur = None,
                }
            }
        }
    }
}

impl<T> Iterator for RawIter<'_, T> {
    type Item = Index;

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining > 0 {
            let cur = self.cur?;

            let visit = match self.from {
                CameFrom::Parent => self.order == TraversalOrder::PreOrder,
                CameFrom::LeftChild => self.order == TraversalOrder::InOrder,
                CameFrom::RightChild => self.order == TraversalOrder::PostOrder,
            };

            self.advance(cur);

            if visit {
                self.remaining -= 1;
                return Some(cur);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// A lazy iterator over a tree's values in a fixed traversal order.
///
/// Constructed by [`BinaryTree::iter`] and friends. The borrow prevents the
/// tree from being mutated mid-walk, and a finished iterator stays finished;
/// enumerating again is a matter of calling the constructor again.
pub struct Iter<'tree, T> {
    raw: RawIter<'tree, T>,
}

impl<'tree, T> Iter<'tree, T> {
    pub(crate) fn new(tree: &'tree BinaryTree<T>, order: TraversalOrder) -> Self {
        Iter {
            raw: RawIter::new(tree, order),
        }
    }
}

impl<'tree, T> Iterator for Iter<'tree, T> {
    type Item = &'tree T;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.raw.tree;
        self.raw.next().map(|idx| &tree.node(idx).value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.raw.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}
