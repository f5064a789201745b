//! An order-statistics red-black tree with arena-allocated nodes.
//!
//! Nodes live in a `Vec` and are referred to by small integer handles.
//! Removal uses structural transplants, so the handle of every surviving
//! node stays valid across insertions and removals. This is what lets the
//! sweep algorithms keep side tables keyed by node handle.
//!
//! The ordering is not baked into the key type: every operation that
//! navigates the tree takes a comparator. The sweep status structure relies
//! on this because the order of its keys changes as the sweep line moves;
//! it refreshes the keys in place and keeps navigating with the same
//! comparator.

use std::cmp::Ordering;

/// A handle to a node in a [`RedBlackTree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

const NIL: NodeId = NodeId(0);

impl NodeId {
    #[inline]
    pub fn is_nil(self) -> bool {
        self == NIL
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

#[derive(Clone, Debug)]
struct Node<K> {
    key: Option<K>,
    color: Color,
    parent: NodeId,
    left: NodeId,
    right: NodeId,
    // Number of keys in the subtree rooted here, zero for nil.
    size: u32,
}

impl<K> Node<K> {
    fn nil() -> Self {
        Node {
            key: None,
            color: Color::Black,
            parent: NIL,
            left: NIL,
            right: NIL,
            size: 0,
        }
    }
}

pub struct RedBlackTree<K> {
    nodes: Vec<Node<K>>,
    root: NodeId,
    free: Vec<NodeId>,
}

impl<K> RedBlackTree<K> {
    pub fn new() -> Self {
        RedBlackTree {
            // Slot zero is the nil sentinel.
            nodes: vec![Node::nil()],
            root: NIL,
            free: Vec::new(),
        }
    }

    /// Number of keys in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.size(self.root) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_nil()
    }

    /// The key held by `id`. Panics if `id` is nil or was removed.
    #[inline]
    pub fn key(&self, id: NodeId) -> &K {
        debug_assert!(!id.is_nil());
        self.nodes[id.index()].key.as_ref().unwrap()
    }

    /// Mutable access to the key held by `id`.
    ///
    /// Mutating a key does not rebalance anything. The sweep status uses
    /// this to refresh every key against the new sweep line position, which
    /// preserves the relative order of the keys.
    #[inline]
    pub fn key_mut(&mut self, id: NodeId) -> &mut K {
        debug_assert!(!id.is_nil());
        self.nodes[id.index()].key.as_mut().unwrap()
    }

    /// Insert a key, returning the handle of the new node.
    ///
    /// Duplicate keys (under `cmp`) are allowed and land after their
    /// equals.
    pub fn insert<F>(&mut self, key: K, cmp: &F) -> NodeId
    where
        F: Fn(&K, &K) -> Ordering,
    {
        let id = self.alloc(key);

        let mut parent = NIL;
        let mut cursor = self.root;
        while !cursor.is_nil() {
            parent = cursor;
            cursor = if cmp(self.key(id), self.key(cursor)) == Ordering::Less {
                self.nodes[cursor.index()].left
            } else {
                self.nodes[cursor.index()].right
            };
        }

        self.nodes[id.index()].parent = parent;
        if parent.is_nil() {
            self.root = id;
        } else if cmp(self.key(id), self.key(parent)) == Ordering::Less {
            self.nodes[parent.index()].left = id;
        } else {
            self.nodes[parent.index()].right = id;
        }

        self.update_sizes_from(parent);
        self.insert_fixup(id);

        id
    }

    /// Find a node whose key compares equal to `key` under `cmp`.
    pub fn search<F>(&self, key: &K, cmp: &F) -> Option<NodeId>
    where
        F: Fn(&K, &K) -> Ordering,
    {
        let mut cursor = self.root;
        while !cursor.is_nil() {
            match cmp(key, self.key(cursor)) {
                Ordering::Equal => return Some(cursor),
                Ordering::Less => cursor = self.nodes[cursor.index()].left,
                Ordering::Greater => cursor = self.nodes[cursor.index()].right,
            }
        }

        None
    }

    /// The node holding the smallest key.
    pub fn min_node(&self) -> Option<NodeId> {
        if self.root.is_nil() {
            None
        } else {
            Some(self.minimum(self.root))
        }
    }

    /// The node holding the largest key.
    pub fn max_node(&self) -> Option<NodeId> {
        if self.root.is_nil() {
            None
        } else {
            Some(self.maximum(self.root))
        }
    }

    /// The node right after `id` in key order.
    pub fn successor(&self, id: NodeId) -> Option<NodeId> {
        debug_assert!(!id.is_nil());
        let right = self.nodes[id.index()].right;
        if !right.is_nil() {
            return Some(self.minimum(right));
        }

        let mut child = id;
        let mut parent = self.nodes[id.index()].parent;
        while !parent.is_nil() && child == self.nodes[parent.index()].right {
            child = parent;
            parent = self.nodes[parent.index()].parent;
        }

        if parent.is_nil() {
            None
        } else {
            Some(parent)
        }
    }

    /// The node right before `id` in key order.
    pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        debug_assert!(!id.is_nil());
        let left = self.nodes[id.index()].left;
        if !left.is_nil() {
            return Some(self.maximum(left));
        }

        let mut child = id;
        let mut parent = self.nodes[id.index()].parent;
        while !parent.is_nil() && child == self.nodes[parent.index()].left {
            child = parent;
            parent = self.nodes[parent.index()].parent;
        }

        if parent.is_nil() {
            None
        } else {
            Some(parent)
        }
    }

    /// The node holding the `rank`-th smallest key (zero based).
    pub fn nth(&self, mut rank: usize) -> Option<NodeId> {
        if rank >= self.len() {
            return None;
        }
        let mut cursor = self.root;
        loop {
            let left = self.nodes[cursor.index()].left;
            let left_size = self.size(left) as usize;
            if rank < left_size {
                cursor = left;
            } else if rank == left_size {
                return Some(cursor);
            } else {
                rank -= left_size + 1;
                cursor = self.nodes[cursor.index()].right;
            }
        }
    }

    /// All node handles in key order.
    pub fn in_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack = Vec::new();
        let mut cursor = self.root;
        while !cursor.is_nil() || !stack.is_empty() {
            while !cursor.is_nil() {
                stack.push(cursor);
                cursor = self.nodes[cursor.index()].left;
            }
            if let Some(id) = stack.pop() {
                out.push(id);
                cursor = self.nodes[id.index()].right;
            }
        }

        out
    }

    /// Exchange the keys of two nodes without touching the tree structure.
    ///
    /// The caller is responsible for the order still being consistent
    /// afterwards (the sweep uses this when two adjacent segments cross).
    pub fn swap_keys(&mut self, a: NodeId, b: NodeId) {
        debug_assert!(!a.is_nil() && !b.is_nil());
        if a == b {
            return;
        }
        let tmp = self.nodes[a.index()].key.take();
        self.nodes[a.index()].key = self.nodes[b.index()].key.take();
        self.nodes[b.index()].key = tmp;
    }

    /// Remove `id` from the tree and return its key.
    ///
    /// Every other node keeps its handle.
    pub fn remove(&mut self, z: NodeId) -> K {
        debug_assert!(!z.is_nil());

        let mut y = z;
        let mut removed_color = self.color(y);
        let x;
        if self.nodes[z.index()].left.is_nil() {
            x = self.nodes[z.index()].right;
            self.transplant(z, x);
        } else if self.nodes[z.index()].right.is_nil() {
            x = self.nodes[z.index()].left;
            self.transplant(z, x);
        } else {
            y = self.minimum(self.nodes[z.index()].right);
            removed_color = self.color(y);
            x = self.nodes[y.index()].right;
            if self.nodes[y.index()].parent == z {
                self.nodes[x.index()].parent = y;
            } else {
                self.transplant(y, x);
                let zr = self.nodes[z.index()].right;
                self.nodes[y.index()].right = zr;
                self.nodes[zr.index()].parent = y;
            }
            self.transplant(z, y);
            let zl = self.nodes[z.index()].left;
            self.nodes[y.index()].left = zl;
            self.nodes[zl.index()].parent = y;
            self.nodes[y.index()].color = self.color(z);
        }

        let fix_from = self.nodes[x.index()].parent;
        self.update_sizes_from(fix_from);

        if removed_color == Color::Black {
            self.remove_fixup(x);
        }

        let key = self.nodes[z.index()].key.take().unwrap();
        self.nodes[z.index()] = Node::nil();
        self.free.push(z);

        // The fixup may have scribbled on the sentinel's links.
        self.nodes[0] = Node::nil();

        key
    }

    #[inline]
    fn size(&self, id: NodeId) -> u32 {
        self.nodes[id.index()].size
    }

    #[inline]
    fn color(&self, id: NodeId) -> Color {
        self.nodes[id.index()].color
    }

    fn alloc(&mut self, key: K) -> NodeId {
        let node = Node {
            key: Some(key),
            color: Color::Red,
            parent: NIL,
            left: NIL,
            right: NIL,
            size: 1,
        };
        if let Some(id) = self.free.pop() {
            self.nodes[id.index()] = node;
            id
        } else {
            let id = NodeId(self.nodes.len() as u32);
            self.nodes.push(node);
            id
        }
    }

    fn minimum(&self, mut id: NodeId) -> NodeId {
        while !self.nodes[id.index()].left.is_nil() {
            id = self.nodes[id.index()].left;
        }
        id
    }

    fn maximum(&self, mut id: NodeId) -> NodeId {
        while !self.nodes[id.index()].right.is_nil() {
            id = self.nodes[id.index()].right;
        }
        id
    }

    fn update_sizes_from(&mut self, mut id: NodeId) {
        while !id.is_nil() {
            let left = self.nodes[id.index()].left;
            let right = self.nodes[id.index()].right;
            self.nodes[id.index()].size = self.size(left) + self.size(right) + 1;
            id = self.nodes[id.index()].parent;
        }
    }

    fn recompute_size(&mut self, id: NodeId) {
        let left = self.nodes[id.index()].left;
        let right = self.nodes[id.index()].right;
        self.nodes[id.index()].size = self.size(left) + self.size(right) + 1;
    }

    fn rotate_left(&mut self, x: NodeId) {
        let y = self.nodes[x.index()].right;
        debug_assert!(!y.is_nil());

        let yl = self.nodes[y.index()].left;
        self.nodes[x.index()].right = yl;
        if !yl.is_nil() {
            self.nodes[yl.index()].parent = x;
        }

        let xp = self.nodes[x.index()].parent;
        self.nodes[y.index()].parent = xp;
        if xp.is_nil() {
            self.root = y;
        } else if x == self.nodes[xp.index()].left {
            self.nodes[xp.index()].left = y;
        } else {
            self.nodes[xp.index()].right = y;
        }

        self.nodes[y.index()].left = x;
        self.nodes[x.index()].parent = y;

        // x is now the child, recompute it first.
        self.recompute_size(x);
        self.recompute_size(y);
    }

    fn rotate_right(&mut self, x: NodeId) {
        let y = self.nodes[x.index()].left;
        debug_assert!(!y.is_nil());

        let yr = self.nodes[y.index()].right;
        self.nodes[x.index()].left = yr;
        if !yr.is_nil() {
            self.nodes[yr.index()].parent = x;
        }

        let xp = self.nodes[x.index()].parent;
        self.nodes[y.index()].parent = xp;
        if xp.is_nil() {
            self.root = y;
        } else if x == self.nodes[xp.index()].right {
            self.nodes[xp.index()].right = y;
        } else {
            self.nodes[xp.index()].left = y;
        }

        self.nodes[y.index()].right = x;
        self.nodes[x.index()].parent = y;

        self.recompute_size(x);
        self.recompute_size(y);
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        while self.color(self.nodes[z.index()].parent) == Color::Red {
            let parent = self.nodes[z.index()].parent;
            let grandparent = self.nodes[parent.index()].parent;
            if parent == self.nodes[grandparent.index()].left {
                let uncle = self.nodes[grandparent.index()].right;
                if self.color(uncle) == Color::Red {
                    self.nodes[parent.index()].color = Color::Black;
                    self.nodes[uncle.index()].color = Color::Black;
                    self.nodes[grandparent.index()].color = Color::Red;
                    z = grandparent;
                } else {
                    if z == self.nodes[parent.index()].right {
                        z = parent;
                        self.rotate_left(z);
                    }
                    let parent = self.nodes[z.index()].parent;
                    let grandparent = self.nodes[parent.index()].parent;
                    self.nodes[parent.index()].color = Color::Black;
                    self.nodes[grandparent.index()].color = Color::Red;
                    self.rotate_right(grandparent);
                }
            } else {
                let uncle = self.nodes[grandparent.index()].left;
                if self.color(uncle) == Color::Red {
                    self.nodes[parent.index()].color = Color::Black;
                    self.nodes[uncle.index()].color = Color::Black;
                    self.nodes[grandparent.index()].color = Color::Red;
                    z = grandparent;
                } else {
                    if z == self.nodes[parent.index()].left {
                        z = parent;
                        self.rotate_right(z);
                    }
                    let parent = self.nodes[z.index()].parent;
                    let grandparent = self.nodes[parent.index()].parent;
                    self.nodes[parent.index()].color = Color::Black;
                    self.nodes[grandparent.index()].color = Color::Red;
                    self.rotate_left(grandparent);
                }
            }
        }
        let root = self.root;
        self.nodes[root.index()].color = Color::Black;
    }

    fn transplant(&mut self, u: NodeId, v: NodeId) {
        let p = self.nodes[u.index()].parent;
        if p.is_nil() {
            self.root = v;
        } else if u == self.nodes[p.index()].left {
            self.nodes[p.index()].left = v;
        } else {
            self.nodes[p.index()].right = v;
        }
        // Also set for the sentinel, the delete fixup needs the parent link.
        self.nodes[v.index()].parent = p;
    }

    fn remove_fixup(&mut self, mut x: NodeId) {
        while x != self.root && self.color(x) == Color::Black {
            let parent = self.nodes[x.index()].parent;
            if x == self.nodes[parent.index()].left {
                let mut sibling = self.nodes[parent.index()].right;
                if self.color(sibling) == Color::Red {
                    self.nodes[sibling.index()].color = Color::Black;
                    self.nodes[parent.index()].color = Color::Red;
                    self.rotate_left(parent);
                    sibling = self.nodes[parent.index()].right;
                }
                let sl = self.nodes[sibling.index()].left;
                let sr = self.nodes[sibling.index()].right;
                if self.color(sl) == Color::Black && self.color(sr) == Color::Black {
                    self.nodes[sibling.index()].color = Color::Red;
                    x = parent;
                } else {
                    if self.color(sr) == Color::Black {
                        self.nodes[sl.index()].color = Color::Black;
                        self.nodes[sibling.index()].color = Color::Red;
                        self.rotate_right(sibling);
                        sibling = self.nodes[parent.index()].right;
                    }
                    self.nodes[sibling.index()].color = self.color(parent);
                    self.nodes[parent.index()].color = Color::Black;
                    let sr = self.nodes[sibling.index()].right;
                    self.nodes[sr.index()].color = Color::Black;
                    self.rotate_left(parent);
                    x = self.root;
                }
            } else {
                let mut sibling = self.nodes[parent.index()].left;
                if self.color(sibling) == Color::Red {
                    self.nodes[sibling.index()].color = Color::Black;
                    self.nodes[parent.index()].color = Color::Red;
                    self.rotate_right(parent);
                    sibling = self.nodes[parent.index()].left;
                }
                let sl = self.nodes[sibling.index()].left;
                let sr = self.nodes[sibling.index()].right;
                if self.color(sl) == Color::Black && self.color(sr) == Color::Black {
                    self.nodes[sibling.index()].color = Color::Red;
                    x = parent;
                } else {
                    if self.color(sl) == Color::Black {
                        self.nodes[sr.index()].color = Color::Black;
                        self.nodes[sibling.index()].color = Color::Red;
                        self.rotate_left(sibling);
                        sibling = self.nodes[parent.index()].left;
                    }
                    self.nodes[sibling.index()].color = self.color(parent);
                    self.nodes[parent.index()].color = Color::Black;
                    let sl = self.nodes[sibling.index()].left;
                    self.nodes[sl.index()].color = Color::Black;
                    self.rotate_right(parent);
                    x = self.root;
                }
            }
        }
        self.nodes[x.index()].color = Color::Black;
    }
}

impl<K> Default for RedBlackTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    fn int_order(a: &i32, b: &i32) -> Ordering {
        a.cmp(b)
    }

    fn keys(tree: &RedBlackTree<i32>) -> Vec<i32> {
        tree.in_order().iter().map(|&id| *tree.key(id)).collect()
    }

    // Checks the red-black invariants and the subtree sizes, returning the
    // black height of the subtree.
    fn check_node(tree: &RedBlackTree<i32>, id: NodeId) -> u32 {
        if id.is_nil() {
            return 1;
        }
        let node = &tree.nodes[id.index()];
        if node.color == Color::Red {
            assert_eq!(tree.color(node.left), Color::Black);
            assert_eq!(tree.color(node.right), Color::Black);
        }
        if !node.left.is_nil() {
            assert_eq!(tree.nodes[node.left.index()].parent, id);
            assert!(tree.key(node.left) <= tree.key(id));
        }
        if !node.right.is_nil() {
            assert_eq!(tree.nodes[node.right.index()].parent, id);
            assert!(tree.key(node.right) >= tree.key(id));
        }
        assert_eq!(node.size, tree.size(node.left) + tree.size(node.right) + 1);

        let left_height = check_node(tree, node.left);
        let right_height = check_node(tree, node.right);
        assert_eq!(left_height, right_height);

        left_height + if node.color == Color::Black { 1 } else { 0 }
    }

    fn check(tree: &RedBlackTree<i32>) {
        assert_eq!(tree.color(tree.root), Color::Black);
        check_node(tree, tree.root);
        let sorted = keys(tree);
        let mut expected = sorted.clone();
        expected.sort_unstable();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn insert_and_order() {
        let mut tree = RedBlackTree::new();
        for k in [5, 2, 9, 1, 7, 3, 8, 4, 6, 0] {
            tree.insert(k, &int_order);
            check(&tree);
        }
        assert_eq!(keys(&tree), vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(tree.len(), 10);
        assert_eq!(*tree.key(tree.min_node().unwrap()), 0);
        assert_eq!(*tree.key(tree.max_node().unwrap()), 9);
    }

    #[test]
    fn neighbors() {
        let mut tree = RedBlackTree::new();
        for k in 0..20 {
            tree.insert(k * 2, &int_order);
        }
        let id = tree.search(&10, &int_order).unwrap();
        assert_eq!(*tree.key(tree.successor(id).unwrap()), 12);
        assert_eq!(*tree.key(tree.predecessor(id).unwrap()), 8);

        let min = tree.min_node().unwrap();
        assert!(tree.predecessor(min).is_none());
        let max = tree.max_node().unwrap();
        assert!(tree.successor(max).is_none());
    }

    #[test]
    fn rank_queries() {
        let mut tree = RedBlackTree::new();
        for k in [13, 4, 8, 1, 20, 16, 2] {
            tree.insert(k, &int_order);
        }
        let in_order = tree.in_order();
        for (rank, &id) in in_order.iter().enumerate() {
            assert_eq!(tree.nth(rank), Some(id));
        }
        assert_eq!(tree.nth(7), None);
    }

    #[test]
    fn removal_keeps_handles_valid() {
        let mut tree = RedBlackTree::new();
        let mut handles = Vec::new();
        for k in 0..16 {
            handles.push((k, tree.insert(k, &int_order)));
        }
        // Remove the even keys, handles of the odd ones must survive.
        for &(k, id) in &handles {
            if k % 2 == 0 {
                assert_eq!(tree.remove(id), k);
                check(&tree);
            }
        }
        for &(k, id) in &handles {
            if k % 2 == 1 {
                assert_eq!(*tree.key(id), k);
            }
        }
        assert_eq!(keys(&tree), vec![1, 3, 5, 7, 9, 11, 13, 15]);
    }

    #[test]
    fn swap_keys_preserves_structure() {
        let mut tree = RedBlackTree::new();
        for k in [3, 1, 4, 2, 5] {
            tree.insert(k, &int_order);
        }
        let shape: Vec<NodeId> = tree.in_order();
        let a = tree.search(&2, &int_order).unwrap();
        let b = tree.search(&3, &int_order).unwrap();
        tree.swap_keys(a, b);
        // Same nodes in the same positions, two keys exchanged.
        assert_eq!(tree.in_order(), shape);
        assert_eq!(*tree.key(a), 3);
        assert_eq!(*tree.key(b), 2);
    }

    #[test]
    fn randomized_against_reference() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut tree = RedBlackTree::new();
        let mut reference: Vec<i32> = Vec::new();

        for _ in 0..500 {
            if reference.is_empty() || rng.gen_bool(0.6) {
                let k = rng.gen_range(0..1000);
                tree.insert(k, &int_order);
                let pos = reference.binary_search(&k).unwrap_or_else(|e| e);
                reference.insert(pos, k);
            } else {
                let k = reference.remove(rng.gen_range(0..reference.len()));
                let id = tree.search(&k, &int_order).unwrap();
                tree.remove(id);
            }
            check(&tree);
            assert_eq!(keys(&tree), reference);
            assert_eq!(tree.len(), reference.len());
        }
    }
}
