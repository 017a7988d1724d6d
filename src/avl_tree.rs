//! AvlTree: ordered map over unique keys with arena-backed, height-balanced nodes.

use core::borrow::Borrow;
use core::cmp::Ordering;
use core::mem;
use slotmap::{DefaultKey, SlotMap};

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    left: Option<DefaultKey>,
    right: Option<DefaultKey>,
    /// Cached subtree height; a leaf has height 1, an absent child height 0.
    height: usize,
}

/// A self-balancing binary search tree keyed by `Ord`.
///
/// Nodes live in a `SlotMap` arena owned by the tree; children are stored as
/// arena keys rather than boxed pointers, so drops are flat and rotations are
/// a few key swaps. After every public call the tree satisfies:
///
/// - BST order: left subtree keys < node key < right subtree keys.
/// - `height(n) == 1 + max(height(left), height(right))` for the cached field.
/// - AVL balance: `|height(left) - height(right)| <= 1` at every node.
#[derive(Debug)]
pub struct AvlTree<K, V> {
    nodes: SlotMap<DefaultKey, Node<K, V>>,
    root: Option<DefaultKey>,
    rotations: u64,
}

impl<K, V> AvlTree<K, V> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
            rotations: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Height of the root, 0 for an empty tree.
    pub fn height(&self) -> usize {
        self.node_height(self.root)
    }

    /// Lifetime count of single rotations performed by this instance.
    /// A double rotation counts as two. Never reset.
    pub fn rotation_count(&self) -> u64 {
        self.rotations
    }

    /// In-order iterator: entries ascend strictly by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut it = Iter {
            nodes: &self.nodes,
            stack: Vec::new(),
        };
        it.push_left_spine(self.root);
        it
    }

    fn node_height(&self, node: Option<DefaultKey>) -> usize {
        node.map_or(0, |n| self.nodes[n].height)
    }

    fn update_height(&mut self, n: DefaultKey) {
        let left = self.node_height(self.nodes[n].left);
        let right = self.node_height(self.nodes[n].right);
        self.nodes[n].height = 1 + left.max(right);
    }

    fn balance_factor(&self, n: DefaultKey) -> i64 {
        let left = self.node_height(self.nodes[n].left);
        let right = self.node_height(self.nodes[n].right);
        left as i64 - right as i64
    }

    // Rotations relink three arena slots and recompute the two touched
    // heights child-then-parent. Each bumps the rotation counter once.

    fn rotate_right(&mut self, y: DefaultKey) -> DefaultKey {
        let x = self.nodes[y].left.unwrap();
        let middle = self.nodes[x].right;
        self.nodes[x].right = Some(y);
        self.nodes[y].left = middle;
        self.update_height(y);
        self.update_height(x);
        self.rotations += 1;
        x
    }

    fn rotate_left(&mut self, x: DefaultKey) -> DefaultKey {
        let y = self.nodes[x].right.unwrap();
        let middle = self.nodes[y].left;
        self.nodes[y].left = Some(x);
        self.nodes[x].right = middle;
        self.update_height(x);
        self.update_height(y);
        self.rotations += 1;
        y
    }

    /// Recompute the cached height of `n` and restore the AVL invariant at
    /// `n` if an insert or delete below left it with `|balance| > 1`.
    /// Rotation choice follows the taller child's balance factor, with ties
    /// resolved to the single rotation (ties only arise on the delete path).
    fn rebalance(&mut self, n: DefaultKey) -> DefaultKey {
        self.update_height(n);
        let balance = self.balance_factor(n);
        if balance > 1 {
            let left = self.nodes[n].left.unwrap();
            if self.balance_factor(left) < 0 {
                let new_left = self.rotate_left(left);
                self.nodes[n].left = Some(new_left);
            }
            self.rotate_right(n)
        } else if balance < -1 {
            let right = self.nodes[n].right.unwrap();
            if self.balance_factor(right) > 0 {
                let new_right = self.rotate_right(right);
                self.nodes[n].right = Some(new_right);
            }
            self.rotate_left(n)
        } else {
            n
        }
    }
}

impl<K, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> AvlTree<K, V>
where
    K: Ord,
{
    /// Insert `key`, returning the previous value if the key was already
    /// present. An overwrite changes neither the tree shape nor `len()`;
    /// a fresh insert rebalances on the unwind of the descent.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (root, previous) = self.insert_at(self.root, key, value);
        self.root = Some(root);
        previous
    }

    fn insert_at(
        &mut self,
        node: Option<DefaultKey>,
        key: K,
        value: V,
    ) -> (DefaultKey, Option<V>) {
        let n = match node {
            None => {
                let leaf = self.nodes.insert(Node {
                    key,
                    value,
                    left: None,
                    right: None,
                    height: 1,
                });
                return (leaf, None);
            }
            Some(n) => n,
        };
        match key.cmp(&self.nodes[n].key) {
            Ordering::Less => {
                let (child, previous) = self.insert_at(self.nodes[n].left, key, value);
                self.nodes[n].left = Some(child);
                (self.rebalance(n), previous)
            }
            Ordering::Greater => {
                let (child, previous) = self.insert_at(self.nodes[n].right, key, value);
                self.nodes[n].right = Some(child);
                (self.rebalance(n), previous)
            }
            Ordering::Equal => {
                let previous = mem::replace(&mut self.nodes[n].value, value);
                (n, Some(previous))
            }
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut cur = self.root;
        while let Some(n) = cur {
            let node = &self.nodes[n];
            match key.cmp(node.key.borrow()) {
                Ordering::Less => cur = node.left,
                Ordering::Greater => cur = node.right,
                Ordering::Equal => return Some(&node.value),
            }
        }
        None
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut cur = self.root;
        while let Some(n) = cur {
            match key.cmp(self.nodes[n].key.borrow()) {
                Ordering::Less => cur = self.nodes[n].left,
                Ordering::Greater => cur = self.nodes[n].right,
                Ordering::Equal => return Some(&mut self.nodes[n].value),
            }
        }
        None
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.get(key).is_some()
    }

    /// Remove `key` and return its value; `None` (and no structural change)
    /// if absent. A node with two children is replaced by its in-order
    /// successor, which is in turn unlinked from the right subtree; every
    /// ancestor on the way back up is rebalanced.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (root, removed) = self.remove_at(self.root, key);
        self.root = root;
        removed
    }

    fn remove_at<Q>(&mut self, node: Option<DefaultKey>, key: &Q) -> (Option<DefaultKey>, Option<V>)
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let n = match node {
            None => return (None, None),
            Some(n) => n,
        };
        match key.cmp(self.nodes[n].key.borrow()) {
            Ordering::Less => {
                let (child, removed) = self.remove_at(self.nodes[n].left, key);
                self.nodes[n].left = child;
                if removed.is_some() {
                    (Some(self.rebalance(n)), removed)
                } else {
                    (Some(n), None)
                }
            }
            Ordering::Greater => {
                let (child, removed) = self.remove_at(self.nodes[n].right, key);
                self.nodes[n].right = child;
                if removed.is_some() {
                    (Some(self.rebalance(n)), removed)
                } else {
                    (Some(n), None)
                }
            }
            Ordering::Equal => {
                let left = self.nodes[n].left;
                let right = self.nodes[n].right;
                match (left, right) {
                    // Zero or one child: splice the child (if any) into place.
                    (None, child) | (child, None) => {
                        let node = self.nodes.remove(n).unwrap();
                        (child, Some(node.value))
                    }
                    // Two children: adopt the in-order successor's entry.
                    (Some(_), Some(right)) => {
                        let (new_right, (succ_key, succ_value)) = self.take_min(right);
                        let node = &mut self.nodes[n];
                        node.right = new_right;
                        node.key = succ_key;
                        let removed = mem::replace(&mut node.value, succ_value);
                        (Some(self.rebalance(n)), Some(removed))
                    }
                }
            }
        }
    }

    /// Unlink the minimum-key node of the subtree rooted at `n`, rebalancing
    /// the subtree on the unwind. Returns the new subtree root and the
    /// unlinked entry.
    fn take_min(&mut self, n: DefaultKey) -> (Option<DefaultKey>, (K, V)) {
        match self.nodes[n].left {
            Some(left) => {
                let (child, min) = self.take_min(left);
                self.nodes[n].left = child;
                (Some(self.rebalance(n)), min)
            }
            None => {
                let right = self.nodes[n].right;
                let node = self.nodes.remove(n).unwrap();
                (right, (node.key, node.value))
            }
        }
    }
}

/// Iterator over `(&K, &V)` in ascending key order.
pub struct Iter<'a, K, V> {
    nodes: &'a SlotMap<DefaultKey, Node<K, V>>,
    stack: Vec<DefaultKey>,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left_spine(&mut self, mut cur: Option<DefaultKey>) {
        while let Some(n) = cur {
            self.stack.push(n);
            cur = self.nodes[n].left;
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.stack.pop()?;
        let node = &self.nodes[n];
        self.push_left_spine(node.right);
        Some((&node.key, &node.value))
    }
}

/// Consuming in-order iterator; yields owned `(K, V)` in ascending key order.
/// This is the export path the bucketed container drains during a resize.
pub struct IntoEntries<K, V> {
    nodes: SlotMap<DefaultKey, Node<K, V>>,
    stack: Vec<DefaultKey>,
}

impl<K, V> IntoEntries<K, V> {
    fn push_left_spine(&mut self, mut cur: Option<DefaultKey>) {
        while let Some(n) = cur {
            self.stack.push(n);
            cur = self.nodes[n].left;
        }
    }
}

impl<K, V> Iterator for IntoEntries<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.stack.pop()?;
        let node = self.nodes.remove(n).unwrap();
        self.push_left_spine(node.right);
        Some((node.key, node.value))
    }
}

impl<K, V> IntoIterator for AvlTree<K, V> {
    type Item = (K, V);
    type IntoIter = IntoEntries<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let AvlTree {
            nodes,
            root,
            rotations: _,
        } = self;
        let mut it = IntoEntries {
            nodes,
            stack: Vec::new(),
        };
        it.push_left_spine(root);
        it
    }
}

#[cfg(test)]
impl<K, V> AvlTree<K, V>
where
    K: Ord,
{
    /// Walk every reachable node and assert the BST ordering, cached-height
    /// and AVL balance invariants, plus `len()`/`height()` consistency.
    pub(crate) fn assert_invariants(&self) {
        let (height, count) = self.check_node(self.root, None, None);
        assert_eq!(height, self.height(), "root height mismatch");
        assert_eq!(count, self.len(), "reachable node count != len");
    }

    fn check_node(
        &self,
        node: Option<DefaultKey>,
        lower: Option<&K>,
        upper: Option<&K>,
    ) -> (usize, usize) {
        let n = match node {
            None => return (0, 0),
            Some(n) => n,
        };
        let entry = &self.nodes[n];
        if let Some(lower) = lower {
            assert!(entry.key > *lower, "BST order violated (lower bound)");
        }
        if let Some(upper) = upper {
            assert!(entry.key < *upper, "BST order violated (upper bound)");
        }
        let (lh, lc) = self.check_node(entry.left, lower, Some(&entry.key));
        let (rh, rc) = self.check_node(entry.right, Some(&entry.key), upper);
        assert_eq!(entry.height, 1 + lh.max(rh), "stale cached height");
        assert!((lh as i64 - rh as i64).abs() <= 1, "AVL balance violated");
        (entry.height, 1 + lc + rc)
    }
}
