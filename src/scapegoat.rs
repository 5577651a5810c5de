use std::cmp::Ordering::{self, *};
use std::fmt::{Debug, Display, Formatter};
use std::iter::FusedIterator;
use std::mem::{replace, swap};

use log::debug;

use crate::error::EmptyTreeError;

/// Balance parameter used when none is supplied.
///
/// Values near 1 tolerate more imbalance before rebuilding (larger, rarer
/// rebuilds); values near 0.5 rebuild more often for stricter balance.
pub const DEFAULT_ALPHA: f64 = 0.57;

/// A total order over keys, supplied as a strategy object.
///
/// Separating the order from the key type lets a map impose a non-default
/// order (or order keys that are not `Ord` at all).  The comparator must
/// define a strict total order; violating transitivity or consistency leaves
/// the tree shape undefined.
pub trait Comparator<K> {
    /// Compares two keys.
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering;
}

/// The `Ord`-derived order; the default comparator for a map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<K: Ord> Comparator<K> for NaturalOrder {
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        lhs.cmp(rhs)
    }
}

impl<K, F: Fn(&K, &K) -> Ordering> Comparator<K> for F {
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        self(lhs, rhs)
    }
}

// Nodes live in a slab; links are indices, so the parent back-references
// cannot form ownership cycles.
type NodeId = usize;

#[derive(Clone)]
struct Node<K, V> {
    key: K,
    val: V,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: Option<NodeId>,
}

/// A map from keys to values sorted by key.
///
/// Internally, the map is a [scapegoat
/// tree](https://en.wikipedia.org/wiki/Scapegoat_tree): a binary search tree
/// that stores no per-node balance metadata.  Instead, an insertion that
/// lands too deep walks back up to find a "scapegoat" ancestor whose subtree
/// is flattened and rebuilt at minimal height, and deletions pay for
/// themselves by rebuilding the whole tree once the map has shrunk below an
/// `alpha` fraction of its recorded peak.  Lookup, insertion, and deletion
/// are all amortized O(log n).
///
/// The balance parameter `alpha` is fixed at construction and must lie in
/// the open interval `(0.5, 1)`.
///
/// Nodes are held in an internal arena indexed by integer handles, with
/// freed slots recycled through a free list.  Parent references are plain
/// indices, never owning pointers.
///
/// All operations are synchronous and require exclusive access for
/// mutation; a rebuild may relink an arbitrary span of the tree, so callers
/// that share a map across threads must serialize every operation behind a
/// single lock.
///
/// # Examples
/// ```
/// use scapegoat_collections::ScapegoatMap;
///
/// let mut m = ScapegoatMap::new();
/// m.insert(2, "b");
/// m.insert(1, "a");
/// m.insert(3, "c");
/// assert_eq!(m.get(&2), Some(&"b"));
/// assert!(m.keys().copied().eq([1, 2, 3]));
/// ```
#[derive(Clone)]
pub struct ScapegoatMap<K, V, C = NaturalOrder> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
    len: usize,
    max_len: usize,
    alpha: f64,
    cmp: C,
}

impl<K: Ord, V> ScapegoatMap<K, V> {
    /// Creates a new, empty map ordered by `K`'s natural order.
    ///
    /// # Examples
    /// ```
    /// use scapegoat_collections::ScapegoatMap;
    /// let m: ScapegoatMap<usize, usize> = ScapegoatMap::new();
    /// assert!(m.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }

    /// Creates an empty map with the given balance parameter.
    ///
    /// # Panics
    /// Panics unless `alpha` lies in the open interval `(0.5, 1)`.
    pub fn with_alpha(alpha: f64) -> Self {
        Self::with_comparator_and_alpha(NaturalOrder, alpha)
    }
}

impl<K, V, C: Comparator<K>> ScapegoatMap<K, V, C> {
    /// Creates an empty map ordered by `cmp`.
    ///
    /// # Examples
    /// ```
    /// use scapegoat_collections::ScapegoatMap;
    ///
    /// let mut m = ScapegoatMap::with_comparator(|a: &i32, b: &i32| b.cmp(a));
    /// m.extend([(1, "a"), (2, "b")]);
    /// assert!(m.keys().copied().eq([2, 1]));
    /// ```
    pub fn with_comparator(cmp: C) -> Self {
        Self::with_comparator_and_alpha(cmp, DEFAULT_ALPHA)
    }

    /// Creates an empty map ordered by `cmp` with the given balance
    /// parameter.
    ///
    /// # Panics
    /// Panics unless `alpha` lies in the open interval `(0.5, 1)`.
    pub fn with_comparator_and_alpha(cmp: C, alpha: f64) -> Self {
        assert!(
            alpha > 0.5 && alpha < 1.0,
            "alpha must lie in the open interval (0.5, 1)"
        );

        ScapegoatMap {
            slots: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
            max_len: 0,
            alpha,
            cmp,
        }
    }

    /// Returns the balance parameter the map was constructed with.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Tests whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops all entries from the map.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
        self.max_len = 0;
    }

    /// Returns a reference to the value mapped to `key`, or `None` if the
    /// key is absent.
    ///
    /// # Examples
    /// ```
    /// use scapegoat_collections::ScapegoatMap;
    ///
    /// let mut m = ScapegoatMap::new();
    /// m.insert(0, "a");
    /// assert_eq!(m.get(&0), Some(&"a"));
    /// assert_eq!(m.get(&1), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|id| &self.node(id).val)
    }

    /// Returns a mutable reference to the value mapped to `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = self.find(key)?;
        Some(&mut self.node_mut(id).val)
    }

    /// Tests whether `key` is present.
    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Inserts a key-value pair in the map and returns the previous value,
    /// if any.
    ///
    /// Inserting over an existing key overwrites the value in place and
    /// never changes the tree shape.  A new key is attached as a leaf; if
    /// the leaf lands deeper than the depth bound permits, the subtree of a
    /// scapegoat ancestor is rebuilt at minimal height.
    ///
    /// # Examples
    /// ```
    /// use scapegoat_collections::ScapegoatMap;
    ///
    /// let mut m = ScapegoatMap::new();
    /// assert_eq!(m.insert(0, "a"), None);
    /// assert_eq!(m.insert(0, "b"), Some("a"));
    /// assert_eq!(m.get(&0), Some(&"b"));
    /// ```
    pub fn insert(&mut self, key: K, val: V) -> Option<V> {
        let (old, new_id) = self.insert_inner(key, val);
        if let Some(id) = new_id {
            if self.is_deep(id) {
                let scapegoat = self.find_scapegoat(id);
                self.rebalance_at(scapegoat);
            }
        }
        old
    }

    /// Inserts a key-value pair without checking the depth bound.
    ///
    /// Intended for bulk construction: load every entry with this method,
    /// then call [`rebuild`](Self::rebuild) once.
    pub fn insert_without_rebalancing(&mut self, key: K, val: V) -> Option<V> {
        self.insert_inner(key, val).0
    }

    /// Removes `key` from the map and returns the unmapped value.
    ///
    /// Removing an absent key is a no-op.  Either way, if the map has
    /// shrunk below `alpha` times its recorded peak size, the whole tree is
    /// rebuilt at minimal height and the peak is reset.  Many small
    /// deletions are free until the accumulated shrinkage crosses the
    /// threshold, which pays for the single O(n) rebuild.
    ///
    /// # Examples
    /// ```
    /// use scapegoat_collections::ScapegoatMap;
    ///
    /// let mut m = ScapegoatMap::from([(1, 2), (2, 3)]);
    /// assert_eq!(m.remove(&2), Some(3));
    /// assert_eq!(m.remove(&2), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let removed = self.remove_without_rebalancing(key);
        if (self.len as f64) < self.alpha * self.max_len as f64 {
            debug!(
                "amortized full rebuild: {} of {} nodes remain",
                self.len, self.max_len
            );
            self.rebuild();
        }
        removed
    }

    /// Removes `key` without checking the shrinkage threshold.
    pub fn remove_without_rebalancing(&mut self, key: &K) -> Option<V> {
        let mut id = self.find(key)?;

        // A node with two children trades places with its in-order
        // successor, which has no left child, and is removed there.
        if let (Some(_), Some(right)) = (self.node(id).left, self.node(id).right) {
            let succ = self.leftmost(right);
            self.swap_entries(id, succ);
            id = succ;
        }

        Some(self.splice_out(id))
    }

    /// Flattens the whole tree and rebuilds it at minimal height, resetting
    /// the recorded peak size.
    ///
    /// The companion of
    /// [`insert_without_rebalancing`](Self::insert_without_rebalancing)
    /// for bulk construction.
    pub fn rebuild(&mut self) {
        let seq = self.flatten(self.root);
        self.root = self.build_tree(&seq);
        self.max_len = self.len;
    }

    /// Returns the maximum root-to-leaf edge count, or `-1` for an empty
    /// map.
    ///
    /// # Examples
    /// ```
    /// use scapegoat_collections::ScapegoatMap;
    ///
    /// let mut m = ScapegoatMap::new();
    /// assert_eq!(m.depth(), -1);
    /// m.insert(1, ());
    /// assert_eq!(m.depth(), 0);
    /// ```
    pub fn depth(&self) -> isize {
        let mut deepest = -1;
        let mut work = Vec::new();
        if let Some(root) = self.root {
            work.push((root, 0));
        }
        while let Some((id, d)) = work.pop() {
            deepest = deepest.max(d);
            let n = self.node(id);
            if let Some(l) = n.left {
                work.push((l, d + 1));
            }
            if let Some(r) = n.right {
                work.push((r, d + 1));
            }
        }
        deepest
    }

    /// Returns the value of the least key.
    ///
    /// # Errors
    /// Fails with [`EmptyTreeError`] when the map is empty.
    pub fn minimum(&self) -> Result<&V, EmptyTreeError> {
        let root = self.root.ok_or(EmptyTreeError)?;
        Ok(&self.node(self.leftmost(root)).val)
    }

    /// Returns the value of the greatest key.
    ///
    /// # Errors
    /// Fails with [`EmptyTreeError`] when the map is empty.
    pub fn maximum(&self) -> Result<&V, EmptyTreeError> {
        let root = self.root.ok_or(EmptyTreeError)?;
        Ok(&self.node(self.rightmost(root)).val)
    }

    /// Returns the value of the greatest key strictly less than `key`, or
    /// `None` if no such key exists.  `key` itself need not be present.
    ///
    /// # Examples
    /// ```
    /// use scapegoat_collections::ScapegoatMap;
    ///
    /// let m = ScapegoatMap::from([(10, "x"), (20, "y"), (30, "z")]);
    /// assert_eq!(m.predecessor(&20), Some(&"x"));
    /// assert_eq!(m.predecessor(&25), Some(&"y"));
    /// assert_eq!(m.predecessor(&10), None);
    /// ```
    pub fn predecessor(&self, key: &K) -> Option<&V> {
        let mut best = None;
        let mut cur = self.root;
        while let Some(id) = cur {
            match self.cmp.compare(key, &self.node(id).key) {
                Greater => {
                    // last ancestor passed via a right turn
                    best = Some(id);
                    cur = self.node(id).right;
                }
                Less => cur = self.node(id).left,
                Equal => {
                    if let Some(left) = self.node(id).left {
                        best = Some(self.rightmost(left));
                    }
                    break;
                }
            }
        }
        best.map(|id| &self.node(id).val)
    }

    /// Returns the value of the least key strictly greater than `key`, or
    /// `None` if no such key exists.  `key` itself need not be present.
    ///
    /// # Examples
    /// ```
    /// use scapegoat_collections::ScapegoatMap;
    ///
    /// let m = ScapegoatMap::from([(10, "x"), (20, "y"), (30, "z")]);
    /// assert_eq!(m.successor(&20), Some(&"z"));
    /// assert_eq!(m.successor(&5), Some(&"x"));
    /// assert_eq!(m.successor(&30), None);
    /// ```
    pub fn successor(&self, key: &K) -> Option<&V> {
        let mut best = None;
        let mut cur = self.root;
        while let Some(id) = cur {
            match self.cmp.compare(key, &self.node(id).key) {
                Less => {
                    // last ancestor passed via a left turn
                    best = Some(id);
                    cur = self.node(id).left;
                }
                Greater => cur = self.node(id).right,
                Equal => {
                    if let Some(right) = self.node(id).right {
                        best = Some(self.leftmost(right));
                    }
                    break;
                }
            }
        }
        best.map(|id| &self.node(id).val)
    }

    /// Creates an iterator over the map entries, sorted by key.
    ///
    /// # Examples
    /// ```
    /// use scapegoat_collections::ScapegoatMap;
    ///
    /// let m = ScapegoatMap::from([(0, 1), (1, 2), (2, 3)]);
    /// for (i, (k, v)) in m.iter().enumerate() {
    ///     assert_eq!(&i, k);
    ///     assert_eq!(&(i + 1), v);
    /// }
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        let mut work = Vec::new();
        let mut cur = self.root;
        while let Some(id) = cur {
            work.push(id);
            cur = self.node(id).left;
        }

        Iter {
            map: self,
            work,
            len: self.len,
        }
    }

    /// Produces an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|p| p.0)
    }

    /// Produces an iterator over the values of the map, ordered by their
    /// associated keys.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|p| p.1)
    }

    /// Produces the in-order sequence of values.
    ///
    /// The key sequence underlying this traversal is strictly ascending.
    pub fn in_order(&self) -> impl Iterator<Item = &V> {
        self.values()
    }

    /// Produces the preorder sequence of values (each node before its
    /// subtrees).
    pub fn preorder(&self) -> Preorder<'_, K, V, C> {
        Preorder {
            map: self,
            work: self.root.into_iter().collect(),
        }
    }

    /// Produces the postorder sequence of values (each node after its
    /// subtrees).
    pub fn postorder(&self) -> Postorder<'_, K, V, C> {
        Postorder {
            map: self,
            work: self.root.map(|id| (id, false)).into_iter().collect(),
        }
    }

    // ---- arena plumbing ----

    fn node(&self, id: NodeId) -> &Node<K, V> {
        self.slots[id].as_ref().expect("stale node id")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        self.slots[id].as_mut().expect("stale node id")
    }

    fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.slots[id] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, id: NodeId) -> Node<K, V> {
        let node = self.slots[id].take().expect("released a vacant slot");
        self.free.push(id);
        node
    }

    // Exchanges the entries of two distinct slots; the links stay put.
    fn swap_entries(&mut self, a: NodeId, b: NodeId) {
        debug_assert_ne!(a, b);
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.slots.split_at_mut(hi);
        let x = head[lo].as_mut().expect("stale node id");
        let y = tail[0].as_mut().expect("stale node id");
        swap(&mut x.key, &mut y.key);
        swap(&mut x.val, &mut y.val);
    }

    // ---- search ----

    fn find(&self, key: &K) -> Option<NodeId> {
        let mut cur = self.root;
        while let Some(id) = cur {
            match self.cmp.compare(key, &self.node(id).key) {
                Less => cur = self.node(id).left,
                Greater => cur = self.node(id).right,
                Equal => return Some(id),
            }
        }
        None
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.node(id).left {
            id = left;
        }
        id
    }

    fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.node(id).right {
            id = right;
        }
        id
    }

    // ---- structural insert / delete ----

    // Returns the replaced value on overwrite, or the id of the new leaf.
    fn insert_inner(&mut self, key: K, val: V) -> (Option<V>, Option<NodeId>) {
        let mut parent = None;
        let mut went_left = false;
        let mut cur = self.root;
        while let Some(id) = cur {
            match self.cmp.compare(&key, &self.node(id).key) {
                Equal => {
                    let old = replace(&mut self.node_mut(id).val, val);
                    return (Some(old), None);
                }
                Less => {
                    parent = Some(id);
                    went_left = true;
                    cur = self.node(id).left;
                }
                Greater => {
                    parent = Some(id);
                    went_left = false;
                    cur = self.node(id).right;
                }
            }
        }

        let id = self.alloc(Node {
            key,
            val,
            left: None,
            right: None,
            parent,
        });
        match parent {
            None => self.root = Some(id),
            Some(p) if went_left => self.node_mut(p).left = Some(id),
            Some(p) => self.node_mut(p).right = Some(id),
        }
        self.len += 1;
        self.max_len = self.max_len.max(self.len);
        (None, Some(id))
    }

    // Unlinks a node with at most one child and frees its slot.
    fn splice_out(&mut self, id: NodeId) -> V {
        let child = self.node(id).left.or(self.node(id).right);
        let parent = self.node(id).parent;
        if let Some(c) = child {
            self.node_mut(c).parent = parent;
        }
        match parent {
            None => self.root = child,
            Some(p) => {
                if self.node(p).left == Some(id) {
                    self.node_mut(p).left = child;
                } else {
                    self.node_mut(p).right = child;
                }
            }
        }
        self.len -= 1;
        self.release(id).val
    }

    // ---- rebalancing ----

    // floor(log_{1/alpha}(n)); the depth bound for a tree of n nodes.
    fn h_alpha(&self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        ((n as f64).ln() / (1.0 / self.alpha).ln()).floor() as usize
    }

    fn node_height(&self, mut id: NodeId) -> usize {
        let mut height = 0;
        while let Some(p) = self.node(id).parent {
            height += 1;
            id = p;
        }
        height
    }

    fn is_deep(&self, id: NodeId) -> bool {
        self.node_height(id) > self.h_alpha(self.len)
    }

    fn subtree_size(&self, root: NodeId) -> usize {
        let mut count = 0;
        let mut work = vec![root];
        while let Some(id) = work.pop() {
            count += 1;
            let n = self.node(id);
            if let Some(l) = n.left {
                work.push(l);
            }
            if let Some(r) = n.right {
                work.push(r);
            }
        }
        count
    }

    fn sibling(&self, id: NodeId) -> Option<NodeId> {
        let p = self.node(id).parent?;
        let parent = self.node(p);
        if parent.left == Some(id) {
            parent.right
        } else {
            parent.left
        }
    }

    // Walks upward from a too-deep leaf, keeping a running estimate of the
    // size of the subtree rooted at each ancestor.  The first ancestor whose
    // distance from the leaf exceeds that subtree's own depth bound is the
    // scapegoat; the walk falls back to the root.  The first violation
    // found wins; alternate tie-breaks change the amortized cost.
    fn find_scapegoat(&self, mut id: NodeId) -> NodeId {
        let mut size = 1;
        let mut height = 0;
        while let Some(p) = self.node(id).parent {
            height += 1;
            let sibling = self.sibling(id).map_or(0, |s| self.subtree_size(s));
            let estimate = 1 + size + sibling;
            if height > self.h_alpha(estimate) {
                return p;
            }
            id = p;
            size = estimate;
        }
        id
    }

    // Rebuilds the scapegoat's subtree at minimal height and splices the
    // result into the scapegoat's former position.
    fn rebalance_at(&mut self, scapegoat: NodeId) {
        let parent = self.node(scapegoat).parent;
        let was_left = parent.map(|p| self.node(p).left == Some(scapegoat));

        let seq = self.flatten(Some(scapegoat));
        debug!("rebuilding scapegoat subtree of {} nodes", seq.len());
        let sub = self.build_tree(&seq);

        if let Some(r) = sub {
            self.node_mut(r).parent = parent;
        }
        match (parent, was_left) {
            (Some(p), Some(true)) => self.node_mut(p).left = sub,
            (Some(p), Some(false)) => self.node_mut(p).right = sub,
            _ => self.root = sub,
        }
        self.max_len = self.len;
    }

    // In-order sequence of node ids, by explicit stack; trees may be
    // arbitrarily deep between rebuilds, so recursion is off the table.
    fn flatten(&self, root: Option<NodeId>) -> Vec<NodeId> {
        let mut seq = Vec::new();
        let mut stack = Vec::new();
        let mut cur = root;
        loop {
            match cur {
                Some(id) => {
                    stack.push(id);
                    cur = self.node(id).left;
                }
                None => match stack.pop() {
                    Some(id) => {
                        seq.push(id);
                        cur = self.node(id).right;
                    }
                    None => return seq,
                },
            }
        }
    }

    // Relinks a sorted run of nodes into a tree of minimal height, rooted
    // at the upper median.  Recursion depth is logarithmic in seq.len().
    fn build_tree(&mut self, seq: &[NodeId]) -> Option<NodeId> {
        if seq.is_empty() {
            return None;
        }
        let mid = seq.len() / 2;
        let root = seq[mid];
        self.node_mut(root).parent = None;

        let left = self.build_tree(&seq[..mid]);
        let right = self.build_tree(&seq[mid + 1..]);

        let n = self.node_mut(root);
        n.left = left;
        n.right = right;
        if let Some(l) = left {
            self.node_mut(l).parent = Some(root);
        }
        if let Some(r) = right {
            self.node_mut(r).parent = Some(root);
        }
        Some(root)
    }
}

#[cfg(test)]
impl<K, V, C: Comparator<K>> ScapegoatMap<K, V, C> {
    // Asserts every structural invariant: BST order under the comparator,
    // parent consistency, node count, and arena accounting.
    fn chk(&self) {
        if let Some(root) = self.root {
            assert_eq!(self.node(root).parent, None);
        }

        let seq = self.flatten(self.root);
        assert_eq!(seq.len(), self.len);
        for pair in seq.windows(2) {
            let lhs = &self.node(pair[0]).key;
            let rhs = &self.node(pair[1]).key;
            assert_eq!(self.cmp.compare(lhs, rhs), Less);
        }

        for &id in &seq {
            let n = self.node(id);
            if let Some(l) = n.left {
                assert_eq!(self.node(l).parent, Some(id));
            }
            if let Some(r) = n.right {
                assert_eq!(self.node(r).parent, Some(id));
            }
            if let Some(p) = n.parent {
                let pn = self.node(p);
                assert!(pn.left == Some(id) || pn.right == Some(id));
            }
        }

        let occupied = self.slots.iter().filter(|s| s.is_some()).count();
        assert_eq!(occupied, self.len);
        assert_eq!(self.free.len() + self.len, self.slots.len());
        assert!(self.free.iter().all(|&id| self.slots[id].is_none()));
        assert!(self.max_len >= self.len);
    }
}

impl<K: Debug, V: Debug, C> Debug for ScapegoatMap<K, V, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.root {
            None => f.write_str("ScapegoatMap(EMPTY)"),
            Some(root) => {
                f.write_fmt(format_args!("ScapegoatMap(#{}, ", self.len))?;
                self.fmt_node(f, root)?;
                f.write_str(")")
            }
        }
    }
}

impl<K: Debug, V: Debug, C> ScapegoatMap<K, V, C> {
    fn fmt_node(&self, f: &mut Formatter<'_>, id: NodeId) -> std::fmt::Result {
        let n = self.slots[id].as_ref().expect("stale node id");
        f.write_fmt(format_args!("{{{:?}: {:?}}} ", n.key, n.val))?;

        match n.left {
            None => f.write_str(".")?,
            Some(l) => self.fmt_node(f, l)?,
        }

        f.write_str(" ")?;

        match n.right {
            None => f.write_str(".")?,
            Some(r) => self.fmt_node(f, r)?,
        }

        Ok(())
    }
}

impl<K, V, C: Comparator<K>> Display for ScapegoatMap<K, V, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "ScapegoatMap of size {} and height {}",
            self.len,
            self.depth()
        ))
    }
}

impl<K: PartialEq, V: PartialEq, C: Comparator<K>> PartialEq for ScapegoatMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().zip(other.iter()).all(|(x, y)| x == y)
    }
}

impl<K: Eq, V: Eq, C: Comparator<K>> Eq for ScapegoatMap<K, V, C> {}

impl<K, V, C: Comparator<K> + Default> Default for ScapegoatMap<K, V, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K, V, C: Comparator<K>> Extend<(K, V)> for ScapegoatMap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, C: Comparator<K> + Default> FromIterator<(K, V)> for ScapegoatMap<K, V, C> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_comparator(C::default());
        map.extend(iter);
        map
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for ScapegoatMap<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        Self::from_iter(entries)
    }
}

/// An iterator over the entries of a [`ScapegoatMap`], sorted by key.
pub struct Iter<'a, K, V, C> {
    map: &'a ScapegoatMap<K, V, C>,
    work: Vec<NodeId>,
    len: usize,
}

impl<'a, K, V, C: Comparator<K>> Iterator for Iter<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let map = self.map;
        let id = self.work.pop()?;
        let n = map.node(id);

        let mut cur = n.right;
        while let Some(c) = cur {
            self.work.push(c);
            cur = map.node(c).left;
        }

        self.len -= 1;
        Some((&n.key, &n.val))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, K, V, C: Comparator<K>> ExactSizeIterator for Iter<'a, K, V, C> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<'a, K, V, C: Comparator<K>> FusedIterator for Iter<'a, K, V, C> {}

/// A preorder iterator over the values of a [`ScapegoatMap`].
pub struct Preorder<'a, K, V, C> {
    map: &'a ScapegoatMap<K, V, C>,
    work: Vec<NodeId>,
}

impl<'a, K, V, C: Comparator<K>> Iterator for Preorder<'a, K, V, C> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        let map = self.map;
        let id = self.work.pop()?;
        let n = map.node(id);
        if let Some(r) = n.right {
            self.work.push(r);
        }
        if let Some(l) = n.left {
            self.work.push(l);
        }
        Some(&n.val)
    }
}

impl<'a, K, V, C: Comparator<K>> FusedIterator for Preorder<'a, K, V, C> {}

/// A postorder iterator over the values of a [`ScapegoatMap`].
pub struct Postorder<'a, K, V, C> {
    map: &'a ScapegoatMap<K, V, C>,
    // the flag records whether a node's subtrees were already expanded
    work: Vec<(NodeId, bool)>,
}

impl<'a, K, V, C: Comparator<K>> Iterator for Postorder<'a, K, V, C> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        let map = self.map;
        loop {
            let (id, expanded) = self.work.pop()?;
            let n = map.node(id);
            if expanded {
                return Some(&n.val);
            }
            self.work.push((id, true));
            if let Some(r) = n.right {
                self.work.push((r, false));
            }
            if let Some(l) = n.left {
                self.work.push((l, false));
            }
        }
    }
}

impl<'a, K, V, C: Comparator<K>> FusedIterator for Postorder<'a, K, V, C> {}
