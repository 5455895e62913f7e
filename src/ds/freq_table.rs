//! Fixed table of frequency deques over a [`NodeArena`].
//!
//! One deque per frequency level, `capacity + 1` levels in total. Each level
//! keeps its nodes in insertion/promotion order so the oldest entry at that
//! frequency is the eviction victim (FIFO tie-break within a level).
//!
//! ## Architecture
//!
//! ```text
//!   arena (NodeArena<K, V>)                 buckets (Vec<FreqBucket>)
//!   ┌────────┬──────────────────────────┐   ┌───────┬──────────────────────┐
//!   │ NodeId │ Node { k, v, owner, .. } │   │ level │ head ◄──► tail, next │
//!   ├────────┼──────────────────────────┤   ├───────┼──────────────────────┤
//!   │ id_0   │ owner: 0                 │   │   0   │ [id_0] ◄──► [id_2]   │
//!   │ id_1   │ owner: 1                 │   │   1   │ [id_1]               │
//!   │ id_2   │ owner: 0                 │   │  ...  │                      │
//!   └────────┴──────────────────────────┘   │  cap  │ next = cap (itself)  │
//!                                           └───────┴──────────────────────┘
//!
//!   head = oldest at that level (pop_oldest), tail = newest (push_tail).
//!   Promotion moves a node to the tail of bucket `next`; the top bucket's
//!   `next` is itself, so frequency saturates instead of overflowing.
//! ```
//!
//! All operations are O(1): attach/detach is index rewiring in the arena.
//! `debug_validate_invariants()` is available in debug/test builds.

use crate::ds::node_arena::{Node, NodeArena, NodeId};

/// One frequency level: a deque of node ids plus the level promoted into.
#[derive(Debug)]
struct FreqBucket {
    /// Oldest node at this level; evicted first.
    head: Option<NodeId>,
    /// Newest node at this level; insertions and promotions land here.
    tail: Option<NodeId>,
    len: usize,
    /// Level a promoted node moves into. The top bucket points at itself.
    next: usize,
}

/// Array of `capacity + 1` frequency deques sharing one node arena.
#[derive(Debug)]
pub struct FreqTable<K, V> {
    arena: NodeArena<K, V>,
    buckets: Vec<FreqBucket>,
}

impl<K, V> FreqTable<K, V> {
    /// Creates a table with levels `0..=capacity`.
    ///
    /// Buckets are allocated once here and never resized; only their list
    /// contents change afterwards.
    pub fn new(capacity: usize) -> Self {
        let levels = capacity + 1;
        let mut buckets = Vec::with_capacity(levels);
        for level in 0..levels {
            buckets.push(FreqBucket {
                head: None,
                tail: None,
                len: 0,
                next: if level + 1 < levels { level + 1 } else { level },
            });
        }
        Self {
            arena: NodeArena::with_capacity(capacity),
            buckets,
        }
    }

    /// Number of frequency levels (`capacity + 1`).
    pub fn levels(&self) -> usize {
        self.buckets.len()
    }

    /// Level a node promoted out of `level` lands in.
    pub fn next_level(&self, level: usize) -> usize {
        self.buckets[level].next
    }

    /// Total number of nodes across all levels.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn level_len(&self, level: usize) -> usize {
        self.buckets[level].len
    }

    pub fn level_is_empty(&self, level: usize) -> bool {
        self.buckets[level].len == 0
    }

    /// Current level of a node, if it exists and is attached.
    pub fn level_of(&self, id: NodeId) -> Option<usize> {
        self.arena.get(id).and_then(|node| node.owner)
    }

    pub fn key(&self, id: NodeId) -> Option<&K> {
        self.arena.get(id).map(|node| &node.key)
    }

    pub fn value(&self, id: NodeId) -> Option<&V> {
        self.arena.get(id).map(|node| &node.value)
    }

    /// Swaps in a new value and returns the old one.
    pub fn replace_value(&mut self, id: NodeId, value: V) -> Option<V> {
        self.arena.replace_value(id, value)
    }

    /// Allocates a node for `(key, value)` and attaches it at the tail of
    /// `level`. Returns the new node's id.
    pub fn insert_new(&mut self, level: usize, key: K, value: V) -> NodeId {
        let id = self.arena.insert(Node {
            key,
            value,
            prev: None,
            next: None,
            owner: None,
        });
        self.attach_tail(level, id);
        id
    }

    /// Attaches a withdrawn node at the tail of `level` and makes that level
    /// its owner.
    pub fn push_tail(&mut self, level: usize, id: NodeId) {
        self.attach_tail(level, id);
    }

    /// Detaches a node from its owning level, repairing neighbor links.
    ///
    /// The node stays in the arena with cleared links; it must be re-attached
    /// via [`push_tail`](Self::push_tail) or discarded via
    /// [`remove`](Self::remove). Returns the level it was detached from.
    /// Withdrawing a node that is not attached to any level is a no-op
    /// returning `None`.
    pub fn withdraw(&mut self, id: NodeId) -> Option<usize> {
        self.detach(id)
    }

    /// Moves a node to the tail of its owner's `next` level. Returns the new
    /// level. Saturates at the top level (re-attached at its tail). Returns
    /// `None` for a missing or detached node.
    pub fn promote(&mut self, id: NodeId) -> Option<usize> {
        let level = self.arena.get(id)?.owner?;
        let target = self.buckets[level].next;
        self.detach(id);
        self.attach_tail(target, id);
        Some(target)
    }

    /// Removes and returns the oldest node at `level`, or `None` if the
    /// level is empty.
    pub fn pop_oldest(&mut self, level: usize) -> Option<(K, V)> {
        let id = self.buckets[level].head?;
        self.detach(id);
        self.arena.remove(id).map(|node| (node.key, node.value))
    }

    /// Detaches a node (if attached) and frees it, returning its key and
    /// value.
    pub fn remove(&mut self, id: NodeId) -> Option<(K, V)> {
        self.detach(id);
        self.arena.remove(id).map(|node| (node.key, node.value))
    }

    /// Drops every node; bucket wiring is preserved.
    pub fn clear(&mut self) {
        self.arena.clear();
        for bucket in &mut self.buckets {
            bucket.head = None;
            bucket.tail = None;
            bucket.len = 0;
        }
    }

    fn attach_tail(&mut self, level: usize, id: NodeId) {
        let old_tail = self.buckets[level].tail;
        {
            let node = self.arena.get_mut(id).expect("freq node missing");
            node.owner = Some(level);
            node.prev = old_tail;
            node.next = None;
        }
        if let Some(tail_id) = old_tail {
            if let Some(tail_node) = self.arena.get_mut(tail_id) {
                tail_node.next = Some(id);
            }
        } else {
            self.buckets[level].head = Some(id);
        }
        self.buckets[level].tail = Some(id);
        self.buckets[level].len += 1;
    }

    fn detach(&mut self, id: NodeId) -> Option<usize> {
        // A node with no owner is not in any list; nothing to repair.
        let (level, prev, next) = {
            let node = self.arena.get(id)?;
            (node.owner?, node.prev, node.next)
        };

        if let Some(prev_id) = prev {
            if let Some(prev_node) = self.arena.get_mut(prev_id) {
                prev_node.next = next;
            }
        } else {
            self.buckets[level].head = next;
        }

        if let Some(next_id) = next {
            if let Some(next_node) = self.arena.get_mut(next_id) {
                next_node.prev = prev;
            }
        } else {
            self.buckets[level].tail = prev;
        }

        if let Some(node) = self.arena.get_mut(id) {
            node.prev = None;
            node.next = None;
            node.owner = None;
        }
        self.buckets[level].len = self.buckets[level].len.saturating_sub(1);

        Some(level)
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let mut total = 0usize;
        for (level, bucket) in self.buckets.iter().enumerate() {
            if level + 1 < self.buckets.len() {
                assert_eq!(bucket.next, level + 1);
            } else {
                assert_eq!(bucket.next, level, "top bucket must saturate");
            }

            let mut current = bucket.head;
            let mut prev = None;
            let mut count = 0usize;
            while let Some(id) = current {
                let node = self.arena.get(id).expect("freq node missing");
                assert_eq!(node.owner, Some(level));
                assert_eq!(node.prev, prev);
                prev = Some(id);
                current = node.next;
                count += 1;
                assert!(count <= bucket.len);
            }
            assert_eq!(bucket.tail, prev);
            assert_eq!(bucket.len, count);
            total += count;
        }
        assert_eq!(total, self.arena.len());
    }
}
