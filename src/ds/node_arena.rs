use std::mem;

/// Stable handle to a node in a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A cache entry plus its intrusive list links.
///
/// `prev`/`next` tie the node into one frequency deque; `owner` records which
/// deque that is (the node's current frequency level). `owner` is `Some`
/// exactly while the node is attached; `FreqTable::withdraw` clears it along
/// with the links.
#[derive(Debug)]
pub struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) owner: Option<usize>,
}

/// Slab-style arena of cache nodes with free-slot reuse.
///
/// Nodes are addressed by [`NodeId`] so list surgery is index rewiring rather
/// than pointer chasing; ids stay valid until the node is removed.
#[derive(Debug)]
pub struct NodeArena<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free_list: Vec<usize>,
    len: usize,
}

impl<K, V> NodeArena<K, V> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
        }
    }

    pub(crate) fn insert(&mut self, node: Node<K, V>) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.slots[idx] = Some(node);
            idx
        } else {
            self.slots.push(Some(node));
            self.slots.len() - 1
        };
        self.len += 1;
        NodeId(idx)
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> Option<Node<K, V>> {
        let slot = self.slots.get_mut(id.0)?;
        let node = slot.take()?;
        self.free_list.push(id.0);
        self.len -= 1;
        Some(node)
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<K, V>> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<K, V>> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    /// Swaps in a new value for the node and returns the old one.
    pub(crate) fn replace_value(&mut self, id: NodeId, value: V) -> Option<V> {
        self.get_mut(id).map(|node| mem::replace(&mut node.value, value))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slots
            .get(id.0)
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.len = 0;
    }
}

impl<K, V> Default for NodeArena<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
