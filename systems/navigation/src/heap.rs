//! Binary min-heap over dense node indices with decrease-key support.

/// Implicit binary min-heap keyed by `u32` priorities.
///
/// Nodes are the dense indices `0..n` handed to [`IndexedMinHeap::from_keys`].
/// A node-to-slot table is kept in step with every swap, so
/// [`IndexedMinHeap::decrease_key`] locates its entry in constant time and
/// restores heap order in `O(log n)`. Equal keys are ordered by node index.
#[derive(Clone, Debug, Default)]
pub struct IndexedMinHeap {
    slots: Vec<usize>,
    keys: Vec<u32>,
    positions: Vec<Option<usize>>,
}

impl IndexedMinHeap {
    /// Builds a heap holding one entry per key, where node `i` starts at `keys[i]`.
    #[must_use]
    pub fn from_keys(keys: &[u32]) -> Self {
        let mut heap = Self {
            slots: (0..keys.len()).collect(),
            keys: keys.to_vec(),
            positions: (0..keys.len()).map(Some).collect(),
        };

        for slot in (0..heap.slots.len() / 2).rev() {
            heap.sift_down(slot);
        }

        heap
    }

    /// Number of entries still queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Reports whether every entry has been popped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Reports whether the node is still queued.
    #[must_use]
    pub fn contains(&self, node: usize) -> bool {
        matches!(self.positions.get(node), Some(Some(_)))
    }

    /// Latest key recorded for the node, including nodes already popped.
    #[must_use]
    pub fn key(&self, node: usize) -> Option<u32> {
        self.keys.get(node).copied()
    }

    /// Minimum queued entry as `(node, key)` without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<(usize, u32)> {
        self.slots.first().map(|&node| (node, self.keys[node]))
    }

    /// Removes and returns the minimum queued entry as `(node, key)`.
    pub fn pop(&mut self) -> Option<(usize, u32)> {
        let last = self.slots.len().checked_sub(1)?;
        self.swap(0, last);

        let node = self.slots.pop()?;
        self.positions[node] = None;
        if !self.slots.is_empty() {
            self.sift_down(0);
        }

        Some((node, self.keys[node]))
    }

    /// Lowers the node's key to `key` and restores heap order.
    ///
    /// Returns `false`, leaving the heap untouched, when the node is no longer
    /// queued or `key` is not strictly smaller than its current key.
    pub fn decrease_key(&mut self, node: usize, key: u32) -> bool {
        let Some(slot) = self.positions.get(node).copied().flatten() else {
            return false;
        };

        if key >= self.keys[node] {
            return false;
        }

        self.keys[node] = key;
        self.sift_up(slot);
        true
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = parent_slot(slot);
            if !self.precedes(slot, parent) {
                break;
            }

            self.swap(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut smallest = slot;

            if left < self.slots.len() && self.precedes(left, smallest) {
                smallest = left;
            }
            if right < self.slots.len() && self.precedes(right, smallest) {
                smallest = right;
            }
            if smallest == slot {
                return;
            }

            self.swap(slot, smallest);
            slot = smallest;
        }
    }

    fn precedes(&self, first: usize, second: usize) -> bool {
        let first = self.slots[first];
        let second = self.slots[second];
        (self.keys[first], first) < (self.keys[second], second)
    }

    fn swap(&mut self, first: usize, second: usize) {
        self.slots.swap(first, second);
        self.positions[self.slots[first]] = Some(first);
        self.positions[self.slots[second]] = Some(second);
    }
}

// Children of slot `i` live at `2i + 1` and `2i + 2`.
fn parent_slot(slot: usize) -> usize {
    (slot - 1) / 2
}
