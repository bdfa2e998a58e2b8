use std::cmp::Ordering;

use crate::graph::VertexId;

#[derive(Debug, Clone, Copy)]
struct Entry {
    priority: f64,
    vertex: VertexId,
}

impl Entry {
    /// Lower priority first; equal priorities go to the smaller vertex.
    fn precedes(&self, other: &Entry) -> bool {
        match self.priority.total_cmp(&other.priority) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => self.vertex < other.vertex,
        }
    }
}

/// Indexed binary min-heap of vertices keyed by an `f64` priority.
///
/// A position table maps each queued vertex to its heap slot, so a member
/// can be re-keyed or removed in O(log n) without rebuilding the heap.
/// Ties are broken by the smaller vertex identifier.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    heap: Vec<Entry>,
    positions: Vec<Option<usize>>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size for vertex identifiers below `capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            positions: vec![None; capacity],
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, vertex: VertexId) -> bool {
        self.position(vertex).is_some()
    }

    /// Insert `vertex`, or move it to its place under the new priority if it
    /// is already queued.
    pub fn decrease_key_or_insert(&mut self, vertex: VertexId, priority: f64) {
        match self.position(vertex) {
            Some(idx) => {
                self.heap[idx].priority = priority;
                self.restore(idx);
            }
            None => {
                let idx = self.heap.len();
                self.heap.push(Entry { priority, vertex });
                self.set_position(vertex, Some(idx));
                self.sift_up(idx);
            }
        }
    }

    /// Remove and return the minimum entry.
    pub fn pop(&mut self) -> Option<(VertexId, f64)> {
        if self.heap.is_empty() {
            return None;
        }
        let entry = self.take(0);
        Some((entry.vertex, entry.priority))
    }

    /// Remove `vertex` from the queue, returning its priority if it was queued.
    pub fn remove(&mut self, vertex: VertexId) -> Option<f64> {
        let idx = self.position(vertex)?;
        Some(self.take(idx).priority)
    }

    pub fn clear(&mut self) {
        for entry in self.heap.drain(..) {
            self.positions[entry.vertex] = None;
        }
    }

    fn position(&self, vertex: VertexId) -> Option<usize> {
        self.positions.get(vertex).copied().flatten()
    }

    fn set_position(&mut self, vertex: VertexId, pos: Option<usize>) {
        if vertex >= self.positions.len() {
            self.positions.resize(vertex + 1, None);
        }
        self.positions[vertex] = pos;
    }

    /// Detach the entry at `idx`, filling the hole with the last entry.
    fn take(&mut self, idx: usize) -> Entry {
        let entry = self.heap.swap_remove(idx);
        self.positions[entry.vertex] = None;
        if idx < self.heap.len() {
            let moved = self.heap[idx].vertex;
            self.positions[moved] = Some(idx);
            self.restore(idx);
        }
        entry
    }

    fn restore(&mut self, idx: usize) {
        if idx > 0 && self.heap[idx].precedes(&self.heap[(idx - 1) / 2]) {
            self.sift_up(idx);
        } else {
            self.sift_down(idx);
        }
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if self.heap[idx].precedes(&self.heap[parent]) {
                self.swap_entries(idx, parent);
                idx = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * idx + 1;
            let right = left + 1;
            let mut smallest = idx;

            if left < len && self.heap[left].precedes(&self.heap[smallest]) {
                smallest = left;
            }
            if right < len && self.heap[right].precedes(&self.heap[smallest]) {
                smallest = right;
            }

            if smallest == idx {
                break;
            }
            self.swap_entries(idx, smallest);
            idx = smallest;
        }
    }

    /// Swap two heap slots and keep the position table in step.
    fn swap_entries(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        let (va, vb) = (self.heap[a].vertex, self.heap[b].vertex);
        self.positions[va] = Some(a);
        self.positions[vb] = Some(b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(frontier: &mut Frontier) -> Vec<VertexId> {
        std::iter::from_fn(|| frontier.pop().map(|(v, _)| v)).collect()
    }

    #[test]
    fn test_pop_in_priority_order() {
        let mut f = Frontier::new();
        f.decrease_key_or_insert(1, 10.0);
        f.decrease_key_or_insert(2, 3.0);
        f.decrease_key_or_insert(3, 7.0);
        assert_eq!(f.len(), 3);
        assert_eq!(f.pop(), Some((2, 3.0)));
        assert_eq!(drain(&mut f), vec![3, 1]);
        assert!(f.is_empty());
        assert_eq!(f.pop(), None);
    }

    #[test]
    fn test_ties_broken_by_vertex_id() {
        let mut f = Frontier::with_capacity(8);
        for v in [5, 2, 7, 1] {
            f.decrease_key_or_insert(v, f64::INFINITY);
        }
        f.decrease_key_or_insert(4, 1.0);
        f.decrease_key_or_insert(3, 1.0);
        assert_eq!(drain(&mut f), vec![3, 4, 1, 2, 5, 7]);
    }

    #[test]
    fn test_decrease_key_moves_up() {
        let mut f = Frontier::new();
        for v in 1..=6 {
            f.decrease_key_or_insert(v, 100.0 + v as f64);
        }
        f.decrease_key_or_insert(6, 1.0);
        assert_eq!(f.len(), 6);
        assert_eq!(f.pop(), Some((6, 1.0)));
    }

    #[test]
    fn test_increase_key_moves_down() {
        let mut f = Frontier::new();
        for v in 1..=4 {
            f.decrease_key_or_insert(v, v as f64);
        }
        f.decrease_key_or_insert(1, 50.0);
        assert_eq!(drain(&mut f), vec![2, 3, 4, 1]);
    }

    #[test]
    fn test_remove_member() {
        let mut f = Frontier::new();
        for v in 1..=5 {
            f.decrease_key_or_insert(v, (10 - v) as f64);
        }
        assert_eq!(f.remove(3), Some(7.0));
        assert!(!f.contains(3));
        assert_eq!(f.remove(3), None);
        assert_eq!(f.remove(42), None);
        assert_eq!(drain(&mut f), vec![5, 4, 2, 1]);
    }

    #[test]
    fn test_reinsert_after_pop() {
        let mut f = Frontier::new();
        f.decrease_key_or_insert(1, 0.0);
        f.decrease_key_or_insert(2, 5.0);
        assert_eq!(f.pop(), Some((1, 0.0)));
        f.decrease_key_or_insert(1, 9.0);
        assert!(f.contains(1));
        assert_eq!(drain(&mut f), vec![2, 1]);
    }

    #[test]
    fn test_clear() {
        let mut f = Frontier::new();
        f.decrease_key_or_insert(3, 1.0);
        f.decrease_key_or_insert(9, 2.0);
        f.clear();
        assert!(f.is_empty());
        assert!(!f.contains(3));
        assert!(!f.contains(9));
    }

    #[test]
    fn test_many_updates_keep_heap_order() {
        let mut f = Frontier::new();
        for v in 1..=64usize {
            f.decrease_key_or_insert(v, ((v * 37) % 64) as f64);
        }
        for v in (1..=64usize).step_by(3) {
            f.decrease_key_or_insert(v, ((v * 11) % 17) as f64 - 20.0);
        }
        let mut last = f64::NEG_INFINITY;
        while let Some((_, p)) = f.pop() {
            assert!(p >= last);
            last = p;
        }
    }
}
