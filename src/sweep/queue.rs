//! Priority queue of sweep events.
//!
//! Events are vertices ordered by sweep position. Each entry carries a
//! snapshot of the vertex position taken at insertion time; the sweep
//! never moves a vertex leftward past pending events, so the snapshot
//! order stays valid. Removal of an arbitrary pending event is supported
//! through a tombstone set, with dead entries discarded lazily.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use crate::math::Point2;
use crate::mesh::VertexId;

#[derive(Debug, Clone, Copy)]
struct Event {
    x: f64,
    y: f64,
    vertex: VertexId,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
            .then_with(|| self.vertex.cmp(&other.vertex))
    }
}

/// Min-queue of pending sweep events.
#[derive(Debug, Default)]
pub(crate) struct EventQueue {
    heap: BinaryHeap<Reverse<Event>>,
    removed: HashSet<VertexId>,
}

impl EventQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Schedules `vertex` at `location`.
    pub(crate) fn insert(&mut self, vertex: VertexId, location: Point2) {
        self.heap.push(Reverse(Event {
            x: location.x,
            y: location.y,
            vertex,
        }));
    }

    /// Cancels a pending event.
    pub(crate) fn delete(&mut self, vertex: VertexId) {
        self.removed.insert(vertex);
    }

    /// The next event, without removing it.
    pub(crate) fn peek_min(&mut self) -> Option<VertexId> {
        while let Some(Reverse(event)) = self.heap.peek() {
            let vertex = event.vertex;
            if self.removed.contains(&vertex) {
                self.heap.pop();
                self.removed.remove(&vertex);
            } else {
                return Some(vertex);
            }
        }
        None
    }

    /// Removes and returns the next event.
    pub(crate) fn extract_min(&mut self) -> Option<VertexId> {
        while let Some(Reverse(event)) = self.heap.pop() {
            if self.removed.remove(&event.vertex) {
                continue;
            }
            return Some(event.vertex);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids(n: usize) -> Vec<VertexId> {
        let mut arena: SlotMap<VertexId, ()> = SlotMap::with_key();
        (0..n).map(|_| arena.insert(())).collect()
    }

    #[test]
    fn extracts_in_sweep_order() {
        let v = ids(3);
        let mut q = EventQueue::new();
        q.insert(v[0], Point2::new(2.0, 0.0));
        q.insert(v[1], Point2::new(1.0, 5.0));
        q.insert(v[2], Point2::new(1.0, -5.0));
        assert_eq!(q.extract_min(), Some(v[2]));
        assert_eq!(q.extract_min(), Some(v[1]));
        assert_eq!(q.extract_min(), Some(v[0]));
        assert_eq!(q.extract_min(), None);
    }

    #[test]
    fn delete_skips_pending_event() {
        let v = ids(2);
        let mut q = EventQueue::new();
        q.insert(v[0], Point2::new(0.0, 0.0));
        q.insert(v[1], Point2::new(1.0, 0.0));
        q.delete(v[0]);
        assert_eq!(q.peek_min(), Some(v[1]));
        assert_eq!(q.extract_min(), Some(v[1]));
        assert_eq!(q.extract_min(), None);
    }
}
