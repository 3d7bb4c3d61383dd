//! Dictionary of active regions.
//!
//! While the sweep line advances, the edges crossing it divide the plane
//! into horizontal strips called regions. Each region is keyed by its
//! upper edge and stored in a list ordered from bottom to top, anchored
//! at a sentinel head node that sits between the topmost and bottommost
//! entries. Ordering queries are resolved lazily against the current
//! event position, which is cheaper than keeping exact geometry per
//! region and is exact at the only point that matters.

use slotmap::SlotMap;

use crate::math::predicates::{edge_eval, edge_sign, vert_leq};
use crate::mesh::{EdgeId, Mesh, VertexId};

slotmap::new_key_type! {
    /// Unique identifier for an active region.
    pub struct RegionId;
}

/// Bookkeeping for one strip between two adjacent sweep-line edges.
#[derive(Debug, Default)]
pub(crate) struct RegionData {
    /// The edge bounding the region from above, directed right to left.
    pub upper_edge: EdgeId,
    /// Winding number immediately below `upper_edge`.
    pub winding_number: i32,
    /// Whether the winding rule classifies this region as interior.
    pub inside: bool,
    /// Marks a region pair whose ordering invariants need rechecking.
    pub dirty: bool,
    /// Whether `upper_edge` is a temporary connecting edge that may be
    /// replaced once the true far endpoint is known.
    pub fix_upper_edge: bool,
}

#[derive(Debug)]
struct Node {
    prev: RegionId,
    next: RegionId,
    data: RegionData,
}

/// The ordered region list.
///
/// `above`/`below` step toward the top/bottom of the sweep line; stepping
/// past the last real region yields the head node, which stands in for
/// "no such region". Reading region data through the head is an
/// invariant violation and panics.
#[derive(Debug)]
pub(crate) struct ActiveRegions {
    nodes: SlotMap<RegionId, Node>,
    head: RegionId,
}

impl ActiveRegions {
    pub(crate) fn new() -> Self {
        let mut nodes: SlotMap<RegionId, Node> = SlotMap::with_key();
        let head = nodes.insert(Node {
            prev: RegionId::default(),
            next: RegionId::default(),
            data: RegionData::default(),
        });
        nodes[head].prev = head;
        nodes[head].next = head;
        Self { nodes, head }
    }

    pub(crate) fn is_head(&self, r: RegionId) -> bool {
        r == self.head
    }

    pub(crate) fn contains(&self, r: RegionId) -> bool {
        r != self.head && self.nodes.contains_key(r)
    }

    /// The region directly above `r`.
    pub(crate) fn above(&self, r: RegionId) -> RegionId {
        self.nodes[r].next
    }

    /// The region directly below `r`.
    pub(crate) fn below(&self, r: RegionId) -> RegionId {
        self.nodes[r].prev
    }

    pub(crate) fn get(&self, r: RegionId) -> &RegionData {
        assert!(r != self.head, "walked off the region list");
        &self.nodes[r].data
    }

    pub(crate) fn get_mut(&mut self, r: RegionId) -> &mut RegionData {
        assert!(r != self.head, "walked off the region list");
        &mut self.nodes[r].data
    }

    /// Inserts a region at its ordered position, scanning downward from
    /// `anchor`. The new region must belong at or below `anchor`.
    pub(crate) fn insert_before(
        &mut self,
        mesh: &Mesh,
        event: VertexId,
        anchor: RegionId,
        data: RegionData,
    ) -> RegionId {
        let mut node = anchor;
        loop {
            node = self.nodes[node].prev;
            if node == self.head
                || edge_leq(mesh, event, self.nodes[node].data.upper_edge, data.upper_edge)
            {
                break;
            }
        }
        let next = self.nodes[node].next;
        let new = self.nodes.insert(Node {
            prev: node,
            next,
            data,
        });
        self.nodes[next].prev = new;
        self.nodes[node].next = new;
        new
    }

    /// Inserts a region at its ordered position, scanning from the top.
    pub(crate) fn insert(&mut self, mesh: &Mesh, event: VertexId, data: RegionData) -> RegionId {
        self.insert_before(mesh, event, self.head, data)
    }

    /// Finds the lowest region whose upper edge is at or above
    /// `key_edge`. The sentinel regions guarantee a hit for any edge
    /// incident to the current event.
    pub(crate) fn search(&self, mesh: &Mesh, event: VertexId, key_edge: EdgeId) -> RegionId {
        let mut node = self.head;
        loop {
            node = self.nodes[node].next;
            if node == self.head
                || edge_leq(mesh, event, key_edge, self.nodes[node].data.upper_edge)
            {
                return node;
            }
        }
    }

    /// The bottommost region, or the head node when the list is empty.
    pub(crate) fn min(&self) -> RegionId {
        self.nodes[self.head].next
    }

    pub(crate) fn remove(&mut self, r: RegionId) {
        assert!(r != self.head, "walked off the region list");
        let Node { prev, next, .. } = self.nodes[r];
        self.nodes[next].prev = prev;
        self.nodes[prev].next = next;
        self.nodes.remove(r);
    }
}

/// Region order at the sweep line: is `e1` at or below `e2` just to the
/// right of the current event?
///
/// Both edges must cross the sweep line through the event, directed right
/// to left, with the event at or left of both right endpoints. When an
/// edge's left endpoint is the event itself the comparison reduces to a
/// slope test at the event; otherwise the event's signed distance to each
/// edge decides. The two distances are not computed symmetrically, so
/// this is not a strict weak order away from the event, but it is exact
/// at the event, which is the only place it is consulted.
pub(crate) fn edge_leq(mesh: &Mesh, event: VertexId, e1: EdgeId, e2: EdgeId) -> bool {
    let event_point = mesh.vertex(event).location;

    if mesh.dst(e1) == event {
        if mesh.dst(e2) == event {
            // Both left endpoints are at the event; sort by slope.
            if vert_leq(&mesh.origin_point(e1), &mesh.origin_point(e2)) {
                edge_sign(
                    &mesh.dst_point(e2),
                    &mesh.origin_point(e1),
                    &mesh.origin_point(e2),
                ) <= 0.0
            } else {
                edge_sign(
                    &mesh.dst_point(e1),
                    &mesh.origin_point(e2),
                    &mesh.origin_point(e1),
                ) >= 0.0
            }
        } else {
            edge_sign(&mesh.dst_point(e2), &event_point, &mesh.origin_point(e2)) <= 0.0
        }
    } else if mesh.dst(e2) == event {
        edge_sign(&mesh.dst_point(e1), &event_point, &mesh.origin_point(e1)) >= 0.0
    } else {
        // General case: compare signed distances from the event.
        let t1 = edge_eval(&mesh.dst_point(e1), &event_point, &mesh.origin_point(e1));
        let t2 = edge_eval(&mesh.dst_point(e2), &event_point, &mesh.origin_point(e2));
        t1 >= t2
    }
}
