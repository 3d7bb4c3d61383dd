//! Doubly-connected half-edge mesh.
//!
//! All entities live in slotmap arenas and reference each other through
//! typed generational IDs, so the mutual back-references of a classic
//! pointer-based DCEL (origin ↔ edge ↔ face) carry no aliasing hazards.
//! A null ID stands in for "not attached yet" on freshly allocated edges.
//!
//! Half-edges always exist in mated pairs: `sym(sym(e)) == e`, and exactly
//! one half of each pair carries the `first` flag. Face loops are closed:
//! `origin(lnext(e)) == dst(e)`. Every surgery operation in [`ops`]
//! preserves both invariants.

mod ops;

use slotmap::SlotMap;

use crate::math::Point2;

slotmap::new_key_type! {
    /// Unique identifier for a vertex in the mesh arena.
    pub struct VertexId;

    /// Unique identifier for a half-edge in the mesh arena.
    pub struct EdgeId;

    /// Unique identifier for a face in the mesh arena.
    pub struct FaceId;
}

/// A mesh vertex: a 2D position plus one incident half-edge.
#[derive(Debug, Clone)]
pub struct VertexData {
    /// Position of the vertex.
    pub location: Point2,
    /// Some half-edge whose origin is this vertex.
    pub an_edge: EdgeId,
    /// Output index, assigned lazily during extraction.
    pub index: Option<u32>,
}

/// One directed half of an edge.
#[derive(Debug, Clone)]
pub struct HalfEdgeData {
    /// The oppositely directed twin.
    pub sym: EdgeId,
    /// Next edge counter-clockwise around the origin vertex.
    pub onext: EdgeId,
    /// Next edge counter-clockwise around the left face.
    pub lnext: EdgeId,
    /// Origin vertex; null until the edge is attached.
    pub origin: VertexId,
    /// Face on the left of this half-edge; null until attached.
    pub left_face: FaceId,
    /// Change in winding number when crossing from right to left.
    pub winding: i32,
    /// Set on exactly one half of each mated pair.
    pub first: bool,
}

/// A face: one closed loop of half-edges.
#[derive(Debug, Clone)]
pub struct FaceData {
    /// Some half-edge on this face's loop.
    pub an_edge: EdgeId,
    /// Whether this region is part of the polygon interior.
    pub inside: bool,
}

/// The half-edge mesh, exclusively owned by one tessellation run.
///
/// Created empty, populated by contour ingestion, mutated in place by the
/// sweep and monotone passes, then walked read-only for extraction.
#[derive(Debug, Default)]
pub struct Mesh {
    vertices: SlotMap<VertexId, VertexData>,
    edges: SlotMap<EdgeId, HalfEdgeData>,
    faces: SlotMap<FaceId, FaceData>,
}

impl Mesh {
    /// Creates a new mesh with no vertices, edges, or faces.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Record access ---
    //
    // Indexing with a null or stale ID panics; a dangling reference inside
    // the mesh is a defect in the surgery operations, not a recoverable
    // condition.

    pub(crate) fn vertex(&self, v: VertexId) -> &VertexData {
        &self.vertices[v]
    }

    pub(crate) fn vertex_mut(&mut self, v: VertexId) -> &mut VertexData {
        &mut self.vertices[v]
    }

    pub(crate) fn edge(&self, e: EdgeId) -> &HalfEdgeData {
        &self.edges[e]
    }

    pub(crate) fn edge_mut(&mut self, e: EdgeId) -> &mut HalfEdgeData {
        &mut self.edges[e]
    }

    pub(crate) fn face(&self, f: FaceId) -> &FaceData {
        &self.faces[f]
    }

    pub(crate) fn face_mut(&mut self, f: FaceId) -> &mut FaceData {
        &mut self.faces[f]
    }

    pub(crate) fn contains_vertex(&self, v: VertexId) -> bool {
        self.vertices.contains_key(v)
    }

    pub(crate) fn contains_edge(&self, e: EdgeId) -> bool {
        self.edges.contains_key(e)
    }

    pub(crate) fn contains_face(&self, f: FaceId) -> bool {
        self.faces.contains_key(f)
    }

    // --- Navigation ---

    /// The oppositely directed twin of `e`.
    pub(crate) fn sym(&self, e: EdgeId) -> EdgeId {
        self.edges[e].sym
    }

    /// Next edge counter-clockwise around the origin of `e`.
    pub(crate) fn onext(&self, e: EdgeId) -> EdgeId {
        self.edges[e].onext
    }

    /// Next edge counter-clockwise around the left face of `e`.
    pub(crate) fn lnext(&self, e: EdgeId) -> EdgeId {
        self.edges[e].lnext
    }

    /// Previous edge around the origin of `e` (clockwise neighbor).
    pub(crate) fn oprev(&self, e: EdgeId) -> EdgeId {
        self.lnext(self.sym(e))
    }

    /// Previous edge around the left face of `e`.
    pub(crate) fn lprev(&self, e: EdgeId) -> EdgeId {
        self.sym(self.onext(e))
    }

    /// Origin vertex of `e`.
    pub(crate) fn origin(&self, e: EdgeId) -> VertexId {
        self.edges[e].origin
    }

    /// Destination vertex of `e` (origin of its twin).
    pub(crate) fn dst(&self, e: EdgeId) -> VertexId {
        self.origin(self.sym(e))
    }

    /// Position of the origin of `e`.
    pub(crate) fn origin_point(&self, e: EdgeId) -> Point2 {
        self.vertices[self.edges[e].origin].location
    }

    /// Position of the destination of `e`.
    pub(crate) fn dst_point(&self, e: EdgeId) -> Point2 {
        self.origin_point(self.sym(e))
    }

    /// Whether the destination of `e` precedes its origin in sweep order.
    pub(crate) fn goes_left(&self, e: EdgeId) -> bool {
        crate::math::predicates::vert_leq(&self.dst_point(e), &self.origin_point(e))
    }

    /// Whether the origin of `e` precedes its destination in sweep order.
    pub(crate) fn goes_right(&self, e: EdgeId) -> bool {
        crate::math::predicates::vert_leq(&self.origin_point(e), &self.dst_point(e))
    }

    // --- Iteration snapshots ---
    //
    // The arena stands in for the original circular registry lists; the
    // passes that mutate the mesh while scanning it take a snapshot of the
    // current keys and re-check liveness per entry.

    /// All current vertex IDs.
    pub(crate) fn vertex_ids(&self) -> Vec<VertexId> {
        self.vertices.keys().collect()
    }

    /// All current canonical (`first`) half-edge IDs.
    pub(crate) fn canonical_edge_ids(&self) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|(_, e)| e.first)
            .map(|(id, _)| id)
            .collect()
    }

    /// All current face IDs.
    pub(crate) fn face_ids(&self) -> Vec<FaceId> {
        self.faces.keys().collect()
    }

    #[cfg(test)]
    pub(crate) fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[cfg(test)]
    pub(crate) fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    #[cfg(test)]
    pub(crate) fn face_count(&self) -> usize {
        self.faces.len()
    }

    // --- Allocation primitives ---

    /// Allocates a new mated half-edge pair forming its own loop and
    /// returns the canonical half. Origin and left face are left null;
    /// the caller must attach them before the surgery step completes.
    pub(crate) fn make_edge_pair(&mut self) -> EdgeId {
        let e = self.edges.insert(HalfEdgeData {
            sym: EdgeId::default(),
            onext: EdgeId::default(),
            lnext: EdgeId::default(),
            origin: VertexId::default(),
            left_face: FaceId::default(),
            winding: 0,
            first: true,
        });
        let e_sym = self.edges.insert(HalfEdgeData {
            sym: e,
            onext: EdgeId::default(),
            lnext: e,
            origin: VertexId::default(),
            left_face: FaceId::default(),
            winding: 0,
            first: false,
        });
        let sym_data = &mut self.edges[e_sym];
        sym_data.onext = e_sym;
        let data = &mut self.edges[e];
        data.sym = e_sym;
        data.onext = e;
        data.lnext = e_sym;
        e
    }

    /// Attaches a new vertex at the origin of every edge in the origin
    /// ring of `e_orig`. The position is left at the default; the caller
    /// sets it afterwards.
    pub(crate) fn make_vertex(&mut self, e_orig: EdgeId) -> VertexId {
        let v = self.vertices.insert(VertexData {
            location: Point2::origin(),
            an_edge: e_orig,
            index: None,
        });
        let mut e = e_orig;
        loop {
            self.edges[e].origin = v;
            e = self.onext(e);
            if e == e_orig {
                break;
            }
        }
        v
    }

    /// Attaches a new face to the loop of `e_orig`, relabeling every edge
    /// around the loop. The `inside` flag is inherited from
    /// `inherit_from` (a null ID inherits "outside"), which covers the
    /// common case of a face that was just split in two.
    pub(crate) fn make_face(&mut self, e_orig: EdgeId, inherit_from: FaceId) -> FaceId {
        let inside = self.faces.get(inherit_from).is_some_and(|f| f.inside);
        let f = self.faces.insert(FaceData {
            an_edge: e_orig,
            inside,
        });
        let mut e = e_orig;
        loop {
            self.edges[e].left_face = f;
            e = self.lnext(e);
            if e == e_orig {
                break;
            }
        }
        f
    }

    /// Destroys a vertex, repointing its origin ring at `new_origin`
    /// (possibly null, when the ring itself is being destroyed).
    pub(crate) fn kill_vertex(&mut self, v: VertexId, new_origin: VertexId) {
        let start = self.vertices[v].an_edge;
        let mut e = start;
        loop {
            self.edges[e].origin = new_origin;
            e = self.onext(e);
            if e == start {
                break;
            }
        }
        self.vertices.remove(v);
    }

    /// Destroys a face, repointing its loop at `new_left_face` (possibly
    /// null, when the loop itself is being destroyed).
    pub(crate) fn kill_face(&mut self, f: FaceId, new_left_face: FaceId) {
        let start = self.faces[f].an_edge;
        let mut e = start;
        loop {
            self.edges[e].left_face = new_left_face;
            e = self.lnext(e);
            if e == start {
                break;
            }
        }
        self.faces.remove(f);
    }

    /// Removes a mated half-edge pair from the arena. Topological
    /// unlinking must already have happened.
    pub(crate) fn discard_edge_pair(&mut self, e: EdgeId) {
        let e_sym = self.sym(e);
        self.edges.remove(e);
        self.edges.remove(e_sym);
    }

    /// Creates one edge, two vertices, and a loop: the loop consists of
    /// the two new half-edges.
    pub(crate) fn create_self_loop(&mut self) -> EdgeId {
        let e = self.make_edge_pair();
        let e_sym = self.sym(e);
        self.make_vertex(e);
        self.make_vertex(e_sym);
        self.make_face(e, FaceId::default());
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Walks the face loop of `e` and checks closure, returning its length.
    fn face_loop_len(mesh: &Mesh, e: EdgeId) -> usize {
        let mut len = 0;
        let mut cur = e;
        loop {
            assert_eq!(mesh.origin(mesh.lnext(cur)), mesh.dst(cur));
            assert_eq!(mesh.edge(cur).left_face, mesh.edge(e).left_face);
            cur = mesh.lnext(cur);
            len += 1;
            assert!(len <= 1000, "face loop not closed");
            if cur == e {
                return len;
            }
        }
    }

    fn check_pairing(mesh: &Mesh, e: EdgeId) {
        assert_eq!(mesh.sym(mesh.sym(e)), e);
        assert_ne!(mesh.edge(e).first, mesh.edge(mesh.sym(e)).first);
    }

    #[test]
    fn self_loop_shape() {
        let mut mesh = Mesh::new();
        let e = mesh.create_self_loop();
        check_pairing(&mesh, e);
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.edge_count(), 1);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(face_loop_len(&mesh, e), 2);
        assert_eq!(mesh.lnext(e), mesh.sym(e));
        assert_eq!(mesh.onext(e), e);
    }

    #[test]
    fn split_extends_loop() {
        let mut mesh = Mesh::new();
        let e = mesh.create_self_loop();
        let e2 = mesh.split_edge(e);
        check_pairing(&mesh, e);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.edge_count(), 2);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.origin(e2), mesh.dst(e));
        assert_eq!(face_loop_len(&mesh, e), 4);
    }

    #[test]
    fn connect_splits_face() {
        let mut mesh = Mesh::new();
        // Build a quad loop: one self-loop plus three splits.
        let e = mesh.create_self_loop();
        let mut last = e;
        for _ in 0..3 {
            last = mesh.split_edge(last);
        }
        assert_eq!(face_loop_len(&mesh, e), 8);
        // A chord from dst(e) to origin of the loop's far edge splits the
        // face loop in two.
        let chord = mesh.connect_edges(e, mesh.lnext(mesh.lnext(e)));
        assert_eq!(mesh.face_count(), 2);
        assert_ne!(
            mesh.edge(chord).left_face,
            mesh.edge(mesh.sym(chord)).left_face
        );
        check_pairing(&mesh, chord);
        assert_eq!(mesh.origin(mesh.lnext(chord)), mesh.dst(chord));
    }

    #[test]
    fn delete_chord_merges_faces() {
        let mut mesh = Mesh::new();
        let e = mesh.create_self_loop();
        let mut last = e;
        for _ in 0..3 {
            last = mesh.split_edge(last);
        }
        let chord = mesh.connect_edges(e, mesh.lnext(mesh.lnext(e)));
        assert_eq!(mesh.face_count(), 2);
        mesh.delete_edge(chord);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.edge_count(), 4);
        assert_eq!(face_loop_len(&mesh, e), 8);
    }

    #[test]
    fn delete_last_edge_kills_vertices() {
        let mut mesh = Mesh::new();
        let e = mesh.create_self_loop();
        mesh.delete_edge(e);
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.edge_count(), 0);
        assert_eq!(mesh.face_count(), 0);
    }

    #[test]
    fn splice_merges_vertex_rings() {
        let mut mesh = Mesh::new();
        let a = mesh.create_self_loop();
        let b = mesh.create_self_loop();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
        mesh.splice(a, b);
        // b's origin merged into a's, and the two loops joined.
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.origin(a), mesh.origin(b));
    }
}
