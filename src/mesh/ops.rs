//! Topology surgery on the half-edge mesh.
//!
//! Everything here is built on a single primitive, [`Mesh::splice_rings`]:
//! the Guibas/Stolfi exchange of two `onext` rings. Whether an exchange
//! merges two rings or divides one depends only on whether the two edges
//! already share a ring, and the sweep depends on exactly these ring
//! semantics.
//!
//! All operations preserve the pairing invariant `sym(sym(e)) == e` and
//! closed face loops, and keep every vertex/face anchored at a surviving
//! half-edge. A violated precondition panics; there is no recoverable
//! error path.

use super::{EdgeId, FaceId, Mesh, VertexId};

impl Mesh {
    /// Exchanges the `onext` rings of `a` and `b`.
    ///
    /// If the two edges share an origin ring, the ring is divided in two;
    /// otherwise the two rings are merged into one. The same holds,
    /// independently, for the face rings. This touches only the edge
    /// links; use [`Mesh::splice`] to keep vertex and face records
    /// consistent.
    pub(crate) fn splice_rings(&mut self, a: EdgeId, b: EdgeId) {
        let a_onext = self.onext(a);
        let b_onext = self.onext(b);
        let a_onext_sym = self.sym(a_onext);
        let b_onext_sym = self.sym(b_onext);
        self.edges[a_onext_sym].lnext = b;
        self.edges[b_onext_sym].lnext = a;
        self.edges[a].onext = b_onext;
        self.edges[b].onext = a_onext;
    }

    /// The vertex- and face-aware splice.
    ///
    /// Exchanges the `onext` rings of `e_org` and `e_dst` and repairs the
    /// entity records: merging two origin rings destroys `e_dst`'s vertex,
    /// dividing one allocates a new vertex for `e_dst`'s ring; likewise
    /// for the left faces. In both cases `e_dst`'s side is the one that
    /// changes. Splicing an edge with itself is a no-op.
    pub(crate) fn splice(&mut self, e_org: EdgeId, e_dst: EdgeId) {
        if e_org == e_dst {
            return;
        }

        let mut joining_vertices = false;
        let mut joining_loops = false;

        if self.origin(e_dst) != self.origin(e_org) {
            joining_vertices = true;
            let dead = self.origin(e_dst);
            let keep = self.origin(e_org);
            self.kill_vertex(dead, keep);
        }
        if self.edges[e_dst].left_face != self.edges[e_org].left_face {
            joining_loops = true;
            let dead = self.edges[e_dst].left_face;
            let keep = self.edges[e_org].left_face;
            self.kill_face(dead, keep);
        }

        self.splice_rings(e_dst, e_org);

        if !joining_vertices {
            // One vertex was split in two; the new vertex takes e_dst's
            // ring and sits at the same location.
            let old = self.origin(e_org);
            let location = self.vertices[old].location;
            let v = self.make_vertex(e_dst);
            self.vertices[v].location = location;
            self.vertices[old].an_edge = e_org;
        }
        if !joining_loops {
            // One loop was split in two; the new loop is e_dst's.
            let old = self.edges[e_org].left_face;
            self.make_face(e_dst, old);
            self.faces[old].an_edge = e_org;
        }
    }

    /// Subdivides `e_org` into two collinear-continuation edges sharing a
    /// new vertex at `e_org`'s former destination slot, and returns the
    /// continuation edge. Both keep `e_org`'s left face and winding.
    ///
    /// The new vertex's location is left unset; every caller either
    /// assigns it or immediately splices the vertex away.
    pub(crate) fn split_edge(&mut self, e_org: EdgeId) -> EdgeId {
        let temp = self.make_edge_pair();
        let e_new = self.sym(temp);

        // Connect the new pair into the face ring at the old destination.
        let lnext = self.lnext(e_org);
        self.splice_rings(temp, lnext);

        let old_dst = self.dst(e_org);
        self.edges[temp].origin = old_dst;
        self.make_vertex(e_new);
        let lface = self.edges[e_org].left_face;
        self.edges[temp].left_face = lface;
        self.edges[e_new].left_face = lface;

        // Disconnect e_org from the old destination and attach it to the
        // new vertex.
        let sym = self.sym(e_org);
        let cur_lnext = self.lnext(e_org);
        self.splice_rings(sym, cur_lnext);
        self.splice_rings(sym, e_new);

        let new_vertex = self.origin(e_new);
        self.edges[sym].origin = new_vertex;
        // The old destination may have been anchored at e_org's twin.
        self.vertices[old_dst].an_edge = temp;
        let sym_lface = self.edges[sym].left_face;
        self.edges[temp].left_face = sym_lface;
        self.edges[e_new].winding = self.edges[e_org].winding;
        self.edges[temp].winding = self.edges[sym].winding;

        e_new
    }

    /// Removes `e_del` from the mesh.
    ///
    /// If its two sides bounded different faces, the faces are joined
    /// (the left face is destroyed); otherwise the edge was an internal
    /// chord and its loop is divided in two. Endpoints left without any
    /// incident edge are destroyed as well, each independently.
    pub(crate) fn delete_edge(&mut self, e_del: EdgeId) {
        let e_del_sym = self.sym(e_del);
        let mut joining_loops = false;

        // First disconnect the origin, keeping the mesh consistent in the
        // intermediate state.
        if self.edges[e_del].left_face != self.edges[e_del_sym].left_face {
            joining_loops = true;
            let dead = self.edges[e_del].left_face;
            let keep = self.edges[e_del_sym].left_face;
            self.kill_face(dead, keep);
        }

        if self.onext(e_del) == e_del {
            let v = self.origin(e_del);
            self.kill_vertex(v, VertexId::default());
        } else {
            // Re-anchor the twin's face and the origin at surviving edges.
            let f = self.edges[e_del_sym].left_face;
            self.faces[f].an_edge = self.lnext(e_del_sym);
            let v = self.origin(e_del);
            self.vertices[v].an_edge = self.onext(e_del);

            let oprev = self.oprev(e_del);
            self.splice_rings(e_del, oprev);
            if !joining_loops {
                // Splitting one loop in two: give e_del's side a new loop.
                let lface = self.edges[e_del].left_face;
                self.make_face(e_del, lface);
            }
        }

        // Now disconnect the destination the same way.
        if self.onext(e_del_sym) == e_del_sym {
            let v = self.origin(e_del_sym);
            self.kill_vertex(v, VertexId::default());
            let f = self.edges[e_del_sym].left_face;
            self.kill_face(f, FaceId::default());
        } else {
            let f = self.edges[e_del].left_face;
            self.faces[f].an_edge = self.lnext(e_del);
            let v = self.origin(e_del_sym);
            self.vertices[v].an_edge = self.onext(e_del_sym);

            let oprev = self.oprev(e_del_sym);
            self.splice_rings(e_del_sym, oprev);
        }

        self.discard_edge_pair(e_del);
    }

    /// Creates a new chord from the destination of `e_org` to the origin
    /// of `e_dst` and returns its canonical half-edge.
    ///
    /// If the two edges bounded the same face, the face is divided in two
    /// and the new loop is the chord's left face; otherwise the two faces
    /// are joined and `e_dst`'s is destroyed.
    pub(crate) fn connect_edges(&mut self, e_org: EdgeId, e_dst: EdgeId) -> EdgeId {
        let mut joining_loops = false;
        let result = self.make_edge_pair();
        let result_sym = self.sym(result);

        if self.edges[e_dst].left_face != self.edges[e_org].left_face {
            joining_loops = true;
            let dead = self.edges[e_dst].left_face;
            let keep = self.edges[e_org].left_face;
            self.kill_face(dead, keep);
        }

        let lnext = self.lnext(e_org);
        self.splice_rings(result, lnext);
        self.splice_rings(result_sym, e_dst);

        let org = self.dst(e_org);
        self.edges[result].origin = org;
        let dst = self.origin(e_dst);
        self.edges[result_sym].origin = dst;
        let lface = self.edges[e_org].left_face;
        self.edges[result].left_face = lface;
        self.edges[result_sym].left_face = lface;

        // Keep the old face anchored at a half-edge it still owns.
        self.faces[lface].an_edge = result_sym;

        if !joining_loops {
            self.make_face(result, lface);
        }
        result
    }

    /// Normalizes edge windings so that interior regions carry
    /// `winding_number` and exterior regions carry zero.
    ///
    /// With `keep_boundary_only`, every edge that does not separate an
    /// interior region from an exterior one is deleted, leaving only the
    /// shape's outline loops; the mesh can no longer be triangulated
    /// afterwards.
    pub(crate) fn set_winding_number(&mut self, winding_number: i32, keep_boundary_only: bool) {
        for e in self.canonical_edge_ids() {
            if !self.contains_edge(e) {
                continue;
            }
            let left_inside = self.faces[self.edges[e].left_face].inside;
            let right_inside = {
                let sym = self.sym(e);
                self.faces[self.edges[sym].left_face].inside
            };
            if right_inside != left_inside {
                // A boundary edge: one side interior, one exterior.
                self.edges[e].winding = if left_inside {
                    winding_number
                } else {
                    -winding_number
                };
            } else if keep_boundary_only {
                self.delete_edge(e);
            } else {
                self.edges[e].winding = 0;
            }
        }
    }
}
