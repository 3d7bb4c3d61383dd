//! Sweep-line partitioning of the mesh into monotone regions.
//!
//! A vertical line sweeps left to right over the contour mesh, with
//! vertices as events. The edges crossing the sweep line are kept in the
//! region dictionary ([`regions`]), pending vertices in the event queue
//! ([`queue`]). Each event either terminates left-going edges, starts
//! right-going edges, or both; connecting edges are added so that every
//! face the sweep leaves behind is x-monotone, and each face is
//! classified interior or exterior from the winding numbers accumulated
//! along the way.
//!
//! Self-intersecting input is handled by splicing: crossing edges are
//! split at a numerically sane intersection point and the pieces
//! reconnected, so the output mesh is always planar. Intersection points
//! may be computed slightly off their true location; the dirty-region
//! walk restores the dictionary invariants after each such repair.

pub(crate) mod queue;
pub(crate) mod regions;

use slotmap::SecondaryMap;

use crate::math::predicates::{edge_sign, vert_eq, vert_leq};
use crate::math::Point2;
use crate::mesh::{EdgeId, Mesh, VertexId};

use queue::EventQueue;
use regions::{ActiveRegions, RegionData, RegionId};

/// Decides which regions of the plane count as polygon interior.
///
/// A region's winding number is the signed count of contour crossings on
/// any path from the region to infinity, with counter-clockwise contours
/// counting `+1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindingRule {
    /// Odd winding number; every other nested region alternates.
    Odd,
    /// Nonzero winding number; nested same-direction contours merge.
    NonZero,
    /// Positive winding number.
    Positive,
    /// Negative winding number.
    Negative,
    /// Winding number of magnitude two or more: areas covered at least
    /// twice by same-direction contours.
    AbsGeqTwo,
}

impl WindingRule {
    /// Whether a region with the given winding number is interior.
    #[must_use]
    pub fn is_inside(self, winding_number: i32) -> bool {
        match self {
            Self::Odd => winding_number & 1 != 0,
            Self::NonZero => winding_number != 0,
            Self::Positive => winding_number > 0,
            Self::Negative => winding_number < 0,
            Self::AbsGeqTwo => winding_number >= 2 || winding_number <= -2,
        }
    }
}

/// Coordinates with magnitude at most this value are fully supported.
pub const MAX_COORD: f64 = 1.0e150;

/// Sentinel edges are placed here, beyond every legal coordinate.
const SENTINEL_COORD: f64 = 4.0 * MAX_COORD;

/// One sweep over the mesh.
pub(crate) struct Sweep<'m> {
    mesh: &'m mut Mesh,
    winding_rule: WindingRule,
    dict: ActiveRegions,
    queue: EventQueue,
    /// The vertex being processed; ordering queries are relative to it.
    event: VertexId,
    /// Back-reference from a dictionary edge to its region.
    edge_region: SecondaryMap<EdgeId, RegionId>,
}

impl<'m> Sweep<'m> {
    pub(crate) fn new(mesh: &'m mut Mesh, winding_rule: WindingRule) -> Self {
        Self {
            mesh,
            winding_rule,
            dict: ActiveRegions::new(),
            queue: EventQueue::new(),
            event: VertexId::default(),
            edge_region: SecondaryMap::new(),
        }
    }

    /// Partitions the interior into monotone faces.
    ///
    /// Afterwards every face is marked interior or exterior per the
    /// winding rule, each interior face is x-monotone, and all degenerate
    /// input (zero-length edges, one- and two-edge contours) has been
    /// removed from the mesh.
    pub(crate) fn compute_interior(mut self) {
        self.remove_degenerate_edges();
        self.init_priority_q();
        self.init_edge_dict();

        while let Some(v) = self.queue.extract_min() {
            if !self.mesh.contains_vertex(v) {
                continue;
            }
            // Merge any pending vertices at the same position; processing
            // coincident vertices as one event keeps the dictionary order
            // consistent.
            loop {
                let Some(v_next) = self.queue.peek_min() else {
                    break;
                };
                if !self.mesh.contains_vertex(v_next) {
                    let _ = self.queue.extract_min();
                    continue;
                }
                if !vert_eq(
                    &self.mesh.vertex(v_next).location,
                    &self.mesh.vertex(v).location,
                ) {
                    break;
                }
                let _ = self.queue.extract_min();
                let a = self.mesh.vertex(v).an_edge;
                let b = self.mesh.vertex(v_next).an_edge;
                self.splice_merge_vertices(a, b);
            }
            self.sweep_event(v);
        }

        self.done_edge_dict();
        self.remove_degenerate_faces();
    }

    // --- Region accessors ---

    fn upper(&self, reg: RegionId) -> EdgeId {
        self.dict.get(reg).upper_edge
    }

    /// The region record for `e`, if `e` currently bounds one.
    fn active_region(&self, e: EdgeId) -> Option<RegionId> {
        self.edge_region
            .get(e)
            .copied()
            .filter(|&r| self.dict.contains(r))
    }

    fn delete_region(&mut self, reg: RegionId) {
        let upper = self.upper(reg);
        if self.dict.get(reg).fix_upper_edge {
            // A temporary edge may only be deleted once it carries no
            // winding; otherwise it would have to stay in the output.
            debug_assert_eq!(self.mesh.edge(upper).winding, 0);
        }
        self.edge_region.remove(upper);
        self.dict.remove(reg);
    }

    /// Replaces the temporary upper edge of `reg` with a real one.
    fn fix_upper_edge(&mut self, reg: RegionId, new_edge: EdgeId) {
        debug_assert!(self.dict.get(reg).fix_upper_edge);
        let old = self.upper(reg);
        self.edge_region.remove(old);
        self.mesh.delete_edge(old);
        let data = self.dict.get_mut(reg);
        data.fix_upper_edge = false;
        data.upper_edge = new_edge;
        self.edge_region.insert(new_edge, reg);
    }

    /// The region above the topmost region sharing `reg`'s upper-edge
    /// origin, fixing a temporary edge above if there is one.
    fn top_left_region(&mut self, mut reg: RegionId) -> RegionId {
        let org = self.mesh.origin(self.upper(reg));
        loop {
            reg = self.dict.above(reg);
            if self.mesh.origin(self.upper(reg)) != org {
                break;
            }
        }
        if self.dict.get(reg).fix_upper_edge {
            let below = self.dict.below(reg);
            let a = self.mesh.sym(self.upper(below));
            let b = self.mesh.lnext(self.upper(reg));
            let e = self.mesh.connect_edges(a, b);
            self.fix_upper_edge(reg, e);
            reg = self.dict.above(reg);
        }
        reg
    }

    /// The region above the topmost region sharing `reg`'s upper-edge
    /// destination.
    fn top_right_region(&self, mut reg: RegionId) -> RegionId {
        let dst = self.mesh.dst(self.upper(reg));
        loop {
            reg = self.dict.above(reg);
            if self.mesh.dst(self.upper(reg)) != dst {
                break;
            }
        }
        reg
    }

    /// Adds a new region just below `reg_above`, keyed by `e_new_up`.
    fn add_region_below(&mut self, reg_above: RegionId, e_new_up: EdgeId) -> RegionId {
        let data = RegionData {
            upper_edge: e_new_up,
            ..RegionData::default()
        };
        let reg = self
            .dict
            .insert_before(&*self.mesh, self.event, reg_above, data);
        self.edge_region.insert(e_new_up, reg);
        reg
    }

    fn compute_winding(&mut self, reg: RegionId) {
        let above = self.dict.above(reg);
        let winding_number =
            self.dict.get(above).winding_number + self.mesh.edge(self.upper(reg)).winding;
        let inside = self.winding_rule.is_inside(winding_number);
        let data = self.dict.get_mut(reg);
        data.winding_number = winding_number;
        data.inside = inside;
    }

    /// Retires a region whose upper edge just ended: the face below the
    /// edge takes the region's interior flag.
    fn finish_region(&mut self, reg: RegionId) {
        let e = self.upper(reg);
        let f = self.mesh.edge(e).left_face;
        let inside = self.dict.get(reg).inside;
        let face = self.mesh.face_mut(f);
        face.inside = inside;
        face.an_edge = e;
        self.delete_region(reg);
    }

    /// Transfers `e_src`'s winding onto `e_dst`, ahead of deleting
    /// `e_src` as a duplicate.
    fn add_winding(&mut self, e_dst: EdgeId, e_src: EdgeId) {
        let winding = self.mesh.edge(e_src).winding;
        let sym_winding = self.mesh.edge(self.mesh.sym(e_src)).winding;
        self.mesh.edge_mut(e_dst).winding += winding;
        let sym_dst = self.mesh.sym(e_dst);
        self.mesh.edge_mut(sym_dst).winding += sym_winding;
    }

    // --- Event processing ---

    /// Retires the chain of regions whose upper edges end at the current
    /// event, from `reg_first` down to (but not including) `reg_last`, or
    /// down to the bottommost such region when `reg_last` is `None`.
    ///
    /// The terminating left-going edges are relinked into a single origin
    /// ring; the bottommost of them is returned.
    fn finish_left_regions(&mut self, reg_first: RegionId, reg_last: Option<RegionId>) -> EdgeId {
        let mut reg_prev = reg_first;
        let mut e_prev = self.upper(reg_first);
        while Some(reg_prev) != reg_last {
            // This region ends here; if its edge was temporary, the
            // placement turned out to be correct.
            self.dict.get_mut(reg_prev).fix_upper_edge = false;
            let reg = self.dict.below(reg_prev);
            let mut e = self.upper(reg);
            if self.mesh.origin(e) != self.mesh.origin(e_prev) {
                if !self.dict.get(reg).fix_upper_edge {
                    self.finish_region(reg_prev);
                    break;
                }
                // A temporary edge from below ends here too; replace it
                // with a real connecting edge.
                let a = self.mesh.sym(self.mesh.onext(e_prev));
                let e_sym = self.mesh.sym(e);
                let new_edge = self.mesh.connect_edges(a, e_sym);
                self.fix_upper_edge(reg, new_edge);
                e = new_edge;
            }
            if self.mesh.onext(e_prev) != e {
                // Unlink e from wherever it is and relink it just below
                // e_prev in the origin ring.
                let oprev = self.mesh.oprev(e);
                self.mesh.splice(oprev, e);
                self.mesh.splice(e_prev, e);
            }
            self.finish_region(reg_prev);
            e_prev = self.upper(reg);
            reg_prev = reg;
        }
        e_prev
    }

    /// Inserts the right-going edges `e_first..e_last` (in `onext` order
    /// around the event) into the dictionary below `reg_up`, computes
    /// their winding numbers, and merges coincident edges.
    fn add_right_edges(
        &mut self,
        reg_up: RegionId,
        e_first: EdgeId,
        e_last: EdgeId,
        e_top_left: Option<EdgeId>,
        clean_up: bool,
    ) {
        let mut e = e_first;
        loop {
            debug_assert!(self.mesh.goes_right(e));
            let sym = self.mesh.sym(e);
            self.add_region_below(reg_up, sym);
            e = self.mesh.onext(e);
            if e == e_last {
                break;
            }
        }

        // Walk the new regions top to bottom, relinking the origin ring
        // into dictionary order as we go.
        let mut e_prev = match e_top_left {
            Some(e) => e,
            None => {
                let below = self.dict.below(reg_up);
                self.mesh.onext(self.mesh.sym(self.upper(below)))
            }
        };
        let mut reg_prev = reg_up;
        let mut first_time = true;
        loop {
            let reg = self.dict.below(reg_prev);
            let e = self.mesh.sym(self.upper(reg));
            if self.mesh.origin(e) != self.mesh.origin(e_prev) {
                debug_assert_eq!(
                    self.dict.get(reg_prev).winding_number - self.mesh.edge(e).winding,
                    self.dict.get(reg).winding_number
                );
                break;
            }

            if self.mesh.onext(e) != e_prev {
                let oprev = self.mesh.oprev(e);
                self.mesh.splice(oprev, e);
                let prev_oprev = self.mesh.oprev(e_prev);
                self.mesh.splice(prev_oprev, e);
            }
            let winding_number =
                self.dict.get(reg_prev).winding_number - self.mesh.edge(e).winding;
            let inside = self.winding_rule.is_inside(winding_number);
            {
                let data = self.dict.get_mut(reg);
                data.winding_number = winding_number;
                data.inside = inside;
            }

            self.dict.get_mut(reg_prev).dirty = true;
            if !first_time && self.check_for_right_splice(reg_prev) {
                // e and e_prev turned out to be coincident; keep one.
                self.add_winding(e, e_prev);
                self.delete_region(reg_prev);
                self.mesh.delete_edge(e_prev);
            }
            first_time = false;
            reg_prev = reg;
            e_prev = e;
        }
        self.dict.get_mut(reg_prev).dirty = true;

        if clean_up {
            self.walk_dirty_regions(reg_prev);
        }
    }

    /// Merges two mesh vertices known to be at the same position.
    fn splice_merge_vertices(&mut self, e1: EdgeId, e2: EdgeId) {
        self.mesh.splice(e1, e2);
    }

    /// Restores the dictionary invariant that each upper-edge origin lies
    /// at or above the edge below, by splicing the offending origin into
    /// the other edge. Relies on the event-relative ordering being exact.
    ///
    /// Returns whether the topology was changed.
    fn check_for_right_splice(&mut self, reg_up: RegionId) -> bool {
        let reg_lo = self.dict.below(reg_up);
        let e_up = self.upper(reg_up);
        let e_lo = self.upper(reg_lo);

        if vert_leq(&self.mesh.origin_point(e_up), &self.mesh.origin_point(e_lo)) {
            if edge_sign(
                &self.mesh.dst_point(e_lo),
                &self.mesh.origin_point(e_up),
                &self.mesh.origin_point(e_lo),
            ) > 0.0
            {
                return false;
            }
            if !vert_eq(&self.mesh.origin_point(e_up), &self.mesh.origin_point(e_lo)) {
                // Splice the origin of e_up into e_lo.
                let sym = self.mesh.sym(e_lo);
                self.mesh.split_edge(sym);
                let oprev = self.mesh.oprev(e_lo);
                self.mesh.splice(e_up, oprev);
                self.dict.get_mut(reg_up).dirty = true;
                self.dict.get_mut(reg_lo).dirty = true;
            } else if self.mesh.origin(e_up) != self.mesh.origin(e_lo) {
                // Same position, distinct vertices: merge them,
                // discarding the origin of e_up.
                let v = self.mesh.origin(e_up);
                self.queue.delete(v);
                let oprev = self.mesh.oprev(e_lo);
                self.splice_merge_vertices(oprev, e_up);
            }
        } else {
            if edge_sign(
                &self.mesh.dst_point(e_up),
                &self.mesh.origin_point(e_lo),
                &self.mesh.origin_point(e_up),
            ) < 0.0
            {
                return false;
            }
            // The origin of e_lo sits above e_up; splice it into e_up.
            let above = self.dict.above(reg_up);
            self.dict.get_mut(above).dirty = true;
            self.dict.get_mut(reg_up).dirty = true;
            let sym = self.mesh.sym(e_up);
            self.mesh.split_edge(sym);
            let oprev = self.mesh.oprev(e_lo);
            self.mesh.splice(oprev, e_up);
        }
        true
    }

    /// The destination-side mirror of [`Sweep::check_for_right_splice`]:
    /// each upper-edge destination must lie at or above the edge below.
    /// Unlike the origin case, coincident destinations are left alone
    /// here; they are merged when the event reaches them.
    ///
    /// Returns whether the topology was changed.
    fn check_for_left_splice(&mut self, reg_up: RegionId) -> bool {
        let reg_lo = self.dict.below(reg_up);
        let e_up = self.upper(reg_up);
        let e_lo = self.upper(reg_lo);

        debug_assert!(!vert_eq(&self.mesh.dst_point(e_up), &self.mesh.dst_point(e_lo)));
        if vert_leq(&self.mesh.dst_point(e_up), &self.mesh.dst_point(e_lo)) {
            if edge_sign(
                &self.mesh.dst_point(e_up),
                &self.mesh.dst_point(e_lo),
                &self.mesh.origin_point(e_up),
            ) < 0.0
            {
                return false;
            }
            // The destination of e_lo sits above e_up; splice it in.
            let above = self.dict.above(reg_up);
            self.dict.get_mut(above).dirty = true;
            self.dict.get_mut(reg_up).dirty = true;
            let e = self.mesh.split_edge(e_up);
            let sym_lo = self.mesh.sym(e_lo);
            self.mesh.splice(sym_lo, e);
            let f = self.mesh.edge(e).left_face;
            let inside = self.dict.get(reg_up).inside;
            self.mesh.face_mut(f).inside = inside;
        } else {
            if edge_sign(
                &self.mesh.dst_point(e_lo),
                &self.mesh.dst_point(e_up),
                &self.mesh.origin_point(e_lo),
            ) > 0.0
            {
                return false;
            }
            // The destination of e_up sits below e_lo; splice it in.
            self.dict.get_mut(reg_up).dirty = true;
            self.dict.get_mut(reg_lo).dirty = true;
            let e = self.mesh.split_edge(e_lo);
            let lnext_up = self.mesh.lnext(e_up);
            let sym_lo = self.mesh.sym(e_lo);
            self.mesh.splice(lnext_up, sym_lo);
            let f = self.mesh.edge(self.mesh.sym(e)).left_face;
            let inside = self.dict.get(reg_up).inside;
            self.mesh.face_mut(f).inside = inside;
        }
        true
    }

    /// Checks whether the upper edges of `reg_up` and the region below
    /// cross to the right of the event and, if so, repairs the mesh
    /// around a numerically safe intersection point.
    ///
    /// Returns `true` only when the repair spliced a pre-existing vertex
    /// into the other edge and fully processed the resulting regions, in
    /// which case the caller must not touch `reg_up` again.
    fn check_for_intersect(&mut self, mut reg_up: RegionId) -> bool {
        let mut reg_lo = self.dict.below(reg_up);
        let mut e_up = self.upper(reg_up);
        let mut e_lo = self.upper(reg_lo);
        let org_up = self.mesh.origin_point(e_up);
        let org_lo = self.mesh.origin_point(e_lo);
        let dst_up = self.mesh.dst_point(e_up);
        let dst_lo = self.mesh.dst_point(e_lo);
        let event_point = self.mesh.vertex(self.event).location;

        debug_assert!(!vert_eq(&dst_lo, &dst_up));
        debug_assert!(edge_sign(&dst_up, &event_point, &org_up) <= 0.0);
        debug_assert!(edge_sign(&dst_lo, &event_point, &org_lo) >= 0.0);
        debug_assert!(
            self.mesh.origin(e_up) != self.event && self.mesh.origin(e_lo) != self.event
        );
        debug_assert!(
            !self.dict.get(reg_up).fix_upper_edge && !self.dict.get(reg_lo).fix_upper_edge
        );

        if self.mesh.origin(e_up) == self.mesh.origin(e_lo) {
            // The right endpoints coincide; no crossing.
            return false;
        }

        let t_min_up = org_up.y.min(dst_up.y);
        let t_max_lo = org_lo.y.max(dst_lo.y);
        if t_min_up > t_max_lo {
            return false;
        }

        if vert_leq(&org_up, &org_lo) {
            if edge_sign(&dst_lo, &org_up, &org_lo) > 0.0 {
                return false;
            }
        } else if edge_sign(&dst_up, &org_lo, &org_up) < 0.0 {
            return false;
        }

        // The edges cross, at least marginally.
        let mut isect = crate::math::predicates::edge_intersect(&dst_up, &org_up, &dst_lo, &org_lo);
        debug_assert!(org_up.y.min(dst_up.y) <= isect.y);
        debug_assert!(isect.y <= org_lo.y.max(dst_lo.y));
        debug_assert!(dst_lo.x.min(dst_up.x) <= isect.x);
        debug_assert!(isect.x <= org_lo.x.max(org_up.x));

        // Computing the intersection inexactly must never move the sweep
        // backwards; clamp it to positions still ahead of the line.
        if vert_leq(&isect, &event_point) {
            isect = event_point;
        }
        let org_min = if vert_leq(&org_up, &org_lo) {
            org_up
        } else {
            org_lo
        };
        if vert_leq(&org_min, &isect) {
            isect = org_min;
        }

        if vert_eq(&isect, &org_up) || vert_eq(&isect, &org_lo) {
            // Easy case: the intersection is at one of the right
            // endpoints; splice that endpoint into the other edge.
            self.check_for_right_splice(reg_up);
            return false;
        }

        if (!vert_eq(&dst_up, &event_point)
            && edge_sign(&dst_up, &event_point, &isect) >= 0.0)
            || (!vert_eq(&dst_lo, &event_point)
                && edge_sign(&dst_lo, &event_point, &isect) <= 0.0)
        {
            // Very unusual: the event lies outside the wedge between the
            // two edges. Avoid creating a vertex the sweep has already
            // passed by splicing through an existing one.
            if self.mesh.dst(e_lo) == self.event {
                // Splice the event into e_up and process the new regions.
                let sym_up = self.mesh.sym(e_up);
                self.mesh.split_edge(sym_up);
                let sym_lo = self.mesh.sym(e_lo);
                self.mesh.splice(sym_lo, e_up);
                reg_up = self.top_left_region(reg_up);
                let below = self.dict.below(reg_up);
                e_up = self.upper(below);
                self.finish_left_regions(below, Some(reg_lo));
                let first = self.mesh.oprev(e_up);
                self.add_right_edges(reg_up, first, e_up, Some(e_up), true);
                return true;
            }
            if self.mesh.dst(e_up) == self.event {
                // Splice the event into e_lo and process the new regions.
                let sym_lo = self.mesh.sym(e_lo);
                self.mesh.split_edge(sym_lo);
                let lnext_up = self.mesh.lnext(e_up);
                let oprev_lo = self.mesh.oprev(e_lo);
                self.mesh.splice(lnext_up, oprev_lo);
                reg_lo = reg_up;
                reg_up = self.top_right_region(reg_up);
                let below = self.dict.below(reg_up);
                let e = self.mesh.onext(self.mesh.sym(self.upper(below)));
                let new_upper = self.mesh.oprev(e_lo);
                self.dict.get_mut(reg_lo).upper_edge = new_upper;
                e_lo = self.finish_left_regions(reg_lo, None);
                let first = self.mesh.onext(e_lo);
                let last = self.mesh.onext(self.mesh.sym(e_up));
                self.add_right_edges(reg_up, first, last, Some(e), true);
                return true;
            }
            // Pull whichever edge past the event back to it.
            if edge_sign(&dst_up, &event_point, &isect) >= 0.0 {
                let above = self.dict.above(reg_up);
                self.dict.get_mut(above).dirty = true;
                self.dict.get_mut(reg_up).dirty = true;
                let sym_up = self.mesh.sym(e_up);
                self.mesh.split_edge(sym_up);
                let v = self.mesh.origin(e_up);
                self.mesh.vertex_mut(v).location = event_point;
            }
            if edge_sign(&dst_lo, &event_point, &isect) <= 0.0 {
                self.dict.get_mut(reg_up).dirty = true;
                self.dict.get_mut(reg_lo).dirty = true;
                let sym_lo = self.mesh.sym(e_lo);
                self.mesh.split_edge(sym_lo);
                let v = self.mesh.origin(e_lo);
                self.mesh.vertex_mut(v).location = event_point;
            }
            return false;
        }

        // General case: split both edges, splice the pieces together at a
        // new vertex, and schedule it as a future event.
        let sym_up = self.mesh.sym(e_up);
        self.mesh.split_edge(sym_up);
        let sym_lo = self.mesh.sym(e_lo);
        self.mesh.split_edge(sym_lo);
        let oprev_lo = self.mesh.oprev(e_lo);
        self.mesh.splice(oprev_lo, e_up);
        let v = self.mesh.origin(e_up);
        self.mesh.vertex_mut(v).location = isect;
        self.queue.insert(v, isect);
        self.dict.get_mut(reg_up).dirty = true;
        self.dict.get_mut(reg_lo).dirty = true;
        let above = self.dict.above(reg_up);
        self.dict.get_mut(above).dirty = true;
        false
    }

    /// Re-checks the ordering invariants on every region pair marked
    /// dirty, propagating the flag as repairs create new violations,
    /// until the dictionary is clean around `reg_up`.
    fn walk_dirty_regions(&mut self, mut reg_up: RegionId) {
        let mut reg_lo = self.dict.below(reg_up);
        loop {
            // Find the lowest dirty region; pairs are checked bottom up.
            while self.dict.get(reg_lo).dirty {
                reg_up = reg_lo;
                reg_lo = self.dict.below(reg_lo);
            }
            if !self.dict.get(reg_up).dirty {
                reg_lo = reg_up;
                reg_up = self.dict.above(reg_up);
                if self.dict.is_head(reg_up) || !self.dict.get(reg_up).dirty {
                    return;
                }
            }
            self.dict.get_mut(reg_up).dirty = false;
            let mut e_up = self.upper(reg_up);
            let mut e_lo = self.upper(reg_lo);

            if self.mesh.dst(e_up) != self.mesh.dst(e_lo)
                && self.check_for_left_splice(reg_up)
            {
                // The splice may have made one of the temporary edges
                // redundant.
                if self.dict.get(reg_lo).fix_upper_edge {
                    self.delete_region(reg_lo);
                    self.mesh.delete_edge(e_lo);
                    reg_lo = self.dict.below(reg_up);
                    e_lo = self.upper(reg_lo);
                } else if self.dict.get(reg_up).fix_upper_edge {
                    self.delete_region(reg_up);
                    self.mesh.delete_edge(e_up);
                    reg_up = self.dict.above(reg_lo);
                    e_up = self.upper(reg_up);
                }
            }
            if self.mesh.origin(e_up) != self.mesh.origin(e_lo) {
                if self.mesh.dst(e_up) != self.mesh.dst(e_lo)
                    && !self.dict.get(reg_up).fix_upper_edge
                    && !self.dict.get(reg_lo).fix_upper_edge
                    && (self.mesh.dst(e_up) == self.event
                        || self.mesh.dst(e_lo) == self.event)
                {
                    if self.check_for_intersect(reg_up) {
                        // The regions were processed; start over.
                        return;
                    }
                } else {
                    self.check_for_right_splice(reg_up);
                }
            }
            if self.mesh.origin(e_up) == self.mesh.origin(e_lo)
                && self.mesh.dst(e_up) == self.mesh.dst(e_lo)
            {
                // The two edges coincide; merge them into one.
                self.add_winding(e_lo, e_up);
                self.delete_region(reg_up);
                self.mesh.delete_edge(e_up);
                reg_up = self.dict.above(reg_lo);
            }
        }
    }

    /// Handles an event with no right-going edges: the rightmost vertex
    /// of one or more contours. A temporary edge is added toward the
    /// nearer of the two chain endpoints and flagged so it can be
    /// replaced once the true far endpoint is swept.
    fn connect_right_vertex(&mut self, mut reg_up: RegionId, mut e_bottom_left: EdgeId) {
        let mut e_top_left = self.mesh.onext(e_bottom_left);
        let reg_lo = self.dict.below(reg_up);
        let e_up = self.upper(reg_up);
        let e_lo = self.upper(reg_lo);
        let mut degenerate = false;

        if self.mesh.dst(e_up) != self.mesh.dst(e_lo) {
            self.check_for_intersect(reg_up);
        }

        // Either edge may now pass through the event or end at a new
        // intersection vertex there.
        let event_point = self.mesh.vertex(self.event).location;
        if vert_eq(&self.mesh.origin_point(e_up), &event_point) {
            let oprev = self.mesh.oprev(e_top_left);
            self.mesh.splice(oprev, e_up);
            reg_up = self.top_left_region(reg_up);
            let below = self.dict.below(reg_up);
            e_top_left = self.upper(below);
            self.finish_left_regions(below, Some(reg_lo));
            degenerate = true;
        }
        if vert_eq(&self.mesh.origin_point(e_lo), &event_point) {
            let oprev = self.mesh.oprev(e_lo);
            self.mesh.splice(e_bottom_left, oprev);
            e_bottom_left = self.finish_left_regions(reg_lo, None);
            degenerate = true;
        }
        if degenerate {
            let first = self.mesh.onext(e_bottom_left);
            self.add_right_edges(reg_up, first, e_top_left, Some(e_top_left), true);
            return;
        }

        // Connect to the nearer chain endpoint; the guess is fixed up
        // later if it was wrong.
        let target = if vert_leq(&self.mesh.origin_point(e_lo), &self.mesh.origin_point(e_up)) {
            self.mesh.oprev(e_lo)
        } else {
            e_up
        };
        let lprev = self.mesh.lprev(e_bottom_left);
        let e_new = self.mesh.connect_edges(lprev, target);

        // Defer the dirty-region walk until the new edge is flagged as
        // temporary; it must not be treated as a real boundary yet.
        let onext = self.mesh.onext(e_new);
        self.add_right_edges(reg_up, e_new, onext, Some(onext), false);
        let sym_region = self.edge_region[self.mesh.sym(e_new)];
        self.dict.get_mut(sym_region).fix_upper_edge = true;
        self.walk_dirty_regions(reg_up);
    }

    /// Handles an event lying exactly on an edge already in the
    /// dictionary.
    fn connect_left_degenerate(&mut self, mut reg_up: RegionId, v_event: VertexId) {
        let e = self.upper(reg_up);
        let event_point = self.mesh.vertex(v_event).location;

        if vert_eq(&self.mesh.origin_point(e), &event_point) {
            // The event coincides with an unprocessed origin. Coincident
            // vertices are merged before sweeping, so this is only
            // reachable through an intersection vertex placed exactly on
            // an endpoint.
            let a = self.mesh.vertex(v_event).an_edge;
            self.splice_merge_vertices(e, a);
            return;
        }

        if !vert_eq(&self.mesh.dst_point(e), &event_point) {
            // General case: split the edge at the event and splice the
            // event vertex into it.
            let sym = self.mesh.sym(e);
            self.mesh.split_edge(sym);
            if self.dict.get(reg_up).fix_upper_edge {
                // The edge was temporary; discard the unused half.
                let onext = self.mesh.onext(e);
                self.mesh.delete_edge(onext);
                self.dict.get_mut(reg_up).fix_upper_edge = false;
            }
            let a = self.mesh.vertex(v_event).an_edge;
            self.mesh.splice(a, e);
            self.sweep_event(v_event);
            return;
        }

        // The event coincides with the already-processed destination.
        reg_up = self.top_right_region(reg_up);
        let reg = self.dict.below(reg_up);
        let mut e_top_right = self.mesh.sym(self.upper(reg));
        let e_last = self.mesh.onext(e_top_right);
        let mut e_top_left = Some(e_last);
        if self.dict.get(reg).fix_upper_edge {
            // A temporary edge ends exactly here; it cannot simply be
            // re-spliced, so remove it.
            debug_assert!(e_last != e_top_right);
            self.delete_region(reg);
            self.mesh.delete_edge(e_top_right);
            e_top_right = self.mesh.oprev(e_last);
        }
        let a = self.mesh.vertex(v_event).an_edge;
        self.mesh.splice(a, e_top_right);
        if !self.mesh.goes_left(e_last) {
            // There is no left-going edge through the event after all.
            e_top_left = None;
        }
        let first = self.mesh.onext(e_top_right);
        self.add_right_edges(reg_up, first, e_last, e_top_left, true);
    }

    /// Handles an event whose incident edges all go right: a left
    /// endpoint of one or more contours.
    ///
    /// If the containing region is interior (or bounded by a temporary
    /// edge), the event is connected to the rightmost processed vertex of
    /// the nearer chain, splitting the region in two; otherwise the new
    /// edges are simply inserted.
    fn connect_left_vertex(&mut self, v_event: VertexId) {
        let an_edge = self.mesh.vertex(v_event).an_edge;
        let key_edge = self.mesh.sym(an_edge);
        let reg_up = self.dict.search(&*self.mesh, self.event, key_edge);
        let reg_lo = self.dict.below(reg_up);
        let e_up = self.upper(reg_up);
        let e_lo = self.upper(reg_lo);

        let event_point = self.mesh.vertex(v_event).location;
        if edge_sign(
            &self.mesh.dst_point(e_up),
            &event_point,
            &self.mesh.origin_point(e_up),
        ) == 0.0
        {
            self.connect_left_degenerate(reg_up, v_event);
            return;
        }

        // The closer of the two chain endpoints receives the connection.
        let reg = if vert_leq(&self.mesh.dst_point(e_lo), &self.mesh.dst_point(e_up)) {
            reg_up
        } else {
            reg_lo
        };

        if self.dict.get(reg_up).inside || self.dict.get(reg).fix_upper_edge {
            let e_new = if reg == reg_up {
                let a = self.mesh.sym(an_edge);
                let b = self.mesh.lnext(e_up);
                self.mesh.connect_edges(a, b)
            } else {
                // Connect below: the new edge points away from the event.
                let dnext = self.mesh.sym(self.mesh.onext(self.mesh.sym(e_lo)));
                let tmp = self.mesh.connect_edges(dnext, an_edge);
                self.mesh.sym(tmp)
            };
            if self.dict.get(reg).fix_upper_edge {
                self.fix_upper_edge(reg, e_new);
            } else {
                let new_reg = self.add_region_below(reg_up, e_new);
                self.compute_winding(new_reg);
            }
            self.sweep_event(v_event);
        } else {
            self.add_right_edges(reg_up, an_edge, an_edge, None, true);
        }
    }

    /// Processes one sweep event.
    fn sweep_event(&mut self, v_event: VertexId) {
        self.event = v_event;

        // If the event is the right endpoint of an edge already in the
        // dictionary, its position along the sweep line is known.
        let an_edge = self.mesh.vertex(v_event).an_edge;
        let mut e = an_edge;
        let region = loop {
            if let Some(r) = self.active_region(e) {
                break r;
            }
            e = self.mesh.onext(e);
            if e == an_edge {
                // All edges go right; the event is not incident to any
                // processed edge.
                self.connect_left_vertex(v_event);
                return;
            }
        };

        // Finish the chain of regions ending here, then insert whatever
        // goes right.
        let reg_up = self.top_left_region(region);
        let reg = self.dict.below(reg_up);
        let e_top_left = self.upper(reg);
        let e_bottom_left = self.finish_left_regions(reg, None);

        if self.mesh.onext(e_bottom_left) == e_top_left {
            self.connect_right_vertex(reg_up, e_bottom_left);
        } else {
            let first = self.mesh.onext(e_bottom_left);
            self.add_right_edges(reg_up, first, e_top_left, Some(e_top_left), true);
        }
    }

    // --- Setup and teardown ---

    /// Removes zero-length edges and contours with fewer than three
    /// distinct edges; the sweep assumes neither exists.
    fn remove_degenerate_edges(&mut self) {
        for start in self.mesh.canonical_edge_ids() {
            if !self.mesh.contains_edge(start) {
                continue;
            }
            let mut e = start;
            let mut e_lnext = self.mesh.lnext(e);

            if vert_eq(&self.mesh.origin_point(e), &self.mesh.dst_point(e))
                && self.mesh.lnext(e_lnext) != e
            {
                // Zero-length edge in a contour of at least three edges.
                self.splice_merge_vertices(e_lnext, e);
                self.mesh.delete_edge(e);
                e = e_lnext;
                e_lnext = self.mesh.lnext(e);
            }
            if self.mesh.lnext(e_lnext) == e {
                // Degenerate contour of one or two edges.
                if e_lnext != e && self.mesh.contains_edge(e_lnext) {
                    self.mesh.delete_edge(e_lnext);
                }
                if self.mesh.contains_edge(e) {
                    self.mesh.delete_edge(e);
                }
            }
        }
    }

    /// Schedules every current vertex as an event. Runs before the
    /// sentinels are created, so they are never swept.
    fn init_priority_q(&mut self) {
        for v in self.mesh.vertex_ids() {
            let location = self.mesh.vertex(v).location;
            self.queue.insert(v, location);
        }
    }

    /// Adds one horizontal sentinel edge far above or below all input,
    /// guaranteeing every dictionary search lands between two regions.
    fn add_sentinel(&mut self, t: f64) {
        let e = self.mesh.create_self_loop();
        let right = self.mesh.origin(e);
        let left = self.mesh.dst(e);
        self.mesh.vertex_mut(right).location = Point2::new(SENTINEL_COORD, t);
        self.mesh.vertex_mut(left).location = Point2::new(-SENTINEL_COORD, t);
        self.event = left;

        let data = RegionData {
            upper_edge: e,
            ..RegionData::default()
        };
        self.dict.insert(&*self.mesh, self.event, data);
    }

    fn init_edge_dict(&mut self) {
        self.add_sentinel(-SENTINEL_COORD);
        self.add_sentinel(SENTINEL_COORD);
    }

    /// Discards the remaining regions: the two sentinels, plus at most
    /// one temporary edge from the final event.
    fn done_edge_dict(&mut self) {
        loop {
            let bottom = self.dict.min();
            if self.dict.is_head(bottom) {
                break;
            }
            debug_assert_eq!(self.dict.get(bottom).winding_number, 0);
            self.delete_region(bottom);
        }
    }

    /// Removes faces bounded by exactly two edges, merging the duplicate
    /// edge pair into one. The monotone pass requires every face to have
    /// at least three sides.
    fn remove_degenerate_faces(&mut self) {
        for f in self.mesh.face_ids() {
            if !self.mesh.contains_face(f) {
                continue;
            }
            let e = self.mesh.face(f).an_edge;
            debug_assert!(self.mesh.lnext(e) != e);
            if self.mesh.lnext(self.mesh.lnext(e)) == e {
                let onext = self.mesh.onext(e);
                self.add_winding(onext, e);
                self.mesh.delete_edge(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winding_rules_classify_numbers() {
        assert!(WindingRule::Odd.is_inside(1));
        assert!(WindingRule::Odd.is_inside(-3));
        assert!(!WindingRule::Odd.is_inside(2));
        assert!(WindingRule::NonZero.is_inside(-1));
        assert!(!WindingRule::NonZero.is_inside(0));
        assert!(WindingRule::Positive.is_inside(1));
        assert!(!WindingRule::Positive.is_inside(-1));
        assert!(WindingRule::Negative.is_inside(-1));
        assert!(!WindingRule::Negative.is_inside(1));
        assert!(WindingRule::AbsGeqTwo.is_inside(2));
        assert!(WindingRule::AbsGeqTwo.is_inside(-2));
        assert!(!WindingRule::AbsGeqTwo.is_inside(1));
    }
}
