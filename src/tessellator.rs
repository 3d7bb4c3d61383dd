//! Public tessellation interface.
//!
//! [`Tessellator`] is a three-phase builder: feed contours, call
//! [`Tessellator::finish`], then extract triangles or outlines. The
//! one-shot [`tessellate`] covers the common case.

use crate::error::{Result, TessellatorError};
use crate::math::predicates::vert_eq;
use crate::math::Point2;
use crate::mesh::{EdgeId, Mesh, VertexId};
use crate::monotone;
use crate::sweep::{Sweep, WindingRule};

/// A triangulated shape: deduplicated vertex positions plus index
/// triples.
#[derive(Debug, Clone, Default)]
pub struct Triangles {
    /// Vertex positions, each referenced at least once.
    pub vertices: Vec<Point2>,
    /// Triangle corners as indices into `vertices`.
    pub indices: Vec<[u32; 3]>,
}

/// The boundary of a shape: one closed index loop per boundary polygon,
/// including hole boundaries.
#[derive(Debug, Clone, Default)]
pub struct Outlines {
    /// Vertex positions, each referenced at least once.
    pub vertices: Vec<Point2>,
    /// Closed loops of indices into `vertices`.
    pub loops: Vec<Vec<u32>>,
}

/// Converts arbitrary closed contours into triangles.
///
/// The input may be convex, concave, self-intersecting, nested, or
/// degenerate; the winding rule decides which regions count as interior.
/// Coordinates must be finite and within `±1e150`.
///
/// ```
/// use polytess::{Tessellator, WindingRule};
/// use polytess::math::Point2;
///
/// let square = vec![
///     Point2::new(0.0, 0.0),
///     Point2::new(10.0, 0.0),
///     Point2::new(10.0, 10.0),
///     Point2::new(0.0, 10.0),
/// ];
/// let mut tess = Tessellator::new(WindingRule::Odd);
/// tess.add_contour(&square)?;
/// tess.finish()?;
/// let triangles = tess.triangles(true)?;
/// assert_eq!(triangles.indices.len(), 2);
/// # Ok::<(), polytess::TessellatorError>(())
/// ```
#[derive(Debug)]
pub struct Tessellator {
    mesh: Mesh,
    winding_rule: WindingRule,
    last_contour_edge: Option<EdgeId>,
    finished: bool,
    tessellated: bool,
    outlined: bool,
}

impl Tessellator {
    /// Creates an empty tessellator using the given winding rule.
    #[must_use]
    pub fn new(winding_rule: WindingRule) -> Self {
        Self {
            mesh: Mesh::new(),
            winding_rule,
            last_contour_edge: None,
            finished: false,
            tessellated: false,
            outlined: false,
        }
    }

    /// Starts a new contour. The previous contour, if any, is closed
    /// implicitly: the last vertex connects back to the first.
    pub fn begin_contour(&mut self) {
        self.last_contour_edge = None;
    }

    /// Appends one vertex to the current contour.
    ///
    /// # Errors
    ///
    /// Returns [`TessellatorError::ContoursFinished`] after
    /// [`Tessellator::finish`] has been called.
    pub fn add_vertex(&mut self, x: f64, y: f64) -> Result<()> {
        if self.finished {
            return Err(TessellatorError::ContoursFinished);
        }
        self.push_vertex(x, y);
        Ok(())
    }

    /// Closes the current contour.
    pub fn end_contour(&mut self) {
        self.last_contour_edge = None;
    }

    /// Adds a whole closed contour. Consecutive duplicate points and an
    /// explicit closing point equal to the first are dropped; a contour
    /// with fewer than two distinct points is ignored entirely.
    ///
    /// # Errors
    ///
    /// Returns [`TessellatorError::ContoursFinished`] after
    /// [`Tessellator::finish`] has been called.
    pub fn add_contour(&mut self, points: &[Point2]) -> Result<()> {
        if self.finished {
            return Err(TessellatorError::ContoursFinished);
        }
        self.ingest_contour(points);
        Ok(())
    }

    /// Ends contour input and computes the interior: the mesh is swept
    /// into monotone regions and every face classified against the
    /// winding rule.
    ///
    /// # Errors
    ///
    /// Returns [`TessellatorError::ContoursFinished`] when called twice.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Err(TessellatorError::ContoursFinished);
        }
        self.compute_interior_mesh();
        Ok(())
    }

    /// Extracts the triangulated interior, counter-clockwise or
    /// clockwise per `counter_clockwise`.
    ///
    /// May be called repeatedly; the triangulation is computed once.
    ///
    /// # Errors
    ///
    /// Returns [`TessellatorError::NotFinished`] before
    /// [`Tessellator::finish`], and [`TessellatorError::MeshConsumed`]
    /// after [`Tessellator::outlines`] has discarded the interior edges.
    pub fn triangles(&mut self, counter_clockwise: bool) -> Result<Triangles> {
        if !self.finished {
            return Err(TessellatorError::NotFinished);
        }
        if self.outlined {
            return Err(TessellatorError::MeshConsumed);
        }
        Ok(self.extract_triangles(counter_clockwise))
    }

    /// Extracts the boundary loops of the interior instead of triangles.
    ///
    /// The first call deletes every non-boundary edge from the mesh, so
    /// triangles are no longer available afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`TessellatorError::NotFinished`] before
    /// [`Tessellator::finish`].
    pub fn outlines(&mut self, counter_clockwise: bool) -> Result<Outlines> {
        if !self.finished {
            return Err(TessellatorError::NotFinished);
        }
        if !self.outlined {
            self.mesh.set_winding_number(1, true);
            self.outlined = true;
        }
        Ok(self.extract_outlines(counter_clockwise))
    }

    // --- Internals ---

    /// Adds one vertex to the contour under construction.
    ///
    /// The first vertex of a contour creates a closed loop edge; each
    /// subsequent vertex splits the loop's closing edge, so the contour
    /// is a closed polygon at every step. Every edge adds `+1` to the
    /// winding of the region on its left.
    fn push_vertex(&mut self, x: f64, y: f64) {
        let edge = match self.last_contour_edge {
            None => {
                let e = self.mesh.create_self_loop();
                let sym = self.mesh.sym(e);
                self.mesh.splice(e, sym);
                e
            }
            Some(last) => {
                self.mesh.split_edge(last);
                self.mesh.lnext(last)
            }
        };
        let v = self.mesh.origin(edge);
        self.mesh.vertex_mut(v).location = Point2::new(x, y);
        self.mesh.edge_mut(edge).winding = 1;
        let sym = self.mesh.sym(edge);
        self.mesh.edge_mut(sym).winding = -1;
        self.last_contour_edge = Some(edge);
    }

    fn ingest_contour(&mut self, points: &[Point2]) {
        let mut distinct: Vec<Point2> = Vec::with_capacity(points.len());
        for p in points {
            if distinct.last().is_some_and(|q| vert_eq(q, p)) {
                continue;
            }
            distinct.push(*p);
        }
        while distinct.len() > 1 {
            let (first, last) = (distinct[0], distinct[distinct.len() - 1]);
            if !vert_eq(&first, &last) {
                break;
            }
            distinct.pop();
        }
        if distinct.len() < 2 {
            return;
        }
        self.begin_contour();
        for p in &distinct {
            self.push_vertex(p.x, p.y);
        }
        self.end_contour();
    }

    fn compute_interior_mesh(&mut self) {
        self.last_contour_edge = None;
        Sweep::new(&mut self.mesh, self.winding_rule).compute_interior();
        self.finished = true;
    }

    /// Output indices are assigned per extraction; stale ones from an
    /// earlier extraction must not leak into a new vertex list.
    fn clear_output_indices(&mut self) {
        for v in self.mesh.vertex_ids() {
            self.mesh.vertex_mut(v).index = None;
        }
    }

    fn extract_triangles(&mut self, counter_clockwise: bool) -> Triangles {
        if !self.tessellated {
            monotone::tessellate_interior(&mut self.mesh);
            self.tessellated = true;
        }
        self.clear_output_indices();
        let mut out = Triangles::default();
        for f in self.mesh.face_ids() {
            if !self.mesh.face(f).inside {
                continue;
            }
            let start = self.mesh.face(f).an_edge;
            let mut triangle = [0u32; 3];
            let mut corner = 0;
            let mut e = start;
            loop {
                let v = self.mesh.origin(e);
                triangle[corner] = output_index(&mut self.mesh, &mut out.vertices, v);
                corner += 1;
                e = self.mesh.lnext(e);
                if e == start {
                    break;
                }
            }
            debug_assert_eq!(corner, 3);
            if !counter_clockwise {
                triangle.swap(0, 2);
            }
            out.indices.push(triangle);
        }
        out
    }

    fn extract_outlines(&mut self, counter_clockwise: bool) -> Outlines {
        self.clear_output_indices();
        let mut out = Outlines::default();
        for f in self.mesh.face_ids() {
            if !self.mesh.face(f).inside {
                continue;
            }
            let start = self.mesh.face(f).an_edge;
            let mut indices = Vec::new();
            let mut e = start;
            loop {
                let v = self.mesh.origin(e);
                indices.push(output_index(&mut self.mesh, &mut out.vertices, v));
                e = self.mesh.lnext(e);
                if e == start {
                    break;
                }
            }
            if !counter_clockwise {
                indices.reverse();
            }
            out.loops.push(indices);
        }
        out
    }
}

/// The output index of `v`, assigning and recording a fresh one on first
/// use.
#[allow(clippy::cast_possible_truncation)]
fn output_index(mesh: &mut Mesh, vertices: &mut Vec<Point2>, v: VertexId) -> u32 {
    if let Some(i) = mesh.vertex(v).index {
        return i;
    }
    let i = vertices.len() as u32;
    vertices.push(mesh.vertex(v).location);
    mesh.vertex_mut(v).index = Some(i);
    i
}

/// Triangulates `contours` in one call, producing counter-clockwise
/// triangles.
#[must_use]
pub fn tessellate(contours: &[Vec<Point2>], winding_rule: WindingRule) -> Triangles {
    let mut tess = Tessellator::new(winding_rule);
    for contour in contours {
        tess.ingest_contour(contour);
    }
    tess.compute_interior_mesh();
    tess.extract_triangles(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::signed_area;
    use approx::assert_relative_eq;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point2> {
        coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point2> {
        pts(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)])
    }

    fn triangle_area(t: &Triangles, tri: [u32; 3]) -> f64 {
        let a = t.vertices[tri[0] as usize];
        let b = t.vertices[tri[1] as usize];
        let c = t.vertices[tri[2] as usize];
        0.5 * ((b - a).perp(&(c - a)))
    }

    fn total_area(t: &Triangles) -> f64 {
        t.indices.iter().map(|&tri| triangle_area(t, tri)).sum()
    }

    fn assert_well_formed(t: &Triangles) {
        for tri in &t.indices {
            for &i in tri {
                assert!((i as usize) < t.vertices.len());
            }
            assert!(tri[0] != tri[1] && tri[1] != tri[2] && tri[0] != tri[2]);
        }
    }

    #[test]
    fn unit_square_two_triangles() {
        let t = tessellate(&[square(0.0, 0.0, 10.0, 10.0)], WindingRule::Odd);
        assert_well_formed(&t);
        assert_eq!(t.vertices.len(), 4);
        assert_eq!(t.indices.len(), 2);
        assert_relative_eq!(total_area(&t), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn triangles_are_counter_clockwise() {
        let t = tessellate(&[square(0.0, 0.0, 10.0, 10.0)], WindingRule::Odd);
        for &tri in &t.indices {
            assert!(triangle_area(&t, tri) > 0.0);
        }
    }

    #[test]
    fn clockwise_extraction_flips_orientation() {
        let mut tess = Tessellator::new(WindingRule::Odd);
        tess.add_contour(&square(0.0, 0.0, 10.0, 10.0)).unwrap();
        tess.finish().unwrap();
        let t = tess.triangles(false).unwrap();
        for &tri in &t.indices {
            assert!(triangle_area(&t, tri) < 0.0);
        }
        assert_relative_eq!(total_area(&t), -100.0, epsilon = 1e-9);
    }

    #[test]
    fn clockwise_input_triangulates_too() {
        let mut contour = square(0.0, 0.0, 10.0, 10.0);
        contour.reverse();
        let t = tessellate(&[contour], WindingRule::Odd);
        assert_eq!(t.indices.len(), 2);
        assert_relative_eq!(total_area(&t), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn square_with_hole() {
        // The hole winds opposite the outer boundary.
        let outer = square(0.0, 0.0, 10.0, 10.0);
        let mut hole = square(4.0, 4.0, 6.0, 6.0);
        hole.reverse();
        let expected = signed_area(&outer) + signed_area(&hole);
        let t = tessellate(&[outer, hole], WindingRule::Odd);
        assert_well_formed(&t);
        assert_eq!(t.vertices.len(), 8);
        // A triangulation of n vertices with h holes has n + 2h - 2
        // triangles.
        assert_eq!(t.indices.len(), 8);
        assert_relative_eq!(total_area(&t), expected, epsilon = 1e-9);
        assert_relative_eq!(total_area(&t), 96.0, epsilon = 1e-9);
    }

    #[test]
    fn same_direction_hole_follows_winding_rule() {
        // Both contours counter-clockwise: Odd alternates, NonZero fills.
        let outer = square(0.0, 0.0, 10.0, 10.0);
        let inner = square(2.0, 2.0, 8.0, 8.0);
        let odd = tessellate(&[outer.clone(), inner.clone()], WindingRule::Odd);
        assert_relative_eq!(total_area(&odd), 64.0, epsilon = 1e-9);
        let nonzero = tessellate(&[outer, inner], WindingRule::NonZero);
        assert_relative_eq!(total_area(&nonzero), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn overlapping_squares_by_rule() {
        let a = square(0.0, 0.0, 10.0, 10.0);
        let b = square(5.0, 5.0, 15.0, 15.0);
        let contours = vec![a, b];
        let nonzero = tessellate(&contours, WindingRule::NonZero);
        assert_relative_eq!(total_area(&nonzero), 175.0, epsilon = 1e-9);
        let odd = tessellate(&contours, WindingRule::Odd);
        assert_relative_eq!(total_area(&odd), 150.0, epsilon = 1e-9);
        let twice = tessellate(&contours, WindingRule::AbsGeqTwo);
        assert_relative_eq!(total_area(&twice), 25.0, epsilon = 1e-9);
        let negative = tessellate(&contours, WindingRule::Negative);
        assert!(negative.indices.is_empty());
    }

    #[test]
    fn bowtie_is_split_at_the_crossing() {
        // Self-intersecting contour crossing itself at (5, 5); each lobe
        // keeps an odd winding number.
        let bowtie = pts(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)]);
        let t = tessellate(&[bowtie], WindingRule::Odd);
        assert_well_formed(&t);
        assert_relative_eq!(total_area(&t), 50.0, epsilon = 1e-9);
        // The crossing vertex is materialized in the output.
        assert!(t
            .vertices
            .iter()
            .any(|p| (p.x - 5.0).abs() < 1e-9 && (p.y - 5.0).abs() < 1e-9));
    }

    #[test]
    fn concave_polygon() {
        let arrow = pts(&[(0.0, 0.0), (10.0, 0.0), (5.0, 4.0), (10.0, 10.0), (0.0, 10.0)]);
        let t = tessellate(&[arrow.clone()], WindingRule::Odd);
        assert_well_formed(&t);
        assert_eq!(t.indices.len(), 3);
        // Area conservation: the triangles sum to the shoelace area.
        assert_relative_eq!(total_area(&t), signed_area(&arrow), epsilon = 1e-9);
        assert_relative_eq!(total_area(&t), 75.0, epsilon = 1e-9);
    }

    #[test]
    fn two_point_contour_yields_nothing() {
        let t = tessellate(&[pts(&[(0.0, 0.0), (5.0, 5.0)])], WindingRule::Odd);
        assert!(t.indices.is_empty());
        assert!(t.vertices.is_empty());
    }

    #[test]
    fn collinear_contour_yields_nothing() {
        let line = pts(&[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0), (5.0, 0.0)]);
        let t = tessellate(&[line], WindingRule::Odd);
        assert!(t.indices.is_empty());
    }

    #[test]
    fn empty_input_yields_nothing() {
        let t = tessellate(&[], WindingRule::Odd);
        assert!(t.indices.is_empty());
        assert!(t.vertices.is_empty());
    }

    #[test]
    fn duplicate_and_closing_points_are_dropped() {
        let contour = pts(&[
            (0.0, 0.0),
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ]);
        let t = tessellate(&[contour], WindingRule::Odd);
        assert_eq!(t.vertices.len(), 4);
        assert_eq!(t.indices.len(), 2);
        assert_relative_eq!(total_area(&t), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_length_edge_mid_contour_is_removed() {
        // Incremental input bypasses add_contour's dedup; the sweep's own
        // degenerate-edge pass has to cope.
        let mut tess = Tessellator::new(WindingRule::Odd);
        tess.begin_contour();
        tess.add_vertex(0.0, 0.0).unwrap();
        tess.add_vertex(10.0, 0.0).unwrap();
        tess.add_vertex(10.0, 0.0).unwrap();
        tess.add_vertex(10.0, 10.0).unwrap();
        tess.end_contour();
        tess.finish().unwrap();
        let t = tess.triangles(true).unwrap();
        assert_eq!(t.indices.len(), 1);
        assert_relative_eq!(total_area(&t), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn rotated_start_vertex_gives_same_result() {
        let base = square(0.0, 0.0, 10.0, 10.0);
        let reference = tessellate(&[base.clone()], WindingRule::Odd);
        for shift in 1..4 {
            let mut rotated = base.clone();
            rotated.rotate_left(shift);
            let t = tessellate(&[rotated], WindingRule::Odd);
            assert_eq!(t.indices.len(), reference.indices.len());
            assert_relative_eq!(total_area(&t), total_area(&reference), epsilon = 1e-9);
        }
    }

    #[test]
    fn touching_contours_share_vertices() {
        // Two triangles meeting at a single point.
        let left = pts(&[(0.0, 0.0), (5.0, 5.0), (0.0, 10.0)]);
        let right = pts(&[(5.0, 5.0), (10.0, 0.0), (10.0, 10.0)]);
        let t = tessellate(&[left, right], WindingRule::Odd);
        assert_well_formed(&t);
        assert_relative_eq!(total_area(&t), 50.0, epsilon = 1e-9);
        // The shared touching point appears once.
        let shared = t
            .vertices
            .iter()
            .filter(|p| (p.x - 5.0).abs() < 1e-9 && (p.y - 5.0).abs() < 1e-9)
            .count();
        assert_eq!(shared, 1);
    }

    #[test]
    fn outlines_of_square_with_hole() {
        let outer = square(0.0, 0.0, 10.0, 10.0);
        let mut hole = square(4.0, 4.0, 6.0, 6.0);
        hole.reverse();
        let mut tess = Tessellator::new(WindingRule::Odd);
        tess.add_contour(&outer).unwrap();
        tess.add_contour(&hole).unwrap();
        tess.finish().unwrap();
        let outlines = tess.outlines(true).unwrap();
        assert_eq!(outlines.loops.len(), 2);
        for indices in &outlines.loops {
            assert_eq!(indices.len(), 4);
        }
        assert_eq!(outlines.vertices.len(), 8);
    }

    #[test]
    fn vertices_before_finish_only() {
        let mut tess = Tessellator::new(WindingRule::Odd);
        tess.add_contour(&square(0.0, 0.0, 1.0, 1.0)).unwrap();
        tess.finish().unwrap();
        assert_eq!(
            tess.add_vertex(2.0, 2.0),
            Err(TessellatorError::ContoursFinished)
        );
        assert_eq!(
            tess.add_contour(&square(0.0, 0.0, 1.0, 1.0)),
            Err(TessellatorError::ContoursFinished)
        );
        assert_eq!(tess.finish(), Err(TessellatorError::ContoursFinished));
    }

    #[test]
    fn extraction_requires_finish() {
        let mut tess = Tessellator::new(WindingRule::Odd);
        tess.add_contour(&square(0.0, 0.0, 1.0, 1.0)).unwrap();
        assert_eq!(
            tess.triangles(true).unwrap_err(),
            TessellatorError::NotFinished
        );
        assert_eq!(
            tess.outlines(true).unwrap_err(),
            TessellatorError::NotFinished
        );
    }

    #[test]
    fn outlines_consume_the_mesh() {
        let mut tess = Tessellator::new(WindingRule::Odd);
        tess.add_contour(&square(0.0, 0.0, 1.0, 1.0)).unwrap();
        tess.finish().unwrap();
        tess.outlines(true).unwrap();
        assert_eq!(
            tess.triangles(true).unwrap_err(),
            TessellatorError::MeshConsumed
        );
        // Outlines stay available.
        assert!(tess.outlines(false).is_ok());
    }

    #[test]
    fn triangles_can_be_extracted_twice() {
        let mut tess = Tessellator::new(WindingRule::Odd);
        tess.add_contour(&square(0.0, 0.0, 10.0, 10.0)).unwrap();
        tess.finish().unwrap();
        let first = tess.triangles(true).unwrap();
        let second = tess.triangles(true).unwrap();
        assert_eq!(first.indices.len(), second.indices.len());
        assert_eq!(first.vertices.len(), second.vertices.len());
        assert_relative_eq!(total_area(&second), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn interior_edges_are_shared_by_two_triangles() {
        use std::collections::HashMap;
        let outer = square(0.0, 0.0, 10.0, 10.0);
        let mut hole = square(4.0, 4.0, 6.0, 6.0);
        hole.reverse();
        let t = tessellate(&[outer, hole], WindingRule::Odd);
        let mut edge_use: HashMap<(u32, u32), u32> = HashMap::new();
        for tri in &t.indices {
            for k in 0..3 {
                let a = tri[k];
                let b = tri[(k + 1) % 3];
                let key = (a.min(b), a.max(b));
                *edge_use.entry(key).or_insert(0) += 1;
            }
        }
        // Every edge bounds one or two triangles, never more.
        assert!(edge_use.values().all(|&n| n <= 2));
        // Eight boundary edges (outer and hole), each used exactly once.
        assert_eq!(edge_use.values().filter(|&&n| n == 1).count(), 8);
    }
}
