//! Triangulation of x-monotone faces.

use crate::math::predicates::{edge_sign, vert_leq};
use crate::mesh::{FaceId, Mesh};

/// Triangulates every interior face. Each must be x-monotone, which is
/// what the sweep guarantees; afterwards every interior face is a
/// triangle.
pub(crate) fn tessellate_interior(mesh: &mut Mesh) {
    for f in mesh.face_ids() {
        if mesh.contains_face(f) && mesh.face(f).inside {
            tessellate_monotone_region(mesh, f);
        }
    }
}

/// Triangulates one monotone face by zig-zagging between its upper and
/// lower boundary chains, emitting a fan whenever one chain turns out to
/// be concave toward the other.
///
/// All edges are oriented counter-clockwise around the region, and new
/// diagonals keep that orientation, so the resulting triangles all wind
/// counter-clockwise.
fn tessellate_monotone_region(mesh: &mut Mesh, face: FaceId) {
    // up and lo chase each other around the boundary: up's destination
    // and lo's origin are the two chain frontiers still to be joined.
    let mut up = mesh.face(face).an_edge;
    debug_assert!(mesh.lnext(up) != up && mesh.lnext(mesh.lnext(up)) != up);

    // Start at the rightmost vertex, with up on the upper chain.
    while vert_leq(&mesh.dst_point(up), &mesh.origin_point(up)) {
        up = mesh.lprev(up);
    }
    while vert_leq(&mesh.origin_point(up), &mesh.dst_point(up)) {
        up = mesh.lnext(up);
    }
    let mut lo = mesh.lprev(up);

    while mesh.lnext(up) != lo {
        if vert_leq(&mesh.dst_point(up), &mesh.origin_point(lo)) {
            // up's destination is the leftmost frontier vertex. Fan
            // upward from lo's origin while the lower chain stays convex;
            // ties go to the lower chain for fewer slivers.
            while mesh.lnext(lo) != up {
                let lo_lnext = mesh.lnext(lo);
                if !mesh.goes_left(lo_lnext)
                    && edge_sign(
                        &mesh.origin_point(lo),
                        &mesh.dst_point(lo),
                        &mesh.dst_point(lo_lnext),
                    ) > 0.0
                {
                    break;
                }
                let chord = mesh.connect_edges(lo_lnext, lo);
                lo = mesh.sym(chord);
            }
            lo = mesh.lprev(lo);
        } else {
            // Symmetric case: lo's origin is leftmost; fan downward from
            // up's destination, with ties going to the upper chain.
            while mesh.lnext(lo) != up {
                let up_lprev = mesh.lprev(up);
                if !mesh.goes_right(up_lprev)
                    && edge_sign(
                        &mesh.dst_point(up),
                        &mesh.origin_point(up),
                        &mesh.origin_point(up_lprev),
                    ) < 0.0
                {
                    break;
                }
                let chord = mesh.connect_edges(up, up_lprev);
                up = mesh.sym(chord);
            }
            up = mesh.lnext(up);
        }
    }

    // The chains have met at the leftmost vertex; fan out whatever
    // remains.
    debug_assert!(mesh.lnext(lo) != up);
    while mesh.lnext(mesh.lnext(lo)) != up {
        let lo_lnext = mesh.lnext(lo);
        let chord = mesh.connect_edges(lo_lnext, lo);
        lo = mesh.sym(chord);
    }
}
