use geoworld_geom::Vec3;

/// Flat triangle soup for strips of quads, one quad per centerline segment.
///
/// Each quad owns four vertices `p1-left, p1+left, p2-left, p2+left` and two
/// triangles `(0,2,1), (2,3,1)`, so quad `q` starts at vertex `4q`.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct RibbonMesh {
    pub pos: Vec<f32>,
    pub uv: Vec<f32>,
    pub idx: Vec<u32>,
}

const QUAD_UVS: [(f32, f32); 4] = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)];

impl RibbonMesh {
    #[inline]
    pub fn reserve_quads(&mut self, n_quads: usize) {
        self.pos.reserve(n_quads * 4 * 3);
        self.uv.reserve(n_quads * 4 * 2);
        self.idx.reserve(n_quads * 6);
    }

    /// Appends the quad spanning `p1..p2`, `half_width` to either side.
    pub fn add_segment(&mut self, p1: Vec3, p2: Vec3, half_width: f32) {
        let dir = (p2 - p1).normalized();
        let left = Vec3::UP.cross(dir) * half_width;
        let base = self.vertex_count() as u32;
        for v in [p1 - left, p1 + left, p2 - left, p2 + left] {
            self.pos.extend_from_slice(&[v.x, v.y, v.z]);
        }
        for (u, v) in QUAD_UVS {
            self.uv.extend_from_slice(&[u, v]);
        }
        self.idx
            .extend_from_slice(&[base, base + 2, base + 1, base + 2, base + 3, base + 1]);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.vertex_count() / 4
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.idx.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    #[inline]
    pub fn vertex(&self, i: usize) -> Vec3 {
        Vec3::new(self.pos[i * 3], self.pos[i * 3 + 1], self.pos[i * 3 + 2])
    }

    /// Mean of the quad's four corners.
    pub fn quad_center(&self, q: usize) -> Vec3 {
        let b = q * 4;
        (self.vertex(b) + self.vertex(b + 1) + self.vertex(b + 2) + self.vertex(b + 3)) / 4.0
    }

    /// Unit direction of travel along the quad.
    pub fn quad_direction(&self, q: usize) -> Vec3 {
        let b = q * 4;
        (self.vertex(b + 2) - self.vertex(b)).normalized()
    }
}

/// One ribbon over the whole polyline; `None` below two points.
pub fn extrude_ribbon(points: &[Vec3], half_width: f32) -> Option<RibbonMesh> {
    if points.len() < 2 {
        return None;
    }
    let mut mesh = RibbonMesh::default();
    mesh.reserve_quads(points.len() - 1);
    for w in points.windows(2) {
        mesh.add_segment(w[0], w[1], half_width);
    }
    Some(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_layout_and_winding() {
        let m = extrude_ribbon(
            &[Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 10.0)],
            2.0,
        )
        .unwrap();
        assert_eq!(m.quad_count(), 1);
        assert_eq!(m.idx, vec![0, 2, 1, 2, 3, 1]);
        // dir = +z, left = up x dir = +x
        assert_eq!(m.vertex(0), Vec3::new(-2.0, 0.0, 0.0));
        assert_eq!(m.vertex(1), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(m.vertex(3), Vec3::new(2.0, 0.0, 10.0));
        assert_eq!(m.uv, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        assert_eq!(m.quad_center(0), Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(m.quad_direction(0), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn triangles_face_up() {
        let m = extrude_ribbon(
            &[Vec3::ZERO, Vec3::new(5.0, 0.0, 3.0), Vec3::new(9.0, 1.0, 9.0)],
            1.5,
        )
        .unwrap();
        for tri in m.idx.chunks_exact(3) {
            let (a, b, c) = (
                m.vertex(tri[0] as usize),
                m.vertex(tri[1] as usize),
                m.vertex(tri[2] as usize),
            );
            let n = (b - a).cross(c - a);
            assert!(n.y > 0.0, "triangle {tri:?} faces down");
        }
    }

    #[test]
    fn single_point_has_no_ribbon() {
        assert!(extrude_ribbon(&[Vec3::ZERO], 1.0).is_none());
    }
}
