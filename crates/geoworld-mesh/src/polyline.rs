use geoworld_geom::Vec3;

/// Insert points so no planar gap exceeds `step`. Original vertices are kept
/// and the last one closes the sequence. Non-positive `step` copies the input.
pub fn subdivide_polyline(poly: &[Vec3], step: f32) -> Vec<Vec3> {
    if poly.len() < 2 || !(step > 0.0) {
        return poly.to_vec();
    }
    let mut out = Vec::with_capacity(poly.len());
    for w in poly.windows(2) {
        let (a, b) = (w[0], w[1]);
        let pieces = pieces_for(a.distance_xz(b), step);
        push_pieces(&mut out, a, b, pieces);
    }
    out.extend(poly.last().copied());
    out
}

/// Like [`subdivide_polyline`] but spacing by full 3D length.
pub fn resample_polyline(poly: &[Vec3], step: f32) -> Vec<Vec3> {
    if poly.len() < 2 || !(step > 0.0) {
        return poly.to_vec();
    }
    let mut out = Vec::with_capacity(poly.len());
    for w in poly.windows(2) {
        let (a, b) = (w[0], w[1]);
        push_pieces(&mut out, a, b, pieces_for(a.distance(b), step));
    }
    out.extend(poly.last().copied());
    out
}

#[inline]
fn pieces_for(len: f32, step: f32) -> usize {
    ((len / step).ceil() as usize).max(1)
}

#[inline]
fn push_pieces(out: &mut Vec<Vec3>, a: Vec3, b: Vec3, pieces: usize) {
    for s in 0..pieces {
        out.push(a.lerp(b, s as f32 / pieces as f32));
    }
}
