use geoworld_geom::{Aabb, Vec2, Vec3, distance_point_to_segment};

fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn vec3_approx_eq(a: Vec3, b: Vec3, eps: f32) -> bool {
    approx_eq(a.x, b.x, eps) && approx_eq(a.y, b.y, eps) && approx_eq(a.z, b.z, eps)
}

#[test]
fn vec3_constants() {
    assert!(vec3_approx_eq(Vec3::ZERO, Vec3::new(0.0, 0.0, 0.0), 1e-6));
    assert!(vec3_approx_eq(Vec3::UP, Vec3::new(0.0, 1.0, 0.0), 1e-6));
}

#[test]
fn vec3_add_sub() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    let b = Vec3::new(-4.0, 5.0, -6.0);
    let c = a + b;
    assert!(vec3_approx_eq(c, Vec3::new(-3.0, 7.0, -3.0), 1e-6));
    assert!(vec3_approx_eq(c - a, b, 1e-6));
}

#[test]
fn up_cross_forward_points_left_of_travel() {
    // Ribbon extrusion relies on cross(UP, dir) being horizontal and perpendicular.
    let dir = Vec3::new(0.0, 0.0, 1.0);
    let left = Vec3::UP.cross(dir);
    assert!(vec3_approx_eq(left, Vec3::new(1.0, 0.0, 0.0), 1e-6));
    assert!(approx_eq(left.dot(dir), 0.0, 1e-6));
}

#[test]
fn normalized_zero_stays_zero() {
    assert_eq!(Vec3::ZERO.normalized(), Vec3::ZERO);
}

#[test]
fn lerp_endpoints_and_midpoint() {
    let a = Vec3::new(0.0, 2.0, 0.0);
    let b = Vec3::new(10.0, 4.0, -10.0);
    assert!(vec3_approx_eq(a.lerp(b, 0.0), a, 1e-6));
    assert!(vec3_approx_eq(a.lerp(b, 1.0), b, 1e-6));
    assert!(vec3_approx_eq(a.lerp(b, 0.5), Vec3::new(5.0, 3.0, -5.0), 1e-6));
}

#[test]
fn distance_xz_ignores_height() {
    let a = Vec3::new(0.0, 100.0, 0.0);
    let b = Vec3::new(3.0, -50.0, 4.0);
    assert!(approx_eq(a.distance_xz(b), 5.0, 1e-6));
}

#[test]
fn segment_distance_cases() {
    let a = Vec2::new(0.0, 0.0);
    let b = Vec2::new(10.0, 0.0);
    // perpendicular to the interior
    assert!(approx_eq(distance_point_to_segment(Vec2::new(5.0, 3.0), a, b), 3.0, 1e-6));
    // beyond the end caps
    assert!(approx_eq(distance_point_to_segment(Vec2::new(-3.0, 4.0), a, b), 5.0, 1e-6));
    assert!(approx_eq(distance_point_to_segment(Vec2::new(13.0, 4.0), a, b), 5.0, 1e-6));
    // degenerate segment
    assert!(approx_eq(distance_point_to_segment(Vec2::new(3.0, 4.0), a, a), 5.0, 1e-6));
}

#[test]
fn aabb_from_points_and_center() {
    assert!(Aabb::from_points(&[]).is_none());
    let b = Aabb::from_points(&[
        Vec3::new(1.0, 0.0, 5.0),
        Vec3::new(-1.0, 2.0, 7.0),
        Vec3::new(3.0, 1.0, 6.0),
    ])
    .unwrap();
    assert!(vec3_approx_eq(b.min, Vec3::new(-1.0, 0.0, 5.0), 1e-6));
    assert!(vec3_approx_eq(b.max, Vec3::new(3.0, 2.0, 7.0), 1e-6));
    assert!(vec3_approx_eq(b.center(), Vec3::new(1.0, 1.0, 6.0), 1e-6));
    assert!(vec3_approx_eq(b.size(), Vec3::new(4.0, 2.0, 2.0), 1e-6));
}
