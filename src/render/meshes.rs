use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use super::MeshKind;

/// Floats per interleaved vertex: `position.xyz`, `normal.xyz`, `uv`.
pub const FLOATS_PER_VERTEX: usize = 8;

const RADIAL_SEGMENTS: u32 = 36;
const SPHERE_RINGS: u32 = 18;
const TORUS_TUBE_SEGMENTS: u32 = 18;
const TORUS_TUBE_RADIUS: f32 = 0.25;

/// CPU side geometry ready for upload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / FLOATS_PER_VERTEX
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3, uv: Vec2) -> u32 {
        let index = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&[
            position.x, position.y, position.z, normal.x, normal.y, normal.z, uv.x, uv.y,
        ]);
        index
    }

    fn push_quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.indices.extend_from_slice(&[a, b, c, a, c, d]);
    }
}

/// Builds the unit-sized geometry for `kind`.
///
/// Plane spans [-1, 1] on X and Z facing +Y. Box is a unit cube centred on the
/// origin. Cylinder has radius 1 and runs from y = 0 to y = 1. Sphere has
/// radius 1. Torus has a major radius of 1.
pub fn build(kind: MeshKind) -> MeshData {
    match kind {
        MeshKind::Plane => plane(),
        MeshKind::Box => cube(),
        MeshKind::Cylinder => cylinder(),
        MeshKind::Sphere => sphere(),
        MeshKind::Torus => torus(),
    }
}

fn plane() -> MeshData {
    let mut mesh = MeshData::default();
    let normal = Vec3::Y;
    let a = mesh.push_vertex(Vec3::new(-1.0, 0.0, 1.0), normal, Vec2::new(0.0, 0.0));
    let b = mesh.push_vertex(Vec3::new(1.0, 0.0, 1.0), normal, Vec2::new(1.0, 0.0));
    let c = mesh.push_vertex(Vec3::new(1.0, 0.0, -1.0), normal, Vec2::new(1.0, 1.0));
    let d = mesh.push_vertex(Vec3::new(-1.0, 0.0, -1.0), normal, Vec2::new(0.0, 1.0));
    mesh.push_quad(a, b, c, d);
    mesh
}

fn cube() -> MeshData {
    // (normal, u axis, v axis) per face, counter-clockwise seen from outside.
    const FACES: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    ];
    let mut mesh = MeshData::default();
    for (normal, u, v) in FACES {
        let centre = normal * 0.5;
        let corner = |su: f32, sv: f32| centre + u * (su * 0.5) + v * (sv * 0.5);
        let a = mesh.push_vertex(corner(-1.0, -1.0), normal, Vec2::new(0.0, 0.0));
        let b = mesh.push_vertex(corner(1.0, -1.0), normal, Vec2::new(1.0, 0.0));
        let c = mesh.push_vertex(corner(1.0, 1.0), normal, Vec2::new(1.0, 1.0));
        let d = mesh.push_vertex(corner(-1.0, 1.0), normal, Vec2::new(0.0, 1.0));
        mesh.push_quad(a, b, c, d);
    }
    mesh
}

fn cylinder() -> MeshData {
    let mut mesh = MeshData::default();
    let segments = RADIAL_SEGMENTS;

    // side wall
    let mut ring = Vec::with_capacity(segments as usize + 1);
    for i in 0..=segments {
        let t = i as f32 / segments as f32;
        let (sin, cos) = (t * TAU).sin_cos();
        let normal = Vec3::new(cos, 0.0, sin);
        let bottom = mesh.push_vertex(normal, normal, Vec2::new(t, 0.0));
        let top = mesh.push_vertex(normal + Vec3::Y, normal, Vec2::new(t, 1.0));
        ring.push((bottom, top));
    }
    for pair in ring.windows(2) {
        let (b0, t0) = pair[0];
        let (b1, t1) = pair[1];
        mesh.push_quad(b0, t0, t1, b1);
    }

    // caps
    for (y, normal) in [(0.0, Vec3::NEG_Y), (1.0, Vec3::Y)] {
        let centre = mesh.push_vertex(Vec3::new(0.0, y, 0.0), normal, Vec2::splat(0.5));
        let rim: Vec<u32> = (0..=segments)
            .map(|i| {
                let (sin, cos) = (i as f32 / segments as f32 * TAU).sin_cos();
                mesh.push_vertex(
                    Vec3::new(cos, y, sin),
                    normal,
                    Vec2::new(0.5 + cos * 0.5, 0.5 + sin * 0.5),
                )
            })
            .collect();
        for pair in rim.windows(2) {
            if normal.y > 0.0 {
                mesh.indices.extend_from_slice(&[centre, pair[1], pair[0]]);
            } else {
                mesh.indices.extend_from_slice(&[centre, pair[0], pair[1]]);
            }
        }
    }
    mesh
}

fn sphere() -> MeshData {
    let mut mesh = MeshData::default();
    let columns = RADIAL_SEGMENTS + 1;
    for ring in 0..=SPHERE_RINGS {
        let v = ring as f32 / SPHERE_RINGS as f32;
        let (sin_phi, cos_phi) = (v * PI).sin_cos();
        for segment in 0..=RADIAL_SEGMENTS {
            let u = segment as f32 / RADIAL_SEGMENTS as f32;
            let (sin_theta, cos_theta) = (u * TAU).sin_cos();
            let normal = Vec3::new(sin_phi * cos_theta, cos_phi, sin_phi * sin_theta);
            mesh.push_vertex(normal, normal, Vec2::new(u, 1.0 - v));
        }
    }
    for ring in 0..SPHERE_RINGS {
        for segment in 0..RADIAL_SEGMENTS {
            let a = ring * columns + segment;
            let b = a + columns;
            mesh.push_quad(a, a + 1, b + 1, b);
        }
    }
    mesh
}

fn torus() -> MeshData {
    let mut mesh = MeshData::default();
    let columns = TORUS_TUBE_SEGMENTS + 1;
    for i in 0..=RADIAL_SEGMENTS {
        let u = i as f32 / RADIAL_SEGMENTS as f32;
        let (sin_u, cos_u) = (u * TAU).sin_cos();
        let centre = Vec3::new(cos_u, 0.0, sin_u);
        for j in 0..=TORUS_TUBE_SEGMENTS {
            let v = j as f32 / TORUS_TUBE_SEGMENTS as f32;
            let (sin_v, cos_v) = (v * TAU).sin_cos();
            let normal = centre * cos_v + Vec3::Y * sin_v;
            mesh.push_vertex(centre + normal * TORUS_TUBE_RADIUS, normal, Vec2::new(u, v));
        }
    }
    for i in 0..RADIAL_SEGMENTS {
        for j in 0..TORUS_TUBE_SEGMENTS {
            let a = i * columns + j;
            let b = a + columns;
            mesh.push_quad(a, a + 1, b + 1, b);
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_primitive_has_valid_indices_and_unit_normals() {
        for kind in MeshKind::ALL {
            let mesh = build(kind);
            assert!(!mesh.indices.is_empty(), "{} has no triangles", kind.name());
            assert_eq!(mesh.indices.len() % 3, 0);
            let count = mesh.vertex_count() as u32;
            assert!(mesh.indices.iter().all(|&i| i < count));
            for chunk in mesh.vertices.chunks_exact(FLOATS_PER_VERTEX) {
                let normal = Vec3::new(chunk[3], chunk[4], chunk[5]);
                assert!((normal.length() - 1.0).abs() < 1e-4, "{}", kind.name());
            }
        }
    }

    #[test]
    fn cube_fits_unit_bounds() {
        let mesh = build(MeshKind::Box);
        assert_eq!(mesh.vertex_count(), 24);
        for chunk in mesh.vertices.chunks_exact(FLOATS_PER_VERTEX) {
            assert!(chunk[..3].iter().all(|c| c.abs() <= 0.5 + 1e-6));
        }
    }

    #[test]
    fn cube_winding_faces_outward() {
        let mesh = build(MeshKind::Box);
        for tri in mesh.indices.chunks_exact(3) {
            let p = |i: u32| Vec3::from_slice(&mesh.vertices[i as usize * 8..i as usize * 8 + 3]);
            let n = Vec3::from_slice(&mesh.vertices[tri[0] as usize * 8 + 3..tri[0] as usize * 8 + 6]);
            let face = (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]));
            assert!(face.dot(n) > 0.0);
        }
    }
}
