// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Surface discretisation of Roche equipotentials.
//!
//! Detached surfaces are discretised on one quadrant (y >= 0, z >= 0) and
//! replicated through the xy and xz mirror planes; over-contact surfaces
//! keep only the xy mirror, with the neck region generated in cylindrical
//! coordinates and stitched through a sphere-projection hull.

use std::f64::consts::{FRAC_PI_2, PI};

use glam::DVec3;

use algol_roche::surface::EquipotentialSolver;

use crate::MeshError;
use crate::hull::convex_hull;

/// Absolute tolerance for "lies in a symmetry plane" tests.
const PLANE_TOL: f64 = 1e-8;

/// Index bookkeeping of a symmetric mesh.
///
/// Base points and faces occupy a contiguous prefix; `point_map`/`face_map`
/// send every full index to its canonical image, so symmetric per-point or
/// per-face fields can be computed on the base and broadcast.
#[derive(Clone, Debug, PartialEq)]
pub struct Symmetry {
    pub base_point_count: usize,
    pub base_face_count: usize,
    pub point_map: Vec<usize>,
    pub face_map: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceMesh {
    pub points: Vec<DVec3>,
    pub faces: Vec<[usize; 3]>,
    /// Present for spotless meshes; spot insertion invalidates it.
    pub symmetry: Option<Symmetry>,
}

impl SurfaceMesh {
    pub fn face_points(&self, face: usize) -> [DVec3; 3] {
        let [a, b, c] = self.faces[face];
        [self.points[a], self.points[b], self.points[c]]
    }

    /// V - E + F of the triangulated surface; 2 for a closed manifold.
    pub fn euler_characteristic(&self) -> i64 {
        use std::collections::HashSet;
        let mut edges: HashSet<(usize, usize)> = HashSet::new();
        for &[a, b, c] in &self.faces {
            for (s, t) in [(a, b), (b, c), (c, a)] {
                edges.insert((s.min(t), s.max(t)));
            }
        }
        let used: HashSet<usize> = self.faces.iter().flatten().copied().collect();
        used.len() as i64 - edges.len() as i64 + self.faces.len() as i64
    }
}

pub fn spherical_to_cartesian(rho: f64, phi: f64, theta: f64) -> DVec3 {
    DVec3::new(
        rho * phi.cos() * theta.sin(),
        rho * phi.sin() * theta.sin(),
        rho * theta.cos(),
    )
}

fn linspace(a: f64, b: f64, n: usize, endpoint: bool) -> Vec<f64> {
    if n == 0 {
        return vec![];
    }
    if n == 1 {
        return vec![a];
    }
    let div = if endpoint { n - 1 } else { n } as f64;
    (0..n).map(|i| a + (b - a) * i as f64 / div).collect()
}

fn mirror_y(p: DVec3) -> DVec3 {
    DVec3::new(p.x, -p.y, p.z)
}

fn mirror_z(p: DVec3) -> DVec3 {
    DVec3::new(p.x, p.y, -p.z)
}

/// Quadrant point groups of a detached surface, in the component's own frame.
struct Quadrant {
    /// Equator arc phi in [0, pi] at theta = pi/2; endpoints lie on the
    /// x-axis.
    equator: Vec<DVec3>,
    /// Meridian arcs in the y = 0 plane, pole included.
    meridian: Vec<DVec3>,
    /// Interior points with y > 0, z > 0.
    interior: Vec<DVec3>,
}

fn detached_quadrant(
    solver: &EquipotentialSolver,
    d: f64,
    alpha: f64,
) -> Result<Quadrant, MeshError> {
    let n_eq = (PI / alpha).floor() as usize;
    let mut equator = Vec::with_capacity(n_eq + 1);
    for phi in linspace(0.0, PI, n_eq + 1, true) {
        let rho = solver.radius(d, phi, FRAC_PI_2)?;
        equator.push(spherical_to_cartesian(rho, phi, FRAC_PI_2));
    }

    let n_mer = (FRAC_PI_2 / alpha).floor() as usize;
    let mut meridian = Vec::with_capacity(2 * n_mer);
    for theta in linspace(FRAC_PI_2 - alpha, alpha, n_mer - 1, true) {
        let rho = solver.radius(d, PI, theta)?;
        meridian.push(spherical_to_cartesian(rho, PI, theta));
    }
    for theta in linspace(0.0, FRAC_PI_2, n_mer, false) {
        let rho = solver.radius(d, 0.0, theta)?;
        meridian.push(spherical_to_cartesian(rho, 0.0, theta));
    }

    let mut interior = Vec::new();
    for theta in linspace(alpha, FRAC_PI_2, n_mer, false) {
        let corrected = alpha / theta.sin();
        let n_phi = (PI / corrected).floor() as usize;
        let step = PI / (n_phi + 1) as f64;
        for i in 1..=n_phi {
            let phi = step * i as f64;
            let rho = solver.radius(d, phi, theta)?;
            interior.push(spherical_to_cartesian(rho, phi, theta));
        }
    }

    Ok(Quadrant {
        equator,
        meridian,
        interior,
    })
}

/// Builds the four mirror maps of the detached quadrant layout and the full
/// point list. Points on a mirror plane map to themselves.
fn replicate_quadrant(quadrant: &Quadrant) -> (Vec<DVec3>, [Vec<usize>; 4], usize) {
    let n_eq = quadrant.equator.len();
    let n_mer = quadrant.meridian.len();
    let n_int = quadrant.interior.len();
    let base: usize = n_eq + n_mer + n_int;

    let mut points: Vec<DVec3> = Vec::with_capacity(base + (n_eq - 2) + n_mer + 3 * n_int);
    points.extend_from_slice(&quadrant.equator);
    points.extend_from_slice(&quadrant.meridian);
    points.extend_from_slice(&quadrant.interior);

    let eq_y_start = points.len();
    points.extend(quadrant.equator[1..n_eq - 1].iter().map(|&p| mirror_y(p)));
    let mer_z_start = points.len();
    points.extend(quadrant.meridian.iter().map(|&p| mirror_z(p)));
    let int_y_start = points.len();
    points.extend(quadrant.interior.iter().map(|&p| mirror_y(p)));
    let int_z_start = points.len();
    points.extend(quadrant.interior.iter().map(|&p| mirror_z(p)));
    let int_yz_start = points.len();
    points.extend(
        quadrant
            .interior
            .iter()
            .map(|&p| mirror_y(mirror_z(p))),
    );

    let identity: Vec<usize> = (0..base).collect();

    let mut map_y = identity.clone();
    for i in 1..n_eq - 1 {
        map_y[i] = eq_y_start + i - 1;
    }
    for i in 0..n_int {
        map_y[n_eq + n_mer + i] = int_y_start + i;
    }

    let mut map_z = identity.clone();
    for i in 0..n_mer {
        map_z[n_eq + i] = mer_z_start + i;
    }
    for i in 0..n_int {
        map_z[n_eq + n_mer + i] = int_z_start + i;
    }

    let mut map_yz = identity.clone();
    for i in 1..n_eq - 1 {
        map_yz[i] = eq_y_start + i - 1;
    }
    for i in 0..n_mer {
        map_yz[n_eq + i] = mer_z_start + i;
    }
    for i in 0..n_int {
        map_yz[n_eq + n_mer + i] = int_yz_start + i;
    }

    (points, [identity, map_y, map_z, map_yz], base)
}

fn in_plane(points: &[DVec3], face: &[usize; 3], axis: usize) -> bool {
    face.iter().all(|&v| points[v][axis].abs() < PLANE_TOL)
}

/// Propagates base faces through mirror maps and assembles the symmetry
/// bookkeeping.
fn propagate_faces(
    points: Vec<DVec3>,
    base_points: usize,
    base_faces: Vec<[usize; 3]>,
    mirror_maps: &[Vec<usize>],
) -> SurfaceMesh {
    let base_face_count = base_faces.len();
    let mut faces = Vec::with_capacity(base_face_count * mirror_maps.len());
    let mut face_map = Vec::with_capacity(base_face_count * mirror_maps.len());
    for map in mirror_maps {
        for (fi, &[a, b, c]) in base_faces.iter().enumerate() {
            faces.push([map[a], map[b], map[c]]);
            face_map.push(fi);
        }
    }

    let mut point_map: Vec<usize> = (0..points.len()).collect();
    for map in mirror_maps {
        for (base_idx, &full_idx) in map.iter().enumerate() {
            point_map[full_idx] = base_idx;
        }
    }

    SurfaceMesh {
        points,
        faces,
        symmetry: Some(Symmetry {
            base_point_count: base_points,
            base_face_count,
            point_map,
            face_map,
        }),
    }
}

/// Surface mesh of a detached or semi-detached component.
///
/// `secondary` components are reflected into the system frame via
/// `x -> d - x` after replication.
pub fn mesh_detached(
    solver: &EquipotentialSolver,
    d: f64,
    alpha: f64,
    secondary: bool,
) -> Result<SurfaceMesh, MeshError> {
    if !(alpha > 0.0 && alpha < FRAC_PI_2) {
        return Err(MeshError::InvalidInput(format!(
            "discretization factor must lie in (0, pi/2), got {alpha}"
        )));
    }
    let quadrant = detached_quadrant(solver, d, alpha)?;
    let (points, mirror_maps, base_points) = replicate_quadrant(&quadrant);

    let base_faces: Vec<[usize; 3]> = convex_hull(&points[..base_points])
        .map_err(|e| MeshError::Malformed(e.to_string()))?
        .into_iter()
        .filter(|f| !in_plane(&points, f, 1) && !in_plane(&points, f, 2))
        .collect();
    if base_faces.is_empty() {
        return Err(MeshError::Malformed("empty quadrant triangulation".into()));
    }

    let mut mesh = propagate_faces(points, base_points, base_faces, &mirror_maps);
    if secondary {
        for p in &mut mesh.points {
            p.x = d - p.x;
        }
    }
    Ok(mesh)
}

/// Neck patch of an over-contact component in its own frame, generated in
/// cylindrical coordinates.
struct NeckPatch {
    /// Points in the equatorial plane (z = 0), y > 0.
    equatorial: Vec<DVec3>,
    /// Points in the meridian plane (y = 0), z > 0.
    meridian: Vec<DVec3>,
    /// Interior points, y > 0, z > 0.
    interior: Vec<DVec3>,
}

fn neck_patch(
    solver: &EquipotentialSolver,
    alpha: f64,
    neck: f64,
    polar_radius: f64,
) -> Result<NeckPatch, MeshError> {
    let delta_z = alpha * polar_radius;
    let n_z = (neck / delta_z).floor() as usize;
    let mut patch = NeckPatch {
        equatorial: vec![],
        meridian: vec![],
        interior: vec![],
    };
    for z in linspace(delta_z, neck, n_z, true) {
        let r_meridian = solver.radius_cylindrical(0.0, z)?;
        patch.meridian.push(DVec3::new(z, 0.0, r_meridian));
        let r_equatorial = solver.radius_cylindrical(FRAC_PI_2, z)?;
        patch.equatorial.push(DVec3::new(z, r_equatorial, 0.0));

        let n_phi = (FRAC_PI_2 * r_equatorial / delta_z).floor() as usize;
        if n_phi == 0 {
            continue;
        }
        let start = FRAC_PI_2 / n_phi as f64;
        for phi in linspace(start, FRAC_PI_2, n_phi, false) {
            let r = solver.radius_cylindrical(phi, z)?;
            patch
                .interior
                .push(DVec3::new(z, r * phi.sin(), r * phi.cos()));
        }
    }
    Ok(patch)
}

/// Far-side quarter of an over-contact component (phi in [pi/2, pi]).
fn over_contact_quarter(
    solver: &EquipotentialSolver,
    alpha: f64,
) -> Result<Quadrant, MeshError> {
    let d = 1.0;
    let n = (FRAC_PI_2 / alpha).floor() as usize;

    let mut equator = Vec::with_capacity(n + 1);
    for phi in linspace(FRAC_PI_2, PI, n + 1, true) {
        let rho = solver.radius(d, phi, FRAC_PI_2)?;
        equator.push(spherical_to_cartesian(rho, phi, FRAC_PI_2));
    }

    let mut meridian = Vec::with_capacity(n);
    for theta in linspace(FRAC_PI_2 - alpha, 0.0, n, true) {
        let rho = solver.radius(d, PI, theta)?;
        meridian.push(spherical_to_cartesian(rho, PI, theta));
    }

    let mut interior = Vec::new();
    for theta in linspace(alpha, FRAC_PI_2, n - 1, false) {
        let rho = solver.radius(d, FRAC_PI_2, theta)?;
        interior.push(spherical_to_cartesian(rho, FRAC_PI_2, theta));
        let corrected = alpha / theta.sin();
        let n_phi = (FRAC_PI_2 / corrected).floor() as usize;
        let step = FRAC_PI_2 / (n_phi + 1) as f64;
        for i in 1..=n_phi {
            let phi = FRAC_PI_2 + step * i as f64;
            let rho = solver.radius(d, phi, theta)?;
            interior.push(spherical_to_cartesian(rho, phi, theta));
        }
    }

    Ok(Quadrant {
        equator,
        meridian,
        interior,
    })
}

/// Projects an over-contact half onto a sphere-plus-cap solid so its convex
/// hull triangulates the non-convex envelope. `neck` is in the component's
/// own frame.
pub(crate) fn project_for_hull(points: &[DVec3], neck: f64) -> Vec<DVec3> {
    let radius = neck;
    let k = radius / (neck + 0.01);
    points
        .iter()
        .map(|&p| {
            if p.x <= 0.0 {
                p * (radius / p.length())
            } else {
                let r = (radius * radius - (k * p.x).powi(2)).sqrt();
                let len = (p.y * p.y + p.z * p.z).sqrt().max(f64::MIN_POSITIVE);
                DVec3::new(p.x, r * p.y / len, r * p.z / len)
            }
        })
        .collect()
}

/// Drops seam artefacts: faces whose vertices all share one x inside the
/// envelope are vertical rings left over from the hull closing the neck cut.
pub(crate) fn is_seam_face(points: &[DVec3], face: &[usize; 3], span: f64) -> bool {
    let xs = face.map(|v| points[v].x);
    let min_x = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let max_x = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (max_x - min_x).abs() < PLANE_TOL && min_x > 0.0 && max_x < span
}

/// Surface mesh of one over-contact component at unit separation.
///
/// `neck` is the global x-coordinate of the neck; the secondary's own-frame
/// extent is `1 - neck`.
pub fn mesh_over_contact(
    solver: &EquipotentialSolver,
    alpha: f64,
    neck: f64,
    secondary: bool,
) -> Result<SurfaceMesh, MeshError> {
    if !(alpha > 0.0 && alpha < FRAC_PI_2) {
        return Err(MeshError::InvalidInput(format!(
            "discretization factor must lie in (0, pi/2), got {alpha}"
        )));
    }
    let own_neck = if secondary { 1.0 - neck } else { neck };
    let polar_radius = solver.polar_radius(1.0)?;
    let quarter = over_contact_quarter(solver, alpha)?;
    let patch = neck_patch(solver, alpha, own_neck, polar_radius)?;

    // base half (z >= 0): quarter and patch plus their y-mirrors, with
    // points on the y = 0 plane kept single
    let mut points: Vec<DVec3> = Vec::new();
    let mut z_mirrored: Vec<bool> = Vec::new();
    let mut push = |points: &mut Vec<DVec3>, flags: &mut Vec<bool>, p: DVec3, mirrored: bool| {
        points.push(p);
        flags.push(mirrored);
    };

    // equator arc (z = 0): fixed under the z-mirror
    for &p in &quarter.equator {
        push(&mut points, &mut z_mirrored, p, false);
    }
    // y-mirrors of the equator, excluding the x-axis endpoint at phi = pi
    let n_eq = quarter.equator.len();
    for &p in &quarter.equator[..n_eq - 1] {
        push(&mut points, &mut z_mirrored, mirror_y(p), false);
    }
    // far-side meridian (y = 0, z > 0)
    for &p in &quarter.meridian {
        push(&mut points, &mut z_mirrored, p, true);
    }
    // interior (y != 0, z > 0) and mirrors
    for &p in &quarter.interior {
        push(&mut points, &mut z_mirrored, p, true);
        push(&mut points, &mut z_mirrored, mirror_y(p), true);
    }
    // neck equatorial ring points (z = 0)
    for &p in &patch.equatorial {
        push(&mut points, &mut z_mirrored, p, false);
        push(&mut points, &mut z_mirrored, mirror_y(p), false);
    }
    // neck meridian points (y = 0, z > 0)
    for &p in &patch.meridian {
        push(&mut points, &mut z_mirrored, p, true);
    }
    // neck interior
    for &p in &patch.interior {
        push(&mut points, &mut z_mirrored, p, true);
        push(&mut points, &mut z_mirrored, mirror_y(p), true);
    }

    let base_points = points.len();
    let mut maps: [Vec<usize>; 2] = [(0..base_points).collect(), (0..base_points).collect()];
    for i in 0..base_points {
        if z_mirrored[i] {
            maps[1][i] = points.len();
            let p = points[i];
            points.push(mirror_z(p));
        }
    }

    let projected = project_for_hull(&points[..base_points], own_neck);
    let base_faces: Vec<[usize; 3]> = convex_hull(&projected)
        .map_err(|e| MeshError::Malformed(e.to_string()))?
        .into_iter()
        .filter(|f| !in_plane(&points, f, 2) && !is_seam_face(&points, f, own_neck + PLANE_TOL))
        .collect();
    if base_faces.is_empty() {
        return Err(MeshError::Malformed(
            "empty over-contact triangulation".into(),
        ));
    }

    let mut mesh = propagate_faces(points, base_points, base_faces, &maps);
    if secondary {
        for p in &mut mesh.points {
            p.x = 1.0 - p.x;
        }
    }
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use algol_roche::potential::RochePotential;

    use super::*;

    fn detached_mesh(alpha_deg: f64) -> SurfaceMesh {
        let omega = RochePotential::primary(0.5, 1.0);
        let solver = EquipotentialSolver::new(&omega, 10.0);
        mesh_detached(&solver, 1.0, alpha_deg.to_radians(), false).unwrap()
    }

    #[test]
    fn test_detached_mesh_is_closed() {
        let mesh = detached_mesh(10.0);
        assert_eq!(mesh.euler_characteristic(), 2);
        assert_eq!(mesh.faces.len(), 2 * mesh.points.len() - 4);
    }

    #[test]
    fn test_detached_four_fold_symmetry() {
        let mesh = detached_mesh(10.0);
        let symmetry = mesh.symmetry.as_ref().unwrap();
        assert_eq!(mesh.faces.len(), 4 * symmetry.base_face_count);
        // every face maps to a base face
        assert!(symmetry.face_map.iter().all(|&f| f < symmetry.base_face_count));
        // base images of mirrored points coincide up to sign flips
        for (full, &base) in symmetry.point_map.iter().enumerate() {
            let p = mesh.points[full];
            let q = mesh.points[base];
            assert!((p.x - q.x).abs() < 1e-12);
            assert!((p.y.abs() - q.y.abs()).abs() < 1e-12);
            assert!((p.z.abs() - q.z.abs()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_detached_every_point_used() {
        let mesh = detached_mesh(10.0);
        let mut used = vec![false; mesh.points.len()];
        for f in &mesh.faces {
            for &v in f {
                used[v] = true;
            }
        }
        assert!(used.iter().all(|&u| u), "triangulation dropped points");
    }

    #[test]
    fn test_detached_face_count_scales_with_alpha() {
        let coarse = detached_mesh(10.0);
        let fine = detached_mesh(5.0);
        assert!(fine.faces.len() > 3 * coarse.faces.len());
    }

    #[test]
    fn test_detached_points_on_surface() {
        let omega = RochePotential::primary(0.5, 1.0);
        let solver = EquipotentialSolver::new(&omega, 10.0);
        let mesh = mesh_detached(&solver, 1.0, 0.2, false).unwrap();
        for p in &mesh.points {
            let rho = p.length();
            let theta = (p.z / rho).acos();
            let phi = p.y.atan2(p.x);
            let value = omega.value(rho, phi, theta, 1.0);
            assert!((value - 10.0).abs() < 1e-9, "point off surface: {value}");
        }
    }

    #[test]
    fn test_secondary_is_reflected() {
        let omega = RochePotential::secondary(0.5, 1.0);
        let solver = EquipotentialSolver::new(&omega, 10.0);
        let mesh = mesh_detached(&solver, 1.0, 0.2, true).unwrap();
        // secondary sits at x = d, so every point is near x = 1
        let mean_x: f64 =
            mesh.points.iter().map(|p| p.x).sum::<f64>() / mesh.points.len() as f64;
        assert!((mean_x - 1.0).abs() < 0.1);
    }

    fn over_contact_meshes() -> (SurfaceMesh, SurfaceMesh) {
        let primary = RochePotential::primary(0.5, 1.0);
        let secondary = RochePotential::secondary(0.5, 1.0);
        let solver_p = EquipotentialSolver::new(&primary, 2.7);
        let solver_s = EquipotentialSolver::new(&secondary, 2.7);
        let neck = algol_roche::surface::neck_position(&solver_p, &solver_s).unwrap();
        let alpha = 10f64.to_radians();
        (
            mesh_over_contact(&solver_p, alpha, neck, false).unwrap(),
            mesh_over_contact(&solver_s, alpha, neck, true).unwrap(),
        )
    }

    #[test]
    fn test_over_contact_extent() {
        let (primary, secondary) = over_contact_meshes();
        // primary occupies x < neck, secondary x > neck, meeting at the seam
        let max_p = primary.points.iter().map(|p| p.x).fold(f64::MIN, f64::max);
        let min_s = secondary.points.iter().map(|p| p.x).fold(f64::MAX, f64::min);
        assert!((max_p - min_s).abs() < 1e-6, "lobes do not meet at the neck");
        assert!(primary.points.iter().map(|p| p.x).fold(f64::MAX, f64::min) < 0.0);
        assert!(secondary.points.iter().map(|p| p.x).fold(f64::MIN, f64::max) > 1.0);
    }

    #[test]
    fn test_over_contact_two_fold_symmetry() {
        let (primary, _) = over_contact_meshes();
        let symmetry = primary.symmetry.as_ref().unwrap();
        assert_eq!(primary.faces.len(), 2 * symmetry.base_face_count);
    }

    #[test]
    fn test_over_contact_open_at_neck_only() {
        // the mesh is an open tube: boundary edges all sit on the neck ring
        let (primary, _) = over_contact_meshes();
        use std::collections::HashMap;
        let mut edge_count: HashMap<(usize, usize), usize> = HashMap::new();
        for &[a, b, c] in &primary.faces {
            for (s, t) in [(a, b), (b, c), (c, a)] {
                *edge_count.entry((s.min(t), s.max(t))).or_default() += 1;
            }
        }
        let max_x = primary.points.iter().map(|p| p.x).fold(f64::MIN, f64::max);
        for (&(s, t), &count) in &edge_count {
            assert!(count <= 2, "non-manifold edge ({s}, {t})");
            if count == 1 {
                assert!(
                    (primary.points[s].x - max_x).abs() < 1e-6
                        && (primary.points[t].x - max_x).abs() < 1e-6,
                    "boundary edge away from the neck seam"
                );
            }
        }
    }
}
