// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Per-face surface fields: areas, outward normals, effective gravity and
//! effective temperature.

use glam::DVec3;

use algol_roche::potential::RochePotential;
use algol_units::constants::GRAVITATIONAL_CONSTANT;
use algol_units::log10_cgs_gravity;

use crate::mesh::SurfaceMesh;

/// Inputs of the field pass for one component.
#[derive(Clone, Copy, Debug)]
pub struct FieldParams<'a> {
    pub potential: &'a RochePotential,
    /// Centre-to-centre separation in units of a.
    pub distance: f64,
    /// Whether the mesh was reflected into the secondary's place.
    pub secondary: bool,
    /// Component mass in kilograms.
    pub mass: f64,
    /// Semi-major axis in metres.
    pub semi_major_axis: f64,
    pub t_eff: f64,
    pub gravity_darkening: f64,
    pub polar_radius: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceFields {
    pub centres: Vec<DVec3>,
    /// Unit outward normals.
    pub normals: Vec<DVec3>,
    /// Face areas in units of a².
    pub areas: Vec<f64>,
    /// Raw potential-gradient magnitudes at face centres.
    pub gradients: Vec<f64>,
    /// log10 of the effective surface gravity in cgs.
    pub log_g: Vec<f64>,
    /// Effective temperatures in kelvins, spot factors applied.
    pub temperatures: Vec<f64>,
}

impl SurfaceFields {
    pub fn total_area(&self) -> f64 {
        self.areas.iter().sum()
    }
}

/// Transforms a system-frame point into the component's own frame (component
/// at the origin, companion towards +x).
pub fn to_own_frame(p: DVec3, distance: f64, secondary: bool) -> DVec3 {
    if secondary {
        DVec3::new(distance - p.x, p.y, p.z)
    } else {
        p
    }
}

/// Computes every surface field for `mesh`. `spot_factor` returns the
/// temperature factor of a face (1.0 off-spot). Scalar fields are computed
/// on the base faces and broadcast when the mesh still carries its symmetry.
pub fn compute(
    mesh: &SurfaceMesh,
    params: &FieldParams,
    spot_factor: impl Fn(usize) -> f64,
) -> SurfaceFields {
    let n = mesh.faces.len();
    let com = if params.secondary {
        DVec3::new(params.distance, 0.0, 0.0)
    } else {
        DVec3::ZERO
    };

    let mut centres = Vec::with_capacity(n);
    let mut normals = Vec::with_capacity(n);
    let mut areas = Vec::with_capacity(n);
    for face in 0..n {
        let [a, b, c] = mesh.face_points(face);
        let cross = (b - a).cross(c - a);
        let centre = (a + b + c) / 3.0;
        let mut normal = cross.normalize_or_zero();
        if normal.dot(centre - com) < 0.0 {
            normal = -normal;
        }
        centres.push(centre);
        normals.push(normal);
        areas.push(0.5 * cross.length());
    }

    // gradient magnitudes are mirror-symmetric: evaluate canonical faces only
    let gradients: Vec<f64> = match &mesh.symmetry {
        Some(symmetry) => {
            let base: Vec<f64> = (0..symmetry.base_face_count)
                .map(|f| gradient_magnitude(params, centres[f]))
                .collect();
            symmetry.face_map.iter().map(|&f| base[f]).collect()
        }
        None => centres
            .iter()
            .map(|&c| gradient_magnitude(params, c))
            .collect(),
    };

    // scale so the pole carries the physical polar gravity
    let pole = DVec3::new(0.0, 0.0, params.polar_radius);
    let polar_gradient = params.potential.gradient(pole, params.distance).length();
    let polar_gravity =
        GRAVITATIONAL_CONSTANT * params.mass / params.semi_major_axis.powi(2) * polar_gradient;
    let scaling = polar_gravity / polar_gradient;
    let log_g: Vec<f64> = gradients
        .iter()
        .map(|&g| log10_cgs_gravity(scaling * g))
        .collect();

    // von Zeipel temperatures against the area-weighted mean gradient
    let total_area: f64 = areas.iter().sum();
    let mean_gradient: f64 = gradients
        .iter()
        .zip(&areas)
        .map(|(&g, &s)| g * s)
        .sum::<f64>()
        / total_area;
    let temperatures: Vec<f64> = gradients
        .iter()
        .enumerate()
        .map(|(face, &g)| {
            params.t_eff * (g / mean_gradient).powf(params.gravity_darkening) * spot_factor(face)
        })
        .collect();

    SurfaceFields {
        centres,
        normals,
        areas,
        gradients,
        log_g,
        temperatures,
    }
}

fn gradient_magnitude(params: &FieldParams, centre: DVec3) -> f64 {
    let own = to_own_frame(centre, params.distance, params.secondary);
    params.potential.gradient(own, params.distance).length()
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;

    use algol_roche::surface::EquipotentialSolver;

    use super::*;
    use crate::mesh::mesh_detached;

    fn setup() -> (SurfaceMesh, RochePotential, f64) {
        let omega = RochePotential::primary(0.5, 1.0);
        let solver = EquipotentialSolver::new(&omega, 10.0);
        let polar = solver.polar_radius(1.0).unwrap();
        let mesh = mesh_detached(&solver, 1.0, 10f64.to_radians(), false).unwrap();
        (mesh, omega, polar)
    }

    fn params<'a>(omega: &'a RochePotential, polar: f64) -> FieldParams<'a> {
        FieldParams {
            potential: omega,
            distance: 1.0,
            secondary: false,
            mass: 2.0 * 1.988_47e30,
            semi_major_axis: 6.7e9,
            t_eff: 5000.0,
            gravity_darkening: 1.0,
            polar_radius: polar,
        }
    }

    #[test]
    fn test_normals_point_outward() {
        let (mesh, omega, polar) = setup();
        let fields = compute(&mesh, &params(&omega, polar), |_| 1.0);
        for (centre, normal) in fields.centres.iter().zip(&fields.normals) {
            assert!(normal.dot(*centre) > 0.0);
            assert_float_eq!(normal.length(), 1.0, abs <= 1e-12);
        }
    }

    #[test]
    fn test_area_close_to_sphere() {
        // an Omega = 10 primary is nearly spherical with rho ~ 1/9.5
        let (mesh, omega, polar) = setup();
        let fields = compute(&mesh, &params(&omega, polar), |_| 1.0);
        let radius: f64 = fields.centres.iter().map(|c| c.length()).sum::<f64>()
            / fields.centres.len() as f64;
        let sphere = 4.0 * std::f64::consts::PI * radius * radius;
        // the inscribed triangulation undershoots the smooth surface slightly
        let ratio = fields.total_area() / sphere;
        assert!(ratio > 0.97 && ratio < 1.01, "area ratio {ratio}");
    }

    #[test]
    fn test_temperatures_average_to_t_eff() {
        let (mesh, omega, polar) = setup();
        let fields = compute(&mesh, &params(&omega, polar), |_| 1.0);
        let mean: f64 = fields
            .temperatures
            .iter()
            .zip(&fields.areas)
            .map(|(&t, &s)| t * s)
            .sum::<f64>()
            / fields.total_area();
        // beta = 1 with small gravity spread keeps the mean at t_eff
        assert_float_eq!(mean, 5000.0, rel <= 1e-2);
        // near-spherical star: tiny temperature spread
        for &t in &fields.temperatures {
            assert!((t - 5000.0).abs() < 50.0);
        }
    }

    #[test]
    fn test_polar_log_g_matches_mass() {
        let (mesh, omega, polar) = setup();
        let p = params(&omega, polar);
        let fields = compute(&mesh, &p, |_| 1.0);
        // faces nearest the pole carry log g close to the analytic value
        let polar_gravity = GRAVITATIONAL_CONSTANT * p.mass
            / (polar * p.semi_major_axis).powi(2);
        let expected = log10_cgs_gravity(polar_gravity);
        let (pole_face, _) = fields
            .centres
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.z.total_cmp(&b.z))
            .unwrap();
        assert_float_eq!(fields.log_g[pole_face], expected, abs <= 0.05);
    }

    #[test]
    fn test_spot_factor_applied() {
        let (mesh, omega, polar) = setup();
        let plain = compute(&mesh, &params(&omega, polar), |_| 1.0);
        let spotted = compute(&mesh, &params(&omega, polar), |f| {
            if f == 0 { 0.9 } else { 1.0 }
        });
        assert_float_eq!(
            spotted.temperatures[0],
            0.9 * plain.temperatures[0],
            rel <= 1e-12
        );
        assert_float_eq!(spotted.temperatures[1], plain.temperatures[1], rel <= 1e-12);
    }
}
