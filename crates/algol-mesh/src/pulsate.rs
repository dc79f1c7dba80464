// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Displacement-plus-temperature pulsation perturbation.
//!
//! Modes are applied to a finished mesh: each face centre direction is
//! evaluated on the real spherical-harmonic pattern of the mode and the
//! temperatures and radii are modulated accordingly. This is a geometric
//! perturbation, not a physical oscillation model.

use glam::DVec3;

use algol_bodies::Pulsation;

use crate::fields::{SurfaceFields, to_own_frame};
use crate::mesh::SurfaceMesh;

/// Associated Legendre polynomial `P_l^m(x)` for non-negative `m <= l`.
fn legendre_assoc(l: u32, m: u32, x: f64) -> f64 {
    // P_m^m by the closed form, then upward recurrence in l
    let mut pmm = 1.0;
    if m > 0 {
        let somx2 = ((1.0 - x) * (1.0 + x)).sqrt();
        let mut fact = 1.0;
        for _ in 0..m {
            pmm *= -fact * somx2;
            fact += 2.0;
        }
    }
    if l == m {
        return pmm;
    }
    let mut pmmp1 = x * (2.0 * m as f64 + 1.0) * pmm;
    if l == m + 1 {
        return pmmp1;
    }
    let mut pll = 0.0;
    for ll in (m + 2)..=l {
        let llf = ll as f64;
        let mf = m as f64;
        pll = (x * (2.0 * llf - 1.0) * pmmp1 - (llf + mf - 1.0) * pmm) / (llf - mf);
        pmm = pmmp1;
        pmmp1 = pll;
    }
    pll
}

/// Real surface pattern of mode `(l, m)` at direction `(phi, theta)` and
/// temporal phase `psi` (radians).
fn mode_pattern(pulsation: &Pulsation, phi: f64, theta: f64, psi: f64) -> f64 {
    let m = pulsation.order.unsigned_abs();
    let legendre = legendre_assoc(pulsation.degree, m, theta.cos());
    legendre * (m as f64 * phi + psi).cos()
}

/// Applies every mode of `pulsations` to the mesh and fields in place.
///
/// `time` is seconds since the reference epoch; `distance`/`secondary`
/// locate the component in the system frame.
pub fn apply_pulsations(
    mesh: &mut SurfaceMesh,
    fields: &mut SurfaceFields,
    pulsations: &[Pulsation],
    time: f64,
    distance: f64,
    secondary: bool,
) {
    if pulsations.is_empty() {
        return;
    }
    let displace = |p: DVec3, time: f64| -> DVec3 {
        let own = to_own_frame(p, distance, secondary);
        let rho = own.length();
        if rho == 0.0 {
            return p;
        }
        let theta = (own.z / rho).acos();
        let phi = own.y.atan2(own.x);
        let mut factor = 1.0;
        for mode in pulsations {
            let psi = std::f64::consts::TAU * mode.frequency * time + mode.phase;
            factor += mode.displacement_amplitude * mode_pattern(mode, phi, theta, psi);
        }
        let own_new = own * factor;
        if secondary {
            DVec3::new(distance - own_new.x, own_new.y, own_new.z)
        } else {
            own_new
        }
    };

    for p in &mut mesh.points {
        *p = displace(*p, time);
    }
    // pulsations break mirror symmetry in general
    mesh.symmetry = None;

    // displaced points invalidate the face geometry
    let com = if secondary {
        DVec3::new(distance, 0.0, 0.0)
    } else {
        DVec3::ZERO
    };
    for face in 0..mesh.faces.len() {
        let [a, b, c] = mesh.face_points(face);
        let cross = (b - a).cross(c - a);
        let centre = (a + b + c) / 3.0;
        let mut normal = cross.normalize_or_zero();
        if normal.dot(centre - com) < 0.0 {
            normal = -normal;
        }
        fields.centres[face] = centre;
        fields.normals[face] = normal;
        fields.areas[face] = 0.5 * cross.length();
    }

    for (face, t) in fields.temperatures.iter_mut().enumerate() {
        let own = to_own_frame(fields.centres[face], distance, secondary);
        let rho = own.length();
        let theta = (own.z / rho).acos();
        let phi = own.y.atan2(own.x);
        let mut factor = 1.0;
        for mode in pulsations {
            let psi = std::f64::consts::TAU * mode.frequency * time + mode.phase;
            factor += mode.amplitude * mode_pattern(mode, phi, theta, psi);
        }
        *t *= factor;
    }
}
