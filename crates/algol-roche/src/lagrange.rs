// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Lagrange points, critical potentials and libration potentials.

use std::f64::consts::FRAC_PI_2;

use thiserror::Error;

use algol_math::roots::{FindRootWithDerivative, Newton};

use crate::potential::RochePotential;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum LagrangeError {
    #[error("Lagrange scan located {0} collinear equilibria instead of 3")]
    MissingRoots(usize),
    #[error("critical potential solver did not converge")]
    Convergence,
}

/// x-coordinates of the collinear equilibria, measured from the primary in
/// units of the semi-major axis. `l1` lies between the centres, `l3` behind
/// the primary, `l2` beyond the secondary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LagrangePoints {
    pub l3: f64,
    pub l1: f64,
    pub l2: f64,
}

/// Synchronous d(Omega)/dx along the line of centres.
fn synchronous_derivative_x(x: f64, q: f64, d: f64) -> f64 {
    let r3 = x.abs().powi(3);
    let rw3 = (d - x).abs().powi(3);
    -x / r3 + q * (d - x) / rw3 + (q + 1.0) * x - q / (d * d)
}

fn synchronous_second_derivative_x(x: f64, q: f64, d: f64) -> f64 {
    2.0 / x.abs().powi(3) + 2.0 * q / (d - x).abs().powi(3) + q + 1.0
}

/// Locates L3, L1 and L2 for mass ratio `q` at separation `d`.
///
/// The interval `[-3d, 3d]` is scanned on 100 samples and every sample seeds
/// a Newton polish; roots are deduplicated to five decimal places. The scan
/// guarantees all three roots are bracketed regardless of `q`.
pub fn lagrangian_points(q: f64, d: f64) -> Result<LagrangePoints, LagrangeError> {
    const SAMPLES: usize = 100;
    let newton = Newton::new(100, 1e-12);
    let mut keys: Vec<i64> = Vec::with_capacity(3);
    let mut roots: Vec<f64> = Vec::with_capacity(3);

    for i in 0..SAMPLES {
        let seed = -3.0 * d + 6.0 * d * i as f64 / (SAMPLES - 1) as f64;
        if seed.abs() < 1e-6 || (d - seed).abs() < 1e-6 {
            continue;
        }
        let Ok(root) = newton.find_with_derivative(
            |x| synchronous_derivative_x(x, q, d),
            |x| synchronous_second_derivative_x(x, q, d),
            seed,
        ) else {
            continue;
        };
        if !root.is_finite() || synchronous_derivative_x(root, q, d).abs() > 1e-4 {
            continue;
        }
        let key = (root * 1e5).round() as i64;
        if keys.contains(&key) {
            continue;
        }
        keys.push(key);
        roots.push(root);
        if roots.len() == 3 {
            break;
        }
    }

    if roots.len() != 3 {
        return Err(LagrangeError::MissingRoots(roots.len()));
    }
    roots.sort_by(f64::total_cmp);
    Ok(LagrangePoints {
        l3: roots[0],
        l1: roots[1],
        l2: roots[2],
    })
}

/// Synchronous potential on the line of centres; negative `x` is resolved as
/// azimuth pi.
fn axis_potential(omega: &RochePotential, x: f64, d: f64) -> f64 {
    if x >= 0.0 {
        omega.value(x, 0.0, FRAC_PI_2, d)
    } else {
        omega.value(-x, std::f64::consts::PI, FRAC_PI_2, d)
    }
}

/// Potentials at L3, L1 and L2 for the synchronous circular configuration.
pub fn libration_potentials(q: f64, d: f64) -> Result<[f64; 3], LagrangeError> {
    let points = lagrangian_points(q, d)?;
    let omega = RochePotential::primary(q, 1.0);
    Ok([
        axis_potential(&omega, points.l3, d),
        axis_potential(&omega, points.l1, d),
        axis_potential(&omega, points.l2, d),
    ])
}

/// Critical surface potential of one component at separation `d`.
///
/// Finds the root of the component's own asynchronous dOmega/dx from seed
/// 1e-6 and evaluates |Omega| there, from that component's frame.
pub fn critical_potential(omega: &RochePotential, d: f64) -> Result<f64, LagrangeError> {
    let newton = Newton::new(100, 1e-12);
    let x = newton
        .find_with_derivative(
            |x| omega.derivative_x(x, d),
            |x| omega.second_derivative_x(x, d),
            1e-6,
        )
        .map_err(|_| LagrangeError::Convergence)?;
    if !x.is_finite() {
        return Err(LagrangeError::Convergence);
    }
    let rho = match omega.frame() {
        crate::potential::Frame::Primary => x,
        crate::potential::Frame::Secondary => d - x,
    };
    Ok(omega.value(rho, 0.0, FRAC_PI_2, d).abs())
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;

    use super::*;

    #[test]
    fn test_equal_masses_symmetric_points() {
        let points = lagrangian_points(1.0, 1.0).unwrap();
        assert_float_eq!(points.l1, 0.5, abs <= 1e-8);
        // L2 and L3 are mirror images through the midpoint
        assert_float_eq!(points.l2 - 0.5, 0.5 - points.l3, abs <= 1e-8);
    }

    #[test]
    fn test_points_ordering() {
        let points = lagrangian_points(0.5, 1.0).unwrap();
        assert!(points.l3 < 0.0);
        assert!(points.l1 > 0.0 && points.l1 < 1.0);
        assert!(points.l2 > 1.0);
    }

    #[test]
    fn test_reference_points_half_mass_ratio() {
        // q = 0.5, d = 1: values cross-checked against the classic tables
        let points = lagrangian_points(0.5, 1.0).unwrap();
        assert_float_eq!(points.l1, 0.5707515715, abs <= 1e-8);
        assert_float_eq!(points.l3, -0.8030279607, abs <= 1e-8);
        assert_float_eq!(points.l2, 1.5823807222, abs <= 1e-8);
    }

    #[test]
    fn test_critical_potential_synchronous() {
        // q = 0.5, F = 1, d = 1: both components share the L1 surface value
        let primary = RochePotential::primary(0.5, 1.0);
        let secondary = RochePotential::secondary(0.5, 1.0);
        let crit_p = critical_potential(&primary, 1.0).unwrap();
        let crit_s = critical_potential(&secondary, 1.0).unwrap();
        assert_float_eq!(crit_p, 2.87584463214, abs <= 1e-9);
        assert_float_eq!(crit_s, 2.87584463214, abs <= 1e-9);
    }

    #[test]
    fn test_critical_potential_asynchronous_eccentric() {
        // q = 0.5, F1 = 1.7, F2 = 1.3 at periastron of e = 0.1
        let d = 0.9;
        let primary = RochePotential::primary(0.5, 1.7);
        let secondary = RochePotential::secondary(0.5, 1.3);
        assert_float_eq!(
            critical_potential(&primary, d).unwrap(),
            3.47688032078,
            abs <= 1e-9
        );
        assert_float_eq!(
            critical_potential(&secondary, d).unwrap(),
            3.20273942184,
            abs <= 1e-9
        );
    }

    #[test]
    fn test_libration_ordering() {
        let [l3, l1, l2] = libration_potentials(0.5, 1.0).unwrap();
        // the inner critical surface carries the highest potential
        assert!(l1 > l2);
        assert!(l1 > 0.0 && l2 > 0.0 && l3 > 0.0);
    }
}
