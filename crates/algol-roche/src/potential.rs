// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! The generalised (Kopal) Roche potential and its closed-form derivatives.

use glam::DVec3;

/// The component frame a potential is evaluated from.
///
/// This is a closed set: the two variants only differ in the mass ratio they
/// see and in the constant rescaling that maps the secondary's raw potential
/// onto the primary's scale, so that equal reported values describe the same
/// physical surface.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Frame {
    Primary,
    Secondary,
}

/// Dimensionless surface potential seen from one component.
///
/// Radii are in units of the semi-major axis, the companion sits on the +x
/// axis at distance `d`, and `theta` is the polar angle measured from +z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RochePotential {
    frame: Frame,
    /// Mass ratio as seen from this frame: q for the primary, 1/q for the
    /// secondary.
    mass_ratio: f64,
    synchronicity: f64,
}

impl RochePotential {
    pub fn primary(system_mass_ratio: f64, synchronicity: f64) -> Self {
        Self {
            frame: Frame::Primary,
            mass_ratio: system_mass_ratio,
            synchronicity,
        }
    }

    pub fn secondary(system_mass_ratio: f64, synchronicity: f64) -> Self {
        Self {
            frame: Frame::Secondary,
            mass_ratio: 1.0 / system_mass_ratio,
            synchronicity,
        }
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    /// Mass ratio seen from this frame.
    pub fn mass_ratio_seen(&self) -> f64 {
        self.mass_ratio
    }

    pub fn synchronicity(&self) -> f64 {
        self.synchronicity
    }

    fn rescale(&self, raw: f64) -> f64 {
        match self.frame {
            Frame::Primary => raw,
            Frame::Secondary => {
                let q = self.mass_ratio;
                raw / q + 0.5 * (q - 1.0) / q
            }
        }
    }

    /// Potential at spherical coordinates `(rho, phi, theta)` for separation
    /// `d`.
    pub fn value(&self, rho: f64, phi: f64, theta: f64, d: f64) -> f64 {
        let q = self.mass_ratio;
        let f = self.synchronicity;
        let lambda = phi.cos() * theta.sin();
        let raw = 1.0 / rho
            + q / (d * d + rho * rho - 2.0 * rho * d * lambda).sqrt()
            - q * rho * lambda / (d * d)
            + 0.5 * f * f * (1.0 + q) * rho * rho * (1.0 - theta.cos().powi(2));
        self.rescale(raw)
    }

    /// Potential in neck cylindrical coordinates `(rho, phi, z)` with `z`
    /// along the line of centres measured from this component and `phi = 0`
    /// towards +z of the orbital frame. Valid for `d = 1`, `F = 1`, which is
    /// the over-contact regime the neck generator runs in.
    pub fn value_cylindrical(&self, rho: f64, phi: f64, z: f64) -> f64 {
        let q = self.mass_ratio;
        let raw = 1.0 / (z * z + rho * rho).sqrt()
            + q / ((1.0 - z) * (1.0 - z) + rho * rho).sqrt()
            - 0.5 * q * q / (q + 1.0)
            + 0.5 * (q + 1.0) * ((q / (q + 1.0) - z).powi(2) + (rho * phi.sin()).powi(2));
        self.rescale(raw)
    }

    /// dOmega/dx along the line of centres, with `x` measured from the
    /// primary regardless of frame. Used by the Lagrange and
    /// critical-potential solvers.
    pub fn derivative_x(&self, x: f64, d: f64) -> f64 {
        let q = match self.frame {
            Frame::Primary => self.mass_ratio,
            Frame::Secondary => 1.0 / self.mass_ratio,
        };
        let f = self.synchronicity;
        let r3 = (x * x).powf(1.5);
        let rw3 = ((d - x) * (d - x)).powf(1.5);
        let common = -x / r3 + q * (d - x) / rw3;
        match self.frame {
            Frame::Primary => common + f * f * (q + 1.0) * x - q / (d * d),
            Frame::Secondary => common - f * f * (q + 1.0) * (d - x) + 1.0 / (d * d),
        }
    }

    /// d²Omega/dx² along the line of centres, for Newton polishing of the
    /// roots of [Self::derivative_x]. Identical for both frames.
    pub fn second_derivative_x(&self, x: f64, d: f64) -> f64 {
        let q = match self.frame {
            Frame::Primary => self.mass_ratio,
            Frame::Secondary => 1.0 / self.mass_ratio,
        };
        let f = self.synchronicity;
        2.0 / x.abs().powi(3) + 2.0 * q / (d - x).abs().powi(3) + f * f * (q + 1.0)
    }

    /// Gradient of the raw frame potential at a Cartesian point in this
    /// component's own frame (component at the origin, companion at
    /// `(d, 0, 0)`). The secondary's constant rescaling drops out of every
    /// downstream use (polar scaling, temperature ratios).
    pub fn gradient(&self, point: DVec3, d: f64) -> DVec3 {
        let q = self.mass_ratio;
        let f = self.synchronicity;
        let r3 = point.length().powi(3);
        let w = point - DVec3::new(d, 0.0, 0.0);
        let rw3 = w.length().powi(3);
        let centrifugal = f * f * (1.0 + q);
        DVec3::new(
            -point.x / r3 - q * w.x / rw3 - q / (d * d) + centrifugal * point.x,
            -point.y / r3 - q * point.y / rw3 + centrifugal * point.y,
            -point.z / r3 - q * point.z / rw3,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use float_eq::assert_float_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_spherical_limit() {
        // far from the companion the potential approaches 1/rho + q
        let omega = RochePotential::primary(0.5, 1.0);
        let value = omega.value(0.01, 0.0, 0.0, 1.0);
        assert_float_eq!(value, 1.0 / 0.01 + 0.5, rel <= 1e-3);
    }

    #[rstest]
    #[case(0.3, 0.7, 1.2)]
    #[case(0.15, 2.1, 0.4)]
    fn test_xz_plane_symmetry(#[case] rho: f64, #[case] phi: f64, #[case] theta: f64) {
        let omega = RochePotential::primary(0.8, 1.1);
        assert_float_eq!(
            omega.value(rho, phi, theta, 1.0),
            omega.value(rho, -phi, theta, 1.0),
            rel <= 1e-14
        );
    }

    #[rstest]
    #[case(0.3, 0.7, 1.2)]
    #[case(0.15, 2.1, 0.4)]
    fn test_equatorial_symmetry(#[case] rho: f64, #[case] phi: f64, #[case] theta: f64) {
        let omega = RochePotential::primary(0.8, 1.1);
        assert_float_eq!(
            omega.value(rho, phi, theta, 1.0),
            omega.value(rho, phi, PI - theta, 1.0),
            rel <= 1e-14
        );
    }

    #[test]
    fn test_secondary_matches_primary_on_shared_surface() {
        // the same physical point reports the same potential from both frames
        // of an equal-mass pair
        let q = 1.0;
        let primary = RochePotential::primary(q, 1.0);
        let secondary = RochePotential::secondary(q, 1.0);
        // point on the x-axis between the components, seen from both sides
        let x = 0.3;
        let from_primary = primary.value(x, 0.0, FRAC_PI_2, 1.0);
        let from_secondary = secondary.value(1.0 - x, 0.0, FRAC_PI_2, 1.0);
        assert_float_eq!(from_primary, from_secondary, rel <= 1e-12);
    }

    #[test]
    fn test_cylindrical_agrees_with_spherical_on_axis() {
        // on the line of centres the cylindrical and spherical forms coincide
        let omega = RochePotential::primary(0.5, 1.0);
        let z = 0.2;
        let spherical = omega.value(z, 0.0, FRAC_PI_2, 1.0);
        let cylindrical = omega.value_cylindrical(1e-12, 0.0, z);
        assert_float_eq!(spherical, cylindrical, rel <= 1e-6);
    }

    #[test]
    fn test_derivative_x_vanishes_at_l1_equal_masses() {
        // for q = 1 the inner Lagrange point sits exactly midway
        let omega = RochePotential::primary(1.0, 1.0);
        assert_float_eq!(omega.derivative_x(0.5, 1.0), 0.0, abs <= 1e-12);
    }

    #[test]
    fn test_gradient_matches_finite_differences() {
        let omega = RochePotential::primary(0.5, 1.2);
        let p = DVec3::new(0.21, 0.13, 0.17);
        let d = 0.9;
        let h = 1e-7;
        let value = |p: DVec3| {
            let rho = p.length();
            let theta = (p.z / rho).acos();
            let phi = p.y.atan2(p.x);
            // raw primary value has no rescaling
            omega.value(rho, phi, theta, d)
        };
        let grad = omega.gradient(p, d);
        for axis in 0..3 {
            let mut dp = DVec3::ZERO;
            dp[axis] = h;
            let numeric = (value(p + dp) - value(p - dp)) / (2.0 * h);
            assert_float_eq!(grad[axis], numeric, rmax <= 1e-5);
        }
    }
}
