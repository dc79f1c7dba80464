// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Equipotential surface inversion.
//!
//! Solves `Omega(rho, ...) = Omega_0` for the surface radius along arbitrary
//! directions. The potential falls monotonically from the 1/rho singularity
//! at the centre, so the first sign change of `Omega - Omega_0` along the
//! ray brackets the surface; the bracket is located by geometric expansion
//! and polished with Brent.

use std::f64::consts::{FRAC_PI_2, PI};

use glam::DVec2;
use log::debug;
use thiserror::Error;

use algol_math::polynomial::Polynomial;
use algol_math::roots::{Brent, FindBracketedRoot};

use crate::potential::RochePotential;

/// Upper bound on any acceptable dimensionless radius.
const RADIUS_BOUND: f64 = 30.0;
/// Multiplicative step of the bracket expansion.
const GROWTH: f64 = 1.2;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SolveError {
    #[error("no equipotential crossing along direction (phi = {phi}, theta = {theta})")]
    NoCrossing { phi: f64, theta: f64 },
    #[error("equipotential root polish did not converge")]
    Convergence,
    #[error("solution rejected by caller predicate")]
    Rejected,
    #[error("neck position could not be isolated")]
    NeckNotFound,
}

/// Inverts one component's surface potential along rays.
#[derive(Clone, Copy, Debug)]
pub struct EquipotentialSolver<'a> {
    potential: &'a RochePotential,
    surface_potential: f64,
}

impl<'a> EquipotentialSolver<'a> {
    pub fn new(potential: &'a RochePotential, surface_potential: f64) -> Self {
        Self {
            potential,
            surface_potential,
        }
    }

    pub fn potential(&self) -> &RochePotential {
        self.potential
    }

    pub fn surface_potential(&self) -> f64 {
        self.surface_potential
    }

    fn first_root<F>(&self, f: F, seed: f64, bound: f64, phi: f64, theta: f64) -> Result<f64, SolveError>
    where
        F: Fn(f64) -> f64,
    {
        if f(seed) <= 0.0 {
            return Err(SolveError::NoCrossing { phi, theta });
        }
        let mut lo = seed;
        loop {
            let hi = lo * GROWTH;
            if hi > bound {
                return Err(SolveError::NoCrossing { phi, theta });
            }
            if f(hi) < 0.0 {
                return Brent::default()
                    .find_in_bracket(&f, (lo, hi))
                    .map_err(|_| SolveError::Convergence);
            }
            lo = hi;
        }
    }

    /// Surface radius along `(phi, theta)` at separation `d`.
    pub fn radius(&self, d: f64, phi: f64, theta: f64) -> Result<f64, SolveError> {
        self.radius_if(d, phi, theta, |_| true)
    }

    /// Surface radius along `(phi, theta)`, accepted only if `predicate`
    /// holds for the solution.
    pub fn radius_if<P>(&self, d: f64, phi: f64, theta: f64, predicate: P) -> Result<f64, SolveError>
    where
        P: Fn(f64) -> bool,
    {
        let rho = self.first_root(
            |rho| self.potential.value(rho, phi, theta, d) - self.surface_potential,
            d / 1e4,
            RADIUS_BOUND,
            phi,
            theta,
        )?;
        if !(0.0..RADIUS_BOUND).contains(&rho) {
            return Err(SolveError::NoCrossing { phi, theta });
        }
        if !predicate(rho) {
            debug!(
                "equipotential solution rho = {rho} at (phi = {phi}, theta = {theta}) rejected"
            );
            return Err(SolveError::Rejected);
        }
        Ok(rho)
    }

    /// Surface radius in neck cylindrical coordinates (over-contact, d = 1).
    pub fn radius_cylindrical(&self, phi: f64, z: f64) -> Result<f64, SolveError> {
        self.first_root(
            |rho| self.potential.value_cylindrical(rho, phi, z) - self.surface_potential,
            1e-4,
            RADIUS_BOUND,
            phi,
            z,
        )
    }

    pub fn polar_radius(&self, d: f64) -> Result<f64, SolveError> {
        self.radius(d, 0.0, 0.0)
    }

    pub fn side_radius(&self, d: f64) -> Result<f64, SolveError> {
        self.radius(d, FRAC_PI_2, FRAC_PI_2)
    }

    /// Radius towards the companion. Fails for over-contact configurations,
    /// whose surface has no crossing on the near side.
    pub fn forward_radius(&self, d: f64) -> Result<f64, SolveError> {
        self.radius(d, 0.0, FRAC_PI_2)
    }

    pub fn backward_radius(&self, d: f64) -> Result<f64, SolveError> {
        self.radius(d, PI, FRAC_PI_2)
    }

    /// Equatorial silhouette samples `(x, y)` in the primary-centred frame,
    /// on `angles` azimuths over `[0, pi/2]`. Radii at or above the
    /// separation scale are discarded; they are crossings of the potential
    /// trough beyond the companion, not lobe points.
    fn equatorial_silhouette(&self, d: f64, angles: usize, mirror_x: bool) -> Vec<DVec2> {
        let mut points = Vec::with_capacity(angles);
        for i in 0..angles {
            let phi = FRAC_PI_2 * i as f64 / (angles - 1) as f64;
            let Ok(rho) = self.radius(d, phi, FRAC_PI_2) else {
                continue;
            };
            if rho >= d {
                continue;
            }
            let x = rho * phi.cos();
            points.push(DVec2::new(
                if mirror_x { d - x } else { x },
                rho * phi.sin(),
            ));
        }
        points
    }

    /// Plane cross-section of the equipotential surface for inspection.
    /// Returns in-plane coordinates; the secondary is mirrored into the
    /// primary frame by the caller via [RochePotential::frame].
    pub fn cross_section(&self, d: f64, plane: CrossSectionPlane) -> Vec<DVec2> {
        const SAMPLES: usize = 300;
        let mut points = Vec::with_capacity(SAMPLES);
        for i in 0..SAMPLES {
            let angle = -3.0 * FRAC_PI_2 + 2.0 * PI * i as f64 / (SAMPLES - 1) as f64;
            let (phi, theta) = match plane {
                CrossSectionPlane::Xy => (angle, FRAC_PI_2),
                CrossSectionPlane::Yz => (FRAC_PI_2, angle),
                CrossSectionPlane::Zx => (0.0, angle),
            };
            if let Ok(rho) = self.radius(d, phi, theta) {
                let point = match plane {
                    CrossSectionPlane::Xy => DVec2::new(rho * angle.cos(), rho * angle.sin()),
                    CrossSectionPlane::Yz | CrossSectionPlane::Zx => {
                        DVec2::new(rho * angle.sin(), rho * angle.cos())
                    }
                };
                points.push(point);
            }
        }
        points
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CrossSectionPlane {
    Xy,
    Yz,
    Zx,
}

/// x-coordinate of the narrowest place of an over-contact envelope at d = 1.
///
/// Both components' equatorial silhouettes are sampled on 100 azimuths, a
/// degree-15 polynomial is fitted to the joint cloud, and the real root of
/// its derivative closest to the midpoint between the centres is returned.
pub fn neck_position(
    primary: &EquipotentialSolver,
    secondary: &EquipotentialSolver,
) -> Result<f64, SolveError> {
    const ANGLES: usize = 100;
    const FIT_DEGREE: usize = 15;

    let mut cloud = secondary.equatorial_silhouette(1.0, ANGLES, true);
    cloud.extend(primary.equatorial_silhouette(1.0, ANGLES, false));
    let xs: Vec<f64> = cloud.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = cloud.iter().map(|p| p.y).collect();

    let fit = Polynomial::fit(&xs, &ys, FIT_DEGREE).map_err(|_| SolveError::NeckNotFound)?;
    let roots = fit.derivative().real_roots_in(0.0, 1.0, 400);
    roots
        .into_iter()
        .min_by(|a, b| (a - 0.5).abs().total_cmp(&(b - 0.5).abs()))
        .ok_or(SolveError::NeckNotFound)
}
