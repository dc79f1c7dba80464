// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Keplerian two-body kinematics.
//!
//! The orbit is described by its photometric ephemeris: phase 0 corresponds
//! to the primary minimum, and the geometry of the inferior conjunction for
//! the given `(e, ω)` is solved once at construction. Phase→separation is
//! the hot path of the curve engine; the only non-trivial step, the Kepler
//! inversion, lives in [Orbit::eccentric_anomaly].

pub mod anomalies;

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use thiserror::Error;

use algol_math::roots::{FindRootWithDerivative, Newton};
use algol_units::Radians;
use anomalies::{eccentric_to_mean, eccentric_to_true, true_to_eccentric};

#[derive(Clone, Debug, Error, PartialEq)]
pub enum OrbitError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("Kepler solver did not converge for mean anomaly {mean_anomaly}")]
    Convergence { mean_anomaly: f64 },
}

/// Snapshot of the relative orbit at one photometric phase.
///
/// `distance` is in units of the semi-major axis, `azimuth` is the angle of
/// the secondary as seen from the primary, measured in the orbital plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitalPosition {
    pub index: usize,
    pub phase: f64,
    pub distance: f64,
    pub azimuth: Radians,
    pub true_anomaly: Radians,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Orbit {
    period: f64,
    eccentricity: f64,
    inclination: Radians,
    argument_of_periastron: Radians,
    primary_minimum_time: f64,
    phase_shift: f64,
    periastron_phase: f64,
    kepler: Newton,
}

impl Orbit {
    /// `period` and `primary_minimum_time` are in seconds; angles in radians.
    pub fn new(
        period: f64,
        eccentricity: f64,
        inclination: Radians,
        argument_of_periastron: Radians,
        primary_minimum_time: f64,
        phase_shift: f64,
    ) -> Result<Self, OrbitError> {
        if !period.is_finite() || period <= 0.0 {
            return Err(OrbitError::InvalidInput(format!(
                "period must be positive, got {period}"
            )));
        }
        if !(0.0..1.0).contains(&eccentricity) {
            return Err(OrbitError::InvalidInput(format!(
                "eccentricity must lie in [0, 1), got {eccentricity}"
            )));
        }
        if !(0.0..=PI).contains(&inclination) {
            return Err(OrbitError::InvalidInput(format!(
                "inclination must lie in [0, pi], got {inclination}"
            )));
        }
        if !(0.0..TAU).contains(&argument_of_periastron) {
            return Err(OrbitError::InvalidInput(format!(
                "argument of periastron must lie in [0, 2pi), got {argument_of_periastron}"
            )));
        }

        // geometric alignment of the inferior conjunction: the secondary
        // crosses the plane of the sky in front at nu = pi/2 - omega
        let conjunction_true_anomaly = (FRAC_PI_2 - argument_of_periastron).rem_euclid(TAU);
        let conjunction_eccentric_anomaly =
            true_to_eccentric(conjunction_true_anomaly, eccentricity);
        let conjunction_mean_anomaly =
            eccentric_to_mean(conjunction_eccentric_anomaly, eccentricity);
        let periastron_phase = (-conjunction_mean_anomaly / TAU).rem_euclid(1.0);

        Ok(Self {
            period,
            eccentricity,
            inclination,
            argument_of_periastron,
            primary_minimum_time,
            phase_shift,
            periastron_phase,
            kepler: Newton::new(64, 1e-12),
        })
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    pub fn inclination(&self) -> Radians {
        self.inclination
    }

    pub fn argument_of_periastron(&self) -> Radians {
        self.argument_of_periastron
    }

    pub fn periastron_distance(&self) -> f64 {
        1.0 - self.eccentricity
    }

    pub fn apastron_distance(&self) -> f64 {
        1.0 + self.eccentricity
    }

    /// Photometric phase at which the components pass periastron.
    pub fn periastron_phase(&self) -> f64 {
        self.periastron_phase
    }

    /// Applies the ephemeris phase shift and reduces modulo one.
    pub fn true_phase(&self, phase: f64) -> f64 {
        (phase + self.phase_shift).rem_euclid(1.0)
    }

    /// Photometric phase of a time stamp (seconds), folded on the ephemeris.
    pub fn phase_from_time(&self, time: f64) -> f64 {
        ((time - self.primary_minimum_time) / self.period).rem_euclid(1.0)
    }

    /// Mean anomaly at a (shift-corrected) photometric phase.
    pub fn mean_anomaly(&self, true_phase: f64) -> Radians {
        (TAU * (true_phase - self.periastron_phase)).rem_euclid(TAU)
    }

    /// Solves Kepler's equation `M = E - e sin E` by Newton iteration seeded
    /// at `M + e sin M`.
    pub fn eccentric_anomaly(&self, mean_anomaly: Radians) -> Result<Radians, OrbitError> {
        let m = mean_anomaly.rem_euclid(TAU);
        let e = self.eccentricity;
        self.kepler
            .find_with_derivative(
                |ecc| ecc - e * ecc.sin() - m,
                |ecc| 1.0 - e * ecc.cos(),
                m + e * m.sin(),
            )
            .map(|ecc| ecc.rem_euclid(TAU))
            .map_err(|_| OrbitError::Convergence { mean_anomaly: m })
    }

    pub fn true_anomaly(&self, eccentric_anomaly: Radians) -> Radians {
        eccentric_to_true(eccentric_anomaly, self.eccentricity).rem_euclid(TAU)
    }

    /// Centre-to-centre separation in units of the semi-major axis.
    pub fn separation(&self, true_anomaly: Radians) -> f64 {
        (1.0 - self.eccentricity * self.eccentricity)
            / (1.0 + self.eccentricity * true_anomaly.cos())
    }

    /// Relative position for a single phase.
    pub fn position(&self, index: usize, phase: f64) -> Result<OrbitalPosition, OrbitError> {
        let true_phase = self.true_phase(phase);
        let mean_anomaly = self.mean_anomaly(true_phase);
        let eccentric_anomaly = self.eccentric_anomaly(mean_anomaly)?;
        let true_anomaly = self.true_anomaly(eccentric_anomaly);
        Ok(OrbitalPosition {
            index,
            phase,
            distance: self.separation(true_anomaly),
            azimuth: (true_anomaly + self.argument_of_periastron).rem_euclid(TAU),
            true_anomaly,
        })
    }

    /// Relative positions over a phase sequence.
    pub fn orbital_motion(&self, phases: &[f64]) -> Result<Vec<OrbitalPosition>, OrbitError> {
        phases
            .iter()
            .enumerate()
            .map(|(index, &phase)| self.position(index, phase))
            .collect()
    }
}

/// Radial-velocity semi-amplitude `2 pi a sin i / (P sqrt(1 - e^2))` for a
/// full orbit of size `a` (metres); the caller splits it by mass fraction.
pub fn projected_semi_amplitude(
    semi_major_axis: f64,
    period: f64,
    eccentricity: f64,
    inclination: Radians,
) -> f64 {
    TAU * semi_major_axis * inclination.sin()
        / (period * (1.0 - eccentricity * eccentricity).sqrt())
}

/// Line-of-sight velocity for semi-amplitude `k` at true anomaly `nu`.
pub fn radial_velocity(k: f64, eccentricity: f64, argument_of_periastron: Radians, nu: Radians) -> f64 {
    k * ((nu + argument_of_periastron).cos() + eccentricity * argument_of_periastron.cos())
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;
    use rstest::rstest;

    use super::*;

    fn circular() -> Orbit {
        Orbit::new(86_400.0, 0.0, FRAC_PI_2, FRAC_PI_2, 0.0, 0.0).unwrap()
    }

    fn eccentric() -> Orbit {
        Orbit::new(86_400.0, 0.3, FRAC_PI_2, FRAC_PI_2, 0.0, 0.0).unwrap()
    }

    #[test]
    fn test_rejects_hyperbolic() {
        let res = Orbit::new(86_400.0, 1.0, FRAC_PI_2, 0.0, 0.0, 0.0);
        assert!(matches!(res, Err(OrbitError::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_negative_period() {
        let res = Orbit::new(-1.0, 0.0, FRAC_PI_2, 0.0, 0.0, 0.0);
        assert!(matches!(res, Err(OrbitError::InvalidInput(_))));
    }

    #[rstest]
    #[case(0.0)]
    #[case(0.1)]
    #[case(0.3)]
    #[case(0.9)]
    fn test_kepler_residual(#[case] eccentricity: f64) {
        let orbit = Orbit::new(86_400.0, eccentricity, FRAC_PI_2, FRAC_PI_2, 0.0, 0.0).unwrap();
        for i in 0..32 {
            let mean = TAU * i as f64 / 32.0;
            let ecc = orbit.eccentric_anomaly(mean).unwrap();
            let residual = mean - (ecc - eccentricity * ecc.sin());
            assert!(
                residual.rem_euclid(TAU).min(TAU - residual.rem_euclid(TAU)) < 1e-10,
                "|M - (E - e sin E)| too large at M = {mean}"
            );
        }
    }

    #[test]
    fn test_separation_bounds() {
        let orbit = eccentric();
        let phases: Vec<f64> = (0..100).map(|i| i as f64 / 100.0).collect();
        for position in orbit.orbital_motion(&phases).unwrap() {
            assert!(position.distance >= orbit.periastron_distance() - 1e-12);
            assert!(position.distance <= orbit.apastron_distance() + 1e-12);
        }
    }

    #[test]
    fn test_circular_conjunction_alignment() {
        // e = 0, omega = pi/2: phase 0 is the primary minimum, azimuth pi/2
        let orbit = circular();
        let position = orbit.position(0, 0.0).unwrap();
        assert_float_eq!(position.distance, 1.0, abs <= 1e-12);
        assert_float_eq!(position.azimuth, FRAC_PI_2, abs <= 1e-10);
        assert_float_eq!(orbit.periastron_phase(), 0.0, abs <= 1e-12);
    }

    #[test]
    fn test_eccentric_periastron_phase() {
        let orbit = eccentric();
        // at the periastron phase the separation is minimal
        let position = orbit.position(0, orbit.periastron_phase()).unwrap();
        assert_float_eq!(position.distance, orbit.periastron_distance(), abs <= 1e-9);
    }

    #[test]
    fn test_periastron_phase_reference_value() {
        // e = 0.1, omega = pi: periastron falls at phase 0.218222142892
        let orbit = Orbit::new(86_400.0, 0.1, FRAC_PI_2, PI, 0.0, 0.0).unwrap();
        assert_float_eq!(orbit.periastron_phase(), 0.218222142892, abs <= 1e-10);
        // at periastron the separation is exactly 1 - e
        let position = orbit.position(0, orbit.periastron_phase()).unwrap();
        assert_float_eq!(position.distance, 0.9, abs <= 1e-10);
    }

    #[test]
    fn test_phase_folding_is_periodic() {
        let orbit = eccentric();
        let a = orbit.position(0, 0.31).unwrap();
        let b = orbit.position(0, 3.31).unwrap();
        assert_float_eq!(a.distance, b.distance, abs <= 1e-12);
        assert_float_eq!(a.azimuth, b.azimuth, abs <= 1e-12);
    }

    #[test]
    fn test_phase_from_time() {
        let orbit = circular();
        assert_float_eq!(orbit.phase_from_time(43_200.0), 0.5, abs <= 1e-12);
        assert_float_eq!(orbit.phase_from_time(-43_200.0), 0.5, abs <= 1e-12);
    }

    #[test]
    fn test_radial_velocity_zero_mean_over_time() {
        // the time average of cos(nu + omega) + e cos(omega) vanishes
        let orbit = eccentric();
        let n = 10_000;
        let mean: f64 = (0..n)
            .map(|i| {
                let position = orbit.position(0, i as f64 / n as f64).unwrap();
                radial_velocity(1.0, 0.3, FRAC_PI_2, position.true_anomaly)
            })
            .sum::<f64>()
            / n as f64;
        assert_float_eq!(mean, 0.0, abs <= 1e-4);
    }
}
