// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Logical input records.
//!
//! Two representations of the same system are accepted: the *standard* form
//! carries both component masses, the *community* form carries the mass
//! ratio `q` and the projected semi-major axis `a sin i`. Exactly one must
//! resolve; both or neither is an input error.

use std::f64::consts::PI;

use algol_units::constants::GRAVITATIONAL_CONSTANT;

use crate::BodiesError;
use crate::star::{Pulsation, Spot, Star};
use crate::system::{BinarySystem, OrbitalParams};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecordKind {
    Standard,
    Community,
}

/// Component parameters as supplied by the caller; mass is optional because
/// the community representation derives it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentRecord {
    /// Solar masses.
    pub mass: Option<f64>,
    pub surface_potential: f64,
    pub synchronicity: f64,
    pub t_eff: f64,
    pub gravity_darkening: f64,
    pub albedo: f64,
    pub metallicity: f64,
    /// Radians.
    pub discretization_factor: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub spots: Vec<Spot>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pulsations: Vec<Pulsation>,
}

/// Full system record.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SystemRecord {
    pub primary: ComponentRecord,
    pub secondary: ComponentRecord,
    /// Seconds.
    pub period: f64,
    pub eccentricity: f64,
    /// Radians.
    pub inclination: f64,
    /// Radians.
    pub argument_of_periastron: f64,
    /// Seconds.
    pub primary_minimum_time: f64,
    pub phase_shift: f64,
    /// m/s.
    pub gamma: f64,
    /// Community representation: mass ratio `m2 / m1`.
    pub mass_ratio: Option<f64>,
    /// Community representation: `a sin i` in metres.
    pub asini: Option<f64>,
}

impl SystemRecord {
    /// Resolves which representation this record uses.
    pub fn kind(&self) -> Result<RecordKind, BodiesError> {
        let standard = self.primary.mass.is_some() && self.secondary.mass.is_some();
        let community = self.mass_ratio.is_some() && self.asini.is_some();
        match (standard, community) {
            (true, false) => Ok(RecordKind::Standard),
            (false, true) => Ok(RecordKind::Community),
            (true, true) => Err(BodiesError::InvalidInput(
                "ambiguous system record: both masses and (q, a sin i) supplied".into(),
            )),
            (false, false) => Err(BodiesError::InvalidInput(
                "system record resolves to neither the standard nor the community form".into(),
            )),
        }
    }

    /// Masses in solar units, deriving the community form through Kepler III.
    fn masses(&self) -> Result<(f64, f64), BodiesError> {
        match self.kind()? {
            RecordKind::Standard => Ok((
                self.primary.mass.expect("standard record carries masses"),
                self.secondary.mass.expect("standard record carries masses"),
            )),
            RecordKind::Community => {
                let q = self.mass_ratio.expect("community record carries q");
                let asini = self.asini.expect("community record carries a sin i");
                if q <= 0.0 {
                    return Err(BodiesError::InvalidInput(format!(
                        "mass ratio must be positive, got {q}"
                    )));
                }
                let sin_i = self.inclination.sin();
                if sin_i <= 0.0 {
                    return Err(BodiesError::InvalidInput(
                        "community record requires a non-degenerate inclination".into(),
                    ));
                }
                let a = asini / sin_i;
                let m1 = 4.0 * PI * PI * a.powi(3)
                    / (GRAVITATIONAL_CONSTANT * (1.0 + q) * self.period * self.period);
                Ok((
                    m1 / algol_units::constants::SOLAR_MASS,
                    q * m1 / algol_units::constants::SOLAR_MASS,
                ))
            }
        }
    }

    fn build_star(record: &ComponentRecord, mass: f64) -> Result<Star, BodiesError> {
        Star::new(
            mass,
            record.surface_potential,
            record.synchronicity,
            record.t_eff,
            record.gravity_darkening,
            record.albedo,
            record.metallicity,
            record.discretization_factor,
        )?
        .with_spots(record.spots.clone())?
        .with_pulsations(record.pulsations.clone())
    }

    /// Validates the record and assembles the system.
    pub fn assemble(&self) -> Result<BinarySystem, BodiesError> {
        let (m1, m2) = self.masses()?;
        let primary = Self::build_star(&self.primary, m1)?;
        let secondary = Self::build_star(&self.secondary, m2)?;
        BinarySystem::new(
            primary,
            secondary,
            OrbitalParams {
                period: self.period,
                eccentricity: self.eccentricity,
                inclination: self.inclination,
                argument_of_periastron: self.argument_of_periastron,
                primary_minimum_time: self.primary_minimum_time,
                phase_shift: self.phase_shift,
                gamma: self.gamma,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use float_eq::assert_float_eq;

    use super::*;

    fn component(mass: Option<f64>) -> ComponentRecord {
        ComponentRecord {
            mass,
            surface_potential: 100.0,
            synchronicity: 1.0,
            t_eff: 5000.0,
            gravity_darkening: 1.0,
            albedo: 0.6,
            metallicity: 0.0,
            discretization_factor: 10f64.to_radians(),
            spots: vec![],
            pulsations: vec![],
        }
    }

    fn record(
        m1: Option<f64>,
        m2: Option<f64>,
        q: Option<f64>,
        asini: Option<f64>,
    ) -> SystemRecord {
        SystemRecord {
            primary: component(m1),
            secondary: component(m2),
            period: 2.0 * 86_400.0,
            eccentricity: 0.0,
            inclination: FRAC_PI_2,
            argument_of_periastron: FRAC_PI_2,
            primary_minimum_time: 0.0,
            phase_shift: 0.0,
            gamma: 0.0,
            mass_ratio: q,
            asini,
        }
    }

    #[test]
    fn test_standard_record() {
        let record = record(Some(2.0), Some(1.0), None, None);
        assert_eq!(record.kind().unwrap(), RecordKind::Standard);
        let system = record.assemble().unwrap();
        assert_float_eq!(system.mass_ratio(), 0.5, rel <= 1e-12);
    }

    #[test]
    fn test_community_record_roundtrip() {
        // a from the standard record of (2, 1) solar masses over 2 days
        let asini = 6.702_825_610_652_911e9;
        let record = record(None, None, Some(0.5), Some(asini));
        assert_eq!(record.kind().unwrap(), RecordKind::Community);
        let system = record.assemble().unwrap();
        assert_float_eq!(system.mass_ratio(), 0.5, rel <= 1e-10);
        // masses recovered from (q, a sin i)
        assert_float_eq!(system.primary().mass(), 2.0 * 1.988_47e30, rel <= 1e-6);
    }

    #[test]
    fn test_ambiguous_record_rejected() {
        let record = record(Some(2.0), Some(1.0), Some(0.5), Some(1e9));
        assert!(matches!(record.kind(), Err(BodiesError::InvalidInput(_))));
    }

    #[test]
    fn test_unresolvable_record_rejected() {
        let record = record(Some(2.0), None, None, None);
        assert!(matches!(record.kind(), Err(BodiesError::InvalidInput(_))));
    }
}
