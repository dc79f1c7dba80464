// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Morphology classification of a binary configuration.

use thiserror::Error;

use crate::lagrange::{LagrangeError, critical_potential, libration_potentials};
use crate::potential::RochePotential;

const EPSILON: f64 = 1e-8;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Morphology {
    Detached,
    SemiDetached,
    OverContact,
    DoubleContact,
}

impl Morphology {
    pub fn is_over_contact(&self) -> bool {
        matches!(self, Morphology::OverContact)
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum MorphologyError {
    #[error("non-physical configuration: {0}")]
    NonPhysical(String),
    #[error(transparent)]
    Lagrange(#[from] LagrangeError),
}

/// Classification result with the critical potentials it was derived from
/// and, for synchronous circular systems, the filling factors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MorphologyReport {
    pub morphology: Morphology,
    pub primary_critical: f64,
    pub secondary_critical: f64,
    pub primary_filling_factor: Option<f64>,
    pub secondary_filling_factor: Option<f64>,
}

/// Classifies the configuration of two components with surface potentials
/// `omega_p`, `omega_s` at periastron separation `periastron_distance`.
///
/// Synchronous circular systems are classified through their filling
/// factors `(Omega(L1) - Omega) / (Omega(L1) - Omega(L2))`; everything else
/// through the relation of each surface potential to its own critical
/// potential.
pub fn classify(
    primary: &RochePotential,
    secondary: &RochePotential,
    omega_p: f64,
    omega_s: f64,
    eccentricity: f64,
    periastron_distance: f64,
) -> Result<MorphologyReport, MorphologyError> {
    let primary_critical = critical_potential(primary, periastron_distance)?;
    let secondary_critical = critical_potential(secondary, periastron_distance)?;

    let synchronous_circular =
        primary.synchronicity() == 1.0 && secondary.synchronicity() == 1.0 && eccentricity == 0.0;

    if synchronous_circular {
        let q = primary.mass_ratio_seen();
        let [_, l1, l2] = libration_potentials(q, periastron_distance)?;
        let fill_p = (l1 - omega_p) / (l1 - l2);
        let fill_s = (l1 - omega_s) / (l1 - l2);

        let morphology = if fill_p > 1.0 || fill_s > 1.0 {
            return Err(MorphologyError::NonPhysical(format!(
                "filling factor above 1 (primary {fill_p}, secondary {fill_s}): \
                 surface potential below the outer critical surface"
            )));
        } else if (fill_p > EPSILON || fill_s > EPSILON) && (fill_p - fill_s).abs() > EPSILON {
            return Err(MorphologyError::NonPhysical(
                "over-contact configuration with unequal surface potentials".into(),
            ));
        } else if (fill_p.abs() < EPSILON && fill_s < 0.0)
            || (fill_p < 0.0 && fill_s.abs() < EPSILON)
        {
            Morphology::SemiDetached
        } else if fill_p < 0.0 && fill_s < 0.0 {
            Morphology::Detached
        } else {
            Morphology::OverContact
        };
        return Ok(MorphologyReport {
            morphology,
            primary_critical,
            secondary_critical,
            primary_filling_factor: Some(fill_p),
            secondary_filling_factor: Some(fill_s),
        });
    }

    let morphology = if (omega_p - primary_critical).abs() < EPSILON
        && (omega_s - secondary_critical).abs() < EPSILON
    {
        Morphology::DoubleContact
    } else if omega_p > primary_critical && omega_s > secondary_critical {
        Morphology::Detached
    } else {
        return Err(MorphologyError::NonPhysical(
            "component overflows its critical lobe in an asynchronous or eccentric orbit".into(),
        ));
    };
    Ok(MorphologyReport {
        morphology,
        primary_critical,
        secondary_critical,
        primary_filling_factor: None,
        secondary_filling_factor: None,
    })
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;

    use super::*;

    fn frames(q: f64, f1: f64, f2: f64) -> (RochePotential, RochePotential) {
        (
            RochePotential::primary(q, f1),
            RochePotential::secondary(q, f2),
        )
    }

    #[test]
    fn test_detached() {
        let (p, s) = frames(0.5, 1.0, 1.0);
        let report = classify(&p, &s, 100.0, 100.0, 0.0, 1.0).unwrap();
        assert_eq!(report.morphology, Morphology::Detached);
        assert!(report.primary_filling_factor.unwrap() < 0.0);
    }

    #[test]
    fn test_semi_detached() {
        let (p, s) = frames(0.5, 1.0, 1.0);
        let report = classify(&p, &s, 2.875844632141054, 100.0, 0.0, 1.0).unwrap();
        assert_eq!(report.morphology, Morphology::SemiDetached);
        assert_float_eq!(report.primary_filling_factor.unwrap(), 0.0, abs <= 1e-8);
    }

    #[test]
    fn test_over_contact() {
        let (p, s) = frames(0.5, 1.0, 1.0);
        let report = classify(&p, &s, 2.7, 2.7, 0.0, 1.0).unwrap();
        assert_eq!(report.morphology, Morphology::OverContact);
        let fill = report.primary_filling_factor.unwrap();
        assert!(fill > 0.0 && fill <= 1.0);
    }

    #[test]
    fn test_rejects_unequal_contact_potentials() {
        let (p, s) = frames(0.5, 1.0, 1.0);
        let res = classify(&p, &s, 2.7, 2.8, 0.0, 1.0);
        assert!(matches!(res, Err(MorphologyError::NonPhysical(_))));
    }

    #[test]
    fn test_asynchronous_detached() {
        let (p, s) = frames(0.5, 1.5, 1.2);
        let report = classify(&p, &s, 4.8, 4.0, 0.3, 0.7).unwrap();
        assert_eq!(report.morphology, Morphology::Detached);
        assert!(report.primary_filling_factor.is_none());
    }

    #[test]
    fn test_asynchronous_overflow_rejected() {
        let (p, s) = frames(0.5, 1.5, 1.2);
        let res = classify(&p, &s, 2.0, 4.0, 0.3, 0.7);
        assert!(matches!(res, Err(MorphologyError::NonPhysical(_))));
    }

    #[test]
    fn test_double_contact() {
        let (p, s) = frames(0.5, 1.5, 1.2);
        let crit_p = critical_potential(&p, 0.7).unwrap();
        let crit_s = critical_potential(&s, 0.7).unwrap();
        let report = classify(&p, &s, crit_p, crit_s, 0.3, 0.7).unwrap();
        assert_eq!(report.morphology, Morphology::DoubleContact);
    }
}
