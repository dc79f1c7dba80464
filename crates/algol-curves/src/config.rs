// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Engine configuration.

use algol_phot::LimbDarkeningLaw;

use crate::CurveError;

/// Atmosphere-table family.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AtlasKind {
    #[default]
    Ck04,
    K93,
}

impl AtlasKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            AtlasKind::Ck04 => "ck04",
            AtlasKind::K93 => "k93",
        }
    }
}

/// Requested approximation; `Auto` lets the engine pick from the orbit.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ApproximationChoice {
    #[default]
    Auto,
    Exact,
    Mirror,
    Interpolate,
    Similarity,
}

/// The closed option set of the curve engine.
#[derive(Clone, Copy, Debug)]
pub struct CurveConfig {
    /// Mutual irradiation of the components. Honoured for detached and
    /// semi-detached systems; contact envelopes skip the exchange because
    /// the pairwise visibility test requires convex lobes.
    pub reflection_effect: bool,
    pub reflection_effect_iterations: usize,
    /// Similarity-reuse threshold on the relative change of each
    /// characteristic radius.
    pub max_relative_d_r_point: f64,
    pub limb_darkening_law: LimbDarkeningLaw,
    pub atlas: AtlasKind,
    pub approximation: ApproximationChoice,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            reflection_effect: true,
            reflection_effect_iterations: 2,
            max_relative_d_r_point: 0.1,
            limb_darkening_law: LimbDarkeningLaw::Linear,
            atlas: AtlasKind::Ck04,
            approximation: ApproximationChoice::Auto,
        }
    }
}

impl CurveConfig {
    pub fn validate(&self) -> Result<(), CurveError> {
        if self.reflection_effect && self.reflection_effect_iterations < 1 {
            return Err(CurveError::InvalidInput(
                "reflection_effect_iterations must be at least 1".into(),
            ));
        }
        if !(self.max_relative_d_r_point > 0.0) {
            return Err(CurveError::InvalidInput(format!(
                "max_relative_d_r_point must be positive, got {}",
                self.max_relative_d_r_point
            )));
        }
        Ok(())
    }

    pub fn reflection_iterations(&self) -> usize {
        if self.reflection_effect {
            self.reflection_effect_iterations
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_validates() {
        assert!(CurveConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let config = CurveConfig {
            reflection_effect_iterations: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_no_reflection_skips_iterations() {
        let config = CurveConfig {
            reflection_effect: false,
            reflection_effect_iterations: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.reflection_iterations(), 0);
    }
}
