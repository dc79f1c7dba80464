// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Stellar components, circular spots and pulsation records.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::BodiesError;

/// Circular surface spot.
///
/// `longitude` and `latitude` locate the centre in the component's
/// co-rotating frame (`latitude` is the polar angle from +z); faces inside
/// `angular_radius` of the centre multiply their temperature by
/// `temperature_factor`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spot {
    pub longitude: f64,
    pub latitude: f64,
    pub angular_radius: f64,
    pub temperature_factor: f64,
    /// Spot-local discretisation step; the host star's factor applies when
    /// absent.
    pub discretization_factor: Option<f64>,
}

impl Spot {
    pub fn validate(&self) -> Result<(), BodiesError> {
        if !(0.0..TAU).contains(&self.longitude) {
            return Err(BodiesError::InvalidInput(format!(
                "spot longitude must lie in [0, 2pi), got {}",
                self.longitude
            )));
        }
        if !(0.0..=PI).contains(&self.latitude) {
            return Err(BodiesError::InvalidInput(format!(
                "spot latitude must lie in [0, pi], got {}",
                self.latitude
            )));
        }
        if !(self.angular_radius > 0.0 && self.angular_radius <= FRAC_PI_2) {
            return Err(BodiesError::InvalidInput(format!(
                "spot angular radius must lie in (0, pi/2], got {}",
                self.angular_radius
            )));
        }
        if self.temperature_factor <= 0.0 {
            return Err(BodiesError::InvalidInput(format!(
                "spot temperature factor must be positive, got {}",
                self.temperature_factor
            )));
        }
        Ok(())
    }
}

/// Surface perturbation mode applied to a finished mesh: a radial
/// displacement and temperature factor modulated by the associated Legendre
/// polynomial of degree `l`, order `m`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pulsation {
    pub degree: u32,
    pub order: i32,
    /// Relative temperature amplitude.
    pub amplitude: f64,
    /// Cycles per second.
    pub frequency: f64,
    pub phase: f64,
    /// Relative radial displacement amplitude.
    pub displacement_amplitude: f64,
}

impl Pulsation {
    pub fn validate(&self) -> Result<(), BodiesError> {
        if self.order.unsigned_abs() > self.degree {
            return Err(BodiesError::InvalidInput(format!(
                "pulsation order |m| = {} exceeds degree l = {}",
                self.order, self.degree
            )));
        }
        if self.amplitude < 0.0 || self.displacement_amplitude < 0.0 {
            return Err(BodiesError::InvalidInput(
                "pulsation amplitudes must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

/// One validated binary component.
#[derive(Clone, Debug, PartialEq)]
pub struct Star {
    /// Mass in kilograms.
    mass: f64,
    surface_potential: f64,
    synchronicity: f64,
    t_eff: f64,
    gravity_darkening: f64,
    albedo: f64,
    metallicity: f64,
    discretization_factor: f64,
    spots: Vec<Spot>,
    pulsations: Vec<Pulsation>,
}

impl Star {
    /// `mass` in solar masses, `t_eff` in kelvins, `discretization_factor`
    /// in radians.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mass: f64,
        surface_potential: f64,
        synchronicity: f64,
        t_eff: f64,
        gravity_darkening: f64,
        albedo: f64,
        metallicity: f64,
        discretization_factor: f64,
    ) -> Result<Self, BodiesError> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(BodiesError::InvalidInput(format!(
                "mass must be positive, got {mass}"
            )));
        }
        if surface_potential <= 0.0 {
            return Err(BodiesError::InvalidInput(format!(
                "surface potential must be positive, got {surface_potential}"
            )));
        }
        if synchronicity <= 0.0 {
            return Err(BodiesError::InvalidInput(format!(
                "synchronicity must be positive, got {synchronicity}"
            )));
        }
        if t_eff <= 0.0 {
            return Err(BodiesError::InvalidInput(format!(
                "effective temperature must be positive, got {t_eff}"
            )));
        }
        if !(0.0..=1.0).contains(&albedo) {
            return Err(BodiesError::InvalidInput(format!(
                "albedo must lie in [0, 1], got {albedo}"
            )));
        }
        if !(discretization_factor > 0.0 && discretization_factor < FRAC_PI_2) {
            return Err(BodiesError::InvalidInput(format!(
                "discretization factor must lie in (0, pi/2), got {discretization_factor}"
            )));
        }
        Ok(Self {
            mass: algol_units::solar_masses_to_kg(mass),
            surface_potential,
            synchronicity,
            t_eff,
            gravity_darkening,
            albedo,
            metallicity,
            discretization_factor,
            spots: Vec::new(),
            pulsations: Vec::new(),
        })
    }

    pub fn with_spots(mut self, spots: Vec<Spot>) -> Result<Self, BodiesError> {
        for spot in &spots {
            spot.validate()?;
        }
        self.spots = spots;
        Ok(self)
    }

    pub fn with_pulsations(mut self, pulsations: Vec<Pulsation>) -> Result<Self, BodiesError> {
        for pulsation in &pulsations {
            pulsation.validate()?;
        }
        self.pulsations = pulsations;
        Ok(self)
    }

    /// Mass in kilograms.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn surface_potential(&self) -> f64 {
        self.surface_potential
    }

    pub fn synchronicity(&self) -> f64 {
        self.synchronicity
    }

    pub fn t_eff(&self) -> f64 {
        self.t_eff
    }

    pub fn gravity_darkening(&self) -> f64 {
        self.gravity_darkening
    }

    pub fn albedo(&self) -> f64 {
        self.albedo
    }

    pub fn metallicity(&self) -> f64 {
        self.metallicity
    }

    pub fn discretization_factor(&self) -> f64 {
        self.discretization_factor
    }

    pub fn spots(&self) -> &[Spot] {
        &self.spots
    }

    pub fn pulsations(&self) -> &[Pulsation] {
        &self.pulsations
    }

    pub fn has_spots(&self) -> bool {
        !self.spots.is_empty()
    }

    pub fn has_pulsations(&self) -> bool {
        !self.pulsations.is_empty()
    }

    /// Spot longitudes drifted to `phase` for asynchronous rotation: a spot
    /// fixed on the stellar surface migrates by `2 pi (F - 1) phase` in the
    /// co-rotating orbital frame.
    pub fn spot_longitudes_at(&self, phase: f64) -> Vec<f64> {
        self.spots
            .iter()
            .map(|s| (s.longitude + TAU * (self.synchronicity - 1.0) * phase).rem_euclid(TAU))
            .collect()
    }
}
