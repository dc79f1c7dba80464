// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Binary-system assembly: validation, derived parameters and morphology.

use log::debug;

use algol_orbit::Orbit;
use algol_roche::morphology::{Morphology, MorphologyReport, classify};
use algol_roche::potential::RochePotential;
use algol_roche::surface::{EquipotentialSolver, SolveError};
use algol_units::semi_major_axis;

use crate::BodiesError;
use crate::star::Star;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Component {
    Primary,
    Secondary,
}

impl Component {
    pub const BOTH: [Component; 2] = [Component::Primary, Component::Secondary];
}

/// Orbital parameters of the system record, SI and radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitalParams {
    /// Orbital period in seconds.
    pub period: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub argument_of_periastron: f64,
    /// Reference time of the primary minimum in seconds.
    pub primary_minimum_time: f64,
    pub phase_shift: f64,
    /// Systemic velocity in m/s.
    pub gamma: f64,
}

/// Characteristic equipotential radii of one component at one separation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharacteristicRadii {
    pub polar: f64,
    pub side: f64,
    pub forward: Option<f64>,
    pub backward: f64,
}

#[derive(Clone, Debug)]
pub struct BinarySystem {
    primary: Star,
    secondary: Star,
    orbit: Orbit,
    gamma: f64,
    mass_ratio: f64,
    semi_major_axis: f64,
    morphology: MorphologyReport,
    primary_potential: RochePotential,
    secondary_potential: RochePotential,
}

impl BinarySystem {
    pub fn new(primary: Star, secondary: Star, params: OrbitalParams) -> Result<Self, BodiesError> {
        let orbit = Orbit::new(
            params.period,
            params.eccentricity,
            params.inclination,
            params.argument_of_periastron,
            params.primary_minimum_time,
            params.phase_shift,
        )?;

        let mass_ratio = secondary.mass() / primary.mass();
        let semi_major_axis = semi_major_axis(primary.mass(), secondary.mass(), params.period);
        debug!(
            "assembling binary: q = {mass_ratio:.6}, a = {semi_major_axis:.6e} m, e = {}",
            params.eccentricity
        );

        let primary_potential = RochePotential::primary(mass_ratio, primary.synchronicity());
        let secondary_potential = RochePotential::secondary(mass_ratio, secondary.synchronicity());

        let morphology = classify(
            &primary_potential,
            &secondary_potential,
            primary.surface_potential(),
            secondary.surface_potential(),
            params.eccentricity,
            orbit.periastron_distance(),
        )?;
        debug!("morphology classified as {:?}", morphology.morphology);

        Ok(Self {
            primary,
            secondary,
            orbit,
            gamma: params.gamma,
            mass_ratio,
            semi_major_axis,
            morphology,
            primary_potential,
            secondary_potential,
        })
    }

    pub fn primary(&self) -> &Star {
        &self.primary
    }

    pub fn secondary(&self) -> &Star {
        &self.secondary
    }

    pub fn star(&self, component: Component) -> &Star {
        match component {
            Component::Primary => &self.primary,
            Component::Secondary => &self.secondary,
        }
    }

    pub fn orbit(&self) -> &Orbit {
        &self.orbit
    }

    /// Systemic velocity in m/s.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Mass ratio `m2 / m1`; read-only, derived at construction.
    pub fn mass_ratio(&self) -> f64 {
        self.mass_ratio
    }

    /// Semi-major axis in metres (Kepler III).
    pub fn semi_major_axis(&self) -> f64 {
        self.semi_major_axis
    }

    pub fn morphology(&self) -> Morphology {
        self.morphology.morphology
    }

    pub fn morphology_report(&self) -> &MorphologyReport {
        &self.morphology
    }

    pub fn potential(&self, component: Component) -> &RochePotential {
        match component {
            Component::Primary => &self.primary_potential,
            Component::Secondary => &self.secondary_potential,
        }
    }

    pub fn solver(&self, component: Component) -> EquipotentialSolver<'_> {
        EquipotentialSolver::new(
            self.potential(component),
            self.star(component).surface_potential(),
        )
    }

    pub fn has_spots(&self) -> bool {
        self.primary.has_spots() || self.secondary.has_spots()
    }

    pub fn has_pulsations(&self) -> bool {
        self.primary.has_pulsations() || self.secondary.has_pulsations()
    }

    pub fn is_synchronous(&self) -> bool {
        self.primary.synchronicity() == 1.0 && self.secondary.synchronicity() == 1.0
    }

    /// Characteristic radii of `component` at separation `d`.
    pub fn characteristic_radii(
        &self,
        component: Component,
        d: f64,
    ) -> Result<CharacteristicRadii, SolveError> {
        let solver = self.solver(component);
        Ok(CharacteristicRadii {
            polar: solver.polar_radius(d)?,
            side: solver.side_radius(d)?,
            forward: solver.forward_radius(d).ok(),
            backward: solver.backward_radius(d)?,
        })
    }
}
