// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! The curve engine: approximation-mode selection, parallel phase
//! iteration, and per-band assembly of the observables.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::info;
use rayon::prelude::*;

use algol_bodies::{BinarySystem, Component, Spot};
use algol_mesh::builder::{ComponentSurface, build_surface_with_spots, supports_reflection};
use algol_mesh::pulsate::apply_pulsations;
use algol_mesh::reflect::apply_reflection;
use algol_orbit::{OrbitalPosition, projected_semi_amplitude, radial_velocity};
use algol_phot::{Atlas, LdSource, Passband, RadianceEvaluator, limb_darkening_factor};

use crate::config::{ApproximationChoice, CurveConfig};
use crate::coverage::{EclipseWindows, compute_coverage};
use crate::position::{LINE_OF_SIGHT, OnPosition};
use crate::CurveError;

/// The approximation the engine settled on; recorded on the result so mode
/// selection is testable independently of the numbers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CurveMode {
    /// Geometry rebuilt from scratch at every phase.
    Exact = 0,
    /// One geometry at d = 1, rotated per phase; conjunction mirroring when
    /// the configuration allows it.
    CircularSynchronous = 1,
    /// Eccentric orbit with geometry shared across the apsidal line.
    ApsidalMirror = 2,
    /// Sparse exact builds, interpolated in between.
    Interpolating = 3,
    /// Consecutive phases below the radius-drift threshold reuse the
    /// previous geometry.
    SimilarityReuse = 4,
}

/// Multi-band light curves aligned with the input phase array.
#[derive(Clone, Debug)]
pub struct LightCurves {
    pub mode: CurveMode,
    pub phases: Vec<f64>,
    pub bands: Vec<(String, Vec<f64>)>,
}

impl LightCurves {
    pub fn band(&self, name: &str) -> Option<&[f64]> {
        self.bands
            .iter()
            .find(|(band, _)| band == name)
            .map(|(_, flux)| flux.as_slice())
    }

    /// Fluxes divided by the band maximum.
    pub fn normalized(&self) -> LightCurves {
        let bands = self
            .bands
            .iter()
            .map(|(name, flux)| {
                let peak = flux.iter().copied().fold(f64::MIN, f64::max);
                let scaled = flux.iter().map(|f| f / peak).collect();
                (name.clone(), scaled)
            })
            .collect();
        LightCurves {
            mode: self.mode,
            phases: self.phases.clone(),
            bands,
        }
    }
}

/// Radial-velocity curves in m/s, systemic velocity included.
#[derive(Clone, Debug, PartialEq)]
pub struct RvCurves {
    pub phases: Vec<f64>,
    pub primary: Vec<f64>,
    pub secondary: Vec<f64>,
}

/// Both components' surfaces for one separation.
#[derive(Clone, Debug)]
pub struct SystemSurfaces {
    pub primary: ComponentSurface,
    pub secondary: ComponentSurface,
}

pub struct CurveEngine<'a> {
    system: &'a BinarySystem,
    config: CurveConfig,
    radiance: RadianceEvaluator<'a>,
    ld: &'a dyn LdSource,
}

impl<'a> CurveEngine<'a> {
    pub fn new(
        system: &'a BinarySystem,
        atlas: &'a dyn Atlas,
        ld: &'a dyn LdSource,
        passbands: &'a [Passband],
        config: CurveConfig,
    ) -> Result<Self, CurveError> {
        config.validate()?;
        if passbands.is_empty() {
            return Err(CurveError::InvalidInput(
                "at least one passband is required".into(),
            ));
        }
        Ok(Self {
            system,
            config,
            radiance: RadianceEvaluator::new(atlas, passbands),
            ld,
        })
    }

    fn band_count(&self) -> usize {
        self.radiance.passbands().len()
    }

    /// Builds both components at separation `d` for photometric `phase`,
    /// with spot-longitude drift, reflection and pulsations applied.
    fn build_surfaces(&self, d: f64, phase: f64) -> Result<SystemSurfaces, CurveError> {
        let drifted = |component: Component| -> Vec<Spot> {
            let star = self.system.star(component);
            let longitudes = star.spot_longitudes_at(phase);
            star.spots()
                .iter()
                .zip(longitudes)
                .map(|(spot, longitude)| Spot {
                    longitude,
                    ..spot.clone()
                })
                .collect()
        };
        let mut primary =
            build_surface_with_spots(self.system, Component::Primary, d, &drifted(Component::Primary))?;
        let mut secondary = build_surface_with_spots(
            self.system,
            Component::Secondary,
            d,
            &drifted(Component::Secondary),
        )?;
        // reflection pairs faces by normal orientation, which is only a
        // valid visibility test between convex lobes; contact envelopes
        // would exchange heat straight across the neck
        if self.config.reflection_iterations() > 0 && supports_reflection(self.system) {
            apply_reflection(
                &mut primary.fields,
                &mut secondary.fields,
                self.system.primary().albedo(),
                self.system.secondary().albedo(),
                self.config.reflection_iterations(),
            );
        }
        let time = phase * self.system.orbit().period();
        if self.system.primary().has_pulsations() {
            apply_pulsations(
                &mut primary.mesh,
                &mut primary.fields,
                self.system.primary().pulsations(),
                time,
                d,
                false,
            );
        }
        if self.system.secondary().has_pulsations() {
            apply_pulsations(
                &mut secondary.mesh,
                &mut secondary.fields,
                self.system.secondary().pulsations(),
                time,
                d,
                true,
            );
        }
        Ok(SystemSurfaces { primary, secondary })
    }

    fn windows(&self, surfaces: &SystemSurfaces) -> EclipseWindows {
        // for the shared envelope the transverse extents bound the
        // silhouette overlap; the seam-ward extent would put every azimuth
        // in eclipse and hide seam faces of side-by-side lobes
        let radius = |surface: &ComponentSurface| {
            if self.system.morphology().is_over_contact() {
                1.3 * surface.side_radius.max(surface.polar_radius)
            } else {
                surface.max_radius()
            }
        };
        EclipseWindows::new(
            self.system.orbit(),
            radius(&surfaces.primary),
            radius(&surfaces.secondary),
        )
    }

    /// Integrates one orbital position into per-band fluxes.
    fn observe(
        &self,
        surfaces: &SystemSurfaces,
        position: OrbitalPosition,
        windows: &EclipseWindows,
    ) -> Result<Vec<f64>, CurveError> {
        let on_pos = OnPosition::new(
            &surfaces.primary,
            &surfaces.secondary,
            position,
            self.system.orbit().inclination(),
            self.system.mass_ratio(),
        );
        let coverage = compute_coverage(&on_pos, windows.contains(position.azimuth));
        let scale = self.system.semi_major_axis().powi(2);
        let law = self.config.limb_darkening_law;

        let mut flux = vec![0.0; self.band_count()];
        for (component, positioned, coverage) in [
            (Component::Primary, &on_pos.primary, &coverage.primary),
            (Component::Secondary, &on_pos.secondary, &coverage.secondary),
        ] {
            let star = self.system.star(component);
            let fields = &positioned.surface.fields;
            for (face, &covered) in coverage.iter().enumerate() {
                if covered <= 0.0 {
                    continue;
                }
                let mu = positioned.normals[face].dot(LINE_OF_SIGHT);
                if mu <= 0.0 {
                    continue;
                }
                let t_eff = fields.temperatures[face];
                let log_g = fields.log_g[face];
                let intensities =
                    self.radiance
                        .band_intensities(t_eff, log_g, star.metallicity())?;
                for (band, intensity) in intensities.iter().enumerate() {
                    let coefficients = self.ld.coefficients(
                        law,
                        t_eff,
                        log_g,
                        star.metallicity(),
                        &self.radiance.passbands()[band].name,
                    )?;
                    let darkening = limb_darkening_factor(law, &coefficients, mu).max(0.0);
                    flux[band] += intensity * mu * darkening * covered * scale;
                }
            }
        }
        Ok(flux)
    }

    /// Observes the given `(slot, position, surfaces)` jobs in parallel
    /// batches. A failing worker raises the abort flag; the others finish
    /// their current phase and exit, and the earliest error wins.
    fn observe_parallel(
        &self,
        jobs: Vec<(usize, OrbitalPosition, Arc<SystemSurfaces>)>,
        windows: &EclipseWindows,
        flux: &mut [Vec<f64>],
    ) -> Result<(), CurveError> {
        let abort = AtomicBool::new(false);
        let batch = jobs.len().div_ceil(rayon::current_num_threads().max(1)).max(1);
        let mut results: Vec<(usize, Option<Result<Vec<f64>, CurveError>>)> = jobs
            .par_chunks(batch)
            .flat_map_iter(|chunk| {
                chunk.iter().map(|(slot, position, surfaces)| {
                    if abort.load(Ordering::Relaxed) {
                        return (*slot, None);
                    }
                    let observed = self.observe(surfaces, *position, windows);
                    if observed.is_err() {
                        abort.store(true, Ordering::Relaxed);
                    }
                    (*slot, Some(observed))
                })
            })
            .collect();
        results.sort_by_key(|(slot, _)| *slot);
        for (slot, observed) in results {
            match observed {
                Some(Ok(bands)) => flux[slot] = bands,
                Some(Err(e)) => return Err(e),
                None => {
                    return Err(CurveError::InvalidInput(
                        "phase skipped after abort".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    fn resolve_mode(&self, phases: &[f64]) -> CurveMode {
        let eccentric = self.system.orbit().eccentricity() > 0.0;
        let asynchronous_spots = Component::BOTH.iter().any(|&c| {
            let star = self.system.star(c);
            star.has_spots() && star.synchronicity() != 1.0
        });
        let volatile = asynchronous_spots || self.system.has_pulsations();

        let mode = match self.config.approximation {
            ApproximationChoice::Exact => CurveMode::Exact,
            ApproximationChoice::Mirror if eccentric => CurveMode::ApsidalMirror,
            ApproximationChoice::Interpolate if !self.system.has_spots() && !volatile => {
                CurveMode::Interpolating
            }
            ApproximationChoice::Similarity if eccentric => CurveMode::SimilarityReuse,
            _ => {
                if !eccentric {
                    if volatile {
                        CurveMode::Exact
                    } else {
                        CurveMode::CircularSynchronous
                    }
                } else if volatile || self.system.has_spots() {
                    CurveMode::Exact
                } else {
                    let span = phases.iter().copied().fold(f64::MIN, f64::max)
                        - phases.iter().copied().fold(f64::MAX, f64::min);
                    if span >= 0.8 {
                        CurveMode::ApsidalMirror
                    } else {
                        CurveMode::SimilarityReuse
                    }
                }
            }
        };
        info!("curve engine selected mode {mode:?}");
        mode
    }

    pub fn light_curves(&self, phases: &[f64]) -> Result<LightCurves, CurveError> {
        let mode = self.resolve_mode(phases);
        let positions = self.system.orbit().orbital_motion(phases)?;
        let mut flux = vec![Vec::new(); positions.len()];
        match mode {
            CurveMode::CircularSynchronous => self.run_static(&positions, &mut flux)?,
            CurveMode::Exact => self.run_exact(&positions, &mut flux)?,
            CurveMode::ApsidalMirror => self.run_apsidal(&positions, &mut flux)?,
            CurveMode::Interpolating => self.run_interpolating(&positions, &mut flux)?,
            CurveMode::SimilarityReuse => self.run_similarity(&positions, &mut flux)?,
        }

        let bands = self
            .radiance
            .passbands()
            .iter()
            .enumerate()
            .map(|(band, passband)| {
                (
                    passband.name.clone(),
                    flux.iter().map(|f| f[band]).collect::<Vec<f64>>(),
                )
            })
            .collect();
        Ok(LightCurves {
            mode,
            phases: phases.to_vec(),
            bands,
        })
    }

    /// Mode 1: one geometry, rotated per phase, with conjunction mirroring
    /// when `omega = pi/2` and the surfaces carry no spots.
    fn run_static(
        &self,
        positions: &[OrbitalPosition],
        flux: &mut [Vec<f64>],
    ) -> Result<(), CurveError> {
        let surfaces = Arc::new(self.build_surfaces(1.0, 0.0)?);
        let windows = self.windows(&surfaces);

        let mirrorable = !self.system.has_spots()
            && !self.system.has_pulsations()
            && (self.system.orbit().argument_of_periastron() - std::f64::consts::FRAC_PI_2).abs()
                < 1e-12;

        if !mirrorable {
            let jobs = positions
                .iter()
                .map(|&p| (p.index, p, surfaces.clone()))
                .collect();
            return self.observe_parallel(jobs, &windows, flux);
        }

        // fold phases across the inferior conjunction
        let fold = |phase: f64| -> i64 {
            let folded = phase.rem_euclid(1.0);
            let folded = folded.min(1.0 - folded);
            (folded * 1e12).round() as i64
        };
        let mut unique: Vec<(i64, OrbitalPosition)> = Vec::new();
        for position in positions {
            let key = fold(self.system.orbit().true_phase(position.phase));
            if !unique.iter().any(|(k, _)| *k == key) {
                unique.push((key, *position));
            }
        }
        let jobs = unique
            .iter()
            .enumerate()
            .map(|(slot, (_, p))| (slot, *p, surfaces.clone()))
            .collect();
        let mut unique_flux = vec![Vec::new(); unique.len()];
        self.observe_parallel(jobs, &windows, &mut unique_flux)?;
        for position in positions {
            let key = fold(self.system.orbit().true_phase(position.phase));
            let slot = unique
                .iter()
                .position(|(k, _)| *k == key)
                .expect("phase was folded above");
            flux[position.index] = unique_flux[slot].clone();
        }
        Ok(())
    }

    /// Mode 0: full rebuild at every phase.
    fn run_exact(
        &self,
        positions: &[OrbitalPosition],
        flux: &mut [Vec<f64>],
    ) -> Result<(), CurveError> {
        // geometry differs per phase, so workers build their own surfaces
        let abort = AtomicBool::new(false);
        let mut results: Vec<(usize, Option<Result<Vec<f64>, CurveError>>)> = positions
            .par_iter()
            .map(|position| {
                if abort.load(Ordering::Relaxed) {
                    return (position.index, None);
                }
                let observed = self
                    .build_surfaces(position.distance, position.phase)
                    .and_then(|surfaces| {
                        let windows = self.windows(&surfaces);
                        self.observe(&surfaces, *position, &windows)
                    });
                if observed.is_err() {
                    abort.store(true, Ordering::Relaxed);
                }
                (position.index, Some(observed))
            })
            .collect();
        results.sort_by_key(|(slot, _)| *slot);
        for (slot, observed) in results {
            match observed {
                Some(Ok(bands)) => flux[slot] = bands,
                Some(Err(e)) => return Err(e),
                None => {
                    return Err(CurveError::InvalidInput(
                        "phase skipped after abort".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Mode 2: phases meeting across the apsidal line share separations, so
    /// geometry is built once per unique separation.
    fn run_apsidal(
        &self,
        positions: &[OrbitalPosition],
        flux: &mut [Vec<f64>],
    ) -> Result<(), CurveError> {
        if positions.is_empty() {
            return Ok(());
        }
        let key = |d: f64| (d * 1e9).round() as i64;
        let mut unique: Vec<(i64, f64)> = Vec::new();
        for position in positions {
            let k = key(position.distance);
            if !unique.iter().any(|(existing, _)| *existing == k) {
                unique.push((k, position.distance));
            }
        }
        let built: Vec<(i64, Arc<SystemSurfaces>)> = unique
            .par_iter()
            .map(|&(k, d)| Ok((k, Arc::new(self.build_surfaces(d, 0.0)?))))
            .collect::<Result<_, CurveError>>()?;
        let surfaces_for = |d: f64| -> Arc<SystemSurfaces> {
            let k = key(d);
            built
                .iter()
                .find(|(existing, _)| *existing == k)
                .expect("separation was built above")
                .1
                .clone()
        };
        let windows = self.windows(&built[0].1);
        let jobs = positions
            .iter()
            .map(|&p| (p.index, p, surfaces_for(p.distance)))
            .collect();
        self.observe_parallel(jobs, &windows, flux)
    }

    /// Mode 3: exact builds on a sparse phase subset, linear interpolation
    /// of the integrated observable in between.
    fn run_interpolating(
        &self,
        positions: &[OrbitalPosition],
        flux: &mut [Vec<f64>],
    ) -> Result<(), CurveError> {
        let sparse: Vec<OrbitalPosition> = positions
            .iter()
            .enumerate()
            .filter(|(i, _)| i % 2 == 0 || *i == positions.len() - 1)
            .map(|(_, p)| *p)
            .collect();
        // run_apsidal writes by position.index, which is the original slot
        let mut sparse_flux = vec![Vec::new(); positions.len()];
        self.run_apsidal(&sparse, &mut sparse_flux)?;

        for (i, position) in positions.iter().enumerate() {
            if !sparse_flux[position.index].is_empty() {
                flux[position.index] = sparse_flux[position.index].clone();
                continue;
            }
            // neighbours are exact by construction
            let prev = &positions[i - 1];
            let next = &positions[i + 1];
            let weight = if next.phase > prev.phase {
                (position.phase - prev.phase) / (next.phase - prev.phase)
            } else {
                0.5
            };
            let lo = &sparse_flux[prev.index];
            let hi = &sparse_flux[next.index];
            flux[position.index] = lo
                .iter()
                .zip(hi)
                .map(|(a, b)| a + (b - a) * weight)
                .collect();
        }
        Ok(())
    }

    /// Mode 4: consecutive phases whose characteristic radii drift below
    /// the threshold reuse the previous geometry.
    fn run_similarity(
        &self,
        positions: &[OrbitalPosition],
        flux: &mut [Vec<f64>],
    ) -> Result<(), CurveError> {
        let mut current: Option<(Arc<SystemSurfaces>, Vec<f64>)> = None;
        for position in positions {
            let radii = self.characteristic_radii(position.distance)?;
            let reusable = current.as_ref().is_some_and(|(_, previous)| {
                radii
                    .iter()
                    .zip(previous)
                    .all(|(new, old)| ((new - old) / old).abs() < self.config.max_relative_d_r_point)
            });
            if !reusable {
                let surfaces = Arc::new(self.build_surfaces(position.distance, position.phase)?);
                current = Some((surfaces, radii));
            }
            let (surfaces, _) = current.as_ref().expect("surfaces built above");
            let windows = self.windows(surfaces);
            flux[position.index] = self.observe(surfaces, *position, &windows)?;
        }
        Ok(())
    }

    fn characteristic_radii(&self, d: f64) -> Result<Vec<f64>, CurveError> {
        let mut radii = Vec::with_capacity(8);
        for component in Component::BOTH {
            let r = self
                .system
                .characteristic_radii(component, d)
                .map_err(algol_mesh::MeshError::from)?;
            radii.push(r.polar);
            radii.push(r.side);
            radii.push(r.backward);
            if let Some(forward) = r.forward {
                radii.push(forward);
            }
        }
        Ok(radii)
    }

    /// Kinematic radial-velocity curves, systemic velocity included.
    pub fn radial_velocity_curves(&self, phases: &[f64]) -> Result<RvCurves, CurveError> {
        let orbit = self.system.orbit();
        let positions = orbit.orbital_motion(phases)?;
        let k_total = projected_semi_amplitude(
            self.system.semi_major_axis(),
            orbit.period(),
            orbit.eccentricity(),
            orbit.inclination(),
        );
        let q = self.system.mass_ratio();
        let k_primary = k_total * q / (1.0 + q);
        let k_secondary = k_total / (1.0 + q);
        let gamma = self.system.gamma();
        let omega = orbit.argument_of_periastron();
        let e = orbit.eccentricity();

        let (primary, secondary) = positions
            .iter()
            .map(|p| {
                (
                    gamma + radial_velocity(k_primary, e, omega, p.true_anomaly),
                    gamma - radial_velocity(k_secondary, e, omega, p.true_anomaly),
                )
            })
            .unzip();
        Ok(RvCurves {
            phases: phases.to_vec(),
            primary,
            secondary,
        })
    }
}
