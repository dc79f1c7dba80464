// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Per-component surface assembly: mesh, spots and fields in one pass.

use log::debug;

use algol_bodies::{BinarySystem, Component, Morphology, Spot};
use algol_roche::surface::neck_position;

use crate::MeshError;
use crate::fields::{self, FieldParams, SurfaceFields};
use crate::mesh::{SurfaceMesh, mesh_detached, mesh_over_contact};
use crate::reflect::apply_reflection;
use crate::spots::{SpotContext, incorporate_spots};

/// Finished surface of one component at one separation.
#[derive(Clone, Debug)]
pub struct ComponentSurface {
    pub component: Component,
    pub mesh: SurfaceMesh,
    pub fields: SurfaceFields,
    /// Spot index per face, `None` off-spot.
    pub face_spot: Vec<Option<usize>>,
    pub polar_radius: f64,
    pub side_radius: f64,
    pub forward_radius: Option<f64>,
    pub backward_radius: f64,
}

impl ComponentSurface {
    /// Largest projected extent, used for eclipse prechecks.
    pub fn max_radius(&self) -> f64 {
        self.forward_radius
            .unwrap_or(self.backward_radius)
            .max(self.backward_radius)
            .max(self.side_radius)
            .max(self.polar_radius)
    }
}

/// Builds the surface of `component` at separation `d`, with `spots` already
/// adjusted for any longitude drift.
pub fn build_surface_with_spots(
    system: &BinarySystem,
    component: Component,
    d: f64,
    spots: &[Spot],
) -> Result<ComponentSurface, MeshError> {
    let star = system.star(component);
    let solver = system.solver(component);
    let alpha = star.discretization_factor();
    let secondary = component == Component::Secondary;
    let over_contact = system.morphology().is_over_contact();

    let (mesh, own_neck) = if over_contact {
        let primary_solver = system.solver(Component::Primary);
        let secondary_solver = system.solver(Component::Secondary);
        let neck = neck_position(&primary_solver, &secondary_solver)?;
        let own_neck = if secondary { 1.0 - neck } else { neck };
        (
            mesh_over_contact(&solver, alpha, neck, secondary)?,
            Some(own_neck),
        )
    } else {
        (mesh_detached(&solver, d, alpha, secondary)?, None)
    };
    debug!(
        "meshed {component:?}: {} points, {} faces",
        mesh.points.len(),
        mesh.faces.len()
    );

    let ctx = SpotContext {
        solver: &solver,
        distance: d,
        secondary,
        default_alpha: alpha,
        own_neck,
    };
    let (mesh, face_spot) = incorporate_spots(mesh, spots, &ctx)?;

    let params = FieldParams {
        potential: system.potential(component),
        distance: d,
        secondary,
        mass: star.mass(),
        semi_major_axis: system.semi_major_axis(),
        t_eff: star.t_eff(),
        gravity_darkening: star.gravity_darkening(),
        polar_radius: solver.polar_radius(d)?,
    };
    let fields = fields::compute(&mesh, &params, |face| {
        face_spot[face].map_or(1.0, |s| spots[s].temperature_factor)
    });

    Ok(ComponentSurface {
        component,
        mesh,
        fields,
        face_spot,
        polar_radius: params.polar_radius,
        side_radius: solver.side_radius(d)?,
        forward_radius: solver.forward_radius(d).ok(),
        backward_radius: solver.backward_radius(d)?,
    })
}

/// Builds the surface of `component` at separation `d` with the star's own
/// spot list.
pub fn build_surface(
    system: &BinarySystem,
    component: Component,
    d: f64,
) -> Result<ComponentSurface, MeshError> {
    build_surface_with_spots(system, component, d, system.star(component).spots())
}

/// Whether the reflection exchange is valid for this configuration: the
/// normal-orientation visibility test holds between convex lobes only, so
/// contact envelopes are excluded rather than heated across the neck.
pub fn supports_reflection(system: &BinarySystem) -> bool {
    matches!(
        system.morphology(),
        Morphology::Detached | Morphology::SemiDetached
    )
}

/// Builds both components and applies the reflection effect where the
/// configuration supports it.
pub fn build_system_surfaces(
    system: &BinarySystem,
    d: f64,
    reflection_iterations: usize,
) -> Result<(ComponentSurface, ComponentSurface), MeshError> {
    let mut primary = build_surface(system, Component::Primary, d)?;
    let mut secondary = build_surface(system, Component::Secondary, d)?;
    if reflection_iterations > 0 {
        if supports_reflection(system) {
            apply_reflection(
                &mut primary.fields,
                &mut secondary.fields,
                system.primary().albedo(),
                system.secondary().albedo(),
                reflection_iterations,
            );
        } else {
            debug!(
                "skipping reflection effect for {:?} morphology",
                system.morphology()
            );
        }
    }
    Ok((primary, secondary))
}
