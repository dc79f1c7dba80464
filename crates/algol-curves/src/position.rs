// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Orbital-position container.
//!
//! For one orbital position the component meshes are rotated about the
//! system barycentre by the orbital azimuth, tilted by the inclination, and
//! expressed in the observer frame: the sky plane is yz and the line of
//! sight is +x. The container is immutable after positioning, so phase
//! workers can hold their own without touching shared state.

use std::f64::consts::FRAC_PI_2;

use glam::{DMat3, DVec3};

use algol_mesh::ComponentSurface;
use algol_orbit::OrbitalPosition;

/// The observer sits at +infinity on the x-axis.
pub const LINE_OF_SIGHT: DVec3 = DVec3::X;

/// One component's rotated geometry.
#[derive(Clone, Debug)]
pub struct PositionedComponent<'a> {
    pub surface: &'a ComponentSurface,
    pub points: Vec<DVec3>,
    pub centres: Vec<DVec3>,
    pub normals: Vec<DVec3>,
    /// Rotated component centre.
    pub centre: DVec3,
}

impl PositionedComponent<'_> {
    /// Dark-side filter: indices of faces whose normals point at the
    /// observer.
    pub fn visible_faces(&self) -> Vec<usize> {
        self.normals
            .iter()
            .enumerate()
            .filter(|(_, n)| n.dot(LINE_OF_SIGHT) > 0.0)
            .map(|(i, _)| i)
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct OnPosition<'a> {
    pub position: OrbitalPosition,
    pub primary: PositionedComponent<'a>,
    pub secondary: PositionedComponent<'a>,
}

impl<'a> OnPosition<'a> {
    pub fn new(
        primary: &'a ComponentSurface,
        secondary: &'a ComponentSurface,
        position: OrbitalPosition,
        inclination: f64,
        mass_ratio: f64,
    ) -> Self {
        let barycentre = DVec3::new(
            position.distance * mass_ratio / (1.0 + mass_ratio),
            0.0,
            0.0,
        );
        let rotation = DMat3::from_rotation_y(FRAC_PI_2 - inclination)
            * DMat3::from_rotation_z(FRAC_PI_2 - position.azimuth);
        let place = |surface: &'a ComponentSurface, centre: DVec3| PositionedComponent {
            surface,
            points: surface
                .mesh
                .points
                .iter()
                .map(|&p| rotation * (p - barycentre))
                .collect(),
            centres: surface
                .fields
                .centres
                .iter()
                .map(|&c| rotation * (c - barycentre))
                .collect(),
            normals: surface.fields.normals.iter().map(|&n| rotation * n).collect(),
            centre: rotation * (centre - barycentre),
        };
        Self {
            position,
            primary: place(primary, DVec3::ZERO),
            secondary: place(secondary, DVec3::new(position.distance, 0.0, 0.0)),
        }
    }

    /// Projected sky-plane separation of the two centres.
    pub fn projected_separation(&self) -> f64 {
        let delta = self.secondary.centre - self.primary.centre;
        (delta.y * delta.y + delta.z * delta.z).sqrt()
    }

    /// Whether the primary or the secondary is closer to the observer.
    pub fn primary_in_front(&self) -> bool {
        self.primary.centre.x > self.secondary.centre.x
    }
}
