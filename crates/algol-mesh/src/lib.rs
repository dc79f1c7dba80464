// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Triangular surface meshes of Roche equipotentials.
//!
//! The mesh builder discretises one quadrant of each component's surface and
//! replicates it through the configuration's symmetries, stitching the neck
//! for over-contact envelopes. Spot caps are embedded afterwards, and the
//! surface-field pass attaches areas, normals, gravity and temperature to
//! every face.

pub mod builder;
pub mod fields;
pub mod hull;
pub mod mesh;
pub mod pulsate;
pub mod reflect;
pub mod spots;

pub use builder::{ComponentSurface, build_surface};
pub use fields::SurfaceFields;
pub use mesh::{SurfaceMesh, Symmetry};

use thiserror::Error;

use algol_roche::surface::SolveError;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum MeshError {
    #[error(transparent)]
    Solve(#[from] SolveError),
    #[error("triangulation produced a malformed surface: {0}")]
    Malformed(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
