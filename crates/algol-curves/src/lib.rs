// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Curve synthesis: orbital positioning, eclipse coverage and the phase
//! engine.
//!
//! Workers iterate over phase batches, each owning its position container
//! and clipper scratch; mesh data, atmosphere caches and throughput tables
//! are shared read-only. Recoverable degradations (degenerate clipped faces,
//! dropped spots) are logged; everything else aborts the curve.

pub mod config;
pub mod coverage;
pub mod engine;
pub mod position;

pub use config::{ApproximationChoice, AtlasKind, CurveConfig};
pub use engine::{CurveEngine, CurveMode, LightCurves, RvCurves};
pub use position::OnPosition;

use thiserror::Error;

use algol_bodies::BodiesError;
use algol_mesh::MeshError;
use algol_orbit::OrbitError;
use algol_phot::PhotError;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum CurveError {
    #[error(transparent)]
    Orbit(#[from] OrbitError),
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error(transparent)]
    Phot(#[from] PhotError),
    #[error(transparent)]
    Bodies(#[from] BodiesError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
