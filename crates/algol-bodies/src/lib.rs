// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Stellar components and binary-system assembly.
//!
//! [Star] and [BinarySystem] are the validated domain types; the `records`
//! module carries the two supported logical input representations (standard
//! masses vs. community mass ratio) and resolves which one applies.

pub mod records;
pub mod star;
pub mod system;

pub use records::{ComponentRecord, RecordKind, SystemRecord};
pub use star::{Pulsation, Spot, Star};
pub use system::{BinarySystem, Component, OrbitalParams};

pub use algol_roche::morphology::Morphology;

use thiserror::Error;

use algol_orbit::OrbitError;
use algol_roche::lagrange::LagrangeError;
use algol_roche::morphology::MorphologyError;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum BodiesError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    NonPhysical(#[from] MorphologyError),
    #[error(transparent)]
    Orbit(#[from] OrbitError),
    #[error(transparent)]
    Lagrange(#[from] LagrangeError),
}
