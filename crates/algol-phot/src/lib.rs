// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Photometric machinery: passband throughputs, model-atmosphere lookup and
//! limb darkening.
//!
//! Atmosphere tables are reached through the narrow [Atlas] trait; the
//! directory-backed implementation reads the ck04/k93 CSV trees lazily with
//! per-table coalescing, and the synthetic Planck atlas serves as an
//! always-available fallback and test double.

pub mod atlas;
pub mod ld;
pub mod passband;
pub mod radiance;

pub use atlas::{Atlas, DirectoryAtlas, FluxSpectrum, PlanckAtlas};
pub use ld::{ConstantLd, DirectoryLd, LdSource, LimbDarkeningLaw, limb_darkening_factor};
pub use passband::Passband;
pub use radiance::RadianceEvaluator;

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum PhotError {
    #[error("{quantity} = {value} outside table coverage [{lower}, {upper}]")]
    OutOfBound {
        quantity: &'static str,
        value: f64,
        lower: f64,
        upper: f64,
    },
    #[error("unknown passband `{0}`")]
    UnknownPassband(String),
    #[error("table io error: {0}")]
    Io(String),
    #[error("table parse error: {0}")]
    Parse(String),
}
