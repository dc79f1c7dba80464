// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! algol models close eclipsing binaries: given two stellar components and
//! the orbital parameters it reconstructs each star's Roche equipotential
//! surface, discretises it into a triangular mesh with surface-property
//! fields (optionally spotted), and synthesises multi-band light curves and
//! radial-velocity curves across orbital phases.
//!
//! This crate is the facade over the algol workspace; the heavy lifting
//! lives in the per-concern crates re-exported below.

pub mod bodies {
    pub use algol_bodies::*;
}

pub mod curves {
    pub use algol_curves::*;
}

pub mod math {
    pub use algol_math::*;
}

pub mod mesh {
    pub use algol_mesh::*;
}

pub mod orbit {
    pub use algol_orbit::*;
}

pub mod phot {
    pub use algol_phot::*;
}

pub mod roche {
    pub use algol_roche::*;
}

pub mod units {
    pub use algol_units::*;
}

/// Opens the directory-backed atmosphere tables selected by the engine
/// configuration.
pub fn atlas_for(kind: algol_curves::AtlasKind, root: std::path::PathBuf) -> algol_phot::DirectoryAtlas {
    algol_phot::DirectoryAtlas::new(root, kind.prefix())
}

pub mod prelude {
    pub use algol_bodies::{
        BinarySystem, Component, ComponentRecord, OrbitalParams, Pulsation, Spot, Star,
        SystemRecord,
    };
    pub use algol_curves::{
        ApproximationChoice, AtlasKind, CurveConfig, CurveEngine, CurveMode, LightCurves,
        RvCurves,
    };
    pub use algol_mesh::{ComponentSurface, build_surface};
    pub use algol_phot::{
        Atlas, ConstantLd, DirectoryAtlas, LdSource, LimbDarkeningLaw, Passband, PlanckAtlas,
    };
    pub use algol_roche::Morphology;
}
