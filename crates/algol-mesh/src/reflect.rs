// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Iterative reflection effect between the two components.
//!
//! Mutually visible face pairs exchange bolometric heating scaled by the
//! receiving face's albedo. Each iteration reads the previous iteration's
//! temperatures, so the scheme is deterministic regardless of face order.
//!
//! The pairwise visibility test here is the normal-orientation condition
//! alone, which is equivalent to "line of sight not blocked" only between
//! convex lobes. Callers must restrict the exchange to detached and
//! semi-detached configurations; a shared envelope's neck breaks the
//! convexity this test relies on (see [crate::builder::build_system_surfaces]).

use crate::fields::SurfaceFields;

/// Applies `iterations` passes of mutual heating between the two components'
/// fields. Faces see each other when both normals point at the line joining
/// their centres, a sufficient test for convex detached lobes only.
pub fn apply_reflection(
    primary: &mut SurfaceFields,
    secondary: &mut SurfaceFields,
    primary_albedo: f64,
    secondary_albedo: f64,
    iterations: usize,
) {
    for _ in 0..iterations {
        let heated_primary = heated(primary, secondary, primary_albedo);
        let heated_secondary = heated(secondary, primary, secondary_albedo);
        primary.temperatures = heated_primary;
        secondary.temperatures = heated_secondary;
    }
}

/// New temperatures of `target` after one pass of irradiation by `source`.
fn heated(target: &SurfaceFields, source: &SurfaceFields, albedo: f64) -> Vec<f64> {
    let mut result = Vec::with_capacity(target.temperatures.len());
    for i in 0..target.temperatures.len() {
        let mut irradiation = 0.0;
        for j in 0..source.temperatures.len() {
            let line = source.centres[j] - target.centres[i];
            let distance_sq = line.length_squared();
            let cos_target = target.normals[i].dot(line);
            let cos_source = -source.normals[j].dot(line);
            if cos_target <= 0.0 || cos_source <= 0.0 {
                continue;
            }
            // view-factor kernel, cosines normalised by the pair distance
            irradiation += source.temperatures[j].powi(4) * cos_target * cos_source
                * source.areas[j]
                / (std::f64::consts::PI * distance_sq * distance_sq);
        }
        let t4 = target.temperatures[i].powi(4) + albedo * irradiation;
        result.push(t4.powf(0.25));
    }
    result
}
