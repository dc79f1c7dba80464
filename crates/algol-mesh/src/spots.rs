// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Circular spot embedding.
//!
//! Each spot contributes a cap of concentric point rings solved on the
//! equipotential. Base points under the cap are removed, the merged cloud is
//! re-triangulated through the hull pathway, and faces whose three vertices
//! belong to one spot are labelled with it. Insertion order implements the
//! overlap policy: a later spot swallows enclosed points of earlier ones.

use std::f64::consts::TAU;

use glam::DVec3;
use log::{info, warn};

use algol_bodies::Spot;
use algol_roche::surface::EquipotentialSolver;

use crate::MeshError;
use crate::fields::to_own_frame;
use crate::hull::convex_hull;
use crate::mesh::{SurfaceMesh, spherical_to_cartesian};
use crate::mesh::{is_seam_face, project_for_hull};

/// Geometry context for spot solving on one component.
#[derive(Clone, Copy, Debug)]
pub struct SpotContext<'a> {
    pub solver: &'a EquipotentialSolver<'a>,
    pub distance: f64,
    pub secondary: bool,
    /// Component discretisation step, used when a spot carries none.
    pub default_alpha: f64,
    /// Own-frame neck coordinate for over-contact systems; spot points past
    /// the neck are rejected and reject the whole spot.
    pub own_neck: Option<f64>,
}

fn direction(phi: f64, theta: f64) -> DVec3 {
    spherical_to_cartesian(1.0, phi, theta)
}

/// Rodrigues rotation of `v` around the unit axis `axis`.
fn rotate_about(v: DVec3, axis: DVec3, angle: f64) -> DVec3 {
    v * angle.cos()
        + axis.cross(v) * angle.sin()
        + axis * axis.dot(v) * (1.0 - angle.cos())
}

/// Own-frame cap points of one spot: the centre followed by concentric
/// rings. `None` when any solve fails or a point crosses the neck.
fn spot_points(spot: &Spot, ctx: &SpotContext) -> Option<Vec<DVec3>> {
    let alpha = spot.discretization_factor.unwrap_or(ctx.default_alpha);
    let predicate = |rho: f64, phi: f64, theta: f64| match ctx.own_neck {
        Some(neck) => rho * phi.cos() * theta.sin() < neck,
        None => true,
    };

    let mut points = Vec::new();
    let centre_axis = direction(spot.longitude, spot.latitude);
    let rho = ctx
        .solver
        .radius_if(ctx.distance, spot.longitude, spot.latitude, |r| {
            predicate(r, spot.longitude, spot.latitude)
        })
        .ok()?;
    points.push(centre_axis * rho);

    let rings = (spot.angular_radius / alpha).floor() as usize;
    for ring in 1..=rings {
        let delta = ring as f64 * alpha;
        let seed = direction(spot.longitude, spot.latitude + delta);
        let count = (TAU * ring as f64).floor().max(1.0) as usize;
        for i in 0..count {
            let azimuth = TAU * i as f64 / count as f64;
            let dir = rotate_about(seed, centre_axis, azimuth);
            let theta = dir.z.clamp(-1.0, 1.0).acos();
            let phi = dir.y.atan2(dir.x).rem_euclid(TAU);
            let rho = ctx
                .solver
                .radius_if(ctx.distance, phi, theta, |r| predicate(r, phi, theta))
                .ok()?;
            points.push(dir * rho);
        }
    }
    Some(points)
}

/// Per-point ownership in the merged cloud.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Owner {
    Star,
    Spot(usize),
}

/// Embeds `spots` into `mesh`, returning the re-triangulated mesh and the
/// per-face spot labels. Invalidates the symmetry maps.
pub fn incorporate_spots(
    mesh: SurfaceMesh,
    spots: &[Spot],
    ctx: &SpotContext,
) -> Result<(SurfaceMesh, Vec<Option<usize>>), MeshError> {
    // own-frame cloud with ownership labels
    let mut points: Vec<DVec3> = mesh
        .points
        .iter()
        .map(|&p| to_own_frame(p, ctx.distance, ctx.secondary))
        .collect();
    let mut owners: Vec<Owner> = vec![Owner::Star; points.len()];
    let mut inserted: Vec<usize> = Vec::new();

    for (index, spot) in spots.iter().enumerate() {
        let Some(cap) = spot_points(spot, ctx) else {
            info!("spot {index} does not satisfy the surface conditions and is omitted");
            continue;
        };
        // remove points of the base mesh and of earlier spots under the cap
        let centre_axis = direction(spot.longitude, spot.latitude);
        let mut keep_points = Vec::with_capacity(points.len());
        let mut keep_owners = Vec::with_capacity(points.len());
        for (&p, &owner) in points.iter().zip(&owners) {
            let cos_sep = (p.normalize_or_zero()).dot(centre_axis).clamp(-1.0, 1.0);
            if cos_sep.acos() < spot.angular_radius {
                continue;
            }
            keep_points.push(p);
            keep_owners.push(owner);
        }
        points = keep_points;
        owners = keep_owners;

        // earlier spots whose whole point set was swallowed are gone
        inserted.retain(|&earlier| {
            let survives = owners.contains(&Owner::Spot(earlier));
            if !survives {
                info!("spot {earlier} fully covered by spot {index}; removing it");
            }
            survives
        });

        owners.extend(std::iter::repeat_n(Owner::Spot(index), cap.len()));
        points.extend(cap);
        inserted.push(index);
    }

    if inserted.is_empty() {
        // nothing embedded; the caller keeps the symmetric mesh
        let faces = mesh.faces.len();
        return Ok((mesh, vec![None; faces]));
    }

    // re-triangulate the merged cloud through the hull pathway
    let faces: Vec<[usize; 3]> = match ctx.own_neck {
        Some(neck) => convex_hull(&project_for_hull(&points, neck))
            .map_err(|e| MeshError::Malformed(e.to_string()))?
            .into_iter()
            .filter(|f| !is_seam_face(&points, f, neck + 1e-8))
            .collect(),
        None => convex_hull(&points).map_err(|e| MeshError::Malformed(e.to_string()))?,
    };

    let face_spot: Vec<Option<usize>> = faces
        .iter()
        .map(|face| match face.map(|v| owners[v]) {
            [Owner::Spot(a), Owner::Spot(b), Owner::Spot(c)] if a == b && b == c => Some(a),
            _ => None,
        })
        .collect();

    // every embedded spot must retain at least one face
    for &index in &inserted {
        if !face_spot.contains(&Some(index)) {
            warn!("spot {index} retained no faces after embedding; its cap melts into the star");
        }
    }

    // back to the system frame
    let points: Vec<DVec3> = points
        .iter()
        .map(|&p| to_own_frame(p, ctx.distance, ctx.secondary))
        .collect();

    Ok((
        SurfaceMesh {
            points,
            faces,
            symmetry: None,
        },
        face_spot,
    ))
}
