// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Eclipse geometry and fractional surface coverage.
//!
//! Faces of the foreground component keep their full area. Background faces
//! are classified against the convex silhouette of the foreground
//! projection: fully enclosed faces are hidden, boundary-crossing faces are
//! clipped in the sky plane and keep the unoccluded fraction of their true
//! area. Degenerate clipper input yields zero coverage with a diagnostic
//! instead of failing the phase.

use glam::DVec2;
use itertools::Itertools;
use log::warn;

use algol_math::hull2d::{convex_hull, cross, point_in_convex};
use algol_orbit::Orbit;

use crate::position::OnPosition;

/// Relative area cut below which a face counts as hidden.
const COVERAGE_TOL: f64 = 1e-12;

/// Azimuth windows around the conjunctions inside which an eclipse is
/// geometrically possible, precomputed so the clipper only runs where it
/// can matter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EclipseWindows {
    half_width: Option<f64>,
}

impl EclipseWindows {
    /// Conservative windows from the components' largest radii and the
    /// periastron separation.
    pub fn new(orbit: &Orbit, r_primary: f64, r_secondary: f64) -> Self {
        let d = orbit.periastron_distance();
        let cos_i = orbit.inclination().cos();
        let sin_i = orbit.inclination().sin();
        let reach = (r_primary + r_secondary) / d;
        let arg = reach * reach - cos_i * cos_i;
        if arg <= 0.0 || sin_i == 0.0 {
            return Self { half_width: None };
        }
        let half_width = (arg.sqrt() / sin_i).min(1.0).asin();
        Self {
            half_width: Some(half_width),
        }
    }

    /// Whether an eclipse is possible at orbital azimuth `azimuth`.
    pub fn contains(&self, azimuth: f64) -> bool {
        let Some(half_width) = self.half_width else {
            return false;
        };
        let from_conjunction = |centre: f64| {
            let delta = (azimuth - centre).rem_euclid(std::f64::consts::TAU);
            delta.min(std::f64::consts::TAU - delta)
        };
        from_conjunction(std::f64::consts::FRAC_PI_2) <= half_width
            || from_conjunction(3.0 * std::f64::consts::FRAC_PI_2) <= half_width
    }
}

/// Fractional visible area per face for both components, with the emergent
/// cosines of the dark-side filter already applied (hidden faces carry
/// zero coverage).
#[derive(Clone, Debug)]
pub struct Coverage {
    pub primary: Vec<f64>,
    pub secondary: Vec<f64>,
}

/// Signed area of a polygon (positive when counter-clockwise).
fn polygon_area(polygon: &[DVec2]) -> f64 {
    0.5 * polygon
        .iter()
        .circular_tuple_windows()
        .map(|(a, b)| a.perp_dot(*b))
        .sum::<f64>()
}

/// Separating-axis rejection for two convex polygons.
fn sat_disjoint(a: &[DVec2], b: &[DVec2]) -> bool {
    let separated_by_edges_of = |poly: &[DVec2], other: &[DVec2]| {
        for i in 0..poly.len() {
            let edge = poly[(i + 1) % poly.len()] - poly[i];
            let axis = DVec2::new(-edge.y, edge.x);
            let (mut min_a, mut max_a) = (f64::INFINITY, f64::NEG_INFINITY);
            for p in poly {
                let d = axis.dot(*p);
                min_a = min_a.min(d);
                max_a = max_a.max(d);
            }
            let (mut min_b, mut max_b) = (f64::INFINITY, f64::NEG_INFINITY);
            for p in other {
                let d = axis.dot(*p);
                min_b = min_b.min(d);
                max_b = max_b.max(d);
            }
            if max_a < min_b || max_b < min_a {
                return true;
            }
        }
        false
    };
    separated_by_edges_of(a, b) || separated_by_edges_of(b, a)
}

/// Clips `subject` against the counter-clockwise convex `clip` polygon
/// (Sutherland–Hodgman). Returns the intersection polygon.
fn clip_convex(subject: &[DVec2], clip: &[DVec2]) -> Vec<DVec2> {
    let mut output: Vec<DVec2> = subject.to_vec();
    for i in 0..clip.len() {
        if output.is_empty() {
            break;
        }
        let a = clip[i];
        let b = clip[(i + 1) % clip.len()];
        let input = std::mem::take(&mut output);
        for j in 0..input.len() {
            let current = input[j];
            let previous = input[(j + input.len() - 1) % input.len()];
            let current_in = cross(a, b, current) >= 0.0;
            let previous_in = cross(a, b, previous) >= 0.0;
            if current_in {
                if !previous_in {
                    output.push(intersect_lines(previous, current, a, b));
                }
                output.push(current);
            } else if previous_in {
                output.push(intersect_lines(previous, current, a, b));
            }
        }
    }
    output
}

fn intersect_lines(p0: DVec2, p1: DVec2, a: DVec2, b: DVec2) -> DVec2 {
    let r = p1 - p0;
    let s = b - a;
    let denominator = r.perp_dot(s);
    if denominator.abs() < f64::EPSILON {
        return p0;
    }
    let t = (a - p0).perp_dot(s) / denominator;
    p0 + r * t
}

fn project(p: glam::DVec3) -> DVec2 {
    DVec2::new(p.y, p.z)
}

/// Computes per-face coverage for one orbital position.
///
/// `in_eclipse` carries the precheck; when false the clipper never runs and
/// visible faces keep their full areas.
pub fn compute_coverage(on_pos: &OnPosition, in_eclipse: bool) -> Coverage {
    let full = |component: &crate::position::PositionedComponent<'_>| {
        let mut coverage = vec![0.0; component.surface.fields.areas.len()];
        for face in component.visible_faces() {
            coverage[face] = component.surface.fields.areas[face];
        }
        coverage
    };

    if !in_eclipse {
        return Coverage {
            primary: full(&on_pos.primary),
            secondary: full(&on_pos.secondary),
        };
    }

    let (front, back) = if on_pos.primary_in_front() {
        (&on_pos.primary, &on_pos.secondary)
    } else {
        (&on_pos.secondary, &on_pos.primary)
    };

    // silhouette of the foreground projection
    let projected: Vec<DVec2> = front.points.iter().map(|&p| project(p)).collect();
    let hull_indices = convex_hull(&projected);
    let silhouette: Vec<DVec2> = hull_indices.iter().map(|&i| projected[i]).collect();

    let front_coverage = full(front);
    let mut back_coverage = vec![0.0; back.surface.fields.areas.len()];
    for face in back.visible_faces() {
        let area = back.surface.fields.areas[face];
        let [a, b, c] = back.surface.mesh.faces[face];
        let triangle = [
            project(back.points[a]),
            project(back.points[b]),
            project(back.points[c]),
        ];
        let projected_area = polygon_area(&triangle).abs();
        if projected_area < COVERAGE_TOL * area {
            warn!("degenerate projected face {face}; treating as hidden");
            continue;
        }

        let all_inside = triangle.iter().all(|&p| point_in_convex(p, &silhouette));
        if all_inside {
            continue; // fully occulted
        }
        if sat_disjoint(&triangle, &silhouette) {
            back_coverage[face] = area;
            continue;
        }
        let occulted = clip_convex(&triangle, &silhouette);
        let occulted_area = if occulted.len() < 3 {
            0.0
        } else {
            polygon_area(&occulted).abs()
        };
        let visible_fraction = (1.0 - occulted_area / projected_area).clamp(0.0, 1.0);
        let covered = visible_fraction * area;
        back_coverage[face] = if covered < COVERAGE_TOL * area {
            0.0
        } else {
            covered
        };
    }

    if on_pos.primary_in_front() {
        Coverage {
            primary: front_coverage,
            secondary: back_coverage,
        }
    } else {
        Coverage {
            primary: back_coverage,
            secondary: front_coverage,
        }
    }
}
