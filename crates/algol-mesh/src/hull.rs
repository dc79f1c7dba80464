// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Incremental three-dimensional convex hull.
//!
//! Surface point clouds here are convex by construction (equipotential
//! surfaces, or their sphere projections in the over-contact case), so the
//! hull doubles as the surface triangulation. Faces are returned with
//! outward orientation.

use glam::DVec3;
use thiserror::Error;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum HullError {
    #[error("hull needs at least 4 points, got {0}")]
    TooFewPoints(usize),
    #[error("input points are degenerate (affinely dependent)")]
    Degenerate,
}

#[derive(Clone, Copy)]
struct Face {
    vertices: [usize; 3],
    normal: DVec3,
    offset: f64,
    alive: bool,
}

impl Face {
    fn new(points: &[DVec3], a: usize, b: usize, c: usize) -> Self {
        let cross = (points[b] - points[a]).cross(points[c] - points[a]);
        // unit normal, so that distance() is geometric and one epsilon fits
        // faces of every size
        let normal = cross.normalize_or_zero();
        Self {
            vertices: [a, b, c],
            normal,
            offset: normal.dot(points[a]),
            alive: true,
        }
    }

    fn distance(&self, p: DVec3) -> f64 {
        self.normal.dot(p) - self.offset
    }
}

/// Builds the convex hull of `points` and returns its faces as vertex-index
/// triples with outward orientation.
pub fn convex_hull(points: &[DVec3]) -> Result<Vec<[usize; 3]>, HullError> {
    let n = points.len();
    if n < 4 {
        return Err(HullError::TooFewPoints(n));
    }
    let scale = points
        .iter()
        .map(|p| p.length())
        .fold(0.0f64, f64::max)
        .max(f64::MIN_POSITIVE);
    let eps = 1e-9 * scale;

    let (a, b, c, d) = initial_simplex(points, eps)?;

    let centroid = (points[a] + points[b] + points[c] + points[d]) / 4.0;
    let mut faces: Vec<Face> = Vec::with_capacity(4 * n);
    for &(i, j, k) in &[(a, b, c), (a, b, d), (a, c, d), (b, c, d)] {
        let mut face = Face::new(points, i, j, k);
        if face.distance(centroid) > 0.0 {
            face = Face::new(points, i, k, j);
        }
        faces.push(face);
    }

    let mut visible: Vec<usize> = Vec::new();
    let mut horizon: Vec<(usize, usize)> = Vec::new();

    for (idx, &p) in points.iter().enumerate() {
        if idx == a || idx == b || idx == c || idx == d {
            continue;
        }
        visible.clear();
        for (fi, face) in faces.iter().enumerate() {
            if face.alive && face.distance(p) > eps {
                visible.push(fi);
            }
        }
        if visible.is_empty() {
            continue;
        }

        // horizon: directed edges of visible faces whose reversal is not
        // itself an edge of a visible face
        horizon.clear();
        for &fi in &visible {
            let [u, v, w] = faces[fi].vertices;
            for (s, t) in [(u, v), (v, w), (w, u)] {
                if let Some(pos) = horizon.iter().position(|&(hs, ht)| hs == t && ht == s) {
                    horizon.swap_remove(pos);
                } else {
                    horizon.push((s, t));
                }
            }
        }
        for &fi in &visible {
            faces[fi].alive = false;
        }
        for &(s, t) in &horizon {
            let mut face = Face::new(points, s, t, idx);
            if face.distance(centroid) > 0.0 {
                face = Face::new(points, t, s, idx);
            }
            faces.push(face);
        }
    }

    let result: Vec<[usize; 3]> = faces
        .iter()
        .filter(|f| f.alive)
        .map(|f| f.vertices)
        .collect();
    if result.len() < 4 {
        return Err(HullError::Degenerate);
    }
    Ok(result)
}

/// Picks four affinely independent points.
fn initial_simplex(points: &[DVec3], eps: f64) -> Result<(usize, usize, usize, usize), HullError> {
    let a = 0;
    let b = (1..points.len())
        .max_by(|&i, &j| {
            (points[i] - points[a])
                .length_squared()
                .total_cmp(&(points[j] - points[a]).length_squared())
        })
        .ok_or(HullError::Degenerate)?;
    if (points[b] - points[a]).length_squared() <= eps {
        return Err(HullError::Degenerate);
    }
    let ab = points[b] - points[a];
    let c = (0..points.len())
        .max_by(|&i, &j| {
            ab.cross(points[i] - points[a])
                .length_squared()
                .total_cmp(&ab.cross(points[j] - points[a]).length_squared())
        })
        .ok_or(HullError::Degenerate)?;
    let normal = ab.cross(points[c] - points[a]);
    if normal.length_squared() <= eps * eps {
        return Err(HullError::Degenerate);
    }
    let d = (0..points.len())
        .max_by(|&i, &j| {
            normal
                .dot(points[i] - points[a])
                .abs()
                .total_cmp(&normal.dot(points[j] - points[a]).abs())
        })
        .ok_or(HullError::Degenerate)?;
    if normal.dot(points[d] - points[a]).abs() <= eps {
        return Err(HullError::Degenerate);
    }
    Ok((a, b, c, d))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere_cloud(n: usize) -> Vec<DVec3> {
        // deterministic quasi-uniform sphere points (Fibonacci lattice)
        let golden = (1.0 + 5.0f64.sqrt()) / 2.0;
        (0..n)
            .map(|i| {
                let z = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
                let r = (1.0 - z * z).sqrt();
                let phi = std::f64::consts::TAU * (i as f64 / golden).fract();
                DVec3::new(r * phi.cos(), r * phi.sin(), z)
            })
            .collect()
    }

    #[test]
    fn test_tetrahedron() {
        let points = vec![
            DVec3::ZERO,
            DVec3::X,
            DVec3::Y,
            DVec3::Z,
        ];
        let faces = convex_hull(&points).unwrap();
        assert_eq!(faces.len(), 4);
    }

    #[test]
    fn test_octahedron_with_interior_point() {
        let mut points = vec![
            DVec3::X,
            DVec3::NEG_X,
            DVec3::Y,
            DVec3::NEG_Y,
            DVec3::Z,
            DVec3::NEG_Z,
        ];
        points.push(DVec3::new(0.1, 0.1, 0.1));
        let faces = convex_hull(&points).unwrap();
        // 6 hull vertices: F = 2V - 4 = 8, interior point absorbed
        assert_eq!(faces.len(), 8);
        assert!(faces.iter().all(|f| f.iter().all(|&v| v < 6)));
    }

    #[test]
    fn test_sphere_euler_characteristic() {
        let points = sphere_cloud(300);
        let faces = convex_hull(&points).unwrap();
        assert_eq!(faces.len(), 2 * points.len() - 4);
    }

    #[test]
    fn test_outward_orientation() {
        let points = sphere_cloud(100);
        let faces = convex_hull(&points).unwrap();
        for f in faces {
            let [a, b, c] = f;
            let normal = (points[b] - points[a]).cross(points[c] - points[a]);
            let centre = (points[a] + points[b] + points[c]) / 3.0;
            assert!(normal.dot(centre) > 0.0, "face {f:?} points inward");
        }
    }

    #[test]
    fn test_rejects_coplanar_cloud() {
        let points: Vec<DVec3> = (0..10)
            .map(|i| DVec3::new(i as f64, (i * i) as f64, 0.0))
            .collect();
        assert!(convex_hull(&points).is_err());
    }
}
