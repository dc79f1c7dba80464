// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Planar convex hulls via Andrew's monotone chain.

use glam::DVec2;

/// Twice the signed area of the triangle `(o, a, b)`.
pub fn cross(o: DVec2, a: DVec2, b: DVec2) -> f64 {
    (a - o).perp_dot(b - o)
}

/// Returns the indices of the convex hull of `points` in counter-clockwise
/// order. Collinear boundary points are dropped.
pub fn convex_hull(points: &[DVec2]) -> Vec<usize> {
    let n = points.len();
    if n < 3 {
        return (0..n).collect();
    }
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| {
        points[i]
            .x
            .total_cmp(&points[j].x)
            .then(points[i].y.total_cmp(&points[j].y))
    });

    let mut hull: Vec<usize> = Vec::with_capacity(2 * n);
    for &idx in order.iter().chain(order.iter().rev().skip(1)) {
        while hull.len() >= 2
            && cross(
                points[hull[hull.len() - 2]],
                points[hull[hull.len() - 1]],
                points[idx],
            ) <= 0.0
        {
            hull.pop();
        }
        hull.push(idx);
    }
    hull.pop();
    hull
}

/// Whether `p` lies inside (or on the boundary of) the counter-clockwise
/// convex polygon `hull`.
pub fn point_in_convex(p: DVec2, hull: &[DVec2]) -> bool {
    let n = hull.len();
    if n < 3 {
        return false;
    }
    for i in 0..n {
        if cross(hull[i], hull[(i + 1) % n], p) < 0.0 {
            return false;
        }
    }
    true
}
