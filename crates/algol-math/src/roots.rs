// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! One-dimensional root finders.
//!
//! Two families are provided: Newton iteration for callers that can supply a
//! derivative (Kepler's equation, Lagrange points) and a derivative-free
//! Brent solver for bracketed problems (equipotential inversion).

use float_eq::float_eq;
use thiserror::Error;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("root finder did not converge after {0} iterations")]
pub struct NotConverged(pub u32);

#[derive(Clone, Debug, Error, PartialEq)]
pub enum BracketError {
    #[error(transparent)]
    NotConverged(#[from] NotConverged),
    #[error("no sign change on bracket ({0}, {1})")]
    NotInBracket(f64, f64),
}

pub trait FindRootWithDerivative<F: Fn(f64) -> f64, D: Fn(f64) -> f64> {
    type Error;

    fn find_with_derivative(&self, f: F, derivative: D, initial_guess: f64)
    -> Result<f64, Self::Error>;
}

pub trait FindBracketedRoot<F: Fn(f64) -> f64> {
    type Error: std::fmt::Debug;

    fn find_in_bracket(&self, f: F, bracket: (f64, f64)) -> Result<f64, Self::Error>;
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Newton {
    pub max_iter: u32,
    pub tolerance: f64,
}

impl Default for Newton {
    fn default() -> Self {
        Self {
            max_iter: 64,
            tolerance: 1e-12,
        }
    }
}

impl Newton {
    pub const fn new(max_iter: u32, tolerance: f64) -> Self {
        Self {
            max_iter,
            tolerance,
        }
    }
}

impl<F, D> FindRootWithDerivative<F, D> for Newton
where
    F: Fn(f64) -> f64,
    D: Fn(f64) -> f64,
{
    type Error = NotConverged;

    fn find_with_derivative(
        &self,
        f: F,
        derivative: D,
        initial_guess: f64,
    ) -> Result<f64, Self::Error> {
        let mut x0 = initial_guess;
        for _ in 0..self.max_iter {
            let slope = derivative(x0);
            if slope == 0.0 {
                return Err(NotConverged(self.max_iter));
            }
            let x = x0 - f(x0) / slope;
            if float_eq!(x, x0, abs <= self.tolerance) {
                return Ok(x);
            }
            x0 = x;
        }
        Err(NotConverged(self.max_iter))
    }
}

/// Brent's method: bisection interlaced with inverse quadratic interpolation
/// and the secant step, keeping the bracket valid throughout.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Brent {
    pub max_iter: u32,
    pub abs_tol: f64,
    pub rel_tol: f64,
}

impl Default for Brent {
    fn default() -> Self {
        Self {
            max_iter: 100,
            abs_tol: 1e-12,
            rel_tol: 4.0 * f64::EPSILON,
        }
    }
}

impl<F> FindBracketedRoot<F> for Brent
where
    F: Fn(f64) -> f64,
{
    type Error = BracketError;

    fn find_in_bracket(&self, f: F, bracket: (f64, f64)) -> Result<f64, Self::Error> {
        let (mut a, mut b) = bracket;
        let mut fa = f(a);
        let mut fb = f(b);

        if fa == 0.0 {
            return Ok(a);
        }
        if fb == 0.0 {
            return Ok(b);
        }
        if fa * fb > 0.0 {
            return Err(BracketError::NotInBracket(a, b));
        }

        // c always carries the previous value of b so that (a, b) brackets.
        let mut c = a;
        let mut fc = fa;
        let mut step = b - a;
        let mut step_prev = step;

        for _ in 0..self.max_iter {
            if fb.abs() > fc.abs() {
                // b must hold the best approximation
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }
            let tol = 2.0 * self.rel_tol * b.abs() + 0.5 * self.abs_tol;
            let half = 0.5 * (c - b);
            if half.abs() <= tol || fb == 0.0 {
                return Ok(b);
            }

            if step_prev.abs() >= tol && fa.abs() > fb.abs() {
                let s = fb / fa;
                let (mut p, mut q) = if a == c {
                    // secant
                    (2.0 * half * s, 1.0 - s)
                } else {
                    // inverse quadratic interpolation
                    let q0 = fa / fc;
                    let r = fb / fc;
                    (
                        s * (2.0 * half * q0 * (q0 - r) - (b - a) * (r - 1.0)),
                        (q0 - 1.0) * (r - 1.0) * (s - 1.0),
                    )
                };
                if p > 0.0 {
                    q = -q;
                }
                p = p.abs();
                if 2.0 * p < (3.0 * half * q - (tol * q).abs()).min((step_prev * q).abs()) {
                    step_prev = step;
                    step = p / q;
                } else {
                    step = half;
                    step_prev = half;
                }
            } else {
                step = half;
                step_prev = half;
            }

            a = b;
            fa = fb;
            b += if step.abs() > tol {
                step
            } else if half > 0.0 {
                tol
            } else {
                -tol
            };
            fb = f(b);
            if (fb > 0.0) == (fc > 0.0) {
                c = a;
                fc = fa;
                step = b - a;
                step_prev = step;
            }
        }
        Err(BracketError::NotConverged(NotConverged(self.max_iter)))
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use float_eq::assert_float_eq;

    use super::*;

    #[test]
    fn test_newton_kepler() {
        let eccentricity: f64 = 0.3;
        let mean: f64 = PI / 2.0;
        let newton = Newton::default();
        let act = newton
            .find_with_derivative(
                |e| e - eccentricity * e.sin() - mean,
                |e| 1.0 - eccentricity * e.cos(),
                mean,
            )
            .expect("should converge");
        assert_float_eq!(act, 1.85846841205333, rel <= 1e-10);
    }

    #[test]
    fn test_newton_flat_slope() {
        let newton = Newton::default();
        let res = newton.find_with_derivative(|_| 1.0, |_| 0.0, 0.0);
        assert_eq!(res, Err(NotConverged(64)));
    }

    #[test]
    fn test_brent_cubic() {
        let brent = Brent::default();
        let act = brent
            .find_in_bracket(|x| x.powi(3) + 4.0 * x.powi(2) - 10.0, (1.0, 1.5))
            .expect("should converge");
        assert_float_eq!(act, 1.3652300134140969, rel <= 1e-10);
    }

    #[test]
    fn test_brent_potential_like() {
        // 1/rho - 100 = 0 has the same shape as an equipotential inversion
        let brent = Brent::default();
        let act = brent
            .find_in_bracket(|rho| 1.0 / rho - 100.0, (1e-6, 1.0))
            .expect("should converge");
        assert_float_eq!(act, 0.01, rel <= 1e-10);
    }

    #[test]
    fn test_brent_rejects_unbracketed() {
        let brent = Brent::default();
        let res = brent.find_in_bracket(|x| x * x + 1.0, (-1.0, 1.0));
        assert!(matches!(res, Err(BracketError::NotInBracket(_, _))));
    }
}
