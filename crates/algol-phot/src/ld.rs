// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Limb-darkening laws and coefficient sources.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock, RwLock};

use hashbrown::HashMap;

use crate::PhotError;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum LimbDarkeningLaw {
    #[default]
    Linear,
    Logarithmic,
    SquareRoot,
}

impl LimbDarkeningLaw {
    pub fn coefficient_count(&self) -> usize {
        match self {
            LimbDarkeningLaw::Linear => 1,
            LimbDarkeningLaw::Logarithmic | LimbDarkeningLaw::SquareRoot => 2,
        }
    }
}

/// Intensity attenuation at emergent-angle cosine `cos_theta`.
pub fn limb_darkening_factor(
    law: LimbDarkeningLaw,
    coefficients: &[f64],
    cos_theta: f64,
) -> f64 {
    let mu = cos_theta.clamp(0.0, 1.0);
    match law {
        LimbDarkeningLaw::Linear => 1.0 - coefficients[0] * (1.0 - mu),
        LimbDarkeningLaw::Logarithmic => {
            let log_term = if mu > 0.0 { mu * mu.ln() } else { 0.0 };
            1.0 - coefficients[0] * (1.0 - mu) - coefficients[1] * log_term
        }
        LimbDarkeningLaw::SquareRoot => {
            1.0 - coefficients[0] * (1.0 - mu) - coefficients[1] * (1.0 - mu.sqrt())
        }
    }
}

/// Source of per-surface-element limb-darkening coefficients.
pub trait LdSource: Send + Sync {
    fn coefficients(
        &self,
        law: LimbDarkeningLaw,
        t_eff: f64,
        log_g: f64,
        metallicity: f64,
        passband: &str,
    ) -> Result<Vec<f64>, PhotError>;
}

/// Fixed coefficients for every surface element; the default linear
/// coefficient 0.5 is a reasonable optical value.
#[derive(Clone, Debug)]
pub struct ConstantLd {
    pub coefficients: Vec<f64>,
}

impl Default for ConstantLd {
    fn default() -> Self {
        Self {
            coefficients: vec![0.5, 0.3],
        }
    }
}

impl LdSource for ConstantLd {
    fn coefficients(
        &self,
        law: LimbDarkeningLaw,
        _t_eff: f64,
        _log_g: f64,
        _metallicity: f64,
        _passband: &str,
    ) -> Result<Vec<f64>, PhotError> {
        Ok(self.coefficients[..law.coefficient_count()].to_vec())
    }
}

/// Row of one tabulated coefficient file.
#[derive(Clone, Copy, Debug)]
struct LdRow {
    t_eff: f64,
    log_g: f64,
    metallicity: f64,
    linear: f64,
    logarithmic: [f64; 2],
    square_root: [f64; 2],
}

/// Directory of per-passband coefficient tables (`{band}.csv`, columns
/// `t_eff,log_g,mh,x_lin,x_log,y_log,x_sqrt,y_sqrt`), indexed identically to
/// the atmosphere tables and interpolated in temperature.
pub struct DirectoryLd {
    root: PathBuf,
    bands: RwLock<HashMap<String, Arc<OnceLock<Result<Arc<Vec<LdRow>>, PhotError>>>>>,
}

impl DirectoryLd {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            bands: RwLock::new(HashMap::new()),
        }
    }

    fn rows(&self, passband: &str) -> Result<Arc<Vec<LdRow>>, PhotError> {
        let cell = {
            if let Some(cell) = self.bands.read().expect("ld lock poisoned").get(passband) {
                cell.clone()
            } else {
                self.bands
                    .write()
                    .expect("ld lock poisoned")
                    .entry(passband.to_string())
                    .or_default()
                    .clone()
            }
        };
        cell.get_or_init(|| {
            let path = self.root.join(format!("{passband}.csv"));
            let mut reader =
                csv::Reader::from_path(&path).map_err(|e| PhotError::Io(e.to_string()))?;
            let mut rows = Vec::new();
            for record in reader.records() {
                let record = record.map_err(|e| PhotError::Io(e.to_string()))?;
                let field = |i: usize| -> Result<f64, PhotError> {
                    record
                        .get(i)
                        .ok_or_else(|| PhotError::Parse(format!("missing ld column {i}")))?
                        .trim()
                        .parse()
                        .map_err(|e| PhotError::Parse(format!("ld column {i}: {e}")))
                };
                rows.push(LdRow {
                    t_eff: field(0)?,
                    log_g: field(1)?,
                    metallicity: field(2)?,
                    linear: field(3)?,
                    logarithmic: [field(4)?, field(5)?],
                    square_root: [field(6)?, field(7)?],
                });
            }
            if rows.is_empty() {
                return Err(PhotError::Parse(format!(
                    "limb-darkening table `{passband}` is empty"
                )));
            }
            Ok(Arc::new(rows))
        })
        .clone()
    }
}

impl LdSource for DirectoryLd {
    fn coefficients(
        &self,
        law: LimbDarkeningLaw,
        t_eff: f64,
        log_g: f64,
        metallicity: f64,
        passband: &str,
    ) -> Result<Vec<f64>, PhotError> {
        let rows = self.rows(passband)?;
        // nearest (log g, [M/H]) cell, bracketing interpolation in t_eff
        let distance = |row: &LdRow| {
            (row.log_g - log_g).abs() + 10.0 * (row.metallicity - metallicity).abs()
        };
        let nearest = rows
            .iter()
            .min_by(|a, b| distance(a).total_cmp(&distance(b)))
            .expect("rows are non-empty");
        let cell: Vec<&LdRow> = rows
            .iter()
            .filter(|r| r.log_g == nearest.log_g && r.metallicity == nearest.metallicity)
            .collect();
        let below = cell
            .iter()
            .filter(|r| r.t_eff <= t_eff)
            .max_by(|a, b| a.t_eff.total_cmp(&b.t_eff));
        let above = cell
            .iter()
            .filter(|r| r.t_eff >= t_eff)
            .min_by(|a, b| a.t_eff.total_cmp(&b.t_eff));
        let (lo, hi) = match (below, above) {
            (Some(lo), Some(hi)) => (**lo, **hi),
            _ => {
                let bounds = (
                    cell.iter().map(|r| r.t_eff).fold(f64::INFINITY, f64::min),
                    cell.iter().map(|r| r.t_eff).fold(f64::NEG_INFINITY, f64::max),
                );
                return Err(PhotError::OutOfBound {
                    quantity: "t_eff",
                    value: t_eff,
                    lower: bounds.0,
                    upper: bounds.1,
                });
            }
        };
        let weight = if hi.t_eff > lo.t_eff {
            (t_eff - lo.t_eff) / (hi.t_eff - lo.t_eff)
        } else {
            0.0
        };
        let blend = |a: f64, b: f64| a + (b - a) * weight;
        Ok(match law {
            LimbDarkeningLaw::Linear => vec![blend(lo.linear, hi.linear)],
            LimbDarkeningLaw::Logarithmic => vec![
                blend(lo.logarithmic[0], hi.logarithmic[0]),
                blend(lo.logarithmic[1], hi.logarithmic[1]),
            ],
            LimbDarkeningLaw::SquareRoot => vec![
                blend(lo.square_root[0], hi.square_root[0]),
                blend(lo.square_root[1], hi.square_root[1]),
            ],
        })
    }
}
