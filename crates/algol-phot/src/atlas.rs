// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Model-atmosphere access.
//!
//! The [Atlas] trait is the narrow lookup interface of the radiance
//! evaluator. [DirectoryAtlas] serves tabulated emergent-flux trees (ck04 or
//! k93 style) keyed by `(T_eff, log g, [M/H])` through the file-name
//! convention, loading each table once behind a per-table latch.
//! [PlanckAtlas] synthesises blackbody spectra and needs no files.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock, RwLock};

use hashbrown::HashMap;
use log::{debug, warn};

use algol_math::interpolation::{interp, lerp};
use algol_units::constants::{BOLTZMANN_CONSTANT, PLANCK_CONSTANT, SPEED_OF_LIGHT};

use crate::PhotError;

/// Emergent spectral radiance vs wavelength.
///
/// Wavelengths are metres, ascending; flux is W·sr⁻¹·m⁻³.
#[derive(Clone, Debug, PartialEq)]
pub struct FluxSpectrum {
    pub wavelengths: Vec<f64>,
    pub flux: Vec<f64>,
}

pub trait Atlas: Send + Sync {
    /// Emergent spectrum for the given surface parameters.
    fn lookup(&self, t_eff: f64, log_g: f64, metallicity: f64)
    -> Result<FluxSpectrum, PhotError>;

    fn name(&self) -> &str;
}

/// Synthetic blackbody atlas on a fixed logarithmic wavelength grid.
#[derive(Debug)]
pub struct PlanckAtlas {
    wavelengths: Vec<f64>,
}

impl Default for PlanckAtlas {
    fn default() -> Self {
        const SAMPLES: usize = 512;
        let (lo, hi): (f64, f64) = (1e-8, 1e-4);
        let wavelengths = (0..SAMPLES)
            .map(|i| lo * (hi / lo).powf(i as f64 / (SAMPLES - 1) as f64))
            .collect();
        Self { wavelengths }
    }
}

impl Atlas for PlanckAtlas {
    fn lookup(
        &self,
        t_eff: f64,
        _log_g: f64,
        _metallicity: f64,
    ) -> Result<FluxSpectrum, PhotError> {
        if t_eff <= 0.0 {
            return Err(PhotError::OutOfBound {
                quantity: "t_eff",
                value: t_eff,
                lower: f64::MIN_POSITIVE,
                upper: f64::INFINITY,
            });
        }
        let flux = self
            .wavelengths
            .iter()
            .map(|&lambda| {
                let hc = PLANCK_CONSTANT * SPEED_OF_LIGHT;
                2.0 * hc * SPEED_OF_LIGHT / lambda.powi(5)
                    / ((hc / (lambda * BOLTZMANN_CONSTANT * t_eff)).exp_m1())
            })
            .collect();
        Ok(FluxSpectrum {
            wavelengths: self.wavelengths.clone(),
            flux,
        })
    }

    fn name(&self) -> &str {
        "planck"
    }
}

/// Table key parsed from a file name.
///
/// The convention is `{atlas}_t{TTTTT}_g{GGG}_{sign}{MM}.csv`, e.g.
/// `ck04_t05000_g440_p00.csv` for 5000 K, log g 4.40, [M/H] 0.0: temperature
/// in kelvins, gravity and metallicity in centidex, `p`/`m` for the
/// metallicity sign.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
struct TableKey {
    t_kelvin: i64,
    g_centi: i64,
    mh_centi: i64,
}

impl TableKey {
    fn t(&self) -> f64 {
        self.t_kelvin as f64
    }

    fn g(&self) -> f64 {
        self.g_centi as f64 / 100.0
    }

    fn mh(&self) -> f64 {
        self.mh_centi as f64 / 100.0
    }
}

fn parse_file_name(prefix: &str, name: &str) -> Option<TableKey> {
    let stem = name.strip_suffix(".csv")?;
    let rest = stem.strip_prefix(prefix)?.strip_prefix('_')?;
    let mut parts = rest.split('_');
    let t: i64 = parts.next()?.strip_prefix('t')?.parse().ok()?;
    let g: i64 = parts.next()?.strip_prefix('g')?.parse().ok()?;
    let mh_part = parts.next()?;
    let (sign, digits) = mh_part.split_at(1);
    let mh: i64 = digits.parse().ok()?;
    let mh = match sign {
        "p" => mh * 10,
        "m" => -mh * 10,
        _ => return None,
    };
    parts.next().is_none().then_some(TableKey {
        t_kelvin: t,
        g_centi: g,
        mh_centi: mh,
    })
}

type TableCell = Arc<OnceLock<Result<Arc<FluxSpectrum>, PhotError>>>;

/// Directory-backed atlas with lazy, coalesced table loading.
pub struct DirectoryAtlas {
    root: PathBuf,
    prefix: String,
    /// Allowed extrapolation in [M/H], dex.
    metallicity_tolerance: f64,
    index: OnceLock<Result<Vec<TableKey>, PhotError>>,
    tables: RwLock<HashMap<TableKey, TableCell>>,
    load_guard: Mutex<()>,
}

impl DirectoryAtlas {
    /// `prefix` selects the table family, `ck04` or `k93`.
    pub fn new(root: PathBuf, prefix: &str) -> Self {
        Self {
            root,
            prefix: prefix.into(),
            metallicity_tolerance: 0.1,
            index: OnceLock::new(),
            tables: RwLock::new(HashMap::new()),
            load_guard: Mutex::new(()),
        }
    }

    pub fn with_metallicity_tolerance(mut self, tolerance: f64) -> Self {
        self.metallicity_tolerance = tolerance;
        self
    }

    fn index(&self) -> Result<&[TableKey], PhotError> {
        self.index
            .get_or_init(|| {
                let entries = std::fs::read_dir(&self.root)
                    .map_err(|e| PhotError::Io(format!("{}: {e}", self.root.display())))?;
                let mut keys = Vec::new();
                for entry in entries {
                    let entry = entry.map_err(|e| PhotError::Io(e.to_string()))?;
                    if let Some(name) = entry.file_name().to_str()
                        && let Some(key) = parse_file_name(&self.prefix, name)
                    {
                        keys.push(key);
                    }
                }
                if keys.is_empty() {
                    return Err(PhotError::Io(format!(
                        "no `{}` tables under {}",
                        self.prefix,
                        self.root.display()
                    )));
                }
                debug!("indexed {} {} atmosphere tables", keys.len(), self.prefix);
                Ok(keys)
            })
            .as_ref()
            .map(|keys| keys.as_slice())
            .map_err(|e| e.clone())
    }

    fn file_name(&self, key: &TableKey) -> PathBuf {
        let (sign, mh) = if key.mh_centi < 0 {
            ('m', -key.mh_centi / 10)
        } else {
            ('p', key.mh_centi / 10)
        };
        self.root.join(format!(
            "{}_t{:05}_g{:03}_{}{:02}.csv",
            self.prefix, key.t_kelvin, key.g_centi, sign, mh
        ))
    }

    /// Loads a table exactly once; concurrent first touches coalesce on the
    /// per-table latch.
    fn table(&self, key: TableKey) -> Result<Arc<FluxSpectrum>, PhotError> {
        let cell = {
            if let Some(cell) = self.tables.read().expect("atlas lock poisoned").get(&key) {
                cell.clone()
            } else {
                let _guard = self.load_guard.lock().expect("atlas lock poisoned");
                self.tables
                    .write()
                    .expect("atlas lock poisoned")
                    .entry(key)
                    .or_default()
                    .clone()
            }
        };
        cell.get_or_init(|| {
            let path = self.file_name(&key);
            let mut reader =
                csv::Reader::from_path(&path).map_err(|e| PhotError::Io(e.to_string()))?;
            let mut wavelengths = Vec::new();
            let mut flux = Vec::new();
            for record in reader.records() {
                let record = record.map_err(|e| PhotError::Io(e.to_string()))?;
                let lambda: f64 = record
                    .get(0)
                    .ok_or_else(|| PhotError::Parse("missing wavelength".into()))?
                    .trim()
                    .parse()
                    .map_err(|e| PhotError::Parse(format!("wavelength: {e}")))?;
                let f: f64 = record
                    .get(1)
                    .ok_or_else(|| PhotError::Parse("missing flux".into()))?
                    .trim()
                    .parse()
                    .map_err(|e| PhotError::Parse(format!("flux: {e}")))?;
                wavelengths.push(lambda * 1e-9);
                flux.push(f);
            }
            Ok(Arc::new(FluxSpectrum { wavelengths, flux }))
        })
        .clone()
    }
}

impl Atlas for DirectoryAtlas {
    fn lookup(
        &self,
        t_eff: f64,
        log_g: f64,
        metallicity: f64,
    ) -> Result<FluxSpectrum, PhotError> {
        let keys = self.index()?;

        // nearest tabulated metallicity, within the extrapolation tolerance
        let mh = keys
            .iter()
            .map(|k| k.mh())
            .min_by(|a, b| (a - metallicity).abs().total_cmp(&(b - metallicity).abs()))
            .expect("index is non-empty");
        if (mh - metallicity).abs() > self.metallicity_tolerance {
            return Err(PhotError::OutOfBound {
                quantity: "metallicity",
                value: metallicity,
                lower: mh - self.metallicity_tolerance,
                upper: mh + self.metallicity_tolerance,
            });
        }
        if mh != metallicity {
            warn!(
                "[M/H] = {metallicity} not tabulated; using the {mh} tables \
                 within the {} dex tolerance",
                self.metallicity_tolerance
            );
        }

        // nearest tabulated gravity at that metallicity
        let g = keys
            .iter()
            .filter(|k| k.mh() == mh)
            .map(|k| k.g())
            .min_by(|a, b| (a - log_g).abs().total_cmp(&(b - log_g).abs()))
            .expect("metallicity was chosen from the index");

        // bracketing temperatures; no extrapolation past the grid
        let mut ts: Vec<f64> = keys
            .iter()
            .filter(|k| k.mh() == mh && k.g() == g)
            .map(|k| k.t())
            .collect();
        ts.sort_by(f64::total_cmp);
        let (t_lo, t_hi) = (ts[0], ts[ts.len() - 1]);
        if t_eff < t_lo || t_eff > t_hi {
            return Err(PhotError::OutOfBound {
                quantity: "t_eff",
                value: t_eff,
                lower: t_lo,
                upper: t_hi,
            });
        }
        let above = ts.partition_point(|&t| t < t_eff).min(ts.len() - 1);
        let below = above.saturating_sub(if ts[above] > t_eff { 1 } else { 0 });

        let key = |t: f64| TableKey {
            t_kelvin: t.round() as i64,
            g_centi: (g * 100.0).round() as i64,
            mh_centi: (mh * 100.0).round() as i64,
        };
        let lower = self.table(key(ts[below]))?;
        if below == above {
            return Ok((*lower).clone());
        }
        let upper = self.table(key(ts[above]))?;

        // interpolate the upper spectrum onto the lower grid, then blend
        let weight = (t_eff - ts[below]) / (ts[above] - ts[below]);
        let flux = lower
            .wavelengths
            .iter()
            .zip(&lower.flux)
            .map(|(&lambda, &f_lo)| {
                let f_hi = interp(lambda, &upper.wavelengths, &upper.flux);
                lerp(f_lo, f_hi, weight)
            })
            .collect();
        Ok(FluxSpectrum {
            wavelengths: lower.wavelengths.clone(),
            flux,
        })
    }

    fn name(&self) -> &str {
        &self.prefix
    }
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;
    use rstest::rstest;

    use algol_math::interpolation::simpson;
    use algol_units::constants::STEFAN_BOLTZMANN_CONSTANT;

    use super::*;

    #[rstest]
    #[case(3500.0)]
    #[case(5000.0)]
    #[case(10000.0)]
    fn test_planck_integrates_to_stefan_boltzmann(#[case] t: f64) {
        let atlas = PlanckAtlas::default();
        let spectrum = atlas.lookup(t, 4.4, 0.0).unwrap();
        let total = simpson(&spectrum.wavelengths, &spectrum.flux);
        let expected = STEFAN_BOLTZMANN_CONSTANT * t.powi(4) / std::f64::consts::PI;
        assert_float_eq!(total, expected, rel <= 1e-4);
    }

    #[test]
    fn test_planck_rejects_non_positive() {
        let atlas = PlanckAtlas::default();
        assert!(matches!(
            atlas.lookup(0.0, 4.4, 0.0),
            Err(PhotError::OutOfBound { .. })
        ));
    }

    #[test]
    fn test_planck_monotone_in_temperature() {
        let atlas = PlanckAtlas::default();
        let cool = atlas.lookup(4000.0, 4.4, 0.0).unwrap();
        let hot = atlas.lookup(8000.0, 4.4, 0.0).unwrap();
        for (a, b) in cool.flux.iter().zip(&hot.flux) {
            assert!(b > a);
        }
    }

    #[test]
    fn test_file_name_roundtrip() {
        let key = TableKey {
            t_kelvin: 5000,
            g_centi: 440,
            mh_centi: -50,
        };
        let atlas = DirectoryAtlas::new(PathBuf::from("/tmp"), "ck04");
        let path = atlas.file_name(&key);
        let name = path.file_name().unwrap().to_str().unwrap();
        assert_eq!(name, "ck04_t05000_g440_m05.csv");
        assert_eq!(parse_file_name("ck04", name), Some(key));
    }

    #[rstest]
    #[case("ck04_t05000_g440_p00.csv", Some((5000, 440, 0)))]
    #[case("k93_t10000_g500_m10.csv", None)] // wrong prefix
    #[case("ck04_t05000_g440_p00.dat", None)]
    #[case("ck04_5000_440_p00.csv", None)]
    fn test_parse_file_name(#[case] name: &str, #[case] expected: Option<(i64, i64, i64)>) {
        let parsed = parse_file_name("ck04", name);
        match expected {
            Some((t, g, mh)) => {
                let key = parsed.unwrap();
                assert_eq!((key.t_kelvin, key.g_centi, key.mh_centi * 10 / 100), (t, g, mh));
            }
            None => assert!(parsed.is_none()),
        }
    }

    #[test]
    fn test_missing_directory_errors() {
        let atlas = DirectoryAtlas::new(PathBuf::from("/nonexistent/atlas"), "ck04");
        assert!(matches!(
            atlas.lookup(5000.0, 4.4, 0.0),
            Err(PhotError::Io(_))
        ));
    }
}
