// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Band-normal intensities with the process-wide radiance cache.
//!
//! The atmosphere interpolation dominates the curve-synthesis cost, so band
//! intensities are cached on the rounded surface parameters under a
//! reader-writer lock. Entries are never evicted during one curve
//! computation.

use std::sync::{Arc, RwLock};

use hashbrown::HashMap;

use algol_math::interpolation::simpson;

use crate::PhotError;
use crate::atlas::Atlas;
use crate::passband::Passband;

/// Cache key: temperature rounded to 1 K, gravity and metallicity to 0.01.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
struct RadianceKey {
    t: i64,
    g: i64,
    mh: i64,
}

impl RadianceKey {
    fn new(t_eff: f64, log_g: f64, metallicity: f64) -> Self {
        Self {
            t: t_eff.round() as i64,
            g: (log_g * 100.0).round() as i64,
            mh: (metallicity * 100.0).round() as i64,
        }
    }
}

/// Evaluates per-band normal intensities for surface elements.
pub struct RadianceEvaluator<'a> {
    atlas: &'a dyn Atlas,
    passbands: &'a [Passband],
    cache: RwLock<HashMap<RadianceKey, Arc<Vec<f64>>>>,
}

impl<'a> RadianceEvaluator<'a> {
    pub fn new(atlas: &'a dyn Atlas, passbands: &'a [Passband]) -> Self {
        Self {
            atlas,
            passbands,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn passbands(&self) -> &[Passband] {
        self.passbands
    }

    /// Normal intensity in every configured passband, cached on the rounded
    /// surface parameters.
    pub fn band_intensities(
        &self,
        t_eff: f64,
        log_g: f64,
        metallicity: f64,
    ) -> Result<Arc<Vec<f64>>, PhotError> {
        let key = RadianceKey::new(t_eff, log_g, metallicity);
        if let Some(hit) = self.cache.read().expect("radiance lock poisoned").get(&key) {
            return Ok(hit.clone());
        }

        let spectrum = self.atlas.lookup(key.t as f64, log_g, metallicity)?;
        let intensities: Vec<f64> = self
            .passbands
            .iter()
            .map(|band| {
                // weight the spectrum by the throughput, integrate over the
                // band support
                let lo = band.left_bandwidth();
                let hi = band.right_bandwidth();
                let mut xs = Vec::with_capacity(spectrum.wavelengths.len());
                let mut ys = Vec::with_capacity(spectrum.wavelengths.len());
                for (&lambda, &flux) in spectrum.wavelengths.iter().zip(&spectrum.flux) {
                    if lambda < lo || lambda > hi {
                        continue;
                    }
                    xs.push(lambda);
                    ys.push(flux * band.throughput_at(lambda));
                }
                simpson(&xs, &ys)
            })
            .collect();

        let entry = Arc::new(intensities);
        self.cache
            .write()
            .expect("radiance lock poisoned")
            .insert(key, entry.clone());
        Ok(entry)
    }

    #[cfg(test)]
    fn cache_len(&self) -> usize {
        self.cache.read().unwrap().len()
    }
}
