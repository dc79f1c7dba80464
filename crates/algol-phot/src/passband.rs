// SPDX-FileCopyrightText: 2026 Helge Eichhorn <git@helgeeichhorn.de>
//
// SPDX-License-Identifier: MPL-2.0

//! Passband throughput curves.

use std::path::Path;

use algol_math::interpolation::interp;

use crate::PhotError;

/// Wavelength-dependent throughput of one photometric filter.
///
/// Wavelengths are metres, ascending; throughput is dimensionless in [0, 1].
#[derive(Clone, Debug, PartialEq)]
pub struct Passband {
    pub name: String,
    pub wavelengths: Vec<f64>,
    pub throughput: Vec<f64>,
}

impl Passband {
    /// Synthetic unit throughput across the full tabulated range.
    pub fn bolometric() -> Self {
        Self {
            name: "bolometric".into(),
            wavelengths: vec![1e-9, 1e-3],
            throughput: vec![1.0, 1.0],
        }
    }

    /// Reads a two-column CSV (`wavelength_nm,throughput`) with a header row.
    pub fn from_csv(name: &str, path: &Path) -> Result<Self, PhotError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| PhotError::Io(e.to_string()))?;
        let mut wavelengths = Vec::new();
        let mut throughput = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| PhotError::Io(e.to_string()))?;
            let lambda: f64 = record
                .get(0)
                .ok_or_else(|| PhotError::Parse("missing wavelength column".into()))?
                .trim()
                .parse()
                .map_err(|e| PhotError::Parse(format!("wavelength: {e}")))?;
            let t: f64 = record
                .get(1)
                .ok_or_else(|| PhotError::Parse("missing throughput column".into()))?
                .trim()
                .parse()
                .map_err(|e| PhotError::Parse(format!("throughput: {e}")))?;
            wavelengths.push(lambda * 1e-9);
            throughput.push(t);
        }
        if wavelengths.len() < 2 {
            return Err(PhotError::Parse(format!(
                "passband `{name}` has fewer than two samples"
            )));
        }
        Ok(Self {
            name: name.into(),
            wavelengths,
            throughput,
        })
    }

    pub fn left_bandwidth(&self) -> f64 {
        self.wavelengths[0]
    }

    pub fn right_bandwidth(&self) -> f64 {
        self.wavelengths[self.wavelengths.len() - 1]
    }

    /// Throughput at wavelength `lambda` (metres); zero outside the band.
    pub fn throughput_at(&self, lambda: f64) -> f64 {
        if lambda < self.left_bandwidth() || lambda > self.right_bandwidth() {
            return 0.0;
        }
        interp(lambda, &self.wavelengths, &self.throughput)
    }
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;

    use super::*;

    #[test]
    fn test_bolometric_is_unit() {
        let band = Passband::bolometric();
        assert_float_eq!(band.throughput_at(550e-9), 1.0, abs <= 0.0);
        assert_float_eq!(band.throughput_at(10e-6), 1.0, abs <= 0.0);
        assert_float_eq!(band.throughput_at(1e-10), 0.0, abs <= 0.0);
    }

    #[test]
    fn test_interpolated_throughput() {
        let band = Passband {
            name: "tri".into(),
            wavelengths: vec![400e-9, 500e-9, 600e-9],
            throughput: vec![0.0, 1.0, 0.0],
        };
        assert_float_eq!(band.throughput_at(450e-9), 0.5, abs <= 1e-12);
        assert_float_eq!(band.throughput_at(500e-9), 1.0, abs <= 1e-12);
        assert_float_eq!(band.throughput_at(650e-9), 0.0, abs <= 0.0);
    }
}
