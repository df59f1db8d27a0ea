//! Peak picking on the dB magnitude of an FRF.
//!
//! Candidates are strict local maxima (the middle sample of a flat top
//! counts; the first and last samples never do). They are thinned in two
//! passes:
//!
//! 1. Distance: going from the tallest peak down, any peak closer than
//!    `min_distance_hz` to an already kept peak is dropped.
//! 2. Prominence: the height of the peak above the higher of the two lowest
//!    points reached before the signal climbs above the peak on either side
//!    must be at least `prominence_db`.
//!
//! A larger prominence rejects noise ripples; a larger distance rejects
//! closely spaced spurious maxima, at the risk of merging genuinely close modes.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};
use crate::frf::Frf;

/// Peak-picking thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PeakPicking {
    /// Minimum topographic prominence [dB]
    pub prominence_db: f64,
    /// Minimum spacing between reported peaks [Hz]
    pub min_distance_hz: f64,
}

impl Default for PeakPicking {
    fn default() -> Self {
        Self {
            prominence_db: 6.0,
            min_distance_hz: 10.0,
        }
    }
}

/// A resonance candidate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// Bin index in the FRF that was searched
    pub index: usize,
    pub frequency_hz: f64,
    pub magnitude_db: f64,
    pub prominence_db: f64,
}

impl PeakPicking {
    pub fn validate(&self) -> Result<()> {
        if !(self.prominence_db >= 0.0 && self.min_distance_hz >= 0.0) {
            return Err(SolverError::Configuration(format!(
                "Peak thresholds must be non-negative (prominence {} dB, distance {} Hz)",
                self.prominence_db, self.min_distance_hz
            )));
        }
        Ok(())
    }

    /// Peaks of `frf` in ascending frequency
    pub fn find_peaks(&self, frf: &Frf) -> Vec<Peak> {
        let db = frf.magnitude_db();
        let mut candidates = local_maxima(&db);

        // Tallest first, suppress neighbours inside the distance
        candidates.sort_by(|&a, &b| db[b].total_cmp(&db[a]));
        let mut kept: Vec<usize> = Vec::with_capacity(candidates.len());
        for idx in candidates {
            let f = frf.frequencies_hz[idx];
            if kept
                .iter()
                .all(|&k| (frf.frequencies_hz[k] - f).abs() >= self.min_distance_hz)
            {
                kept.push(idx);
            }
        }
        kept.sort_unstable();

        kept.into_iter()
            .filter_map(|index| {
                let prominence = prominence(&db, index);
                (prominence >= self.prominence_db).then(|| Peak {
                    index,
                    frequency_hz: frf.frequencies_hz[index],
                    magnitude_db: db[index],
                    prominence_db: prominence,
                })
            })
            .collect()
    }
}

/// Indices of local maxima; a plateau reports its middle sample
pub fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if x.len() < 3 {
        return peaks;
    }
    let last = x.len() - 1;
    let mut i = 1;
    while i < last {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < last && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }
    peaks
}

/// Topographic prominence of the sample at `peak`
pub fn prominence(x: &[f64], peak: usize) -> f64 {
    let height = x[peak];

    let mut left_min = height;
    for &v in x[..peak].iter().rev() {
        if v > height {
            break;
        }
        left_min = left_min.min(v);
    }

    let mut right_min = height;
    for &v in &x[peak + 1..] {
        if v > height {
            break;
        }
        right_min = right_min.min(v);
    }

    height - left_min.max(right_min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frf::FrfKind;
    use num_complex::Complex64;

    fn frf_from_db(db: &[f64], df: f64) -> Frf {
        Frf::new(
            (0..db.len()).map(|i| (i + 1) as f64 * df).collect(),
            db.iter()
                .map(|d| Complex64::new(10f64.powf(d / 20.0), 0.0))
                .collect(),
            FrfKind::Mobility,
        )
        .unwrap()
    }

    #[test]
    fn finds_local_maxima_and_plateau_middles() {
        let x = [0.0, 2.0, 1.0, 3.0, 3.0, 3.0, 0.0, 5.0];
        assert_eq!(local_maxima(&x), vec![1, 4]);
        assert!(local_maxima(&[1.0, 2.0]).is_empty());
    }

    #[test]
    fn prominence_uses_higher_saddle() {
        let x = [0.0, 10.0, 4.0, 6.0, 2.0, 8.0, 1.0];
        // Peak at 3 (6.0): left bounded by 10 with min 4, right bounded by 8 with min 2
        assert!((prominence(&x, 3) - 2.0).abs() < 1e-12);
        // Peak at 1 (10.0) is the global maximum: right side bottoms out at 1
        assert!((prominence(&x, 1) - 9.0).abs() < 1e-12);
    }

    #[test]
    fn prominence_rejects_ripple() {
        let db = [0.0, 20.0, 10.0, 12.0, 10.0, 30.0, 0.0];
        let peaks = PeakPicking {
            prominence_db: 6.0,
            min_distance_hz: 0.0,
        }
        .find_peaks(&frf_from_db(&db, 1.0));
        let indices: Vec<usize> = peaks.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 5]);
    }

    #[test]
    fn distance_keeps_taller_neighbour() {
        let db = [0.0, 20.0, 0.0, 25.0, 0.0, 0.0, 0.0, 0.0, 18.0, 0.0];
        let picker = PeakPicking {
            prominence_db: 6.0,
            min_distance_hz: 3.0,
        };
        let peaks = picker.find_peaks(&frf_from_db(&db, 1.0));
        let indices: Vec<usize> = peaks.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![3, 8]);
        assert!((peaks[0].magnitude_db - 25.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_negative_thresholds() {
        let picker = PeakPicking {
            prominence_db: -1.0,
            min_distance_hz: 10.0,
        };
        assert!(picker.validate().is_err());
    }
}
