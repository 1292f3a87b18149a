// SPDX-License-Identifier: Apache-2.0

use crate::{Sample, TrendPoint};

/// Ordinary least-squares line over `(index, weight_kg)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    #[must_use]
    pub fn predict(self, index: usize) -> f64 {
        self.intercept + self.slope * index as f64
    }
}

/// Fits weight against sample index. A single sample gives a flat line through
/// it; an empty slice gives the zero line.
#[must_use]
pub fn linear_fit(samples: &[Sample]) -> LinearFit {
    let n = samples.len();
    match n {
        0 => LinearFit {
            slope: 0.0,
            intercept: 0.0,
        },
        1 => LinearFit {
            slope: 0.0,
            intercept: samples[0].weight_kg,
        },
        _ => {
            let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
            for (i, sample) in samples.iter().enumerate() {
                let x = i as f64;
                sum_x += x;
                sum_y += sample.weight_kg;
                sum_xy += x * sample.weight_kg;
                sum_xx += x * x;
            }
            let n = n as f64;
            // Indices are distinct, so the denominator is positive for n >= 2.
            let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_xx - sum_x * sum_x);
            let intercept = (sum_y - slope * sum_x) / n;
            LinearFit { slope, intercept }
        }
    }
}

#[must_use]
pub fn trend_points(samples: &[Sample], fit: LinearFit) -> Vec<TrendPoint> {
    samples
        .iter()
        .enumerate()
        .map(|(i, sample)| TrendPoint {
            x: sample.taken_at,
            y: fit.predict(i),
        })
        .collect()
}
