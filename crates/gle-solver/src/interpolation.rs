//! Natural cubic spline interpolation on a non-uniform axis.
//!
//! Used to move adaptive-step integrator output onto a uniform sampling grid.
//! Outside the data range the spline continues linearly with its end slope
//! (the natural end condition makes this C² continuous).

use crate::error::{Result, SolverError};

/// Interpolating natural cubic spline through `(x_i, y_i)`
#[derive(Debug, Clone)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    /// Second derivative at each knot
    curvature: Vec<f64>,
}

impl CubicSpline {
    /// Build the spline; `x` must be strictly increasing
    ///
    /// # Errors
    /// - `InsufficientData` with fewer than two knots
    /// - `Configuration` for mismatched lengths or a non-increasing axis
    pub fn natural(x: &[f64], y: &[f64]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(SolverError::Configuration(format!(
                "Spline axis has {} samples but values have {}",
                x.len(),
                y.len()
            )));
        }
        if x.len() < 2 {
            return Err(SolverError::InsufficientData(
                "Spline needs at least two samples".to_string(),
            ));
        }
        if x.windows(2).any(|w| w[1] <= w[0]) {
            return Err(SolverError::Configuration(
                "Spline axis must be strictly increasing".to_string(),
            ));
        }

        let n = x.len();
        let mut curvature = vec![0.0; n];
        if n > 2 {
            // Tridiagonal system for the interior second derivatives (Thomas algorithm)
            let m = n - 2;
            let mut diag = vec![0.0; m];
            let mut upper = vec![0.0; m];
            let mut rhs = vec![0.0; m];
            for k in 0..m {
                let i = k + 1;
                let h0 = x[i] - x[i - 1];
                let h1 = x[i + 1] - x[i];
                diag[k] = 2.0 * (h0 + h1);
                upper[k] = h1;
                rhs[k] = 6.0 * ((y[i + 1] - y[i]) / h1 - (y[i] - y[i - 1]) / h0);
            }
            for k in 1..m {
                let lower = x[k + 1] - x[k];
                let w = lower / diag[k - 1];
                diag[k] -= w * upper[k - 1];
                rhs[k] -= w * rhs[k - 1];
            }
            curvature[m] = rhs[m - 1] / diag[m - 1];
            for k in (0..m - 1).rev() {
                curvature[k + 1] = (rhs[k] - upper[k] * curvature[k + 2]) / diag[k];
            }
        }

        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            curvature,
        })
    }

    /// Spline value at `t`
    pub fn evaluate(&self, t: f64) -> f64 {
        let n = self.x.len();
        if t < self.x[0] {
            return self.y[0] + self.slope_at_start() * (t - self.x[0]);
        }
        if t > self.x[n - 1] {
            return self.y[n - 1] + self.slope_at_end() * (t - self.x[n - 1]);
        }

        let i = self.x.partition_point(|&xi| xi <= t).saturating_sub(1).min(n - 2);
        let h = self.x[i + 1] - self.x[i];
        let a = (self.x[i + 1] - t) / h;
        let b = (t - self.x[i]) / h;
        a * self.y[i]
            + b * self.y[i + 1]
            + ((a * a * a - a) * self.curvature[i] + (b * b * b - b) * self.curvature[i + 1]) * h * h
                / 6.0
    }

    /// Evaluate at every point of `grid`
    pub fn evaluate_many(&self, grid: &[f64]) -> Vec<f64> {
        grid.iter().map(|&t| self.evaluate(t)).collect()
    }

    fn slope_at_start(&self) -> f64 {
        let h = self.x[1] - self.x[0];
        (self.y[1] - self.y[0]) / h - h * (2.0 * self.curvature[0] + self.curvature[1]) / 6.0
    }

    fn slope_at_end(&self) -> f64 {
        let n = self.x.len();
        let h = self.x[n - 1] - self.x[n - 2];
        (self.y[n - 1] - self.y[n - 2]) / h
            + h * (self.curvature[n - 2] + 2.0 * self.curvature[n - 1]) / 6.0
    }
}
