//! Time-signal helpers: detrending and numerical integration.

use crate::dynamic_solver::GRAVITY;
use crate::error::{Result, SolverError};

/// Subtract the arithmetic mean
pub fn remove_mean(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| v - mean).collect()
}

/// Running trapezoidal integral of `values` over `time`, starting at zero
///
/// # Errors
/// `Configuration` if the slices differ in length
pub fn cumulative_trapezoid(values: &[f64], time: &[f64]) -> Result<Vec<f64>> {
    if values.len() != time.len() {
        return Err(SolverError::Configuration(format!(
            "Cannot integrate {} samples over {} time points",
            values.len(),
            time.len()
        )));
    }
    let mut integral = Vec::with_capacity(values.len());
    let mut acc = 0.0;
    for k in 0..values.len() {
        if k > 0 {
            acc += 0.5 * (values[k] + values[k - 1]) * (time[k] - time[k - 1]);
        }
        integral.push(acc);
    }
    Ok(integral)
}

/// Double integration of an acceleration record in g to displacement in
/// metres, assuming zero initial velocity and displacement
pub fn acceleration_to_displacement(acceleration_g: &[f64], time: &[f64]) -> Result<Vec<f64>> {
    let acceleration: Vec<f64> = acceleration_g.iter().map(|a| a * GRAVITY).collect();
    let velocity = cumulative_trapezoid(&acceleration, time)?;
    cumulative_trapezoid(&velocity, time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_is_removed() {
        let centred = remove_mean(&[1.0, 2.0, 3.0, 6.0]);
        assert_eq!(centred, vec![-2.0, -1.0, 0.0, 3.0]);
        assert!(remove_mean(&[]).is_empty());
    }

    #[test]
    fn integrates_linear_signal_exactly() {
        let time = [0.0, 0.5, 1.5, 2.0];
        let values: Vec<f64> = time.iter().map(|t| 2.0 * t).collect();
        let integral = cumulative_trapezoid(&values, &time).unwrap();
        for (t, i) in time.iter().zip(integral) {
            assert_relative_eq!(i, t * t, epsilon = 1e-12);
        }
    }

    #[test]
    fn constant_acceleration_gives_parabola() {
        let time: Vec<f64> = (0..=1000).map(|k| k as f64 * 1e-3).collect();
        let accel = vec![1.0; time.len()];
        let disp = acceleration_to_displacement(&accel, &time).unwrap();
        // s = g t² / 2 at t = 1 s
        assert_relative_eq!(*disp.last().unwrap(), GRAVITY / 2.0, max_relative = 1e-5);
    }

    #[test]
    fn rejects_mismatched_lengths() {
        assert!(cumulative_trapezoid(&[1.0, 2.0], &[0.0]).is_err());
    }
}
