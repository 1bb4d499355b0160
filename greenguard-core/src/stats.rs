//! History Statistics
//!
//! ## Overview
//!
//! Descriptive statistics over the values one sensor left in the
//! [`BoundedHistory`]. These feed analytics outside the control loop; nothing in
//! a tick depends on them.
//!
//! | Function          | Result                                      | Cost       |
//! |-------------------|---------------------------------------------|------------|
//! | [`summarize`]     | count, mean, sample σ, min, max, median     | O(n log n) |
//! | [`moving_average`]| sliding-window means                        | O(n)       |
//! | [`peaks`]         | indices of values above a threshold         | O(n)       |
//! | [`smooth`]        | moving average over the default window      | O(n)       |
//! | [`anomalies`]     | indices of values outside mean ± 2σ         | O(n)       |
//! | [`trend`]         | least-squares slope per sample              | O(n)       |
//!
//! Empty input gives `None` or an empty vector, never an error. Anomaly
//! detection needs [`MIN_STATISTICS_SAMPLES`] values before it reports anything.

use serde::{Deserialize, Serialize};

use crate::constants::buffers::{DEFAULT_MOVING_AVERAGE_WINDOW, MIN_STATISTICS_SAMPLES};
use crate::history::BoundedHistory;
use crate::reading::Reading;

/// Number of standard deviations beyond which a value is anomalous
pub const ANOMALY_SIGMAS: f64 = 2.0;

/// Descriptive statistics of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of values
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation (n - 1), 0 for a single value
    pub std_dev: f64,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// `max - min`
    pub range: f64,
    /// Middle value, mean of the two middle values for even counts
    pub median: f64,
}

/// Values of `sensor` in history order, oldest first
pub fn sensor_values(history: &BoundedHistory<Reading>, sensor: &str) -> Vec<f64> {
    history
        .iter()
        .filter(|r| r.sensor_id() == sensor)
        .map(Reading::value)
        .collect()
}

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation; 0 for fewer than two values
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    if values.len() < 2 {
        return Some(0.0);
    }
    let squares: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    Some(libm::sqrt(squares / (values.len() - 1) as f64))
}

/// Full summary of a series
pub fn summarize(values: &[f64]) -> Option<Summary> {
    let mean = mean(values)?;
    let std_dev = std_dev(values)?;

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    Some(Summary {
        count: values.len(),
        mean,
        std_dev,
        min,
        max,
        range: max - min,
        median,
    })
}

/// Means of every `window`-sized slice, in order
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || values.len() < window {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(values.len() - window + 1);
    let mut sum: f64 = values[..window].iter().sum();
    out.push(sum / window as f64);
    for i in window..values.len() {
        sum += values[i] - values[i - window];
        out.push(sum / window as f64);
    }
    out
}

/// [`moving_average`] with [`DEFAULT_MOVING_AVERAGE_WINDOW`]
pub fn smooth(values: &[f64]) -> Vec<f64> {
    moving_average(values, DEFAULT_MOVING_AVERAGE_WINDOW)
}

/// Indices of values strictly above `threshold`
pub fn peaks(values: &[f64], threshold: f64) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v > threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Indices of values outside `mean ± 2σ`; none below the sample minimum
pub fn anomalies(values: &[f64]) -> Vec<usize> {
    if values.len() < MIN_STATISTICS_SAMPLES {
        return Vec::new();
    }
    let (Some(mean), Some(sd)) = (mean(values), std_dev(values)) else {
        return Vec::new();
    };
    let low = mean - ANOMALY_SIGMAS * sd;
    let high = mean + ANOMALY_SIGMAS * sd;
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v < low || **v > high)
        .map(|(i, _)| i)
        .collect()
}

/// Least-squares slope against sample index; 0 for fewer than two values
pub fn trend(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let (mut sx, mut sy, mut sxy, mut sx2) = (0.0, 0.0, 0.0, 0.0);
    for (i, y) in values.iter().enumerate() {
        let x = i as f64;
        sx += x;
        sy += y;
        sxy += x * y;
        sx2 += x * x;
    }
    (n * sxy - sx * sy) / (n * sx2 - sx * sx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn summary_of_known_series() {
        let s = summarize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(s.count, 8);
        assert!(approx(s.mean, 5.0));
        // population σ is 2, sample σ is sqrt(32 / 7)
        assert!(approx(s.std_dev, libm::sqrt(32.0 / 7.0)));
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 9.0);
        assert_eq!(s.range, 7.0);
        assert!(approx(s.median, 4.5));
    }

    #[test]
    fn empty_and_single() {
        assert!(summarize(&[]).is_none());
        assert!(mean(&[]).is_none());
        let s = summarize(&[3.0]).unwrap();
        assert_eq!(s.std_dev, 0.0);
        assert_eq!(s.median, 3.0);
        assert!(anomalies(&[3.0]).is_empty());
        assert_eq!(trend(&[3.0]), 0.0);
    }

    #[test]
    fn sliding_window() {
        let avg = moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(avg, vec![2.0, 3.0, 4.0]);
        assert!(moving_average(&[1.0], 3).is_empty());
        assert!(moving_average(&[1.0], 0).is_empty());
    }

    #[test]
    fn peaks_and_anomalies() {
        let mut values = vec![20.0; 30];
        values[7] = 45.0;
        assert_eq!(peaks(&values, 35.0), vec![7]);
        assert_eq!(anomalies(&values), vec![7]);
    }

    #[test]
    fn anomalies_need_enough_samples() {
        let mut values = vec![20.0; MIN_STATISTICS_SAMPLES - 1];
        values.push(45.0);
        assert_eq!(anomalies(&values), vec![MIN_STATISTICS_SAMPLES - 1]);

        values.remove(0);
        assert!(anomalies(&values).is_empty());
    }

    #[test]
    fn smooth_uses_default_window() {
        let values: Vec<f64> = (1..=7).map(f64::from).collect();
        assert_eq!(smooth(&values), vec![3.0, 4.0, 5.0]);
        assert!(smooth(&values[..DEFAULT_MOVING_AVERAGE_WINDOW - 1]).is_empty());
    }

    #[test]
    fn slope_of_a_line() {
        let values: Vec<f64> = (0..10).map(|i| 3.0 + 0.5 * i as f64).collect();
        assert!(approx(trend(&values), 0.5));
    }

    #[test]
    fn values_from_history() {
        let mut history = BoundedHistory::new(10);
        history.append(Reading::classified(1, "TEMP", 20.0));
        history.append(Reading::classified(1, "PH", 6.5));
        history.append(Reading::classified(2, "TEMP", 22.0));
        assert_eq!(sensor_values(&history, "TEMP"), vec![20.0, 22.0]);
        assert!(sensor_values(&history, "CO2").is_empty());
    }
}
