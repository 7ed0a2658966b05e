//! Statistics Calculator Module
//! Numeric kernels behind the dashboard views: histogram binning, Gaussian
//! kernel density and Pearson correlation.

use rayon::prelude::*;
use serde::Serialize;
use statrs::distribution::{Continuous, Normal};

/// Equal-width histogram. `edges` has one more entry than `counts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        match self.edges.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Numeric helpers shared by the aggregator.
pub struct StatsCalculator;

impl StatsCalculator {
    pub fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            return f64::NAN;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// Sample standard deviation (n - 1 denominator).
    pub fn sample_std(values: &[f64]) -> f64 {
        let n = values.len();
        if n < 2 {
            return f64::NAN;
        }
        let mean = Self::mean(values);
        let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        variance.sqrt()
    }

    /// Bin values into `bins` equal-width buckets spanning [min, max].
    ///
    /// The last bucket is closed on the right. A single-valued sample is
    /// binned over [v - 0.5, v + 0.5].
    pub fn histogram(values: &[f64], bins: usize) -> Histogram {
        if values.is_empty() || bins == 0 {
            return Histogram::default();
        }

        let (mut lo, mut hi) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Histogram { edges, counts }
    }

    /// Scott's rule bandwidth: sample std * n^(-1/5).
    pub fn scott_bandwidth(values: &[f64]) -> f64 {
        Self::sample_std(values) * (values.len() as f64).powf(-0.2)
    }

    /// Gaussian KDE evaluated on `grid_size` points across the data range.
    ///
    /// Densities are multiplied by `scale` so the curve can sit on top of a
    /// count histogram. Returns an empty curve when the bandwidth is not
    /// positive (fewer than two distinct values).
    pub fn gaussian_kde(values: &[f64], grid_size: usize, scale: f64) -> Vec<[f64; 2]> {
        let bandwidth = Self::scott_bandwidth(values);
        if bandwidth.is_nan() || bandwidth <= 0.0 || grid_size < 2 {
            return Vec::new();
        }
        let Ok(kernel) = Normal::new(0.0, 1.0) else {
            return Vec::new();
        };

        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let step = (hi - lo) / (grid_size - 1) as f64;
        let norm = scale / (values.len() as f64 * bandwidth);

        (0..grid_size)
            .into_par_iter()
            .map(|i| {
                let x = lo + step * i as f64;
                let density: f64 = values
                    .iter()
                    .map(|&v| kernel.pdf((x - v) / bandwidth))
                    .sum();
                [x, density * norm]
            })
            .collect()
    }

    /// Pearson correlation coefficient. NaN when undefined.
    pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
        let n = xs.len().min(ys.len());
        if n < 2 {
            return f64::NAN;
        }
        let (xs, ys) = (&xs[..n], &ys[..n]);
        let mx = Self::mean(xs);
        let my = Self::mean(ys);

        let mut sxy = 0.0;
        let mut sxx = 0.0;
        let mut syy = 0.0;
        for (x, y) in xs.iter().zip(ys) {
            let dx = x - mx;
            let dy = y - my;
            sxy += dx * dy;
            sxx += dx * dx;
            syy += dy * dy;
        }

        if sxx == 0.0 || syy == 0.0 {
            return f64::NAN;
        }
        (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
    }

    /// Pairwise Pearson matrix over equally long columns.
    pub fn correlation_matrix(columns: &[Vec<f64>]) -> Vec<Vec<f64>> {
        columns
            .iter()
            .map(|a| columns.iter().map(|b| Self::pearson(a, b)).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts_every_value() {
        let values: Vec<f64> = (0..100).map(|i| i as f64 * 0.7).collect();
        let hist = StatsCalculator::histogram(&values, 30);
        assert_eq!(hist.counts.len(), 30);
        assert_eq!(hist.edges.len(), 31);
        assert_eq!(hist.total(), 100);
        // max lands in the closed last bin
        assert!(hist.counts[29] > 0);
    }

    #[test]
    fn test_histogram_single_value() {
        let hist = StatsCalculator::histogram(&[25.0, 25.0, 25.0], 30);
        assert_eq!(hist.total(), 3);
        assert!((hist.edges[0] - 24.5).abs() < 1e-12);
        assert!((hist.edges[30] - 25.5).abs() < 1e-12);
        assert!((hist.bin_width() - 1.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_histogram_empty() {
        assert_eq!(StatsCalculator::histogram(&[], 30), Histogram::default());
    }

    #[test]
    fn test_kde_integrates_to_scale() {
        let values = [18.0, 22.0, 25.0, 25.0, 31.0, 40.0, 44.0, 52.0];
        let curve = StatsCalculator::gaussian_kde(&values, 200, 1.0);
        assert_eq!(curve.len(), 200);
        assert!(curve.iter().all(|p| p[1] >= 0.0));
        assert!((curve[0][0] - 18.0).abs() < 1e-12);
        assert!((curve[199][0] - 52.0).abs() < 1e-9);

        // clipped to the data range, so the mass is below 1 but most of it
        let step = curve[1][0] - curve[0][0];
        let area: f64 = curve.windows(2).map(|w| (w[0][1] + w[1][1]) * 0.5 * step).sum();
        assert!(area > 0.6 && area < 1.0, "area = {area}");
    }

    #[test]
    fn test_kde_degenerate_sample() {
        assert!(StatsCalculator::gaussian_kde(&[30.0, 30.0], 200, 1.0).is_empty());
        assert!(StatsCalculator::gaussian_kde(&[30.0], 200, 1.0).is_empty());
    }

    #[test]
    fn test_pearson() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let up = [2.0, 4.0, 6.0, 8.0];
        let down = [8.0, 6.0, 4.0, 2.0];
        assert!((StatsCalculator::pearson(&xs, &up) - 1.0).abs() < 1e-12);
        assert!((StatsCalculator::pearson(&xs, &down) + 1.0).abs() < 1e-12);
        assert!(StatsCalculator::pearson(&xs, &[5.0; 4]).is_nan());
        assert!(StatsCalculator::pearson(&[1.0], &[1.0]).is_nan());
    }

    #[test]
    fn test_correlation_matrix_is_symmetric() {
        let m = StatsCalculator::correlation_matrix(&[
            vec![1.0, 2.0, 3.0, 5.0],
            vec![3.0, 1.0, 4.0, 1.0],
        ]);
        assert_eq!(m.len(), 2);
        assert!((m[0][0] - 1.0).abs() < 1e-12);
        assert!((m[1][1] - 1.0).abs() < 1e-12);
        assert_eq!(m[0][1], m[1][0]);
    }
}
