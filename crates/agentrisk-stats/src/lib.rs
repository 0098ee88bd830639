use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// z for a 95% two-sided normal interval.
pub const Z95: f64 = 1.96;

/// Wilson score interval for a binomial proportion.
///
/// Uses the closed-form Wilson correction, which stays stable at proportions
/// near 0 and 1 where the normal-approximation interval degenerates. For
/// `n = 0` the interval is `(0, 0)` by convention. Bounds are clamped to
/// [0, 1].
pub fn wilson_interval(phat: f64, n: usize, z: f64) -> (f64, f64) {
    if n == 0 {
        return (0.0, 0.0);
    }
    let n = n as f64;
    let denom = 1.0 + z * z / n;
    let center = (phat + z * z / (2.0 * n)) / denom;
    let margin = z * (phat * (1.0 - phat) / n + z * z / (4.0 * n * n)).sqrt() / denom;
    ((center - margin).max(0.0), (center + margin).min(1.0))
}

/// 95% Wilson interval.
pub fn wilson95(phat: f64, n: usize) -> (f64, f64) {
    wilson_interval(phat, n, Z95)
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator, floored at 1).
pub fn sample_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let denom = values.len().saturating_sub(1).max(1) as f64;
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / denom).sqrt()
}

fn sample_cov(xs: &[f64], ys: &[f64]) -> f64 {
    let mx = mean(xs);
    let my = mean(ys);
    let denom = xs.len().saturating_sub(1).max(1) as f64;
    xs.iter()
        .zip(ys)
        .map(|(x, y)| (x - mx) * (y - my))
        .sum::<f64>()
        / denom
}

/// Pearson correlation coefficient.
///
/// NaN when either series has zero variance — which includes every corpus of
/// fewer than two points. A valid statistical outcome, not an error.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let sx = sample_std(xs);
    let sy = sample_std(ys);
    if sx > 0.0 && sy > 0.0 {
        sample_cov(xs, ys) / (sx * sy)
    } else {
        f64::NAN
    }
}

/// Mid-rank transform: 1-based ranks with ties averaged over their block.
pub fn midranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(Ordering::Equal)
    });

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &k in &order[i..=j] {
            ranks[k] = avg;
        }
        i = j + 1;
    }
    ranks
}

/// Spearman rank correlation: Pearson over mid-rank-transformed series.
pub fn spearman(xs: &[f64], ys: &[f64]) -> f64 {
    pearson(&midranks(xs), &midranks(ys))
}

/// Ordinary least squares of y on x: `(intercept, slope)`.
///
/// Zero-variance x degenerates to a flat line at the mean of y.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> (f64, f64) {
    let sx = sample_std(xs);
    let slope = if sx > 0.0 {
        sample_cov(xs, ys) / (sx * sx)
    } else {
        0.0
    };
    (mean(ys) - slope * mean(xs), slope)
}

/// Which empirical series to correlate against the entropy score.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeMetric {
    BrittlenessIndex,
    FailureRate,
}

impl OutcomeMetric {
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeMetric::BrittlenessIndex => "brittleness_index",
            OutcomeMetric::FailureRate => "failure_rate",
        }
    }
}

/// One graph's contribution to the corpus: its structural score and the
/// chosen empirical outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorpusPoint {
    pub graph: String,
    pub entropy_score: f64,
    pub outcome: f64,
}

/// Corpus-level relationship between structural entropy and empirical
/// outcome.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub metric: OutcomeMetric,
    pub points: Vec<CorpusPoint>,
    pub pearson: f64,
    pub spearman: f64,
    pub fit_intercept: f64,
    pub fit_slope: f64,
}

pub fn correlate(metric: OutcomeMetric, points: Vec<CorpusPoint>) -> CorrelationReport {
    let xs: Vec<f64> = points.iter().map(|p| p.entropy_score).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.outcome).collect();
    let (fit_intercept, fit_slope) = linear_fit(&xs, &ys);
    CorrelationReport {
        metric,
        points,
        pearson: pearson(&xs, &ys),
        spearman: spearman(&xs, &ys),
        fit_intercept,
        fit_slope,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn wilson_interval_of_empty_population_is_degenerate() {
        assert_eq!(wilson95(0.0, 0), (0.0, 0.0));
        assert_eq!(wilson95(0.7, 0), (0.0, 0.0));
    }

    #[test]
    fn wilson_interval_brackets_the_estimate() {
        for &n in &[1usize, 5, 30, 300, 10_000] {
            for i in 0..=20 {
                let phat = i as f64 / 20.0;
                let (lo, hi) = wilson95(phat, n);
                assert!(lo >= 0.0 && hi <= 1.0, "bounds outside unit interval");
                assert!(
                    lo <= phat + 1e-12 && phat <= hi + 1e-12,
                    "interval [{lo}, {hi}] misses phat={phat} at n={n}"
                );
                assert!(lo <= hi);
            }
        }
    }

    #[test]
    fn wilson_interval_known_value() {
        // phat = 0, n = 10: lower bound collapses to 0, upper stays positive
        let (lo, hi) = wilson95(0.0, 10);
        assert_relative_eq!(lo, 0.0);
        assert_abs_diff_eq!(hi, 0.27753, epsilon = 1e-4);
    }

    #[test]
    fn wilson_interval_narrows_with_sample_size() {
        let (lo_small, hi_small) = wilson95(0.5, 30);
        let (lo_large, hi_large) = wilson95(0.5, 3000);
        assert!(hi_large - lo_large < hi_small - lo_small);
    }

    #[test]
    fn pearson_detects_exact_linear_relationships() {
        let xs = vec![1.0, 2.0, 3.0, 4.0];
        let up: Vec<f64> = xs.iter().map(|x| 3.0 * x + 1.0).collect();
        let down: Vec<f64> = xs.iter().map(|x| -2.0 * x).collect();
        assert_relative_eq!(pearson(&xs, &up), 1.0, epsilon = 1e-12);
        assert_relative_eq!(pearson(&xs, &down), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_variance_series_gives_nan() {
        let flat = vec![0.5, 0.5, 0.5];
        let xs = vec![1.0, 2.0, 3.0];
        assert!(pearson(&flat, &xs).is_nan());
        assert!(pearson(&xs, &flat).is_nan());
        assert!(spearman(&flat, &xs).is_nan());
    }

    #[test]
    fn undersized_corpus_gives_nan() {
        assert!(pearson(&[1.0], &[2.0]).is_nan());
        assert!(pearson(&[], &[]).is_nan());
    }

    #[test]
    fn midranks_average_tied_blocks() {
        assert_eq!(midranks(&[1.0, 2.0, 2.0, 3.0]), vec![1.0, 2.5, 2.5, 4.0]);
        assert_eq!(midranks(&[5.0, 5.0, 5.0]), vec![2.0, 2.0, 2.0]);
        assert_eq!(midranks(&[3.0, 1.0, 2.0]), vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn spearman_sees_monotone_nonlinear_relationships() {
        let xs = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let ys: Vec<f64> = xs.iter().map(|x: &f64| x.exp()).collect();
        assert_relative_eq!(spearman(&xs, &ys), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn linear_fit_recovers_known_coefficients() {
        let xs = vec![0.0, 1.0, 2.0, 3.0];
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 1.0).collect();
        let (intercept, slope) = linear_fit(&xs, &ys);
        assert_relative_eq!(slope, 2.0, epsilon = 1e-12);
        assert_relative_eq!(intercept, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn linear_fit_on_flat_x_is_mean_of_y() {
        let xs = vec![1.0, 1.0, 1.0];
        let ys = vec![2.0, 4.0, 6.0];
        let (intercept, slope) = linear_fit(&xs, &ys);
        assert_relative_eq!(slope, 0.0);
        assert_relative_eq!(intercept, 4.0);
    }

    #[test]
    fn correlation_report_carries_points_and_stats() {
        let points = vec![
            CorpusPoint {
                graph: "a".into(),
                entropy_score: 0.1,
                outcome: 0.05,
            },
            CorpusPoint {
                graph: "b".into(),
                entropy_score: 0.6,
                outcome: 0.30,
            },
            CorpusPoint {
                graph: "c".into(),
                entropy_score: 1.1,
                outcome: 0.55,
            },
        ];
        let report = correlate(OutcomeMetric::BrittlenessIndex, points);
        assert_eq!(report.points.len(), 3);
        assert_relative_eq!(report.pearson, 1.0, epsilon = 1e-12);
        assert_relative_eq!(report.spearman, 1.0, epsilon = 1e-12);
        assert_relative_eq!(report.fit_slope, 0.5, epsilon = 1e-12);
        assert_relative_eq!(report.fit_intercept, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn nan_serializes_as_null() {
        let report = correlate(
            OutcomeMetric::FailureRate,
            vec![CorpusPoint {
                graph: "only".into(),
                entropy_score: 0.4,
                outcome: 0.2,
            }],
        );
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["pearson"].is_null());
    }
}
