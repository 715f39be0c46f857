use super::errors::TrendError;
use super::sample::LoadLevel;
use serde::Serialize;

/// Fitted model `metric ≈ a·ln(concurrency) + b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendModel {
    pub a: f64,
    pub b: f64,
    /// Coefficient of determination of the fit
    pub r_squared: f64,
}

impl TrendModel {
    pub fn predict(&self, concurrency: f64) -> f64 {
        self.a * concurrency.ln() + self.b
    }
}

/// Model evaluated on a linear grid spanning the observed concurrency range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendCurve {
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendFit {
    pub model: TrendModel,
    pub curve: TrendCurve,
}

/// Closed-form least-squares fit of a metric against ln(concurrency).
///
/// No iterative solver is involved, so identical input always yields the
/// same coefficients.
#[derive(Debug, Clone, Copy)]
pub struct TrendFitter {
    grid_points: usize,
}

impl Default for TrendFitter {
    fn default() -> Self {
        Self { grid_points: 100 }
    }
}

impl TrendFitter {
    pub fn new(grid_points: usize) -> Self {
        Self {
            grid_points: grid_points.max(2),
        }
    }

    pub fn fit(&self, points: &[(LoadLevel, f64)]) -> Result<TrendFit, TrendError> {
        for &(concurrency, metric) in points {
            if concurrency == 0 {
                return Err(TrendError::NonPositiveConcurrency { concurrency });
            }
            if !metric.is_finite() {
                return Err(TrendError::NonFiniteMetric { concurrency });
            }
        }
        if points.len() < 2 {
            return Err(TrendError::Degenerate {
                reason: format!("need at least 2 points, got {}", points.len()),
            });
        }

        let n = points.len() as f64;
        let xs: Vec<f64> = points.iter().map(|&(c, _)| f64::from(c).ln()).collect();
        let ys: Vec<f64> = points.iter().map(|&(_, m)| m).collect();

        let mean_x = xs.iter().sum::<f64>() / n;
        let mean_y = ys.iter().sum::<f64>() / n;

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        let mut syy = 0.0;
        for (x, y) in xs.iter().zip(&ys) {
            let dx = x - mean_x;
            let dy = y - mean_y;
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }

        if sxx == 0.0 {
            return Err(TrendError::Degenerate {
                reason: "all points share the same concurrency".to_string(),
            });
        }

        let a = sxy / sxx;
        let b = mean_y - a * mean_x;

        let ss_res: f64 = xs
            .iter()
            .zip(&ys)
            .map(|(x, y)| (y - (a * x + b)).powi(2))
            .sum();
        // A flat metric is fit perfectly by a = 0
        let r_squared = if syy > 0.0 { 1.0 - ss_res / syy } else { 1.0 };

        let model = TrendModel { a, b, r_squared };

        let min = points.iter().map(|&(c, _)| c).min().unwrap_or(1);
        let max = points.iter().map(|&(c, _)| c).max().unwrap_or(1);
        let curve = self.sample_curve(&model, f64::from(min), f64::from(max));

        Ok(TrendFit { model, curve })
    }

    fn sample_curve(&self, model: &TrendModel, min: f64, max: f64) -> TrendCurve {
        let step = (max - min) / (self.grid_points - 1) as f64;
        let points = (0..self.grid_points)
            .map(|i| {
                // Pin the last sample to max so rounding never overshoots the range
                let x = if i + 1 == self.grid_points {
                    max
                } else {
                    min + step * i as f64
                };
                (x, model.predict(x))
            })
            .collect();
        TrendCurve { points }
    }
}
