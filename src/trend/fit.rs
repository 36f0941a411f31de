// Ordinary least-squares line through (day offset, value) points

use crate::error::{CatexError, Result};
use aprender::linear_model::LinearRegression;
use aprender::primitives::{Matrix, Vector};
use aprender::traits::Estimator;
use serde::Serialize;

/// Fitted line `value = intercept + slope * days`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Fitted value at a day offset
    pub fn at(&self, days: f64) -> f64 {
        self.intercept + self.slope * days
    }
}

fn mean(values: impl Iterator<Item = f64>, n: usize) -> f64 {
    values.sum::<f64>() / n as f64
}

/// Fit a degree-1 polynomial to the points
///
/// Needs at least two distinct day offsets. Both axes are centred on their
/// means for the f32 regression and the line is shifted back afterwards.
pub fn fit_line(points: &[(f64, f64)]) -> Result<LinearFit> {
    if points.len() < 2 {
        return Err(CatexError::malformed(format!(
            "trend fit needs at least 2 observations, got {}",
            points.len()
        )));
    }
    let first_day = points[0].0;
    if points.iter().all(|(x, _)| *x == first_day) {
        return Err(CatexError::malformed(
            "trend fit needs observations on at least two different days",
        ));
    }

    let n = points.len();
    let mean_x = mean(points.iter().map(|(x, _)| *x), n);
    let mean_y = mean(points.iter().map(|(_, y)| *y), n);

    let days: Vec<f32> = points.iter().map(|(x, _)| (x - mean_x) as f32).collect();
    let values: Vec<f32> = points.iter().map(|(_, y)| (y - mean_y) as f32).collect();
    let x = Matrix::from_vec(n, 1, days).map_err(CatexError::malformed)?;
    let y = Vector::from_vec(values);

    let mut model = LinearRegression::new();
    model
        .fit(&x, &y)
        .map_err(|e| CatexError::malformed(format!("trend fit failed: {e}")))?;

    let slope = f64::from(model.coefficients()[0]);
    let intercept = mean_y + f64::from(model.intercept()) - slope * mean_x;
    Ok(LinearFit { slope, intercept })
}
