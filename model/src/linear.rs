use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::{ModelErr, Result};

/// Ordinary least squares regression with an intercept term.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegression {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegression {
    /// Creates a `LinearRegression` from already fitted parameters.
    ///
    /// # Arguments
    /// * `coefficients` - One weight per feature, in feature order.
    /// * `intercept` - The bias term.
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    /// Fits the model to `x` and `y`.
    ///
    /// The features and the target are centered and the normal equations are
    /// solved with partial pivoting, the intercept is recovered from the means.
    /// The result only depends on the input values and their row order.
    ///
    /// # Arguments
    /// * `x` - A `rows x features` matrix.
    /// * `y` - The `rows` target values.
    ///
    /// # Returns
    /// `InsufficientData` if there aren't more rows than features,
    /// `NumericalInstability` on singular systems or non-finite parameters.
    pub fn fit(x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<Self> {
        let (rows, features) = x.dim();

        if y.len() != rows {
            return Err(ModelErr::ShapeMismatch {
                what: "targets",
                got: y.len(),
                expected: rows,
            });
        }

        if rows <= features {
            return Err(ModelErr::InsufficientData {
                what: "training rows",
                got: rows,
                required: features + 1,
            });
        }

        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(ModelErr::NumericalInstability(
                "training data contains non-finite values".into(),
            ));
        }

        let too_few = || ModelErr::InsufficientData {
            what: "training rows",
            got: rows,
            required: 1,
        };
        let x_mean = x.mean_axis(Axis(0)).ok_or_else(too_few)?;
        let y_mean = y.mean().ok_or_else(too_few)?;

        let xc = &x - &x_mean;
        let yc = y.mapv(|v| v - y_mean);

        let gram = xc.t().dot(&xc);
        let moment = xc.t().dot(&yc);
        let coefficients = solve(gram, moment)?;
        let intercept = y_mean - x_mean.dot(&coefficients);

        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelErr::NumericalInstability(
                "fit produced non-finite parameters".into(),
            ));
        }

        Ok(Self {
            coefficients: coefficients.to_vec(),
            intercept,
        })
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Predicts a single feature vector.
    ///
    /// # Arguments
    /// * `features` - The feature values, in the order the model was fitted with.
    pub fn predict_one(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.coefficients.len() {
            return Err(ModelErr::ShapeMismatch {
                what: "features",
                got: features.len(),
                expected: self.coefficients.len(),
            });
        }

        let dot: f64 = features
            .iter()
            .zip(&self.coefficients)
            .map(|(x, w)| x * w)
            .sum();

        Ok(dot + self.intercept)
    }

    /// Predicts every row of `x`.
    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.coefficients.len() {
            return Err(ModelErr::ShapeMismatch {
                what: "features",
                got: x.ncols(),
                expected: self.coefficients.len(),
            });
        }

        let weights = ArrayView1::from(self.coefficients.as_slice());
        Ok(x.dot(&weights) + self.intercept)
    }
}

/// Solves `a * w = b` by Gaussian elimination with partial pivoting.
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>> {
    let n = b.len();
    let scale = a.iter().fold(0.0_f64, |max, v| max.max(v.abs()));
    let tolerance = scale * f64::EPSILON * n.max(1) as f64;

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))
            .unwrap_or(col);

        if !(a[[pivot, col]].abs() > tolerance) {
            return Err(ModelErr::NumericalInstability(format!(
                "singular system, feature {col} is constant or collinear"
            )));
        }

        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }

        for row in col + 1..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                let delta = factor * a[[col, k]];
                a[[row, k]] -= delta;
            }
            let delta = factor * b[col];
            b[row] -= delta;
        }
    }

    let mut w = Array1::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[[row, k]] * w[k]).sum();
        w[row] = (b[row] - tail) / a[[row, row]];
    }

    Ok(w)
}
