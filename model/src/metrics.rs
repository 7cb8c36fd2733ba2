use ndarray::ArrayView1;

use crate::{ModelErr, Result};

fn check_lengths(y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(ModelErr::ShapeMismatch {
            what: "predictions",
            got: y_pred.len(),
            expected: y_true.len(),
        });
    }
    Ok(())
}

/// Coefficient of determination.
///
/// A constant `y_true` scores 1.0 when predicted exactly and 0.0 otherwise,
/// so the result is always finite for finite inputs.
///
/// # Returns
/// `InsufficientData` for fewer than two samples.
pub fn r2_score(y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    if y_true.len() < 2 {
        return Err(ModelErr::InsufficientData {
            what: "scoring rows",
            got: y_true.len(),
            required: 2,
        });
    }

    let mean = y_true.sum() / y_true.len() as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }

    Ok(1.0 - ss_res / ss_tot)
}

/// Root of the mean squared error.
pub fn rmse(y_true: ArrayView1<'_, f64>, y_pred: ArrayView1<'_, f64>) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    if y_true.is_empty() {
        return Err(ModelErr::InsufficientData {
            what: "scoring rows",
            got: 0,
            required: 1,
        });
    }

    let mse = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / y_true.len() as f64;

    Ok(mse.sqrt())
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn perfect_predictions_score_one() {
        let y = array![1.0, 2.0, 3.0];
        assert_eq!(r2_score(y.view(), y.view()).unwrap(), 1.0);
        assert_eq!(rmse(y.view(), y.view()).unwrap(), 0.0);
    }

    #[test]
    fn predicting_the_mean_scores_zero() {
        let y = array![1.0, 2.0, 3.0];
        let mean = array![2.0, 2.0, 2.0];
        assert!(r2_score(y.view(), mean.view()).unwrap().abs() < 1e-12);
    }

    #[test]
    fn known_score() {
        let y = array![3.0, -0.5, 2.0, 7.0];
        let p = array![2.5, 0.0, 2.0, 8.0];
        let score = r2_score(y.view(), p.view()).unwrap();
        assert!((score - 0.948_608_137_044_967_9).abs() < 1e-12);
    }

    #[test]
    fn constant_targets_stay_finite() {
        let y = array![4.0, 4.0];
        let p = array![4.0, 5.0];
        assert_eq!(r2_score(y.view(), p.view()).unwrap(), 0.0);
    }

    #[test]
    fn single_sample_is_insufficient() {
        let y = array![1.0];
        let err = r2_score(y.view(), y.view()).unwrap_err();
        assert_eq!(err.code(), "InsufficientData");
    }
}
