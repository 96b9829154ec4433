use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{classifier::Classifier, error::ClassifierError, vectorizer::matrix::FeatureMatrix};

/// L2正則化付きの二値ロジスティック回帰
///
/// 目的関数は `mean(logloss) + ||w||^2 / (2 * C * n)` で、
/// CSRの行を使ったfull-batch勾配降下で最小化します。
/// ステップ幅は `learning_rate / L` (Lはヘッセ行列の上界) なので、
/// カウント値が大きくても発散しません。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    coefficients: Option<Vec<f64>>,
    intercept: f64,
    /// 正則化の逆数
    c: f64,
    learning_rate: f64,
    max_iter: usize,
    tol: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            c: 1.0,
            learning_rate: 1.0,
            max_iter: 300,
            tol: 1e-5,
        }
    }

    /// 学習済みの係数から復元する
    pub fn from_parts(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients: Some(coefficients),
            intercept,
            ..Self::new()
        }
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    #[inline]
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    #[inline]
    fn sigmoid(z: f64) -> f64 {
        1.0 / (1.0 + (-z).exp())
    }

    #[inline]
    fn dot(weights: &[f64], row: &[(usize, f64)]) -> f64 {
        row.iter().map(|&(col, v)| weights[col] * v).sum()
    }

    fn float_rows(x: &FeatureMatrix) -> Vec<Vec<(usize, f64)>> {
        x.row_iter()
            .map(|row| row.into_iter().map(|(col, v)| (col, f64::from(v))).collect())
            .collect()
    }

    fn fitted(&self, x: &FeatureMatrix) -> Result<&[f64], ClassifierError> {
        let weights = self.coefficients.as_deref().ok_or(ClassifierError::NotFitted)?;
        if weights.len() != x.cols() {
            return Err(ClassifierError::FeatureMismatch {
                expected: weights.len(),
                actual: x.cols(),
            });
        }
        Ok(weights)
    }

    /// 決定関数 `w・x + b`
    pub fn decision_function(&self, x: &FeatureMatrix) -> Result<Vec<f64>, ClassifierError> {
        let weights = self.fitted(x)?;
        Ok(x.row_iter()
            .map(|row| {
                let z: f64 = row.iter().map(|&(col, v)| weights[col] * f64::from(v)).sum();
                z + self.intercept
            })
            .collect())
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &FeatureMatrix, labels: &[u8]) -> Result<(), ClassifierError> {
        let (n_samples, n_features) = x.shape();
        if n_samples == 0 {
            return Err(ClassifierError::Empty);
        }
        if n_samples != labels.len() {
            return Err(ClassifierError::LabelMismatch {
                rows: n_samples,
                labels: labels.len(),
            });
        }
        if let Some(&bad) = labels.iter().find(|&&y| y > 1) {
            return Err(ClassifierError::InvalidLabel(bad));
        }
        if labels.iter().all(|&y| y == labels[0]) {
            return Err(ClassifierError::SingleClass(labels[0]));
        }

        let rows = Self::float_rows(x);
        let n = n_samples as f64;
        let alpha = 1.0 / (self.c * n);
        // ヘッセ行列の上界: 0.25 * mean(||x_i||^2 + 1) + alpha (+1 は切片の分)
        let mean_sq_norm = rows
            .iter()
            .map(|row| 1.0 + row.iter().map(|&(_, v)| v * v).sum::<f64>())
            .sum::<f64>()
            / n;
        let step = self.learning_rate / (0.25 * mean_sq_norm + alpha);

        let mut weights = vec![0.0; n_features];
        let mut intercept = 0.0;
        let mut iterations = 0;
        for _ in 0..self.max_iter {
            iterations += 1;
            let mut grad_w: Vec<f64> = weights.iter().map(|w| alpha * w).collect();
            let mut grad_b = 0.0;
            for (row, &y) in rows.iter().zip(labels) {
                let err = Self::sigmoid(Self::dot(&weights, row) + intercept) - f64::from(y);
                grad_b += err / n;
                for &(col, v) in row {
                    grad_w[col] += err * v / n;
                }
            }

            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= step * g;
            }
            intercept -= step * grad_b;

            let max_grad = grad_w.iter().fold(grad_b.abs(), |acc, g| acc.max(g.abs()));
            if max_grad < self.tol {
                break;
            }
        }
        debug!(n_samples, n_features, iterations, "logistic regression fitted");

        self.coefficients = Some(weights);
        self.intercept = intercept;
        Ok(())
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<u8>, ClassifierError> {
        Ok(self
            .decision_function(x)?
            .into_iter()
            .map(|z| u8::from(z > 0.0))
            .collect())
    }

    fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<[f64; 2]>, ClassifierError> {
        Ok(self
            .decision_function(x)?
            .into_iter()
            .map(|z| {
                let p = Self::sigmoid(z);
                [1.0 - p, p]
            })
            .collect())
    }

    fn coefficients(&self) -> Option<&[f64]> {
        self.coefficients.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> (FeatureMatrix, Vec<u8>) {
        // 列0は正例、列1は負例にだけ出る
        let x = FeatureMatrix::from_triplets(
            6,
            2,
            vec![(0, 0, 1), (1, 0, 2), (2, 0, 1), (3, 1, 1), (4, 1, 3), (5, 1, 1)],
        );
        (x, vec![1, 1, 1, 0, 0, 0])
    }

    #[test]
    fn separates_toy_data() {
        let (x, y) = toy();
        let mut clf = LogisticRegression::new().with_max_iter(1000);
        clf.fit(&x, &y).unwrap();
        assert_eq!(clf.predict(&x).unwrap(), y);
        let coef = clf.coefficients().unwrap();
        assert!(coef[0] > 0.0);
        assert!(coef[1] < 0.0);
        for (p, &label) in clf.predict_proba(&x).unwrap().iter().zip(&y) {
            assert!((p[0] + p[1] - 1.0).abs() < 1e-12);
            assert!(p[usize::from(label)] > 0.5);
        }
    }

    #[test]
    fn single_class_is_an_error() {
        let (x, _) = toy();
        let mut clf = LogisticRegression::new();
        assert_eq!(clf.fit(&x, &[1; 6]), Err(ClassifierError::SingleClass(1)));
    }

    #[test]
    fn rejects_bad_inputs() {
        let (x, y) = toy();
        let mut clf = LogisticRegression::new();
        assert_eq!(clf.predict(&x), Err(ClassifierError::NotFitted));
        assert_eq!(
            clf.fit(&x, &y[..3]),
            Err(ClassifierError::LabelMismatch { rows: 6, labels: 3 })
        );
        assert_eq!(clf.fit(&x, &[0, 1, 2, 0, 1, 0]), Err(ClassifierError::InvalidLabel(2)));
        clf.fit(&x, &y).unwrap();
        let wide: FeatureMatrix = FeatureMatrix::zeros(1, 3);
        assert_eq!(
            clf.predict(&wide),
            Err(ClassifierError::FeatureMismatch { expected: 2, actual: 3 })
        );
    }

    #[test]
    fn zero_vector_predicts_by_intercept() {
        let clf = LogisticRegression::from_parts(vec![0.5, -0.5], -0.1);
        let x = FeatureMatrix::zeros(1, 2);
        assert_eq!(clf.predict(&x).unwrap(), vec![0]);
        let clf = LogisticRegression::from_parts(vec![0.5, -0.5], 0.1);
        assert_eq!(clf.predict(&x).unwrap(), vec![1]);
    }
}
