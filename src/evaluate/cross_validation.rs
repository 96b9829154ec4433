use rayon::prelude::*;
use tracing::debug;

use crate::{classifier::Classifier, error::{Error, Result}, vectorizer::matrix::FeatureMatrix};

/// 連続・非シャッフルのK分割
///
/// 行 `0..n` を順番にk個の塊へ分け、先頭の `n % k` 個の塊に1行ずつ余りを配ります。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KFold {
    n_splits: usize,
}

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits }
    }

    #[inline]
    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// 分割数がサンプル数に対して有効か
    /// 両側 (学習・評価) が必ず1行以上になる必要がある
    pub fn check(&self, n_samples: usize) -> Result<()> {
        if self.n_splits < 2 || self.n_splits > n_samples {
            return Err(Error::InvalidFoldCount {
                folds: self.n_splits,
                samples: n_samples,
            });
        }
        Ok(())
    }

    /// (学習行, 評価行) の組をfold順に返す
    ///
    /// # Errors
    /// `n_splits < 2` または `n_splits > n_samples` のとき [`Error::InvalidFoldCount`]
    pub fn split(&self, n_samples: usize) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
        self.check(n_samples)?;
        let base = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;

        let mut folds = Vec::with_capacity(self.n_splits);
        let mut start = 0;
        for fold in 0..self.n_splits {
            let size = base + usize::from(fold < remainder);
            let end = start + size;
            let test: Vec<usize> = (start..end).collect();
            let train: Vec<usize> = (0..start).chain(end..n_samples).collect();
            folds.push((train, test));
            start = end;
        }
        Ok(folds)
    }
}

/// 正解率
/// 空なら0.0
pub fn accuracy_score(truth: &[u8], predicted: &[u8]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
    correct as f64 / truth.len() as f64
}

/// k-fold cross validationの平均正解率
///
/// foldごとに `factory` から新しい分類器を作り、残りの行で学習して
/// foldの行を予測します。foldは並列に評価しますが、平均はfold順に足します。
///
/// # Arguments
/// * `factory` - 未学習の分類器を作る関数
/// * `x` - 文書 x feature 行列
/// * `labels` - 行と同じ長さの0/1ラベル
/// * `k` - fold数
///
/// # Errors
/// * fold数が不正なら [`Error::InvalidFoldCount`]
/// * 行数とラベル数が違えば [`Error::LengthMismatch`]
/// * 分類器のエラーはそのまま [`Error::Classifier`]
pub fn cross_validation_accuracy<C, F>(factory: &F, x: &FeatureMatrix, labels: &[u8], k: usize) -> Result<f64>
where
    C: Classifier,
    F: Fn() -> C + Sync,
{
    if x.rows() != labels.len() {
        return Err(Error::LengthMismatch {
            what: "matrix rows",
            left: x.rows(),
            right: labels.len(),
        });
    }
    let folds = KFold::new(k).split(x.rows())?;

    let accuracies = folds
        .par_iter()
        .enumerate()
        .map(|(fold, (train, test))| -> Result<f64> {
            let mut clf = factory();
            let train_labels: Vec<u8> = train.iter().map(|&i| labels[i]).collect();
            clf.fit(&x.select_rows(train), &train_labels)?;

            let predicted = clf.predict(&x.select_rows(test))?;
            let truth: Vec<u8> = test.iter().map(|&i| labels[i]).collect();
            let accuracy = accuracy_score(&truth, &predicted);
            debug!(fold, train = train.len(), test = test.len(), accuracy, "fold evaluated");
            Ok(accuracy)
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(accuracies.iter().sum::<f64>() / accuracies.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{classifier::LogisticRegression, error::ClassifierError};

    /// 学習データの多数派ラベルを常に返す分類器
    #[derive(Default)]
    struct Majority {
        label: Option<u8>,
    }

    impl Classifier for Majority {
        fn fit(&mut self, x: &FeatureMatrix, labels: &[u8]) -> std::result::Result<(), ClassifierError> {
            if x.rows() != labels.len() {
                return Err(ClassifierError::LabelMismatch { rows: x.rows(), labels: labels.len() });
            }
            let ones = labels.iter().filter(|&&y| y == 1).count();
            self.label = Some(u8::from(ones * 2 > labels.len()));
            Ok(())
        }

        fn predict(&self, x: &FeatureMatrix) -> std::result::Result<Vec<u8>, ClassifierError> {
            let label = self.label.ok_or(ClassifierError::NotFitted)?;
            Ok(vec![label; x.rows()])
        }

        fn predict_proba(&self, x: &FeatureMatrix) -> std::result::Result<Vec<[f64; 2]>, ClassifierError> {
            Ok(self
                .predict(x)?
                .into_iter()
                .map(|y| if y == 1 { [0.0, 1.0] } else { [1.0, 0.0] })
                .collect())
        }

        fn coefficients(&self) -> Option<&[f64]> {
            None
        }
    }

    #[test]
    fn contiguous_folds_with_leading_remainder() {
        let folds = KFold::new(3).split(7).unwrap();
        let tests: Vec<Vec<usize>> = folds.iter().map(|(_, t)| t.clone()).collect();
        assert_eq!(tests, vec![vec![0, 1, 2], vec![3, 4], vec![5, 6]]);
        assert_eq!(folds[1].0, vec![0, 1, 2, 5, 6]);
        for (train, test) in &folds {
            assert_eq!(train.len() + test.len(), 7);
        }
    }

    #[test]
    fn invalid_fold_counts() {
        for k in [0, 1, 8] {
            assert!(matches!(
                KFold::new(k).split(7),
                Err(Error::InvalidFoldCount { folds, samples: 7 }) if folds == k
            ));
        }
        assert_eq!(KFold::new(7).split(7).unwrap().len(), 7);
    }

    #[test]
    fn accuracy_is_fraction_correct() {
        assert_eq!(accuracy_score(&[1, 0, 1, 1], &[1, 1, 1, 0]), 0.5);
        assert_eq!(accuracy_score(&[], &[]), 0.0);
    }

    #[test]
    fn majority_baseline_accuracy() {
        // 各foldの学習データは1が多数派
        let labels = [1, 1, 1, 0, 1, 1];
        let x: FeatureMatrix = FeatureMatrix::zeros(6, 1);
        let acc = cross_validation_accuracy(&Majority::default, &x, &labels, 3).unwrap();
        // fold: [1,1] -> 1.0, [1,0] -> 0.5, [1,1] -> 1.0
        assert!((acc - 2.5 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_label_mismatch() {
        let x: FeatureMatrix = FeatureMatrix::zeros(4, 1);
        assert!(matches!(
            cross_validation_accuracy(&Majority::default, &x, &[0, 1], 2),
            Err(Error::LengthMismatch { left: 4, right: 2, .. })
        ));
    }

    #[test]
    fn classifier_errors_propagate() {
        // どのfoldでも学習データが1クラスだけになる
        let labels = [1, 1, 0, 0];
        let x: FeatureMatrix = FeatureMatrix::from_triplets(4, 1, vec![(0, 0, 1), (1, 0, 1)]);
        let result = cross_validation_accuracy(&LogisticRegression::new, &x, &labels, 2);
        assert!(matches!(result, Err(Error::Classifier(ClassifierError::SingleClass(_)))));
    }

    #[test]
    fn learns_separable_folds() {
        let labels: Vec<u8> = (0..10).map(|i| (i % 2) as u8).collect();
        let triplets: Vec<(usize, usize, u32)> = labels.iter().enumerate().map(|(i, &y)| (i, usize::from(y), 2)).collect();
        let x = FeatureMatrix::from_triplets(10, 2, triplets);
        let acc = cross_validation_accuracy(&LogisticRegression::new, &x, &labels, 5).unwrap();
        assert_eq!(acc, 1.0);
    }
}
