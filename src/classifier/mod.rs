pub mod logistic;

use crate::{error::ClassifierError, vectorizer::matrix::FeatureMatrix};

/// 二値分類器のcapability trait
///
/// grid searchやcross validationはこのtraitだけを通して分類器を使います。
/// 中身の学習アルゴリズムには依存しません。
pub trait Classifier {
    /// 学習する
    /// `labels` は0か1で、行列の行と同じ長さ
    fn fit(&mut self, x: &FeatureMatrix, labels: &[u8]) -> Result<(), ClassifierError>;

    /// 各行のラベルを予測する
    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<u8>, ClassifierError>;

    /// 各行の `[P(0), P(1)]`
    fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<[f64; 2]>, ClassifierError>;

    /// 正クラス方向の係数 (vocabularyの列index順)
    /// 未学習なら `None`
    fn coefficients(&self) -> Option<&[f64]>;
}

pub use logistic::LogisticRegression;
