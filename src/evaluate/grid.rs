use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    classifier::Classifier,
    error::{Error, Result},
    evaluate::cross_validation::{cross_validation_accuracy, KFold},
    tokenizer::{tokenize, TokenCache},
    utils::subsets::{subset_count, NonEmptySubsets},
    vectorizer::{build_vocabulary, feature::FeatureFn, featurizer::Featurizer, matrix::FeatureMatrix, vectorize_with_vocabulary, vocabulary::Vocabulary},
};

/// grid searchの既定fold数
pub const DEFAULT_FOLDS: usize = 5;

/// 1つのモデル設定
/// (句読点の扱い, extractorの組, 最小文書頻度)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub keep_internal_punct: bool,
    pub featurizer: Featurizer,
    pub min_freq: usize,
}

impl Setting {
    /// この設定の句読点ポリシーでトークナイズする
    pub fn tokenize_all<T>(&self, docs: &[T]) -> Vec<Vec<String>>
    where
        T: AsRef<str> + Sync,
    {
        docs.par_iter()
            .map(|doc| tokenize(doc.as_ref(), self.keep_internal_punct))
            .collect()
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "features={} punct={} min_freq={}",
            self.featurizer, self.keep_internal_punct, self.min_freq
        )
    }
}

/// 設定とそのcross validation正解率
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub setting: Setting,
    pub accuracy: f64,
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} accuracy={:.6}", self.setting, self.accuracy)
    }
}

/// 正解率の降順、同点ならmin_freqの降順
/// それでも同点なら元の順序を保つ (安定ソート)
pub fn rank_results(results: &mut [SearchResult]) {
    results.sort_by(|a, b| {
        b.accuracy
            .total_cmp(&a.accuracy)
            .then_with(|| b.setting.min_freq.cmp(&a.setting.min_freq))
    });
}

/// 全設定の総当たり
///
/// 組み合わせるのは
/// - 句読点の扱い (`punct_values`)
/// - extractorの空でない全部分集合 (`feature_fns`)
/// - 最小文書頻度 (`min_freqs`)
///
/// で、結果の件数は `(2^|feature_fns| - 1) * |punct_values| * |min_freqs|` です。
#[derive(Debug, Clone)]
pub struct GridSearch {
    punct_values: Vec<bool>,
    feature_fns: Vec<FeatureFn>,
    min_freqs: Vec<usize>,
    folds: usize,
}

impl GridSearch {
    /// # Errors
    /// * 空の軸があれば [`Error::EmptyGrid`]
    /// * `min_freqs` に0があれば [`Error::InvalidMinFreq`]
    pub fn new(punct_values: Vec<bool>, feature_fns: Vec<FeatureFn>, min_freqs: Vec<usize>) -> Result<Self> {
        if punct_values.is_empty() {
            return Err(Error::EmptyGrid("punct_values"));
        }
        if feature_fns.is_empty() {
            return Err(Error::EmptyGrid("feature_fns"));
        }
        if min_freqs.is_empty() {
            return Err(Error::EmptyGrid("min_freqs"));
        }
        if min_freqs.contains(&0) {
            return Err(Error::InvalidMinFreq);
        }
        Ok(Self {
            punct_values,
            feature_fns,
            min_freqs,
            folds: DEFAULT_FOLDS,
        })
    }

    pub fn with_folds(mut self, folds: usize) -> Self {
        self.folds = folds;
        self
    }

    #[inline]
    pub fn folds(&self) -> usize {
        self.folds
    }

    /// 設定の総数
    pub fn len(&self) -> usize {
        subset_count(self.feature_fns.len()) * self.punct_values.len() * self.min_freqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 全設定を列挙順に返す
    /// extractorの部分集合 -> punct -> min_freq の順にネストする
    pub fn settings(&self) -> Result<Vec<Setting>> {
        let mut settings = Vec::with_capacity(self.len());
        for subset in NonEmptySubsets::new(&self.feature_fns) {
            let featurizer = Featurizer::new(subset.into_iter().cloned().collect())?;
            for &keep_internal_punct in &self.punct_values {
                for &min_freq in &self.min_freqs {
                    settings.push(Setting {
                        keep_internal_punct,
                        featurizer: featurizer.clone(),
                        min_freq,
                    });
                }
            }
        }
        Ok(settings)
    }

    /// 全設定を評価し、順位付けした結果を返す
    ///
    /// 文書は句読点ポリシーごとに1回ずつだけトークナイズされます。
    /// 設定ごとの評価は並列に行いますが、結果の順序はスケジューリングに依存しません。
    ///
    /// # Arguments
    /// * `docs` - 学習文書
    /// * `labels` - 0/1ラベル
    /// * `factory` - 未学習の分類器を作る関数 (fitごとに呼ばれる)
    ///
    /// # Errors
    /// 入力検証のエラーは計算前に返します。分類器のエラーはそのまま伝播し、部分的な結果は返しません。
    pub fn run<T, C, F>(&self, docs: &[T], labels: &[u8], factory: F) -> Result<Vec<SearchResult>>
    where
        T: AsRef<str> + Sync,
        C: Classifier,
        F: Fn() -> C + Sync,
    {
        if docs.len() != labels.len() {
            return Err(Error::LengthMismatch {
                what: "documents",
                left: docs.len(),
                right: labels.len(),
            });
        }
        if let Some(&bad) = labels.iter().find(|&&y| y > 1) {
            return Err(Error::InvalidLabel(bad));
        }
        KFold::new(self.folds).check(docs.len())?;

        let settings = self.settings()?;
        let cache = TokenCache::new(docs);
        info!(
            documents = docs.len(),
            settings = settings.len(),
            folds = self.folds,
            "grid search started"
        );

        let mut results = settings
            .into_par_iter()
            .map(|setting| -> Result<SearchResult> {
                let tokens = cache.get(setting.keep_internal_punct);
                let (matrix, vocab) = build_vocabulary(tokens, &setting.featurizer, setting.min_freq)?;
                let accuracy = cross_validation_accuracy(&factory, &matrix, labels, self.folds)?;
                debug!(%setting, vocabulary = vocab.len(), accuracy, "setting evaluated");
                Ok(SearchResult { setting, accuracy })
            })
            .collect::<Result<Vec<SearchResult>>>()?;

        rank_results(&mut results);
        if let (Some(best), Some(worst)) = (results.first(), results.last()) {
            info!(best = best.accuracy, worst = worst.accuracy, "grid search finished");
        }
        Ok(results)
    }
}

/// 関数形式のgrid search (5-fold)
///
/// # Returns
/// * `Vec<SearchResult>` - 正解率の降順、同点ならmin_freqの降順
pub fn eval_all_combinations<T, C, F>(
    docs: &[T],
    labels: &[u8],
    punct_values: &[bool],
    feature_fns: &[FeatureFn],
    min_freqs: &[usize],
    factory: F,
) -> Result<Vec<SearchResult>>
where
    T: AsRef<str> + Sync,
    C: Classifier,
    F: Fn() -> C + Sync,
{
    GridSearch::new(punct_values.to_vec(), feature_fns.to_vec(), min_freqs.to_vec())?.run(docs, labels, factory)
}

/// 最良設定で全学習データを使って分類器を学習する
/// cross validationは行わない
///
/// # Returns
/// * `(C, Vocabulary)` - 学習済みの分類器と語彙
pub fn fit_best_classifier<T, C>(docs: &[T], labels: &[u8], setting: &Setting, mut classifier: C) -> Result<(C, Vocabulary)>
where
    T: AsRef<str> + Sync,
    C: Classifier,
{
    if docs.len() != labels.len() {
        return Err(Error::LengthMismatch {
            what: "documents",
            left: docs.len(),
            right: labels.len(),
        });
    }
    let tokens = setting.tokenize_all(docs);
    let (matrix, vocab) = build_vocabulary(&tokens, &setting.featurizer, setting.min_freq)?;
    classifier.fit(&matrix, labels)?;
    info!(%setting, vocabulary = vocab.len(), "best classifier fitted");
    Ok((classifier, vocab))
}

/// テスト文書を学習時の語彙でベクトル化する
pub fn vectorize_test_corpus<T>(docs: &[T], setting: &Setting, vocab: &Vocabulary) -> FeatureMatrix
where
    T: AsRef<str> + Sync,
{
    let tokens = setting.tokenize_all(docs);
    vectorize_with_vocabulary(&tokens, &setting.featurizer, vocab)
}
