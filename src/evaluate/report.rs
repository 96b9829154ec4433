use indexmap::IndexMap;

use crate::{evaluate::grid::SearchResult, vectorizer::vocabulary::Vocabulary};

/// 誤分類された1文書
#[derive(Debug, Clone, PartialEq)]
pub struct Misclassified {
    /// 入力の行index
    pub index: usize,
    pub truth: u8,
    pub predicted: u8,
    /// 予測したクラスの確率
    pub probability: f64,
}

/// 正解率を昇順に並べたもの
pub fn sorted_accuracies(results: &[SearchResult]) -> Vec<f64> {
    let mut accuracies: Vec<f64> = results.iter().map(|r| r.accuracy).collect();
    accuracies.sort_by(f64::total_cmp);
    accuracies
}

#[derive(Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, v: f64) {
        self.sum += v;
        self.count += 1;
    }

    fn value(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// 設定値ごとの平均正解率
///
/// extractorの組、min_freq、punctのそれぞれについて、その値を持つ全結果の平均を取ります。
/// ラベルは `features: <names>` `min_freq=<n>` `punct=<bool>` の形式です。
///
/// # Returns
/// * `Vec<(f64, String)>` - (平均正解率, ラベル) を正解率の降順で
pub fn mean_accuracy_per_setting(results: &[SearchResult]) -> Vec<(f64, String)> {
    let mut features: IndexMap<String, Mean> = IndexMap::new();
    let mut min_freqs: IndexMap<usize, Mean> = IndexMap::new();
    let mut puncts: IndexMap<bool, Mean> = IndexMap::new();
    for result in results {
        let setting = &result.setting;
        features.entry(setting.featurizer.to_string()).or_default().add(result.accuracy);
        min_freqs.entry(setting.min_freq).or_default().add(result.accuracy);
        puncts.entry(setting.keep_internal_punct).or_default().add(result.accuracy);
    }

    let mut means: Vec<(f64, String)> = features
        .iter()
        .map(|(names, m)| (m.value(), format!("features: {names}")))
        .chain(min_freqs.iter().map(|(freq, m)| (m.value(), format!("min_freq={freq}"))))
        .chain(puncts.iter().map(|(punct, m)| (m.value(), format!("punct={punct}"))))
        .collect();
    means.sort_by(|a, b| b.0.total_cmp(&a.0));
    means
}

/// クラスごとの係数上位n件
///
/// * `label == 1` - 係数の大きい順
/// * `label == 0` - 係数の小さい順に選び、絶対値で返す
///
/// どちらも返す値の降順に並べます。
///
/// # Arguments
/// * `coefficients` - 正クラス方向の係数 (列index順)
/// * `vocab` - 学習時の語彙
/// * `label` - 0 または 1
/// * `n` - 件数
pub fn top_coefficients(coefficients: &[f64], vocab: &Vocabulary, label: u8, n: usize) -> Vec<(String, f64)> {
    let mut columns: Vec<usize> = (0..coefficients.len().min(vocab.len())).collect();
    if label == 1 {
        columns.sort_by(|&a, &b| coefficients[b].total_cmp(&coefficients[a]));
    } else {
        columns.sort_by(|&a, &b| coefficients[a].total_cmp(&coefficients[b]));
    }
    columns.truncate(n);

    let mut top: Vec<(String, f64)> = columns
        .into_iter()
        .filter_map(|col| {
            let coef = coefficients[col];
            let value = if label == 1 { coef } else { coef.abs() };
            vocab.name(col).map(|name| (name.to_string(), value))
        })
        .collect();
    top.sort_by(|a, b| b.1.total_cmp(&a.1));
    top
}

/// 最も大きく外した誤分類n件
///
/// 誤分類された行を、予測したクラスの確率の降順に並べます。
pub fn top_misclassified(labels: &[u8], predictions: &[u8], probabilities: &[[f64; 2]], n: usize) -> Vec<Misclassified> {
    let mut missed: Vec<Misclassified> = labels
        .iter()
        .zip(predictions)
        .zip(probabilities)
        .enumerate()
        .filter(|(_, ((truth, predicted), _))| truth != predicted)
        .map(|(index, ((&truth, &predicted), proba))| Misclassified {
            index,
            truth,
            predicted,
            probability: proba[usize::from(predicted.min(1))],
        })
        .collect();
    missed.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    missed.truncate(n);
    missed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        evaluate::grid::Setting,
        vectorizer::{feature::{FeatureFn, LexiconFeatures, TokenFeatures}, featurizer::Featurizer},
    };

    fn result(fns: Vec<FeatureFn>, punct: bool, min_freq: usize, accuracy: f64) -> SearchResult {
        SearchResult {
            setting: Setting {
                keep_internal_punct: punct,
                featurizer: Featurizer::new(fns).unwrap(),
                min_freq,
            },
            accuracy,
        }
    }

    #[test]
    fn means_are_grouped_per_value() {
        let token = || vec![FeatureFn::Token(TokenFeatures)];
        let lexicon = || vec![FeatureFn::Lexicon(LexiconFeatures::default())];
        let results = vec![
            result(token(), true, 2, 0.8),
            result(token(), false, 5, 0.6),
            result(lexicon(), true, 5, 0.7),
            result(lexicon(), false, 2, 0.5),
        ];
        let means = mean_accuracy_per_setting(&results);
        assert_eq!(means.len(), 2 + 2 + 2);
        let get = |label: &str| means.iter().find(|(_, l)| l == label).map(|(m, _)| *m).unwrap();
        assert!((get("features: token_features") - 0.7).abs() < 1e-12);
        assert!((get("features: lexicon_features") - 0.6).abs() < 1e-12);
        assert!((get("min_freq=2") - 0.65).abs() < 1e-12);
        assert!((get("min_freq=5") - 0.65).abs() < 1e-12);
        assert!((get("punct=true") - 0.75).abs() < 1e-12);
        assert!((get("punct=false") - 0.55).abs() < 1e-12);
        assert!(means.windows(2).all(|w| w[0].0 >= w[1].0));
        assert_eq!(means[0].1, "punct=true");
    }

    #[test]
    fn top_coefficients_per_class() {
        let vocab = Vocabulary::from_names(["token=bad", "token=good", "token=great", "token=movie", "token=worst"]);
        let coef = [-1.5, 1.0, 2.0, 0.1, -2.5];
        assert_eq!(
            top_coefficients(&coef, &vocab, 1, 2),
            vec![("token=great".to_string(), 2.0), ("token=good".to_string(), 1.0)]
        );
        assert_eq!(
            top_coefficients(&coef, &vocab, 0, 2),
            vec![("token=worst".to_string(), 2.5), ("token=bad".to_string(), 1.5)]
        );
        assert_eq!(top_coefficients(&coef, &vocab, 1, 10).len(), 5);
    }

    #[test]
    fn misclassified_sorted_by_wrong_class_probability() {
        let labels = [1, 0, 1, 0, 1];
        let predictions = [0, 1, 1, 1, 0];
        let proba = [[0.6, 0.4], [0.1, 0.9], [0.2, 0.8], [0.3, 0.7], [0.95, 0.05]];
        let missed = top_misclassified(&labels, &predictions, &proba, 3);
        let order: Vec<(usize, f64)> = missed.iter().map(|m| (m.index, m.probability)).collect();
        assert_eq!(order, vec![(4, 0.95), (1, 0.9), (3, 0.7)]);
        assert_eq!((missed[0].truth, missed[0].predicted), (1, 0));
    }

    #[test]
    fn sorted_accuracies_ascending() {
        let token = || vec![FeatureFn::Token(TokenFeatures)];
        let results = vec![result(token(), true, 2, 0.9), result(token(), false, 2, 0.4), result(token(), true, 5, 0.7)];
        assert_eq!(sorted_accuracies(&results), vec![0.4, 0.7, 0.9]);
    }
}
