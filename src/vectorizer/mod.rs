pub mod counts;
pub mod feature;
pub mod featurizer;
pub mod matrix;
pub mod serde;
pub mod vocabulary;

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::debug;

use crate::{error::{Error, Result}, vectorizer::{featurizer::Featurizer, matrix::FeatureMatrix, vocabulary::Vocabulary}};

/// 1文書分の (feature名, 値) 、feature名で昇順
pub type DocumentFeatures = Vec<(String, u32)>;

/// 全文書をfeaturizeする
/// 文書ごとに独立なので並列に処理し、順序は入力と同じ
fn featurize_all(token_lists: &[Vec<String>], featurizer: &Featurizer) -> Vec<DocumentFeatures> {
    token_lists
        .par_iter()
        .map(|tokens| featurizer.featurize(tokens))
        .collect()
}

/// featureを行列の三つ組にする
/// vocabularyにない名前は捨てる
fn assemble(docs: &[DocumentFeatures], vocab: &Vocabulary) -> FeatureMatrix {
    let triplets = docs.iter().enumerate().flat_map(|(row, feats)| {
        feats
            .iter()
            .filter_map(move |(name, value)| vocab.index_of(name).map(|col| (row, col, *value)))
    });
    FeatureMatrix::from_triplets(docs.len(), vocab.len(), triplets)
}

/// Build a vocabulary from the corpus and vectorize it.
///
/// `min_freq` 未満の文書にしか出ないfeatureは語彙から除かれます。
/// 値が0のfeature (lexiconの0件など) もその文書に「出現した」とみなします。
/// 列indexはfeature名の昇順に0から振られます。
///
/// # Arguments
/// * `token_lists` - 文書ごとのトークン列
/// * `featurizer` - 使用するextractorの組
/// * `min_freq` - 最小文書頻度 (1以上)
///
/// # Returns
/// * `(FeatureMatrix, Vocabulary)` - 文書数 x 語彙数 の行列と語彙
///
/// # Errors
/// `min_freq == 0` のとき [`Error::InvalidMinFreq`]
pub fn build_vocabulary(
    token_lists: &[Vec<String>],
    featurizer: &Featurizer,
    min_freq: usize,
) -> Result<(FeatureMatrix, Vocabulary)> {
    if min_freq == 0 {
        return Err(Error::InvalidMinFreq);
    }
    let docs = featurize_all(token_lists, featurizer);

    // feature名ごとの出現文書数
    // 1文書内で名前は一意なので、出現のたびに1足せばよい
    let mut doc_freq: HashMap<&str, usize> = HashMap::new();
    for feats in &docs {
        for (name, _) in feats {
            *doc_freq.entry(name.as_str()).or_insert(0) += 1;
        }
    }
    let total = doc_freq.len();
    let vocab = Vocabulary::from_names(
        doc_freq
            .into_iter()
            .filter(|&(_, df)| df >= min_freq)
            .map(|(name, _)| name),
    );
    debug!(
        documents = token_lists.len(),
        features = total,
        retained = vocab.len(),
        min_freq,
        "vocabulary built"
    );

    let matrix = assemble(&docs, &vocab);
    Ok((matrix, vocab))
}

/// Vectorize documents with an existing vocabulary.
///
/// 語彙にないfeatureは黙って捨てます。語彙は変更しません。
/// 列数は常に `vocab.len()` です。
pub fn vectorize_with_vocabulary(
    token_lists: &[Vec<String>],
    featurizer: &Featurizer,
    vocab: &Vocabulary,
) -> FeatureMatrix {
    let docs = featurize_all(token_lists, featurizer);
    let matrix = assemble(&docs, vocab);
    debug!(
        documents = token_lists.len(),
        columns = vocab.len(),
        nnz = matrix.nnz(),
        "vectorized with existing vocabulary"
    );
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{tokenizer::tokenize, vectorizer::feature::{FeatureFn, TokenFeatures}};

    fn token_lists(docs: &[&str], keep_internal_punct: bool) -> Vec<Vec<String>> {
        docs.iter().map(|d| tokenize(d, keep_internal_punct)).collect()
    }

    fn unigram() -> Featurizer {
        Featurizer::new(vec![FeatureFn::Token(TokenFeatures)]).unwrap()
    }

    const REVIEWS: [&str; 6] = [
        "A great movie, I love it.",
        "Horrible horrible acting; the worst movie.",
        "Great cast and a good story.",
        "Boring plot, bad pacing, not good.",
        "It isn't great, but it isn't bad either.",
        "Wonderful! Simply the best movie this year.",
    ];

    #[test]
    fn builds_sorted_vocabulary_and_counts() {
        let tokens = token_lists(&["great movie", "horrible horrible movie"], false);
        let (matrix, vocab) = build_vocabulary(&tokens, &unigram(), 1).unwrap();
        assert_eq!(
            vocab.iter().collect::<Vec<_>>(),
            vec![(0, "token=great"), (1, "token=horrible"), (2, "token=movie")]
        );
        assert_eq!(matrix.shape(), (2, 3));
        assert_eq!(matrix.to_dense(), vec![vec![1, 0, 1], vec![0, 2, 1]]);
    }

    #[test]
    fn matches_reference_vectorization() {
        let tokens = token_lists(&["Isn't this movie great?", "Horrible, horrible movie"], false);
        let (matrix, vocab) = build_vocabulary(&tokens, &unigram(), 1).unwrap();
        assert_eq!(
            vocab.iter().map(|(_, n)| n).collect::<Vec<_>>(),
            vec!["token=great", "token=horrible", "token=isn", "token=movie", "token=t", "token=this"]
        );
        assert_eq!(
            matrix.to_dense(),
            vec![vec![1, 0, 1, 1, 1, 1], vec![0, 2, 0, 1, 0, 0]]
        );
    }

    #[test]
    fn reuse_mode_reproduces_build_mode() {
        let featurizer = Featurizer::new(FeatureFn::defaults()).unwrap();
        for punct in [true, false] {
            let tokens = token_lists(&REVIEWS, punct);
            for min_freq in 1..=3 {
                let (built, vocab) = build_vocabulary(&tokens, &featurizer, min_freq).unwrap();
                let reused = vectorize_with_vocabulary(&tokens, &featurizer, &vocab);
                assert_eq!(built, reused);
            }
        }
    }

    #[test]
    fn reuse_mode_drops_unseen_features() {
        let train = token_lists(&["great movie", "bad movie"], false);
        let (_, vocab) = build_vocabulary(&train, &unigram(), 1).unwrap();
        let test = token_lists(&["a great great film", "unseen words only"], false);
        let matrix = vectorize_with_vocabulary(&test, &unigram(), &vocab);
        assert_eq!(vocab.len(), 3);
        assert_eq!(matrix.shape(), (2, 3));
        assert_eq!(matrix.to_dense(), vec![vec![0, 2, 0], vec![0, 0, 0]]);
    }

    #[test]
    fn min_freq_filters_by_document_frequency() {
        let featurizer = Featurizer::new(FeatureFn::defaults()).unwrap();
        let tokens = token_lists(&REVIEWS, false);
        let mut previous = usize::MAX;
        for min_freq in 1..=REVIEWS.len() + 1 {
            let (matrix, vocab) = build_vocabulary(&tokens, &featurizer, min_freq).unwrap();
            assert!(vocab.len() <= previous, "vocabulary grew at min_freq={min_freq}");
            previous = vocab.len();
            assert_eq!(matrix.rows(), REVIEWS.len());
            for (col, name) in vocab.iter() {
                let df = tokens
                    .iter()
                    .filter(|t| featurizer.featurize(t).iter().any(|(n, _)| n == name))
                    .count();
                assert!(df >= min_freq, "{name} (col {col}) appears in {df} < {min_freq} docs");
            }
        }
    }

    #[test]
    fn lexicon_zero_counts_count_as_present() {
        // lexicon featureは全文書に出るので、min_freq=文書数でも残る
        let featurizer = Featurizer::new(FeatureFn::defaults()).unwrap();
        let tokens = token_lists(&REVIEWS, false);
        let (matrix, vocab) = build_vocabulary(&tokens, &featurizer, REVIEWS.len()).unwrap();
        assert!(vocab.contains("neg_words"));
        assert!(vocab.contains("pos_words"));
        let neg = vocab.index_of("neg_words").unwrap();
        // 最初のレビューにはneg語がないので値は保持されない
        assert_eq!(matrix.get(0, neg), 0);
        assert!(!matrix.row(0).iter().any(|&(c, _)| c == neg));
    }

    #[test]
    fn empty_documents_yield_zero_rows() {
        let tokens = token_lists(&["great", "", "?!"], false);
        let (matrix, vocab) = build_vocabulary(&tokens, &unigram(), 1).unwrap();
        assert_eq!(vocab.len(), 1);
        assert_eq!(matrix.shape(), (3, 1));
        assert_eq!(matrix.to_dense(), vec![vec![1], vec![0], vec![0]]);
    }

    #[test]
    fn zero_min_freq_is_rejected() {
        let tokens = token_lists(&["great"], false);
        assert!(matches!(build_vocabulary(&tokens, &unigram(), 0), Err(Error::InvalidMinFreq)));
    }
}
