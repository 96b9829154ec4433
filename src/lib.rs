/// This crate searches for the best feature configuration of a binary text classifier.
pub mod classifier;
pub mod config;
pub mod corpus;
pub mod error;
pub mod evaluate;
pub mod tokenizer;
pub mod utils;
pub mod vectorizer;

/// Tokenizer
/// Lower-cases a document and splits it into tokens.
/// `keep_internal_punct` decides whether punctuation inside a word survives
/// (`"isn't"`) or splits the word (`"isn"`, `"t"`).
///
/// `TokenCache` holds both tokenizations of a corpus so a grid search tokenizes
/// every document exactly twice.
pub use tokenizer::{tokenize, TokenCache};

/// Feature Counts structure
/// Per-document map from feature name to count.
/// Extractors return it by value and the featurizer merges them by summation.
pub use vectorizer::counts::FeatureCounts;

/// Feature extractors
/// - `TokenFeatures`: `token=<t>` unigram counts
/// - `TokenPairFeatures`: `token_pair=<a>__<b>` co-occurrence in a sliding window
/// - `LexiconFeatures`: `neg_words` / `pos_words` counts against an injected `Lexicon`
///
/// `FeatureFn` is the closed set of extractors the grid search combines.
pub use vectorizer::feature::{FeatureExtractor, FeatureFn, Lexicon, LexiconFeatures, TokenFeatures, TokenPairFeatures};

/// Featurizer
/// A non-empty set of extractors applied to one token sequence.
/// Output is sorted by feature name and independent of extractor order.
pub use vectorizer::featurizer::{featurize, Featurizer};

/// Vocabulary and Feature Matrix
/// `build_vocabulary` learns a vocabulary (filtered by document frequency) and
/// vectorizes the corpus with it; `vectorize_with_vocabulary` reuses an existing
/// vocabulary and silently drops unseen features.
///
/// `FeatureMatrix` is a CSR sparse matrix (sprs) with one row per document and one
/// column per vocabulary entry.
pub use vectorizer::{build_vocabulary, matrix::FeatureMatrix, vectorize_with_vocabulary, vocabulary::Vocabulary};

/// Fitted model artifact
/// Best setting, vocabulary and coefficients, stored as CBOR.
pub use vectorizer::serde::FittedModel;

/// Classifier capability trait and the reference logistic regression.
pub use classifier::{Classifier, LogisticRegression};

/// Cross validation
/// Contiguous k-fold cross validation with a fresh classifier per fold.
pub use evaluate::cross_validation::{accuracy_score, cross_validation_accuracy, KFold};

/// Grid search
/// Evaluates every (punctuation policy, non-empty extractor subset, min_freq)
/// combination and ranks them by accuracy, then by min_freq.
pub use evaluate::grid::{eval_all_combinations, fit_best_classifier, vectorize_test_corpus, GridSearch, SearchResult, Setting};

/// Reporting helpers over search results and a fitted classifier.
pub use evaluate::report::{mean_accuracy_per_setting, sorted_accuracies, top_coefficients, top_misclassified, Misclassified};

pub use config::SearchConfig;
pub use corpus::Corpus;
pub use error::{ClassifierError, Error, Result};
