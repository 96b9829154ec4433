use thiserror::Error;

/// Errors raised by a classifier behind the [`crate::Classifier`] trait.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClassifierError {
    /// 学習データに片方のクラスしかない
    #[error("training labels contain a single class ({0}); at least 2 classes are required")]
    SingleClass(u8),
    #[error("label {0} is not a binary label (expected 0 or 1)")]
    InvalidLabel(u8),
    #[error("classifier is not fitted yet")]
    NotFitted,
    #[error("matrix has {actual} columns but the classifier was fitted on {expected}")]
    FeatureMismatch { expected: usize, actual: usize },
    #[error("matrix has {rows} rows but {labels} labels were given")]
    LabelMismatch { rows: usize, labels: usize },
    #[error("cannot fit on an empty matrix")]
    Empty,
}

/// crate全体のエラー
#[derive(Debug, Error)]
pub enum Error {
    #[error("feature function list must not be empty")]
    EmptyFeatureSet,
    #[error("min_freq must be at least 1")]
    InvalidMinFreq,
    #[error("token pair window must be at least 2, got {0}")]
    InvalidWindow(usize),
    #[error("fold count must be at least 2, got {0}")]
    TooFewFolds(usize),
    #[error("invalid fold count {folds} for {samples} samples")]
    InvalidFoldCount { folds: usize, samples: usize },
    #[error("search grid axis `{0}` is empty")]
    EmptyGrid(&'static str),
    #[error("{left} {what} but {right} labels")]
    LengthMismatch {
        what: &'static str,
        left: usize,
        right: usize,
    },
    #[error("label {0} is not a binary label (expected 0 or 1)")]
    InvalidLabel(u8),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid search config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("model artifact error: {0}")]
    Artifact(#[from] serde_cbor::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
