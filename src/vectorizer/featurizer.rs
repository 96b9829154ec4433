use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{error::{Error, Result}, vectorizer::{counts::FeatureCounts, feature::{FeatureExtractor, FeatureFn}}};

/// 1文書のトークン列に選択したextractorを適用する
///
/// extractorごとの寄与を合算し、feature名の昇順で返します。
/// 出力はどのextractorを使うかだけで決まり、並び順には依存しません。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FeatureFn>", into = "Vec<FeatureFn>")]
pub struct Featurizer {
    extractors: Vec<FeatureFn>,
}

impl Featurizer {
    /// # Errors
    /// extractorが空なら [`Error::EmptyFeatureSet`]
    pub fn new(extractors: Vec<FeatureFn>) -> Result<Self> {
        if extractors.is_empty() {
            return Err(Error::EmptyFeatureSet);
        }
        Ok(Self { extractors })
    }

    pub fn extractors(&self) -> &[FeatureFn] {
        &self.extractors
    }

    /// extractor名の一覧
    pub fn names(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|f| f.name()).collect()
    }

    /// 各extractorの結果を合算したFeatureCounts
    pub fn feature_counts(&self, tokens: &[String]) -> FeatureCounts {
        let mut counts = FeatureCounts::new();
        for extractor in &self.extractors {
            counts.merge(extractor.extract(tokens));
        }
        counts
    }

    /// Compute all features for one document.
    ///
    /// # Returns
    /// * `Vec<(String, u32)>` - (feature名, 値) をfeature名で昇順ソートしたもの
    pub fn featurize(&self, tokens: &[String]) -> Vec<(String, u32)> {
        self.feature_counts(tokens).into_sorted_vec()
    }
}

impl TryFrom<Vec<FeatureFn>> for Featurizer {
    type Error = Error;

    fn try_from(extractors: Vec<FeatureFn>) -> Result<Self> {
        Featurizer::new(extractors)
    }
}

impl From<Featurizer> for Vec<FeatureFn> {
    fn from(featurizer: Featurizer) -> Self {
        featurizer.extractors
    }
}

impl fmt::Display for Featurizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join(" "))
    }
}

/// 関数形式の `featurize`
///
/// # Errors
/// extractorのリストが空なら [`Error::EmptyFeatureSet`]
pub fn featurize<E>(tokens: &[String], extractors: &[E]) -> Result<Vec<(String, u32)>>
where
    E: FeatureExtractor,
{
    if extractors.is_empty() {
        return Err(Error::EmptyFeatureSet);
    }
    let mut counts = FeatureCounts::new();
    for extractor in extractors {
        counts.merge(extractor.extract(tokens));
    }
    Ok(counts.into_sorted_vec())
}
