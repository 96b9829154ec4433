use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    evaluate::grid::{GridSearch, DEFAULT_FOLDS},
    vectorizer::feature::{FeatureFn, Lexicon, LexiconFeatures, TokenFeatures, TokenPairFeatures, DEFAULT_PAIR_WINDOW},
};

/// grid searchの設定
///
/// JSONで部分的に指定でき、省略したキーは既定値になります。
/// ```json
/// { "min_freqs": [1, 2], "pair_window": 4 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub punct_values: Vec<bool>,
    pub min_freqs: Vec<usize>,
    pub folds: usize,
    pub pair_window: usize,
    pub lexicon: Lexicon,
    /// 係数・誤分類の表示件数
    pub top_n: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            punct_values: vec![true, false],
            min_freqs: vec![2, 5, 10],
            folds: DEFAULT_FOLDS,
            pair_window: DEFAULT_PAIR_WINDOW,
            lexicon: Lexicon::default(),
            top_n: 5,
        }
    }
}

impl SearchConfig {
    /// JSONファイルから読み込み、検証する
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: SearchConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// 計算の前に設定を検証する
    /// fold数の上限は文書数が分かってから [`GridSearch::run`] で検証する
    pub fn validate(&self) -> Result<()> {
        if self.folds < 2 {
            return Err(Error::TooFewFolds(self.folds));
        }
        self.grid().map(|_| ())
    }

    /// 設定した窓幅・辞書で作った3種のextractor
    pub fn feature_fns(&self) -> Result<Vec<FeatureFn>> {
        Ok(vec![
            FeatureFn::Token(TokenFeatures),
            FeatureFn::TokenPair(TokenPairFeatures::new(self.pair_window)?),
            FeatureFn::Lexicon(LexiconFeatures::new(self.lexicon.clone())),
        ])
    }

    pub fn grid(&self) -> Result<GridSearch> {
        Ok(GridSearch::new(self.punct_values.clone(), self.feature_fns()?, self.min_freqs.clone())?.with_folds(self.folds))
    }
}
