use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::{error::{Error, Result}, vectorizer::counts::FeatureCounts};

pub const TOKEN_PREFIX: &str = "token=";
pub const TOKEN_PAIR_PREFIX: &str = "token_pair=";
pub const NEG_WORDS: &str = "neg_words";
pub const POS_WORDS: &str = "pos_words";
pub const DEFAULT_PAIR_WINDOW: usize = 3;

const DEFAULT_NEG_WORDS: [&str; 5] = ["bad", "hate", "horrible", "worst", "boring"];
const DEFAULT_POS_WORDS: [&str; 7] = ["awesome", "amazing", "best", "good", "great", "love", "wonderful"];

/// Feature extractor trait
/// 1文書のトークン列から名前付きカウントを作る
///
/// extractorは共有のaccumulatorを書き換えず、自分の寄与分を値で返します。
/// 合算は [`crate::Featurizer`] が行います。
pub trait FeatureExtractor {
    /// extractorの名前 (結果表示用)
    fn name(&self) -> &'static str;
    fn extract(&self, tokens: &[String]) -> FeatureCounts;
}

/// `token=<token>` を出現回数で出す
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenFeatures;

impl FeatureExtractor for TokenFeatures {
    fn name(&self) -> &'static str {
        "token_features"
    }

    fn extract(&self, tokens: &[String]) -> FeatureCounts {
        let mut counts = FeatureCounts::new();
        for token in tokens {
            counts.add_owned(format!("{TOKEN_PREFIX}{token}"), 1);
        }
        counts
    }
}

/// 幅 `window` の窓内で共起するトークンの組
///
/// 窓 `[a, b, c]` からは `a__b`, `a__c`, `b__c` が出ます。
/// 名前の並びは文書内の出現順です (`b__a` にはならない)。
/// 窓は全ての開始位置から取りますが、はみ出す窓は取りません。
/// 列が `window` より短いときは組を出しません。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PairWindow")]
pub struct TokenPairFeatures {
    window: usize,
}

#[derive(Deserialize)]
struct PairWindow {
    window: usize,
}

impl TryFrom<PairWindow> for TokenPairFeatures {
    type Error = Error;

    fn try_from(raw: PairWindow) -> Result<Self> {
        TokenPairFeatures::new(raw.window)
    }
}

impl TokenPairFeatures {
    /// # Errors
    /// `window < 2` のとき [`Error::InvalidWindow`]
    pub fn new(window: usize) -> Result<Self> {
        if window < 2 {
            return Err(Error::InvalidWindow(window));
        }
        Ok(Self { window })
    }

    #[inline]
    pub fn window(&self) -> usize {
        self.window
    }
}

impl Default for TokenPairFeatures {
    fn default() -> Self {
        Self { window: DEFAULT_PAIR_WINDOW }
    }
}

impl FeatureExtractor for TokenPairFeatures {
    fn name(&self) -> &'static str {
        "token_pair_features"
    }

    fn extract(&self, tokens: &[String]) -> FeatureCounts {
        let mut counts = FeatureCounts::new();
        // windowは2以上なので、len < window なら窓は1つも取れない
        for window in tokens.windows(self.window) {
            for (i, left) in window.iter().enumerate() {
                for right in &window[i + 1..] {
                    counts.add_owned(format!("{TOKEN_PAIR_PREFIX}{left}__{right}"), 1);
                }
            }
        }
        counts
    }
}

/// 感情語の辞書
/// 大文字小文字は区別しない (保持時に小文字化する)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LexiconWords")]
pub struct Lexicon {
    negative: IndexSet<String>,
    positive: IndexSet<String>,
}

#[derive(Deserialize)]
struct LexiconWords {
    negative: Vec<String>,
    positive: Vec<String>,
}

impl From<LexiconWords> for Lexicon {
    fn from(words: LexiconWords) -> Self {
        Lexicon::new(words.negative, words.positive)
    }
}

impl Lexicon {
    pub fn new<N, P, S>(negative: N, positive: P) -> Self
    where
        N: IntoIterator<Item = S>,
        P: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            negative: negative.into_iter().map(|w| w.as_ref().to_lowercase()).collect(),
            positive: positive.into_iter().map(|w| w.as_ref().to_lowercase()).collect(),
        }
    }

    #[inline]
    pub fn is_negative(&self, word: &str) -> bool {
        self.negative.contains(word)
    }

    #[inline]
    pub fn is_positive(&self, word: &str) -> bool {
        self.positive.contains(word)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Lexicon::new(DEFAULT_NEG_WORDS, DEFAULT_POS_WORDS)
    }
}

/// `neg_words` / `pos_words` の2つを必ず出す
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconFeatures {
    lexicon: Lexicon,
}

impl LexiconFeatures {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }
}

impl FeatureExtractor for LexiconFeatures {
    fn name(&self) -> &'static str {
        "lexicon_features"
    }

    fn extract(&self, tokens: &[String]) -> FeatureCounts {
        let (mut neg, mut pos) = (0u32, 0u32);
        for token in tokens {
            let lower = token.to_lowercase();
            // 両方の辞書にある語はnegとして数える
            if self.lexicon.is_negative(&lower) {
                neg += 1;
            } else if self.lexicon.is_positive(&lower) {
                pos += 1;
            }
        }
        let mut counts = FeatureCounts::new();
        counts.add_count(NEG_WORDS, neg).add_count(POS_WORDS, pos);
        counts
    }
}

/// grid searchで組み合わせる feature function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureFn {
    Token(TokenFeatures),
    TokenPair(TokenPairFeatures),
    Lexicon(LexiconFeatures),
}

impl FeatureFn {
    /// 既定の3種 (token, token_pair(k=3), lexicon)
    pub fn defaults() -> Vec<FeatureFn> {
        vec![
            FeatureFn::Token(TokenFeatures),
            FeatureFn::TokenPair(TokenPairFeatures::default()),
            FeatureFn::Lexicon(LexiconFeatures::default()),
        ]
    }
}

impl FeatureExtractor for FeatureFn {
    fn name(&self) -> &'static str {
        match self {
            FeatureFn::Token(f) => f.name(),
            FeatureFn::TokenPair(f) => f.name(),
            FeatureFn::Lexicon(f) => f.name(),
        }
    }

    fn extract(&self, tokens: &[String]) -> FeatureCounts {
        match self {
            FeatureFn::Token(f) => f.extract(tokens),
            FeatureFn::TokenPair(f) => f.extract(tokens),
            FeatureFn::Lexicon(f) => f.extract(tokens),
        }
    }
}

impl fmt::Display for FeatureFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
