use std::sync::OnceLock;

use regex::Regex;

/// 単語境界で始まり単語境界で終わるスパン、または1文字の単語
const INTERNAL_PUNCT_PATTERN: &str = r"\w\S*\w|\w";
const NON_WORD_PATTERN: &str = r"\W+";

fn internal_punct_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(INTERNAL_PUNCT_PATTERN).expect("static regex is valid"))
}

fn non_word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(NON_WORD_PATTERN).expect("static regex is valid"))
}

/// Tokenize a document.
///
/// The document is lower-cased first.
/// - `keep_internal_punct == false`: every run of non-word characters becomes a
///   separator, so `"isn't"` becomes `["isn", "t"]`.
/// - `keep_internal_punct == true`: punctuation inside a word survives
///   (`"isn't"`), leading and trailing punctuation is stripped.
///
/// # Arguments
/// * `doc` - raw document text
/// * `keep_internal_punct` - punctuation policy
///
/// # Returns
/// * `Vec<String>` - tokens in document order
pub fn tokenize(doc: &str, keep_internal_punct: bool) -> Vec<String> {
    let lower = doc.to_lowercase();
    if keep_internal_punct {
        internal_punct_regex()
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .collect()
    } else {
        non_word_regex()
            .replace_all(&lower, " ")
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

/// Tokens of one corpus under both punctuation policies.
/// grid searchで設定ごとに再トークナイズしないためのキャッシュ
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    pub kept: Vec<Vec<String>>,
    pub stripped: Vec<Vec<String>>,
}

impl TokenCache {
    pub fn new<T>(docs: &[T]) -> Self
    where
        T: AsRef<str> + Sync,
    {
        use rayon::prelude::*;

        let (kept, stripped) = docs
            .par_iter()
            .map(|doc| (tokenize(doc.as_ref(), true), tokenize(doc.as_ref(), false)))
            .unzip();
        Self { kept, stripped }
    }

    #[inline]
    pub fn get(&self, keep_internal_punct: bool) -> &[Vec<String>] {
        if keep_internal_punct {
            &self.kept
        } else {
            &self.stripped
        }
    }

    pub fn len(&self) -> usize {
        self.kept.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}
