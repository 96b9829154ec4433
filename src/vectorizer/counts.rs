use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// FeatureCounts 構造体
/// 1文書分の feature名 -> 出現回数 を保持します
/// extractorはこれを値で返し、Featurizerが合算します
///
/// # Examples
/// ```
/// use feature_search::FeatureCounts;
/// let mut counts = FeatureCounts::new();
/// counts.add_count("token=hi", 1);
/// counts.add_count("token=there", 1);
/// counts.add_count("token=hi", 1);
///
/// assert_eq!(counts.count("token=hi"), 2);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FeatureCounts {
    #[serde(with = "indexmap::map::serde_seq")]
    counts: IndexMap<String, u32>,
}

/// featureの追加、合算の実装
impl FeatureCounts {
    pub fn new() -> Self {
        FeatureCounts {
            counts: IndexMap::new(),
        }
    }

    /// featureに `n` を加算する
    /// `n == 0` でもエントリは作成される (lexiconの0件を出すため)
    ///
    /// # Arguments
    /// * `name` - feature名
    /// * `n` - 加算する回数
    #[inline]
    pub fn add_count(&mut self, name: &str, n: u32) -> &mut Self {
        match self.counts.get_mut(name) {
            Some(count) => *count += n,
            None => {
                self.counts.insert(name.to_string(), n);
            }
        }
        self
    }

    /// 所有済みの名前で加算する
    #[inline]
    pub fn add_owned(&mut self, name: String, n: u32) -> &mut Self {
        *self.counts.entry(name).or_insert(0) += n;
        self
    }

    /// 別のFeatureCountsを合算する
    pub fn merge(&mut self, other: FeatureCounts) -> &mut Self {
        for (name, n) in other.counts {
            self.add_owned(name, n);
        }
        self
    }
}

/// 参照系
impl FeatureCounts {
    /// featureの回数を取得します
    /// 存在しない場合は0
    #[inline]
    pub fn count(&self, name: &str) -> u32 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.counts.contains_key(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(name, &n)| (name.as_str(), n))
    }

    /// feature名の昇順に並べたベクタへ変換します
    ///
    /// # Returns
    /// * `Vec<(String, u32)>` - (feature名, 回数) のベクタ
    pub fn into_sorted_vec(self) -> Vec<(String, u32)> {
        let mut counts = self.counts;
        counts.sort_unstable_keys();
        counts.into_iter().collect()
    }
}

impl FromIterator<(String, u32)> for FeatureCounts {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        let mut counts = FeatureCounts::new();
        for (name, n) in iter {
            counts.add_owned(name, n);
        }
        counts
    }
}
