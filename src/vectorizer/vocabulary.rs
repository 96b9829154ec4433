use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// feature名 -> 列index の対応表
///
/// IndexSetの挿入順がそのまま列indexになります。
/// 名前は昇順で挿入されるので、indexは0から連続し、名前の昇順と一致します。
/// 構築後は変更されません。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    names: IndexSet<Box<str>>,
}

impl Vocabulary {
    /// 任意の順序の名前から作る
    /// 重複は除かれ、昇順に並べ替えられる
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<Box<str>> = names.into_iter().map(|n| Box::from(n.as_ref())).collect();
        names.sort_unstable();
        names.dedup();
        Self {
            names: names.into_iter().collect(),
        }
    }

    /// 列indexを取得
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.get_index_of(name)
    }

    /// 列indexからfeature名を取得
    #[inline]
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get_index(index).map(|n| n.as_ref())
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// (列index, feature名) を列順に返す
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().enumerate().map(|(i, n)| (i, n.as_ref()))
    }
}

impl From<Vec<String>> for Vocabulary {
    fn from(names: Vec<String>) -> Self {
        Vocabulary::from_names(names)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocab: Vocabulary) -> Self {
        vocab.names.into_iter().map(String::from).collect()
    }
}
