/// 空集合を除いた全部分集合を列挙するイテレータ
///
/// サイズの小さい順、同じサイズ内ではindexの辞書順に返します。
/// `[a, b, c]` なら `[a] [b] [c] [a b] [a c] [b c] [a b c]` の順です。
/// 要素は元のスライスの順序を保ちます。
#[derive(Debug, Clone)]
pub struct NonEmptySubsets<'a, T> {
    items: &'a [T],
    indices: Vec<usize>,
    done: bool,
}

impl<'a, T> NonEmptySubsets<'a, T> {
    pub fn new(items: &'a [T]) -> Self {
        Self {
            items,
            indices: vec![0],
            done: items.is_empty(),
        }
    }

    /// 次の組み合わせへ進める
    /// 現在のサイズを使い切ったらサイズを1増やす
    fn advance(&mut self) {
        let n = self.items.len();
        let k = self.indices.len();
        // 右から見て、まだ増やせる位置を探す
        if let Some(pos) = (0..k).rev().find(|&i| self.indices[i] < n - k + i) {
            self.indices[pos] += 1;
            for i in pos + 1..k {
                self.indices[i] = self.indices[i - 1] + 1;
            }
        } else if k < n {
            self.indices = (0..=k).collect();
        } else {
            self.done = true;
        }
    }
}

impl<'a, T> Iterator for NonEmptySubsets<'a, T> {
    type Item = Vec<&'a T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let subset = self.indices.iter().map(|&i| &self.items[i]).collect();
        self.advance();
        Some(subset)
    }
}

/// 空でない部分集合の個数 `2^n - 1`
#[inline]
pub fn subset_count(n: usize) -> usize {
    u32::try_from(n)
        .ok()
        .and_then(|n| 1usize.checked_shl(n))
        .map_or(usize::MAX, |v| v - 1)
}
