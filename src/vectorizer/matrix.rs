use std::fmt::Debug;

use num::Num;
use sprs::{CsMat, TriMat};

/// 文書 x feature の疎行列 (CSR)
///
/// 行は文書の順序、列はVocabularyのindexに対応します。
/// 0の値は保持しません。
#[derive(Debug, Clone)]
pub struct FeatureMatrix<N = u32>
where
    N: Num + Copy,
{
    inner: CsMat<N>,
}

impl<N> FeatureMatrix<N>
where
    N: Num + Copy,
{
    /// 全て0の行列
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            inner: CsMat::zero((rows, cols)),
        }
    }

    /// (row, col, value) の三つ組からCSRへ圧縮する
    /// 同じ位置の値は合算され、0は捨てられる
    pub fn from_triplets<I>(rows: usize, cols: usize, triplets: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize, N)>,
    {
        let mut tri = TriMat::new((rows, cols));
        for (row, col, value) in triplets {
            if value != N::zero() {
                tri.add_triplet(row, col, value);
            }
        }
        Self { inner: tri.to_csr() }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.inner.rows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.inner.cols()
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    /// 非ゼロ要素数
    #[inline]
    pub fn nnz(&self) -> usize {
        self.inner.nnz()
    }

    /// 要素を取得 (未保持なら0)
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> N {
        self.inner.get(row, col).copied().unwrap_or_else(N::zero)
    }

    /// 1行分の (列index, 値)
    pub fn row(&self, row: usize) -> Vec<(usize, N)> {
        self.inner
            .outer_view(row)
            .map(|view| view.iter().map(|(col, &v)| (col, v)).collect())
            .unwrap_or_default()
    }

    /// 行ごとの (列index, 値) のイテレータ
    pub fn row_iter(&self) -> impl Iterator<Item = Vec<(usize, N)>> + '_ {
        self.inner
            .outer_iterator()
            .map(|view| view.iter().map(|(col, &v)| (col, v)).collect())
    }

    /// 非ゼロ要素を (row, col, value) で行優先に返す
    pub fn triplets(&self) -> Vec<(usize, usize, N)> {
        self.inner
            .iter()
            .map(|(&v, (row, col))| (row, col, v))
            .collect()
    }

    /// 指定した行だけを取り出した行列
    /// 行は `indices` の順に並ぶ
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let triplets = indices.iter().enumerate().flat_map(|(new_row, &old_row)| {
            self.row(old_row)
                .into_iter()
                .map(move |(col, v)| (new_row, col, v))
        });
        Self::from_triplets(indices.len(), self.cols(), triplets)
    }

    /// 密行列へ変換 (テスト・デバッグ用)
    pub fn to_dense(&self) -> Vec<Vec<N>> {
        let mut dense = vec![vec![N::zero(); self.cols()]; self.rows()];
        for (row, col, v) in self.triplets() {
            dense[row][col] = v;
        }
        dense
    }

    pub fn as_csmat(&self) -> &CsMat<N> {
        &self.inner
    }
}

impl<N> PartialEq for FeatureMatrix<N>
where
    N: Num + Copy,
{
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.triplets() == other.triplets()
    }
}
