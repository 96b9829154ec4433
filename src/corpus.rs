use std::{fs, io, path::Path};

use tracing::debug;

use crate::error::{Error, Result};

/// ラベル付き文書集合
///
/// `documents[i]` のラベルが `labels[i]` (1=positive, 0=negative) です。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    documents: Vec<String>,
    labels: Vec<u8>,
}

impl Corpus {
    /// # Errors
    /// * 長さが違えば [`Error::LengthMismatch`]
    /// * 0/1以外のラベルは [`Error::InvalidLabel`]
    pub fn new(documents: Vec<String>, labels: Vec<u8>) -> Result<Self> {
        if documents.len() != labels.len() {
            return Err(Error::LengthMismatch {
                what: "documents",
                left: documents.len(),
                right: labels.len(),
            });
        }
        if let Some(&bad) = labels.iter().find(|&&y| y > 1) {
            return Err(Error::InvalidLabel(bad));
        }
        Ok(Self { documents, labels })
    }

    /// `pos/*.txt` (ラベル1) と `neg/*.txt` (ラベル0) を読む
    ///
    /// 各ファイルの1行目だけを文書とします。
    /// ファイル名順に読み、最後に文書テキストで安定ソートします。
    ///
    /// # Errors
    /// ディレクトリやファイルが読めなければ [`Error::Io`]
    pub fn from_dir<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut data: Vec<(String, u8)> = Vec::new();
        for (sub, label) in [("pos", 1u8), ("neg", 0u8)] {
            for file in txt_files(&path.join(sub))? {
                data.push((first_line(&file)?, label));
            }
        }
        data.sort_by(|a, b| a.0.cmp(&b.0));
        debug!(path = %path.display(), documents = data.len(), "corpus loaded");

        let (documents, labels) = data.into_iter().unzip();
        Ok(Self { documents, labels })
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// ラベルごとの件数 `(negative, positive)`
    pub fn class_counts(&self) -> (usize, usize) {
        let positive = self.labels.iter().filter(|&&y| y == 1).count();
        (self.labels.len() - positive, positive)
    }
}

/// ディレクトリ直下の `.txt` をファイル名順に
fn txt_files(dir: &Path) -> io::Result<Vec<std::path::PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// 改行を除いた1行目 (空ファイルは空文字列)
fn first_line(path: &Path) -> io::Result<String> {
    let text = fs::read_to_string(path)?;
    Ok(text.lines().next().unwrap_or_default().to_string())
}
