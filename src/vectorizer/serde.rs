use std::{fs::File, io::{BufReader, BufWriter, Read, Write}, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    classifier::{Classifier, LogisticRegression},
    error::{ClassifierError, Result},
    evaluate::grid::{vectorize_test_corpus, Setting},
    vectorizer::vocabulary::Vocabulary,
};

/// 学習済みモデルの保存形式 (CBOR)
///
/// 最良設定、その設定で作った語彙、ロジスティック回帰の係数をまとめたものです。
/// 読み込んだモデルは同じ設定・語彙で新しい文書をベクトル化して予測できます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub setting: Setting,
    pub vocabulary: Vocabulary,
    /// 列index順の係数
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl FittedModel {
    /// # Errors
    /// 分類器が未学習なら [`ClassifierError::NotFitted`]
    pub fn new(setting: Setting, vocabulary: Vocabulary, classifier: &LogisticRegression) -> Result<Self> {
        let coefficients = classifier.coefficients().ok_or(ClassifierError::NotFitted)?.to_vec();
        if coefficients.len() != vocabulary.len() {
            return Err(ClassifierError::FeatureMismatch {
                expected: vocabulary.len(),
                actual: coefficients.len(),
            }
            .into());
        }
        Ok(Self {
            setting,
            vocabulary,
            coefficients,
            intercept: classifier.intercept(),
        })
    }

    /// 保存した係数から分類器を復元
    pub fn classifier(&self) -> LogisticRegression {
        LogisticRegression::from_parts(self.coefficients.clone(), self.intercept)
    }

    /// 生の文書を予測する
    pub fn predict<T>(&self, docs: &[T]) -> Result<Vec<u8>>
    where
        T: AsRef<str> + Sync,
    {
        let x = vectorize_test_corpus(docs, &self.setting, &self.vocabulary);
        Ok(self.classifier().predict(&x)?)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        serde_cbor::to_writer(writer, self)?;
        Ok(())
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_cbor::from_reader(reader)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }
}
