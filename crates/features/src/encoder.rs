//! Categorical label encoding.
//!
//! Labels get dense codes in sorted order, so re-fitting on the same labels
//! reproduces the same mapping regardless of input order.

use auction_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Which record attribute an encoder covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoricalField {
    Category,
    Condition,
}

impl CategoricalField {
    fn unknown(self, label: &str) -> Error {
        match self {
            CategoricalField::Category => Error::UnknownCategory(label.to_string()),
            CategoricalField::Condition => Error::UnknownCondition(label.to_string()),
        }
    }
}

/// Frozen mapping from label to integer code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalEncoder {
    field: CategoricalField,
    codes: BTreeMap<String, u32>,
}

impl CategoricalEncoder {
    /// Fit on a sequence of labels.
    pub fn fit<I, S>(field: CategoricalField, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = labels
            .into_iter()
            .map(|label| label.as_ref().to_string())
            .collect();

        let codes = distinct
            .into_iter()
            .enumerate()
            .map(|(code, label)| (label, code as u32))
            .collect();

        Self { field, codes }
    }

    /// Code for a label seen during fitting.
    pub fn transform(&self, label: &str) -> Result<u32> {
        self.codes
            .get(label)
            .copied()
            .ok_or_else(|| self.field.unknown(label))
    }

    /// Field this encoder covers.
    pub fn field(&self) -> CategoricalField {
        self.field
    }

    /// Number of known labels.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether no labels are known.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Known labels in code order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.codes.keys().map(String::as_str)
    }

    /// Check that codes are exactly `0..len`. Guards against hand-edited or
    /// corrupted artifacts.
    pub fn is_dense(&self) -> bool {
        let mut seen: Vec<u32> = self.codes.values().copied().collect();
        seen.sort_unstable();
        seen.iter().enumerate().all(|(i, &code)| code as usize == i)
    }
}
