//! Conversion of office documents into Google native formats.
//!
//! Files whose extension is in the table are uploaded with the native
//! content type, which makes Google convert them, and are then renamed
//! to their stem. A converted document is therefore found again by
//! its stem and its native content type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DOCUMENT_MIMETYPE: &str = "application/vnd.google-apps.document";
pub const SPREADSHEET_MIMETYPE: &str = "application/vnd.google-apps.spreadsheet";
pub const PRESENTATION_MIMETYPE: &str = "application/vnd.google-apps.presentation";

const DEFAULT_TABLE: &[(&str, &str)] = &[
    ("doc", DOCUMENT_MIMETYPE),
    ("docx", DOCUMENT_MIMETYPE),
    ("xls", SPREADSHEET_MIMETYPE),
    ("xlsx", SPREADSHEET_MIMETYPE),
    ("ppt", PRESENTATION_MIMETYPE),
    ("pptx", PRESENTATION_MIMETYPE),
];

/// Extension to native content type map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationTable(BTreeMap<String, String>);

impl TranslationTable {
    /// The native content type for `extension`, if any.
    /// Lookup is case-sensitive.
    pub fn get(&self, extension: &str) -> Option<&str> {
        self.0.get(extension).map(String::as_str)
    }

    /// Adds or overrides entries with those of `other`
    pub fn extend(&mut self, other: TranslationTable) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for TranslationTable {
    fn default() -> Self {
        Self(
            DEFAULT_TABLE
                .iter()
                .map(|(e, m)| (e.to_string(), m.to_string()))
                .collect(),
        )
    }
}
