use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::{ColumnRole, LayoutCategory};

/// A single cell that could not be converted into its canonical type.
///
/// Row parse errors never abort a normalization: the offending row is excluded from the
/// dataset and the error is returned alongside it as a warning.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("row {row_index}, field '{field}': cannot parse '{raw_value}' ({reason})")]
pub struct RowParseError {
    /// Zero-based index of the row within `RawTable::rows`.
    pub row_index: usize,
    pub field: String,
    pub raw_value: String,
    pub reason: String,
}

#[derive(Error, Debug)]
pub enum ToolkitError {
    #[error("Layout '{layout_id}' has the same header set as already registered layout '{existing_id}'")]
    DuplicateSignature {
        layout_id: String,
        existing_id: String,
    },

    #[error("Invalid layout '{layout_id}': {reason}")]
    InvalidLayout { layout_id: String, reason: String },

    #[error("Unknown layout: {0}")]
    UnknownLayout(String),

    #[error("Layout '{layout_id}': required column for role '{role}' not found in table headers")]
    MissingRequiredColumn { layout_id: String, role: ColumnRole },

    #[error("Datasets belong to different groups ('{left}' vs '{right}') and cross-group comparison is not allowed")]
    IncompatibleGroups { left: String, right: String },

    #[error("Datasets hold different record categories ('{left}' vs '{right}'); records of different categories are never compared")]
    IncompatibleCategories {
        left: LayoutCategory,
        right: LayoutCategory,
    },

    #[error("Invalid reconciliation config, field '{field}': {reason}")]
    InvalidReconciliationConfig { field: String, reason: String },

    #[error("Invalid loan terms, field '{field}': {reason}")]
    InvalidTerms { field: String, reason: String },

    #[error("Invalid detector config, field '{field}': {reason}")]
    InvalidDetectorConfig { field: String, reason: String },

    #[error("Config parse error: {0}")]
    ConfigParse(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl ToolkitError {
    pub(crate) fn invalid_terms(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTerms {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_recon_config(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidReconciliationConfig {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ToolkitError>;
