use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, ToolkitError};
use crate::schema::ColumnRole;

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DetectorConfig {
    #[schemars(
        description = "Minimum weighted share of a layout's required columns that must be present for the layout to be accepted (0 < t <= 1)."
    )]
    pub acceptance_threshold: f64,

    #[schemars(
        description = "How many leading data rows are examined as candidate header rows when the declared header row does not match any layout."
    )]
    pub header_scan_rows: usize,

    #[schemars(
        description = "Per-role weight overrides keyed by canonical field name. Roles not listed keep their default weight (identifying 3, monetary/date 2, descriptive 1)."
    )]
    pub role_weights: BTreeMap<String, f64>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 0.75,
            header_scan_rows: 25,
            role_weights: BTreeMap::new(),
        }
    }
}

impl DetectorConfig {
    pub fn weight(&self, role: ColumnRole) -> f64 {
        self.role_weights
            .get(role.canonical_name())
            .copied()
            .unwrap_or_else(|| role.default_weight())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.acceptance_threshold > 0.0 && self.acceptance_threshold <= 1.0) {
            return Err(ToolkitError::InvalidDetectorConfig {
                field: "acceptance_threshold".to_string(),
                reason: format!("must be in (0, 1], got {}", self.acceptance_threshold),
            });
        }
        for (role, weight) in &self.role_weights {
            if ColumnRole::from_canonical_name(role).is_none() {
                return Err(ToolkitError::InvalidDetectorConfig {
                    field: format!("role_weights.{role}"),
                    reason: "unknown column role".to_string(),
                });
            }
            if !weight.is_finite() || *weight <= 0.0 {
                return Err(ToolkitError::InvalidDetectorConfig {
                    field: format!("role_weights.{role}"),
                    reason: format!("must be a positive number, got {weight}"),
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Allowed absolute difference between two amounts: the larger of a fixed amount and a
/// share of the larger magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AmountTolerance {
    pub absolute: Decimal,
    pub relative: Decimal,
}

impl Default for AmountTolerance {
    fn default() -> Self {
        Self {
            absolute: Decimal::ZERO,
            relative: Decimal::ZERO,
        }
    }
}

impl AmountTolerance {
    pub fn absolute(amount: Decimal) -> Self {
        Self {
            absolute: amount,
            relative: Decimal::ZERO,
        }
    }

    pub fn allowed(&self, a: Decimal, b: Decimal) -> Decimal {
        let scaled = self.relative * a.abs().max(b.abs());
        self.absolute.max(scaled)
    }

    pub fn accepts(&self, a: Decimal, b: Decimal) -> bool {
        (a - b).abs() <= self.allowed(a, b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateScope {
    /// Clusters are formed inside each dataset separately.
    Within,
    /// Clusters are formed over the union of both datasets.
    Cross,
    Disabled,
}

impl Default for DuplicateScope {
    fn default() -> Self {
        Self::Within
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ReconciliationConfig {
    pub match_tolerance: AmountTolerance,

    #[schemars(description = "Maximum allowed distance in days between matched dates.")]
    pub date_window: u32,

    #[schemars(
        description = "Fields that must be equal for two records to be compared at all. When absent, the category's record-key fields minus the tolerance-bearing fields are used."
    )]
    pub key_fields: Option<Vec<String>>,

    #[schemars(description = "Amount fields compared under match_tolerance.")]
    pub amount_fields: Vec<String>,

    #[schemars(description = "Date field compared under date_window.")]
    pub date_field: String,

    pub amount_weight: f64,
    pub date_weight: f64,

    #[schemars(description = "Permit reconciling datasets of different source groups. Datasets of different categories are always rejected.")]
    pub allow_cross_group: bool,

    pub duplicate_scope: DuplicateScope,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            match_tolerance: AmountTolerance::default(),
            date_window: 0,
            key_fields: None,
            amount_fields: vec!["amount".to_string()],
            date_field: "date".to_string(),
            amount_weight: 1.0,
            date_weight: 1.0,
            allow_cross_group: false,
            duplicate_scope: DuplicateScope::Within,
        }
    }
}

impl ReconciliationConfig {
    pub fn with_tolerance(mut self, tolerance: AmountTolerance) -> Self {
        self.match_tolerance = tolerance;
        self
    }

    pub fn with_date_window(mut self, days: u32) -> Self {
        self.date_window = days;
        self
    }

    pub fn with_key_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_duplicate_scope(mut self, scope: DuplicateScope) -> Self {
        self.duplicate_scope = scope;
        self
    }

    pub fn is_tolerance_field(&self, field: &str) -> bool {
        field == self.date_field || self.amount_fields.iter().any(|f| f == field)
    }

    pub fn validate(&self) -> Result<()> {
        let tolerance = &self.match_tolerance;
        if tolerance.absolute.is_sign_negative() && !tolerance.absolute.is_zero() {
            return Err(ToolkitError::invalid_recon_config(
                "match_tolerance.absolute",
                format!("must not be negative, got {}", tolerance.absolute),
            ));
        }
        if tolerance.relative.is_sign_negative() && !tolerance.relative.is_zero() {
            return Err(ToolkitError::invalid_recon_config(
                "match_tolerance.relative",
                format!("must not be negative, got {}", tolerance.relative),
            ));
        }
        if let Some(fields) = &self.key_fields {
            if fields.is_empty() {
                return Err(ToolkitError::invalid_recon_config(
                    "key_fields",
                    "must list at least one field when given",
                ));
            }
            if fields.iter().any(|f| f.trim().is_empty()) {
                return Err(ToolkitError::invalid_recon_config(
                    "key_fields",
                    "field names must not be blank",
                ));
            }
        }
        if self.amount_fields.iter().any(|f| f.trim().is_empty()) {
            return Err(ToolkitError::invalid_recon_config(
                "amount_fields",
                "field names must not be blank",
            ));
        }
        if self.date_field.trim().is_empty() {
            return Err(ToolkitError::invalid_recon_config(
                "date_field",
                "must not be blank",
            ));
        }
        for (field, weight) in [
            ("amount_weight", self.amount_weight),
            ("date_weight", self.date_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ToolkitError::invalid_recon_config(
                    field,
                    format!("must be a non-negative number, got {weight}"),
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ToolkitConfig {
    pub detector: DetectorConfig,
    pub reconciliation: ReconciliationConfig,
}

impl ToolkitConfig {
    pub fn from_toml(input: &str) -> Result<Self> {
        let config: ToolkitConfig =
            toml::from_str(input).map_err(|e| ToolkitError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.detector.validate()?;
        self.reconciliation.validate()
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ToolkitConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const FULL_CONFIG: &str = r#"
[detector]
acceptance_threshold = 0.8
header_scan_rows = 10

[detector.role_weights]
description = 0.5

[reconciliation]
date_window = 3
key_fields = ["invoice_number"]
amount_fields = ["amount", "vat_amount"]
duplicate_scope = "cross"

[reconciliation.match_tolerance]
absolute = "0.05"
relative = 0.001
"#;

    #[test]
    fn test_defaults() {
        let config = ToolkitConfig::default();
        assert_eq!(config.detector.acceptance_threshold, 0.75);
        assert_eq!(config.detector.header_scan_rows, 25);
        assert_eq!(config.reconciliation.date_window, 0);
        assert_eq!(config.reconciliation.amount_fields, vec!["amount"]);
        assert_eq!(config.reconciliation.duplicate_scope, DuplicateScope::Within);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let config = ToolkitConfig::from_toml(FULL_CONFIG).unwrap();
        assert_eq!(config.detector.acceptance_threshold, 0.8);
        assert_eq!(config.detector.header_scan_rows, 10);
        assert_eq!(config.detector.weight(ColumnRole::Description), 0.5);
        assert_eq!(config.detector.weight(ColumnRole::TaxId), 3.0);

        let recon = &config.reconciliation;
        assert_eq!(recon.date_window, 3);
        assert_eq!(recon.key_fields, Some(vec!["invoice_number".to_string()]));
        assert_eq!(recon.duplicate_scope, DuplicateScope::Cross);
        assert_eq!(
            recon.match_tolerance.absolute,
            Decimal::from_str("0.05").unwrap()
        );
        assert_eq!(
            recon.match_tolerance.relative,
            Decimal::from_str("0.001").unwrap()
        );
        assert_eq!(recon.date_field, "date");
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = ToolkitConfig::from_toml("").unwrap();
        assert_eq!(config, ToolkitConfig::default());
    }

    #[test]
    fn test_unknown_role_weight_rejected() {
        let err = ToolkitConfig::from_toml("[detector.role_weights]\nfoo = 2.0\n").unwrap_err();
        assert!(err.to_string().contains("role_weights.foo"));
    }

    #[test]
    fn test_invalid_threshold() {
        let err = ToolkitConfig::from_toml("[detector]\nacceptance_threshold = 1.5\n").unwrap_err();
        assert!(matches!(err, ToolkitError::InvalidDetectorConfig { .. }));
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let config = ReconciliationConfig::default()
            .with_tolerance(AmountTolerance::absolute(Decimal::from_str("-1").unwrap()));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("match_tolerance.absolute"));
    }

    #[test]
    fn test_empty_key_fields_rejected() {
        let config = ReconciliationConfig::default().with_key_fields(Vec::<String>::new());
        assert!(matches!(
            config.validate(),
            Err(ToolkitError::InvalidReconciliationConfig { .. })
        ));
    }

    #[test]
    fn test_malformed_toml() {
        let err = ToolkitConfig::from_toml("[detector\n").unwrap_err();
        assert!(matches!(err, ToolkitError::ConfigParse(_)));
    }

    #[test]
    fn test_tolerance_allowed() {
        let tolerance = AmountTolerance {
            absolute: Decimal::from_str("1").unwrap(),
            relative: Decimal::from_str("0.01").unwrap(),
        };
        let hundred = Decimal::from(100);
        let thousand = Decimal::from(1000);
        assert_eq!(tolerance.allowed(hundred, hundred), Decimal::from(1));
        assert_eq!(tolerance.allowed(thousand, hundred), Decimal::from(10));
        assert!(tolerance.accepts(thousand, Decimal::from(991)));
        assert!(!tolerance.accepts(thousand, Decimal::from(989)));
    }

    #[test]
    fn test_schema_generation() {
        let json = ToolkitConfig::schema_as_json().unwrap();
        assert!(json.contains("acceptance_threshold"));
        assert!(json.contains("duplicate_scope"));
    }
}
