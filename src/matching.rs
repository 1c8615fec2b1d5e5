//! Key and tolerance comparison shared by reconciliation and duplicate detection.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::config::{AmountTolerance, ReconciliationConfig};
use crate::schema::{CanonicalRecord, FieldValue, LayoutCategory};

/// Distance charged for a tolerance field present on only one side.
const MISSING_FIELD_PENALTY: f64 = 1e12;

/// Order-independent composite key: `name=value` pairs sorted by field name and joined
/// with `|`. Missing fields contribute an empty value.
pub fn composite_key(fields: &BTreeMap<String, FieldValue>, key_fields: &[String]) -> String {
    let names: BTreeSet<&str> = key_fields.iter().map(|f| f.as_str()).collect();
    names
        .into_iter()
        .map(|name| {
            let value = fields.get(name).map(|v| v.key_repr()).unwrap_or_default();
            format!("{name}={value}")
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// One compared field that fell outside tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDiff {
    pub field: String,
    pub left: Option<FieldValue>,
    pub right: Option<FieldValue>,
    /// `left - right` for amount fields.
    pub amount_delta: Option<Decimal>,
    /// Days from `right` to `left` for the date field.
    pub date_offset_days: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Comparison {
    pub within_tolerance: bool,
    /// Every tolerance field that also identifies the record is within tolerance.
    pub identity_within_tolerance: bool,
    pub distance: f64,
    pub amount_delta: Option<Decimal>,
    pub date_offset_days: Option<i64>,
    pub diffs: Vec<FieldDiff>,
}

/// Resolved matching rules for one category.
#[derive(Debug, Clone)]
pub(crate) struct MatchRules {
    pub key_fields: Vec<String>,
    identity_fields: BTreeSet<String>,
    amount_fields: Vec<String>,
    date_field: String,
    tolerance: AmountTolerance,
    date_window: u32,
    amount_weight: f64,
    date_weight: f64,
}

impl MatchRules {
    /// Explicit key fields win; otherwise the category's record-key fields minus the
    /// tolerance-bearing ones.
    pub fn resolve(config: &ReconciliationConfig, category: LayoutCategory) -> Self {
        let identity_fields: BTreeSet<String> = match &config.key_fields {
            Some(fields) => fields.iter().cloned().collect(),
            None => category
                .default_key_fields()
                .iter()
                .map(|f| f.to_string())
                .collect(),
        };
        let key_fields = match &config.key_fields {
            Some(fields) => fields.clone(),
            None => identity_fields
                .iter()
                .filter(|f| !config.is_tolerance_field(f))
                .cloned()
                .collect(),
        };

        Self {
            key_fields,
            identity_fields,
            amount_fields: config.amount_fields.clone(),
            date_field: config.date_field.clone(),
            tolerance: config.match_tolerance,
            date_window: config.date_window,
            amount_weight: config.amount_weight,
            date_weight: config.date_weight,
        }
    }

    pub fn match_key(&self, record: &CanonicalRecord) -> String {
        composite_key(&record.fields, &self.key_fields)
    }

    pub fn compare(&self, left: &CanonicalRecord, right: &CanonicalRecord) -> Comparison {
        let mut within_tolerance = true;
        let mut identity_within_tolerance = true;
        let mut distance = 0.0;
        let mut diffs = Vec::new();
        let mut first_delta = None;

        for field in &self.amount_fields {
            let (a, b) = (left.amount(field), right.amount(field));
            let (ok, delta, term) = match (a, b) {
                (None, None) => (true, None, 0.0),
                (Some(a), Some(b)) => {
                    let delta = a - b;
                    let term = delta.abs().to_f64().unwrap_or(MISSING_FIELD_PENALTY);
                    (self.tolerance.accepts(a, b), Some(delta), term)
                }
                _ => (false, None, MISSING_FIELD_PENALTY),
            };
            if first_delta.is_none() {
                first_delta = delta;
            }
            distance += self.amount_weight * term;
            if !ok {
                within_tolerance = false;
                identity_within_tolerance &= !self.identity_fields.contains(field);
                diffs.push(FieldDiff {
                    field: field.clone(),
                    left: left.get(field).cloned(),
                    right: right.get(field).cloned(),
                    amount_delta: delta,
                    date_offset_days: None,
                });
            }
        }

        let field = &self.date_field;
        let (ok, offset, term) = match (left.date(field), right.date(field)) {
            (None, None) => (true, None, 0.0),
            (Some(a), Some(b)) => {
                let offset = (a - b).num_days();
                (
                    offset.unsigned_abs() <= u64::from(self.date_window),
                    Some(offset),
                    offset.unsigned_abs() as f64,
                )
            }
            _ => (false, None, MISSING_FIELD_PENALTY),
        };
        distance += self.date_weight * term;
        if !ok {
            within_tolerance = false;
            identity_within_tolerance &= !self.identity_fields.contains(field);
            diffs.push(FieldDiff {
                field: field.clone(),
                left: left.get(field).cloned(),
                right: right.get(field).cloned(),
                amount_delta: None,
                date_offset_days: offset,
            });
        }

        Comparison {
            within_tolerance,
            identity_within_tolerance,
            distance,
            amount_delta: first_delta,
            date_offset_days: offset,
            diffs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn record(amount: &str, day: u32, counterparty: &str) -> CanonicalRecord {
        let mut fields = BTreeMap::new();
        fields.insert(
            "amount".to_string(),
            FieldValue::Amount(Decimal::from_str(amount).unwrap()),
        );
        fields.insert(
            "date".to_string(),
            FieldValue::Date(NaiveDate::from_ymd_opt(2025, 1, day).unwrap()),
        );
        fields.insert(
            "counterparty".to_string(),
            FieldValue::Text(counterparty.to_string()),
        );
        CanonicalRecord {
            record_key: String::new(),
            source_layout_id: "TEST".to_string(),
            source_group: "G".to_string(),
            category: LayoutCategory::BankStatement,
            row_index: 0,
            fields,
        }
    }

    #[test]
    fn test_composite_key_is_order_independent() {
        let r = record("10.00", 5, "Acme");
        let a = composite_key(&r.fields, &["date".to_string(), "counterparty".to_string()]);
        let b = composite_key(&r.fields, &["counterparty".to_string(), "date".to_string()]);
        assert_eq!(a, b);
        assert_eq!(a, "counterparty=acme|date=2025-01-05");
    }

    #[test]
    fn test_composite_key_missing_field_is_empty() {
        let r = record("10.00", 5, "Acme");
        assert_eq!(
            composite_key(&r.fields, &["reference".to_string()]),
            "reference="
        );
    }

    #[test]
    fn test_default_rules_drop_tolerance_fields() {
        let rules = MatchRules::resolve(
            &ReconciliationConfig::default(),
            LayoutCategory::BankStatement,
        );
        assert_eq!(rules.key_fields, vec!["counterparty".to_string()]);
    }

    #[test]
    fn test_identity_fields_gate_variants() {
        let config = ReconciliationConfig::default();
        let bank = MatchRules::resolve(&config, LayoutCategory::BankStatement);
        let cmp = bank.compare(&record("10.00", 5, "Acme"), &record("12.00", 5, "Acme"));
        assert!(!cmp.identity_within_tolerance);

        let keyed = ReconciliationConfig::default().with_key_fields(["counterparty"]);
        let rules = MatchRules::resolve(&keyed, LayoutCategory::BankStatement);
        let cmp = rules.compare(&record("10.00", 5, "Acme"), &record("12.00", 5, "Acme"));
        assert!(!cmp.within_tolerance);
        assert!(cmp.identity_within_tolerance);
    }

    #[test]
    fn test_compare_within_and_outside_window() {
        let config = ReconciliationConfig::default().with_date_window(1);
        let rules = MatchRules::resolve(&config, LayoutCategory::BankStatement);

        let close = rules.compare(&record("10.00", 5, "Acme"), &record("10.00", 6, "Acme"));
        assert!(close.within_tolerance);
        assert_eq!(close.date_offset_days, Some(-1));
        assert_eq!(close.distance, 1.0);

        let far = rules.compare(&record("10.00", 5, "Acme"), &record("10.50", 8, "Acme"));
        assert!(!far.within_tolerance);
        assert_eq!(far.diffs.len(), 2);
        assert_eq!(far.diffs[0].amount_delta, Some(Decimal::from_str("-0.50").unwrap()));
        assert_eq!(far.diffs[1].date_offset_days, Some(-3));
    }
}
