use log::{debug, info};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::config::{DuplicateScope, ReconciliationConfig};
use crate::duplicates::{cluster_records, DuplicateCluster};
use crate::error::{Result, ToolkitError};
use crate::matching::{composite_key, FieldDiff, MatchRules};
use crate::schema::{CanonicalRecord, Dataset};

/// Position of a record inside its dataset plus its record key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordRef {
    pub index: usize,
    pub record_key: String,
}

impl RecordRef {
    fn new(index: usize, record: &CanonicalRecord) -> Self {
        Self {
            index,
            record_key: record.record_key.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub left: RecordRef,
    pub right: RecordRef,
    /// `left - right` of the first amount field, when both sides carry it.
    pub amount_delta: Option<Decimal>,
    pub date_offset_days: Option<i64>,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantPair {
    pub left: RecordRef,
    pub right: RecordRef,
    pub diffs: Vec<FieldDiff>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    pub left_records: usize,
    pub right_records: usize,
    pub matched: usize,
    pub variant: usize,
    pub unmatched_left: usize,
    pub unmatched_right: usize,
    pub duplicate_clusters: usize,
    /// Sum of the first amount field over the left dataset.
    pub left_total: Decimal,
    pub right_total: Decimal,
    /// `left_total - right_total`.
    pub difference: Decimal,
}

impl ReconciliationSummary {
    /// Share of left records that found a counterpart within tolerance.
    pub fn match_rate(&self) -> f64 {
        if self.left_records == 0 {
            return 0.0;
        }
        self.matched as f64 / self.left_records as f64
    }
}

/// Every record of both inputs appears in exactly one of the four partitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub matched: Vec<MatchedPair>,
    pub variant: Vec<VariantPair>,
    pub unmatched_left: Vec<RecordRef>,
    pub unmatched_right: Vec<RecordRef>,
    pub duplicates: Vec<DuplicateCluster>,
    pub summary: ReconciliationSummary,
}

impl ReconciliationResult {
    pub fn is_fully_matched(&self) -> bool {
        self.variant.is_empty() && self.unmatched_left.is_empty() && self.unmatched_right.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Canonical ordering data for one record.
struct Candidate<'a> {
    index: usize,
    record: &'a CanonicalRecord,
    match_key: String,
    tolerance_key: String,
}

impl<'a> Candidate<'a> {
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.match_key
            .cmp(&other.match_key)
            .then_with(|| self.record.record_key.cmp(&other.record.record_key))
            .then_with(|| self.tolerance_key.cmp(&other.tolerance_key))
            .then_with(|| self.index.cmp(&other.index))
    }
}

pub struct ReconciliationEngine {
    config: ReconciliationConfig,
}

impl ReconciliationEngine {
    pub fn new(config: ReconciliationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }

    pub fn reconcile(&self, left: &Dataset, right: &Dataset) -> Result<ReconciliationResult> {
        info!(
            "Reconciling '{}' ({} records) against '{}' ({} records)",
            left.source_group,
            left.len(),
            right.source_group,
            right.len()
        );

        if left.category != right.category {
            return Err(ToolkitError::IncompatibleCategories {
                left: left.category,
                right: right.category,
            });
        }
        if !self.config.allow_cross_group && left.source_group != right.source_group {
            return Err(ToolkitError::IncompatibleGroups {
                left: left.source_group.clone(),
                right: right.source_group.clone(),
            });
        }

        let rules = MatchRules::resolve(&self.config, left.category);
        debug!("Match key fields: {:?}", rules.key_fields);

        let mut lefts = self.candidates(left, &rules);
        lefts.sort_by(|a, b| a.canonical_cmp(b));

        // Unclaimed right records per match key, each bucket in canonical order
        let mut pool: BTreeMap<String, Vec<Candidate>> = BTreeMap::new();
        for candidate in self.candidates(right, &rules) {
            pool.entry(candidate.match_key.clone())
                .or_default()
                .push(candidate);
        }
        for bucket in pool.values_mut() {
            bucket.sort_by(|a, b| a.canonical_cmp(b));
        }

        let mut matched = Vec::new();
        let mut pending = Vec::new();
        for l in lefts {
            match take_best(&mut pool, &l, &rules, true) {
                Some(r) => {
                    let cmp = rules.compare(l.record, r.record);
                    debug!(
                        "Matched left #{} with right #{} (distance {:.4})",
                        l.index, r.index, cmp.distance
                    );
                    matched.push(MatchedPair {
                        left: RecordRef::new(l.index, l.record),
                        right: RecordRef::new(r.index, r.record),
                        amount_delta: cmp.amount_delta,
                        date_offset_days: cmp.date_offset_days,
                        distance: cmp.distance,
                    });
                }
                None => pending.push(l),
            }
        }

        let mut variant = Vec::new();
        let mut unmatched_left = Vec::new();
        for l in pending {
            match take_best(&mut pool, &l, &rules, false) {
                Some(r) => {
                    let cmp = rules.compare(l.record, r.record);
                    debug!(
                        "Variant left #{} / right #{}: {} differing fields",
                        l.index,
                        r.index,
                        cmp.diffs.len()
                    );
                    variant.push(VariantPair {
                        left: RecordRef::new(l.index, l.record),
                        right: RecordRef::new(r.index, r.record),
                        diffs: cmp.diffs,
                    });
                }
                None => unmatched_left.push(RecordRef::new(l.index, l.record)),
            }
        }

        let mut unmatched_right: Vec<RecordRef> = pool
            .into_values()
            .flatten()
            .map(|c| RecordRef::new(c.index, c.record))
            .collect();

        matched.sort_by_key(|p| p.left.index);
        variant.sort_by_key(|p| p.left.index);
        unmatched_left.sort();
        unmatched_right.sort();

        let duplicates = self.find_duplicates(left, right, &rules);

        let amount_field = self
            .config
            .amount_fields
            .first()
            .map(String::as_str)
            .unwrap_or("amount");
        let left_total = left.total(amount_field);
        let right_total = right.total(amount_field);

        let summary = ReconciliationSummary {
            left_records: left.len(),
            right_records: right.len(),
            matched: matched.len(),
            variant: variant.len(),
            unmatched_left: unmatched_left.len(),
            unmatched_right: unmatched_right.len(),
            duplicate_clusters: duplicates.len(),
            left_total,
            right_total,
            difference: left_total - right_total,
        };

        info!(
            "Reconciliation complete: {} matched, {} variant, {} unmatched left, {} unmatched right",
            summary.matched, summary.variant, summary.unmatched_left, summary.unmatched_right
        );

        Ok(ReconciliationResult {
            matched,
            variant,
            unmatched_left,
            unmatched_right,
            duplicates,
            summary,
        })
    }

    fn candidates<'a>(&self, dataset: &'a Dataset, rules: &MatchRules) -> Vec<Candidate<'a>> {
        let mut tolerance_fields = self.config.amount_fields.clone();
        tolerance_fields.push(self.config.date_field.clone());

        dataset
            .records
            .iter()
            .enumerate()
            .map(|(index, record)| Candidate {
                index,
                record,
                match_key: rules.match_key(record),
                tolerance_key: composite_key(&record.fields, &tolerance_fields),
            })
            .collect()
    }

    fn find_duplicates(
        &self,
        left: &Dataset,
        right: &Dataset,
        rules: &MatchRules,
    ) -> Vec<DuplicateCluster> {
        match self.config.duplicate_scope {
            DuplicateScope::Disabled => Vec::new(),
            DuplicateScope::Within => {
                let mut clusters = cluster_records(&tagged(0, left), rules);
                clusters.extend(cluster_records(&tagged(1, right), rules));
                clusters
            }
            DuplicateScope::Cross => {
                let mut all = tagged(0, left);
                all.extend(tagged(1, right));
                cluster_records(&all, rules)
            }
        }
    }
}

fn tagged(dataset: usize, data: &Dataset) -> Vec<(usize, usize, &CanonicalRecord)> {
    data.records
        .iter()
        .enumerate()
        .map(|(index, record)| (dataset, index, record))
        .collect()
}

/// Removes and returns the closest unclaimed right record sharing `left`'s match key.
/// With `within_tolerance`, only candidates inside tolerance qualify; otherwise the
/// candidate must still agree on the tolerance fields that identify the record.
fn take_best<'a>(
    pool: &mut BTreeMap<String, Vec<Candidate<'a>>>,
    left: &Candidate,
    rules: &MatchRules,
    within_tolerance: bool,
) -> Option<Candidate<'a>> {
    let bucket = pool.get_mut(&left.match_key)?;

    let mut best: Option<(usize, f64)> = None;
    for (pos, candidate) in bucket.iter().enumerate() {
        let cmp = rules.compare(left.record, candidate.record);
        let eligible = if within_tolerance {
            cmp.within_tolerance
        } else {
            cmp.identity_within_tolerance
        };
        if !eligible {
            continue;
        }
        // Buckets are in canonical order, so the first of equal distances wins
        let better = match best {
            None => true,
            Some((_, d)) => cmp.distance.total_cmp(&d) == Ordering::Less,
        };
        if better {
            best = Some((pos, cmp.distance));
        }
    }

    let (pos, _) = best?;
    Some(bucket.remove(pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AmountTolerance;
    use crate::schema::{FieldValue, LayoutCategory};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn record(counterparty: &str, amount: &str, date: (i32, u32, u32)) -> CanonicalRecord {
        let mut fields = BTreeMap::new();
        fields.insert(
            "counterparty".to_string(),
            FieldValue::Text(counterparty.to_string()),
        );
        fields.insert(
            "amount".to_string(),
            FieldValue::Amount(Decimal::from_str(amount).unwrap()),
        );
        fields.insert(
            "date".to_string(),
            FieldValue::Date(NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap()),
        );
        CanonicalRecord {
            record_key: composite_key(
                &fields,
                &["amount".into(), "counterparty".into(), "date".into()],
            ),
            source_layout_id: "TEST".to_string(),
            source_group: "ACME".to_string(),
            category: LayoutCategory::BankStatement,
            row_index: 0,
            fields,
        }
    }

    fn dataset(group: &str, records: Vec<CanonicalRecord>) -> Dataset {
        let mut dataset = Dataset::new(group, LayoutCategory::BankStatement, "BANK");
        dataset.records = records;
        dataset
    }

    fn engine(config: ReconciliationConfig) -> ReconciliationEngine {
        ReconciliationEngine::new(config).unwrap()
    }

    #[test]
    fn test_amount_within_absolute_tolerance_matches() {
        let a = dataset("ACME", vec![record("Shop", "100.00", (2025, 1, 10))]);
        let b = dataset("ACME", vec![record("Shop", "100.02", (2025, 1, 10))]);
        let config = ReconciliationConfig::default()
            .with_tolerance(AmountTolerance::absolute(Decimal::from_str("0.05").unwrap()));

        let result = engine(config).reconcile(&a, &b).unwrap();
        assert_eq!(result.matched.len(), 1);
        assert_eq!(
            result.matched[0].amount_delta,
            Some(Decimal::from_str("-0.02").unwrap())
        );
        assert!(result.is_fully_matched());
    }

    #[test]
    fn test_date_window_decides_match_or_unmatched() {
        let a = dataset("ACME", vec![record("Shop", "50.00", (2025, 1, 10))]);
        let b = dataset("ACME", vec![record("Shop", "50.00", (2025, 1, 12))]);

        let wide = engine(ReconciliationConfig::default().with_date_window(3))
            .reconcile(&a, &b)
            .unwrap();
        assert_eq!(wide.matched.len(), 1);
        assert_eq!(wide.matched[0].date_offset_days, Some(-2));

        let narrow = engine(ReconciliationConfig::default().with_date_window(1))
            .reconcile(&a, &b)
            .unwrap();
        assert!(narrow.matched.is_empty());
        assert!(narrow.variant.is_empty());
        assert_eq!(narrow.unmatched_left.len(), 1);
        assert_eq!(narrow.unmatched_right.len(), 1);
    }

    fn invoice(number: &str, amount: &str) -> CanonicalRecord {
        let mut fields = BTreeMap::new();
        fields.insert(
            "invoice_number".to_string(),
            FieldValue::Code(number.to_string()),
        );
        fields.insert("tax_id".to_string(), FieldValue::Code("100200300".to_string()));
        fields.insert(
            "amount".to_string(),
            FieldValue::Amount(Decimal::from_str(amount).unwrap()),
        );
        CanonicalRecord {
            record_key: composite_key(&fields, &["invoice_number".into(), "tax_id".into()]),
            source_layout_id: "TEST".to_string(),
            source_group: "ACME".to_string(),
            category: LayoutCategory::Invoice,
            row_index: 0,
            fields,
        }
    }

    #[test]
    fn test_same_invoice_with_different_amount_is_variant() {
        let mut a = Dataset::new("ACME", LayoutCategory::Invoice, "SALES");
        a.records = vec![invoice("INV-1", "1180.00"), invoice("INV-2", "500.00")];
        let mut b = Dataset::new("ACME", LayoutCategory::Invoice, "SALES");
        b.records = vec![invoice("INV-2", "500.00"), invoice("INV-1", "1000.00")];

        let result = engine(ReconciliationConfig::default()).reconcile(&a, &b).unwrap();
        assert_eq!(result.matched.len(), 1);
        assert_eq!(result.matched[0].left.index, 1);
        assert_eq!(result.matched[0].right.index, 0);

        assert_eq!(result.variant.len(), 1);
        let diff = &result.variant[0].diffs[0];
        assert_eq!(diff.field, "amount");
        assert_eq!(diff.amount_delta, Some(Decimal::from_str("180.00").unwrap()));
    }

    #[test]
    fn test_unmatched_on_both_sides() {
        let a = dataset(
            "ACME",
            vec![
                record("Shop", "10.00", (2025, 1, 1)),
                record("Landlord", "900.00", (2025, 1, 1)),
            ],
        );
        let b = dataset(
            "ACME",
            vec![
                record("Shop", "10.00", (2025, 1, 1)),
                record("Utility", "75.00", (2025, 1, 2)),
            ],
        );
        let result = engine(ReconciliationConfig::default()).reconcile(&a, &b).unwrap();
        assert_eq!(result.matched.len(), 1);
        assert_eq!(result.unmatched_left.len(), 1);
        assert_eq!(result.unmatched_left[0].index, 1);
        assert_eq!(result.unmatched_right.len(), 1);
        assert_eq!(result.unmatched_right[0].index, 1);
        assert_eq!(result.summary.difference, Decimal::from_str("825.00").unwrap());
    }

    #[test]
    fn test_closest_candidate_is_preferred() {
        let a = dataset("ACME", vec![record("Shop", "10.00", (2025, 1, 5))]);
        let b = dataset(
            "ACME",
            vec![
                record("Shop", "10.00", (2025, 1, 8)),
                record("Shop", "10.00", (2025, 1, 6)),
            ],
        );
        let config = ReconciliationConfig::default().with_date_window(5);
        let result = engine(config).reconcile(&a, &b).unwrap();
        assert_eq!(result.matched[0].right.index, 1);
        assert_eq!(result.unmatched_right[0].index, 0);
    }

    #[test]
    fn test_different_groups_are_rejected() {
        let a = dataset("ACME", vec![]);
        let b = dataset("GLOBEX", vec![]);
        let err = engine(ReconciliationConfig::default())
            .reconcile(&a, &b)
            .unwrap_err();
        assert!(matches!(err, ToolkitError::IncompatibleGroups { .. }));

        let mut config = ReconciliationConfig::default();
        config.allow_cross_group = true;
        assert!(engine(config).reconcile(&a, &b).is_ok());
    }

    #[test]
    fn test_different_categories_are_rejected_even_across_groups() {
        let a = dataset("ACME", vec![]);
        let b = Dataset::new("ACME", LayoutCategory::Invoice, "SALES");
        let mut config = ReconciliationConfig::default();
        config.allow_cross_group = true;
        let err = engine(config).reconcile(&a, &b).unwrap_err();
        assert!(matches!(
            err,
            ToolkitError::IncompatibleCategories {
                left: LayoutCategory::BankStatement,
                right: LayoutCategory::Invoice,
            }
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ReconciliationConfig::default().with_key_fields(Vec::<String>::new());
        assert!(matches!(
            ReconciliationEngine::new(config),
            Err(ToolkitError::InvalidReconciliationConfig { .. })
        ));
    }

    #[test]
    fn test_cross_scope_duplicates_span_both_datasets() {
        let a = dataset("ACME", vec![record("Shop", "10.00", (2025, 1, 1))]);
        let b = dataset(
            "ACME",
            vec![
                record("Shop", "10.00", (2025, 1, 1)),
                record("Shop", "10.00", (2025, 1, 1)),
            ],
        );

        let within = engine(ReconciliationConfig::default()).reconcile(&a, &b).unwrap();
        assert_eq!(within.duplicates.len(), 1);
        assert!(within.duplicates[0].members.iter().all(|m| m.dataset == 1));

        let cross = engine(
            ReconciliationConfig::default().with_duplicate_scope(DuplicateScope::Cross),
        )
        .reconcile(&a, &b)
        .unwrap();
        assert_eq!(cross.duplicates.len(), 1);
        assert_eq!(cross.duplicates[0].len(), 3);

        let disabled = engine(
            ReconciliationConfig::default().with_duplicate_scope(DuplicateScope::Disabled),
        )
        .reconcile(&a, &b)
        .unwrap();
        assert!(disabled.duplicates.is_empty());
    }
}
