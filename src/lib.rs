//! # Financial Data Toolkit
//!
//! A library for turning heterogeneous financial spreadsheets (invoices, bank statements,
//! VAT returns, payroll, trial balances) into typed canonical records, reconciling those
//! records across datasets and generating loan amortization schedules.
//!
//! ## Core Concepts
//!
//! - **Layout Signature**: Expected headers and column roles of one known spreadsheet format
//! - **Detection**: Weighted header scoring picks the layout a raw table follows
//! - **Canonical Record**: Typed fields (dates, decimal amounts, text, codes) plus a stable record key
//! - **Reconciliation**: Two datasets split into matched, variant and unmatched records
//! - **Amortization**: Per-period interest/principal split with exact balance continuity
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_data_toolkit::*;
//!
//! let table = RawTable::from_strings(
//!     &["Posting Date", "Value Date", "Description", "Debit", "Credit", "Balance"],
//!     &[["05/01/2025", "05/01/2025", "POS Purchase", "1000.00", "", "5000.00"]],
//! );
//!
//! let (detection, outcome) = detect_and_normalize(&table, "ACME")?;
//! let dataset = outcome.expect("layout detected").dataset;
//!
//! let config = ReconciliationConfig::default().with_date_window(3);
//! let result = reconcile(&dataset, &other_dataset, &config)?;
//! println!("{} matched", result.summary.matched);
//! ```

pub mod amortization;
pub mod catalog;
pub mod config;
pub mod detector;
pub mod duplicates;
pub mod error;
pub mod matching;
pub mod normalizer;
pub mod parsing;
pub mod portfolio;
pub mod reconciliation;
pub mod registry;
pub mod schema;
pub mod text;
pub mod utils;

pub use amortization::{
    generate_schedule, verify_schedule, AmortizationEngine, AmortizationSchedule,
    EqualInstallment, EqualPrincipal, InterestOnly, LoanTerms, PeriodContext, PeriodUnit,
    Periodicity, RepaymentMethod, RepaymentMethodKind, ScheduleEntry, ScheduleFlag,
    ScheduleVerification, ScheduleViolation,
};
pub use config::{
    AmountTolerance, DetectorConfig, DuplicateScope, ReconciliationConfig, ToolkitConfig,
};
pub use detector::{Detection, FormatDetector, LayoutScore, UnknownReason};
pub use duplicates::{
    annotate_duplicates, ClusterMember, DuplicateCluster, DuplicateDetector, DuplicateReport,
    DuplicateStatus, DuplicateSummary,
};
pub use error::{Result, RowParseError, ToolkitError};
pub use matching::{composite_key, FieldDiff};
pub use normalizer::{NormalizationOutcome, Normalizer};
pub use portfolio::{outstanding_balance, LoanPortfolio, PortfolioSummary, ScheduleSummary};
pub use reconciliation::{
    MatchedPair, ReconciliationEngine, ReconciliationResult, ReconciliationSummary, RecordRef,
    VariantPair,
};
pub use registry::{default_registry, SchemaRegistry};
pub use schema::*;

use log::{info, warn};

/// Detects the layout of `table` against the built-in registry.
pub fn detect(table: &RawTable) -> Result<Detection> {
    detect_with(default_registry()?, table, &DetectorConfig::default())
}

pub fn detect_with(
    registry: &SchemaRegistry,
    table: &RawTable,
    config: &DetectorConfig,
) -> Result<Detection> {
    let detector = FormatDetector::with_config(registry, config.clone())?;
    Ok(detector.detect(table))
}

/// Normalizes `table` as the built-in layout `layout_id`.
pub fn normalize(
    table: &RawTable,
    layout_id: &str,
    source_group: &str,
) -> Result<NormalizationOutcome> {
    normalize_with(
        default_registry()?,
        table,
        layout_id,
        source_group,
        &DetectorConfig::default(),
    )
}

/// Normalizes against `registry`, searching at most `config.header_scan_rows` data rows
/// for the header row.
pub fn normalize_with(
    registry: &SchemaRegistry,
    table: &RawTable,
    layout_id: &str,
    source_group: &str,
    config: &DetectorConfig,
) -> Result<NormalizationOutcome> {
    Normalizer::with_config(registry, config).normalize(table, layout_id, source_group)
}

/// Detects the layout and, when one is accepted, normalizes the table with the header
/// row detection settled on.
pub fn detect_and_normalize(
    table: &RawTable,
    source_group: &str,
) -> Result<(Detection, Option<NormalizationOutcome>)> {
    let registry = default_registry()?;
    let detection = detect_with(registry, table, &DetectorConfig::default())?;

    let outcome = match &detection {
        Detection::Detected {
            layout_id,
            header_row,
            ..
        } => {
            info!("Normalizing table as '{}' for group '{}'", layout_id, source_group);
            Some(Normalizer::new(registry).normalize_at(
                table,
                layout_id,
                source_group,
                *header_row,
            )?)
        }
        Detection::Unknown { reason } => {
            warn!("Table not normalized, unknown format: {:?}", reason);
            None
        }
    };

    Ok((detection, outcome))
}

pub fn reconcile(
    left: &Dataset,
    right: &Dataset,
    config: &ReconciliationConfig,
) -> Result<ReconciliationResult> {
    ReconciliationEngine::new(config.clone())?.reconcile(left, right)
}

pub fn detect_duplicates(dataset: &Dataset, config: &ReconciliationConfig) -> Result<DuplicateReport> {
    Ok(DuplicateDetector::new(config.clone())?.detect(dataset))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank_table(rows: &[[&str; 6]]) -> RawTable {
        RawTable::from_strings(
            &["Posting Date", "Value Date", "Description", "Debit", "Credit", "Balance"],
            rows,
        )
    }

    #[test]
    fn test_end_to_end_detect_normalize_reconcile() {
        let left = bank_table(&[
            ["05/01/2025", "05/01/2025", "Supplier A", "1000.00", "", "4000.00"],
            ["06/01/2025", "06/01/2025", "Client B", "", "250.00", "4250.00"],
        ]);
        let right = bank_table(&[
            ["07/01/2025", "05/01/2025", "Supplier A", "1000.00", "", "4000.00"],
            ["06/01/2025", "06/01/2025", "Client B", "", "250.00", "4250.00"],
        ]);

        let (detection, outcome) = detect_and_normalize(&left, "ACME").unwrap();
        assert_eq!(detection.layout_id(), Some("BK BANK STATEMENT V01"));
        let a = outcome.unwrap().dataset;
        let (_, outcome) = detect_and_normalize(&right, "ACME").unwrap();
        let b = outcome.unwrap().dataset;

        let config = ReconciliationConfig::default().with_date_window(3);
        let result = reconcile(&a, &b, &config).unwrap();
        assert_eq!(result.matched.len(), 2);
        assert!(result.is_fully_matched());
    }

    #[test]
    fn test_normalize_with_honours_header_scan_rows() {
        let table = RawTable::from_strings(
            &["I&M Bank Rwanda", "", "", "", ""],
            &[
                vec!["Account statement", "", "", "", ""],
                vec!["Tran Date", "Particulars", "Debit Amount", "Credit Amount", "Book Balance"],
                vec!["2025-01-05", "Salary", "", "500", "500"],
            ],
        );
        let registry = default_registry().unwrap();

        let outcome = normalize(&table, "I&M BANK STATEMENT V01", "ACME").unwrap();
        assert_eq!(outcome.header_row, Some(1));

        let shallow = DetectorConfig {
            header_scan_rows: 1,
            ..DetectorConfig::default()
        };
        let err = normalize_with(registry, &table, "I&M BANK STATEMENT V01", "ACME", &shallow)
            .unwrap_err();
        assert!(matches!(err, ToolkitError::MissingRequiredColumn { .. }));
    }

    #[test]
    fn test_unknown_table_is_not_normalized() {
        let table = RawTable::from_strings(&["Colour", "Shape"], &[["red", "circle"]]);
        let (detection, outcome) = detect_and_normalize(&table, "ACME").unwrap();
        assert!(!detection.is_detected());
        assert!(outcome.is_none());
    }
}
