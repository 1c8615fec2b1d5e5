use log::{debug, info, warn};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::config::DetectorConfig;
use crate::detector::ObservedHeaders;
use crate::error::{Result, RowParseError, ToolkitError};
use crate::matching::composite_key;
use crate::parsing::{parse_amount_cell, parse_date_cell};
use crate::registry::SchemaRegistry;
use crate::schema::{
    CanonicalRecord, CellValue, ColumnRole, Dataset, FieldKind, FieldValue, LayoutSignature,
    RawTable,
};
use crate::text::clean_cell_text;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Result of normalizing one raw table: the typed dataset plus the rows that were
/// excluded, reported as warnings.
#[derive(Debug, Clone)]
pub struct NormalizationOutcome {
    pub dataset: Dataset,
    pub warnings: Vec<RowParseError>,
    /// Data row used as header row, when the declared headers were not usable.
    pub header_row: Option<usize>,
    /// Blank rows and repeated header rows that were skipped silently.
    pub skipped_rows: usize,
}

impl NormalizationOutcome {
    pub fn excluded_rows(&self) -> usize {
        let mut rows: Vec<usize> = self.warnings.iter().map(|w| w.row_index).collect();
        rows.dedup();
        rows.len()
    }
}

pub struct Normalizer<'a> {
    registry: &'a SchemaRegistry,
    header_scan_rows: usize,
}

impl<'a> Normalizer<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self {
            registry,
            header_scan_rows: DetectorConfig::default().header_scan_rows,
        }
    }

    /// Takes the header search depth from `config`.
    pub fn with_config(registry: &'a SchemaRegistry, config: &DetectorConfig) -> Self {
        Self::new(registry).with_header_scan_rows(config.header_scan_rows)
    }

    pub fn with_header_scan_rows(mut self, rows: usize) -> Self {
        self.header_scan_rows = rows;
        self
    }

    /// Normalizes `table` as layout `layout_id`, locating the header row itself.
    pub fn normalize(
        &self,
        table: &RawTable,
        layout_id: &str,
        source_group: &str,
    ) -> Result<NormalizationOutcome> {
        let signature = self.registry.require(layout_id)?;
        let (header_row, assignment) = self.locate_columns(table, signature)?;
        Ok(self.convert_rows(table, signature, source_group, header_row, &assignment))
    }

    /// Normalizes using a header row already chosen by detection.
    pub fn normalize_at(
        &self,
        table: &RawTable,
        layout_id: &str,
        source_group: &str,
        header_row: Option<usize>,
    ) -> Result<NormalizationOutcome> {
        let signature = self.registry.require(layout_id)?;
        let observed = ObservedHeaders::new(table.header_cells(header_row));
        let assignment = observed.assign(signature);
        check_required(signature, &assignment)?;
        Ok(self.convert_rows(table, signature, source_group, header_row, &assignment))
    }

    fn locate_columns(
        &self,
        table: &RawTable,
        signature: &LayoutSignature,
    ) -> Result<(Option<usize>, Vec<Option<usize>>)> {
        let declared = ObservedHeaders::new(&table.headers).assign(signature);
        let declared_check = check_required(signature, &declared);
        if declared_check.is_ok() {
            return Ok((None, declared));
        }

        for idx in 0..table.rows.len().min(self.header_scan_rows) {
            let assignment = ObservedHeaders::new(&table.rows[idx]).assign(signature);
            if check_required(signature, &assignment).is_ok() {
                debug!("Layout '{}': header row found at data row {}", signature.id, idx);
                return Ok((Some(idx), assignment));
            }
        }

        declared_check.map(|_| (None, declared))
    }

    fn convert_rows(
        &self,
        table: &RawTable,
        signature: &LayoutSignature,
        source_group: &str,
        header_row: Option<usize>,
        assignment: &[Option<usize>],
    ) -> NormalizationOutcome {
        let header_set = ObservedHeaders::new(table.header_cells(header_row));
        let key_fields = signature.key_fields();
        let has_amount_column = assignment
            .iter()
            .zip(&signature.columns)
            .any(|(slot, column)| slot.is_some() && column.role == ColumnRole::Amount);

        let mut dataset = Dataset::new(
            source_group,
            signature.category,
            signature.data_group.clone(),
        );
        let mut warnings = Vec::new();
        let mut skipped_rows = 0;

        let start = table.first_data_row(header_row);
        for (row_index, row) in table.rows.iter().enumerate().skip(start) {
            if row.iter().all(CellValue::is_blank) {
                skipped_rows += 1;
                continue;
            }
            if ObservedHeaders::new(row).same_headers(&header_set) {
                skipped_rows += 1;
                continue;
            }

            let mut fields = BTreeMap::new();
            let mut row_errors = Vec::new();

            for (column, slot) in signature.columns.iter().zip(assignment) {
                let Some(col_idx) = slot else { continue };
                let cell = row.get(*col_idx).unwrap_or(&EMPTY_CELL);
                match convert_cell(cell, column.role, signature, column.required) {
                    Ok(Some(value)) => {
                        fields.insert(column.role.canonical_name().to_string(), value);
                    }
                    Ok(None) => {}
                    Err(reason) => row_errors.push(RowParseError {
                        row_index,
                        field: column.role.canonical_name().to_string(),
                        raw_value: cell.to_raw_string(),
                        reason,
                    }),
                }
            }

            if !row_errors.is_empty() {
                warnings.extend(row_errors);
                continue;
            }

            if !has_amount_column {
                derive_amount(&mut fields);
            }

            dataset.records.push(CanonicalRecord {
                record_key: composite_key(&fields, &key_fields),
                source_layout_id: signature.id.clone(),
                source_group: source_group.to_string(),
                category: signature.category,
                row_index,
                fields,
            });
        }

        let outcome = NormalizationOutcome {
            dataset,
            warnings,
            header_row,
            skipped_rows,
        };
        if !outcome.warnings.is_empty() {
            warn!(
                "Layout '{}': {} rows excluded, {} cell errors",
                signature.id,
                outcome.excluded_rows(),
                outcome.warnings.len()
            );
        }
        info!(
            "Normalized {} records from layout '{}' for group '{}'",
            outcome.dataset.len(),
            signature.id,
            source_group
        );
        outcome
    }
}

fn check_required(signature: &LayoutSignature, assignment: &[Option<usize>]) -> Result<()> {
    for (column, slot) in signature.columns.iter().zip(assignment) {
        if column.required && slot.is_none() {
            return Err(ToolkitError::MissingRequiredColumn {
                layout_id: signature.id.clone(),
                role: column.role,
            });
        }
    }
    Ok(())
}

fn convert_cell(
    cell: &CellValue,
    role: ColumnRole,
    signature: &LayoutSignature,
    required: bool,
) -> std::result::Result<Option<FieldValue>, String> {
    if let CellValue::Error(e) = cell {
        return Err(format!("spreadsheet error {e}"));
    }
    if cell.is_blank() {
        // Blank debit, credit or balance cells are normal; the primary date and amount are not.
        return match role {
            ColumnRole::Date | ColumnRole::Amount if required => Err("missing value".to_string()),
            _ => Ok(None),
        };
    }

    let value = match role.kind() {
        FieldKind::Date => FieldValue::Date(parse_date_cell(cell, signature.locale.date_order())?),
        FieldKind::Amount => FieldValue::Amount(parse_amount_cell(cell, signature.locale)?),
        FieldKind::Text => {
            let text = clean_cell_text(&cell.to_raw_string());
            if text.is_empty() {
                return Ok(None);
            }
            FieldValue::Text(text)
        }
        FieldKind::Code => {
            let code = clean_cell_text(&cell.to_raw_string());
            if code.is_empty() {
                return Ok(None);
            }
            FieldValue::Code(code)
        }
    };
    Ok(Some(value))
}

/// Statements with separate debit and credit columns get a signed `amount`: credits
/// positive, debits negative.
fn derive_amount(fields: &mut BTreeMap<String, FieldValue>) {
    let debit = fields.get("debit").and_then(FieldValue::as_amount);
    let credit = fields.get("credit").and_then(FieldValue::as_amount);
    if debit.is_none() && credit.is_none() {
        return;
    }
    let amount = credit.unwrap_or(Decimal::ZERO) - debit.unwrap_or(Decimal::ZERO);
    fields.insert("amount".to_string(), FieldValue::Amount(amount));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn registry() -> SchemaRegistry {
        SchemaRegistry::with_builtin_layouts().unwrap()
    }

    #[test]
    fn test_normalize_bank_statement_with_debit_credit() {
        let registry = registry();
        let raw = RawTable::from_strings(
            &["Posting Date", "Value Date", "Description", "Debit", "Credit", "Balance"],
            &[
                vec!["05/01/2025", "05/01/2025", "Opening deposit", "", "1,000.00", "1,000.00"],
                vec!["06/01/2025", "07/01/2025", "Card  payment", "250.50", "", "749.50"],
            ],
        );
        let outcome = Normalizer::new(&registry)
            .normalize(&raw, "BK BANK STATEMENT V01", "Acme Group")
            .unwrap();

        assert!(outcome.warnings.is_empty());
        let records = &outcome.dataset.records;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].amount("amount"), Some(dec("1000.00")));
        assert_eq!(records[1].amount("amount"), Some(dec("-250.50")));
        assert_eq!(
            records[1].date("date"),
            Some(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap())
        );
        assert_eq!(
            records[1].get("description"),
            Some(&FieldValue::Text("Card payment".to_string()))
        );
        assert_eq!(outcome.dataset.source_group, "Acme Group");
        assert_eq!(outcome.dataset.data_group, "BANK");
    }

    #[test]
    fn test_unparseable_row_is_excluded_with_warning() {
        let registry = registry();
        let raw = RawTable::from_strings(
            &["Invoice No", "Sales Date", "Customer TIN", "Total Amount", "VAT"],
            &[
                vec!["INV-1", "2025-01-05", "101", "1180", "180"],
                vec!["INV-2", "not a date", "102", "590", "90"],
                vec!["INV-3", "2025-01-07", "103", "abc", "18"],
            ],
        );
        let outcome = Normalizer::new(&registry)
            .normalize(&raw, "EBM SALES V20", "Acme Group")
            .unwrap();

        assert_eq!(outcome.dataset.len(), 1);
        assert_eq!(outcome.warnings.len(), 2);
        assert_eq!(outcome.warnings[0].row_index, 1);
        assert_eq!(outcome.warnings[0].field, "date");
        assert_eq!(outcome.warnings[0].raw_value, "not a date");
        assert_eq!(outcome.warnings[1].field, "amount");
        assert_eq!(outcome.excluded_rows(), 2);
    }

    #[test]
    fn test_missing_required_column() {
        let registry = registry();
        let raw = RawTable::from_strings(
            &["Invoice No", "Sales Date", "Total Amount", "VAT"],
            &[vec!["INV-1", "2025-01-05", "1180", "180"]],
        );
        let err = Normalizer::new(&registry)
            .normalize(&raw, "EBM SALES V20", "G")
            .unwrap_err();
        match err {
            ToolkitError::MissingRequiredColumn { layout_id, role } => {
                assert_eq!(layout_id, "EBM SALES V20");
                assert_eq!(role, ColumnRole::TaxId);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_layout() {
        let registry = registry();
        let err = Normalizer::new(&registry)
            .normalize(&RawTable::default(), "NO SUCH LAYOUT", "G")
            .unwrap_err();
        assert!(matches!(err, ToolkitError::UnknownLayout(_)));
    }

    #[test]
    fn test_record_key_ignores_column_order() {
        let registry = registry();
        let a = RawTable::from_strings(
            &["Invoice No", "Sales Date", "Customer TIN", "Total Amount", "VAT"],
            &[vec!["INV-1", "2025-01-05", "101", "1180", "180"]],
        );
        let b = RawTable::from_strings(
            &["VAT", "Total Amount", "Customer TIN", "Sales Date", "Invoice No"],
            &[vec!["180", "1180.00", "101", "05/01/2025", "inv-1"]],
        );
        let normalizer = Normalizer::new(&registry);
        let ka = normalizer.normalize(&a, "EBM SALES V20", "G").unwrap();
        let kb = normalizer.normalize(&b, "EBM SALES V20", "G").unwrap();
        assert_eq!(ka.dataset.records[0].record_key, kb.dataset.records[0].record_key);
        assert_eq!(
            ka.dataset.records[0].record_key,
            "invoice_number=inv-1|tax_id=101"
        );
    }

    #[test]
    fn test_french_locale_amounts_and_dates() {
        let registry = registry();
        let raw = RawTable::from_strings(
            &["Date Opération", "Date Valeur", "Libellé", "Débit", "Crédit", "Solde"],
            &[vec!["03/04/2025", "03/04/2025", "Virement reçu", "", "1 234,56", "1 234,56"]],
        );
        let outcome = Normalizer::new(&registry)
            .normalize(&raw, "BPR BANK STATEMENT V01", "G")
            .unwrap();
        let record = &outcome.dataset.records[0];
        assert_eq!(record.amount("credit"), Some(dec("1234.56")));
        assert_eq!(record.amount("amount"), Some(dec("1234.56")));
        assert_eq!(
            record.date("date"),
            Some(NaiveDate::from_ymd_opt(2025, 4, 3).unwrap())
        );
    }

    #[test]
    fn test_header_row_below_title_and_blank_rows_skipped() {
        let registry = registry();
        let raw = RawTable::from_strings(
            &["I&M Bank Rwanda", "", "", "", ""],
            &[
                vec!["Account statement", "", "", "", ""],
                vec!["Tran Date", "Particulars", "Debit Amount", "Credit Amount", "Book Balance"],
                vec!["2025-01-05", "Salary", "", "500", "500"],
                vec!["", "", "", "", ""],
                vec!["Tran Date", "Particulars", "Debit Amount", "Credit Amount", "Book Balance"],
                vec!["2025-01-06", "Rent", "200", "", "300"],
            ],
        );
        let outcome = Normalizer::new(&registry)
            .normalize(&raw, "I&M BANK STATEMENT V01", "G")
            .unwrap();
        assert_eq!(outcome.header_row, Some(1));
        assert_eq!(outcome.dataset.len(), 2);
        assert_eq!(outcome.skipped_rows, 2);
        assert_eq!(outcome.dataset.records[1].row_index, 5);
    }

    #[test]
    fn test_native_cells_and_cleaning() {
        let registry = registry();
        let raw = RawTable::new(
            vec!["Invoice No".into(), "Sales Date".into(), "Customer TIN".into(), "Customer Name".into(), "Total Amount".into(), "VAT".into()],
            vec![vec![
                CellValue::Text("INV-9".to_string()),
                CellValue::Number(45662.0),
                CellValue::Number(101234567.0),
                CellValue::Text("ACME\u{0008}LTD\u{00A0}".to_string()),
                CellValue::Number(1180.5),
                CellValue::Number(180.0),
            ]],
        );
        let outcome = Normalizer::new(&registry)
            .normalize(&raw, "EBM SALES V20", "G")
            .unwrap();
        let record = &outcome.dataset.records[0];
        assert_eq!(
            record.date("date"),
            Some(NaiveDate::from_ymd_opt(2025, 1, 5).unwrap())
        );
        assert_eq!(record.get("tax_id"), Some(&FieldValue::Code("101234567".to_string())));
        assert_eq!(
            record.get("counterparty"),
            Some(&FieldValue::Text("ACME<|>LTD".to_string()))
        );
        assert_eq!(record.amount("amount"), Some(dec("1180.5")));
    }

    #[test]
    fn test_spreadsheet_error_cell_excludes_row() {
        let registry = registry();
        let raw = RawTable::new(
            vec!["Account Code".into(), "Account Name".into(), "Debit".into(), "Credit".into()],
            vec![vec![
                CellValue::Text("1000".to_string()),
                CellValue::Text("Cash".to_string()),
                CellValue::Error("#REF!".to_string()),
                CellValue::Empty,
            ]],
        );
        let outcome = Normalizer::new(&registry)
            .normalize(&raw, "TRIAL BALANCE V01", "G")
            .unwrap();
        assert!(outcome.dataset.is_empty());
        assert_eq!(outcome.warnings[0].raw_value, "#REF!");
    }
}
