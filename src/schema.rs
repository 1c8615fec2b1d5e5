use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{Result, ToolkitError};
use crate::text::normalize_header;

/// A spreadsheet cell as handed over by the file-loading collaborator.
///
/// Cells are resolved into typed [`FieldValue`]s once, during normalization, and never
/// travel past that boundary untyped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    /// Spreadsheet error marker such as `#N/A` or `#REF!`.
    Error(String),
}

impl CellValue {
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Textual rendering used for header matching and error reporting.
    pub fn to_raw_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::Error(e) => e.clone(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::from(value.as_str())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

/// An uploaded sheet: an ordered header row plus ordered data rows of untyped cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<CellValue>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(headers: Vec<CellValue>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { headers, rows }
    }

    /// Builds a table of text cells; empty strings become [`CellValue::Empty`].
    pub fn from_strings<H, R, S>(headers: &[H], rows: &[R]) -> Self
    where
        H: AsRef<str>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        Self {
            headers: headers.iter().map(|h| CellValue::from(h.as_ref())).collect(),
            rows: rows
                .iter()
                .map(|r| {
                    r.as_ref()
                        .iter()
                        .map(|c| CellValue::from(c.as_ref()))
                        .collect()
                })
                .collect(),
        }
    }

    /// The header row in effect: the declared headers, or a data row promoted to header.
    pub fn header_cells(&self, header_row: Option<usize>) -> &[CellValue] {
        match header_row {
            None => &self.headers,
            Some(idx) => self.rows.get(idx).map(|r| r.as_slice()).unwrap_or(&[]),
        }
    }

    /// Index of the first data row below the header row in effect.
    pub fn first_data_row(&self, header_row: Option<usize>) -> usize {
        header_row.map(|idx| idx + 1).unwrap_or(0)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum LayoutCategory {
    Invoice,
    BankStatement,
    VatReturn,
    Payroll,
    TrialBalance,
    Custom,
}

impl LayoutCategory {
    /// Fields combined into a record's `record_key` when the layout declares no override.
    pub fn default_key_fields(&self) -> &'static [&'static str] {
        match self {
            LayoutCategory::Invoice => &["invoice_number", "tax_id"],
            LayoutCategory::BankStatement => &["date", "amount", "counterparty"],
            LayoutCategory::VatReturn => &["tax_id", "period"],
            LayoutCategory::Payroll => &["employee_id", "period"],
            LayoutCategory::TrialBalance => &["account_code"],
            LayoutCategory::Custom => &["date", "amount", "description"],
        }
    }
}

impl fmt::Display for LayoutCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayoutCategory::Invoice => "invoice",
            LayoutCategory::BankStatement => "bank_statement",
            LayoutCategory::VatReturn => "vat_return",
            LayoutCategory::Payroll => "payroll",
            LayoutCategory::TrialBalance => "trial_balance",
            LayoutCategory::Custom => "custom",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    DayFirst,
    MonthFirst,
    /// Both orders are tried; disagreeing results are reported as ambiguous.
    Any,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    English,
    EnglishUs,
    French,
    Kinyarwanda,
    Unspecified,
}

impl Locale {
    pub fn date_order(&self) -> DateOrder {
        match self {
            Locale::EnglishUs => DateOrder::MonthFirst,
            Locale::English | Locale::French | Locale::Kinyarwanda => DateOrder::DayFirst,
            Locale::Unspecified => DateOrder::Any,
        }
    }

    pub fn decimal_separator(&self) -> char {
        match self {
            Locale::French => ',',
            _ => '.',
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::Unspecified
    }
}

/// The kind of typed value a column resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Date,
    Amount,
    Text,
    Code,
}

/// The business meaning of a source column. Each role maps to one canonical field name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Date,
    ValueDate,
    InvoiceNumber,
    ReceiptNumber,
    SdcId,
    TaxId,
    Counterparty,
    Description,
    ItemName,
    Amount,
    NetAmount,
    VatAmount,
    InputVat,
    OutputVat,
    Debit,
    Credit,
    Balance,
    Quantity,
    UnitPrice,
    Currency,
    Reference,
    AccountNumber,
    AccountCode,
    AccountName,
    EmployeeId,
    EmployeeName,
    GrossPay,
    NetPay,
    PayeTax,
    PensionContribution,
    Period,
    TaxType,
    Status,
}

impl ColumnRole {
    pub const ALL: &'static [ColumnRole] = &[
        ColumnRole::Date,
        ColumnRole::ValueDate,
        ColumnRole::InvoiceNumber,
        ColumnRole::ReceiptNumber,
        ColumnRole::SdcId,
        ColumnRole::TaxId,
        ColumnRole::Counterparty,
        ColumnRole::Description,
        ColumnRole::ItemName,
        ColumnRole::Amount,
        ColumnRole::NetAmount,
        ColumnRole::VatAmount,
        ColumnRole::InputVat,
        ColumnRole::OutputVat,
        ColumnRole::Debit,
        ColumnRole::Credit,
        ColumnRole::Balance,
        ColumnRole::Quantity,
        ColumnRole::UnitPrice,
        ColumnRole::Currency,
        ColumnRole::Reference,
        ColumnRole::AccountNumber,
        ColumnRole::AccountCode,
        ColumnRole::AccountName,
        ColumnRole::EmployeeId,
        ColumnRole::EmployeeName,
        ColumnRole::GrossPay,
        ColumnRole::NetPay,
        ColumnRole::PayeTax,
        ColumnRole::PensionContribution,
        ColumnRole::Period,
        ColumnRole::TaxType,
        ColumnRole::Status,
    ];

    pub fn from_canonical_name(name: &str) -> Option<ColumnRole> {
        Self::ALL
            .iter()
            .copied()
            .find(|role| role.canonical_name() == name)
    }

    pub fn canonical_name(&self) -> &'static str {
        match self {
            ColumnRole::Date => "date",
            ColumnRole::ValueDate => "value_date",
            ColumnRole::InvoiceNumber => "invoice_number",
            ColumnRole::ReceiptNumber => "receipt_number",
            ColumnRole::SdcId => "sdc_id",
            ColumnRole::TaxId => "tax_id",
            ColumnRole::Counterparty => "counterparty",
            ColumnRole::Description => "description",
            ColumnRole::ItemName => "item_name",
            ColumnRole::Amount => "amount",
            ColumnRole::NetAmount => "net_amount",
            ColumnRole::VatAmount => "vat_amount",
            ColumnRole::InputVat => "input_vat",
            ColumnRole::OutputVat => "output_vat",
            ColumnRole::Debit => "debit",
            ColumnRole::Credit => "credit",
            ColumnRole::Balance => "balance",
            ColumnRole::Quantity => "quantity",
            ColumnRole::UnitPrice => "unit_price",
            ColumnRole::Currency => "currency",
            ColumnRole::Reference => "reference",
            ColumnRole::AccountNumber => "account_number",
            ColumnRole::AccountCode => "account_code",
            ColumnRole::AccountName => "account_name",
            ColumnRole::EmployeeId => "employee_id",
            ColumnRole::EmployeeName => "employee_name",
            ColumnRole::GrossPay => "gross_pay",
            ColumnRole::NetPay => "net_pay",
            ColumnRole::PayeTax => "paye_tax",
            ColumnRole::PensionContribution => "pension_contribution",
            ColumnRole::Period => "period",
            ColumnRole::TaxType => "tax_type",
            ColumnRole::Status => "status",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            ColumnRole::Date | ColumnRole::ValueDate => FieldKind::Date,
            ColumnRole::Amount
            | ColumnRole::NetAmount
            | ColumnRole::VatAmount
            | ColumnRole::InputVat
            | ColumnRole::OutputVat
            | ColumnRole::Debit
            | ColumnRole::Credit
            | ColumnRole::Balance
            | ColumnRole::Quantity
            | ColumnRole::UnitPrice
            | ColumnRole::GrossPay
            | ColumnRole::NetPay
            | ColumnRole::PayeTax
            | ColumnRole::PensionContribution => FieldKind::Amount,
            ColumnRole::Counterparty
            | ColumnRole::Description
            | ColumnRole::ItemName
            | ColumnRole::AccountName
            | ColumnRole::EmployeeName => FieldKind::Text,
            ColumnRole::InvoiceNumber
            | ColumnRole::ReceiptNumber
            | ColumnRole::SdcId
            | ColumnRole::TaxId
            | ColumnRole::Currency
            | ColumnRole::Reference
            | ColumnRole::AccountNumber
            | ColumnRole::AccountCode
            | ColumnRole::EmployeeId
            | ColumnRole::Period
            | ColumnRole::TaxType
            | ColumnRole::Status => FieldKind::Code,
        }
    }

    /// Detection weight used when the detector config does not override it.
    /// Identifying fields outweigh monetary/date fields, which outweigh descriptive ones.
    pub fn default_weight(&self) -> f64 {
        match self {
            ColumnRole::InvoiceNumber
            | ColumnRole::ReceiptNumber
            | ColumnRole::SdcId
            | ColumnRole::TaxId
            | ColumnRole::Reference
            | ColumnRole::AccountNumber
            | ColumnRole::AccountCode
            | ColumnRole::EmployeeId => 3.0,
            role if matches!(role.kind(), FieldKind::Date | FieldKind::Amount) => 2.0,
            _ => 1.0,
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnSpec {
    pub role: ColumnRole,
    /// Header spellings for this column; the first is the layout's own spelling.
    pub headers: Vec<String>,
    pub required: bool,
}

impl ColumnSpec {
    pub fn primary_header(&self) -> &str {
        self.headers.first().map(|h| h.as_str()).unwrap_or("")
    }
}

/// Descriptor of one known source layout, registered once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LayoutSignature {
    pub id: String,
    pub category: LayoutCategory,
    pub locale: Locale,
    /// Business data group, e.g. `SALES`, `BANK`, `PAYROLL`.
    pub data_group: String,
    /// Financial statement the data feeds, e.g. `INCOME STATEMENT`.
    pub financial_statement_group: String,
    pub columns: Vec<ColumnSpec>,
    /// Overrides the category's default key fields for `record_key` derivation.
    #[serde(default)]
    pub key_fields: Option<Vec<String>>,
}

impl LayoutSignature {
    pub fn required_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| c.required)
    }

    pub fn required_count(&self) -> usize {
        self.required_columns().count()
    }

    /// Normalized own-spelling headers of every column. Two registered signatures may
    /// never share the same set.
    pub fn header_set(&self) -> BTreeSet<String> {
        self.columns
            .iter()
            .map(|c| normalize_header(c.primary_header()))
            .collect()
    }

    pub fn key_fields(&self) -> Vec<String> {
        match &self.key_fields {
            Some(fields) => fields.clone(),
            None => self
                .category
                .default_key_fields()
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }
}

/// A typed canonical value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Date(NaiveDate),
    Amount(Decimal),
    Text(String),
    Code(String),
}

impl FieldValue {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_amount(&self) -> Option<Decimal> {
        match self {
            FieldValue::Amount(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Code(s) => Some(s),
            _ => None,
        }
    }

    /// Representation used inside composite keys: ISO dates, trailing-zero-free amounts,
    /// case- and spacing-insensitive text.
    pub fn key_repr(&self) -> String {
        match self {
            FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            FieldValue::Amount(a) => a.normalize().to_string(),
            FieldValue::Text(s) | FieldValue::Code(s) => crate::text::normalize_key_text(s),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Amount(a) => write!(f, "{a}"),
            FieldValue::Text(s) | FieldValue::Code(s) => write!(f, "{s}"),
        }
    }
}

/// One normalized business record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub record_key: String,
    pub source_layout_id: String,
    pub source_group: String,
    pub category: LayoutCategory,
    /// Index of the originating row within the raw table's data rows.
    pub row_index: usize,
    pub fields: BTreeMap<String, FieldValue>,
}

impl CanonicalRecord {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn amount(&self, field: &str) -> Option<Decimal> {
        self.fields.get(field).and_then(|v| v.as_amount())
    }

    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        self.fields.get(field).and_then(|v| v.as_date())
    }
}

/// Ordered records of one group and category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub source_group: String,
    pub category: LayoutCategory,
    pub data_group: String,
    pub records: Vec<CanonicalRecord>,
}

impl Dataset {
    pub fn new(
        source_group: impl Into<String>,
        category: LayoutCategory,
        data_group: impl Into<String>,
    ) -> Self {
        Self {
            source_group: source_group.into(),
            category,
            data_group: data_group.into(),
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CanonicalRecord> {
        self.records.iter()
    }

    /// Appends the records of another normalized table of the same group and category.
    pub fn append(&mut self, other: Dataset) -> Result<()> {
        if other.category != self.category {
            return Err(ToolkitError::IncompatibleCategories {
                left: self.category,
                right: other.category,
            });
        }
        if other.source_group != self.source_group {
            return Err(ToolkitError::IncompatibleGroups {
                left: self.source_group.clone(),
                right: other.source_group.clone(),
            });
        }
        self.records.extend(other.records);
        Ok(())
    }

    /// Sum of an amount field over all records carrying it.
    pub fn total(&self, field: &str) -> Decimal {
        self.records.iter().filter_map(|r| r.amount(field)).sum()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn record(group: &str, amount: &str) -> CanonicalRecord {
        let mut fields = BTreeMap::new();
        fields.insert(
            "amount".to_string(),
            FieldValue::Amount(Decimal::from_str(amount).unwrap()),
        );
        CanonicalRecord {
            record_key: format!("amount={amount}"),
            source_layout_id: "TEST".to_string(),
            source_group: group.to_string(),
            category: LayoutCategory::BankStatement,
            row_index: 0,
            fields,
        }
    }

    #[test]
    fn test_cell_value_blankness() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::from("   ").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
        assert_eq!(CellValue::from(""), CellValue::Empty);
    }

    #[test]
    fn test_key_repr_is_format_insensitive() {
        let a = FieldValue::Amount(Decimal::from_str("1000.00").unwrap());
        let b = FieldValue::Amount(Decimal::from_str("1000").unwrap());
        assert_eq!(a.key_repr(), b.key_repr());

        let t1 = FieldValue::Text("  ACME   Ltd ".to_string());
        let t2 = FieldValue::Text("acme ltd".to_string());
        assert_eq!(t1.key_repr(), t2.key_repr());
    }

    #[test]
    fn test_dataset_append_and_total() {
        let mut left = Dataset::new("Group A", LayoutCategory::BankStatement, "BANK");
        left.records.push(record("Group A", "10.50"));

        let mut right = Dataset::new("Group A", LayoutCategory::BankStatement, "BANK");
        right.records.push(record("Group A", "4.50"));

        left.append(right).unwrap();
        assert_eq!(left.len(), 2);
        assert_eq!(left.total("amount"), Decimal::from_str("15.00").unwrap());

        let other = Dataset::new("Group B", LayoutCategory::BankStatement, "BANK");
        assert!(matches!(
            left.append(other),
            Err(ToolkitError::IncompatibleGroups { .. })
        ));
    }

    #[test]
    fn test_dataset_json_preserves_precision() {
        let mut dataset = Dataset::new("Group A", LayoutCategory::BankStatement, "BANK");
        dataset.records.push(record("Group A", "1234.5678"));
        let json = dataset.to_json().unwrap();
        let restored = Dataset::from_json(&json).unwrap();
        assert_eq!(
            restored.records[0].amount("amount"),
            Some(Decimal::from_str("1234.5678").unwrap())
        );
    }

    #[test]
    fn test_canonical_names_round_trip() {
        for role in ColumnRole::ALL {
            assert_eq!(ColumnRole::from_canonical_name(role.canonical_name()), Some(*role));
        }
        assert_eq!(ColumnRole::from_canonical_name("nope"), None);
    }

    #[test]
    fn test_default_weights_rank_identifying_fields_highest() {
        assert!(ColumnRole::InvoiceNumber.default_weight() > ColumnRole::Amount.default_weight());
        assert!(ColumnRole::Amount.default_weight() > ColumnRole::Description.default_weight());
    }
}
