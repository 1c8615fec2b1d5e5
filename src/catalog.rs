//! Built-in layout catalog.
//!
//! Every entry is plain data: adding a layout means adding an entry here, never new
//! matching code. The registry refuses two entries whose own header spellings form the
//! same set.

use crate::schema::{ColumnRole, ColumnSpec, LayoutCategory, LayoutSignature, Locale};

use ColumnRole::*;
use LayoutCategory::{BankStatement, Custom, Invoice, Payroll, TrialBalance, VatReturn};
use Locale::{English, EnglishUs, French, Kinyarwanda};

pub struct ColumnEntry {
    pub role: ColumnRole,
    pub headers: &'static [&'static str],
    pub required: bool,
}

const fn req(role: ColumnRole, headers: &'static [&'static str]) -> ColumnEntry {
    ColumnEntry {
        role,
        headers,
        required: true,
    }
}

const fn opt(role: ColumnRole, headers: &'static [&'static str]) -> ColumnEntry {
    ColumnEntry {
        role,
        headers,
        required: false,
    }
}

pub struct LayoutEntry {
    pub id: &'static str,
    pub category: LayoutCategory,
    pub locale: Locale,
    pub data_group: &'static str,
    pub statement_group: &'static str,
    pub key_fields: Option<&'static [&'static str]>,
    pub columns: &'static [ColumnEntry],
}

impl LayoutEntry {
    pub fn to_signature(&self) -> LayoutSignature {
        LayoutSignature {
            id: self.id.to_string(),
            category: self.category,
            locale: self.locale,
            data_group: self.data_group.to_string(),
            financial_statement_group: self.statement_group.to_string(),
            columns: self
                .columns
                .iter()
                .map(|c| ColumnSpec {
                    role: c.role,
                    headers: c.headers.iter().map(|h| h.to_string()).collect(),
                    required: c.required,
                })
                .collect(),
            key_fields: self
                .key_fields
                .map(|fields| fields.iter().map(|f| f.to_string()).collect()),
        }
    }
}

const INCOME: &str = "INCOME STATEMENT";
const BALANCE_SHEET: &str = "BALANCE SHEET";
const TAX: &str = "TAX";
const CASH_FLOW: &str = "CASH FLOW";

const RECEIPT_LINE_KEY: &[&str] = &["receipt_number", "tax_id", "item_name"];
const ANNEX_KEY: &[&str] = &["tax_id", "invoice_number", "period"];

pub static CATALOG: &[LayoutEntry] = &[
    // ------------------------------------------------------------------
    // Invoices: EBM (electronic billing machine) exports
    // ------------------------------------------------------------------
    LayoutEntry {
        id: "EBM SALES V20",
        category: Invoice,
        locale: English,
        data_group: "SALES",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(InvoiceNumber, &["Invoice No", "Invoice Nbr"]),
            req(Date, &["Sales Date"]),
            req(TaxId, &["Customer TIN"]),
            opt(Counterparty, &["Customer Name"]),
            req(Amount, &["Total Amount"]),
            req(VatAmount, &["VAT"]),
            opt(Status, &["Receipt Type"]),
        ],
    },
    LayoutEntry {
        id: "EBM SALES V21",
        category: Invoice,
        locale: English,
        data_group: "SALES",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(InvoiceNumber, &["Invoice Number"]),
            req(SdcId, &["SDC ID"]),
            req(Date, &["Sale Date"]),
            req(TaxId, &["Buyer TIN"]),
            opt(Counterparty, &["Buyer Name"]),
            req(NetAmount, &["Taxable Amount"]),
            req(VatAmount, &["VAT Amount"]),
            req(Amount, &["Total Amount"]),
            opt(Status, &["Receipt Type"]),
        ],
    },
    LayoutEntry {
        id: "EBM PURCHASES V20",
        category: Invoice,
        locale: English,
        data_group: "PURCHASES",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(InvoiceNumber, &["Invoice No", "Invoice Nbr"]),
            req(Date, &["Purchase Date"]),
            req(TaxId, &["Supplier TIN"]),
            opt(Counterparty, &["Supplier Name"]),
            req(Amount, &["Total Amount"]),
            req(VatAmount, &["VAT"]),
        ],
    },
    LayoutEntry {
        id: "EBM PURCHASES V21",
        category: Invoice,
        locale: English,
        data_group: "PURCHASES",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(InvoiceNumber, &["Invoice Number"]),
            req(SdcId, &["SDC ID"]),
            req(Date, &["Purchase Date"]),
            req(TaxId, &["Supplier TIN"]),
            opt(Counterparty, &["Supplier Name"]),
            req(NetAmount, &["Taxable Amount"]),
            req(VatAmount, &["VAT Amount"]),
            req(Amount, &["Total Amount"]),
        ],
    },
    LayoutEntry {
        id: "EBM BO SALES DETAILS V20",
        category: Invoice,
        locale: English,
        data_group: "SALES",
        statement_group: INCOME,
        key_fields: Some(RECEIPT_LINE_KEY),
        columns: &[
            req(ReceiptNumber, &["Rcpt No"]),
            req(Date, &["Rcpt Date"]),
            req(TaxId, &["Cust TIN"]),
            req(ItemName, &["Item Name"]),
            req(Quantity, &["Qty"]),
            req(UnitPrice, &["Unit Price"]),
            req(Amount, &["Total Amt"]),
            opt(VatAmount, &["Tax Amt"]),
        ],
    },
    LayoutEntry {
        id: "EBM BO SALES DETAILS V21",
        category: Invoice,
        locale: English,
        data_group: "SALES",
        statement_group: INCOME,
        key_fields: Some(RECEIPT_LINE_KEY),
        columns: &[
            req(ReceiptNumber, &["Receipt Number"]),
            req(SdcId, &["SDC Receipt ID"]),
            req(Date, &["Receipt Date"]),
            req(TaxId, &["Customer TIN"]),
            req(ItemName, &["Item Name"]),
            req(Quantity, &["Quantity"]),
            req(UnitPrice, &["Unit Price"]),
            req(Amount, &["Total Amt"]),
            opt(VatAmount, &["Tax Amt"]),
        ],
    },
    LayoutEntry {
        id: "EBM DEVICE SALES V21",
        category: Invoice,
        locale: English,
        data_group: "SALES",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(SdcId, &["Device Serial"]),
            req(InvoiceNumber, &["Invoice ID"]),
            req(Date, &["Transaction Date"]),
            req(TaxId, &["Client TIN"]),
            req(Amount, &["Sales Amount"]),
            req(VatAmount, &["Tax B Amount"]),
            opt(Status, &["Transaction Type"]),
        ],
    },
    LayoutEntry {
        id: "EBM DEVICE PURCHASES V21",
        category: Invoice,
        locale: English,
        data_group: "PURCHASES",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(SdcId, &["Device Serial"]),
            req(InvoiceNumber, &["Invoice ID"]),
            req(Date, &["Transaction Date"]),
            req(TaxId, &["Supplier TIN"]),
            req(Amount, &["Purchase Amount"]),
            req(VatAmount, &["Tax B Amount"]),
        ],
    },
    LayoutEntry {
        id: "EBM SALES Z-REPORT DTL V21",
        category: Invoice,
        locale: English,
        data_group: "SALES",
        statement_group: INCOME,
        key_fields: Some(&["sdc_id", "receipt_number"]),
        columns: &[
            req(SdcId, &["MRC No"]),
            req(ReceiptNumber, &["Z Report No"]),
            req(Date, &["Report Date"]),
            req(Amount, &["Total Sales"]),
            req(VatAmount, &["Total Tax"]),
            opt(Quantity, &["Receipt Count"]),
        ],
    },
    // ------------------------------------------------------------------
    // Invoices: tax authority declaration schedules
    // ------------------------------------------------------------------
    LayoutEntry {
        id: "RRADSC PURCHASES-SALES V01",
        category: Invoice,
        locale: English,
        data_group: "PURCHASES-SALES",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(TaxId, &["TIN"]),
            req(InvoiceNumber, &["Invoice Ref"]),
            req(Date, &["Invoice Date"]),
            req(NetAmount, &["Amount Excl VAT"]),
            req(VatAmount, &["VAT Charged"]),
        ],
    },
    LayoutEntry {
        id: "RRADSC PURCHASES-SALES V02",
        category: Invoice,
        locale: English,
        data_group: "PURCHASES-SALES",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(TaxId, &["Partner TIN"]),
            req(Counterparty, &["Trade Name"]),
            req(InvoiceNumber, &["Invoice Ref"]),
            req(Date, &["Invoice Date"]),
            req(NetAmount, &["Amount Excl VAT"]),
            req(VatAmount, &["VAT Charged"]),
        ],
    },
    LayoutEntry {
        id: "RRADSC PURCHASES-SALES V03",
        category: Invoice,
        locale: English,
        data_group: "PURCHASES-SALES",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(TaxId, &["Partner TIN"]),
            req(InvoiceNumber, &["EBM Invoice Ref"]),
            req(SdcId, &["EBM SDC ID"]),
            req(Date, &["Invoice Date"]),
            req(NetAmount, &["Amount Excl VAT"]),
            req(VatAmount, &["VAT Charged"]),
            req(Amount, &["Amount Incl VAT"]),
        ],
    },
    LayoutEntry {
        id: "RRADSC PURCHASES-SALES V04",
        category: Invoice,
        locale: English,
        data_group: "PURCHASES-SALES",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(TaxId, &["Partner TIN"]),
            req(InvoiceNumber, &["EBM Invoice Ref"]),
            req(SdcId, &["EBM SDC ID"]),
            req(Date, &["Invoice Date"]),
            req(NetAmount, &["Amount Excl VAT"]),
            req(VatAmount, &["VAT Charged"]),
            req(Amount, &["Amount Incl VAT"]),
            req(TaxType, &["Nature of Supply"]),
        ],
    },
    LayoutEntry {
        id: "RRADSC PURCHASES-SALES V05",
        category: Invoice,
        locale: English,
        data_group: "PURCHASES-SALES",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(TaxId, &["Partner TIN"]),
            req(InvoiceNumber, &["EBM Invoice Ref"]),
            req(SdcId, &["EBM SDC ID"]),
            req(Date, &["Invoice Date"]),
            req(NetAmount, &["Amount Excl VAT"]),
            req(VatAmount, &["VAT Charged"]),
            req(Amount, &["Amount Incl VAT"]),
            req(TaxType, &["Nature of Supply"]),
            req(Period, &["Declaration Period"]),
        ],
    },
    LayoutEntry {
        id: "ETAX SALES DECLARATION V01",
        category: Invoice,
        locale: English,
        data_group: "SALES",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(TaxId, &["Buyer TIN"]),
            req(InvoiceNumber, &["Invoice Serial"]),
            req(Date, &["Date of Sale"]),
            req(Amount, &["Sales Incl Tax"]),
            req(VatAmount, &["VAT on Sales"]),
        ],
    },
    LayoutEntry {
        id: "ETAX PURCHASES DECLARATION V01",
        category: Invoice,
        locale: English,
        data_group: "PURCHASES",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(TaxId, &["Seller TIN"]),
            req(InvoiceNumber, &["Invoice Serial"]),
            req(Date, &["Date of Purchase"]),
            req(Amount, &["Purchases Incl Tax"]),
            req(VatAmount, &["VAT on Purchases"]),
        ],
    },
    // ------------------------------------------------------------------
    // Invoices: accounting package exports
    // ------------------------------------------------------------------
    LayoutEntry {
        id: "FACTURES VENTES FR V01",
        category: Invoice,
        locale: French,
        data_group: "SALES",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(InvoiceNumber, &["N° Facture", "Numéro Facture"]),
            req(Date, &["Date Facture"]),
            req(TaxId, &["NIF Client"]),
            opt(Counterparty, &["Client"]),
            req(NetAmount, &["Montant HT"]),
            req(VatAmount, &["TVA"]),
            req(Amount, &["Montant TTC"]),
        ],
    },
    LayoutEntry {
        id: "FACTURES ACHATS FR V01",
        category: Invoice,
        locale: French,
        data_group: "PURCHASES",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(InvoiceNumber, &["N° Facture Fournisseur"]),
            req(Date, &["Date Facture"]),
            req(TaxId, &["NIF Fournisseur"]),
            opt(Counterparty, &["Fournisseur"]),
            req(NetAmount, &["Montant HT"]),
            req(VatAmount, &["TVA"]),
            req(Amount, &["Montant TTC"]),
        ],
    },
    LayoutEntry {
        id: "QUICKBOOKS INVOICE LIST V01",
        category: Invoice,
        locale: EnglishUs,
        data_group: "SALES",
        statement_group: INCOME,
        key_fields: Some(&["invoice_number", "counterparty"]),
        columns: &[
            req(Date, &["Date"]),
            req(InvoiceNumber, &["Num"]),
            req(Counterparty, &["Name"]),
            req(Amount, &["Amount"]),
            opt(Description, &["Memo/Description"]),
        ],
    },
    LayoutEntry {
        id: "SAGE SALES INVOICES V01",
        category: Invoice,
        locale: English,
        data_group: "SALES",
        statement_group: INCOME,
        key_fields: Some(&["invoice_number", "reference"]),
        columns: &[
            req(InvoiceNumber, &["Inv Ref"]),
            req(Date, &["Inv Date"]),
            req(Reference, &["A/C Ref"]),
            req(Counterparty, &["Customer Name"]),
            req(NetAmount, &["Net Amt"]),
            req(VatAmount, &["Tax Amt"]),
            req(Amount, &["Gross Amt"]),
        ],
    },
    LayoutEntry {
        id: "ODOO CUSTOMER INVOICES V01",
        category: Invoice,
        locale: English,
        data_group: "SALES",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(InvoiceNumber, &["Number"]),
            req(Date, &["Invoice/Bill Date"]),
            req(Counterparty, &["Partner"]),
            req(TaxId, &["Partner/Tax ID"]),
            req(NetAmount, &["Untaxed Amount"]),
            req(Amount, &["Total Signed"]),
            opt(Status, &["Payment Status"]),
        ],
    },
    LayoutEntry {
        id: "ODOO VENDOR BILLS V01",
        category: Invoice,
        locale: English,
        data_group: "PURCHASES",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(InvoiceNumber, &["Number"]),
            req(Reference, &["Bill Reference"]),
            req(Date, &["Invoice/Bill Date"]),
            req(Counterparty, &["Partner"]),
            req(TaxId, &["Partner/Tax ID"]),
            req(NetAmount, &["Untaxed Amount"]),
            req(Amount, &["Total Signed"]),
        ],
    },
    LayoutEntry {
        id: "DHEGRP-XL SALES V01",
        category: Invoice,
        locale: English,
        data_group: "SALES",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(InvoiceNumber, &["Doc No"]),
            req(Date, &["Doc Date"]),
            req(Counterparty, &["Customer"]),
            req(TaxId, &["Customer VAT No"]),
            req(Amount, &["Doc Total"]),
        ],
    },
    LayoutEntry {
        id: "DHEGRP-XL SALES V02",
        category: Invoice,
        locale: English,
        data_group: "SALES",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(InvoiceNumber, &["Doc No"]),
            req(Date, &["Doc Date"]),
            req(Counterparty, &["Customer"]),
            req(TaxId, &["Customer VAT No"]),
            req(Amount, &["Doc Total"]),
            req(Currency, &["Doc Currency"]),
        ],
    },
    LayoutEntry {
        id: "DHEGRP-XL SALES V03",
        category: Invoice,
        locale: English,
        data_group: "SALES",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(InvoiceNumber, &["Doc No"]),
            req(Date, &["Doc Date"]),
            req(Counterparty, &["Customer"]),
            req(TaxId, &["Customer VAT No"]),
            req(Amount, &["Doc Total"]),
            req(Currency, &["Doc Currency"]),
            req(NetAmount, &["Doc Net"]),
            req(VatAmount, &["Doc VAT"]),
        ],
    },
    // ------------------------------------------------------------------
    // Bank and mobile money statements
    // ------------------------------------------------------------------
    LayoutEntry {
        id: "BK BANK STATEMENT V01",
        category: BankStatement,
        locale: English,
        data_group: "BANK",
        statement_group: BALANCE_SHEET,
        key_fields: None,
        columns: &[
            req(Date, &["Posting Date"]),
            req(ValueDate, &["Value Date"]),
            req(Description, &["Description"]),
            req(Debit, &["Debit"]),
            req(Credit, &["Credit"]),
            req(Balance, &["Balance"]),
            opt(Reference, &["Reference"]),
        ],
    },
    LayoutEntry {
        id: "BK BANK STATEMENT V02",
        category: BankStatement,
        locale: English,
        data_group: "BANK",
        statement_group: BALANCE_SHEET,
        key_fields: None,
        columns: &[
            req(Date, &["Posting Date"]),
            req(Description, &["Transaction Details"]),
            req(Reference, &["Cheque/Ref No"]),
            req(Debit, &["Withdrawals"]),
            req(Credit, &["Deposits"]),
            req(Balance, &["Running Balance"]),
        ],
    },
    LayoutEntry {
        id: "EQUITY BANK STATEMENT V01",
        category: BankStatement,
        locale: English,
        data_group: "BANK",
        statement_group: BALANCE_SHEET,
        key_fields: None,
        columns: &[
            req(Date, &["Transaction Date"]),
            req(ValueDate, &["Value Date"]),
            req(Description, &["Narrative"]),
            req(Reference, &["Transaction Reference"]),
            req(Debit, &["Money Out"]),
            req(Credit, &["Money In"]),
            req(Balance, &["Ledger Balance"]),
        ],
    },
    LayoutEntry {
        id: "I&M BANK STATEMENT V01",
        category: BankStatement,
        locale: English,
        data_group: "BANK",
        statement_group: BALANCE_SHEET,
        key_fields: None,
        columns: &[
            req(Date, &["Tran Date"]),
            req(Description, &["Particulars"]),
            req(Debit, &["Debit Amount"]),
            req(Credit, &["Credit Amount"]),
            req(Balance, &["Book Balance"]),
        ],
    },
    LayoutEntry {
        id: "ECOBANK STATEMENT V01",
        category: BankStatement,
        locale: English,
        data_group: "BANK",
        statement_group: BALANCE_SHEET,
        key_fields: None,
        columns: &[
            req(Date, &["Trans Date"]),
            req(ValueDate, &["Value Dt"]),
            req(Description, &["Transaction Description"]),
            req(Debit, &["Dr Amount"]),
            req(Credit, &["Cr Amount"]),
            req(Balance, &["Available Balance"]),
        ],
    },
    LayoutEntry {
        id: "ACCESS BANK STATEMENT V01",
        category: BankStatement,
        locale: English,
        data_group: "BANK",
        statement_group: BALANCE_SHEET,
        key_fields: None,
        columns: &[
            req(Date, &["Txn Date"]),
            req(ValueDate, &["Val Date"]),
            req(Description, &["Remarks"]),
            req(Debit, &["Debits"]),
            req(Credit, &["Credits"]),
            req(Balance, &["Balance"]),
        ],
    },
    LayoutEntry {
        id: "GT BANK STATEMENT V01",
        category: BankStatement,
        locale: English,
        data_group: "BANK",
        statement_group: BALANCE_SHEET,
        key_fields: None,
        columns: &[
            req(Date, &["Create Date"]),
            req(ValueDate, &["Value Date"]),
            req(Reference, &["Reference"]),
            req(Description, &["Remarks"]),
            req(Debit, &["Debits"]),
            req(Credit, &["Credits"]),
            req(Balance, &["Balance"]),
        ],
    },
    LayoutEntry {
        id: "KCB BANK STATEMENT V01",
        category: BankStatement,
        locale: English,
        data_group: "BANK",
        statement_group: BALANCE_SHEET,
        key_fields: None,
        columns: &[
            req(Date, &["Txn Date"]),
            req(Description, &["Transaction Narrative"]),
            req(Counterparty, &["Beneficiary"]),
            req(Reference, &["Bank Reference"]),
            req(Debit, &["Paid Out"]),
            req(Credit, &["Paid In"]),
            req(Balance, &["Balance"]),
        ],
    },
    LayoutEntry {
        id: "BPR BANK STATEMENT V01",
        category: BankStatement,
        locale: French,
        data_group: "BANK",
        statement_group: BALANCE_SHEET,
        key_fields: None,
        columns: &[
            req(Date, &["Date Opération"]),
            req(ValueDate, &["Date Valeur"]),
            req(Description, &["Libellé"]),
            req(Debit, &["Débit"]),
            req(Credit, &["Crédit"]),
            req(Balance, &["Solde"]),
        ],
    },
    LayoutEntry {
        id: "COGEBANQUE STATEMENT V01",
        category: BankStatement,
        locale: French,
        data_group: "BANK",
        statement_group: BALANCE_SHEET,
        key_fields: None,
        columns: &[
            req(Date, &["Date Comptable"]),
            req(ValueDate, &["Date de Valeur"]),
            req(Description, &["Libellé Opération"]),
            req(Reference, &["Référence"]),
            req(Debit, &["Montant Débit"]),
            req(Credit, &["Montant Crédit"]),
            req(Balance, &["Solde Courant"]),
        ],
    },
    LayoutEntry {
        id: "RELEVE BANCAIRE FR V01",
        category: BankStatement,
        locale: French,
        data_group: "BANK",
        statement_group: BALANCE_SHEET,
        key_fields: None,
        columns: &[
            req(Date, &["Date"]),
            req(Description, &["Libellé"]),
            req(Counterparty, &["Tiers"]),
            req(Amount, &["Montant"]),
            opt(Currency, &["Devise"]),
        ],
    },
    LayoutEntry {
        id: "GENERIC BANK STATEMENT US V01",
        category: BankStatement,
        locale: EnglishUs,
        data_group: "BANK",
        statement_group: BALANCE_SHEET,
        key_fields: None,
        columns: &[
            req(Date, &["Posted Date"]),
            req(Counterparty, &["Payee"]),
            req(Description, &["Memo"]),
            req(Reference, &["Check Number"]),
            req(Amount, &["Amount"]),
        ],
    },
    LayoutEntry {
        id: "MOMO MERCHANT STATEMENT V01",
        category: BankStatement,
        locale: English,
        data_group: "MOBILE MONEY",
        statement_group: BALANCE_SHEET,
        key_fields: None,
        columns: &[
            req(Reference, &["Transaction Id"]),
            req(Date, &["Date Time"]),
            req(Counterparty, &["From Name"]),
            req(AccountNumber, &["From Msisdn"]),
            req(Amount, &["Amount"]),
            opt(Status, &["Status"]),
            opt(Currency, &["Currency"]),
        ],
    },
    LayoutEntry {
        id: "AIRTEL MONEY STATEMENT V01",
        category: BankStatement,
        locale: English,
        data_group: "MOBILE MONEY",
        statement_group: BALANCE_SHEET,
        key_fields: None,
        columns: &[
            req(Reference, &["Transaction ID"]),
            req(Date, &["Transaction Date Time"]),
            req(Counterparty, &["Receiver Name"]),
            req(AccountNumber, &["Receiver Msisdn"]),
            req(Amount, &["Transaction Amount"]),
            opt(Status, &["Transaction Status"]),
        ],
    },
    // ------------------------------------------------------------------
    // VAT and withholding returns
    // ------------------------------------------------------------------
    LayoutEntry {
        id: "RRA VAT RETURN V01",
        category: VatReturn,
        locale: English,
        data_group: "VAT",
        statement_group: TAX,
        key_fields: None,
        columns: &[
            req(TaxId, &["TIN"]),
            req(Period, &["Tax Period"]),
            req(NetAmount, &["Taxable Sales"]),
            req(OutputVat, &["Output VAT"]),
            req(InputVat, &["Input VAT"]),
            req(VatAmount, &["VAT Payable"]),
        ],
    },
    LayoutEntry {
        id: "RRA VAT RETURN V02",
        category: VatReturn,
        locale: English,
        data_group: "VAT",
        statement_group: TAX,
        key_fields: None,
        columns: &[
            req(TaxId, &["TIN"]),
            req(Period, &["Tax Period"]),
            req(Reference, &["Declaration Number"]),
            req(Date, &["Filing Date"]),
            req(NetAmount, &["Taxable Sales"]),
            req(OutputVat, &["Output VAT"]),
            req(InputVat, &["Input VAT"]),
            req(VatAmount, &["VAT Payable"]),
        ],
    },
    LayoutEntry {
        id: "VAT SALES ANNEX V01",
        category: VatReturn,
        locale: English,
        data_group: "VAT",
        statement_group: TAX,
        key_fields: Some(ANNEX_KEY),
        columns: &[
            req(TaxId, &["Client TIN"]),
            req(InvoiceNumber, &["Invoice No"]),
            req(Date, &["Invoice Date"]),
            req(NetAmount, &["Sales Excl VAT"]),
            req(VatAmount, &["VAT Amount"]),
            req(Period, &["Month"]),
        ],
    },
    LayoutEntry {
        id: "VAT PURCHASES ANNEX V01",
        category: VatReturn,
        locale: English,
        data_group: "VAT",
        statement_group: TAX,
        key_fields: Some(ANNEX_KEY),
        columns: &[
            req(TaxId, &["Supplier TIN"]),
            req(InvoiceNumber, &["Invoice No"]),
            req(Date, &["Invoice Date"]),
            req(NetAmount, &["Purchases Excl VAT"]),
            req(VatAmount, &["VAT Amount"]),
            req(Period, &["Month"]),
        ],
    },
    LayoutEntry {
        id: "DECLARATION TVA FR V01",
        category: VatReturn,
        locale: French,
        data_group: "VAT",
        statement_group: TAX,
        key_fields: None,
        columns: &[
            req(TaxId, &["NIF"]),
            req(Period, &["Période"]),
            req(NetAmount, &["Chiffre d'Affaires Imposable"]),
            req(OutputVat, &["TVA Collectée"]),
            req(InputVat, &["TVA Déductible"]),
            req(VatAmount, &["TVA à Payer"]),
        ],
    },
    LayoutEntry {
        id: "WITHHOLDING TAX RETURN V01",
        category: VatReturn,
        locale: English,
        data_group: "WITHHOLDING TAX",
        statement_group: TAX,
        key_fields: None,
        columns: &[
            req(TaxId, &["Payee TIN"]),
            req(Counterparty, &["Payee Name"]),
            req(Period, &["Return Period"]),
            req(NetAmount, &["Gross Payment"]),
            req(TaxType, &["Tax Rate"]),
            req(Amount, &["Tax Withheld"]),
        ],
    },
    // ------------------------------------------------------------------
    // Payroll
    // ------------------------------------------------------------------
    LayoutEntry {
        id: "PAYROLL REGISTER V01",
        category: Payroll,
        locale: English,
        data_group: "PAYROLL",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(EmployeeId, &["Employee ID"]),
            req(EmployeeName, &["Employee Name"]),
            req(Period, &["Pay Period"]),
            req(GrossPay, &["Gross Salary"]),
            req(PayeTax, &["PAYE"]),
            req(PensionContribution, &["RSSB Pension"]),
            req(NetPay, &["Net Salary"]),
        ],
    },
    LayoutEntry {
        id: "PAYROLL REGISTER V02",
        category: Payroll,
        locale: English,
        data_group: "PAYROLL",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(EmployeeId, &["Staff No"]),
            req(EmployeeName, &["Full Name"]),
            req(Period, &["Payroll Month"]),
            req(GrossPay, &["Gross Pay"]),
            req(PayeTax, &["PAYE Tax"]),
            req(PensionContribution, &["Pension 3%"]),
            req(NetPay, &["Net Pay"]),
            opt(AccountNumber, &["Bank Account"]),
        ],
    },
    LayoutEntry {
        id: "RSSB PENSION DECLARATION V01",
        category: Payroll,
        locale: English,
        data_group: "PAYROLL",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(EmployeeId, &["RSSB Number"]),
            req(EmployeeName, &["Names"]),
            req(Period, &["Contribution Period"]),
            req(GrossPay, &["Gross Earnings"]),
            req(PensionContribution, &["Employee Contribution"]),
            req(Amount, &["Employer Contribution"]),
        ],
    },
    LayoutEntry {
        id: "PAYE DECLARATION V01",
        category: Payroll,
        locale: English,
        data_group: "PAYROLL",
        statement_group: TAX,
        key_fields: None,
        columns: &[
            req(TaxId, &["Employer TIN"]),
            req(EmployeeId, &["National ID"]),
            req(EmployeeName, &["Employee Names"]),
            req(Period, &["Period"]),
            req(GrossPay, &["Taxable Income"]),
            req(PayeTax, &["PAYE Due"]),
        ],
    },
    LayoutEntry {
        id: "LIVRE DE PAIE FR V01",
        category: Payroll,
        locale: French,
        data_group: "PAYROLL",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(EmployeeId, &["Matricule"]),
            req(EmployeeName, &["Nom et Prénom"]),
            req(Period, &["Mois"]),
            req(GrossPay, &["Salaire Brut"]),
            req(PayeTax, &["IPR"]),
            req(PensionContribution, &["Cotisation Pension"]),
            req(NetPay, &["Salaire Net"]),
        ],
    },
    LayoutEntry {
        id: "CASUAL LABOUR PAYROLL RW V01",
        category: Payroll,
        locale: Kinyarwanda,
        data_group: "PAYROLL",
        statement_group: INCOME,
        key_fields: Some(&["employee_id", "date"]),
        columns: &[
            req(EmployeeId, &["Indangamuntu"]),
            req(EmployeeName, &["Amazina"]),
            req(Date, &["Itariki"]),
            req(Quantity, &["Iminsi"]),
            req(UnitPrice, &["Igihembo ku Munsi"]),
            req(GrossPay, &["Amafaranga Yose"]),
            opt(Description, &["Umukono"]),
        ],
    },
    // ------------------------------------------------------------------
    // Trial balances and ledgers
    // ------------------------------------------------------------------
    LayoutEntry {
        id: "TRIAL BALANCE V01",
        category: TrialBalance,
        locale: English,
        data_group: "ACCOUNTING",
        statement_group: BALANCE_SHEET,
        key_fields: None,
        columns: &[
            req(AccountCode, &["Account Code"]),
            req(AccountName, &["Account Name"]),
            req(Debit, &["Debit"]),
            req(Credit, &["Credit"]),
        ],
    },
    LayoutEntry {
        id: "TRIAL BALANCE V02",
        category: TrialBalance,
        locale: English,
        data_group: "ACCOUNTING",
        statement_group: BALANCE_SHEET,
        key_fields: None,
        columns: &[
            req(AccountCode, &["Account Code"]),
            req(AccountName, &["Account Name"]),
            req(Debit, &["Period Debit"]),
            req(Credit, &["Period Credit"]),
            req(Balance, &["Closing Balance"]),
            opt(Amount, &["Net Movement"]),
        ],
    },
    LayoutEntry {
        id: "BALANCE GENERALE FR V01",
        category: TrialBalance,
        locale: French,
        data_group: "ACCOUNTING",
        statement_group: BALANCE_SHEET,
        key_fields: None,
        columns: &[
            req(AccountCode, &["N° Compte"]),
            req(AccountName, &["Intitulé du Compte"]),
            req(Debit, &["Solde Débiteur"]),
            req(Credit, &["Solde Créditeur"]),
        ],
    },
    LayoutEntry {
        id: "QUICKBOOKS TRIAL BALANCE V01",
        category: TrialBalance,
        locale: EnglishUs,
        data_group: "ACCOUNTING",
        statement_group: BALANCE_SHEET,
        key_fields: None,
        columns: &[
            req(AccountName, &["Account"]),
            req(AccountCode, &["Acct No"]),
            req(Debit, &["Debit"]),
            req(Credit, &["Credit"]),
        ],
    },
    LayoutEntry {
        id: "GENERAL LEDGER V01",
        category: Custom,
        locale: English,
        data_group: "ACCOUNTING",
        statement_group: BALANCE_SHEET,
        key_fields: Some(&["date", "reference", "account_code"]),
        columns: &[
            req(Date, &["Entry Date"]),
            req(AccountCode, &["GL Account"]),
            req(Reference, &["Journal No"]),
            req(Description, &["Narration"]),
            req(Debit, &["Debit"]),
            req(Credit, &["Credit"]),
        ],
    },
    LayoutEntry {
        id: "CASH BOOK V01",
        category: Custom,
        locale: English,
        data_group: "CASH",
        statement_group: CASH_FLOW,
        key_fields: Some(&["date", "reference"]),
        columns: &[
            req(Date, &["Date"]),
            req(Reference, &["Voucher No"]),
            req(Description, &["Details"]),
            req(Credit, &["Receipts"]),
            req(Debit, &["Payments"]),
            opt(Balance, &["Cash Balance"]),
        ],
    },
    LayoutEntry {
        id: "EXPENSE CLAIMS V01",
        category: Custom,
        locale: English,
        data_group: "EXPENSES",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(Date, &["Expense Date"]),
            req(EmployeeName, &["Claimant"]),
            req(Description, &["Expense Description"]),
            req(Amount, &["Claim Amount"]),
            opt(Status, &["Approval Status"]),
        ],
    },
    LayoutEntry {
        id: "AMAFARANGA YINJIYE RW V01",
        category: Custom,
        locale: Kinyarwanda,
        data_group: "SALES",
        statement_group: INCOME,
        key_fields: None,
        columns: &[
            req(Date, &["Itariki"]),
            req(Description, &["Ibisobanuro"]),
            req(Counterparty, &["Umukiriya"]),
            req(Amount, &["Amafaranga"]),
        ],
    },
];

pub fn builtin_signatures() -> impl Iterator<Item = LayoutSignature> {
    CATALOG.iter().map(LayoutEntry::to_signature)
}
