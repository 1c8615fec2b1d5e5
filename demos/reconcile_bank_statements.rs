use financial_data_toolkit::{
    detect_and_normalize, reconcile, AmountTolerance, Dataset, RawTable, ReconciliationConfig,
};
use rust_decimal::Decimal;

fn load(table: &RawTable, group: &str) -> Dataset {
    let (detection, outcome) =
        detect_and_normalize(table, group).expect("built-in registry should load");
    println!(
        "Detected {:?} (confidence {:.2})",
        detection.layout_id(),
        detection.confidence()
    );

    let outcome = outcome.expect("statement layout should be recognised");
    for warning in &outcome.warnings {
        println!("  excluded: {warning}");
    }
    outcome.dataset
}

fn main() {
    // Bank export with a title line above the header
    let bank = RawTable::from_strings(
        &["ACME LTD - BK account 000123", "", "", "", "", ""],
        &[
            ["Posting Date", "Value Date", "Description", "Debit", "Credit", "Balance"],
            ["03/01/2025", "03/01/2025", "Opening transfer", "", "10,000.00", "10,000.00"],
            ["05/01/2025", "05/01/2025", "Rent January", "1,500.00", "", "8,500.00"],
            ["07/01/2025", "08/01/2025", "Client payment INV-17", "", "2,360.00", "10,860.00"],
            ["09/01/2025", "09/01/2025", "Fuel", "84.35", "", "10,775.65"],
            ["bad date", "09/01/2025", "Broken row", "12.00", "", "10,763.65"],
        ],
    );

    // Cash book kept by the accountant, dated on booking
    let ledger = RawTable::from_strings(
        &["Posting Date", "Value Date", "Description", "Debit", "Credit", "Balance"],
        &[
            ["03/01/2025", "03/01/2025", "Capital injection", "", "10,000.00", "10,000.00"],
            ["04/01/2025", "04/01/2025", "Rent January", "1,500.00", "", "8,500.00"],
            ["07/01/2025", "07/01/2025", "INV-17", "", "2,360.00", "10,860.00"],
            ["09/01/2025", "09/01/2025", "Fuel", "84.00", "", "10,776.00"],
            ["10/01/2025", "10/01/2025", "Bank charges", "15.00", "", "10,761.00"],
        ],
    );

    let bank = load(&bank, "ACME");
    let ledger = load(&ledger, "ACME");

    let config = ReconciliationConfig::default()
        .with_date_window(2)
        .with_tolerance(AmountTolerance::absolute(Decimal::new(50, 2)));
    let result = reconcile(&bank, &ledger, &config).expect("datasets belong to the same group");

    println!("\nMatched:");
    for pair in &result.matched {
        println!(
            "  bank #{} <-> ledger #{} (amount delta {:?}, {:?} days)",
            pair.left.index, pair.right.index, pair.amount_delta, pair.date_offset_days
        );
    }
    println!("Variants:");
    for pair in &result.variant {
        println!("  bank #{} <-> ledger #{}", pair.left.index, pair.right.index);
        for diff in &pair.diffs {
            println!("    {}: {:?} vs {:?}", diff.field, diff.left, diff.right);
        }
    }
    println!("Only in bank: {:?}", result.unmatched_left);
    println!("Only in ledger: {:?}", result.unmatched_right);

    let summary = &result.summary;
    println!(
        "\nBank total {} / ledger total {} / difference {}",
        summary.left_total, summary.right_total, summary.difference
    );
    println!("Match rate: {:.0}%", summary.match_rate() * 100.0);
}
