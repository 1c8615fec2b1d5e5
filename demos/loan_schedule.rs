use chrono::NaiveDate;
use financial_data_toolkit::{
    generate_schedule, verify_schedule, LoanPortfolio, LoanTerms, PeriodUnit, Periodicity,
    RepaymentMethodKind, ScheduleSummary,
};
use rust_decimal::Decimal;

fn main() {
    let start = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();

    let equipment = LoanTerms::new(
        Decimal::new(1_000_000, 0),
        Decimal::new(12, 2),
        12,
        RepaymentMethodKind::EqualInstallment,
        start,
    );
    let schedule = generate_schedule(&equipment).expect("terms should be valid");

    println!(
        "{:>3}  {:<10}  {:>14}  {:>12}  {:>12}  {:>12}  {:>14}",
        "#", "Due", "Opening", "Interest", "Principal", "Payment", "Closing"
    );
    for entry in &schedule.entries {
        println!(
            "{:>3}  {:<10}  {:>14}  {:>12}  {:>12}  {:>12}  {:>14}",
            entry.period,
            entry.due_date,
            entry.opening_balance,
            entry.interest,
            entry.principal,
            entry.payment,
            entry.closing_balance
        );
    }
    println!(
        "Total interest {} / total paid {}",
        schedule.total_interest(),
        schedule.total_payment()
    );

    let check = verify_schedule(&schedule, Decimal::ZERO);
    println!("Schedule verified: {}", check.is_valid);

    // Quarterly interest-only facility with a partial balloon
    let facility = LoanTerms::new(
        Decimal::new(250_000, 0),
        Decimal::new(9, 2),
        8,
        RepaymentMethodKind::InterestOnly,
        start,
    )
    .with_periodicity(Periodicity::new(PeriodUnit::Months, 3))
    .with_balloon(Decimal::new(100_000, 0));
    let facility_schedule = generate_schedule(&facility).expect("terms should be valid");
    for flag in &facility_schedule.flags {
        println!("Facility flag: {flag:?}");
    }

    let cutoff = NaiveDate::from_ymd_opt(2025, 9, 30).unwrap();
    let summary = ScheduleSummary::as_of(&schedule, cutoff);
    println!(
        "\nEquipment loan at {}: {} instalments paid, outstanding {}",
        cutoff, summary.instalments, summary.outstanding_balance
    );

    let mut portfolio = LoanPortfolio::new();
    portfolio.insert("equipment", schedule);
    portfolio.insert("facility", facility_schedule);
    let report = portfolio.cutoff_summary(cutoff);
    println!(
        "Portfolio outstanding {} (interest to date {})",
        report.total_outstanding, report.total_interest
    );
}
