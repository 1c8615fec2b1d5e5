//! Cut-off views over generated schedules.

use chrono::NaiveDate;
use log::info;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::amortization::AmortizationSchedule;

/// Closing balance of the last entry due on or before `cutoff`; the principal when
/// nothing is due yet.
pub fn outstanding_balance(schedule: &AmortizationSchedule, cutoff: NaiveDate) -> Decimal {
    schedule
        .entries
        .iter()
        .take_while(|e| e.due_date <= cutoff)
        .last()
        .map(|e| e.closing_balance)
        .unwrap_or_else(|| schedule.terms.round(schedule.terms.principal))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub first_due_date: Option<NaiveDate>,
    pub last_due_date: Option<NaiveDate>,
    pub instalments: usize,
    pub total_payment: Decimal,
    pub total_interest: Decimal,
    pub total_principal: Decimal,
    pub outstanding_balance: Decimal,
}

impl ScheduleSummary {
    /// Aggregates every entry due on or before `cutoff`.
    pub fn as_of(schedule: &AmortizationSchedule, cutoff: NaiveDate) -> Self {
        let due: Vec<_> = schedule
            .entries
            .iter()
            .filter(|e| e.due_date <= cutoff)
            .collect();

        Self {
            first_due_date: due.first().map(|e| e.due_date),
            last_due_date: due.last().map(|e| e.due_date),
            instalments: due.len(),
            total_payment: due.iter().map(|e| e.payment).sum(),
            total_interest: due.iter().map(|e| e.interest).sum(),
            total_principal: due.iter().map(|e| e.principal).sum(),
            outstanding_balance: outstanding_balance(schedule, cutoff),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub cutoff: NaiveDate,
    pub loans: BTreeMap<String, ScheduleSummary>,
    pub total_outstanding: Decimal,
    pub total_interest: Decimal,
    pub total_principal: Decimal,
}

/// Named schedules reported together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanPortfolio {
    loans: BTreeMap<String, AmortizationSchedule>,
}

impl LoanPortfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the schedule stored under `name`.
    pub fn insert(&mut self, name: impl Into<String>, schedule: AmortizationSchedule) {
        self.loans.insert(name.into(), schedule);
    }

    pub fn get(&self, name: &str) -> Option<&AmortizationSchedule> {
        self.loans.get(name)
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }

    pub fn total_outstanding(&self, cutoff: NaiveDate) -> Decimal {
        self.loans
            .values()
            .map(|s| outstanding_balance(s, cutoff))
            .sum()
    }

    /// Per-loan summaries at `cutoff`. Loans with no instalment due yet are left out
    /// of the listing but still count towards the outstanding total.
    pub fn cutoff_summary(&self, cutoff: NaiveDate) -> PortfolioSummary {
        let loans: BTreeMap<String, ScheduleSummary> = self
            .loans
            .iter()
            .map(|(name, schedule)| (name.clone(), ScheduleSummary::as_of(schedule, cutoff)))
            .filter(|(_, summary)| summary.instalments > 0)
            .collect();

        let summary = PortfolioSummary {
            cutoff,
            total_outstanding: self.total_outstanding(cutoff),
            total_interest: loans.values().map(|s| s.total_interest).sum(),
            total_principal: loans.values().map(|s| s.total_principal).sum(),
            loans,
        };
        info!(
            "Portfolio of {} loans at {}: outstanding {}",
            self.loans.len(),
            cutoff,
            summary.total_outstanding
        );
        summary
    }
}
