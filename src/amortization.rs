use chrono::{Days, NaiveDate};
use log::{debug, info, warn};
use rust_decimal::{Decimal, RoundingStrategy};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolkitError};
use crate::utils::add_months_clamped;

const MAX_DECIMAL_PLACES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentMethodKind {
    /// Constant payment (annuity).
    EqualInstallment,
    /// Constant principal portion, declining payment.
    EqualPrincipal,
    /// Interest every period, principal at maturity.
    InterestOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PeriodUnit {
    Days,
    Weeks,
    Months,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Periodicity {
    pub unit: PeriodUnit,
    #[schemars(description = "Number of units between two instalments")]
    pub every: u32,
}

impl Default for Periodicity {
    fn default() -> Self {
        Self::monthly()
    }
}

impl Periodicity {
    pub fn new(unit: PeriodUnit, every: u32) -> Self {
        Self { unit, every }
    }

    pub fn monthly() -> Self {
        Self::new(PeriodUnit::Months, 1)
    }

    /// Rate charged per instalment period; `None` when it does not fit a `Decimal`.
    pub fn periodic_rate(&self, annual_rate: Decimal) -> Option<Decimal> {
        let per_year = match self.unit {
            PeriodUnit::Days => Decimal::from(365),
            PeriodUnit::Weeks => Decimal::from(52),
            PeriodUnit::Months => Decimal::from(12),
        };
        (annual_rate / per_year).checked_mul(Decimal::from(self.every))
    }

    /// Due date of instalment `period` (1-based), always computed from `start`.
    pub fn due_date(&self, start: NaiveDate, period: u32) -> Option<NaiveDate> {
        let steps = period.checked_mul(self.every)?;
        match self.unit {
            PeriodUnit::Days => start.checked_add_days(Days::new(u64::from(steps))),
            PeriodUnit::Weeks => start.checked_add_days(Days::new(u64::from(steps) * 7)),
            PeriodUnit::Months => add_months_clamped(start, steps),
        }
    }

    /// Due date of the last of `instalments` instalments.
    pub fn end_date(&self, start: NaiveDate, instalments: u32) -> Option<NaiveDate> {
        self.due_date(start, instalments)
    }

    /// Number of instalments due after `start` and on or before `end`.
    pub fn instalments_between(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        if self.every == 0 {
            return 0;
        }
        let mut count = 0;
        while let Some(due) = self.due_date(start, count + 1) {
            if due > end {
                break;
            }
            count += 1;
        }
        count
    }
}

/// Contract terms of one loan. `annual_rate` is a fraction (`0.12` for 12 %).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LoanTerms {
    pub principal: Decimal,
    #[schemars(description = "Nominal annual interest rate as a fraction, e.g. 0.12")]
    pub annual_rate: Decimal,
    #[schemars(description = "Number of instalments, grace periods included")]
    pub term: u32,
    pub method: RepaymentMethodKind,
    pub start_date: NaiveDate,
    #[serde(default)]
    #[schemars(description = "Leading interest-only periods before principal repayment starts")]
    pub grace_periods: u32,
    #[serde(default)]
    pub balloon: Option<Decimal>,
    #[serde(default)]
    pub periodicity: Periodicity,
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
}

fn default_decimal_places() -> u32 {
    2
}

impl LoanTerms {
    pub fn new(
        principal: Decimal,
        annual_rate: Decimal,
        term: u32,
        method: RepaymentMethodKind,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            principal,
            annual_rate,
            term,
            method,
            start_date,
            grace_periods: 0,
            balloon: None,
            periodicity: Periodicity::default(),
            decimal_places: default_decimal_places(),
        }
    }

    pub fn with_grace_periods(mut self, periods: u32) -> Self {
        self.grace_periods = periods;
        self
    }

    pub fn with_balloon(mut self, balloon: Decimal) -> Self {
        self.balloon = Some(balloon);
        self
    }

    pub fn with_periodicity(mut self, periodicity: Periodicity) -> Self {
        self.periodicity = periodicity;
        self
    }

    pub fn with_decimal_places(mut self, places: u32) -> Self {
        self.decimal_places = places;
        self
    }

    pub fn periodic_rate(&self) -> Result<Decimal> {
        self.periodicity
            .periodic_rate(self.annual_rate)
            .ok_or_else(|| {
                ToolkitError::invalid_terms(
                    "annual_rate",
                    format!(
                        "{} per year over every {} {:?} overflows",
                        self.annual_rate, self.periodicity.every, self.periodicity.unit
                    ),
                )
            })
    }

    pub fn maturity_date(&self) -> Option<NaiveDate> {
        self.periodicity.end_date(self.start_date, self.term)
    }

    pub fn round(&self, value: Decimal) -> Decimal {
        round_money(value, self.decimal_places)
    }

    /// Rounded balance the schedule is expected to close on.
    ///
    /// Annuity and equal-principal loans close on the balloon (zero without one).
    /// Interest-only loans repay the balloon at maturity instead, so with a balloon
    /// they close on `max(principal - balloon, 0)`, reported as
    /// [`ScheduleFlag::BalloonShortfall`] when positive; without one they repay in
    /// full and close on zero.
    pub fn expected_final_balance(&self) -> Decimal {
        let principal = self.round(self.principal);
        let balloon = self.round(self.balloon.unwrap_or(Decimal::ZERO));
        match self.method {
            RepaymentMethodKind::InterestOnly => match self.balloon {
                Some(_) => (principal - balloon).max(Decimal::ZERO),
                None => Decimal::ZERO,
            },
            _ => balloon,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.principal <= Decimal::ZERO {
            return Err(ToolkitError::invalid_terms(
                "principal",
                format!("must be positive, got {}", self.principal),
            ));
        }
        if self.annual_rate < Decimal::ZERO {
            return Err(ToolkitError::invalid_terms(
                "annual_rate",
                format!("must not be negative, got {}", self.annual_rate),
            ));
        }
        if self.term == 0 {
            return Err(ToolkitError::invalid_terms("term", "must be at least one period"));
        }
        if self.grace_periods >= self.term {
            return Err(ToolkitError::invalid_terms(
                "grace_periods",
                format!(
                    "{} grace periods leave no repayment period in a term of {}",
                    self.grace_periods, self.term
                ),
            ));
        }
        if let Some(balloon) = self.balloon {
            if balloon < Decimal::ZERO {
                return Err(ToolkitError::invalid_terms(
                    "balloon",
                    format!("must not be negative, got {balloon}"),
                ));
            }
            if balloon > self.principal && self.method != RepaymentMethodKind::InterestOnly {
                return Err(ToolkitError::invalid_terms(
                    "balloon",
                    format!("{} exceeds the principal {}", balloon, self.principal),
                ));
            }
        }
        if self.periodicity.every == 0 {
            return Err(ToolkitError::invalid_terms(
                "periodicity.every",
                "must be at least one",
            ));
        }
        if self.decimal_places > MAX_DECIMAL_PLACES {
            return Err(ToolkitError::invalid_terms(
                "decimal_places",
                format!("at most {MAX_DECIMAL_PLACES}, got {}", self.decimal_places),
            ));
        }
        self.periodic_rate()?;
        if self.maturity_date().is_none() {
            return Err(ToolkitError::invalid_terms(
                "term",
                "maturity date is outside the supported calendar",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub period: u32,
    pub due_date: NaiveDate,
    pub opening_balance: Decimal,
    pub interest: Decimal,
    pub principal: Decimal,
    pub payment: Decimal,
    pub closing_balance: Decimal,
    pub is_grace: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "flag", rename_all = "snake_case")]
pub enum ScheduleFlag {
    /// Principal still outstanding after the last instalment.
    BalloonShortfall { remaining: Decimal },
    /// Configured balloon larger than the principal left at maturity.
    BalloonExcess { excess: Decimal },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub terms: LoanTerms,
    pub entries: Vec<ScheduleEntry>,
    pub flags: Vec<ScheduleFlag>,
}

impl AmortizationSchedule {
    pub fn total_payment(&self) -> Decimal {
        self.entries.iter().map(|e| e.payment).sum()
    }

    pub fn total_interest(&self) -> Decimal {
        self.entries.iter().map(|e| e.interest).sum()
    }

    pub fn total_principal(&self) -> Decimal {
        self.entries.iter().map(|e| e.principal).sum()
    }

    pub fn final_balance(&self) -> Decimal {
        self.entries
            .last()
            .map(|e| e.closing_balance)
            .unwrap_or(self.terms.principal)
    }

    /// Entries due within `from..=to`.
    pub fn between(&self, from: NaiveDate, to: NaiveDate) -> Vec<&ScheduleEntry> {
        self.entries
            .iter()
            .filter(|e| e.due_date >= from && e.due_date <= to)
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// State of one amortizing (non-grace) period, in rounded amounts.
#[derive(Debug, Clone, Copy)]
pub struct PeriodContext {
    /// 1-based position within the amortizing periods.
    pub index: u32,
    pub count: u32,
    pub opening: Decimal,
    pub interest: Decimal,
}

impl PeriodContext {
    pub fn is_last(&self) -> bool {
        self.index == self.count
    }
}

/// Decides the principal portion of each amortizing period.
pub trait RepaymentMethod {
    fn kind(&self) -> RepaymentMethodKind;

    fn principal_portion(&self, period: &PeriodContext) -> Decimal;
}

pub struct EqualInstallment {
    payment: Decimal,
    residual: Decimal,
}

impl EqualInstallment {
    /// Constant payment amortizing `amount` down to `residual` over `periods` at `rate`,
    /// rounded to `decimal_places`.
    pub fn new(
        amount: Decimal,
        rate: Decimal,
        periods: u32,
        residual: Decimal,
        decimal_places: u32,
    ) -> Result<Self> {
        let overflow = || {
            ToolkitError::invalid_terms(
                "principal",
                format!("annuity payment for {amount} at {rate} over {periods} periods overflows"),
            )
        };

        let mut growth = Decimal::ONE;
        let factor = Decimal::ONE.checked_add(rate).ok_or_else(overflow)?;
        for _ in 0..periods {
            growth = growth.checked_mul(factor).ok_or_else(overflow)?;
        }
        let payment = if rate.is_zero() || growth == Decimal::ONE {
            (amount - residual) / Decimal::from(periods)
        } else {
            amount
                .checked_mul(growth)
                .and_then(|future| future.checked_sub(residual))
                .and_then(|net| net.checked_mul(rate))
                .and_then(|scaled| scaled.checked_div(growth - Decimal::ONE))
                .ok_or_else(overflow)?
        };
        Ok(Self {
            payment: round_money(payment, decimal_places),
            residual: round_money(residual, decimal_places),
        })
    }

    pub fn payment(&self) -> Decimal {
        self.payment
    }
}

impl RepaymentMethod for EqualInstallment {
    fn kind(&self) -> RepaymentMethodKind {
        RepaymentMethodKind::EqualInstallment
    }

    fn principal_portion(&self, period: &PeriodContext) -> Decimal {
        if period.is_last() {
            period.opening - self.residual
        } else {
            self.payment - period.interest
        }
    }
}

pub struct EqualPrincipal {
    instalment: Decimal,
    residual: Decimal,
}

impl EqualPrincipal {
    pub fn new(amount: Decimal, periods: u32, residual: Decimal, decimal_places: u32) -> Self {
        Self {
            instalment: round_money((amount - residual) / Decimal::from(periods), decimal_places),
            residual: round_money(residual, decimal_places),
        }
    }
}

impl RepaymentMethod for EqualPrincipal {
    fn kind(&self) -> RepaymentMethodKind {
        RepaymentMethodKind::EqualPrincipal
    }

    fn principal_portion(&self, period: &PeriodContext) -> Decimal {
        if period.is_last() {
            period.opening - self.residual
        } else {
            self.instalment
        }
    }
}

pub struct InterestOnly {
    balloon: Option<Decimal>,
}

impl InterestOnly {
    pub fn new(balloon: Option<Decimal>, decimal_places: u32) -> Self {
        Self {
            balloon: balloon.map(|b| round_money(b, decimal_places)),
        }
    }
}

impl RepaymentMethod for InterestOnly {
    fn kind(&self) -> RepaymentMethodKind {
        RepaymentMethodKind::InterestOnly
    }

    fn principal_portion(&self, period: &PeriodContext) -> Decimal {
        if !period.is_last() {
            return Decimal::ZERO;
        }
        match self.balloon {
            Some(balloon) => balloon.min(period.opening),
            None => period.opening,
        }
    }
}

pub struct AmortizationEngine<'a> {
    terms: &'a LoanTerms,
}

impl<'a> AmortizationEngine<'a> {
    pub fn new(terms: &'a LoanTerms) -> Self {
        Self { terms }
    }

    fn method(&self) -> Result<Box<dyn RepaymentMethod>> {
        let terms = self.terms;
        let periods = terms.term - terms.grace_periods;
        let residual = terms.balloon.unwrap_or(Decimal::ZERO);
        let places = terms.decimal_places;
        Ok(match terms.method {
            RepaymentMethodKind::EqualInstallment => Box::new(EqualInstallment::new(
                terms.principal,
                terms.periodic_rate()?,
                periods,
                residual,
                places,
            )?),
            RepaymentMethodKind::EqualPrincipal => {
                Box::new(EqualPrincipal::new(terms.principal, periods, residual, places))
            }
            RepaymentMethodKind::InterestOnly => {
                Box::new(InterestOnly::new(terms.balloon, places))
            }
        })
    }

    /// Builds the schedule on rounded balances. The fixed payment (or principal
    /// portion) is rounded once, every period but the last uses it as is, and the
    /// last period repays the exact remainder down to the residual balance.
    pub fn generate(&self) -> Result<AmortizationSchedule> {
        let terms = self.terms;
        terms.validate()?;
        info!(
            "Generating {:?} schedule: principal {}, rate {}, {} periods ({} grace)",
            terms.method, terms.principal, terms.annual_rate, terms.term, terms.grace_periods
        );

        let method = self.method()?;
        let rate = terms.periodic_rate()?;
        let amortizing = terms.term - terms.grace_periods;
        let overflow = |period: u32| {
            ToolkitError::invalid_terms(
                "principal",
                format!("interest for period {period} overflows at rate {rate}"),
            )
        };

        let mut entries = Vec::with_capacity(terms.term as usize);
        let mut balance = terms.round(terms.principal);
        for period in 1..=terms.term {
            let due_date = terms
                .periodicity
                .due_date(terms.start_date, period)
                .ok_or_else(|| {
                    ToolkitError::invalid_terms("term", format!("no due date for period {period}"))
                })?;

            let interest = terms.round(balance.checked_mul(rate).ok_or_else(|| overflow(period))?);
            let is_grace = period <= terms.grace_periods;
            let principal = if is_grace {
                Decimal::ZERO
            } else {
                method.principal_portion(&PeriodContext {
                    index: period - terms.grace_periods,
                    count: amortizing,
                    opening: balance,
                    interest,
                })
            };
            let closing = balance - principal;
            let payment = interest
                .checked_add(principal)
                .ok_or_else(|| overflow(period))?;

            entries.push(ScheduleEntry {
                period,
                due_date,
                opening_balance: balance,
                interest,
                principal,
                payment,
                closing_balance: closing,
                is_grace,
            });
            balance = closing;
        }

        let flags = self.balloon_flags(&entries);
        for flag in &flags {
            warn!("Schedule flag: {:?}", flag);
        }
        debug!(
            "Schedule generated with {} entries, final balance {}",
            entries.len(),
            entries.last().map(|e| e.closing_balance).unwrap_or_default()
        );

        Ok(AmortizationSchedule {
            terms: terms.clone(),
            entries,
            flags,
        })
    }

    fn balloon_flags(&self, entries: &[ScheduleEntry]) -> Vec<ScheduleFlag> {
        let mut flags = Vec::new();
        if self.terms.method != RepaymentMethodKind::InterestOnly {
            return flags;
        }
        let (Some(balloon), Some(last)) = (self.terms.balloon, entries.last()) else {
            return flags;
        };
        if last.closing_balance > Decimal::ZERO {
            flags.push(ScheduleFlag::BalloonShortfall {
                remaining: last.closing_balance,
            });
        }
        if balloon > last.opening_balance {
            flags.push(ScheduleFlag::BalloonExcess {
                excess: balloon - last.opening_balance,
            });
        }
        flags
    }
}

fn round_money(value: Decimal, decimal_places: u32) -> Decimal {
    value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
}

pub fn generate_schedule(terms: &LoanTerms) -> Result<AmortizationSchedule> {
    AmortizationEngine::new(terms).generate()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleViolation {
    pub period: Option<u32>,
    pub check: String,
    pub expected: Decimal,
    pub actual: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleVerification {
    pub is_valid: bool,
    pub violations: Vec<ScheduleViolation>,
}

/// Re-checks balance continuity, per-entry arithmetic and the terminal balance.
pub fn verify_schedule(schedule: &AmortizationSchedule, tolerance: Decimal) -> ScheduleVerification {
    let mut violations = Vec::new();
    let mut check = |period: Option<u32>, name: &str, expected: Decimal, actual: Decimal| {
        if (expected - actual).abs() > tolerance {
            violations.push(ScheduleViolation {
                period,
                check: name.to_string(),
                expected,
                actual,
            });
        }
    };

    let terms = &schedule.terms;
    let mut previous_closing = terms.round(terms.principal);
    for entry in &schedule.entries {
        let period = Some(entry.period);
        check(period, "continuity", previous_closing, entry.opening_balance);
        check(
            period,
            "payment",
            entry.interest + entry.principal,
            entry.payment,
        );
        check(
            period,
            "closing_balance",
            entry.opening_balance - entry.principal,
            entry.closing_balance,
        );
        previous_closing = entry.closing_balance;
    }

    let expected_final = terms.round(terms.expected_final_balance());
    check(None, "final_balance", expected_final, schedule.final_balance());
    check(
        None,
        "total_principal",
        terms.round(terms.principal) - schedule.final_balance(),
        schedule.total_principal(),
    );

    ScheduleVerification {
        is_valid: violations.is_empty(),
        violations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
    }

    fn terms(method: RepaymentMethodKind) -> LoanTerms {
        LoanTerms::new(dec("1000000"), dec("0.12"), 12, method, start())
    }

    #[test]
    fn test_equal_installment_reference_loan() {
        let schedule = generate_schedule(&terms(RepaymentMethodKind::EqualInstallment)).unwrap();
        assert_eq!(schedule.entries.len(), 12);

        let first = &schedule.entries[0];
        assert_eq!(first.opening_balance, dec("1000000.00"));
        assert_eq!(first.interest, dec("10000.00"));
        assert_eq!(first.principal, dec("78848.79"));
        assert_eq!(first.payment, dec("88848.79"));
        assert_eq!(first.due_date, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());

        let last = schedule.entries.last().unwrap();
        assert_eq!(last.closing_balance, Decimal::ZERO);
        assert_eq!(last.due_date, NaiveDate::from_ymd_opt(2026, 1, 31).unwrap());
        assert_eq!(schedule.total_principal(), dec("1000000.00"));

        for entry in &schedule.entries[..11] {
            assert_eq!(entry.payment, dec("88848.79"));
        }
        assert!((last.payment - dec("88848.79")).abs() <= dec("0.05"));
        assert!(verify_schedule(&schedule, Decimal::ZERO).is_valid);
    }

    #[test]
    fn test_equal_principal_declining_payments() {
        let schedule = generate_schedule(&terms(RepaymentMethodKind::EqualPrincipal)).unwrap();
        let first = &schedule.entries[0];
        assert_eq!(first.principal, dec("83333.33"));
        assert_eq!(first.payment, dec("93333.33"));
        for entry in &schedule.entries[..11] {
            assert_eq!(entry.principal, dec("83333.33"));
        }
        assert_eq!(schedule.entries[11].principal, dec("83333.37"));
        assert!(schedule.entries[11].payment < first.payment);
        assert_eq!(schedule.final_balance(), Decimal::ZERO);
        assert!(verify_schedule(&schedule, Decimal::ZERO).is_valid);
    }

    #[test]
    fn test_interest_only_repays_at_maturity() {
        let schedule = generate_schedule(&terms(RepaymentMethodKind::InterestOnly)).unwrap();
        for entry in &schedule.entries[..11] {
            assert_eq!(entry.principal, Decimal::ZERO);
            assert_eq!(entry.payment, dec("10000.00"));
        }
        assert_eq!(schedule.entries[11].payment, dec("1010000.00"));
        assert!(schedule.flags.is_empty());
    }

    #[test]
    fn test_interest_only_balloon_shortfall_and_excess() {
        let short = generate_schedule(
            &terms(RepaymentMethodKind::InterestOnly).with_balloon(dec("400000")),
        )
        .unwrap();
        assert_eq!(short.final_balance(), dec("600000.00"));
        assert_eq!(
            short.flags,
            vec![ScheduleFlag::BalloonShortfall {
                remaining: dec("600000.00")
            }]
        );
        assert!(verify_schedule(&short, Decimal::ZERO).is_valid);

        let excess = generate_schedule(
            &terms(RepaymentMethodKind::InterestOnly).with_balloon(dec("1200000")),
        )
        .unwrap();
        assert_eq!(excess.final_balance(), Decimal::ZERO);
        assert_eq!(
            excess.flags,
            vec![ScheduleFlag::BalloonExcess {
                excess: dec("200000.00")
            }]
        );
    }

    #[test]
    fn test_annuity_with_balloon_closes_on_balloon() {
        let schedule = generate_schedule(
            &terms(RepaymentMethodKind::EqualInstallment).with_balloon(dec("200000")),
        )
        .unwrap();
        assert_eq!(schedule.final_balance(), dec("200000.00"));
        assert!(verify_schedule(&schedule, Decimal::ZERO).is_valid);
    }

    #[test]
    fn test_grace_periods_defer_principal() {
        let schedule = generate_schedule(
            &terms(RepaymentMethodKind::EqualPrincipal).with_grace_periods(2),
        )
        .unwrap();
        assert!(schedule.entries[0].is_grace && schedule.entries[1].is_grace);
        assert_eq!(schedule.entries[1].principal, Decimal::ZERO);
        assert_eq!(schedule.entries[1].interest, dec("10000.00"));
        assert_eq!(schedule.entries[2].principal, dec("100000.00"));
        assert_eq!(schedule.final_balance(), Decimal::ZERO);
    }

    #[test]
    fn test_zero_rate_splits_principal_evenly() {
        let loan = LoanTerms::new(
            dec("1000"),
            Decimal::ZERO,
            3,
            RepaymentMethodKind::EqualInstallment,
            start(),
        );
        let schedule = generate_schedule(&loan).unwrap();
        let payments: Vec<Decimal> = schedule.entries.iter().map(|e| e.payment).collect();
        assert_eq!(payments, vec![dec("333.33"), dec("333.33"), dec("333.34")]);
        assert_eq!(schedule.total_payment(), dec("1000.00"));
        assert_eq!(schedule.total_interest(), Decimal::ZERO);
    }

    #[test]
    fn test_invalid_terms_name_the_field() {
        let cases = [
            (terms(RepaymentMethodKind::EqualInstallment).with_grace_periods(12), "grace_periods"),
            (
                LoanTerms::new(dec("-1"), dec("0.1"), 12, RepaymentMethodKind::EqualPrincipal, start()),
                "principal",
            ),
            (
                LoanTerms::new(dec("100"), dec("0.1"), 0, RepaymentMethodKind::EqualPrincipal, start()),
                "term",
            ),
            (
                terms(RepaymentMethodKind::EqualPrincipal).with_balloon(dec("2000000")),
                "balloon",
            ),
            (
                LoanTerms::new(dec("1000"), dec("-0.01"), 12, RepaymentMethodKind::EqualInstallment, start()),
                "annual_rate",
            ),
        ];
        for (loan, expected) in cases {
            match generate_schedule(&loan) {
                Err(ToolkitError::InvalidTerms { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected InvalidTerms for {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_weekly_periodicity() {
        let weekly = Periodicity::new(PeriodUnit::Weeks, 2);
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(
            weekly.due_date(start, 1),
            NaiveDate::from_ymd_opt(2025, 1, 15)
        );
        assert_eq!(weekly.periodic_rate(dec("0.52")), Some(dec("0.02")));
        assert_eq!(
            weekly.instalments_between(start, NaiveDate::from_ymd_opt(2025, 2, 12).unwrap()),
            3
        );
    }

    #[test]
    fn test_month_end_due_dates_and_instalment_count() {
        let monthly = Periodicity::monthly();
        assert_eq!(
            monthly.end_date(start(), 3),
            NaiveDate::from_ymd_opt(2025, 4, 30)
        );
        assert_eq!(
            monthly.instalments_between(start(), NaiveDate::from_ymd_opt(2025, 4, 29).unwrap()),
            2
        );
    }

    #[test]
    fn test_oversized_terms_are_rejected_instead_of_overflowing() {
        let huge = dec("10000000000000000000000000000");
        let cases = [
            LoanTerms::new(huge, dec("0.12"), 240, RepaymentMethodKind::EqualInstallment, start()),
            LoanTerms::new(huge, dec("120"), 12, RepaymentMethodKind::InterestOnly, start()),
            LoanTerms::new(huge, dec("120"), 12, RepaymentMethodKind::EqualPrincipal, start()),
        ];
        for loan in cases {
            match generate_schedule(&loan) {
                Err(ToolkitError::InvalidTerms { field, .. }) => assert_eq!(field, "principal"),
                other => panic!("expected InvalidTerms, got {other:?}"),
            }
        }

        let rate_overflow = LoanTerms::new(
            dec("1000"),
            dec("1000000000000000000000000000"),
            12,
            RepaymentMethodKind::EqualInstallment,
            start(),
        )
        .with_periodicity(Periodicity::new(PeriodUnit::Days, u32::MAX));
        match rate_overflow.periodic_rate() {
            Err(ToolkitError::InvalidTerms { field, .. }) => assert_eq!(field, "annual_rate"),
            other => panic!("expected InvalidTerms, got {other:?}"),
        }
    }

    #[test]
    fn test_verify_reports_broken_continuity() {
        let mut schedule =
            generate_schedule(&terms(RepaymentMethodKind::EqualInstallment)).unwrap();
        schedule.entries[3].opening_balance += dec("1.00");
        let result = verify_schedule(&schedule, dec("0.001"));
        assert!(!result.is_valid);
        assert!(result
            .violations
            .iter()
            .any(|v| v.check == "continuity" && v.period == Some(4)));
    }
}
