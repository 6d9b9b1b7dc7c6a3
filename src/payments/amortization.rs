use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;
use crate::decimal::{Money, Rate};

/// convert an annual percentage to the monthly periodic rate (`percent / 100 / 12`)
pub fn monthly_rate(annual_percent: Decimal) -> Rate {
    Rate::from_percent(annual_percent).monthly_rate()
}

/// advance a date by whole calendar months, clamping to the end of shorter months
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// payoff date for a single loan at a fixed payment, using the standard horizon
pub fn payoff_date(
    balance: Money,
    monthly_payment: Money,
    annual_rate: Rate,
    start_date: NaiveDate,
) -> NaiveDate {
    AmortizationCalculator::new(&PlannerConfig::standard())
        .payoff_date(balance, monthly_payment, annual_rate, start_date)
}

/// lifetime interest for a single loan at a fixed payment, rounded to cents
pub fn total_interest(balance: Money, monthly_payment: Money, annual_rate: Rate) -> Money {
    AmortizationCalculator::new(&PlannerConfig::standard())
        .total_interest(balance, monthly_payment, annual_rate)
}

/// one row of a single-loan payoff table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPayment {
    pub payment_number: u32,
    pub payment_date: NaiveDate,
    pub beginning_balance: Money,
    pub payment_amount: Money,
    pub interest_portion: Money,
    pub principal_portion: Money,
    pub ending_balance: Money,
    pub cumulative_interest: Money,
}

/// payoff table for one loan paid at a fixed monthly amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffSchedule {
    pub principal: Money,
    pub monthly_payment: Money,
    #[serde(with = "crate::decimal::percent")]
    pub interest_rate: Rate,
    pub start_date: NaiveDate,
    pub payments: Vec<ScheduledPayment>,
    pub total_interest: Money,
    pub total_paid: Money,
    /// false when the payment never covers the accruing interest
    pub converges: bool,
}

impl PayoffSchedule {
    /// get payment for specific period (1-based)
    pub fn get_payment(&self, payment_number: u32) -> Option<&ScheduledPayment> {
        payment_number
            .checked_sub(1)
            .and_then(|index| self.payments.get(index as usize))
    }

    pub fn months(&self) -> u32 {
        self.payments.len() as u32
    }

    pub fn payoff_date(&self) -> Option<NaiveDate> {
        if self.converges {
            Some(self.payments.last().map_or(self.start_date, |p| p.payment_date))
        } else {
            None
        }
    }
}

/// iterative single-loan amortization
///
/// No closed-form annuity formula is used: payments here need not amortize the
/// loan exactly, and the final month is capped at the remaining balance.
#[derive(Debug, Clone)]
pub struct AmortizationCalculator {
    horizon_months: u32,
    tolerance: Money,
    runaway_multiple: Decimal,
    output_precision: u32,
}

impl AmortizationCalculator {
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            horizon_months: config.horizon_months,
            tolerance: config.balance_tolerance,
            runaway_multiple: config.runaway_interest_multiple,
            output_precision: config.output_precision,
        }
    }

    /// whole months until the balance is within tolerance of zero
    ///
    /// returns the horizon when the payment never covers interest, and zero for
    /// non-positive balances or payments
    pub fn months_to_payoff(&self, balance: Money, monthly_payment: Money, annual_rate: Rate) -> u32 {
        if !monthly_payment.is_positive() || !balance.is_positive() {
            return 0;
        }

        let periodic = annual_rate.monthly_rate();
        let mut balance = balance;
        let mut months = 0;

        while balance > self.tolerance && months < self.horizon_months {
            let interest = balance.interest_at(periodic);
            let principal = monthly_payment - interest;

            if !principal.is_positive() {
                return self.horizon_months;
            }

            balance = (balance - principal).max(Money::ZERO);
            months += 1;
        }

        months
    }

    pub fn payoff_date(
        &self,
        balance: Money,
        monthly_payment: Money,
        annual_rate: Rate,
        start_date: NaiveDate,
    ) -> NaiveDate {
        add_months(
            start_date,
            self.months_to_payoff(balance, monthly_payment, annual_rate),
        )
    }

    /// interest accrued until payoff, the horizon, or the runaway bound
    pub fn total_interest(&self, balance: Money, monthly_payment: Money, annual_rate: Rate) -> Money {
        if !monthly_payment.is_positive() || !balance.is_positive() {
            return Money::ZERO;
        }

        let periodic = annual_rate.monthly_rate();
        let runaway_bound = balance * self.runaway_multiple;
        let mut balance = balance;
        let mut total = Money::ZERO;
        let mut months = 0;

        while balance > self.tolerance && months < self.horizon_months && total < runaway_bound {
            let interest = balance.interest_at(periodic);
            let principal = monthly_payment - interest;
            total += interest;

            // an uncovered payment leaves the balance where it is
            if principal.is_positive() {
                balance = (balance - principal).max(Money::ZERO);
            }
            months += 1;
        }

        total.round_dp(self.output_precision)
    }

    /// month-by-month payoff table; empty when nothing is owed or the payment never covers interest
    pub fn schedule(
        &self,
        principal: Money,
        monthly_payment: Money,
        annual_rate: Rate,
        start_date: NaiveDate,
    ) -> PayoffSchedule {
        let periodic = annual_rate.monthly_rate();
        let mut payments = Vec::new();
        let mut balance = principal;
        let mut cumulative_interest = Money::ZERO;
        let mut converges = balance <= self.tolerance || monthly_payment.is_positive();

        if monthly_payment.is_positive() {
            let mut number = 0;
            while balance > self.tolerance && number < self.horizon_months {
                let interest = balance.interest_at(periodic);
                if monthly_payment <= interest {
                    converges = false;
                    payments.clear();
                    break;
                }

                let payment_amount = monthly_payment.min(balance + interest);
                let principal_portion = payment_amount - interest;
                let ending_balance = (balance - principal_portion).max(Money::ZERO);
                number += 1;
                cumulative_interest += interest;

                payments.push(ScheduledPayment {
                    payment_number: number,
                    payment_date: add_months(start_date, number),
                    beginning_balance: balance,
                    payment_amount,
                    interest_portion: interest,
                    principal_portion,
                    ending_balance,
                    cumulative_interest,
                });

                balance = ending_balance;
            }

            if balance > self.tolerance {
                converges = false;
            }
        }

        let total_interest = payments.iter().map(|p| p.interest_portion).sum::<Money>();
        let total_paid = payments.iter().map(|p| p.payment_amount).sum::<Money>();

        PayoffSchedule {
            principal,
            monthly_payment,
            interest_rate: annual_rate,
            start_date,
            payments,
            total_interest: total_interest.round_dp(self.output_precision),
            total_paid: total_paid.round_dp(self.output_precision),
            converges,
        }
    }
}
