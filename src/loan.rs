use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_PRIORITY, MAX_AMOUNT, MAX_RATE_PERCENT};
use crate::decimal::{Money, Rate};
use crate::errors::{PlannerError, Result};
use crate::types::{LoanId, LoanSource};

/// a loan as supplied by the surrounding application
///
/// The engine treats loans as read-only input. Simulations clone the active
/// loans into a working set and only ever mutate `current_balance` there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: LoanId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source: Option<LoanSource>,
    /// outstanding principal at simulation start
    pub current_balance: Money,
    /// payment due every month while the loan is active
    pub minimum_payment: Money,
    /// annual rate, written as a percentage on the wire
    #[serde(with = "crate::decimal::percent")]
    pub interest_rate: Rate,
    /// anchors payoff date arithmetic
    pub start_date: NaiveDate,
    /// only meaningful under the custom strategy
    #[serde(default)]
    pub priority_order: Option<i32>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Loan {
    pub fn builder() -> LoanBuilder {
        LoanBuilder::new()
    }

    /// periodic rate applied each simulated month
    pub fn monthly_rate(&self) -> Rate {
        self.interest_rate.monthly_rate()
    }

    /// interest accruing on the current balance this month
    pub fn monthly_interest(&self) -> Money {
        self.current_balance.interest_at(self.monthly_rate())
    }

    /// priority used by the custom strategy
    pub fn effective_priority(&self) -> i32 {
        self.priority_order.unwrap_or(DEFAULT_PRIORITY)
    }

    /// true once the balance is within tolerance of zero
    pub fn is_paid_off(&self, tolerance: Money) -> bool {
        self.current_balance <= tolerance
    }

    /// minimum payment covers this month's interest
    pub fn covers_interest(&self) -> bool {
        self.minimum_payment > self.monthly_interest()
    }

    /// bookkeeping checks for records entering the dashboard
    ///
    /// the projection engine itself never calls this and degrades gracefully instead
    pub fn validate(&self) -> Result<()> {
        if self.current_balance.is_negative() {
            return Err(self.invalid(format!("balance {} is negative", self.current_balance)));
        }

        if !self.minimum_payment.is_positive() {
            return Err(self.invalid(format!(
                "minimum payment {} must be positive",
                self.minimum_payment
            )));
        }

        if self.interest_rate.is_negative() {
            return Err(self.invalid(format!("interest rate {} is negative", self.interest_rate)));
        }

        let ceiling = Money::from_major(MAX_AMOUNT);
        if self.current_balance > ceiling || self.minimum_payment > ceiling {
            return Err(self.invalid(format!("amounts above {} are not supported", ceiling)));
        }

        if self.interest_rate > Rate::from_percentage(MAX_RATE_PERCENT) {
            return Err(self.invalid(format!(
                "interest rate {} exceeds {}%",
                self.interest_rate, MAX_RATE_PERCENT
            )));
        }

        Ok(())
    }

    fn invalid(&self, message: String) -> PlannerError {
        PlannerError::InvalidLoan {
            id: self.id.clone(),
            message,
        }
    }
}

/// the user's total monthly repayment funds across all loans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBudget {
    pub monthly_allocation: Money,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl MonthlyBudget {
    pub fn new(monthly_allocation: Money) -> Self {
        Self {
            monthly_allocation,
            is_active: true,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.monthly_allocation.is_negative() || self.monthly_allocation > Money::from_major(MAX_AMOUNT) {
            return Err(PlannerError::InvalidBudget {
                amount: self.monthly_allocation,
            });
        }
        Ok(())
    }
}

/// sum of minimum payments over active loans
pub fn total_minimum_payments(loans: &[Loan]) -> Money {
    loans
        .iter()
        .filter(|loan| loan.is_active)
        .map(|loan| loan.minimum_payment)
        .sum()
}

/// the budget a projection runs with: the active budget, or the minimums when there is none
pub fn effective_budget(loans: &[Loan], budget: Option<&MonthlyBudget>) -> Money {
    match budget {
        Some(budget) if budget.is_active => budget.monthly_allocation,
        _ => total_minimum_payments(loans),
    }
}

/// builder for loans
pub struct LoanBuilder {
    id: Option<LoanId>,
    name: Option<String>,
    source: Option<LoanSource>,
    balance: Option<Money>,
    minimum_payment: Option<Money>,
    interest_rate: Option<Rate>,
    start_date: Option<NaiveDate>,
    priority_order: Option<i32>,
    is_active: bool,
}

impl LoanBuilder {
    pub fn new() -> Self {
        Self {
            id: None,
            name: None,
            source: None,
            balance: None,
            minimum_payment: None,
            interest_rate: None,
            start_date: None,
            priority_order: None,
            is_active: true,
        }
    }

    pub fn id(mut self, id: impl Into<LoanId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn source(mut self, source: LoanSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn balance(mut self, balance: Money) -> Self {
        self.balance = Some(balance);
        self
    }

    pub fn minimum_payment(mut self, payment: Money) -> Self {
        self.minimum_payment = Some(payment);
        self
    }

    pub fn rate(mut self, rate: Rate) -> Self {
        self.interest_rate = Some(rate);
        self
    }

    /// annual rate as a percentage, e.g. `dec!(19.9)`
    pub fn rate_percent(mut self, percent: Decimal) -> Self {
        self.interest_rate = Some(Rate::from_percent(percent));
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority_order = Some(priority);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// build and validate; a missing id is generated
    pub fn build(self) -> Result<Loan> {
        let id = self.id.unwrap_or_else(LoanId::generate);

        let current_balance = self.balance.ok_or_else(|| PlannerError::InvalidLoan {
            id: id.clone(),
            message: "balance required".to_string(),
        })?;

        let minimum_payment = self.minimum_payment.ok_or_else(|| PlannerError::InvalidLoan {
            id: id.clone(),
            message: "minimum payment required".to_string(),
        })?;

        let start_date = self.start_date.ok_or_else(|| PlannerError::InvalidLoan {
            id: id.clone(),
            message: "start date required".to_string(),
        })?;

        let loan = Loan {
            name: self.name.unwrap_or_else(|| id.to_string()),
            id,
            source: self.source,
            current_balance,
            minimum_payment,
            interest_rate: self.interest_rate.unwrap_or(Rate::ZERO),
            start_date,
            priority_order: self.priority_order,
            is_active: self.is_active,
        };

        loan.validate()?;
        Ok(loan)
    }
}

impl Default for LoanBuilder {
    fn default() -> Self {
        Self::new()
    }
}
