use chrono::NaiveDate;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;
use crate::decimal::Money;
use crate::loan::Loan;
use crate::payments::BudgetAllocator;
use crate::types::{LoanId, StrategyType};

/// how a single loan fared over a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanOutcome {
    pub loan_id: LoanId,
    pub start_date: NaiveDate,
    pub starting_balance: Money,
    /// largest payment actually applied in any month
    pub highest_payment: Money,
    /// month the loan retired, or the final month when it never did
    pub months_to_payoff: u32,
    pub total_interest: Money,
    pub remaining_balance: Money,
    pub paid_off: bool,
}

/// one simulated month across the whole working set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedMonth {
    pub month: u32,
    pub total_paid: Money,
    pub interest: Money,
    pub principal: Money,
    pub remaining_balance: Money,
    pub retired: Vec<LoanId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRun {
    pub strategy: Option<StrategyType>,
    pub monthly_budget: Money,
    /// one outcome per active input loan, in input order
    pub outcomes: Vec<LoanOutcome>,
    pub total_months: u32,
    pub total_interest: Money,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub timeline: Vec<SimulatedMonth>,
}

impl SimulationRun {
    pub fn outcome(&self, loan_id: &LoanId) -> Option<&LoanOutcome> {
        self.outcomes.iter().find(|outcome| &outcome.loan_id == loan_id)
    }

    /// every loan retired before the horizon
    pub fn converged(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.paid_off)
    }

    /// loans still carrying a balance at the horizon
    pub fn unresolved(&self) -> impl Iterator<Item = &LoanOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.paid_off)
    }
}

/// month-by-month simulation of a fixed budget over a set of loans
///
/// Each month the allocator sees the full budget against whatever loans are
/// still open, so a retired loan's minimum payment flows into the surplus the
/// following month.
#[derive(Debug, Clone)]
pub struct RolloverSimulator {
    config: PlannerConfig,
    allocator: BudgetAllocator,
}

impl RolloverSimulator {
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            config: config.clone(),
            allocator: BudgetAllocator::new(config),
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn simulate(
        &self,
        loans: &[Loan],
        monthly_budget: Money,
        strategy: Option<StrategyType>,
    ) -> SimulationRun {
        let tolerance = self.config.balance_tolerance;

        let mut outcomes: Vec<LoanOutcome> = Vec::new();
        let mut interest_totals: Vec<Money> = Vec::new();
        // working set, paired with the outcome each loan reports into
        let mut working: Vec<(Loan, usize)> = Vec::new();

        for loan in loans.iter().filter(|loan| loan.is_active) {
            let slot = outcomes.len();
            let settled = loan.is_paid_off(tolerance);

            outcomes.push(LoanOutcome {
                loan_id: loan.id.clone(),
                start_date: loan.start_date,
                starting_balance: loan.current_balance,
                highest_payment: Money::ZERO,
                months_to_payoff: 0,
                total_interest: Money::ZERO,
                remaining_balance: loan.current_balance.max(Money::ZERO),
                paid_off: settled,
            });
            interest_totals.push(Money::ZERO);

            if !settled {
                working.push((loan.clone(), slot));
            }
        }

        let mut timeline = Vec::new();
        let mut month = 0;

        while !working.is_empty() && month < self.config.horizon_months {
            month += 1;

            let open: Vec<Loan> = working.iter().map(|(loan, _)| loan.clone()).collect();
            let allocation = self.allocator.allocate(&open, monthly_budget, strategy);

            let mut paid = Money::ZERO;
            let mut interest_paid = Money::ZERO;
            let mut principal_paid = Money::ZERO;

            for ((loan, slot), entry) in working.iter_mut().zip(&allocation.entries) {
                let payment = entry.payment();
                let interest = loan.monthly_interest();
                let principal = (payment - interest).max(Money::ZERO).min(loan.current_balance);
                let applied = payment.min(interest + principal);

                loan.current_balance -= principal;
                interest_totals[*slot] += interest;

                let outcome = &mut outcomes[*slot];
                outcome.highest_payment = outcome.highest_payment.max(applied);
                outcome.remaining_balance = loan.current_balance;

                paid += applied;
                interest_paid += interest;
                principal_paid += principal;
            }

            let mut retired = Vec::new();
            working.retain(|(loan, slot)| {
                if !loan.is_paid_off(tolerance) {
                    return true;
                }
                let outcome = &mut outcomes[*slot];
                outcome.months_to_payoff = month;
                outcome.paid_off = true;
                retired.push(loan.id.clone());
                false
            });

            let remaining_balance: Money = outcomes.iter().map(|outcome| outcome.remaining_balance).sum();

            trace!(
                "month {}: paid {} (interest {}, principal {}), remaining {}, retired {}",
                month,
                paid,
                interest_paid,
                principal_paid,
                remaining_balance,
                retired.len()
            );

            if self.config.record_timeline {
                timeline.push(SimulatedMonth {
                    month,
                    total_paid: paid,
                    interest: interest_paid,
                    principal: principal_paid,
                    remaining_balance,
                    retired,
                });
            }
        }

        for (loan, slot) in &working {
            warn!(
                "loan {} still owes {} after {} months",
                loan.id, loan.current_balance, month
            );
            outcomes[*slot].months_to_payoff = month;
        }

        for (outcome, interest) in outcomes.iter_mut().zip(&interest_totals) {
            outcome.total_interest = self.config.round(*interest);
        }

        let total_months = outcomes
            .iter()
            .map(|outcome| outcome.months_to_payoff)
            .max()
            .unwrap_or(0);
        let total_interest = self.config.round(interest_totals.iter().sum());

        debug!(
            "simulated {} loans with {} under {}: {} months, {} interest",
            outcomes.len(),
            monthly_budget,
            strategy.map_or("minimums only", |s| s.as_str()),
            total_months,
            total_interest
        );

        SimulationRun {
            strategy,
            monthly_budget,
            outcomes,
            total_months,
            total_interest,
            timeline,
        }
    }
}

/// simulate with the standard configuration
pub fn simulate(loans: &[Loan], monthly_budget: Money, strategy: Option<StrategyType>) -> SimulationRun {
    RolloverSimulator::new(&PlannerConfig::standard()).simulate(loans, monthly_budget, strategy)
}
