use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;
use crate::decimal::Money;
use crate::loan::{total_minimum_payments, Loan};
use crate::types::{LoanId, StrategyType};

use super::ordering::strategy_positions;

/// one loan's share of a month's budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanAllocation {
    pub loan_id: LoanId,
    pub minimum: Money,
    /// amount above the minimum
    pub extra: Money,
}

impl LoanAllocation {
    pub fn payment(&self) -> Money {
        self.minimum + self.extra
    }
}

/// a single month's allocation across all active loans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAllocation {
    pub monthly_budget: Money,
    /// one entry per active loan, in input order
    pub entries: Vec<LoanAllocation>,
    /// surplus no loan could absorb
    pub unallocated: Money,
}

impl PaymentAllocation {
    pub fn get(&self, loan_id: &LoanId) -> Option<&LoanAllocation> {
        self.entries.iter().find(|entry| &entry.loan_id == loan_id)
    }

    /// payment for a loan, zero when the loan is not part of the allocation
    pub fn payment_for(&self, loan_id: &LoanId) -> Money {
        self.get(loan_id).map_or(Money::ZERO, LoanAllocation::payment)
    }

    pub fn extra_for(&self, loan_id: &LoanId) -> Money {
        self.get(loan_id).map_or(Money::ZERO, |entry| entry.extra)
    }

    pub fn total(&self) -> Money {
        self.entries.iter().map(LoanAllocation::payment).sum()
    }

    pub fn total_extra(&self) -> Money {
        self.entries.iter().map(|entry| entry.extra).sum()
    }

    /// loan id -> payment
    pub fn payments(&self) -> BTreeMap<LoanId, Money> {
        self.entries
            .iter()
            .map(|entry| (entry.loan_id.clone(), entry.payment()))
            .collect()
    }
}

/// greedy single-month allocator
///
/// Every active loan gets its minimum. The surplus over the minimums then
/// flows down the strategy order, each loan absorbing up to its remaining
/// principal capacity before anything reaches the next one.
#[derive(Debug, Clone)]
pub struct BudgetAllocator {
    tolerance: Money,
}

impl BudgetAllocator {
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            tolerance: config.balance_tolerance,
        }
    }

    pub fn allocate(
        &self,
        loans: &[Loan],
        monthly_budget: Money,
        strategy: Option<StrategyType>,
    ) -> PaymentAllocation {
        let mut entries: Vec<LoanAllocation> = Vec::with_capacity(loans.len());
        // loans index -> entries index
        let mut slots: Vec<Option<usize>> = vec![None; loans.len()];

        for (index, loan) in loans.iter().enumerate() {
            if !loan.is_active {
                continue;
            }
            slots[index] = Some(entries.len());
            entries.push(LoanAllocation {
                loan_id: loan.id.clone(),
                minimum: loan.minimum_payment,
                extra: Money::ZERO,
            });
        }

        let minimums = total_minimum_payments(loans);
        if monthly_budget < minimums {
            log::debug!(
                "monthly budget {} does not cover minimum payments {}",
                monthly_budget,
                minimums
            );
        }

        let mut remaining = (monthly_budget - minimums).max(Money::ZERO);

        if let Some(strategy) = strategy {
            for position in strategy_positions(loans, strategy) {
                if remaining <= self.tolerance {
                    break;
                }

                let Some(slot) = slots[position] else {
                    continue;
                };

                let loan = &loans[position];
                let entry = &mut entries[slot];

                let interest = loan.monthly_interest();
                let principal_capacity = loan.current_balance;
                let current_principal = (entry.payment() - interest).max(Money::ZERO);
                let remaining_capacity = principal_capacity - current_principal;

                if remaining_capacity > self.tolerance {
                    let extra = remaining.min(remaining_capacity);
                    entry.extra += extra;
                    remaining -= extra;
                }
            }
        }

        PaymentAllocation {
            monthly_budget,
            entries,
            unallocated: remaining,
        }
    }
}
