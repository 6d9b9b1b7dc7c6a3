use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;
use crate::decimal::Money;
use crate::errors::Result;
use crate::loan::{effective_budget, total_minimum_payments, Loan, MonthlyBudget};
use crate::payments::{add_months, BudgetAllocator};
use crate::simulation::{LoanOutcome, RolloverSimulator, SimulationRun};
use crate::types::{LoanId, StrategyType};

/// projected payoff of a single loan under a strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProjection {
    pub loan_id: LoanId,
    /// highest payment actually applied in any simulated month
    pub monthly_payment: Money,
    pub months_to_payoff: u32,
    pub total_interest: Money,
    pub payoff_date: NaiveDate,
    /// false when the loan was still open at the horizon
    pub paid_off: bool,
}

impl PaymentProjection {
    fn from_outcome(outcome: &LoanOutcome, config: &PlannerConfig) -> Self {
        Self {
            loan_id: outcome.loan_id.clone(),
            monthly_payment: config.round(outcome.highest_payment),
            months_to_payoff: outcome.months_to_payoff,
            total_interest: outcome.total_interest,
            payoff_date: add_months(outcome.start_date, outcome.months_to_payoff),
            paid_off: outcome.paid_off,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyProjection {
    pub strategy: Option<StrategyType>,
    /// budget the strategy run was simulated with
    pub monthly_budget: Money,
    pub projections: Vec<PaymentProjection>,
    pub total_months: u32,
    pub total_interest: Money,
    /// baseline interest minus strategy interest, negative when the strategy costs more
    pub interest_savings: Money,
    /// baseline months minus strategy months
    pub time_savings: i64,
    /// extra above the minimum per loan, first month only
    pub extra_payment_allocations: BTreeMap<LoanId, Money>,
}

impl StrategyProjection {
    pub fn projection(&self, loan_id: &LoanId) -> Option<&PaymentProjection> {
        self.projections.iter().find(|projection| &projection.loan_id == loan_id)
    }

    /// date the last loan retires
    pub fn debt_free_date(&self) -> Option<NaiveDate> {
        self.projections.iter().map(|projection| projection.payoff_date).max()
    }

    pub fn converged(&self) -> bool {
        self.projections.iter().all(|projection| projection.paid_off)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// headline figures of one simulated scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub strategy: Option<StrategyType>,
    pub monthly_budget: Money,
    pub total_months: u32,
    pub total_interest: Money,
    pub debt_free_date: Option<NaiveDate>,
    pub converged: bool,
}

impl ScenarioSummary {
    fn from_run(run: &SimulationRun) -> Self {
        Self {
            strategy: run.strategy,
            monthly_budget: run.monthly_budget,
            total_months: run.total_months,
            total_interest: run.total_interest,
            debt_free_date: run
                .outcomes
                .iter()
                .map(|outcome| add_months(outcome.start_date, outcome.months_to_payoff))
                .max(),
            converged: run.converged(),
        }
    }
}

/// minimum-payments baseline against a chosen strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioComparison {
    pub baseline: ScenarioSummary,
    pub strategy: ScenarioSummary,
    pub interest_savings: Money,
    pub time_savings: i64,
}

/// runs the baseline and strategy simulations and diffs them
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    config: PlannerConfig,
    simulator: RolloverSimulator,
    allocator: BudgetAllocator,
}

impl ProjectionEngine {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            simulator: RolloverSimulator::new(&config),
            allocator: BudgetAllocator::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// minimum payments only, budget equal to their sum
    pub fn baseline(&self, loans: &[Loan]) -> SimulationRun {
        self.simulator.simulate(loans, total_minimum_payments(loans), None)
    }

    pub fn project(
        &self,
        loans: &[Loan],
        budget: Option<&MonthlyBudget>,
        strategy: Option<StrategyType>,
    ) -> StrategyProjection {
        let baseline = self.baseline(loans);
        self.project_against(&baseline, loans, budget, strategy)
    }

    pub fn compare(
        &self,
        loans: &[Loan],
        budget: Option<&MonthlyBudget>,
        strategy: Option<StrategyType>,
    ) -> ScenarioComparison {
        let baseline = self.baseline(loans);
        let run = self.strategy_run(&baseline, loans, budget, strategy);

        ScenarioComparison {
            interest_savings: baseline.total_interest - run.total_interest,
            time_savings: i64::from(baseline.total_months) - i64::from(run.total_months),
            baseline: ScenarioSummary::from_run(&baseline),
            strategy: ScenarioSummary::from_run(&run),
        }
    }

    /// every strategy side by side, cheapest first, then fastest
    pub fn compare_strategies(&self, loans: &[Loan], budget: Option<&MonthlyBudget>) -> Vec<StrategyProjection> {
        let baseline = self.baseline(loans);

        let mut projections: Vec<StrategyProjection> = StrategyType::ALL
            .iter()
            .map(|&strategy| self.project_against(&baseline, loans, budget, Some(strategy)))
            .collect();

        projections.sort_by(|a, b| {
            a.total_interest
                .cmp(&b.total_interest)
                .then(a.total_months.cmp(&b.total_months))
        });
        projections
    }

    fn project_against(
        &self,
        baseline: &SimulationRun,
        loans: &[Loan],
        budget: Option<&MonthlyBudget>,
        strategy: Option<StrategyType>,
    ) -> StrategyProjection {
        let run = self.strategy_run(baseline, loans, budget, strategy);
        let monthly_budget = effective_budget(loans, budget);

        let extra_payment_allocations = self
            .allocator
            .allocate(loans, monthly_budget, strategy)
            .entries
            .into_iter()
            .filter(|entry| entry.extra > self.config.display_threshold)
            .map(|entry| (entry.loan_id, self.config.round(entry.extra)))
            .collect();

        let projection = StrategyProjection {
            strategy,
            monthly_budget,
            projections: run
                .outcomes
                .iter()
                .map(|outcome| PaymentProjection::from_outcome(outcome, &self.config))
                .collect(),
            total_months: run.total_months,
            total_interest: run.total_interest,
            interest_savings: baseline.total_interest - run.total_interest,
            time_savings: i64::from(baseline.total_months) - i64::from(run.total_months),
            extra_payment_allocations,
        };

        debug!(
            "projection under {}: {} months, {} interest, saves {} and {} months",
            strategy.map_or("minimums only", |s| s.as_str()),
            projection.total_months,
            projection.total_interest,
            projection.interest_savings,
            projection.time_savings
        );

        projection
    }

    /// the strategy scenario; reuses the baseline when there is no surplus to allocate
    fn strategy_run(
        &self,
        baseline: &SimulationRun,
        loans: &[Loan],
        budget: Option<&MonthlyBudget>,
        strategy: Option<StrategyType>,
    ) -> SimulationRun {
        let minimums = total_minimum_payments(loans);
        let monthly_budget = effective_budget(loans, budget);

        if monthly_budget < minimums {
            warn!(
                "monthly budget {} is below the minimum payments {}, projecting minimums",
                monthly_budget, minimums
            );
        }

        if strategy.is_none() || monthly_budget <= minimums + self.config.balance_tolerance {
            let mut run = baseline.clone();
            run.strategy = strategy;
            run.monthly_budget = monthly_budget;
            return run;
        }

        self.simulator.simulate(loans, monthly_budget, strategy)
    }
}

impl Default for ProjectionEngine {
    fn default() -> Self {
        Self::new(PlannerConfig::standard())
    }
}

/// project with the standard configuration
pub fn project(loans: &[Loan], budget: Option<&MonthlyBudget>, strategy: Option<StrategyType>) -> StrategyProjection {
    ProjectionEngine::default().project(loans, budget, strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn loan(id: &str, balance: i64, minimum: i64, rate: u32) -> Loan {
        Loan::builder()
            .id(id)
            .balance(Money::from_major(balance))
            .minimum_payment(Money::from_major(minimum))
            .rate_percent(rate.into())
            .start_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .build()
            .unwrap()
    }

    fn scenario() -> Vec<Loan> {
        vec![
            loan("A", 1_000, 50, 12),
            loan("B", 500, 50, 24),
            loan("C", 2_000, 100, 6),
        ]
    }

    fn budget(amount: i64) -> MonthlyBudget {
        MonthlyBudget::new(Money::from_major(amount))
    }

    #[test]
    fn test_avalanche_scenario() {
        let loans = scenario();
        let projection = project(&loans, Some(&budget(400)), Some(StrategyType::Avalanche));

        let mut expected = BTreeMap::new();
        expected.insert(LoanId::from("B"), Money::from_major(200));
        assert_eq!(projection.extra_payment_allocations, expected);

        assert_eq!(projection.total_months, 10);
        assert_eq!(projection.total_interest, Money::from_decimal(dec!(122.06)));
        assert_eq!(projection.interest_savings, Money::from_decimal(dec!(175.31)));
        assert_eq!(projection.time_savings, 13);
        assert!(projection.converged());

        let b = projection.projection(&"B".into()).unwrap();
        assert_eq!(b.months_to_payoff, 3);
        assert_eq!(b.payoff_date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(b.monthly_payment, Money::from_major(250));
        assert_eq!(b.total_interest, Money::from_decimal(dec!(15.50)));

        assert_eq!(
            projection.debt_free_date(),
            NaiveDate::from_ymd_opt(2024, 11, 1)
        );
    }

    #[test]
    fn test_no_surplus_matches_baseline() {
        let loans = scenario();
        let engine = ProjectionEngine::default();
        let baseline = engine.baseline(&loans);

        for strategy in StrategyType::ALL {
            let projection = engine.project(&loans, Some(&budget(200)), Some(strategy));
            assert_eq!(projection.total_months, baseline.total_months);
            assert_eq!(projection.total_interest, baseline.total_interest);
            assert_eq!(projection.interest_savings, Money::ZERO);
            assert_eq!(projection.time_savings, 0);
            assert!(projection.extra_payment_allocations.is_empty());
        }
    }

    #[test]
    fn test_missing_or_inactive_budget_uses_minimums() {
        let loans = scenario();
        let without = project(&loans, None, Some(StrategyType::Snowball));
        assert_eq!(without.monthly_budget, Money::from_major(200));
        assert_eq!(without.total_months, 23);
        assert_eq!(without.total_interest, Money::from_decimal(dec!(297.37)));

        let mut paused = budget(400);
        paused.is_active = false;
        let inactive = project(&loans, Some(&paused), Some(StrategyType::Snowball));
        assert_eq!(inactive, without);
    }

    #[test]
    fn test_short_budget_projects_minimums() {
        let loans = scenario();
        let projection = project(&loans, Some(&budget(120)), Some(StrategyType::Avalanche));

        assert_eq!(projection.monthly_budget, Money::from_major(120));
        assert_eq!(projection.total_months, 23);
        assert_eq!(projection.time_savings, 0);
        assert!(projection.extra_payment_allocations.is_empty());
    }

    #[test]
    fn test_zero_loans() {
        let projection = project(&[], Some(&budget(400)), Some(StrategyType::Avalanche));
        assert_eq!(projection.total_months, 0);
        assert_eq!(projection.total_interest, Money::ZERO);
        assert_eq!(projection.interest_savings, Money::ZERO);
        assert!(projection.projections.is_empty());
        assert!(projection.extra_payment_allocations.is_empty());
        assert_eq!(projection.debt_free_date(), None);
    }

    #[test]
    fn test_non_converging_loan_is_reported_not_failed() {
        let loans = vec![loan("stuck", 1_000, 20, 24)];
        let projection = project(&loans, None, None);

        let stuck = projection.projection(&"stuck".into()).unwrap();
        assert!(!stuck.paid_off);
        assert_eq!(stuck.months_to_payoff, 600);
        assert_eq!(stuck.payoff_date, NaiveDate::from_ymd_opt(2074, 1, 1).unwrap());
        assert!(!projection.converged());
    }

    #[test]
    fn test_compare_reports_both_scenarios() {
        let loans = scenario();
        let comparison = ProjectionEngine::default().compare(&loans, Some(&budget(400)), Some(StrategyType::Avalanche));

        assert_eq!(comparison.baseline.strategy, None);
        assert_eq!(comparison.baseline.monthly_budget, Money::from_major(200));
        assert_eq!(comparison.baseline.total_months, 23);
        assert_eq!(comparison.strategy.strategy, Some(StrategyType::Avalanche));
        assert_eq!(comparison.strategy.total_months, 10);
        assert_eq!(comparison.interest_savings, Money::from_decimal(dec!(175.31)));
        assert_eq!(comparison.time_savings, 13);
        assert!(comparison.strategy.converged);
    }

    #[test]
    fn test_compare_strategies_ranks_by_interest() {
        let loans = scenario();
        let ranked = ProjectionEngine::default().compare_strategies(&loans, Some(&budget(400)));

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].total_interest, Money::from_decimal(dec!(122.06)));
        assert_eq!(ranked[1].total_interest, Money::from_decimal(dec!(122.06)));
        assert_eq!(ranked[2].strategy, Some(StrategyType::Custom));
        assert_eq!(ranked[2].total_interest, Money::from_decimal(dec!(135.72)));
    }

    #[test]
    fn test_projection_json_is_camel_case() {
        let loans = scenario();
        let projection = project(&loans, Some(&budget(400)), Some(StrategyType::Avalanche));
        let json = projection.to_json_pretty().unwrap();

        assert!(json.contains("\"extraPaymentAllocations\""));
        assert!(json.contains("\"interestSavings\""));
        assert!(json.contains("\"strategy\": \"avalanche\""));
        assert!(json.contains("\"payoffDate\": \"2024-04-01\""));
    }
}
