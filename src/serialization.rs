//! json envelopes for the surrounding application
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;
use crate::dashboard::DebtDashboard;
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::loan::{Loan, MonthlyBudget};
use crate::payments::AmortizationCalculator;
use crate::projection::{ProjectionEngine, ScenarioComparison, StrategyProjection};
use crate::types::{LoanId, LoanSource, StrategyType};

/// a projection request as posted by a client
///
/// The strategy arrives as a free-form selector; anything unrecognized
/// projects minimum payments only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRequest {
    pub loans: Vec<Loan>,
    #[serde(default)]
    pub budget: Option<MonthlyBudget>,
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub config: Option<PlannerConfig>,
}

impl ProjectionRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn strategy_type(&self) -> Option<StrategyType> {
        self.strategy.as_deref().and_then(StrategyType::from_selector)
    }

    pub fn run(&self) -> Result<StrategyProjection> {
        let engine = self.engine()?;
        Ok(engine.project(&self.loans, self.budget.as_ref(), self.strategy_type()))
    }

    pub fn compare(&self) -> Result<ScenarioComparison> {
        let engine = self.engine()?;
        Ok(engine.compare(&self.loans, self.budget.as_ref(), self.strategy_type()))
    }

    /// check the config, every loan and the budget before handing them to the engine
    pub fn validate(&self) -> Result<()> {
        if let Some(config) = &self.config {
            config.validate()?;
        }
        for loan in &self.loans {
            loan.validate()?;
        }
        if let Some(budget) = &self.budget {
            budget.validate()?;
        }
        Ok(())
    }

    fn engine(&self) -> Result<ProjectionEngine> {
        self.validate()?;
        Ok(ProjectionEngine::new(self.config.clone().unwrap_or_default()))
    }
}

/// serializable snapshot of a dashboard
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub loans: Vec<LoanView>,
    pub plan: PlanView,
    pub totals: TotalsView,
    pub comparison: ScenarioComparison,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanView {
    pub id: LoanId,
    pub name: String,
    pub source: Option<LoanSource>,
    pub current_balance: Money,
    pub minimum_payment: Money,
    #[serde(with = "crate::decimal::percent")]
    pub interest_rate: Rate,
    pub is_active: bool,
    /// payoff date paying only the minimum, none when it never pays off
    pub payoff_at_minimum: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanView {
    pub monthly_budget: Option<Money>,
    pub strategy: Option<StrategyType>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsView {
    pub total_balance: Money,
    pub total_minimum_payments: Money,
    pub balance_by_source: BTreeMap<LoanSource, Money>,
}

impl DashboardView {
    pub fn from_dashboard(dashboard: &DebtDashboard) -> Self {
        let calculator = AmortizationCalculator::new(&dashboard.config);

        let loans = dashboard
            .loans()
            .iter()
            .map(|loan| LoanView {
                id: loan.id.clone(),
                name: loan.name.clone(),
                source: loan.source,
                current_balance: loan.current_balance,
                minimum_payment: loan.minimum_payment,
                interest_rate: loan.interest_rate,
                is_active: loan.is_active,
                payoff_at_minimum: calculator
                    .schedule(
                        loan.current_balance,
                        loan.minimum_payment,
                        loan.interest_rate,
                        loan.start_date,
                    )
                    .payoff_date(),
            })
            .collect();

        DashboardView {
            loans,
            plan: PlanView {
                monthly_budget: dashboard
                    .budget()
                    .filter(|budget| budget.is_active)
                    .map(|budget| budget.monthly_allocation),
                strategy: dashboard.strategy(),
            },
            totals: TotalsView {
                total_balance: dashboard.total_balance(),
                total_minimum_payments: dashboard.total_minimum_payments(),
                balance_by_source: dashboard.balance_by_source(),
            },
            comparison: dashboard.compare(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
