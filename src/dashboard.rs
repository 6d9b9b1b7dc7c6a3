use std::collections::BTreeMap;

use hourglass_rs::SafeTimeProvider;

use crate::config::PlannerConfig;
use crate::decimal::Money;
use crate::errors::{PlannerError, Result};
use crate::events::{Event, EventStore};
use crate::loan::{total_minimum_payments, Loan, MonthlyBudget};
use crate::payments::{AmortizationCalculator, PayoffSchedule};
use crate::projection::{ProjectionEngine, ScenarioComparison, StrategyProjection};
use crate::types::{LoanId, LoanSource, PaymentApplication, StrategyType};

/// the user's loan book, budget and chosen strategy
///
/// Bookkeeping calls validate their input and emit timestamped events; the
/// projection calls run the engine over the active loans as they stand.
pub struct DebtDashboard {
    pub config: PlannerConfig,
    pub events: EventStore,
    loans: Vec<Loan>,
    budget: Option<MonthlyBudget>,
    strategy: Option<StrategyType>,
    engine: ProjectionEngine,
}

impl DebtDashboard {
    pub fn new(config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            engine: ProjectionEngine::new(config.clone()),
            config,
            events: EventStore::new(),
            loans: Vec::new(),
            budget: None,
            strategy: None,
        })
    }

    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    pub fn loan(&self, loan_id: &LoanId) -> Option<&Loan> {
        self.loans.iter().find(|loan| &loan.id == loan_id)
    }

    pub fn budget(&self) -> Option<&MonthlyBudget> {
        self.budget.as_ref()
    }

    pub fn strategy(&self) -> Option<StrategyType> {
        self.strategy
    }

    /// register a refresh callback for every event
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.events.subscribe(listener);
    }

    pub fn add_loan(&mut self, loan: Loan, time_provider: &SafeTimeProvider) -> Result<()> {
        loan.validate()?;

        if self.loan(&loan.id).is_some() {
            return Err(PlannerError::DuplicateLoan { id: loan.id });
        }

        self.events.emit(Event::LoanAdded {
            loan_id: loan.id.clone(),
            balance: loan.current_balance,
            minimum_payment: loan.minimum_payment,
            timestamp: time_provider.now(),
        });

        self.loans.push(loan);
        Ok(())
    }

    /// replace a loan record, matched by id
    pub fn update_loan(&mut self, loan: Loan, time_provider: &SafeTimeProvider) -> Result<()> {
        loan.validate()?;

        let index = self.position(&loan.id)?;
        let old_balance = self.loans[index].current_balance;

        self.events.emit(Event::LoanUpdated {
            loan_id: loan.id.clone(),
            old_balance,
            new_balance: loan.current_balance,
            timestamp: time_provider.now(),
        });

        self.loans[index] = loan;
        Ok(())
    }

    pub fn remove_loan(&mut self, loan_id: &LoanId, time_provider: &SafeTimeProvider) -> Result<Loan> {
        let index = self.position(loan_id)?;
        let loan = self.loans.remove(index);

        self.events.emit(Event::LoanRemoved {
            loan_id: loan.id.clone(),
            timestamp: time_provider.now(),
        });

        Ok(loan)
    }

    /// record a real payment with system time
    pub fn record_payment_now(&mut self, loan_id: &LoanId, amount: Money) -> Result<PaymentApplication> {
        let time = SafeTimeProvider::new(hourglass_rs::TimeSource::System);
        self.record_payment(loan_id, amount, &time)
    }

    /// record a real payment: one month's interest first, then principal
    ///
    /// anything beyond the remaining balance is reported as excess, and a loan
    /// brought within tolerance of zero is deactivated
    pub fn record_payment(
        &mut self,
        loan_id: &LoanId,
        amount: Money,
        time_provider: &SafeTimeProvider,
    ) -> Result<PaymentApplication> {
        if !amount.is_positive() {
            return Err(PlannerError::InvalidPaymentAmount { amount });
        }

        let tolerance = self.config.balance_tolerance;
        let index = self.position(loan_id)?;
        let loan = &mut self.loans[index];

        if !loan.is_active {
            return Err(PlannerError::LoanAlreadyPaidOff { id: loan.id.clone() });
        }

        let to_interest = amount.min(loan.monthly_interest());
        let to_principal = (amount - to_interest).min(loan.current_balance);
        let application = PaymentApplication {
            to_interest,
            to_principal,
            excess: amount - to_interest - to_principal,
        };

        loan.current_balance -= to_principal;
        let paid_off = loan.is_paid_off(tolerance);
        if paid_off {
            loan.is_active = false;
        }

        let now = time_provider.now();
        let loan_id = loan.id.clone();
        let new_balance = loan.current_balance;

        self.events.emit(Event::PaymentRecorded {
            loan_id: loan_id.clone(),
            amount,
            applied_to_interest: to_interest,
            applied_to_principal: to_principal,
            new_balance,
            timestamp: now,
        });

        if paid_off {
            self.events.emit(Event::LoanPaidOff {
                loan_id,
                timestamp: now,
            });
        }

        Ok(application)
    }

    /// set or clear the monthly budget
    pub fn set_budget(&mut self, amount: Option<Money>, time_provider: &SafeTimeProvider) -> Result<()> {
        let budget = amount.map(MonthlyBudget::new);
        if let Some(budget) = &budget {
            budget.validate()?;
        }

        let old_budget = self.active_budget();
        self.budget = budget;

        self.events.emit(Event::BudgetChanged {
            old_budget,
            new_budget: self.active_budget(),
            timestamp: time_provider.now(),
        });

        Ok(())
    }

    pub fn set_strategy(&mut self, strategy: Option<StrategyType>, time_provider: &SafeTimeProvider) {
        let old_strategy = self.strategy;
        self.strategy = strategy;

        self.events.emit(Event::StrategyChanged {
            old_strategy,
            new_strategy: strategy,
            timestamp: time_provider.now(),
        });
    }

    /// outstanding balance across active loans
    pub fn total_balance(&self) -> Money {
        self.active_loans().map(|loan| loan.current_balance).sum()
    }

    pub fn total_minimum_payments(&self) -> Money {
        total_minimum_payments(&self.loans)
    }

    /// outstanding balance per lender type; loans without a source count as other
    pub fn balance_by_source(&self) -> BTreeMap<LoanSource, Money> {
        let mut totals = BTreeMap::new();
        for loan in self.active_loans() {
            *totals
                .entry(loan.source.unwrap_or(LoanSource::Other))
                .or_insert(Money::ZERO) += loan.current_balance;
        }
        totals
    }

    /// project the current plan and notify listeners
    pub fn project(&mut self, time_provider: &SafeTimeProvider) -> StrategyProjection {
        let projection = self.engine.project(&self.loans, self.budget.as_ref(), self.strategy);
        let now = time_provider.now();

        for stuck in projection.projections.iter().filter(|projection| !projection.paid_off) {
            self.events.emit(Event::NonConvergingLoan {
                loan_id: stuck.loan_id.clone(),
                months: stuck.months_to_payoff,
                timestamp: now,
            });
        }

        self.events.emit(Event::ProjectionComputed {
            strategy: projection.strategy,
            total_months: projection.total_months,
            total_interest: projection.total_interest,
            interest_savings: projection.interest_savings,
            timestamp: now,
        });

        projection
    }

    pub fn compare(&self) -> ScenarioComparison {
        self.engine.compare(&self.loans, self.budget.as_ref(), self.strategy)
    }

    pub fn compare_strategies(&self) -> Vec<StrategyProjection> {
        self.engine.compare_strategies(&self.loans, self.budget.as_ref())
    }

    /// payoff table for one loan paying only its minimum
    pub fn loan_schedule(&self, loan_id: &LoanId) -> Result<PayoffSchedule> {
        let loan = self
            .loan(loan_id)
            .ok_or_else(|| PlannerError::LoanNotFound { id: loan_id.clone() })?;

        Ok(AmortizationCalculator::new(&self.config).schedule(
            loan.current_balance,
            loan.minimum_payment,
            loan.interest_rate,
            loan.start_date,
        ))
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    fn active_loans(&self) -> impl Iterator<Item = &Loan> {
        self.loans.iter().filter(|loan| loan.is_active)
    }

    fn active_budget(&self) -> Option<Money> {
        self.budget
            .as_ref()
            .filter(|budget| budget.is_active)
            .map(|budget| budget.monthly_allocation)
    }

    fn position(&self, loan_id: &LoanId) -> Result<usize> {
        self.loans
            .iter()
            .position(|loan| &loan.id == loan_id)
            .ok_or_else(|| PlannerError::LoanNotFound { id: loan_id.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Mutex};

    fn time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ))
    }

    fn loan(id: &str, balance: i64, minimum: i64, rate: u32, source: LoanSource) -> Loan {
        Loan::builder()
            .id(id)
            .source(source)
            .balance(Money::from_major(balance))
            .minimum_payment(Money::from_major(minimum))
            .rate_percent(rate.into())
            .start_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .build()
            .unwrap()
    }

    fn dashboard(time: &SafeTimeProvider) -> DebtDashboard {
        let mut dashboard = DebtDashboard::new(PlannerConfig::standard()).unwrap();
        dashboard.add_loan(loan("A", 1_000, 50, 12, LoanSource::Bank), time).unwrap();
        dashboard.add_loan(loan("B", 500, 50, 24, LoanSource::MobileApp), time).unwrap();
        dashboard.add_loan(loan("C", 2_000, 100, 6, LoanSource::Bank), time).unwrap();
        dashboard
    }

    #[test]
    fn test_loan_book_bookkeeping() {
        let time = time();
        let mut dashboard = dashboard(&time);

        let duplicate = dashboard.add_loan(loan("A", 10, 5, 0, LoanSource::Other), &time);
        assert!(matches!(duplicate, Err(PlannerError::DuplicateLoan { .. })));

        let mut bad = loan("D", 100, 10, 5, LoanSource::PrivatePerson);
        bad.minimum_payment = Money::ZERO;
        assert!(matches!(dashboard.add_loan(bad, &time), Err(PlannerError::InvalidLoan { .. })));

        let mut updated = dashboard.loan(&"A".into()).unwrap().clone();
        updated.current_balance = Money::from_major(900);
        dashboard.update_loan(updated, &time).unwrap();
        assert_eq!(dashboard.loan(&"A".into()).unwrap().current_balance, Money::from_major(900));

        let missing = dashboard.update_loan(loan("Z", 10, 5, 0, LoanSource::Other), &time);
        assert!(matches!(missing, Err(PlannerError::LoanNotFound { .. })));

        let removed = dashboard.remove_loan(&"C".into(), &time).unwrap();
        assert_eq!(removed.id, LoanId::from("C"));
        assert_eq!(dashboard.loans().len(), 2);

        let events = dashboard.take_events();
        assert_eq!(events.len(), 5);
        assert!(matches!(events[3], Event::LoanUpdated { .. }));
        assert!(matches!(events[4], Event::LoanRemoved { .. }));
    }

    #[test]
    fn test_record_payment_applies_interest_first() {
        let time = time();
        let mut dashboard = dashboard(&time);

        let application = dashboard
            .record_payment(&"A".into(), Money::from_major(100), &time)
            .unwrap();

        assert_eq!(application.to_interest, Money::from_major(10));
        assert_eq!(application.to_principal, Money::from_major(90));
        assert_eq!(application.excess, Money::ZERO);
        assert_eq!(dashboard.loan(&"A".into()).unwrap().current_balance, Money::from_major(910));
    }

    #[test]
    fn test_payoff_deactivates_loan() {
        let time = time();
        let mut dashboard = DebtDashboard::new(PlannerConfig::standard()).unwrap();
        dashboard.add_loan(loan("app", 100, 20, 12, LoanSource::MobileApp), &time).unwrap();
        dashboard.take_events();

        let application = dashboard
            .record_payment(&"app".into(), Money::from_major(150), &time)
            .unwrap();

        assert_eq!(application.to_interest, Money::ONE);
        assert_eq!(application.to_principal, Money::from_major(100));
        assert_eq!(application.excess, Money::from_major(49));
        assert!(!dashboard.loan(&"app".into()).unwrap().is_active);
        assert_eq!(dashboard.total_balance(), Money::ZERO);

        let events = dashboard.take_events();
        assert!(matches!(events.last(), Some(Event::LoanPaidOff { .. })));

        let again = dashboard.record_payment(&"app".into(), Money::from_major(10), &time);
        assert!(matches!(again, Err(PlannerError::LoanAlreadyPaidOff { .. })));
    }

    #[test]
    fn test_record_payment_rejects_bad_input() {
        let time = time();
        let mut dashboard = dashboard(&time);

        let zero = dashboard.record_payment(&"A".into(), Money::ZERO, &time);
        assert!(matches!(zero, Err(PlannerError::InvalidPaymentAmount { .. })));

        let unknown = dashboard.record_payment(&"nope".into(), Money::ONE, &time);
        assert!(matches!(unknown, Err(PlannerError::LoanNotFound { .. })));
    }

    #[test]
    fn test_summaries() {
        let time = time();
        let dashboard = dashboard(&time);

        assert_eq!(dashboard.total_balance(), Money::from_major(3_500));
        assert_eq!(dashboard.total_minimum_payments(), Money::from_major(200));

        let by_source = dashboard.balance_by_source();
        assert_eq!(by_source[&LoanSource::Bank], Money::from_major(3_000));
        assert_eq!(by_source[&LoanSource::MobileApp], Money::from_major(500));
        assert!(!by_source.contains_key(&LoanSource::PrivatePerson));
    }

    #[test]
    fn test_project_notifies_listeners() {
        let time = time();
        let control = time.test_control().unwrap();
        let mut dashboard = dashboard(&time);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        dashboard.subscribe(move |event| {
            sink.lock().unwrap().push(event.clone());
        });

        control.advance(Duration::days(1));
        dashboard.set_budget(Some(Money::from_major(400)), &time).unwrap();
        dashboard.set_strategy(Some(StrategyType::Avalanche), &time);

        let projection = dashboard.project(&time);
        assert_eq!(projection.total_months, 10);
        assert_eq!(projection.interest_savings, Money::from_decimal(dec!(175.31)));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(matches!(seen[2], Event::ProjectionComputed { total_months: 10, .. }));
        assert_eq!(
            seen[0].timestamp(),
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_budget_changes() {
        let time = time();
        let mut dashboard = dashboard(&time);

        let negative = dashboard.set_budget(Some(Money::ZERO - Money::ONE), &time);
        assert!(matches!(negative, Err(PlannerError::InvalidBudget { .. })));
        assert!(dashboard.budget().is_none());

        dashboard.set_budget(Some(Money::from_major(300)), &time).unwrap();
        dashboard.set_budget(None, &time).unwrap();

        let events = dashboard.take_events();
        assert!(matches!(
            events.last(),
            Some(Event::BudgetChanged { new_budget: None, .. })
        ));
    }

    #[test]
    fn test_non_converging_loan_is_flagged() {
        let time = time();
        let mut dashboard = DebtDashboard::new(PlannerConfig::without_timeline()).unwrap();
        dashboard.add_loan(loan("stuck", 1_000, 20, 24, LoanSource::PrivatePerson), &time).unwrap();
        dashboard.take_events();

        let projection = dashboard.project(&time);
        assert!(!projection.converged());

        let events = dashboard.take_events();
        assert!(matches!(events[0], Event::NonConvergingLoan { months: 600, .. }));
    }

    #[test]
    fn test_compare_and_schedule() {
        let time = time();
        let mut dashboard = dashboard(&time);
        dashboard.set_budget(Some(Money::from_major(400)), &time).unwrap();
        dashboard.set_strategy(Some(StrategyType::Snowball), &time);

        let comparison = dashboard.compare();
        assert_eq!(comparison.time_savings, 13);
        assert_eq!(dashboard.compare_strategies().len(), 3);

        let schedule = dashboard.loan_schedule(&"B".into()).unwrap();
        assert_eq!(schedule.months(), 12);
        assert!(schedule.converges);

        assert!(dashboard.loan_schedule(&"Z".into()).is_err());
    }
}
