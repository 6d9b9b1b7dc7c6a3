pub mod config;
pub mod dashboard;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod loan;
pub mod payments;
pub mod projection;
pub mod serialization;
pub mod simulation;
pub mod types;

// re-export key types
pub use config::PlannerConfig;
pub use dashboard::DebtDashboard;
pub use decimal::{Money, Rate};
pub use errors::{PlannerError, Result};
pub use events::{Event, EventStore};
pub use loan::{effective_budget, total_minimum_payments, Loan, LoanBuilder, MonthlyBudget};
pub use payments::{
    order_by_strategy, AmortizationCalculator, BudgetAllocator, PaymentAllocation, PayoffSchedule,
};
pub use projection::{
    project, PaymentProjection, ProjectionEngine, ScenarioComparison, ScenarioSummary,
    StrategyProjection,
};
pub use serialization::{DashboardView, ProjectionRequest};
pub use simulation::{simulate, LoanOutcome, RolloverSimulator, SimulationRun};
pub use types::{LoanId, LoanSource, PaymentApplication, StrategyType};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
