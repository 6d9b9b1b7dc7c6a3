pub mod amortization;
pub mod ordering;
pub mod waterfall;

pub use amortization::{
    add_months, monthly_rate, payoff_date, total_interest, AmortizationCalculator,
    PayoffSchedule, ScheduledPayment,
};
pub use ordering::order_by_strategy;
pub use waterfall::{BudgetAllocator, LoanAllocation, PaymentAllocation};
