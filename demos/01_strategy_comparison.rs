/// strategy comparison - rank snowball, avalanche and custom for one budget
use chrono::NaiveDate;
use debt_payoff_rs::{Loan, Money, MonthlyBudget, PlannerConfig, ProjectionEngine, StrategyType};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let start = NaiveDate::from_ymd_opt(2024, 3, 15).ok_or("bad date")?;

    let loans = vec![
        Loan::builder()
            .id("bank")
            .balance(Money::from_major(4_800))
            .minimum_payment(Money::from_major(120))
            .rate_percent(dec!(9.5))
            .start_date(start)
            .priority(2)
            .build()?,
        Loan::builder()
            .id("app")
            .balance(Money::from_major(650))
            .minimum_payment(Money::from_major(40))
            .rate_percent(dec!(36))
            .start_date(start)
            .build()?,
        Loan::builder()
            .id("uncle")
            .balance(Money::from_major(1_500))
            .minimum_payment(Money::from_major(50))
            .rate_percent(dec!(0))
            .start_date(start)
            .priority(1)
            .build()?,
    ];

    let engine = ProjectionEngine::new(PlannerConfig::without_timeline());
    let budget = MonthlyBudget::new(Money::from_major(450));

    let baseline = engine.baseline(&loans);
    println!(
        "minimum payments only: {} months, {} interest",
        baseline.total_months, baseline.total_interest
    );

    for projection in engine.compare_strategies(&loans, Some(&budget)) {
        let name = projection.strategy.map_or("none", |s: StrategyType| s.as_str());
        println!(
            "{:<10} {} months, {} interest, saves {} over {} months",
            name,
            projection.total_months,
            projection.total_interest,
            projection.interest_savings,
            projection.time_savings
        );
        for (loan_id, extra) in &projection.extra_payment_allocations {
            println!("    first month extra to {}: {}", loan_id, extra);
        }
    }

    Ok(())
}
