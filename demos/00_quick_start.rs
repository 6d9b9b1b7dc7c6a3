/// quick start - project three loans under the avalanche strategy
use chrono::NaiveDate;
use debt_payoff_rs::{project, Loan, Money, MonthlyBudget, StrategyType};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?;

    let loans = vec![
        Loan::builder()
            .id(1)
            .name("Credit card")
            .balance(Money::from_major(1_000))
            .minimum_payment(Money::from_major(50))
            .rate_percent(dec!(12))
            .start_date(start)
            .build()?,
        Loan::builder()
            .id(2)
            .name("Phone app loan")
            .balance(Money::from_major(500))
            .minimum_payment(Money::from_major(50))
            .rate_percent(dec!(24))
            .start_date(start)
            .build()?,
        Loan::builder()
            .id(3)
            .name("Car loan")
            .balance(Money::from_major(2_000))
            .minimum_payment(Money::from_major(100))
            .rate_percent(dec!(6))
            .start_date(start)
            .build()?,
    ];

    let budget = MonthlyBudget::new(Money::from_major(400));
    let projection = project(&loans, Some(&budget), Some(StrategyType::Avalanche));

    println!("{}", projection.to_json_pretty()?);

    Ok(())
}
