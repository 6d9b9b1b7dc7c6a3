/// dashboard refresh - record payments and re-project on every change
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use debt_payoff_rs::{
    DashboardView, DebtDashboard, Event, Loan, LoanSource, Money, PlannerConfig, SafeTimeProvider,
    StrategyType, TimeSource,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
    ));
    let control = time.test_control().unwrap();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?;

    let mut dashboard = DebtDashboard::new(PlannerConfig::standard())?;
    dashboard.subscribe(|event| match event {
        Event::PaymentRecorded { loan_id, new_balance, .. } => {
            println!("refresh: {} now owes {}", loan_id, new_balance)
        }
        Event::LoanPaidOff { loan_id, .. } => println!("refresh: {} paid off", loan_id),
        Event::ProjectionComputed { total_months, total_interest, .. } => {
            println!("refresh: debt free in {} months, {} interest", total_months, total_interest)
        }
        _ => {}
    });

    dashboard.add_loan(
        Loan::builder()
            .id("bank")
            .source(LoanSource::Bank)
            .balance(Money::from_major(3_000))
            .minimum_payment(Money::from_major(90))
            .rate_percent(dec!(11))
            .start_date(start)
            .build()?,
        &time,
    )?;
    dashboard.add_loan(
        Loan::builder()
            .id("friend")
            .source(LoanSource::PrivatePerson)
            .balance(Money::from_major(200))
            .minimum_payment(Money::from_major(50))
            .start_date(start)
            .build()?,
        &time,
    )?;

    dashboard.set_budget(Some(Money::from_major(300)), &time)?;
    dashboard.set_strategy(Some(StrategyType::Snowball), &time);
    dashboard.project(&time);

    for _ in 0..4 {
        control.advance(Duration::days(30));
        for loan_id in ["bank", "friend"] {
            let id = loan_id.into();
            let active = dashboard.loan(&id).map_or(false, |loan| loan.is_active);
            if active {
                dashboard.record_payment(&id, Money::from_major(150), &time)?;
            }
        }
        dashboard.project(&time);
    }

    println!("{}", DashboardView::from_dashboard(&dashboard).to_json_pretty()?);

    Ok(())
}
