use std::cmp::Ordering;

use crate::loan::Loan;
use crate::types::StrategyType;

/// active loans in the order a strategy pays them down
///
/// Sorting is stable, so ties keep their input order. Without a strategy the
/// active loans come back in input order.
pub fn order_by_strategy(loans: &[Loan], strategy: Option<StrategyType>) -> Vec<&Loan> {
    let mut active: Vec<&Loan> = loans.iter().filter(|loan| loan.is_active).collect();

    if let Some(strategy) = strategy {
        active.sort_by(|a, b| compare(a, b, strategy));
    }

    active
}

/// positions into `loans` in strategy order, inactive loans excluded
pub(crate) fn strategy_positions(loans: &[Loan], strategy: StrategyType) -> Vec<usize> {
    let mut positions: Vec<usize> = loans
        .iter()
        .enumerate()
        .filter(|(_, loan)| loan.is_active)
        .map(|(index, _)| index)
        .collect();

    positions.sort_by(|&a, &b| compare(&loans[a], &loans[b], strategy));
    positions
}

fn compare(a: &Loan, b: &Loan, strategy: StrategyType) -> Ordering {
    match strategy {
        StrategyType::Snowball => a.current_balance.cmp(&b.current_balance),
        StrategyType::Avalanche => b.interest_rate.cmp(&a.interest_rate),
        StrategyType::Custom => a.effective_priority().cmp(&b.effective_priority()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Money;
    use crate::types::LoanId;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn loan(id: i64, balance: i64, rate: u32, priority: Option<i32>) -> Loan {
        let mut builder = Loan::builder()
            .id(id)
            .balance(Money::from_major(balance))
            .minimum_payment(Money::from_major(25))
            .rate_percent(Decimal::from(rate))
            .start_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        if let Some(priority) = priority {
            builder = builder.priority(priority);
        }
        builder.build().unwrap()
    }

    fn ids(ordered: &[&Loan]) -> Vec<LoanId> {
        ordered.iter().map(|loan| loan.id.clone()).collect()
    }

    fn expected(raw: &[i64]) -> Vec<LoanId> {
        raw.iter().map(|&id| LoanId::Number(id)).collect()
    }

    fn sample() -> Vec<Loan> {
        vec![
            loan(1, 1_000, 12, Some(2)),
            loan(2, 500, 24, None),
            loan(3, 2_000, 6, Some(1)),
            loan(4, 500, 18, Some(2)),
        ]
    }

    #[test]
    fn test_snowball_orders_by_balance_keeping_ties_stable() {
        let loans = sample();
        let ordered = order_by_strategy(&loans, Some(StrategyType::Snowball));
        assert_eq!(ids(&ordered), expected(&[2, 4, 1, 3]));
    }

    #[test]
    fn test_avalanche_orders_by_rate_descending() {
        let loans = sample();
        let ordered = order_by_strategy(&loans, Some(StrategyType::Avalanche));
        assert_eq!(ids(&ordered), expected(&[2, 4, 1, 3]));

        let mut tied = sample();
        tied[3].interest_rate = tied[1].interest_rate;
        let ordered = order_by_strategy(&tied, Some(StrategyType::Avalanche));
        assert_eq!(ids(&ordered)[..2], expected(&[2, 4])[..]);
    }

    #[test]
    fn test_custom_puts_missing_priority_last() {
        let loans = sample();
        let ordered = order_by_strategy(&loans, Some(StrategyType::Custom));
        assert_eq!(ids(&ordered), expected(&[3, 1, 4, 2]));
    }

    #[test]
    fn test_no_strategy_keeps_input_order_and_drops_inactive() {
        let mut loans = sample();
        loans[0].is_active = false;

        let ordered = order_by_strategy(&loans, None);
        assert_eq!(ids(&ordered), expected(&[2, 3, 4]));

        let positions = strategy_positions(&loans, StrategyType::Snowball);
        assert_eq!(positions, vec![1, 3, 2]);
    }
}
