use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::PlannerError;

/// opaque loan identifier as supplied by the surrounding application
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LoanId {
    Number(i64),
    Uuid(Uuid),
    Text(String),
}

impl LoanId {
    /// generate a fresh random identifier
    pub fn generate() -> Self {
        LoanId::Uuid(Uuid::new_v4())
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanId::Number(n) => write!(f, "{}", n),
            LoanId::Uuid(u) => write!(f, "{}", u),
            LoanId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for LoanId {
    fn from(n: i64) -> Self {
        LoanId::Number(n)
    }
}

impl From<i32> for LoanId {
    fn from(n: i32) -> Self {
        LoanId::Number(n as i64)
    }
}

impl From<Uuid> for LoanId {
    fn from(u: Uuid) -> Self {
        LoanId::Uuid(u)
    }
}

impl From<&str> for LoanId {
    fn from(s: &str) -> Self {
        LoanId::Text(s.to_string())
    }
}

impl From<String> for LoanId {
    fn from(s: String) -> Self {
        LoanId::Text(s)
    }
}

/// where a loan was taken out
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanSource {
    Bank,
    /// mobile lending app
    MobileApp,
    /// friend, family or other private lender
    PrivatePerson,
    Other,
}

/// repayment prioritization strategy
///
/// the absence of a strategy (`Option::None`) means minimum payments only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyType {
    /// smallest current balance first
    Snowball,
    /// highest interest rate first
    Avalanche,
    /// ascending user-defined priority
    Custom,
}

impl StrategyType {
    pub const ALL: [StrategyType; 3] = [
        StrategyType::Snowball,
        StrategyType::Avalanche,
        StrategyType::Custom,
    ];

    /// lenient selector parsing: anything unrecognized means no strategy
    pub fn from_selector(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") || trimmed.eq_ignore_ascii_case("null") {
            return None;
        }

        match trimmed.parse() {
            Ok(strategy) => Some(strategy),
            Err(_) => {
                log::warn!("unrecognized strategy selector {:?}, using minimum payments only", value);
                None
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyType::Snowball => "snowball",
            StrategyType::Avalanche => "avalanche",
            StrategyType::Custom => "custom",
        }
    }
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyType {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snowball" => Ok(StrategyType::Snowball),
            "avalanche" => Ok(StrategyType::Avalanche),
            "custom" => Ok(StrategyType::Custom),
            _ => Err(PlannerError::UnknownStrategy {
                value: s.to_string(),
            }),
        }
    }
}

/// split of a real payment between interest and principal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PaymentApplication {
    pub to_interest: Money,
    pub to_principal: Money,
    pub excess: Money,
}

impl PaymentApplication {
    pub fn total_applied(&self) -> Money {
        self.to_interest + self.to_principal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_strict_parsing() {
        assert_eq!("snowball".parse::<StrategyType>().unwrap(), StrategyType::Snowball);
        assert_eq!(" Avalanche ".parse::<StrategyType>().unwrap(), StrategyType::Avalanche);
        assert!(matches!(
            "fastest".parse::<StrategyType>(),
            Err(PlannerError::UnknownStrategy { .. })
        ));
    }

    #[test]
    fn test_strategy_selector_is_lenient() {
        assert_eq!(StrategyType::from_selector("custom"), Some(StrategyType::Custom));
        assert_eq!(StrategyType::from_selector("none"), None);
        assert_eq!(StrategyType::from_selector(""), None);
        assert_eq!(StrategyType::from_selector("fastest"), None);
    }

    #[test]
    fn test_loan_id_untagged_json() {
        let ids: Vec<LoanId> = serde_json::from_str(
            r#"[7, "bank-card", "67e55044-10b1-426f-9247-bb680e5fe0c8"]"#,
        )
        .unwrap();

        assert_eq!(ids[0], LoanId::Number(7));
        assert_eq!(ids[1], LoanId::from("bank-card"));
        assert!(matches!(ids[2], LoanId::Uuid(_)));
        assert_eq!(ids[2].to_string(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
    }

    #[test]
    fn test_payment_application_total() {
        let application = PaymentApplication {
            to_interest: Money::from_major(10),
            to_principal: Money::from_major(40),
            excess: Money::ZERO,
        };
        assert_eq!(application.total_applied(), Money::from_major(50));
    }
}
