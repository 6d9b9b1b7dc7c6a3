use thiserror::Error;

use crate::decimal::Money;
use crate::types::LoanId;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("invalid loan {id}: {message}")]
    InvalidLoan {
        id: LoanId,
        message: String,
    },

    #[error("duplicate loan id: {id}")]
    DuplicateLoan {
        id: LoanId,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: LoanId,
    },

    #[error("loan already paid off: {id}")]
    LoanAlreadyPaidOff {
        id: LoanId,
    },

    #[error("unknown strategy: {value}")]
    UnknownStrategy {
        value: String,
    },

    #[error("invalid monthly budget: {amount}")]
    InvalidBudget {
        amount: Money,
    },

    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
