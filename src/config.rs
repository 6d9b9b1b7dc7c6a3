use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{PlannerError, Result};

/// hard cap on simulated months (50 years)
pub const MAX_HORIZON_MONTHS: u32 = 600;

/// priority assigned to loans without one under the custom strategy
pub const DEFAULT_PRIORITY: i32 = 999;

/// largest balance, payment or budget accepted from callers, in major units
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// largest annual rate accepted from callers, as a percentage
pub const MAX_RATE_PERCENT: u32 = 10_000;

/// engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerConfig {
    /// simulation horizon, the termination guarantee for every loop
    pub horizon_months: u32,
    /// balances and capacities at or below this are treated as zero
    pub balance_tolerance: Money,
    /// snapshot allocations at or below this are dropped from display
    pub display_threshold: Money,
    /// single-loan interest stops accumulating past this multiple of the starting balance
    pub runaway_interest_multiple: Decimal,
    /// decimal places for reported amounts
    pub output_precision: u32,
    /// keep a per-month timeline on simulation runs
    pub record_timeline: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl PlannerConfig {
    /// 600-month horizon, cent tolerance, cent output
    pub fn standard() -> Self {
        Self {
            horizon_months: MAX_HORIZON_MONTHS,
            balance_tolerance: Money::CENT,
            display_threshold: Money::MILL,
            runaway_interest_multiple: dec!(100),
            output_precision: 2,
            record_timeline: true,
        }
    }

    /// standard settings without the per-month timeline, for bulk comparisons
    pub fn without_timeline() -> Self {
        Self {
            record_timeline: false,
            ..Self::standard()
        }
    }

    /// override the horizon
    pub fn with_horizon(mut self, months: u32) -> Self {
        self.horizon_months = months;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon_months == 0 {
            return Err(PlannerError::InvalidConfiguration {
                message: "horizon must be at least one month".to_string(),
            });
        }

        if self.balance_tolerance.is_negative() || self.display_threshold.is_negative() {
            return Err(PlannerError::InvalidConfiguration {
                message: "tolerances must not be negative".to_string(),
            });
        }

        if self.runaway_interest_multiple <= Decimal::ZERO {
            return Err(PlannerError::InvalidConfiguration {
                message: format!(
                    "runaway interest multiple must be positive, got {}",
                    self.runaway_interest_multiple
                ),
            });
        }

        if self.output_precision > 8 {
            return Err(PlannerError::InvalidConfiguration {
                message: format!(
                    "output precision {} exceeds working precision of 8",
                    self.output_precision
                ),
            });
        }

        Ok(())
    }

    /// round a reported amount to the configured precision
    ///
    /// uses banker's rounding, so `0.125` reports as `0.12` rather than `0.13`
    pub fn round(&self, amount: Money) -> Money {
        amount.round_dp(self.output_precision)
    }
}
