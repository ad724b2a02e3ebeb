//! Employee profile model.
//!
//! The employee directory is an external collaborator; the engine only needs the
//! two facts about an employee that change pay: the base daily rate and whether the
//! employee belongs to the cost center that carries the "short" deduction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The payroll-relevant view of an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    /// Unique identifier for the employee.
    pub id: String,
    /// The daily rate used when an attendance record does not carry its own.
    pub base_daily_rate: Decimal,
    /// True if the employee belongs to the cost center subject to the "short" deduction.
    #[serde(default)]
    pub cost_center_flag: bool,
}

impl EmployeeProfile {
    /// Rejects profiles whose base rate is negative.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::EmployeeProfile;
    /// use rust_decimal::Decimal;
    ///
    /// let profile = EmployeeProfile {
    ///     id: "emp_001".to_string(),
    ///     base_daily_rate: Decimal::new(-1, 0),
    ///     cost_center_flag: false,
    /// };
    /// assert!(profile.validate().is_err());
    /// ```
    pub fn validate(&self) -> EngineResult<()> {
        if self.base_daily_rate < Decimal::ZERO {
            return Err(EngineError::NegativeInput {
                field: "base_daily_rate".to_string(),
                value: self.base_daily_rate,
            });
        }
        Ok(())
    }
}
