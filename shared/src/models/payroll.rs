//! Payroll models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of a payroll import file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRow {
    pub employee_number: String,
    pub employee_name: String,
    pub base_salary: Decimal,
    pub allowance: Decimal,
    pub deduction: Decimal,
}

impl PayrollRow {
    /// Net pay: base salary plus allowance minus deduction.
    pub fn net_pay(&self) -> Decimal {
        self.base_salary + self.allowance - self.deduction
    }

    /// A row is payable when all components are non-negative and the net
    /// pay does not go below zero.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.employee_number.trim().is_empty() {
            return Err("Employee number is required");
        }
        if self.employee_name.trim().is_empty() {
            return Err("Employee name is required");
        }
        if self.base_salary < Decimal::ZERO {
            return Err("Base salary cannot be negative");
        }
        if self.allowance < Decimal::ZERO {
            return Err("Allowance cannot be negative");
        }
        if self.deduction < Decimal::ZERO {
            return Err("Deduction cannot be negative");
        }
        if self.net_pay() < Decimal::ZERO {
            return Err("Net pay cannot be negative");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn row(base: &str, allowance: &str, deduction: &str) -> PayrollRow {
        PayrollRow {
            employee_number: "EMP001".to_string(),
            employee_name: "Budi Santoso".to_string(),
            base_salary: dec(base),
            allowance: dec(allowance),
            deduction: dec(deduction),
        }
    }

    #[test]
    fn test_net_pay() {
        assert_eq!(row("3500000", "500000", "250000").net_pay(), dec("3750000"));
    }

    #[test]
    fn test_validate_ok() {
        assert!(row("3500000", "0", "0").validate().is_ok());
    }

    #[test]
    fn test_validate_negative_component() {
        assert!(row("-1", "0", "0").validate().is_err());
        assert!(row("3500000", "-1", "0").validate().is_err());
        assert!(row("3500000", "0", "-1").validate().is_err());
    }

    #[test]
    fn test_validate_negative_net_pay() {
        assert!(row("100", "0", "200").validate().is_err());
    }

    #[test]
    fn test_validate_missing_fields() {
        let mut r = row("100", "0", "0");
        r.employee_number = "  ".to_string();
        assert!(r.validate().is_err());

        let mut r = row("100", "0", "0");
        r.employee_name = String::new();
        assert!(r.validate().is_err());
    }
}
