//! Payroll import tests
//!
//! Tests for the CSV payroll flow:
//! - net pay = base salary + allowance - deduction, never negative
//! - One bad row rejects the whole file, reported with its row number
//! - Period format validation (YYYY-MM)

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::validation::validate_payroll_period;
use shared::PayrollRow;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Parse payroll CSV content the way the service does: trim fields, expect
/// 5 columns, validate every row, fail on the first bad one with its
/// 1-based line number (header is line 1).
fn parse_csv(content: &str) -> Result<Vec<PayrollRow>, (usize, String)> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let line = index + 2;
        let record = record.map_err(|e| (line, e.to_string()))?;

        if record.len() != 5 {
            return Err((line, format!("expected 5 columns, found {}", record.len())));
        }

        let parse = |s: &str| Decimal::from_str(s).map_err(|e| (line, e.to_string()));

        let row = PayrollRow {
            employee_number: record[0].to_string(),
            employee_name: record[1].to_string(),
            base_salary: parse(&record[2])?,
            allowance: parse(&record[3])?,
            deduction: parse(&record[4])?,
        };

        row.validate().map_err(|e| (line, e.to_string()))?;
        rows.push(row);
    }

    Ok(rows)
}

const HEADER: &str = "employee_number,employee_name,base_salary,allowance,deduction\n";

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_parse_valid_file() {
        let content = format!(
            "{}EMP001,Budi Santoso,3500000,500000,250000\nEMP002,Siti Aminah,4200000,0,100000\n",
            HEADER
        );

        let rows = parse_csv(&content).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].net_pay(), dec("3750000"));
        assert_eq!(rows[1].net_pay(), dec("4100000"));
    }

    #[test]
    fn test_bad_row_reports_line_number() {
        let content = format!(
            "{}EMP001,Budi Santoso,3500000,500000,250000\nEMP002,Siti Aminah,not-a-number,0,0\n",
            HEADER
        );

        let err = parse_csv(&content).unwrap_err();
        assert_eq!(err.0, 3);
    }

    #[test]
    fn test_negative_net_pay_rejected() {
        // Deduction exceeds salary plus allowance
        let content = format!("{}EMP001,Budi Santoso,1000000,0,1500000\n", HEADER);

        let err = parse_csv(&content).unwrap_err();
        assert_eq!(err.0, 2);
    }

    #[test]
    fn test_wrong_column_count_rejected() {
        let content = format!("{}EMP001,Budi Santoso,3500000,500000\n", HEADER);

        assert!(parse_csv(&content).is_err());
    }

    #[test]
    fn test_missing_employee_number_rejected() {
        let content = format!("{} ,Budi Santoso,3500000,0,0\n", HEADER);

        assert!(parse_csv(&content).is_err());
    }

    #[test]
    fn test_empty_file_has_no_rows() {
        let rows = parse_csv(HEADER).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_fields_are_trimmed() {
        let content = format!("{}EMP001 , Budi Santoso , 3500000 , 0 , 0\n", HEADER);

        let rows = parse_csv(&content).unwrap();
        assert_eq!(rows[0].employee_number, "EMP001");
        assert_eq!(rows[0].employee_name, "Budi Santoso");
    }

    #[test]
    fn test_period_format() {
        assert!(validate_payroll_period("2025-07").is_ok());
        assert!(validate_payroll_period("2025-7").is_err());
        assert!(validate_payroll_period("07-2025").is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for salary components between 0 and 10,000,000
    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=10_000_000i64).prop_map(Decimal::from)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Net pay arithmetic holds for every valid row
        #[test]
        fn prop_net_pay_arithmetic(
            base in amount_strategy(),
            allowance in amount_strategy(),
            deduction in amount_strategy()
        ) {
            let row = PayrollRow {
                employee_number: "EMP001".to_string(),
                employee_name: "Budi Santoso".to_string(),
                base_salary: base,
                allowance,
                deduction,
            };

            prop_assert_eq!(row.net_pay(), base + allowance - deduction);

            // Validation accepts the row exactly when net pay is non-negative
            prop_assert_eq!(row.validate().is_ok(), row.net_pay() >= Decimal::ZERO);
        }

        /// Round-tripping rows through CSV preserves every field
        #[test]
        fn prop_csv_rows_parse_back(
            base in amount_strategy(),
            allowance in amount_strategy()
        ) {
            let content = format!(
                "{}EMP001,Budi Santoso,{},{},0\n",
                HEADER, base, allowance
            );

            let rows = parse_csv(&content).unwrap();

            prop_assert_eq!(rows.len(), 1);
            prop_assert_eq!(rows[0].base_salary, base);
            prop_assert_eq!(rows[0].allowance, allowance);
        }

        /// The total of a file equals the sum of its rows' net pay
        #[test]
        fn prop_period_total_is_sum_of_rows(
            amounts in prop::collection::vec((amount_strategy(), amount_strategy()), 1..20)
        ) {
            let mut content = HEADER.to_string();
            for (i, (base, allowance)) in amounts.iter().enumerate() {
                content.push_str(&format!(
                    "EMP{:03},Pegawai {},{},{},0\n",
                    i + 1, i + 1, base, allowance
                ));
            }

            let rows = parse_csv(&content).unwrap();
            let total: Decimal = rows.iter().map(|r| r.net_pay()).sum();
            let expected: Decimal = amounts.iter().map(|(b, a)| b + a).sum();

            prop_assert_eq!(total, expected);
        }
    }
}
