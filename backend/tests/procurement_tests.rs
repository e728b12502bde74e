//! Warehouse procurement tests
//!
//! Tests for the purchase request/order flow:
//! - Request states: draft -> submitted -> approved | rejected
//! - Order line totals and received-quantity bounds

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{PurchaseOrderStatus, PurchaseRequestStatus};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// An order line in the simulated store
#[derive(Debug, Clone)]
struct SimOrderLine {
    ordered: Decimal,
    unit_price: Decimal,
}

/// Check a goods receipt against order lines the way the service does.
fn check_receipt(lines: &[SimOrderLine], received: &[Decimal]) -> Result<(), &'static str> {
    if received.is_empty() {
        return Err("Receipt must have at least one item");
    }
    if received.len() > lines.len() {
        return Err("Received material is not on the order");
    }
    for (line, quantity) in lines.iter().zip(received) {
        if *quantity <= Decimal::ZERO {
            return Err("Received quantity must be positive");
        }
        if *quantity > line.ordered {
            return Err("Received quantity exceeds ordered");
        }
    }
    Ok(())
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_request_lifecycle() {
        use PurchaseRequestStatus::*;

        assert!(Draft.can_transition_to(Submitted));
        assert!(Submitted.can_transition_to(Approved));
        assert!(Submitted.can_transition_to(Rejected));
    }

    #[test]
    fn test_request_cannot_skip_submission() {
        use PurchaseRequestStatus::*;

        assert!(!Draft.can_transition_to(Approved));
        assert!(!Draft.can_transition_to(Rejected));
        // Terminal states stay terminal
        assert!(!Approved.can_transition_to(Submitted));
        assert!(!Rejected.can_transition_to(Submitted));
        assert!(!Approved.can_transition_to(Rejected));
    }

    #[test]
    fn test_order_status_wire_format() {
        for s in [
            PurchaseOrderStatus::Open,
            PurchaseOrderStatus::Received,
            PurchaseOrderStatus::Cancelled,
        ] {
            assert_eq!(PurchaseOrderStatus::parse(s.as_str()), Some(s));
        }
    }

    #[test]
    fn test_order_line_total() {
        let line = SimOrderLine { ordered: dec("40"), unit_price: dec("125000") };
        let total = (line.ordered * line.unit_price).round_dp(2);

        assert_eq!(total, dec("5000000.00"));
    }

    #[test]
    fn test_receipt_within_ordered_quantity() {
        let lines = vec![
            SimOrderLine { ordered: dec("40"), unit_price: dec("125000") },
            SimOrderLine { ordered: dec("10"), unit_price: dec("78000") },
        ];

        assert!(check_receipt(&lines, &[dec("40"), dec("10")]).is_ok());
        assert!(check_receipt(&lines, &[dec("39.5"), dec("2")]).is_ok());
    }

    #[test]
    fn test_receipt_exceeding_order_rejected() {
        let lines = vec![SimOrderLine { ordered: dec("40"), unit_price: dec("125000") }];

        assert!(check_receipt(&lines, &[dec("41")]).is_err());
    }

    #[test]
    fn test_empty_receipt_rejected() {
        let lines = vec![SimOrderLine { ordered: dec("40"), unit_price: dec("125000") }];

        assert!(check_receipt(&lines, &[]).is_err());
    }

    #[test]
    fn test_document_number_format() {
        // PREFIX-YYYY-NNNN
        let number = format!("{}-{}-{:04}", "PO", 2025, 7);
        assert_eq!(number, "PO-2025-0007");

        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].len(), 4);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for quantities between 0.1 and 1000.0
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10000i64).prop_map(|n| Decimal::new(n, 1))
    }

    /// Strategy for unit prices between 0.01 and 100000.00
    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10000000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Line totals are quantity times unit price
        #[test]
        fn prop_line_total(
            quantity in quantity_strategy(),
            unit_price in price_strategy()
        ) {
            let total = (quantity * unit_price).round_dp(2);

            prop_assert!(total >= Decimal::ZERO);
            prop_assert_eq!(total, (quantity * unit_price).round_dp(2));
        }

        /// Receiving exactly the ordered quantities always passes
        #[test]
        fn prop_full_receipt_accepted(
            quantities in prop::collection::vec(quantity_strategy(), 1..10),
            unit_price in price_strategy()
        ) {
            let lines: Vec<SimOrderLine> = quantities
                .iter()
                .map(|q| SimOrderLine { ordered: *q, unit_price })
                .collect();

            prop_assert!(check_receipt(&lines, &quantities).is_ok());
        }

        /// Receiving anything above an ordered quantity always fails
        #[test]
        fn prop_over_receipt_rejected(
            ordered in quantity_strategy(),
            excess in quantity_strategy(),
            unit_price in price_strategy()
        ) {
            let lines = vec![SimOrderLine { ordered, unit_price }];
            prop_assert!(check_receipt(&lines, &[ordered + excess]).is_err());
        }
    }
}
