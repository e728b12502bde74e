//! Weighbridge tests
//!
//! Tests for TBS receiving:
//! - net weight = gross - tare
//! - accepted weight = net * (1 - deduction/100)
//! - Ticket flow: weighed_in -> weighed_out -> posted

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::validation::validate_vehicle_plate;
use shared::{accepted_weight, net_weight, TicketStatus};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// The only forward step allowed from each ticket status
fn next_status(status: TicketStatus) -> Option<TicketStatus> {
    match status {
        TicketStatus::WeighedIn => Some(TicketStatus::WeighedOut),
        TicketStatus::WeighedOut => Some(TicketStatus::Posted),
        TicketStatus::Posted => None,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_net_weight() {
        // Truck arrives at 12.5t, leaves empty at 4.5t
        assert_eq!(net_weight(dec("12500"), dec("4500")), dec("8000"));
    }

    #[test]
    fn test_accepted_weight_with_sortation_deduction() {
        // 5% graded out for trash and unripe bunches
        assert_eq!(accepted_weight(dec("8000"), dec("5")), dec("7600"));
    }

    #[test]
    fn test_accepted_weight_zero_deduction() {
        assert_eq!(accepted_weight(dec("8000"), Decimal::ZERO), dec("8000"));
    }

    #[test]
    fn test_accepted_weight_full_deduction() {
        assert_eq!(accepted_weight(dec("8000"), dec("100")), Decimal::ZERO);
    }

    #[test]
    fn test_total_price() {
        let accepted = accepted_weight(net_weight(dec("12500"), dec("4500")), dec("5"));
        let unit_price = dec("2350");

        assert_eq!((accepted * unit_price).round_dp(2), dec("17860000.00"));
    }

    #[test]
    fn test_ticket_flow_is_linear() {
        assert_eq!(
            next_status(TicketStatus::WeighedIn),
            Some(TicketStatus::WeighedOut)
        );
        assert_eq!(
            next_status(TicketStatus::WeighedOut),
            Some(TicketStatus::Posted)
        );
        assert_eq!(next_status(TicketStatus::Posted), None);
    }

    #[test]
    fn test_tare_must_be_below_gross() {
        let gross = dec("12500");
        let tare = dec("12500");

        // Equal weights leave nothing delivered; the service rejects this
        assert!(net_weight(gross, tare) <= Decimal::ZERO);
    }

    #[test]
    fn test_truck_plate_formats() {
        assert!(validate_vehicle_plate("BK 8812 XY").is_ok());
        assert!(validate_vehicle_plate("BM 1 A").is_ok());
        assert!(validate_vehicle_plate("B8812XY").is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for weights between 0.1 and 10000.0 kg
    fn weight_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100000i64).prop_map(|n| Decimal::new(n, 1))
    }

    /// Strategy for deduction percentages 0.00 - 100.00
    fn deduction_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=10000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Net weight plus tare reconstructs gross
        #[test]
        fn prop_net_weight_arithmetic(
            tare in weight_strategy(),
            load in weight_strategy()
        ) {
            let gross = tare + load;
            let net = net_weight(gross, tare);

            prop_assert_eq!(net, load);
            prop_assert_eq!(net + tare, gross);
        }

        /// Accepted weight never exceeds net weight and is never negative
        #[test]
        fn prop_accepted_weight_bounded(
            net in weight_strategy(),
            deduction in deduction_strategy()
        ) {
            let accepted = accepted_weight(net, deduction);

            prop_assert!(accepted >= Decimal::ZERO);
            prop_assert!(accepted <= net);
        }

        /// A zero deduction is the identity
        #[test]
        fn prop_zero_deduction_identity(net in weight_strategy()) {
            prop_assert_eq!(accepted_weight(net, Decimal::ZERO), net);
        }

        /// Deductions compose monotonically: a larger deduction never yields
        /// a larger accepted weight
        #[test]
        fn prop_deduction_monotonic(
            net in weight_strategy(),
            d1 in deduction_strategy(),
            d2 in deduction_strategy()
        ) {
            let (low, high) = if d1 <= d2 { (d1, d2) } else { (d2, d1) };
            prop_assert!(accepted_weight(net, high) <= accepted_weight(net, low));
        }
    }
}
