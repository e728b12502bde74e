//! Tank transfer tests
//!
//! Tests for the tank invariants:
//! - 0 <= current_volume <= capacity at all times
//! - Transfers move volume atomically between tanks of the same material
//! - transfer(A, B, q) then transfer(B, A, q) restores both volumes
//! - Summed tank volume per material never exceeds the material stock balance

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{check_transfer, volume_within_capacity, TransferCheck};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// A tank in the simulated store
#[derive(Debug, Clone)]
struct SimTank {
    material: &'static str,
    capacity: Decimal,
    volume: Decimal,
}

/// Apply a transfer between two tanks the way the coordinator does: check
/// everything first, mutate both or neither.
fn simulate_transfer(source: &mut SimTank, destination: &mut SimTank, quantity: Decimal) -> TransferCheck {
    let check = check_transfer(
        source.material,
        destination.material,
        source.volume,
        destination.volume,
        destination.capacity,
        quantity,
    );

    if check == TransferCheck::Ok {
        source.volume -= quantity;
        destination.volume += quantity;
    }

    check
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Scenario: Tank A (capacity 1000, volume 800, CPO), Tank B (capacity
    /// 500, volume 100, CPO). Transfer 300 succeeds leaving 500/400; a
    /// further 200 would exceed B's capacity and changes nothing.
    #[test]
    fn test_transfer_scenario_capacity_exceeded() {
        let mut a = SimTank { material: "CPO", capacity: dec("1000"), volume: dec("800") };
        let mut b = SimTank { material: "CPO", capacity: dec("500"), volume: dec("100") };

        assert_eq!(simulate_transfer(&mut a, &mut b, dec("300")), TransferCheck::Ok);
        assert_eq!(a.volume, dec("500"));
        assert_eq!(b.volume, dec("400"));

        // 400 + 200 = 600 > 500
        assert_eq!(
            simulate_transfer(&mut a, &mut b, dec("200")),
            TransferCheck::DestinationCapacityExceeded
        );
        assert_eq!(a.volume, dec("500"));
        assert_eq!(b.volume, dec("400"));
    }

    #[test]
    fn test_transfer_material_mismatch_changes_nothing() {
        let mut a = SimTank { material: "CPO", capacity: dec("1000"), volume: dec("800") };
        let mut b = SimTank { material: "KERNEL", capacity: dec("500"), volume: dec("100") };

        assert_eq!(
            simulate_transfer(&mut a, &mut b, dec("50")),
            TransferCheck::MaterialMismatch
        );
        assert_eq!(a.volume, dec("800"));
        assert_eq!(b.volume, dec("100"));
    }

    #[test]
    fn test_transfer_insufficient_source() {
        let mut a = SimTank { material: "CPO", capacity: dec("1000"), volume: dec("100") };
        let mut b = SimTank { material: "CPO", capacity: dec("500"), volume: dec("0") };

        assert_eq!(
            simulate_transfer(&mut a, &mut b, dec("150")),
            TransferCheck::InsufficientSourceVolume
        );
        assert_eq!(a.volume, dec("100"));
        assert_eq!(b.volume, dec("0"));
    }

    /// transfer(A, B, q) then transfer(B, A, q) restores both tanks
    #[test]
    fn test_transfer_inverse_law() {
        let mut a = SimTank { material: "CPO", capacity: dec("1000"), volume: dec("800") };
        let mut b = SimTank { material: "CPO", capacity: dec("500"), volume: dec("100") };

        assert_eq!(simulate_transfer(&mut a, &mut b, dec("300")), TransferCheck::Ok);
        assert_eq!(simulate_transfer(&mut b, &mut a, dec("300")), TransferCheck::Ok);

        assert_eq!(a.volume, dec("800"));
        assert_eq!(b.volume, dec("100"));
    }

    #[test]
    fn test_volume_capacity_bounds() {
        assert!(volume_within_capacity(dec("0"), dec("1000")));
        assert!(volume_within_capacity(dec("1000"), dec("1000")));
        assert!(!volume_within_capacity(dec("-0.001"), dec("1000")));
        assert!(!volume_within_capacity(dec("1000.001"), dec("1000")));
    }

    /// A transfer never changes the summed volume, so the bound
    /// sum(tank volumes) <= material stock is preserved by transfers
    #[test]
    fn test_transfer_preserves_total_volume() {
        let mut a = SimTank { material: "CPO", capacity: dec("1000"), volume: dec("750") };
        let mut b = SimTank { material: "CPO", capacity: dec("600"), volume: dec("200") };
        let before = a.volume + b.volume;

        simulate_transfer(&mut a, &mut b, dec("400"));

        assert_eq!(a.volume + b.volume, before);
    }

    /// Filling a tank is bounded by the material stock: the coordinator
    /// rejects a fill that would push summed tank volume past the balance
    #[test]
    fn test_fill_bounded_by_material_stock() {
        let material_stock = dec("1000");
        let tank_total = dec("900");
        let fill = dec("150");

        let would_exceed = tank_total + fill > material_stock;
        assert!(would_exceed);

        let fill_ok = dec("100");
        assert!(tank_total + fill_ok <= material_stock);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for volumes between 0.1 and 1000.0
    fn volume_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10000i64).prop_map(|n| Decimal::new(n, 1))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A successful transfer conserves total volume and keeps both tanks
        /// within bounds
        #[test]
        fn prop_transfer_conserves_and_bounds(
            source_volume in volume_strategy(),
            destination_volume in volume_strategy(),
            extra_capacity in volume_strategy(),
            quantity in volume_strategy()
        ) {
            let mut source = SimTank {
                material: "CPO",
                capacity: source_volume + extra_capacity,
                volume: source_volume,
            };
            let mut destination = SimTank {
                material: "CPO",
                capacity: destination_volume + extra_capacity,
                volume: destination_volume,
            };

            let total_before = source.volume + destination.volume;
            let check = simulate_transfer(&mut source, &mut destination, quantity);

            prop_assert_eq!(source.volume + destination.volume, total_before);

            if check == TransferCheck::Ok {
                prop_assert!(volume_within_capacity(source.volume, source.capacity));
                prop_assert!(volume_within_capacity(destination.volume, destination.capacity));
            } else {
                // A rejected transfer changes neither tank
                prop_assert_eq!(source.volume, source_volume);
                prop_assert_eq!(destination.volume, destination_volume);
            }
        }

        /// The inverse law holds whenever both directions are accepted
        #[test]
        fn prop_transfer_inverse_restores_volumes(
            source_volume in volume_strategy(),
            destination_volume in volume_strategy(),
            headroom in volume_strategy(),
            quantity in volume_strategy()
        ) {
            let mut source = SimTank {
                material: "CPO",
                capacity: source_volume + destination_volume + headroom,
                volume: source_volume,
            };
            let mut destination = SimTank {
                material: "CPO",
                capacity: source_volume + destination_volume + headroom,
                volume: destination_volume,
            };

            let there = simulate_transfer(&mut source, &mut destination, quantity);
            if there == TransferCheck::Ok {
                let back = simulate_transfer(&mut destination, &mut source, quantity);
                prop_assert_eq!(back, TransferCheck::Ok);
                prop_assert_eq!(source.volume, source_volume);
                prop_assert_eq!(destination.volume, destination_volume);
            }
        }

        /// Transfers between different materials are always rejected
        #[test]
        fn prop_material_mismatch_always_rejected(
            source_volume in volume_strategy(),
            destination_volume in volume_strategy(),
            quantity in volume_strategy()
        ) {
            let mut source = SimTank {
                material: "CPO",
                capacity: dec("100000"),
                volume: source_volume,
            };
            let mut destination = SimTank {
                material: "KERNEL",
                capacity: dec("100000"),
                volume: destination_volume,
            };

            prop_assert_eq!(
                simulate_transfer(&mut source, &mut destination, quantity),
                TransferCheck::MaterialMismatch
            );
        }
    }
}
