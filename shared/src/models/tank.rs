//! Storage tank models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Check that a tank volume stays within `0 ≤ volume ≤ capacity`.
pub fn volume_within_capacity(volume: Decimal, capacity: Decimal) -> bool {
    volume >= Decimal::ZERO && volume <= capacity
}

/// Outcome of validating a proposed transfer between two tanks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferCheck {
    Ok,
    MaterialMismatch,
    InsufficientSourceVolume,
    DestinationCapacityExceeded,
}

/// Validate a transfer of `quantity` from a source tank to a destination
/// tank without touching storage. All checks run before any write.
pub fn check_transfer(
    source_material: &str,
    destination_material: &str,
    source_volume: Decimal,
    destination_volume: Decimal,
    destination_capacity: Decimal,
    quantity: Decimal,
) -> TransferCheck {
    if source_material != destination_material {
        return TransferCheck::MaterialMismatch;
    }
    if source_volume < quantity {
        return TransferCheck::InsufficientSourceVolume;
    }
    if destination_volume + quantity > destination_capacity {
        return TransferCheck::DestinationCapacityExceeded;
    }
    TransferCheck::Ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_volume_within_capacity() {
        assert!(volume_within_capacity(dec("0"), dec("1000")));
        assert!(volume_within_capacity(dec("1000"), dec("1000")));
        assert!(!volume_within_capacity(dec("-1"), dec("1000")));
        assert!(!volume_within_capacity(dec("1000.1"), dec("1000")));
    }

    #[test]
    fn test_check_transfer_ok() {
        let check = check_transfer("CPO", "CPO", dec("800"), dec("100"), dec("500"), dec("300"));
        assert_eq!(check, TransferCheck::Ok);
    }

    #[test]
    fn test_check_transfer_material_mismatch() {
        let check = check_transfer("CPO", "KERNEL", dec("800"), dec("100"), dec("500"), dec("10"));
        assert_eq!(check, TransferCheck::MaterialMismatch);
    }

    #[test]
    fn test_check_transfer_insufficient_source() {
        let check = check_transfer("CPO", "CPO", dec("50"), dec("100"), dec("500"), dec("60"));
        assert_eq!(check, TransferCheck::InsufficientSourceVolume);
    }

    #[test]
    fn test_check_transfer_capacity_exceeded() {
        // 400 + 200 = 600 > 500
        let check = check_transfer("CPO", "CPO", dec("500"), dec("400"), dec("500"), dec("200"));
        assert_eq!(check, TransferCheck::DestinationCapacityExceeded);
    }
}
