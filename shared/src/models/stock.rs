//! Stock ledger models
//!
//! The ledger is append-only: every balance mutation is paired with a
//! movement record carrying the balance before and after. Corrections are
//! made by appending reversing entries, never by editing history.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Type of a stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    In,
    Out,
    Adjustment,
    Transfer,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "in",
            MovementType::Out => "out",
            MovementType::Adjustment => "adjustment",
            MovementType::Transfer => "transfer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in" => Some(MovementType::In),
            "out" => Some(MovementType::Out),
            "adjustment" => Some(MovementType::Adjustment),
            "transfer" => Some(MovementType::Transfer),
            _ => None,
        }
    }
}

/// Compute the balance after applying a signed quantity.
///
/// Returns `None` when the result would be negative, which callers must
/// reject before writing anything.
pub fn apply_signed_quantity(balance: Decimal, signed_quantity: Decimal) -> Option<Decimal> {
    let new_balance = balance + signed_quantity;
    if new_balance < Decimal::ZERO {
        None
    } else {
        Some(new_balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_movement_type_round_trip() {
        for t in [
            MovementType::In,
            MovementType::Out,
            MovementType::Adjustment,
            MovementType::Transfer,
        ] {
            assert_eq!(MovementType::parse(t.as_str()), Some(t));
        }
        assert_eq!(MovementType::parse("unknown"), None);
    }

    #[test]
    fn test_apply_signed_quantity_in() {
        assert_eq!(apply_signed_quantity(dec("100"), dec("50")), Some(dec("150")));
    }

    #[test]
    fn test_apply_signed_quantity_out() {
        assert_eq!(apply_signed_quantity(dec("100"), dec("-30")), Some(dec("70")));
    }

    #[test]
    fn test_apply_signed_quantity_to_zero() {
        assert_eq!(apply_signed_quantity(dec("30"), dec("-30")), Some(Decimal::ZERO));
    }

    #[test]
    fn test_apply_signed_quantity_insufficient() {
        assert_eq!(apply_signed_quantity(dec("30"), dec("-50")), None);
    }
}
