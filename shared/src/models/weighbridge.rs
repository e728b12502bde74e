//! Weighbridge ticket models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// State of a weighbridge ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Vehicle weighed at the gate, still loaded
    WeighedIn,
    /// Vehicle weighed empty on the way out; net weight is known
    WeighedOut,
    /// Ticket posted to the stock ledger
    Posted,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::WeighedIn => "weighed_in",
            TicketStatus::WeighedOut => "weighed_out",
            TicketStatus::Posted => "posted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "weighed_in" => Some(TicketStatus::WeighedIn),
            "weighed_out" => Some(TicketStatus::WeighedOut),
            "posted" => Some(TicketStatus::Posted),
            _ => None,
        }
    }
}

/// Net weight of a delivery: gross minus tare.
pub fn net_weight(gross_kg: Decimal, tare_kg: Decimal) -> Decimal {
    gross_kg - tare_kg
}

/// Weight accepted for payment after the sortation deduction.
///
/// `deduction_percent` covers trash, water, and unripe bunches graded out
/// during sortation.
pub fn accepted_weight(net_kg: Decimal, deduction_percent: Decimal) -> Decimal {
    net_kg * (Decimal::from(100) - deduction_percent) / Decimal::from(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_ticket_status_round_trip() {
        for s in [
            TicketStatus::WeighedIn,
            TicketStatus::WeighedOut,
            TicketStatus::Posted,
        ] {
            assert_eq!(TicketStatus::parse(s.as_str()), Some(s));
        }
    }

    #[test]
    fn test_net_weight() {
        assert_eq!(net_weight(dec("12500"), dec("4500")), dec("8000"));
    }

    #[test]
    fn test_accepted_weight_no_deduction() {
        assert_eq!(accepted_weight(dec("8000"), Decimal::ZERO), dec("8000"));
    }

    #[test]
    fn test_accepted_weight_with_deduction() {
        // 5% sortation deduction on 8000 kg
        assert_eq!(accepted_weight(dec("8000"), dec("5")), dec("7600"));
    }
}
