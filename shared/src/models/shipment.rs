//! Product shipment models

use serde::{Deserialize, Serialize};

/// State of a shipment (delivery order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Draft,
    /// Posted to the stock ledger; product has left the mill
    Posted,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Draft => "draft",
            ShipmentStatus::Posted => "posted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ShipmentStatus::Draft),
            "posted" => Some(ShipmentStatus::Posted),
            _ => None,
        }
    }
}
