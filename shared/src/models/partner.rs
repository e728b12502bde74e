//! Business partner models (suppliers, vendors, buyers)

use serde::{Deserialize, Serialize};

/// Type of supplying partner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplierType {
    /// Delivers fresh fruit bunches to the weighbridge
    TbsSupplier,
    /// Supplies warehouse goods against purchase orders
    Vendor,
}

impl SupplierType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupplierType::TbsSupplier => "tbs_supplier",
            SupplierType::Vendor => "vendor",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tbs_supplier" => Some(SupplierType::TbsSupplier),
            "vendor" => Some(SupplierType::Vendor),
            _ => None,
        }
    }
}
