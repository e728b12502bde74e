//! Material master models

use serde::{Deserialize, Serialize};

/// Category of a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialCategory {
    /// Incoming raw material (TBS)
    RawMaterial,
    /// Mill output (CPO, kernel)
    FinishedProduct,
    /// Warehouse goods (spare parts, chemicals, fuel)
    Consumable,
}

impl MaterialCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialCategory::RawMaterial => "raw_material",
            MaterialCategory::FinishedProduct => "finished_product",
            MaterialCategory::Consumable => "consumable",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "raw_material" => Some(MaterialCategory::RawMaterial),
            "finished_product" => Some(MaterialCategory::FinishedProduct),
            "consumable" => Some(MaterialCategory::Consumable),
            _ => None,
        }
    }
}
