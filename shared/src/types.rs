//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Unit of measure for materials
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnitOfMeasure {
    Kilogram,
    Ton,
    Liter,
    Piece,
}

impl UnitOfMeasure {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitOfMeasure::Kilogram => "kg",
            UnitOfMeasure::Ton => "ton",
            UnitOfMeasure::Liter => "liter",
            UnitOfMeasure::Piece => "piece",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "kg" => Some(UnitOfMeasure::Kilogram),
            "ton" => Some(UnitOfMeasure::Ton),
            "liter" => Some(UnitOfMeasure::Liter),
            "piece" => Some(UnitOfMeasure::Piece),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_round_trip() {
        for u in [
            UnitOfMeasure::Kilogram,
            UnitOfMeasure::Ton,
            UnitOfMeasure::Liter,
            UnitOfMeasure::Piece,
        ] {
            assert_eq!(UnitOfMeasure::parse(u.as_str()), Some(u));
        }
        assert_eq!(UnitOfMeasure::parse("gallon"), None);
    }
}
