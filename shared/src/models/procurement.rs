//! Warehouse procurement models

use serde::{Deserialize, Serialize};

/// State of a purchase request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseRequestStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl PurchaseRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseRequestStatus::Draft => "draft",
            PurchaseRequestStatus::Submitted => "submitted",
            PurchaseRequestStatus::Approved => "approved",
            PurchaseRequestStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(PurchaseRequestStatus::Draft),
            "submitted" => Some(PurchaseRequestStatus::Submitted),
            "approved" => Some(PurchaseRequestStatus::Approved),
            "rejected" => Some(PurchaseRequestStatus::Rejected),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: PurchaseRequestStatus) -> bool {
        use PurchaseRequestStatus::*;
        matches!(
            (self, next),
            (Draft, Submitted) | (Submitted, Approved) | (Submitted, Rejected)
        )
    }
}

/// State of a purchase order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    Open,
    Received,
    Cancelled,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Open => "open",
            PurchaseOrderStatus::Received => "received",
            PurchaseOrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(PurchaseOrderStatus::Open),
            "received" => Some(PurchaseOrderStatus::Received),
            "cancelled" => Some(PurchaseOrderStatus::Cancelled),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_request_transitions() {
        use PurchaseRequestStatus::*;
        assert!(Draft.can_transition_to(Submitted));
        assert!(Submitted.can_transition_to(Approved));
        assert!(Submitted.can_transition_to(Rejected));
        assert!(!Draft.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Submitted));
    }

    #[test]
    fn test_status_round_trips() {
        for s in [
            PurchaseRequestStatus::Draft,
            PurchaseRequestStatus::Submitted,
            PurchaseRequestStatus::Approved,
            PurchaseRequestStatus::Rejected,
        ] {
            assert_eq!(PurchaseRequestStatus::parse(s.as_str()), Some(s));
        }
        for s in [
            PurchaseOrderStatus::Open,
            PurchaseOrderStatus::Received,
            PurchaseOrderStatus::Cancelled,
        ] {
            assert_eq!(PurchaseOrderStatus::parse(s.as_str()), Some(s));
        }
    }
}
