//! Production batch models
//!
//! A batch consumes one input material (TBS) and yields one or more output
//! materials (CPO, kernel). The stock effect is applied exactly once, on the
//! transition into `Completed`, and reversed exactly once on the way out.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a production batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Draft,
    InProgress,
    Completed,
    Cancelled,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Draft => "draft",
            BatchStatus::InProgress => "in_progress",
            BatchStatus::Completed => "completed",
            BatchStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(BatchStatus::Draft),
            "in_progress" => Some(BatchStatus::InProgress),
            "completed" => Some(BatchStatus::Completed),
            "cancelled" => Some(BatchStatus::Cancelled),
            _ => None,
        }
    }

    /// Whether a direct transition to `next` is allowed.
    ///
    /// Draft and InProgress are freely interconvertible and non-stock-
    /// affecting. Completed is entered from InProgress (applying stock) and
    /// left only toward Cancelled (reversing stock); a cancelled batch may be
    /// re-completed, which re-applies the stock effect.
    pub fn can_transition_to(&self, next: BatchStatus) -> bool {
        use BatchStatus::*;
        matches!(
            (self, next),
            (Draft, InProgress)
                | (InProgress, Draft)
                | (InProgress, Completed)
                | (Completed, Cancelled)
                | (Cancelled, Completed)
        )
    }

    /// Whether a batch in this state may be edited or deleted.
    ///
    /// A completed batch must be cancelled first, which reverses its stock
    /// effect; after that it may be modified and completed again.
    pub fn is_editable(&self) -> bool {
        !matches!(self, BatchStatus::Completed)
    }
}

/// Compute the yield percentage of one output, rounded to 2 decimal places.
///
/// Returns zero for a zero input quantity; callers reject that case before
/// persisting anything.
pub fn yield_percentage(input_quantity: Decimal, output_quantity: Decimal) -> Decimal {
    if input_quantity.is_zero() {
        Decimal::ZERO
    } else {
        ((output_quantity / input_quantity) * Decimal::from(100)).round_dp(2)
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
    fn test_batch_status_round_trip() {
        for s in [
            BatchStatus::Draft,
            BatchStatus::InProgress,
            BatchStatus::Completed,
            BatchStatus::Cancelled,
        ] {
            assert_eq!(BatchStatus::parse(s.as_str()), Some(s));
        }
    }

    #[test]
    fn test_valid_transitions() {
        use BatchStatus::*;
        assert!(Draft.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Draft));
        assert!(InProgress.can_transition_to(Completed));
        assert!(Completed.can_transition_to(Cancelled));
        assert!(Cancelled.can_transition_to(Completed));
    }

    #[test]
    fn test_invalid_transitions() {
        use BatchStatus::*;
        assert!(!Draft.can_transition_to(Completed)); // Must pass through InProgress
        assert!(!Completed.can_transition_to(Draft)); // Only reversal path out
        assert!(!Completed.can_transition_to(InProgress));
        assert!(!Cancelled.can_transition_to(Draft));
        assert!(!Draft.can_transition_to(Draft));
    }

    #[test]
    fn test_editable_states() {
        assert!(BatchStatus::Draft.is_editable());
        assert!(BatchStatus::InProgress.is_editable());
        assert!(!BatchStatus::Completed.is_editable());
        // Cancelling reverses the stock effect, so the batch is editable again
        assert!(BatchStatus::Cancelled.is_editable());
    }

    #[test]
    fn test_yield_percentage() {
        // 220 out of 1000 kg -> 22.00%
        assert_eq!(yield_percentage(dec("1000"), dec("220")), dec("22.00"));
    }

    #[test]
    fn test_yield_percentage_rounds_to_two_places() {
        // 1/3 -> 33.33%
        assert_eq!(yield_percentage(dec("3"), dec("1")), dec("33.33"));
        // 2/3 -> 66.67%
        assert_eq!(yield_percentage(dec("3"), dec("2")), dec("66.67"));
    }

    #[test]
    fn test_yield_percentage_zero_input() {
        assert_eq!(yield_percentage(Decimal::ZERO, dec("10")), Decimal::ZERO);
    }
}
