//! Production batch tests
//!
//! Tests for the batch lifecycle and yield calculation:
//! - yield_percentage = output / input * 100, rounded to 2 decimal places
//! - Stock is affected exactly once on completion and reversed exactly once
//!   on cancellation, restoring the pre-completion balances
//! - The state machine DRAFT <-> IN_PROGRESS -> COMPLETED <-> CANCELLED

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

use shared::{apply_signed_quantity, yield_percentage, BatchStatus};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Balances keyed by material code
type Balances = HashMap<&'static str, Decimal>;

/// A simulated batch
#[derive(Debug, Clone)]
struct SimBatch {
    input_material: &'static str,
    input_quantity: Decimal,
    outputs: Vec<(&'static str, Decimal)>,
}

/// Apply the completion stock effect: input OUT, each output IN. Fails
/// without mutation when the input balance is insufficient.
fn complete_batch(balances: &mut Balances, batch: &SimBatch) -> Result<(), &'static str> {
    let input_balance = *balances.get(batch.input_material).unwrap_or(&Decimal::ZERO);

    let new_input = apply_signed_quantity(input_balance, -batch.input_quantity)
        .ok_or("Insufficient stock")?;

    balances.insert(batch.input_material, new_input);
    for (material, quantity) in &batch.outputs {
        let balance = *balances.get(material).unwrap_or(&Decimal::ZERO);
        balances.insert(material, balance + quantity);
    }

    Ok(())
}

/// Reverse the completion effect: input IN, each output OUT.
fn cancel_batch(balances: &mut Balances, batch: &SimBatch) -> Result<(), &'static str> {
    for (material, quantity) in &batch.outputs {
        let balance = *balances.get(material).unwrap_or(&Decimal::ZERO);
        let new_balance = apply_signed_quantity(balance, -*quantity)
            .ok_or("Insufficient stock")?;
        balances.insert(material, new_balance);
    }

    let input_balance = *balances.get(batch.input_material).unwrap_or(&Decimal::ZERO);
    balances.insert(batch.input_material, input_balance + batch.input_quantity);

    Ok(())
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Scenario: TBS balance 1000 kg, batch consumes 1000 and yields 220 of
    /// CPO -> yield 22.00%, TBS ends at 0, CPO gains 220.
    #[test]
    fn test_completion_scenario() {
        let batch = SimBatch {
            input_material: "TBS",
            input_quantity: dec("1000"),
            outputs: vec![("CPO", dec("220"))],
        };

        assert_eq!(yield_percentage(batch.input_quantity, dec("220")), dec("22.00"));

        let mut balances: Balances = HashMap::from([("TBS", dec("1000"))]);
        complete_batch(&mut balances, &batch).unwrap();

        assert_eq!(balances["TBS"], Decimal::ZERO);
        assert_eq!(balances["CPO"], dec("220"));
    }

    #[test]
    fn test_completion_with_insufficient_input_fails_cleanly() {
        let batch = SimBatch {
            input_material: "TBS",
            input_quantity: dec("1000"),
            outputs: vec![("CPO", dec("220"))],
        };

        let mut balances: Balances = HashMap::from([("TBS", dec("999"))]);
        let before = balances.clone();

        assert!(complete_batch(&mut balances, &batch).is_err());
        assert_eq!(balances, before);
    }

    /// Completing then cancelling restores every balance exactly
    #[test]
    fn test_complete_then_cancel_restores_balances() {
        let batch = SimBatch {
            input_material: "TBS",
            input_quantity: dec("8000"),
            outputs: vec![("CPO", dec("1760")), ("KERNEL", dec("400"))],
        };

        let mut balances: Balances =
            HashMap::from([("TBS", dec("10000")), ("CPO", dec("500")), ("KERNEL", dec("50"))]);
        let before = balances.clone();

        complete_batch(&mut balances, &batch).unwrap();
        cancel_batch(&mut balances, &batch).unwrap();

        assert_eq!(balances, before);
    }

    #[test]
    fn test_yield_percentage_rounding() {
        assert_eq!(yield_percentage(dec("1000"), dec("220")), dec("22.00"));
        assert_eq!(yield_percentage(dec("3"), dec("1")), dec("33.33"));
        assert_eq!(yield_percentage(dec("3"), dec("2")), dec("66.67"));
        assert_eq!(yield_percentage(dec("7"), dec("1")), dec("14.29"));
    }

    #[test]
    fn test_multiple_outputs_have_independent_yields() {
        let input = dec("8000");
        assert_eq!(yield_percentage(input, dec("1760")), dec("22.00"));
        assert_eq!(yield_percentage(input, dec("400")), dec("5.00"));
    }

    #[test]
    fn test_state_machine_allowed_transitions() {
        use BatchStatus::*;

        assert!(Draft.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Draft));
        assert!(InProgress.can_transition_to(Completed));
        assert!(Completed.can_transition_to(Cancelled));
        assert!(Cancelled.can_transition_to(Completed));
    }

    #[test]
    fn test_state_machine_forbidden_transitions() {
        use BatchStatus::*;

        // Stock-affecting states cannot be skipped into or edited around
        assert!(!Draft.can_transition_to(Completed));
        assert!(!Draft.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Draft));
        assert!(!Completed.can_transition_to(InProgress));
        assert!(!Cancelled.can_transition_to(Draft));
        assert!(!Cancelled.can_transition_to(InProgress));
    }

    #[test]
    fn test_editability_follows_state() {
        assert!(BatchStatus::Draft.is_editable());
        assert!(BatchStatus::InProgress.is_editable());
        // A completed batch must be cancelled (reversing stock) before edits
        assert!(!BatchStatus::Completed.is_editable());
        assert!(BatchStatus::Cancelled.is_editable());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for quantities between 0.1 and 1000.0
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10000i64).prop_map(|n| Decimal::new(n, 1))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Yield percentage is non-negative and scales linearly with output
        #[test]
        fn prop_yield_percentage_basic_bounds(
            input in quantity_strategy(),
            output in quantity_strategy()
        ) {
            let pct = yield_percentage(input, output);

            prop_assert!(pct >= Decimal::ZERO);
            // Output below input implies a yield below 100%
            if output <= input {
                prop_assert!(pct <= dec("100.00"));
            }
        }

        /// Yield is always rounded to at most 2 decimal places
        #[test]
        fn prop_yield_percentage_two_decimals(
            input in quantity_strategy(),
            output in quantity_strategy()
        ) {
            let pct = yield_percentage(input, output);
            prop_assert_eq!(pct, pct.round_dp(2));
        }

        /// Complete-then-cancel is the identity on balances whenever
        /// completion succeeds
        #[test]
        fn prop_complete_cancel_roundtrip(
            stock in quantity_strategy(),
            extra in quantity_strategy(),
            output_a in quantity_strategy(),
            output_b in quantity_strategy()
        ) {
            let batch = SimBatch {
                input_material: "TBS",
                input_quantity: stock,
                outputs: vec![("CPO", output_a), ("KERNEL", output_b)],
            };

            // Stock covers the input by construction
            let mut balances: Balances = HashMap::from([("TBS", stock + extra)]);
            let before = balances.clone();

            complete_batch(&mut balances, &batch).unwrap();
            cancel_batch(&mut balances, &batch).unwrap();

            for (material, balance) in &before {
                prop_assert_eq!(balances.get(material).copied().unwrap_or(Decimal::ZERO), *balance);
            }
            // Outputs that were created are back to zero
            prop_assert_eq!(balances.get("CPO").copied().unwrap_or(Decimal::ZERO), Decimal::ZERO);
            prop_assert_eq!(balances.get("KERNEL").copied().unwrap_or(Decimal::ZERO), Decimal::ZERO);
        }

        /// A failed completion mutates nothing
        #[test]
        fn prop_failed_completion_is_clean(
            stock in quantity_strategy(),
            shortfall in quantity_strategy(),
            output in quantity_strategy()
        ) {
            let batch = SimBatch {
                input_material: "TBS",
                input_quantity: stock + shortfall,
                outputs: vec![("CPO", output)],
            };

            let mut balances: Balances = HashMap::from([("TBS", stock)]);
            let before = balances.clone();

            prop_assert!(complete_batch(&mut balances, &batch).is_err());
            prop_assert_eq!(balances, before);
        }

        /// Exactly one of the transitions out of each state is stock-affecting
        #[test]
        fn prop_only_completion_boundary_affects_stock(
            from_idx in 0usize..4,
            to_idx in 0usize..4
        ) {
            use BatchStatus::*;
            let states = [Draft, InProgress, Completed, Cancelled];
            let from = states[from_idx];
            let to = states[to_idx];

            if from.can_transition_to(to) {
                let crosses_completion =
                    to == Completed || from == Completed;
                let stock_affecting = matches!(
                    (from, to),
                    (InProgress, Completed) | (Cancelled, Completed) | (Completed, Cancelled)
                );
                prop_assert_eq!(crosses_completion, stock_affecting);
            }
        }
    }
}
