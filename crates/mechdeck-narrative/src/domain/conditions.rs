//! Choice visibility.
//!
//! A choice is shown only when every one of its conditions holds against the
//! current variable snapshot. Evaluation never fails: a missing variable is
//! the empty string for equality, `0` for numeric comparisons, and "unset"
//! for `isset`.

use mechdeck_core::value::{VarValue, Variables};

use super::story::{Choice, Condition, ConditionOperator};

/// Returns true iff all of `choice`'s conditions hold.
#[must_use]
pub fn is_choice_visible(choice: &Choice, variables: &Variables) -> bool {
    choice
        .conditions
        .iter()
        .all(|condition| condition_holds(condition, variables))
}

/// Evaluates a single condition.
#[must_use]
pub fn condition_holds(condition: &Condition, variables: &Variables) -> bool {
    let empty = VarValue::empty();
    let current = variables.get(&condition.variable);
    let expected = condition.value.as_ref().unwrap_or(&empty);

    match condition.operator {
        ConditionOperator::IsSet => current.is_some(),
        ConditionOperator::Equal => current.unwrap_or(&empty).loosely_equals(expected),
        ConditionOperator::NotEqual => !current.unwrap_or(&empty).loosely_equals(expected),
        ConditionOperator::GreaterThan => {
            current.map_or(0.0, VarValue::as_number) > expected.as_number()
        }
        ConditionOperator::LessThan => {
            current.map_or(0.0, VarValue::as_number) < expected.as_number()
        }
    }
}
