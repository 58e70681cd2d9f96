//! Weakly-typed story values.
//!
//! Story authors write variables as plain JSON numbers, strings or booleans,
//! and conditions compare them by coercion rather than by strict type. The
//! coercion rules live here so that the condition evaluator, template
//! substitution and persistence all agree on them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Story variables keyed by name.
pub type Variables = BTreeMap<String, VarValue>;

/// A story variable or condition operand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarValue {
    /// `true` / `false`.
    Bool(bool),
    /// Any JSON number.
    Number(f64),
    /// Any string, numeric-looking or not.
    Text(String),
}

impl VarValue {
    /// The empty string, used for variables that are not set.
    #[must_use]
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    /// Numeric reading of the value, if it has one.
    ///
    /// Text is numeric when it parses as a finite float after trimming.
    #[must_use]
    pub fn numeric(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    /// Coerces to a float; non-numeric text becomes `0.0`.
    #[must_use]
    pub fn as_number(&self) -> f64 {
        self.numeric().unwrap_or(0.0)
    }

    /// Loose equality: numeric when both sides are numeric, textual otherwise.
    #[must_use]
    pub fn loosely_equals(&self, other: &Self) -> bool {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => (a - b).abs() < f64::EPSILON,
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl fmt::Display for VarValue {
    #[allow(clippy::cast_possible_truncation)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("1"),
            Self::Bool(false) => Ok(()),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for VarValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for VarValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for VarValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for VarValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for VarValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_values_deserialize_to_matching_variants() {
        let vars: Variables =
            serde_json::from_str(r#"{"a": 5, "b": "five", "c": true, "d": 2.5}"#).unwrap();

        assert_eq!(vars["a"], VarValue::Number(5.0));
        assert_eq!(vars["b"], VarValue::Text("five".into()));
        assert_eq!(vars["c"], VarValue::Bool(true));
        assert_eq!(vars["d"], VarValue::Number(2.5));
    }

    #[test]
    fn test_display_drops_fraction_for_whole_numbers() {
        assert_eq!(VarValue::Number(5.0).to_string(), "5");
        assert_eq!(VarValue::Number(2.5).to_string(), "2.5");
        assert_eq!(VarValue::Bool(true).to_string(), "1");
        assert_eq!(VarValue::Bool(false).to_string(), "");
    }

    #[test]
    fn test_non_numeric_text_coerces_to_zero() {
        assert!(VarValue::from("dragon").as_number().abs() < f64::EPSILON);
        assert!((VarValue::from(" 12 ").as_number() - 12.0).abs() < f64::EPSILON);
        assert!(VarValue::from("NaN").numeric().is_none());
    }

    #[test]
    fn test_loose_equality_compares_numbers_across_types() {
        assert!(VarValue::from("5").loosely_equals(&VarValue::Number(5.0)));
        assert!(VarValue::from("5.0").loosely_equals(&VarValue::from("5")));
        assert!(VarValue::from("abc").loosely_equals(&VarValue::from("abc")));
        assert!(!VarValue::from("abc").loosely_equals(&VarValue::from("abd")));
        assert!(!VarValue::empty().loosely_equals(&VarValue::Number(0.0)));
    }
}
