//! Field validators for raw form text.
//!
//! Every upstream widget yields strings, so these predicates are the first
//! gate of every create/update pipeline. They are pure: a parse failure maps
//! to `false` (or `None`), never to an error the caller has to handle.

use serde::Serialize;

/// Sign rule for real-valued fields.
///
/// The two source revisions of the dashboard disagreed on whether the
/// numeric validator accepts negative values, so the rule is an explicit
/// per-field choice in the schema rather than a global constant. Every
/// field in the current catalog uses `NonNegative`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignPolicy {
    NonNegative,
    Any,
}

/// Parse `text` as a base-10 integer >= 0.
///
/// Semantically `^[0-9]+$`: no sign, no whitespace, no exponent. The value
/// must also fit `i64`, since every identifier and count crosses the wire
/// as a JSON number.
pub fn parse_integer(text: &str) -> Option<i64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// True iff `text` is a non-negative base-10 integer.
pub fn is_integer_like(text: &str) -> bool {
    parse_integer(text).is_some()
}

/// Parse `text` as a finite floating-point value satisfying `sign`.
///
/// `inf` and `nan` parse as floats but are rejected here: a markup or price
/// with a non-finite value is never something the backend can store.
pub fn parse_real(text: &str, sign: SignPolicy) -> Option<f64> {
    let value: f64 = text.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    match sign {
        SignPolicy::NonNegative if value < 0.0 => None,
        _ => Some(value),
    }
}

/// True iff `text` is a finite floating-point value satisfying `sign`.
pub fn is_real_like(text: &str, sign: SignPolicy) -> bool {
    parse_real(text, sign).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_plain_digits() {
        assert!(is_integer_like("0"));
        assert!(is_integer_like("42"));
        assert!(is_integer_like("007"));
    }

    #[test]
    fn rejects_signs_whitespace_and_junk() {
        assert!(!is_integer_like(""));
        assert!(!is_integer_like("-3"));
        assert!(!is_integer_like("+3"));
        assert!(!is_integer_like(" 3"));
        assert!(!is_integer_like("3.0"));
        assert!(!is_integer_like("abc"));
        assert!(!is_integer_like("1e3"));
    }

    #[test]
    fn rejects_integers_beyond_the_wire_width() {
        assert!(is_integer_like("9223372036854775807"));
        assert!(!is_integer_like("9223372036854775808"));
    }

    #[test]
    fn real_sign_policy() {
        assert!(is_real_like("10.5", SignPolicy::NonNegative));
        assert!(is_real_like("0", SignPolicy::NonNegative));
        assert!(!is_real_like("-0.5", SignPolicy::NonNegative));
        assert!(is_real_like("-0.5", SignPolicy::Any));
        assert!(!is_real_like("abc", SignPolicy::Any));
        assert!(!is_real_like("", SignPolicy::Any));
    }

    #[test]
    fn real_rejects_non_finite() {
        assert!(!is_real_like("inf", SignPolicy::NonNegative));
        assert!(!is_real_like("-inf", SignPolicy::Any));
        assert!(!is_real_like("NaN", SignPolicy::Any));
    }

    proptest! {
        #[test]
        fn digit_strings_are_integer_like(s in "[0-9]{1,15}") {
            prop_assert!(is_integer_like(&s));
            prop_assert_eq!(parse_integer(&s), Some(s.parse::<i64>().unwrap()));
        }

        #[test]
        fn strings_with_a_non_digit_are_not_integer_like(s in ".*[^0-9].*") {
            prop_assert!(!is_integer_like(&s));
        }

        #[test]
        fn non_negative_reals_round_trip(v in 0.0f64..1e12) {
            let text = format!("{v}");
            prop_assert!(is_real_like(&text, SignPolicy::NonNegative));
        }

        #[test]
        fn negative_reals_need_the_permissive_policy(v in 1e-6f64..1e12) {
            let text = format!("-{v}");
            prop_assert!(!is_real_like(&text, SignPolicy::NonNegative));
            prop_assert!(is_real_like(&text, SignPolicy::Any));
        }
    }
}
