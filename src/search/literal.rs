//! Lenient parsing of user-typed numeric bounds.

use std::sync::LazyLock;

use regex::Regex;

static DECIMAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?\d+([.,]\d+)?$").unwrap());

/// Literal stored for an unbounded-below numeric filter.
pub const NEG_INFINITY: &str = "-Infinity";
/// Literal stored for an unbounded-above numeric filter.
pub const POS_INFINITY: &str = "Infinity";

/// Which end of a range a bound closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Min,
    Max,
}

impl Bound {
    /// The infinity a garbled bound degrades to.
    pub fn infinity(&self) -> &'static str {
        match self {
            Bound::Min => NEG_INFINITY,
            Bound::Max => POS_INFINITY,
        }
    }
}

/// Rewrite a decimal written with `.` or `,` to use `.`, keeping its digits.
///
/// Returns `None` for anything but a plain decimal.
pub fn normalize_decimal(raw: &str) -> Option<String> {
    let raw = raw.trim();
    DECIMAL.is_match(raw).then(|| raw.replace(',', "."))
}

/// Whether a stored literal is one of the infinities.
pub fn infinity_of(literal: &str) -> Option<Bound> {
    match literal {
        NEG_INFINITY => Some(Bound::Min),
        POS_INFINITY => Some(Bound::Max),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_style_is_irrelevant() {
        assert_eq!(normalize_decimal("1,5"), normalize_decimal("1.5"));
        assert_eq!(normalize_decimal("3,5").as_deref(), Some("3.5"));
        assert_eq!(normalize_decimal(" 42 ").as_deref(), Some("42"));
        assert_eq!(normalize_decimal("-0,25").as_deref(), Some("-0.25"));
    }

    #[test]
    fn test_digits_are_kept() {
        assert_eq!(
            normalize_decimal("9007199254740993").as_deref(),
            Some("9007199254740993")
        );
        assert_eq!(
            normalize_decimal("0,10000000000000000001").as_deref(),
            Some("0.10000000000000000001")
        );
        assert_eq!(normalize_decimal("+7").as_deref(), Some("+7"));
        assert_eq!(normalize_decimal("007").as_deref(), Some("007"));
    }

    #[test]
    fn test_garbage_does_not_parse() {
        assert_eq!(normalize_decimal("1e5"), None);
        assert_eq!(normalize_decimal(".5"), None);
        assert_eq!(normalize_decimal("1."), None);
        assert_eq!(normalize_decimal("abc"), None);
        assert_eq!(normalize_decimal("1,5,6"), None);
        assert_eq!(normalize_decimal("inf"), None);
        assert_eq!(normalize_decimal("NaN"), None);
        assert_eq!(normalize_decimal(""), None);
    }

    #[test]
    fn test_infinities() {
        assert_eq!(Bound::Min.infinity(), "-Infinity");
        assert_eq!(Bound::Max.infinity(), "Infinity");
        assert_eq!(infinity_of("Infinity"), Some(Bound::Max));
        assert_eq!(infinity_of("12"), None);
    }
}
