//! Field rules shared by the services.
//!
//! Each check appends to a [`FieldErrors`] set so one request reports every
//! offending field at once.

use rust_decimal::Decimal;
use wayfarer_common::FieldErrors;

/// Digits before and after the decimal point of a value, ignoring trailing zeros.
fn digit_counts(value: Decimal) -> (u32, u32) {
    let value = value.normalize();
    let scale = value.scale();
    let mantissa = value.mantissa().unsigned_abs();
    let total = mantissa.checked_ilog10().map_or(1, |d| d + 1).max(scale);
    (total - scale, scale)
}

/// Whether a value fits a `NUMERIC(max_digits, decimal_places)` column.
pub fn decimal_fits(
    errors: &mut FieldErrors,
    field: &str,
    value: Decimal,
    max_digits: u32,
    decimal_places: u32,
) {
    let (whole, decimals) = digit_counts(value);
    if whole + decimals > max_digits {
        errors.add(
            field,
            format!("Ensure that there are no more than {max_digits} digits in total."),
        );
    } else if decimals > decimal_places {
        errors.add(
            field,
            format!("Ensure that there are no more than {decimal_places} decimal places."),
        );
    } else if whole > max_digits - decimal_places {
        errors.add(
            field,
            format!(
                "Ensure that there are no more than {} digits before the decimal point.",
                max_digits - decimal_places
            ),
        );
    }
}

/// Latitude or longitude: `NUMERIC(9, 6)`.
pub fn coordinate(errors: &mut FieldErrors, field: &str, value: Decimal) {
    decimal_fits(errors, field, value, 9, 6);
}

/// Rating: 1.00 to 5.00.
pub fn rating(errors: &mut FieldErrors, field: &str, value: Decimal) {
    if value < Decimal::ONE {
        errors.add(field, "Ensure this value is greater than or equal to 1.");
    } else if value > Decimal::from(5) {
        errors.add(field, "Ensure this value is less than or equal to 5.");
    } else {
        decimal_fits(errors, field, value, 4, 2);
    }
}

/// Visit duration: strictly above 0.1, two decimal places.
pub fn duration(errors: &mut FieldErrors, field: &str, value: Decimal) {
    if value <= Decimal::new(1, 1) {
        errors.add(field, "Ensure this value is greater than 0.1.");
    } else {
        decimal_fits(errors, field, value, 9, 2);
    }
}

/// Character limit on a text field.
pub fn max_chars(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.add(
            field,
            format!("Ensure this field has no more than {max} characters."),
        );
    }
}

/// Lowercase ASCII slug; runs of other characters collapse into one hyphen.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn check(f: impl FnOnce(&mut FieldErrors)) -> Option<String> {
        let mut errors = FieldErrors::new();
        f(&mut errors);
        errors.get("value").map(|m| m[0].clone())
    }

    #[test]
    fn test_digit_counts() {
        assert_eq!(digit_counts(Decimal::new(5_438_918, 6)), (1, 6));
        assert_eq!(digit_counts(Decimal::new(250, 2)), (1, 1));
        assert_eq!(digit_counts(Decimal::ZERO), (1, 0));
        assert_eq!(digit_counts(Decimal::new(-100_180_263, 6)), (3, 6));
    }

    #[test]
    fn test_coordinate() {
        assert!(check(|e| coordinate(e, "value", Decimal::new(100_180_263, 6))).is_none());
        assert_eq!(
            check(|e| coordinate(e, "value", Decimal::new(1_001_802_631, 7))).unwrap(),
            "Ensure that there are no more than 9 digits in total."
        );
        assert_eq!(
            check(|e| coordinate(e, "value", Decimal::new(12_345_678, 7))).unwrap(),
            "Ensure that there are no more than 6 decimal places."
        );
        assert_eq!(
            check(|e| coordinate(e, "value", Decimal::from(1234))).unwrap(),
            "Ensure that there are no more than 3 digits before the decimal point."
        );
    }

    #[test]
    fn test_rating_bounds() {
        assert!(check(|e| rating(e, "value", Decimal::ONE)).is_none());
        assert!(check(|e| rating(e, "value", Decimal::from(5))).is_none());
        assert!(check(|e| rating(e, "value", Decimal::new(99, 2))).is_some());
        assert!(check(|e| rating(e, "value", Decimal::new(501, 2))).is_some());
        assert_eq!(
            check(|e| rating(e, "value", Decimal::new(4125, 3))).unwrap(),
            "Ensure that there are no more than 2 decimal places."
        );
    }

    #[test]
    fn test_duration_must_exceed_a_tenth() {
        assert!(check(|e| duration(e, "value", Decimal::new(1, 1))).is_some());
        assert!(check(|e| duration(e, "value", Decimal::new(11, 2))).is_none());
        assert!(check(|e| duration(e, "value", Decimal::new(25, 1))).is_none());
        assert!(check(|e| duration(e, "value", Decimal::new(2505, 3))).is_some());
    }

    #[test]
    fn test_max_chars_counts_characters() {
        assert!(check(|e| max_chars(e, "value", "Kedah", 5)).is_none());
        assert!(check(|e| max_chars(e, "value", "Pulau", 3)).is_some());
        assert!(check(|e| max_chars(e, "value", "éé", 2)).is_none());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Pasir Buaya"), "pasir-buaya");
        assert_eq!(slugify("  Bukit -- Bendera! "), "bukit-bendera");
        assert_eq!(slugify("Café 21"), "caf-21");
        assert_eq!(slugify(""), "");
    }
}
