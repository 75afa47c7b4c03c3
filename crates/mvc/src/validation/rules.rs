//! Common field rules for [`Validate`](super::Validate) impls.
//!
//! Every rule records its message into the given [`ValidationErrors`] and
//! returns whether the value passed.

use super::ValidationErrors;
use std::fmt::Display;

pub fn required(errors: &mut ValidationErrors, field: &str, value: &str) -> bool {
    errors.ensure(!value.trim().is_empty(), field, format!("The {field} field is required."))
}

pub fn required_some<T>(errors: &mut ValidationErrors, field: &str, value: Option<&T>) -> bool {
    errors.ensure(value.is_some(), field, format!("The {field} field is required."))
}

/// Checks the length of `value` in chars
pub fn length(errors: &mut ValidationErrors, field: &str, value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().count();
    errors.ensure(
        (min..=max).contains(&len),
        field,
        format!("The field {field} must be a string with a minimum length of {min} and a maximum length of {max}."),
    )
}

pub fn range<T: PartialOrd + Display>(errors: &mut ValidationErrors, field: &str, value: T, min: T, max: T) -> bool {
    let valid = value >= min && value <= max;
    errors.ensure(valid, field, format!("The field {field} must be between {min} and {max}."))
}

/// Only checks the shape `local@domain`, the domain having at least one dot
pub fn email(errors: &mut ValidationErrors, field: &str, value: &str) -> bool {
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() > 1
                && domain.split('.').all(|label| !label.is_empty())
        }
        None => false,
    };
    errors.ensure(valid, field, format!("The {field} field is not a valid e-mail address."))
}
