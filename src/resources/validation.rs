//! Field validators shared by the typed resource configurations.
//!
//! Each function follows the `validator` custom-function signature so it
//! can be referenced from `#[validate(custom(function = ...))]`.

use std::borrow::Cow;
use validator::ValidationError;

fn fail(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Owned(message))
}

fn one_of(value: &str, allowed: &[&str]) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(fail(
            "one_of",
            format!("'{value}' is not one of {allowed:?}"),
        ))
    }
}

/// SCP, AWS or Azure.
pub fn csp_type(value: &str) -> Result<(), ValidationError> {
    one_of(value, &["SCP", "AWS", "Azure"])
}

/// BP or SSI.
pub fn diagnosis_check_type(value: &str) -> Result<(), ValidationError> {
    one_of(value, &["BP", "SSI"])
}

/// Console or SSI.
pub fn diagnosis_type(value: &str) -> Result<(), ValidationError> {
    one_of(value, &["Console", "SSI"])
}

/// STANDARD or MONTHLY.
pub fn plan_type(value: &str) -> Result<(), ValidationError> {
    one_of(value, &["STANDARD", "MONTHLY"])
}

/// None, 1 Year or 3 Year.
pub fn contract_period(value: &str) -> Result<(), ValidationError> {
    one_of(value, &["None", "1 Year", "3 Year"])
}

/// SSD or HDD.
pub fn block_storage_type(value: &str) -> Result<(), ValidationError> {
    one_of(value, &["SSD", "HDD"])
}

/// AZ1, AZ2, AZ3, or empty for single-zone placement.
pub fn availability_zone_name(value: &str) -> Result<(), ValidationError> {
    one_of(value, &["AZ1", "AZ2", "AZ3", ""])
}

/// DESIGNATED or UNIFORM.
pub fn availability_zone_deployment_type(value: &str) -> Result<(), ValidationError> {
    one_of(value, &["DESIGNATED", "UNIFORM"])
}

/// 3 to 20 letters.
pub fn name_3_to_20_alpha(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if (3..=20).contains(&len) && value.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(fail("name", format!("'{value}' must be 3 to 20 letters")))
    }
}

/// 2 to 20 lowercase letters.
pub fn lower_alpha_2_to_20(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if (2..=20).contains(&len) && value.chars().all(|c| c.is_ascii_lowercase()) {
        Ok(())
    } else {
        Err(fail(
            "account",
            format!("'{value}' must be 2 to 20 lowercase letters"),
        ))
    }
}

/// 3 to 20 lowercase letters, digits or dashes, starting with a letter.
pub fn node_name(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    let starts_lower = value.chars().next().is_some_and(|c| c.is_ascii_lowercase());
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if (3..=20).contains(&len) && starts_lower && allowed {
        Ok(())
    } else {
        Err(fail(
            "node_name",
            format!(
                "'{value}' must be 3 to 20 lowercase letters, digits or dashes starting with a letter"
            ),
        ))
    }
}

/// 8 to 30 characters mixing letters, digits and special characters,
/// quotes excluded. The value is never echoed back.
pub fn password(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    let has_letter = value.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    let has_special = value
        .chars()
        .any(|c| c.is_ascii_punctuation() && c != '\'' && c != '"');
    let has_quote = value.contains(['\'', '"']);

    if (8..=30).contains(&len) && has_letter && has_digit && has_special && !has_quote {
        Ok(())
    } else {
        Err(fail(
            "password",
            String::from(
                "password must be 8 to 30 characters with letters, digits and special characters except quotes",
            ),
        ))
    }
}
