use serde_json::Value;
use std::collections::HashMap;

use crate::config;
use crate::error::ApiError;

/// Parse a path id. Anything that is not an integer is a bad request, not a
/// lookup miss.
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::bad_request("invalid id"))
}

/// Basic email shape check: one '@' with non-empty sides and a dot in the
/// domain.
pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err("Invalid email format".to_string());
    }

    if !parts[1].contains('.') {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate pagination query values. Out-of-range values are rejected with
/// field-level detail, never silently clamped.
pub fn validate_page_params(
    page: Option<&str>,
    page_size: Option<&str>,
) -> Result<(i64, i64), ApiError> {
    let api_config = &config::config().api;
    let mut field_errors = HashMap::new();

    let page = match page {
        None | Some("") => 1,
        Some(raw) => match raw.parse::<i64>() {
            Ok(p) if p >= 1 => p,
            _ => {
                field_errors.insert(
                    "page".to_string(),
                    "must be an integer greater than or equal to 1".to_string(),
                );
                0
            }
        },
    };

    let page_size = match page_size {
        None | Some("") => api_config.default_page_size,
        Some(raw) => match raw.parse::<i64>() {
            Ok(s) if s >= 1 && s <= api_config.max_page_size => s,
            _ => {
                field_errors.insert(
                    "pageSize".to_string(),
                    format!("must be an integer between 1 and {}", api_config.max_page_size),
                );
                0
            }
        },
    };

    if !field_errors.is_empty() {
        return Err(ApiError::validation_error("validation failed", Some(field_errors)));
    }

    Ok((page, page_size))
}

/// Coerce a JSON value to a number the way lenient API clients expect:
/// numbers pass through, numeric strings are parsed, everything else fails.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Like `coerce_number` but the result must be an integer.
pub fn coerce_integer(value: &Value) -> Option<i64> {
    let n = coerce_number(value)?;
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Some(n as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_ids() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(parse_id("forty-two").is_err());
        assert!(parse_id("4.2").is_err());
        assert!(parse_id("").is_err());
    }

    #[test]
    fn validates_email_shapes() {
        assert!(validate_email_format("a@x.com").is_ok());
        assert!(validate_email_format("").is_err());
        assert!(validate_email_format("a@x").is_err());
        assert!(validate_email_format("ax.com").is_err());
        assert!(validate_email_format("@x.com").is_err());
        assert!(validate_email_format("a@").is_err());
    }

    #[test]
    fn page_params_default_when_absent() {
        let (page, page_size) = validate_page_params(None, None).unwrap();
        assert_eq!(page, 1);
        assert_eq!(page_size, 10);
    }

    #[test]
    fn page_params_accept_in_range_values() {
        let (page, page_size) = validate_page_params(Some("2"), Some("50")).unwrap();
        assert_eq!(page, 2);
        assert_eq!(page_size, 50);
    }

    #[test]
    fn page_params_reject_out_of_range_instead_of_clamping() {
        assert!(validate_page_params(Some("0"), None).is_err());
        assert!(validate_page_params(Some("-1"), None).is_err());
        assert!(validate_page_params(None, Some("0")).is_err());
        assert!(validate_page_params(None, Some("51")).is_err());
        assert!(validate_page_params(Some("x"), None).is_err());
        assert!(validate_page_params(None, Some("ten")).is_err());
    }

    #[test]
    fn coerces_numbers_and_numeric_strings() {
        assert_eq!(coerce_number(&json!(12.5)), Some(12.5));
        assert_eq!(coerce_number(&json!("12.5")), Some(12.5));
        assert_eq!(coerce_number(&json!("not a number")), None);
        assert_eq!(coerce_number(&json!(null)), None);

        assert_eq!(coerce_integer(&json!(3)), Some(3));
        assert_eq!(coerce_integer(&json!("3")), Some(3));
        assert_eq!(coerce_integer(&json!(3.5)), None);
    }
}
