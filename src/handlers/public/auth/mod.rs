mod login;
mod signup;

pub use login::login_post;
pub use signup::signup_post;

use serde::Deserialize;
use std::collections::HashMap;

use crate::error::ApiError;
use crate::handlers::utils::validate_email_format;

/// Shared body shape for signup and login.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl CredentialsRequest {
    /// Both endpoints require a well-formed email and a password of at
    /// least 4 characters.
    pub fn validate(self) -> Result<(String, String), ApiError> {
        let mut field_errors = HashMap::new();

        let email = self.email.unwrap_or_default();
        if let Err(msg) = validate_email_format(&email) {
            field_errors.insert("email".to_string(), msg);
        }

        let password = self.password.unwrap_or_default();
        if password.len() < 4 {
            field_errors.insert(
                "password".to_string(),
                "must be at least 4 characters".to_string(),
            );
        }

        if !field_errors.is_empty() {
            return Err(ApiError::validation_error("validation failed", Some(field_errors)));
        }

        Ok((email, password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_credentials() {
        let req = CredentialsRequest {
            email: Some("a@x.com".to_string()),
            password: Some("pass1".to_string()),
        };
        let (email, password) = req.validate().unwrap();
        assert_eq!(email, "a@x.com");
        assert_eq!(password, "pass1");
    }

    #[test]
    fn rejects_short_password_and_bad_email() {
        let req = CredentialsRequest {
            email: Some("not-an-email".to_string()),
            password: Some("abc".to_string()),
        };
        assert!(req.validate().is_err());

        let req = CredentialsRequest {
            email: None,
            password: None,
        };
        assert!(req.validate().is_err());
    }
}
