use crate::server::response::ApiError;

const MAX_EMAIL_LEN: usize = 254;

/// Minimal shape check; real deliverability is the mail provider's problem.
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ApiError::bad_request("Email is required"));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(ApiError::bad_request(format!(
            "Email cannot exceed {MAX_EMAIL_LEN} characters"
        )));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ApiError::bad_request("Email is not valid")),
    }
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.is_empty() {
        return Err(ApiError::bad_request("Password is required"));
    }
    Ok(())
}

/// User ids are UUIDs; anything else is a malformed path parameter.
pub fn validate_user_id(id: &str) -> Result<(), ApiError> {
    uuid::Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| ApiError::bad_request("Invalid user id"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_basic() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("  a@x.com  ").is_ok());
    }

    #[test]
    fn test_validate_email_rejects_malformed() {
        assert!(validate_email("").is_err());
        assert!(validate_email("   ").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@x.com").is_err());
        assert!(validate_email("a@").is_err());
    }

    #[test]
    fn test_validate_password_rejects_empty() {
        assert!(validate_password("").is_err());
        assert!(validate_password("secret1").is_ok());
    }

    #[test]
    fn test_validate_user_id() {
        assert!(validate_user_id("2c3c41b0-5a4d-4f5c-9a65-2d8e9c0a1b2c").is_ok());
        assert!(validate_user_id("not-a-uuid").is_err());
        assert!(validate_user_id("").is_err());
    }
}
