use validator::ValidationError;

/// Names the `/users/me` route would shadow
const RESERVED_USERNAMES: [&str; 1] = ["me"];

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Letters, digits and `.@+-_` only, and never a reserved name
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '@' | '+' | '-' | '_'))
    {
        return Err(error(
            "username_chars",
            "Username may only contain letters, digits and . @ + - _",
        ));
    }

    if RESERVED_USERNAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(username))
    {
        return Err(error("username_reserved", "This username is not allowed"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("chef.anna").is_ok());
        assert!(validate_username("user+1@site-x_y").is_ok());
        assert!(validate_username("Иван").is_ok());

        assert!(validate_username("has space").is_err());
        assert!(validate_username("semi;colon").is_err());
        for reserved in ["me", "Me", "mE", "ME"] {
            assert!(validate_username(reserved).is_err(), "{} accepted", reserved);
        }
        // only the whole name is reserved
        assert!(validate_username("eM").is_ok());
        assert!(validate_username("meal").is_ok());
    }
}
