use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationErrors;

lazy_static! {
    /// Regex for validating username fields
    /// Letters, digits, underscores, dots and hyphens only
    /// - Valid: "john_doe", "alice", "j.smith", "bob-2"
    /// - Invalid: "john doe", "user@name", "名前"
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap();
}

/// Flatten validator errors into human readable messages, ordered by field name
pub fn collect_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid ({})", field, e.code),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_username_regex_valid() {
        assert!(USERNAME_REGEX.is_match("john_doe"));
        assert!(USERNAME_REGEX.is_match("alice"));
        assert!(USERNAME_REGEX.is_match("j.smith"));
        assert!(USERNAME_REGEX.is_match("bob-2"));
    }

    #[test]
    fn test_username_regex_invalid() {
        assert!(!USERNAME_REGEX.is_match("john doe")); // space
        assert!(!USERNAME_REGEX.is_match("user@name")); // at sign
        assert!(!USERNAME_REGEX.is_match("")); // empty
    }

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn test_collect_messages_uses_custom_message_and_fallback() {
        let sample = Sample {
            name: "ab".to_string(),
            email: "nope".to_string(),
        };
        let errors = sample.validate().unwrap_err();
        let messages = collect_messages(&errors);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], "email is invalid (email)");
        assert_eq!(messages[1], "Name must be at least 3 characters");
    }
}
