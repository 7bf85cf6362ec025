//! Pure format predicates for user input. Total over strings, no
//! side effects.

use lazy_static::lazy_static;
use regex::Regex;

const PASSWORD_SYMBOLS: &[char] = &['@', '$', '!', '%', '*', '?', '&'];

/// ASCII letters and spaces only, non-empty. No length bound.
pub fn is_valid_name(name: &str) -> bool {
    lazy_static! {
        static ref NAME_RE: Regex = Regex::new(r"^[a-zA-Z ]+$").unwrap();
    }
    NAME_RE.is_match(name)
}

/// Permissive email-shape check, not full RFC validation.
pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Length >= 8, at least one lowercase, uppercase, digit and symbol
/// from `@$!%*?&`, and nothing outside those classes. A character-class
/// scan rather than a pattern: the policy needs look-ahead, which the
/// regex crate does not support.
pub fn is_strong_password(password: &str) -> bool {
    if password.len() < 8 {
        return false;
    }
    let (mut lower, mut upper, mut digit, mut symbol) = (false, false, false, false);
    for c in password.chars() {
        match c {
            'a'..='z' => lower = true,
            'A'..='Z' => upper = true,
            '0'..='9' => digit = true,
            c if PASSWORD_SYMBOLS.contains(&c) => symbol = true,
            _ => return false,
        }
    }
    lower && upper && digit && symbol
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_accepts_letters_and_spaces() {
        assert!(is_valid_name("John Doe"));
        assert!(is_valid_name("a"));
        assert!(is_valid_name("Mary Jane Watson"));
    }

    #[test]
    fn name_rejects_empty_digits_and_symbols() {
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("John2"));
        assert!(!is_valid_name("John_Doe"));
        assert!(!is_valid_name("Ann-Marie"));
    }

    #[test]
    fn email_accepts_common_shapes() {
        assert!(is_valid_email("john@example.com"));
        assert!(is_valid_email("john.doe@example.co"));
        assert!(is_valid_email("j-d@mail-server.org"));
        assert!(is_valid_email("a@b.co.uk"));
    }

    #[test]
    fn email_rejects_malformed_input() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("john"));
        assert!(!is_valid_email("john@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("john@example"));
        assert!(!is_valid_email("john doe@example.com"));
        // final extension must be 2-3 word characters
        assert!(!is_valid_email("john@example.c"));
    }

    #[test]
    fn short_passwords_are_weak_regardless_of_content() {
        assert!(!is_strong_password(""));
        assert!(!is_strong_password("Ab1!"));
        assert!(!is_strong_password("Abcde1!"));
    }

    #[test]
    fn password_requires_every_class() {
        assert!(is_strong_password("Abcdef1!"));
        assert!(!is_strong_password("abcdefg1")); // no uppercase, no symbol
        assert!(!is_strong_password("ABCDEFG1!")); // no lowercase
        assert!(!is_strong_password("Abcdefgh!")); // no digit
        assert!(!is_strong_password("Abcdefg1")); // no symbol
    }

    #[test]
    fn password_rejects_characters_outside_the_whitelist() {
        assert!(!is_strong_password("Abcdef1! ")); // space not allowed
        assert!(!is_strong_password("Abcdef1#")); // # not in symbol set
        assert!(!is_strong_password("Abcdef1!é"));
    }
}
