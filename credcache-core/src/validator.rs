//! Acceptance rules for interactively supplied values.
//!
//! A [`Validator`] is a pure predicate over a string paired with a
//! human-readable message describing what a valid input looks like. The
//! message is shown to the user when the prompt loop rejects an input.
//!
//! # Example
//!
//! ```
//! use credcache_core::{PasswordPolicy, Validator};
//!
//! let email = Validator::email();
//! assert!(email.validate("alice@example.com"));
//! assert!(!email.validate("alice"));
//!
//! let long_enough = Validator::password(PasswordPolicy::length_only(8, true));
//! assert!(long_enough.validate("aaaaaaaa"));
//! assert_eq!(long_enough.message(), "Must be of length 8 at least");
//! ```

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static NON_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S").expect("non-whitespace pattern compiles"));

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^(?:",
        r"[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*",
        r#"|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*""#,
        r")@(?:",
        r"(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?",
        r"|\[(?:(?:25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9]?[0-9])\.){3}",
        r"(?:25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9]?[0-9])\]",
        r")$",
    ))
    .expect("email pattern compiles")
});

static LOWERCASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z]").expect("lowercase pattern compiles"));
static UPPERCASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]").expect("uppercase pattern compiles"));
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]").expect("number pattern compiles"));
static SPECIAL_CHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[!@#$&*£^,.]").expect("special character pattern compiles"));

/// Character-class and length requirements for [`Validator::password`].
///
/// The default requires every character class and at least 8 characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub uppercase: bool,
    pub lowercase: bool,
    pub number: bool,
    pub special_char: bool,
    pub length: usize,
    /// Treat `length` as a minimum rather than an exact length.
    pub at_least: bool,
}

impl PasswordPolicy {
    /// A policy with every character class disabled.
    pub fn length_only(length: usize, at_least: bool) -> Self {
        Self {
            uppercase: false,
            lowercase: false,
            number: false,
            special_char: false,
            length,
            at_least,
        }
    }

    fn has_classes(&self) -> bool {
        self.uppercase || self.lowercase || self.number || self.special_char
    }

    fn length_ok(&self, input: &str) -> bool {
        let count = input.chars().count();
        if self.at_least {
            count >= self.length
        } else {
            count == self.length
        }
    }

    fn message(&self) -> String {
        if !self.has_classes() {
            return if self.at_least {
                format!("Must be of length {} at least", self.length)
            } else {
                format!("Must be of length {}", self.length)
            };
        }

        let mut message = String::from("Must include ");
        if self.lowercase {
            message.push_str("a lowercase letter, ");
        }
        if self.uppercase {
            message.push_str("an uppercase letter, ");
        }
        if self.number {
            message.push_str("a number, ");
        }
        if self.special_char {
            message.push_str("a special character, ");
        }
        if self.at_least {
            message.push_str(&format!("and must be at least {} characters long", self.length));
        } else {
            message.push_str(&format!("and must be {} characters long", self.length));
        }
        message
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            uppercase: true,
            lowercase: true,
            number: true,
            special_char: true,
            length: 8,
            at_least: true,
        }
    }
}

#[derive(Debug, Clone)]
enum Rule {
    Any,
    NotEmpty,
    Email,
    Password(PasswordPolicy),
}

/// A named acceptance rule for user-supplied strings.
#[derive(Debug, Clone)]
pub struct Validator {
    rule: Rule,
    message: String,
}

impl Validator {
    /// Accepts every input, including the empty string.
    pub fn any() -> Self {
        Self {
            rule: Rule::Any,
            message: "Base validator that allows anything".to_string(),
        }
    }

    /// Rejects the empty string and whitespace-only input.
    pub fn not_empty() -> Self {
        Self {
            rule: Rule::NotEmpty,
            message: "Must not be empty string".to_string(),
        }
    }

    /// Accepts `local@domain` shaped input. Best effort, not full RFC 5322.
    pub fn email() -> Self {
        Self {
            rule: Rule::Email,
            message: "Must be email".to_string(),
        }
    }

    /// Enforces the character classes and length bound of `policy`.
    ///
    /// With every character class disabled this degrades to a pure length check.
    pub fn password(policy: PasswordPolicy) -> Self {
        Self {
            message: policy.message(),
            rule: Rule::Password(policy),
        }
    }

    /// Pure length check: exactly `length` characters, or at least that many.
    pub fn length(length: usize, at_least: bool) -> Self {
        Self::password(PasswordPolicy::length_only(length, at_least))
    }

    /// Whether `input` is acceptable.
    pub fn validate(&self, input: &str) -> bool {
        match &self.rule {
            Rule::Any => true,
            Rule::NotEmpty => NON_WHITESPACE.is_match(input),
            Rule::Email => EMAIL.is_match(input),
            Rule::Password(policy) => {
                (!policy.lowercase || LOWERCASE.is_match(input))
                    && (!policy.uppercase || UPPERCASE.is_match(input))
                    && (!policy.number || NUMBER.is_match(input))
                    && (!policy.special_char || SPECIAL_CHAR.is_match(input))
                    && policy.length_ok(input)
            }
        }
    }

    /// Description of what a valid input looks like.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_accepts_everything() {
        let v = Validator::any();
        assert!(v.validate(""));
        assert!(v.validate("   "));
        assert!(v.validate("anything at all"));
    }

    #[test]
    fn test_not_empty() {
        let v = Validator::not_empty();
        assert!(!v.validate(""));
        assert!(!v.validate("   "));
        assert!(!v.validate("\t"));
        assert!(v.validate(" x "));
        assert_eq!(v.message(), "Must not be empty string");
    }

    #[test]
    fn test_email() {
        let v = Validator::email();
        assert!(v.validate("alice@example.com"));
        assert!(v.validate("first.last+tag@mail.example.co.uk"));
        assert!(v.validate("Alice@Example.com"));
        assert!(v.validate("ops@[192.168.0.1]"));
        assert!(!v.validate("alice"));
        assert!(!v.validate("alice@"));
        assert!(!v.validate("@example.com"));
        assert!(!v.validate("alice@localhost"));
        assert!(!v.validate("alice@example.com trailing"));
    }

    #[test]
    fn test_password_default_policy() {
        let v = Validator::password(PasswordPolicy::default());
        assert!(v.validate("Abcdef1!"));
        assert!(!v.validate("abcdef1!"), "missing uppercase");
        assert!(!v.validate("ABCDEF1!"), "missing lowercase");
        assert!(!v.validate("Abcdefg!"), "missing number");
        assert!(!v.validate("Abcdefg1"), "missing special character");
        assert!(!v.validate("Ab1!"), "too short");
        assert_eq!(
            v.message(),
            "Must include a lowercase letter, an uppercase letter, a number, \
             a special character, and must be at least 8 characters long"
        );
    }

    #[test]
    fn test_password_lowercase_independent_of_uppercase() {
        let policy = PasswordPolicy {
            uppercase: false,
            number: false,
            special_char: false,
            ..PasswordPolicy::default()
        };
        let v = Validator::password(policy);
        assert!(v.validate("abcdefgh"));
        assert!(!v.validate("ABCDEFGH"));
        assert_eq!(
            v.message(),
            "Must include a lowercase letter, and must be at least 8 characters long"
        );
    }

    #[test]
    fn test_password_exact_length() {
        let policy = PasswordPolicy {
            length: 4,
            at_least: false,
            ..PasswordPolicy::default()
        };
        let v = Validator::password(policy);
        assert!(v.validate("aB1!"));
        assert!(!v.validate("aB1!x"));
        assert!(v.message().ends_with("and must be 4 characters long"));
    }

    #[test]
    fn test_password_without_classes_is_length_check() {
        let v = Validator::password(PasswordPolicy::length_only(8, true));
        assert!(v.validate("aaaaaaaa"));
        assert!(v.validate("        "));
        assert!(v.validate("12345678901"));
        assert!(!v.validate("aaaaaaa"));
        assert!(!v.validate(""));
        assert_eq!(v.message(), "Must be of length 8 at least");
    }

    #[test]
    fn test_length_counts_characters() {
        let v = Validator::length(3, false);
        assert!(v.validate("£££"));
        assert!(!v.validate("ab"));
        assert!(!v.validate("abcd"));
        assert_eq!(v.message(), "Must be of length 3");
    }
}
