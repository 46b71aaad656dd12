use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email pattern"));

/// An address of the form `local@domain.tld`: no whitespace, exactly one `@`,
/// and at least one `.` after it.
#[derive(Clone, Debug)]
pub struct ContactEmail(String);

impl ContactEmail {
    pub fn parse(s: String) -> Result<Self, String> {
        if EMAIL_PATTERN.is_match(&s) {
            Ok(Self(s))
        } else {
            Err(format!("{} is not a valid email address.", s))
        }
    }
}

impl AsRef<str> for ContactEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContactEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
