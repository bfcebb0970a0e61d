use regex::Regex;
use std::sync::LazyLock;

// Loose "something@something.something" shape, same as the browser-side check.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").unwrap());

/// Client-side email check, run before any request is made.
pub fn is_valid_email(email: &str) -> bool {
    !email.trim().is_empty() && EMAIL_RE.is_match(email)
}
