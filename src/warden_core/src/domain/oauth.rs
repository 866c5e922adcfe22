use super::email::Email;

/// Identity asserted by an external provider, independent of its payload shape.
#[derive(Debug, Clone)]
pub struct OAuthClaims {
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
}

/// Split a display name into first name and the rest.
pub fn split_full_name(full_name: &str) -> (String, String) {
    let mut parts = full_name.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or_default().to_owned();
    let last = parts.next().map(str::trim).unwrap_or_default().to_owned();
    (first, last)
}
