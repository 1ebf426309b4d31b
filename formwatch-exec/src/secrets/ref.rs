use std::fmt;

/// Pointer to a secret, written `scheme://id` in journey documents (`secrets://MEMBER_CODE`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SecretRef {
    pub scheme: String,
    pub id: String,
}

impl SecretRef {
    pub fn parse(input: &str) -> Result<Self, SecretRefParseError> {
        let (scheme, id) = input
            .trim()
            .split_once("://")
            .ok_or(SecretRefParseError::MissingScheme)?;
        if scheme.is_empty() {
            return Err(SecretRefParseError::EmptyScheme);
        }
        if !is_valid_scheme(scheme) {
            return Err(SecretRefParseError::InvalidScheme(scheme.to_string()));
        }
        if id.is_empty() {
            return Err(SecretRefParseError::EmptyId);
        }
        Ok(Self {
            scheme: scheme.to_string(),
            id: id.to_string(),
        })
    }
}

impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The reference names the secret; it never contains the value.
        write!(f, "{}://{}", self.scheme, self.id)
    }
}

fn is_valid_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SecretRefParseError {
    #[error("secret reference must be URI-like (e.g. secrets://NAME)")]
    MissingScheme,
    #[error("secret reference scheme must not be empty")]
    EmptyScheme,
    #[error("invalid secret reference scheme: {0}")]
    InvalidScheme(String),
    #[error("secret reference id must not be empty")]
    EmptyId,
}
