//! Gravatar URL derivation
//!
//! Gravatar addresses images by the MD5 digest of the trimmed,
//! lowercased email address.

/// Default avatar size in pixels.
const AVATAR_SIZE: u16 = 250;

/// Build a Gravatar URL for an email address.
///
/// Falls back to an identicon when the address has no Gravatar.
pub fn gravatar_url(email: &str) -> String {
    let digest = md5::compute(email.trim().to_lowercase().as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{:x}?s={}&d=identicon",
        digest, AVATAR_SIZE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        let url = gravatar_url("user@example.com");
        assert_eq!(
            url,
            "https://www.gravatar.com/avatar/b58996c504c5638798eb6b511e6f49af?s=250&d=identicon"
        );
    }

    #[test]
    fn test_normalizes_case_and_whitespace() {
        assert_eq!(
            gravatar_url("  User@Example.COM  "),
            gravatar_url("user@example.com")
        );
    }
}
