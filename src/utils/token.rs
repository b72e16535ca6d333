use std::fmt::Write;

/// Length of an API token key in hex characters.
pub const TOKEN_KEY_LEN: usize = 40;

/// Mints a random 40-character lowercase hex key.
pub fn generate_key() -> String {
    let bytes: [u8; TOKEN_KEY_LEN / 2] = rand::random();
    bytes.iter().fold(String::with_capacity(TOKEN_KEY_LEN), |mut key, b| {
        let _ = write!(key, "{:02x}", b);
        key
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_shape() {
        let key = generate_key();
        assert_eq!(key.len(), TOKEN_KEY_LEN);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_keys_differ() {
        assert_ne!(generate_key(), generate_key());
    }
}
