use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use rand::{rng, Rng};
use sha2::{Digest, Sha256};

const SCHEME: &str = "sha256";
const ROUNDS: u32 = 10_000;
const SALT_LEN: usize = 16;

/// Hashes `password` with a fresh random salt.
///
/// Output format is `sha256$<rounds>$<salt>$<digest>` with base64 salt and digest.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rng().fill(&mut salt);
    encode(password, &salt, ROUNDS)
}

/// Checks `password` against a value produced by [`hash_password`]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(rounds), Some(salt), Some(digest), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    if scheme != SCHEME {
        return false;
    }
    let Ok(rounds) = rounds.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (STANDARD_NO_PAD.decode(salt), STANDARD_NO_PAD.decode(digest))
    else {
        return false;
    };

    constant_time_eq(&derive(password, &salt, rounds), &expected)
}

/// Opaque API token, 40 lowercase hex characters
pub fn generate_token() -> String {
    let bytes: [u8; 20] = rng().random();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn encode(password: &str, salt: &[u8], rounds: u32) -> String {
    format!(
        "{}${}${}${}",
        SCHEME,
        rounds,
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(derive(password, salt, rounds))
    )
}

fn derive(password: &str, salt: &[u8], rounds: u32) -> Vec<u8> {
    let mut digest = Sha256::new()
        .chain_update(salt)
        .chain_update(password.as_bytes())
        .finalize();
    for _ in 1..rounds.max(1) {
        digest = Sha256::new()
            .chain_update(salt)
            .chain_update(digest)
            .finalize();
    }
    digest.to_vec()
}

/// Compares without early exit; time depends only on the length when lengths match
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let stored = hash_password("correct horse");
        assert!(stored.starts_with("sha256$10000$"));
        assert!(verify_password("correct horse", &stored));
        assert!(!verify_password("wrong horse", &stored));
    }

    #[test]
    fn test_salt_makes_hashes_differ() {
        assert_ne!(hash_password("same"), hash_password("same"));
    }

    #[test]
    fn test_verify_rejects_malformed_values() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "md5$1$abc$def"));
        assert!(!verify_password("x", "sha256$many$abc$def"));
        assert!(!verify_password("x", "sha256$1$abc$def$extra"));
    }

    #[test]
    fn test_generate_token() {
        let token = generate_token();
        assert_eq!(token.len(), 40);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }
}
