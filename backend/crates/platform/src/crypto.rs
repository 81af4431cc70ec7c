//! Secure Randomness

use rand::{RngCore, rngs::OsRng};

/// `len` bytes from the operating system CSPRNG (signing keys)
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    OsRng.fill_bytes(&mut buf);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_and_uniqueness() {
        let key = random_bytes(32);
        assert_eq!(key.len(), 32);
        assert_ne!(key, random_bytes(32));
        assert!(random_bytes(0).is_empty());
    }
}
