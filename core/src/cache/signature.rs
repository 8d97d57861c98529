use sha2::{Digest, Sha256};

/// Content signature of the text that produced a vector (hex SHA-256).
pub fn source_signature(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_stable_hex() {
        let sig = source_signature("abc");
        assert_eq!(
            sig,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_ne!(sig, source_signature("abd"));
    }
}
