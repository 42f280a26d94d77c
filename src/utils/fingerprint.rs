/// Content fingerprint: the first 16 bytes of the BLAKE3 digest, hex-encoded
pub fn content_fingerprint(content: &[u8]) -> String {
    let hash = blake3::hash(content);
    hash.to_hex()[..32].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable() {
        let a = content_fingerprint(b"export const VERSION = 1;");
        let b = content_fingerprint(b"export const VERSION = 1;");
        let c = content_fingerprint(b"export const VERSION = 2;");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 32);
    }
}
