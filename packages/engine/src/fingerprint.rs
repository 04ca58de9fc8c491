use crc32fast::Hasher;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Short deterministic identifier for a canonical rule body.
///
/// The input is hashed as-is: callers pass already-normalized text such as
/// `color:#f00`. The result is lowercase base36, at most 7 characters.
pub fn fingerprint(canonical: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(canonical.as_bytes());
    to_base36(hasher.finalize())
}

fn to_base36(mut value: u32) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(7);
    while value > 0 {
        digits.push(ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();

    // Only ASCII bytes from ALPHABET are pushed
    digits.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        assert_eq!(fingerprint("color:#f00"), fingerprint("color:#f00"));
    }

    #[test]
    fn test_distinct_bodies_get_distinct_fingerprints() {
        let a = fingerprint("color:#f00");
        let b = fingerprint("color:#00f");
        let c = fingerprint("background-color:#f00");

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn test_fingerprint_alphabet_and_width() {
        for body in ["", "a", "margin-top:10px", "-webkit-appearance:none;appearance:none"] {
            let id = fingerprint(body);
            assert!(!id.is_empty() && id.len() <= 7, "unexpected width for {:?}: {}", body, id);
            assert!(id.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_lowercase()));
        }
    }

    #[test]
    fn test_base36_encoding() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(u32::MAX), "1z141z3");
    }
}
