//! Deterministic FNV-1a hashing for entity IDs and content-addressed cache keys.
//!
//! Every ID in the store is derived from a canonical string form by this
//! function — there are no incremental counters anywhere. Two processes
//! hashing the same canonical string always agree on the ID.

/// FNV-1a 32-bit offset basis.
const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
/// FNV-1a 32-bit prime.
const FNV_PRIME: u32 = 16_777_619;

/// Hash a string into a stable 32-bit unsigned ID using FNV-1a.
///
/// ```
/// use noesis_core::hash::id_of;
/// assert_eq!(id_of(""), 2_166_136_261);
/// assert_eq!(id_of("a"), id_of("a"));
/// assert_ne!(id_of("a"), id_of("b"));
/// ```
pub fn id_of(s: &str) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in s.as_bytes() {
        hash ^= *byte as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Hash raw bytes into a stable 32-bit ID using the same FNV-1a constants.
pub fn id_of_bytes(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in bytes {
        hash ^= *byte as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Build a chunk ID from its parent document's content hash and its index.
pub fn chunk_id(source_hash: &str, index: usize) -> u32 {
    id_of(&format!("{source_hash}|{index}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_offset_basis() {
        assert_eq!(id_of(""), FNV_OFFSET_BASIS);
    }

    #[test]
    fn deterministic_across_calls() {
        let a = id_of("the decorator pattern");
        let b = id_of("the decorator pattern");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_inputs_usually_differ() {
        assert_ne!(id_of("alpha"), id_of("beta"));
    }

    #[test]
    fn chunk_id_is_stable() {
        let a = chunk_id("deadbeef", 3);
        let b = chunk_id("deadbeef", 3);
        assert_eq!(a, b);
        assert_ne!(a, chunk_id("deadbeef", 4));
    }

    #[test]
    fn bytes_and_str_agree_on_ascii() {
        assert_eq!(id_of("hello"), id_of_bytes(b"hello"));
    }
}
