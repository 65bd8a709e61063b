//! Locally generated identifiers: millisecond timestamp plus a random
//! base-36 suffix. Used for record ids and storage keys so neither needs a
//! round trip to the backing store.

use chrono::Utc;
use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 7;

pub fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// `<millis>-<random>`, the collision-resistant stem of a storage key.
pub fn unique_stem() -> String {
    format!(
        "{}-{}",
        Utc::now().timestamp_millis(),
        random_suffix(SUFFIX_LEN)
    )
}

/// `<prefix>_<millis>_<random>`, e.g. `img_gen_1718000000000_k2j9x0a`.
pub fn record_id(prefix: &str) -> String {
    format!(
        "{}_{}_{}",
        prefix,
        Utc::now().timestamp_millis(),
        random_suffix(SUFFIX_LEN)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_random_suffix_alphabet() {
        let suffix = random_suffix(32);
        assert_eq!(suffix.len(), 32);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_record_ids_are_unique_and_prefixed() {
        let ids: HashSet<String> = (0..200).map(|_| record_id("img_gen")).collect();
        assert_eq!(ids.len(), 200);
        assert!(ids.iter().all(|id| id.starts_with("img_gen_")));
    }

    #[test]
    fn test_unique_stem_shape() {
        let stem = unique_stem();
        let (millis, suffix) = stem.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), SUFFIX_LEN);
    }
}
