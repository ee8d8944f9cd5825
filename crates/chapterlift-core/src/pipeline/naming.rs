//! Object key generation for uploaded pages.
//!
//! Keys look like `<token>_<base>.jpg`, where the token is a nanosecond
//! timestamp that is strictly increasing within the process and `base` is
//! the sanitized original file stem.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Extension of the fixed output format.
pub const OUTPUT_EXTENSION: &str = "jpg";

static LAST_TOKEN: AtomicU64 = AtomicU64::new(0);

/// Next uniqueness token: wall-clock nanoseconds, bumped past the previous
/// token when two pages are named within the same tick.
pub fn next_token() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let mut prev = LAST_TOKEN.load(Ordering::Relaxed);
    loop {
        let next = now.max(prev + 1);
        match LAST_TOKEN.compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => prev = actual,
        }
    }
}

/// Keep ASCII alphanumerics, `-`, `_` and `.`; replace everything else.
pub fn sanitize_base(stem: &str) -> String {
    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Derive the remote object key for a page.
pub fn output_name(original_name: &str) -> String {
    let stem = Path::new(original_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    format!(
        "{}_{}.{}",
        next_token(),
        sanitize_base(stem),
        OUTPUT_EXTENSION
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_output_name_shape() {
        let name = output_name("012.png");
        let (token, rest) = name.split_once('_').unwrap();
        assert!(token.parse::<u64>().is_ok());
        assert_eq!(rest, "012.jpg");
    }

    #[test]
    fn test_extension_is_replaced_not_appended() {
        let name = output_name("page.webp");
        assert!(name.ends_with("_page.jpg"));
        assert!(!name.contains("webp"));
    }

    #[test]
    fn test_sanitize_base() {
        assert_eq!(sanitize_base("Глава 1 (стр 2)"), "______1______2_");
        assert_eq!(sanitize_base("ch-01_p.03"), "ch-01_p.03");
        assert_eq!(sanitize_base(""), "image");
        assert_eq!(sanitize_base("..."), "image");
    }

    #[test]
    fn test_tokens_are_strictly_increasing() {
        let mut last = 0;
        for _ in 0..1000 {
            let t = next_token();
            assert!(t > last);
            last = t;
        }
    }

    #[test]
    fn test_names_are_unique_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| (0..200).map(|_| output_name("p.png")).collect::<Vec<_>>())
            })
            .collect();
        let mut seen = HashSet::new();
        for handle in handles {
            for name in handle.join().unwrap() {
                assert!(seen.insert(name), "duplicate object key");
            }
        }
        assert_eq!(seen.len(), 1600);
    }
}
