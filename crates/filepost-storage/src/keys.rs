//! Shared key generation for storage backends.

/// Longest filename suffix kept in a key. Leaves room for the random prefix
/// inside common 255-byte filename limits.
const MAX_FILENAME_LEN: usize = 200;

const FALLBACK_FILENAME: &str = "upload";

/// Generate a storage key for an uploaded file.
///
/// Produces `{32 hex chars}-{sanitized filename}`. Two uploads with the same
/// filename get different keys.
pub fn generate_storage_key(filename: &str) -> String {
    let prefix: [u8; 16] = rand::random();
    format!("{}-{}", hex::encode(prefix), sanitize_filename(filename))
}

/// Reduce a client filename to a single safe path segment.
///
/// Characters outside `[A-Za-z0-9._-]` (including path separators) become `_`
/// and `..` runs are broken up.
pub fn sanitize_filename(filename: &str) -> String {
    let mut sanitized: String = filename
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    while sanitized.contains("..") {
        sanitized = sanitized.replace("..", "_");
    }

    // Keep the tail so the extension survives
    if sanitized.len() > MAX_FILENAME_LEN {
        sanitized = sanitized[sanitized.len() - MAX_FILENAME_LEN..].to_string();
    }

    if sanitized.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_has_hex_prefix_and_filename() {
        let key = generate_storage_key("cat.png");
        let (prefix, rest) = key.split_at(32);
        assert!(prefix.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(rest, "-cat.png");
    }

    #[test]
    fn same_filename_gives_distinct_keys() {
        let a = generate_storage_key("cat.png");
        let b = generate_storage_key("cat.png");
        assert_ne!(a, b);
    }

    #[test]
    fn sanitize_replaces_separators_and_traversal() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "____etc_passwd");
        assert_eq!(sanitize_filename("dir\\photo.jpg"), "dir_photo.jpg");
        assert_eq!(sanitize_filename("my cat (1).png"), "my_cat__1_.png");
        assert!(!sanitize_filename("a....b").contains(".."));
    }

    #[test]
    fn sanitize_handles_empty_and_long_names() {
        assert_eq!(sanitize_filename(""), FALLBACK_FILENAME);
        assert_eq!(sanitize_filename("   "), FALLBACK_FILENAME);

        let long = format!("{}.gif", "a".repeat(500));
        let sanitized = sanitize_filename(&long);
        assert_eq!(sanitized.len(), MAX_FILENAME_LEN);
        assert!(sanitized.ends_with(".gif"));
    }

    #[test]
    fn sanitize_keeps_non_ascii_out() {
        assert_eq!(sanitize_filename("chat-été.png"), "chat-_t_.png");
    }
}
