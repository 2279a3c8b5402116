use std::path::Path;

/// Exclusive upper bound of the random part of a generated name.
const RANDOM_SUFFIX_RANGE: u64 = 1_000_000_000_000;

/// Base and extension are truncated to these many UTF-8 bytes so that
/// generated names stay below the 255 byte limit common to most filesystems.
const MAX_BASE_BYTES: usize = 200;
const MAX_EXTENSION_BYTES: usize = 16;

const FALLBACK_BASE: &str = "file";

/// Generates an on-disk name for an uploaded file.
///
/// The result has the form `<base>-<unix millis>-<random><.extension>` where
/// base and extension are taken from `original_name`. Uniqueness is
/// probabilistic; callers that must not overwrite files check for existence.
pub fn generate_file_name(original_name: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let random = rand::random_range(0..RANDOM_SUFFIX_RANGE);

    compose_file_name(original_name, millis, random)
}

fn compose_file_name(original_name: &str, millis: i64, random: u64) -> String {
    // Clients may send full paths; only the last segment is kept.
    let last_segment = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);
    let path = Path::new(last_segment);

    let base = path
        .file_stem()
        .map(|stem| sanitize(&stem.to_string_lossy(), MAX_BASE_BYTES))
        .filter(|base| !base.is_empty() && base != "." && base != "..")
        .unwrap_or_else(|| FALLBACK_BASE.to_owned());

    let extension = path
        .extension()
        .map(|ext| sanitize(&ext.to_string_lossy(), MAX_EXTENSION_BYTES))
        .filter(|ext| !ext.is_empty());

    match extension {
        Some(extension) => format!("{}-{}-{}.{}", base, millis, random, extension),
        None => format!("{}-{}-{}", base, millis, random),
    }
}

fn sanitize(segment: &str, max_bytes: usize) -> String {
    let mut sanitized = String::with_capacity(segment.len().min(max_bytes));

    for c in segment.chars() {
        let c = match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        };

        // never split a multi-byte character
        if max_bytes < sanitized.len() + c.len_utf8() {
            break;
        }

        sanitized.push(c);
    }

    sanitized.trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_compose_keeps_base_and_extension() {
        assert_eq!(
            compose_file_name("report.pdf", 1700000000000, 42),
            "report-1700000000000-42.pdf"
        );
        assert_eq!(
            compose_file_name("archive.tar.gz", 1, 2),
            "archive.tar-1-2.gz"
        );
    }

    #[test]
    fn test_compose_without_extension() {
        assert_eq!(compose_file_name("README", 1, 2), "README-1-2");
        assert_eq!(compose_file_name(".bashrc", 1, 2), ".bashrc-1-2");
    }

    #[test]
    fn test_compose_strips_directories_and_unsafe_characters() {
        assert_eq!(compose_file_name("../../etc/passwd", 1, 2), "passwd-1-2");
        assert_eq!(compose_file_name("C:\\Users\\me\\a.txt", 1, 2), "a-1-2.txt");
        assert_eq!(compose_file_name("what?.txt", 1, 2), "what_-1-2.txt");
        assert_eq!(compose_file_name("line\nbreak.txt", 1, 2), "line_break-1-2.txt");
    }

    #[test]
    fn test_compose_falls_back_for_empty_names() {
        assert_eq!(compose_file_name("", 1, 2), "file-1-2");
        assert_eq!(compose_file_name("..", 1, 2), "file-1-2");
        assert_eq!(compose_file_name("dir/", 1, 2), "file-1-2");
    }

    #[test]
    fn test_compose_truncates_long_names() {
        let name = format!("{}.txt", "a".repeat(500));
        let generated = compose_file_name(&name, 1, 2);

        assert_eq!(generated, format!("{}-1-2.txt", "a".repeat(MAX_BASE_BYTES)));
    }

    #[test]
    fn test_compose_truncates_multi_byte_names_by_bytes() {
        let name = format!("{}.{}", "가".repeat(90), "확장".repeat(10));
        let generated = compose_file_name(&name, 1_700_000_000_000, RANDOM_SUFFIX_RANGE - 1);
        let (base, extension) = generated.rsplit_once('.').unwrap();

        assert!(generated.len() < 255);
        assert!(base.starts_with(&"가".repeat(MAX_BASE_BYTES / 3)));
        assert!(base.ends_with("-1700000000000-999999999999"));
        assert_eq!(extension, "확장확장확");
    }

    #[test]
    fn test_generated_names_are_unique() {
        let names = (0..10_000)
            .map(|_| generate_file_name("same.txt"))
            .collect::<HashSet<_>>();

        assert_eq!(names.len(), 10_000);
        assert!(names
            .iter()
            .all(|name| name.starts_with("same-") && name.ends_with(".txt")));
    }
}
