/// Human readable byte count, e.g. `512.0B`, `1.5KB`.
pub fn file_size_str(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.1}{}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1}TB", size)
}

/// Image format guessed from the extension appearing in `url`.
pub fn image_format(url: &str) -> &'static str {
    const FORMATS: [(&str, &str); 8] = [
        (".jpg", "jpeg"),
        (".jpeg", "jpeg"),
        (".png", "png"),
        (".gif", "gif"),
        (".webp", "webp"),
        (".svg", "svg"),
        (".bmp", "bmp"),
        (".ico", "ico"),
    ];

    let lowered = url.to_lowercase();
    FORMATS
        .iter()
        .find(|(ext, _)| lowered.contains(ext))
        .map(|(_, format)| *format)
        .unwrap_or("unknown")
}

/// Collapse runs of whitespace and drop control characters.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}

/// First `max` characters of `text` (not bytes).
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_size_str() {
        assert_eq!(file_size_str(0), "0.0B");
        assert_eq!(file_size_str(512), "512.0B");
        assert_eq!(file_size_str(1536), "1.5KB");
        assert_eq!(file_size_str(5 * 1024 * 1024), "5.0MB");
        assert_eq!(file_size_str(3 * 1024 * 1024 * 1024), "3.0GB");
    }

    #[test]
    fn test_image_format() {
        assert_eq!(image_format("https://x.com/a.JPG"), "jpeg");
        assert_eq!(image_format("/img/logo.svg?v=2"), "svg");
        assert_eq!(image_format("/pic.webp"), "webp");
        assert_eq!(image_format("/image?id=4"), "unknown");
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Hello \n\t world  "), "Hello world");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("çerez politikası", 5), "çerez");
        assert_eq!(truncate_chars("short", 100), "short");
    }
}
