use std::path::Path;

/// Content type for a downloaded file, by extension.
pub fn mime_guess(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("txt") => "text/plain",
        Some("json") => "application/json",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("mp4") => "video/mp4",
        _ => "application/octet-stream",
    }
}

/// `Content-Disposition` value for downloading `filename` as an attachment.
///
/// Carries an ASCII-only `filename` for old clients and the exact name as an
/// RFC 5987 `filename*` parameter.
pub fn attachment_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_guess() {
        assert_eq!(mime_guess(Path::new("a/photo.JPG")), "image/jpeg");
        assert_eq!(mime_guess(Path::new("notes.txt")), "text/plain");
        assert_eq!(mime_guess(Path::new("Makefile")), "application/octet-stream");
        assert_eq!(mime_guess(Path::new("blob.xyz")), "application/octet-stream");
    }

    #[test]
    fn test_attachment_disposition_ascii() {
        assert_eq!(
            attachment_disposition("report.pdf"),
            "attachment; filename=\"report.pdf\"; filename*=UTF-8''report.pdf"
        );
    }

    #[test]
    fn test_attachment_disposition_escapes() {
        let value = attachment_disposition("résumé \"v2\".txt");
        assert!(value.starts_with("attachment; filename=\"r_sum_ _v2_.txt\""));
        assert!(value.ends_with("filename*=UTF-8''r%C3%A9sum%C3%A9%20%22v2%22.txt"));
    }
}
