//! Filename-extension based content-type lookup.

const OCTET_STREAM: &str = "application/octet-stream";

/// Content type for `filename`, `application/octet-stream` when the
/// extension is missing or unknown. Never fails.
pub fn from_filename(filename: &str) -> &'static str {
    match filename.rsplit_once('.') {
        Some((_, ext)) => from_extension(ext.trim()),
        None => OCTET_STREAM,
    }
}

/// Case-insensitive extension lookup.
pub fn from_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "txt" | "text" | "log" | "conf" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "ics" => "text/calendar",
        "vcf" => "text/vcard",
        "md" | "markdown" => "text/markdown",
        "xml" => "application/xml",
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "rtf" => "application/rtf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "odt" => "application/vnd.oasis.opendocument.text",
        "ods" => "application/vnd.oasis.opendocument.spreadsheet",
        "odp" => "application/vnd.oasis.opendocument.presentation",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "tif" | "tiff" => "image/tiff",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "mp4" => "video/mp4",
        "mpeg" | "mpg" => "video/mpeg",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "webm" => "video/webm",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "bz2" => "application/x-bzip2",
        "7z" => "application/x-7z-compressed",
        "rar" => "application/vnd.rar",
        "eml" => "message/rfc822",
        _ => OCTET_STREAM,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn known_extension() {
        assert_eq!(from_filename("report.pdf"), "application/pdf");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(from_filename("photo.JPG"), "image/jpeg");
    }

    #[test]
    fn last_extension_wins() {
        assert_eq!(from_filename("archive.tar.gz"), "application/gzip");
    }

    #[test]
    fn no_extension_falls_back() {
        assert_eq!(from_filename("README"), "application/octet-stream");
    }

    #[test]
    fn trailing_dot_falls_back() {
        assert_eq!(from_filename("file."), "application/octet-stream");
    }
}
