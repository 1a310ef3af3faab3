//! Loading JSON text
//!
//! Documents come from a local file or an http(s) URL. Remote hosts must
//! use https; plain http is limited to localhost. Anything larger than
//! [`MAX_SOURCE_BYTES`] is refused before it reaches the parser.

use crate::error::{Result, ViewError};
use reqwest::blocking;
use std::io::Read;
use std::path::Path;

/// Maximum document size that can be loaded (4MB)
pub const MAX_SOURCE_BYTES: usize = 4 * 1024 * 1024;

pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Read a document from a path or URL
pub fn load(location: &str) -> Result<String> {
    if is_remote(location) {
        fetch(location)
    } else {
        read_file(Path::new(location))
    }
}

pub fn read_file(path: &Path) -> Result<String> {
    let len = std::fs::metadata(path)?.len();
    check_size(usize::try_from(len).unwrap_or(usize::MAX))?;
    Ok(std::fs::read_to_string(path)?)
}

pub fn fetch(url: &str) -> Result<String> {
    validate_url(url)?;

    let response = blocking::get(url)?;
    let status = response.status();
    if !status.is_success() {
        return Err(ViewError::Http {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    if let Some(len) = response.content_length() {
        check_size(usize::try_from(len).unwrap_or(usize::MAX))?;
    }

    read_bounded(response)
}

/// Read a document body, stopping one byte past [`MAX_SOURCE_BYTES`]
pub fn read_bounded(reader: impl Read) -> Result<String> {
    let mut body = Vec::new();
    reader.take(MAX_SOURCE_BYTES as u64 + 1).read_to_end(&mut body)?;
    check_size(body.len())?;
    String::from_utf8(body).map_err(|e| ViewError::Source(format!("document is not UTF-8: {}", e)))
}

/// Allow http:// only for localhost; require https:// for remote hosts
pub fn validate_url(url: &str) -> Result<()> {
    let is_local = url.starts_with("http://localhost") || url.starts_with("http://127.0.0.1");
    if url.starts_with("http://") && !is_local {
        return Err(ViewError::Source(
            "only https:// is allowed for remote URLs (http:// is limited to localhost)".to_string(),
        ));
    }
    Ok(())
}

pub fn check_size(bytes: usize) -> Result<()> {
    if bytes > MAX_SOURCE_BYTES {
        return Err(ViewError::Source(format!(
            "document is {} bytes, limit is {}",
            bytes, MAX_SOURCE_BYTES
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn remote_detection() {
        assert!(is_remote("https://example.com/data.json"));
        assert!(is_remote("http://localhost:8080/x.json"));
        assert!(!is_remote("data/http.json"));
    }

    #[test]
    fn plain_http_only_for_localhost() {
        assert!(validate_url("https://example.com/a.json").is_ok());
        assert!(validate_url("http://localhost:3000/a.json").is_ok());
        assert!(validate_url("http://127.0.0.1/a.json").is_ok());
        assert!(matches!(validate_url("http://example.com/a.json"), Err(ViewError::Source(_))));
    }

    #[test]
    fn size_limit() {
        assert!(check_size(MAX_SOURCE_BYTES).is_ok());
        assert!(matches!(check_size(MAX_SOURCE_BYTES + 1), Err(ViewError::Source(_))));
    }

    #[test]
    fn bounded_reads_stop_past_the_limit() {
        let small = read_bounded(&br#"{"a": 1}"#[..]).unwrap();
        assert_eq!(small, r#"{"a": 1}"#);

        let exact = vec![b' '; MAX_SOURCE_BYTES];
        assert_eq!(read_bounded(&exact[..]).unwrap().len(), MAX_SOURCE_BYTES);

        // an endless stream stands in for a chunked body with no length
        let endless = std::io::repeat(b' ');
        assert!(matches!(read_bounded(endless), Err(ViewError::Source(_))));
    }

    #[test]
    fn bounded_reads_reject_invalid_utf8() {
        assert!(matches!(read_bounded(&b"\xFF\xFE"[..]), Err(ViewError::Source(_))));
    }

    #[test]
    fn reads_local_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"a": [1, 2]}}"#).unwrap();
        let text = load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(text, r#"{"a": [1, 2]}"#);
    }

    #[test]
    fn missing_files_are_io_errors() {
        assert!(matches!(load("/definitely/not/here.json"), Err(ViewError::Io(_))));
    }
}
