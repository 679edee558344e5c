//! Input decoding and output helpers.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the hint encoding (from `<?xml encoding="..."?>`
///    or `<meta charset="...">`)
/// 3. Falls back to Windows-1252 (what older word-processor exports use)
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    // Try UTF-8 first (handles BOM automatically)
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Extract the encoding name from an XML declaration.
///
/// Only the first 100 bytes are checked.
pub fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let check_len = bytes.len().min(100);
    let prefix = &bytes[..check_len];

    let xml_start = prefix.windows(5).position(|w| w == b"<?xml")?;
    let after_xml = &prefix[xml_start..];
    quoted_value_after(after_xml, b"encoding=")
}

/// Extract the charset from a `<meta charset="...">` tag near the top of an
/// HTML document.
pub fn extract_meta_charset(bytes: &[u8]) -> Option<&str> {
    let check_len = bytes.len().min(1024);
    let prefix = &bytes[..check_len];
    quoted_value_after(prefix, b"charset=")
        .or_else(|| unquoted_charset(prefix))
}

fn quoted_value_after<'a>(bytes: &'a [u8], key: &[u8]) -> Option<&'a str> {
    let pos = bytes
        .windows(key.len())
        .position(|w| w.eq_ignore_ascii_case(key))?;
    let after = &bytes[pos + key.len()..];

    let &quote = after.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let end = after[1..].iter().position(|&b| b == quote)? + 1;
    std::str::from_utf8(&after[1..end]).ok()
}

// `content="text/html; charset=UTF-8"` style.
fn unquoted_charset(bytes: &[u8]) -> Option<&str> {
    let key = b"charset=";
    let pos = bytes
        .windows(key.len())
        .position(|w| w.eq_ignore_ascii_case(key))?;
    let after = &bytes[pos + key.len()..];
    let end = after
        .iter()
        .position(|&b| !(b.is_ascii_alphanumeric() || b == b'-' || b == b'_'))
        .unwrap_or(after.len());
    if end == 0 {
        return None;
    }
    std::str::from_utf8(&after[..end]).ok()
}

/// Read a text file, decoding it with the encoding it declares.
pub fn read_text(path: impl AsRef<Path>) -> Result<String> {
    let bytes = fs::read(path)?;
    let hint = extract_xml_encoding(&bytes).or_else(|| extract_meta_charset(&bytes));
    Ok(decode_text(&bytes, hint).into_owned())
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_text(path: impl AsRef<Path>, contents: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}
