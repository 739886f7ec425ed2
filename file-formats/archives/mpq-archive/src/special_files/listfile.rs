//! (listfile) parsing functionality

/// Name of the internal member enumerating the archive's files
pub const LISTFILE_NAME: &str = "(listfile)";

/// Parse a (listfile) into individual filenames
///
/// Names are separated by CRLF, with bare LF or CR accepted as well. The
/// content ends at the first NUL byte, surrounding whitespace is trimmed and
/// empty lines are dropped. Order is preserved.
pub fn parse_listfile(data: &[u8]) -> Vec<String> {
    let data = match data.iter().position(|&b| b == 0) {
        Some(end) => &data[..end],
        None => data,
    };

    let content = match std::str::from_utf8(data) {
        Ok(s) => std::borrow::Cow::Borrowed(s),
        Err(_) => {
            log::warn!("(listfile) contains invalid UTF-8, using lossy conversion");
            String::from_utf8_lossy(data)
        }
    };

    let files: Vec<String> = content
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    log::debug!("Parsed {} files from (listfile)", files.len());
    files
}
