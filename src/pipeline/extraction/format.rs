use super::types::FormatTag;
use super::ExtractionError;
use crate::config::MAX_UPLOAD_BYTES;

/// Detect the declared format from the file name's last extension.
///
/// Comparison is case-insensitive. Names without an extension, or with an
/// empty one (`"notes."`), are unsupported.
pub fn detect_format(file_name: &str) -> FormatTag {
    let Some((_, ext)) = file_name.rsplit_once('.') else {
        return FormatTag::Unsupported;
    };

    match ext.to_ascii_lowercase().as_str() {
        "pdf" => FormatTag::Pdf,
        "docx" => FormatTag::Docx,
        _ => FormatTag::Unsupported,
    }
}

/// Reject uploads over the size cap before any parser sees them.
pub fn check_upload_size(size_bytes: u64) -> Result<(), ExtractionError> {
    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(ExtractionError::ExtractionFailed(format!(
            "file is {size_bytes} bytes, limit is {MAX_UPLOAD_BYTES} bytes"
        )));
    }
    Ok(())
}
