/// Maximum total length accepted by the backend for a resume file name.
pub const MAX_RESUME_NAME_LEN: usize = 100;

const EXTENSION: &str = ".docx";

/// Truncates a resume file name to `max_length`, preserving a single `.docx`
/// extension. The backend stores names in a column with limited width, so
/// oversized names must be cut client-side before upload or rename.
pub fn truncate_file_name(file_name: &str, max_length: usize) -> String {
    let mut base = file_name.trim().to_string();

    // Strip the extension if present so the stem is truncated cleanly.
    if base.to_lowercase().ends_with(EXTENSION) {
        base.truncate(base.len() - EXTENSION.len());
    }

    let max_base = max_length.saturating_sub(EXTENSION.len());
    if base.chars().count() > max_base {
        base = base.chars().take(max_base).collect();
    }

    format!("{base}{EXTENSION}")
}

/// Whether a file name carries the `.docx` extension (case-insensitive).
pub fn is_docx_name(name: &str) -> bool {
    name.to_lowercase().ends_with(EXTENSION)
}
