pub const DEFAULT_MAX_NAME_LEN: usize = 120;

/// Deterministic artifact name: `{sanitized_entity}__{year}.{extension}`.
pub fn canonical_file_name(entity: &str, year: &str, extension: &str) -> String {
    let stem = sanitize_filename(entity, DEFAULT_MAX_NAME_LEN);
    let extension = extension.trim_start_matches('.');
    format!("{stem}__{}.{extension}", year.trim())
}

/// Windows-safe file name stem that keeps the entity name readable.
///
/// Whitespace runs collapse to one space, forbidden characters become `_`
/// and the result is cut to `max_len` characters.
pub fn sanitize_filename(input: &str, max_len: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned: String = collapsed
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .take(max_len)
        .collect();
    let mut final_name = cleaned.trim_end().to_string();
    if final_name.is_empty() {
        final_name = "untitled".to_string();
    }
    if is_reserved_windows_name(&final_name) {
        final_name.push('_');
    }
    final_name
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
