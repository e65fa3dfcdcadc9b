/// Size formatting utilities — human-readable byte counts.
///
/// All internal sizes are `u64` bytes, optionally absent when sizing was
/// skipped or failed. Floating point is only used at the display boundary.

/// Placeholder shown where a size was not computed.
pub const UNKNOWN_SIZE: &str = "size n/a";

/// Format a byte count into a human-readable string with appropriate unit.
///
/// Uses binary units (KiB = 1024) but labels them with the short forms
/// (KB, MB, GB, TB) that the Steam client itself shows.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    const TB: f64 = GB * 1024.0;

    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < MB {
        format!("{:.1} KB", b / KB)
    } else if b < GB {
        format!("{:.1} MB", b / MB)
    } else if b < TB {
        format!("{:.2} GB", b / GB)
    } else {
        format!("{:.2} TB", b / TB)
    }
}

/// Format an optional size, using [`UNKNOWN_SIZE`] for `None`.
pub fn format_size_opt(bytes: Option<u64>) -> String {
    match bytes {
        Some(b) => format_size(b),
        None => UNKNOWN_SIZE.to_string(),
    }
}

/// Format a count with thousand separators.
pub fn format_count(count: u64) -> String {
    let s = count.to_string();
    if s.len() <= 3 {
        return s;
    }
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, ch) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result
}
