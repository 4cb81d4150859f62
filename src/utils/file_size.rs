pub struct FileSizeUtils;

impl FileSizeUtils {
    /// Human-readable size with one decimal place above the byte range.
    /// A zero size renders as `n/a`.
    pub fn format_bytes(bytes: u64) -> String {
        const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
        if bytes == 0 {
            return "n/a".to_string();
        }

        let mut scaled = bytes;
        let mut unit_index = 0;
        while scaled >= 1024 && unit_index < UNITS.len() - 1 {
            scaled /= 1024;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", bytes, UNITS[unit_index])
        } else {
            let size = bytes as f64 / 1024f64.powi(unit_index as i32);
            format!("{:.1} {}", size, UNITS[unit_index])
        }
    }
}
