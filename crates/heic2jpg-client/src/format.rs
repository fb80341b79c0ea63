//! Display helpers for conversion results.

use std::fmt;

use heic2jpg_types::ConversionResult;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size, base 1024, at most two decimals: `1536` -> `"1.5 KB"`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_owned();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{} {}", trim_decimals(value, 2), SIZE_UNITS[unit])
}

/// Percentage size reduction of `converted` relative to `original`.
///
/// Positive means the converted file is smaller. Halves round toward
/// positive infinity.
pub fn compression_ratio(original: u64, converted: u64) -> i64 {
    if original == 0 {
        return 0;
    }
    let ratio = (1.0 - converted as f64 / original as f64) * 100.0;
    (ratio + 0.5).floor() as i64
}

/// `"5 ms"` below one second, `"2.35 s"` from one second up.
pub fn format_time(seconds: f64) -> String {
    if seconds < 1.0 {
        format!("{} ms", (seconds * 1000.0).round() as i64)
    } else {
        format!("{seconds:.2} s")
    }
}

fn trim_decimals(value: f64, places: usize) -> String {
    let s = format!("{value:.places$}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_owned()
    } else {
        s
    }
}

/// Result panel: sizes, ratio, timing and the absolute download URL.
pub struct ResultSummary<'a> {
    result: &'a ConversionResult,
    download_url: String,
}

impl<'a> ResultSummary<'a> {
    /// `download_url` should already be resolved against the service root.
    pub fn new(result: &'a ConversionResult, download_url: impl Into<String>) -> Self {
        Self {
            result,
            download_url: download_url.into(),
        }
    }
}

impl fmt::Display for ResultSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.result;
        let ratio = compression_ratio(r.original_size, r.converted_size);
        let change = match ratio {
            0 => "same size".to_owned(),
            n if n > 0 => format!("{n}% smaller"),
            n => format!("{}% larger", -n),
        };

        writeln!(f, "File:       {}", r.filename)?;
        writeln!(f, "Original:   {}", format_file_size(r.original_size))?;
        writeln!(f, "Converted:  {} ({change})", format_file_size(r.converted_size))?;
        writeln!(f, "Time:       {}", format_time(r.conversion_time))?;
        write!(f, "Download:   {}", self.download_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_size_units() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(1), "1 Bytes");
        assert_eq!(format_file_size(1023), "1023 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1_048_576), "1 MB");
        assert_eq!(format_file_size(1_288_490_189), "1.2 GB");
    }

    #[test]
    fn file_size_rounds_to_two_decimals() {
        // 1234567 / 1024^2 = 1.1773...
        assert_eq!(format_file_size(1_234_567), "1.18 MB");
    }

    #[test]
    fn file_size_caps_at_gigabytes() {
        assert_eq!(format_file_size(2 * 1024u64.pow(4)), "2048 GB");
    }

    #[test]
    fn ratio_sign_and_zero_original() {
        assert_eq!(compression_ratio(1000, 500), 50);
        assert_eq!(compression_ratio(500, 1000), -100);
        assert_eq!(compression_ratio(1000, 1500), -50);
        assert_eq!(compression_ratio(0, 100), 0);
        assert_eq!(compression_ratio(1000, 1000), 0);
        assert_eq!(compression_ratio(3, 1), 67);
    }

    #[test]
    fn time_thresholds() {
        assert_eq!(format_time(0.005), "5 ms");
        assert_eq!(format_time(0.25), "250 ms");
        assert_eq!(format_time(2.345), "2.35 s");
        assert_eq!(format_time(0.0), "0 ms");
        assert_eq!(format_time(1.0), "1.00 s");
    }

    #[test]
    fn summary_renders_all_lines() {
        let result = ConversionResult {
            download_url: "/api/v1/download/x.jpg".into(),
            filename: "IMG_1.jpg".into(),
            original_size: 2048,
            converted_size: 1024,
            conversion_time: 0.25,
        };
        let text = ResultSummary::new(&result, "http://localhost:8000/api/v1/download/x.jpg")
            .to_string();
        assert!(text.contains("File:       IMG_1.jpg"));
        assert!(text.contains("Original:   2 KB"));
        assert!(text.contains("Converted:  1 KB (50% smaller)"));
        assert!(text.contains("Time:       250 ms"));
        assert!(text.ends_with("http://localhost:8000/api/v1/download/x.jpg"));
    }

    #[test]
    fn summary_reports_growth() {
        let result = ConversionResult {
            download_url: "/d".into(),
            filename: "a.jpg".into(),
            original_size: 500,
            converted_size: 1000,
            conversion_time: 1.5,
        };
        let text = ResultSummary::new(&result, "/d").to_string();
        assert!(text.contains("(100% larger)"));
        assert!(text.contains("1.50 s"));
    }
}
