//! Display formatting shared by the markdown digest, chart labels and pages.

pub const MISSING: &str = "--";
pub const NOT_AVAILABLE: &str = "n/a";
pub const FALLBACK_COLOR: &str = "#6b6358";

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Fixed-point text with exact halves rounded away from zero.
fn to_fixed(value: f64, digits: usize) -> String {
    let factor = 10_f64.powi(digits as i32);
    let rounded = (value * factor).round() / factor;
    format!("{rounded:.digits$}")
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (len - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Locale-style number: thousands separators and at most `digits` fraction digits.
pub fn format_number(value: Option<f64>, digits: usize) -> String {
    let Some(value) = finite(value) else {
        return MISSING.to_string();
    };

    let fixed = to_fixed(value.abs(), digits);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let mut out = String::new();
    if value < 0.0 && (int_part != "0" || !frac_part.is_empty()) {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

pub fn format_bytes(bytes: Option<f64>) -> String {
    let Some(mut value) = finite(bytes) else {
        return MISSING.to_string();
    };

    let mut idx = 0;
    while value >= 1024.0 && idx < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        idx += 1;
    }

    let digits = if value >= 10.0 { 1 } else { 2 };
    format!("{} {}", to_fixed(value, digits), BYTE_UNITS[idx])
}

pub fn format_ms(ms: Option<f64>) -> String {
    match finite(ms) {
        Some(ms) if ms >= 1000.0 => format!("{} s", to_fixed(ms / 1000.0, 2)),
        Some(ms) => format!("{} ms", to_fixed(ms, 2)),
        None => MISSING.to_string(),
    }
}

pub fn format_seconds(seconds: Option<f64>) -> String {
    match finite(seconds) {
        Some(seconds) if seconds >= 60.0 => format!("{} min", to_fixed(seconds / 60.0, 2)),
        Some(seconds) => format!("{} s", to_fixed(seconds, 2)),
        None => MISSING.to_string(),
    }
}

pub fn format_row_count(count: Option<f64>) -> String {
    match finite(count) {
        Some(count) if count >= 1_000_000.0 => format!("{}M", to_fixed(count / 1_000_000.0, 0)),
        Some(count) if count >= 1_000.0 => format!("{}K", to_fixed(count / 1_000.0, 0)),
        Some(count) => count.to_string(),
        None => MISSING.to_string(),
    }
}

pub fn format_int(value: Option<u64>) -> String {
    match value {
        Some(value) => group_thousands(&value.to_string()),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_mb(bytes: Option<f64>) -> String {
    match finite(bytes) {
        Some(bytes) => format!("{:.2}", bytes / (1024.0 * 1024.0)),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_float(value: Option<f64>) -> String {
    let Some(value) = finite(value) else {
        return NOT_AVAILABLE.to_string();
    };
    let fixed = format!("{value:.3}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn short_line_label(label: &str) -> String {
    let text = label.replacen("parquet_", "pq_", 1);
    if text.chars().count() <= 12 {
        return text;
    }
    let head: String = text.chars().take(10).collect();
    format!("{head}…")
}

/// Wraps an axis label onto at most two lines.
pub fn split_label(label: &str) -> Vec<String> {
    let text = short_line_label(label);
    if text.chars().count() <= 10 {
        return vec![text];
    }

    if let Some((first, rest)) = text.split_once('_') {
        return vec![first.to_string(), rest.to_string()];
    }

    let head: String = text.chars().take(8).collect();
    let tail: String = text.chars().skip(8).collect();
    vec![head, tail]
}

pub fn short_label(label: &str) -> String {
    label
        .replacen("parquet_", "pq_", 1)
        .replacen("duckdb_table", "duckdb", 1)
        .replacen("vortex_default", "vortex", 1)
        .replacen("vortex_error", "vortex_err", 1)
}

pub fn display_name(format: &str) -> String {
    format
        .replacen("parquet_", "Parquet ", 1)
        .replacen("vortex_default", "Vortex", 1)
        .replacen("duckdb_table", "DuckDB table", 1)
}

pub fn format_color(format: &str) -> &'static str {
    match format {
        "parquet_zstd" => "#2f4a36",
        "parquet_snappy" => "#e38b2c",
        "parquet_uncompressed" => "#4c6fa8",
        "vortex_default" => "#a84c6f",
        "duckdb_table" => "#5c5c5c",
        _ => FALLBACK_COLOR,
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
