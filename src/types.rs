//! Type definitions and request parameter coercion

use std::fmt;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Which sub-tests a request runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestMode {
    /// Download, upload and ping, in that order
    All,
    /// Download only
    Download,
    /// Upload only
    Upload,
    /// Ping only
    Ping,
    /// Any other value; no sub-test runs
    Unrecognized,
}

impl Default for TestMode {
    fn default() -> Self {
        Self::All
    }
}

impl TestMode {
    /// Interpret a `mode` query value. Matching is exact, so `ALL` is
    /// unrecognized just like `bogus`.
    pub fn from_param(value: &str) -> Self {
        match value {
            "all" => Self::All,
            "download" => Self::Download,
            "upload" => Self::Upload,
            "ping" => Self::Ping,
            _ => Self::Unrecognized,
        }
    }

    pub fn runs_download(&self) -> bool {
        matches!(self, Self::All | Self::Download)
    }

    pub fn runs_upload(&self) -> bool {
        matches!(self, Self::All | Self::Upload)
    }

    pub fn runs_ping(&self) -> bool {
        matches!(self, Self::All | Self::Ping)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Download => "download",
            Self::Upload => "upload",
            Self::Ping => "ping",
            Self::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for TestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leniently parse an integer request parameter.
///
/// Leading whitespace is skipped, then the longest numeric prefix is read:
/// an optional sign, digits, an optional fraction and an optional exponent
/// (`1e3` is 1000). Everything after is ignored and fractions truncate.
/// Input without leading digits degrades to 0, negative values clamp to 0
/// and overflow saturates. This never fails.
pub fn coerce_non_negative(value: &str) -> u64 {
    let trimmed = value.trim_start();
    let bytes = trimmed.as_bytes();

    let mut end = 0;
    let negative = match bytes.first() {
        Some(b'-') => {
            end = 1;
            true
        }
        Some(b'+') => {
            end = 1;
            false
        }
        _ => false,
    };

    let int_start = end;
    end = skip_digits(bytes, end);
    let int_digits = end - int_start;

    let mut fractional = false;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = skip_digits(bytes, end + 1);
        frac_digits = frac_end - end - 1;
        if int_digits > 0 || frac_digits > 0 {
            fractional = true;
            end = frac_end;
        }
    }

    if negative || int_digits + frac_digits == 0 {
        return 0;
    }

    // An exponent only counts when at least one digit follows it
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = skip_digits(bytes, exp);
        if exp_end > exp {
            fractional = true;
            end = exp_end;
        }
    }

    if fractional {
        // `as` truncates toward zero and saturates at u64::MAX
        trimmed[..end].parse::<f64>().map(|v| v as u64).unwrap_or(0)
    } else {
        trimmed[int_start..end].bytes().fold(0u64, |acc, byte| {
            acc.saturating_mul(10).saturating_add(u64::from(byte - b'0'))
        })
    }
}

fn skip_digits(bytes: &[u8], from: usize) -> usize {
    from + bytes[from.min(bytes.len())..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count()
}

/// Coerce a count parameter and clamp it to `max`
pub fn coerce_count(value: &str, max: u32) -> u32 {
    coerce_non_negative(value).min(u64::from(max)) as u32
}
