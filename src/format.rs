use std::time::Duration;
use std::fmt::Display;

pub struct FormattedDuration(pub Duration);

impl Display for FormattedDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.0.as_secs();
        let m = s / 60;
        let h = m / 60;
        let ms = self.0.subsec_millis();
        match (h, m % 60, s % 60) {
            (0, 0, 0) => write!(f, "{ms}ms"),
            (0, 0, s) => write!(f, "{s}.{ms:03}s"),
            (0, m, s) => write!(f, "{m}m {s}.{ms:03}s"),
            (h, m, s) => write!(f, "{h}h {m}m {s}.{ms:03}s"),
        }
    }
}

/// Formats a count with thousands separators, e.g. `12,345,678`.
pub struct FormattedCount(pub usize);

impl Display for FormattedCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = self.0.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(c);
        }
        f.pad(&out)
    }
}
