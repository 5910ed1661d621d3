use super::*;

/// Expected hashes per difficulty-1 share. The exact value is
/// 2^256 / max_target, about 0.0015% higher, but 2^32 is what pools and
/// miners quote.
const HASHES_PER_DIFF_1: f64 = 4_294_967_296.0;

const SI_PREFIXES: &[(&str, f64)] = &[
    ("", 1.0),
    ("K", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
    ("Z", 1e21),
    ("Y", 1e24),
];

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct HashRate(pub f64);

impl HashRate {
    pub const ZERO: Self = Self(0.0);

    /// Hash rate needed to find one share of `difficulty` per `interval`.
    pub fn for_difficulty(difficulty: f64, interval: Duration) -> Self {
        if interval.is_zero() || !difficulty.is_finite() {
            return Self::ZERO;
        }

        Self(difficulty * HASHES_PER_DIFF_1 / interval.as_secs_f64())
    }

    pub fn from_hashes(hashes: u64, elapsed: Duration) -> Self {
        if elapsed.is_zero() {
            return Self::ZERO;
        }

        Self(hashes as f64 / elapsed.as_secs_f64())
    }
}

impl Display for HashRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        format_si(self.0, "H/s", f)
    }
}

fn format_si(value: f64, unit: &str, f: &mut Formatter<'_>) -> fmt::Result {
    if value == 0.0 {
        return write!(f, "0 {unit}");
    }

    let (prefix, divisor) = SI_PREFIXES
        .iter()
        .rev()
        .find(|(_, div)| value.abs() >= *div)
        .unwrap_or(&SI_PREFIXES[0]);

    let scaled = value / divisor;
    let s = format!("{scaled:.3}");
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');

    write!(f, "{trimmed} {prefix}{unit}")
}
