use super::*;

const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

/// Fixed-point scale used when dividing a target by a fractional factor.
const SCALE: u64 = 1 << 32;

/// A 256-bit share or block threshold. A hash meets the target when its
/// byte-reversed value, read as a big-endian integer, is strictly less than it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Target(U256);

impl Target {
    /// Difficulty 1: exponent 0x1d, mantissa 0x00ffff.
    pub const MAX: Self = Self(U256([0, 0, 0, 0x0000_0000_ffff_0000]));

    /// Accepts every hash except all-ones.
    pub const EASIEST: Self = Self(U256::MAX);

    pub const ONE: Self = Self(U256([1, 0, 0, 0]));

    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(U256::from_big_endian(&bytes))
    }

    pub fn to_be_bytes(self) -> [u8; 32] {
        self.0.to_big_endian()
    }

    /// Split a compact value into exponent and mantissa and expand it to
    /// `mantissa * 256^(exponent - 3)`.
    pub fn from_compact(compact: u32) -> Result<Self> {
        let exponent = compact >> 24;
        let mantissa = compact & 0x00ff_ffff;

        if !(3..=32).contains(&exponent) {
            return Err(InternalError::MalformedTarget {
                nbits: format!("{compact:08x}"),
                reason: format!("exponent {exponent} outside 3..=32"),
            });
        }

        if mantissa == 0 {
            return Err(InternalError::MalformedTarget {
                nbits: format!("{compact:08x}"),
                reason: "zero mantissa".into(),
            });
        }

        Ok(Self(U256::from(mantissa) << (8 * (exponent - 3) as usize)))
    }

    /// Encode to compact form, normalising the mantissa so its top bit is clear.
    pub fn to_compact(self) -> u32 {
        let size = self.0.bits().div_ceil(8).max(3) as u32;

        let mut mantissa = (self.0 >> (8 * (size - 3) as usize)).low_u32();
        let mut exponent = size;

        if mantissa & 0x0080_0000 != 0 {
            mantissa >>= 8;
            exponent += 1;
        }

        (exponent << 24) | mantissa
    }

    pub fn from_difficulty(difficulty: f64) -> Self {
        Self::MAX.scale(difficulty)
    }

    /// `max_target / target`. Both exceed 64 bits, so the division happens in
    /// floating point over the full-width values.
    pub fn difficulty(self) -> f64 {
        to_f64(Self::MAX.0) / to_f64(self.0)
    }

    /// `target / factor`, clamped to `[1, 2^256 - 1]`. A factor above one
    /// yields a stricter target. A zero, negative or NaN factor yields
    /// [`Target::EASIEST`] and positive infinity yields [`Target::ONE`].
    pub fn scale(self, factor: f64) -> Self {
        if factor.is_nan() || factor <= 0.0 {
            return Self::EASIEST;
        }

        let denominator = (factor * SCALE as f64).round();

        if denominator < 1.0 {
            return Self::EASIEST;
        }

        if denominator >= u128::MAX as f64 {
            return Self::ONE;
        }

        let quotient =
            U512::from(self.0) * U512::from(SCALE) / U512::from(denominator as u128);

        match U256::try_from(quotient) {
            Ok(value) if value.is_zero() => Self::ONE,
            Ok(value) => Self(value),
            Err(_) => Self::EASIEST,
        }
    }

    pub fn is_met_by(self, hash: &[u8; 32]) -> bool {
        U256::from_little_endian(hash) < self.0
    }
}

impl From<Nbits> for Target {
    fn from(nbits: Nbits) -> Self {
        nbits.to_target()
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.to_be_bytes()))
    }
}

/// Difficulty of a hash as the pool would compute it.
pub fn hash_difficulty(hash: &[u8; 32]) -> f64 {
    let value = U256::from_little_endian(hash);

    if value.is_zero() {
        return f64::INFINITY;
    }

    to_f64(Target::MAX.0) / to_f64(value)
}

fn to_f64(value: U256) -> f64 {
    value
        .0
        .iter()
        .rev()
        .fold(0.0, |acc, &limb| acc * TWO_POW_64 + limb as f64)
}
