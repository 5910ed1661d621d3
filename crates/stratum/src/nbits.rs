use super::*;

/// Compact target as it appears in `mining.notify`: eight hex characters,
/// kept in wire order for the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, DeserializeFromStr, SerializeDisplay)]
pub struct Nbits {
    compact: u32,
    target: Target,
}

impl Nbits {
    pub fn to_compact(self) -> u32 {
        self.compact
    }

    pub fn to_target(self) -> Target {
        self.target
    }

    pub fn to_wire_bytes(self) -> [u8; 4] {
        self.compact.to_be_bytes()
    }
}

impl TryFrom<u32> for Nbits {
    type Error = InternalError;

    fn try_from(compact: u32) -> Result<Self, Self::Error> {
        Ok(Self {
            compact,
            target: Target::from_compact(compact)?,
        })
    }
}

impl FromStr for Nbits {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = decode_fixed::<4>("nbits", s).map_err(|err| InternalError::MalformedTarget {
            nbits: s.into(),
            reason: err.to_string(),
        })?;

        Self::try_from(u32::from_be_bytes(bytes))
    }
}

impl Display for Nbits {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.compact)
    }
}

impl Target {
    /// Decode an eight-character compact hex string.
    pub fn decode(compact_hex: &str) -> Result<Self> {
        Ok(compact_hex.parse::<Nbits>()?.to_target())
    }
}
