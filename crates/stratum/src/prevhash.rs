use super::*;

/// Previous block hash as sent by the pool, kept in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, DeserializeFromStr, SerializeDisplay)]
pub struct PrevHash([u8; 32]);

impl PrevHash {
    pub fn to_wire_bytes(self) -> [u8; 32] {
        self.0
    }
}

impl FromStr for PrevHash {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(decode_fixed("prevhash", s)?))
    }
}

impl Display for PrevHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl From<[u8; 32]> for PrevHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}
