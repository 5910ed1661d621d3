use super::*;

/// Header nonce. On the wire it is the hex of the four little-endian bytes
/// that were appended to the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, DeserializeFromStr, SerializeDisplay)]
pub struct Nonce(u32);

impl Nonce {
    pub fn to_le_bytes(self) -> [u8; 4] {
        let mut bytes = [0u8; 4];
        LittleEndian::write_u32(&mut bytes, self.0);
        bytes
    }
}

impl FromStr for Nonce {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 4];

        hex::decode_to_slice(s, &mut bytes).map_err(|e| InternalError::Parse {
            message: format!("invalid nonce hex string '{s}': {e}"),
        })?;

        Ok(Nonce(LittleEndian::read_u32(&bytes)))
    }
}

impl Display for Nonce {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.to_le_bytes()))
    }
}

impl From<Nonce> for u32 {
    fn from(n: Nonce) -> u32 {
        n.0
    }
}

impl From<u32> for Nonce {
    fn from(n: u32) -> Nonce {
        Nonce(n)
    }
}
