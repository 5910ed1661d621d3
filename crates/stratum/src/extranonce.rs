use super::*;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Extranonce(Vec<u8>);

impl Extranonce {
    /// The little-endian bytes of `counter`, truncated or zero-padded to `size`.
    pub fn from_counter(counter: u64, size: usize) -> Self {
        let mut bytes = vec![0u8; size];
        let len = size.min(8);
        bytes[..len].copy_from_slice(&counter.to_le_bytes()[..len]);
        Self(bytes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        Ok(Self(hex::decode(s).context(error::HexSnafu)?))
    }
}

impl Serialize for Extranonce {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Extranonce {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let s = String::deserialize(de)?;
        Self::from_hex(&s).map_err(|e| de::Error::custom(e.to_string()))
    }
}

impl Display for Extranonce {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Extranonce {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
