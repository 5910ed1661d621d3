use super::*;

/// Header timestamp as sent by the pool. Echoed back verbatim in `mining.submit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, DeserializeFromStr, SerializeDisplay)]
pub struct Ntime([u8; 4]);

impl Ntime {
    pub fn to_wire_bytes(self) -> [u8; 4] {
        self.0
    }
}

impl FromStr for Ntime {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(decode_fixed("ntime", s)?))
    }
}

impl Display for Ntime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl From<u32> for Ntime {
    fn from(time: u32) -> Self {
        Self(time.to_be_bytes())
    }
}
