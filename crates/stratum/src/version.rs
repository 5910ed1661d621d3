use super::*;

/// Block version as sent by the pool, kept in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, DeserializeFromStr, SerializeDisplay)]
pub struct Version([u8; 4]);

impl Version {
    pub fn to_wire_bytes(self) -> [u8; 4] {
        self.0
    }
}

impl FromStr for Version {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(decode_fixed("version", s)?))
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl From<[u8; 4]> for Version {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_order_is_preserved() {
        let version = "20000000".parse::<Version>().unwrap();
        assert_eq!(version.to_wire_bytes(), [0x20, 0, 0, 0]);
        assert_eq!(version.to_string(), "20000000");
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(matches!(
            "2000000".parse::<Version>(),
            Err(InternalError::MalformedJob {
                field: "version",
                ..
            })
        ));
    }
}
