use super::*;

/// One 32-byte merkle branch hash, hex-encoded in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, DeserializeFromStr, SerializeDisplay)]
pub struct MerkleNode([u8; 32]);

impl MerkleNode {
    pub fn as_byte_array(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for MerkleNode {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(decode_fixed("merkle_branch", s)?))
    }
}

impl Display for MerkleNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl From<[u8; 32]> for MerkleNode {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Double-hash the coinbase transaction `coinb1 ‖ extranonce1 ‖ extranonce2 ‖ coinb2`.
pub fn coinbase_hash<H: DoubleHash + ?Sized>(
    hasher: &H,
    coinb1: &str,
    extranonce1: &Extranonce,
    extranonce2: &Extranonce,
    coinb2: &str,
) -> Result<[u8; 32]> {
    let mut coinbase = Vec::with_capacity(
        coinb1.len() / 2 + extranonce1.len() + extranonce2.len() + coinb2.len() / 2,
    );

    coinbase.extend(hex::decode(coinb1).map_err(|err| InternalError::MalformedJob {
        field: "coinb1",
        reason: err.to_string(),
    })?);
    coinbase.extend_from_slice(extranonce1.as_bytes());
    coinbase.extend_from_slice(extranonce2.as_bytes());
    coinbase.extend(hex::decode(coinb2).map_err(|err| InternalError::MalformedJob {
        field: "coinb2",
        reason: err.to_string(),
    })?);

    Ok(hasher.hash(&coinbase))
}

/// Fold the branch into the coinbase hash left to right, in the order given.
pub fn merkle_root<H: DoubleHash + ?Sized>(
    hasher: &H,
    coinbase_hash: [u8; 32],
    branch: &[MerkleNode],
) -> [u8; 32] {
    let mut concat = [0u8; 64];

    branch.iter().fold(coinbase_hash, |root, node| {
        concat[..32].copy_from_slice(&root);
        concat[32..].copy_from_slice(node.as_byte_array());
        hasher.hash(&concat)
    })
}
