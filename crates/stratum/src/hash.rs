use super::*;

/// A hash primitive with a fixed 32-byte digest, equivalent to double SHA-256.
pub trait DoubleHash: Send + Sync {
    fn hash(&self, data: &[u8]) -> [u8; 32];
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256d;

impl DoubleHash for Sha256d {
    fn hash(&self, data: &[u8]) -> [u8; 32] {
        sha256d::Hash::hash(data).to_byte_array()
    }
}
