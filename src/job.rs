use super::*;

pub const HEADER_SIZE: usize = 80;
pub const HEADER_PREFIX_SIZE: usize = HEADER_SIZE - 4;

/// One `mining.notify` together with the extranonce assignment of the session
/// that received it.
#[derive(Debug, Clone)]
pub struct Job {
    pub notify: Notify,
    pub extranonce1: Extranonce,
    pub extranonce2_size: usize,
}

impl Job {
    pub fn new(notify: Notify, extranonce1: Extranonce, extranonce2_size: usize) -> Self {
        Self {
            notify,
            extranonce1,
            extranonce2_size,
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.notify.job_id
    }

    pub fn ntime(&self) -> Ntime {
        self.notify.ntime
    }

    pub fn clean_jobs(&self) -> bool {
        self.notify.clean_jobs
    }

    pub fn network_target(&self) -> Target {
        self.notify.nbits.to_target()
    }

    pub fn extranonce2(&self, counter: u64) -> Extranonce {
        Extranonce::from_counter(counter, self.extranonce2_size)
    }

    pub fn merkle_root(
        &self,
        hasher: &dyn DoubleHash,
        extranonce2: &Extranonce,
    ) -> stratum::Result<[u8; 32]> {
        let coinbase = stratum::coinbase_hash(
            hasher,
            &self.notify.coinb1,
            &self.extranonce1,
            extranonce2,
            &self.notify.coinb2,
        )?;

        Ok(stratum::merkle_root(
            hasher,
            coinbase,
            &self.notify.merkle_branches,
        ))
    }

    /// `version ‖ prevhash ‖ merkle_root ‖ ntime ‖ nbits`, everything but the
    /// nonce. The merkle root goes in byte-reversed; the other fields are
    /// copied in the order they arrived on the wire.
    pub fn header_prefix(
        &self,
        hasher: &dyn DoubleHash,
        extranonce2: &Extranonce,
    ) -> stratum::Result<[u8; HEADER_PREFIX_SIZE]> {
        let mut merkle_root = self.merkle_root(hasher, extranonce2)?;
        merkle_root.reverse();

        let mut prefix = [0u8; HEADER_PREFIX_SIZE];
        prefix[..4].copy_from_slice(&self.notify.version.to_wire_bytes());
        prefix[4..36].copy_from_slice(&self.notify.prevhash.to_wire_bytes());
        prefix[36..68].copy_from_slice(&merkle_root);
        prefix[68..72].copy_from_slice(&self.notify.ntime.to_wire_bytes());
        prefix[72..76].copy_from_slice(&self.notify.nbits.to_wire_bytes());

        Ok(prefix)
    }

    pub fn build_header(
        &self,
        hasher: &dyn DoubleHash,
        extranonce2: &Extranonce,
        nonce: Nonce,
    ) -> stratum::Result<[u8; HEADER_SIZE]> {
        let prefix = self.header_prefix(hasher, extranonce2)?;

        let mut header = [0u8; HEADER_SIZE];
        header[..HEADER_PREFIX_SIZE].copy_from_slice(&prefix);
        header[HEADER_PREFIX_SIZE..].copy_from_slice(&nonce.to_le_bytes());

        Ok(header)
    }
}
