use {
    super::*,
    crate::job::{HEADER_PREFIX_SIZE, HEADER_SIZE},
};

/// Nonces hashed between cancellation checks.
pub(crate) const BATCH_SIZE: u32 = 4096;

/// Inclusive range of header nonces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NonceRange {
    pub(crate) start: u32,
    pub(crate) end: u32,
}

impl NonceRange {
    pub(crate) const FULL: Self = Self {
        start: 0,
        end: u32::MAX,
    };

    pub(crate) fn len(self) -> u64 {
        u64::from(self.end - self.start) + 1
    }

    /// Split into `n` contiguous, non-overlapping slices covering the whole
    /// range. The last slice takes the remainder.
    pub(crate) fn partition(self, n: usize) -> Vec<Self> {
        let n = (n.max(1) as u64).min(self.len());
        let slice = self.len() / n;

        (0..n)
            .map(|i| {
                let start = u64::from(self.start) + i * slice;
                let end = if i == n - 1 {
                    u64::from(self.end)
                } else {
                    start + slice - 1
                };

                Self {
                    start: start as u32,
                    end: end as u32,
                }
            })
            .collect()
    }
}

#[derive(Clone)]
pub(crate) struct NonceSearcher {
    hasher: Arc<dyn DoubleHash>,
    metrics: Arc<Metrics>,
}

impl NonceSearcher {
    pub(crate) fn new(hasher: Arc<dyn DoubleHash>, metrics: Arc<Metrics>) -> Self {
        Self { hasher, metrics }
    }

    /// Scan `range` in ascending order and return the first nonce whose header
    /// hash meets `target`, or `None` once the range is exhausted or `cancel`
    /// fires. `cancel` is checked before every batch.
    pub(crate) fn search(
        &self,
        prefix: &[u8; HEADER_PREFIX_SIZE],
        target: Target,
        range: NonceRange,
        cancel: &CancellationToken,
    ) -> Option<(Nonce, [u8; 32])> {
        let mut header = [0u8; HEADER_SIZE];
        header[..HEADER_PREFIX_SIZE].copy_from_slice(prefix);

        let mut start = range.start;

        loop {
            if cancel.is_cancelled() {
                return None;
            }

            let end = range.end.min(start.saturating_add(BATCH_SIZE - 1));

            for nonce in start..=end {
                header[HEADER_PREFIX_SIZE..].copy_from_slice(&nonce.to_le_bytes());

                let hash = self.hasher.hash(&header);

                if target.is_met_by(&hash) {
                    self.metrics.add_hashes(u64::from(nonce - start) + 1);
                    return Some((Nonce::from(nonce), hash));
                }
            }

            self.metrics.add_hashes(u64::from(end - start) + 1);

            if end == range.end {
                return None;
            }

            start = end + 1;
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FoundShare {
    pub(crate) generation: u64,
    pub(crate) job: Arc<Job>,
    pub(crate) extranonce2: Extranonce,
    pub(crate) nonce: Nonce,
    pub(crate) hash: [u8; 32],
}

/// One search thread. Worker `id` of `workers` rolls extranonce2 counters
/// `id, id + workers, ...` and scans its own nonce slice for each of them.
pub(crate) struct Worker {
    pub(crate) id: usize,
    pub(crate) workers: usize,
    pub(crate) generation: u64,
    pub(crate) job: Arc<Job>,
    pub(crate) target: Target,
    pub(crate) range: NonceRange,
    pub(crate) searcher: NonceSearcher,
    pub(crate) shares: mpsc::Sender<FoundShare>,
    pub(crate) cancel: CancellationToken,
}

impl Worker {
    pub(crate) fn run(self) {
        let mut counter = self.id as u64;

        while !self.cancel.is_cancelled() {
            let extranonce2 = self.job.extranonce2(counter);

            let prefix = match self.job.header_prefix(self.searcher.hasher.as_ref(), &extranonce2) {
                Ok(prefix) => prefix,
                Err(err) => {
                    warn!("Worker {} abandoning job {}: {err}", self.id, self.job.job_id());
                    return;
                }
            };

            let mut range = self.range;

            while let Some((nonce, hash)) =
                self.searcher
                    .search(&prefix, self.target, range, &self.cancel)
            {
                let found = FoundShare {
                    generation: self.generation,
                    job: self.job.clone(),
                    extranonce2: extranonce2.clone(),
                    nonce,
                    hash,
                };

                if self.shares.blocking_send(found).is_err() {
                    return;
                }

                let nonce = u32::from(nonce);

                if nonce == range.end {
                    break;
                }

                range.start = nonce + 1;
            }

            if self.cancel.is_cancelled() {
                break;
            }

            if self.job.extranonce2_size == 0 {
                warn!(
                    "Worker {} exhausted job {} with no extranonce2 to roll",
                    self.id,
                    self.job.job_id()
                );
                return;
            }

            debug!(
                "Worker {} exhausted extranonce2 {} for job {}",
                self.id,
                extranonce2,
                self.job.job_id()
            );

            counter += self.workers as u64;
        }

        debug!("Worker {} stopped", self.id);
    }
}
