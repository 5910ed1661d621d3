use {super::*, parking_lot::Mutex};

struct Sample {
    hashes: u64,
    at: Instant,
}

/// Counters shared between the session and its search workers.
pub(crate) struct Metrics {
    hashes: AtomicU64,
    accepted: AtomicU64,
    rejected: AtomicU64,
    started: Instant,
    last_sample: Mutex<Sample>,
}

impl Metrics {
    pub(crate) fn new() -> Self {
        let now = Instant::now();

        Self {
            hashes: AtomicU64::new(0),
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            started: now,
            last_sample: Mutex::new(Sample { hashes: 0, at: now }),
        }
    }

    pub(crate) fn add_hashes(&self, hashes: u64) {
        self.hashes.fetch_add(hashes, Ordering::Relaxed);
    }

    pub(crate) fn add_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn total_hashes(&self) -> u64 {
        self.hashes.load(Ordering::Relaxed)
    }

    pub(crate) fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub(crate) fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub(crate) fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// Hash rate since the previous call.
    pub(crate) fn hash_rate(&self) -> HashRate {
        let mut sample = self.last_sample.lock();
        let now = Instant::now();
        let total = self.total_hashes();

        let rate = HashRate::from_hashes(
            total.saturating_sub(sample.hashes),
            now.duration_since(sample.at),
        );

        *sample = Sample {
            hashes: total,
            at: now,
        };

        rate
    }

    pub(crate) fn status_line(&self) -> String {
        format!(
            "hashrate={}  accepted={}  rejected={}  uptime={}s",
            self.hash_rate(),
            self.accepted(),
            self.rejected(),
            self.uptime().as_secs()
        )
    }
}
