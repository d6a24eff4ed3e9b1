use rand::rngs::OsRng;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

const EPOCH: u64 = 1_288_834_974_657;
const NODE_ID_BITS: u64 = 10;
const SEQUENCE_BITS: u64 = 12;

/// Generates strictly increasing 64 bit ids laid out as
/// `timestamp | node id | sequence`.
///
/// Ids handed out by one process never repeat and never go backwards, even
/// when the clock does, so ordering documents by id orders them by insertion.
pub struct SnowflakeIdGenerator {
    node_id: u64,
    last_id: AtomicU64,
}

impl SnowflakeIdGenerator {
    pub fn new() -> Self {
        let node_id = OsRng.gen_range(0..(1u64 << NODE_ID_BITS));
        log::debug!("Initialized id generator with node id {}", node_id);
        SnowflakeIdGenerator {
            node_id,
            last_id: AtomicU64::new(0),
        }
    }

    pub fn get_id(&self) -> u64 {
        let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let base = (now.saturating_sub(EPOCH) << (NODE_ID_BITS + SEQUENCE_BITS))
            | (self.node_id << SEQUENCE_BITS);

        let mut last = self.last_id.load(Ordering::Acquire);
        loop {
            let next = base.max(last + 1);
            match self
                .last_id
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return next,
                Err(current) => last = current,
            }
        }
    }
}

impl Default for SnowflakeIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
