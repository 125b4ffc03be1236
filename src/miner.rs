//! Multi-threaded nonce search
//!
//! Workers claim fixed-size nonce batches from a shared cursor, so every
//! nonce in the job is tried at most once. Each worker owns its own
//! [`Blake3Dcr`] context. The first worker to find a solution marks the
//! run as solved and the rest drain out after their current batch. The
//! external stop handle is only ever written by the caller.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::MinerConfig;
use crate::engine::{Blake3Dcr, Solution};
use crate::job::Job;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Result of a mining run
#[derive(Debug, Clone)]
pub struct MiningOutcome {
    /// `None` when the range was exhausted or the run was stopped
    pub solution: Option<Solution>,
    pub hashes: u64,
    pub elapsed: Duration,
}

impl MiningOutcome {
    pub fn hashrate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.hashes as f64 / secs
        } else {
            0.0
        }
    }
}

/// Shared state between the coordinator and its workers
struct Shared {
    job: Job,
    batch_size: u64,
    /// Offset of the next unclaimed nonce, relative to `job.nonce_start`
    cursor: AtomicU64,
    hashes: AtomicU64,
    found: Mutex<Option<Solution>>,
    /// Set by the worker that finds a solution; private to one run
    solved: AtomicBool,
    stop: Arc<AtomicBool>,
}

impl Shared {
    fn should_stop(&self) -> bool {
        self.solved.load(Ordering::Relaxed) || self.stop.load(Ordering::Relaxed)
    }
}

pub struct Miner {
    job: Job,
    config: MinerConfig,
    stop: Arc<AtomicBool>,
}

impl Miner {
    pub fn new(job: Job, config: MinerConfig) -> Self {
        Self {
            job,
            config,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that ends the search once set. Setting it before [`Miner::run`]
    /// makes the run return without hashing.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    /// Search the job's nonce range until a solution is found, the range is
    /// exhausted or the stop flag is raised.
    pub fn run(&self) -> MiningOutcome {
        let num_threads = self.config.thread_count();
        let shared = Arc::new(Shared {
            job: self.job,
            batch_size: self.config.batch_size.max(1) as u64,
            cursor: AtomicU64::new(0),
            hashes: AtomicU64::new(0),
            found: Mutex::new(None),
            solved: AtomicBool::new(false),
            stop: Arc::clone(&self.stop),
        });

        info!(
            threads = num_threads,
            batch_size = shared.batch_size,
            nonce_start = self.job.nonce_start,
            nonce_end = self.job.nonce_end,
            "starting miner"
        );

        let start = Instant::now();
        let handles: Vec<JoinHandle<()>> = (0..num_threads)
            .map(|thread_id| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || worker(thread_id, &shared))
            })
            .collect();

        let report_interval = Duration::from_secs(self.config.report_interval_secs.max(1));
        let mut last_report = Instant::now();
        while !handles.iter().all(|h| h.is_finished()) {
            std::thread::sleep(POLL_INTERVAL);

            if last_report.elapsed() >= report_interval {
                let hashes = shared.hashes.load(Ordering::Relaxed);
                let elapsed = start.elapsed().as_secs_f64();
                info!(
                    hashes,
                    hashrate = hashes as f64 / elapsed,
                    "mining progress"
                );
                last_report = Instant::now();
            }
        }

        for handle in handles {
            if handle.join().is_err() {
                warn!("mining thread panicked");
            }
        }

        let solution = shared
            .found
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        let outcome = MiningOutcome {
            solution,
            hashes: shared.hashes.load(Ordering::Relaxed),
            elapsed: start.elapsed(),
        };

        match &outcome.solution {
            Some(solution) => info!(nonce = solution.nonce, hashes = outcome.hashes, "solution found"),
            None => info!(hashes = outcome.hashes, "no solution in range"),
        }
        outcome
    }
}

fn worker(thread_id: usize, shared: &Shared) {
    let job = &shared.job;
    let range_len = job.range_len();
    let mut ctx = Blake3Dcr::new(&job.header);

    while !shared.should_stop() {
        let offset = shared.cursor.fetch_add(shared.batch_size, Ordering::Relaxed);
        if offset >= range_len {
            break;
        }

        let end = (offset + shared.batch_size).min(range_len);
        // offset < range_len, so both ends stay inside nonce_start..=nonce_end
        let first = job.nonce_start + offset as u32;
        let last = job.nonce_start + (end - 1) as u32;
        debug!(thread_id, first, last, "claimed nonce batch");

        match ctx.scan(first..=last, &job.target) {
            Some(solution) => {
                shared
                    .hashes
                    .fetch_add((solution.nonce - first) as u64 + 1, Ordering::Relaxed);
                let mut guard = shared
                    .found
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                if guard.is_none() {
                    *guard = Some(solution);
                }
                shared.solved.store(true, Ordering::SeqCst);
                return;
            }
            None => {
                shared.hashes.fetch_add(end - offset, Ordering::Relaxed);
            }
        }
    }
}
