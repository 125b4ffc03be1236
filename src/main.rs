//! BLAKE3 Decred Miner CLI
//!
//! # Commands
//!
//! - `hash` - BLAKE3 digest of files or stdin (b3sum style)
//! - `calculate` - Hash a block header with a given nonce
//! - `check` - Compare a hash against a target
//! - `mine` - Search a job's nonce range (multi-threaded)
//! - `benchmark` - Run performance benchmark

use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use blake3dcr::engine::{self, Hasher};
use blake3dcr::job::{parse_hash, parse_header};
use blake3dcr::{Job, Miner, MinerConfig};

#[derive(Parser)]
#[command(name = "blake3dcr")]
#[command(version)]
#[command(about = "BLAKE3 proof-of-work miner for Decred block headers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Custom config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the BLAKE3 digest of files (stdin when none are given)
    Hash {
        /// Files to hash
        files: Vec<PathBuf>,

        /// Output length in bytes
        #[arg(short, long, default_value = "32")]
        length: usize,

        /// Starting offset in the output stream
        #[arg(long, default_value = "0")]
        seek: u64,

        /// Keyed mode with a 32-byte hex key
        #[arg(long, conflicts_with = "derive_key")]
        keyed: Option<String>,

        /// Key derivation mode with the given context string
        #[arg(long)]
        derive_key: Option<String>,
    },

    /// Hash a 180-byte header with a nonce at offset 140
    Calculate {
        /// Header as 360 hex characters
        #[arg(long)]
        header: String,

        /// Nonce to write into the header
        #[arg(long)]
        nonce: u32,
    },

    /// Check a hash against a target (exit status 1 when above)
    Check {
        /// 32-byte hash in hex (big-endian)
        #[arg(long)]
        hash: String,

        /// 32-byte target in hex (big-endian)
        #[arg(long)]
        target: String,
    },

    /// Mine a job file
    Mine {
        /// Job file (JSON)
        #[arg(short, long)]
        job: PathBuf,

        /// Number of threads to use (default: number of CPU cores)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Nonces claimed per worker batch
        #[arg(long)]
        batch_size: Option<u32>,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of header hashes to compute
        #[arg(short, long, default_value = "100000")]
        count: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Hash {
            files,
            length,
            seek,
            keyed,
            derive_key,
        } => cmd_hash(&files, length, seek, keyed.as_deref(), derive_key.as_deref()),
        Commands::Calculate { header, nonce } => cmd_calculate(&header, nonce),
        Commands::Check { hash, target } => match cmd_check(&hash, &target) {
            Ok(false) => std::process::exit(1),
            other => other.map(|_| ()),
        },
        Commands::Mine {
            job,
            threads,
            batch_size,
        } => cmd_mine(&job, threads, batch_size, cli.config.as_deref()),
        Commands::Benchmark { count } => cmd_benchmark(count),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so digests on stdout stay machine-readable
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn cmd_hash(
    files: &[PathBuf],
    length: usize,
    seek: u64,
    keyed: Option<&str>,
    derive_key: Option<&str>,
) -> anyhow::Result<()> {
    let template = match (keyed, derive_key) {
        (Some(key), _) => Hasher::new_keyed(&parse_hash("key", key)?),
        (None, Some(context)) => Hasher::new_derive_key(context),
        (None, None) => Hasher::new(),
    };

    let mut out = vec![0u8; length];
    if files.is_empty() {
        let digest = hash_reader(template.clone(), io::stdin().lock(), seek, &mut out)?;
        println!("{}  -", digest);
        return Ok(());
    }

    for path in files {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let digest = hash_reader(template.clone(), file, seek, &mut out)
            .with_context(|| format!("reading {}", path.display()))?;
        println!("{}  {}", digest, path.display());
    }

    Ok(())
}

fn hash_reader(
    mut hasher: Hasher,
    mut reader: impl Read,
    seek: u64,
    out: &mut [u8],
) -> io::Result<String> {
    let copied = io::copy(&mut reader, &mut hasher)?;
    debug!(bytes = copied, "input absorbed");
    hasher.finalize_seek(seek, out);
    Ok(hex::encode(out))
}

fn cmd_calculate(header: &str, nonce: u32) -> anyhow::Result<()> {
    let header = parse_header(header)?;
    let result = engine::calculate(&header, nonce);
    println!("{}", hex::encode(result));
    Ok(())
}

fn cmd_check(hash: &str, target: &str) -> anyhow::Result<bool> {
    let hash = parse_hash("hash", hash)?;
    let target = parse_hash("target", target)?;

    let accepted = engine::check_difficulty(&hash, &target);
    println!("{}", if accepted { "accepted" } else { "rejected" });
    Ok(accepted)
}

fn cmd_mine(
    job_path: &Path,
    threads: Option<usize>,
    batch_size: Option<u32>,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let mut config = MinerConfig::load_or_default(config_path)?;
    if threads.is_some() {
        config.threads = threads;
    }
    if let Some(batch_size) = batch_size {
        config.batch_size = batch_size;
    }
    config.validate()?;

    let job = Job::load(job_path)?;

    println!("\n=== BLAKE3 Decred Miner ===");
    println!("Job:     {}", job_path.display());
    println!("Target:  {}", hex::encode(job.target));
    println!("Nonces:  {}..={}", job.nonce_start, job.nonce_end);
    println!("Threads: {}", config.thread_count());
    println!("Batch:   {}", config.batch_size);
    println!("===========================\n");

    let miner = Miner::new(job, config);
    let outcome = miner.run();

    match outcome.solution {
        Some(solution) => {
            println!("Found solution!");
            println!("  Nonce:  {}", solution.nonce);
            println!("  Hash:   {}", hex::encode(solution.hash));
            println!(
                "  Hashes: {} ({:.0} H/s)",
                outcome.hashes,
                outcome.hashrate()
            );

            let mut header = job.header;
            header[engine::NONCE_OFFSET..engine::NONCE_OFFSET + 4]
                .copy_from_slice(&solution.nonce.to_le_bytes());
            println!("  Header: {}", hex::encode(header));
        }
        None => {
            println!(
                "Nonce range exhausted without a solution ({} hashes, {:.0} H/s)",
                outcome.hashes,
                outcome.hashrate()
            );
        }
    }

    Ok(())
}

fn cmd_benchmark(count: u32) -> anyhow::Result<()> {
    println!("Running benchmark with {} header hashes...", count);

    let header = [0u8; engine::HEADER_SIZE];
    let mut ctx = engine::Blake3Dcr::new(&header);

    let start = Instant::now();
    for nonce in 0..count {
        std::hint::black_box(ctx.hash_nonce(nonce));
    }
    let elapsed = start.elapsed();
    let hashrate = count as f64 / elapsed.as_secs_f64();

    let data = vec![0xabu8; 16 * 1024 * 1024];
    let bulk_start = Instant::now();
    std::hint::black_box(engine::hash(&data));
    let bulk_elapsed = bulk_start.elapsed();

    println!("\nResults:");
    println!("  Total hashes: {}", count);
    println!("  Time elapsed: {:.2}s", elapsed.as_secs_f64());
    println!("  Hashrate: {:.2} H/s", hashrate);
    println!(
        "  Bulk throughput: {:.1} MiB/s",
        16.0 / bulk_elapsed.as_secs_f64()
    );

    println!("\nAlgorithm parameters:");
    println!("  Header size: {} bytes", engine::HEADER_SIZE);
    println!("  Nonce offset: {}", engine::NONCE_OFFSET);
    println!("  Chunk size: {} bytes", engine::CHUNK_LEN);
    println!("  Rounds: {}", engine::ROUNDS);

    Ok(())
}
