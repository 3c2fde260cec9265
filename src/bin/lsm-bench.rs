//! lsmkv benchmark driver
//!
//! Bulk inserts followed by random point reads against a fresh data directory.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use lsmkv::{Config, Engine};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::{fmt, EnvFilter};

/// lsmkv benchmark
#[derive(Parser, Debug)]
#[command(name = "lsm-bench")]
#[command(about = "Insert throughput and read latency for the lsmkv engine")]
#[command(version)]
struct Args {
    /// Data directory (wiped before the run)
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Number of keys to insert
    #[arg(short = 'n', long, default_value = "2000")]
    inserts: usize,

    /// Number of random reads
    #[arg(short, long, default_value = "100")]
    reads: usize,

    /// MemTable byte limit before flush
    #[arg(short, long, default_value = "65536")]
    memtable_bytes: usize,

    /// Seed for the read workload
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Run a major compaction after the inserts
    #[arg(short, long)]
    compact: bool,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,lsmkv=info"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        tracing::error!("Benchmark failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> lsmkv::Result<()> {
    if args.data_dir.exists() {
        std::fs::remove_dir_all(&args.data_dir)?;
    }

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .memtable_size_limit(args.memtable_bytes)
        .build()?;
    let engine = Engine::open(config)?;

    println!("--- Starting Benchmark ({} inserts) ---", args.inserts);

    let start = Instant::now();
    for i in 0..args.inserts {
        let key = format!("key_{}", i);
        let value = format!("value_{}", i);
        engine.put(key.as_bytes(), value.as_bytes())?;
    }
    let elapsed = start.elapsed().as_secs_f64();

    println!(
        "Bulk Insert Throughput: {:.2} Ops/sec",
        args.inserts as f64 / elapsed
    );
    println!("Segments after inserts: {}", engine.segment_count());

    if args.compact {
        let start = Instant::now();
        engine.compact()?;
        println!(
            "Compaction: {:.2} ms ({} segment left)",
            start.elapsed().as_secs_f64() * 1000.0,
            engine.segment_count()
        );
    }

    println!("\n--- Starting Random Read Latency Test ({} reads) ---", args.reads);

    // Keys drawn from twice the inserted range: roughly half hit, half miss
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut hits = 0usize;

    let start = Instant::now();
    for _ in 0..args.reads {
        let key = format!("key_{}", rng.gen_range(0..=args.inserts * 2));
        if engine.get(key.as_bytes())?.is_some() {
            hits += 1;
        }
    }
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let reads = args.reads.max(1) as f64;
    println!("Average Read Latency: {:.4} ms", elapsed_ms / reads);
    println!("Read Hit Rate: {:.1}%", hits as f64 * 100.0 / reads);

    engine.close()
}
