//! Q-learning prefetcher simulator CLI.
//!
//! This binary wires the core library into a batch run:
//! 1. **Config:** load and validate the four-section JSON config.
//! 2. **Trace:** read and preprocess the load trace it names.
//! 3. **Replay:** drive the prefetch engine over the trace, writing the
//!    prediction and Q-value files.
//!
//! Any configuration or input error prints a diagnostic and exits non-zero.

use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use qfetch_core::common::addr::AddressMap;
use qfetch_core::config::Config;
use qfetch_core::engine::PrefetchEngine;
use qfetch_core::sim::output::OutputWriter;
use qfetch_core::sim::trace;
use qfetch_core::QfetchError;

#[derive(Parser, Debug)]
#[command(
    name = "qfetch",
    author,
    version,
    about = "Online Q-learning cache-line prefetcher simulator",
    long_about = "Replays a load trace and learns which cache-line offsets to prefetch.\n\nConfiguration is a JSON file with four sections: trace_config, system_config,\nq_fetcher_config, output_config. Every field has a default.\n\nExamples:\n  qfetch --config config.json\n  qfetch --config config.json --seed 42"
)]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, default_value = "./config.json")]
    config: String,

    /// Override the exploration RNG seed (takes precedence over the config).
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("\n[!] FATAL: {e}");
        process::exit(1);
    }
}

/// Loads the config, replays the trace, and writes the outputs.
fn run(cli: &Cli) -> Result<(), QfetchError> {
    let mut config = Config::from_file(&cli.config)?;
    config.validate()?;
    if let Some(seed) = cli.seed {
        config.q_fetcher.seed = Some(seed);
    }
    info!(path = %cli.config, "configuration loaded");

    println!("Configuration: {}", cli.config);
    println!(
        "  page {} B  line {} B  signature {} bits  tracker {} entries  epoch {}",
        config.system.page_size_bytes,
        config.system.cache_line_size_bytes,
        config.q_fetcher.signature_bits,
        config.q_fetcher.reward_table_entries,
        config.q_fetcher.entry_epoch,
    );
    println!(
        "  alpha {}  gamma {}  epsilon {}",
        config.q_fetcher.alpha, config.q_fetcher.gamma, config.q_fetcher.epsilon
    );
    println!();

    let map = AddressMap::new(
        config.system.page_size_bytes,
        config.system.cache_line_size_bytes,
    )?;
    let records = trace::load_trace(&config.trace.trace_dir, &config.trace.trace_file, &map)?;
    println!("[*] Loaded {} trace records", records.len());

    let mut engine = PrefetchEngine::new(&config.system, &config.q_fetcher)?;
    let mut sink = OutputWriter::new(
        &config.output.output_dir,
        &config.output.output_pred_file,
        &config.output.output_q_file,
    )?;

    engine.run(&records, &mut sink)?;
    let stats = *engine.stats();
    sink.close()?;

    println!();
    stats.print();
    Ok(())
}
