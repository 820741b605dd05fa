use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use evm_wallet_batch::{
    export, import_csv, Args, BatchRequest, BatchStatus, CancelToken, Command, GenerateArgs, GeneratorConfig,
    MnemonicLength, Progress, WalletGenerator, WalletRecord,
};

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("evm_wallet_batch=debug")
    } else {
        EnvFilter::new("evm_wallet_batch=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => GeneratorConfig::load(path).with_context(|| format!("failed to load config '{path}'"))?,
        None => GeneratorConfig::default(),
    };

    match args.command {
        Command::Generate(generate_args) => generate(config, generate_args),
        Command::Verify { input } => verify(&input),
        Command::Networks => {
            list_networks(&config);
            Ok(())
        }
    }
}

fn generate(config: GeneratorConfig, args: GenerateArgs) -> Result<()> {
    let mnemonic_length = args
        .words
        .map(MnemonicLength::try_from)
        .transpose()
        .map_err(anyhow::Error::msg)?;

    if config.network(&args.network).is_none() {
        tracing::info!(network = %args.network, "Using custom network label");
    }

    let mut request = BatchRequest::new(args.count).network_label(&args.network);
    request.path_template = args.path.clone();
    request.mnemonic_length = mnemonic_length;

    println!("\n⚡ EVM Wallet Batch Generator");
    println!("Network: {} (label only, addresses are chain independent)", args.network);
    println!(
        "Path template: {}",
        request.path_template.as_deref().unwrap_or(&config.derivation_path_template)
    );
    println!("Generating {} wallets...", args.count);

    let generator = Arc::new(WalletGenerator::new(config));
    let cancel = CancelToken::new();
    // The timer thread is detached; process exit reaps it.
    let _timer = args
        .timeout_secs
        .map(|secs| cancel.cancel_after(Duration::from_secs(secs)));

    // Setup progress bar
    let pb = ProgressBar::new(args.count as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) | {per_sec}")?
            .progress_chars("#>-"),
    );

    let start_time = Instant::now();
    let (tx, rx) = mpsc::channel::<Progress>();
    let worker = {
        let generator = Arc::clone(&generator);
        let cancel = cancel.clone();
        thread::spawn(move || {
            let mut tx = tx;
            generator.generate(&request, &mut tx, &cancel)
        })
    };

    // Channel closes when the worker returns
    for progress in rx {
        pb.set_position(progress.done as u64);
    }

    let result = worker.join().map_err(|_| anyhow!("generator thread panicked"))?;
    let generation_time = start_time.elapsed();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(failure) => {
            pb.abandon_with_message("Generation failed");
            if !failure.completed.is_empty() {
                println!("\n{} wallets finished before the failure:", failure.completed.len());
                print_table(&failure.completed, args.show_keys);
            }
            return Err(failure.error).context("wallet generation failed");
        }
    };

    match outcome.status {
        BatchStatus::Completed => pb.finish_with_message("Generation complete!"),
        BatchStatus::Cancelled => pb.abandon_with_message("Generation cancelled"),
    }

    print_table(&outcome.records, args.show_keys);

    println!("\n✅ Report:");
    println!("────────────────────");
    println!("📊 Wallets generated: {} of {}", outcome.records.len(), args.count);
    println!("⏱️  Generation time: {:.2}s", generation_time.as_secs_f64());
    if outcome.status == BatchStatus::Cancelled {
        println!("⚠️  Cancelled before completion, partial result kept");
    }

    if args.no_export || outcome.records.is_empty() {
        return Ok(());
    }

    export(&outcome.records, &args.output, args.format)
        .with_context(|| format!("failed to export wallets to '{}'", args.output))?;
    println!("📁 Output: {}", args.output);

    Ok(())
}

fn print_table(records: &[WalletRecord], show_keys: bool) {
    println!("\n{:>6}  {:<42}  {:<66}  Path", "#", "Address", "Private key");
    for wallet in records {
        let key = if show_keys {
            wallet.private_key.as_str()
        } else {
            wallet.masked_private_key()
        };
        println!("{:>6}  {:<42}  {:<66}  {}", wallet.index, wallet.address, key, wallet.derivation_path);
        if show_keys {
            println!("        {}", wallet.mnemonic);
        }
    }
}

fn verify(input: &str) -> Result<()> {
    let records = import_csv(input).with_context(|| format!("failed to read '{input}'"))?;
    let failed: Vec<usize> = records
        .iter()
        .filter(|wallet| !wallet.verify())
        .map(|wallet| wallet.index)
        .collect();

    if !failed.is_empty() {
        bail!("{} of {} wallets failed verification: {:?}", failed.len(), records.len(), failed);
    }

    println!("✅ All {} wallets re-derive to their recorded addresses", records.len());
    Ok(())
}

fn list_networks(config: &GeneratorConfig) {
    for network in &config.networks {
        let chain = network
            .chain_id
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        let rpc = network.rpc_url.as_deref().unwrap_or("-");
        println!("{:<24} chain {:<10} {}", network.name, chain, rpc);
    }
}
