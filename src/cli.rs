use clap::{Parser, Subcommand};

use crate::export::ExportFormat;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// JSON config file (max count, path template, networks)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate wallets, each from its own fresh mnemonic
    Generate(GenerateArgs),

    /// Re-derive every address in an exported CSV file
    Verify {
        /// CSV file written by `generate`
        #[arg(short, long)]
        input: String,
    },

    /// List configured network labels
    Networks,
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Number of wallets to generate
    #[arg(short = 'n', long)]
    pub count: usize,

    /// Network label (display only, does not change addresses)
    #[arg(long, default_value = "Ethereum")]
    pub network: String,

    /// Derivation path template with a trailing {index} segment
    #[arg(short, long)]
    pub path: Option<String>,

    /// Mnemonic length in words (12, 15, 18, 21 or 24)
    #[arg(short, long)]
    pub words: Option<usize>,

    /// Output file path
    #[arg(short, long, default_value = "wallets.csv")]
    pub output: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,

    /// Stop generating after this many seconds and keep what finished
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Print private keys and mnemonics instead of masking them
    #[arg(long)]
    pub show_keys: bool,

    /// Skip writing the output file
    #[arg(long)]
    pub no_export: bool,
}
