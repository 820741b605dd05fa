//! Batch generation of independent BIP39/BIP44 EVM wallets.

pub mod cli;
pub mod config;
pub mod entropy;
pub mod error;
pub mod export;
pub mod generator;
pub mod keys;
pub mod path;
pub mod wallet;

pub use cli::{Args, Command, GenerateArgs};
pub use config::{GeneratorConfig, NetworkPreset, MAX_WALLET_COUNT};
pub use entropy::{EntropySource, OsEntropy};
pub use error::{ConfigError, DerivationError, EntropyError, ExportError, GenerationError};
pub use export::{export, export_csv, export_json, import_csv, read_csv, write_csv, write_json, ExportFormat};
pub use generator::{
    BatchFailure, BatchOutcome, BatchRequest, BatchStatus, CancelToken, GeneratorState, Progress, ProgressSink,
    WalletGenerator,
};
pub use keys::{address_of, derive_private_key, derive_wallet, mnemonic_from_entropy, MnemonicLength};
pub use path::{PathTemplate, DEFAULT_PATH_TEMPLATE};
pub use wallet::WalletRecord;
