//! Error types for batch generation, key derivation and export.
//!
//! None of these carry mnemonic or private key material in their messages,
//! so they are safe to log or show to a user.

/// Errors raised by [`WalletGenerator::generate`](crate::WalletGenerator::generate).
///
/// Cancellation is not an error; it is reported through
/// [`BatchStatus::Cancelled`](crate::BatchStatus::Cancelled).
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Requested count is outside `[1, max]`.
    #[error("invalid wallet count {count}: must be between 1 and {max}")]
    InvalidCount { count: usize, max: usize },

    /// Derivation path template failed to parse.
    #[error("invalid derivation path template '{template}': {reason}")]
    InvalidDerivationPath { template: String, reason: String },

    /// Another batch is running on the same generator.
    #[error("a wallet batch is already running")]
    AlreadyRunning,

    /// The entropy source could not produce a mnemonic for wallet `index`.
    #[error("entropy source failed at wallet {index}: {source}")]
    EntropySourceFailure {
        index: usize,
        #[source]
        source: EntropyError,
    },

    /// Key or address derivation failed for wallet `index`.
    #[error("key derivation failed at wallet {index}: {source}")]
    DerivationFailure {
        index: usize,
        #[source]
        source: DerivationError,
    },
}

impl GenerationError {
    pub(crate) fn invalid_path(template: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDerivationPath {
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failure of the secure random source.
#[derive(Debug, thiserror::Error)]
pub enum EntropyError {
    #[error("secure random source unavailable: {0}")]
    Unavailable(String),

    #[error("entropy rejected by mnemonic encoder: {0}")]
    Mnemonic(String),
}

/// Failure of a BIP39/BIP32/secp256k1 primitive.
#[derive(Debug, thiserror::Error)]
pub enum DerivationError {
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("bip32 derivation failed: {0}")]
    Bip32(String),

    #[error("invalid secp256k1 key: {0}")]
    InvalidKey(#[from] secp256k1::Error),
}

/// Errors raised while writing or reading exported wallets.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no wallet records to export")]
    Empty,

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while loading or validating a [`GeneratorConfig`](crate::GeneratorConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(String),
}
