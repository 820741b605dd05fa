//! Sequential batch generation of independent wallets.
//!
//! Every wallet gets its own freshly sampled mnemonic; nothing is shared
//! between iterations except the entropy source. The loop reports progress
//! once per finished wallet and checks for cancellation between wallets,
//! never in the middle of one.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bip39::Mnemonic;
use tracing::{debug, info, warn};

use crate::config::GeneratorConfig;
use crate::entropy::{EntropySource, OsEntropy};
use crate::error::{DerivationError, GenerationError};
use crate::keys::{self, MnemonicLength};
use crate::path::PathTemplate;
use crate::wallet::WalletRecord;

/// Lifecycle of a [`WalletGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

/// `done` of `total` wallets finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

/// Receives one synchronous notification per completed wallet.
pub trait ProgressSink {
    fn report(&mut self, progress: Progress);
}

impl<F: FnMut(Progress)> ProgressSink for F {
    fn report(&mut self, progress: Progress) {
        self(progress)
    }
}

impl ProgressSink for Sender<Progress> {
    fn report(&mut self, progress: Progress) {
        // A dropped receiver only means nobody is watching.
        let _ = self.send(progress);
    }
}

impl ProgressSink for () {
    fn report(&mut self, _progress: Progress) {}
}

/// Cooperative cancellation flag shared between the caller and a running batch.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Cancel from a timer thread once `timeout` elapses.
    pub fn cancel_after(&self, timeout: Duration) -> JoinHandle<()> {
        let token = self.clone();
        thread::spawn(move || {
            thread::sleep(timeout);
            token.cancel();
        })
    }
}

/// Parameters of one `generate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub count: usize,
    /// Falls back to the generator config when `None`.
    pub path_template: Option<String>,
    /// Display only.
    pub network_label: String,
    /// Falls back to the generator config when `None`.
    pub mnemonic_length: Option<MnemonicLength>,
}

impl BatchRequest {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            path_template: None,
            network_label: "Ethereum".to_string(),
            mnemonic_length: None,
        }
    }

    #[must_use]
    pub fn path_template(mut self, template: impl Into<String>) -> Self {
        self.path_template = Some(template.into());
        self
    }

    #[must_use]
    pub fn network_label(mut self, label: impl Into<String>) -> Self {
        self.network_label = label.into();
        self
    }

    #[must_use]
    pub const fn mnemonic_length(mut self, length: MnemonicLength) -> Self {
        self.mnemonic_length = Some(length);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Completed,
    /// Stopped early by the caller; `records` holds what finished.
    Cancelled,
}

/// Result of a batch that completed or was cancelled.
#[derive(Debug)]
pub struct BatchOutcome {
    pub status: BatchStatus,
    pub records: Vec<WalletRecord>,
    pub network_label: String,
}

/// A failed batch together with the wallets finished before the failure.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct BatchFailure {
    #[source]
    pub error: GenerationError,
    pub completed: Vec<WalletRecord>,
}

impl From<GenerationError> for BatchFailure {
    fn from(error: GenerationError) -> Self {
        Self {
            error,
            completed: Vec::new(),
        }
    }
}

/// BIP32 key derivation step used for every wallet.
type KeyDerivation = fn(&Mnemonic, &str) -> Result<[u8; 32], DerivationError>;

/// Single-flight batch generator.
pub struct WalletGenerator<E = OsEntropy> {
    config: GeneratorConfig,
    entropy: Mutex<E>,
    state: Mutex<GeneratorState>,
    derive_key: KeyDerivation,
}

impl<E> fmt::Debug for WalletGenerator<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletGenerator")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl WalletGenerator<OsEntropy> {
    pub fn new(config: GeneratorConfig) -> Self {
        Self::with_entropy(config, OsEntropy)
    }
}

impl<E: EntropySource> WalletGenerator<E> {
    pub fn with_entropy(config: GeneratorConfig, entropy: E) -> Self {
        Self {
            config,
            entropy: Mutex::new(entropy),
            state: Mutex::new(GeneratorState::Idle),
            derive_key: keys::derive_from_mnemonic,
        }
    }

    #[cfg(test)]
    fn with_key_derivation(mut self, derive_key: KeyDerivation) -> Self {
        self.derive_key = derive_key;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn state(&self) -> GeneratorState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Generate `request.count` wallets in ascending index order.
    pub fn generate<P>(
        &self,
        request: &BatchRequest,
        progress: &mut P,
        cancel: &CancelToken,
    ) -> Result<BatchOutcome, BatchFailure>
    where
        P: ProgressSink + ?Sized,
    {
        let template = self.validate(request)?;
        let length = request.mnemonic_length.unwrap_or(self.config.mnemonic_length);
        let run = RunGuard::begin(&self.state)?;

        let mut entropy = self.entropy.lock().unwrap_or_else(PoisonError::into_inner);
        let total = request.count;
        let mut records = Vec::with_capacity(total);

        info!(
            count = total,
            template = %template,
            network = %request.network_label,
            words = length.word_count(),
            "Starting wallet batch",
        );

        for index in 0..total {
            if cancel.is_cancelled() {
                warn!(done = records.len(), total, "Wallet batch cancelled");
                run.finish(GeneratorState::Cancelled);
                return Ok(BatchOutcome {
                    status: BatchStatus::Cancelled,
                    records,
                    network_label: request.network_label.clone(),
                });
            }

            match generate_wallet(&mut *entropy, self.derive_key, &template, index, length) {
                Ok(record) => {
                    debug!(index, address = %record.address, "Wallet generated");
                    records.push(record);
                }
                Err(error) => {
                    warn!(done = records.len(), total, error = %error, "Wallet batch failed");
                    run.finish(GeneratorState::Failed);
                    return Err(BatchFailure {
                        error,
                        completed: records,
                    });
                }
            }

            progress.report(Progress { done: index + 1, total });
        }

        info!(count = records.len(), "Wallet batch complete");
        run.finish(GeneratorState::Completed);
        Ok(BatchOutcome {
            status: BatchStatus::Completed,
            records,
            network_label: request.network_label.clone(),
        })
    }

    fn validate(&self, request: &BatchRequest) -> Result<PathTemplate, GenerationError> {
        let max = self.config.max_wallet_count;
        // The last index must also fit into one BIP32 child number.
        let path_limit = PathTemplate::max_index() as usize + 1;
        if request.count == 0 || request.count > max || request.count > path_limit {
            return Err(GenerationError::InvalidCount {
                count: request.count,
                max: max.min(path_limit),
            });
        }

        let template = request
            .path_template
            .as_deref()
            .unwrap_or(&self.config.derivation_path_template);
        PathTemplate::parse(template)
    }
}

/// Produce one complete wallet or nothing.
fn generate_wallet<E: EntropySource + ?Sized>(
    entropy: &mut E,
    derive_key: KeyDerivation,
    template: &PathTemplate,
    index: usize,
    length: MnemonicLength,
) -> Result<WalletRecord, GenerationError> {
    let mut buf = [0u8; 32];
    let bytes = &mut buf[..length.entropy_bytes()];
    entropy
        .fill_entropy(bytes)
        .map_err(|source| GenerationError::EntropySourceFailure { index, source })?;
    let mnemonic = keys::mnemonic_from_entropy(bytes)
        .map_err(|source| GenerationError::EntropySourceFailure { index, source })?;

    // index < 2^31 is checked before the batch starts
    let path = template.render(index as u32);
    let derived = derive_key(&mnemonic, &path).and_then(|private_key| {
        let address = keys::address_of(&private_key)?;
        Ok((address, keys::private_key_hex(&private_key)))
    });
    let (address, private_key) = derived.map_err(|source| GenerationError::DerivationFailure { index, source })?;

    Ok(WalletRecord {
        index,
        address,
        private_key,
        mnemonic: mnemonic.to_string(),
        derivation_path: path,
    })
}

/// Holds the `Running` state; a run that unwinds is marked `Failed`.
struct RunGuard<'a> {
    state: &'a Mutex<GeneratorState>,
    finished: bool,
}

impl<'a> RunGuard<'a> {
    fn begin(state: &'a Mutex<GeneratorState>) -> Result<Self, GenerationError> {
        let mut current = state.lock().unwrap_or_else(PoisonError::into_inner);
        if *current == GeneratorState::Running {
            return Err(GenerationError::AlreadyRunning);
        }
        *current = GeneratorState::Running;
        Ok(Self { state, finished: false })
    }

    fn finish(mut self, outcome: GeneratorState) {
        self.set(outcome);
        self.finished = true;
    }

    fn set(&self, outcome: GeneratorState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = outcome;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.set(GeneratorState::Failed);
        }
    }
}
