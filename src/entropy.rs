//! Randomness for fresh mnemonics.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::EntropyError;

/// Source of mnemonic entropy.
///
/// Production code uses [`OsEntropy`]; tests plug in deterministic sources.
pub trait EntropySource {
    /// Fill `dest` entirely with fresh entropy.
    fn fill_entropy(&mut self, dest: &mut [u8]) -> Result<(), EntropyError>;
}

/// Operating system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill_entropy(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| EntropyError::Unavailable(e.to_string()))
    }
}

impl<E: EntropySource + ?Sized> EntropySource for Box<E> {
    fn fill_entropy(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        (**self).fill_entropy(dest)
    }
}
