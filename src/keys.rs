//! BIP39 mnemonics, BIP32 derivation and EVM addresses.

use alloy_primitives::Address;
use bip39::Mnemonic;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use tiny_hderive::bip32::ExtendedPrivKey;

use crate::error::{DerivationError, EntropyError};

// One signing context per thread, reused for every wallet
thread_local! {
    static SECP: Secp256k1<secp256k1::All> = Secp256k1::new();
}

/// Supported BIP39 phrase lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum MnemonicLength {
    #[default]
    Words12,
    Words15,
    Words18,
    Words21,
    Words24,
}

impl MnemonicLength {
    pub const fn word_count(self) -> usize {
        match self {
            Self::Words12 => 12,
            Self::Words15 => 15,
            Self::Words18 => 18,
            Self::Words21 => 21,
            Self::Words24 => 24,
        }
    }

    /// Entropy size in bytes (128 to 256 bits).
    pub const fn entropy_bytes(self) -> usize {
        self.word_count() * 4 / 3
    }
}

impl TryFrom<usize> for MnemonicLength {
    type Error = String;

    fn try_from(words: usize) -> Result<Self, Self::Error> {
        match words {
            12 => Ok(Self::Words12),
            15 => Ok(Self::Words15),
            18 => Ok(Self::Words18),
            21 => Ok(Self::Words21),
            24 => Ok(Self::Words24),
            other => Err(format!("unsupported mnemonic length {other}, expected 12/15/18/21/24")),
        }
    }
}

impl From<MnemonicLength> for usize {
    fn from(length: MnemonicLength) -> Self {
        length.word_count()
    }
}

/// Encode raw entropy (16 to 32 bytes, a multiple of 4) as an English phrase.
pub fn mnemonic_from_entropy(entropy: &[u8]) -> Result<Mnemonic, EntropyError> {
    Mnemonic::from_entropy(entropy).map_err(|e| EntropyError::Mnemonic(e.to_string()))
}

/// Derive the private key for `path` from an already parsed mnemonic.
pub fn derive_from_mnemonic(mnemonic: &Mnemonic, path: &str) -> Result<[u8; 32], DerivationError> {
    let seed = mnemonic.to_seed("");
    let derived = ExtendedPrivKey::derive(&seed, path)
        .map_err(|e| DerivationError::Bip32(format!("{e:?}")))?;
    Ok(derived.secret())
}

/// Derive the private key for `path` from a space separated phrase.
pub fn derive_private_key(phrase: &str, path: &str) -> Result<[u8; 32], DerivationError> {
    let mnemonic = Mnemonic::parse(phrase).map_err(|e| DerivationError::InvalidMnemonic(e.to_string()))?;
    derive_from_mnemonic(&mnemonic, path)
}

/// EIP-55 checksummed address of a secp256k1 private key.
#[inline(always)]
pub fn address_of(private_key: &[u8; 32]) -> Result<String, DerivationError> {
    SECP.with(|secp| {
        let secret_key = SecretKey::from_slice(private_key)?;
        let public_key = PublicKey::from_secret_key(secp, &secret_key);

        // Address is the low 20 bytes of keccak(x || y), without the 0x04 tag byte
        let pubkey_uncompressed = public_key.serialize_uncompressed();
        let keccak_hash = Keccak256::digest(&pubkey_uncompressed[1..]);

        Ok(Address::from_slice(&keccak_hash[12..]).to_checksum(None))
    })
}

/// Mixed-case checksum encoding of a raw 20-byte address.
pub fn to_checksum_address(address: &[u8; 20]) -> String {
    Address::new(*address).to_checksum(None)
}

/// `0x`-prefixed lowercase hex of a private key.
pub fn private_key_hex(private_key: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(private_key))
}

/// Re-derive `(address, private key hex)` from a phrase and a concrete path.
pub fn derive_wallet(phrase: &str, path: &str) -> Result<(String, String), DerivationError> {
    let private_key = derive_private_key(phrase, path)?;
    let address = address_of(&private_key)?;
    Ok((address, private_key_hex(&private_key)))
}
