use std::fmt;

use serde::{Deserialize, Serialize};

use crate::keys;

/// Mask shown in place of a hidden private key.
pub const MASKED_KEY: &str = "**************";

/// One generated wallet. Field order is the CSV column order.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WalletRecord {
    pub index: usize,
    pub address: String,  // EIP-55 checksummed
    #[serde(rename = "privateKey")]
    pub private_key: String,  // 0x-prefixed hex
    pub mnemonic: String,  // space separated words
    #[serde(rename = "derivationPath")]
    pub derivation_path: String,
}

impl WalletRecord {
    /// The mnemonic as an ordered word sequence.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.mnemonic.split_whitespace()
    }

    /// Re-derive the address from `(mnemonic, derivation_path)` and compare.
    ///
    /// Returns `false` when the stored fields cannot be derived at all.
    pub fn verify(&self) -> bool {
        match keys::derive_wallet(&self.mnemonic, &self.derivation_path) {
            Ok((address, private_key)) => {
                address == self.address && private_key.eq_ignore_ascii_case(&self.private_key)
            }
            Err(_) => false,
        }
    }

    pub fn masked_private_key(&self) -> &'static str {
        MASKED_KEY
    }
}

// Secrets never reach logs through Debug.
impl fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRecord")
            .field("index", &self.index)
            .field("address", &self.address)
            .field("private_key", &"<redacted>")
            .field("mnemonic", &"<redacted>")
            .field("derivation_path", &self.derivation_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABANDON: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn record() -> WalletRecord {
        let path = "m/44'/60'/0'/0/0";
        let (address, private_key) = keys::derive_wallet(ABANDON, path).unwrap();
        WalletRecord {
            index: 0,
            address,
            private_key,
            mnemonic: ABANDON.to_string(),
            derivation_path: path.to_string(),
        }
    }

    #[test]
    fn test_verify() {
        let mut wallet = record();
        assert!(wallet.verify());
        assert_eq!(wallet.words().count(), 12);

        wallet.derivation_path = "m/44'/60'/0'/0/1".to_string();
        assert!(!wallet.verify());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let wallet = record();
        let debug = format!("{wallet:?}");
        assert!(debug.contains(&wallet.address));
        assert!(!debug.contains(&wallet.private_key));
        assert!(!debug.contains("abandon"));
    }

    #[test]
    fn test_serde_field_names() {
        let json = serde_json::to_value(record()).unwrap();
        assert!(json.get("privateKey").is_some());
        assert!(json.get("derivationPath").is_some());
    }
}
