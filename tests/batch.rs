use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use evm_wallet_batch::{
    address_of, derive_private_key, export_csv, import_csv, read_csv, write_csv, BatchRequest, BatchStatus,
    CancelToken, EntropyError, EntropySource, GenerationError, GeneratorConfig, GeneratorState, Progress,
    WalletGenerator,
};

/// Deterministic source: wallet `i` draws entropy bytes all equal to `i + 1`.
struct StubEntropy(u8);

impl EntropySource for StubEntropy {
    fn fill_entropy(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        self.0 = self.0.wrapping_add(1);
        dest.fill(self.0);
        Ok(())
    }
}

#[test]
fn test_records_are_contiguous_and_rederivable() {
    let generator = WalletGenerator::new(GeneratorConfig::default());
    let outcome = generator
        .generate(&BatchRequest::new(25), &mut (), &CancelToken::new())
        .unwrap();

    assert_eq!(outcome.status, BatchStatus::Completed);
    assert_eq!(outcome.records.len(), 25);
    for (i, wallet) in outcome.records.iter().enumerate() {
        assert_eq!(wallet.index, i);
        assert_eq!(wallet.derivation_path, format!("m/44'/60'/0'/0/{i}"));
        assert_eq!(wallet.words().count(), 12);

        let key = derive_private_key(&wallet.mnemonic, &wallet.derivation_path).unwrap();
        assert_eq!(address_of(&key).unwrap(), wallet.address);
        assert_eq!(format!("0x{}", hex::encode(key)), wallet.private_key);
    }
}

#[test]
fn test_thousand_wallets_are_distinct() {
    let generator = WalletGenerator::new(GeneratorConfig::default());
    let first = generator
        .generate(&BatchRequest::new(500), &mut (), &CancelToken::new())
        .unwrap();
    let second = generator
        .generate(&BatchRequest::new(500), &mut (), &CancelToken::new())
        .unwrap();

    let all: Vec<_> = first.records.iter().chain(&second.records).collect();
    assert_eq!(all.len(), 1000);
    let mnemonics: HashSet<_> = all.iter().map(|w| w.mnemonic.as_str()).collect();
    let addresses: HashSet<_> = all.iter().map(|w| w.address.as_str()).collect();
    assert_eq!(mnemonics.len(), 1000);
    assert_eq!(addresses.len(), 1000);
}

#[test]
fn test_count_bounds_respect_config() {
    let config = GeneratorConfig {
        max_wallet_count: 3,
        ..Default::default()
    };
    let generator = WalletGenerator::with_entropy(config, StubEntropy(0));

    let outcome = generator
        .generate(&BatchRequest::new(3), &mut (), &CancelToken::new())
        .unwrap();
    assert_eq!(outcome.records.len(), 3);

    let failure = generator
        .generate(&BatchRequest::new(4), &mut (), &CancelToken::new())
        .unwrap_err();
    assert!(matches!(failure.error, GenerationError::InvalidCount { count: 4, max: 3 }));
    assert!(failure.completed.is_empty());
}

#[test]
fn test_network_label_does_not_change_addresses() {
    let on_eth = WalletGenerator::with_entropy(GeneratorConfig::default(), StubEntropy(0))
        .generate(&BatchRequest::new(2).network_label("Ethereum"), &mut (), &CancelToken::new())
        .unwrap();
    let on_polygon = WalletGenerator::with_entropy(GeneratorConfig::default(), StubEntropy(0))
        .generate(&BatchRequest::new(2).network_label("Polygon"), &mut (), &CancelToken::new())
        .unwrap();

    assert_eq!(on_eth.records, on_polygon.records);
    assert_eq!(on_polygon.network_label, "Polygon");
}

#[test]
fn test_custom_template_from_config() {
    let config = GeneratorConfig {
        derivation_path_template: "m/44'/60'/1'/0/{index}".to_string(),
        ..Default::default()
    };
    let generator = WalletGenerator::with_entropy(config, StubEntropy(0));
    let outcome = generator
        .generate(&BatchRequest::new(2), &mut (), &CancelToken::new())
        .unwrap();
    assert_eq!(outcome.records[1].derivation_path, "m/44'/60'/1'/0/1");
    assert!(outcome.records[1].verify());
}

#[test]
fn test_cancel_from_another_thread() {
    let generator = Arc::new(WalletGenerator::with_entropy(GeneratorConfig::default(), StubEntropy(0)));
    let cancel = CancelToken::new();
    let (progress_tx, progress_rx) = std::sync::mpsc::channel::<Progress>();
    let (ack_tx, ack_rx) = std::sync::mpsc::channel::<()>();

    let worker = {
        let generator = Arc::clone(&generator);
        let cancel = cancel.clone();
        thread::spawn(move || {
            // Block after each wallet until the main thread acknowledges it
            let mut sink = |p: Progress| {
                progress_tx.send(p).unwrap();
                ack_rx.recv().ok();
            };
            generator.generate(&BatchRequest::new(50), &mut sink, &cancel)
        })
    };

    let first = progress_rx.recv().unwrap();
    assert_eq!(first, Progress { done: 1, total: 50 });
    cancel.cancel();
    ack_tx.send(()).unwrap();

    let outcome = worker.join().unwrap().unwrap();
    assert_eq!(outcome.status, BatchStatus::Cancelled);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].index, 0);
    assert_eq!(generator.state(), GeneratorState::Cancelled);
}

#[test]
fn test_timeout_cancels_batch() {
    let generator = WalletGenerator::new(GeneratorConfig::default());
    let cancel = CancelToken::new();
    cancel.cancel_after(Duration::from_millis(0)).join().unwrap();

    let outcome = generator
        .generate(&BatchRequest::new(10), &mut (), &cancel)
        .unwrap();
    assert_eq!(outcome.status, BatchStatus::Cancelled);
    assert!(outcome.records.is_empty());
}

#[test]
fn test_csv_export_matches_memory() {
    let generator = WalletGenerator::with_entropy(GeneratorConfig::default(), StubEntropy(0));
    let outcome = generator
        .generate(&BatchRequest::new(4), &mut (), &CancelToken::new())
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exports/wallets.csv");
    export_csv(&outcome.records, &path).unwrap();

    let raw = std::fs::read(&path).unwrap();
    assert!(raw.starts_with(b"\xEF\xBB\xBF"));

    let imported = import_csv(&path).unwrap();
    assert_eq!(imported, outcome.records);
    assert!(imported.iter().all(|w| w.verify()));
}

#[test]
fn test_csv_mnemonic_with_locale_comma() {
    let generator = WalletGenerator::with_entropy(GeneratorConfig::default(), StubEntropy(0));
    let mut records = generator
        .generate(&BatchRequest::new(1), &mut (), &CancelToken::new())
        .unwrap()
        .records;
    // Some locales join words with a comma and a non-breaking space
    records[0].mnemonic = records[0].mnemonic.replacen(' ', ",\u{a0}", 1);

    let mut out = Vec::new();
    write_csv(&records, &mut out).unwrap();
    assert_eq!(read_csv(out.as_slice()).unwrap(), records);
}
