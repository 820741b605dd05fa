//! CSV and JSON export of generated wallets.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::info;

use crate::error::ExportError;
use crate::wallet::WalletRecord;

/// UTF-8 byte-order mark written ahead of CSV output for spreadsheet tools.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const CSV_HEADER: [&str; 5] = ["index", "address", "privateKey", "mnemonic", "derivationPath"];

/// Output format selectable from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

pub fn write_csv<W: Write>(records: &[WalletRecord], mut writer: W) -> Result<(), ExportError> {
    writer.write_all(UTF8_BOM)?;
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Parse CSV produced by [`write_csv`]. A leading BOM is skipped.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<WalletRecord>, ExportError> {
    let mut reader = BufReader::new(reader);
    if reader.fill_buf()?.starts_with(UTF8_BOM) {
        reader.consume(UTF8_BOM.len());
    }

    let mut rdr = csv::ReaderBuilder::new().from_reader(reader);
    let records = rdr.deserialize().collect::<Result<Vec<WalletRecord>, _>>()?;
    Ok(records)
}

/// JSON array with one record per line.
pub fn write_json<W: Write>(records: &[WalletRecord], mut writer: W) -> Result<(), ExportError> {
    writer.write_all(b"[")?;
    for (i, wallet) in records.iter().enumerate() {
        if i > 0 {
            writer.write_all(b",")?;
        }
        writer.write_all(b"\n  ")?;
        serde_json::to_writer(&mut writer, wallet)?;
    }
    writer.write_all(b"\n]\n")?;
    writer.flush()?;
    Ok(())
}

/// Write `records` to `path`, creating parent directories as needed.
///
/// Refuses to write an empty file.
pub fn export(records: &[WalletRecord], path: impl AsRef<Path>, format: ExportFormat) -> Result<(), ExportError> {
    let path = path.as_ref();
    if records.is_empty() {
        return Err(ExportError::Empty);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let writer = BufWriter::new(File::create(path)?);
    match format {
        ExportFormat::Csv => write_csv(records, writer)?,
        ExportFormat::Json => write_json(records, writer)?,
    }

    info!(count = records.len(), path = %path.display(), ?format, "Exported wallets");
    Ok(())
}

pub fn export_csv(records: &[WalletRecord], path: impl AsRef<Path>) -> Result<(), ExportError> {
    export(records, path, ExportFormat::Csv)
}

pub fn export_json(records: &[WalletRecord], path: impl AsRef<Path>) -> Result<(), ExportError> {
    export(records, path, ExportFormat::Json)
}

pub fn import_csv(path: impl AsRef<Path>) -> Result<Vec<WalletRecord>, ExportError> {
    read_csv(File::open(path)?)
}
