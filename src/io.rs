//! Helpers for reading and rewriting the flat CSV stores

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use csv::Trim;
use log::debug;

use crate::{
    config::Config,
    errors::{Error, Result},
    types::{Customer, Installment, Product, Record},
};

/// Reads every record of a store from a CSV-formatted stream.
///
/// Columns are matched by header name, and surrounding whitespace is ignored:
/// ```csv
/// product_id, product_name,   price
///          1,       Phone,  499.99
///          2,      Laptop, 1200.00
/// ```
/// Each row is checked with [`Record::check`] before it is returned.
pub fn read_records<R, T>(reader: R) -> Result<Vec<T>>
where
    R: Read,
    T: Record,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();
    for row in csv_reader.deserialize() {
        let record: T = row?;
        record.check()?;
        records.push(record);
    }
    Ok(records)
}

/// Writes a whole store to CSV: the header row, then one row per record.
///
/// The header is written even when `records` is empty.
pub fn write_records<W, T>(writer: W, records: &[T]) -> Result<()>
where
    W: Write,
    T: Record,
{
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(T::HEADERS)?;
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Loads an entire store into memory.
pub fn load_records<T: Record>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path)?;
    let records = read_records(BufReader::new(file))?;
    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Replaces the contents of a store with `records`.
pub fn save_records<T: Record>(path: &Path, records: &[T]) -> Result<()> {
    let file = File::create(path)?;
    write_records(BufWriter::new(file), records)?;
    debug!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Creates a store holding only its header row, unless the file already exists.
pub fn ensure_store<T: Record>(path: &Path) -> Result<()> {
    if !path.exists() {
        save_records::<T>(path, &[])?;
        debug!("Created empty store {}", path.display());
    }
    Ok(())
}

/// Creates the data directory and any missing store.
pub fn initialize(config: &Config) -> Result<()> {
    fs::create_dir_all(config.data_dir())?;
    ensure_store::<Customer>(&config.customers_path())?;
    ensure_store::<Product>(&config.products_path())?;
    ensure_store::<Installment>(&config.installments_path())?;
    Ok(())
}

/// Returns one more than the largest identifier in `records`, or 1 if empty.
///
/// # Errors
/// [`Error::IdsExhausted`] once the largest identifier is `u32::MAX`
pub fn next_id<T: Record>(records: &[T]) -> Result<T::Id> {
    let max = records
        .iter()
        .map(|record| -> u32 { record.id().into() })
        .max()
        .unwrap_or(0);
    max.checked_add(1)
        .map(<T::Id as From<u32>>::from)
        .ok_or(Error::IdsExhausted(T::KIND))
}
