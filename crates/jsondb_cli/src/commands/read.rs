//! Read, read-all and list commands.

use jsondb_core::Store;
use serde_json::Value;
use std::io::Write;

/// Prints one record as stored.
pub fn read(
    store: &Store,
    collection: &str,
    key: &str,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = store.read(collection, key)?;
    out.write_all(content.as_bytes())?;
    Ok(())
}

/// Prints every record of a collection.
///
/// `text` prints the stored documents one after another; `json` prints a
/// single JSON array of them.
pub fn read_all(
    store: &Store,
    collection: &str,
    format: &str,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        "json" => {
            let records: Vec<Value> = store.read_all_as(collection)?;
            serde_json::to_writer_pretty(&mut *out, &records)?;
            writeln!(out)?;
        }
        "text" => {
            for content in store.read_all(collection)? {
                out.write_all(content.as_bytes())?;
            }
        }
        other => return Err(format!("Unknown format: {other} (expected text or json)").into()),
    }
    Ok(())
}

/// Prints the record keys of a collection, one per line.
pub fn list(
    store: &Store,
    collection: &str,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    for key in store.keys(collection)? {
        writeln!(out, "{key}")?;
    }
    Ok(())
}
