//! Write, insert and update commands.

use jsondb_core::Store;
use serde_json::Value;
use std::io::Write;
use tracing::info;

/// Writes `value` under `key`, replacing any existing record.
pub fn write(
    store: &Store,
    collection: &str,
    key: &str,
    value: &Value,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let key = store.write(collection, key, value)?;
    writeln!(out, "{key}")?;
    Ok(())
}

/// Writes `value` under a generated key and prints the key.
pub fn insert(
    store: &Store,
    collection: &str,
    value: &Value,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let key = store.insert(collection, value)?;
    info!("Inserted {}/{}", collection, key);
    writeln!(out, "{key}")?;
    Ok(())
}

/// Replaces an existing record.
pub fn update(
    store: &Store,
    collection: &str,
    key: &str,
    value: &Value,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let key = store.update(collection, key, value)?;
    writeln!(out, "{key}")?;
    Ok(())
}
