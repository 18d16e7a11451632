//! Delete command.

use jsondb_core::Store;
use std::io::Write;
use tracing::info;

/// Deletes one record, or the whole collection when `key` is `None`.
pub fn run(
    store: &Store,
    collection: &str,
    key: Option<&str>,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    match key {
        Some(key) => {
            store.delete(collection, key)?;
            writeln!(out, "Deleted {collection}/{key}")?;
        }
        None => {
            info!("Deleting collection {}", collection);
            store.delete_collection(collection)?;
            writeln!(out, "Deleted collection {collection}")?;
        }
    }
    Ok(())
}
