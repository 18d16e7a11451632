//! CLI command implementations.

pub mod delete;
pub mod read;
pub mod write;

use serde_json::Value;
use std::io::Read;

/// Parses a JSON value given on the command line, or from `stdin` when the
/// argument is `-`.
pub fn parse_value(arg: &str, mut stdin: impl Read) -> Result<Value, Box<dyn std::error::Error>> {
    let text = if arg == "-" {
        let mut buffer = String::new();
        stdin.read_to_string(&mut buffer)?;
        buffer
    } else {
        arg.to_string()
    };

    serde_json::from_str(&text).map_err(|e| format!("Invalid JSON value: {e}").into())
}
