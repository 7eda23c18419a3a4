//! Secret handling utilities.
//!
//! Re-exports secrecy types and reads bearer tokens from disk without
//! letting them reach a `Debug` impl.

pub use secrecy::{ExposeSecret, SecretString};

use crate::error::{Error, Result};
use std::path::Path;

/// Read a token file, trimming the trailing newline most tooling writes.
pub fn read_token_file(path: &Path) -> Result<SecretString> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("could not read token {}: {e}", path.display())))?;
    Ok(SecretString::from(raw.trim().to_string()))
}
