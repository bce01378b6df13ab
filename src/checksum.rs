//! SHA-256 content digests over byte streams.
//!
//! Sources are read in fixed-size blocks so large packages never have to
//! sit in memory at once.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::errors::Result;

const BUF_SIZE: usize = 64 * 1024;

/// Compute the SHA-256 of everything `reader` yields, as lowercase hex.
pub fn sha256_reader<R: Read>(reader: &mut R) -> Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Compute the SHA-256 of a file, as lowercase hex.
pub fn sha256_path(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    sha256_reader(&mut file)
}
