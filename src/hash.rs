//! BLAKE3 digests of packed artifacts

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use blake3::Hasher;

/// Hash prefix for BLAKE3 digests
pub const HASH_PREFIX: &str = "blake3:";

/// Calculate the BLAKE3 digest of a file
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Hasher::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{}{}", HASH_PREFIX, hasher.finalize().to_hex()))
}

/// Shortened digest for log lines
pub fn short(digest: &str) -> &str {
    let hex = digest.strip_prefix(HASH_PREFIX).unwrap_or(digest);
    hex.get(..12).unwrap_or(hex)
}
