//! CRC-32 content hashing for downloaded pages.
//!
//! Page records carry the hash of the file that was written for them, so a
//! later run can tell whether the copy on disk is still the same bytes and
//! skip the download. Change detection only, not tamper resistance.

use std::io::{self, Read};

/// Hash an in-memory body. Rendered as unpadded lowercase hex.
pub fn hash_bytes(bytes: &[u8]) -> String {
    to_hex(crc32fast::hash(bytes))
}

/// Hash a reader in fixed-size chunks, for files already on disk.
pub fn hash_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = crc32fast::Hasher::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(to_hex(hasher.finalize()))
}

fn to_hex(sum: u32) -> String {
    format!("{:x}", sum)
}
