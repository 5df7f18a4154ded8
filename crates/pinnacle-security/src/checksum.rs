use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha1::{Digest, Sha1};

pub fn sha1_hex(payload: &[u8]) -> String {
    hex::encode(Sha1::digest(payload))
}

pub fn sha1_hex_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Sha1::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

fn sha1_hex_file(path: &Path) -> io::Result<String> {
    sha1_hex_reader(File::open(path)?)
}

/// Returns whether the file at `path` hashes to `expected`.
///
/// A file that cannot be opened or read never matches; callers treat that as a
/// cache miss rather than a failure.
pub fn file_hash_matches(expected: &str, path: &Path) -> bool {
    match sha1_hex_file(path) {
        Ok(actual) => actual == expected,
        Err(_) => false,
    }
}
