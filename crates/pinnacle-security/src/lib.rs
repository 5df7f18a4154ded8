mod checksum;

pub use checksum::{file_hash_matches, sha1_hex, sha1_hex_reader};
